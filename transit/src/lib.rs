//! 运输平台限界域（transit）
//!
//! 基于 `cqrs-domain` / `cqrs-application` 引擎的三个限界域定义：
//! - `route`：线路（含投影与查询的完整接线示例）；
//! - `fleet`：车队；
//! - `delivery`：配送跟踪。
//!
//! 每个限界域只声明自己的聚合、事件枚举、命令与处理器；
//! 事件应用/重放、乐观并发、发布与消费全部复用引擎。
//!
pub mod delivery;
pub mod fleet;
pub mod route;
