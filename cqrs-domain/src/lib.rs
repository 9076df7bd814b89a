//! 事件溯源 / CQRS 引擎领域层（cqrs-domain）
//!
//! 为多个独立部署的微服务（route / fleet / delivery 等限界域）提供共享的
//! 事件溯源骨架：
//! - 聚合（`aggregate`）与聚合根（`aggregate_root`）：事件应用与重放；
//! - 领域事件（`domain_event`）：事件载荷、元数据与事件信封；
//! - 事件存储（`event_store`）：追加写 + 乐观并发控制 + 发布；
//! - 事件传播（`eventing`）：总线、消费循环与重发（republish）；
//! - 持久化协议（`persist`）：事件仓储接口与序列化形态。
//!
//! 本 crate 只定义引擎与协议，不绑定具体存储与传输实现；
//! 关系型读模型、HTTP/gRPC 传输等均作为外部协作方接入。
//!
pub mod aggregate;
pub mod aggregate_root;
pub mod domain_event;
pub mod error;
pub mod event_store;
pub mod eventing;
pub mod persist;
pub mod value_object;
