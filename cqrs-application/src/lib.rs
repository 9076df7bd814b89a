//! 应用层（cqrs-application）
//!
//! 命令/查询的注册与分发：
//! - `CommandBus` / `QueryBus`：按请求的具体类型路由到唯一处理器；
//! - 注册表禁止重复注册，分发时找不到处理器即报错；
//! - 查询总线按读模型实体类型参数化，结果恒为有序列表（可为空，绝非 null）。
//!
pub mod command;
pub mod command_bus;
pub mod command_handler;
pub mod context;
pub mod error;
pub mod inmemory_command_bus;
pub mod inmemory_query_bus;
pub mod query;
pub mod query_bus;
pub mod query_handler;
pub mod read_model;

pub use inmemory_command_bus::InMemoryCommandBus;
pub use inmemory_query_bus::InMemoryQueryBus;
