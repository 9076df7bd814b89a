//! 持久化协议（persist）
//!
//! 定义事件在存储/传输层的标准形态与仓储接口：
//! - `SerializedEvent`：持久化与上线（wire）格式，`(aggregate_id, version)`
//!   在存储内唯一，作为比较交换（CAS）写入的替代约束；
//! - `EventRepository`：外部存储协作方需实现的窄接口；
//! - `MemoryEventRepository`：测试与本地开发用的内存实现。
//!
//! 该模块聚焦协议与转换逻辑，具体存储后端（如 Postgres）由上层提供实现并注入。
//!
mod event_repository;
mod memory;
mod serialized_event;

pub use event_repository::EventRepository;
pub use memory::MemoryEventRepository;
pub use serialized_event::{SerializedEvent, deserialize_events, serialize_events};
