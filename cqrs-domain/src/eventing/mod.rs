//! 事件传播（eventing）
//!
//! 连接事件存储（写侧）与投影存储（读侧）的管道：
//! - `EventBus`：按主题发布/订阅的统一抽象，一个限界域对应一个主题；
//! - `InMemoryEventBus`：基于 broadcast 的内存实现；
//! - `EventHandler`：读侧投影处理器协作方契约（按消息至多一次应用，
//!   处理器须对重复投递幂等）；
//! - `EventConsumer`：长驻订阅循环，多态解码后分发给投影处理器，
//!   支持协作取消与优雅关闭。
//!
//! 该模块仅定义协议与消费运行时，可对接任意消息系统或内存实现。
//!
pub mod bus;
pub mod bus_inmemory;
pub mod consumer;
pub mod handler;

pub use bus::EventBus;
pub use bus_inmemory::InMemoryEventBus;
pub use consumer::{ConsumerHandle, EventConsumer};
pub use handler::EventHandler;
