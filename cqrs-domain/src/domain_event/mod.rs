//! 领域事件（Domain Event）
//!
//! 定义事件载荷需要实现的最小接口（`DomainEvent`），以及将事件与元数据
//! 封装后的 `EventEnvelope`。
//!
//! 事件载荷使用 serde 内部标记枚举（`#[serde(tag = "type")]`）序列化，
//! 载荷中的 `type` 字段即多态反序列化的唯一判别符；未注册的判别符
//! 在解码时确定性失败，绝不退化为默认类型。

mod event_envelope;
mod metadata;

pub use event_envelope::EventEnvelope;
pub use metadata::Metadata;

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt;

/// 领域事件载荷需要满足的通用能力边界
///
/// `event_type` 返回的字符串必须与 serde 写入载荷的 `type` 标记一致，
/// 二者同源于枚举变体名，保证往返（round-trip）解码正确。
pub trait DomainEvent:
    Clone + PartialEq + fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// 事件类型判别符（与具体事件变体同名）
    fn event_type(&self) -> &'static str;
}
