//! 事件持久化模型（SerializedEvent）
//!
//! 定义事件在持久化/传输层的标准形态与在 `EventEnvelope` 间的转换，
//! 并提供批量序列化/反序列化的工具函数。
//!
use crate::{
    aggregate::Aggregate,
    domain_event::{DomainEvent, EventEnvelope, Metadata},
    error::{DomainError, DomainResult},
};
use bon::Builder;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Builder, Serialize, Deserialize)]
pub struct SerializedEvent {
    /// 事件类型判别符，与载荷内的 `type` 字段一致
    event_type: String,
    /// 聚合 ID，标识事件所属的聚合根实例
    aggregate_id: Uuid,
    /// 聚合类型，用于区分不同的聚合根
    aggregate_type: String,
    /// 聚合版本，由存储在追加时赋值，同一聚合内唯一且连续
    version: i64,
    /// 事件发生时间
    occurred_at: DateTime<Utc>,
    /// 事件负载，存储事件的具体数据（含 `type` 判别符）
    payload: Value,
}

impl SerializedEvent {
    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    pub fn aggregate_id(&self) -> Uuid {
        self.aggregate_id
    }

    pub fn aggregate_type(&self) -> &str {
        &self.aggregate_type
    }

    pub fn version(&self) -> i64 {
        self.version
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }

    pub fn payload(&self) -> &Value {
        &self.payload
    }
}

impl<A> TryFrom<&EventEnvelope<A>> for SerializedEvent
where
    A: Aggregate,
{
    type Error = serde_json::Error;

    fn try_from(envelope: &EventEnvelope<A>) -> Result<Self, Self::Error> {
        Ok(SerializedEvent {
            event_type: envelope.payload.event_type().to_string(),
            aggregate_id: envelope.metadata.aggregate_id(),
            aggregate_type: envelope.metadata.aggregate_type().to_string(),
            version: envelope.metadata.version(),
            occurred_at: *envelope.metadata.occurred_at(),
            payload: serde_json::to_value(&envelope.payload)?,
        })
    }
}

impl<A> TryFrom<&SerializedEvent> for EventEnvelope<A>
where
    A: Aggregate,
{
    type Error = serde_json::Error;

    fn try_from(value: &SerializedEvent) -> Result<Self, Self::Error> {
        let metadata = Metadata::builder()
            .aggregate_id(value.aggregate_id)
            .aggregate_type(value.aggregate_type.clone())
            .version(value.version)
            .occurred_at(value.occurred_at)
            .build();

        let payload: A::Event = serde_json::from_value(value.payload.clone())?;

        Ok(EventEnvelope { metadata, payload })
    }
}

pub fn serialize_events<A>(events: &[EventEnvelope<A>]) -> DomainResult<Vec<SerializedEvent>>
where
    A: Aggregate,
{
    let events = events
        .iter()
        .map(SerializedEvent::try_from)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(events)
}

pub fn deserialize_events<A>(events: Vec<SerializedEvent>) -> DomainResult<Vec<EventEnvelope<A>>>
where
    A: Aggregate,
{
    let events = events
        .iter()
        .map(EventEnvelope::try_from)
        .collect::<Result<Vec<_>, _>>()
        .map_err(DomainError::from)?;

    Ok(events)
}
