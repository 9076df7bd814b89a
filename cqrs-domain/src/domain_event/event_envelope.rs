use crate::aggregate::Aggregate;
use chrono::Utc;
use std::fmt;
use uuid::Uuid;

use super::metadata::Metadata;

/// 事件信封，包含事件载荷与元数据
pub struct EventEnvelope<A>
where
    A: Aggregate,
{
    pub metadata: Metadata,
    pub payload: A::Event,
}

impl<A> EventEnvelope<A>
where
    A: Aggregate,
{
    /// 以当前时间封装一个已被存储赋予版本号的事件
    pub fn new(aggregate_id: Uuid, version: i64, payload: A::Event) -> Self {
        let metadata = Metadata::builder()
            .aggregate_id(aggregate_id)
            .aggregate_type(A::TYPE.to_string())
            .version(version)
            .occurred_at(Utc::now())
            .build();

        Self { metadata, payload }
    }
}

// 手写 Clone/Debug/PartialEq：派生会错误地要求 `A` 本身满足这些约束，
// 实际只需 `A::Event`（DomainEvent 已保证）。
impl<A> Clone for EventEnvelope<A>
where
    A: Aggregate,
{
    fn clone(&self) -> Self {
        Self {
            metadata: self.metadata.clone(),
            payload: self.payload.clone(),
        }
    }
}

impl<A> fmt::Debug for EventEnvelope<A>
where
    A: Aggregate,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventEnvelope")
            .field("metadata", &self.metadata)
            .field("payload", &self.payload)
            .finish()
    }
}

impl<A> PartialEq for EventEnvelope<A>
where
    A: Aggregate,
{
    fn eq(&self, other: &Self) -> bool {
        self.metadata == other.metadata && self.payload == other.payload
    }
}
