//! 事件存储（EventStore）
//!
//! 为聚合提供追加写持久化与乐观并发控制，并在持久化后把事件发布到
//! 所属限界域的主题上：
//! - 版本检查：`expected_version` 与流内最后一条持久化版本比对，
//!   不一致即并发冲突，落库保持原样；
//! - 版本赋值：从 `expected_version + 1` 起连续递增，首次提交为 0；
//! - 逐条持久化、逐条发布，顺序一致；发布失败向调用方报告，
//!   但存储已是事实来源，可用 `republish` 补齐读侧。
//!
//! 持久化与发布不是一个事务：这是有意的至少一次发布语义，
//! 修复手段是 `republish`，而非跨存储与代理的分布式事务。
//!
use crate::{
    aggregate::Aggregate,
    aggregate_root::AggregateRoot,
    domain_event::EventEnvelope,
    error::{DomainError, DomainResult},
    eventing::EventBus,
    persist::{EventRepository, SerializedEvent, deserialize_events, serialize_events},
    value_object::Version,
};
use std::sync::Arc;
use uuid::Uuid;

/// 事件存储：追加写 + 乐观并发 + 写后发布
pub struct EventStore<R>
where
    R: EventRepository,
{
    repository: R,
    bus: Arc<dyn EventBus>,
    topic: String,
}

impl<R> EventStore<R>
where
    R: EventRepository,
{
    /// 创建事件存储；`topic` 为该限界域唯一的主题名，
    /// 保存与重发共用这一个配置值
    pub fn new(repository: R, bus: Arc<dyn EventBus>, topic: impl Into<String>) -> Self {
        Self {
            repository,
            bus,
            topic: topic.into(),
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// 以乐观并发检查追加保存事件，并逐条发布到主题。
    ///
    /// `expected_version != NEW` 且流非空时，流内最后一条版本必须等于
    /// `expected_version`，否则返回 `VersionConflict` 且不写入任何事件；
    /// `expected_version == NEW` 而流非空时由 `(aggregate_id, version)`
    /// 唯一约束兜底，同样以冲突报告。
    pub async fn save_events<A>(
        &self,
        aggregate_id: Uuid,
        events: Vec<A::Event>,
        expected_version: Version,
    ) -> DomainResult<Vec<SerializedEvent>>
    where
        A: Aggregate,
    {
        if events.is_empty() {
            return Ok(Vec::new());
        }

        let stream = self.repository.get_events(aggregate_id).await?;
        if !expected_version.is_new() {
            if let Some(last) = stream.last() {
                if last.version() != expected_version.value() {
                    return Err(DomainError::VersionConflict {
                        aggregate_id,
                        expected: expected_version.value(),
                        actual: last.version(),
                    });
                }
            }
        }

        let envelopes: Vec<EventEnvelope<A>> = events
            .into_iter()
            .enumerate()
            .map(|(i, event)| {
                EventEnvelope::new(aggregate_id, expected_version.value() + 1 + i as i64, event)
            })
            .collect();

        let records = serialize_events(&envelopes)?;

        // 逐条持久化、逐条发布，保持顺序；中途失败时存储即事实来源，
        // 读侧缺口由 republish 补齐
        for record in &records {
            self.repository.save(vec![record.clone()]).await?;
            self.bus.publish(&self.topic, record).await?;
        }

        Ok(records)
    }

    /// 保存聚合根的未提交变更并回写最新持久化版本。
    ///
    /// 变更被移出聚合根；成功返回后未提交列表为空。
    pub async fn save<A>(&self, root: &mut AggregateRoot<A>) -> DomainResult<Vec<SerializedEvent>>
    where
        A: Aggregate,
    {
        let expected = root.version();
        let events = root.take_changes();
        let records = self.save_events::<A>(root.id(), events, expected).await?;

        if let Some(last) = records.last() {
            root.set_version(Version::from_value(last.version()));
        }

        Ok(records)
    }

    /// 返回某聚合的完整事件流（版本升序）；无事件时报告流不存在
    pub async fn get_events(&self, aggregate_id: Uuid) -> DomainResult<Vec<SerializedEvent>> {
        let stream = self.repository.get_events(aggregate_id).await?;
        if stream.is_empty() {
            return Err(DomainError::StreamNotFound { aggregate_id });
        }
        Ok(stream)
    }

    /// 重放完整事件流重建聚合根；流不存在时报错
    pub async fn load<A>(&self, aggregate_id: Uuid) -> DomainResult<AggregateRoot<A>>
    where
        A: Aggregate,
    {
        let records = self.get_events(aggregate_id).await?;
        let envelopes = deserialize_events::<A>(records)?;
        Ok(AggregateRoot::from_events(aggregate_id, &envelopes))
    }

    /// 同 `load`，但流不存在时返回全新聚合根（创建型命令使用）
    pub async fn load_or_new<A>(&self, aggregate_id: Uuid) -> DomainResult<AggregateRoot<A>>
    where
        A: Aggregate,
    {
        match self.load(aggregate_id).await {
            Ok(root) => Ok(root),
            Err(DomainError::StreamNotFound { .. }) => Ok(AggregateRoot::new(aggregate_id)),
            Err(err) => Err(err),
        }
    }

    /// 返回拥有指定聚合类型事件的聚合 ID 集合；无匹配时为空集合
    pub async fn aggregate_ids_by_type(&self, aggregate_type: &str) -> DomainResult<Vec<Uuid>> {
        self.repository.aggregate_ids_by_type(aggregate_type).await
    }

    /// 重发：不改动存储，把指定聚合类型的全部事件流按流内顺序
    /// 重新发布到主题，用于重建或修复投影；返回发布条数
    pub async fn republish(&self, aggregate_type: &str) -> DomainResult<usize> {
        let ids = self.aggregate_ids_by_type(aggregate_type).await?;

        let mut published = 0usize;
        for aggregate_id in ids {
            let stream = self.repository.get_events(aggregate_id).await?;
            for record in &stream {
                self.bus.publish(&self.topic, record).await?;
                published += 1;
            }
        }

        Ok(published)
    }
}
