//! 事件仓储接口（EventRepository）
//!
//! 外部存储协作方需实现的窄接口。仓储本身不做并发判断，只负责：
//! - 按聚合返回版本升序的事件流（无事件时返回空集合，不报错）；
//! - 追加保存并强制 `(aggregate_id, version)` 唯一；
//! - 按聚合类型列出去重后的聚合 ID 集合。
//!
use crate::{error::DomainResult, persist::SerializedEvent};
use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

#[async_trait]
pub trait EventRepository: Send + Sync {
    /// 返回某聚合的完整事件流，按版本升序；无事件时为空集合
    async fn get_events(&self, aggregate_id: Uuid) -> DomainResult<Vec<SerializedEvent>>;

    /// 按顺序追加保存事件；违反 `(aggregate_id, version)` 唯一约束时
    /// 返回 `DomainError::DuplicateVersion`，且不落盘任何一条
    async fn save(&self, events: Vec<SerializedEvent>) -> DomainResult<()>;

    /// 返回拥有指定聚合类型事件的去重聚合 ID 集合；无匹配时为空集合
    async fn aggregate_ids_by_type(&self, aggregate_type: &str) -> DomainResult<Vec<Uuid>>;
}

#[async_trait]
impl<T> EventRepository for Arc<T>
where
    T: EventRepository + ?Sized,
{
    async fn get_events(&self, aggregate_id: Uuid) -> DomainResult<Vec<SerializedEvent>> {
        (**self).get_events(aggregate_id).await
    }

    async fn save(&self, events: Vec<SerializedEvent>) -> DomainResult<()> {
        (**self).save(events).await
    }

    async fn aggregate_ids_by_type(&self, aggregate_type: &str) -> DomainResult<Vec<Uuid>> {
        (**self).aggregate_ids_by_type(aggregate_type).await
    }
}
