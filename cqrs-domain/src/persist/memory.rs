//! 内存版事件仓储（MemoryEventRepository）
//!
//! 以 `HashMap<Uuid, Vec<SerializedEvent>>` 存放各聚合的事件流，
//! 在锁内完成唯一性校验与追加，满足 `EventRepository` 协议：
//! - 典型用途：测试环境、示例与本地开发；
//! - `save` 整批校验 `(aggregate_id, version)` 唯一后才写入，
//!   作为真实存储唯一约束的等价物。
//!
use crate::{
    error::{DomainError, DomainResult},
    persist::{EventRepository, SerializedEvent},
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

/// 简单的内存事件仓储实现
#[derive(Clone, Default)]
pub struct MemoryEventRepository {
    streams: Arc<RwLock<HashMap<Uuid, Vec<SerializedEvent>>>>,
}

impl MemoryEventRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_err(reason: &str) -> DomainError {
        DomainError::Repository {
            reason: reason.to_string(),
        }
    }
}

#[async_trait]
impl EventRepository for MemoryEventRepository {
    async fn get_events(&self, aggregate_id: Uuid) -> DomainResult<Vec<SerializedEvent>> {
        let streams = self
            .streams
            .read()
            .map_err(|_| Self::lock_err("stream lock poisoned"))?;

        Ok(streams.get(&aggregate_id).cloned().unwrap_or_default())
    }

    async fn save(&self, events: Vec<SerializedEvent>) -> DomainResult<()> {
        if events.is_empty() {
            return Ok(());
        }

        let mut streams = self
            .streams
            .write()
            .map_err(|_| Self::lock_err("stream lock poisoned"))?;

        // 先整批校验唯一性，再写入，保证失败时不留下半截流
        for event in &events {
            let exists = streams
                .get(&event.aggregate_id())
                .map(|stream| stream.iter().any(|e| e.version() == event.version()))
                .unwrap_or(false);

            if exists {
                return Err(DomainError::DuplicateVersion {
                    aggregate_id: event.aggregate_id(),
                    version: event.version(),
                });
            }
        }

        for event in events {
            streams.entry(event.aggregate_id()).or_default().push(event);
        }

        Ok(())
    }

    async fn aggregate_ids_by_type(&self, aggregate_type: &str) -> DomainResult<Vec<Uuid>> {
        let streams = self
            .streams
            .read()
            .map_err(|_| Self::lock_err("stream lock poisoned"))?;

        let mut ids: Vec<Uuid> = streams
            .iter()
            .filter(|(_, stream)| {
                stream
                    .iter()
                    .any(|e| e.aggregate_type() == aggregate_type)
            })
            .map(|(id, _)| *id)
            .collect();

        // 去重集合，排序保证返回顺序可预期
        ids.sort();
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    fn mk_event(aggregate_id: Uuid, aggregate_type: &str, version: i64) -> SerializedEvent {
        SerializedEvent::builder()
            .event_type("Noted".to_string())
            .aggregate_id(aggregate_id)
            .aggregate_type(aggregate_type.to_string())
            .version(version)
            .occurred_at(Utc::now())
            .payload(json!({ "type": "Noted", "version": version }))
            .build()
    }

    #[tokio::test]
    async fn save_and_get_events_in_order() {
        let repo = MemoryEventRepository::new();
        let id = Uuid::new_v4();

        repo.save(vec![mk_event(id, "note", 0), mk_event(id, "note", 1)])
            .await
            .unwrap();

        let stream = repo.get_events(id).await.unwrap();
        assert_eq!(stream.len(), 2);
        assert_eq!(stream[0].version(), 0);
        assert_eq!(stream[1].version(), 1);
    }

    #[tokio::test]
    async fn duplicate_version_rejected_without_partial_write() {
        let repo = MemoryEventRepository::new();
        let id = Uuid::new_v4();

        repo.save(vec![mk_event(id, "note", 0)]).await.unwrap();

        let err = repo
            .save(vec![mk_event(id, "note", 1), mk_event(id, "note", 0)])
            .await
            .unwrap_err();
        match err {
            DomainError::DuplicateVersion { version: 0, .. } => {}
            other => panic!("unexpected {other:?}"),
        }

        // 整批拒绝：版本 1 也不应写入
        let stream = repo.get_events(id).await.unwrap();
        assert_eq!(stream.len(), 1);
    }

    #[tokio::test]
    async fn ids_by_type_distinct_and_empty_when_none() {
        let repo = MemoryEventRepository::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        repo.save(vec![
            mk_event(a, "note", 0),
            mk_event(a, "note", 1),
            mk_event(b, "note", 0),
        ])
        .await
        .unwrap();

        let ids = repo.aggregate_ids_by_type("note").await.unwrap();
        assert_eq!(ids.len(), 2);
        assert!(ids.contains(&a) && ids.contains(&b));

        let none = repo.aggregate_ids_by_type("order").await.unwrap();
        assert!(none.is_empty());
    }
}
