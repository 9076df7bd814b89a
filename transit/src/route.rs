//! 线路（route）限界域
//!
//! 写侧：`Route` 聚合 + 三个命令处理器；
//! 读侧：`RouteProjection` 以幂等 upsert 折叠事件，`RouteView` 经查询总线对外。
//!
use async_trait::async_trait;
use cqrs_application::command::Command;
use cqrs_application::command_handler::CommandHandler;
use cqrs_application::context::AppContext;
use cqrs_application::error::AppError;
use cqrs_application::query::Query;
use cqrs_application::query_handler::QueryHandler;
use cqrs_application::read_model::ReadModel;
use cqrs_domain::aggregate::Aggregate;
use cqrs_domain::domain_event::{DomainEvent, Metadata};
use cqrs_domain::error::DomainError;
use cqrs_domain::event_store::EventStore;
use cqrs_domain::eventing::EventHandler;
use cqrs_domain::persist::EventRepository;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use uuid::Uuid;

/// 线路域的唯一主题名（存储发布与消费者订阅共用）
pub const ROUTE_TOPIC: &str = "transit.route.events";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RouteStatus {
    #[default]
    Planned,
    Active,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RouteEvent {
    RouteCreated {
        origin: String,
        destination: String,
    },
    RouteStatusChanged {
        old_status: RouteStatus,
        new_status: RouteStatus,
    },
    /// 删除本身也是事件，事件流永不物理删除
    RouteDeleted,
}

impl DomainEvent for RouteEvent {
    fn event_type(&self) -> &'static str {
        match self {
            RouteEvent::RouteCreated { .. } => "RouteCreated",
            RouteEvent::RouteStatusChanged { .. } => "RouteStatusChanged",
            RouteEvent::RouteDeleted => "RouteDeleted",
        }
    }
}

#[derive(Debug)]
pub enum RouteCommand {
    Create { origin: String, destination: String },
    ChangeStatus { status: RouteStatus },
    Delete,
}

/// 线路聚合状态：完全由自身事件流折叠而来
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Route {
    created: bool,
    origin: String,
    destination: String,
    status: RouteStatus,
    deleted: bool,
}

impl Route {
    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }

    pub fn status(&self) -> RouteStatus {
        self.status
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted
    }
}

impl Aggregate for Route {
    const TYPE: &'static str = "route";
    type Command = RouteCommand;
    type Event = RouteEvent;
    type Error = DomainError;

    fn execute(&self, command: RouteCommand) -> Result<Vec<RouteEvent>, DomainError> {
        match command {
            RouteCommand::Create {
                origin,
                destination,
            } => {
                if self.created {
                    return Err(DomainError::InvalidState {
                        reason: "route already created".into(),
                    });
                }
                if origin.is_empty() || destination.is_empty() {
                    return Err(DomainError::InvalidCommand {
                        reason: "origin and destination must be non-empty".into(),
                    });
                }
                Ok(vec![RouteEvent::RouteCreated {
                    origin,
                    destination,
                }])
            }
            RouteCommand::ChangeStatus { status } => {
                if !self.created || self.deleted {
                    return Err(DomainError::InvalidState {
                        reason: "route not available".into(),
                    });
                }
                if status == self.status {
                    return Err(DomainError::InvalidCommand {
                        reason: "status unchanged".into(),
                    });
                }
                Ok(vec![RouteEvent::RouteStatusChanged {
                    old_status: self.status,
                    new_status: status,
                }])
            }
            RouteCommand::Delete => {
                if !self.created || self.deleted {
                    return Err(DomainError::InvalidState {
                        reason: "route not available".into(),
                    });
                }
                Ok(vec![RouteEvent::RouteDeleted])
            }
        }
    }

    fn apply(&mut self, event: &RouteEvent) {
        match event {
            RouteEvent::RouteCreated {
                origin,
                destination,
            } => {
                self.created = true;
                self.origin = origin.clone();
                self.destination = destination.clone();
            }
            RouteEvent::RouteStatusChanged { new_status, .. } => {
                self.status = *new_status;
            }
            RouteEvent::RouteDeleted => {
                self.deleted = true;
            }
        }
    }
}

// ---- 命令 ----

#[derive(Debug)]
pub struct CreateRoute {
    pub route_id: Uuid,
    pub origin: String,
    pub destination: String,
}

impl Command for CreateRoute {
    const NAME: &'static str = "CreateRoute";
}

#[derive(Debug)]
pub struct ChangeRouteStatus {
    pub route_id: Uuid,
    pub status: RouteStatus,
}

impl Command for ChangeRouteStatus {
    const NAME: &'static str = "ChangeRouteStatus";
}

#[derive(Debug)]
pub struct DeleteRoute {
    pub route_id: Uuid,
}

impl Command for DeleteRoute {
    const NAME: &'static str = "DeleteRoute";
}

/// 线路命令处理器：加载（冷重放）→ 执行 → 保存
///
/// 并发冲突原样上抛，重试与否由调用方决定。
pub struct RouteCommandHandler<R>
where
    R: EventRepository,
{
    store: Arc<EventStore<R>>,
}

impl<R> RouteCommandHandler<R>
where
    R: EventRepository,
{
    pub fn new(store: Arc<EventStore<R>>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl<R> CommandHandler<CreateRoute> for RouteCommandHandler<R>
where
    R: EventRepository + 'static,
{
    async fn handle(&self, _ctx: &AppContext, cmd: CreateRoute) -> Result<(), AppError> {
        let mut root = self.store.load_or_new::<Route>(cmd.route_id).await?;
        root.handle(RouteCommand::Create {
            origin: cmd.origin,
            destination: cmd.destination,
        })?;
        self.store.save(&mut root).await?;
        Ok(())
    }
}

#[async_trait]
impl<R> CommandHandler<ChangeRouteStatus> for RouteCommandHandler<R>
where
    R: EventRepository + 'static,
{
    async fn handle(&self, _ctx: &AppContext, cmd: ChangeRouteStatus) -> Result<(), AppError> {
        let mut root = self
            .store
            .load::<Route>(cmd.route_id)
            .await
            .map_err(|err| match err {
                DomainError::StreamNotFound { .. } => {
                    AppError::AggregateNotFound(cmd.route_id.to_string())
                }
                other => AppError::Domain(other),
            })?;
        root.handle(RouteCommand::ChangeStatus { status: cmd.status })?;
        self.store.save(&mut root).await?;
        Ok(())
    }
}

#[async_trait]
impl<R> CommandHandler<DeleteRoute> for RouteCommandHandler<R>
where
    R: EventRepository + 'static,
{
    async fn handle(&self, _ctx: &AppContext, cmd: DeleteRoute) -> Result<(), AppError> {
        let mut root = self
            .store
            .load::<Route>(cmd.route_id)
            .await
            .map_err(|err| match err {
                DomainError::StreamNotFound { .. } => {
                    AppError::AggregateNotFound(cmd.route_id.to_string())
                }
                other => AppError::Domain(other),
            })?;
        root.handle(RouteCommand::Delete)?;
        self.store.save(&mut root).await?;
        Ok(())
    }
}

// ---- 读侧 ----

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteView {
    pub route_id: Uuid,
    pub origin: String,
    pub destination: String,
    pub status: RouteStatus,
    pub deleted: bool,
    /// 视图已折叠到的聚合版本（幂等哨兵）
    pub version: i64,
}

impl ReadModel for RouteView {}

/// 线路投影：以 `(route_id, version)` 为幂等哨兵的内存读模型。
///
/// 消费侧按消息至多一次应用，重复投递时旧版本事件被直接丢弃。
#[derive(Clone, Default)]
pub struct RouteProjection {
    views: Arc<RwLock<HashMap<Uuid, RouteView>>>,
}

impl RouteProjection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, route_id: Uuid) -> Option<RouteView> {
        self.views
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&route_id)
            .cloned()
    }

    pub fn list(&self) -> Vec<RouteView> {
        let mut views: Vec<RouteView> = self
            .views
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();
        views.sort_by_key(|v| v.route_id);
        views
    }
}

#[async_trait]
impl EventHandler<RouteEvent> for RouteProjection {
    fn handler_name(&self) -> &str {
        "route-projection"
    }

    async fn handle(&self, event: &RouteEvent, metadata: &Metadata) -> anyhow::Result<()> {
        let mut views = self.views.write().unwrap_or_else(PoisonError::into_inner);
        let route_id = metadata.aggregate_id();

        if let Some(view) = views.get(&route_id) {
            if metadata.version() <= view.version {
                // 重复投递：已折叠过的版本直接丢弃
                return Ok(());
            }
        }

        match event {
            RouteEvent::RouteCreated {
                origin,
                destination,
            } => {
                views.insert(
                    route_id,
                    RouteView {
                        route_id,
                        origin: origin.clone(),
                        destination: destination.clone(),
                        status: RouteStatus::Planned,
                        deleted: false,
                        version: metadata.version(),
                    },
                );
            }
            RouteEvent::RouteStatusChanged { new_status, .. } => {
                let view = views
                    .get_mut(&route_id)
                    .ok_or_else(|| anyhow::anyhow!("route view missing: {route_id}"))?;
                view.status = *new_status;
                view.version = metadata.version();
            }
            RouteEvent::RouteDeleted => {
                let view = views
                    .get_mut(&route_id)
                    .ok_or_else(|| anyhow::anyhow!("route view missing: {route_id}"))?;
                view.deleted = true;
                view.version = metadata.version();
            }
        }

        Ok(())
    }
}

// ---- 查询 ----

#[derive(Debug)]
pub struct GetRoute {
    pub route_id: Uuid,
}

impl Query for GetRoute {
    const NAME: &'static str = "GetRoute";
}

#[derive(Debug)]
pub struct ListRoutes;

impl Query for ListRoutes {
    const NAME: &'static str = "ListRoutes";
}

pub struct RouteQueryHandler {
    projection: RouteProjection,
}

impl RouteQueryHandler {
    pub fn new(projection: RouteProjection) -> Self {
        Self { projection }
    }
}

#[async_trait]
impl QueryHandler<GetRoute, RouteView> for RouteQueryHandler {
    async fn handle(&self, _ctx: &AppContext, q: GetRoute) -> Result<Vec<RouteView>, AppError> {
        Ok(self.projection.get(q.route_id).into_iter().collect())
    }
}

#[async_trait]
impl QueryHandler<ListRoutes, RouteView> for RouteQueryHandler {
    async fn handle(&self, _ctx: &AppContext, _q: ListRoutes) -> Result<Vec<RouteView>, AppError> {
        Ok(self.projection.list())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cqrs_domain::aggregate_root::AggregateRoot;
    use cqrs_domain::domain_event::EventEnvelope;

    #[test]
    fn create_then_change_status_via_raise() {
        let mut root = AggregateRoot::<Route>::new(Uuid::new_v4());
        root.handle(RouteCommand::Create {
            origin: "SEA".into(),
            destination: "PDX".into(),
        })
        .unwrap();
        root.handle(RouteCommand::ChangeStatus {
            status: RouteStatus::Active,
        })
        .unwrap();

        assert_eq!(root.state().status(), RouteStatus::Active);
        assert_eq!(root.uncommitted_changes().len(), 2);
    }

    #[test]
    fn replay_equals_raise_fold() {
        let id = Uuid::new_v4();
        let events = vec![
            RouteEvent::RouteCreated {
                origin: "SEA".into(),
                destination: "PDX".into(),
            },
            RouteEvent::RouteStatusChanged {
                old_status: RouteStatus::Planned,
                new_status: RouteStatus::Active,
            },
            RouteEvent::RouteDeleted,
        ];

        let mut raised = AggregateRoot::<Route>::new(id);
        for e in events.clone() {
            raised.raise(e);
        }

        let envelopes: Vec<EventEnvelope<Route>> = events
            .into_iter()
            .enumerate()
            .map(|(i, e)| EventEnvelope::new(id, i as i64, e))
            .collect();
        let replayed = AggregateRoot::<Route>::from_events(id, &envelopes);

        assert_eq!(replayed.state(), raised.state());
        assert!(replayed.state().is_deleted());
    }

    #[test]
    fn commands_on_missing_or_deleted_route_fail() {
        let fresh = Route::default();
        let err = fresh
            .execute(RouteCommand::ChangeStatus {
                status: RouteStatus::Active,
            })
            .unwrap_err();
        match err {
            DomainError::InvalidState { .. } => {}
            other => panic!("unexpected {other:?}"),
        }

        let mut deleted = Route::default();
        deleted.apply(&RouteEvent::RouteCreated {
            origin: "SEA".into(),
            destination: "PDX".into(),
        });
        deleted.apply(&RouteEvent::RouteDeleted);
        let err = deleted.execute(RouteCommand::Delete).unwrap_err();
        match err {
            DomainError::InvalidState { .. } => {}
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn duplicate_create_rejected() {
        let mut route = Route::default();
        route.apply(&RouteEvent::RouteCreated {
            origin: "SEA".into(),
            destination: "PDX".into(),
        });
        let err = route
            .execute(RouteCommand::Create {
                origin: "SFO".into(),
                destination: "LAX".into(),
            })
            .unwrap_err();
        match err {
            DomainError::InvalidState { .. } => {}
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn projection_is_idempotent_per_version() {
        let projection = RouteProjection::new();
        let id = Uuid::new_v4();

        let created = RouteEvent::RouteCreated {
            origin: "SEA".into(),
            destination: "PDX".into(),
        };
        let meta = |version: i64| {
            Metadata::builder()
                .aggregate_id(id)
                .aggregate_type(Route::TYPE.to_string())
                .version(version)
                .occurred_at(chrono::Utc::now())
                .build()
        };

        projection.handle(&created, &meta(0)).await.unwrap();
        let changed = RouteEvent::RouteStatusChanged {
            old_status: RouteStatus::Planned,
            new_status: RouteStatus::Active,
        };
        projection.handle(&changed, &meta(1)).await.unwrap();
        // 重复投递同一条消息：状态不变
        projection.handle(&changed, &meta(1)).await.unwrap();

        let view = projection.get(id).unwrap();
        assert_eq!(view.status, RouteStatus::Active);
        assert_eq!(view.version, 1);
        assert_eq!(projection.list().len(), 1);
    }

    #[test]
    fn event_type_matches_serde_discriminator() {
        let events = [
            RouteEvent::RouteCreated {
                origin: "SEA".into(),
                destination: "PDX".into(),
            },
            RouteEvent::RouteStatusChanged {
                old_status: RouteStatus::Planned,
                new_status: RouteStatus::Active,
            },
            RouteEvent::RouteDeleted,
        ];
        for e in events {
            let json = serde_json::to_value(&e).unwrap();
            assert_eq!(json["type"], e.event_type());
        }
    }
}
