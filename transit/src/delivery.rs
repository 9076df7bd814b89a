//! 配送跟踪（delivery）限界域
//!
use async_trait::async_trait;
use cqrs_application::command::Command;
use cqrs_application::command_handler::CommandHandler;
use cqrs_application::context::AppContext;
use cqrs_application::error::AppError;
use cqrs_domain::aggregate::Aggregate;
use cqrs_domain::domain_event::DomainEvent;
use cqrs_domain::error::DomainError;
use cqrs_domain::event_store::EventStore;
use cqrs_domain::persist::EventRepository;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// 配送域的唯一主题名
pub const DELIVERY_TOPIC: &str = "transit.delivery.events";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DeliveryStatus {
    #[default]
    Scheduled,
    InTransit,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DeliveryEvent {
    DeliveryScheduled { route_id: Uuid, vehicle_id: Uuid },
    DeliveryDispatched,
    DeliveryCompleted,
}

impl DomainEvent for DeliveryEvent {
    fn event_type(&self) -> &'static str {
        match self {
            DeliveryEvent::DeliveryScheduled { .. } => "DeliveryScheduled",
            DeliveryEvent::DeliveryDispatched => "DeliveryDispatched",
            DeliveryEvent::DeliveryCompleted => "DeliveryCompleted",
        }
    }
}

#[derive(Debug)]
pub enum DeliveryCommand {
    Schedule { route_id: Uuid, vehicle_id: Uuid },
    Dispatch,
    Complete,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Delivery {
    scheduled: bool,
    route_id: Option<Uuid>,
    vehicle_id: Option<Uuid>,
    status: DeliveryStatus,
}

impl Delivery {
    pub fn status(&self) -> DeliveryStatus {
        self.status
    }

    pub fn route_id(&self) -> Option<Uuid> {
        self.route_id
    }
}

impl Aggregate for Delivery {
    const TYPE: &'static str = "delivery";
    type Command = DeliveryCommand;
    type Event = DeliveryEvent;
    type Error = DomainError;

    fn execute(&self, command: DeliveryCommand) -> Result<Vec<DeliveryEvent>, DomainError> {
        match command {
            DeliveryCommand::Schedule {
                route_id,
                vehicle_id,
            } => {
                if self.scheduled {
                    return Err(DomainError::InvalidState {
                        reason: "delivery already scheduled".into(),
                    });
                }
                Ok(vec![DeliveryEvent::DeliveryScheduled {
                    route_id,
                    vehicle_id,
                }])
            }
            DeliveryCommand::Dispatch => {
                if !self.scheduled || self.status != DeliveryStatus::Scheduled {
                    return Err(DomainError::InvalidState {
                        reason: "delivery not ready for dispatch".into(),
                    });
                }
                Ok(vec![DeliveryEvent::DeliveryDispatched])
            }
            DeliveryCommand::Complete => {
                if self.status != DeliveryStatus::InTransit {
                    return Err(DomainError::InvalidState {
                        reason: "delivery not in transit".into(),
                    });
                }
                Ok(vec![DeliveryEvent::DeliveryCompleted])
            }
        }
    }

    fn apply(&mut self, event: &DeliveryEvent) {
        match event {
            DeliveryEvent::DeliveryScheduled {
                route_id,
                vehicle_id,
            } => {
                self.scheduled = true;
                self.route_id = Some(*route_id);
                self.vehicle_id = Some(*vehicle_id);
            }
            DeliveryEvent::DeliveryDispatched => {
                self.status = DeliveryStatus::InTransit;
            }
            DeliveryEvent::DeliveryCompleted => {
                self.status = DeliveryStatus::Completed;
            }
        }
    }
}

// ---- 命令 ----

#[derive(Debug)]
pub struct ScheduleDelivery {
    pub delivery_id: Uuid,
    pub route_id: Uuid,
    pub vehicle_id: Uuid,
}

impl Command for ScheduleDelivery {
    const NAME: &'static str = "ScheduleDelivery";
}

#[derive(Debug)]
pub struct DispatchDelivery {
    pub delivery_id: Uuid,
}

impl Command for DispatchDelivery {
    const NAME: &'static str = "DispatchDelivery";
}

#[derive(Debug)]
pub struct CompleteDelivery {
    pub delivery_id: Uuid,
}

impl Command for CompleteDelivery {
    const NAME: &'static str = "CompleteDelivery";
}

pub struct DeliveryCommandHandler<R>
where
    R: EventRepository,
{
    store: Arc<EventStore<R>>,
}

impl<R> DeliveryCommandHandler<R>
where
    R: EventRepository,
{
    pub fn new(store: Arc<EventStore<R>>) -> Self {
        Self { store }
    }

    async fn load(
        &self,
        delivery_id: Uuid,
    ) -> Result<cqrs_domain::aggregate_root::AggregateRoot<Delivery>, AppError> {
        self.store
            .load::<Delivery>(delivery_id)
            .await
            .map_err(|err| match err {
                DomainError::StreamNotFound { .. } => {
                    AppError::AggregateNotFound(delivery_id.to_string())
                }
                other => AppError::Domain(other),
            })
    }
}

#[async_trait]
impl<R> CommandHandler<ScheduleDelivery> for DeliveryCommandHandler<R>
where
    R: EventRepository + 'static,
{
    async fn handle(&self, _ctx: &AppContext, cmd: ScheduleDelivery) -> Result<(), AppError> {
        let mut root = self.store.load_or_new::<Delivery>(cmd.delivery_id).await?;
        root.handle(DeliveryCommand::Schedule {
            route_id: cmd.route_id,
            vehicle_id: cmd.vehicle_id,
        })?;
        self.store.save(&mut root).await?;
        Ok(())
    }
}

#[async_trait]
impl<R> CommandHandler<DispatchDelivery> for DeliveryCommandHandler<R>
where
    R: EventRepository + 'static,
{
    async fn handle(&self, _ctx: &AppContext, cmd: DispatchDelivery) -> Result<(), AppError> {
        let mut root = self.load(cmd.delivery_id).await?;
        root.handle(DeliveryCommand::Dispatch)?;
        self.store.save(&mut root).await?;
        Ok(())
    }
}

#[async_trait]
impl<R> CommandHandler<CompleteDelivery> for DeliveryCommandHandler<R>
where
    R: EventRepository + 'static,
{
    async fn handle(&self, _ctx: &AppContext, cmd: CompleteDelivery) -> Result<(), AppError> {
        let mut root = self.load(cmd.delivery_id).await?;
        root.handle(DeliveryCommand::Complete)?;
        self.store.save(&mut root).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cqrs_domain::aggregate_root::AggregateRoot;
    use cqrs_domain::domain_event::EventEnvelope;

    #[test]
    fn lifecycle_transitions_enforced_in_order() {
        let mut delivery = Delivery::default();

        let err = delivery.execute(DeliveryCommand::Dispatch).unwrap_err();
        match err {
            DomainError::InvalidState { .. } => {}
            other => panic!("unexpected {other:?}"),
        }

        delivery.apply(&DeliveryEvent::DeliveryScheduled {
            route_id: Uuid::new_v4(),
            vehicle_id: Uuid::new_v4(),
        });
        let err = delivery.execute(DeliveryCommand::Complete).unwrap_err();
        match err {
            DomainError::InvalidState { .. } => {}
            other => panic!("unexpected {other:?}"),
        }

        delivery.apply(&DeliveryEvent::DeliveryDispatched);
        let events = delivery.execute(DeliveryCommand::Complete).unwrap();
        assert_eq!(events, vec![DeliveryEvent::DeliveryCompleted]);
    }

    #[test]
    fn replay_equals_raise_fold() {
        let id = Uuid::new_v4();
        let events = vec![
            DeliveryEvent::DeliveryScheduled {
                route_id: Uuid::new_v4(),
                vehicle_id: Uuid::new_v4(),
            },
            DeliveryEvent::DeliveryDispatched,
            DeliveryEvent::DeliveryCompleted,
        ];

        let mut raised = AggregateRoot::<Delivery>::new(id);
        for e in events.clone() {
            raised.raise(e);
        }

        let envelopes: Vec<EventEnvelope<Delivery>> = events
            .into_iter()
            .enumerate()
            .map(|(i, e)| EventEnvelope::new(id, i as i64, e))
            .collect();
        let replayed = AggregateRoot::<Delivery>::from_events(id, &envelopes);

        assert_eq!(replayed.state(), raised.state());
        assert_eq!(replayed.state().status(), DeliveryStatus::Completed);
    }
}
