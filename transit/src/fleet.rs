//! 车队（fleet）限界域
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

/// 车队域的唯一主题名
pub const FLEET_TOPIC: &str = "transit.fleet.events";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum VehicleEvent {
    VehicleRegistered { plate: String },
    VehicleAssigned { route_id: Uuid },
    VehicleUnassigned,
}

impl DomainEvent for VehicleEvent {
    fn event_type(&self) -> &'static str {
        match self {
            VehicleEvent::VehicleRegistered { .. } => "VehicleRegistered",
            VehicleEvent::VehicleAssigned { .. } => "VehicleAssigned",
            VehicleEvent::VehicleUnassigned => "VehicleUnassigned",
        }
    }
}

#[derive(Debug)]
pub enum VehicleCommand {
    Register { plate: String },
    Assign { route_id: Uuid },
    Unassign,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Vehicle {
    registered: bool,
    plate: String,
    assigned_route: Option<Uuid>,
}

impl Vehicle {
    pub fn plate(&self) -> &str {
        &self.plate
    }

    pub fn assigned_route(&self) -> Option<Uuid> {
        self.assigned_route
    }
}

impl Aggregate for Vehicle {
    const TYPE: &'static str = "vehicle";
    type Command = VehicleCommand;
    type Event = VehicleEvent;
    type Error = DomainError;

    fn execute(&self, command: VehicleCommand) -> Result<Vec<VehicleEvent>, DomainError> {
        match command {
            VehicleCommand::Register { plate } => {
                if self.registered {
                    return Err(DomainError::InvalidState {
                        reason: "vehicle already registered".into(),
                    });
                }
                if plate.is_empty() {
                    return Err(DomainError::InvalidCommand {
                        reason: "plate must be non-empty".into(),
                    });
                }
                Ok(vec![VehicleEvent::VehicleRegistered { plate }])
            }
            VehicleCommand::Assign { route_id } => {
                if !self.registered {
                    return Err(DomainError::InvalidState {
                        reason: "vehicle not registered".into(),
                    });
                }
                if self.assigned_route.is_some() {
                    return Err(DomainError::InvalidState {
                        reason: "vehicle already assigned".into(),
                    });
                }
                Ok(vec![VehicleEvent::VehicleAssigned { route_id }])
            }
            VehicleCommand::Unassign => {
                if self.assigned_route.is_none() {
                    return Err(DomainError::InvalidState {
                        reason: "vehicle not assigned".into(),
                    });
                }
                Ok(vec![VehicleEvent::VehicleUnassigned])
            }
        }
    }

    fn apply(&mut self, event: &VehicleEvent) {
        match event {
            VehicleEvent::VehicleRegistered { plate } => {
                self.registered = true;
                self.plate = plate.clone();
            }
            VehicleEvent::VehicleAssigned { route_id } => {
                self.assigned_route = Some(*route_id);
            }
            VehicleEvent::VehicleUnassigned => {
                self.assigned_route = None;
            }
        }
    }
}

// ---- 命令 ----

#[derive(Debug)]
pub struct RegisterVehicle {
    pub vehicle_id: Uuid,
    pub plate: String,
}

impl Command for RegisterVehicle {
    const NAME: &'static str = "RegisterVehicle";
}

#[derive(Debug)]
pub struct AssignVehicle {
    pub vehicle_id: Uuid,
    pub route_id: Uuid,
}

impl Command for AssignVehicle {
    const NAME: &'static str = "AssignVehicle";
}

#[derive(Debug)]
pub struct UnassignVehicle {
    pub vehicle_id: Uuid,
}

impl Command for UnassignVehicle {
    const NAME: &'static str = "UnassignVehicle";
}

pub struct FleetCommandHandler<R>
where
    R: EventRepository,
{
    store: Arc<EventStore<R>>,
}

impl<R> FleetCommandHandler<R>
where
    R: EventRepository,
{
    pub fn new(store: Arc<EventStore<R>>) -> Self {
        Self { store }
    }

    async fn load(&self, vehicle_id: Uuid) -> Result<cqrs_domain::aggregate_root::AggregateRoot<Vehicle>, AppError> {
        self.store
            .load::<Vehicle>(vehicle_id)
            .await
            .map_err(|err| match err {
                DomainError::StreamNotFound { .. } => {
                    AppError::AggregateNotFound(vehicle_id.to_string())
                }
                other => AppError::Domain(other),
            })
    }
}

#[async_trait]
impl<R> CommandHandler<RegisterVehicle> for FleetCommandHandler<R>
where
    R: EventRepository + 'static,
{
    async fn handle(&self, _ctx: &AppContext, cmd: RegisterVehicle) -> Result<(), AppError> {
        let mut root = self.store.load_or_new::<Vehicle>(cmd.vehicle_id).await?;
        root.handle(VehicleCommand::Register { plate: cmd.plate })?;
        self.store.save(&mut root).await?;
        Ok(())
    }
}

#[async_trait]
impl<R> CommandHandler<AssignVehicle> for FleetCommandHandler<R>
where
    R: EventRepository + 'static,
{
    async fn handle(&self, _ctx: &AppContext, cmd: AssignVehicle) -> Result<(), AppError> {
        let mut root = self.load(cmd.vehicle_id).await?;
        root.handle(VehicleCommand::Assign {
            route_id: cmd.route_id,
        })?;
        self.store.save(&mut root).await?;
        Ok(())
    }
}

#[async_trait]
impl<R> CommandHandler<UnassignVehicle> for FleetCommandHandler<R>
where
    R: EventRepository + 'static,
{
    async fn handle(&self, _ctx: &AppContext, cmd: UnassignVehicle) -> Result<(), AppError> {
        let mut root = self.load(cmd.vehicle_id).await?;
        root.handle(VehicleCommand::Unassign)?;
        self.store.save(&mut root).await?;
        Ok(())
    }
}
