//! 聚合根（AggregateRoot）
//!
//! 维护聚合的标识、已持久化版本与未提交事件列表，并提供状态变更的
//! 两条唯一路径：
//! - `raise`：业务决策产生的新事件，先应用到状态、再进入未提交列表；
//! - `replay`：按给定顺序纯重建状态，绝不进入未提交列表。
//!
//! 未提交事件由聚合根独占持有，保存路径通过 `take_changes` 将其
//! 移出（move 而非 copy）；提交之后未提交列表恒为空。
//!
use crate::{aggregate::Aggregate, domain_event::EventEnvelope, value_object::Version};
use uuid::Uuid;

/// 聚合根：聚合状态 + 标识 + 版本 + 未提交事件
pub struct AggregateRoot<A>
where
    A: Aggregate,
{
    id: Uuid,
    state: A,
    version: Version,
    changes: Vec<A::Event>,
}

impl<A> AggregateRoot<A>
where
    A: Aggregate,
{
    /// 创建全新聚合（从未持久化，版本为 `Version::NEW`）
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            state: A::default(),
            version: Version::NEW,
            changes: Vec::new(),
        }
    }

    /// 通过重放完整事件流重建聚合。
    ///
    /// 调用方负责事先按版本升序排列事件；重建后版本为最后一个事件的版本。
    pub fn from_events(id: Uuid, envelopes: &[EventEnvelope<A>]) -> Self {
        let mut root = Self::new(id);
        root.replay(envelopes);
        root
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// 已持久化版本（未提交事件不计入）
    pub fn version(&self) -> Version {
        self.version
    }

    /// 聚合当前状态（只读）
    pub fn state(&self) -> &A {
        &self.state
    }

    /// 应用新事件并记录为未提交变更。
    ///
    /// 业务决策改变聚合状态的唯一入口。
    pub fn raise(&mut self, event: A::Event) {
        self.state.apply(&event);
        self.changes.push(event);
    }

    /// 按给定顺序应用历史事件，仅用于状态重建，不记录未提交变更
    pub fn replay(&mut self, envelopes: &[EventEnvelope<A>]) {
        for envelope in envelopes {
            self.state.apply(&envelope.payload);
            self.version = Version::from_value(envelope.metadata.version());
        }
    }

    /// 执行命令：`execute` 产生事件，逐个 `raise` 应用
    pub fn handle(&mut self, command: A::Command) -> Result<(), A::Error> {
        let events = self.state.execute(command)?;
        for event in events {
            self.raise(event);
        }
        Ok(())
    }

    /// 未提交变更（只读视图，保存路径使用）
    pub fn uncommitted_changes(&self) -> &[A::Event] {
        &self.changes
    }

    /// 移出全部未提交变更；之后未提交列表为空
    pub fn take_changes(&mut self) -> Vec<A::Event> {
        std::mem::take(&mut self.changes)
    }

    /// 提交成功后由事件存储回写最新持久化版本
    pub(crate) fn set_version(&mut self, version: Version) {
        self.version = version;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain_event::DomainEvent;
    use crate::error::DomainError;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, PartialEq, Default)]
    struct Light {
        on: bool,
        toggles: u32,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(tag = "type")]
    enum LightEvent {
        SwitchedOn,
        SwitchedOff,
    }

    impl DomainEvent for LightEvent {
        fn event_type(&self) -> &'static str {
            match self {
                LightEvent::SwitchedOn => "SwitchedOn",
                LightEvent::SwitchedOff => "SwitchedOff",
            }
        }
    }

    impl Aggregate for Light {
        const TYPE: &'static str = "light";
        type Command = bool;
        type Event = LightEvent;
        type Error = DomainError;

        fn execute(&self, on: bool) -> Result<Vec<LightEvent>, DomainError> {
            if on == self.on {
                return Err(DomainError::InvalidState {
                    reason: "no-op toggle".into(),
                });
            }
            Ok(vec![if on {
                LightEvent::SwitchedOn
            } else {
                LightEvent::SwitchedOff
            }])
        }

        fn apply(&mut self, event: &LightEvent) {
            match event {
                LightEvent::SwitchedOn => self.on = true,
                LightEvent::SwitchedOff => self.on = false,
            }
            self.toggles += 1;
        }
    }

    #[test]
    fn raise_applies_and_tracks_changes() {
        let mut root = AggregateRoot::<Light>::new(Uuid::new_v4());
        root.raise(LightEvent::SwitchedOn);
        assert!(root.state().on);
        assert_eq!(root.uncommitted_changes().len(), 1);
        // raise 不改变已持久化版本
        assert_eq!(root.version(), Version::NEW);
    }

    #[test]
    fn replay_matches_raised_state_and_keeps_changes_empty() {
        let id = Uuid::new_v4();

        // 原始路径：逐个 raise
        let mut raised = AggregateRoot::<Light>::new(id);
        raised.raise(LightEvent::SwitchedOn);
        raised.raise(LightEvent::SwitchedOff);
        raised.raise(LightEvent::SwitchedOn);

        // 重放路径：相同顺序的历史事件
        let envelopes: Vec<EventEnvelope<Light>> = [
            LightEvent::SwitchedOn,
            LightEvent::SwitchedOff,
            LightEvent::SwitchedOn,
        ]
        .into_iter()
        .enumerate()
        .map(|(i, e)| EventEnvelope::new(id, i as i64, e))
        .collect();
        let replayed = AggregateRoot::<Light>::from_events(id, &envelopes);

        assert_eq!(replayed.state(), raised.state());
        assert!(replayed.uncommitted_changes().is_empty());
        assert_eq!(replayed.version(), Version::from_value(2));
    }

    #[test]
    fn handle_raises_all_produced_events() {
        let mut root = AggregateRoot::<Light>::new(Uuid::new_v4());
        root.handle(true).unwrap();
        assert!(root.state().on);
        assert_eq!(root.uncommitted_changes().len(), 1);

        let err = root.handle(true).unwrap_err();
        match err {
            DomainError::InvalidState { .. } => {}
            other => panic!("unexpected {other:?}"),
        }
        // 失败的命令不产生变更
        assert_eq!(root.uncommitted_changes().len(), 1);
    }

    #[test]
    fn take_changes_moves_and_clears() {
        let mut root = AggregateRoot::<Light>::new(Uuid::new_v4());
        root.raise(LightEvent::SwitchedOn);
        root.raise(LightEvent::SwitchedOff);

        let taken = root.take_changes();
        assert_eq!(taken.len(), 2);
        assert!(root.uncommitted_changes().is_empty());
    }
}
