//! 聚合（Aggregate）抽象
//!
//! 约束一个聚合的核心行为：
//! - `execute` 将命令转换为事件（不改变状态）；
//! - `apply` 将事件投影到状态（改变状态）。
//!
//! `apply` 必须对该聚合的事件枚举做穷尽匹配：新增事件变体而缺少对应的
//! 状态变更规则时在编译期失败，而不是在运行时被静默忽略。
//!
use crate::domain_event::DomainEvent;
use std::error::Error;

/// 聚合接口
pub trait Aggregate: Default + Send + Sync {
    /// 聚合类型名（事件信封中的 `aggregate_type`）
    const TYPE: &'static str;

    /// 该聚合支持的命令类型
    type Command;
    /// 该聚合产生的领域事件类型
    type Event: DomainEvent;
    /// 命令执行环节的错误类型
    type Error: Error + Send + Sync + 'static;

    /// 执行命令，返回产生的事件列表
    fn execute(&self, command: Self::Command) -> Result<Vec<Self::Event>, Self::Error>;

    /// 应用事件，更新聚合状态
    fn apply(&mut self, event: &Self::Event);
}

#[cfg(test)]
mod tests {
    use super::Aggregate;
    use crate::domain_event::DomainEvent;
    use crate::error::DomainError;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, Default)]
    struct Counter {
        opened: bool,
        value: i64,
    }

    #[derive(Debug)]
    enum CounterCommand {
        Open,
        Add { amount: i64 },
        Sub { amount: i64 },
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(tag = "type")]
    enum CounterEvent {
        CounterOpened,
        CounterAdded { amount: i64 },
        CounterSubtracted { amount: i64 },
    }

    impl DomainEvent for CounterEvent {
        fn event_type(&self) -> &'static str {
            match self {
                CounterEvent::CounterOpened => "CounterOpened",
                CounterEvent::CounterAdded { .. } => "CounterAdded",
                CounterEvent::CounterSubtracted { .. } => "CounterSubtracted",
            }
        }
    }

    impl Aggregate for Counter {
        const TYPE: &'static str = "counter";
        type Command = CounterCommand;
        type Event = CounterEvent;
        type Error = DomainError;

        fn execute(&self, command: Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
            match command {
                CounterCommand::Open => {
                    if self.opened {
                        return Err(DomainError::InvalidState {
                            reason: "already opened".into(),
                        });
                    }
                    Ok(vec![CounterEvent::CounterOpened])
                }
                CounterCommand::Add { amount } => {
                    if amount <= 0 {
                        return Err(DomainError::InvalidCommand {
                            reason: "amount must be > 0".into(),
                        });
                    }
                    Ok(vec![CounterEvent::CounterAdded { amount }])
                }
                CounterCommand::Sub { amount } => {
                    if self.value < amount {
                        return Err(DomainError::InvalidState {
                            reason: "insufficient".into(),
                        });
                    }
                    Ok(vec![CounterEvent::CounterSubtracted { amount }])
                }
            }
        }

        fn apply(&mut self, event: &Self::Event) {
            match event {
                CounterEvent::CounterOpened => self.opened = true,
                CounterEvent::CounterAdded { amount } => self.value += amount,
                CounterEvent::CounterSubtracted { amount } => self.value -= amount,
            }
        }
    }

    #[test]
    fn execute_then_apply_updates_state() {
        let agg = Counter::default();
        let events = agg.execute(CounterCommand::Add { amount: 3 }).unwrap();
        assert_eq!(events, vec![CounterEvent::CounterAdded { amount: 3 }]);

        let mut agg2 = agg.clone();
        for e in &events {
            agg2.apply(e);
        }
        assert_eq!(agg2.value, 3);
    }

    #[test]
    fn invalid_commands_should_error() {
        let agg = Counter::default();
        let err = agg.execute(CounterCommand::Sub { amount: 1 }).unwrap_err();
        match err {
            DomainError::InvalidState { .. } => {}
            other => panic!("unexpected {other:?}"),
        }

        let err = agg.execute(CounterCommand::Add { amount: 0 }).unwrap_err();
        match err {
            DomainError::InvalidCommand { .. } => {}
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn event_type_matches_serde_discriminator() {
        let e = CounterEvent::CounterAdded { amount: 1 };
        let json = serde_json::to_value(&e).unwrap();
        assert_eq!(json["type"], e.event_type());
    }
}
