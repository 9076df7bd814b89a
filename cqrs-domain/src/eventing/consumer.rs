//! 事件消费者（EventConsumer）
//!
//! 单主题的长驻订阅循环：
//! - 按载荷中的 `type` 判别符多态解码事件，未识别的判别符记日志并跳过，
//!   绝不强制转换为默认类型；
//! - 解码成功的事件逐个交给投影处理器；处理器失败记日志后继续，
//!   不自动重试该消息，一条毒消息不能中断整个订阅；
//! - 通过 `CancellationToken` 协作取消：取消后不再拉取新消息，
//!   在途的处理器调用完成后任务退出。
//!
use crate::domain_event::{DomainEvent, Metadata};
use crate::eventing::{EventBus, EventHandler};
use crate::persist::SerializedEvent;
use futures_util::StreamExt;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// 单主题消费者：订阅 → 解码 → 分发到投影处理器
pub struct EventConsumer<E>
where
    E: DomainEvent,
{
    bus: Arc<dyn EventBus>,
    topic: String,
    handlers: Vec<Arc<dyn EventHandler<E>>>,
}

impl<E> EventConsumer<E>
where
    E: DomainEvent,
{
    pub fn new(
        bus: Arc<dyn EventBus>,
        topic: impl Into<String>,
        handlers: Vec<Arc<dyn EventHandler<E>>>,
    ) -> Self {
        Self {
            bus,
            topic: topic.into(),
            handlers,
        }
    }

    /// 启动消费循环，返回可用于关闭/等待的句柄
    pub fn start(self) -> ConsumerHandle {
        let token = CancellationToken::new();
        let task = tokio::spawn(self.run(token.clone()));
        ConsumerHandle {
            token,
            task: Some(task),
        }
    }

    async fn run(self, token: CancellationToken) {
        let mut stream = self.bus.subscribe(&self.topic).await;

        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                maybe_event = stream.next() => {
                    match maybe_event {
                        Some(Ok(event)) => self.dispatch(&event).await,
                        Some(Err(err)) => {
                            tracing::warn!(topic = %self.topic, error = %err, "event stream error");
                        }
                        None => break,
                    }
                }
            }
        }
    }

    async fn dispatch(&self, record: &SerializedEvent) {
        let event: E = match serde_json::from_value(record.payload().clone()) {
            Ok(event) => event,
            Err(err) => {
                tracing::warn!(
                    topic = %self.topic,
                    event_type = %record.event_type(),
                    error = %err,
                    "failed to decode event, skipping"
                );
                return;
            }
        };

        let metadata = Metadata::builder()
            .aggregate_id(record.aggregate_id())
            .aggregate_type(record.aggregate_type().to_string())
            .version(record.version())
            .occurred_at(record.occurred_at())
            .build();

        for handler in &self.handlers {
            if let Err(err) = handler.handle(&event, &metadata).await {
                tracing::warn!(
                    topic = %self.topic,
                    handler = %handler.handler_name(),
                    event_type = %record.event_type(),
                    error = %err,
                    "projection handler failed, skipping message"
                );
            }
        }
    }
}

/// 消费者运行句柄：用于优雅关闭与等待任务结束
pub struct ConsumerHandle {
    token: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl ConsumerHandle {
    /// 停止拉取新消息；在途处理完成后任务退出
    pub fn shutdown(&self) {
        self.token.cancel();
    }

    /// 等待消费任务结束
    pub async fn join(mut self) {
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for ConsumerHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
