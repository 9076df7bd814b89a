//! 投影事件处理器（EventHandler）
//!
//! 读侧投影存储协作方的契约：每个已识别事件变体一次调用，处理器对
//! 持久化读模型做幂等的 upsert/update。消费侧按消息至多一次应用，
//! 消费者在未提交位点重启时可能重复投递，处理器必须容忍重复。
//!
use crate::domain_event::{DomainEvent, Metadata};
use async_trait::async_trait;

/// 事件处理器：处理某一限界域的已解码事件
#[async_trait]
pub trait EventHandler<E>: Send + Sync
where
    E: DomainEvent,
{
    /// 处理器名称（用于失败日志与审计）
    fn handler_name(&self) -> &str;

    /// 处理事件，更新投影存储
    async fn handle(&self, event: &E, metadata: &Metadata) -> anyhow::Result<()>;
}
