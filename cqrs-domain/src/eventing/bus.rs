//! 事件总线（EventBus）协议
//!
//! 定义按主题发布与订阅的统一抽象。发布以事件的聚合 ID 作为概念上的
//! 分区键，单聚合内的顺序在支持按键分区的代理上得以保持；
//! 订阅返回 'static 生命周期的事件流，便于在 tokio::spawn 中消费。
//!
use crate::{error::DomainResult as Result, persist::SerializedEvent};
use async_trait::async_trait;
use futures_core::stream::BoxStream;

/// 事件总线：负责按主题分发事件与订阅事件流
#[async_trait]
pub trait EventBus: Send + Sync {
    /// 将单个事件发布到指定主题；失败向调用方报告，绝不静默丢弃
    async fn publish(&self, topic: &str, event: &SerializedEvent) -> Result<()>;

    /// 返回指定主题上 'static 生命周期的事件流
    async fn subscribe(&self, topic: &str) -> BoxStream<'static, Result<SerializedEvent>>;
}
