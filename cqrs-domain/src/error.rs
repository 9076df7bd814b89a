//! 领域层统一错误定义
//!
//! 聚焦序列化、并发冲突、事件流查询与事件传播等最小必要集合，
//! 便于在各实现层统一转换为 `DomainError`。
//!
use thiserror::Error;
use uuid::Uuid;

/// 统一错误类型（引擎最小必要集）
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum DomainError {
    // --- 序列化 ---
    #[error("serialization error: {source}")]
    Serde {
        #[from]
        source: serde_json::Error,
    },

    // --- 事件存储 ---
    #[error("version conflict: aggregate={aggregate_id}, expected={expected}, actual={actual}")]
    VersionConflict {
        aggregate_id: Uuid,
        expected: i64,
        actual: i64,
    },
    #[error("duplicate version: aggregate={aggregate_id}, version={version}")]
    DuplicateVersion { aggregate_id: Uuid, version: i64 },
    #[error("stream not found: aggregate={aggregate_id}")]
    StreamNotFound { aggregate_id: Uuid },
    #[error("event repository error: {reason}")]
    Repository { reason: String },

    // --- 事件传播 ---
    #[error("event bus error: {reason}")]
    EventBus { reason: String },
    #[error("event handler error: handler={handler}, reason={reason}")]
    EventHandler { handler: String, reason: String },

    // --- 领域规则/命令与状态 ---
    #[error("invalid command: {reason}")]
    InvalidCommand { reason: String },
    #[error("invalid state: {reason}")]
    InvalidState { reason: String },
}

impl DomainError {
    /// 判断是否属于并发写冲突（包含唯一键兜底的重复版本）
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            DomainError::VersionConflict { .. } | DomainError::DuplicateVersion { .. }
        )
    }
}

/// 统一 Result 类型别名
pub type DomainResult<T> = Result<T, DomainError>;
