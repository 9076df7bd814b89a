//! 值对象（Value Object）
//!
//! 无标识、以值相等为准的对象，用于封装不可变的概念性值。
//!
use serde::{Deserialize, Serialize};
use std::fmt;

/// 聚合版本号（用于乐观锁和并发控制）
///
/// 提供类型安全的版本号操作，避免直接使用 i64 导致的语义不明确问题。
/// 从未持久化的聚合版本为 `Version::NEW`（-1）；首次提交产生版本 0，
/// 同一事件流内版本连续递增、无空洞。
///
/// # 示例
///
/// ```
/// use cqrs_domain::value_object::Version;
///
/// let v = Version::NEW;
/// assert_eq!(v.value(), -1);
/// assert!(v.is_new());
///
/// let v0 = v.next();
/// assert_eq!(v0.value(), 0);
/// assert!(!v0.is_new());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Version(i64);

impl Version {
    /// 从未持久化的聚合所处的版本
    pub const NEW: Version = Version(-1);

    /// 从值创建版本号
    pub const fn from_value(value: i64) -> Self {
        Self(value)
    }

    /// 获取下一个版本号
    pub const fn next(&self) -> Self {
        Self(self.0 + 1)
    }

    /// 获取版本号的值
    pub const fn value(&self) -> i64 {
        self.0
    }

    /// 检查聚合是否从未持久化
    pub const fn is_new(&self) -> bool {
        self.0 < 0
    }
}

impl Default for Version {
    fn default() -> Self {
        Self::NEW
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

impl From<i64> for Version {
    fn from(value: i64) -> Self {
        Self::from_value(value)
    }
}

impl From<Version> for i64 {
    fn from(version: Version) -> Self {
        version.value()
    }
}
