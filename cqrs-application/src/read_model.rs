use serde::Serialize;

/// 读模型实体（Read Model）
///
/// - 查询总线返回的结果实体，由投影折叠事件而成；
/// - 面向接口/外部系统序列化友好，与领域模型解耦；
/// - 应保持只读特性与简洁结构。
pub trait ReadModel: Serialize + Send + Sync + 'static {}
