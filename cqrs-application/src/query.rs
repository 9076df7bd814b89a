/// 应用层查询（Query）
///
/// 表达只读意图，不改变领域状态。
/// - 与 [`Command`](crate::command::Command) 相对，`Query` 应避免副作用；
/// - 结果实体类型在查询总线实例层面绑定（每种读模型一个总线实例），
///   查询本身只参数化读取条件。
pub trait Query: Send + Sync + 'static {
    /// 查询的稳定名称（建议常量字符串，不随重构变化）
    const NAME: &'static str;
}
