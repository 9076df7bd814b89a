/// 应用层命令（Command）
///
/// 表达"意图"的写操作请求，通常会修改领域状态。
/// - 携带目标聚合 ID 与领域字段，分发后不可变；
/// - 不返回业务数据，仅表达执行结果（成功/失败）；
/// - 建议保持语义化的"动宾结构"命名，如 `CreateRoute`、`AssignVehicle`。
///
/// 关联常量：
/// - `NAME`：命令的稳定名称，用于日志与错误报告。避免依赖 `type_name::<T>()`。
pub trait Command: Send + Sync + 'static {
    /// 命令的稳定名称（建议常量字符串，不随重构变化）
    const NAME: &'static str;
}
