/// 应用层上下文（Application Context）
///
/// 承载一次应用层调用（命令/查询）所需的横切信息：
/// - `correlation_id`：关联追踪，把多次调用归到同一业务操作；
/// - `causation_id`：因果链，标记触发本次调用的来源。
#[derive(Clone, Debug, Default)]
pub struct AppContext {
    /// 关联 ID（可选）
    pub correlation_id: Option<String>,
    /// 因果 ID（可选）
    pub causation_id: Option<String>,
}
