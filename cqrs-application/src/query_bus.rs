use crate::{context::AppContext, error::AppError, query::Query, read_model::ReadModel};
use async_trait::async_trait;

/// 查询总线（Query Bus）
///
/// - 负责根据查询的具体类型路由到对应的处理器；
/// - 按读模型实体类型 `M` 参数化：系统内每种读模型对应一个独立的
///   总线实例，各自持有互不重叠的注册表；
/// - 对外恒返回有序结果列表，空结果为 `vec![]` 而非缺省值。
#[async_trait]
pub trait QueryBus<M>: Send + Sync
where
    M: ReadModel,
{
    /// 分发查询到对应处理器，返回该查询的结果实体列表
    async fn dispatch<Q>(&self, ctx: &AppContext, query: Q) -> Result<Vec<M>, AppError>
    where
        Q: Query;
}
