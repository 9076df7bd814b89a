use crate::{context::AppContext, error::AppError, query::Query, read_model::ReadModel};
use async_trait::async_trait;

#[async_trait]
pub trait QueryHandler<Q, M>: Send + Sync
where
    Q: Query,
    M: ReadModel,
{
    /// 返回有序结果列表；无匹配时为空列表，绝非 null
    async fn handle(&self, ctx: &AppContext, query: Q) -> Result<Vec<M>, AppError>;
}
