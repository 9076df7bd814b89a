use crate::{
    context::AppContext, error::AppError, query::Query, query_bus::QueryBus,
    query_handler::QueryHandler, read_model::ReadModel,
};
use async_trait::async_trait;
use dashmap::DashMap;
use std::any::{Any, TypeId};
use std::future::Future;
use std::marker::PhantomData;
use std::pin::Pin;
use std::sync::Arc;

type BoxAnySend = Box<dyn Any + Send>;

type QueryHandlerFuture<'a, M> =
    Pin<Box<dyn Future<Output = Result<Vec<M>, AppError>> + Send + 'a>>;

type QueryHandlerFn<M> =
    Arc<dyn for<'a> Fn(BoxAnySend, &'a AppContext) -> QueryHandlerFuture<'a, M> + Send + Sync>;

/// 基于内存的 QueryBus 实现
/// - 按读模型实体类型 `M` 参数化，每种读模型一个实例、一张注册表
/// - 通过 TypeId 注册不同 Query 对应的 Handler，重复注册在装配期报错
/// - 以类型擦除方式调度，结果类型由实例参数保证，无需在调用端还原
pub struct InMemoryQueryBus<M>
where
    M: ReadModel,
{
    handlers: DashMap<TypeId, (&'static str, QueryHandlerFn<M>)>,
    _marker: PhantomData<fn() -> M>,
}

impl<M> Default for InMemoryQueryBus<M>
where
    M: ReadModel,
{
    fn default() -> Self {
        Self {
            handlers: DashMap::new(),
            _marker: PhantomData,
        }
    }
}

impl<M> InMemoryQueryBus<M>
where
    M: ReadModel,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册查询处理器；同一查询类型重复注册时报错且不覆盖首个处理器
    pub fn register<Q, H>(&self, handler: Arc<H>) -> Result<(), AppError>
    where
        Q: Query,
        H: QueryHandler<Q, M> + Send + Sync + 'static,
    {
        let key = TypeId::of::<Q>();

        if self.handlers.contains_key(&key) {
            return Err(AppError::AlreadyRegisteredQuery { query: Q::NAME });
        }

        let f: QueryHandlerFn<M> = {
            let handler = handler.clone();

            Arc::new(move |boxed_q, ctx| {
                let handler = handler.clone();

                Box::pin(async move {
                    match boxed_q.downcast::<Q>() {
                        Ok(q) => handler.handle(ctx, *q).await,
                        Err(_) => Err(AppError::TypeMismatch {
                            expected: Q::NAME,
                            found: "unknown",
                        }),
                    }
                })
            })
        };

        self.handlers.insert(key, (Q::NAME, f));

        Ok(())
    }

    /// 获取已注册的查询类型名列表（只读视图）
    pub fn registered_queries(&self) -> Vec<&'static str> {
        self.handlers.iter().map(|e| e.value().0).collect()
    }
}

#[async_trait]
impl<M> QueryBus<M> for InMemoryQueryBus<M>
where
    M: ReadModel,
{
    async fn dispatch<Q>(&self, ctx: &AppContext, query: Q) -> Result<Vec<M>, AppError>
    where
        Q: Query,
    {
        let Some((_name, f)) = self.handlers.get(&TypeId::of::<Q>()).map(|h| h.clone()) else {
            return Err(AppError::HandlerNotFound(Q::NAME));
        };

        (f)(Box::new(query), ctx).await
    }
}
