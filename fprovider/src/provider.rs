//! Model provider contract implemented by concrete vendor adapters.

use fcommon::BoxFuture;

use crate::{
    BoxedEventStream, ModelRequest, ModelResponse, ProviderError, ProviderId, VecEventStream,
};

pub type ProviderFuture<'a, T> = BoxFuture<'a, T>;

pub trait ModelProvider: Send + Sync {
    fn id(&self) -> ProviderId;

    fn complete<'a>(
        &'a self,
        request: ModelRequest,
    ) -> ProviderFuture<'a, Result<ModelResponse, ProviderError>>;

    /// Adapters without native streaming replay the completed response.
    fn stream<'a>(
        &'a self,
        request: ModelRequest,
    ) -> ProviderFuture<'a, Result<BoxedEventStream<'a>, ProviderError>> {
        Box::pin(async move {
            let response = self.complete(request).await?;
            Ok(Box::pin(VecEventStream::replay(response)) as BoxedEventStream<'a>)
        })
    }
}
