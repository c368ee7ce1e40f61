use lcommon::BoxFuture;

use crate::{BoxedEventStream, ModelError, ModelRequest};

pub type ModelFuture<'a, T> = BoxFuture<'a, T>;

/// A language-model client. One `stream` call is one round trip: the model
/// either answers directly or ends the round by requesting tools.
pub trait ModelClient: Send + Sync {
    fn name(&self) -> &str;

    fn stream<'a>(
        &'a self,
        request: ModelRequest,
    ) -> ModelFuture<'a, Result<BoxedEventStream<'a>, ModelError>>;
}
