use futures::future::BoxFuture;
use serde_json::Value;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Raw completion argument list, conventional order `[error, data, stats]`.
pub type CompletionArgs = Vec<Value>;

/// The receiver the driver completed on. Opaque to this crate; handlers
/// that know the driver can downcast it.
pub type ResponseScope = Arc<dyn Any + Send + Sync>;

/// An asynchronous continuation passed as a positional argument.
///
/// Drivers await the returned future, so everything the continuation
/// chains (including the post stage when one is spliced in) resolves
/// before the driver-side call does.
#[derive(Clone)]
pub struct Completion(
    Arc<dyn Fn(ResponseScope, CompletionArgs) -> BoxFuture<'static, ()> + Send + Sync>,
);

impl Completion {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(ResponseScope, CompletionArgs) -> BoxFuture<'static, ()> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Wrap a synchronous closure as a completion.
    pub fn sync<F>(f: F) -> Self
    where
        F: Fn(ResponseScope, CompletionArgs) + Send + Sync + 'static,
    {
        Self::new(move |scope, args| {
            f(scope, args);
            Box::pin(futures::future::ready(()))
        })
    }

    pub async fn invoke(&self, scope: ResponseScope, args: CompletionArgs) {
        (self.0)(scope, args).await
    }
}

impl fmt::Debug for Completion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Completion")
    }
}

/// One positional argument of an intercepted call.
#[derive(Debug, Clone)]
pub enum CallArg {
    Value(Value),
    Callback(Completion),
}

impl CallArg {
    pub fn is_callback(&self) -> bool {
        matches!(self, CallArg::Callback(_))
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            CallArg::Value(value) => Some(value),
            CallArg::Callback(_) => None,
        }
    }

    pub fn as_value_mut(&mut self) -> Option<&mut Value> {
        match self {
            CallArg::Value(value) => Some(value),
            CallArg::Callback(_) => None,
        }
    }

    pub fn as_callback(&self) -> Option<&Completion> {
        match self {
            CallArg::Value(_) => None,
            CallArg::Callback(callback) => Some(callback),
        }
    }
}

impl From<Value> for CallArg {
    fn from(value: Value) -> Self {
        CallArg::Value(value)
    }
}

impl From<Completion> for CallArg {
    fn from(callback: Completion) -> Self {
        CallArg::Callback(callback)
    }
}
