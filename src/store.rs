// External collaborator traits - the driver handles this crate wraps.
// No implementation ships here; callers bring their own storage driver.

use async_trait::async_trait;
use std::sync::Arc;

use crate::hook::args::CallArg;
use crate::hook::kind::OperationKind;

/// A physical collection handle exposed by the underlying driver.
///
/// The driver resolves `kind` to its own method, consumes the positional
/// arguments, and when the operation completes invokes the trailing
/// `CallArg::Callback` (if any) with `[error, data, stats]`. The call
/// itself resolves once the operation and its completion chain are done.
#[async_trait]
pub trait RawCollection: Send + Sync {
    /// Collection name; target identity for plugin resolution.
    fn name(&self) -> &str;

    async fn call(&self, kind: OperationKind, args: Vec<CallArg>);
}

/// The host object the bootstrap patches: a connection-like handle that
/// owns collections. `id` must be stable for the process lifetime; it
/// keys the patch-once guard.
pub trait StoreHandle: Send + Sync {
    fn id(&self) -> &str;

    fn collection(&self, name: &str) -> Option<Arc<dyn RawCollection>>;
}
