pub mod config;
pub mod error;
pub mod hook;
pub mod store;

pub use error::HookError;
pub use hook::args::{CallArg, Completion, CompletionArgs, ResponseScope};
pub use hook::context::OperationContext;
pub use hook::interceptor::{HookedCollection, HookedStore};
pub use hook::kind::OperationKind;
pub use hook::model::{EntityDef, Model};
pub use hook::pipeline::{run_stage, HookStage, PipelineComplete};
pub use hook::registration::{handler_fn, HookConfig, HookHandler, HookRegistration};
pub use hook::registry::{HookRegistry, TargetHooks};
pub use store::{RawCollection, StoreHandle};

/// Register a plugin on the process-wide registry. Equivalent to
/// `HookRegistry::global().register(entity, config)`.
pub fn register(entity: &EntityDef, config: HookConfig) -> Result<(), HookError> {
    HookRegistry::global().register(entity, config)
}
