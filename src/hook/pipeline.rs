// Staged pipeline runner. Drives an ordered plugin list through one
// stage; the await on each handler is the suspend/resume boundary, so a
// handler that never resolves stalls the whole call.

use std::sync::Arc;
use tracing::{debug, trace};

use crate::config::config;
use crate::hook::context::OperationContext;
use crate::hook::registration::HookRegistration;

/// Pipeline stage: `Pre` runs before the driver call, `Post` after its
/// asynchronous completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookStage {
    Pre,
    Post,
}

impl HookStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            HookStage::Pre => "pre",
            HookStage::Post => "post",
        }
    }
}

/// Marker returned once every plugin has been driven through a stage.
/// The interceptor treats it as the license to splice the post stage
/// into the caller's completion.
#[derive(Debug, Clone, Copy)]
pub struct PipelineComplete;

/// Run one stage over the plugin list, in order. Plugins without a
/// handler for the stage are immediate no-ops. There is no error
/// short-circuit at this layer.
pub async fn run_stage(
    plugins: &[Arc<HookRegistration>],
    stage: HookStage,
    ctx: &mut OperationContext,
) -> PipelineComplete {
    debug!(
        "Running {} stage with {} plugins for {}.{}",
        stage.as_str(),
        plugins.len(),
        ctx.target_name(),
        ctx.kind.method_name()
    );

    for plugin in plugins {
        let handler = match stage {
            HookStage::Pre => &plugin.pre,
            HookStage::Post => &plugin.post,
        };

        match handler {
            Some(handler) => {
                if config().trace.handlers {
                    trace!(
                        "Plugin {:?} handling {} stage",
                        plugin.name.as_deref().unwrap_or("<unnamed>"),
                        stage.as_str()
                    );
                }
                handler.handle(ctx).await;
            }
            None => {
                if config().trace.handlers {
                    trace!(
                        "Plugin {:?} has no {} handler, skipped",
                        plugin.name.as_deref().unwrap_or("<unnamed>"),
                        stage.as_str()
                    );
                }
            }
        }
    }

    PipelineComplete
}
