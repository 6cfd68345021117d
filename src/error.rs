use thiserror::Error;

/// Errors from the registration and bootstrap surface.
///
/// Operation failures never appear here: the driver reports them through
/// the error slot of the completion arguments, and the pipeline forwards
/// them to the caller unchanged.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HookError {
    #[error("Registration error: a target store handle is required")]
    MissingTarget,

    #[error("Unknown collection method: {0}")]
    UnknownMethod(String),
}
