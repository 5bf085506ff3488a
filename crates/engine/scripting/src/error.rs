//! Error types for the scripting system

use scene::SceneError;
use thiserror::Error;

/// Result type for scripting operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the scripting host
#[derive(Error, Debug)]
pub enum Error {
    /// KDL parsing error
    #[error("KDL parse error: {0}")]
    KdlParse(#[from] kdl::KdlError),

    /// Lua error
    #[error("Lua error: {0}")]
    Lua(#[from] mlua::Error),

    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Scene graph error outside a script call
    #[error("Scene error: {0}")]
    Scene(#[from] SceneError),

    /// Script file not found
    #[error("Script not found: {0}")]
    ScriptNotFound(String),

    /// Error raised by script code inside a lifecycle hook
    #[error("Lua Runtime Error in {hook}: {message}")]
    ScriptRuntime { hook: &'static str, message: String },

    /// Invalid configuration value
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}

/// Errors raised into Lua by bound methods
///
/// Each bound call is its own failure domain: the error aborts that call and
/// is delivered through Lua's error mechanism, never as a Rust panic.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BindingError {
    /// Receiver handle is not of the kind the method belongs to
    #[error("type mismatch: expected {expected} handle, got {found}")]
    TypeMismatch {
        expected: &'static str,
        found: String,
    },

    /// Wrong arity, wrong argument type or index out of range
    #[error("bad argument to {method}: {message}")]
    Argument {
        method: &'static str,
        message: String,
    },

    /// Scene asset missing or corrupt
    #[error("asset load failure: {0}")]
    AssetLoad(SceneError),
}

impl BindingError {
    pub(crate) fn argument(method: &'static str, message: impl Into<String>) -> Self {
        BindingError::Argument {
            method,
            message: message.into(),
        }
    }
}

impl From<BindingError> for mlua::Error {
    fn from(err: BindingError) -> Self {
        mlua::Error::external(err)
    }
}
