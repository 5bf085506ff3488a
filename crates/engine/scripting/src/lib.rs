//! Lua scripting bridge for the scene graph
//!
//! This crate provides:
//! - **ScriptHost**: Lua VM wrapper with `LoadScene`, lifecycle hooks and hot reload
//! - **Handles**: `Scene` and `Node` userdata with checked method dispatch
//! - **PropertyRegistry**: one persistent Lua table per node identity
//! - **EngineConfig**: KDL configuration for running a script
//!
//! # Example
//!
//! ```rust,ignore
//! use scripting::{EngineConfig, Hook, ScriptHost};
//! use scene::GltfLoader;
//!
//! let config = EngineConfig::from_file("engine.kdl")?;
//! let host = ScriptHost::new(GltfLoader::new(&config.assets))?;
//! host.load_script(config.script.as_deref().unwrap())?;
//!
//! host.call_hook(Hook::Start, 0.0);
//! for _ in 0..config.frames {
//!     host.call_hook(Hook::Update, config.frame_time);
//!     host.propagate_transforms();
//! }
//! host.call_hook(Hook::End, 0.0);
//! ```

mod config;
mod convention;
mod error;
mod handles;
mod host;
mod property_table;

pub use config::EngineConfig;
pub use convention::{
    lua_value_to_f64, lua_value_to_integer, native_to_script_index, script_to_native_index,
};
pub use error::{BindingError, Error, Result};
pub use handles::{HandleKind, NodeHandle, SceneHandle};
pub use host::{Hook, HookOutcome, Script, ScriptHost};
pub use property_table::{NodeKey, PropertyRegistry, SharedRegistry};

// Re-export mlua for downstream crates
pub use mlua;
