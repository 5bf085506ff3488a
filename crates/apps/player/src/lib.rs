//! Headless player for Lua-scripted scenes
//!
//! - [`PlayerArgs`]: command line flags layered over the KDL config
//! - [`Runner`]: drives `Start`/`Update`/`End` and per-frame propagation

pub mod cli;
mod runner;

pub use cli::PlayerArgs;
pub use runner::{RunSummary, Runner};
