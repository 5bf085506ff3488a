//! KDL engine configuration
//!
//! # Example
//!
//! ```kdl
//! script "game.lua"
//! assets "Assets"
//! frames 10
//! frame-time 0.016
//! ```
//!
//! Each setting is a top-level node whose first argument is the value.
//! Relative paths in a file are resolved against the file's directory.
//! Unknown nodes are ignored.

use crate::{Error, Result};
use std::path::{Path, PathBuf};

/// Settings for running a script against the scene graph
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Lua script providing the lifecycle hooks
    pub script: Option<PathBuf>,
    /// Root directory `LoadScene` paths are resolved against
    pub assets: PathBuf,
    /// Number of update frames to run
    pub frames: u64,
    /// Delta time passed to `Update`, in seconds
    pub frame_time: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            script: None,
            assets: PathBuf::from("."),
            frames: 10,
            frame_time: 0.016,
        }
    }
}

impl EngineConfig {
    /// Parse a KDL file into an EngineConfig
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        Self::from_string_with_source(&content, path.parent())
    }

    /// Parse a KDL string into an EngineConfig
    pub fn from_string(content: &str) -> Result<Self> {
        Self::from_string_with_source(content, None)
    }

    fn from_string_with_source(content: &str, base: Option<&Path>) -> Result<Self> {
        let doc: kdl::KdlDocument = content.parse()?;
        let mut config = Self::default();

        for node in doc.nodes() {
            let name = node.name().value();
            match name {
                "script" => config.script = Some(Self::path(node, base)?),
                "assets" => config.assets = Self::path(node, base)?,
                "frames" => {
                    let frames = Self::integer(node)?;
                    config.frames = u64::try_from(frames).map_err(|_| {
                        Error::InvalidConfig(format!("frames must be non-negative, got {}", frames))
                    })?;
                }
                "frame-time" => config.frame_time = Self::float(node)? as f32,
                other => tracing::debug!("Ignoring unknown config node {}", other),
            }
        }

        Ok(config)
    }

    /// First positional argument of a node
    fn argument(node: &kdl::KdlNode) -> Result<&kdl::KdlValue> {
        node.entries()
            .iter()
            .find(|e| e.name().is_none())
            .map(|e| e.value())
            .ok_or_else(|| Error::InvalidConfig(format!("{} needs a value", node.name().value())))
    }

    fn path(node: &kdl::KdlNode, base: Option<&Path>) -> Result<PathBuf> {
        match Self::argument(node)? {
            kdl::KdlValue::String(s) => {
                let path = PathBuf::from(s);
                Ok(match base {
                    Some(base) if path.is_relative() => base.join(path),
                    _ => path,
                })
            }
            other => Err(Self::type_error(node, "string", other)),
        }
    }

    fn integer(node: &kdl::KdlNode) -> Result<i128> {
        match Self::argument(node)? {
            kdl::KdlValue::Integer(i) => Ok(*i),
            other => Err(Self::type_error(node, "integer", other)),
        }
    }

    fn float(node: &kdl::KdlNode) -> Result<f64> {
        match Self::argument(node)? {
            kdl::KdlValue::Float(f) => Ok(*f),
            kdl::KdlValue::Integer(i) => Ok(*i as f64),
            other => Err(Self::type_error(node, "number", other)),
        }
    }

    fn type_error(node: &kdl::KdlNode, expected: &str, actual: &kdl::KdlValue) -> Error {
        Error::InvalidConfig(format!(
            "{}: expected {}, got {}",
            node.name().value(),
            expected,
            actual
        ))
    }
}
