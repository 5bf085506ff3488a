//! Error types for the scene graph

use crate::NodeId;
use thiserror::Error;

/// Result type for scene graph operations
pub type Result<T> = std::result::Result<T, SceneError>;

/// Errors that can occur while building, querying or loading a scene
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SceneError {
    /// Index outside `[0, len)`; no handle was created
    #[error("index {index} out of range (count {len})")]
    IndexOutOfRange { index: usize, len: usize },

    /// Node id not present in the scene being built
    #[error("unknown node {0}")]
    UnknownNode(NodeId),

    /// Node already has a parent
    #[error("node {child} already has parent {parent}")]
    AlreadyParented { child: NodeId, parent: NodeId },

    /// Structural cycle detected in the node tree
    #[error("node hierarchy contains a cycle at node {0}")]
    Cycle(NodeId),

    /// Scene or resource file missing or corrupt
    #[error("failed to load asset {path}: {reason}")]
    AssetLoad { path: String, reason: String },
}
