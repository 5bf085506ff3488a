//! Scene graph for scripted scenes
//!
//! This crate provides:
//! - **SceneGraph**: an order-stable arena of nodes with parent/child links by id
//! - **propagate**: world transform computation over the node forest
//! - **NodeRef**: reference-counted node handles shared with the scripting layer
//! - **SceneLoader**: the seam through which asset files become scenes
//!
//! # Example
//!
//! ```rust
//! use scene::{propagate, NodeDesc, SceneBuilder};
//! use scene::glam::Vec3;
//!
//! let mut builder = SceneBuilder::new();
//! let a = builder.add_node(NodeDesc::named("A"));
//! let b = builder.add_node(NodeDesc::named("B").with_translation(Vec3::X));
//! builder.attach(a, b).unwrap();
//!
//! let scene = builder.build();
//! propagate(&scene).unwrap();
//! assert_eq!(scene.node(1).unwrap().borrow().world_position(), Vec3::X);
//! ```

mod error;
mod graph;
mod handle;
mod loader;
mod node;
mod transform;

pub use error::{Result, SceneError};
pub use graph::{Image, Mesh, Scene, SceneBuilder, SceneGraph, SceneId, WeakScene};
pub use handle::{NodeRef, WeakNodeRef};
#[cfg(feature = "gltf")]
pub use loader::GltfLoader;
pub use loader::SceneLoader;
pub use node::{ImageId, MeshId, Node, NodeDesc, NodeId};
pub use transform::{local_matrix, propagate};

// Re-export glam for downstream crates
pub use glam;
