//! Scene loading seam
//!
//! Parsing asset files is delegated to a [`SceneLoader`]. The bundled
//! [`GltfLoader`] reads `.gltf`/`.glb` files through the `gltf` crate and
//! hands the node list to a [`SceneBuilder`], so every loaded scene goes
//! through the same structural checks.

use crate::{Result, Scene};
use std::path::{Path, PathBuf};

/// Produces populated scenes from asset paths
pub trait SceneLoader {
    fn load(&self, path: &Path) -> Result<Scene>;
}

/// Loads glTF 2.0 scenes relative to an asset root
#[cfg(feature = "gltf")]
#[derive(Debug, Clone, Default)]
pub struct GltfLoader {
    root: PathBuf,
}

#[cfg(feature = "gltf")]
impl GltfLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

#[cfg(feature = "gltf")]
impl SceneLoader for GltfLoader {
    fn load(&self, path: &Path) -> Result<Scene> {
        use crate::{Image, Mesh, MeshId, NodeDesc, NodeId, SceneBuilder, SceneError};
        use glam::{Quat, Vec3};

        let full = self.resolve(path);
        let asset_error = |reason: String| SceneError::AssetLoad {
            path: full.display().to_string(),
            reason,
        };

        let (document, _buffers, images) =
            gltf::import(&full).map_err(|e| asset_error(e.to_string()))?;

        let mut builder = SceneBuilder::new();

        for mesh in document.meshes() {
            builder.add_mesh(Mesh {
                name: mesh.name().unwrap_or_default().to_string(),
                primitive_count: mesh.primitives().count(),
            });
        }

        for (image, data) in document.images().zip(images.iter()) {
            builder.add_image(Image {
                name: image.name().unwrap_or_default().to_string(),
                width: data.width,
                height: data.height,
            });
        }

        // Node ids follow glTF node indices.
        for node in document.nodes() {
            let (translation, rotation, scale) = node.transform().decomposed();
            builder.add_node(NodeDesc {
                name: node.name().unwrap_or_default().to_string(),
                mesh: node.mesh().map(|mesh| MeshId(mesh.index() as u32)),
                translation: Vec3::from_array(translation),
                rotation: Quat::from_array(rotation),
                scale: Vec3::from_array(scale),
            });
        }

        for node in document.nodes() {
            for child in node.children() {
                builder
                    .attach(NodeId(node.index() as u32), NodeId(child.index() as u32))
                    .map_err(|e| asset_error(e.to_string()))?;
            }
        }

        tracing::info!(
            "Loaded {}: {} nodes, {} meshes, {} images",
            full.display(),
            builder.node_count(),
            document.meshes().count(),
            images.len()
        );

        Ok(builder.build())
    }
}
