//! Scene nodes and their local/world transforms

use crate::transform::local_matrix;
use glam::{EulerRot, Mat4, Quat, Vec3};
use std::fmt;

/// Identity of a node within its owning scene
///
/// Equal to the node's index in the scene's node list and stable for the
/// scene's whole life.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Index of a mesh in the owning scene's mesh list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshId(pub u32);

impl MeshId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Index of an image in the owning scene's image list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageId(pub u32);

/// Description of a node handed to [`SceneBuilder::add_node`](crate::SceneBuilder::add_node)
#[derive(Debug, Clone)]
pub struct NodeDesc {
    pub name: String,
    pub mesh: Option<MeshId>,
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for NodeDesc {
    fn default() -> Self {
        Self {
            name: String::new(),
            mesh: None,
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl NodeDesc {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_mesh(mut self, mesh: MeshId) -> Self {
        self.mesh = Some(mesh);
        self
    }

    pub fn with_translation(mut self, translation: Vec3) -> Self {
        self.translation = translation;
        self
    }

    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }
}

/// A position in the scene hierarchy
///
/// `world` is derived state: it is only meaningful after
/// [`propagate`](crate::propagate) has run over the owning scene.
#[derive(Debug, Clone)]
pub struct Node {
    id: NodeId,
    pub name: String,
    pub mesh: Option<MeshId>,
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
    pub(crate) world: Mat4,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
}

impl Node {
    pub(crate) fn from_desc(id: NodeId, desc: NodeDesc) -> Self {
        Self {
            id,
            name: desc.name,
            mesh: desc.mesh,
            translation: desc.translation,
            rotation: desc.rotation,
            scale: desc.scale,
            world: Mat4::IDENTITY,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn num_children(&self) -> usize {
        self.children.len()
    }

    /// Local matrix built translate, then rotate, then scale
    pub fn local_matrix(&self) -> Mat4 {
        local_matrix(self.translation, self.rotation, self.scale)
    }

    pub fn world_matrix(&self) -> Mat4 {
        self.world
    }

    /// Local rotation as XYZ Euler angles in radians
    pub fn local_euler(&self) -> Vec3 {
        let (x, y, z) = self.rotation.to_euler(EulerRot::XYZ);
        Vec3::new(x, y, z)
    }

    /// Set the local rotation from XYZ Euler angles in radians
    pub fn set_local_euler(&mut self, euler: Vec3) {
        self.rotation = Quat::from_euler(EulerRot::XYZ, euler.x, euler.y, euler.z);
    }

    pub fn world_position(&self) -> Vec3 {
        self.world.w_axis.truncate()
    }

    /// World rotation as XYZ Euler angles in radians
    pub fn world_euler(&self) -> Vec3 {
        let (_, rotation, _) = self.world.to_scale_rotation_translation();
        let (x, y, z) = rotation.to_euler(EulerRot::XYZ);
        Vec3::new(x, y, z)
    }

    pub fn world_scale(&self) -> Vec3 {
        let (scale, _, _) = self.world.to_scale_rotation_translation();
        scale
    }
}
