//! Scene graph store
//!
//! Nodes are kept in a flat, order-stable arena indexed by [`NodeId`].
//! Parent/child links are ids into that arena. Links are only made through
//! [`SceneBuilder::attach`], which refuses a second parent and any edge that
//! would close a cycle, so a built scene is always a forest.

use crate::handle::NodeRef;
use crate::node::{ImageId, MeshId, Node, NodeDesc, NodeId};
use crate::{Result, SceneError};
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU32, Ordering};

static NEXT_SCENE_ID: AtomicU32 = AtomicU32::new(1);

/// Process-unique identity of a built scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SceneId(pub u32);

/// Mesh entry referenced by nodes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub name: String,
    pub primitive_count: usize,
}

/// Image entry referenced by materials
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Image {
    pub name: String,
    pub width: u32,
    pub height: u32,
}

/// Owning container of nodes, meshes and images from one asset
#[derive(Debug)]
pub struct SceneGraph {
    id: SceneId,
    nodes: Vec<NodeRef>,
    roots: Vec<NodeId>,
    meshes: Vec<Mesh>,
    images: Vec<Image>,
}

/// Shared handle to a [`SceneGraph`]
#[derive(Debug, Clone)]
pub struct Scene(Rc<SceneGraph>);

impl Scene {
    pub fn id(&self) -> SceneId {
        self.0.id
    }

    pub fn node_count(&self) -> usize {
        self.0.nodes.len()
    }

    /// Retain the node at `index` (0-based)
    pub fn node(&self, index: usize) -> Result<NodeRef> {
        self.0
            .nodes
            .get(index)
            .cloned()
            .ok_or(SceneError::IndexOutOfRange {
                index,
                len: self.0.nodes.len(),
            })
    }

    /// Retain the node with the given id
    pub fn node_by_id(&self, id: NodeId) -> Result<NodeRef> {
        self.node(id.index())
    }

    /// Borrow every node in arena order without retaining
    pub fn nodes(&self) -> &[NodeRef] {
        &self.0.nodes
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.0.roots
    }

    pub fn meshes(&self) -> &[Mesh] {
        &self.0.meshes
    }

    pub fn mesh(&self, id: MeshId) -> Option<&Mesh> {
        self.0.meshes.get(id.index())
    }

    pub fn images(&self) -> &[Image] {
        &self.0.images
    }

    pub fn downgrade(&self) -> WeakScene {
        WeakScene(Rc::downgrade(&self.0))
    }

    pub fn ptr_eq(&self, other: &Scene) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

/// Non-retaining reference to a scene
#[derive(Debug, Clone)]
pub struct WeakScene(Weak<SceneGraph>);

impl WeakScene {
    pub fn upgrade(&self) -> Option<Scene> {
        self.0.upgrade().map(Scene)
    }
}

/// Builds a scene, enforcing the forest invariant as links are made
#[derive(Debug, Default)]
pub struct SceneBuilder {
    nodes: Vec<Node>,
    meshes: Vec<Mesh>,
    images: Vec<Image>,
}

impl SceneBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, desc: NodeDesc) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node::from_desc(id, desc));
        id
    }

    pub fn add_mesh(&mut self, mesh: Mesh) -> MeshId {
        self.meshes.push(mesh);
        MeshId(self.meshes.len() as u32 - 1)
    }

    pub fn add_image(&mut self, image: Image) -> ImageId {
        self.images.push(image);
        ImageId(self.images.len() as u32 - 1)
    }

    /// Append `child` to `parent`'s ordered child list
    pub fn attach(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.check(parent)?;
        self.check(child)?;

        if let Some(existing) = self.nodes[child.index()].parent {
            return Err(SceneError::AlreadyParented {
                child,
                parent: existing,
            });
        }

        // Walk up from the new parent; meeting the child means a back-edge.
        let mut cursor = Some(parent);
        while let Some(id) = cursor {
            if id == child {
                return Err(SceneError::Cycle(child));
            }
            cursor = self.nodes[id.index()].parent;
        }

        self.nodes[child.index()].parent = Some(parent);
        self.nodes[parent.index()].children.push(child);
        Ok(())
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn build(self) -> Scene {
        let id = SceneId(NEXT_SCENE_ID.fetch_add(1, Ordering::Relaxed));
        let roots = self
            .nodes
            .iter()
            .filter(|node| node.parent.is_none())
            .map(Node::id)
            .collect();
        let nodes = self.nodes.into_iter().map(NodeRef::new).collect();

        Scene(Rc::new(SceneGraph {
            id,
            nodes,
            roots,
            meshes: self.meshes,
            images: self.images,
        }))
    }

    fn check(&self, id: NodeId) -> Result<()> {
        if id.index() < self.nodes.len() {
            Ok(())
        } else {
            Err(SceneError::UnknownNode(id))
        }
    }
}
