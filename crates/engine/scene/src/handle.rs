//! Shared node handles
//!
//! Every node lives behind a reference-counted cell. The owning scene keeps
//! one reference per node (the baseline); each handle given out by a lookup
//! is another clone of the same cell, so handles alias the node rather than
//! copying it. Dropping a handle releases it.

use crate::node::{Node, NodeId};
use crate::{Result, Scene, SceneError};
use std::cell::{Ref, RefCell, RefMut};
use std::rc::{Rc, Weak};

/// Retained reference to a node
#[derive(Debug, Clone)]
pub struct NodeRef(Rc<RefCell<Node>>);

impl NodeRef {
    pub(crate) fn new(node: Node) -> Self {
        Self(Rc::new(RefCell::new(node)))
    }

    /// Node identity; never changes for the life of the node
    pub fn id(&self) -> NodeId {
        self.0.borrow().id()
    }

    pub fn borrow(&self) -> Ref<'_, Node> {
        self.0.borrow()
    }

    pub fn borrow_mut(&self) -> RefMut<'_, Node> {
        self.0.borrow_mut()
    }

    /// Scene baseline plus every live handle
    pub fn ref_count(&self) -> usize {
        Rc::strong_count(&self.0)
    }

    /// Whether both handles alias the same node
    pub fn ptr_eq(&self, other: &NodeRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Non-retaining observer, used to check whether a node was freed
    pub fn downgrade(&self) -> WeakNodeRef {
        WeakNodeRef(Rc::downgrade(&self.0))
    }

    /// Retain the child at `index` (0-based)
    ///
    /// Fails without creating a handle when `index` is outside the child list.
    pub fn child(&self, scene: &Scene, index: usize) -> Result<NodeRef> {
        let child = {
            let node = self.0.borrow();
            let len = node.num_children();
            *node
                .children()
                .get(index)
                .ok_or(SceneError::IndexOutOfRange { index, len })?
        };
        scene.node_by_id(child)
    }

    /// Retain the parent node, if any
    pub fn parent(&self, scene: &Scene) -> Result<Option<NodeRef>> {
        let parent = self.0.borrow().parent();
        parent.map(|id| scene.node_by_id(id)).transpose()
    }
}

/// Weak counterpart of [`NodeRef`]
#[derive(Debug, Clone)]
pub struct WeakNodeRef(Weak<RefCell<Node>>);

impl WeakNodeRef {
    pub fn upgrade(&self) -> Option<NodeRef> {
        self.0.upgrade().map(NodeRef)
    }

    pub fn is_alive(&self) -> bool {
        self.0.strong_count() > 0
    }
}
