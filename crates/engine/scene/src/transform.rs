//! World transform propagation
//!
//! `world(child) = world(parent) * local(child)`, roots use their local
//! matrix. The whole forest is recomputed on every call, depth-first and
//! pre-order, with an explicit stack instead of recursion.

use crate::{NodeId, Result, Scene, SceneError};
use glam::{Mat4, Quat, Vec3};

/// Local matrix composed translate, then rotate, then scale
pub fn local_matrix(translation: Vec3, rotation: Quat, scale: Vec3) -> Mat4 {
    Mat4::from_scale_rotation_translation(scale, rotation, translation)
}

/// Recompute the world matrix of every node in `scene`
///
/// Returns the number of nodes written. A node reached twice, or a node not
/// reachable from any root, is reported as [`SceneError::Cycle`].
pub fn propagate(scene: &Scene) -> Result<usize> {
    let nodes = scene.nodes();
    let mut visited = vec![false; nodes.len()];
    let mut stack: Vec<(NodeId, Mat4)> = scene
        .roots()
        .iter()
        .rev()
        .map(|&root| (root, Mat4::IDENTITY))
        .collect();
    let mut written = 0;

    while let Some((id, parent_world)) = stack.pop() {
        let slot = visited
            .get_mut(id.index())
            .ok_or(SceneError::UnknownNode(id))?;
        if *slot {
            return Err(SceneError::Cycle(id));
        }
        *slot = true;

        let mut node = nodes[id.index()].borrow_mut();
        let world = parent_world * node.local_matrix();
        node.world = world;
        written += 1;

        stack.extend(node.children().iter().rev().map(|&child| (child, world)));
    }

    if let Some(unreached) = visited.iter().position(|seen| !seen) {
        return Err(SceneError::Cycle(NodeId(unreached as u32)));
    }

    tracing::trace!("propagated {} world transforms", written);
    Ok(written)
}
