//! Per-node property tables
//!
//! Scripts attach their own state to nodes through a plain Lua table that
//! belongs to the node's identity rather than to any handle. The registry
//! hands out the same table for every handle that resolves to the same
//! `(scene, node)` pair and keeps it alive for the whole scripting session.
//!
//! On creation the table is seeded with two native fields:
//! - `meshId`: 1-based mesh index, omitted when the node has no mesh
//! - `name`: the node name
//!
//! The seeded fields are copied once. Later native changes to the mesh or
//! name are not reflected in an existing table.

use crate::convention::native_to_script_index;
use mlua::prelude::*;
use scene::{Node, NodeId, SceneId};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Key of a property table: the node's identity within a scene session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeKey {
    pub scene: SceneId,
    pub node: NodeId,
}

/// Registry of property tables, one per [`NodeKey`]
#[derive(Debug, Default)]
pub struct PropertyRegistry {
    tables: HashMap<NodeKey, LuaRegistryKey>,
}

/// Session-shared registry, carried by every script handle
pub type SharedRegistry = Rc<RefCell<PropertyRegistry>>;

impl PropertyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedRegistry {
        Rc::new(RefCell::new(Self::new()))
    }

    /// Number of tables created so far
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn contains(&self, key: &NodeKey) -> bool {
        self.tables.contains_key(key)
    }

    /// Existing table for `key`, or `None` if no lookup has touched it yet
    pub fn get(&self, lua: &Lua, key: &NodeKey) -> LuaResult<Option<LuaTable>> {
        self.tables
            .get(key)
            .map(|registry_key| lua.registry_value(registry_key))
            .transpose()
    }

    /// Table for `node`, created and seeded on first use
    pub fn property_table(&mut self, lua: &Lua, scene: SceneId, node: &Node) -> LuaResult<LuaTable> {
        let key = NodeKey {
            scene,
            node: node.id(),
        };
        if let Some(table) = self.get(lua, &key)? {
            return Ok(table);
        }

        let table = lua.create_table()?;
        if let Some(mesh) = node.mesh {
            table.set("meshId", native_to_script_index(mesh.index()))?;
        }
        table.set("name", node.name.as_str())?;

        self.tables.insert(key, lua.create_registry_value(table.clone())?);
        tracing::debug!("Created property table for node {} ({})", node.id(), node.name);
        Ok(table)
    }

    /// Release every table belonging to `scene`
    ///
    /// Scene ids are never reused, so once a scene is gone its tables can no
    /// longer be reached through a handle. Returns the number released.
    pub fn remove_scene(&mut self, lua: &Lua, scene: SceneId) -> usize {
        let keys: Vec<NodeKey> = self
            .tables
            .keys()
            .filter(|key| key.scene == scene)
            .copied()
            .collect();

        for key in &keys {
            if let Some(registry_key) = self.tables.remove(key) {
                if let Err(e) = lua.remove_registry_value(registry_key) {
                    tracing::warn!("Failed to release property table for node {}: {}", key.node, e);
                }
            }
        }

        if !keys.is_empty() {
            tracing::debug!("Released {} property tables of scene {}", keys.len(), scene.0);
        }
        keys.len()
    }
}
