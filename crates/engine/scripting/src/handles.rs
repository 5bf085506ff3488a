//! Scene and Node handles exposed to Lua
//!
//! Each handle kind carries a fixed method table built once when the type is
//! registered. Every entry first checks that the receiver is a handle of the
//! right kind, then checks its arguments, and only then touches native state.
//!
//! ```lua
//! local scene = LoadScene("tank.gltf")
//! local turret = scene:GetNode(1):GetChild(2)
//! local x, y, z = turret:GetWorldPosition()
//! turret:GetPropertyTable().health = 100
//! ```

use crate::convention::{native_to_script_index, vec3_out, Args};
use crate::property_table::SharedRegistry;
use crate::BindingError;
use mlua::prelude::*;
use scene::{NodeRef, Scene};
use std::fmt;

/// A userdata handle kind recognised at the script boundary
pub trait HandleKind: LuaUserData + Sized + 'static {
    /// Type tag used in error messages and `tostring`
    const KIND: &'static str;
}

type Method<T> = fn(&Lua, &T, Args) -> LuaResult<LuaMultiValue>;

/// Script handle to a loaded scene
#[derive(Clone)]
pub struct SceneHandle {
    scene: Scene,
    registry: SharedRegistry,
}

/// Script handle to one node; retains the node and its scene
#[derive(Clone)]
pub struct NodeHandle {
    scene: Scene,
    node: NodeRef,
    registry: SharedRegistry,
}

impl SceneHandle {
    pub fn new(scene: Scene, registry: SharedRegistry) -> Self {
        Self { scene, registry }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }
}

impl NodeHandle {
    /// Wrap a retained node, making sure its property table exists
    pub fn new(lua: &Lua, scene: Scene, node: NodeRef, registry: SharedRegistry) -> LuaResult<Self> {
        registry
            .borrow_mut()
            .property_table(lua, scene.id(), &node.borrow())?;
        Ok(Self {
            scene,
            node,
            registry,
        })
    }

    pub fn node(&self) -> &NodeRef {
        &self.node
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    fn retain(&self, lua: &Lua, node: NodeRef) -> LuaResult<Self> {
        Self::new(lua, self.scene.clone(), node, self.registry.clone())
    }
}

impl fmt::Debug for NodeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeHandle")
            .field("scene", &self.scene.id())
            .field("node", &self.node.id())
            .finish()
    }
}

impl HandleKind for SceneHandle {
    const KIND: &'static str = "Scene";
}

impl HandleKind for NodeHandle {
    const KIND: &'static str = "Node";
}

/// Split the receiver off a bound call and check its kind
fn receiver<T: HandleKind>(args: LuaMultiValue) -> LuaResult<(LuaUserDataRef<T>, Vec<LuaValue>)> {
    let mut values = args.into_iter();
    let this = values.next().unwrap_or(LuaValue::Nil);
    let found = match &this {
        LuaValue::UserData(ud) if ud.is::<T>() => return Ok((ud.borrow::<T>()?, values.collect())),
        LuaValue::UserData(ud) if ud.is::<SceneHandle>() => SceneHandle::KIND.to_string(),
        LuaValue::UserData(ud) if ud.is::<NodeHandle>() => NodeHandle::KIND.to_string(),
        other => other.type_name().to_string(),
    };
    Err(BindingError::TypeMismatch {
        expected: T::KIND,
        found,
    }
    .into())
}

fn register<T: HandleKind, M: LuaUserDataMethods<T>>(methods: &mut M, table: &'static [(&'static str, Method<T>)]) {
    for &(name, method) in table {
        methods.add_function(name, move |lua, args: LuaMultiValue| {
            let (this, rest) = receiver::<T>(args)?;
            method(lua, &this, Args::new(name, rest))
        });
    }
}

fn same_identity<T: HandleKind, K: PartialEq>(a: &LuaAnyUserData, b: &LuaAnyUserData, key: fn(&T) -> K) -> bool {
    match (a.borrow::<T>(), b.borrow::<T>()) {
        (Ok(a), Ok(b)) => key(&a) == key(&b),
        _ => false,
    }
}

// ---------------------------------------------------------------------------
// Scene

const SCENE_METHODS: &[(&str, Method<SceneHandle>)] = &[
    ("GetNumNodes", scene_get_num_nodes),
    ("GetNode", scene_get_node),
    ("GetNumMeshes", scene_get_num_meshes),
    ("GetNumImages", scene_get_num_images),
];

fn scene_get_num_nodes(lua: &Lua, this: &SceneHandle, args: Args) -> LuaResult<LuaMultiValue> {
    args.expect(0)?;
    (this.scene.node_count() as i64).into_lua_multi(lua)
}

fn scene_get_node(lua: &Lua, this: &SceneHandle, args: Args) -> LuaResult<LuaMultiValue> {
    args.expect(1)?;
    let index = args.index(0, this.scene.node_count())?;
    let node = this
        .scene
        .node(index)
        .map_err(|e| BindingError::argument("GetNode", e.to_string()))?;
    NodeHandle::new(lua, this.scene.clone(), node, this.registry.clone())?.into_lua_multi(lua)
}

fn scene_get_num_meshes(lua: &Lua, this: &SceneHandle, args: Args) -> LuaResult<LuaMultiValue> {
    args.expect(0)?;
    (this.scene.meshes().len() as i64).into_lua_multi(lua)
}

fn scene_get_num_images(lua: &Lua, this: &SceneHandle, args: Args) -> LuaResult<LuaMultiValue> {
    args.expect(0)?;
    (this.scene.images().len() as i64).into_lua_multi(lua)
}

impl LuaUserData for SceneHandle {
    fn add_methods<M: LuaUserDataMethods<Self>>(methods: &mut M) {
        register(methods, SCENE_METHODS);

        methods.add_meta_method(LuaMetaMethod::ToString, |_, this, ()| {
            Ok(format!("Scene({} nodes)", this.scene.node_count()))
        });
        methods.add_meta_function(LuaMetaMethod::Eq, |_, (a, b): (LuaAnyUserData, LuaAnyUserData)| {
            Ok(same_identity::<SceneHandle, _>(&a, &b, |h| h.scene.id()))
        });
    }
}

// ---------------------------------------------------------------------------
// Node

const NODE_METHODS: &[(&str, Method<NodeHandle>)] = &[
    ("GetNumChildren", node_get_num_children),
    ("GetChild", node_get_child),
    ("GetParent", node_get_parent),
    ("GetPropertyTable", node_get_property_table),
    ("GetName", node_get_name),
    ("GetId", node_get_id),
    ("GetLocalPosition", node_get_local_position),
    ("GetWorldPosition", node_get_world_position),
    ("SetLocalPosition", node_set_local_position),
    ("GetLocalRotation", node_get_local_rotation),
    ("GetWorldRotation", node_get_world_rotation),
    ("SetLocalRotation", node_set_local_rotation),
    ("GetLocalScale", node_get_local_scale),
    ("GetWorldScale", node_get_world_scale),
    ("SetLocalScale", node_set_local_scale),
];

fn node_get_num_children(lua: &Lua, this: &NodeHandle, args: Args) -> LuaResult<LuaMultiValue> {
    args.expect(0)?;
    (this.node.borrow().num_children() as i64).into_lua_multi(lua)
}

fn node_get_child(lua: &Lua, this: &NodeHandle, args: Args) -> LuaResult<LuaMultiValue> {
    args.expect(1)?;
    let index = args.index(0, this.node.borrow().num_children())?;
    let child = this
        .node
        .child(&this.scene, index)
        .map_err(|e| BindingError::argument("GetChild", e.to_string()))?;
    this.retain(lua, child)?.into_lua_multi(lua)
}

fn node_get_parent(lua: &Lua, this: &NodeHandle, args: Args) -> LuaResult<LuaMultiValue> {
    args.expect(0)?;
    let parent = this
        .node
        .parent(&this.scene)
        .map_err(|e| BindingError::argument("GetParent", e.to_string()))?;
    match parent {
        Some(parent) => this.retain(lua, parent)?.into_lua_multi(lua),
        None => LuaValue::Nil.into_lua_multi(lua),
    }
}

fn node_get_property_table(lua: &Lua, this: &NodeHandle, args: Args) -> LuaResult<LuaMultiValue> {
    args.expect(0)?;
    let table = this
        .registry
        .borrow_mut()
        .property_table(lua, this.scene.id(), &this.node.borrow())?;
    table.into_lua_multi(lua)
}

fn node_get_name(lua: &Lua, this: &NodeHandle, args: Args) -> LuaResult<LuaMultiValue> {
    args.expect(0)?;
    let name = this.node.borrow().name.clone();
    name.into_lua_multi(lua)
}

fn node_get_id(lua: &Lua, this: &NodeHandle, args: Args) -> LuaResult<LuaMultiValue> {
    args.expect(0)?;
    native_to_script_index(this.node.id().index()).into_lua_multi(lua)
}

fn node_get_local_position(lua: &Lua, this: &NodeHandle, args: Args) -> LuaResult<LuaMultiValue> {
    args.expect(0)?;
    vec3_out(this.node.borrow().translation).into_lua_multi(lua)
}

fn node_get_world_position(lua: &Lua, this: &NodeHandle, args: Args) -> LuaResult<LuaMultiValue> {
    args.expect(0)?;
    vec3_out(this.node.borrow().world_position()).into_lua_multi(lua)
}

fn node_set_local_position(lua: &Lua, this: &NodeHandle, args: Args) -> LuaResult<LuaMultiValue> {
    args.expect(3)?;
    this.node.borrow_mut().translation = args.vec3(0)?;
    ().into_lua_multi(lua)
}

fn node_get_local_rotation(lua: &Lua, this: &NodeHandle, args: Args) -> LuaResult<LuaMultiValue> {
    args.expect(0)?;
    vec3_out(this.node.borrow().local_euler()).into_lua_multi(lua)
}

fn node_get_world_rotation(lua: &Lua, this: &NodeHandle, args: Args) -> LuaResult<LuaMultiValue> {
    args.expect(0)?;
    vec3_out(this.node.borrow().world_euler()).into_lua_multi(lua)
}

fn node_set_local_rotation(lua: &Lua, this: &NodeHandle, args: Args) -> LuaResult<LuaMultiValue> {
    args.expect(3)?;
    let euler = args.vec3(0)?;
    this.node.borrow_mut().set_local_euler(euler);
    ().into_lua_multi(lua)
}

fn node_get_local_scale(lua: &Lua, this: &NodeHandle, args: Args) -> LuaResult<LuaMultiValue> {
    args.expect(0)?;
    vec3_out(this.node.borrow().scale).into_lua_multi(lua)
}

fn node_get_world_scale(lua: &Lua, this: &NodeHandle, args: Args) -> LuaResult<LuaMultiValue> {
    args.expect(0)?;
    vec3_out(this.node.borrow().world_scale()).into_lua_multi(lua)
}

fn node_set_local_scale(lua: &Lua, this: &NodeHandle, args: Args) -> LuaResult<LuaMultiValue> {
    args.expect(3)?;
    this.node.borrow_mut().scale = args.vec3(0)?;
    ().into_lua_multi(lua)
}

impl LuaUserData for NodeHandle {
    fn add_methods<M: LuaUserDataMethods<Self>>(methods: &mut M) {
        register(methods, NODE_METHODS);

        methods.add_meta_method(LuaMetaMethod::ToString, |_, this, ()| {
            let node = this.node.borrow();
            Ok(format!("Node({} \"{}\")", node.id(), node.name))
        });
        methods.add_meta_function(LuaMetaMethod::Eq, |_, (a, b): (LuaAnyUserData, LuaAnyUserData)| {
            Ok(same_identity::<NodeHandle, _>(&a, &b, |h| (h.scene.id(), h.node.id())))
        });
    }
}
