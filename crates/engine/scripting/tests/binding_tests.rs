//! Script binding tests
//!
//! Drives the Scene/Node API from Lua and verifies that:
//! 1. Property tables are shared by every handle resolving to one node
//! 2. 1-based script indices map onto 0-based native indices, with range checks
//! 3. Handle creation and release keep node reference counts balanced
//! 4. Receiver and argument errors abort only the offending call

use scene::glam::Vec3;
use scene::{MeshId, NodeDesc, Scene, SceneBuilder, SceneError, SceneLoader};
use scripting::{Hook, HookOutcome, ScriptHost};
use std::collections::HashMap;
use std::path::Path;

/// Helper: serves pre-built scenes by path
struct MemoryLoader {
    scenes: HashMap<String, Scene>,
}

impl SceneLoader for MemoryLoader {
    fn load(&self, path: &Path) -> scene::Result<Scene> {
        let key = path.display().to_string();
        self.scenes
            .get(&key)
            .cloned()
            .ok_or(SceneError::AssetLoad {
                path: key,
                reason: "not found".to_string(),
            })
    }
}

/// Helper: A (root, mesh 0) with children B (offset +X) and C
fn abc_scene() -> Scene {
    let mut builder = SceneBuilder::new();
    let a = builder.add_node(NodeDesc::named("A").with_mesh(MeshId(0)));
    let b = builder.add_node(NodeDesc::named("B").with_translation(Vec3::X));
    let c = builder.add_node(NodeDesc::named("C"));
    builder.attach(a, b).unwrap();
    builder.attach(a, c).unwrap();
    builder.build()
}

fn host_with(scene: &Scene) -> ScriptHost {
    let mut scenes = HashMap::new();
    scenes.insert("abc.gltf".to_string(), scene.clone());
    ScriptHost::new(MemoryLoader { scenes }).unwrap()
}

/// Helper: builds a new scene on every load, like a file-backed loader
struct FreshLoader;

impl SceneLoader for FreshLoader {
    fn load(&self, _path: &Path) -> scene::Result<Scene> {
        Ok(abc_scene())
    }
}

fn full_gc(host: &ScriptHost) {
    host.lua().gc_collect().unwrap();
    host.lua().gc_collect().unwrap();
}

#[test]
fn test_end_to_end_scenario() {
    let scene = abc_scene();
    let host = host_with(&scene);

    host.exec_string(
        r#"
        local scene = LoadScene("abc.gltf")
        assert(scene:GetNumNodes() == 3)

        local a = scene:GetNode(1)
        assert(a:GetNumChildren() == 2)

        local via_child = scene:GetNode(1):GetChild(2)
        local via_scene = scene:GetNode(3)
        assert(via_child == via_scene)
        assert(via_child:GetId() == 3 and via_scene:GetName() == "C")

        via_scene:SetLocalPosition(1, 2, 3)
        local x, y, z = via_scene:GetLocalPosition()
        assert(x == 1 and y == 2 and z == 3)

        local bx, by, bz = scene:GetNode(2):GetWorldPosition()
        assert(bx == 1 and by == 0 and bz == 0)
        "#,
        "scenario",
    )
    .unwrap();
}

#[test]
fn test_property_table_identity_across_aliases() {
    let scene = abc_scene();
    let host = host_with(&scene);

    host.exec_string(
        r#"
        local scene = LoadScene("abc.gltf")
        local t1 = scene:GetNode(2):GetPropertyTable()
        local t2 = scene:GetNode(1):GetChild(1):GetPropertyTable()
        assert(rawequal(t1, t2))

        t1.health = 75
        assert(t2.health == 75)

        -- this loader serves one shared scene, so a second load reaches the same nodes
        local again = LoadScene("abc.gltf")
        assert(rawequal(again:GetNode(2):GetPropertyTable(), t1))
        assert(again:GetNode(3):GetParent():GetPropertyTable().name == "A")
        "#,
        "identity",
    )
    .unwrap();

    assert_eq!(host.registry().len(), 3);
}

#[test]
fn test_property_table_persists_after_handles_collected() {
    let scene = abc_scene();
    let host = host_with(&scene);

    host.exec_string(
        r#"
        scene = LoadScene("abc.gltf")
        scene:GetNode(3):GetPropertyTable().tag = "enemy"
        "#,
        "write",
    )
    .unwrap();
    full_gc(&host);

    host.exec_string(
        r#"assert(scene:GetNode(1):GetChild(2):GetPropertyTable().tag == "enemy")"#,
        "read",
    )
    .unwrap();
}

#[test]
fn test_seeded_fields_and_snapshot() {
    let scene = abc_scene();
    let host = host_with(&scene);

    host.exec_string(
        r#"
        scene = LoadScene("abc.gltf")
        local a = scene:GetNode(1):GetPropertyTable()
        assert(a.meshId == 1 and a.name == "A")
        local b = scene:GetNode(2):GetPropertyTable()
        assert(b.meshId == nil and b.name == "B")
        "#,
        "seed",
    )
    .unwrap();

    {
        let a = scene.node(0).unwrap();
        let mut a = a.borrow_mut();
        a.mesh = Some(MeshId(5));
        a.name = "Renamed".to_string();
    }

    host.exec_string(
        r#"
        local a = scene:GetNode(1)
        assert(a:GetName() == "Renamed")
        local props = a:GetPropertyTable()
        assert(props.meshId == 1, "meshId is a snapshot")
        assert(props.name == "A", "name is a snapshot")
        "#,
        "stale",
    )
    .unwrap();
}

#[test]
fn test_index_convention() {
    let scene = abc_scene();
    let host = host_with(&scene);

    host.exec_string(
        r#"
        scene = LoadScene("abc.gltf")
        local root = scene:GetNode(1)
        for i = 1, root:GetNumChildren() do
            assert(root:GetChild(i):GetId() == i + 1)
        end
        assert(scene:GetNode(2.0):GetName() == "B")

        for _, bad in ipairs({ 0, 3, -1 }) do
            local ok, err = pcall(root.GetChild, root, bad)
            assert(not ok)
            assert(string.find(tostring(err), "out of range"), tostring(err))
        end
        local ok, err = pcall(scene.GetNode, scene, 4)
        assert(not ok and string.find(tostring(err), "out of range"))
        ok, err = pcall(scene.GetNode, scene, 1.5)
        assert(not ok and string.find(tostring(err), "expected integer"))
        "#,
        "indices",
    )
    .unwrap();
}

#[test]
fn test_reference_balance() {
    let scene = abc_scene();
    let host = host_with(&scene);

    host.exec_string(
        r#"
        scene = LoadScene("abc.gltf")
        a1 = scene:GetNode(1)
        a2 = scene:GetNode(1)
        c = a1:GetChild(2)
        "#,
        "retain",
    )
    .unwrap();

    let a = scene.node(0).unwrap();
    let c = scene.node(2).unwrap();
    // scene baseline + two script handles + the local handle
    assert_eq!(a.ref_count(), 4);
    // scene baseline + one script handle + the local handle
    assert_eq!(c.ref_count(), 3);

    let before = a.ref_count();
    host.exec_string(
        r#"assert(not pcall(scene.GetNode, scene, 9))"#,
        "failed lookup",
    )
    .unwrap();
    full_gc(&host);
    assert_eq!(a.ref_count(), before, "failed lookup must not retain");

    host.exec_string("a1 = nil a2 = nil c = nil", "release").unwrap();
    full_gc(&host);
    assert_eq!(a.ref_count(), 2);
    assert_eq!(c.ref_count(), 2);

    let weak = a.downgrade();
    drop(a);
    drop(c);
    assert!(weak.is_alive(), "scene still retains the node");
}

#[test]
fn test_receiver_type_mismatch() {
    let scene = abc_scene();
    let host = host_with(&scene);

    host.exec_string(
        r#"
        scene = LoadScene("abc.gltf")
        local node = scene:GetNode(1)

        local ok, err = pcall(scene.GetNumNodes, node)
        assert(not ok)
        assert(string.find(tostring(err), "expected Scene handle, got Node"), tostring(err))

        ok, err = pcall(node.GetNumChildren, scene)
        assert(not ok and string.find(tostring(err), "expected Node handle, got Scene"))

        ok, err = pcall(node.SetLocalPosition, 5, 1, 2, 3)
        assert(not ok and string.find(tostring(err), "got integer"))

        local x, y, z = node:GetLocalPosition()
        assert(x == 0 and y == 0 and z == 0, "failed call touched no state")
        "#,
        "receivers",
    )
    .unwrap();
}

#[test]
fn test_argument_errors() {
    let scene = abc_scene();
    let host = host_with(&scene);

    host.exec_string(
        r#"
        scene = LoadScene("abc.gltf")
        local node = scene:GetNode(2)

        local ok, err = pcall(node.SetLocalPosition, node, 1, 2)
        assert(not ok and string.find(tostring(err), "expected 3 argument"), tostring(err))

        ok, err = pcall(node.SetLocalScale, node, 1, "two", 3)
        assert(not ok and string.find(tostring(err), "expected number, got string"))

        ok, err = pcall(scene.GetNode, scene)
        assert(not ok and string.find(tostring(err), "bad argument to GetNode"))

        ok, err = pcall(node.GetNumChildren, node, 1)
        assert(not ok and string.find(tostring(err), "expected 0 argument"))

        ok, err = pcall(LoadScene, 42)
        assert(not ok and string.find(tostring(err), "expected string"))

        local x, y, z = node:GetLocalPosition()
        assert(x == 1 and y == 0 and z == 0)
        "#,
        "arguments",
    )
    .unwrap();
}

#[test]
fn test_setters_do_not_propagate() {
    let scene = abc_scene();
    let host = host_with(&scene);

    host.exec_string(
        r#"
        scene = LoadScene("abc.gltf")
        scene:GetNode(1):SetLocalPosition(0, 5, 0)
        local x, y, z = scene:GetNode(2):GetWorldPosition()
        assert(x == 1 and y == 0 and z == 0)
        "#,
        "set",
    )
    .unwrap();

    assert_eq!(host.propagate_transforms(), 3);

    host.exec_string(
        r#"
        local x, y, z = scene:GetNode(2):GetWorldPosition()
        assert(x == 1 and y == 5 and z == 0)
        "#,
        "after",
    )
    .unwrap();
}

#[test]
fn test_rotation_and_scale_accessors() {
    let scene = abc_scene();
    let host = host_with(&scene);

    host.exec_string(
        r#"
        local function near(a, b) return math.abs(a - b) < 1e-4 end
        scene = LoadScene("abc.gltf")
        local root = scene:GetNode(1)
        root:SetLocalRotation(0, 0, math.pi / 2)
        root:SetLocalScale(2, 2, 2)

        local rx, ry, rz = root:GetLocalRotation()
        assert(near(rx, 0) and near(ry, 0) and near(rz, math.pi / 2))
        local sx, sy, sz = root:GetLocalScale()
        assert(sx == 2 and sy == 2 and sz == 2)
        "#,
        "trs",
    )
    .unwrap();

    host.propagate_transforms();

    host.exec_string(
        r#"
        local function near(a, b) return math.abs(a - b) < 1e-4 end
        local b = scene:GetNode(2)
        -- B sits one unit along +X, rotated a quarter turn and doubled by A
        local x, y, z = b:GetWorldPosition()
        assert(near(x, 0) and near(y, 2) and near(z, 0))
        local sx, sy, sz = b:GetWorldScale()
        assert(near(sx, 2) and near(sy, 2) and near(sz, 2))
        local rx, ry, rz = b:GetWorldRotation()
        assert(near(rz, math.pi / 2))
        "#,
        "world",
    )
    .unwrap();
}

#[test]
fn test_binding_error_in_hook_is_isolated() {
    let scene = abc_scene();
    let host = host_with(&scene);

    host.exec_string(
        r#"
        scene = LoadScene("abc.gltf")
        frames = 0
        function Update()
            frames = frames + 1
            if frames == 1 then
                scene:GetNode(99)
            end
            scene:GetNode(3):SetLocalPosition(frames, 0, 0)
        end
        "#,
        "hooks",
    )
    .unwrap();

    assert!(host.call_hook(Hook::Update, 0.016).is_failed());
    assert!(matches!(
        host.call_hook(Hook::Update, 0.016),
        HookOutcome::Completed
    ));

    let c = scene.node(2).unwrap();
    assert_eq!(c.borrow().translation, Vec3::new(2.0, 0.0, 0.0));
}

#[test]
fn test_tostring_of_handles() {
    let scene = abc_scene();
    let host = host_with(&scene);

    host.exec_string(
        r#"
        scene = LoadScene("abc.gltf")
        scene_text = tostring(scene)
        node_text = tostring(scene:GetNode(2))
        "#,
        "tostring",
    )
    .unwrap();

    let scene_text: String = host.get_global("scene_text").unwrap();
    let node_text: String = host.get_global("node_text").unwrap();
    assert_eq!(scene_text, "Scene(3 nodes)");
    assert_eq!(node_text, "Node(#1 \"B\")");
}

#[test]
fn test_separate_loads_have_separate_identities() {
    let host = ScriptHost::new(FreshLoader).unwrap();

    host.exec_string(
        r#"
        first = LoadScene("abc.gltf")
        local second = LoadScene("abc.gltf")
        assert(first == first and first ~= second)
        assert(first:GetNode(2) == first:GetNode(1):GetChild(1))
        assert(first:GetNode(2) ~= second:GetNode(2))
        assert(first:GetNode(1) ~= first)

        local t1 = first:GetNode(2):GetPropertyTable()
        local t2 = second:GetNode(2):GetPropertyTable()
        assert(not rawequal(t1, t2))
        t1.health = 10
        assert(t2.health == nil)
        "#,
        "two loads",
    )
    .unwrap();

    // B and A of the first scene, B of the second
    assert_eq!(host.registry().len(), 3);

    // Nothing holds the second scene once its locals are collected.
    full_gc(&host);
    assert_eq!(host.live_scenes().len(), 1);
    assert_eq!(host.registry().len(), 2);
}
