//! Lua script host
//!
//! Provides a Lua VM wrapper with:
//! - `LoadScene` and the Scene/Node handle types registered
//! - The session's property-table registry
//! - Script loading and hot-reload support
//! - Fault-isolated `Start`/`Update`/`End` lifecycle hooks

use crate::convention::Args;
use crate::handles::SceneHandle;
use crate::property_table::{PropertyRegistry, SharedRegistry};
use crate::{BindingError, Error, Result};
use mlua::prelude::*;
use scene::{propagate, Scene, SceneId, SceneLoader, WeakScene};
use std::cell::{Ref, RefCell};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::SystemTime;

/// A loaded Lua script
#[derive(Debug, Clone)]
pub struct Script {
    /// Path to the script file
    pub path: PathBuf,
    /// Last modification time
    pub modified: Option<SystemTime>,
}

impl Script {
    /// Create a new script from a path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let modified = std::fs::metadata(&path)
            .ok()
            .and_then(|m| m.modified().ok());

        Self { path, modified }
    }

    /// Check if the script file has been modified since it was loaded
    pub fn is_modified(&self) -> bool {
        if let Some(original) = self.modified {
            if let Ok(current) = std::fs::metadata(&self.path).and_then(|m| m.modified()) {
                return current > original;
            }
        }
        false
    }
}

/// Engine-to-script lifecycle hooks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hook {
    /// Once after the script is loaded
    Start,
    /// Once per frame, with the frame's delta time in seconds
    Update,
    /// Once at shutdown
    End,
}

impl Hook {
    /// Global function name the script defines for this hook
    pub fn name(self) -> &'static str {
        match self {
            Hook::Start => "Start",
            Hook::Update => "Update",
            Hook::End => "End",
        }
    }
}

/// Result of invoking a hook
#[derive(Debug)]
pub enum HookOutcome {
    /// The script does not define the hook
    Skipped,
    /// The hook ran to completion
    Completed,
    /// The hook raised an error; it was caught and reported
    Failed(Error),
}

impl HookOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, HookOutcome::Failed(_))
    }
}

/// Lua scripting host bound to a scene loader
pub struct ScriptHost {
    lua: Lua,
    registry: SharedRegistry,
    scenes: Rc<RefCell<Vec<(SceneId, WeakScene)>>>,
}

impl ScriptHost {
    /// Create a new host with the scene API registered
    pub fn new(loader: impl SceneLoader + 'static) -> Result<Self> {
        let host = Self {
            lua: Lua::new(),
            registry: PropertyRegistry::shared(),
            scenes: Rc::new(RefCell::new(Vec::new())),
        };
        host.bind_scene_api(Rc::new(loader))?;
        Ok(host)
    }

    fn bind_scene_api(&self, loader: Rc<dyn SceneLoader>) -> Result<()> {
        let registry = self.registry.clone();
        let scenes = self.scenes.clone();

        let load_scene = self.lua.create_function(move |_, args: LuaMultiValue| {
            let args = Args::new("LoadScene", args.into_iter().collect());
            args.expect(1)?;
            let path = args.string(0)?;

            let scene = loader
                .load(Path::new(&path))
                .map_err(BindingError::AssetLoad)?;
            propagate(&scene).map_err(BindingError::AssetLoad)?;

            tracing::info!("Script loaded scene {} ({} nodes)", path, scene.node_count());
            track(&scenes, &scene);
            Ok(SceneHandle::new(scene, registry.clone()))
        })?;
        self.lua.globals().set("LoadScene", load_scene)?;

        Ok(())
    }

    /// Get the underlying Lua state
    pub fn lua(&self) -> &Lua {
        &self.lua
    }

    /// Property tables created so far in this session
    pub fn registry(&self) -> Ref<'_, PropertyRegistry> {
        self.registry.borrow()
    }

    /// Publish an engine-owned scene to scripts as a global
    pub fn expose_scene(&self, name: &str, scene: &Scene) -> Result<()> {
        let handle = SceneHandle::new(scene.clone(), self.registry.clone());
        self.lua.globals().set(name, handle)?;
        track(&self.scenes, scene);
        Ok(())
    }

    /// Scenes loaded through this host that are still alive
    ///
    /// Dropped scenes are forgotten here and their property tables released.
    pub fn live_scenes(&self) -> Vec<Scene> {
        let mut scenes = self.scenes.borrow_mut();
        let mut live = Vec::with_capacity(scenes.len());
        scenes.retain(|(id, weak)| match weak.upgrade() {
            Some(scene) => {
                live.push(scene);
                true
            }
            None => {
                self.registry.borrow_mut().remove_scene(&self.lua, *id);
                false
            }
        });
        live
    }

    /// Recompute world transforms of every live scene
    ///
    /// Returns the number of nodes written. A scene that fails structurally
    /// is logged and skipped.
    pub fn propagate_transforms(&self) -> usize {
        self.live_scenes()
            .iter()
            .map(|scene| match propagate(scene) {
                Ok(count) => count,
                Err(e) => {
                    tracing::warn!("Skipping transform propagation: {}", e);
                    0
                }
            })
            .sum()
    }

    /// Load and execute a Lua file
    pub fn exec_file(&self, path: &Path) -> Result<()> {
        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => Error::ScriptNotFound(path.display().to_string()),
            _ => Error::Io(e),
        })?;
        self.exec_string(&content, &path.display().to_string())
    }

    /// Execute a Lua string under the given chunk name
    pub fn exec_string(&self, code: &str, name: &str) -> Result<()> {
        self.lua.load(code).set_name(name).exec()?;
        Ok(())
    }

    /// Load a script file (for hot-reload tracking)
    pub fn load_script(&self, path: &Path) -> Result<Script> {
        self.exec_file(path)?;
        tracing::info!("Loaded script {}", path.display());
        Ok(Script::new(path))
    }

    /// Reload a script if it has been modified
    ///
    /// The new modification time is recorded before the file runs, so a
    /// script that fails to reload is not retried until it changes again.
    pub fn reload_if_modified(&self, script: &mut Script) -> Result<bool> {
        if !script.is_modified() {
            return Ok(false);
        }

        script.modified = std::fs::metadata(&script.path)
            .ok()
            .and_then(|m| m.modified().ok());

        self.exec_file(&script.path)?;
        tracing::info!("Reloaded script {}", script.path.display());
        Ok(true)
    }

    /// Invoke a lifecycle hook if the script defines it
    ///
    /// Errors raised by the script are caught here, reported, and returned
    /// as [`HookOutcome::Failed`]; they never propagate further.
    pub fn call_hook(&self, hook: Hook, delta: f32) -> HookOutcome {
        let function = match self.lua.globals().get::<LuaValue>(hook.name()) {
            Ok(LuaValue::Function(function)) => function,
            Ok(_) => return HookOutcome::Skipped,
            Err(e) => return self.hook_failed(hook, e),
        };

        let result = match hook {
            Hook::Update => function.call::<()>(delta),
            Hook::Start | Hook::End => function.call::<()>(()),
        };

        match result {
            Ok(()) => HookOutcome::Completed,
            Err(e) => self.hook_failed(hook, e),
        }
    }

    fn hook_failed(&self, hook: Hook, error: LuaError) -> HookOutcome {
        let error = Error::ScriptRuntime {
            hook: hook.name(),
            message: error.to_string(),
        };
        tracing::error!("{}", error);
        HookOutcome::Failed(error)
    }

    /// Get a global value from Lua
    pub fn get_global<T: FromLua>(&self, name: &str) -> Result<T> {
        let value = self.lua.globals().get(name)?;
        Ok(value)
    }

    /// Set a global value in Lua
    pub fn set_global<T: IntoLua>(&self, name: &str, value: T) -> Result<()> {
        self.lua.globals().set(name, value)?;
        Ok(())
    }
}

/// Remember `scene` for per-frame propagation, once
fn track(scenes: &RefCell<Vec<(SceneId, WeakScene)>>, scene: &Scene) {
    let mut scenes = scenes.borrow_mut();
    if !scenes.iter().any(|(id, _)| *id == scene.id()) {
        scenes.push((scene.id(), scene.downgrade()));
    }
}
