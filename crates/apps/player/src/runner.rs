//! Headless frame loop
//!
//! Runs `Start`, then `frames` iterations of `Update` followed by transform
//! propagation, then `End`. A failing hook is reported and the loop carries
//! on with the next frame.

use anyhow::{anyhow, bail, Result};
use scene::{GltfLoader, Scene};
use scripting::{EngineConfig, Error, Hook, HookOutcome, Script, ScriptHost};
use std::fmt::Write;

/// Counters collected over a run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub frames: u64,
    pub hooks_completed: u32,
    pub hooks_failed: u32,
}

impl RunSummary {
    fn record(&mut self, outcome: HookOutcome) {
        match outcome {
            HookOutcome::Completed => self.hooks_completed += 1,
            HookOutcome::Failed(_) => self.hooks_failed += 1,
            HookOutcome::Skipped => {}
        }
    }
}

pub struct Runner {
    host: ScriptHost,
    script: Script,
    config: EngineConfig,
    watch: bool,
}

impl Runner {
    /// Create the host and load the configured script
    ///
    /// A missing script file is fatal. A script that fails while loading is
    /// reported and the run continues with whatever hooks were defined.
    pub fn new(config: EngineConfig, watch: bool) -> Result<Self> {
        let Some(path) = config.script.clone() else {
            bail!("no script given; pass --script or set `script` in the config file");
        };

        let host = ScriptHost::new(GltfLoader::new(&config.assets))
            .map_err(|e| anyhow!("failed to create Lua host: {}", e))?;

        let script = match host.load_script(&path) {
            Ok(script) => script,
            Err(Error::Lua(e)) => {
                tracing::error!("Lua Runtime Error: {}", e);
                Script::new(&path)
            }
            Err(e) => bail!("failed to load {}: {}", path.display(), e),
        };

        Ok(Self {
            host,
            script,
            config,
            watch,
        })
    }

    pub fn host(&self) -> &ScriptHost {
        &self.host
    }

    /// Drive the lifecycle hooks to completion
    pub fn run(&mut self) -> RunSummary {
        let mut summary = RunSummary::default();

        tracing::info!(
            "Running {} for {} frames",
            self.script.path.display(),
            self.config.frames
        );

        summary.record(self.host.call_hook(Hook::Start, 0.0));
        self.host.propagate_transforms();

        for frame in 0..self.config.frames {
            if self.watch {
                if let Err(e) = self.host.reload_if_modified(&mut self.script) {
                    tracing::error!("Reload failed: {}", e);
                }
            }

            summary.record(self.host.call_hook(Hook::Update, self.config.frame_time));
            let updated = self.host.propagate_transforms();
            summary.frames += 1;

            tracing::debug!("Frame {} propagated {} nodes", frame + 1, updated);
        }

        summary.record(self.host.call_hook(Hook::End, 0.0));

        tracing::info!(
            "Finished {} frames ({} hooks completed, {} failed)",
            summary.frames,
            summary.hooks_completed,
            summary.hooks_failed
        );

        summary
    }

    /// World positions of every node in every live scene
    pub fn dump(&self) -> String {
        let mut out = String::new();
        for scene in self.host.live_scenes() {
            dump_scene(&mut out, &scene);
        }
        out
    }
}

fn dump_scene(out: &mut String, scene: &Scene) {
    let _ = writeln!(out, "scene {} ({} nodes)", scene.id().0, scene.node_count());
    for node in scene.nodes() {
        let node = node.borrow();
        let p = node.world_position();
        let _ = writeln!(
            out,
            "  {} {:?}: ({:.3}, {:.3}, {:.3})",
            node.id(),
            node.name,
            p.x,
            p.y,
            p.z
        );
    }
}
