//! Command line argument processing for the player
//!
//! Every flag is optional and overrides the matching setting from the KDL
//! configuration file (or the built-in defaults when no file is given).

use anyhow::anyhow;
use clap::Parser;
use scripting::EngineConfig;
use std::path::PathBuf;

/// Run a Lua game script against the scene graph without a renderer
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "player", version, about)]
pub struct PlayerArgs {
    /// Lua script defining Start/Update/End
    #[arg(long, short = 's', value_name = "PATH")]
    pub script: Option<PathBuf>,

    /// Load engine configuration from a KDL file
    #[arg(long, short = 'c', value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Directory LoadScene paths are resolved against
    #[arg(long, short = 'a', value_name = "DIR")]
    pub assets: Option<PathBuf>,

    /// Number of update frames to run
    #[arg(long, short = 'f', value_name = "FRAMES")]
    pub frames: Option<u64>,

    /// Delta time passed to Update, in seconds
    #[arg(long, value_name = "SECONDS")]
    pub frame_time: Option<f32>,

    /// Reload the script between frames when it changes on disk
    #[arg(long)]
    pub watch: bool,

    /// Print world positions of every live scene after the End hook
    #[arg(long)]
    pub dump: bool,
}

impl PlayerArgs {
    /// Apply the command line overrides to a configuration
    pub fn apply_to(&self, mut config: EngineConfig) -> EngineConfig {
        if let Some(ref script) = self.script {
            config.script = Some(script.clone());
        }

        if let Some(ref assets) = self.assets {
            config.assets = assets.clone();
        }

        if let Some(frames) = self.frames {
            config.frames = frames;
        }

        if let Some(frame_time) = self.frame_time {
            config.frame_time = frame_time;
        }

        config
    }

    /// Resolve the final configuration: file (if any), then flags
    pub fn load_config(&self) -> anyhow::Result<EngineConfig> {
        let base = match self.config {
            Some(ref path) => EngineConfig::from_file(path)
                .map_err(|e| anyhow!("failed to read config {}: {}", path.display(), e))?,
            None => EngineConfig::default(),
        };
        Ok(self.apply_to(base))
    }
}
