use gridgrab_world::GrabberConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::warn;

const DEFAULT_SIM_CONFIG_PATH: &str = "config/sim.toml";

/// Top-level simulation configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SimConfig {
    /// Ticks to simulate when `--ticks` is not given.
    pub max_ticks: u64,
    pub world: WorldConfig,
    pub grabber: GrabberConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WorldConfig {
    /// World seed; every demo world layout derives from it.
    pub seed: u64,
    /// Number of grabber/container stations in the demo world.
    pub station_count: u32,
    /// Units stocked into each source container.
    pub source_stock: u32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            max_ticks: 600,
            world: WorldConfig::default(),
            grabber: GrabberConfig::default(),
        }
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            station_count: 4,
            source_stock: 12,
        }
    }
}

impl SimConfig {
    /// Load simulation configuration from the default path.
    pub fn load() -> Self {
        Self::load_from_path(Path::new(DEFAULT_SIM_CONFIG_PATH))
    }

    /// Load configuration from an explicit path, falling back to defaults on errors.
    pub fn load_from_path(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<SimConfig>(&contents) {
                Ok(cfg) => cfg,
                Err(err) => {
                    warn!("Failed to parse {}: {err}. Using defaults", path.display());
                    SimConfig::default()
                }
            },
            Err(err) => {
                warn!("Failed to read {}: {err}. Using defaults", path.display());
                SimConfig::default()
            }
        }
    }
}
