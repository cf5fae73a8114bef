use std::{fs, path::Path};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{display::DisplayScale, palette::ClassPalette};

/// Settings shared by all renderers.
///
/// Contains fields for:
///
/// - `palette`: class colours and names, slot 0 being "No Data".
/// - `composite_bands`: band triple drawn as red, green and blue.
/// - `composite_scale`: mapping of raw values into the display range.
/// - `resolution`: output size of single-panel plots in pixels.
/// - `augmentation_noise` and `seed`: parameters of the noise augmentation.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(default)]
pub struct Config {
    pub palette: ClassPalette,
    pub composite_bands: [usize; 3],
    pub composite_scale: DisplayScale,
    pub resolution: (u32, u32),
    pub augmentation_noise: f32,
    pub seed: u64,
}

impl Default for Config {
    #[tracing::instrument(level = "info")]
    fn default() -> Self {
        info!("Creating default config");
        Self {
            palette: ClassPalette::default(),
            composite_bands: [25, 15, 5],
            composite_scale: DisplayScale::default(),
            resolution: (800, 600),
            augmentation_noise: 0.01,
            seed: 42,
        }
    }
}

impl Config {
    /// Reads a config from a TOML file. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid config,
    /// including palettes with unknown colours or mismatched lengths.
    #[tracing::instrument(level = "debug")]
    pub fn load(path: &Path) -> Result<Self> {
        debug!("Loading config.");
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Could not read config file '{}'", path.display()))?;
        let config: Self = toml::from_str(&contents)
            .with_context(|| format!("Could not parse config file '{}'", path.display()))?;
        Ok(config)
    }

    /// Writes the config as TOML, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialised or written.
    #[tracing::instrument(level = "debug")]
    pub fn save(&self, path: &Path) -> Result<()> {
        debug!("Saving config.");
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Could not create directory '{}'", parent.display()))?;
        }
        let contents = toml::to_string(self).context("Could not serialise config")?;
        fs::write(path, contents)
            .with_context(|| format!("Could not write config file '{}'", path.display()))?;
        Ok(())
    }
}
