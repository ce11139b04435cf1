//! Tuning parameters for a dream run, loadable from TOML files.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{DreamError, Result};

/// Tuning parameters for a multi-scale dream run.
///
/// All fields have defaults that reproduce the classic behaviour, so a
/// `DreamParams::default()` is a fully usable configuration. Parameters can
/// also be loaded from a TOML file with a `[dream]` table; keys absent from
/// the file keep their defaults.
///
/// ```toml
/// [dream]
/// epochs = 10
/// learning_rate = 1.0
/// layers = ["inception4c", "inception4e"]
/// inception_count = 5
/// scale_factor = 0.7
/// blend_factor = 0.3
/// blur_radius = 60.0
/// working_size = 512
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DreamParams {
    /// Gradient-ascent iterations per pyramid level.
    pub epochs: usize,
    /// Base step size, divided by the per-level learning weight.
    pub learning_rate: f32,
    /// Backbone stage names whose activations are maximised.
    pub layers: Vec<String>,
    /// Number of pyramid levels, including the original image.
    pub inception_count: usize,
    /// Downscale ratio between consecutive pyramid levels.
    pub scale_factor: f32,
    /// Weight of the carried dream when blending into the next level.
    pub blend_factor: f32,
    /// Gaussian blur sigma applied before each downscale, in pixels.
    pub blur_radius: f32,
    /// Square resolution at which each level is optimised.
    pub working_size: u32,
}

impl Default for DreamParams {
    fn default() -> Self {
        Self {
            epochs: 10,
            learning_rate: 1.0,
            layers: vec!["inception4c".to_string(), "inception4e".to_string()],
            inception_count: 5,
            scale_factor: 0.7,
            blend_factor: 0.3,
            blur_radius: 60.0,
            working_size: 512,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    dream: DreamParams,
}

impl DreamParams {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(&path)?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(toml_str)
            .map_err(|e| DreamError::ConfigError(e.to_string()))?;
        let params = file.dream;
        params.validate()?;
        Ok(params)
    }

    /// Rejects parameter combinations that cannot produce a dream.
    pub fn validate(&self) -> Result<()> {
        if self.layers.is_empty() {
            return Err(DreamError::ConfigError(
                "at least one monitored layer is required".to_string(),
            ));
        }
        if self.inception_count == 0 {
            return Err(DreamError::ConfigError(
                "inception_count must be at least 1".to_string(),
            ));
        }
        if self.scale_factor <= 0.0 {
            return Err(DreamError::ConfigError(
                "scale_factor must be positive".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.blend_factor) {
            return Err(DreamError::ConfigError(
                "blend_factor must be in [0, 1]".to_string(),
            ));
        }
        if self.working_size == 0 {
            return Err(DreamError::ConfigError(
                "working_size must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
