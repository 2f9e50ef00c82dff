//! Settings for the FreeSurfer-backed database and the voxel to vertex mapper, read from TOML.
//!
//! ```toml
//! subjects_dir = "/data/subjects"
//! surface = "fiducial"
//! annot = "aparc"
//! colormap = "RdBu_r"
//!
//! [mapper]
//! method = "line_nearest"
//! samples = 32
//! ```

use serde::Deserialize;

use std::fs;
use std::path::{Path, PathBuf};

use crate::db::SurfaceKind;
use crate::error::{CortexRoiError, Result};
use crate::mapper::MapperMethod;
use crate::volume::DEFAULT_COLORMAP;

pub const DEFAULT_MAPPER_SAMPLES: usize = 32;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MapperConfig {
    #[serde(default)]
    pub method: MapperMethod,
    #[serde(default = "default_samples")]
    pub samples: usize,
}

impl Default for MapperConfig {
    fn default() -> Self {
        MapperConfig {
            method: MapperMethod::default(),
            samples: DEFAULT_MAPPER_SAMPLES,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RoiConfig {
    pub subjects_dir: PathBuf,
    #[serde(default)]
    pub surface: SurfaceKind,
    #[serde(default)]
    pub annot: Option<String>,
    #[serde(default)]
    pub mapper: MapperConfig,
    #[serde(default = "default_colormap")]
    pub colormap: String,
}

fn default_samples() -> usize {
    DEFAULT_MAPPER_SAMPLES
}

fn default_colormap() -> String {
    String::from(DEFAULT_COLORMAP)
}

impl RoiConfig {
    /// A configuration with all defaults for the given subjects directory.
    pub fn new<P: AsRef<Path>>(subjects_dir: P) -> RoiConfig {
        RoiConfig {
            subjects_dir: subjects_dir.as_ref().to_path_buf(),
            surface: SurfaceKind::default(),
            annot: None,
            mapper: MapperConfig::default(),
            colormap: default_colormap(),
        }
    }

    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<RoiConfig> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            CortexRoiError::Config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;
        RoiConfig::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<RoiConfig> {
        let config: RoiConfig = toml::from_str(content)
            .map_err(|e| CortexRoiError::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.mapper.samples == 0 {
            return Err(CortexRoiError::Config(String::from("mapper.samples must be greater than 0")));
        }
        if self.colormap.trim().is_empty() {
            return Err(CortexRoiError::Config(String::from("colormap must not be empty")));
        }
        Ok(())
    }
}
