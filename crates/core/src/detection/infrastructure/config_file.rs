use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::detection::domain::detection_config::{
    ColorClass, ConfigError, DetectionConfig, Thresholds,
};
use crate::detection::domain::hsv_range::HsvRange;
use crate::shared::color::Rgb;

const CONFIG_DIR_NAME: &str = "colortrack";
const CONFIG_FILE_NAME: &str = "config.json";

#[derive(Error, Debug)]
pub enum ConfigFileError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[source] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(#[from] ConfigError),
}

/// On-disk JSON shape. Keys match the tuning parameter names
/// (`hueMin`, `minArea`, ...); unknown keys are rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct ConfigDocument {
    #[serde(default = "default_classes")]
    classes: Vec<ClassEntry>,
    #[serde(default = "default_min_area")]
    min_area: u64,
    #[serde(default)]
    max_area: Option<u64>,
    #[serde(default = "default_max_region_count")]
    max_region_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct ClassEntry {
    name: String,
    hue_min: u8,
    hue_max: u8,
    sat_min: u8,
    sat_max: u8,
    val_min: u8,
    val_max: u8,
    marker_color: Rgb,
}

fn default_classes() -> Vec<ClassEntry> {
    DetectionConfig::default()
        .classes()
        .iter()
        .map(ClassEntry::from)
        .collect()
}

fn default_min_area() -> u64 {
    Thresholds::default().min_area
}

fn default_max_region_count() -> usize {
    Thresholds::default().max_region_count
}

impl From<&ColorClass> for ClassEntry {
    fn from(class: &ColorClass) -> Self {
        let r = class.range;
        Self {
            name: class.name.clone(),
            hue_min: r.hue_min,
            hue_max: r.hue_max,
            sat_min: r.sat_min,
            sat_max: r.sat_max,
            val_min: r.val_min,
            val_max: r.val_max,
            marker_color: class.marker_color,
        }
    }
}

impl From<ClassEntry> for ColorClass {
    fn from(entry: ClassEntry) -> Self {
        ColorClass::new(
            entry.name,
            HsvRange::new(
                (entry.hue_min, entry.hue_max),
                (entry.sat_min, entry.sat_max),
                (entry.val_min, entry.val_max),
            ),
            entry.marker_color,
        )
    }
}

impl ConfigDocument {
    fn into_config(self) -> Result<DetectionConfig, ConfigError> {
        let thresholds = Thresholds {
            min_area: self.min_area,
            max_area: self.max_area,
            max_region_count: self.max_region_count,
        };
        let classes = self.classes.into_iter().map(ColorClass::from).collect();
        DetectionConfig::new(classes, thresholds)
    }
}

impl From<&DetectionConfig> for ConfigDocument {
    fn from(config: &DetectionConfig) -> Self {
        let t = config.thresholds();
        Self {
            classes: config.classes().iter().map(ClassEntry::from).collect(),
            min_area: t.min_area,
            max_area: t.max_area,
            max_region_count: t.max_region_count,
        }
    }
}

/// Parses and validates a JSON configuration document.
pub fn parse(json: &str) -> Result<DetectionConfig, ConfigFileError> {
    let document: ConfigDocument = serde_json::from_str(json).map_err(ConfigFileError::Parse)?;
    Ok(document.into_config()?)
}

pub fn load(path: &Path) -> Result<DetectionConfig, ConfigFileError> {
    let json = fs::read_to_string(path).map_err(|source| ConfigFileError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&json)
}

/// Renders a configuration in the same JSON shape `parse` accepts.
pub fn to_json(config: &DetectionConfig) -> String {
    serde_json::to_string_pretty(&ConfigDocument::from(config))
        .expect("config document is always serializable")
}

/// Per-user config location, e.g. `~/.config/colortrack/config.json`.
pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

/// Loads the explicit file if given, else the per-user file if present,
/// else the built-in defaults.
pub fn resolve(explicit: Option<&Path>) -> Result<DetectionConfig, ConfigFileError> {
    if let Some(path) = explicit {
        log::info!("Loading detection config from {}", path.display());
        return load(path);
    }
    match default_path() {
        Some(path) if path.is_file() => {
            log::info!("Loading detection config from {}", path.display());
            load(&path)
        }
        _ => {
            log::info!("Using built-in detection config");
            Ok(DetectionConfig::default())
        }
    }
}
