use crate::centroids;
use crate::types::Centroid;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub input: InputConfig,
    /// Optional centroid list; the built-in Goa registry is used when absent.
    pub centroids: Option<Vec<Centroid>>,
    #[serde(default)]
    pub quadrants: QuadrantConfig,
    #[serde(default)]
    pub map: MapConfig,
    pub output: OutputConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct InputConfig {
    pub data_csv: PathBuf,
    /// CSV columns shown in marker popups, in order.
    #[serde(default = "default_popup_fields")]
    pub popup_fields: Vec<String>,
}

/// Geographic midpoint the four quadrants are derived from.
#[derive(Debug, Deserialize, Clone)]
pub struct QuadrantConfig {
    #[serde(default = "default_center_longitude")]
    pub center_longitude: f64,
    #[serde(default = "default_center_latitude")]
    pub center_latitude: f64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MapConfig {
    #[serde(default = "default_map_longitude")]
    pub center_longitude: f64,
    #[serde(default = "default_map_latitude")]
    pub center_latitude: f64,
    #[serde(default = "default_zoom")]
    pub zoom: u8,
    /// Adds a point-density heatmap overlay to the rendered map.
    #[serde(default)]
    pub heatmap: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct OutputConfig {
    pub dir: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

fn default_popup_fields() -> Vec<String> {
    vec!["vehicleNumber".to_string(), "violations".to_string()]
}

fn default_center_longitude() -> f64 {
    73.99
}

fn default_center_latitude() -> f64 {
    15.35
}

fn default_map_longitude() -> f64 {
    73.8
}

fn default_map_latitude() -> f64 {
    15.4
}

fn default_zoom() -> u8 {
    10
}

impl Default for QuadrantConfig {
    fn default() -> Self {
        QuadrantConfig {
            center_longitude: default_center_longitude(),
            center_latitude: default_center_latitude(),
        }
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        MapConfig {
            center_longitude: default_map_longitude(),
            center_latitude: default_map_latitude(),
            zoom: default_zoom(),
            heatmap: false,
        }
    }
}

impl AppConfig {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config: AppConfig = toml::from_str(&content)
            .with_context(|| "Failed to parse TOML configuration")?;
        Ok(config)
    }

    /// Configured centroids, or the built-in registry when the config
    /// omits them. Validated before use (unique names, finite coords).
    pub fn resolve_centroids(&self) -> Result<Vec<Centroid>> {
        let list = match &self.centroids {
            Some(list) => list.clone(),
            None => centroids::default_centroids(),
        };
        centroids::validate(&list).context("Invalid centroid configuration")?;
        Ok(list)
    }
}
