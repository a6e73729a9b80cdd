use crate::types::{Metric, GDP_PER_CAPITA};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub input: InputConfig,
    #[serde(default)]
    pub aliases: AliasConfig,
    #[serde(default)]
    pub map: MapConfig,
    pub output: OutputConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct InputConfig {
    pub boundaries: PathBuf, // GeoJSON FeatureCollection
    pub metrics: PathBuf,    // JSON array or CSV
    #[serde(default = "default_name_property")]
    pub name_property: String,
    #[serde(default = "default_country_field")]
    pub country_field: String,
    /// Fields holding strings like "$12,345.67".
    #[serde(default = "default_currency_fields")]
    pub currency_fields: Vec<String>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AliasConfig {
    /// Additional metrics-name -> boundary-name entries.
    #[serde(default)]
    pub extra: HashMap<String, String>,
    /// Metrics names known to have no boundary.
    #[serde(default)]
    pub unmatched: Vec<String>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct MapConfig {
    #[serde(default)]
    pub default_metric: Metric,
}

#[derive(Debug, Deserialize, Clone)]
pub struct OutputConfig {
    pub dir: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_web_dir")]
    pub web_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            web_dir: default_web_dir(),
        }
    }
}

fn default_name_property() -> String {
    "NAME".to_string()
}

fn default_country_field() -> String {
    "Country".to_string()
}

fn default_currency_fields() -> Vec<String> {
    vec![GDP_PER_CAPITA.to_string()]
}

fn default_port() -> u16 {
    3000
}

fn default_web_dir() -> PathBuf {
    PathBuf::from("web")
}

impl AppConfig {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).with_context(|| "Failed to parse TOML configuration")
    }
}
