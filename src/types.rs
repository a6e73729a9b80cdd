use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

pub const TOTAL_ECOLOGICAL_FOOTPRINT: &str = "Total Ecological Footprint";
pub const HDI: &str = "HDI";
pub const POPULATION: &str = "Population (millions)";
pub const GDP_PER_CAPITA: &str = "GDP per Capita";

/// A selectable scalar the map can be colored by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Metric {
    #[default]
    TotalEcologicalFootprint,
    Hdi,
    Population,
    GdpPerCapita,
}

impl Metric {
    pub const ALL: [Metric; 4] = [
        Metric::TotalEcologicalFootprint,
        Metric::Hdi,
        Metric::Population,
        Metric::GdpPerCapita,
    ];

    /// Property name in both datasets.
    pub fn key(self) -> &'static str {
        match self {
            Metric::TotalEcologicalFootprint => TOTAL_ECOLOGICAL_FOOTPRINT,
            Metric::Hdi => HDI,
            Metric::Population => POPULATION,
            Metric::GdpPerCapita => GDP_PER_CAPITA,
        }
    }

    pub fn unit(self) -> Option<&'static str> {
        match self {
            Metric::TotalEcologicalFootprint => Some("gha per capita"),
            Metric::Hdi => None,
            Metric::Population => Some("million people"),
            Metric::GdpPerCapita => Some("USD"),
        }
    }

    /// File-name friendly identifier.
    pub fn slug(self) -> &'static str {
        match self {
            Metric::TotalEcologicalFootprint => "total-ecological-footprint",
            Metric::Hdi => "hdi",
            Metric::Population => "population",
            Metric::GdpPerCapita => "gdp-per-capita",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Metric {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Metric::ALL
            .into_iter()
            .find(|m| m.key() == s || m.slug().eq_ignore_ascii_case(s))
            .ok_or_else(|| anyhow!("Unknown metric: {:?}", s))
    }
}

impl TryFrom<String> for Metric {
    type Error = anyhow::Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Metric> for String {
    fn from(m: Metric) -> Self {
        m.key().to_string()
    }
}

/// A country boundary from the boundary dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoFeature {
    pub name: String,
    // Opaque to the joiner, handed to the renderer as is.
    pub geometry: Option<geojson::Geometry>,
    pub properties: Map<String, Value>,
    /// Fields of the metrics record merged in by the joiner, `None` while
    /// unmatched. Metric values are read from here only, never from the
    /// boundary's own properties.
    pub record: Option<Map<String, Value>>,
}

impl GeoFeature {
    pub fn new(name: impl Into<String>, geometry: Option<geojson::Geometry>, properties: Map<String, Value>) -> Self {
        Self {
            name: name.into(),
            geometry,
            properties,
            record: None,
        }
    }

    pub fn value(&self, metric: Metric) -> Option<f64> {
        numeric_value(self.record.as_ref()?.get(metric.key()))
    }
}

/// One country's row from the metrics dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricRecord {
    pub country: String,
    pub fields: Map<String, Value>,
    /// Set once the joiner has merged this record into a feature.
    pub used: bool,
}

impl MetricRecord {
    pub fn new(country: impl Into<String>, fields: Map<String, Value>) -> Self {
        Self {
            country: country.into(),
            fields,
            used: false,
        }
    }

    pub fn value(&self, metric: Metric) -> Option<f64> {
        numeric_value(self.fields.get(metric.key()))
    }
}

/// Metric records keyed by the country name as spelled in the metrics dataset.
pub type MetricTable = BTreeMap<String, MetricRecord>;

pub(crate) fn numeric_value(value: Option<&Value>) -> Option<f64> {
    value.and_then(Value::as_f64).filter(|v| !v.is_nan())
}
