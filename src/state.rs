use crate::alias::AliasTable;
use crate::color::{classify, Color};
use crate::join::{join, JoinReport};
use crate::legend::Legend;
use crate::scale::{compute_scale, Scale};
use crate::style::FeatureStyle;
use crate::types::{GeoFeature, Metric, MetricTable};
use anyhow::Result;
use geojson::{Feature, FeatureCollection, JsonObject};
use serde::Serialize;
use tracing::info;

/// Text for the hover panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HoverInfo {
    pub title: &'static str,
    pub name: Option<String>,
    pub value: Option<f64>,
    pub text: String,
}

/// Joined map data plus the metric currently shown.
pub struct MapState {
    features: Vec<GeoFeature>,
    metrics: MetricTable,
    report: JoinReport,
    selected: Metric,
    scale: Option<Scale>,
}

impl MapState {
    pub fn new(
        mut features: Vec<GeoFeature>,
        mut metrics: MetricTable,
        aliases: &AliasTable,
        selected: Metric,
    ) -> Self {
        let report = join(&mut features, &mut metrics, aliases);
        info!(
            "Joined {} of {} boundaries ({} metrics records unused)",
            report.matched,
            features.len(),
            report.unused_records.len()
        );
        let scale = compute_scale(&metrics, selected);
        Self {
            features,
            metrics,
            report,
            selected,
            scale,
        }
    }

    pub fn features(&self) -> &[GeoFeature] {
        &self.features
    }

    pub fn report(&self) -> &JoinReport {
        &self.report
    }

    pub fn selected(&self) -> Metric {
        self.selected
    }

    pub fn scale(&self) -> Option<Scale> {
        self.scale
    }

    /// Switches the displayed metric; the previous scale is discarded.
    pub fn select_metric(&mut self, metric: Metric) {
        self.selected = metric;
        self.scale = compute_scale(&self.metrics, metric);
        match self.scale {
            Some(scale) => info!("Showing {}: {} to {}", metric, scale.min, scale.max),
            None => info!("Showing {}: no data", metric),
        }
    }

    pub fn color_of(&self, feature: &GeoFeature) -> Color {
        classify(feature.value(self.selected), self.scale.as_ref())
    }

    pub fn feature_style(&self, feature: &GeoFeature) -> FeatureStyle {
        FeatureStyle::filled(self.color_of(feature))
    }

    pub fn legend(&self) -> Legend {
        Legend::build(self.selected, self.scale.as_ref())
    }

    pub fn hover_info(&self, feature: Option<&GeoFeature>) -> HoverInfo {
        let title = self.selected.key();
        let Some(feature) = feature else {
            return HoverInfo {
                title,
                name: None,
                value: None,
                text: "Hover over a country".to_string(),
            };
        };

        let value = feature.value(self.selected);
        let text = match (value, self.selected.unit()) {
            (Some(v), Some(unit)) => format!("{} {}", v, unit),
            (Some(v), None) => v.to_string(),
            (None, _) => "Data unavailable".to_string(),
        };
        HoverInfo {
            title,
            name: Some(feature.name.clone()),
            value,
            text,
        }
    }

    /// The boundary dataset with joined properties, each feature carrying
    /// its paint options in a `style` member.
    pub fn styled_collection(&self) -> Result<FeatureCollection> {
        let features = self
            .features
            .iter()
            .map(|feature| -> Result<Feature> {
                let mut foreign = JsonObject::new();
                foreign.insert(
                    "style".to_string(),
                    serde_json::to_value(self.feature_style(feature))?,
                );
                Ok(Feature {
                    bbox: None,
                    geometry: feature.geometry.clone(),
                    id: None,
                    properties: Some(feature.properties.clone()),
                    foreign_members: Some(foreign),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(FeatureCollection {
            bbox: None,
            features,
            foreign_members: None,
        })
    }
}
