use crate::color::Color;
use serde::Serialize;

/// Polygon paint options in the shape Leaflet's `setStyle` accepts.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureStyle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill_color: Option<Color>,
    pub weight: u32,
    pub opacity: f64,
    pub color: &'static str,
    pub dash_array: &'static str,
    pub fill_opacity: f64,
}

impl FeatureStyle {
    /// Outline every country is drawn with.
    pub fn base() -> Self {
        Self {
            fill_color: None,
            weight: 2,
            opacity: 1.0,
            color: "white",
            dash_array: "3",
            fill_opacity: 0.7,
        }
    }

    pub fn filled(color: Color) -> Self {
        Self {
            fill_color: Some(color),
            ..Self::base()
        }
    }

    /// Applied on top of the fill while a country is hovered.
    pub fn highlight() -> Self {
        Self {
            fill_color: None,
            weight: 5,
            opacity: 1.0,
            color: "#666",
            dash_array: "",
            fill_opacity: 0.7,
        }
    }
}
