use crate::color::{Color, PALETTE, UNKNOWN};
use crate::scale::{Scale, BUCKETS};
use crate::types::Metric;
use serde::Serialize;

/// Lower edges of the 8 buckets. Entries 1 to 7 are the exact thresholds the
/// classifier compares against.
pub fn build_boundaries(scale: &Scale) -> [f64; BUCKETS] {
    std::array::from_fn(|k| scale.boundary(k))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendEntry {
    pub from: f64,
    /// `None` for the open-ended top bucket.
    pub to: Option<f64>,
    pub color: Color,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Legend {
    pub metric: Metric,
    pub unit: Option<&'static str>,
    pub entries: Vec<LegendEntry>,
    pub unknown: Color,
}

impl Legend {
    /// Empty when the metric has no data.
    pub fn build(metric: Metric, scale: Option<&Scale>) -> Self {
        let entries = scale
            .map(|scale| {
                let bounds = build_boundaries(scale);
                bounds
                    .iter()
                    .enumerate()
                    .map(|(k, &from)| {
                        let to = bounds.get(k + 1).copied();
                        let label = match to {
                            Some(to) => format!("{} \u{2013} {}", from, to),
                            None => format!("{}+", from),
                        };
                        LegendEntry {
                            from,
                            to,
                            color: PALETTE[k],
                            label,
                        }
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self {
            metric,
            unit: metric.unit(),
            entries,
            unknown: UNKNOWN,
        }
    }
}
