use crate::types::{Metric, MetricTable};

/// Number of colored buckets a scale is divided into.
pub const BUCKETS: usize = 8;

/// Observed value range of one metric. Always `min <= max`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scale {
    pub min: f64,
    pub max: f64,
}

impl Scale {
    /// Range of the non-NaN values, or `None` when there are none.
    pub fn from_values<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        values
            .into_iter()
            .filter(|v| !v.is_nan())
            .fold(None, |acc, v| match acc {
                None => Some(Scale { min: v, max: v }),
                Some(s) => Some(Scale {
                    min: s.min.min(v),
                    max: s.max.max(v),
                }),
            })
    }

    pub fn step(&self) -> f64 {
        (self.max - self.min) / BUCKETS as f64
    }

    /// Lower edge of bucket `k`, rounded to 2 decimals. Bucket 0 starts at
    /// `min`; buckets 1 to 7 are the classification thresholds.
    pub fn boundary(&self, k: usize) -> f64 {
        round2(self.min + k as f64 * self.step())
    }
}

/// Rounds half away from zero to 2 decimals.
pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

pub fn compute_scale(metrics: &MetricTable, metric: Metric) -> Option<Scale> {
    Scale::from_values(metrics.values().filter_map(|record| record.value(metric)))
}
