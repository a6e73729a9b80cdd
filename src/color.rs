use crate::scale::{Scale, BUCKETS};
use serde::{Serialize, Serializer};
use std::fmt;

/// A fill color as a CSS hex string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color(&'static str);

/// Sequential palette, light to dark, one color per bucket.
pub const PALETTE: [Color; BUCKETS] = [
    Color("#FFEDA0"),
    Color("#FED976"),
    Color("#FEB24C"),
    Color("#FD8D3C"),
    Color("#FC4E2A"),
    Color("#E31A1C"),
    Color("#BD0026"),
    Color("#800026"),
];

/// Countries without data.
pub const UNKNOWN: Color = Color("#eeeeee");

impl Color {
    pub fn hex(self) -> &'static str {
        self.0
    }

    pub fn is_unknown(self) -> bool {
        self == UNKNOWN
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.0)
    }
}

/// Index of the bucket `value` falls into. A value equal to a threshold
/// stays in the lower bucket.
pub fn bucket(value: f64, scale: &Scale) -> usize {
    (1..BUCKETS)
        .rev()
        .find(|&k| value > scale.boundary(k))
        .unwrap_or(0)
}

pub fn classify(value: Option<f64>, scale: Option<&Scale>) -> Color {
    match (value, scale) {
        (Some(v), Some(scale)) if !v.is_nan() => PALETTE[bucket(v, scale)],
        _ => UNKNOWN,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HDI: Scale = Scale { min: 77.9, max: 92.9 };

    #[test]
    fn extremes_hit_the_end_buckets() {
        assert_eq!(classify(Some(92.9), Some(&HDI)).hex(), "#800026");
        assert_eq!(classify(Some(77.9), Some(&HDI)).hex(), "#FFEDA0");
    }

    #[test]
    fn missing_value_or_scale_is_unknown() {
        assert_eq!(classify(None, Some(&HDI)), UNKNOWN);
        assert_eq!(classify(Some(f64::NAN), Some(&HDI)), UNKNOWN);
        assert_eq!(classify(Some(80.0), None), UNKNOWN);
        assert!(UNKNOWN.is_unknown());
        assert!(!PALETTE.contains(&UNKNOWN));
    }

    #[test]
    fn threshold_value_stays_in_lower_bucket() {
        let scale = Scale { min: 0.0, max: 8.0 };
        assert_eq!(bucket(1.0, &scale), 0);
        assert_eq!(bucket(1.01, &scale), 1);
        assert_eq!(bucket(7.0, &scale), 6);
        assert_eq!(bucket(7.5, &scale), 7);
        assert_eq!(bucket(0.0, &scale), 0);
    }

    #[test]
    fn every_value_inside_the_scale_gets_a_data_color() {
        let values = [3.2, 0.5, 12.75, 7.0, 9.99, 0.5, 4.4];
        let scale = Scale::from_values(values).unwrap();
        for v in values {
            assert!(!classify(Some(v), Some(&scale)).is_unknown());
        }
    }

    #[test]
    fn flat_scale_puts_everything_in_first_bucket() {
        let scale = Scale { min: 5.0, max: 5.0 };
        assert_eq!(classify(Some(5.0), Some(&scale)), PALETTE[0]);
    }

    #[test]
    fn classification_is_monotonic() {
        let scale = Scale { min: -3.0, max: 41.0 };
        let mut last = 0;
        for i in -30..=410 {
            let b = bucket(i as f64 / 10.0, &scale);
            assert!(b >= last);
            last = b;
        }
        assert_eq!(last, BUCKETS - 1);
    }
}
