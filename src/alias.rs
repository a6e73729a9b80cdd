use crate::config::AliasConfig;
use std::collections::HashMap;
use tracing::warn;

// Metrics-dataset name -> boundary-dataset name. `None` marks countries the
// boundary dataset has no shape for.
const BUILTIN: &[(&str, Option<&str>)] = &[
    ("Antigua and Barbuda", Some("Antigua and Barb.")),
    ("Bosnia and Herzegovina", Some("Bosnia and Herz.")),
    ("British Virgin Islands", Some("British Virgin Is.")),
    ("Brunei Darussalam", Some("Brunei")),
    ("Cabo Verde", Some("Cape Verde")),
    ("Cayman Islands", Some("Cayman Is.")),
    ("Central African Republic", Some("Central African Rep.")),
    ("Congo", Some("Congo (Brazzaville)")),
    ("Congo, Democratic Republic of", Some("Congo (Kinshasa)")),
    ("Côte d'Ivoire", Some("Ivory Coast")),
    ("Czech Republic", Some("Czech Rep.")),
    ("Dominican Republic", Some("Dominican Rep.")),
    ("Equatorial Guinea", Some("Eq. Guinea")),
    ("French Guiana", None),
    ("French Polynesia", Some("Fr. Polynesia")),
    ("Guadeloupe", None),
    ("Guinea-Bissau", Some("Guinea Bissau")),
    ("Iran, Islamic Republic of", Some("Iran")),
    ("Korea, Democratic People's Republic of", Some("N. Korea")),
    ("Korea, Republic of", Some("S. Korea")),
    ("Lao People's Democratic Republic", Some("Laos")),
    ("Libyan Arab Jamahiriya", Some("Libya")),
    ("Macedonia TFYR", Some("Macedonia")),
    ("Martinique", None),
    ("Réunion", None),
    ("Russian Federation", Some("Russia")),
    ("Saint Kitts and Nevis", Some("St. Kitts and Nevis")),
    ("Saint Vincent and Grenadines", Some("St. Vin. and Gren.")),
    ("Solomon Islands", Some("Solomon Is.")),
    ("Syrian Arab Republic", Some("Syria")),
    ("Tanzania, United Republic of", Some("Tanzania")),
    ("Timor-Leste", Some("East Timor")),
    ("United States of America", Some("United States")),
    ("Venezuela, Bolivarian Republic of", Some("Venezuela")),
    ("Viet Nam", Some("Vietnam")),
    ("Wallis and Futuna Islands", Some("Wallis and Futuna")),
];

/// Name correspondences between the metrics dataset and the boundary dataset.
///
/// Both directions are plain lookups built once; nothing is mutated after
/// construction.
#[derive(Debug, Clone, Default)]
pub struct AliasTable {
    to_geo: HashMap<String, Option<String>>,
    to_metrics: HashMap<String, String>,
}

impl AliasTable {
    pub fn builtin() -> Self {
        Self::from_entries(builtin_entries())
    }

    /// Built-in table extended by the `[aliases]` config section. Config
    /// entries replace built-in ones with the same metrics name.
    pub fn with_config(config: &AliasConfig) -> Self {
        let extra = config
            .extra
            .iter()
            .map(|(metrics, geo)| (metrics.clone(), Some(geo.clone())));
        let unmatched = config.unmatched.iter().map(|metrics| (metrics.clone(), None));
        Self::from_entries(builtin_entries().chain(extra).chain(unmatched))
    }

    /// Later entries for the same metrics name win. When two metrics names
    /// point at the same boundary name, the inverse keeps the one that sorts
    /// last.
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, Option<String>)>,
    {
        let to_geo: HashMap<String, Option<String>> = entries.into_iter().collect();

        let mut pairs: Vec<(&String, &String)> = to_geo
            .iter()
            .filter_map(|(metrics, geo)| geo.as_ref().map(|geo| (metrics, geo)))
            .collect();
        pairs.sort();

        let mut to_metrics = HashMap::with_capacity(pairs.len());
        for (metrics, geo) in pairs {
            if let Some(previous) = to_metrics.insert(geo.clone(), metrics.clone()) {
                warn!(
                    "Alias target {:?} claimed by both {:?} and {:?}; keeping {:?}",
                    geo, previous, metrics, metrics
                );
            }
        }

        Self { to_geo, to_metrics }
    }

    pub fn resolve_to_geo_name(&self, metrics_name: &str) -> Option<&str> {
        self.to_geo.get(metrics_name).and_then(|geo| geo.as_deref())
    }

    pub fn resolve_to_metrics_name(&self, geo_name: &str) -> Option<&str> {
        self.to_metrics.get(geo_name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.to_geo.len()
    }

    pub fn is_empty(&self) -> bool {
        self.to_geo.is_empty()
    }
}

fn builtin_entries() -> impl Iterator<Item = (String, Option<String>)> {
    BUILTIN
        .iter()
        .map(|(metrics, geo)| (metrics.to_string(), geo.map(str::to_string)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_both_directions() {
        let table = AliasTable::builtin();
        assert_eq!(table.resolve_to_geo_name("Russian Federation"), Some("Russia"));
        assert_eq!(table.resolve_to_metrics_name("Russia"), Some("Russian Federation"));
        assert_eq!(table.resolve_to_geo_name("Canada"), None);
        assert_eq!(table.resolve_to_metrics_name("Canada"), None);
    }

    #[test]
    fn builtin_aliases_are_symmetric() {
        let table = AliasTable::builtin();
        assert_eq!(table.len(), BUILTIN.len());
        for (metrics, geo) in BUILTIN.iter().filter_map(|(m, g)| g.map(|g| (*m, g))) {
            assert_eq!(table.resolve_to_geo_name(metrics), Some(geo));
            assert_eq!(table.resolve_to_metrics_name(geo), Some(metrics));
        }
    }

    #[test]
    fn entries_without_equivalent_resolve_to_nothing() {
        let table = AliasTable::builtin();
        for name in ["French Guiana", "Guadeloupe", "Martinique", "Réunion"] {
            assert_eq!(table.resolve_to_geo_name(name), None);
            assert_eq!(table.resolve_to_metrics_name(name), None);
        }
    }

    #[test]
    fn inverse_collision_keeps_last_sorted_entry() {
        let table = AliasTable::from_entries([
            ("Burma".to_string(), Some("Myanmar".to_string())),
            ("Anciently Burma".to_string(), Some("Myanmar".to_string())),
        ]);
        assert_eq!(table.resolve_to_metrics_name("Myanmar"), Some("Burma"));
        assert_eq!(table.resolve_to_geo_name("Anciently Burma"), Some("Myanmar"));
    }

    #[test]
    fn config_overrides_builtin() {
        let config = AliasConfig {
            extra: [("Czechia".to_string(), "Czech Rep.".to_string())]
                .into_iter()
                .collect(),
            unmatched: vec!["Russian Federation".to_string()],
        };
        let table = AliasTable::with_config(&config);
        assert_eq!(table.resolve_to_geo_name("Russian Federation"), None);
        assert_eq!(table.resolve_to_metrics_name("Russia"), None);
        // "Czechia" sorts after "Czech Republic" and takes the inverse.
        assert_eq!(table.resolve_to_metrics_name("Czech Rep."), Some("Czechia"));
        assert_eq!(table.resolve_to_geo_name("Czech Republic"), Some("Czech Rep."));
    }
}
