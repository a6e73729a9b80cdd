use crate::alias::AliasTable;
use crate::types::{GeoFeature, MetricTable};
use serde::Serialize;
use tracing::debug;

/// Outcome of merging metric records into boundary features.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct JoinReport {
    pub matched: usize,
    /// Boundary names with no metrics record.
    pub unmatched_features: Vec<String>,
    /// Metrics records no boundary picked up.
    pub unused_records: Vec<String>,
}

/// Merges each feature's metric record into its properties.
///
/// A feature is matched by its own name first, then through the alias table.
/// Record fields overwrite boundary properties of the same name, so joining
/// twice gives the same properties as joining once. This includes the
/// record's country-name field, which replaces a boundary property of the
/// same name. Unmatched features keep their boundary properties only.
pub fn join(features: &mut [GeoFeature], metrics: &mut MetricTable, aliases: &AliasTable) -> JoinReport {
    let mut report = JoinReport::default();

    for feature in features.iter_mut() {
        let key = if metrics.contains_key(feature.name.as_str()) {
            Some(feature.name.as_str())
        } else {
            aliases.resolve_to_metrics_name(&feature.name)
        };

        let Some(record) = key.and_then(|key| metrics.get_mut(key)) else {
            debug!("No metrics for {:?}", feature.name);
            report.unmatched_features.push(feature.name.clone());
            continue;
        };

        record.used = true;
        for (field, value) in &record.fields {
            feature.properties.insert(field.clone(), value.clone());
        }
        feature.record = Some(record.fields.clone());
        report.matched += 1;
    }

    report.unused_records = metrics
        .values()
        .filter(|record| !record.used)
        .map(|record| record.country.clone())
        .collect();
    for country in &report.unused_records {
        debug!("Metrics for {:?} matched no boundary", country);
    }

    report
}
