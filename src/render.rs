use crate::config::AppConfig;
use crate::state::MapState;
use crate::types::Metric;
use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Serialize)]
struct MetricIndexEntry {
    metric: Metric,
    unit: Option<&'static str>,
    map: String,
    legend: String,
}

/// Writes `<slug>.geojson` and `<slug>.legend.json` for every metric into the
/// output directory, plus a `metrics.json` index and the `join-report.json`
/// of unmatched names. Leaves `state` showing the metric it started with.
pub fn generate_outputs(config: &AppConfig, state: &mut MapState, metrics: &[Metric]) -> Result<Vec<PathBuf>> {
    let out_dir = &config.output.dir;
    fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create output directory: {:?}", out_dir))?;

    let initial = state.selected();
    let mut written = Vec::new();
    let mut index = Vec::new();

    for &metric in metrics {
        state.select_metric(metric);

        let map_name = format!("{}.geojson", metric.slug());
        let legend_name = format!("{}.legend.json", metric.slug());
        let map_path = out_dir.join(&map_name);
        let legend_path = out_dir.join(&legend_name);

        write_json(&map_path, &state.styled_collection()?)?;
        write_json(&legend_path, &state.legend())?;
        info!("Wrote {} to {:?}", metric, map_path);

        index.push(MetricIndexEntry {
            metric,
            unit: metric.unit(),
            map: map_name,
            legend: legend_name,
        });
        written.push(map_path);
        written.push(legend_path);
    }

    let index_path = out_dir.join("metrics.json");
    write_json(&index_path, &index)?;
    written.push(index_path);

    let report_path = out_dir.join("join-report.json");
    write_json(&report_path, state.report())?;
    written.push(report_path);

    state.select_metric(initial);
    Ok(written)
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string(value)
        .with_context(|| format!("Failed to serialize {:?}", path))?;
    fs::write(path, json).with_context(|| format!("Failed to write {:?}", path))
}
