use crate::config::InputConfig;
use crate::types::{GeoFeature, MetricRecord, MetricTable};
use anyhow::{anyhow, bail, Context, Result};
use csv::ReaderBuilder;
use geojson::GeoJson;
use serde_json::{Map, Number, Value};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::{info, warn};

/// Loads the boundary and metrics datasets concurrently. Either failing is
/// fatal.
pub async fn load_datasets(input: &InputConfig) -> Result<(Vec<GeoFeature>, MetricTable)> {
    let boundaries = {
        let path = input.boundaries.clone();
        let name_property = input.name_property.clone();
        tokio::task::spawn_blocking(move || load_boundaries(&path, &name_property))
    };
    let metrics = {
        let path = input.metrics.clone();
        let country_field = input.country_field.clone();
        let currency_fields = input.currency_fields.clone();
        tokio::task::spawn_blocking(move || load_metrics(&path, &country_field, &currency_fields))
    };

    let (features, metrics) = tokio::try_join!(boundaries, metrics)?;
    Ok((features?, metrics?))
}

pub fn load_boundaries(path: &Path, name_property: &str) -> Result<Vec<GeoFeature>> {
    info!("Loading boundaries from {:?}...", path);
    let file = File::open(path)
        .with_context(|| format!("Failed to open boundary file: {:?}", path))?;
    let geojson = GeoJson::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse GeoJSON: {:?}", path))?;

    let collection = match geojson {
        GeoJson::FeatureCollection(fc) => fc,
        _ => return Err(anyhow!("Boundary GeoJSON must be a FeatureCollection")),
    };

    let mut features = Vec::with_capacity(collection.features.len());
    for feature in collection.features {
        let properties = feature.properties.unwrap_or_default();
        let name = match properties.get(name_property) {
            Some(Value::String(s)) => s.clone(),
            _ => {
                warn!("Skipping boundary feature without a {:?} string", name_property);
                continue;
            }
        };
        features.push(GeoFeature::new(name, feature.geometry, properties));
    }

    info!("Loaded {} boundary features", features.len());
    Ok(features)
}

pub fn load_metrics(
    path: &Path,
    country_field: &str,
    currency_fields: &[String],
) -> Result<MetricTable> {
    info!("Loading metrics from {:?}...", path);
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|s| s.to_lowercase())
        .ok_or_else(|| anyhow!("Metrics file has no extension"))?;

    let file = File::open(path)
        .with_context(|| format!("Failed to open metrics file: {:?}", path))?;
    let rows = match extension.as_str() {
        "json" => rows_from_json(BufReader::new(file)),
        "csv" => rows_from_csv(file),
        _ => return Err(anyhow!("Unsupported metrics format: {}", extension)),
    }
    .with_context(|| format!("Failed to read metrics: {:?}", path))?;

    let table = build_table(rows, country_field, currency_fields)?;
    info!("Loaded metrics for {} countries", table.len());
    Ok(table)
}

fn rows_from_json<R: Read>(reader: R) -> Result<Vec<Map<String, Value>>> {
    let rows: Vec<Value> = serde_json::from_reader(reader)?;
    rows.into_iter()
        .enumerate()
        .map(|(i, row)| match row {
            Value::Object(map) => Ok(map),
            _ => Err(anyhow!("Metrics entry {} is not an object", i)),
        })
        .collect()
}

fn rows_from_csv<R: Read>(reader: R) -> Result<Vec<Map<String, Value>>> {
    let mut rdr = ReaderBuilder::new().from_reader(reader);
    let headers = rdr.headers()?.clone();

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        let row = headers
            .iter()
            .zip(record.iter())
            .map(|(header, cell)| (header.to_string(), csv_cell(cell)))
            .collect();
        rows.push(row);
    }
    Ok(rows)
}

fn csv_cell(cell: &str) -> Value {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return Value::Null;
    }
    trimmed
        .parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .unwrap_or_else(|| Value::String(cell.to_string()))
}

fn build_table(
    rows: Vec<Map<String, Value>>,
    country_field: &str,
    currency_fields: &[String],
) -> Result<MetricTable> {
    let mut table = MetricTable::new();

    for (i, mut row) in rows.into_iter().enumerate() {
        let country = match row.get(country_field) {
            Some(Value::String(s)) if !s.is_empty() => s.clone(),
            _ => bail!("Metrics entry {} has no {:?} field", i, country_field),
        };

        for field in currency_fields {
            if let Some(Value::String(s)) = row.get(field) {
                let parsed = parse_currency(s)
                    .and_then(Number::from_f64)
                    .map_or(Value::Null, Value::Number);
                row.insert(field.clone(), parsed);
            }
        }

        if table.contains_key(&country) {
            warn!("Duplicate metrics entry for {:?}; keeping the last one", country);
        }
        table.insert(country.clone(), MetricRecord::new(country, row));
    }

    Ok(table)
}

/// Parses a currency string such as `"$12,345.67"` into `12345.67`. Text
/// after the longest numeric prefix is ignored.
pub fn parse_currency(s: &str) -> Option<f64> {
    let digits: String = s
        .trim()
        .trim_start_matches(|c: char| !(c.is_ascii_digit() || c == '-' || c == '.'))
        .chars()
        .take_while(|&c| c.is_ascii_digit() || matches!(c, ',' | '.' | '-'))
        .filter(|&c| c != ',')
        .collect();
    (1..=digits.len())
        .rev()
        .find_map(|n| digits[..n].parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Metric;
    use std::io::Write;
    use std::path::PathBuf;

    fn write_file(dir: &tempfile::TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    fn currency() -> Vec<String> {
        vec!["GDP per Capita".to_string()]
    }

    #[test]
    fn parses_currency_strings() {
        assert_eq!(parse_currency("$12,345.67"), Some(12345.67));
        assert_eq!(parse_currency("$1,000"), Some(1000.0));
        assert_eq!(parse_currency("€ 950.5"), Some(950.5));
        assert_eq!(parse_currency("12.5"), Some(12.5));
        assert_eq!(parse_currency("$1,234 (est.)"), Some(1234.0));
        assert_eq!(parse_currency("$3.5.1"), Some(3.5));
        assert_eq!(parse_currency("$"), None);
        assert_eq!(parse_currency(""), None);
    }

    #[test]
    fn loads_json_metrics_and_parses_currency() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "pollution.json",
            r#"[
                {"Country": "Canada", "HDI": 92.9, "GDP per Capita": "$45,000.50"},
                {"Country": "Chad", "HDI": 39.2, "GDP per Capita": "unknown"}
            ]"#,
        );

        let table = load_metrics(&path, "Country", &currency()).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table["Canada"].value(Metric::GdpPerCapita), Some(45000.5));
        assert_eq!(table["Chad"].fields["GDP per Capita"], Value::Null);
        assert_eq!(table["Chad"].value(Metric::Hdi), Some(39.2));
        assert!(!table["Canada"].used);
    }

    #[test]
    fn loads_csv_metrics() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "pollution.csv",
            "Country,Region,HDI,GDP per Capita\n\
             Mexico,Latin America,77.9,\"$9,500.00\"\n\
             Niue,Oceania,,\n",
        );

        let table = load_metrics(&path, "Country", &currency()).unwrap();
        let mexico = &table["Mexico"];
        assert_eq!(mexico.value(Metric::Hdi), Some(77.9));
        assert_eq!(mexico.value(Metric::GdpPerCapita), Some(9500.0));
        assert_eq!(mexico.fields["Region"], Value::String("Latin America".into()));
        assert_eq!(table["Niue"].value(Metric::Hdi), None);
    }

    #[test]
    fn missing_country_field_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "bad.json", r#"[{"Nation": "Canada"}]"#);
        assert!(load_metrics(&path, "Country", &currency()).is_err());
    }

    #[test]
    fn unsupported_extension_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "pollution.xml", "<x/>");
        assert!(load_metrics(&path, "Country", &currency()).is_err());
    }

    #[test]
    fn loads_boundaries_and_skips_unnamed() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "countries.json",
            r#"{
                "type": "FeatureCollection",
                "features": [
                    {"type": "Feature", "properties": {"NAME": "Canada", "ISO": "CA"},
                     "geometry": {"type": "Point", "coordinates": [-100.0, 60.0]}},
                    {"type": "Feature", "properties": {"ISO": "XX"}, "geometry": null}
                ]
            }"#,
        );

        let features = load_boundaries(&path, "NAME").unwrap();
        assert_eq!(features.len(), 1);
        assert_eq!(features[0].name, "Canada");
        assert_eq!(features[0].properties["ISO"], Value::String("CA".into()));
        assert!(features[0].geometry.is_some());
    }

    #[test]
    fn boundaries_must_be_a_feature_collection() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "point.json",
            r#"{"type": "Point", "coordinates": [0.0, 0.0]}"#,
        );
        assert!(load_boundaries(&path, "NAME").is_err());
    }

    #[tokio::test]
    async fn loads_both_datasets() {
        let dir = tempfile::tempdir().unwrap();
        let boundaries = write_file(
            &dir,
            "countries.json",
            r#"{"type": "FeatureCollection", "features": [
                {"type": "Feature", "properties": {"NAME": "Mexico"}, "geometry": null}
            ]}"#,
        );
        let metrics = write_file(&dir, "pollution.json", r#"[{"Country": "Mexico", "HDI": 77.9}]"#);
        let input = InputConfig {
            boundaries,
            metrics,
            name_property: "NAME".to_string(),
            country_field: "Country".to_string(),
            currency_fields: currency(),
        };

        let (features, table) = load_datasets(&input).await.unwrap();
        assert_eq!(features.len(), 1);
        assert_eq!(table.len(), 1);
    }

    #[tokio::test]
    async fn missing_dataset_fails_the_load() {
        let dir = tempfile::tempdir().unwrap();
        let metrics = write_file(&dir, "pollution.json", "[]");
        let input = InputConfig {
            boundaries: dir.path().join("missing.json"),
            metrics,
            name_property: "NAME".to_string(),
            country_field: "Country".to_string(),
            currency_fields: currency(),
        };
        assert!(load_datasets(&input).await.is_err());
    }
}
