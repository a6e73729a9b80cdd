use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use footprint_map::alias::AliasTable;
use footprint_map::config::AppConfig;
use footprint_map::state::MapState;
use footprint_map::types::Metric;
use footprint_map::{data, render, server};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write styled GeoJSON and legends for the map
    Generate {
        #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
        config: PathBuf,
        /// Only generate this metric (default: all)
        #[arg(short, long)]
        metric: Option<Metric>,
    },
    /// Serve the map API and front-end
    Serve {
        #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
        config: PathBuf,
        /// Metric shown at startup (default: from config)
        #[arg(short, long)]
        metric: Option<Metric>,
    },
}

async fn load_map(app_config: &AppConfig, metric: Metric) -> anyhow::Result<MapState> {
    let (features, metrics) = data::load_datasets(&app_config.input).await?;
    let aliases = AliasTable::with_config(&app_config.aliases);
    info!("Using {} country aliases", aliases.len());
    Ok(MapState::new(features, metrics, &aliases, metric))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate { config, metric } => {
            info!("Generating map with config: {:?}", config);
            let app_config = AppConfig::load_from_file(&config)?;

            // 1. Load and join data
            let initial = metric.unwrap_or(app_config.map.default_metric);
            let mut map = load_map(&app_config, initial).await?;

            // 2. Write styled maps, legends and the join report
            let metrics = match metric {
                Some(m) => vec![m],
                None => Metric::ALL.to_vec(),
            };
            let written = render::generate_outputs(&app_config, &mut map, &metrics)?;

            info!("Generation complete: {} files in {:?}", written.len(), app_config.output.dir);
        }
        Commands::Serve { config, metric } => {
            info!("Serving map with config: {:?}", config);
            let app_config = AppConfig::load_from_file(&config)?;

            // 1. Load and join data
            let initial = metric.unwrap_or(app_config.map.default_metric);
            let map = load_map(&app_config, initial).await?;

            // 2. Serve
            server::start_server(app_config, map).await?;
        }
    }

    Ok(())
}
