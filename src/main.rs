//! Timeloc - spatio-temporal density maps of knowledge graphs
//!
//! Reads a Wikidata or Freebase dump, diffuses known dates and longitudes
//! one hop along the graph and renders a longitude-by-time density image.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (unreadable dump, bad config, unwritable output, etc.)

mod calendar;
mod cli;
mod config;
mod graph;
mod ingest;
mod models;
mod propagation;
mod render;
mod report;

use anyhow::{Context, Result};
use chrono::Utc;
use cli::{Args, OutputFormat};
use config::{Config, CONFIG_FILE_NAME};
use ingest::{IngestOptions, ingest_file};
use models::{PropagationSummary, RunMetadata, RunSummary};
use propagation::DiffusionConfig;
use render::{DensityRenderer, RenderOptions};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

fn main() {
    let args = Args::parse_args();

    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    if args.init_config {
        if let Err(e) = handle_init_config() {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
        return;
    }

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };

    init_logging(&args, &config);

    info!("Timeloc v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);
    debug!("Configuration: {:?}", config);

    if let Err(e) = run(&args, &config) {
        error!("Run failed: {:#}", e);
        eprintln!("\n❌ Error: {:#}", e);
        std::process::exit(1);
    }
}

/// Handle --init-config: generate a default .timeloc.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(CONFIG_FILE_NAME);

    if path.exists() {
        anyhow::bail!(
            "{} already exists. Remove it first or edit it manually.",
            CONFIG_FILE_NAME
        );
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", CONFIG_FILE_NAME))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE_NAME);
    println!("   Edit it to customize the time range, axes and propagation weight.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args, config: &Config) {
    let level = if config.general.verbose && !args.quiet {
        tracing::Level::DEBUG
    } else {
        args.log_level()
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Load the configuration file and apply CLI overrides.
fn load_config(args: &Args) -> Result<Config> {
    let mut config = match args.config {
        Some(ref config_path) => Config::load(config_path)?,
        None => Config::load_default()?.unwrap_or_default(),
    };
    config.merge_with_args(args);
    Ok(config)
}

/// Run ingestion, propagation and rendering.
fn run(args: &Args, config: &Config) -> Result<()> {
    let start_time = Instant::now();
    let input = args
        .input
        .clone()
        .context("An input dump is required")?;
    let format = args.source;

    let render_options = RenderOptions::from_config(&config.render)
        .map_err(|e| anyhow::anyhow!("Invalid render configuration: {}", e))?;
    let diffusion = DiffusionConfig::from(&config.propagation);

    // Step 1: Read the dump
    println!("📥 Reading {} dump: {}", format.name(), input.display());
    let mut dataset = ingest_file(
        &input,
        IngestOptions {
            format,
            diffusion,
            show_progress: !args.no_progress && !args.quiet,
        },
    )?;

    debug!(
        "Graph: {} entities with links, {} directed edges",
        dataset.graph.vertex_count(),
        dataset.graph.edge_count()
    );
    if dataset.graph.is_empty() {
        warn!("No links between entities; only observed values will be plotted");
    }
    info!(
        "{} entities with a date, {} with a longitude",
        dataset.time.fixed_count(),
        dataset.longitude.fixed_count()
    );

    // Step 2: Diffuse known values to their neighbors
    println!("🔗 Propagating dates and longitudes...");
    let time_stats = dataset.time.propagate(&dataset.graph);
    info!(
        "Time: {} sources, {} entities estimated",
        time_stats.sources, time_stats.estimated
    );
    let longitude_stats = dataset.longitude.propagate(&dataset.graph);
    info!(
        "Longitude: {} sources, {} entities estimated",
        longitude_stats.sources, longitude_stats.estimated
    );

    // Step 3: Render the density images
    let prefix = config
        .general
        .output_prefix
        .as_ref()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(format.name()));

    println!("🎨 Rendering density map...");
    let renderer = DensityRenderer::new(render_options);
    let render_stats = renderer
        .render(&prefix, &dataset.ids, &dataset.time, &dataset.longitude)
        .context("Failed to render density map")?;

    let summary = RunSummary {
        metadata: RunMetadata {
            input,
            format: format.name().to_string(),
            finished_at: Utc::now(),
            initial_weight: diffusion.initial_weight,
            duration_seconds: start_time.elapsed().as_secs_f64(),
        },
        entities: dataset.ids.len(),
        ingest: dataset.stats,
        propagation: PropagationSummary {
            time: time_stats,
            longitude: longitude_stats,
        },
        render: render_stats,
    };

    // Step 4: Optional run summary
    if let Some(ref path) = args.summary {
        let content = match args.summary_format {
            OutputFormat::Markdown => report::generate_markdown_summary(&summary),
            OutputFormat::Json => report::generate_json_summary(&summary)?,
        };
        report::write_summary(&content, path)?;
        info!("Summary written to: {}", path.display());
    }

    print_summary(&summary);
    Ok(())
}

/// Print a short summary to the console.
fn print_summary(summary: &RunSummary) {
    println!("\n✅ Done in {:.1}s", summary.metadata.duration_seconds);
    println!(
        "   Entities: {} ({} dates and {} longitudes observed)",
        summary.entities, summary.ingest.time_observations, summary.ingest.longitude_observations
    );
    println!(
        "   Plotted: {} ({:.1}%), missing a value: {}, out of range: {}",
        summary.render.tally.plotted,
        summary.located_ratio() * 100.0,
        summary.render.tally.missing_value,
        summary.render.tally.out_of_range
    );
    println!("   Image: {}", summary.render.image_path.display());
    println!("   Grid image: {}", summary.render.grid_image_path.display());
}
