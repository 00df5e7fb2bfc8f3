//! Run summary generation.
//!
//! Renders a [`RunSummary`] as Markdown or JSON.

use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;

use crate::ingest::IngestStats;
use crate::models::{PropagationSummary, RunMetadata, RunSummary};
use crate::propagation::PropagationStats;
use crate::render::RenderStats;

/// Generate a complete Markdown summary.
pub fn generate_markdown_summary(summary: &RunSummary) -> String {
    let mut output = String::new();

    output.push_str("# Timeloc Run Summary\n\n");
    output.push_str(&generate_metadata_section(&summary.metadata));
    output.push_str(&generate_ingest_section(&summary.ingest, summary.entities));
    output.push_str(&generate_propagation_section(&summary.propagation));
    output.push_str(&generate_render_section(&summary.render, summary.located_ratio()));
    output.push_str(&generate_footer());

    output
}

fn generate_metadata_section(metadata: &RunMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Input:** `{}`\n", metadata.input.display()));
    section.push_str(&format!("- **Format:** {}\n", metadata.format));
    section.push_str(&format!(
        "- **Finished:** {}\n",
        metadata.finished_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!("- **Initial Weight:** {}\n", metadata.initial_weight));
    section.push_str(&format!(
        "- **Duration:** {:.1}s\n",
        metadata.duration_seconds
    ));
    section.push('\n');

    section
}

fn generate_ingest_section(stats: &IngestStats, entities: usize) -> String {
    let mut section = String::new();

    section.push_str("## Ingestion\n\n");
    section.push_str("| Lines | Skipped | Entities | Edges | Dates | Longitudes |\n");
    section.push_str("|:---:|:---:|:---:|:---:|:---:|:---:|\n");
    section.push_str(&format!(
        "| {} | {} | {} | {} | {} | {} |\n\n",
        stats.lines,
        stats.skipped_lines,
        entities,
        stats.edges,
        stats.time_observations,
        stats.longitude_observations
    ));

    if stats.rejected_literals > 0 {
        section.push_str(&format!(
            "{} literal(s) matched a known shape but could not be converted.\n\n",
            stats.rejected_literals
        ));
    }

    section
}

fn generate_propagation_section(propagation: &PropagationSummary) -> String {
    let mut section = String::new();

    section.push_str("## Propagation\n\n");
    section.push_str("| Value | Sources | Skipped | Contributions | Overflowed | Estimated |\n");
    section.push_str("|:---|:---:|:---:|:---:|:---:|:---:|\n");
    section.push_str(&propagation_row("Time", &propagation.time));
    section.push_str(&propagation_row("Longitude", &propagation.longitude));
    section.push('\n');

    section
}

fn propagation_row(label: &str, stats: &PropagationStats) -> String {
    format!(
        "| {} | {} | {} | {} | {} | {} |\n",
        label,
        stats.sources,
        stats.skipped_sources,
        stats.contributions,
        stats.saturated,
        stats.estimated
    )
}

fn generate_render_section(stats: &RenderStats, located_ratio: f64) -> String {
    let mut section = String::new();

    section.push_str("## Rendering\n\n");
    section.push_str(&format!("- **Entities Considered:** {}\n", stats.considered));
    section.push_str(&format!(
        "- **Plotted:** {} ({:.1}% of entities)\n",
        stats.tally.plotted,
        located_ratio * 100.0
    ));
    section.push_str(&format!("- **Missing a Value:** {}\n", stats.tally.missing_value));
    section.push_str(&format!("- **Out of Range:** {}\n", stats.tally.out_of_range));
    section.push_str(&format!("- **Occupied Pixels:** {}\n", stats.occupied_pixels));
    section.push_str(&format!("- **Image:** `{}`\n", stats.image_path.display()));
    section.push_str(&format!(
        "- **Grid Image:** `{}`\n",
        stats.grid_image_path.display()
    ));
    section.push('\n');

    section
}

fn generate_footer() -> String {
    format!(
        "---\n\n*Summary generated by timeloc v{}*\n",
        env!("CARGO_PKG_VERSION")
    )
}

/// Generate a JSON summary.
pub fn generate_json_summary(summary: &RunSummary) -> Result<String> {
    serde_json::to_string_pretty(summary).map_err(Into::into)
}

/// Write already rendered summary content to a file.
pub fn write_summary(content: &str, path: &Path) -> Result<()> {
    let mut file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create summary file: {}", path.display()))?;
    file.write_all(content.as_bytes())
        .with_context(|| format!("Failed to write summary file: {}", path.display()))?;

    Ok(())
}
