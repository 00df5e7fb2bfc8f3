//! Dump ingestion.
//!
//! This module reads knowledge-graph dumps line by line and registers
//! edges, dates and longitudes into a [`Dataset`]. Malformed records are
//! skipped and counted; only I/O failures abort ingestion.

pub mod dataset;
pub mod freebase;
pub mod ids;
pub mod wikidata;

pub use dataset::*;
pub use freebase::FreebaseReader;
pub use ids::entity_id;
pub use wikidata::WikidataReader;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

use crate::propagation::DiffusionConfig;

/// Lines between two progress updates.
const PROGRESS_INTERVAL: usize = 1_000_000;

/// Supported dump formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum DumpFormat {
    /// Wikidata TSV statements
    Wikidata,
    /// Freebase RDF triples
    Freebase,
}

impl DumpFormat {
    /// Default output prefix for this format.
    pub fn name(&self) -> &'static str {
        match self {
            DumpFormat::Wikidata => "wikidata",
            DumpFormat::Freebase => "freebase",
        }
    }

    fn reader(&self) -> Box<dyn DumpReader> {
        match self {
            DumpFormat::Wikidata => Box::new(WikidataReader::new()),
            DumpFormat::Freebase => Box::new(FreebaseReader::new()),
        }
    }
}

/// Line-oriented parser for one dump format.
pub trait DumpReader {
    /// Register whatever `line` contributes.
    fn read_line(&mut self, line: &str, dataset: &mut Dataset);

    /// Called once after the last line.
    fn finish(&mut self, _dataset: &mut Dataset) {}
}

/// Options for reading a dump.
#[derive(Debug, Clone, Copy)]
pub struct IngestOptions {
    pub format: DumpFormat,
    pub diffusion: DiffusionConfig,
    /// Whether to show a spinner while reading.
    pub show_progress: bool,
}

/// Read the dump at `path`.
pub fn ingest_file(path: &Path, options: IngestOptions) -> Result<Dataset> {
    info!("Reading {} dump: {}", options.format.name(), path.display());
    let file = File::open(path)
        .with_context(|| format!("Failed to open dump: {}", path.display()))?;
    ingest_reader(BufReader::new(file), options)
        .with_context(|| format!("Failed to read dump: {}", path.display()))
}

/// Read a dump from any buffered source.
pub fn ingest_reader<R: BufRead>(mut input: R, options: IngestOptions) -> Result<Dataset> {
    let mut dataset = Dataset::new(options.diffusion);
    let mut reader = options.format.reader();

    let progress = if options.show_progress {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.enable_steady_tick(Duration::from_millis(200));
        Some(pb)
    } else {
        None
    };

    let mut buffer = Vec::new();
    loop {
        buffer.clear();
        if input.read_until(b'\n', &mut buffer)? == 0 {
            break;
        }

        let line = String::from_utf8_lossy(&buffer);
        reader.read_line(line.trim_end_matches(&['\n', '\r'][..]), &mut dataset);
        dataset.stats.lines += 1;

        if dataset.stats.lines % PROGRESS_INTERVAL == 0 {
            if let Some(ref pb) = progress {
                pb.set_message(format!("{} lines", dataset.stats.lines));
            }
            debug!("Read {} lines", dataset.stats.lines);
        }
    }

    reader.finish(&mut dataset);

    if let Some(pb) = progress {
        pb.finish_with_message(format!("{} lines", dataset.stats.lines));
    }

    info!(
        "Read {} lines: {} entities, {} edges, {} dates, {} longitudes",
        dataset.stats.lines,
        dataset.ids.len(),
        dataset.stats.edges,
        dataset.stats.time_observations,
        dataset.stats.longitude_observations
    );
    if dataset.stats.rejected_literals > 0 {
        debug!("Rejected {} literals", dataset.stats.rejected_literals);
    }

    Ok(dataset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn options(format: DumpFormat) -> IngestOptions {
        IngestOptions {
            format,
            diffusion: DiffusionConfig::default(),
            show_progress: false,
        }
    }

    #[test]
    fn test_ingest_reader_counts_lines() {
        let dump = "Q1\tP31\tQ5\r\nQ1\tP569\t+00000001952-03-11T00:00:00Z/11\nbroken\n";
        let dataset = ingest_reader(Cursor::new(dump), options(DumpFormat::Wikidata)).unwrap();

        assert_eq!(dataset.stats.lines, 3);
        assert_eq!(dataset.stats.skipped_lines, 1);
        assert_eq!(dataset.stats.edges, 2);
        assert_eq!(dataset.stats.time_observations, 1);
        assert_eq!(dataset.ids.len(), 2);
    }

    #[test]
    fn test_ingest_reader_tolerates_invalid_utf8() {
        let mut dump = b"Q1\tP31\tQ5\n".to_vec();
        dump.extend_from_slice(b"Q\xff\tP31\tQ7\n");
        let dataset = ingest_reader(Cursor::new(dump), options(DumpFormat::Wikidata)).unwrap();

        assert_eq!(dataset.stats.lines, 2);
        assert_eq!(dataset.stats.edges, 4);
    }

    #[test]
    fn test_ingest_file_runs_freebase_join() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("freebase.nt");
        let dump = concat!(
            "<http://rdf.freebase.com/ns/m.paris>\t<http://rdf.freebase.com/ns/location.location.geolocation>\t<http://rdf.freebase.com/ns/m.cvt>\t.\n",
            "<http://rdf.freebase.com/ns/m.cvt>\t<http://rdf.freebase.com/ns/location.geocode.longitude>\t\"2.5\"\t.\n",
        );
        std::fs::write(&path, dump).unwrap();

        let dataset = ingest_file(&path, options(DumpFormat::Freebase)).unwrap();

        assert_eq!(dataset.longitude.fixed_value(entity_id("m.paris")), Some(2.5));
        assert_eq!(dataset.stats.lines, 2);
    }

    #[test]
    fn test_far_future_date_propagates_without_overflow() {
        let dump = "Q1\tP31\tQ2\nQ1\tP580\t+20000000000000000-01-01T00:00:00Z/9\n";
        let mut dataset = ingest_reader(Cursor::new(dump), options(DumpFormat::Wikidata)).unwrap();

        let stats = dataset.time.propagate(&dataset.graph);

        assert_eq!(stats.saturated, 1);
        assert!(dataset.time.get_value(entity_id("Q2")).is_err());
        assert_eq!(
            dataset.time.get_value(entity_id("Q1")),
            Ok(7_440_000_000_000_000_032)
        );
    }

    #[test]
    fn test_ingest_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = ingest_file(&dir.path().join("absent.tsv"), options(DumpFormat::Wikidata));
        assert!(result.is_err());
    }

    #[test]
    fn test_format_names() {
        assert_eq!(DumpFormat::Wikidata.name(), "wikidata");
        assert_eq!(DumpFormat::Freebase.name(), "freebase");
    }
}
