//! Wikidata TSV statement dumps.
//!
//! Each line holds `subject <TAB> property <TAB> object`. Objects are
//! recognized by their first character:
//!
//! - `Q…`: another item, linked in both directions
//! - `+…` / `-…`: a point in time, `+YYYY-MM-DDThh:mm:ssZ/precision`
//! - `@…`: coordinates, `@latitude/longitude`; the longitude, when present,
//!   must carry a decimal part

use regex::{Captures, Regex};
use std::sync::OnceLock;

use super::dataset::Dataset;
use super::ids::entity_id;
use super::DumpReader;
use crate::calendar;

fn time_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^([+-]\d+)-(\d{2})-(\d{2})T\d{2}:\d{2}:\d{2}Z/\d{1,2}$")
            .expect("wikidata time regex should compile")
    })
}

fn coordinates_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^@([+-]?\d{1,2}(\.\d+)?)/([+-]?\d{1,3}(\.\d+))?$")
            .expect("wikidata coordinates regex should compile")
    })
}

/// Reader for Wikidata TSV dumps.
#[derive(Debug, Default)]
pub struct WikidataReader;

impl WikidataReader {
    pub fn new() -> Self {
        Self
    }
}

impl DumpReader for WikidataReader {
    fn read_line(&mut self, line: &str, dataset: &mut Dataset) {
        let fields: Vec<&str> = line.split('\t').filter(|f| !f.is_empty()).collect();
        if fields.len() < 3 {
            dataset.stats.skipped_lines += 1;
            return;
        }

        let subject = entity_id(fields[0]);
        dataset.register_id(subject);

        let object = fields[2].trim();
        match object.as_bytes().first() {
            Some(b'Q') => {
                let target = entity_id(object);
                dataset.register_id(target);
                dataset.register_link(subject, target);
            }
            Some(b'+') | Some(b'-') => {
                if let Some(caps) = time_pattern().captures(object) {
                    match parse_time(&caps) {
                        Some(day) => dataset.register_time(subject, day),
                        None => dataset.reject_literal(),
                    }
                }
            }
            Some(b'@') => {
                if let Some(caps) = coordinates_pattern().captures(object) {
                    match parse_longitude(&caps) {
                        Some(longitude) => dataset.register_longitude(subject, longitude),
                        None => dataset.reject_literal(),
                    }
                }
            }
            _ => {}
        }
    }
}

fn parse_time(caps: &Captures<'_>) -> Option<i64> {
    let year: i64 = caps.get(1)?.as_str().parse().ok()?;
    let month: i64 = caps.get(2)?.as_str().parse().ok()?;
    let day: i64 = caps.get(3)?.as_str().parse().ok()?;
    calendar::day_number(year, month, day)
}

fn parse_longitude(caps: &Captures<'_>) -> Option<f32> {
    let longitude: f32 = caps.get(3)?.as_str().parse().ok()?;
    longitude.is_finite().then_some(longitude)
}
