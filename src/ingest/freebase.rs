//! Freebase RDF triple dumps.
//!
//! Topics reference their coordinates through a geolocation CVT node, so
//! longitudes are only attached to topics once the whole dump has been read.

use regex::Regex;
use rustc_hash::FxHashMap;
use std::sync::OnceLock;

use super::dataset::Dataset;
use super::ids::entity_id;
use super::DumpReader;
use crate::calendar;
use crate::graph::EntityId;

const NAMESPACE: &str = "<http://rdf.freebase.com/ns/";
const GEOLOCATION: &str = "<http://rdf.freebase.com/ns/location.location.geolocation>";
const LONGITUDE: &str = "<http://rdf.freebase.com/ns/location.geocode.longitude>";

const XSD_YEAR: &str = "http://www.w3.org/2001/XMLSchema#gYear";
const XSD_YEAR_MONTH: &str = "http://www.w3.org/2001/XMLSchema#gYearMonth";
const XSD_DATE: &str = "http://www.w3.org/2001/XMLSchema#date";
const XSD_DATE_TIME: &str = "http://www.w3.org/2001/XMLSchema#dateTime";

fn typed_literal() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"^"(.+)"\^\^<([^<>]+)>$"#).expect("typed literal regex should compile")
    })
}

fn plain_literal() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"^"(.*)"$"#).expect("plain literal regex should compile"))
}

fn year_month() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^([+-]?\d+)-(\d{2})$").expect("year-month regex should compile"))
}

fn year_month_day() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^([+-]?\d+)-(\d{2})-(\d{2})").expect("date regex should compile")
    })
}

/// Strip the Freebase namespace and closing bracket from an IRI.
fn machine_id(iri: &str) -> &str {
    iri.strip_prefix(NAMESPACE)
        .and_then(|rest| rest.strip_suffix('>'))
        .unwrap_or(iri)
}

/// Reader for Freebase RDF dumps.
#[derive(Debug, Default)]
pub struct FreebaseReader {
    /// topic -> geolocation CVT
    geolocation_of: FxHashMap<EntityId, EntityId>,
    /// geolocation CVT -> longitude
    longitude_of: FxHashMap<EntityId, f32>,
}

impl FreebaseReader {
    pub fn new() -> Self {
        Self::default()
    }

    fn read_typed_literal(&self, value: &str, datatype: &str) -> Option<Option<i64>> {
        let day = match datatype {
            XSD_YEAR => value.parse::<i64>().ok().and_then(calendar::year_start),
            XSD_YEAR_MONTH => {
                let caps = year_month().captures(value)?;
                let year = caps[1].parse::<i64>().ok();
                let month = caps[2].parse::<i64>().ok();
                year.zip(month)
                    .and_then(|(year, month)| calendar::day_number(year, month, 0))
            }
            XSD_DATE | XSD_DATE_TIME => {
                let caps = year_month_day().captures(value)?;
                let year = caps[1].parse::<i64>().ok();
                let month = caps[2].parse::<i64>().ok();
                let day = caps[3].parse::<i64>().ok();
                match (year, month, day) {
                    (Some(year), Some(month), Some(day)) => calendar::day_number(year, month, day),
                    _ => None,
                }
            }
            _ => return None,
        };
        Some(day)
    }
}

impl DumpReader for FreebaseReader {
    fn read_line(&mut self, line: &str, dataset: &mut Dataset) {
        let fields: Vec<&str> = line.split('\t').filter(|f| !f.is_empty()).collect();
        if fields.len() < 3 {
            dataset.stats.skipped_lines += 1;
            return;
        }

        let subject = entity_id(machine_id(fields[0]));
        dataset.register_id(subject);

        let predicate = fields[1];
        let object = fields[2];

        if object.starts_with(NAMESPACE) {
            let target = entity_id(machine_id(object));
            dataset.register_id(target);
            dataset.register_edge(subject, target);
            if predicate == GEOLOCATION {
                self.geolocation_of.insert(subject, target);
            }
        } else if let Some(caps) = typed_literal().captures(object) {
            // `None` when the literal is not a recognized date.
            if let Some(day) = self.read_typed_literal(&caps[1], &caps[2]) {
                match day {
                    Some(day) => dataset.register_time(subject, day),
                    None => dataset.reject_literal(),
                }
            }
        } else if predicate == LONGITUDE {
            if let Some(caps) = plain_literal().captures(object) {
                match caps[1].parse::<f32>() {
                    Ok(longitude) if longitude.is_finite() => {
                        self.longitude_of.insert(subject, longitude);
                    }
                    _ => dataset.reject_literal(),
                }
            }
        }
    }

    fn finish(&mut self, dataset: &mut Dataset) {
        for (&topic, cvt) in &self.geolocation_of {
            if let Some(&longitude) = self.longitude_of.get(cvt) {
                dataset.register_longitude(topic, longitude);
            }
        }
    }
}
