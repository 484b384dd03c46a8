use crate::error::DashResult;
use crate::types::{Complaint, Direction, Party, RawRecord};
use crate::util::{clean, current_year, extract_year};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

pub const UNKNOWN: &str = "Unknown";
pub const PENDING: &str = "Pending";

/// Body of the list endpoint. Snapshot files use the same shape, and a bare
/// array is accepted too.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RecordEnvelope {
    Wrapped {
        #[serde(default)]
        data: Vec<RawRecord>,
    },
    Bare(Vec<RawRecord>),
}

impl RecordEnvelope {
    pub fn into_records(self) -> Vec<RawRecord> {
        match self {
            RecordEnvelope::Wrapped { data } => data,
            RecordEnvelope::Bare(data) => data,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub total_rows: usize,
    pub by_press: usize,
    pub against_press: usize,
    pub year_fallbacks: usize,
}

fn first_of(chain: &[Option<&str>], sentinel: &str) -> String {
    chain
        .iter()
        .find_map(|s| clean(*s))
        .unwrap_or_else(|| sentinel.to_string())
}

/// Resolve one raw record into a complaint, using the current calendar
/// year when the report identifier carries no year.
pub fn normalize(raw: &RawRecord, direction: Direction, seq: usize) -> Complaint {
    normalize_with_fallback_year(raw, direction, seq, current_year())
}

pub fn normalize_with_fallback_year(
    raw: &RawRecord,
    direction: Direction,
    seq: usize,
    fallback_year: i32,
) -> Complaint {
    let complainant = Party {
        name: first_of(&[raw.complainant.as_deref()], UNKNOWN),
        affiliation: first_of(
            &[
                raw.complainant_affiliation_resolved.as_deref(),
                raw.complainant_affiliation.as_deref(),
            ],
            UNKNOWN,
        ),
        category: first_of(&[raw.complainant_category.as_deref()], UNKNOWN),
        occupation: first_of(&[raw.complainant_occupation.as_deref()], UNKNOWN),
    };
    let accused = Party {
        name: first_of(&[raw.accused.as_deref()], UNKNOWN),
        affiliation: first_of(
            &[
                raw.accused_affiliation_resolved.as_deref(),
                raw.accused_affiliation.as_deref(),
            ],
            UNKNOWN,
        ),
        category: first_of(&[raw.accused_category.as_deref()], UNKNOWN),
        occupation: first_of(&[raw.accused_occupation.as_deref()], UNKNOWN),
    };

    Complaint {
        id: format!("{}-{}", direction.as_str(), seq),
        complainant,
        accused,
        complaint_text: first_of(&[raw.complaint_text.as_deref()], UNKNOWN),
        complaint_type: first_of(&[raw.complaint_type.as_deref()], UNKNOWN),
        complaint_type_normalized: first_of(
            &[
                raw.complaint_type_normalized.as_deref(),
                raw.complaint_type.as_deref(),
            ],
            UNKNOWN,
        ),
        decision: first_of(&[raw.decision.as_deref()], PENDING),
        decision_parent: first_of(&[raw.decision_parent.as_deref()], PENDING),
        decision_specific: first_of(&[raw.decision_specific.as_deref()], PENDING),
        year: extract_year(raw.report_id.as_deref()).unwrap_or(fallback_year),
        state: first_of(&[raw.state.as_deref()], UNKNOWN),
        direction,
        press_level: first_of(&[raw.press_level.as_deref()], UNKNOWN),
    }
}

/// Normalize both source tables into one working set, by-press first.
pub fn normalize_all(by_press: &[RawRecord], against_press: &[RawRecord]) -> (Vec<Complaint>, LoadReport) {
    let fallback_year = current_year();
    let mut report = LoadReport::default();
    let mut out = Vec::with_capacity(by_press.len() + against_press.len());

    for (direction, rows) in [
        (Direction::ByPress, by_press),
        (Direction::AgainstPress, against_press),
    ] {
        for (seq, raw) in rows.iter().enumerate() {
            if extract_year(raw.report_id.as_deref()).is_none() {
                report.year_fallbacks += 1;
            }
            out.push(normalize_with_fallback_year(raw, direction, seq, fallback_year));
        }
        match direction {
            Direction::ByPress => report.by_press = rows.len(),
            Direction::AgainstPress => report.against_press = rows.len(),
        }
    }
    report.total_rows = out.len();

    debug!(
        "Normalized records - by_press={}, against_press={}, year_fallbacks={}",
        report.by_press, report.against_press, report.year_fallbacks
    );
    (out, report)
}

/// Read a saved list-endpoint response from disk.
pub fn load_file(path: &Path) -> DashResult<Vec<RawRecord>> {
    let text = std::fs::read_to_string(path)?;
    let envelope: RecordEnvelope = serde_json::from_str(&text)?;
    let records = envelope.into_records();
    info!("Loaded snapshot file - path={}, rows={}", path.display(), records.len());
    Ok(records)
}
