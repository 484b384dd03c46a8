use serde::{Deserialize, Serialize};
use std::fmt;
use tabled::Tabled;

/// One record as it arrives from the backend. Every field may be missing,
/// null or blank; the loader resolves all of them.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawRecord {
    #[serde(default)]
    pub complainant: Option<String>,
    #[serde(default)]
    pub complainant_affiliation: Option<String>,
    #[serde(default, alias = "complainant_affiliation_name")]
    pub complainant_affiliation_resolved: Option<String>,
    #[serde(default)]
    pub complainant_category: Option<String>,
    #[serde(default)]
    pub complainant_occupation: Option<String>,
    #[serde(default, alias = "respondent")]
    pub accused: Option<String>,
    #[serde(default)]
    pub accused_affiliation: Option<String>,
    #[serde(default, alias = "accused_affiliation_name")]
    pub accused_affiliation_resolved: Option<String>,
    #[serde(default)]
    pub accused_category: Option<String>,
    #[serde(default)]
    pub accused_occupation: Option<String>,
    #[serde(default, alias = "complaint")]
    pub complaint_text: Option<String>,
    #[serde(default)]
    pub complaint_type: Option<String>,
    #[serde(default)]
    pub complaint_type_normalized: Option<String>,
    #[serde(default)]
    pub decision: Option<String>,
    #[serde(default)]
    pub decision_parent: Option<String>,
    #[serde(default)]
    pub decision_specific: Option<String>,
    #[serde(default, alias = "report")]
    pub report_id: Option<String>,
    #[serde(default, alias = "state_name")]
    pub state: Option<String>,
    #[serde(default, alias = "level")]
    pub press_level: Option<String>,
}

/// Which source table a complaint came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    ByPress,
    AgainstPress,
}

impl Direction {
    pub const ALL: [Direction; 2] = [Direction::ByPress, Direction::AgainstPress];

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::ByPress => "by_press",
            Direction::AgainstPress => "against_press",
        }
    }

    /// Value of the `table` query parameter on the list endpoint.
    pub fn table_param(self) -> &'static str {
        match self {
            Direction::ByPress => "by",
            Direction::AgainstPress => "against",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Party {
    pub name: String,
    pub affiliation: String,
    pub category: String,
    pub occupation: String,
}

/// Fully resolved complaint. No field is ever empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Complaint {
    pub id: String,
    pub complainant: Party,
    pub accused: Party,
    pub complaint_text: String,
    pub complaint_type: String,
    pub complaint_type_normalized: String,
    pub decision: String,
    pub decision_parent: String,
    pub decision_specific: String,
    pub year: i32,
    pub state: String,
    pub direction: Direction,
    pub press_level: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Tabled)]
pub struct CountRow {
    #[serde(rename = "Label")]
    #[tabled(rename = "Label")]
    pub label: String,
    #[serde(rename = "Count")]
    #[tabled(rename = "Count")]
    pub count: usize,
}

impl CountRow {
    pub fn new(label: impl Into<String>, count: usize) -> Self {
        Self {
            label: label.into(),
            count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketCount {
    pub bucket: String,
    pub count: usize,
}

/// One row of a two-level aggregation: an outer key with its inner
/// sub-bucket tallies and the share of the success bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Tabled)]
pub struct MatrixRow {
    #[serde(rename = "Label")]
    #[tabled(rename = "Label")]
    pub label: String,
    #[serde(rename = "Buckets")]
    #[tabled(rename = "Buckets", display_with = "display_buckets")]
    pub buckets: Vec<BucketCount>,
    #[serde(rename = "Total")]
    #[tabled(rename = "Total")]
    pub total: usize,
    #[serde(rename = "Rate")]
    #[tabled(rename = "Rate")]
    pub rate: String,
    #[serde(skip)]
    #[tabled(skip)]
    pub rate_value: f64,
}

impl MatrixRow {
    pub fn bucket(&self, name: &str) -> usize {
        self.buckets
            .iter()
            .find(|b| b.bucket == name)
            .map(|b| b.count)
            .unwrap_or(0)
    }
}

fn display_buckets(buckets: &[BucketCount]) -> String {
    buckets
        .iter()
        .map(|b| format!("{}: {}", b.bucket, b.count))
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Tabled)]
pub struct Statistics {
    #[serde(rename = "Total")]
    #[tabled(rename = "Total")]
    pub total: usize,
    #[serde(rename = "ByPress")]
    #[tabled(rename = "ByPress")]
    pub by_press: usize,
    #[serde(rename = "AgainstPress")]
    #[tabled(rename = "AgainstPress")]
    pub against_press: usize,
    #[serde(rename = "Upheld")]
    #[tabled(rename = "Upheld")]
    pub upheld: usize,
    #[serde(rename = "Closed")]
    #[tabled(rename = "Closed")]
    pub closed: usize,
    #[serde(rename = "UpheldRate")]
    #[tabled(rename = "UpheldRate")]
    pub upheld_rate: String,
    #[serde(rename = "States")]
    #[tabled(rename = "States")]
    pub states: usize,
    #[serde(rename = "Years")]
    #[tabled(rename = "Years")]
    pub years: usize,
}
