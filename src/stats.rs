use crate::types::{Complaint, Direction, Statistics};
use crate::util::format_pct;
use std::collections::HashSet;

pub const DEFAULT_UPHELD: &str = "Upheld";
pub const DEFAULT_CLOSED: &str = "Closed";

/// Headline numbers for the summary panel, computed in one pass.
pub fn summarize(records: &[Complaint]) -> Statistics {
    summarize_with(records, DEFAULT_UPHELD, DEFAULT_CLOSED)
}

pub fn summarize_with(records: &[Complaint], upheld_label: &str, closed_label: &str) -> Statistics {
    let mut by_press = 0usize;
    let mut against_press = 0usize;
    let mut upheld = 0usize;
    let mut closed = 0usize;
    let mut states: HashSet<&str> = HashSet::new();
    let mut years: HashSet<i32> = HashSet::new();

    for r in records {
        match r.direction {
            Direction::ByPress => by_press += 1,
            Direction::AgainstPress => against_press += 1,
        }
        if r.decision_parent == upheld_label {
            upheld += 1;
        }
        if r.decision_parent == closed_label {
            closed += 1;
        }
        states.insert(r.state.as_str());
        years.insert(r.year);
    }

    let total = records.len();
    Statistics {
        total,
        by_press,
        against_press,
        upheld,
        closed,
        upheld_rate: format_pct(upheld, total).0,
        states: states.len(),
        years: years.len(),
    }
}
