use crate::types::{Complaint, Direction};
use crate::util::ALL_MARKER;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DirectionFilter {
    #[default]
    All,
    Only(Direction),
}

impl DirectionFilter {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "" | "all" | ALL_MARKER => Some(DirectionFilter::All),
            "by" | "by_press" => Some(DirectionFilter::Only(Direction::ByPress)),
            "against" | "against_press" => Some(DirectionFilter::Only(Direction::AgainstPress)),
            _ => None,
        }
    }

    pub fn admits(self, direction: Direction) -> bool {
        match self {
            DirectionFilter::All => true,
            DirectionFilter::Only(d) => d == direction,
        }
    }
}

/// Active constraints, one per dimension. An empty set means the dimension
/// is unconstrained. Values are immutable: every `with_*` call returns a new
/// spec.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterSpec {
    years: BTreeSet<i32>,
    states: BTreeSet<String>,
    complaint_types: BTreeSet<String>,
    direction: DirectionFilter,
    affiliations: BTreeSet<String>,
    decisions: BTreeSet<String>,
}

fn string_set<I, S>(values: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let set: BTreeSet<String> = values.into_iter().map(Into::into).collect();
    if set.contains(ALL_MARKER) {
        return BTreeSet::new();
    }
    set
}

impl FilterSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_years<I: IntoIterator<Item = i32>>(self, years: I) -> Self {
        Self {
            years: years.into_iter().collect(),
            ..self
        }
    }

    pub fn with_states<I, S>(self, states: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            states: string_set(states),
            ..self
        }
    }

    pub fn with_complaint_types<I, S>(self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            complaint_types: string_set(types),
            ..self
        }
    }

    pub fn with_direction(self, direction: DirectionFilter) -> Self {
        Self { direction, ..self }
    }

    pub fn with_affiliations<I, S>(self, affiliations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            affiliations: string_set(affiliations),
            ..self
        }
    }

    pub fn with_decisions<I, S>(self, decisions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            decisions: string_set(decisions),
            ..self
        }
    }

    pub fn years(&self) -> &BTreeSet<i32> {
        &self.years
    }

    pub fn states(&self) -> &BTreeSet<String> {
        &self.states
    }

    pub fn complaint_types(&self) -> &BTreeSet<String> {
        &self.complaint_types
    }

    pub fn direction(&self) -> DirectionFilter {
        self.direction
    }

    pub fn affiliations(&self) -> &BTreeSet<String> {
        &self.affiliations
    }

    pub fn decisions(&self) -> &BTreeSet<String> {
        &self.decisions
    }

    pub fn is_unconstrained(&self) -> bool {
        *self == Self::default()
    }

    /// All non-empty dimensions must match. Cheap checks run first.
    pub fn matches(&self, c: &Complaint) -> bool {
        if !self.direction.admits(c.direction) {
            return false;
        }
        if !self.years.is_empty() && !self.years.contains(&c.year) {
            return false;
        }
        if !self.states.is_empty() && !self.states.contains(&c.state) {
            return false;
        }
        if !self.complaint_types.is_empty()
            && !self.complaint_types.contains(&c.complaint_type_normalized)
        {
            return false;
        }
        if !self.decisions.is_empty() && !self.decisions.contains(&c.decision_parent) {
            return false;
        }
        if !self.affiliations.is_empty()
            && !self.affiliations.contains(&c.complainant.affiliation)
            && !self.affiliations.contains(&c.accused.affiliation)
        {
            return false;
        }
        true
    }
}

pub fn matches(record: &Complaint, spec: &FilterSpec) -> bool {
    spec.matches(record)
}

/// Records passing `spec`, in their held order.
pub fn apply_filters(records: &[Complaint], spec: &FilterSpec) -> Vec<Complaint> {
    records.iter().filter(|c| spec.matches(c)).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::normalize_with_fallback_year;
    use crate::types::RawRecord;

    fn complaint(year: i32, state: &str, direction: Direction) -> Complaint {
        let raw = RawRecord {
            report_id: Some(year.to_string()),
            state: Some(state.into()),
            complaint_type: Some("Harassment".into()),
            decision_parent: Some("Upheld".into()),
            complainant_affiliation: Some("Times Group".into()),
            accused_affiliation: Some("Police".into()),
            ..Default::default()
        };
        normalize_with_fallback_year(&raw, direction, 0, 2000)
    }

    #[test]
    fn empty_spec_matches_everything() {
        let spec = FilterSpec::new();
        assert!(spec.is_unconstrained());
        assert!(matches(&complaint(2020, "Delhi", Direction::ByPress), &spec));
    }

    #[test]
    fn each_dimension_constrains() {
        let c = complaint(2020, "Delhi", Direction::ByPress);
        assert!(!FilterSpec::new().with_years([2021]).matches(&c));
        assert!(FilterSpec::new().with_years([2019, 2020]).matches(&c));
        assert!(!FilterSpec::new().with_states(["Kerala"]).matches(&c));
        assert!(!FilterSpec::new().with_complaint_types(["Defamation"]).matches(&c));
        assert!(!FilterSpec::new().with_decisions(["Dismissed"]).matches(&c));
        assert!(FilterSpec::new().with_decisions(["Upheld"]).matches(&c));
        assert!(!FilterSpec::new()
            .with_direction(DirectionFilter::Only(Direction::AgainstPress))
            .matches(&c));
    }

    #[test]
    fn affiliation_matches_either_party() {
        let c = complaint(2020, "Delhi", Direction::ByPress);
        assert!(FilterSpec::new().with_affiliations(["Times Group"]).matches(&c));
        assert!(FilterSpec::new().with_affiliations(["Police"]).matches(&c));
        assert!(!FilterSpec::new().with_affiliations(["NDTV"]).matches(&c));
    }

    #[test]
    fn all_marker_clears_a_dimension() {
        let spec = FilterSpec::new().with_states(["Kerala", "_all_"]);
        assert!(spec.states().is_empty());
        assert_eq!(DirectionFilter::parse("_all_"), Some(DirectionFilter::All));
        assert_eq!(
            DirectionFilter::parse("against"),
            Some(DirectionFilter::Only(Direction::AgainstPress))
        );
        assert_eq!(DirectionFilter::parse("sideways"), None);
    }

    #[test]
    fn builders_return_new_values() {
        let base = FilterSpec::new().with_states(["Delhi"]);
        let narrowed = base.clone().with_years([2020]);
        assert!(base.years().is_empty());
        assert_eq!(narrowed.states(), base.states());
        assert_ne!(base, narrowed);
    }

    #[test]
    fn adding_a_constraint_never_grows_the_result() {
        let records = vec![
            complaint(2020, "Delhi", Direction::ByPress),
            complaint(2020, "Delhi", Direction::AgainstPress),
            complaint(2021, "Kerala", Direction::ByPress),
        ];
        let broad = FilterSpec::new().with_years([2020, 2021]);
        let narrow = broad.clone().with_states(["Delhi"]);
        let broad_set = apply_filters(&records, &broad);
        let narrow_set = apply_filters(&records, &narrow);
        assert!(narrow_set.len() <= broad_set.len());
        assert!(narrow_set.iter().all(|c| broad_set.contains(c)));
    }
}
