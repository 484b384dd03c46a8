use crate::aggregate::{group_count, matrix, rank_by_rate, rate_with_min_sample, top_k_with_overflow};
use crate::config::DashboardConfig;
use crate::filter::{apply_filters, FilterSpec};
use crate::labels::{LabelResolver, Role};
use crate::stats::summarize_with;
use crate::types::{Complaint, CountRow, MatrixRow, Statistics};
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

/// Every chart's data set, derived from one filtered set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartViews {
    pub by_state: Vec<CountRow>,
    pub by_year: Vec<CountRow>,
    pub by_occupation: Vec<CountRow>,
    pub by_decision: Vec<CountRow>,
    pub by_complaint_type: Vec<CountRow>,
    pub top_targets: Vec<CountRow>,
    pub top_complainants: Vec<CountRow>,
    pub state_outcomes: Vec<MatrixRow>,
    pub type_upheld_rates: Vec<MatrixRow>,
}

pub const DISMISSED_LABEL: &str = "Dismissed";
pub const PENDING_LABEL: &str = "Pending";

/// Outcome buckets for the matrix views, each name once.
fn decision_buckets(cfg: &DashboardConfig) -> Vec<&str> {
    let mut buckets: Vec<&str> = Vec::with_capacity(4);
    for b in [
        cfg.upheld_label.as_str(),
        DISMISSED_LABEL,
        cfg.closed_label.as_str(),
        PENDING_LABEL,
    ] {
        if !buckets.contains(&b) {
            buckets.push(b);
        }
    }
    buckets
}

pub fn generate_state_report(data: &[Complaint], cfg: &DashboardConfig) -> Vec<CountRow> {
    top_k_with_overflow(data, cfg.top_k_states, |c| c.state.clone(), "All Other States")
}

/// Counts per year in chronological order.
pub fn generate_year_report(data: &[Complaint]) -> Vec<CountRow> {
    let mut years = group_count(data, |c| c.year);
    years.sort_by_key(|(year, _)| *year);
    years
        .into_iter()
        .map(|(year, count)| CountRow::new(year.to_string(), count))
        .collect()
}

pub fn generate_occupation_report(data: &[Complaint], cfg: &DashboardConfig) -> Vec<CountRow> {
    top_k_with_overflow(
        data,
        cfg.top_k,
        |c| c.complainant.occupation.clone(),
        "All Other Occupations",
    )
}

pub fn generate_decision_report(data: &[Complaint]) -> Vec<CountRow> {
    group_count(data, |c| c.decision_parent.clone())
        .into_iter()
        .map(|(label, count)| CountRow::new(label, count))
        .collect()
}

pub fn generate_type_report(data: &[Complaint], cfg: &DashboardConfig) -> Vec<CountRow> {
    top_k_with_overflow(
        data,
        cfg.top_k,
        |c| c.complaint_type_normalized.clone(),
        "All Other Types",
    )
}

/// Most frequently accused parties, keyed by resolved display label.
pub fn generate_target_report(
    data: &[Complaint],
    cfg: &DashboardConfig,
    resolver: &LabelResolver,
) -> Vec<CountRow> {
    top_k_with_overflow(
        data,
        cfg.top_k,
        |c| resolver.resolve(&c.accused, Role::Accused),
        "All Other Targets",
    )
}

pub fn generate_complainant_report(
    data: &[Complaint],
    cfg: &DashboardConfig,
    resolver: &LabelResolver,
) -> Vec<CountRow> {
    top_k_with_overflow(
        data,
        cfg.top_k,
        |c| resolver.resolve(&c.complainant, Role::Complainant),
        "All Other Complainants",
    )
}

/// State × outcome matrix with the upheld share per state.
pub fn generate_state_outcome_report(data: &[Complaint], cfg: &DashboardConfig) -> Vec<MatrixRow> {
    matrix(
        data,
        |c| c.state.clone(),
        |c| c.decision_parent.clone(),
        &decision_buckets(cfg),
        &cfg.upheld_label,
    )
}

/// Complaint types ranked by upheld rate, ignoring types with fewer than
/// `min_sample_size` complaints.
pub fn generate_upheld_rate_report(data: &[Complaint], cfg: &DashboardConfig) -> Vec<MatrixRow> {
    let rows = rate_with_min_sample(
        data,
        |c| c.complaint_type_normalized.clone(),
        |c| c.decision_parent.clone(),
        &decision_buckets(cfg),
        &cfg.upheld_label,
        cfg.min_sample_size,
    );
    rank_by_rate(rows, cfg.top_rates)
}

pub fn generate_views(data: &[Complaint], cfg: &DashboardConfig, resolver: &LabelResolver) -> ChartViews {
    ChartViews {
        by_state: generate_state_report(data, cfg),
        by_year: generate_year_report(data),
        by_occupation: generate_occupation_report(data, cfg),
        by_decision: generate_decision_report(data),
        by_complaint_type: generate_type_report(data, cfg),
        top_targets: generate_target_report(data, cfg, resolver),
        top_complainants: generate_complainant_report(data, cfg, resolver),
        state_outcomes: generate_state_outcome_report(data, cfg),
        type_upheld_rates: generate_upheld_rate_report(data, cfg),
    }
}

/// Everything shown for one filter spec.
#[derive(Debug, Clone)]
pub struct Derived {
    pub spec: FilterSpec,
    pub filtered: Arc<Vec<Complaint>>,
    pub views: Arc<ChartViews>,
    pub stats: Statistics,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recompute {
    /// Same spec as before; nothing ran.
    Unchanged,
    /// Spec changed but selected the same records; views were kept.
    FilterOnly,
    /// Filtered set changed; views and statistics were rebuilt.
    Full,
}

/// Holds the loaded snapshot and the views for the current filter spec.
/// The snapshot is never modified; each spec change derives fresh values.
pub struct Dashboard {
    complaints: Arc<[Complaint]>,
    config: DashboardConfig,
    resolver: LabelResolver,
    derived: Derived,
}

impl Dashboard {
    pub fn new(complaints: Vec<Complaint>, config: DashboardConfig) -> Self {
        let complaints: Arc<[Complaint]> = complaints.into();
        let resolver = LabelResolver::with_extra_roles(&config.extra_generic_roles);
        let spec = FilterSpec::default();
        let filtered = Arc::new(apply_filters(&complaints, &spec));
        let views = Arc::new(generate_views(&filtered, &config, &resolver));
        let stats = summarize_with(&filtered, &config.upheld_label, &config.closed_label);
        Self {
            complaints,
            config,
            resolver,
            derived: Derived {
                spec,
                filtered,
                views,
                stats,
            },
        }
    }

    /// Empty working set, used after a failed load.
    pub fn empty(config: DashboardConfig) -> Self {
        Self::new(Vec::new(), config)
    }

    pub fn complaints(&self) -> &[Complaint] {
        &self.complaints
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn current(&self) -> &Derived {
        &self.derived
    }

    pub fn apply(&mut self, spec: FilterSpec) -> Recompute {
        if spec == self.derived.spec {
            return Recompute::Unchanged;
        }
        let filtered = apply_filters(&self.complaints, &spec);
        if filtered == *self.derived.filtered {
            debug!("Filter changed without changing selection - rows={}", filtered.len());
            self.derived.spec = spec;
            return Recompute::FilterOnly;
        }

        let filtered = Arc::new(filtered);
        let views = Arc::new(generate_views(&filtered, &self.config, &self.resolver));
        let stats = summarize_with(&filtered, &self.config.upheld_label, &self.config.closed_label);
        debug!(
            "Recomputed views - rows={}, total={}",
            filtered.len(),
            self.complaints.len()
        );
        self.derived = Derived {
            spec,
            filtered,
            views,
            stats,
        };
        Recompute::Full
    }
}
