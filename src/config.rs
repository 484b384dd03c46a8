use crate::error::{DashError, DashResult};
use crate::reports::{DISMISSED_LABEL, PENDING_LABEL};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const CONFIG_ENV: &str = "PCI_DASH_CONFIG";

/// Tunables for fetching, chart sizes and labelling. Every field has a
/// default, so a config file only needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub api_base: String,
    pub output_dir: String,
    pub top_k: usize,
    pub top_k_states: usize,
    pub min_sample_size: usize,
    pub top_rates: usize,
    pub extra_generic_roles: Vec<String>,
    pub upheld_label: String,
    pub closed_label: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            api_base: "http://localhost:8000".to_string(),
            output_dir: "out".to_string(),
            top_k: 10,
            top_k_states: 15,
            min_sample_size: 10,
            top_rates: 10,
            extra_generic_roles: Vec::new(),
            upheld_label: "Upheld".to_string(),
            closed_label: "Closed".to_string(),
        }
    }
}

impl DashboardConfig {
    pub fn from_file(path: &Path) -> DashResult<Self> {
        let text = std::fs::read_to_string(path)?;
        let cfg: DashboardConfig = serde_json::from_str(&text).map_err(|e| DashError::Config {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        cfg.validate(path)?;
        Ok(cfg)
    }

    fn validate(&self, path: &Path) -> DashResult<()> {
        if self.top_k == 0 || self.top_k_states == 0 || self.top_rates == 0 {
            return Err(DashError::Config {
                path: path.display().to_string(),
                reason: "top_k, top_k_states and top_rates must be at least 1".to_string(),
            });
        }
        let upheld = self.upheld_label.trim();
        let closed = self.closed_label.trim();
        if upheld.is_empty() || closed.is_empty() || upheld.eq_ignore_ascii_case(closed) {
            return Err(DashError::Config {
                path: path.display().to_string(),
                reason: "upheld_label and closed_label must be distinct and non-empty".to_string(),
            });
        }
        for label in [upheld, closed] {
            if label.eq_ignore_ascii_case(DISMISSED_LABEL) || label.eq_ignore_ascii_case(PENDING_LABEL) {
                return Err(DashError::Config {
                    path: path.display().to_string(),
                    reason: format!(
                        "'{}' is already an outcome bucket; upheld_label and closed_label must differ from it",
                        label
                    ),
                });
            }
        }
        if self.api_base.trim().is_empty() {
            return Err(DashError::Config {
                path: path.display().to_string(),
                reason: "api_base must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn partial_file_keeps_defaults() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(f, r#"{{"top_k": 5, "extra_generic_roles": ["Bureau Chief"]}}"#).unwrap();
        let cfg = DashboardConfig::from_file(f.path()).unwrap();
        assert_eq!(cfg.top_k, 5);
        assert_eq!(cfg.top_k_states, 15);
        assert_eq!(cfg.extra_generic_roles, vec!["Bureau Chief"]);
    }

    #[test]
    fn zero_top_k_is_rejected() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(f, r#"{{"top_k": 0}}"#).unwrap();
        let err = DashboardConfig::from_file(f.path()).unwrap_err();
        assert!(matches!(err, DashError::Config { .. }));
    }

    #[test]
    fn upheld_and_closed_labels_must_differ() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(f, r#"{{"upheld_label": "Upheld", "closed_label": "upheld"}}"#).unwrap();
        assert!(matches!(
            DashboardConfig::from_file(f.path()),
            Err(DashError::Config { .. })
        ));
    }

    #[test]
    fn outcome_labels_cannot_reuse_fixed_buckets() {
        for body in [
            r#"{"upheld_label": "Dismissed"}"#,
            r#"{"closed_label": "Pending"}"#,
        ] {
            let mut f = tempfile::NamedTempFile::new().unwrap();
            write!(f, "{}", body).unwrap();
            let err = DashboardConfig::from_file(f.path()).unwrap_err();
            assert!(matches!(err, DashError::Config { .. }), "{body}");
        }
    }

    #[test]
    fn distinct_custom_labels_are_accepted() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(f, r#"{{"upheld_label": "Allowed", "closed_label": "Disposed"}}"#).unwrap();
        let cfg = DashboardConfig::from_file(f.path()).unwrap();
        assert_eq!((cfg.upheld_label.as_str(), cfg.closed_label.as_str()), ("Allowed", "Disposed"));
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(f, "not json").unwrap();
        assert!(matches!(
            DashboardConfig::from_file(f.path()),
            Err(DashError::Config { .. })
        ));
    }
}
