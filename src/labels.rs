// Display labels for the parties of a complaint.
//
// Charts that group by "who is targeted" use these labels as their keys,
// so two records collapse into one bucket exactly when their labels match.
use crate::types::Party;
use once_cell::sync::Lazy;
use std::collections::HashSet;

/// Role titles that say nothing about which outlet a person works for.
pub const GENERIC_ROLES: &[&str] = &[
    "editor",
    "the editor",
    "chief editor",
    "editor-in-chief",
    "editor in chief",
    "executive editor",
    "managing editor",
    "resident editor",
    "news editor",
    "sub editor",
    "sub-editor",
    "editor/publisher",
    "editor & publisher",
    "editor and publisher",
    "reporter",
    "the reporter",
    "correspondent",
    "special correspondent",
    "journalist",
    "publisher",
    "the publisher",
    "printer and publisher",
    "printer & publisher",
    "printer/publisher",
    "owner",
    "proprietor",
];

const UNSPECIFIED_OUTLET: &str = "(Unspecified Media Outlet)";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Accused,
    Complainant,
}

fn is_blank_affiliation(s: &str) -> bool {
    let s = s.trim();
    s.is_empty() || s.eq_ignore_ascii_case("unknown") || s.eq_ignore_ascii_case("none")
}

/// Label resolver with the built-in generic role vocabulary plus any
/// configured additions.
#[derive(Debug, Clone)]
pub struct LabelResolver {
    roles: HashSet<String>,
}

impl Default for LabelResolver {
    fn default() -> Self {
        Self::with_extra_roles::<&str>(&[])
    }
}

impl LabelResolver {
    pub fn with_extra_roles<S: AsRef<str>>(extra: &[S]) -> Self {
        let roles = GENERIC_ROLES
            .iter()
            .map(|r| r.to_string())
            .chain(extra.iter().map(|r| r.as_ref().trim().to_lowercase()))
            .filter(|r| !r.is_empty())
            .collect();
        Self { roles }
    }

    pub fn is_generic_role(&self, name: &str) -> bool {
        self.roles.contains(&name.trim().to_lowercase())
    }

    /// Human-facing name of a party. The role does not change the rules
    /// today; it is kept so callers state which side they are labelling.
    pub fn resolve(&self, party: &Party, _role: Role) -> String {
        self.resolve_parts(&party.name, &party.affiliation)
    }

    pub fn resolve_parts(&self, name: &str, affiliation: &str) -> String {
        let name = name.trim();
        let affiliation = affiliation.trim();

        if is_blank_affiliation(affiliation) {
            if name.is_empty() {
                return "Unknown".to_string();
            }
            if self.is_generic_role(name) {
                return format!("{} {}", name, UNSPECIFIED_OUTLET);
            }
            return name.to_string();
        }

        if name.is_empty()
            || name.eq_ignore_ascii_case("unknown")
            || self.is_generic_role(name)
            || name.to_lowercase() == affiliation.to_lowercase()
        {
            return affiliation.to_string();
        }

        format!("{} — {}", affiliation, name)
    }
}

static DEFAULT_RESOLVER: Lazy<LabelResolver> = Lazy::new(LabelResolver::default);

/// Resolve a label with the built-in vocabulary only.
pub fn resolve_display_label(party: &Party, role: Role) -> String {
    DEFAULT_RESOLVER.resolve(party, role)
}
