//! Derby classification
//!
//! Decides whether a match is an intra-state rivalry by looking both teams up
//! in a static table of regional groups. Opponents appear on listings under
//! their display name, so they are normalized to slug form before lookup.

mod groups;
mod normalize;

pub use groups::BUILTIN_GROUPS;
pub use normalize::normalize;

use crate::config::DerbyGroupEntry;
use std::collections::HashSet;

/// A region and the team slugs that belong to it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerbyGroup {
    pub region: String,
    pub teams: HashSet<String>,
}

/// Read-only region table, loaded once at startup
#[derive(Debug, Clone)]
pub struct DerbyTable {
    groups: Vec<DerbyGroup>,
}

impl DerbyTable {
    /// The table shipped with the crate
    pub fn builtin() -> Self {
        let groups = BUILTIN_GROUPS
            .iter()
            .map(|(region, teams)| DerbyGroup {
                region: region.to_string(),
                teams: teams.iter().map(|t| t.to_string()).collect(),
            })
            .collect();
        Self { groups }
    }

    /// Builds a table from configured groups, normalizing every member
    pub fn from_entries(entries: &[DerbyGroupEntry]) -> Self {
        let groups = entries
            .iter()
            .map(|entry| DerbyGroup {
                region: entry.region.clone(),
                teams: entry.teams.iter().map(|t| normalize(t)).collect(),
            })
            .collect();
        Self { groups }
    }

    /// Uses configured groups when present, the built-in table otherwise
    pub fn from_config(entries: &[DerbyGroupEntry]) -> Self {
        if entries.is_empty() {
            Self::builtin()
        } else {
            Self::from_entries(entries)
        }
    }

    /// Returns the first region containing `team_id`
    ///
    /// A team listed in several regions only ever resolves to the first one.
    pub fn group_of(&self, team_id: &str) -> Option<&DerbyGroup> {
        self.groups.iter().find(|g| g.teams.contains(team_id))
    }

    /// Whether `opponent_display_name` belongs to the same region as `team_id`
    ///
    /// # Examples
    ///
    /// ```
    /// use sumula::derby::DerbyTable;
    ///
    /// let table = DerbyTable::builtin();
    /// assert!(table.is_rivalry("sao-paulo", "Palmeiras"));
    /// assert!(!table.is_rivalry("sao-paulo", "Flamengo"));
    /// assert!(!table.is_rivalry("real-madrid", "Palmeiras"));
    /// ```
    pub fn is_rivalry(&self, team_id: &str, opponent_display_name: &str) -> bool {
        match self.group_of(team_id) {
            Some(group) => group.teams.contains(&normalize(opponent_display_name)),
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

impl Default for DerbyTable {
    fn default() -> Self {
        Self::builtin()
    }
}
