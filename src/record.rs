//! Match record types emitted by the crawler and consumed by the sinks

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::collections::BTreeSet;

/// A card shown to a player during a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CardEvent {
    Yellow,
    Red,
}

impl CardEvent {
    /// Classifies an event marker tooltip (case-insensitive substring match)
    pub fn from_title(title: &str) -> Option<Self> {
        let title = title.to_lowercase();
        if title.contains("amarelo") {
            Some(Self::Yellow)
        } else if title.contains("vermelho") {
            Some(Self::Red)
        } else {
            None
        }
    }

    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Yellow => "yellow",
            Self::Red => "red",
        }
    }
}

/// One player listed on a match report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerAppearance {
    pub name: String,
    pub events: BTreeSet<CardEvent>,
}

impl PlayerAppearance {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            events: BTreeSet::new(),
        }
    }
}

/// Which side of the match report a player was listed on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Home,
    Away,
}

impl Side {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::Away => "away",
        }
    }
}

/// Home and away lineups in document order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Lineups {
    pub home: Vec<PlayerAppearance>,
    pub away: Vec<PlayerAppearance>,
}

impl Lineups {
    pub fn is_empty(&self) -> bool {
        self.home.is_empty() && self.away.is_empty()
    }

    pub fn side_mut(&mut self, side: Side) -> &mut Vec<PlayerAppearance> {
        match side {
            Side::Home => &mut self.home,
            Side::Away => &mut self.away,
        }
    }

    /// Iterates both sides, home first, with the position within each side
    pub fn iter(&self) -> impl Iterator<Item = (Side, usize, &PlayerAppearance)> {
        let home = self
            .home
            .iter()
            .enumerate()
            .map(|(i, p)| (Side::Home, i, p));
        let away = self
            .away
            .iter()
            .enumerate()
            .map(|(i, p)| (Side::Away, i, p));
        home.chain(away)
    }
}

/// Home/away values for one statistic
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatValues {
    pub home: Option<String>,
    pub away: Option<String>,
}

/// Statistics keyed by label, kept in document order
///
/// Inserting an existing label replaces its values in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatTable {
    entries: Vec<(String, StatValues)>,
}

impl StatTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, label: impl Into<String>, values: StatValues) {
        let label = label.into();
        match self.entries.iter_mut().find(|(l, _)| *l == label) {
            Some((_, existing)) => *existing = values,
            None => self.entries.push((label, values)),
        }
    }

    pub fn get(&self, label: &str) -> Option<&StatValues> {
        self.entries
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &StatValues)> {
        self.entries.iter().map(|(l, v)| (l.as_str(), v))
    }
}

impl Serialize for StatTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (label, values) in &self.entries {
            map.serialize_entry(label, values)?;
        }
        map.end()
    }
}

/// A single match harvested from a team's fixture listing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchRecord {
    pub team: String,
    pub year: i32,
    pub date: String,
    pub competition: String,
    pub opponent: String,
    pub venue: String,
    pub result: String,
    pub score: String,
    pub lineups: Lineups,
    pub statistics: StatTable,

    /// Only set when the crawl filters to rivalry matches
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_rivalry: Option<bool>,

    /// Absolute URL of the match report, if the listing row linked one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail_url: Option<String>,
}

impl MatchRecord {
    /// Attaches the detail page output; called once per record
    pub fn enrich(&mut self, lineups: Lineups, statistics: StatTable) {
        self.lineups = lineups;
        self.statistics = statistics;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_event_from_title() {
        assert_eq!(
            CardEvent::from_title("Cartão Amarelo 45'"),
            Some(CardEvent::Yellow)
        );
        assert_eq!(CardEvent::from_title("CARTÃO VERMELHO"), Some(CardEvent::Red));
        assert_eq!(CardEvent::from_title("Gol"), None);
    }

    #[test]
    fn test_stat_table_last_wins_keeps_position() {
        let mut table = StatTable::new();
        table.insert(
            "Posse de bola",
            StatValues {
                home: Some("40%".into()),
                away: Some("60%".into()),
            },
        );
        table.insert("Chutes", StatValues::default());
        table.insert(
            "Posse de bola",
            StatValues {
                home: Some("55%".into()),
                away: Some("45%".into()),
            },
        );

        assert_eq!(table.len(), 2);
        let labels: Vec<&str> = table.iter().map(|(l, _)| l).collect();
        assert_eq!(labels, vec!["Posse de bola", "Chutes"]);
        assert_eq!(
            table.get("Posse de bola").unwrap().home.as_deref(),
            Some("55%")
        );
    }

    #[test]
    fn test_stat_table_serializes_in_order() {
        let mut table = StatTable::new();
        table.insert("B", StatValues::default());
        table.insert("A", StatValues::default());
        let json = serde_json::to_string(&table).unwrap();
        assert_eq!(
            json,
            r#"{"B":{"home":null,"away":null},"A":{"home":null,"away":null}}"#
        );
    }

    #[test]
    fn test_lineups_iter_home_first() {
        let lineups = Lineups {
            home: vec![PlayerAppearance::new("Rogério Ceni")],
            away: vec![PlayerAppearance::new("Marcos"), PlayerAppearance::new("Cafu")],
        };
        let order: Vec<(Side, usize, &str)> = lineups
            .iter()
            .map(|(s, i, p)| (s, i, p.name.as_str()))
            .collect();
        assert_eq!(
            order,
            vec![
                (Side::Home, 0, "Rogério Ceni"),
                (Side::Away, 0, "Marcos"),
                (Side::Away, 1, "Cafu"),
            ]
        );
    }
}
