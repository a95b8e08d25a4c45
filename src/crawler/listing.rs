//! Listing page parsing
//!
//! A team's "all matches" page is a table with one row per match. Column
//! order has changed between site versions, so positions come from a
//! `ColumnMap` selected by layout (and optionally overridden in config).

use crate::config::{ListingConfig, ListingLayout};
use crate::crawler::plan::CrawlTask;
use crate::extract::text::{joined_text, own_text};
use crate::record::{Lineups, MatchRecord, StatTable};
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// 1-based column positions of each listing field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMap {
    pub competition: usize,
    pub date: usize,
    pub venue: usize,
    pub opponent: usize,
    pub result: usize,
    pub score: usize,
}

impl ColumnMap {
    /// Positions used by a known layout version
    pub fn for_layout(layout: ListingLayout) -> Self {
        match layout {
            ListingLayout::Current => Self {
                competition: 1,
                date: 2,
                venue: 4,
                opponent: 5,
                result: 6,
                score: 7,
            },
            ListingLayout::Legacy => Self {
                date: 1,
                competition: 2,
                venue: 3,
                opponent: 4,
                result: 5,
                score: 6,
            },
        }
    }

    /// Layout positions with any configured overrides applied
    pub fn from_config(config: &ListingConfig) -> Self {
        let base = Self::for_layout(config.layout);
        let columns = &config.columns;
        Self {
            competition: columns.competition.unwrap_or(base.competition),
            date: columns.date.unwrap_or(base.date),
            venue: columns.venue.unwrap_or(base.venue),
            opponent: columns.opponent.unwrap_or(base.opponent),
            result: columns.result.unwrap_or(base.result),
            score: columns.score.unwrap_or(base.score),
        }
    }
}

impl Default for ColumnMap {
    fn default() -> Self {
        Self::for_layout(ListingLayout::Current)
    }
}

/// A match parsed from a listing row, plus its report link if present
#[derive(Debug, Clone)]
pub struct ListingRow {
    pub record: MatchRecord,
    pub detail_url: Option<Url>,
}

/// Parses a listing page into partial match records
///
/// Returns an empty vector when the page has no match table or no rows;
/// seasons before a club existed look exactly like that.
pub fn parse_listing(
    html: &str,
    page_url: &Url,
    task: &CrawlTask,
    columns: &ColumnMap,
) -> Vec<ListingRow> {
    let document = Html::parse_document(html);

    let (Ok(rows), Ok(cells), Ok(link), Ok(anchor)) = (
        Selector::parse("div#team_games table.zztable.stats tbody tr"),
        Selector::parse("td"),
        Selector::parse("td a[href*='/jogo/']"),
        Selector::parse("a"),
    ) else {
        return Vec::new();
    };

    let mut parsed = Vec::new();

    for row in document.select(&rows) {
        // Header or spacer rows carry no data cells
        if row.select(&cells).next().is_none() {
            continue;
        }

        let children: Vec<ElementRef<'_>> = row.children().filter_map(ElementRef::wrap).collect();
        let cell = |position: usize| position.checked_sub(1).and_then(|i| children.get(i).copied());

        let detail_url = row
            .select(&link)
            .next()
            .and_then(|a| a.value().attr("href"))
            .and_then(|href| page_url.join(href.trim()).ok());

        let record = MatchRecord {
            team: task.team_id.clone(),
            year: task.year,
            date: cell(columns.date).and_then(own_text).unwrap_or_default(),
            competition: cell(columns.competition)
                .and_then(own_text)
                .unwrap_or_default(),
            opponent: cell(columns.opponent)
                .map(|td| opponent_name(td, &anchor))
                .unwrap_or_default(),
            venue: cell(columns.venue).and_then(own_text).unwrap_or_default(),
            result: cell(columns.result).map(joined_text).unwrap_or_default(),
            score: cell(columns.score).map(joined_text).unwrap_or_default(),
            lineups: Lineups::default(),
            statistics: StatTable::default(),
            is_rivalry: None,
            detail_url: detail_url.as_ref().map(|u| u.to_string()),
        };

        parsed.push(ListingRow { record, detail_url });
    }

    parsed
}

/// The opponent's link text, without the state suffix that follows it
fn opponent_name(cell: ElementRef<'_>, anchor: &Selector) -> String {
    cell.select(anchor)
        .map(joined_text)
        .find(|name| !name.is_empty())
        .unwrap_or_else(|| joined_text(cell))
}
