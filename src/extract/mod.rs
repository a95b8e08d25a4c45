//! Match report extraction
//!
//! Turns a fetched match report into lineups and a statistics table. Lineups
//! come from the first layout strategy that finds any player; statistics use
//! the same selectors on every layout.

mod lineups;
mod stats;
pub(crate) mod text;

pub use lineups::{extract_legacy, extract_lineups, extract_modern, LineupStrategy, LINEUP_STRATEGIES};
pub use stats::extract_statistics;

use crate::record::{Lineups, StatTable};
use scraper::Html;

/// Everything pulled from one match report
#[derive(Debug, Clone, Default)]
pub struct DetailExtraction {
    pub lineups: Lineups,
    pub statistics: StatTable,

    /// Name of the layout whose lineups matched, if any
    pub layout: Option<&'static str>,
}

/// Parses a match report page and extracts lineups and statistics
///
/// # Example
///
/// ```
/// use sumula::extract::extract_detail;
///
/// let html = r#"<div id="match_players">
///     <div class="team_players"><ul><li><a>Marcos</a></li></ul></div>
///     <div class="team_players"><ul><li><a>Dida</a></li></ul></div>
/// </div>"#;
/// let detail = extract_detail(html);
/// assert_eq!(detail.layout, Some("legacy"));
/// assert_eq!(detail.lineups.home[0].name, "Marcos");
/// ```
pub fn extract_detail(html: &str) -> DetailExtraction {
    let document = Html::parse_document(html);
    let (lineups, layout) = extract_lineups(&document);
    let statistics = extract_statistics(&document);

    DetailExtraction {
        lineups,
        statistics,
        layout,
    }
}
