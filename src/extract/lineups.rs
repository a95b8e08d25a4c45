//! Lineup extraction strategies
//!
//! The site has served two incompatible match report layouts over the years.
//! Each layout is a pure function from document to `Lineups`; they are tried
//! in order and the first non-empty result wins.

use crate::extract::text::own_text;
use crate::record::{CardEvent, Lineups, PlayerAppearance, Side};
use scraper::{ElementRef, Html, Selector};

/// A lineup extraction attempt for one page layout
pub type LineupStrategy = fn(&Html) -> Lineups;

/// Strategies in the order they are attempted
pub const LINEUP_STRATEGIES: &[(&str, LineupStrategy)] =
    &[("modern", extract_modern), ("legacy", extract_legacy)];

/// Runs the strategies in order, returning the first non-empty lineup
///
/// The name of the layout that matched is returned alongside; `None` means no
/// layout produced any player.
pub fn extract_lineups(document: &Html) -> (Lineups, Option<&'static str>) {
    for (name, strategy) in LINEUP_STRATEGIES {
        let lineups = strategy(document);
        if !lineups.is_empty() {
            return (lineups, Some(*name));
        }
    }
    (Lineups::default(), None)
}

/// Current layout: two side columns of player blocks with card markers
///
/// ```html
/// <div class="zz-tpl-row game_report">
///   <div class="zz-tpl-col is-6 fl-c">
///     <div class="player">
///       <div class="name"><div class="micrologo_and_text"><div class="text"><a>Name</a></div></div></div>
///       <div class="events"><span title="Cartão amarelo"></span></div>
///     </div>
///   </div>
///   <div class="zz-tpl-col is-6 fl-c">...</div>
/// </div>
/// ```
pub fn extract_modern(document: &Html) -> Lineups {
    let mut lineups = Lineups::default();

    let (Ok(sides), Ok(players), Ok(names), Ok(events)) = (
        Selector::parse("div.zz-tpl-row.game_report div.zz-tpl-col.is-6.fl-c"),
        Selector::parse("div.player"),
        Selector::parse("div.name div.micrologo_and_text div.text a"),
        Selector::parse("div.events span"),
    ) else {
        return lineups;
    };

    for (side, container) in [Side::Home, Side::Away]
        .into_iter()
        .zip(document.select(&sides))
    {
        for player in container.select(&players) {
            let Some(name) = player.select(&names).next().and_then(own_text) else {
                continue;
            };

            let cards = player
                .select(&events)
                .filter_map(|marker| marker.value().attr("title"))
                .filter_map(CardEvent::from_title)
                .collect();

            lineups.side_mut(side).push(PlayerAppearance {
                name,
                events: cards,
            });
        }
    }

    lineups
}

/// Older layout: exactly two team blocks of table rows or list items
///
/// Carries names only, so every appearance has an empty event set.
pub fn extract_legacy(document: &Html) -> Lineups {
    let mut lineups = Lineups::default();

    let (Ok(sides), Ok(rows), Ok(names)) = (
        Selector::parse("div#match_players div.team_players"),
        Selector::parse("table tr, ul li"),
        Selector::parse("td.name a, a"),
    ) else {
        return lineups;
    };

    let containers: Vec<ElementRef<'_>> = document.select(&sides).collect();
    if containers.len() != 2 {
        return lineups;
    }

    for (side, container) in [Side::Home, Side::Away].into_iter().zip(containers) {
        for row in container.select(&rows) {
            if let Some(name) = row.select(&names).next().and_then(own_text) {
                lineups.side_mut(side).push(PlayerAppearance::new(name));
            }
        }
    }

    lineups
}
