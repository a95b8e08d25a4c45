use crate::extract::text::own_text;
use crate::record::{StatTable, StatValues};
use scraper::{Html, Selector};

/// Extracts the highlighted statistics table from a match report
///
/// Layout independent: every `.statRow` under `div#match_stats` contributes a
/// label with a home and an away value. Rows without a label are skipped and a
/// repeated label overwrites the earlier values.
pub fn extract_statistics(document: &Html) -> StatTable {
    let mut table = StatTable::new();

    let (Ok(rows), Ok(label), Ok(home), Ok(away)) = (
        Selector::parse("div#match_stats .statRow"),
        Selector::parse(".statLabel"),
        Selector::parse(".homeStat"),
        Selector::parse(".awayStat"),
    ) else {
        return table;
    };

    for row in document.select(&rows) {
        let Some(name) = row.select(&label).next().and_then(own_text) else {
            continue;
        };

        table.insert(
            name,
            StatValues {
                home: row.select(&home).next().and_then(own_text),
                away: row.select(&away).next().and_then(own_text),
            },
        );
    }

    table
}
