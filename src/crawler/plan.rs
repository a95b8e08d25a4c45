//! Request plan generation
//!
//! A crawl is fully described up front: one task per team, year and listing
//! page. Tasks are independent; their order only affects pacing.

use crate::config::CrawlerConfig;
use url::Url;

/// One listing page to fetch
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CrawlTask {
    pub team_id: String,
    pub year: i32,
    pub page: u32,
}

/// Builds the full request plan
///
/// Order is team-major, then year ascending, then page ascending.
///
/// # Example
///
/// ```
/// use sumula::crawler::plan_tasks;
///
/// let config: sumula::config::CrawlerConfig = toml::from_str(r#"
///     teams = ["santos"]
///     start-year = 2011
///     end-year = 2012
/// "#).unwrap();
///
/// let tasks = plan_tasks(&config);
/// assert_eq!(tasks.len(), 4);
/// assert_eq!((tasks[1].year, tasks[1].page), (2011, 2));
/// ```
pub fn plan_tasks(config: &CrawlerConfig) -> Vec<CrawlTask> {
    let mut pages = config.pages.clone();
    pages.sort_unstable();
    pages.dedup();

    let mut tasks = Vec::new();
    for team in &config.teams {
        for year in config.start_year..=config.end_year {
            for &page in &pages {
                tasks.push(CrawlTask {
                    team_id: team.clone(),
                    year,
                    page,
                });
            }
        }
    }
    tasks
}

/// Builds the "all matches" listing URL for a task
///
/// `end_year` fills the site's `ano_fim` parameter, which the listing expects
/// even when filtering to a single season.
pub fn listing_url(base: &Url, task: &CrawlTask, end_year: i32) -> Result<Url, url::ParseError> {
    let mut url = base.join(&format!("equipe/{}/todos-os-jogos", task.team_id))?;
    url.query_pairs_mut()
        .clear()
        .append_pair("grp", "1")
        .append_pair("ond", "")
        .append_pair("compet_id_jogos", "0")
        .append_pair("epoca_id", "154")
        .append_pair("ano", &task.year.to_string())
        .append_pair("ano_fim", &end_year.to_string())
        .append_pair("type", "year")
        .append_pair("epoca_id_fim", "0")
        .append_pair("comfim", "0")
        .append_pair("page", &task.page.to_string());
    Ok(url)
}
