//! Integration tests for the harvester
//!
//! These tests use wiremock to serve listing and match report pages and run
//! the full crawl-extract-persist cycle against a temporary SQLite database.

use std::path::Path;
use std::time::{Duration, Instant};
use sumula::config::{parse_config, Config};
use sumula::crawler::run_crawl;
use sumula::output::load_statistics;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const LISTING_PATH: &str = "/equipe/sao-paulo/todos-os-jogos";

/// Creates a test configuration pointing at the mock server
///
/// `extra` is appended to the `[crawler]` table and may open further tables.
fn create_test_config(base_url: &str, db_path: &Path, backend: &str, extra: &str) -> Config {
    parse_config(&format!(
        r#"
[storage]
backend = "{}"
database-path = "{}"
batch-size = 1

[user-agent]
pool = ["SumulaTest/1.0"]

[crawler]
teams = ["sao-paulo"]
start-year = 2023
end-year = 2023
pages = [1]
base-url = "{}"
max-concurrent-requests = 4
minimum-time-between-requests = 10
request-timeout = 5
{}
"#,
        backend,
        db_path.display(),
        base_url,
        extra
    ))
    .expect("test config should be valid")
}

fn listing_page(rows: &str) -> String {
    format!(
        r#"<html><body><div id="team_games">
             <table class="zztable stats"><tbody>{}</tbody></table>
           </div></body></html>"#,
        rows
    )
}

fn row(date: &str, opponent: &str, detail: Option<&str>) -> String {
    let score = match detail {
        Some(href) => format!(r#"<a href="{}">2-1</a>"#, href),
        None => "2-1".to_string(),
    };
    format!(
        r#"<tr><td>Brasileirão</td><td>{}</td><td></td><td>Casa</td><td><a href="/equipe/x">{}</a> <span>(SP)</span></td><td>V</td><td>{}</td></tr>"#,
        date, opponent, score
    )
}

const REPORT_PAGE: &str = r#"<html><body>
    <div class="zz-tpl-row game_report">
      <div class="zz-tpl-col is-6 fl-c">
        <div class="player">
          <div class="name"><div class="micrologo_and_text"><div class="text"><a>Rafinha</a></div></div></div>
          <div class="events"><span title="Cartão amarelo 33'"></span></div>
        </div>
      </div>
      <div class="zz-tpl-col is-6 fl-c">
        <div class="player">
          <div class="name"><div class="micrologo_and_text"><div class="text"><a>Weverton</a></div></div></div>
          <div class="events"></div>
        </div>
      </div>
    </div>
    <div id="match_stats">
      <div class="statRow"><span class="statLabel">Posse de bola</span><span class="homeStat">52%</span><span class="awayStat">48%</span></div>
    </div>
</body></html>"#;

async fn mount_listing(server: &MockServer, body: String) {
    Mock::given(method("GET"))
        .and(path(LISTING_PATH))
        .and(query_param("ano", "2023"))
        .and(query_param("ano_fim", "2023"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

async fn mount_report(server: &MockServer, report_path: &str, expected_calls: u64) {
    Mock::given(method("GET"))
        .and(path(report_path))
        .respond_with(ResponseTemplate::new(200).set_body_string(REPORT_PAGE))
        .expect(expected_calls)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_harvest_into_normalized_store() {
    let server = MockServer::start().await;
    mount_listing(
        &server,
        listing_page(&format!(
            "{}{}",
            row("2023-04-16", "Palmeiras", Some("/jogo/2023-04-16-sao-paulo-palmeiras/1")),
            row("2023-01-20", "Flamengo", None)
        )),
    )
    .await;
    mount_report(&server, "/jogo/2023-04-16-sao-paulo-palmeiras/1", 1).await;

    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("harvest.db");
    let config = create_test_config(&server.uri(), &db_path, "normalized", "");

    let summary = run_crawl(config, "test-hash", CancellationToken::new())
        .await
        .expect("crawl should succeed");

    assert_eq!(summary.crawl.tasks_planned, 1);
    assert_eq!(summary.crawl.tasks_completed, 1);
    assert_eq!(summary.crawl.records_emitted, 2);
    assert_eq!(summary.crawl.block_signals, 0);
    assert!(!summary.crawl.cancelled);
    assert_eq!(summary.sink.ingested, 2);
    assert!(!summary.sink.degraded);

    let stats = load_statistics(&db_path).unwrap();
    assert_eq!(stats.runs, 1);
    assert_eq!(stats.matches, 2);
    // sao-paulo, Palmeiras, Flamengo
    assert_eq!(stats.teams, 3);
    assert_eq!(stats.players, 2);
    assert_eq!(stats.lineup_entries, 2);
    assert_eq!(stats.card_events, 1);
    assert_eq!(stats.statistics_rows, 1);

    let conn = rusqlite::Connection::open(&db_path).unwrap();
    let config_hash: String = conn
        .query_row("SELECT config_hash FROM runs", [], |r| r.get(0))
        .unwrap();
    assert_eq!(config_hash, "test-hash");

    let players_for_flamengo: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM match_players mp
             JOIN matches m ON m.id = mp.match_id
             JOIN teams t ON t.id = m.opponent_id
             WHERE t.name = 'Flamengo'",
            [],
            |r| r.get(0),
        )
        .unwrap();
    assert_eq!(players_for_flamengo, 0);
}

#[tokio::test]
async fn test_rivalry_only_skips_reports_of_other_matches() {
    let server = MockServer::start().await;
    mount_listing(
        &server,
        listing_page(&format!(
            "{}{}",
            row("2023-04-16", "Corinthians", Some("/jogo/derby")),
            row("2023-05-01", "Grêmio", Some("/jogo/other"))
        )),
    )
    .await;
    mount_report(&server, "/jogo/derby", 1).await;
    mount_report(&server, "/jogo/other", 0).await;

    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("derby.db");
    let config = create_test_config(&server.uri(), &db_path, "flat", "rivalry-only = true");

    let summary = run_crawl(config, "hash", CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(summary.crawl.records_emitted, 1);
    assert_eq!(summary.crawl.records_filtered, 1);

    let conn = rusqlite::Connection::open(&db_path).unwrap();
    let (opponent, is_rivalry): (String, Option<bool>) = conn
        .query_row("SELECT opponent, is_rivalry FROM matches", [], |r| {
            Ok((r.get(0)?, r.get(1)?))
        })
        .unwrap();
    assert_eq!(opponent, "Corinthians");
    assert_eq!(is_rivalry, Some(true));
}

#[tokio::test]
async fn test_block_redirect_pauses_then_recovers() {
    let server = MockServer::start().await;

    // First request is blocked, later ones succeed
    Mock::given(method("GET"))
        .and(path(LISTING_PATH))
        .respond_with(ResponseTemplate::new(302).insert_header("location", "/bloqueado"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_listing(
        &server,
        listing_page(&row("2023-01-20", "Santos", None)),
    )
    .await;

    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("blocked.db");
    let config = create_test_config(
        &server.uri(),
        &db_path,
        "normalized",
        "\n[backoff]\nbase-interval = 1\ncap = 1\nmax-block-retries = 1",
    );

    let start = Instant::now();
    let summary = run_crawl(config, "hash", CancellationToken::new())
        .await
        .unwrap();

    assert!(start.elapsed() >= Duration::from_secs(1));
    assert_eq!(summary.crawl.block_signals, 1);
    assert_eq!(summary.crawl.tasks_completed, 1);
    assert_eq!(summary.crawl.records_emitted, 1);
    assert_eq!(summary.sink.ingested, 1);
}

#[tokio::test]
async fn test_blocked_listing_is_skipped_by_default() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(LISTING_PATH))
        .respond_with(ResponseTemplate::new(302).insert_header("location", "/bloqueado"))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("skipped.db");
    let config = create_test_config(
        &server.uri(),
        &db_path,
        "flat",
        "\n[backoff]\nbase-interval = 1\ncap = 1",
    );

    let start = Instant::now();
    let summary = run_crawl(config, "hash", CancellationToken::new())
        .await
        .unwrap();

    assert!(start.elapsed() >= Duration::from_secs(1));
    assert_eq!(summary.crawl.block_signals, 1);
    assert_eq!(summary.crawl.tasks_failed, 1);
    assert_eq!(summary.crawl.records_emitted, 0);
}

#[tokio::test]
async fn test_store_of_another_backend_is_not_written() {
    let server = MockServer::start().await;
    mount_listing(&server, listing_page(&row("2023-04-16", "Palmeiras", None))).await;

    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("shared.db");

    let first = run_crawl(
        create_test_config(&server.uri(), &db_path, "flat", ""),
        "hash",
        CancellationToken::new(),
    )
    .await
    .unwrap();
    assert_eq!(first.sink.ingested, 1);

    let second = run_crawl(
        create_test_config(&server.uri(), &db_path, "document", ""),
        "hash",
        CancellationToken::new(),
    )
    .await
    .unwrap();
    assert!(second.sink.degraded);
    assert_eq!(second.sink.ingested, 0);
    assert_eq!(second.sink.discarded, 1);

    let conn = rusqlite::Connection::open(&db_path).unwrap();
    let (matches, runs): (i64, i64) = conn
        .query_row(
            "SELECT (SELECT COUNT(*) FROM matches), (SELECT COUNT(*) FROM runs)",
            [],
            |r| Ok((r.get(0)?, r.get(1)?)),
        )
        .unwrap();
    assert_eq!(matches, 1);
    assert_eq!(runs, 1);
}

#[tokio::test]
async fn test_document_store_keeps_json_lineups() {
    let server = MockServer::start().await;
    mount_listing(
        &server,
        listing_page(&row("2023-04-16", "Palmeiras", Some("/jogo/1"))),
    )
    .await;
    mount_report(&server, "/jogo/1", 1).await;

    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("document.db");
    let config = create_test_config(&server.uri(), &db_path, "document", "");

    run_crawl(config, "hash", CancellationToken::new())
        .await
        .unwrap();

    let conn = rusqlite::Connection::open(&db_path).unwrap();
    let (lineups, statistics): (String, String) = conn
        .query_row("SELECT lineups, statistics FROM matches", [], |r| {
            Ok((r.get(0)?, r.get(1)?))
        })
        .unwrap();

    let lineups: serde_json::Value = serde_json::from_str(&lineups).unwrap();
    assert_eq!(lineups["home"][0]["name"], "Rafinha");
    assert_eq!(lineups["home"][0]["events"], serde_json::json!(["yellow"]));
    assert_eq!(lineups["away"][0]["events"], serde_json::json!([]));

    let statistics: serde_json::Value = serde_json::from_str(&statistics).unwrap();
    assert_eq!(statistics["Posse de bola"]["away"], "48%");
}

#[tokio::test]
async fn test_unavailable_store_does_not_block_crawl() {
    let server = MockServer::start().await;
    mount_listing(
        &server,
        listing_page(&format!(
            "{}{}",
            row("2023-04-16", "Palmeiras", None),
            row("2023-01-20", "Santos", None)
        )),
    )
    .await;

    // A regular file where the database directory should be
    let blocker = tempfile::NamedTempFile::new().unwrap();
    let db_path = blocker.path().join("nested").join("harvest.db");
    let config = create_test_config(&server.uri(), &db_path, "normalized", "");

    let summary = run_crawl(config, "hash", CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(summary.crawl.records_emitted, 2);
    assert!(summary.sink.degraded);
    assert_eq!(summary.sink.discarded, 2);
    assert_eq!(summary.sink.ingested, 0);
}

#[tokio::test]
async fn test_server_errors_are_skipped() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("errors.db");
    let mut config = create_test_config(&server.uri(), &db_path, "normalized", "");
    config.crawler.pages = vec![1, 2];

    let summary = run_crawl(config, "hash", CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(summary.crawl.tasks_planned, 2);
    assert_eq!(summary.crawl.tasks_failed, 2);
    assert_eq!(summary.crawl.records_emitted, 0);
    assert_eq!(summary.crawl.block_signals, 0);
}
