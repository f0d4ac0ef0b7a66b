use chrono::NaiveDate;
use std::cell::Cell;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use chess_standings::cache::Store;
use chess_standings::config::{AppConfig, FederationConfig};
use chess_standings::domain::Federation;
use chess_standings::errors::FetchError;
use chess_standings::http::{Fetcher, PageSource, RetryPolicy};
use chess_standings::services::{CrawlService, RepairService};

/// Pages served from memory; anything missing fails like an unreachable page
#[derive(Clone, Default)]
struct MemorySource {
    pages: HashMap<String, String>,
}

impl MemorySource {
    fn with(mut self, url: &str, body: &str) -> Self {
        self.pages.insert(url.to_string(), body.to_string());
        self
    }

    fn lookup(&self, url: &str) -> Result<String, FetchError> {
        self.pages.get(url).cloned().ok_or_else(|| FetchError::Status {
            url: url.to_string(),
            status: 404,
        })
    }
}

impl PageSource for MemorySource {
    async fn render(&self, url: &str) -> Result<String, FetchError> {
        self.lookup(url)
    }

    async fn get_text(&self, url: &str) -> Result<String, FetchError> {
        self.lookup(url)
    }
}

/// Pages from memory after a short render delay, counting renders in flight
#[derive(Default)]
struct InFlightSource {
    pages: MemorySource,
    in_flight: Cell<usize>,
    peak: Cell<usize>,
}

impl PageSource for InFlightSource {
    async fn render(&self, url: &str) -> Result<String, FetchError> {
        self.in_flight.set(self.in_flight.get() + 1);
        self.peak.set(self.peak.get().max(self.in_flight.get()));
        tokio::time::sleep(Duration::from_millis(2)).await;
        self.in_flight.set(self.in_flight.get() - 1);
        self.pages.lookup(url)
    }

    async fn get_text(&self, url: &str) -> Result<String, FetchError> {
        self.pages.lookup(url)
    }
}

const KNSB: &str = "https://knsb.test";
const NOSBO: &str = "https://nosbo.test";
const RATINGS: &str = "https://ratings.test";

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 10, 15).unwrap()
}

fn output_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("chess_standings_it_{}_{}", name, std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    dir
}

fn config(dir: &PathBuf) -> AppConfig {
    let mut config = AppConfig::new();
    config.federations = vec![
        FederationConfig::new(Federation::Knsb, KNSB, "/scores/index/54"),
        FederationConfig::new(Federation::Nosbo, NOSBO, "/scores/index/16"),
    ];
    config.scraper.ratings_api_base = RATINGS.to_string();
    config.output.dir = dir.clone();
    config
}

fn fetcher(source: MemorySource) -> Fetcher<MemorySource> {
    Fetcher::new(source, RetryPolicy::new(2, Duration::ZERO), Duration::from_secs(5))
}

fn team_page(division: Option<&str>, roster: &[(&str, &str)], fixtures: &[(&str, &str, &str, &str)]) -> String {
    let division = division
        .map(|id| format!(r#"<a href="/divisions/view/{id}">Klasse</a>"#))
        .unwrap_or_default();
    let roster: String = roster
        .iter()
        .map(|(id, name)| format!(r#"<tr><td><a href="/players/view/{id}">{name}</a></td></tr>"#))
        .collect();
    let fixtures: String = fixtures
        .iter()
        .map(|(home, away, result, pairing)| {
            format!(
                r#"<tr><td>1</td><td>01-10-2025</td><td>{home}</td><td>{away}</td><td><a href="/pairings/view/{pairing}">{result}</a></td></tr>"#
            )
        })
        .collect();
    format!(
        r#"<html><body>{division}
            <div><b>MP</b> 4</div><div><b>BP</b> 10,5</div>
            <table id="DataTables_Table_0"><tbody>{roster}</tbody></table>
            <table class="table table-striped table-bordered"><tbody>{fixtures}</tbody></table>
        </body></html>"#
    )
}

fn pairing_page(home: &str, away: &str, players: &[&str], ratings: (u32, u32)) -> String {
    let rows: String = players
        .iter()
        .enumerate()
        .map(|(i, name)| format!(r#"<tr><td><a href="/players/view/{i}">{name}</a></td></tr>"#))
        .collect();
    format!(
        r#"<html><body><table class="table table-striped">
            <thead><tr><th><a href="/teams/view/1">{home}</a></th><th><a href="/teams/view/2">{away}</a></th></tr></thead>
            <tbody>{rows}</tbody>
            <tfoot><tr><th>Gemiddelde Rating:</th><th>{}</th><th>Gemiddelde Rating:</th><th>{}</th></tr></tfoot>
        </table></body></html>"#,
        ratings.0, ratings.1
    )
}

fn player_page(name: &str, universal_id: Option<&str>, games: &[(&str, &str)]) -> String {
    let profile = universal_id
        .map(|id| format!(r#"<a href="https://ratingviewer.nl/list/latest/players/{id}/">Ratingviewer</a>"#))
        .unwrap_or_default();
    let rows: String = games
        .iter()
        .map(|(round, opponent)| {
            format!(r#"<tr><td><a href="/rounds/view/{round}">Ronde 1</a></td><td>{opponent}</td><td>1</td><td>w</td></tr>"#)
        })
        .collect();
    format!(
        r#"<html><body>
            <div class="col-lg-4 offset-lg-4 text-center">{name}</div>
            {profile}
            <p><b>Rating</b> 1800</p>
            <div class="card"><span class="h3">Partijen</span><table><tbody>{rows}</tbody></table></div>
        </body></html>"#
    )
}

fn league() -> MemorySource {
    MemorySource::default()
        .with(
            &format!("{KNSB}/scores/index/54"),
            r#"<a href="/teams/view/1">SISSA 1</a><a href="/teams/view/20">Rivals 2</a>
               <a href="/scores/index/54?page=2">Volgende »</a>"#,
        )
        .with(
            &format!("{KNSB}/scores/index/54?page=2"),
            r#"<a href="/teams/view/2">SISSA 1</a><a href="/teams/view/3">SISSA II</a>"#,
        )
        .with(&format!("{NOSBO}/scores/index/16"), r#"<a href="/teams/view/7">SISSA 3</a>"#)
        .with(
            &format!("{KNSB}/teams/view/1"),
            &team_page(
                Some("42"),
                &[("101", "Alice")],
                &[("SISSA 1", "Rivals 2", "5 - 3", "9"), ("Ghosts 1", "SISSA 1", "0 - 8", "10")],
            ),
        )
        .with(
            &format!("{KNSB}/teams/view/2"),
            &team_page(Some("42"), &[("102", "Bob")], &[("Rivals 3", "SISSA 1", "3½ - 4½", "11")]),
        )
        .with(&format!("{KNSB}/teams/view/3"), &team_page(None, &[("101", "Alice")], &[]))
        .with(&format!("{KNSB}/teams/view/20"), &team_page(Some("42"), &[("201", "Carl")], &[]))
        .with(
            &format!("{KNSB}/pairings/view/9"),
            &pairing_page("SISSA 1", "Rivals 2", &["Alice", "Carl"], (1850, 1700)),
        )
        .with(
            &format!("{KNSB}/pairings/view/10"),
            &pairing_page("Ghosts 1", "SISSA 1", &["NN", "NN"], (0, 0)),
        )
        .with(
            &format!("{KNSB}/pairings/view/11"),
            &pairing_page("Rivals 3", "SISSA 1", &["Eve", "Bob"], (1500, 1820)),
        )
        .with(
            &format!("{KNSB}/divisions/view/42"),
            r#"<h1>Klasse 2A</h1>
               <h2>Teams</h2>
               <table><tbody>
                   <tr><td><a href="/teams/view/1">SISSA 1</a></td></tr>
                   <tr><td><a href="/teams/view/20">Rivals 2</a></td></tr>
               </tbody></table>
               <table class="dataTable"><tbody>
                   <tr><td><a href="/players/view/101">Alice</a></td><td>1850</td></tr>
                   <tr><td><a href="/players/view/201">Carl</a></td><td>1700</td></tr>
               </tbody></table>"#,
        )
        .with(
            &format!("{KNSB}/players/view/101"),
            &player_page("Alice", Some("900"), &[("501", "Carl (1700)")]),
        )
        .with(&format!("{KNSB}/players/view/102"), &player_page("Bob", None, &[]))
        .with(
            &format!("{KNSB}/players/view/201"),
            &player_page("Carl", Some("901"), &[("501", "Alice (1850)")]),
        )
        .with(&format!("{KNSB}/rounds/view/501"), "<table><tr><th>Startdatum</th><td>01-10-2025</td></tr></table>")
        .with(
            &format!("{RATINGS}/metrics/forRelatienr/900.json"),
            r#"[{"moment": "2025-09-02", "rating": 1850}, {"moment": "2025-09-20", "rating": 1861}]"#,
        )
}

fn read_json(dir: &PathBuf, file: &str) -> serde_json::Value {
    serde_json::from_str(&fs::read_to_string(dir.join(file)).unwrap()).unwrap()
}

#[tokio::test]
async fn test_full_crawl_writes_aggregated_collections() {
    let dir = output_dir("crawl");
    let config = config(&dir);
    let fetcher = fetcher(league());

    let report = CrawlService::new(&config, &fetcher, today())
        .unwrap()
        .run()
        .await
        .unwrap()
        .expect("club teams were discovered");

    assert_eq!(report.team_listings, 4);
    assert_eq!(report.teams, 4);
    assert_eq!(report.empty_teams, 1);
    assert_eq!(report.divisions, 1);
    assert_eq!(report.players, 2);
    assert_eq!(report.unresolved_players, 1);
    assert!(report.persist_failures.is_empty());

    let teams = read_json(&dir, "teams.json");
    let club = &teams["SISSA 1"];
    let matches = club["matches"].as_array().unwrap();
    assert_eq!(matches.len(), 2);
    let home = matches.iter().find(|m| m["opponent"] == "Rivals 2").unwrap();
    assert_eq!(home["location"], "Home");
    let away = matches.iter().find(|m| m["opponent"] == "Rivals 3").unwrap();
    assert_eq!(away["location"], "Away");
    assert_eq!(club["avg_opponent_rating"], 1600.0);
    assert!(club["players"]["101"].is_object());
    assert!(club["players"]["102"].is_object());
    assert!(teams["SISSA 3"]["players"].as_object().unwrap().is_empty());
    assert!(teams["Rivals 2"]["players"]["201"].is_object());

    let divisions = read_json(&dir, "divisions.json");
    assert_eq!(divisions["Klasse 2A"]["players"]["101"]["elo"], 1850);

    let players = read_json(&dir, "players.json");
    let alice = &players["900"];
    assert_eq!(alice["federation_ids"], serde_json::json!(["101"]));
    assert_eq!(alice["teams_played_for"], serde_json::json!(["SISSA 1", "SISSA II"]));
    assert_eq!(alice["games"][0]["date"], "01-10-2025");
    assert_eq!(alice["historical_ratings"], serde_json::json!({"2025-09": 1850}));
    assert_eq!(players["901"]["teams_played_for"], serde_json::json!(["Rivals 2"]));

    fs::remove_dir_all(dir).unwrap();
}

#[tokio::test]
async fn test_no_discovered_teams_writes_nothing() {
    let dir = output_dir("nothing");
    let config = config(&dir);
    let fetcher = fetcher(MemorySource::default().with(&format!("{KNSB}/scores/index/54"), "<p>Leeg</p>"));

    let report = CrawlService::new(&config, &fetcher, today()).unwrap().run().await.unwrap();

    assert!(report.is_none());
    assert!(!dir.join("teams.json").exists());
    fs::remove_dir_all(dir).unwrap();
}

#[tokio::test]
async fn test_repair_refetches_empty_teams() {
    let dir = output_dir("repair");
    let config = config(&dir);
    CrawlService::new(&config, &fetcher(league()), today())
        .unwrap()
        .run()
        .await
        .unwrap();

    let healed = league().with(&format!("{NOSBO}/teams/view/7"), &team_page(None, &[("301", "Dana")], &[]));
    let report = RepairService::new(&config, &fetcher(healed), today())
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(report.failed, 1);
    assert_eq!(report.repaired, 1);
    assert!(report.still_empty.is_empty());

    let teams = Store::new(&dir).unwrap().load_teams().unwrap();
    let repaired = teams.get("SISSA 3").unwrap();
    assert_eq!(repaired.federation, Federation::Nosbo);
    assert_eq!(repaired.roster["301"].name, "Dana");
    assert_eq!(teams.get("SISSA 1").unwrap().matches.len(), 2);

    fs::remove_dir_all(dir).unwrap();
}

#[tokio::test]
async fn test_repair_uses_stored_urls_for_undiscoverable_teams() {
    let dir = output_dir("repair_urls");
    let config = config(&dir);
    fs::create_dir_all(&dir).unwrap();
    fs::write(
        dir.join("teams.json"),
        format!(
            r#"{{"Rivals 9": {{"name": "Rivals 9", "federation": "KNSB", "division_url": null,
                "match_points": 0.0, "board_points": 0.0, "source_urls": ["{KNSB}/teams/view/99"]}}}}"#
        ),
    )
    .unwrap();

    let source = league().with(&format!("{KNSB}/teams/view/99"), &team_page(None, &[("909", "Zed")], &[]));
    let report = RepairService::new(&config, &fetcher(source), today())
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(report.repaired, 1);
    let teams = Store::new(&dir).unwrap().load_teams().unwrap();
    assert_eq!(teams.get("Rivals 9").unwrap().roster["909"].name, "Zed");

    fs::remove_dir_all(dir).unwrap();
}

/// Fifty club teams with ten pairings each, all fanned out at once
fn wide_league() -> MemorySource {
    let index: String = (1..=50)
        .map(|i| format!(r#"<a href="/teams/view/{}">SISSA {i}</a>"#, 1000 + i))
        .collect();
    let mut source = MemorySource::default()
        .with(&format!("{KNSB}/scores/index/54"), &index)
        .with(&format!("{NOSBO}/scores/index/16"), "<p>Leeg</p>");
    for i in 1..=50 {
        let home = format!("SISSA {i}");
        let pairings: Vec<String> = (0..10).map(|round| format!("{}", i * 100 + round)).collect();
        let fixtures: Vec<(&str, &str, &str, &str)> = pairings
            .iter()
            .map(|pairing| (home.as_str(), "Rivals 1", "4 - 4", pairing.as_str()))
            .collect();
        source = source.with(&format!("{KNSB}/teams/view/{}", 1000 + i), &team_page(None, &[], &fixtures));
    }
    source
}

#[tokio::test]
async fn test_nested_fan_out_respects_open_page_cap() {
    let dir = output_dir("open_pages");
    let config = config(&dir);
    let source = InFlightSource {
        pages: wide_league(),
        ..Default::default()
    };
    let fetcher = Fetcher::new(source, RetryPolicy::new(1, Duration::ZERO), Duration::from_secs(5))
        .with_max_open_pages(config.concurrency.max_open_pages);

    let report = CrawlService::new(&config, &fetcher, today())
        .unwrap()
        .run()
        .await
        .unwrap()
        .expect("club teams were discovered");

    assert_eq!(report.team_listings, 50);
    let peak = fetcher.source().peak.get();
    assert!(peak > 1, "renders never overlapped");
    assert!(
        peak <= config.concurrency.max_open_pages,
        "{} renders in flight, cap is {}",
        peak,
        config.concurrency.max_open_pages
    );

    fs::remove_dir_all(dir).unwrap();
}

#[tokio::test]
async fn test_repair_keeps_teams_that_fail_again() {
    let dir = output_dir("repair_again");
    let config = config(&dir);
    CrawlService::new(&config, &fetcher(league()), today())
        .unwrap()
        .run()
        .await
        .unwrap();

    let report = RepairService::new(&config, &fetcher(league()), today())
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(report.failed, 1);
    assert_eq!(report.repaired, 0);
    assert_eq!(report.still_empty, vec!["SISSA 3".to_string()]);

    let teams = Store::new(&dir).unwrap().load_teams().unwrap();
    let failed = teams.get("SISSA 3").unwrap();
    assert!(failed.roster.is_empty());
    assert!(failed.matches.is_empty());
    assert_eq!(failed.source_urls, vec![format!("{NOSBO}/teams/view/7")]);
    assert_eq!(teams.get("SISSA 1").unwrap().matches.len(), 2);

    fs::remove_dir_all(dir).unwrap();
}

#[tokio::test]
async fn test_listing_page_cap_limits_discovery() {
    let dir = output_dir("page_cap");
    let mut config = config(&dir);
    config.scraper.max_listing_pages = Some(1);

    let report = CrawlService::new(&config, &fetcher(league()), today())
        .unwrap()
        .run()
        .await
        .unwrap()
        .expect("club teams were discovered");

    assert_eq!(report.team_listings, 2);
    let teams = read_json(&dir, "teams.json");
    assert!(teams.get("SISSA II").is_none());

    fs::remove_dir_all(dir).unwrap();
}
