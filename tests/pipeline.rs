use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use season_terminal::classify::{Outcome, Venue};
use season_terminal::config::Config;
use season_terminal::error::PipelineError;
use season_terminal::pipeline::{self, HOME_AWAY_CHART, RESULTS_CHART};
use season_terminal::raw::parse_fixtures_response;
use season_terminal::schema::map_fixtures;
use season_terminal::tabular::{self, COLLECT_HINT, TRANSFORM_HINT};

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

fn temp_config(tag: &str) -> Config {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    let dir = std::env::temp_dir().join(format!(
        "season_terminal_{tag}_{}_{nanos}",
        std::process::id()
    ));
    Config::default().with_data_dir(dir)
}

fn collect_from_fixture(cfg: &Config, name: &str) {
    let fixtures = parse_fixtures_response(&read_fixture(name)).expect("fixture should parse");
    pipeline::store_raw(cfg, &fixtures).expect("raw snapshot should be written");
}

#[test]
fn full_pipeline_summarizes_the_season() {
    let cfg = temp_config("full");
    collect_from_fixture(&cfg, "fixtures_response.json");

    let transformed = pipeline::transform(&cfg).expect("transform should succeed");
    assert_eq!(transformed.matches.len(), 4);
    assert_eq!(transformed.matches[1].match_date, "2023-04-23 16:00:00");

    let report = pipeline::analyze(&cfg).expect("analyze should succeed");
    let s = &report.summary;
    assert_eq!(s.total, 4);
    assert_eq!((s.wins(), s.draws(), s.losses()), (2, 1, 1));
    assert!((s.performance_pct - 7.0 / 12.0 * 100.0).abs() < 1e-9);
    assert_eq!((s.home.wins, s.home.losses), (1, 1));
    assert_eq!((s.away.wins, s.away.draws), (1, 1));
    assert_eq!((s.goals_for, s.goals_against), (5, 3));

    let first = &report.matches[0];
    assert_eq!((first.outcome, first.venue), (Outcome::Win, Venue::Home));
    let second = &report.matches[1];
    assert_eq!((second.outcome, second.venue), (Outcome::Draw, Venue::Away));

    assert_eq!(report.workbook.matches, 4);
    assert!(report.outputs.contains(&cfg.workbook_path()));
    for path in &report.outputs {
        assert!(path.exists(), "missing output {}", path.display());
    }
    assert!(cfg.charts_dir().join(RESULTS_CHART).exists());
    assert!(cfg.charts_dir().join(HOME_AWAY_CHART).exists());

    let enriched = fs::read(cfg.enriched_path()).unwrap();
    assert!(enriched.starts_with(b"\xEF\xBB\xBF"));
    let table = tabular::parse_table(&enriched).unwrap();
    assert_eq!(table.headers.last().map(String::as_str), Some("venue"));
    assert_eq!(table.rows[0][10], "Win");

    let summary = String::from_utf8(fs::read(cfg.summary_path()).unwrap()).unwrap();
    assert!(summary.contains("performance_pct,58.33"));

    let _ = fs::remove_dir_all(&cfg.data_dir);
}

#[test]
fn normalized_table_round_trips() {
    let cfg = temp_config("roundtrip");
    let fixtures = parse_fixtures_response(&read_fixture("fixtures_response.json")).unwrap();
    let mapped = map_fixtures(&fixtures).unwrap();

    pipeline::store_raw(&cfg, &fixtures).unwrap();
    pipeline::transform(&cfg).unwrap();
    let reread = tabular::read_normalized(&cfg.normalized_path()).unwrap();
    assert_eq!(reread, mapped);

    let _ = fs::remove_dir_all(&cfg.data_dir);
}

#[test]
fn numeric_looking_text_survives_the_snapshot() {
    let cfg = temp_config("text_cells");
    let body = read_fixture("fixtures_response.json")
        .replace("\"Regular Season - 1\"", "\"007\"")
        .replace("\"Palmeiras\"", "\"True\"");
    let fixtures = parse_fixtures_response(&body).unwrap();
    let direct = map_fixtures(&fixtures).unwrap();
    assert_eq!(direct[0].round, "007");
    assert_eq!(direct[0].away_team, "True");

    pipeline::store_raw(&cfg, &fixtures).unwrap();
    let report = pipeline::transform(&cfg).unwrap();
    assert_eq!(report.matches, direct);

    let _ = fs::remove_dir_all(&cfg.data_dir);
}

#[test]
fn raw_snapshot_keeps_every_source_column() {
    let cfg = temp_config("snapshot");
    collect_from_fixture(&cfg, "fixtures_response.json");
    let raw = fs::read(cfg.raw_path()).unwrap();
    let table = tabular::parse_table(&raw).unwrap();
    for col in ["fixture.referee", "fixture.venue.city", "teams.home.winner", "score.penalty.away"] {
        assert!(table.column(col).is_some(), "missing column {col}");
    }
    let referee = table.column("fixture.referee").unwrap();
    assert_eq!(table.rows[0][referee], "Raphael Claus, Brazil");

    let _ = fs::remove_dir_all(&cfg.data_dir);
}

#[test]
fn scheduled_match_stops_analysis() {
    let cfg = temp_config("scheduled");
    collect_from_fixture(&cfg, "fixtures_with_scheduled.json");
    let transformed = pipeline::transform(&cfg).expect("null goals are allowed in the table");
    assert_eq!(transformed.matches[4].home_goals, None);

    match pipeline::analyze(&cfg) {
        Err(PipelineError::IncompleteMatch { match_id }) => assert_eq!(match_id, 1005),
        other => panic!("expected incomplete match, got {other:?}"),
    }

    let _ = fs::remove_dir_all(&cfg.data_dir);
}

#[test]
fn wrong_team_is_reported() {
    let mut cfg = temp_config("wrong_team");
    collect_from_fixture(&cfg, "fixtures_response.json");
    pipeline::transform(&cfg).unwrap();
    cfg.team_name = "Corinthians".to_string();

    match pipeline::analyze(&cfg) {
        Err(PipelineError::UnknownTeam { match_id, team }) => {
            assert_eq!(match_id, 1001);
            assert_eq!(team, "Corinthians");
        }
        other => panic!("expected unknown team, got {other:?}"),
    }

    let _ = fs::remove_dir_all(&cfg.data_dir);
}

#[test]
fn stages_point_at_their_predecessor() {
    let cfg = temp_config("missing");
    match pipeline::transform(&cfg) {
        Err(PipelineError::MissingInput { hint, .. }) => assert_eq!(hint, COLLECT_HINT),
        other => panic!("expected missing input, got {other:?}"),
    }
    match pipeline::analyze(&cfg) {
        Err(PipelineError::MissingInput { hint, path }) => {
            assert_eq!(hint, TRANSFORM_HINT);
            assert_eq!(path, cfg.normalized_path());
        }
        other => panic!("expected missing input, got {other:?}"),
    }
}

#[test]
fn empty_api_response_is_rejected() {
    let err = parse_fixtures_response(&read_fixture("fixtures_empty.json")).unwrap_err();
    assert!(matches!(err, PipelineError::EmptyResponse));
}

#[test]
fn snapshot_without_a_mapped_column_aborts_transform() {
    let cfg = temp_config("no_round");
    let path = cfg.raw_path();
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let csv = "\u{feff}fixture.id,fixture.date,league.name,teams.home.name,teams.away.name,goals.home,goals.away,score.fulltime.home,score.fulltime.away\n\
               1,2023-04-16T21:00:00+00:00,Serie A,Sao Paulo,Santos,1,0,1,0\n";
    fs::write(&path, csv).unwrap();

    match pipeline::transform(&cfg) {
        Err(PipelineError::Schema { field, .. }) => assert_eq!(field, "league.round"),
        other => panic!("expected schema error, got {other:?}"),
    }

    let _ = fs::remove_dir_all(&cfg.data_dir);
}

#[test]
fn float_widened_goals_are_accepted() {
    let cfg = temp_config("float_goals");
    let path = cfg.raw_path();
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let csv = "fixture.id,fixture.date,league.name,league.round,teams.home.name,teams.away.name,goals.home,goals.away,score.fulltime.home,score.fulltime.away\n\
               7,2023-06-01T19:00:00+00:00,Serie A,Regular Season - 9,Santos,Sao Paulo,1.0,3.0,1.0,3.0\n\
               8,2023-06-08T19:00:00+00:00,Serie A,Regular Season - 10,Sao Paulo,Santos,,,,\n";
    fs::write(&path, csv).unwrap();

    let report = pipeline::transform(&cfg).unwrap();
    assert_eq!(report.matches[0].home_goals, Some(1));
    assert_eq!(report.matches[0].away_goals, Some(3));
    assert_eq!(report.matches[1].fulltime_away, None);

    let _ = fs::remove_dir_all(&cfg.data_dir);
}
