//! Batch stages. Each stage reads the previous stage's file, so any stage can
//! be re-run on its own after a failure.

use std::path::PathBuf;

use tracing::info;

use crate::charts::{home_away_figure, results_figure};
use crate::classify::{EnrichedMatch, Venue, enrich};
use crate::config::Config;
use crate::error::Result;
use crate::fetch;
use crate::raw::RawFixture;
use crate::schema::{NormalizedMatch, map_fixtures};
use crate::summary::{SeasonSummary, summarize};
use crate::tabular;
use crate::workbook::{WorkbookReport, export_workbook};

pub const RESULTS_CHART: &str = "results.txt";
pub const HOME_AWAY_CHART: &str = "home_away.txt";

#[derive(Debug, Clone)]
pub struct CollectReport {
    pub fixtures: usize,
    pub path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct TransformReport {
    pub matches: Vec<NormalizedMatch>,
    pub path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct AnalysisReport {
    pub matches: Vec<EnrichedMatch>,
    pub summary: SeasonSummary,
    pub workbook: WorkbookReport,
    pub outputs: Vec<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct RunReport {
    pub collected: CollectReport,
    pub transformed: TransformReport,
    pub analysis: AnalysisReport,
}

/// Fetches fixtures and writes the raw snapshot.
pub fn collect(cfg: &Config) -> Result<CollectReport> {
    let fixtures = fetch::fetch_fixtures(cfg)?;
    store_raw(cfg, &fixtures)
}

pub fn store_raw(cfg: &Config, fixtures: &[RawFixture]) -> Result<CollectReport> {
    let path = cfg.raw_path();
    tabular::write_raw_snapshot(&path, fixtures)?;
    info!(path = %path.display(), fixtures = fixtures.len(), "raw snapshot written");
    Ok(CollectReport {
        fixtures: fixtures.len(),
        path,
    })
}

/// Raw snapshot to normalized table.
pub fn transform(cfg: &Config) -> Result<TransformReport> {
    let raw_path = cfg.raw_path();
    info!(path = %raw_path.display(), "reading raw snapshot");
    let fixtures = tabular::read_raw_snapshot(&raw_path)?;
    let matches = map_fixtures(&fixtures)?;

    let path = cfg.normalized_path();
    tabular::write_normalized(&path, &matches)?;
    info!(path = %path.display(), matches = matches.len(), "normalized table written");
    Ok(TransformReport { matches, path })
}

/// Normalized table to enriched export, summary, workbook and charts.
pub fn analyze(cfg: &Config) -> Result<AnalysisReport> {
    let normalized = tabular::read_normalized(&cfg.normalized_path())?;
    let matches = enrich(&normalized, &cfg.team_name)?;
    let summary = summarize(&matches)?;
    info!(
        matches = summary.total,
        wins = summary.wins(),
        draws = summary.draws(),
        losses = summary.losses(),
        "season summarized"
    );

    let mut outputs = Vec::new();

    let enriched_path = cfg.enriched_path();
    tabular::write_enriched(&enriched_path, &matches)?;
    outputs.push(enriched_path);

    let summary_path = cfg.summary_path();
    tabular::write_summary(&summary_path, &summary)?;
    outputs.push(summary_path);

    let workbook_path = cfg.workbook_path();
    let workbook = export_workbook(&workbook_path, &matches, &summary)?;
    outputs.push(workbook_path);

    let charts_dir = cfg.charts_dir();
    let title = season_title(cfg, &matches);
    let results = results_figure(format!("{title}: results"), &summary.overall);
    let results_path = charts_dir.join(RESULTS_CHART);
    results.save(&results_path)?;
    outputs.push(results_path);

    let home_away = home_away_figure(format!("{title}: home vs away"), &summary);
    let home_away_path = charts_dir.join(HOME_AWAY_CHART);
    home_away.save(&home_away_path)?;
    outputs.push(home_away_path);

    for path in &outputs {
        info!(path = %path.display(), "written");
    }

    Ok(AnalysisReport {
        matches,
        summary,
        workbook,
        outputs,
    })
}

/// collect, transform and analyze in order, stopping at the first failure.
pub fn run_all(cfg: &Config) -> Result<RunReport> {
    let collected = collect(cfg)?;
    let transformed = transform(cfg)?;
    let analysis = analyze(cfg)?;
    Ok(RunReport {
        collected,
        transformed,
        analysis,
    })
}

pub fn season_title(cfg: &Config, matches: &[EnrichedMatch]) -> String {
    match matches.first() {
        Some(m) => format!("{} | {} {}", cfg.team_name, m.base.competition, cfg.season),
        None => format!("{} | {}", cfg.team_name, cfg.season),
    }
}

/// Operator-facing report printed by `analyze`.
pub fn summary_text(title: &str, summary: &SeasonSummary) -> String {
    let mut lines = vec![
        format!("--- {title} ---"),
        String::new(),
        format!("Matches: {}", summary.total),
        format!("Wins: {}", summary.wins()),
        format!("Draws: {}", summary.draws()),
        format!("Losses: {}", summary.losses()),
        format!("Performance: {:.2}%", summary.performance_pct),
        format!(
            "Goals: {} for, {} against",
            summary.goals_for, summary.goals_against
        ),
    ];
    for venue in Venue::ALL {
        lines.push(String::new());
        lines.push(format!("--- {} ---", venue.label()));
        let counts = summary.by_venue(venue);
        for (label, count) in counts.labeled() {
            lines.push(format!("{label}: {count}"));
        }
        if let Some(pct) = counts.performance_pct() {
            lines.push(format!("Performance: {pct:.2}%"));
        }
    }
    lines.join("\n")
}
