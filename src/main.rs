use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use season_terminal::config::Config;
use season_terminal::logging;
use season_terminal::pipeline::{
    self, AnalysisReport, CollectReport, TransformReport, season_title, summary_text,
};

mod ui;

#[derive(Parser)]
#[command(name = "season_terminal")]
#[command(about = "Fetch, tabulate and explore one club's league season")]
struct Cli {
    #[command(flatten)]
    overrides: Overrides,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Overrides {
    /// Team of interest, spelled exactly as the provider does
    #[arg(long, global = true)]
    team: Option<String>,
    /// Provider team id
    #[arg(long, global = true)]
    team_id: Option<u32>,
    /// Provider league id
    #[arg(long, global = true)]
    league: Option<u32>,
    #[arg(long, global = true)]
    season: Option<u16>,
    /// Root directory for raw, processed and result files
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch fixtures and write the raw snapshot
    Collect,
    /// Map the raw snapshot to the normalized match table
    Transform,
    /// Classify matches, summarize, and write exports and charts
    Analyze,
    /// Interactive filterable dashboard over the normalized table
    Dashboard,
    /// collect, transform and analyze, then open the dashboard
    Run {
        #[arg(long)]
        no_dashboard: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = apply_overrides(Config::from_env()?, cli.overrides);
    cfg.validate()?;

    let opens_dashboard = match &cli.command {
        Commands::Dashboard => true,
        Commands::Run { no_dashboard } => !no_dashboard,
        _ => false,
    };
    if opens_dashboard {
        logging::init_file(&cfg.dashboard_log_path())
            .context("failed to open dashboard log")?;
    } else {
        logging::init_stderr();
    }

    match cli.command {
        Commands::Collect => {
            println!("Fetching fixtures...");
            let report = pipeline::collect(&cfg).context("collect failed")?;
            print_collect(&report);
            Ok(())
        }
        Commands::Transform => {
            let report = pipeline::transform(&cfg).context("transform failed")?;
            print_transform(&report);
            Ok(())
        }
        Commands::Analyze => {
            let report = pipeline::analyze(&cfg).context("analyze failed")?;
            print_analysis(&cfg, &report);
            Ok(())
        }
        Commands::Dashboard => ui::run(cfg),
        Commands::Run { no_dashboard } => {
            println!("Fetching fixtures...");
            let report = pipeline::run_all(&cfg).context("pipeline run failed")?;
            print_collect(&report.collected);
            print_transform(&report.transformed);
            println!();
            print_analysis(&cfg, &report.analysis);
            println!();
            println!("Pipeline complete");
            if no_dashboard {
                return Ok(());
            }
            ui::run(cfg)
        }
    }
}

fn apply_overrides(mut cfg: Config, o: Overrides) -> Config {
    if let Some(team) = o.team {
        cfg.team_name = team;
    }
    if let Some(id) = o.team_id {
        cfg.team_id = id;
    }
    if let Some(id) = o.league {
        cfg.league_id = id;
    }
    if let Some(season) = o.season {
        cfg.season = season;
    }
    if let Some(dir) = o.data_dir {
        cfg.data_dir = dir;
    }
    cfg
}

fn print_collect(report: &CollectReport) {
    println!(
        "Saved {} fixtures to {}",
        report.fixtures,
        report.path.display()
    );
}

fn print_transform(report: &TransformReport) {
    println!(
        "Normalized {} matches into {}",
        report.matches.len(),
        report.path.display()
    );
    println!();
    println!("Sample:");
    for m in report.matches.iter().take(5) {
        let score = match (m.home_goals, m.away_goals) {
            (Some(h), Some(a)) => format!("{h}-{a}"),
            _ => "vs".to_string(),
        };
        println!(
            "  {} {} {} {} ({})",
            m.match_date, m.home_team, score, m.away_team, m.round
        );
    }
}

fn print_analysis(cfg: &Config, report: &AnalysisReport) {
    let title = season_title(cfg, &report.matches);
    println!("{}", summary_text(&title, &report.summary));
    println!();
    for path in &report.outputs {
        println!("Saved {}", path.display());
    }
    println!(
        "Workbook: {} matches, {} summary rows",
        report.workbook.matches, report.workbook.summary_rows
    );
}
