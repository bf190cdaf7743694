//! Dashboard state: the enriched season, the active filters and the summary
//! of whatever the filters currently select. Rendering lives in the binary.

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;

use crate::classify::{EnrichedMatch, Outcome, Venue, enrich};
use crate::config::Config;
use crate::error::Result;
use crate::filter::{Choice, MatchFilter, outcome_options, venue_options};
use crate::store::MatchStore;
use crate::summary::{SeasonSummary, summarize};
use crate::tabular;

const MAX_LOGS: usize = 50;

#[derive(Debug, Clone)]
pub struct DashboardState {
    pub title: String,
    pub matches: Vec<EnrichedMatch>,
    pub filter: MatchFilter,
    pub venue_options: Vec<Venue>,
    pub outcome_options: Vec<Outcome>,
    /// Indices into `matches` passing `filter`.
    pub filtered: Vec<usize>,
    /// Summary of the filtered rows; `None` when the filters select nothing.
    pub summary: Option<SeasonSummary>,
    pub selected: usize,
    pub load_error: Option<String>,
    pub help_overlay: bool,
    pub logs: Vec<String>,
}

impl DashboardState {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            matches: Vec::new(),
            filter: MatchFilter::default(),
            venue_options: Vec::new(),
            outcome_options: Vec::new(),
            filtered: Vec::new(),
            summary: None,
            selected: 0,
            load_error: None,
            help_overlay: false,
            logs: Vec::new(),
        }
    }

    /// Swaps in a freshly loaded season. Filters survive when their value is
    /// still present in the new data.
    pub fn set_matches(&mut self, matches: Vec<EnrichedMatch>) {
        self.venue_options = venue_options(&matches);
        self.outcome_options = outcome_options(&matches);
        self.matches = matches;
        self.load_error = None;
        if let Choice::Only(v) = self.filter.venue
            && !self.venue_options.contains(&v)
        {
            self.filter.venue = Choice::All;
        }
        if let Choice::Only(o) = self.filter.outcome
            && !self.outcome_options.contains(&o)
        {
            self.filter.outcome = Choice::All;
        }
        self.recompute();
    }

    pub fn set_load_error(&mut self, message: impl Into<String>) {
        let message = message.into();
        self.push_log(format!("[ERROR] {message}"));
        self.load_error = Some(message);
        self.matches.clear();
        self.venue_options.clear();
        self.outcome_options.clear();
        self.recompute();
    }

    /// Re-applies the filters and re-summarizes the selection.
    pub fn recompute(&mut self) {
        self.filtered = self
            .matches
            .iter()
            .enumerate()
            .filter(|(_, m)| self.filter.matches(m))
            .map(|(idx, _)| idx)
            .collect();
        let rows = self.filtered.iter().filter_map(|idx| self.matches.get(*idx));
        self.summary = summarize(rows).ok();
        if self.selected >= self.filtered.len() {
            self.selected = self.filtered.len().saturating_sub(1);
        }
    }

    pub fn filtered_matches(&self) -> Vec<&EnrichedMatch> {
        self.filtered
            .iter()
            .filter_map(|idx| self.matches.get(*idx))
            .collect()
    }

    pub fn cycle_venue(&mut self) {
        self.filter.venue = self.filter.venue.cycle(&self.venue_options);
        self.selected = 0;
        self.recompute();
    }

    pub fn cycle_outcome(&mut self) {
        self.filter.outcome = self.filter.outcome.cycle(&self.outcome_options);
        self.selected = 0;
        self.recompute();
    }

    pub fn reset_filters(&mut self) {
        self.filter = MatchFilter::default();
        self.selected = 0;
        self.recompute();
    }

    /// The home-vs-away breakdown only makes sense across both venues.
    pub fn home_away_available(&self) -> bool {
        self.filter.venue.is_all() && !self.filtered.is_empty()
    }

    pub fn select_next(&mut self) {
        let total = self.filtered.len();
        if total == 0 {
            self.selected = 0;
            return;
        }
        self.selected = (self.selected + 1).min(total - 1);
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn selected_match(&self) -> Option<&EnrichedMatch> {
        self.filtered
            .get(self.selected)
            .and_then(|idx| self.matches.get(*idx))
    }

    pub fn push_log(&mut self, message: impl Into<String>) {
        self.logs.push(message.into());
        if self.logs.len() > MAX_LOGS {
            let overflow = self.logs.len() - MAX_LOGS;
            self.logs.drain(0..overflow);
        }
    }

    /// Writes the filtered detail table to `dir/filtered_<timestamp>.csv`.
    /// Returns `None` when nothing is selected.
    pub fn export_filtered(&mut self, dir: &Path, now: NaiveDateTime) -> Result<Option<PathBuf>> {
        if self.filtered.is_empty() {
            self.push_log("[WARN] Nothing to export for these filters");
            return Ok(None);
        }
        let path = dir.join(export_file_name(now));
        let rows = self.filtered_matches();
        tabular::write_filtered(&path, &rows)?;
        let message = format!("[INFO] Exported {} rows to {}", rows.len(), path.display());
        self.push_log(message);
        Ok(Some(path))
    }
}

pub fn export_file_name(now: NaiveDateTime) -> String {
    format!("filtered_{}.csv", now.format("%Y%m%d_%H%M%S"))
}

/// Loads the normalized table through `store` and classifies it.
pub fn load_season(cfg: &Config, store: &mut MatchStore) -> Result<Vec<EnrichedMatch>> {
    let normalized = store.load(&cfg.normalized_path())?;
    enrich(normalized, &cfg.team_name)
}

/// Drops whatever `store` holds and reads the table again, regardless of policy.
pub fn force_refresh(state: &mut DashboardState, cfg: &Config, store: &mut MatchStore) {
    store.invalidate();
    refresh(state, cfg, store);
}

/// Loads into `state`, turning failures into an on-screen error.
pub fn refresh(state: &mut DashboardState, cfg: &Config, store: &mut MatchStore) {
    match load_season(cfg, store) {
        Ok(matches) => {
            let count = matches.len();
            state.set_matches(matches);
            state.push_log(format!("[INFO] Loaded {count} matches"));
        }
        Err(err) => {
            tracing::warn!(error = %err, "dashboard load failed");
            state.set_load_error(err.to_string());
        }
    }
}
