use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{PipelineError, Result};
use crate::store::LoadPolicy;

pub const DEFAULT_TEAM_NAME: &str = "Sao Paulo";
pub const DEFAULT_TEAM_ID: u32 = 126;
pub const DEFAULT_LEAGUE_ID: u32 = 71;
pub const DEFAULT_SEASON: u16 = 2023;
pub const DEFAULT_API_BASE_URL: &str = "https://v3.football.api-sports.io";
const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_DATA_DIR: &str = "data";

/// API credential. Never printed: both `Debug` and `Display` redact it.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

impl fmt::Display for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("***")
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Exact team name as the provider spells it; outcomes are relative to this team.
    pub team_name: String,
    pub team_id: u32,
    pub league_id: u32,
    pub season: u16,
    pub api_key: Option<ApiKey>,
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    pub data_dir: PathBuf,
    pub load_policy: LoadPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            team_name: DEFAULT_TEAM_NAME.to_string(),
            team_id: DEFAULT_TEAM_ID,
            league_id: DEFAULT_LEAGUE_ID,
            season: DEFAULT_SEASON,
            api_key: None,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            load_policy: LoadPolicy::ByModifiedTime,
        }
    }
}

impl Config {
    /// Reads `.env.local` then `.env`, then the process environment. Unset or
    /// unparseable numeric values fall back to defaults.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::from_filename(".env.local");
        let _ = dotenvy::from_filename(".env");

        let defaults = Self::default();
        let load_policy = match std::env::var("SEASON_LOAD_POLICY") {
            Ok(raw) if !raw.trim().is_empty() => raw.parse::<LoadPolicy>()?,
            _ => defaults.load_policy,
        };

        Ok(Self {
            team_name: env_string("SEASON_TEAM_NAME").unwrap_or(defaults.team_name),
            team_id: env_parse("SEASON_TEAM_ID").unwrap_or(defaults.team_id),
            league_id: env_parse("SEASON_LEAGUE_ID").unwrap_or(defaults.league_id),
            season: env_parse("SEASON_YEAR").unwrap_or(defaults.season),
            api_key: std::env::var("API_FOOTBALL_KEY").ok().and_then(ApiKey::new),
            api_base_url: env_string("API_FOOTBALL_BASE_URL").unwrap_or(defaults.api_base_url),
            request_timeout_secs: env_parse("API_TIMEOUT_SECS")
                .unwrap_or(defaults.request_timeout_secs)
                .max(1),
            data_dir: env_string("SEASON_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            load_policy,
        })
    }

    pub fn validate(&self) -> Result<()> {
        if self.team_name.trim().is_empty() {
            return Err(PipelineError::InvalidConfig(
                "team name must not be empty".to_string(),
            ));
        }
        if self.team_id == 0 || self.league_id == 0 {
            return Err(PipelineError::InvalidConfig(
                "team and league ids must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn require_api_key(&self) -> Result<&ApiKey> {
        self.api_key.as_ref().ok_or(PipelineError::MissingApiKey)
    }

    pub fn raw_path(&self) -> PathBuf {
        self.data_dir.join("raw").join("fixtures.csv")
    }

    pub fn normalized_path(&self) -> PathBuf {
        self.data_dir.join("processed").join("matches.csv")
    }

    pub fn enriched_path(&self) -> PathBuf {
        self.data_dir.join("results").join("analysis.csv")
    }

    pub fn summary_path(&self) -> PathBuf {
        self.data_dir.join("results").join("summary.csv")
    }

    pub fn workbook_path(&self) -> PathBuf {
        self.data_dir.join("results").join("analysis.xlsx")
    }

    pub fn charts_dir(&self) -> PathBuf {
        self.data_dir.join("visualizations")
    }

    pub fn exports_dir(&self) -> PathBuf {
        self.data_dir.join("exports")
    }

    pub fn dashboard_log_path(&self) -> PathBuf {
        self.data_dir.join("logs").join("dashboard.log")
    }

    pub fn fixtures_url(&self) -> String {
        format!("{}/fixtures", self.api_base_url.trim_end_matches('/'))
    }

    pub fn with_data_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.data_dir = dir.as_ref().to_path_buf();
        self
    }
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env_string(key).and_then(|v| v.parse::<T>().ok())
}
