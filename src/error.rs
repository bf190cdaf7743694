use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("fixtures request failed: http {status}: {body}")]
    Fetch { status: u16, body: String },

    #[error("the API returned no fixtures for the requested team/league/season")]
    EmptyResponse,

    #[error("API_FOOTBALL_KEY is not set; export it or add it to .env")]
    MissingApiKey,

    #[error("missing or empty field `{field}` in record {record}")]
    Schema { field: String, record: String },

    #[error("unparseable date {raw:?} in record {record}")]
    DateParse { raw: String, record: String },

    #[error("match {match_id} has no final score yet")]
    IncompleteMatch { match_id: i64 },

    #[error("match {match_id} does not involve {team:?}")]
    UnknownTeam { match_id: i64, team: String },

    #[error("no matches to summarize")]
    EmptyInput,

    #[error("input file not found: {}. Run `{hint}` first.", path.display())]
    MissingInput { path: PathBuf, hint: &'static str },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("workbook error: {0}")]
    Workbook(#[from] rust_xlsxwriter::XlsxError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
