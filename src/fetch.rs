use reqwest::StatusCode;
use reqwest::blocking::Client;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{PipelineError, Result};
use crate::http_client::http_client;
use crate::raw::{RawFixture, parse_fixtures_response};

const API_KEY_HEADER: &str = "x-apisports-key";

/// Query parameters for the `/fixtures` endpoint.
pub fn fixture_query(cfg: &Config) -> [(&'static str, String); 3] {
    [
        ("team", cfg.team_id.to_string()),
        ("league", cfg.league_id.to_string()),
        ("season", cfg.season.to_string()),
    ]
}

pub fn fetch_fixtures(cfg: &Config) -> Result<Vec<RawFixture>> {
    let client = http_client(cfg.request_timeout_secs)?;
    fetch_fixtures_with(client, cfg)
}

/// Single GET, no retries. Any status other than 200 fails with the body.
pub fn fetch_fixtures_with(client: &Client, cfg: &Config) -> Result<Vec<RawFixture>> {
    let api_key = cfg.require_api_key()?;
    let url = cfg.fixtures_url();
    info!(
        team = cfg.team_id,
        league = cfg.league_id,
        season = cfg.season,
        "requesting fixtures"
    );

    let resp = client
        .get(&url)
        .header(API_KEY_HEADER, api_key.expose())
        .query(&fixture_query(cfg))
        .send()?;
    let status = resp.status();
    let body = resp.text()?;
    if status != StatusCode::OK {
        return Err(PipelineError::Fetch {
            status: status.as_u16(),
            body,
        });
    }
    debug!(bytes = body.len(), "fixtures response received");

    let fixtures = parse_fixtures_response(&body)?;
    info!(count = fixtures.len(), "fixtures received");
    Ok(fixtures)
}
