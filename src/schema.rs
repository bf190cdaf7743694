use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};
use crate::raw::{RawFixture, RawValue};

pub const CANONICAL_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Source path to target column, in output column order.
pub const FIELD_MAPPING: [(&str, &str); 10] = [
    ("fixture.id", "match_id"),
    ("fixture.date", "match_date"),
    ("league.name", "competition"),
    ("league.round", "round"),
    ("teams.home.name", "home_team"),
    ("teams.away.name", "away_team"),
    ("goals.home", "home_goals"),
    ("goals.away", "away_goals"),
    ("score.fulltime.home", "fulltime_home"),
    ("score.fulltime.away", "fulltime_away"),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedMatch {
    pub match_id: i64,
    pub match_date: String,
    pub competition: String,
    pub round: String,
    pub home_team: String,
    pub away_team: String,
    pub home_goals: Option<i64>,
    pub away_goals: Option<i64>,
    pub fulltime_home: Option<i64>,
    pub fulltime_away: Option<i64>,
}

pub fn target_columns() -> [&'static str; 10] {
    FIELD_MAPPING.map(|(_, target)| target)
}

/// Maps every fixture or fails on the first bad one.
pub fn map_fixtures(fixtures: &[RawFixture]) -> Result<Vec<NormalizedMatch>> {
    fixtures
        .iter()
        .enumerate()
        .map(|(idx, f)| map_fixture(f, idx))
        .collect()
}

/// A missing source path is always an error; a present-but-null value is an
/// error only for the non-nullable columns.
pub fn map_fixture(fixture: &RawFixture, index: usize) -> Result<NormalizedMatch> {
    let record = fixture.label(index);
    let mut values = Vec::with_capacity(FIELD_MAPPING.len());
    for (source, _) in FIELD_MAPPING {
        let value = fixture.get(source).ok_or_else(|| PipelineError::Schema {
            field: source.to_string(),
            record: record.clone(),
        })?;
        values.push(value);
    }

    let required_text = |pos: usize| -> Result<String> {
        values[pos].as_text().ok_or_else(|| PipelineError::Schema {
            field: FIELD_MAPPING[pos].0.to_string(),
            record: record.clone(),
        })
    };
    let nullable_int = |pos: usize| -> Result<Option<i64>> {
        let value = values[pos];
        if value.is_null() {
            return Ok(None);
        }
        value.as_int().map(Some).ok_or_else(|| PipelineError::Schema {
            field: FIELD_MAPPING[pos].0.to_string(),
            record: record.clone(),
        })
    };

    let match_id = values[0].as_int().ok_or_else(|| PipelineError::Schema {
        field: FIELD_MAPPING[0].0.to_string(),
        record: record.clone(),
    })?;
    let raw_date = required_text(1)?;
    let match_date = canonical_date(&raw_date).ok_or_else(|| PipelineError::DateParse {
        raw: raw_date.clone(),
        record: record.clone(),
    })?;

    Ok(NormalizedMatch {
        match_id,
        match_date,
        competition: required_text(2)?,
        round: required_text(3)?,
        home_team: required_text(4)?,
        away_team: required_text(5)?,
        home_goals: nullable_int(6)?,
        away_goals: nullable_int(7)?,
        fulltime_home: nullable_int(8)?,
        fulltime_away: nullable_int(9)?,
    })
}

/// Renders a provider timestamp as `YYYY-MM-DD HH:MM:SS`. Offset-bearing
/// timestamps keep their own wall-clock time.
pub fn canonical_date(raw: &str) -> Option<String> {
    let cleaned = raw.trim();
    if cleaned.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(cleaned) {
        return Some(dt.naive_local().format(CANONICAL_DATE_FORMAT).to_string());
    }

    const OFFSET_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%d %H:%M:%S%.f%:z"];
    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(cleaned, fmt) {
            return Some(dt.naive_local().format(CANONICAL_DATE_FORMAT).to_string());
        }
    }

    const NAIVE_FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ];
    for fmt in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(cleaned, fmt) {
            return Some(dt.format(CANONICAL_DATE_FORMAT).to_string());
        }
    }

    NaiveDate::parse_from_str(cleaned, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.format(CANONICAL_DATE_FORMAT).to_string())
}

impl NormalizedMatch {
    /// Cells in mapping order; nulls are empty strings.
    pub fn to_record(&self) -> Vec<String> {
        vec![
            self.match_id.to_string(),
            self.match_date.clone(),
            self.competition.clone(),
            self.round.clone(),
            self.home_team.clone(),
            self.away_team.clone(),
            opt_to_string(self.home_goals),
            opt_to_string(self.away_goals),
            opt_to_string(self.fulltime_home),
            opt_to_string(self.fulltime_away),
        ]
    }

    /// Rebuilds a match from table cells in mapping order.
    pub fn from_record(cells: &[&str], index: usize) -> Result<Self> {
        let record = format!("row {}", index + 1);
        let schema_err = |pos: usize| PipelineError::Schema {
            field: FIELD_MAPPING[pos].1.to_string(),
            record: record.clone(),
        };
        if cells.len() < FIELD_MAPPING.len() {
            return Err(schema_err(cells.len()));
        }
        let text = |pos: usize| -> Result<String> {
            let cell = cells[pos];
            if cell.is_empty() {
                Err(schema_err(pos))
            } else {
                Ok(cell.to_string())
            }
        };
        let nullable_int = |pos: usize| -> Result<Option<i64>> {
            let value = RawValue::from_cell(cells[pos]);
            if value.is_null() {
                return Ok(None);
            }
            value.as_int().map(Some).ok_or_else(|| schema_err(pos))
        };

        let match_id = RawValue::from_cell(cells[0])
            .as_int()
            .ok_or_else(|| schema_err(0))?;

        Ok(Self {
            match_id,
            match_date: text(1)?,
            competition: text(2)?,
            round: text(3)?,
            home_team: text(4)?,
            away_team: text(5)?,
            home_goals: nullable_int(6)?,
            away_goals: nullable_int(7)?,
            fulltime_home: nullable_int(8)?,
            fulltime_away: nullable_int(9)?,
        })
    }
}

fn opt_to_string<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> RawFixture {
        RawFixture::new()
            .with("fixture.id", RawValue::Int(971_234))
            .with("fixture.referee", RawValue::Text("Ref".to_string()))
            .with(
                "fixture.date",
                RawValue::Text("2023-04-16T21:00:00-03:00".to_string()),
            )
            .with("league.name", RawValue::Text("Serie A".to_string()))
            .with(
                "league.round",
                RawValue::Text("Regular Season - 1".to_string()),
            )
            .with("teams.home.name", RawValue::Text("Sao Paulo".to_string()))
            .with("teams.away.name", RawValue::Text("Botafogo".to_string()))
            .with("goals.home", RawValue::Int(1))
            .with("goals.away", RawValue::Float(2.0))
            .with("score.fulltime.home", RawValue::Int(1))
            .with("score.fulltime.away", RawValue::Null)
    }

    #[test]
    fn maps_fields_in_table_order() {
        let m = map_fixture(&fixture(), 0).unwrap();
        assert_eq!(m.match_id, 971_234);
        assert_eq!(m.match_date, "2023-04-16 21:00:00");
        assert_eq!(m.competition, "Serie A");
        assert_eq!(m.round, "Regular Season - 1");
        assert_eq!(m.home_team, "Sao Paulo");
        assert_eq!(m.away_team, "Botafogo");
        assert_eq!(m.home_goals, Some(1));
        assert_eq!(m.away_goals, Some(2));
        assert_eq!(m.fulltime_home, Some(1));
        assert_eq!(m.fulltime_away, None);
        assert_eq!(m.to_record().len(), target_columns().len());
    }

    #[test]
    fn missing_column_names_the_field() {
        let mut f = RawFixture::new();
        for path in fixture().paths().filter(|p| *p != "league.round") {
            f.insert(path, fixture().get(path).cloned().unwrap());
        }
        match map_fixture(&f, 3) {
            Err(PipelineError::Schema { field, record }) => {
                assert_eq!(field, "league.round");
                assert!(record.contains("971234"));
            }
            other => panic!("expected schema error, got {other:?}"),
        }
    }

    #[test]
    fn bad_date_names_the_raw_value() {
        let f = fixture().with("fixture.date", RawValue::Text("16/04/2023".to_string()));
        match map_fixture(&f, 0) {
            Err(PipelineError::DateParse { raw, .. }) => assert_eq!(raw, "16/04/2023"),
            other => panic!("expected date error, got {other:?}"),
        }
    }

    #[test]
    fn canonical_date_variants() {
        assert_eq!(
            canonical_date("2023-04-16T00:00:00+00:00").as_deref(),
            Some("2023-04-16 00:00:00")
        );
        assert_eq!(
            canonical_date("2023-04-16T21:30:00.000Z").as_deref(),
            Some("2023-04-16 21:30:00")
        );
        assert_eq!(
            canonical_date("2023-04-16 21:30").as_deref(),
            Some("2023-04-16 21:30:00")
        );
        assert_eq!(
            canonical_date("2023-04-16").as_deref(),
            Some("2023-04-16 00:00:00")
        );
        assert_eq!(canonical_date("soon"), None);
    }

    #[test]
    fn record_round_trip_preserves_values() {
        let m = map_fixture(&fixture(), 0).unwrap();
        let cells = m.to_record();
        let refs: Vec<&str> = cells.iter().map(String::as_str).collect();
        assert_eq!(NormalizedMatch::from_record(&refs, 0).unwrap(), m);
    }
}
