//! Comma-separated tables on disk. Every file is UTF-8 with a byte-order mark
//! and a header row.

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use crate::classify::EnrichedMatch;
use crate::error::{PipelineError, Result};
use crate::raw::{RawFixture, RawValue, snapshot_columns};
use crate::schema::{NormalizedMatch, target_columns};
use crate::summary::SeasonSummary;

const BOM: &[u8] = b"\xEF\xBB\xBF";

pub const COLLECT_HINT: &str = "season_terminal collect";
pub const TRANSFORM_HINT: &str = "season_terminal transform";

pub const FILTERED_HEADERS: [&str; 7] = [
    "Date",
    "Home Team",
    "Home Goals",
    "Away Goals",
    "Away Team",
    "Outcome",
    "Venue",
];

pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }
}

pub fn bom_writer(path: &Path) -> Result<csv::Writer<File>> {
    if let Some(dir) = path.parent()
        && !dir.as_os_str().is_empty()
    {
        fs::create_dir_all(dir)?;
    }
    let mut file = File::create(path)?;
    file.write_all(BOM)?;
    Ok(csv::Writer::from_writer(file))
}

/// Reads a whole table. A missing file maps to `MissingInput` carrying `hint`.
pub fn read_table(path: &Path, hint: &'static str) -> Result<Table> {
    let raw = match fs::read(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Err(PipelineError::MissingInput {
                path: path.to_path_buf(),
                hint,
            });
        }
        Err(err) => return Err(err.into()),
    };
    parse_table(&raw)
}

pub fn parse_table(raw: &[u8]) -> Result<Table> {
    let body = raw.strip_prefix(BOM).unwrap_or(raw);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(body);
    let headers = reader
        .headers()?
        .iter()
        .map(|h| h.to_string())
        .collect::<Vec<_>>();
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(|c| c.to_string()).collect());
    }
    Ok(Table { headers, rows })
}

pub fn write_raw_snapshot(path: &Path, fixtures: &[RawFixture]) -> Result<()> {
    let columns = snapshot_columns(fixtures);
    let mut writer = bom_writer(path)?;
    writer.write_record(&columns)?;
    for fixture in fixtures {
        let row = columns
            .iter()
            .map(|c| fixture.get(c).map(RawValue::to_cell).unwrap_or_default());
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn read_raw_snapshot(path: &Path) -> Result<Vec<RawFixture>> {
    let table = read_table(path, COLLECT_HINT)?;
    Ok(table
        .rows
        .iter()
        .map(|row| {
            let mut fixture = RawFixture::new();
            for (header, cell) in table.headers.iter().zip(row.iter()) {
                fixture.insert(header.as_str(), RawValue::from_cell(cell));
            }
            fixture
        })
        .collect())
}

pub fn write_normalized(path: &Path, matches: &[NormalizedMatch]) -> Result<()> {
    let mut writer = bom_writer(path)?;
    writer.write_record(target_columns())?;
    for m in matches {
        writer.write_record(m.to_record())?;
    }
    writer.flush()?;
    Ok(())
}

pub fn read_normalized(path: &Path) -> Result<Vec<NormalizedMatch>> {
    let table = read_table(path, TRANSFORM_HINT)?;
    normalized_from_table(&table)
}

/// Columns are looked up by name so extra columns (e.g. in the enriched
/// export) are ignored.
pub fn normalized_from_table(table: &Table) -> Result<Vec<NormalizedMatch>> {
    let mut positions = Vec::new();
    for name in target_columns() {
        let pos = table.column(name).ok_or_else(|| PipelineError::Schema {
            field: name.to_string(),
            record: "header".to_string(),
        })?;
        positions.push(pos);
    }

    table
        .rows
        .iter()
        .enumerate()
        .map(|(idx, row)| {
            let cells = positions
                .iter()
                .map(|p| row.get(*p).map(String::as_str).unwrap_or(""))
                .collect::<Vec<_>>();
            NormalizedMatch::from_record(&cells, idx)
        })
        .collect()
}

pub fn write_enriched(path: &Path, matches: &[EnrichedMatch]) -> Result<()> {
    let mut writer = bom_writer(path)?;
    let mut header = target_columns().to_vec();
    header.push("outcome");
    header.push("venue");
    writer.write_record(&header)?;
    for m in matches {
        let mut row = m.base.to_record();
        row.push(m.outcome.label().to_string());
        row.push(m.venue.label().to_string());
        writer.write_record(&row)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_summary(path: &Path, summary: &SeasonSummary) -> Result<()> {
    let mut writer = bom_writer(path)?;
    writer.write_record(["metric", "value"])?;
    for (metric, value) in summary_rows(summary) {
        writer.write_record([metric, value])?;
    }
    writer.flush()?;
    Ok(())
}

pub fn summary_rows(summary: &SeasonSummary) -> Vec<(String, String)> {
    let mut rows = vec![
        ("matches".to_string(), summary.total.to_string()),
        ("wins".to_string(), summary.wins().to_string()),
        ("draws".to_string(), summary.draws().to_string()),
        ("losses".to_string(), summary.losses().to_string()),
        (
            "performance_pct".to_string(),
            format!("{:.2}", summary.performance_pct),
        ),
        ("goals_for".to_string(), summary.goals_for.to_string()),
        ("goals_against".to_string(), summary.goals_against.to_string()),
    ];
    for (prefix, counts) in [("home", &summary.home), ("away", &summary.away)] {
        for (label, count) in counts.labeled() {
            rows.push((
                format!("{prefix}_{}", label.to_ascii_lowercase()),
                count.to_string(),
            ));
        }
    }
    rows
}

pub fn filtered_row(m: &EnrichedMatch) -> Vec<String> {
    vec![
        m.base.match_date.clone(),
        m.base.home_team.clone(),
        m.base.home_goals.map(|g| g.to_string()).unwrap_or_default(),
        m.base.away_goals.map(|g| g.to_string()).unwrap_or_default(),
        m.base.away_team.clone(),
        m.outcome.label().to_string(),
        m.venue.label().to_string(),
    ]
}

/// Writes the dashboard's detail view as a table.
pub fn write_filtered(path: &Path, matches: &[&EnrichedMatch]) -> Result<()> {
    let mut writer = bom_writer(path)?;
    writer.write_record(FILTERED_HEADERS)?;
    for m in matches {
        writer.write_record(filtered_row(m))?;
    }
    writer.flush()?;
    Ok(())
}
