use std::fs;
use std::path::Path;

use rust_xlsxwriter::{Format, Workbook, Worksheet};

use crate::classify::EnrichedMatch;
use crate::error::Result;
use crate::schema::target_columns;
use crate::summary::SeasonSummary;
use crate::tabular::summary_rows;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkbookReport {
    pub matches: usize,
    pub summary_rows: usize,
}

/// Writes a `Matches` sheet (normalized columns + outcome + venue) and a
/// `Summary` sheet. Goal columns are numeric cells; nulls stay blank.
pub fn export_workbook(
    path: &Path,
    matches: &[EnrichedMatch],
    summary: &SeasonSummary,
) -> Result<WorkbookReport> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    let header = Format::new().set_bold();
    let mut workbook = Workbook::new();

    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Matches")?;
        let mut columns = target_columns().to_vec();
        columns.extend(["outcome", "venue"]);
        write_header(sheet, &columns, &header)?;
        for (idx, m) in matches.iter().enumerate() {
            let row = idx as u32 + 1;
            write_match_row(sheet, row, m)?;
        }
    }

    let rows = summary_rows(summary);
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Summary")?;
        write_header(sheet, &["metric", "value"], &header)?;
        for (idx, (metric, value)) in rows.iter().enumerate() {
            let row = idx as u32 + 1;
            sheet.write_string(row, 0, metric)?;
            match value.parse::<f64>() {
                Ok(num) => sheet.write_number(row, 1, num)?,
                Err(_) => sheet.write_string(row, 1, value)?,
            };
        }
    }

    workbook.save(path)?;
    Ok(WorkbookReport {
        matches: matches.len(),
        summary_rows: rows.len(),
    })
}

fn write_header(sheet: &mut Worksheet, columns: &[&str], format: &Format) -> Result<()> {
    for (col, name) in columns.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *name, format)?;
    }
    Ok(())
}

fn write_match_row(sheet: &mut Worksheet, row: u32, m: &EnrichedMatch) -> Result<()> {
    let b = &m.base;
    sheet.write_number(row, 0, b.match_id as f64)?;
    sheet.write_string(row, 1, &b.match_date)?;
    sheet.write_string(row, 2, &b.competition)?;
    sheet.write_string(row, 3, &b.round)?;
    sheet.write_string(row, 4, &b.home_team)?;
    sheet.write_string(row, 5, &b.away_team)?;
    let goals = [b.home_goals, b.away_goals, b.fulltime_home, b.fulltime_away];
    for (offset, value) in goals.into_iter().enumerate() {
        if let Some(v) = value {
            sheet.write_number(row, 6 + offset as u16, v as f64)?;
        }
    }
    sheet.write_string(row, 10, m.outcome.label())?;
    sheet.write_string(row, 11, m.venue.label())?;
    Ok(())
}
