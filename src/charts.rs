//! Category-count bar charts. The same figure backs the dashboard widget and
//! the static text exports written by `analyze`.

use std::fs;
use std::path::Path;

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::Line;
use ratatui::widgets::{Bar, BarChart, BarGroup, Block, Borders, Widget};

use crate::classify::{Outcome, Venue};
use crate::error::Result;
use crate::summary::{OutcomeCounts, SeasonSummary};

const STATIC_WIDTH: u16 = 72;
const STATIC_HEIGHT: u16 = 20;

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryBar {
    pub label: String,
    pub count: u64,
    pub color: Color,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryGroup {
    pub label: Option<String>,
    pub bars: Vec<CategoryBar>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarFigure {
    pub title: String,
    pub groups: Vec<CategoryGroup>,
}

pub fn outcome_color(outcome: Outcome) -> Color {
    match outcome {
        Outcome::Win => Color::Green,
        Outcome::Draw => Color::Yellow,
        Outcome::Loss => Color::Red,
    }
}

fn outcome_bars(counts: &OutcomeCounts) -> Vec<CategoryBar> {
    Outcome::ALL
        .into_iter()
        .map(|o| CategoryBar {
            label: o.label().to_string(),
            count: counts.get(o) as u64,
            color: outcome_color(o),
        })
        .collect()
}

/// Win/Draw/Loss counts, one bar each.
pub fn results_figure(title: impl Into<String>, counts: &OutcomeCounts) -> BarFigure {
    BarFigure {
        title: title.into(),
        groups: vec![CategoryGroup {
            label: None,
            bars: outcome_bars(counts),
        }],
    }
}

/// Win/Draw/Loss counts grouped by venue.
pub fn home_away_figure(title: impl Into<String>, summary: &SeasonSummary) -> BarFigure {
    BarFigure {
        title: title.into(),
        groups: Venue::ALL
            .into_iter()
            .map(|v| CategoryGroup {
                label: Some(v.label().to_string()),
                bars: outcome_bars(summary.by_venue(v)),
            })
            .collect(),
    }
}

impl BarFigure {
    pub fn max_count(&self) -> u64 {
        self.groups
            .iter()
            .flat_map(|g| g.bars.iter().map(|b| b.count))
            .max()
            .unwrap_or(0)
    }

    pub fn widget(&self) -> BarChart<'static> {
        let mut chart = BarChart::default()
            .block(
                Block::default()
                    .title(self.title.clone())
                    .borders(Borders::ALL),
            )
            .bar_width(7)
            .bar_gap(1)
            .group_gap(3)
            .max(self.max_count().max(1));

        for group in &self.groups {
            let bars = group
                .bars
                .iter()
                .map(|b| {
                    Bar::default()
                        .value(b.count)
                        .label(Line::from(b.label.clone()))
                        .style(Style::default().fg(b.color))
                })
                .collect::<Vec<_>>();
            let mut data = BarGroup::default().bars(&bars);
            if let Some(label) = &group.label {
                data = data.label(Line::from(label.clone()));
            }
            chart = chart.data(data);
        }
        chart
    }

    /// Renders into an off-screen buffer and returns its rows, right-trimmed.
    pub fn render_lines(&self, width: u16, height: u16) -> Vec<String> {
        let area = Rect::new(0, 0, width, height);
        let mut buf = Buffer::empty(area);
        self.widget().render(area, &mut buf);

        let mut lines = Vec::with_capacity(height as usize);
        for y in area.top()..area.bottom() {
            let mut line = String::new();
            for x in area.left()..area.right() {
                line.push_str(buf.get(x, y).symbol());
            }
            lines.push(line.trim_end().to_string());
        }
        lines
    }

    /// The rendered chart followed by a plain `label: count` legend.
    pub fn to_text(&self) -> String {
        let mut out = self.render_lines(STATIC_WIDTH, STATIC_HEIGHT).join("\n");
        out.push('\n');
        for group in &self.groups {
            if let Some(label) = &group.label {
                out.push_str(label);
                out.push('\n');
            }
            for bar in &group.bars {
                out.push_str(&format!("  {}: {}\n", bar.label, bar.count));
            }
        }
        out
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        fs::write(path, self.to_text())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(w: usize, d: usize, l: usize) -> OutcomeCounts {
        OutcomeCounts {
            wins: w,
            draws: d,
            losses: l,
        }
    }

    #[test]
    fn results_figure_keeps_display_order() {
        let fig = results_figure("Results", &counts(5, 3, 2));
        let labels: Vec<_> = fig.groups[0].bars.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, ["Win", "Draw", "Loss"]);
        assert_eq!(fig.max_count(), 5);
    }

    #[test]
    fn rendered_text_has_title_and_legend() {
        let text = results_figure("Season results", &counts(4, 1, 0)).to_text();
        assert!(text.contains("Season results"));
        assert!(text.contains("  Win: 4"));
        assert!(text.contains("  Loss: 0"));
    }

    #[test]
    fn render_lines_matches_requested_height() {
        let lines = results_figure("R", &counts(1, 1, 1)).render_lines(40, 10);
        assert_eq!(lines.len(), 10);
        assert!(lines.iter().all(|l| l.chars().count() <= 40));
    }
}
