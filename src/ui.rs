use std::io;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use season_terminal::charts::{home_away_figure, outcome_color, results_figure};
use season_terminal::config::Config;
use season_terminal::dashboard::{self, DashboardState};
use season_terminal::filter::{outcome_filter_label, venue_filter_label};
use season_terminal::store::MatchStore;
use season_terminal::tabular::{FILTERED_HEADERS, filtered_row};

const CONSOLE_LINES: usize = 5;

struct App {
    cfg: Config,
    store: MatchStore,
    state: DashboardState,
    should_quit: bool,
}

impl App {
    fn new(cfg: Config) -> Self {
        let title = format!("{} | {}", cfg.team_name, cfg.season);
        let store = MatchStore::new(cfg.load_policy);
        let mut app = Self {
            cfg,
            store,
            state: DashboardState::new(title),
            should_quit: false,
        };
        app.reload();
        app
    }

    fn reload(&mut self) {
        dashboard::force_refresh(&mut self.state, &self.cfg, &mut self.store);
        if let Some(m) = self.state.matches.first() {
            self.state.title = format!(
                "{} | {} {}",
                self.cfg.team_name, m.base.competition, self.cfg.season
            );
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('v') | KeyCode::Char('V') => self.state.cycle_venue(),
            KeyCode::Char('o') | KeyCode::Char('O') => self.state.cycle_outcome(),
            KeyCode::Char('a') | KeyCode::Esc => self.state.reset_filters(),
            KeyCode::Char('j') | KeyCode::Down => self.state.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.state.select_prev(),
            KeyCode::Char('r') | KeyCode::Char('R') => self.reload(),
            KeyCode::Char('e') | KeyCode::Char('E') => self.export(),
            KeyCode::Char('?') => self.state.help_overlay = !self.state.help_overlay,
            _ => {}
        }
    }

    fn export(&mut self) {
        let now = chrono::Local::now().naive_local();
        let dir = self.cfg.exports_dir();
        if let Err(err) = self.state.export_filtered(&dir, now) {
            tracing::warn!(error = %err, "filtered export failed");
            self.state.push_log(format!("[WARN] Export failed: {err}"));
        }
    }
}

pub fn run(cfg: Config) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let mut app = App::new(cfg);
    let res = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    res.map_err(Into::into)
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            app.on_key(key);
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let state = &app.state;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(CONSOLE_LINES as u16 + 2),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_text(state))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    if let Some(err) = &state.load_error {
        let msg = Paragraph::new(format!("Could not load match data.\n\n{err}"))
            .style(Style::default().fg(Color::Red))
            .block(Block::default().title("Data").borders(Borders::ALL));
        frame.render_widget(msg, chunks[1]);
    } else {
        render_body(frame, chunks[1], state);
    }

    let console = Paragraph::new(console_text(state, CONSOLE_LINES))
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, chunks[2]);

    let footer = Paragraph::new(
        "v Venue | o Outcome | a/Esc Clear | j/k/↑/↓ Move | e Export | r Reload | ? Help | q Quit",
    );
    frame.render_widget(footer, chunks[3]);

    if state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_text(state: &DashboardState) -> String {
    let line1 = format!("  .-.  {}", state.title);
    let line2 = format!(
        " (   ) Venue: {} | Outcome: {}",
        venue_filter_label(state.filter.venue),
        outcome_filter_label(state.filter.outcome)
    );
    let line3 = "  '-'".to_string();
    format!("{line1}\n{line2}\n{line3}")
}

fn render_body(frame: &mut Frame, area: Rect, state: &DashboardState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(14),
            Constraint::Min(3),
        ])
        .split(area);

    render_metrics(frame, rows[0], state);

    if state.filtered.is_empty() {
        let warn = Paragraph::new("No matches found for the selected filters.")
            .style(Style::default().fg(Color::Yellow))
            .block(Block::default().title("Charts").borders(Borders::ALL));
        frame.render_widget(warn, rows[1]);
        let warn = Paragraph::new("No matches found for the selected filters.")
            .style(Style::default().fg(Color::Yellow))
            .block(Block::default().title("Matches").borders(Borders::ALL));
        frame.render_widget(warn, rows[2]);
        return;
    }

    render_charts(frame, rows[1], state);
    render_table(frame, rows[2], state);
}

fn render_metrics(frame: &mut Frame, area: Rect, state: &DashboardState) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 5); 5])
        .split(area);

    let (total, wins, draws, losses, pct) = match &state.summary {
        Some(s) => (
            s.total.to_string(),
            s.wins().to_string(),
            s.draws().to_string(),
            s.losses().to_string(),
            format!("{:.1}%", s.performance_pct),
        ),
        None => (
            "0".to_string(),
            "0".to_string(),
            "0".to_string(),
            "0".to_string(),
            "-".to_string(),
        ),
    };

    let cells = [
        ("Matches", total, Style::default()),
        ("Wins", wins, Style::default().fg(Color::Green)),
        ("Draws", draws, Style::default().fg(Color::Yellow)),
        ("Losses", losses, Style::default().fg(Color::Red)),
        (
            "Performance",
            pct,
            Style::default().add_modifier(Modifier::BOLD),
        ),
    ];
    for (idx, (title, value, style)) in cells.into_iter().enumerate() {
        let metric = Paragraph::new(value)
            .style(style)
            .block(Block::default().title(title).borders(Borders::ALL));
        frame.render_widget(metric, cols[idx]);
    }
}

fn render_charts(frame: &mut Frame, area: Rect, state: &DashboardState) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(area);

    let Some(summary) = &state.summary else {
        return;
    };

    let results = results_figure("Results", &summary.overall);
    frame.render_widget(results.widget(), cols[0]);

    if state.home_away_available() {
        let home_away = home_away_figure("Home vs Away", summary);
        frame.render_widget(home_away.widget(), cols[1]);
    } else {
        let info = Paragraph::new("Home vs away is shown only when the venue filter is All.")
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().title("Home vs Away").borders(Borders::ALL));
        frame.render_widget(info, cols[1]);
    }
}

fn table_columns() -> [Constraint; 7] {
    [
        Constraint::Length(20),
        Constraint::Min(14),
        Constraint::Length(6),
        Constraint::Length(6),
        Constraint::Min(14),
        Constraint::Length(8),
        Constraint::Length(6),
    ]
}

fn render_table(frame: &mut Frame, area: Rect, state: &DashboardState) {
    let block = Block::default()
        .title(format!("Matches ({})", state.filtered.len()))
        .borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.height < 2 || inner.width == 0 {
        return;
    }

    let widths = table_columns();
    let header_area = Rect { height: 1, ..inner };
    let header_style = Style::default().add_modifier(Modifier::BOLD);
    render_row(frame, header_area, &widths, &FILTERED_HEADERS.map(String::from), |_| {
        header_style
    });

    let list_area = Rect {
        y: inner.y + 1,
        height: inner.height - 1,
        ..inner
    };
    let rows = state.filtered_matches();
    let visible = list_area.height as usize;
    let (start, end) = visible_range(state.selected, rows.len(), visible);

    for (i, idx) in (start..end).enumerate() {
        let row_area = Rect {
            y: list_area.y + i as u16,
            height: 1,
            ..list_area
        };
        let m = rows[idx];
        let selected = idx == state.selected;
        let base = if selected {
            Style::default().fg(Color::White).bg(Color::DarkGray)
        } else {
            Style::default()
        };
        if selected {
            frame.render_widget(Block::default().style(base), row_area);
        }
        let cells = filtered_row(m);
        let outcome_style = base.fg(outcome_color(m.outcome));
        render_row(frame, row_area, &widths, &cells, |col| {
            if col == 5 { outcome_style } else { base }
        });
    }
}

fn render_row(
    frame: &mut Frame,
    area: Rect,
    widths: &[Constraint],
    cells: &[String],
    style_for: impl Fn(usize) -> Style,
) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(widths)
        .split(area);
    for (col, text) in cells.iter().enumerate() {
        let Some(cell_area) = cols.get(col) else {
            break;
        };
        frame.render_widget(
            Paragraph::new(text.as_str()).style(style_for(col)),
            *cell_area,
        );
    }
}

fn visible_range(selected: usize, total: usize, visible: usize) -> (usize, usize) {
    if total == 0 {
        return (0, 0);
    }
    if total <= visible {
        return (0, total);
    }

    let mut start = selected.saturating_sub(visible / 2);
    if start + visible > total {
        start = total - visible;
    }
    (start, start + visible)
}

/// The newest `lines` log entries, oldest first.
fn console_text(state: &DashboardState, lines: usize) -> String {
    if state.logs.is_empty() {
        return "No messages yet".to_string();
    }
    let start = state.logs.len().saturating_sub(lines);
    state.logs[start..].join("\n")
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "Season Terminal - Help",
        "",
        "Filters:",
        "  v            Cycle venue (All/Home/Away)",
        "  o            Cycle outcome (All/Win/Draw/Loss)",
        "  a / Esc      Clear filters",
        "",
        "Table:",
        "  j/k or ↑/↓   Move selection",
        "  e            Export filtered rows to CSV",
        "",
        "  r            Reload match data",
        "  ?            Toggle help",
        "  q            Quit",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn console_keeps_the_newest_entries_in_order() {
        let mut state = DashboardState::new("x");
        assert_eq!(console_text(&state, CONSOLE_LINES), "No messages yet");
        for i in 0..8 {
            state.push_log(format!("line {i}"));
        }
        let text = console_text(&state, CONSOLE_LINES);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), CONSOLE_LINES);
        assert_eq!(lines.first(), Some(&"line 3"));
        assert_eq!(lines.last(), Some(&"line 7"));
    }

    #[test]
    fn visible_range_follows_the_selection() {
        assert_eq!(visible_range(0, 0, 10), (0, 0));
        assert_eq!(visible_range(3, 4, 10), (0, 4));
        assert_eq!(visible_range(19, 20, 5), (15, 20));
        assert_eq!(visible_range(10, 20, 5), (8, 13));
    }
}
