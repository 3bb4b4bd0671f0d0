use std::io;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Local, Utc};
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
use ratatui::widgets::{Bar, BarChart, BarGroup, Block, Borders, Clear, Paragraph};

use pl_dashboard::config::DashboardConfig;
use pl_dashboard::fixtures::{FixtureRecord, format_match_date, parse_kickoff};
use pl_dashboard::provider::spawn_provider;
use pl_dashboard::roster::TeamRecord;
use pl_dashboard::schedule::DailyRefresh;
use pl_dashboard::state::{
    AppState, Delta, ProviderCommand, TeamSortKey, View, apply_delta, position_filter_label,
};

const STRENGTH_SCALE: u64 = 1500;

struct App {
    state: AppState,
    cfg: DashboardConfig,
    should_quit: bool,
    cmd_tx: Option<mpsc::Sender<ProviderCommand>>,
    refresh: DailyRefresh,
    team_column: usize,
}

impl App {
    fn new(cfg: DashboardConfig, cmd_tx: Option<mpsc::Sender<ProviderCommand>>) -> Self {
        Self {
            state: AppState::new(),
            cfg,
            should_quit: false,
            cmd_tx,
            refresh: DailyRefresh::new(&Local::now()),
            team_column: 1,
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('1') => self.state.set_view(View::Fixtures),
            KeyCode::Char('2') => self.state.set_view(View::Teams),
            KeyCode::Char('3') => self.state.set_view(View::Players),
            KeyCode::Tab => self.state.cycle_view(),
            KeyCode::Char('j') | KeyCode::Down => self.state.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.state.select_prev(),
            KeyCode::Char('r') | KeyCode::Char('R') => self.request_all(true),
            KeyCode::Char('?') => self.state.help_overlay = !self.state.help_overlay,
            KeyCode::Left | KeyCode::Char('h') if self.state.view == View::Teams => {
                let total = TeamSortKey::ALL.len();
                self.team_column = (self.team_column + total - 1) % total;
            }
            KeyCode::Right | KeyCode::Char('l') if self.state.view == View::Teams => {
                self.team_column = (self.team_column + 1) % TeamSortKey::ALL.len();
            }
            KeyCode::Enter | KeyCode::Char('s') if self.state.view == View::Teams => {
                self.state.sort_teams_by(TeamSortKey::ALL[self.team_column]);
            }
            KeyCode::Char('s') if self.state.view == View::Players => {
                self.state.cycle_player_sort();
            }
            KeyCode::Char('f') if self.state.view == View::Players => {
                self.state.cycle_position_filter();
            }
            _ => {}
        }
    }

    fn request(&mut self, cmd: ProviderCommand, announce: bool) {
        let Some(tx) = &self.cmd_tx else {
            if announce {
                self.state.push_log("[INFO] Fetch unavailable");
            }
            return;
        };
        if tx.send(cmd).is_err() {
            self.state.push_log("[WARN] Provider stopped; request dropped");
            return;
        }
        self.state.begin_fetch(&cmd);
        if announce {
            self.state.push_log(format!("[INFO] {cmd:?} requested"));
        }
    }

    fn request_all(&mut self, announce: bool) {
        self.request(ProviderCommand::FetchRoster, announce);
        self.request(ProviderCommand::FetchFixtures, announce);
    }

    fn maybe_daily_refresh(&mut self) {
        if self.refresh.poll(Utc::now()) {
            self.state.push_log("[INFO] Daily refresh");
            self.request_all(false);
        }
    }
}

fn main() -> io::Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    let cfg = DashboardConfig::from_env();

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    spawn_provider(cfg.clone(), tx, cmd_rx);

    let mut app = App::new(cfg, Some(cmd_tx));
    if app.cfg.odds_api_key.is_none() {
        app.state
            .push_log("[WARN] ODDS_API_KEY not set; fixtures will not load");
    }
    app.request_all(false);
    let res = run_app(&mut terminal, &mut app, rx);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: mpsc::Receiver<Delta>,
) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        while let Ok(delta) = rx.try_recv() {
            apply_delta(&mut app.state, delta);
        }

        app.maybe_daily_refresh();

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
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(4),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_text(app))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    match app.state.view {
        View::Fixtures => render_fixtures(frame, chunks[1], app),
        View::Teams => render_teams(frame, chunks[1], app),
        View::Players => render_players(frame, chunks[1], &app.state),
    }

    let console = Paragraph::new(console_text(&app.state))
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().title("Console").borders(Borders::TOP));
    frame.render_widget(console, chunks[2]);

    let footer = Paragraph::new(footer_text(app.state.view));
    frame.render_widget(footer, chunks[3]);

    if app.state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_text(app: &App) -> String {
    let state = &app.state;
    let line1 = format!(
        "PL DASHBOARD | {} | {}",
        state.view.label(),
        app.cfg.competition_label
    );
    let line2 = match state.view {
        View::Fixtures => {
            let updated = state
                .fixtures_updated_at
                .map(|at| format_updated(at, app))
                .unwrap_or_else(|| "never".to_string());
            let loading = if state.fixtures_loading { " (loading)" } else { "" };
            format!("Upcoming fixtures | Last updated: {updated}{loading}")
        }
        View::Teams | View::Players => {
            let deadline = state
                .roster
                .current_gameweek()
                .map(|gw| {
                    let when = gw
                        .deadline_time
                        .as_deref()
                        .and_then(parse_kickoff)
                        .map(|at| format_match_date(at, app.cfg.display_offset))
                        .unwrap_or_else(|| "-".to_string());
                    format!("{} deadline: {when}", gw.name)
                })
                .unwrap_or_else(|| "No current gameweek".to_string());
            let loading = if state.roster_loading { " (loading)" } else { "" };
            format!("{deadline}{loading}")
        }
    };
    format!("{line1}\n{line2}")
}

fn format_updated(at: DateTime<Utc>, app: &App) -> String {
    at.with_timezone(&app.cfg.display_offset)
        .format("%d %b %H:%M")
        .to_string()
}

fn footer_text(view: View) -> String {
    let text = match view {
        View::Fixtures => "1/2/3 View | Tab Next | j/k Move | r Refresh | ? Help | q Quit",
        View::Teams => "1/2/3 View | h/l Column | Enter/s Sort | j/k Move | r Refresh | ? Help | q Quit",
        View::Players => "1/2/3 View | f Position | s Sort | j/k Move | r Refresh | ? Help | q Quit",
    };
    text.to_string()
}

fn render_error(frame: &mut Frame, area: Rect, err: &str) {
    let msg = Paragraph::new(format!("Error: {err}")).style(Style::default().fg(Color::Red));
    frame.render_widget(msg, area);
}

fn split_error_line(area: Rect, err: Option<&String>) -> (Option<Rect>, Rect) {
    if err.is_none() || area.height < 2 {
        return (None, area);
    }
    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(1)])
        .split(area);
    (Some(parts[0]), parts[1])
}

fn render_fixtures(frame: &mut Frame, area: Rect, app: &App) {
    let state = &app.state;
    let (err_area, area) = split_error_line(area, state.fixtures_error.as_ref());
    if let (Some(err_area), Some(err)) = (err_area, state.fixtures_error.as_deref()) {
        render_error(frame, err_area, err);
    }

    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(1)])
        .split(area);

    let widths = fixture_columns();
    render_header_row(
        frame,
        sections[0],
        &widths,
        &["Kickoff", "Match", "Home", "Draw", "Away", "Bookmaker"],
    );

    let list_area = sections[1];
    if state.fixtures.is_empty() {
        let msg = if state.fixtures_loading {
            "Loading fixtures..."
        } else {
            "No upcoming matches found"
        };
        let empty = Paragraph::new(msg).style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, list_area);
        return;
    }

    let visible = list_area.height as usize;
    let (start, end) = visible_range(state.selected, state.fixtures.len(), visible);
    for (i, idx) in (start..end).enumerate() {
        let row_area = Rect {
            x: list_area.x,
            y: list_area.y + i as u16,
            width: list_area.width,
            height: 1,
        };
        let style = row_style(idx == state.selected);
        if idx == state.selected {
            frame.render_widget(Block::default().style(style), row_area);
        }
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(widths)
            .split(row_area);

        let f: &FixtureRecord = &state.fixtures[idx];
        render_cell_text(frame, cols[0], &f.match_date, style);
        render_cell_text(
            frame,
            cols[1],
            &format!("{} vs {}", f.home_team, f.away_team),
            style,
        );
        render_cell_text(frame, cols[2], &format_odds(f.home_odds), style);
        render_cell_text(frame, cols[3], &format_odds(f.draw_odds), style);
        render_cell_text(frame, cols[4], &format_odds(f.away_odds), style);
        render_cell_text(
            frame,
            cols[5],
            f.bookmaker.as_deref().unwrap_or("-"),
            style,
        );
    }
}

fn format_odds(odds: Option<f64>) -> String {
    odds.map(|v| format!("{v:.2}"))
        .unwrap_or_else(|| "-".to_string())
}

fn fixture_columns() -> [Constraint; 6] {
    [
        Constraint::Length(24),
        Constraint::Min(30),
        Constraint::Length(7),
        Constraint::Length(7),
        Constraint::Length(7),
        Constraint::Length(16),
    ]
}

fn render_teams(frame: &mut Frame, area: Rect, app: &App) {
    let state = &app.state;
    let (err_area, area) = split_error_line(area, state.roster_error.as_ref());
    if let (Some(err_area), Some(err)) = (err_area, state.roster_error.as_deref()) {
        render_error(frame, err_area, err);
    }

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(60), Constraint::Length(30)])
        .split(area);
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(1)])
        .split(columns[0]);

    let widths = team_columns();
    let labels: Vec<String> = TeamSortKey::ALL
        .iter()
        .enumerate()
        .map(|(i, key)| {
            let arrow = if *key == state.team_sort {
                state.team_order.arrow()
            } else {
                ""
            };
            let cursor = if i == app.team_column { "*" } else { "" };
            format!("{cursor}{}{arrow}", key.label())
        })
        .collect();
    let label_refs: Vec<&str> = labels.iter().map(String::as_str).collect();
    render_header_row(frame, sections[0], &widths, &label_refs);

    let teams = state.sorted_teams();
    let list_area = sections[1];
    if teams.is_empty() {
        let msg = if state.roster_loading {
            "Loading teams..."
        } else {
            "No team data"
        };
        frame.render_widget(
            Paragraph::new(msg).style(Style::default().fg(Color::DarkGray)),
            list_area,
        );
        return;
    }

    let visible = list_area.height as usize;
    let (start, end) = visible_range(state.selected, teams.len(), visible);
    for (i, idx) in (start..end).enumerate() {
        let row_area = Rect {
            x: list_area.x,
            y: list_area.y + i as u16,
            width: list_area.width,
            height: 1,
        };
        let style = row_style(idx == state.selected);
        if idx == state.selected {
            frame.render_widget(Block::default().style(style), row_area);
        }
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(widths)
            .split(row_area);

        let t = teams[idx];
        let cells = [
            t.name.clone(),
            t.position.to_string(),
            t.played.to_string(),
            t.win.to_string(),
            t.draw.to_string(),
            t.loss.to_string(),
            t.goals_scored.to_string(),
            t.goals_against.to_string(),
            t.clean_sheets.to_string(),
            t.form.clone().unwrap_or_else(|| "-".to_string()),
        ];
        for (col, text) in cols.iter().zip(cells.iter()) {
            render_cell_text(frame, *col, text, style);
        }
    }

    let strength_block = Block::default().title("Strength").borders(Borders::LEFT);
    let inner = strength_block.inner(columns[1]);
    frame.render_widget(strength_block, columns[1]);
    if let Some(team) = state.selected_team() {
        let parts = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(1)])
            .split(inner);
        render_cell_text(
            frame,
            parts[0],
            &team.name,
            Style::default().add_modifier(Modifier::BOLD),
        );
        frame.render_widget(strength_bar_chart(team), parts[1]);
    }
}

fn team_columns() -> [Constraint; 10] {
    [
        Constraint::Min(18),
        Constraint::Length(5),
        Constraint::Length(4),
        Constraint::Length(4),
        Constraint::Length(4),
        Constraint::Length(4),
        Constraint::Length(5),
        Constraint::Length(5),
        Constraint::Length(5),
        Constraint::Length(8),
    ]
}

fn strength_bar_chart(team: &TeamRecord) -> BarChart<'static> {
    let bar = |label: &'static str, value: u32, color: Color| {
        Bar::default()
            .label(label.into())
            .value(u64::from(value).min(STRENGTH_SCALE))
            .text_value(value.to_string())
            .style(Style::default().fg(color))
    };
    let bars = [
        bar("Att H", team.strength_attack_home, Color::Green),
        bar("Att A", team.strength_attack_away, Color::Green),
        bar("Def H", team.strength_defence_home, Color::Blue),
        bar("Def A", team.strength_defence_away, Color::Blue),
    ];

    BarChart::default()
        .data(BarGroup::default().bars(&bars))
        .direction(Direction::Horizontal)
        .bar_width(1)
        .bar_gap(1)
        .max(STRENGTH_SCALE)
}

fn render_players(frame: &mut Frame, area: Rect, state: &AppState) {
    let (err_area, area) = split_error_line(area, state.roster_error.as_ref());
    if let (Some(err_area), Some(err)) = (err_area, state.roster_error.as_deref()) {
        render_error(frame, err_area, err);
    }

    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(1),
        ])
        .split(area);

    let summary = format!(
        "Position: {} | Sort: {}",
        position_filter_label(state.position_filter),
        state.player_sort.label()
    );
    render_cell_text(
        frame,
        sections[0],
        &summary,
        Style::default().fg(Color::Cyan),
    );

    let widths = player_columns();
    render_header_row(
        frame,
        sections[1],
        &widths,
        &["Player", "Team", "Pos", "Pts", "PPG", "Form", "Sel%", "Cost"],
    );

    let players = state.visible_players();
    let list_area = sections[2];
    if players.is_empty() {
        let msg = if state.roster_loading {
            "Loading players..."
        } else {
            "No players"
        };
        frame.render_widget(
            Paragraph::new(msg).style(Style::default().fg(Color::DarkGray)),
            list_area,
        );
        return;
    }

    let visible = list_area.height as usize;
    let (start, end) = visible_range(state.selected, players.len(), visible);
    for (i, idx) in (start..end).enumerate() {
        let row_area = Rect {
            x: list_area.x,
            y: list_area.y + i as u16,
            width: list_area.width,
            height: 1,
        };
        let style = row_style(idx == state.selected);
        if idx == state.selected {
            frame.render_widget(Block::default().style(style), row_area);
        }
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(widths)
            .split(row_area);

        let p = players[idx];
        let cells = [
            p.name.clone(),
            p.team.clone().unwrap_or_else(|| "-".to_string()),
            p.position.code().to_string(),
            format!("{:.0}", p.total_points),
            format!("{:.1}", p.points_per_game),
            format!("{:.1}", p.form),
            format!("{:.1}", p.selected_by_percent),
            format!("£{:.1}m", p.now_cost),
        ];
        for (col, text) in cols.iter().zip(cells.iter()) {
            render_cell_text(frame, *col, text, style);
        }
    }
}

fn player_columns() -> [Constraint; 8] {
    [
        Constraint::Min(16),
        Constraint::Length(18),
        Constraint::Length(5),
        Constraint::Length(6),
        Constraint::Length(6),
        Constraint::Length(6),
        Constraint::Length(7),
        Constraint::Length(8),
    ]
}

fn row_style(selected: bool) -> Style {
    if selected {
        Style::default().fg(Color::White).bg(Color::DarkGray)
    } else {
        Style::default()
    }
}

fn render_header_row(frame: &mut Frame, area: Rect, widths: &[Constraint], labels: &[&str]) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(widths)
        .split(area);
    let style = Style::default().add_modifier(Modifier::BOLD);
    for (col, label) in cols.iter().zip(labels) {
        render_cell_text(frame, *col, label, style);
    }
}

fn render_cell_text(frame: &mut Frame, area: Rect, text: &str, style: Style) {
    let text_area = Rect {
        x: area.x,
        y: area.y + (area.height / 2),
        width: area.width,
        height: 1,
    };
    let paragraph = Paragraph::new(text.to_string()).style(style);
    frame.render_widget(paragraph, text_area);
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

fn console_text(state: &AppState) -> String {
    if state.logs.is_empty() {
        return "No messages yet".to_string();
    }
    let skip = state.logs.len().saturating_sub(3);
    state
        .logs
        .iter()
        .skip(skip)
        .cloned()
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "PL Dashboard - Help",
        "",
        "Global:",
        "  1 / 2 / 3    Fixtures / Teams / Players",
        "  Tab          Next view",
        "  j/k or ↑/↓   Move",
        "  r            Refresh now",
        "  ?            Toggle help",
        "  q            Quit",
        "",
        "Teams:",
        "  h/l or ←/→   Pick column",
        "  Enter / s    Sort (again to flip)",
        "",
        "Players:",
        "  f            Cycle position filter",
        "  s            Cycle sort metric",
        "",
        "Data refreshes at local midnight.",
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
