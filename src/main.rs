use std::io;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use chrono::Utc;
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
use ratatui::widgets::{Block, Borders, Clear, Gauge, Paragraph, Tabs, Wrap};

use chess_terminal::config::Config;
use chess_terminal::format::{self, RankTier, Tone};
use chess_terminal::lichess_api::LichessClient;
use chess_terminal::logging::init_logging;
use chess_terminal::models::{GamePlayer, GameSummary, Perf, RatingSeries, UserProfile, Variant};
use chess_terminal::provider::{FetchLimits, spawn_provider};
use chess_terminal::state::{
    AppState, Delta, FetchStatus, ProviderCommand, Screen, apply_delta,
};

struct App {
    state: AppState,
    should_quit: bool,
    cmd_tx: mpsc::Sender<ProviderCommand>,
}

impl App {
    fn new(default_variant: Variant, cmd_tx: mpsc::Sender<ProviderCommand>) -> Self {
        Self {
            state: AppState::new(default_variant),
            should_quit: false,
            cmd_tx,
        }
    }

    fn send(&mut self, cmd: ProviderCommand) {
        if self.cmd_tx.send(cmd).is_err() {
            self.state.push_log("[WARN] Fetch worker unavailable");
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        if self.state.screen == Screen::Profile && self.state.profile.editing {
            self.on_search_key(key);
            return;
        }

        let now_ms = Utc::now().timestamp_millis();
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('1') => self.open(Screen::Profile),
            KeyCode::Char('2') => self.open(Screen::Leaderboards),
            KeyCode::Char('3') => self.open(Screen::Tournaments),
            KeyCode::Char('b') | KeyCode::Esc => self.state.screen = Screen::Home,
            KeyCode::Char('?') => self.state.help_overlay = !self.state.help_overlay,
            KeyCode::Char('r') => self.refresh(),
            KeyCode::Char('/') | KeyCode::Char('e') if self.state.screen == Screen::Profile => {
                self.state.profile.editing = true;
            }
            KeyCode::Char('j') | KeyCode::Down => self.state.select_next(now_ms),
            KeyCode::Char('k') | KeyCode::Up => self.state.select_prev(now_ms),
            KeyCode::Char('v') | KeyCode::Right if self.state.screen == Screen::Leaderboards => {
                let next = self.state.leaderboard.variant.next();
                let cmd = self.state.select_variant(next);
                self.send(cmd);
            }
            KeyCode::Left if self.state.screen == Screen::Leaderboards => {
                let prev = self.state.leaderboard.variant.prev();
                let cmd = self.state.select_variant(prev);
                self.send(cmd);
            }
            KeyCode::Enter if self.state.screen == Screen::Tournaments => {
                match self.state.begin_tournament_detail(now_ms) {
                    Some(cmd) => self.send(cmd),
                    None => self.state.push_log("[INFO] No tournament selected"),
                }
            }
            _ => {}
        }
    }

    fn on_search_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char(c) => self.state.profile.query.push(c),
            KeyCode::Backspace => {
                self.state.profile.query.pop();
            }
            KeyCode::Enter => {
                if let Some(cmd) = self.state.begin_profile_search() {
                    self.state.profile.editing = false;
                    self.send(cmd);
                }
            }
            KeyCode::Esc => self.state.profile.editing = false,
            _ => {}
        }
    }

    /// Leaderboards and tournaments load every time they are opened.
    fn open(&mut self, screen: Screen) {
        self.state.screen = screen;
        match screen {
            Screen::Profile => self.state.profile.editing = true,
            Screen::Leaderboards => {
                let cmd = self.state.begin_leaderboard_fetch();
                self.send(cmd);
            }
            Screen::Tournaments => {
                let cmd = self.state.begin_tournaments_fetch();
                self.send(cmd);
            }
            Screen::Home => {}
        }
    }

    fn refresh(&mut self) {
        match self.state.screen {
            Screen::Profile => {
                if let Some(cmd) = self.state.begin_profile_search() {
                    self.send(cmd);
                }
            }
            Screen::Leaderboards => {
                let cmd = self.state.begin_leaderboard_fetch();
                self.send(cmd);
            }
            Screen::Tournaments => {
                let cmd = self.state.begin_tournaments_fetch();
                self.send(cmd);
            }
            Screen::Home => {}
        }
    }
}

fn main() -> Result<()> {
    let config = Config::from_env();
    let _guard = init_logging(&config.log_dir)?;
    let client = LichessClient::from_config(&config).context("build lichess client")?;
    tracing::info!(base = config.api_base.as_str(), "starting chess_terminal");

    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    spawn_provider(client, FetchLimits::from(&config), tx, cmd_rx);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let mut app = App::new(config.default_variant, cmd_tx);
    let res = run_app(&mut terminal, &mut app, rx);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = &res {
        tracing::error!(error = %err, "ui loop failed");
    }
    res.context("ui loop failed")
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

        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key);
                }
            }
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
            Constraint::Length(2),
            Constraint::Min(1),
            Constraint::Length(5),
            Constraint::Length(2),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_text(&app.state))
        .style(Style::default().add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    let now_ms = Utc::now().timestamp_millis();
    match app.state.screen {
        Screen::Home => render_home(frame, chunks[1]),
        Screen::Profile => render_profile(frame, chunks[1], &app.state),
        Screen::Leaderboards => render_leaderboards(frame, chunks[1], &app.state),
        Screen::Tournaments => render_tournaments(frame, chunks[1], &app.state, now_ms),
    }

    let console = Paragraph::new(console_text(&app.state))
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, chunks[2]);

    let footer = Paragraph::new(footer_text(&app.state))
        .block(Block::default().borders(Borders::TOP));
    frame.render_widget(footer, chunks[3]);

    if app.state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_text(state: &AppState) -> String {
    let page = match state.screen {
        Screen::Home => "HOME".to_string(),
        Screen::Profile => "PLAYER PROFILE".to_string(),
        Screen::Leaderboards => format!("LEADERBOARDS | {}", state.leaderboard.variant.label()),
        Screen::Tournaments => "UPCOMING TOURNAMENTS".to_string(),
    };
    format!("♞ LICHESS TERMINAL | {page}")
}

fn footer_text(state: &AppState) -> String {
    match state.screen {
        Screen::Home => "1 Profile | 2 Leaderboards | 3 Tournaments | ? Help | q Quit".to_string(),
        Screen::Profile if state.profile.editing => {
            "Type a username | Enter Search | Esc Stop editing".to_string()
        }
        Screen::Profile => "/ Search | r Refresh | b/Esc Home | ? Help | q Quit".to_string(),
        Screen::Leaderboards => {
            "←/→/v Variant | j/k/↑/↓ Move | r Refresh | b/Esc Home | ? Help | q Quit".to_string()
        }
        Screen::Tournaments => {
            "j/k/↑/↓ Move | Enter Details | r Refresh | b/Esc Home | ? Help | q Quit".to_string()
        }
    }
}

fn render_home(frame: &mut Frame, area: Rect) {
    let text = [
        "Browse players, leaderboards and tournaments from lichess.org",
        "",
        "  1  Player profile search",
        "  2  Leaderboards (rapid, bullet, blitz, classical)",
        "  3  Upcoming tournaments",
    ]
    .join("\n");
    let menu = Paragraph::new(text).block(Block::default().title("Menu").borders(Borders::ALL));
    frame.render_widget(menu, area);
}

/// Loading and error lines shared by every page. Returns true when the page has nothing else
/// to show.
fn status_lines(status: &FetchStatus, lines: &mut Vec<Line<'static>>) -> bool {
    if status.loading {
        lines.push(Line::from(Span::styled(
            "Loading...",
            Style::default().fg(Color::DarkGray),
        )));
        return true;
    }
    if let Some(err) = &status.error {
        lines.push(Line::from(Span::styled(
            err.clone(),
            Style::default().fg(Color::Red),
        )));
        return true;
    }
    false
}

fn render_profile(frame: &mut Frame, area: Rect, state: &AppState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(1)])
        .split(area);

    let page = &state.profile;
    let search_style = if page.editing {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    let cursor = if page.editing { "_" } else { "" };
    let search = Paragraph::new(format!("{}{cursor}", page.query))
        .style(search_style)
        .block(Block::default().title("Username").borders(Borders::ALL));
    frame.render_widget(search, rows[0]);

    let mut lines = Vec::new();
    if status_lines(&page.status, &mut lines) {
        frame.render_widget(Paragraph::new(lines), rows[1]);
        return;
    }
    let Some(profile) = &page.profile else {
        let empty = Paragraph::new("Search for a player to see their profile")
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, rows[1]);
        return;
    };

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(rows[1]);

    let mut left = vec![profile_heading(profile)];
    if let Some(bio) = profile.bio() {
        left.push(Line::from(Span::styled(
            bio.to_string(),
            Style::default().fg(Color::Gray),
        )));
    }
    left.push(Line::from(""));
    left.extend(profile_stat_lines(profile));
    left.push(Line::from(""));
    left.push(Line::from(Span::styled(
        "Ratings & Performance",
        Style::default().add_modifier(Modifier::BOLD),
    )));
    let perfs = format::played_perfs(&profile.perfs);
    if perfs.is_empty() {
        left.push(Line::from(Span::styled(
            "No rated games yet",
            Style::default().fg(Color::DarkGray),
        )));
    }
    for (key, perf) in perfs {
        left.push(perf_line(key, perf));
    }
    let summary = Paragraph::new(left)
        .wrap(Wrap { trim: true })
        .block(Block::default().title("Profile").borders(Borders::ALL));
    frame.render_widget(summary, columns[0]);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(columns[1]);

    let history = Paragraph::new(history_lines(&page.history))
        .block(Block::default().title("Latest Ratings").borders(Borders::ALL));
    frame.render_widget(history, right[0]);

    let games = Paragraph::new(games_lines(&page.games))
        .block(Block::default().title("Recent Games").borders(Borders::ALL));
    frame.render_widget(games, right[1]);
}

fn profile_heading(profile: &UserProfile) -> Line<'static> {
    let mut spans = Vec::new();
    if let Some(title) = &profile.title {
        spans.push(Span::styled(
            format!("{title} "),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ));
    }
    spans.push(Span::styled(
        profile
            .username
            .clone()
            .unwrap_or_else(|| format::PLACEHOLDER.to_string()),
        Style::default().add_modifier(Modifier::BOLD),
    ));
    if profile.patron {
        spans.push(Span::styled(" PATRON", Style::default().fg(Color::Green)));
    }
    if profile.online {
        spans.push(Span::styled(" ● ONLINE", Style::default().fg(Color::LightGreen)));
    }
    Line::from(spans)
}

fn profile_stat_lines(profile: &UserProfile) -> Vec<Line<'static>> {
    let count = profile.count.clone().unwrap_or_default();
    let mut lines = vec![Line::from(format!(
        "Games {}  Won {}  Draw {}  Lost {}",
        count.all.unwrap_or(0),
        opt_num(count.win),
        opt_num(count.draw),
        opt_num(count.loss)
    ))];
    if let Some(rate) = format::win_rate(&count) {
        lines.push(Line::from(format!("Win rate {rate:.1}%")));
    }
    let since = profile.created_at.and_then(format::format_date);
    let seen = profile.seen_at.and_then(format::format_date);
    lines.push(Line::from(format!(
        "Member since {}  Last seen {}",
        format::or_placeholder(since),
        format::or_placeholder(seen)
    )));
    if let Some(total) = profile.play_time.as_ref().and_then(|p| p.total) {
        lines.push(Line::from(format!(
            "Play time {}h",
            format::play_time_hours(total)
        )));
    }
    if profile.followable.is_some() {
        lines.push(Line::from(format!(
            "Following {}",
            profile.nb_following.unwrap_or(0)
        )));
    }
    lines
}

fn perf_line(key: &str, perf: &Perf) -> Line<'static> {
    let games = perf.games.unwrap_or(0);
    let rating_style = perf
        .rating
        .map(|r| Style::default().fg(tone_color(format::profile_rating_tone(r))))
        .unwrap_or_default();
    let mut spans = vec![
        Span::raw(format!("{:<16}", format::perf_label(key))),
        Span::styled(
            format!("{:>5}", format::rating_label(Some(perf))),
            rating_style.add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(" {:<5}", perf.rd.map(format::rd_label).unwrap_or_default()),
            Style::default().fg(Color::DarkGray),
        ),
        Span::raw(format!(" {games:>6} games ")),
    ];
    if let Some(prog) = perf.prog {
        spans.push(Span::styled(
            format!("{:>5} ", format::progress_label(prog)),
            Style::default().fg(tone_color(format::progress_tone(prog))),
        ));
    }
    spans.push(Span::styled(
        bar_text(format::games_bar_percent(games), 10),
        Style::default().fg(Color::Blue),
    ));
    Line::from(spans)
}

fn history_lines(history: &[RatingSeries]) -> Vec<Line<'static>> {
    let rows: Vec<Line> = history
        .iter()
        .filter_map(|series| {
            let latest = series.latest()?;
            Some(Line::from(format!("{:<16} {}", series.name, latest.rating())))
        })
        .collect();
    if rows.is_empty() {
        return vec![Line::from("No rating history")];
    }
    rows
}

fn games_lines(games: &[GameSummary]) -> Vec<Line<'static>> {
    if games.is_empty() {
        return vec![Line::from("No recent games")];
    }
    games
        .iter()
        .map(|game| {
            let players = game.players.clone().unwrap_or_default();
            let white = players.white.as_ref().map(game_side).unwrap_or_default();
            let black = players.black.as_ref().map(game_side).unwrap_or_default();
            let result = format::game_result(game.winner.as_deref(), game.status.as_deref());
            let date = format::or_placeholder(game.created_at.and_then(format::format_date));
            let speed = game.speed.clone().unwrap_or_default();
            Line::from(format!("{date} {speed:<9} {white} {result} {black}"))
        })
        .collect()
}

fn game_side(player: &GamePlayer) -> String {
    let mut text = player.name();
    if let Some(rating) = player.rating {
        text.push_str(&format!(" ({rating}"));
        if let Some(diff) = player.rating_diff {
            text.push_str(&format!(" {}", format::progress_label(diff)));
        }
        text.push(')');
    }
    text
}

fn render_leaderboards(frame: &mut Frame, area: Rect, state: &AppState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(1),
        ])
        .split(area);

    let page = &state.leaderboard;
    let titles: Vec<&str> = Variant::ALL.iter().map(|v| v.label()).collect();
    let selected_tab = Variant::ALL
        .iter()
        .position(|v| *v == page.variant)
        .unwrap_or(0);
    let tabs = Tabs::new(titles)
        .select(selected_tab)
        .highlight_style(Style::default().fg(Color::White).bg(Color::Blue));
    frame.render_widget(tabs, rows[0]);

    let header = Paragraph::new(format!(
        "{:<6}{:<26}{:>7} {:<6}{:>8}{:>8}",
        "Rank", "Player", "Rating", "RD", "Games", "Prog"
    ))
    .style(Style::default().add_modifier(Modifier::BOLD));
    frame.render_widget(header, rows[1]);

    let mut lines = Vec::new();
    if status_lines(&page.status, &mut lines) {
        frame.render_widget(Paragraph::new(lines), rows[2]);
        return;
    }
    if page.entries.is_empty() {
        let empty = Paragraph::new("No players found")
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, rows[2]);
        return;
    }

    let visible = rows[2].height as usize;
    let (start, end) = visible_range(page.selected, page.entries.len(), visible);
    for idx in start..end {
        let entry = &page.entries[idx];
        let rank = idx + 1;
        let perf = entry.perf(page.variant);

        let rank_text = match format::rank_medal(rank) {
            Some(medal) => medal.to_string(),
            None => format!("#{rank}"),
        };
        let name = match &entry.title {
            Some(title) => format!("{title} {}", entry.username.clone().unwrap_or_default()),
            None => entry.username.clone().unwrap_or_default(),
        };
        let rating_style = perf
            .and_then(|p| p.rating)
            .map(|r| Style::default().fg(tone_color(format::leaderboard_rating_tone(r))))
            .unwrap_or_default();
        let rd = perf
            .and_then(|p| p.rd)
            .map(format::rd_label)
            .unwrap_or_default();
        let games = perf
            .and_then(|p| p.games)
            .map(|g| g.to_string())
            .unwrap_or_else(|| format::PLACEHOLDER.to_string());
        let (prog_text, prog_style) = match perf.and_then(|p| p.prog) {
            Some(prog) => (
                format::progress_label(prog),
                Style::default().fg(tone_color(format::progress_tone(prog))),
            ),
            None => (format::PLACEHOLDER.to_string(), Style::default()),
        };
        let online = if entry.online { "●" } else { " " };

        let row_style = if idx == page.selected {
            Style::default().bg(Color::DarkGray)
        } else {
            Style::default()
        };
        lines.push(
            Line::from(vec![
                Span::styled(format!("{rank_text:<6}"), rank_style(format::rank_tier(rank))),
                Span::raw(format!("{:<24}", truncate(&name, 23))),
                Span::styled(format!("{online} "), Style::default().fg(Color::LightGreen)),
                Span::styled(
                    format!("{:>7}", format::rating_label(perf)),
                    rating_style.add_modifier(Modifier::BOLD),
                ),
                Span::styled(format!(" {rd:<6}"), Style::default().fg(Color::DarkGray)),
                Span::raw(format!("{games:>8}")),
                Span::styled(format!("{prog_text:>8}"), prog_style),
            ])
            .style(row_style),
        );
    }
    frame.render_widget(Paragraph::new(lines), rows[2]);
}

fn render_tournaments(frame: &mut Frame, area: Rect, state: &AppState, now_ms: i64) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    let page = &state.tournaments;
    let upcoming = state.upcoming_tournaments(now_ms);

    let mut lines = Vec::new();
    if !status_lines(&page.status, &mut lines) {
        if upcoming.is_empty() {
            lines.push(Line::from(Span::styled(
                "No upcoming tournaments",
                Style::default().fg(Color::DarkGray),
            )));
        }
        let visible = (columns[0].height.saturating_sub(2) / 2) as usize;
        let current = state.selected_tournament_index(&upcoming);
        let (start, end) = visible_range(current.unwrap_or(0), upcoming.len(), visible.max(1));
        for (idx, t) in upcoming.iter().enumerate().take(end).skip(start) {
            let selected = Some(idx) == current;
            let name_style = if selected {
                Style::default().fg(Color::White).bg(Color::DarkGray)
            } else {
                Style::default().add_modifier(Modifier::BOLD)
            };
            lines.push(Line::from(Span::styled(
                t.display_name()
                    .unwrap_or(format::PLACEHOLDER)
                    .to_string(),
                name_style,
            )));

            let gauge = format::capacity_percent(t.nb_players.unwrap_or(0), t.max_players)
                .map(|pct| bar_text(pct, 8))
                .unwrap_or_default();
            let starts = format::or_placeholder(t.starts_at.and_then(format::format_time));
            let duration = t
                .minutes
                .map(format::format_duration)
                .unwrap_or_else(|| format::PLACEHOLDER.to_string());
            lines.push(Line::from(vec![
                Span::raw(format!(
                    "  {:<6} {:<12} {} ",
                    format::format_time_control(t.clock.as_ref()),
                    format::players_label(t.nb_players, t.max_players),
                    starts,
                )),
                Span::styled(gauge, Style::default().fg(Color::Blue)),
                Span::raw(format!(
                    " {duration} {} ",
                    t.variant_name().unwrap_or("Standard")
                )),
                Span::styled(
                    format::rated_label(t.rated),
                    Style::default().fg(if t.rated == Some(true) {
                        Color::Green
                    } else {
                        Color::Gray
                    }),
                ),
            ]));
        }
    }
    let list = Paragraph::new(lines).block(
        Block::default()
            .title(format!("Upcoming ({})", upcoming.len()))
            .borders(Borders::ALL),
    );
    frame.render_widget(list, columns[0]);

    render_tournament_detail(frame, columns[1], state);
}

fn render_tournament_detail(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = Block::default().title("Details").borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.height == 0 || inner.width == 0 {
        return;
    }

    let page = &state.tournaments;
    let mut lines = Vec::new();
    if status_lines(&page.detail_status, &mut lines) {
        frame.render_widget(Paragraph::new(lines), inner);
        return;
    }
    let Some(detail) = &page.detail else {
        let empty = Paragraph::new("Select a tournament and press Enter")
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, inner);
        return;
    };

    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(7),
            Constraint::Length(1),
            Constraint::Min(1),
        ])
        .split(inner);

    lines.push(Line::from(Span::styled(
        detail.display_name().unwrap_or(format::PLACEHOLDER).to_string(),
        Style::default().add_modifier(Modifier::BOLD),
    )));
    lines.push(Line::from(format!(
        "By {}",
        detail.created_by.as_deref().unwrap_or(format::PLACEHOLDER)
    )));
    lines.push(Line::from(format!(
        "{} | {}",
        format::format_time_control(detail.clock.as_ref()),
        detail
            .minutes
            .map(format::format_duration)
            .unwrap_or_else(|| format::PLACEHOLDER.to_string())
    )));
    lines.push(Line::from(format!(
        "Starts {} {}",
        format::or_placeholder(detail.starts_at.and_then(format::format_date)),
        format::or_placeholder(detail.starts_at.and_then(format::format_time))
    )));
    lines.push(Line::from(format!(
        "Players {}",
        format::players_label(detail.nb_players, detail.max_players)
    )));
    let mut flags = format!(
        "{} | {}",
        detail.variant_name().unwrap_or("Standard"),
        format::rated_label(detail.rated)
    );
    if detail.is_finished == Some(true) {
        flags.push_str(" | finished");
    }
    lines.push(Line::from(flags));
    if let Some(id) = &detail.id {
        lines.push(Line::from(Span::styled(
            format!("View on Lichess: {}", format::tournament_url(id)),
            Style::default().fg(Color::Cyan),
        )));
    }
    frame.render_widget(Paragraph::new(lines), sections[0]);

    if let Some(pct) = format::capacity_percent(detail.nb_players.unwrap_or(0), detail.max_players)
    {
        let gauge = Gauge::default()
            .gauge_style(Style::default().fg(Color::Blue))
            .percent(pct);
        frame.render_widget(gauge, sections[1]);
    }

    let standings: Vec<Line> = if page.results.is_empty() {
        vec![Line::from("No standings yet")]
    } else {
        page.results
            .iter()
            .map(|row| {
                let name = match &row.title {
                    Some(title) => format!("{title} {}", row.username.clone().unwrap_or_default()),
                    None => row.username.clone().unwrap_or_default(),
                };
                Line::from(format!(
                    "{:>3}. {:<20} {:>4} pts {:>5} perf {}",
                    row.rank.unwrap_or(0),
                    truncate(&name, 20),
                    opt_num(row.score),
                    opt_num(row.rating),
                    opt_num(row.performance)
                ))
            })
            .collect()
    };
    frame.render_widget(
        Paragraph::new(standings).block(Block::default().title("Standings")),
        sections[2],
    );
}

fn console_text(state: &AppState) -> String {
    if state.logs.is_empty() {
        return "No alerts yet".to_string();
    }
    let start = state.logs.len().saturating_sub(3);
    state
        .logs
        .iter()
        .skip(start)
        .cloned()
        .collect::<Vec<_>>()
        .join("\n")
}

fn tone_color(tone: Tone) -> Color {
    match tone {
        Tone::Purple => Color::Magenta,
        Tone::Pink => Color::LightMagenta,
        Tone::Red => Color::Red,
        Tone::Orange => Color::LightRed,
        Tone::Yellow => Color::Yellow,
        Tone::Green => Color::Green,
        Tone::Blue => Color::Blue,
        Tone::Gray => Color::DarkGray,
    }
}

fn rank_style(tier: RankTier) -> Style {
    match tier {
        RankTier::Gold => Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        RankTier::Silver => Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD),
        RankTier::Bronze => Style::default()
            .fg(Color::LightRed)
            .add_modifier(Modifier::BOLD),
        RankTier::TopTen => Style::default().fg(Color::LightBlue),
        RankTier::Default => Style::default().fg(Color::DarkGray),
    }
}

fn bar_text(percent: u16, width: usize) -> String {
    let filled = (usize::from(percent.min(100)) * width) / 100;
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

fn opt_num<T: ToString>(value: Option<T>) -> String {
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|| format::PLACEHOLDER.to_string())
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
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

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "Lichess Terminal - Help",
        "",
        "Global:",
        "  1            Profile search",
        "  2            Leaderboards",
        "  3            Tournaments",
        "  r            Refresh current page",
        "  b / Esc      Home",
        "  ?            Toggle help",
        "  q            Quit",
        "",
        "Profile:",
        "  / or e       Edit username, Enter to search",
        "",
        "Leaderboards:",
        "  ←/→ or v     Change variant",
        "  j/k or ↑/↓   Move",
        "",
        "Tournaments:",
        "  j/k or ↑/↓   Move",
        "  Enter        Details and standings",
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
