use log::error;
use tui::backend::Backend;
use tui::layout::{Alignment, Constraint, Layout, Rect};
use tui::style::{Color, Modifier, Style};
use tui::text::{Line, Span};
use tui::widgets::{Block, BorderType, Borders, Cell, Clear, Paragraph, Row, Table, Tabs};
use tui::{Frame, Terminal};
use tui_logger::TuiLoggerWidget;

use crate::app::{App, MenuItem};
use crate::components::bracket::{BracketGrid, GRID_HEIGHT, TournamentView, round_label};
use crate::components::palette::{Tone, resolve};
use crate::state::network::{ERROR_CHAR, LoadingState};
use crate::ui::layout::LayoutAreas;
use playoff_api::bracket::{derive_all_games, derive_current_round};
use playoff_api::leaderboard::Standing;
use playoff_api::{Outcome, SeedTable};

static TABS: &[&str; 3] = &["Leaderboard", "Picks", "Results"];

const HELP_TEXT: &str = "\
Global
  1 2 3      switch tab (Tab/Esc in the picks editor)
  ?          help, Esc to leave
  f          full screen
  \"          log pane
  q          quit

Leaderboard
  ↑/↓ j/k    select bracket
  ←/→ l      select an open game of the current round
  h a x      what-if: home wins, away wins, clear
  g          next group
  u          unlock a password group
  Enter      open the selected bracket
  r          reload

Picks
  ↑/↓ j/k    select game
  h a x      pick home, pick away, clear
  0-9 ⌫      tiebreaker (total points in the final)
  s          save the bracket to the selected group
  d          delete the opened bracket
  n          start a new bracket
  y          join the existing player after a name clash";

pub fn draw<B>(terminal: &mut Terminal<B>, app: &mut App, loading: LoadingState)
where
    B: Backend,
{
    let current_size = terminal.size().unwrap_or_default();
    if current_size.width <= 10 || current_size.height <= 10 {
        return;
    }

    let mut layout = LayoutAreas::new(current_size);

    let result = terminal.draw(|f| {
        layout.update(f.area(), app.settings.full_screen, app.state.show_logs);

        if !app.settings.full_screen {
            draw_tabs(f, layout.tab_bar, app);
        }

        match app.state.active_tab {
            MenuItem::Leaderboard => draw_leaderboard(f, layout.main, app),
            MenuItem::Picks => draw_picks(f, layout.main, app),
            MenuItem::Results => draw_results(f, layout.main, app),
            MenuItem::Help => draw_help(f, layout.main),
        }

        if let Some(logs) = layout.logs {
            draw_logs(f, logs);
        }
        if app.state.prompt.is_some() {
            draw_prompt(f, f.area(), app);
        }

        draw_loading_spinner(f, f.area(), app, loading);
    });
    if let Err(e) = result {
        error!("draw failed: {e}");
    }
}

pub fn default_border<'a>(color: Color) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(color))
}

fn draw_tabs(f: &mut Frame, tab_bar: [Rect; 2], app: &App) {
    let style = Style::default().fg(Color::White);
    let border_type = BorderType::Rounded;

    let tab_index = match app.state.active_tab {
        MenuItem::Leaderboard => 0,
        MenuItem::Picks => 1,
        MenuItem::Results => 2,
        MenuItem::Help => 0,
    };

    let titles: Vec<Line> = TABS.iter().map(|t| Line::from(*t)).collect();
    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .borders(Borders::LEFT | Borders::BOTTOM | Borders::TOP)
                .border_type(border_type),
        )
        .highlight_style(Style::default().add_modifier(Modifier::UNDERLINED))
        .select(tab_index)
        .style(style);
    f.render_widget(tabs, tab_bar[0]);

    let help = Paragraph::new("Help: ? ")
        .alignment(Alignment::Right)
        .block(
            Block::default()
                .borders(Borders::RIGHT | Borders::BOTTOM | Borders::TOP)
                .border_type(border_type),
        )
        .style(style);
    f.render_widget(help, tab_bar[1]);
}

// ---------------------------------------------------------------------------
// Leaderboard
// ---------------------------------------------------------------------------

fn draw_leaderboard(f: &mut Frame, area: Rect, app: &App) {
    let pool = &app.state.pool;
    let title = format!(" Leaderboard: {} ", pool.selection.name());
    let block = default_border(Color::White).title(title);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let Some(season) = pool.season.as_ref() else {
        draw_waiting(f, inner, app, "Loading pool...");
        return;
    };

    let [what_if_area, status_area, table_area] = Layout::vertical([
        Constraint::Length(2),
        Constraint::Length(1),
        Constraint::Fill(1),
    ])
    .areas(inner);

    draw_what_if(f, what_if_area, app, &season.teams);

    let status = if let Some(err) = app.state.last_error.as_deref() {
        Span::styled(err.to_string(), Style::default().fg(Color::Red))
    } else if pool.is_locked() {
        Span::styled("This group needs a password: press u", resolve(Tone::Accent))
    } else if !pool.games_started() {
        Span::styled("Other players' picks are hidden until the games start", resolve(Tone::Dim))
    } else {
        Span::styled(format!("{} season", season.year), resolve(Tone::Dim))
    };
    f.render_widget(Paragraph::new(Line::from(status)), status_area);

    let standings = app.standings();
    if standings.is_empty() {
        f.render_widget(
            Paragraph::new("No brackets in this group yet")
                .style(resolve(Tone::Dim))
                .alignment(Alignment::Center),
            table_area,
        );
        return;
    }

    let rows = standings.iter().enumerate().map(|(i, standing)| {
        let row = standing_row(i, standing, &season.teams);
        if i == app.state.leaderboard.selected_entry {
            row.style(resolve(Tone::Selected))
        } else if standing.owned {
            row.style(resolve(Tone::Primary))
        } else {
            row
        }
    });

    let header = Row::new(["#", "Bracket", "Group", "Pts", "Max", "Champion", "Tiebreak"])
        .style(resolve(Tone::Accent));
    let table = Table::new(
        rows,
        [
            Constraint::Length(4),
            Constraint::Fill(2),
            Constraint::Fill(1),
            Constraint::Length(4),
            Constraint::Length(4),
            Constraint::Fill(2),
            Constraint::Length(9),
        ],
    )
    .header(header)
    .column_spacing(1);
    f.render_widget(table, table_area);
}

fn standing_row<'a>(index: usize, standing: &Standing, teams: &SeedTable) -> Row<'a> {
    let Some(score) = standing.score else {
        return Row::new(vec![
            Cell::from(format!("{}", index + 1)),
            Cell::from(standing.label()),
            Cell::from(standing.group.clone()),
            Cell::from("?"),
            Cell::from("?"),
            Cell::from("?"),
            Cell::from("?"),
        ])
        .style(resolve(Tone::Dim));
    };
    let champion = score
        .champion
        .map(|seed| teams.display(Some(seed)))
        .unwrap_or_else(|| "-".to_string());
    Row::new(vec![
        Cell::from(format!("{}", index + 1)),
        Cell::from(standing.label()),
        Cell::from(standing.group.clone()),
        Cell::from(score.points.to_string()),
        Cell::from(score.max_points.to_string()),
        Cell::from(champion),
        Cell::from(standing.tiebreaker.to_string()),
    ])
}

/// One toggle per game of the current round, official winners locked in.
fn draw_what_if(f: &mut Frame, area: Rect, app: &App, teams: &SeedTable) {
    let results = app.state.pool.results();
    let current = derive_current_round(&results);
    let board = &app.state.leaderboard;

    let mut spans = vec![Span::styled(
        format!("What if ({}): ", current.kind.label()),
        resolve(Tone::Accent),
    )];
    for (i, game) in current.games.iter().enumerate() {
        let official = results.get(current.offset + i);
        let choice = if official.is_decided() {
            official
        } else {
            board.what_if.get(i).copied().unwrap_or_default()
        };
        let label = match choice {
            Outcome::Home => teams.display(game.home),
            Outcome::Away => teams.display(game.away),
            Outcome::Undecided => format!(
                "{} / {}",
                teams.display(game.home),
                teams.display(game.away)
            ),
        };
        let style = if i == board.selected_game {
            resolve(Tone::Selected)
        } else if official.is_decided() {
            resolve(Tone::Dim)
        } else if choice.is_decided() {
            resolve(Tone::Winner)
        } else {
            Style::default()
        };
        spans.push(Span::styled(format!("[{label}]"), style));
        spans.push(Span::raw(" "));
    }

    f.render_widget(
        Paragraph::new(vec![
            Line::from(spans),
            Line::from(Span::styled(
                "←/→ game  h/a/x what-if  g group  Enter open  r reload",
                resolve(Tone::Dim),
            )),
        ]),
        area,
    );
}

// ---------------------------------------------------------------------------
// Picks and results
// ---------------------------------------------------------------------------

fn draw_picks(f: &mut Frame, area: Rect, app: &App) {
    let picks = &app.state.picks;
    let title = match &picks.opened {
        Some(opened) if opened.owned => format!(" Editing {} #{} ", opened.player, opened.index + 1),
        Some(opened) => format!(" Viewing {} #{} ", opened.player, opened.index + 1),
        None => format!(" New bracket for {} ", app.state.pool.selection.name()),
    };
    let block = default_border(Color::White).title(title);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let Some(season) = app.state.pool.season.as_ref() else {
        draw_waiting(f, inner, app, "Loading teams...");
        return;
    };

    let [bracket_area, info_area] =
        Layout::vertical([Constraint::Length(GRID_HEIGHT), Constraint::Fill(1)]).areas(inner);

    let tournament = derive_all_games(&picks.draft.picks);
    let grid = BracketGrid::compute(bracket_area.width);
    let results = season.results;
    f.render_widget(
        TournamentView {
            tournament: &tournament,
            teams: &season.teams,
            grid: &grid,
            selected: Some(picks.selected),
            results: Some(&results),
            table: &app.state.pool.table,
        },
        bracket_area,
    );

    let score = app.state.pool.table.score(&picks.draft.picks, &results);
    let tiebreaker = if picks.draft.tiebreaker.is_empty() {
        "_".to_string()
    } else {
        picks.draft.tiebreaker.clone()
    };
    let mut lines = vec![
        Line::from(vec![
            Span::styled(format!("{}: ", round_label(picks.selected)), resolve(Tone::Accent)),
            Span::raw(format!(
                "{} of 13 picked   tiebreaker {tiebreaker}   {} pts, {} max",
                picks.draft.picks.decided_count(),
                score.points,
                score.max_points
            )),
        ]),
        Line::from(Span::styled(
            "↑/↓ game  h/a/x pick  0-9 tiebreaker  s save  d delete  n new  Tab leaderboard",
            resolve(Tone::Dim),
        )),
    ];
    if let Some(status) = picks.status.as_deref() {
        lines.push(Line::from(Span::styled(status.to_string(), resolve(Tone::Primary))));
    }
    if let Some(err) = app.state.last_error.as_deref() {
        lines.push(Line::from(Span::styled(err.to_string(), Style::default().fg(Color::Red))));
    }
    f.render_widget(Paragraph::new(lines), info_area);
}

fn draw_results(f: &mut Frame, area: Rect, app: &App) {
    let block = default_border(Color::White).title(" Results ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let Some(season) = app.state.pool.season.as_ref() else {
        draw_waiting(f, inner, app, "Loading results...");
        return;
    };

    let [bracket_area, info_area] =
        Layout::vertical([Constraint::Length(GRID_HEIGHT), Constraint::Fill(1)]).areas(inner);
    let tournament = derive_all_games(&season.results);
    let grid = BracketGrid::compute(bracket_area.width);
    f.render_widget(
        TournamentView {
            tournament: &tournament,
            teams: &season.teams,
            grid: &grid,
            selected: None,
            results: None,
            table: &app.state.pool.table,
        },
        bracket_area,
    );

    let current = derive_current_round(&season.results);
    let summary = match tournament.champion() {
        Some(champion) => format!("{} champion: {}", season.year, season.teams.display(Some(champion))),
        None => format!(
            "{} season, {} of 13 games played, current round: {}",
            season.year,
            season.results.decided_count(),
            current.kind.label()
        ),
    };
    f.render_widget(Paragraph::new(summary).style(resolve(Tone::Dim)), info_area);
}

// ---------------------------------------------------------------------------
// Shared pieces
// ---------------------------------------------------------------------------

fn draw_waiting(f: &mut Frame, area: Rect, app: &App, loading_msg: &str) {
    let msg = if let Some(err) = app.state.last_error.as_deref() {
        format!("Load failed:\n{err}")
    } else {
        loading_msg.to_string()
    };
    f.render_widget(
        Paragraph::new(msg)
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center),
        area,
    );
}

fn draw_help(f: &mut Frame, area: Rect) {
    let block = default_border(Color::DarkGray).title(" Help ");
    let inner = block.inner(area);
    f.render_widget(block, area);
    f.render_widget(Paragraph::new(HELP_TEXT).style(Style::default().fg(Color::Gray)), inner);
}

fn draw_logs(f: &mut Frame, area: Rect) {
    let logs = TuiLoggerWidget::default()
        .block(default_border(Color::DarkGray).title(" Logs "))
        .style_error(Style::default().fg(Color::Red))
        .style_warn(Style::default().fg(Color::Yellow))
        .style_info(Style::default().fg(Color::Gray));
    f.render_widget(logs, area);
}

fn draw_prompt(f: &mut Frame, area: Rect, app: &App) {
    let Some(prompt) = app.state.prompt.as_ref() else {
        return;
    };
    let width = area.width.min(40);
    let popup = Rect::new(
        area.x + (area.width - width) / 2,
        area.y + area.height.saturating_sub(3) / 2,
        width,
        3.min(area.height),
    );
    f.render_widget(Clear, popup);
    f.render_widget(
        Paragraph::new(format!("{}▏", prompt.display()))
            .block(default_border(Color::Yellow).title(prompt.title())),
        popup,
    );
}

fn draw_loading_spinner(f: &mut Frame, area: Rect, app: &App, loading: LoadingState) {
    if !loading.is_loading && loading.spinner_char != ERROR_CHAR {
        return;
    }
    let style = match loading.spinner_char {
        ERROR_CHAR => Style::default().fg(Color::Red),
        _ => Style::default().fg(Color::White),
    };
    let spinner = Paragraph::new(loading.spinner_char.to_string())
        .alignment(Alignment::Right)
        .style(style);
    let area = if app.settings.full_screen {
        Rect::new(area.width.saturating_sub(3), area.height.saturating_sub(2), 1, 1)
    } else {
        Rect::new(area.width.saturating_sub(11), 1, 1, 1)
    };
    f.render_widget(spinner, area);
}
