use playoff_api::score::ScoringTable;
use playoff_api::{Game, Outcome, PICK_COUNT, Picks, RoundKind, Seed, SeedTable, Tournament};
use tui::buffer::Buffer;
use tui::layout::Rect;
use tui::style::Style;
use tui::widgets::Widget;

use crate::components::palette::{Tone, resolve};

// ---------------------------------------------------------------------------
// Layout constants
// ---------------------------------------------------------------------------

/// Rows per game cell: home-team line, status line, away-team line.
pub const GAME_HEIGHT: u16 = 3;

/// Header row plus three stacked wild card games per conference.
pub const GRID_HEIGHT: u16 = 1 + 3 * (GAME_HEIGHT + 1) - 1;

/// Width of the gap between adjacent columns, where connectors are drawn.
pub const CONNECTOR_WIDTH: u16 = 3;

/// Maximum game cell width in wider terminals.
const CELL_W_FULL: u16 = 18;

/// AFC WC | AFC DIV | AFC CONF | FINAL | NFC CONF | NFC DIV | NFC WC
const COLUMN_COUNT: u16 = 7;

const COLUMN_TITLES: [&str; COLUMN_COUNT as usize] =
    ["AFC WILD CARD", "AFC DIV", "AFC CONF", "SUPER BOWL", "NFC CONF", "NFC DIV", "NFC WILD CARD"];

/// Column and center row of every pick position, in pick-string order.
const PLACEMENT: [(u16, u16); PICK_COUNT] = [
    (0, 2),
    (0, 6),
    (0, 10), // AFC wild card
    (6, 2),
    (6, 6),
    (6, 10), // NFC wild card
    (1, 4),
    (1, 8), // AFC divisional
    (5, 4),
    (5, 8),  // NFC divisional
    (2, 6),  // AFC championship
    (4, 6),  // NFC championship
    (3, 6),  // final
];

// ---------------------------------------------------------------------------
// BracketGrid: pre-computed cell positions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct GameCell {
    /// Row of the status line, relative to the grid origin.
    pub center_row: u16,
    pub col: u16,
    pub cell_width: u16,
    /// Pick-string position of the game shown here.
    pub position: usize,
}

#[derive(Debug, Clone)]
pub struct BracketGrid {
    /// One cell per pick position, in pick-string order.
    pub cells: Vec<GameCell>,
    /// Starting x of each of the seven columns.
    pub column_x: [u16; COLUMN_COUNT as usize],
    pub cell_width: u16,
}

impl BracketGrid {
    /// Fit seven columns and six connector gaps into `width`.
    pub fn compute(width: u16) -> Self {
        let per_col = width.saturating_sub(CONNECTOR_WIDTH * (COLUMN_COUNT - 1)) / COLUMN_COUNT;
        let cell_width = per_col.clamp(1, CELL_W_FULL);
        let stride = cell_width + CONNECTOR_WIDTH;

        let mut column_x = [0u16; COLUMN_COUNT as usize];
        for (i, x) in column_x.iter_mut().enumerate() {
            *x = stride * i as u16;
        }

        let cells = PLACEMENT
            .iter()
            .enumerate()
            .map(|(position, &(column, center_row))| GameCell {
                center_row,
                col: column_x[column as usize],
                cell_width,
                position,
            })
            .collect();

        Self { cells, column_x, cell_width }
    }

    pub fn total_width(&self) -> u16 {
        self.column_x[COLUMN_COUNT as usize - 1] + self.cell_width
    }
}

// ---------------------------------------------------------------------------
// TournamentView widget
// ---------------------------------------------------------------------------

/// Renders the whole bracket, AFC on the left and NFC on the right, meeting
/// at the final in the middle column.
pub struct TournamentView<'a> {
    pub tournament: &'a Tournament,
    pub teams: &'a SeedTable,
    pub grid: &'a BracketGrid,
    /// Pick position under the cursor, if any.
    pub selected: Option<usize>,
    /// Official results to mark picks against. `None` when the bracket shown
    /// is the results themselves.
    pub results: Option<&'a Picks>,
    pub table: &'a ScoringTable,
}

impl<'a> Widget for TournamentView<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width < 20 || area.height < GAME_HEIGHT {
            return;
        }

        let x0 = area.x + area.width.saturating_sub(self.grid.total_width()) / 2;
        let origin = Rect::new(x0, area.y, area.width - (x0 - area.x), area.height);
        let dim = resolve(Tone::Dim);

        for (i, title) in COLUMN_TITLES.iter().enumerate() {
            let text: String = title.chars().take(self.grid.cell_width as usize).collect();
            put_str(buf, origin, origin.x + self.grid.column_x[i], 0, &text, resolve(Tone::Accent));
        }

        let games = self.tournament.games();
        for cell in &self.grid.cells {
            let selected = self.selected == Some(cell.position);
            let result = self.results.map(|r| r.get(cell.position));
            draw_game_cell(&games[cell.position], cell, selected, result, &self, origin, buf);
        }

        // Divisional games feed the championship on each side.
        let afc_gap = origin.x + self.grid.column_x[1] + self.grid.cell_width;
        draw_connector(4, 6, 8, afc_gap, origin, false, buf);
        let nfc_gap = origin.x + self.grid.column_x[4] + self.grid.cell_width;
        draw_connector(4, 6, 8, nfc_gap, origin, true, buf);

        // Championships feed the final.
        for column in [2usize, 3] {
            let start = origin.x + self.grid.column_x[column] + self.grid.cell_width;
            for x in start..start + CONNECTOR_WIDTH {
                put_char(buf, origin, x, 6, '─', dim);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Drawing helpers
// ---------------------------------------------------------------------------

fn draw_game_cell(
    game: &Game,
    cell: &GameCell,
    selected: bool,
    result: Option<Outcome>,
    view: &TournamentView<'_>,
    origin: Rect,
    buf: &mut Buffer,
) {
    let x = origin.x + cell.col;
    let width = cell.cell_width as usize;
    let base = if selected {
        resolve(Tone::Selected)
    } else {
        Style::default()
    };

    let sides = [(Outcome::Home, game.home), (Outcome::Away, game.away)];
    for (row, (side, seed)) in [cell.center_row - 1, cell.center_row + 1].into_iter().zip(sides) {
        let line = format_team_line(seed, view.teams, width);
        let style = if game.winner != side {
            base
        } else {
            match result {
                Some(r) if r.is_decided() && r != side => base.patch(resolve(Tone::Miss)),
                _ => base.patch(resolve(Tone::Winner)),
            }
        };
        put_str(buf, origin, x, row, &line, style);
    }

    let (status, tone) = status_text(game, cell.position, result, view.table);
    let status = format_status_line(&status, width);
    put_str(buf, origin, x, cell.center_row, &status, base.patch(resolve(tone)));
}

/// `A1 Chiefs` padded or clipped to exactly `width` columns.
pub fn format_team_line(seed: Option<Seed>, teams: &SeedTable, width: usize) -> String {
    let label = seed.map(|s| s.to_string()).unwrap_or_else(|| "--".to_string());
    let name = match seed {
        Some(seed) => teams.name(seed).unwrap_or("").to_string(),
        None => "TBD".to_string(),
    };
    let line = format!("{label} {name}");
    format!("{:<width$}", line.chars().take(width).collect::<String>(), width = width)
}

fn format_status_line(text: &str, width: usize) -> String {
    let clipped: String = text.chars().take(width).collect();
    format!("{clipped:<width$}", width = width)
}

/// What the middle row of a game says: the pick's fate once a result is in.
fn status_text(
    game: &Game,
    position: usize,
    result: Option<Outcome>,
    table: &ScoringTable,
) -> (String, Tone) {
    let weight = table.weight(position);
    match (game.winner, result) {
        (Outcome::Undecided, _) => ("  ·".to_string(), Tone::Dim),
        (_, None) => ("  ✓ final".to_string(), Tone::Primary),
        (_, Some(Outcome::Undecided)) => (format!("  {weight} pt"), Tone::Dim),
        (pick, Some(r)) if pick == r => (format!("  +{weight}"), Tone::Winner),
        _ => ("  ✗".to_string(), Tone::Miss),
    }
}

/// Box-drawing connector from two child rows to a parent row.
///
/// ```text
///  child_top  ──┐
///               ├──  parent
///  child_bot  ──┘
/// ```
///
/// Mirrored draws the children on the right and the parent on the left.
fn draw_connector(r_top: u16, r_mid: u16, r_bot: u16, x: u16, origin: Rect, mirrored: bool, buf: &mut Buffer) {
    let style = resolve(Tone::Dim);
    let (outer, middle, inner) = (x, x + 1, x + 2);

    if mirrored {
        put_char(buf, origin, middle, r_top, '┌', style);
        put_char(buf, origin, inner, r_top, '─', style);
        put_char(buf, origin, outer, r_mid, '─', style);
        put_char(buf, origin, middle, r_mid, '┤', style);
        put_char(buf, origin, middle, r_bot, '└', style);
        put_char(buf, origin, inner, r_bot, '─', style);
    } else {
        put_char(buf, origin, outer, r_top, '─', style);
        put_char(buf, origin, middle, r_top, '┐', style);
        put_char(buf, origin, outer, r_bot, '─', style);
        put_char(buf, origin, middle, r_bot, '┘', style);
        put_char(buf, origin, middle, r_mid, '├', style);
        put_char(buf, origin, inner, r_mid, '─', style);
    }
    for row in (r_top + 1..r_bot).filter(|&r| r != r_mid) {
        put_char(buf, origin, middle, row, '│', style);
    }
}

fn put_str(buf: &mut Buffer, origin: Rect, x: u16, row: u16, text: &str, style: Style) {
    if row >= origin.height || x >= origin.x + origin.width {
        return;
    }
    let room = (origin.x + origin.width - x) as usize;
    let text: String = text.chars().take(room).collect();
    buf.set_string(x, origin.y + row, text, style);
}

fn put_char(buf: &mut Buffer, origin: Rect, x: u16, row: u16, ch: char, style: Style) {
    if row >= origin.height || x >= origin.x + origin.width {
        return;
    }
    if let Some(cell) = buf.cell_mut((x, origin.y + row)) {
        cell.set_char(ch);
        cell.set_style(style);
    }
}

/// Round label for the column holding `position`.
pub fn round_label(position: usize) -> &'static str {
    RoundKind::of_position(position).label()
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use playoff_api::Conference;
    use playoff_api::bracket::derive_all_games;

    fn teams() -> SeedTable {
        let mut teams = SeedTable::new();
        teams.insert(Seed::new(Conference::Afc, 1), "Chiefs");
        teams.insert(Seed::new(Conference::Nfc, 1), "Lions");
        teams
    }

    #[test]
    fn test_grid_has_one_cell_per_pick() {
        let grid = BracketGrid::compute(160);
        assert_eq!(grid.cells.len(), PICK_COUNT);
        for (i, cell) in grid.cells.iter().enumerate() {
            assert_eq!(cell.position, i);
        }
    }

    #[test]
    fn test_games_fit_inside_the_grid() {
        let grid = BracketGrid::compute(160);
        for cell in &grid.cells {
            assert!(cell.center_row >= 2, "header row is reserved");
            assert!(cell.center_row + 1 < GRID_HEIGHT);
        }
    }

    #[test]
    fn test_championship_sits_between_its_divisional_games() {
        let grid = BracketGrid::compute(160);
        let rows = |range: std::ops::Range<usize>| -> Vec<u16> {
            grid.cells[range].iter().map(|c| c.center_row).collect()
        };
        let afc_div = rows(6..8);
        assert_eq!(grid.cells[10].center_row, (afc_div[0] + afc_div[1]) / 2);
        let nfc_div = rows(8..10);
        assert_eq!(grid.cells[11].center_row, (nfc_div[0] + nfc_div[1]) / 2);
        assert_eq!(grid.cells[12].center_row, grid.cells[10].center_row);
    }

    #[test]
    fn test_conferences_mirror_each_other() {
        let grid = BracketGrid::compute(160);
        let last = grid.column_x[COLUMN_COUNT as usize - 1];
        for afc in 0..3 {
            assert_eq!(grid.cells[afc].col, 0);
            assert_eq!(grid.cells[afc + 3].col, last);
        }
        assert!(grid.cells[10].col < grid.cells[12].col);
        assert!(grid.cells[12].col < grid.cells[11].col);
    }

    #[test]
    fn test_cell_width_is_computed_from_available_width() {
        let width: u16 = 120;
        let expected = (width - CONNECTOR_WIDTH * 6) / 7;
        let grid = BracketGrid::compute(width);
        assert_eq!(grid.cell_width, expected);
        assert!(grid.total_width() <= width);
    }

    #[test]
    fn test_cell_width_caps_at_full_width_limit() {
        let grid = BracketGrid::compute(400);
        assert_eq!(grid.cell_width, CELL_W_FULL);
    }

    #[test]
    fn test_format_team_line_width() {
        let line = format_team_line(Some(Seed::new(Conference::Afc, 1)), &teams(), 14);
        assert_eq!(line, "A1 Chiefs     ");
        let clipped = format_team_line(Some(Seed::new(Conference::Nfc, 1)), &teams(), 4);
        assert_eq!(clipped, "N1 L");
    }

    #[test]
    fn test_format_team_line_unknown_team() {
        assert_eq!(format_team_line(None, &teams(), 6), "-- TBD");
        let line = format_team_line(Some(Seed::new(Conference::Afc, 7)), &teams(), 6);
        assert_eq!(line, "A7    ");
    }

    #[test]
    fn test_status_marks_picks_against_results() {
        let table = ScoringTable::default();
        let picked = Game::new(None, None, Outcome::Home);
        assert_eq!(status_text(&picked, 12, Some(Outcome::Home), &table).0, "  +8");
        assert_eq!(status_text(&picked, 12, Some(Outcome::Away), &table).1, Tone::Miss);
        assert_eq!(status_text(&picked, 0, Some(Outcome::Undecided), &table).0, "  1 pt");
    }

    #[test]
    fn test_render_shows_team_names() {
        let picks: Picks = "1111111111111".parse().unwrap();
        let tournament = derive_all_games(&picks);
        let teams = teams();
        let grid = BracketGrid::compute(160);
        let area = Rect::new(0, 0, 160, GRID_HEIGHT);
        let mut buf = Buffer::empty(area);
        TournamentView {
            tournament: &tournament,
            teams: &teams,
            grid: &grid,
            selected: Some(0),
            results: None,
            table: &ScoringTable::default(),
        }
        .render(area, &mut buf);

        let text: String = (0..area.height)
            .flat_map(|y| (0..area.width).map(move |x| (x, y)))
            .filter_map(|(x, y)| buf.cell((x, y)).map(|c| c.symbol().to_string()))
            .collect();
        assert!(text.contains("Chiefs"));
        assert!(text.contains("Lions"));
        assert!(text.contains("SUPER BOWL"));
    }
}
