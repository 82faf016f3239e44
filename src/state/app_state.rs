use crate::app::MenuItem;
use crate::state::messages::SubmitRequest;
use playoff_api::bracket::{CurrentRound, derive_all_games, derive_current_round};
use playoff_api::leaderboard::{
    self, GroupSelection, Standing, Viewer, known_groups, visible_players, what_if_results,
};
use playoff_api::records::{
    BracketEntry, GroupInfo, PlayerRecord, PoolRecord, ValidationError, partition,
    validate_complete_picks, validate_tiebreaker,
};
use playoff_api::score::ScoringTable;
use playoff_api::{Outcome, PICK_COUNT, Picks, Season};
use serde::{Deserialize, Serialize};

/// Longest tiebreaker the editor accepts; always fits a `u32`.
const TIEBREAKER_MAX_DIGITS: usize = 9;

// ---------------------------------------------------------------------------
// Pool data: season, players and groups of the year
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct PoolState {
    pub season: Option<Season>,
    pub players: Vec<PlayerRecord>,
    pub groups: Vec<GroupInfo>,
    pub selection: GroupSelection,
    /// Password-protected groups opened this session.
    pub unlocked: Vec<String>,
    pub table: ScoringTable,
}

impl PoolState {
    pub fn load(&mut self, season: Season, records: Vec<PoolRecord>) {
        let (players, groups) = partition(records);
        self.players = players;
        self.groups = groups;
        self.season = Some(season);
    }

    pub fn results(&self) -> Picks {
        self.season.as_ref().map(|s| s.results).unwrap_or_default()
    }

    pub fn games_started(&self) -> bool {
        self.season.as_ref().is_some_and(|s| s.games_started)
    }

    pub fn group_names(&self) -> Vec<String> {
        known_groups(&self.players, &self.groups)
    }

    pub fn cycle_group(&mut self) {
        let names = self.group_names();
        let current = names
            .iter()
            .position(|n| n == self.selection.name())
            .unwrap_or(0);
        let next = &names[(current + 1) % names.len()];
        self.selection = GroupSelection::from_name(next);
    }

    pub fn selected_group_info(&self) -> Option<&GroupInfo> {
        match &self.selection {
            GroupSelection::All => None,
            GroupSelection::Group(name) => self.groups.iter().find(|g| g.key.group == *name),
        }
    }

    /// The selected group needs a password this session has not given yet.
    pub fn is_locked(&self) -> bool {
        self.selected_group_info()
            .is_some_and(|g| g.is_locked() && !self.unlocked.contains(&g.key.group))
    }

    /// Returns false when the password does not open the selected group.
    pub fn unlock(&mut self, password: &str) -> bool {
        let Some(group) = self.selected_group_info() else {
            return true;
        };
        if !group.unlocks(password) {
            return false;
        }
        let name = group.key.group.clone();
        if !self.unlocked.contains(&name) {
            self.unlocked.push(name);
        }
        true
    }

    pub fn standings(&self, device_id: &str, results: &Picks) -> Vec<Standing> {
        let players = visible_players(&self.players, &self.groups, &self.selection, &self.unlocked);
        let viewer = Viewer { device_id, games_started: self.games_started() };
        leaderboard::build(&players, results, &self.table, viewer)
    }
}

// ---------------------------------------------------------------------------
// Leaderboard: entry selection and what-if toggles
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct LeaderboardState {
    pub selected_entry: usize,
    pub selected_game: usize,
    /// Hypothetical winners for the current round, one per game.
    pub what_if: Vec<Outcome>,
    /// Results the toggles were last reset against.
    what_if_base: Option<Picks>,
}

impl LeaderboardState {
    /// Start the toggles from the official winners, unless the results are
    /// unchanged since the last reset.
    pub fn sync(&mut self, results: &Picks) {
        if self.what_if_base.as_ref() == Some(results) {
            return;
        }
        let current = derive_current_round(results);
        self.what_if = current.picks();
        self.what_if_base = Some(*results);
        self.selected_game = self.selected_game.min(self.what_if.len().saturating_sub(1));
    }

    pub fn current_round(&self, results: &Picks) -> CurrentRound {
        derive_current_round(results)
    }

    /// Official results with the toggles spliced into the open games.
    pub fn effective_results(&self, results: &Picks) -> Picks {
        what_if_results(results, &derive_current_round(results), &self.what_if)
    }

    pub fn next_game(&mut self) {
        if self.selected_game + 1 < self.what_if.len() {
            self.selected_game += 1;
        }
    }

    pub fn prev_game(&mut self) {
        self.selected_game = self.selected_game.saturating_sub(1);
    }

    /// Set the hypothetical winner of the selected game. Decided games and
    /// sides without a team are left alone.
    pub fn set_what_if(&mut self, results: &Picks, outcome: Outcome) -> bool {
        let current = derive_current_round(results);
        let position = current.offset + self.selected_game;
        if results.get(position).is_decided() {
            return false;
        }
        let Some(game) = current.games.get(self.selected_game) else {
            return false;
        };
        let team_present = match outcome {
            Outcome::Home => game.home.is_some(),
            Outcome::Away => game.away.is_some(),
            Outcome::Undecided => true,
        };
        if !team_present {
            return false;
        }
        if let Some(slot) = self.what_if.get_mut(self.selected_game) {
            *slot = outcome;
        }
        true
    }

    pub fn entry_down(&mut self, count: usize) {
        if self.selected_entry + 1 < count {
            self.selected_entry += 1;
        }
    }

    pub fn entry_up(&mut self) {
        self.selected_entry = self.selected_entry.saturating_sub(1);
    }
}

// ---------------------------------------------------------------------------
// Picks editor
// ---------------------------------------------------------------------------

/// The bracket being edited, saved between sessions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Draft {
    pub picks: Picks,
    pub tiebreaker: String,
}

impl Draft {
    pub fn to_entry(&self) -> Result<BracketEntry, ValidationError> {
        let picks = validate_complete_picks(&self.picks.to_string())?;
        let tiebreaker = validate_tiebreaker(&self.tiebreaker)?;
        Ok(BracketEntry { picks, tiebreaker })
    }
}

/// A stored bracket opened from the leaderboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenedBracket {
    pub group: String,
    pub player: String,
    pub index: usize,
    pub owned: bool,
}

#[derive(Debug, Default)]
pub struct PicksState {
    pub draft: Draft,
    /// Pick-string position under the cursor.
    pub selected: usize,
    pub opened: Option<OpenedBracket>,
    pub status: Option<String>,
    /// A name clash is waiting for the user to confirm joining.
    pub pending_join: bool,
    pub last_request: Option<SubmitRequest>,
}

impl PicksState {
    pub fn select_down(&mut self) {
        if self.selected + 1 < PICK_COUNT {
            self.selected += 1;
        }
    }

    pub fn select_up(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    /// Pick a side of the selected game and move to the next one.
    pub fn pick(&mut self, outcome: Outcome) -> bool {
        let game = derive_all_games(&self.draft.picks).games()[self.selected];
        let team_present = match outcome {
            Outcome::Home => game.home.is_some(),
            Outcome::Away => game.away.is_some(),
            Outcome::Undecided => true,
        };
        if !team_present {
            return false;
        }
        self.draft.picks.set(self.selected, outcome);
        if outcome.is_decided() {
            self.select_down();
        }
        true
    }

    pub fn push_digit(&mut self, digit: char) {
        if digit.is_ascii_digit() && self.draft.tiebreaker.len() < TIEBREAKER_MAX_DIGITS {
            self.draft.tiebreaker.push(digit);
        }
    }

    pub fn pop_digit(&mut self) {
        self.draft.tiebreaker.pop();
    }

    pub fn open(&mut self, standing: &Standing) {
        self.draft = Draft {
            picks: standing.picks,
            tiebreaker: standing.tiebreaker.to_string(),
        };
        self.opened = Some(OpenedBracket {
            group: standing.group.clone(),
            player: standing.player.clone(),
            index: standing.bracket_index,
            owned: standing.owned,
        });
        self.selected = 0;
        self.status = None;
        self.pending_join = false;
    }

    pub fn start_new(&mut self) {
        *self = Self::default();
    }

    /// The opened bracket, when this device may change it.
    pub fn owned_bracket(&self) -> Option<&OpenedBracket> {
        self.opened.as_ref().filter(|o| o.owned)
    }
}

// ---------------------------------------------------------------------------
// Text prompts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    Password,
    DisplayName,
}

#[derive(Debug, Clone)]
pub struct Prompt {
    pub kind: PromptKind,
    pub input: String,
}

impl Prompt {
    pub fn new(kind: PromptKind) -> Self {
        Self { kind, input: String::new() }
    }

    pub fn title(&self) -> &'static str {
        match self.kind {
            PromptKind::Password => " Group password ",
            PromptKind::DisplayName => " Display name ",
        }
    }

    /// What the prompt shows while typing; passwords are masked.
    pub fn display(&self) -> String {
        match self.kind {
            PromptKind::Password => "*".repeat(self.input.chars().count()),
            PromptKind::DisplayName => self.input.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Root app state
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct AppState {
    pub active_tab: MenuItem,
    pub previous_tab: MenuItem,
    pub show_logs: bool,
    pub last_error: Option<String>,
    pub pool: PoolState,
    pub leaderboard: LeaderboardState,
    pub picks: PicksState,
    pub prompt: Option<Prompt>,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }
}
