use crate::state::app_settings::AppSettings;
use crate::state::app_state::{AppState, Draft, OpenedBracket, Prompt, PromptKind};
use crate::state::messages::SubmitRequest;
use log::{debug, warn};
use playoff_api::leaderboard::{GroupSelection, Standing};
use playoff_api::records::{
    ALL_GROUPS, BracketEntry, Edit, PlayerRecord, PoolKey, PoolRecord, RecordError, ValidationError,
};
use playoff_api::{Outcome, Picks, Season};

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub enum MenuItem {
    #[default]
    Leaderboard,
    Picks,
    Results,
    Help,
}

pub struct App {
    pub settings: AppSettings,
    pub state: AppState,
}

impl App {
    pub fn new(settings: AppSettings) -> Self {
        let mut app = Self {
            state: AppState::new(),
            settings,
        };

        if let Some(level) = app.settings.log_level {
            log::set_max_level(level);
            tui_logger::set_default_level(level);
        }

        app.state.pool.selection = GroupSelection::from_name(&app.settings.group);
        if let Ok(draft) = app.load_draft() {
            app.state.picks.draft = draft;
        }
        app
    }

    // -----------------------------------------------------------------------
    // Network response handlers, called from main_ui_loop
    // -----------------------------------------------------------------------

    pub fn on_pool_loaded(&mut self, season: Season, records: Vec<PoolRecord>) {
        self.state.last_error = None;
        if season.year != self.settings.year {
            warn!("showing the {} season instead of {}", season.year, self.settings.year);
        }
        self.state.pool.load(season, records);
        let results = self.state.pool.results();
        self.state.leaderboard.sync(&results);
        let count = self.standings().len();
        self.state.leaderboard.selected_entry =
            self.state.leaderboard.selected_entry.min(count.saturating_sub(1));
    }

    pub fn on_submitted(&mut self, player: Option<PlayerRecord>, edit: Edit) {
        self.state.picks.pending_join = false;
        self.state.picks.last_request = None;

        let saved = match (edit, player) {
            (Edit::Delete(_), _) | (_, None) => None,
            (Edit::Replace(index), Some(player)) => Some((index, player)),
            (Edit::Add, Some(player)) => Some((player.brackets.len().saturating_sub(1), player)),
        };
        let Some((index, player)) = saved else {
            self.state.picks.start_new();
            self.state.picks.status = Some("Bracket deleted".to_string());
            if let Err(e) = self.save_draft() {
                warn!("{e}");
            }
            return;
        };

        let index = index.min(player.brackets.len().saturating_sub(1));
        self.state.picks.opened = Some(OpenedBracket {
            group: player.key.group.clone(),
            player: player.name.clone(),
            index,
            owned: true,
        });
        self.state.picks.status = Some(format!("Saved as {} #{}", player.name, index + 1));
    }

    pub fn on_submit_rejected(&mut self, reason: RecordError) {
        match &reason {
            RecordError::NameTaken(_) => self.state.picks.pending_join = true,
            RecordError::MissingName => {
                self.state.prompt = Some(Prompt::new(PromptKind::DisplayName));
            }
            _ => self.state.picks.last_request = None,
        }
        let hint = if self.state.picks.pending_join { " (y to join, Esc to cancel)" } else { "" };
        self.state.picks.status = Some(format!("{reason}{hint}"));
    }

    pub fn on_error(&mut self, message: String) {
        self.state.picks.status = None;
        self.state.last_error = Some(message);
    }

    // -----------------------------------------------------------------------
    // Tab management
    // -----------------------------------------------------------------------

    pub fn update_tab(&mut self, next: MenuItem) {
        if self.state.active_tab == next {
            return;
        }
        self.state.previous_tab = self.state.active_tab;
        self.state.active_tab = next;
    }

    pub fn exit_help(&mut self) {
        if self.state.active_tab == MenuItem::Help {
            self.state.active_tab = self.state.previous_tab;
        }
    }

    pub fn toggle_show_logs(&mut self) {
        self.state.show_logs = !self.state.show_logs;
    }

    pub fn toggle_full_screen(&mut self) {
        self.settings.full_screen = !self.settings.full_screen;
    }

    // -----------------------------------------------------------------------
    // Leaderboard
    // -----------------------------------------------------------------------

    /// Ranked standings of the selected group under the current what-if toggles.
    pub fn standings(&self) -> Vec<Standing> {
        let results = self.effective_results();
        self.state.pool.standings(&self.settings.device_id, &results)
    }

    pub fn effective_results(&self) -> Picks {
        self.state
            .leaderboard
            .effective_results(&self.state.pool.results())
    }

    pub fn leaderboard_entry_down(&mut self) {
        let count = self.standings().len();
        self.state.leaderboard.entry_down(count);
    }

    pub fn leaderboard_entry_up(&mut self) {
        self.state.leaderboard.entry_up();
    }

    pub fn what_if_next_game(&mut self) {
        self.state.leaderboard.next_game();
    }

    pub fn what_if_prev_game(&mut self) {
        self.state.leaderboard.prev_game();
    }

    pub fn set_what_if(&mut self, outcome: Outcome) {
        let results = self.state.pool.results();
        if !self.state.leaderboard.set_what_if(&results, outcome) {
            debug!("what-if ignored for game {}", self.state.leaderboard.selected_game);
        }
    }

    pub fn cycle_group(&mut self) {
        self.state.pool.cycle_group();
        self.state.leaderboard.selected_entry = 0;
    }

    pub fn start_unlock(&mut self) {
        if self.state.pool.is_locked() {
            self.state.prompt = Some(Prompt::new(PromptKind::Password));
        }
    }

    /// Open the selected leaderboard entry in the picks editor.
    pub fn open_selected_entry(&mut self) {
        let standings = self.standings();
        let Some(standing) = standings.get(self.state.leaderboard.selected_entry) else {
            return;
        };
        if standing.is_hidden() {
            self.state.last_error =
                Some(format!("{} is hidden until the games start", standing.label()));
            return;
        }
        self.state.picks.open(standing);
        self.update_tab(MenuItem::Picks);
    }

    // -----------------------------------------------------------------------
    // Picks editor
    // -----------------------------------------------------------------------

    pub fn pick(&mut self, outcome: Outcome) {
        if self.state.picks.pick(outcome) {
            self.after_draft_change();
        }
    }

    pub fn push_tiebreaker_digit(&mut self, digit: char) {
        self.state.picks.push_digit(digit);
        self.after_draft_change();
    }

    pub fn pop_tiebreaker_digit(&mut self) {
        self.state.picks.pop_digit();
        self.after_draft_change();
    }

    pub fn new_bracket(&mut self) {
        self.state.picks.start_new();
        if let Err(e) = self.save_draft() {
            warn!("{e}");
        }
    }

    /// Build the request for `s` (save) or `d` (delete), or explain why not.
    pub fn prepare_submit(&mut self, delete: bool) -> Option<SubmitRequest> {
        let picks = &self.state.picks;
        let (group, edit) = match (picks.owned_bracket(), delete) {
            (Some(opened), true) => (opened.group.clone(), Edit::Delete(opened.index)),
            (Some(opened), false) => (opened.group.clone(), Edit::Replace(opened.index)),
            (None, true) => {
                self.state.picks.status = Some("Open one of your brackets to delete it".into());
                return None;
            }
            (None, false) => (self.state.pool.selection.name().to_string(), Edit::Add),
        };
        if group == ALL_GROUPS {
            self.state.picks.status = Some(ValidationError::AllGroup.to_string());
            return None;
        }

        let bracket = if delete {
            self.stored_bracket_for_delete()
        } else {
            self.state.picks.draft.to_entry().map_err(|e| e.to_string())
        };
        let bracket = match bracket {
            Ok(bracket) => bracket,
            Err(message) => {
                self.state.picks.status = Some(message);
                return None;
            }
        };

        let request = SubmitRequest {
            key: PoolKey::new(self.settings.year, group),
            device_id: self.settings.device_id.clone(),
            display_name: self.settings.name.clone(),
            bracket,
            edit,
            join_existing: false,
        };
        self.state.picks.status = Some(if delete { "Deleting..." } else { "Saving..." }.into());
        self.state.picks.last_request = Some(request.clone());
        Some(request)
    }

    /// Retry the rejected request after the user confirmed joining an existing name.
    pub fn confirm_join(&mut self) -> Option<SubmitRequest> {
        if !self.state.picks.pending_join {
            return None;
        }
        self.state.picks.pending_join = false;
        let mut request = self.state.picks.last_request.clone()?;
        request.join_existing = true;
        self.state.picks.last_request = Some(request.clone());
        Some(request)
    }

    pub fn cancel_join(&mut self) {
        self.state.picks.pending_join = false;
        self.state.picks.last_request = None;
        self.state.picks.status = Some("Bracket not added".into());
    }

    // -----------------------------------------------------------------------
    // Prompts
    // -----------------------------------------------------------------------

    pub fn prompt_push(&mut self, c: char) {
        if let Some(prompt) = self.state.prompt.as_mut()
            && prompt.input.chars().count() < 20
        {
            prompt.input.push(c);
        }
    }

    pub fn prompt_pop(&mut self) {
        if let Some(prompt) = self.state.prompt.as_mut() {
            prompt.input.pop();
        }
    }

    pub fn prompt_cancel(&mut self) {
        if self.state.prompt.take().is_some_and(|p| p.kind == PromptKind::DisplayName) {
            self.state.picks.last_request = None;
        }
    }

    /// Finish the prompt. A confirmed display name resubmits the pending request.
    pub fn prompt_submit(&mut self) -> Option<SubmitRequest> {
        let prompt = self.state.prompt.take()?;
        match prompt.kind {
            PromptKind::Password => {
                if !self.state.pool.unlock(&prompt.input) {
                    self.state.last_error = Some("Wrong group password".into());
                }
                None
            }
            PromptKind::DisplayName => {
                let name = prompt.input.trim().to_string();
                if name.is_empty() {
                    self.state.picks.last_request = None;
                    return None;
                }
                self.settings.name = Some(name.clone());
                let mut request = self.state.picks.last_request.clone()?;
                request.display_name = Some(name);
                self.state.picks.last_request = Some(request.clone());
                Some(request)
            }
        }
    }

    // -----------------------------------------------------------------------
    // Draft persistence
    // -----------------------------------------------------------------------

    fn after_draft_change(&mut self) {
        self.state.picks.status = None;
        if self.state.picks.opened.is_none()
            && let Err(e) = self.save_draft()
        {
            warn!("{e}");
        }
    }

    fn stored_bracket_for_delete(&self) -> Result<BracketEntry, String> {
        let opened = self
            .state
            .picks
            .owned_bracket()
            .ok_or_else(|| "Open one of your brackets to delete it".to_string())?;
        self.state
            .pool
            .players
            .iter()
            .find(|p| p.key.group == opened.group && p.name == opened.player)
            .and_then(|p| p.brackets.get(opened.index).copied())
            .ok_or_else(|| format!("{} #{} is no longer stored", opened.player, opened.index + 1))
    }

    pub fn save_draft(&self) -> Result<(), String> {
        let path = self.settings.draft_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| format!("create dir failed: {e}"))?;
        }
        let payload = serde_json::to_string_pretty(&self.state.picks.draft)
            .map_err(|e| format!("serialize draft failed: {e}"))?;
        std::fs::write(&path, payload).map_err(|e| format!("write draft failed: {e}"))?;
        Ok(())
    }

    pub fn load_draft(&self) -> Result<Draft, String> {
        let path = self.settings.draft_path();
        let content =
            std::fs::read_to_string(&path).map_err(|e| format!("read draft failed: {e}"))?;
        serde_json::from_str::<Draft>(&content).map_err(|e| format!("parse draft failed: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use playoff_api::records::{BracketEntry, GroupInfo};

    fn app(name: Option<&str>) -> App {
        let settings = AppSettings {
            year: 2025,
            group: "dev".into(),
            name: name.map(str::to_string),
            device_id: "me".into(),
            config_dir: std::env::temp_dir().join(format!("playoff-pool-test-{}", std::process::id())),
            ..AppSettings::default()
        };
        let mut app = App { settings, state: AppState::new() };
        app.state.pool.selection = GroupSelection::from_name("dev");
        app
    }

    fn complete_draft(app: &mut App) {
        app.state.picks.draft = Draft { picks: "1111111111111".parse().unwrap(), tiebreaker: "41".into() };
    }

    fn season(started: bool) -> Season {
        Season { year: 2025, games_started: started, ..Season::default() }
    }

    #[test]
    fn submitting_to_all_is_refused() {
        let mut app = app(Some("Trent"));
        complete_draft(&mut app);
        app.state.pool.selection = GroupSelection::All;
        assert!(app.prepare_submit(false).is_none());
        assert_eq!(app.state.picks.status.as_deref(), Some("Select a group to submit this bracket"));
    }

    #[test]
    fn incomplete_draft_is_not_sent() {
        let mut app = app(Some("Trent"));
        app.state.picks.draft.tiebreaker = "41".into();
        assert!(app.prepare_submit(false).is_none());
        assert!(app.state.picks.status.is_some());
    }

    #[test]
    fn new_bracket_is_added_to_the_selected_group() {
        let mut app = app(Some("Trent"));
        complete_draft(&mut app);
        let request = app.prepare_submit(false).unwrap();
        assert_eq!(request.key, PoolKey::new(2025, "dev"));
        assert_eq!(request.edit, Edit::Add);
        assert_eq!(request.bracket.tiebreaker, 41);
        assert!(!request.join_existing);
    }

    #[test]
    fn name_clash_waits_for_confirmation() {
        let mut app = app(Some("Trent"));
        complete_draft(&mut app);
        app.prepare_submit(false).unwrap();
        app.on_submit_rejected(RecordError::NameTaken("Trent".into()));
        assert!(app.state.picks.pending_join);

        let retry = app.confirm_join().unwrap();
        assert!(retry.join_existing);
        assert!(!app.state.picks.pending_join);
        assert!(app.confirm_join().is_none());
    }

    #[test]
    fn missing_name_prompts_and_resubmits() {
        let mut app = app(None);
        complete_draft(&mut app);
        app.prepare_submit(false).unwrap();
        app.on_submit_rejected(RecordError::MissingName);
        assert_eq!(app.state.prompt.as_ref().map(|p| p.kind), Some(PromptKind::DisplayName));

        for c in "Jace".chars() {
            app.prompt_push(c);
        }
        let retry = app.prompt_submit().unwrap();
        assert_eq!(retry.display_name.as_deref(), Some("Jace"));
        assert_eq!(app.settings.name.as_deref(), Some("Jace"));
        assert!(app.state.prompt.is_none());
    }

    #[test]
    fn saved_bracket_stays_open_for_editing() {
        let mut app = app(Some("Trent"));
        let player = PlayerRecord {
            key: PoolKey::new(2025, "dev"),
            name: "Trent".into(),
            brackets: vec![
                BracketEntry { picks: "1111111111111".parse().unwrap(), tiebreaker: 40 },
                BracketEntry { picks: "2222222222222".parse().unwrap(), tiebreaker: 50 },
            ],
            devices: vec!["me".into()],
        };
        app.on_submitted(Some(player), Edit::Add);
        let opened = app.state.picks.owned_bracket().unwrap();
        assert_eq!(opened.index, 1);
        assert_eq!(app.state.picks.status.as_deref(), Some("Saved as Trent #2"));

        let request = app.prepare_submit(false);
        assert_eq!(request.map(|r| r.edit), None, "the draft was not filled in");
    }

    #[test]
    fn hidden_brackets_cannot_be_opened() {
        let mut app = app(Some("Trent"));
        let other = PlayerRecord {
            key: PoolKey::new(2025, "dev"),
            name: "Jace".into(),
            brackets: vec![BracketEntry { picks: "2222222222222".parse().unwrap(), tiebreaker: 50 }],
            devices: vec!["other".into()],
        };
        app.on_pool_loaded(season(false), vec![PoolRecord::Player(other.clone())]);
        app.open_selected_entry();
        assert_eq!(app.state.active_tab, MenuItem::Leaderboard);
        assert!(app.state.last_error.is_some());

        app.on_pool_loaded(season(true), vec![PoolRecord::Player(other)]);
        app.open_selected_entry();
        assert_eq!(app.state.active_tab, MenuItem::Picks);
        assert_eq!(app.state.picks.draft.tiebreaker, "50");
        assert!(app.state.picks.owned_bracket().is_none());
    }

    #[test]
    fn wrong_password_keeps_the_group_locked() {
        let mut app = app(Some("Trent"));
        let group = GroupInfo { key: PoolKey::new(2025, "dev"), password: Some("pw".into()) };
        app.on_pool_loaded(season(true), vec![PoolRecord::Group(group)]);
        app.start_unlock();
        app.prompt_push('x');
        assert!(app.prompt_submit().is_none());
        assert!(app.state.pool.is_locked());

        app.start_unlock();
        app.prompt_push('p');
        app.prompt_push('w');
        app.prompt_submit();
        assert!(!app.state.pool.is_locked());
    }
}
