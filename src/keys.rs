use crate::app::{App, MenuItem};
use crate::state::messages::NetworkRequest;
use crossterm::event::KeyCode::Char;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use playoff_api::Outcome;
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};

pub async fn handle_key_bindings(
    key_event: KeyEvent,
    app: &Arc<Mutex<App>>,
    network_requests: &mpsc::Sender<NetworkRequest>,
) {
    let mut guard = app.lock().await;
    let mut request = None;

    if guard.state.prompt.is_some() {
        match (key_event.code, key_event.modifiers) {
            (Char('c'), KeyModifiers::CONTROL) => {
                crate::cleanup_terminal();
                std::process::exit(0);
            }
            (KeyCode::Esc, _) => guard.prompt_cancel(),
            (KeyCode::Enter, _) => request = guard.prompt_submit().map(NetworkRequest::Submit),
            (KeyCode::Backspace, _) => guard.prompt_pop(),
            (Char(c), _) => guard.prompt_push(c),
            _ => {}
        }
    } else {
        match (guard.state.active_tab, key_event.code, key_event.modifiers) {
            // Quit
            (_, Char('q'), _) | (_, Char('c'), KeyModifiers::CONTROL) => {
                crate::cleanup_terminal();
                std::process::exit(0);
            }

            // Tab switching
            (_, Char('1'), _) if guard.state.active_tab != MenuItem::Picks => {
                guard.update_tab(MenuItem::Leaderboard)
            }
            (_, Char('2'), _) if guard.state.active_tab != MenuItem::Picks => {
                guard.update_tab(MenuItem::Picks)
            }
            (_, Char('3'), _) if guard.state.active_tab != MenuItem::Picks => {
                guard.update_tab(MenuItem::Results)
            }
            (_, Char('?'), _) => guard.update_tab(MenuItem::Help),
            (MenuItem::Help, KeyCode::Esc, _) => guard.exit_help(),

            // Leaderboard
            (MenuItem::Leaderboard, Char('j') | KeyCode::Down, _) => guard.leaderboard_entry_down(),
            (MenuItem::Leaderboard, Char('k') | KeyCode::Up, _) => guard.leaderboard_entry_up(),
            (MenuItem::Leaderboard, Char('l') | KeyCode::Right, _) => guard.what_if_next_game(),
            (MenuItem::Leaderboard, KeyCode::Left, _) => guard.what_if_prev_game(),
            (MenuItem::Leaderboard, Char('h'), _) => guard.set_what_if(Outcome::Home),
            (MenuItem::Leaderboard, Char('a'), _) => guard.set_what_if(Outcome::Away),
            (MenuItem::Leaderboard, Char('x'), _) => guard.set_what_if(Outcome::Undecided),
            (MenuItem::Leaderboard, Char('g'), _) => guard.cycle_group(),
            (MenuItem::Leaderboard, Char('u'), _) => guard.start_unlock(),
            (MenuItem::Leaderboard, KeyCode::Enter, _) => guard.open_selected_entry(),
            (MenuItem::Leaderboard | MenuItem::Results, Char('r'), _) => {
                request = Some(NetworkRequest::LoadPool { year: guard.settings.year });
            }

            // Picks editor; digits belong to the tiebreaker here, so tabs use Tab/Esc
            (MenuItem::Picks, Char('j') | KeyCode::Down, _) => guard.state.picks.select_down(),
            (MenuItem::Picks, Char('k') | KeyCode::Up, _) => guard.state.picks.select_up(),
            (MenuItem::Picks, Char('h'), _) => guard.pick(Outcome::Home),
            (MenuItem::Picks, Char('a'), _) => guard.pick(Outcome::Away),
            (MenuItem::Picks, Char('x'), _) => guard.pick(Outcome::Undecided),
            (MenuItem::Picks, Char(c), _) if c.is_ascii_digit() => guard.push_tiebreaker_digit(c),
            (MenuItem::Picks, KeyCode::Backspace, _) => guard.pop_tiebreaker_digit(),
            (MenuItem::Picks, Char('n'), _) => guard.new_bracket(),
            (MenuItem::Picks, Char('s'), _) => {
                request = guard.prepare_submit(false).map(NetworkRequest::Submit);
            }
            (MenuItem::Picks, Char('d'), _) => {
                request = guard.prepare_submit(true).map(NetworkRequest::Submit);
            }
            (MenuItem::Picks, Char('y'), _) => {
                request = guard.confirm_join().map(NetworkRequest::Submit);
            }
            (MenuItem::Picks, KeyCode::Esc, _) if guard.state.picks.pending_join => {
                guard.cancel_join()
            }
            (MenuItem::Picks, KeyCode::Esc | KeyCode::Tab, _) => {
                guard.update_tab(MenuItem::Leaderboard)
            }
            (_, KeyCode::Tab, _) => guard.update_tab(MenuItem::Picks),

            // Global
            (_, Char('f'), _) => guard.toggle_full_screen(),
            (_, Char('"'), _) => guard.toggle_show_logs(),

            _ => {}
        }
    }

    if let Some(request) = request {
        drop(guard);
        let _ = network_requests.send(request).await;
    }
}
