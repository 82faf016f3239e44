//! Expands a pick or result string into the explicit game tree.
//!
//! Every function here is pure: the same picks always derive the same
//! [`Tournament`], so callers simply re-derive after every change.

use crate::{Conference, ConferenceBracket, Game, Outcome, Picks, RoundKind, Seed, Tournament};
use std::collections::VecDeque;

/// Wild-card matchups by seed rank, in pick order. Seed 1 has the bye.
const WILDCARD_PAIRINGS: [(u8, u8); 3] = [(2, 7), (3, 6), (4, 5)];

/// The three wild-card games of one conference.
///
/// The pairings are fixed by seeding and never depend on `picks`; only the
/// winners are read from it.
pub fn derive_wildcard_games(conference: Conference, picks: &[Outcome]) -> [Game; 3] {
    std::array::from_fn(|i| {
        let (home, away) = WILDCARD_PAIRINGS[i];
        Game::new(
            Some(Seed::new(conference, home)),
            Some(Seed::new(conference, away)),
            picks.get(i).copied().unwrap_or_default(),
        )
    })
}

/// The two divisional games of one conference.
///
/// The bye seed and every decided wild-card winner advance. Sorted by rank,
/// the best remaining seed hosts the worst remaining seed until the pool is
/// empty; an odd team out waits with no opponent. Slots nobody reached stay
/// [`Game::EMPTY`]. `picks` then applies to the slots by position, whatever
/// teams ended up in them.
pub fn derive_divisional_games(wildcard: &[Game; 3], bye: Seed, picks: &[Outcome]) -> [Game; 2] {
    let mut advancing: Vec<Seed> = std::iter::once(bye)
        .chain(wildcard.iter().filter_map(Game::winning_team))
        .collect();
    advancing.sort_by_key(|seed| seed.rank);

    let mut pool = VecDeque::from(advancing);
    let mut games = [Game::EMPTY; 2];
    let mut slots = games.iter_mut();
    while let Some(home) = pool.pop_front() {
        let away = pool.pop_back();
        match slots.next() {
            Some(slot) => *slot = Game::new(Some(home), away, Outcome::Undecided),
            None => break,
        }
    }

    for (game, pick) in games.iter_mut().zip(picks) {
        game.winner = *pick;
    }
    games
}

/// A conference championship between the divisional winners, best seed at home.
///
/// Nobody advanced yet gives [`Game::EMPTY`] and `pick` is not applied.
pub fn derive_championship_game(divisional: &[Game; 2], pick: Outcome) -> Game {
    let mut advancing: Vec<Seed> = divisional.iter().filter_map(Game::winning_team).collect();
    if advancing.is_empty() {
        return Game::EMPTY;
    }
    advancing.sort_by_key(|seed| seed.rank);
    Game::new(advancing.first().copied(), advancing.get(1).copied(), pick)
}

/// The final: AFC champion at home, NFC champion away.
pub fn derive_final(afc: &Game, nfc: &Game, pick: Outcome) -> Game {
    Game::new(afc.winning_team(), nfc.winning_team(), pick)
}

fn derive_conference(conference: Conference, picks: &Picks) -> ConferenceBracket {
    let i = conference.index();
    let wildcard_at = RoundKind::WildCard.offset() + 3 * i;
    let divisional_at = RoundKind::Divisional.offset() + 2 * i;
    let championship_at = RoundKind::Championship.offset() + i;

    let wildcard = derive_wildcard_games(conference, picks.slice(wildcard_at..wildcard_at + 3));
    let divisional = derive_divisional_games(
        &wildcard,
        conference.bye(),
        picks.slice(divisional_at..divisional_at + 2),
    );
    let championship = derive_championship_game(&divisional, picks.get(championship_at));

    ConferenceBracket { conference, wildcard, divisional, championship }
}

/// Derive the whole tournament for a pick or result string.
pub fn derive_all_games(picks: &Picks) -> Tournament {
    let afc = derive_conference(Conference::Afc, picks);
    let nfc = derive_conference(Conference::Nfc, picks);
    let final_game = derive_final(
        &afc.championship,
        &nfc.championship,
        picks.get(RoundKind::Final.offset()),
    );
    Tournament { afc, nfc, final_game }
}

/// The round still being played, as seen from a result string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentRound {
    pub kind: RoundKind,
    /// Index of the round's first character in the result string.
    pub offset: usize,
    /// The round's games in pick-string order.
    pub games: Vec<Game>,
}

impl CurrentRound {
    /// Winners of the round's games, one per game: the starting point for
    /// what-if exploration.
    pub fn picks(&self) -> Vec<Outcome> {
        self.games.iter().map(|g| g.winner).collect()
    }

    pub fn positions(&self) -> std::ops::Range<usize> {
        self.offset..self.offset + self.games.len()
    }
}

/// The earliest round with an undecided game; the final once all are decided.
///
/// Rounds are checked strictly in order, so a gap anywhere in the wild card
/// keeps the wild card current no matter what later positions say.
pub fn derive_current_round(results: &Picks) -> CurrentRound {
    let kind = RoundKind::ALL
        .into_iter()
        .find(|kind| results.slice(kind.positions()).iter().any(|o| !o.is_decided()))
        .unwrap_or(RoundKind::Final);
    let tournament = derive_all_games(results);
    CurrentRound { kind, offset: kind.offset(), games: tournament.round(kind) }
}
