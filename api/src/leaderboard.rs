//! Ranking of a group's brackets, with what-if results and the visibility
//! rules that keep picks private until the games start.

use crate::bracket::CurrentRound;
use crate::records::{ALL_GROUPS, GroupInfo, PlayerRecord};
use crate::score::{Score, ScoringTable};
use crate::{Outcome, Picks};
use std::cmp::Ordering;
use std::collections::BTreeSet;

/// Which brackets the leaderboard shows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum GroupSelection {
    /// Every group without a password.
    #[default]
    All,
    Group(String),
}

impl GroupSelection {
    pub fn from_name(name: &str) -> Self {
        if name.is_empty() || name == ALL_GROUPS {
            GroupSelection::All
        } else {
            GroupSelection::Group(name.to_string())
        }
    }

    pub fn name(&self) -> &str {
        match self {
            GroupSelection::All => ALL_GROUPS,
            GroupSelection::Group(name) => name,
        }
    }
}

/// Who is looking at the leaderboard.
#[derive(Debug, Clone, Copy)]
pub struct Viewer<'a> {
    pub device_id: &'a str,
    pub games_started: bool,
}

/// One bracket on the leaderboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Standing {
    pub player: String,
    pub group: String,
    pub bracket_index: usize,
    pub picks: Picks,
    pub tiebreaker: u32,
    /// `None` while the bracket is hidden from this viewer.
    pub score: Option<Score>,
    pub owned: bool,
}

impl Standing {
    /// `Trent` for a player's first bracket, `Trent #2` for the second.
    pub fn label(&self) -> String {
        if self.bracket_index == 0 {
            self.player.clone()
        } else {
            format!("{} #{}", self.player, self.bracket_index + 1)
        }
    }

    pub fn is_hidden(&self) -> bool {
        self.score.is_none()
    }
}

/// Groups whose brackets the selection shows.
///
/// `unlocked` lists the password-protected groups the viewer has opened.
pub fn visible_groups(
    groups: &[GroupInfo],
    selection: &GroupSelection,
    unlocked: &[String],
) -> BTreeSet<String> {
    match selection {
        GroupSelection::All => groups
            .iter()
            .filter(|g| !g.is_locked())
            .map(|g| g.key.group.clone())
            .collect(),
        GroupSelection::Group(name) => {
            let locked = groups
                .iter()
                .any(|g| g.key.group == *name && g.is_locked());
            if locked && !unlocked.contains(name) {
                BTreeSet::new()
            } else {
                BTreeSet::from([name.clone()])
            }
        }
    }
}

/// Players belonging to the selection.
///
/// Players of a group with no `GROUP_INFO` row count as unlocked groups.
pub fn visible_players<'a>(
    players: &'a [PlayerRecord],
    groups: &[GroupInfo],
    selection: &GroupSelection,
    unlocked: &[String],
) -> Vec<&'a PlayerRecord> {
    let mut allowed = visible_groups(groups, selection, unlocked);
    if *selection == GroupSelection::All {
        let described: BTreeSet<&str> = groups.iter().map(|g| g.key.group.as_str()).collect();
        for player in players {
            if !described.contains(player.key.group.as_str()) {
                allowed.insert(player.key.group.clone());
            }
        }
    }
    players
        .iter()
        .filter(|p| allowed.contains(&p.key.group))
        .collect()
}

/// Every group name seen in the data, `All` first.
pub fn known_groups(players: &[PlayerRecord], groups: &[GroupInfo]) -> Vec<String> {
    let names: BTreeSet<&str> = players
        .iter()
        .map(|p| p.key.group.as_str())
        .chain(groups.iter().map(|g| g.key.group.as_str()))
        .filter(|name| *name != ALL_GROUPS)
        .collect();
    std::iter::once(ALL_GROUPS.to_string())
        .chain(names.into_iter().map(str::to_string))
        .collect()
}

/// Official results with hypothetical outcomes for the current round.
///
/// Only positions of the current round still undecided in `results` take
/// the hypothetical outcome. Decided games stay as they are.
pub fn what_if_results(results: &Picks, current: &CurrentRound, hypothetical: &[Outcome]) -> Picks {
    let mut spliced = *results;
    for (position, outcome) in current.positions().zip(hypothetical.iter().copied()) {
        if !results.get(position).is_decided() {
            spliced.set(position, outcome);
        }
    }
    spliced
}

/// Standings for `players`, scored against `results` and ranked.
pub fn build(
    players: &[&PlayerRecord],
    results: &Picks,
    table: &ScoringTable,
    viewer: Viewer<'_>,
) -> Vec<Standing> {
    let mut standings: Vec<Standing> = players
        .iter()
        .flat_map(|player| {
            let owned = player.owned_by(viewer.device_id);
            let visible = viewer.games_started || owned;
            player.brackets.iter().enumerate().map(move |(index, bracket)| {
                if visible {
                    Standing {
                        player: player.name.clone(),
                        group: player.key.group.clone(),
                        bracket_index: index,
                        picks: bracket.picks,
                        tiebreaker: bracket.tiebreaker,
                        score: Some(table.score(&bracket.picks, results)),
                        owned,
                    }
                } else {
                    Standing {
                        player: player.name.clone(),
                        group: player.key.group.clone(),
                        bracket_index: index,
                        picks: Picks::UNDECIDED,
                        tiebreaker: 0,
                        score: None,
                        owned,
                    }
                }
            })
        })
        .collect();
    rank(&mut standings);
    standings
}

/// Empty (or hidden) brackets last, then max points and points descending,
/// then name and bracket index ascending.
pub fn rank(standings: &mut [Standing]) {
    standings.sort_by(compare);
}

fn compare(a: &Standing, b: &Standing) -> Ordering {
    let key = |s: &Standing| s.score.map(|sc| (sc.max_points, sc.points)).unwrap_or((0, 0));
    a.picks
        .is_empty()
        .cmp(&b.picks.is_empty())
        .then_with(|| key(b).cmp(&key(a)))
        .then_with(|| a.player.cmp(&b.player))
        .then_with(|| a.bracket_index.cmp(&b.bracket_index))
}
