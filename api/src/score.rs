use crate::bracket::derive_all_games;
use crate::{PICK_COUNT, Picks, RoundKind, Seed};
use serde::{Deserialize, Serialize};

/// Points for a correct pick in each round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringTable {
    pub wild_card: u32,
    pub divisional: u32,
    pub championship: u32,
    pub final_game: u32,
}

impl Default for ScoringTable {
    fn default() -> Self {
        Self { wild_card: 1, divisional: 2, championship: 4, final_game: 8 }
    }
}

impl ScoringTable {
    pub fn round_weight(&self, round: RoundKind) -> u32 {
        match round {
            RoundKind::WildCard => self.wild_card,
            RoundKind::Divisional => self.divisional,
            RoundKind::Championship => self.championship,
            RoundKind::Final => self.final_game,
        }
    }

    pub fn weight(&self, position: usize) -> u32 {
        self.round_weight(RoundKind::of_position(position))
    }

    /// Points for a perfect bracket.
    pub fn total(&self) -> u32 {
        (0..PICK_COUNT).map(|p| self.weight(p)).sum()
    }

    /// Score `picks` against `results`.
    ///
    /// `results` is whatever the caller treats as true: official results,
    /// possibly with what-if outcomes spliced into undecided positions.
    pub fn score(&self, picks: &Picks, results: &Picks) -> Score {
        let mut points = 0;
        let mut open = 0;
        for position in 0..PICK_COUNT {
            let result = results.get(position);
            if !result.is_decided() {
                open += self.weight(position);
            } else if picks.get(position) == result {
                points += self.weight(position);
            }
        }

        Score {
            points,
            max_points: points + open,
            champion: derive_all_games(picks).champion(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Score {
    pub points: u32,
    /// Best case: every undecided game still goes the way it was picked.
    pub max_points: u32,
    /// Winner of the final according to the picks.
    pub champion: Option<Seed>,
}

/// Score with the default table.
pub fn score(picks: &Picks, results: &Picks) -> Score {
    ScoringTable::default().score(picks, results)
}
