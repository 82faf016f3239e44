pub mod bracket;
pub mod client;
pub mod leaderboard;
pub mod records;
pub mod score;
pub mod wire;

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::ops::Range;
use std::str::FromStr;

/// Number of games in the playoffs, and so the length of every pick string.
pub const PICK_COUNT: usize = 13;

/// Seeds per conference. Seed 1 has the wild-card bye.
pub const SEEDS_PER_CONFERENCE: u8 = 7;

// ---------------------------------------------------------------------------
// Seeds
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Conference {
    Afc,
    Nfc,
}

impl Conference {
    /// Pick-string order: AFC slices come before NFC slices in every round.
    pub const ALL: [Conference; 2] = [Conference::Afc, Conference::Nfc];

    pub fn tag(self) -> char {
        match self {
            Conference::Afc => 'A',
            Conference::Nfc => 'N',
        }
    }

    pub fn from_tag(tag: char) -> Option<Self> {
        match tag {
            'A' => Some(Conference::Afc),
            'N' => Some(Conference::Nfc),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Conference::Afc => "AFC",
            Conference::Nfc => "NFC",
        }
    }

    pub fn index(self) -> usize {
        match self {
            Conference::Afc => 0,
            Conference::Nfc => 1,
        }
    }

    pub fn bye(self) -> Seed {
        Seed::new(self, 1)
    }
}

/// One of the 14 qualifying slots, e.g. `A1` or `N7`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Seed {
    pub conference: Conference,
    pub rank: u8,
}

impl Seed {
    pub const fn new(conference: Conference, rank: u8) -> Self {
        Self { conference, rank }
    }

    /// All 14 seeds, AFC first, best rank first.
    pub fn all() -> impl Iterator<Item = Seed> {
        Conference::ALL
            .into_iter()
            .flat_map(|c| (1..=SEEDS_PER_CONFERENCE).map(move |rank| Seed::new(c, rank)))
    }
}

impl fmt::Display for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.conference.tag(), self.rank)
    }
}

impl FromStr for Seed {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let (Some(tag), Some(digit), None) = (chars.next(), chars.next(), chars.next()) else {
            return Err(ParseError::Seed(s.to_owned()));
        };
        let conference = Conference::from_tag(tag).ok_or_else(|| ParseError::Seed(s.to_owned()))?;
        let rank = digit
            .to_digit(10)
            .filter(|r| (1..=u32::from(SEEDS_PER_CONFERENCE)).contains(r))
            .ok_or_else(|| ParseError::Seed(s.to_owned()))?;
        Ok(Seed::new(conference, rank as u8))
    }
}

impl TryFrom<String> for Seed {
    type Error = ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Seed> for String {
    fn from(seed: Seed) -> Self {
        seed.to_string()
    }
}

// ---------------------------------------------------------------------------
// Picks
// ---------------------------------------------------------------------------

/// Outcome of one game: `0`, `1` or `2` in the pick string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Outcome {
    #[default]
    Undecided,
    /// The first-listed (home) side wins.
    Home,
    /// The second-listed (away) side wins.
    Away,
}

impl Outcome {
    pub fn from_symbol(symbol: char) -> Option<Self> {
        match symbol {
            '0' => Some(Outcome::Undecided),
            '1' => Some(Outcome::Home),
            '2' => Some(Outcome::Away),
            _ => None,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Outcome::Undecided => '0',
            Outcome::Home => '1',
            Outcome::Away => '2',
        }
    }

    pub fn is_decided(self) -> bool {
        self != Outcome::Undecided
    }
}

/// A pick string or a result string: one [`Outcome`] per game, in the fixed
/// positional order of [`RoundKind::positions`].
///
/// Serializes as the 13-character `0/1/2` string used by the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Picks([Outcome; PICK_COUNT]);

impl Picks {
    pub const UNDECIDED: Picks = Picks([Outcome::Undecided; PICK_COUNT]);

    /// Outcome at `position`; out-of-range positions read as undecided.
    pub fn get(&self, position: usize) -> Outcome {
        self.0.get(position).copied().unwrap_or_default()
    }

    pub fn set(&mut self, position: usize, outcome: Outcome) {
        if let Some(slot) = self.0.get_mut(position) {
            *slot = outcome;
        }
    }

    pub fn with(mut self, position: usize, outcome: Outcome) -> Self {
        self.set(position, outcome);
        self
    }

    pub fn slice(&self, range: Range<usize>) -> &[Outcome] {
        self.0.get(range).unwrap_or(&[])
    }

    /// Every game picked: the only shape accepted for a submission.
    pub fn is_complete(&self) -> bool {
        self.0.iter().all(|o| o.is_decided())
    }

    /// Nothing picked at all.
    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|o| !o.is_decided())
    }

    pub fn decided_count(&self) -> usize {
        self.0.iter().filter(|o| o.is_decided()).count()
    }
}

impl fmt::Display for Picks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s: String = self.0.iter().map(|o| o.symbol()).collect();
        f.write_str(&s)
    }
}

impl FromStr for Picks {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let length = s.chars().count();
        if length != PICK_COUNT {
            return Err(ParseError::PickLength(length));
        }
        let mut outcomes = [Outcome::Undecided; PICK_COUNT];
        for (position, (slot, symbol)) in outcomes.iter_mut().zip(s.chars()).enumerate() {
            *slot = Outcome::from_symbol(symbol)
                .ok_or(ParseError::PickSymbol { position, symbol })?;
        }
        Ok(Self(outcomes))
    }
}

impl TryFrom<String> for Picks {
    type Error = ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Picks> for String {
    fn from(picks: Picks) -> Self {
        picks.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    PickLength(usize),
    PickSymbol { position: usize, symbol: char },
    Seed(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::PickLength(n) => {
                write!(f, "picks must be {PICK_COUNT} characters, got {n}")
            }
            ParseError::PickSymbol { position, symbol } => {
                write!(f, "invalid pick {symbol:?} at position {position}, expected 0, 1 or 2")
            }
            ParseError::Seed(s) => write!(f, "invalid seed {s:?}, expected A1..A7 or N1..N7"),
        }
    }
}

impl std::error::Error for ParseError {}

// ---------------------------------------------------------------------------
// Games and rounds
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Game {
    pub home: Option<Seed>, // better seed; AFC side in the final
    pub away: Option<Seed>, // None = opponent not determined yet
    pub winner: Outcome,
}

impl Game {
    pub const EMPTY: Game = Game { home: None, away: None, winner: Outcome::Undecided };

    pub fn new(home: Option<Seed>, away: Option<Seed>, winner: Outcome) -> Self {
        Self { home, away, winner }
    }

    pub fn winning_team(&self) -> Option<Seed> {
        match self.winner {
            Outcome::Home => self.home,
            Outcome::Away => self.away,
            Outcome::Undecided => None,
        }
    }
}

/// Ordered from earliest to latest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RoundKind {
    #[default]
    WildCard,
    Divisional,
    Championship,
    Final,
}

impl RoundKind {
    pub const ALL: [RoundKind; 4] = [
        RoundKind::WildCard,
        RoundKind::Divisional,
        RoundKind::Championship,
        RoundKind::Final,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            RoundKind::WildCard => "Wild Card",
            RoundKind::Divisional => "Divisional",
            RoundKind::Championship => "Conference Championship",
            RoundKind::Final => "Super Bowl",
        }
    }

    /// Index of the round's first character in the pick string.
    pub fn offset(self) -> usize {
        match self {
            RoundKind::WildCard => 0,
            RoundKind::Divisional => 6,
            RoundKind::Championship => 10,
            RoundKind::Final => 12,
        }
    }

    /// Games in the round across both conferences.
    pub fn game_count(self) -> usize {
        match self {
            RoundKind::WildCard => 6,
            RoundKind::Divisional => 4,
            RoundKind::Championship => 2,
            RoundKind::Final => 1,
        }
    }

    pub fn positions(self) -> Range<usize> {
        self.offset()..self.offset() + self.game_count()
    }

    pub fn of_position(position: usize) -> Self {
        match position {
            0..=5 => RoundKind::WildCard,
            6..=9 => RoundKind::Divisional,
            10 | 11 => RoundKind::Championship,
            _ => RoundKind::Final,
        }
    }

    pub fn next(self) -> Option<Self> {
        match self {
            RoundKind::WildCard => Some(RoundKind::Divisional),
            RoundKind::Divisional => Some(RoundKind::Championship),
            RoundKind::Championship => Some(RoundKind::Final),
            RoundKind::Final => None,
        }
    }
}

/// One conference's side of the derived bracket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConferenceBracket {
    pub conference: Conference,
    pub wildcard: [Game; 3],
    pub divisional: [Game; 2],
    pub championship: Game,
}

impl ConferenceBracket {
    pub fn champion(&self) -> Option<Seed> {
        self.championship.winning_team()
    }
}

/// Every game of one pick or result string, fully derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tournament {
    pub afc: ConferenceBracket,
    pub nfc: ConferenceBracket,
    pub final_game: Game,
}

impl Tournament {
    pub fn conference(&self, conference: Conference) -> &ConferenceBracket {
        match conference {
            Conference::Afc => &self.afc,
            Conference::Nfc => &self.nfc,
        }
    }

    /// All games in pick-string order, so `games()[i]` is decided by `picks[i]`.
    pub fn games(&self) -> [Game; PICK_COUNT] {
        let (a, n) = (&self.afc, &self.nfc);
        [
            a.wildcard[0],
            a.wildcard[1],
            a.wildcard[2],
            n.wildcard[0],
            n.wildcard[1],
            n.wildcard[2],
            a.divisional[0],
            a.divisional[1],
            n.divisional[0],
            n.divisional[1],
            a.championship,
            n.championship,
            self.final_game,
        ]
    }

    pub fn round(&self, kind: RoundKind) -> Vec<Game> {
        self.games()[kind.positions()].to_vec()
    }

    pub fn champion(&self) -> Option<Seed> {
        self.final_game.winning_team()
    }
}

// ---------------------------------------------------------------------------
// Season
// ---------------------------------------------------------------------------

/// Team names for the 14 seeds of one season.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedTable {
    names: BTreeMap<Seed, String>,
}

impl SeedTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, seed: Seed, name: impl Into<String>) {
        self.names.insert(seed, name.into());
    }

    pub fn name(&self, seed: Seed) -> Option<&str> {
        self.names.get(&seed).map(String::as_str)
    }

    /// Team name, or the seed label when the team is not known yet.
    pub fn display(&self, seed: Option<Seed>) -> String {
        match seed {
            Some(seed) => self
                .name(seed)
                .map(ToOwned::to_owned)
                .unwrap_or_else(|| seed.to_string()),
            None => "TBD".to_string(),
        }
    }

    pub fn is_complete(&self) -> bool {
        Seed::all().all(|seed| self.names.contains_key(&seed))
    }
}

impl FromIterator<(Seed, String)> for SeedTable {
    fn from_iter<I: IntoIterator<Item = (Seed, String)>>(iter: I) -> Self {
        Self { names: iter.into_iter().collect() }
    }
}

/// Everything the pool knows about one year's playoffs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Season {
    pub year: u16,
    pub teams: SeedTable,
    /// Official results so far.
    pub results: Picks,
    /// Once set, brackets are locked and visible to everyone.
    pub games_started: bool,
}

/// Playoff year for a given date: games in January belong to the season
/// that started the previous September, and are named after January's year.
pub fn season_year(now: DateTime<Utc>) -> u16 {
    let year = now.year();
    let year = if now.month() >= 9 { year + 1 } else { year };
    u16::try_from(year).unwrap_or(u16::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn picks_round_trip_through_the_string_form() {
        let picks: Picks = "1201120120012".parse().unwrap();
        assert_eq!(picks.to_string(), "1201120120012");
        assert_eq!(picks.get(1), Outcome::Away);
        assert_eq!(picks.get(2), Outcome::Undecided);
        assert_eq!(picks.decided_count(), 9);
    }

    #[test]
    fn picks_reject_wrong_length_and_symbols() {
        assert_eq!("111".parse::<Picks>(), Err(ParseError::PickLength(3)));
        assert_eq!(
            "1111131111111".parse::<Picks>(),
            Err(ParseError::PickSymbol { position: 5, symbol: '3' })
        );
    }

    #[test]
    fn picks_serialize_as_plain_string() {
        let picks: Picks = "2222222222221".parse().unwrap();
        let json = serde_json::to_string(&picks).unwrap();
        assert_eq!(json, "\"2222222222221\"");
        let back: Picks = serde_json::from_str(&json).unwrap();
        assert_eq!(back, picks);
        assert!(serde_json::from_str::<Picks>("\"22\"").is_err());
    }

    #[test]
    fn empty_and_complete_picks() {
        assert!(Picks::UNDECIDED.is_empty());
        assert!(!Picks::UNDECIDED.is_complete());
        let full: Picks = "1111111111111".parse().unwrap();
        assert!(full.is_complete());
        assert!(!full.with(12, Outcome::Undecided).is_complete());
    }

    #[test]
    fn seeds_parse_and_display() {
        let seed: Seed = "N7".parse().unwrap();
        assert_eq!(seed, Seed::new(Conference::Nfc, 7));
        assert_eq!(seed.to_string(), "N7");
        assert!("N8".parse::<Seed>().is_err());
        assert!("X1".parse::<Seed>().is_err());
        assert!("A".parse::<Seed>().is_err());
        assert!("A12".parse::<Seed>().is_err());
        assert_eq!(Seed::all().count(), 14);
    }

    #[test]
    fn round_positions_cover_the_pick_string() {
        let covered: Vec<usize> = RoundKind::ALL.iter().flat_map(|k| k.positions()).collect();
        assert_eq!(covered, (0..PICK_COUNT).collect::<Vec<_>>());
        for position in 0..PICK_COUNT {
            assert!(RoundKind::of_position(position).positions().contains(&position));
        }
    }

    #[test]
    fn round_kind_navigation() {
        assert_eq!(RoundKind::WildCard.next(), Some(RoundKind::Divisional));
        assert_eq!(RoundKind::Final.next(), None);
    }

    #[test]
    fn seed_table_falls_back_to_seed_label() {
        let mut teams = SeedTable::new();
        teams.insert(Seed::new(Conference::Afc, 1), "Chiefs");
        assert_eq!(teams.display(Some(Seed::new(Conference::Afc, 1))), "Chiefs");
        assert_eq!(teams.display(Some(Seed::new(Conference::Afc, 2))), "A2");
        assert_eq!(teams.display(None), "TBD");
        assert!(!teams.is_complete());
    }

    #[test]
    fn season_year_rolls_forward_in_september() {
        let january = Utc.with_ymd_and_hms(2025, 1, 12, 18, 0, 0).unwrap();
        let october = Utc.with_ymd_and_hms(2025, 10, 1, 0, 0, 0).unwrap();
        assert_eq!(season_year(january), 2025);
        assert_eq!(season_year(october), 2026);
    }
}
