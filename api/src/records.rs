//! Pool records: players with their brackets, and per-group metadata.
//!
//! Also the rules the request layer applies before anything reaches the
//! store: input allow-lists and how a submission edits a player's brackets.

use crate::wire::{BracketRow, PoolRow, Tiebreaker};
use crate::{ParseError, Picks, Seed};
use log::debug;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

/// `player` value of the row that holds a group's metadata.
pub const GROUP_INFO_PLAYER: &str = "GROUP_INFO";

/// Pseudo-group that shows every group without a password.
pub const ALL_GROUPS: &str = "All";

macro_rules! pattern {
    ($name:ident, $regex_str:expr) => {
        static $name: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new($regex_str).ok());
    };
}

pattern!(RE_YEAR, r"^[0-9]{4}$");
pattern!(RE_KEY_NAME, r"^[A-Za-z0-9 /:'\[\],.<>?~!@#$%^&*+()`_-]{1,20}$");
pattern!(RE_DISPLAY_NAME, r#"^[A-Za-z0-9 !?/\\'"\[\]()_-]{1,20}$"#);
pattern!(RE_COMPLETE_PICKS, r"^[1-2]{13}$");
pattern!(RE_PARTIAL_PICKS, r"^[0-2]{13}$");
pattern!(RE_TIEBREAKER, r"^[0-9]+$");
pattern!(RE_TEAM_INDEX, r"^[A-Z][1-7]$");
pattern!(RE_TEAM_NAME, r"^[A-Z0-9][a-z0-9]+s$");

fn allowed(regex: &LazyLock<Option<Regex>>, text: &str) -> bool {
    let Some(re) = regex.as_ref() else { return false };
    re.is_match(text)
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    Year(String),
    Group(String),
    Player(String),
    DisplayName(String),
    Picks(String),
    Tiebreaker(String),
    TeamIndex(String),
    TeamName(String),
    GamesStarted(String),
    AllGroup,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::Year(s) => write!(f, "Invalid year \"{s}\""),
            ValidationError::Group(s) => write!(f, "Invalid group \"{s}\""),
            ValidationError::Player(s) => write!(f, "Invalid player \"{s}\""),
            ValidationError::DisplayName(s) => write!(
                f,
                "Invalid name \"{s}\": use up to 20 of A-Za-z0-9 !?/\\'\"[]()_-"
            ),
            ValidationError::Picks(s) => write!(f, "Invalid picks \"{s}\""),
            ValidationError::Tiebreaker(s) => write!(f, "Invalid tiebreaker (total score) \"{s}\""),
            ValidationError::TeamIndex(s) => write!(f, "Invalid team index \"{s}\""),
            ValidationError::TeamName(s) => write!(f, "Invalid team name \"{s}\""),
            ValidationError::GamesStarted(s) => write!(f, "Invalid games started flag \"{s}\""),
            ValidationError::AllGroup => write!(f, "Select a group to submit this bracket"),
        }
    }
}

impl std::error::Error for ValidationError {}

pub fn validate_year(year: &str) -> Result<u16, ValidationError> {
    if !allowed(&RE_YEAR, year) {
        return Err(ValidationError::Year(year.to_owned()));
    }
    year.parse().map_err(|_| ValidationError::Year(year.to_owned()))
}

pub fn validate_group(group: &str) -> Result<(), ValidationError> {
    if allowed(&RE_KEY_NAME, group) {
        Ok(())
    } else {
        Err(ValidationError::Group(group.to_owned()))
    }
}

/// The store's allow-list for the `player` column.
pub fn validate_player(player: &str) -> Result<(), ValidationError> {
    if allowed(&RE_KEY_NAME, player) {
        Ok(())
    } else {
        Err(ValidationError::Player(player.to_owned()))
    }
}

/// The stricter allow-list for names chosen by new players.
pub fn validate_display_name(name: &str) -> Result<(), ValidationError> {
    if allowed(&RE_DISPLAY_NAME, name) {
        Ok(())
    } else {
        Err(ValidationError::DisplayName(name.to_owned()))
    }
}

/// A submitted bracket: every game picked.
pub fn validate_complete_picks(picks: &str) -> Result<Picks, ValidationError> {
    if !allowed(&RE_COMPLETE_PICKS, picks) {
        return Err(ValidationError::Picks(picks.to_owned()));
    }
    picks.parse().map_err(|_: ParseError| ValidationError::Picks(picks.to_owned()))
}

/// Official results or a what-if state: undecided games allowed.
pub fn validate_partial_picks(picks: &str) -> Result<Picks, ValidationError> {
    if !allowed(&RE_PARTIAL_PICKS, picks) {
        return Err(ValidationError::Picks(picks.to_owned()));
    }
    picks.parse().map_err(|_: ParseError| ValidationError::Picks(picks.to_owned()))
}

pub fn validate_tiebreaker(tiebreaker: &str) -> Result<u32, ValidationError> {
    if !allowed(&RE_TIEBREAKER, tiebreaker) {
        return Err(ValidationError::Tiebreaker(tiebreaker.to_owned()));
    }
    tiebreaker
        .parse()
        .map_err(|_| ValidationError::Tiebreaker(tiebreaker.to_owned()))
}

/// A seed index and team name for the season's team table.
pub fn validate_team(index: &str, name: &str) -> Result<Seed, ValidationError> {
    if !allowed(&RE_TEAM_INDEX, index) {
        return Err(ValidationError::TeamIndex(index.to_owned()));
    }
    let seed = index
        .parse()
        .map_err(|_: ParseError| ValidationError::TeamIndex(index.to_owned()))?;
    if !allowed(&RE_TEAM_NAME, name) {
        return Err(ValidationError::TeamName(name.to_owned()));
    }
    Ok(seed)
}

pub fn validate_games_started(flag: &str) -> Result<bool, ValidationError> {
    match flag {
        "0" => Ok(false),
        "1" => Ok(true),
        _ => Err(ValidationError::GamesStarted(flag.to_owned())),
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// Partition key of the store: one year of one group.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PoolKey {
    pub year: u16,
    pub group: String,
}

impl PoolKey {
    pub fn new(year: u16, group: impl Into<String>) -> Self {
        Self { year, group: group.into() }
    }

    pub fn parse(key: &str) -> Result<Self, ValidationError> {
        let (year, group) = match key.char_indices().nth(4) {
            Some((split, _)) => key.split_at(split),
            None => return Err(ValidationError::Year(key.to_owned())),
        };
        let year = validate_year(year)?;
        validate_group(group)?;
        Ok(Self::new(year, group))
    }
}

impl fmt::Display for PoolKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.year, self.group)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketEntry {
    pub picks: Picks,
    pub tiebreaker: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerRecord {
    pub key: PoolKey,
    pub name: String,
    pub brackets: Vec<BracketEntry>,
    /// Devices allowed to edit or delete this player's brackets.
    pub devices: Vec<String>,
}

impl PlayerRecord {
    pub fn owned_by(&self, device_id: &str) -> bool {
        self.devices.iter().any(|d| d == device_id)
    }

    fn position_of(&self, bracket: &BracketEntry) -> Option<usize> {
        self.brackets.iter().position(|b| b == bracket)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupInfo {
    pub key: PoolKey,
    pub password: Option<String>,
}

impl GroupInfo {
    pub fn is_locked(&self) -> bool {
        self.password.as_deref().is_some_and(|p| !p.is_empty())
    }

    pub fn unlocks(&self, candidate: &str) -> bool {
        match self.password.as_deref() {
            Some(password) if !password.is_empty() => password == candidate,
            _ => true,
        }
    }
}

/// A row of the store, decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PoolRecord {
    Player(PlayerRecord),
    Group(GroupInfo),
}

impl PoolRecord {
    pub fn from_row(row: PoolRow) -> Result<Self, RecordError> {
        let key = PoolKey::parse(&row.key)?;
        if row.player == GROUP_INFO_PLAYER {
            return Ok(PoolRecord::Group(GroupInfo { key, password: row.password }));
        }
        validate_player(&row.player)?;

        let brackets = row
            .brackets
            .unwrap_or_default()
            .into_iter()
            .map(decode_bracket)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(PoolRecord::Player(PlayerRecord {
            key,
            name: row.player,
            brackets,
            devices: row.devices.unwrap_or_default(),
        }))
    }

    pub fn to_row(&self) -> PoolRow {
        match self {
            PoolRecord::Player(p) => PoolRow {
                key: p.key.to_string(),
                player: p.name.clone(),
                brackets: Some(
                    p.brackets
                        .iter()
                        .map(|b| BracketRow {
                            picks: b.picks.to_string(),
                            tiebreaker: Tiebreaker::Number(u64::from(b.tiebreaker)),
                        })
                        .collect(),
                ),
                devices: Some(p.devices.clone()),
                password: None,
            },
            PoolRecord::Group(g) => PoolRow {
                key: g.key.to_string(),
                player: GROUP_INFO_PLAYER.to_string(),
                brackets: None,
                devices: None,
                password: g.password.clone(),
            },
        }
    }
}

fn decode_bracket(row: BracketRow) -> Result<BracketEntry, RecordError> {
    let picks = validate_partial_picks(&row.picks)?;
    let tiebreaker = match row.tiebreaker {
        Tiebreaker::Number(n) => {
            u32::try_from(n).map_err(|_| ValidationError::Tiebreaker(n.to_string()))?
        }
        Tiebreaker::Text(s) => validate_tiebreaker(s.trim())?,
    };
    Ok(BracketEntry { picks, tiebreaker })
}

/// Split decoded records into players and group metadata.
pub fn partition(records: Vec<PoolRecord>) -> (Vec<PlayerRecord>, Vec<GroupInfo>) {
    let mut players = Vec::new();
    let mut groups = Vec::new();
    for record in records {
        match record {
            PoolRecord::Player(p) => players.push(p),
            PoolRecord::Group(g) => groups.push(g),
        }
    }
    (players, groups)
}

// ---------------------------------------------------------------------------
// Submissions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    Invalid(ValidationError),
    /// A bracket with the same picks and tiebreaker already exists (`index` is 0-based).
    Duplicate { name: String, index: usize },
    /// The name belongs to a player on other devices and joining was not confirmed.
    NameTaken(String),
    /// Editing or deleting needs a bracket owned by this device.
    NotOwner,
    NoSuchBracket(usize),
    GamesStarted,
    MissingName,
}

impl fmt::Display for RecordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordError::Invalid(e) => write!(f, "{e}"),
            RecordError::Duplicate { name, index } => {
                write!(f, "This bracket is already in this group ({name} #{})", index + 1)
            }
            RecordError::NameTaken(name) => {
                write!(f, "{name} already has brackets in this group; confirm to add another")
            }
            RecordError::NotOwner => write!(f, "This bracket belongs to another device"),
            RecordError::NoSuchBracket(i) => write!(f, "No bracket #{}", i + 1),
            RecordError::GamesStarted => write!(f, "Games have started; brackets are locked"),
            RecordError::MissingName => write!(f, "Enter a display name first"),
        }
    }
}

impl std::error::Error for RecordError {}

impl From<ValidationError> for RecordError {
    fn from(e: ValidationError) -> Self {
        RecordError::Invalid(e)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edit {
    Add,
    Replace(usize),
    Delete(usize),
}

#[derive(Debug, Clone)]
pub struct Submission<'a> {
    pub key: &'a PoolKey,
    pub device_id: &'a str,
    /// Used only when this device has no player in the group yet.
    pub display_name: Option<&'a str>,
    pub bracket: BracketEntry,
    pub edit: Edit,
    pub games_started: bool,
    /// Confirmed joining an existing player of the same name from a new device.
    pub join_existing: bool,
}

/// The device's player in a group, if it has one.
pub fn find_player_for_device<'a>(
    players: &'a [PlayerRecord],
    device_id: &str,
) -> Option<&'a PlayerRecord> {
    players.iter().find(|p| p.owned_by(device_id))
}

/// Apply a submission to the group's current players and return the player
/// row to store.
///
/// The device's own player is used when there is one. Otherwise the display
/// name picks (or creates) the player, and joining a name already in use
/// needs `join_existing`.
pub fn submit_bracket(
    players: &[PlayerRecord],
    submission: &Submission<'_>,
) -> Result<PlayerRecord, RecordError> {
    if submission.key.group.is_empty() || submission.key.group == ALL_GROUPS {
        return Err(ValidationError::AllGroup.into());
    }
    validate_group(&submission.key.group)?;
    if submission.games_started {
        return Err(RecordError::GamesStarted);
    }
    let is_delete = matches!(submission.edit, Edit::Delete(_));
    if !is_delete && !submission.bracket.picks.is_complete() {
        return Err(ValidationError::Picks(submission.bracket.picks.to_string()).into());
    }

    let group_players = players.iter().filter(|p| p.key == *submission.key);
    let mut player = match find_player_for_device(players, submission.device_id)
        .filter(|p| p.key == *submission.key)
    {
        Some(owner) => owner.clone(),
        None => {
            if !matches!(submission.edit, Edit::Add) {
                return Err(RecordError::NotOwner);
            }
            let name = submission.display_name.ok_or(RecordError::MissingName)?;
            validate_display_name(name)?;
            match group_players.clone().find(|p| p.name == name) {
                Some(_) if !submission.join_existing => {
                    return Err(RecordError::NameTaken(name.to_owned()));
                }
                Some(existing) => {
                    let mut joined = existing.clone();
                    joined.devices.push(submission.device_id.to_owned());
                    joined
                }
                None => {
                    debug!("new player {name} in {}", submission.key);
                    return Ok(PlayerRecord {
                        key: submission.key.clone(),
                        name: name.to_owned(),
                        brackets: vec![submission.bracket],
                        devices: vec![submission.device_id.to_owned()],
                    });
                }
            }
        }
    };

    // Re-saving a bracket unchanged over itself is allowed and writes nothing new.
    if !is_delete
        && let Some(index) = player.position_of(&submission.bracket)
        && submission.edit != Edit::Replace(index)
    {
        return Err(RecordError::Duplicate { name: player.name.clone(), index });
    }

    match submission.edit {
        Edit::Add => player.brackets.push(submission.bracket),
        Edit::Replace(index) => {
            let slot = player
                .brackets
                .get_mut(index)
                .ok_or(RecordError::NoSuchBracket(index))?;
            *slot = submission.bracket;
        }
        Edit::Delete(index) => {
            if index >= player.brackets.len() {
                return Err(RecordError::NoSuchBracket(index));
            }
            player.brackets.remove(index);
        }
    }
    Ok(player)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> PoolKey {
        PoolKey::new(2025, "dev")
    }

    fn entry(picks: &str, tiebreaker: u32) -> BracketEntry {
        BracketEntry { picks: picks.parse().unwrap(), tiebreaker }
    }

    fn player(name: &str, devices: &[&str], brackets: Vec<BracketEntry>) -> PlayerRecord {
        PlayerRecord {
            key: key(),
            name: name.to_string(),
            brackets,
            devices: devices.iter().map(|d| d.to_string()).collect(),
        }
    }

    fn submission<'a>(k: &'a PoolKey, device: &'a str, name: Option<&'a str>, bracket: BracketEntry, edit: Edit) -> Submission<'a> {
        Submission {
            key: k,
            device_id: device,
            display_name: name,
            bracket,
            edit,
            games_started: false,
            join_existing: false,
        }
    }

    #[test]
    fn year_must_be_four_digits() {
        assert_eq!(validate_year("2025"), Ok(2025));
        assert!(validate_year("25").is_err());
        assert!(validate_year("20a5").is_err());
    }

    #[test]
    fn group_and_player_allow_list() {
        assert!(validate_group("nelsons").is_ok());
        assert!(validate_group("Office [2nd floor]").is_ok());
        assert!(validate_group("").is_err());
        assert!(validate_group("a group name that is far too long").is_err());
        assert!(validate_player("Trent").is_ok());
        assert!(validate_player("semi;colon").is_err());
    }

    #[test]
    fn display_name_allow_list_is_stricter() {
        assert!(validate_display_name("Jace (phone)").is_ok());
        assert!(validate_display_name("a.b").is_err());
        assert!(validate_player("a.b").is_ok());
    }

    #[test]
    fn picks_validation() {
        assert!(validate_complete_picks("1212121212121").is_ok());
        assert!(validate_complete_picks("1212121212120").is_err());
        assert!(validate_partial_picks("1212121212120").is_ok());
        assert!(validate_partial_picks("121212121212").is_err());
        assert!(validate_partial_picks("121212121212x").is_err());
    }

    #[test]
    fn tiebreaker_must_be_a_non_negative_integer() {
        assert_eq!(validate_tiebreaker("45"), Ok(45));
        assert!(validate_tiebreaker("-3").is_err());
        assert!(validate_tiebreaker("4.5").is_err());
        assert!(validate_tiebreaker("").is_err());
        assert!(validate_tiebreaker("99999999999").is_err());
    }

    #[test]
    fn team_validation() {
        assert_eq!(validate_team("A1", "Chiefs"), Ok("A1".parse().unwrap()));
        assert!(validate_team("N5", "49ers").is_ok());
        assert!(validate_team("N8", "Vikings").is_err());
        assert!(validate_team("N5", "vikings").is_err());
        assert!(validate_team("X5", "Vikings").is_err());
    }

    #[test]
    fn pool_key_round_trips() {
        let key = PoolKey::parse("2025nelsons").unwrap();
        assert_eq!(key, PoolKey::new(2025, "nelsons"));
        assert_eq!(key.to_string(), "2025nelsons");
        assert!(PoolKey::parse("2025").is_err());
        assert!(PoolKey::parse("dev").is_err());
    }

    #[test]
    fn group_info_row_becomes_group_variant() {
        let row = PoolRow {
            key: "2025office".into(),
            player: GROUP_INFO_PLAYER.into(),
            password: Some("hunter2".into()),
            ..Default::default()
        };
        let PoolRecord::Group(group) = PoolRecord::from_row(row.clone()).unwrap() else {
            panic!("expected group info");
        };
        assert!(group.is_locked());
        assert!(group.unlocks("hunter2"));
        assert!(!group.unlocks("password"));
        assert_eq!(PoolRecord::Group(group).to_row(), row);
    }

    #[test]
    fn player_row_decodes_text_tiebreakers() {
        let row = PoolRow {
            key: "2025dev".into(),
            player: "Trent".into(),
            brackets: Some(vec![BracketRow {
                picks: "1111111111111".into(),
                tiebreaker: Tiebreaker::Text(" 45".into()),
            }]),
            devices: Some(vec!["abc1234".into()]),
            password: None,
        };
        let PoolRecord::Player(player) = PoolRecord::from_row(row).unwrap() else {
            panic!("expected player");
        };
        assert_eq!(player.brackets, vec![entry("1111111111111", 45)]);
        assert!(player.owned_by("abc1234"));
    }

    #[test]
    fn player_row_with_bad_picks_is_rejected() {
        let row = PoolRow {
            key: "2025dev".into(),
            player: "Trent".into(),
            brackets: Some(vec![BracketRow {
                picks: "111".into(),
                tiebreaker: Tiebreaker::Number(1),
            }]),
            ..Default::default()
        };
        assert!(matches!(
            PoolRecord::from_row(row),
            Err(RecordError::Invalid(ValidationError::Picks(_)))
        ));
    }

    #[test]
    fn new_device_and_new_name_creates_player() {
        let k = key();
        let sub = submission(&k, "dev-1", Some("Jace"), entry("1111111111111", 40), Edit::Add);
        let created = submit_bracket(&[], &sub).unwrap();
        assert_eq!(created.name, "Jace");
        assert_eq!(created.brackets.len(), 1);
        assert_eq!(created.devices, vec!["dev-1".to_string()]);
    }

    #[test]
    fn known_device_appends_bracket() {
        let k = key();
        let players = vec![player("Trent", &["dev-1"], vec![entry("1111111111111", 40)])];
        let sub = submission(&k, "dev-1", None, entry("2222222222222", 40), Edit::Add);
        let updated = submit_bracket(&players, &sub).unwrap();
        assert_eq!(updated.brackets.len(), 2);
        assert_eq!(updated.name, "Trent");
    }

    #[test]
    fn duplicate_bracket_is_rejected() {
        let k = key();
        let players = vec![player("Trent", &["dev-1"], vec![entry("1111111111111", 40)])];
        let sub = submission(&k, "dev-1", None, entry("1111111111111", 40), Edit::Add);
        assert_eq!(
            submit_bracket(&players, &sub),
            Err(RecordError::Duplicate { name: "Trent".into(), index: 0 })
        );
    }

    #[test]
    fn unchanged_resave_keeps_the_bracket() {
        let k = key();
        let brackets = vec![entry("1111111111111", 40), entry("2222222222222", 41)];
        let players = vec![player("Trent", &["dev-1"], brackets.clone())];
        let resave = submission(&k, "dev-1", None, entry("2222222222222", 41), Edit::Replace(1));
        assert_eq!(submit_bracket(&players, &resave).unwrap().brackets, brackets);

        // Copying another bracket over this one is still a duplicate.
        let copy = submission(&k, "dev-1", None, entry("1111111111111", 40), Edit::Replace(1));
        assert_eq!(
            submit_bracket(&players, &copy),
            Err(RecordError::Duplicate { name: "Trent".into(), index: 0 })
        );
    }

    #[test]
    fn same_name_from_new_device_needs_confirmation() {
        let k = key();
        let players = vec![player("Trent", &["dev-1"], vec![entry("1111111111111", 40)])];
        let mut sub = submission(&k, "dev-2", Some("Trent"), entry("2222222222222", 30), Edit::Add);
        assert_eq!(submit_bracket(&players, &sub), Err(RecordError::NameTaken("Trent".into())));

        sub.join_existing = true;
        let joined = submit_bracket(&players, &sub).unwrap();
        assert_eq!(joined.devices, vec!["dev-1".to_string(), "dev-2".to_string()]);
        assert_eq!(joined.brackets.len(), 2);
    }

    #[test]
    fn edit_replaces_in_place_and_delete_removes() {
        let k = key();
        let players = vec![player(
            "Trent",
            &["dev-1"],
            vec![entry("1111111111111", 40), entry("2222222222222", 41)],
        )];
        let replace = submission(&k, "dev-1", None, entry("1212121212121", 42), Edit::Replace(1));
        let edited = submit_bracket(&players, &replace).unwrap();
        assert_eq!(edited.brackets[1], entry("1212121212121", 42));
        assert_eq!(edited.brackets.len(), 2);

        let delete = submission(&k, "dev-1", None, entry("1111111111111", 40), Edit::Delete(0));
        let deleted = submit_bracket(&players, &delete).unwrap();
        assert_eq!(deleted.brackets, vec![entry("2222222222222", 41)]);

        let missing = submission(&k, "dev-1", None, entry("1111111111111", 40), Edit::Delete(5));
        assert_eq!(submit_bracket(&players, &missing), Err(RecordError::NoSuchBracket(5)));
    }

    #[test]
    fn only_owning_device_can_edit() {
        let k = key();
        let players = vec![player("Trent", &["dev-1"], vec![entry("1111111111111", 40)])];
        let sub = submission(&k, "dev-9", Some("Trent"), entry("2222222222222", 40), Edit::Replace(0));
        assert_eq!(submit_bracket(&players, &sub), Err(RecordError::NotOwner));
    }

    #[test]
    fn submissions_are_rejected_for_all_group_incomplete_picks_and_started_games() {
        let all = PoolKey::new(2025, ALL_GROUPS);
        let sub = submission(&all, "dev-1", Some("Jace"), entry("1111111111111", 40), Edit::Add);
        assert_eq!(submit_bracket(&[], &sub), Err(RecordError::Invalid(ValidationError::AllGroup)));

        let k = key();
        let partial = submission(&k, "dev-1", Some("Jace"), entry("1111111111110", 40), Edit::Add);
        assert!(matches!(submit_bracket(&[], &partial), Err(RecordError::Invalid(ValidationError::Picks(_)))));

        let mut started = submission(&k, "dev-1", Some("Jace"), entry("1111111111111", 40), Edit::Add);
        started.games_started = true;
        assert_eq!(submit_bracket(&[], &started), Err(RecordError::GamesStarted));
    }

    #[test]
    fn new_player_name_is_validated() {
        let k = key();
        let sub = submission(&k, "dev-1", Some("semi;colon"), entry("1111111111111", 40), Edit::Add);
        assert!(matches!(
            submit_bracket(&[], &sub),
            Err(RecordError::Invalid(ValidationError::DisplayName(_)))
        ));
        let nameless = submission(&k, "dev-1", None, entry("1111111111111", 40), Edit::Add);
        assert_eq!(submit_bracket(&[], &nameless), Err(RecordError::MissingName));
    }
}
