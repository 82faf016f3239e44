//! Wire types of the pool's store API. Kept separate from the domain types
//! in `records` so odd rows can be repaired or skipped at the boundary.

use serde::{Deserialize, Serialize};

/// One row of the brackets table: a player, or the group's `GROUP_INFO` row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PoolRow {
    /// `{year}{group}`, e.g. `2025nelsons`.
    pub key: String,
    pub player: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brackets: Option<Vec<BracketRow>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub devices: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BracketRow {
    pub picks: String,
    pub tiebreaker: Tiebreaker,
}

/// Older rows stored the tiebreaker exactly as typed, as a string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Tiebreaker {
    Number(u64),
    Text(String),
}

/// One row of the teams table: a seed's team name, the official results
/// (`winners`) or the lock flag (`gamesStarted`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeasonItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<u16>,
    pub index: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WriteResponse {
    #[serde(default)]
    pub success: Option<String>,
    #[serde(default)]
    pub error: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn player_row_decodes_both_tiebreaker_shapes() {
        let json = r#"{
            "key": "2025dev",
            "player": "Trent",
            "brackets": [
                {"picks": "1111111111111", "tiebreaker": 45},
                {"picks": "2222222222222", "tiebreaker": "51"}
            ],
            "devices": ["m3k1z9q"]
        }"#;
        let row: PoolRow = serde_json::from_str(json).unwrap();
        let brackets = row.brackets.unwrap();
        assert_eq!(brackets[0].tiebreaker, Tiebreaker::Number(45));
        assert_eq!(brackets[1].tiebreaker, Tiebreaker::Text("51".into()));
        assert_eq!(row.password, None);
    }

    #[test]
    fn group_info_row_has_no_brackets() {
        let row: PoolRow =
            serde_json::from_str(r#"{"key": "2025office", "player": "GROUP_INFO", "password": "hunter2"}"#)
                .unwrap();
        assert!(row.brackets.is_none());
        let json = serde_json::to_value(&row).unwrap();
        assert!(json.get("brackets").is_none());
        assert_eq!(json["password"], "hunter2");
    }

    #[test]
    fn season_item_ignores_unknown_columns() {
        let item: SeasonItem =
            serde_json::from_str(r#"{"year": 2025, "index": "A1", "value": "Chiefs", "ttl": 0}"#)
                .unwrap();
        assert_eq!(item.index, "A1");
        assert_eq!(item.year, Some(2025));
    }
}
