use crate::records::{
    PlayerRecord, PoolKey, PoolRecord, ValidationError, validate_games_started,
    validate_partial_picks, validate_team, validate_year,
};
use crate::wire::{PoolRow, SeasonItem, WriteResponse};
use crate::{Picks, Season, SeedTable, Seed};
use log::{debug, warn};
use reqwest::{Client, RequestBuilder, Url};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

pub type ApiResult<T> = Result<T, ApiError>;

const FALLBACK_SEASON_YEAR: u16 = 2025;
const FALLBACK_SEASON_JSON: &str = include_str!("../seasons/2025.json");

pub const WINNERS_INDEX: &str = "winners";
pub const GAMES_STARTED_INDEX: &str = "gamesStarted";

/// Client for the pool's bracket store.
#[derive(Debug, Clone)]
pub struct PoolApi {
    client: Client,
    base_url: Option<String>,
    season_file: Option<PathBuf>,
    timeout: Duration,
}

impl Default for PoolApi {
    fn default() -> Self {
        Self {
            client: Client::builder()
                .user_agent("playoff-pool/0.1 (terminal bracket challenge)")
                .build()
                .unwrap_or_default(),
            base_url: None,
            season_file: None,
            timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Debug)]
pub enum ApiError {
    Network(reqwest::Error, String),
    Api(reqwest::Error, String),
    Parsing(reqwest::Error, String),
    NotFound(String),
    /// The store answered but refused the write.
    Rejected(String),
    Invalid(ValidationError),
    /// No store URL configured.
    Offline,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Network(e, url) => write!(f, "Network error for {url}: {e}"),
            ApiError::Api(e, url) => write!(f, "API error for {url}: {e}"),
            ApiError::Parsing(e, url) => write!(f, "Parse error for {url}: {e}"),
            ApiError::NotFound(msg) => write!(f, "Not found: {msg}"),
            ApiError::Rejected(msg) => write!(f, "Rejected by the store: {msg}"),
            ApiError::Invalid(e) => write!(f, "{e}"),
            ApiError::Offline => write!(f, "No store configured (set PLAYOFF_POOL_API)"),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        ApiError::Invalid(e)
    }
}

impl PoolApi {
    pub fn new(base_url: Option<String>) -> Self {
        Self {
            base_url: base_url.filter(|u| !u.trim().is_empty()),
            ..Self::default()
        }
    }

    /// Read the season from a local JSON file instead of the store.
    pub fn with_season_file(mut self, path: Option<PathBuf>) -> Self {
        self.season_file = path;
        self
    }

    pub fn is_offline(&self) -> bool {
        self.base_url.is_none()
    }

    /// Rows of one year, across groups.
    pub async fn fetch_year_rows(&self, year: u16) -> ApiResult<Vec<PoolRow>> {
        let url = self.url(&["brackets", &year.to_string()])?;
        self.get(url.as_str()).await
    }

    /// Rows of one group.
    pub async fn fetch_group_rows(&self, key: &PoolKey) -> ApiResult<Vec<PoolRow>> {
        let url = self.url(&["brackets", &key.year.to_string(), &key.group])?;
        self.get(url.as_str()).await
    }

    /// Decoded records of a year, or of one group when `group` is given.
    ///
    /// Rows that fail to decode are logged and skipped.
    pub async fn fetch_records(&self, year: u16, group: Option<&str>) -> ApiResult<Vec<PoolRecord>> {
        let rows = match group {
            Some(group) => self.fetch_group_rows(&PoolKey::new(year, group)).await?,
            None => self.fetch_year_rows(year).await?,
        };
        debug!("fetched {} rows for {year}", rows.len());
        Ok(decode_rows(rows))
    }

    /// Insert or replace a player's row.
    pub async fn save_player(&self, player: &PlayerRecord) -> ApiResult<()> {
        let url = self.url(&["brackets"])?;
        let row = PoolRecord::Player(player.clone()).to_row();
        let request = self.client.post(url.as_str()).json(&row);
        self.send_write(request, url.as_str()).await
    }

    pub async fn delete_player(&self, key: &PoolKey, player: &str) -> ApiResult<()> {
        let url = self.url(&["brackets", &key.year.to_string(), &key.group, player])?;
        let request = self.client.delete(url.as_str());
        self.send_write(request, url.as_str()).await
    }

    /// Fetch a season's teams, results and lock flag.
    ///
    /// Fallback chain:
    /// 1) the local season file, when one is configured.
    /// 2) `GET /teams/{year}` on the store.
    /// 3) the embedded 2025 snapshot, when the store is unreachable.
    pub async fn fetch_season(&self, year: u16) -> ApiResult<Season> {
        match self.fetch_season_exact(year).await {
            Err(e @ (ApiError::Network(..) | ApiError::Offline)) => {
                warn!("{e}; using the {FALLBACK_SEASON_YEAR} snapshot");
                load_embedded_season()
            }
            fetched => fetched,
        }
    }

    /// The season for `year` from the season file or the store, never the
    /// embedded snapshot. Writes are gated on this one.
    pub async fn fetch_season_exact(&self, year: u16) -> ApiResult<Season> {
        if let Some(path) = &self.season_file {
            let content = std::fs::read_to_string(path).map_err(|e| {
                ApiError::NotFound(format!("could not read {}: {e}", path.display()))
            })?;
            let items: Vec<SeasonItem> = serde_json::from_str(&content).map_err(|e| {
                ApiError::NotFound(format!("invalid season json at {}: {e}", path.display()))
            })?;
            return Ok(season_from_items(year, items));
        }

        let url = self.url(&["teams", &year.to_string()])?;
        let items = self.get::<Vec<SeasonItem>>(url.as_str()).await?;
        Ok(season_from_items(year, items))
    }

    /// Write one season item: a team name, the results or the lock flag.
    pub async fn update_season_item(&self, item: &SeasonItem) -> ApiResult<()> {
        validate_season_item(item)?;
        let url = self.url(&["teams"])?;
        let request = self.client.post(url.as_str()).json(item);
        self.send_write(request, url.as_str()).await
    }

    pub async fn set_results(&self, year: u16, results: &Picks) -> ApiResult<()> {
        self.update_season_item(&SeasonItem {
            year: Some(year),
            index: WINNERS_INDEX.to_string(),
            value: results.to_string(),
        })
        .await
    }

    pub async fn set_games_started(&self, year: u16, started: bool) -> ApiResult<()> {
        self.update_season_item(&SeasonItem {
            year: Some(year),
            index: GAMES_STARTED_INDEX.to_string(),
            value: if started { "1" } else { "0" }.to_string(),
        })
        .await
    }

    pub async fn set_team(&self, year: u16, seed: Seed, name: &str) -> ApiResult<()> {
        self.update_season_item(&SeasonItem {
            year: Some(year),
            index: seed.to_string(),
            value: name.to_string(),
        })
        .await
    }

    fn url(&self, segments: &[&str]) -> ApiResult<Url> {
        let base = self.base_url.as_deref().ok_or(ApiError::Offline)?;
        let mut url = Url::parse(base)
            .map_err(|e| ApiError::NotFound(format!("invalid store url {base}: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| ApiError::NotFound(format!("invalid store url {base}")))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get<T: Default + serde::de::DeserializeOwned>(&self, url: &str) -> ApiResult<T> {
        debug!("GET {url}");
        let response = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ApiError::Network(e, url.to_owned()))?;

        match response.error_for_status() {
            Ok(res) => res
                .json::<T>()
                .await
                .map_err(|e| ApiError::Parsing(e, url.to_owned())),
            Err(e) => {
                if e.status().map(|s| s.is_client_error()).unwrap_or(false) {
                    Ok(T::default())
                } else {
                    Err(ApiError::Api(e, url.to_owned()))
                }
            }
        }
    }

    async fn send_write(&self, request: RequestBuilder, url: &str) -> ApiResult<()> {
        debug!("write {url}");
        let response = request
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ApiError::Network(e, url.to_owned()))?
            .error_for_status()
            .map_err(|e| ApiError::Api(e, url.to_owned()))?;

        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Parsing(e, url.to_owned()))?;
        let reply: WriteResponse = serde_json::from_str(&body).unwrap_or_default();
        match reply.error {
            Some(serde_json::Value::String(msg)) => Err(ApiError::Rejected(msg)),
            Some(other) => Err(ApiError::Rejected(other.to_string())),
            None => Ok(()),
        }
    }
}

/// Decode store rows, dropping the ones that do not validate.
pub fn decode_rows(rows: Vec<PoolRow>) -> Vec<PoolRecord> {
    rows.into_iter()
        .filter_map(|row| {
            let label = format!("{}/{}", row.key, row.player);
            match PoolRecord::from_row(row) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!("skipping row {label}: {e}");
                    None
                }
            }
        })
        .collect()
}

/// Build a season from store items. Unknown or malformed items are skipped.
pub fn season_from_items(year: u16, items: Vec<SeasonItem>) -> Season {
    let mut teams = SeedTable::new();
    let mut results = Picks::UNDECIDED;
    let mut games_started = false;
    for item in items {
        if item.year.is_some_and(|y| y != year) {
            continue;
        }
        match item.index.as_str() {
            WINNERS_INDEX => match validate_partial_picks(&item.value) {
                Ok(picks) => results = picks,
                Err(e) => warn!("ignoring results for {year}: {e}"),
            },
            GAMES_STARTED_INDEX => match validate_games_started(&item.value) {
                Ok(flag) => games_started = flag,
                Err(e) => warn!("ignoring lock flag for {year}: {e}"),
            },
            index => match index.parse::<Seed>() {
                Ok(seed) => teams.insert(seed, item.value),
                Err(e) => warn!("ignoring season item {index}: {e}"),
            },
        }
    }
    Season { year, teams, results, games_started }
}

fn validate_season_item(item: &SeasonItem) -> Result<(), ValidationError> {
    if let Some(year) = item.year {
        validate_year(&year.to_string())?;
    }
    match item.index.as_str() {
        WINNERS_INDEX => validate_partial_picks(&item.value).map(|_| ()),
        GAMES_STARTED_INDEX => validate_games_started(&item.value).map(|_| ()),
        index => validate_team(index, &item.value).map(|_| ()),
    }
}

fn load_embedded_season() -> ApiResult<Season> {
    let items: Vec<SeasonItem> = serde_json::from_str(FALLBACK_SEASON_JSON)
        .map_err(|e| ApiError::NotFound(format!("invalid embedded season json: {e}")))?;
    Ok(season_from_items(FALLBACK_SEASON_YEAR, items))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::BracketEntry;
    use mockito::Matcher;
    use serde_json::json;

    fn api(server: &mockito::Server) -> PoolApi {
        PoolApi::new(Some(server.url()))
    }

    #[test]
    fn embedded_season_parses() {
        let season = load_embedded_season().expect("embedded season should parse");
        assert_eq!(season.year, 2025);
        assert!(season.teams.is_complete());
        assert_eq!(season.teams.name("N2".parse().unwrap()), Some("Eagles"));
        assert_eq!(season.results.to_string(), "1111211121112");
        assert!(season.games_started);
    }

    #[test]
    fn season_items_skip_garbage_and_other_years() {
        let items = vec![
            SeasonItem { year: Some(2026), index: "A1".into(), value: "Broncos".into() },
            SeasonItem { year: Some(2026), index: "winners".into(), value: "12".into() },
            SeasonItem { year: Some(2026), index: "Z9".into(), value: "Nobody".into() },
            SeasonItem { year: Some(2025), index: "A2".into(), value: "Bills".into() },
            SeasonItem { year: None, index: "gamesStarted".into(), value: "1".into() },
        ];
        let season = season_from_items(2026, items);
        assert_eq!(season.teams.name("A1".parse().unwrap()), Some("Broncos"));
        assert_eq!(season.teams.name("A2".parse().unwrap()), None);
        assert_eq!(season.results, Picks::UNDECIDED);
        assert!(season.games_started);
    }

    #[test]
    fn season_item_validation() {
        let ok = SeasonItem { year: Some(2025), index: "N5".into(), value: "49ers".into() };
        assert!(validate_season_item(&ok).is_ok());
        let bad = SeasonItem { year: Some(2025), index: "winners".into(), value: "3".into() };
        assert!(validate_season_item(&bad).is_err());
        let bad_flag = SeasonItem { year: None, index: "gamesStarted".into(), value: "yes".into() };
        assert!(validate_season_item(&bad_flag).is_err());
    }

    #[test]
    fn url_segments_are_encoded() {
        let api = PoolApi::new(Some("http://localhost:3000/api/".into()));
        let url = api.url(&["brackets", "2025", "office party"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:3000/api/brackets/2025/office%20party");
    }

    #[tokio::test]
    async fn offline_client_uses_embedded_season() {
        let api = PoolApi::new(None);
        assert!(api.is_offline());
        let season = api.fetch_season(2026).await.unwrap();
        assert_eq!(season.year, 2025);
        assert!(matches!(api.fetch_records(2026, None).await, Err(ApiError::Offline)));
    }

    #[tokio::test]
    async fn unreachable_store_only_falls_back_for_display() {
        // Nothing listens on the discard port.
        let api = PoolApi::new(Some("http://127.0.0.1:9".into()));
        let shown = api.fetch_season(2027).await.unwrap();
        assert_eq!(shown.year, 2025);

        let err = api.fetch_season_exact(2027).await.unwrap_err();
        assert!(matches!(err, ApiError::Network(..)));
        assert!(matches!(PoolApi::new(None).fetch_season_exact(2027).await, Err(ApiError::Offline)));
    }

    #[tokio::test]
    async fn fetch_records_skips_bad_rows() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/brackets/2025/dev")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!([
                    {"key": "2025dev", "player": "Trent", "brackets": [{"picks": "1111111111111", "tiebreaker": 45}], "devices": ["abc"]},
                    {"key": "2025dev", "player": "GROUP_INFO", "password": ""},
                    {"key": "2025dev", "player": "Broken", "brackets": [{"picks": "11", "tiebreaker": 1}]}
                ])
                .to_string(),
            )
            .create_async()
            .await;

        let records = api(&server).fetch_records(2025, Some("dev")).await.unwrap();
        mock.assert_async().await;
        assert_eq!(records.len(), 2);
        assert!(matches!(&records[0], PoolRecord::Player(p) if p.name == "Trent"));
        assert!(matches!(&records[1], PoolRecord::Group(g) if !g.is_locked()));
    }

    #[tokio::test]
    async fn client_error_on_list_read_is_empty() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/brackets/2024")
            .with_status(404)
            .create_async()
            .await;
        let records = api(&server).fetch_records(2024, None).await.unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn server_error_is_reported() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/teams/2025")
            .with_status(500)
            .create_async()
            .await;
        let err = api(&server).fetch_season(2025).await.unwrap_err();
        assert!(matches!(err, ApiError::Api(..)));
    }

    #[tokio::test]
    async fn fetch_season_from_store() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/teams/2026")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"[{"index": "A1", "value": "Broncos"}, {"index": "winners", "value": "1200000000000"}]"#)
            .create_async()
            .await;
        let season = api(&server).fetch_season(2026).await.unwrap();
        assert_eq!(season.year, 2026);
        assert_eq!(season.teams.display(Some("A1".parse().unwrap())), "Broncos");
        assert_eq!(season.results.decided_count(), 2);
        assert!(!season.games_started);
    }

    #[tokio::test]
    async fn save_player_posts_the_row() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/brackets")
            .match_body(Matcher::PartialJson(json!({
                "key": "2025dev",
                "player": "Trent",
                "brackets": [{"picks": "1212121212121", "tiebreaker": 44}],
                "devices": ["abc"]
            })))
            .with_status(200)
            .with_body(r#"{"success": "post call succeed!"}"#)
            .create_async()
            .await;

        let player = PlayerRecord {
            key: PoolKey::new(2025, "dev"),
            name: "Trent".into(),
            brackets: vec![BracketEntry { picks: "1212121212121".parse().unwrap(), tiebreaker: 44 }],
            devices: vec!["abc".into()],
        };
        api(&server).save_player(&player).await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn rejected_write_surfaces_the_message() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("DELETE", "/brackets/2025/dev/Trent")
            .with_status(200)
            .with_body(r#"{"error": "Invalid player"}"#)
            .create_async()
            .await;
        let err = api(&server)
            .delete_player(&PoolKey::new(2025, "dev"), "Trent")
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Rejected(msg) if msg == "Invalid player"));
    }

    #[tokio::test]
    async fn admin_updates_are_validated_before_sending() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/teams")
            .match_body(Matcher::Json(json!({"year": 2025, "index": "winners", "value": "1111000000000"})))
            .with_status(200)
            .with_body(r#"{"success": "ok"}"#)
            .create_async()
            .await;
        let api = api(&server);
        api.set_results(2025, &"1111000000000".parse().unwrap()).await.unwrap();
        mock.assert_async().await;

        let err = api.set_team(2025, "A1".parse().unwrap(), "chiefs").await.unwrap_err();
        assert!(matches!(err, ApiError::Invalid(ValidationError::TeamName(_))));
    }
}
