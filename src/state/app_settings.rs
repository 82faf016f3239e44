use log::{LevelFilter, warn};
use playoff_api::season_year;
use std::path::PathBuf;
use std::str::FromStr;

const DEVICE_ID_LEN: usize = 7;
const DEVICE_ID_ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

#[derive(Debug, Clone)]
pub struct AppSettings {
    pub full_screen: bool,
    pub log_level: Option<LevelFilter>,
    /// Base URL of the bracket store; `None` runs offline on the embedded season.
    pub api_url: Option<String>,
    pub year: u16,
    pub group: String,
    /// Display name used when this device has no player in a group yet.
    pub name: Option<String>,
    pub device_id: String,
    pub season_file: Option<PathBuf>,
    pub config_dir: PathBuf,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            full_screen: false,
            log_level: None,
            api_url: None,
            year: season_year(chrono::Utc::now()),
            group: playoff_api::records::ALL_GROUPS.to_string(),
            name: None,
            device_id: String::new(),
            season_file: None,
            config_dir: PathBuf::from("."),
        }
    }
}

impl AppSettings {
    /// Read settings from `PLAYOFF_POOL_*` environment variables.
    ///
    /// Problems are logged, so the logger must be up before this runs.
    pub fn load() -> Self {
        Self::from_vars(env)
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let config_dir = config_dir(&var);
        let device_id = var("PLAYOFF_POOL_DEVICE_ID")
            .unwrap_or_else(|| load_or_create_device_id(&config_dir));

        let mut settings = Self {
            api_url: var("PLAYOFF_POOL_API"),
            name: var("PLAYOFF_POOL_NAME").or_else(|| var("USER")),
            season_file: var("PLAYOFF_POOL_SEASON_JSON").map(PathBuf::from),
            log_level: var("PLAYOFF_POOL_LOG").and_then(|l| LevelFilter::from_str(&l).ok()),
            device_id,
            config_dir,
            ..Self::default()
        };

        if let Some(year) = var("PLAYOFF_POOL_YEAR") {
            match playoff_api::records::validate_year(&year) {
                Ok(year) => settings.year = year,
                Err(e) => warn!("{e}; using {}", settings.year),
            }
        }
        if let Some(group) = var("PLAYOFF_POOL_GROUP") {
            settings.group = group;
        }
        settings
    }

    pub fn draft_path(&self) -> PathBuf {
        self.config_dir.join(format!("draft_{}.json", self.year))
    }
}

fn env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn config_dir(var: impl Fn(&str) -> Option<String>) -> PathBuf {
    if let Some(config_dir) = var("XDG_CONFIG_HOME") {
        return PathBuf::from(config_dir).join("playoff-pool");
    }
    if let Some(home) = var("HOME") {
        return PathBuf::from(home).join(".config").join("playoff-pool");
    }
    PathBuf::from(".playoff-pool")
}

fn load_or_create_device_id(config_dir: &std::path::Path) -> String {
    let path = config_dir.join("device_id");
    if let Ok(existing) = std::fs::read_to_string(&path) {
        let existing = existing.trim();
        if !existing.is_empty() {
            return existing.to_string();
        }
    }

    let device_id = random_device_id();
    let saved = std::fs::create_dir_all(config_dir)
        .and_then(|_| std::fs::write(&path, &device_id));
    if let Err(e) = saved {
        warn!("could not save device id to {}: {e}", path.display());
    }
    device_id
}

fn random_device_id() -> String {
    (0..DEVICE_ID_LEN)
        .map(|_| char::from(DEVICE_ID_ALPHABET[rand::random_range(0..DEVICE_ID_ALPHABET.len())]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_ids_are_short_lowercase_base36() {
        let id = random_device_id();
        assert_eq!(id.len(), DEVICE_ID_LEN);
        assert!(id.chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    }

    #[test]
    fn device_id_is_reused_once_stored() {
        let dir = std::env::temp_dir().join(format!("playoff-pool-test-{}", random_device_id()));
        let first = load_or_create_device_id(&dir);
        let second = load_or_create_device_id(&dir);
        assert_eq!(first, second);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn bad_year_keeps_the_current_season() {
        let vars = |name: &str| match name {
            "PLAYOFF_POOL_YEAR" => Some("25".to_string()),
            "PLAYOFF_POOL_DEVICE_ID" => Some("abc1234".to_string()),
            "PLAYOFF_POOL_GROUP" => Some("dev".to_string()),
            "HOME" => Some("/home/fan".to_string()),
            _ => None,
        };
        let settings = AppSettings::from_vars(vars);
        assert_eq!(settings.year, AppSettings::default().year);
        assert_eq!(settings.device_id, "abc1234");
        assert_eq!(settings.group, "dev");
        assert_eq!(settings.config_dir, PathBuf::from("/home/fan/.config/playoff-pool"));
        assert_eq!(settings.api_url, None);
    }

    #[test]
    fn draft_path_is_per_year() {
        let settings = AppSettings {
            year: 2026,
            config_dir: PathBuf::from("/tmp/pool"),
            ..AppSettings::default()
        };
        assert_eq!(settings.draft_path(), PathBuf::from("/tmp/pool/draft_2026.json"));
    }
}
