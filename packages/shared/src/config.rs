use std::env;
use std::fmt;

pub const DEFAULT_TABLE_NAME: &str = "Games";
pub const DEFAULT_HOST_INDEX: &str = "HostId-StatusDate-index";
pub const DEFAULT_OPPONENT_INDEX: &str = "OpponentId-StatusDate-index";
pub const DEFAULT_QUERY_PAGE_SIZE: usize = 10;
pub const DEFAULT_LIST_LIMIT: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidValue { key: String, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidValue { key, value } => {
                write!(f, "{} must be a positive integer, got '{}'", key, value)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Where the games live and how much of them a listing pulls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameTableConfig {
    pub table_name: String,
    pub host_index: String,
    pub opponent_index: String,
    pub query_page_size: usize,
    pub list_limit: usize,
}

impl Default for GameTableConfig {
    fn default() -> Self {
        GameTableConfig {
            table_name: DEFAULT_TABLE_NAME.to_string(),
            host_index: DEFAULT_HOST_INDEX.to_string(),
            opponent_index: DEFAULT_OPPONENT_INDEX.to_string(),
            query_page_size: DEFAULT_QUERY_PAGE_SIZE,
            list_limit: DEFAULT_LIST_LIMIT,
        }
    }
}

impl GameTableConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`GameTableConfig::from_env`] but reads through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = GameTableConfig::default();
        Ok(GameTableConfig {
            table_name: lookup("GAMES_TABLE").unwrap_or(defaults.table_name),
            host_index: lookup("GAMES_HOST_INDEX").unwrap_or(defaults.host_index),
            opponent_index: lookup("GAMES_OPPONENT_INDEX").unwrap_or(defaults.opponent_index),
            query_page_size: parse_positive(
                "GAMES_QUERY_PAGE_SIZE",
                lookup("GAMES_QUERY_PAGE_SIZE"),
                defaults.query_page_size,
            )?,
            list_limit: parse_positive(
                "GAMES_LIST_LIMIT",
                lookup("GAMES_LIST_LIMIT"),
                defaults.list_limit,
            )?,
        })
    }
}

fn parse_positive(key: &str, raw: Option<String>, default: usize) -> Result<usize, ConfigError> {
    let Some(value) = raw else {
        return Ok(default);
    };
    match value.trim().parse::<usize>() {
        Ok(parsed) if parsed > 0 => Ok(parsed),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_nothing_is_set() {
        let config = GameTableConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, GameTableConfig::default());
        assert_eq!(config.table_name, "Games");
        assert_eq!(config.host_index, "HostId-StatusDate-index");
        assert_eq!(config.opponent_index, "OpponentId-StatusDate-index");
    }

    #[test]
    fn test_overrides_are_applied() -> anyhow::Result<()> {
        let config = GameTableConfig::from_lookup(lookup_from(&[
            ("GAMES_TABLE", "games-dev"),
            ("GAMES_QUERY_PAGE_SIZE", "25"),
            ("GAMES_LIST_LIMIT", " 5 "),
        ]))?;

        assert_eq!(config.table_name, "games-dev");
        assert_eq!(config.query_page_size, 25);
        assert_eq!(config.list_limit, 5);
        Ok(())
    }

    #[test]
    fn test_rejects_zero_and_garbage() {
        let zero = GameTableConfig::from_lookup(lookup_from(&[("GAMES_LIST_LIMIT", "0")]));
        assert_eq!(
            zero.unwrap_err(),
            ConfigError::InvalidValue {
                key: "GAMES_LIST_LIMIT".to_string(),
                value: "0".to_string()
            }
        );

        let garbage =
            GameTableConfig::from_lookup(lookup_from(&[("GAMES_QUERY_PAGE_SIZE", "ten")]));
        assert!(garbage.is_err());
    }
}
