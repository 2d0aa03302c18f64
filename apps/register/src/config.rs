//! # Register Configuration
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     CAIXA_STORE_NAME, CAIXA_DB_PATH,                                   │
//! │     CAIXA_SEARCH_LIMIT, CAIXA_CURRENCY_SYMBOL                          │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     --config <path>, or register.toml in the platform config dir:      │
//! │     ~/.config/caixa/register.toml (Linux)                              │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [store]
//! name = "Mercadinho São José"
//!
//! [database]
//! path = "/var/lib/caixa/caixa.db"
//!
//! [search]
//! limit = 20
//!
//! [currency]
//! symbol = "R$"
//! decimal_separator = ","
//! thousands_separator = "."
//! ```
//!
//! Configuration is read-only after startup.

use std::path::{Path, PathBuf};

use caixa_core::Money;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

/// File name looked up in the platform config directory.
pub const CONFIG_FILE_NAME: &str = "register.toml";

/// Database file name in the platform data directory.
pub const DEFAULT_DB_FILE_NAME: &str = "caixa.db";

/// Upper bound for `search.limit`.
pub const MAX_SEARCH_LIMIT: u32 = 500;

// =============================================================================
// Config Error
// =============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Could not read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Could not determine the platform data directory")]
    NoDataDir,
}

pub type ConfigResult<T> = Result<T, ConfigError>;

// =============================================================================
// Currency Format
// =============================================================================

/// How money is shown to the cashier.
///
/// Amounts always carry two fractional digits: [`Money`] counts cents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurrencyFormat {
    /// Prefix symbol, separated from the amount by a space. May be empty.
    pub symbol: String,

    pub decimal_separator: char,

    /// `None` disables digit grouping.
    pub thousands_separator: Option<char>,
}

impl Default for CurrencyFormat {
    /// Brazilian real: `R$ 1.234,50`.
    fn default() -> Self {
        CurrencyFormat {
            symbol: "R$".to_string(),
            decimal_separator: ',',
            thousands_separator: Some('.'),
        }
    }
}

impl CurrencyFormat {
    /// Formats an amount for display.
    ///
    /// ## Example
    /// ```rust
    /// use caixa_core::Money;
    /// use caixa_register::config::CurrencyFormat;
    ///
    /// let brl = CurrencyFormat::default();
    /// assert_eq!(brl.format(Money::from_cents(123450)), "R$ 1.234,50");
    /// assert_eq!(brl.format(Money::from_cents(-5)), "-R$ 0,05");
    /// ```
    pub fn format(&self, amount: Money) -> String {
        let cents = amount.cents();
        let major = (cents / 100).unsigned_abs();
        let minor = (cents % 100).unsigned_abs();

        let sign = if cents < 0 { "-" } else { "" };
        let number = format!(
            "{}{}{:02}",
            group_thousands(major, self.thousands_separator),
            self.decimal_separator,
            minor
        );

        if self.symbol.is_empty() {
            format!("{}{}", sign, number)
        } else {
            format!("{}{} {}", sign, self.symbol, number)
        }
    }

    fn validate(&self) -> ConfigResult<()> {
        if self.symbol.chars().count() > 8 {
            return Err(ConfigError::Invalid(
                "currency.symbol must be at most 8 characters".into(),
            ));
        }

        if self.thousands_separator == Some(self.decimal_separator) {
            return Err(ConfigError::Invalid(
                "currency separators must differ".into(),
            ));
        }

        if self.decimal_separator.is_ascii_digit() {
            return Err(ConfigError::Invalid(
                "currency.decimal_separator cannot be a digit".into(),
            ));
        }

        Ok(())
    }
}

fn group_thousands(value: u64, separator: Option<char>) -> String {
    let digits = value.to_string();
    let Some(separator) = separator else {
        return digits;
    };

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, digit) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(separator);
        }
        grouped.push(digit);
    }
    grouped
}

// =============================================================================
// Sections
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Shown in the console banner.
    pub name: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            name: "Meu Caixa".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite file, or `:memory:`. Unset means the platform data dir.
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Maximum number of search results shown.
    pub limit: u32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig { limit: 20 }
    }
}

// =============================================================================
// Register Configuration
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterConfig {
    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub currency: CurrencyFormat,
}

impl RegisterConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file: `config_path` if given (must exist), otherwise
    ///    `register.toml` in the platform config dir (optional)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        let mut config = match config_path {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::NotFound(path));
                }
                Self::from_file(&path)?
            }
            None => match Self::default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                Some(path) => {
                    debug!(?path, "Config file not found, using defaults");
                    Self::default()
                }
                None => Self::default(),
            },
        };

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Reads and parses a TOML file. No overrides, no validation.
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        info!(?path, "Loading register config from file");
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(contents)?)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.store.name.trim().is_empty() {
            return Err(ConfigError::Invalid("store.name must not be empty".into()));
        }

        if self.search.limit == 0 || self.search.limit > MAX_SEARCH_LIMIT {
            return Err(ConfigError::Invalid(format!(
                "search.limit must be between 1 and {}",
                MAX_SEARCH_LIMIT
            )));
        }

        self.currency.validate()
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies `CAIXA_*` overrides from `lookup`.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(name) = lookup("CAIXA_STORE_NAME") {
            self.store.name = name;
        }

        if let Some(path) = lookup("CAIXA_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = Some(PathBuf::from(path));
        }

        if let Some(limit) = lookup("CAIXA_SEARCH_LIMIT") {
            match limit.parse::<u32>() {
                Ok(limit) => self.search.limit = limit,
                Err(_) => warn!(value = %limit, "Ignoring non-numeric CAIXA_SEARCH_LIMIT"),
            }
        }

        if let Some(symbol) = lookup("CAIXA_CURRENCY_SYMBOL") {
            self.currency.symbol = symbol;
        }
    }

    /// Resolves the database path, creating the platform data dir if the
    /// default location is used.
    pub fn database_path(&self) -> ConfigResult<PathBuf> {
        if let Some(path) = &self.database.path {
            return Ok(path.clone());
        }

        let dirs = project_dirs().ok_or(ConfigError::NoDataDir)?;
        let data_dir = dirs.data_dir();
        std::fs::create_dir_all(data_dir)?;

        Ok(data_dir.join(DEFAULT_DB_FILE_NAME))
    }

    fn default_config_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "meucaixa", "caixa")
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_format_brl() {
        let brl = CurrencyFormat::default();
        assert_eq!(brl.format(Money::from_cents(2000)), "R$ 20,00");
        assert_eq!(brl.format(Money::from_cents(1)), "R$ 0,01");
        assert_eq!(brl.format(Money::zero()), "R$ 0,00");
        assert_eq!(brl.format(Money::from_cents(123450)), "R$ 1.234,50");
        assert_eq!(brl.format(Money::from_cents(123456789)), "R$ 1.234.567,89");
        assert_eq!(brl.format(Money::from_cents(-99950)), "-R$ 999,50");
    }

    #[test]
    fn test_format_without_grouping_or_symbol() {
        let plain = CurrencyFormat {
            symbol: String::new(),
            decimal_separator: '.',
            thousands_separator: None,
        };
        assert_eq!(plain.format(Money::from_cents(123456789)), "1234567.89");
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0, Some('.')), "0");
        assert_eq!(group_thousands(999, Some('.')), "999");
        assert_eq!(group_thousands(1000, Some('.')), "1.000");
        assert_eq!(group_thousands(100000, Some(' ')), "100 000");
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = RegisterConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.search.limit, 20);
        assert_eq!(config.currency.symbol, "R$");
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = RegisterConfig::from_toml_str(
            r#"
            [store]
            name = "Mercadinho São José"

            [currency]
            symbol = "US$"
            decimal_separator = "."
            thousands_separator = ","
            "#,
        )
        .unwrap();

        assert_eq!(config.store.name, "Mercadinho São José");
        assert_eq!(config.search.limit, 20);
        assert_eq!(config.database.path, None);
        assert_eq!(
            config.currency.format(Money::from_cents(123450)),
            "US$ 1,234.50"
        );
    }

    #[test]
    fn test_bad_toml_is_parse_error() {
        let err = RegisterConfig::from_toml_str("[search]\nlimit = \"many\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_overrides_win_over_file() {
        let vars: HashMap<&str, &str> = [
            ("CAIXA_STORE_NAME", "Loja Teste"),
            ("CAIXA_DB_PATH", ":memory:"),
            ("CAIXA_SEARCH_LIMIT", "5"),
            ("CAIXA_CURRENCY_SYMBOL", "€"),
        ]
        .into_iter()
        .collect();

        let mut config = RegisterConfig::from_toml_str("[search]\nlimit = 50").unwrap();
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.store.name, "Loja Teste");
        assert_eq!(config.database.path, Some(PathBuf::from(":memory:")));
        assert_eq!(config.search.limit, 5);
        assert_eq!(config.currency.symbol, "€");
    }

    #[test]
    fn test_unparseable_limit_override_is_ignored() {
        let mut config = RegisterConfig::default();
        config.apply_overrides(|key| (key == "CAIXA_SEARCH_LIMIT").then(|| "lots".to_string()));
        assert_eq!(config.search.limit, 20);
    }

    #[test]
    fn test_validation() {
        let mut config = RegisterConfig::default();
        config.search.limit = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = RegisterConfig::default();
        config.currency.thousands_separator = Some(',');
        assert!(config.validate().is_err());

        let mut config = RegisterConfig::default();
        config.store.name = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_explicit_path() {
        let path = std::env::temp_dir().join(format!("caixa-{}.toml", uuid::Uuid::new_v4()));
        std::fs::write(&path, "[search]\nlimit = 7\n[database]\npath = \"x.db\"").unwrap();

        let config = RegisterConfig::from_file(&path).unwrap();
        assert_eq!(config.search.limit, 7);
        assert_eq!(config.database_path().unwrap(), PathBuf::from("x.db"));

        std::fs::remove_file(&path).unwrap();
        assert!(matches!(
            RegisterConfig::load(Some(path)),
            Err(ConfigError::NotFound(_))
        ));
    }

    #[test]
    fn test_toml_serialization() {
        let toml_str = toml::to_string_pretty(&RegisterConfig::default()).unwrap();
        assert!(toml_str.contains("[store]"));
        assert!(toml_str.contains("[currency]"));
    }
}
