//! Application configuration management.

use std::path::PathBuf;

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Local storage configuration.
    pub storage: StorageConfig,
    /// Credential configuration for the session gate.
    pub auth: AuthConfig,
    /// Ledger behavior switches.
    pub ledger: LedgerConfig,
    /// Display preferences.
    pub display: DisplayConfig,
}

/// Local storage configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding one JSON document per collection.
    pub data_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
        }
    }
}

/// Credential configuration.
///
/// The built-in `admin` / `admin123` pair is a placeholder. Setting
/// `password_hash` switches verification to Argon2 and ignores `password`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Accepted username.
    pub username: String,
    /// Accepted plaintext password (development only).
    pub password: String,
    /// Argon2id PHC string for the accepted password.
    pub password_hash: Option<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            username: "admin".to_string(),
            password: "admin123".to_string(),
            password_hash: None,
        }
    }
}

/// What to do when deleting a deposit would leave the member's balance negative.
///
/// This happens when the deposit funded a withdrawal that was already approved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReversalPolicy {
    /// Reverse anyway and report the overdraft.
    #[default]
    Allow,
    /// Refuse the deletion and leave state unchanged.
    Reject,
}

/// Ledger behavior switches.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Deposit reversal policy.
    pub reversal_policy: ReversalPolicy,
}

/// Display preferences.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Symbol printed before amounts.
    pub currency_symbol: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            currency_symbol: crate::types::money::CURRENCY_SYMBOL.to_string(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// Sources, later ones winning: `config/default`, `config/{RUN_MODE}`,
    /// then `FUNDBOOK__SECTION__KEY` environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("FUNDBOOK").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
