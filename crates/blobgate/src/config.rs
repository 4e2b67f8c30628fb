//! Gate configuration.
//!
//! Layered, lowest precedence first:
//!
//! 1. built-in defaults
//! 2. a TOML file (`blobgate.toml` unless another path is given)
//! 3. environment variables, unprefixed (`ALLOWED_USERS`, `MAX_FILE_SIZE`, ...)

use std::path::{Path, PathBuf};

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use blobgate_core::PublicKey;
use blobgate_policy::{AllowList, PolicyError, DEFAULT_MAX_FILE_SIZE};

/// Default configuration file.
pub const DEFAULT_CONFIG_FILE: &str = "blobgate.toml";

/// Environment variables read on top of the file.
pub const ENV_KEYS: [&str; 9] = [
    "ALLOWED_USERS",
    "MAX_FILE_SIZE",
    "BLOB_DIRECTORY",
    "DATABASE_PATH",
    "SERVICE_URL",
    "RELAY_NAME",
    "RELAY_DESCRIPTION",
    "RELAY_ICON_URL",
    "RELAY_PUBKEY",
];

/// Errors from loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A layer could not be read or a value has the wrong type.
    #[error("failed to load configuration: {0}")]
    Load(#[from] Box<figment::Error>),

    /// `ALLOWED_USERS` contains something that is not an identity.
    #[error("ALLOWED_USERS: {0}")]
    AllowList(#[from] PolicyError),

    /// `RELAY_PUBKEY` is not an identity.
    #[error("RELAY_PUBKEY: {0}")]
    RelayPubkey(#[from] blobgate_core::CoreError),
}

impl From<figment::Error> for ConfigError {
    fn from(e: figment::Error) -> Self {
        ConfigError::Load(Box::new(e))
    }
}

/// Everything needed to stand up a gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateConfig {
    /// Comma-separated hex identities allowed to publish, upload and delete.
    pub allowed_users: String,

    /// Largest accepted upload, in bytes.
    pub max_file_size: u64,

    /// Root directory for blob files.
    pub blob_directory: PathBuf,

    /// SQLite event store path.
    pub database_path: PathBuf,

    /// Prefix of the URLs handed out for stored blobs.
    pub service_url: String,

    pub relay_name: String,
    pub relay_description: String,
    pub relay_icon_url: String,
    pub relay_pubkey: String,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            allowed_users: String::new(),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            blob_directory: PathBuf::from("blobs"),
            database_path: PathBuf::from("/tmp/blobgate.db"),
            service_url: "http://0.0.0.0:3334".to_string(),
            relay_name: "my relay".to_string(),
            relay_description: "this is my custom relay".to_string(),
            relay_icon_url: "https://example.com/icon.jpg".to_string(),
            relay_pubkey: "79be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798"
                .to_string(),
        }
    }
}

impl GateConfig {
    /// Load from `blobgate.toml` and the environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(DEFAULT_CONFIG_FILE)
    }

    /// Load from the given TOML file and the environment.
    ///
    /// A missing file is not an error. The result is validated, so a
    /// malformed identity fails here rather than on first use.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let config: GateConfig = Self::figment(path).extract()?;
        config.validate()?;
        Ok(config)
    }

    /// The layered provider, for callers that want to add layers.
    pub fn figment(path: impl AsRef<Path>) -> Figment {
        Figment::new()
            .merge(Serialized::defaults(GateConfig::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::raw().only(&ENV_KEYS))
    }

    /// Check the values that have a stricter shape than their type.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.allow_list()?;
        self.relay_pubkey()?;
        Ok(())
    }

    /// Parse `allowed_users`.
    pub fn allow_list(&self) -> Result<AllowList, ConfigError> {
        Ok(AllowList::from_csv(&self.allowed_users)?)
    }

    /// Parse `relay_pubkey`.
    pub fn relay_pubkey(&self) -> Result<PublicKey, ConfigError> {
        Ok(PublicKey::from_hex(self.relay_pubkey.trim())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    const PK_A: &str = "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
    const PK_B: &str = "bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb";

    #[test]
    fn test_defaults() {
        Jail::expect_with(|_jail| {
            let config = GateConfig::load().map_err(|e| e.to_string())?;
            assert_eq!(config, GateConfig::default());
            assert_eq!(config.max_file_size, 10_485_760);
            assert_eq!(config.blob_directory, PathBuf::from("blobs"));
            assert!(config.allow_list().map_err(|e| e.to_string())?.is_empty());
            Ok(())
        });
    }

    #[test]
    fn test_file_then_env() {
        Jail::expect_with(|jail| {
            jail.create_file(
                DEFAULT_CONFIG_FILE,
                &format!(
                    r#"
                    allowed_users = "{PK_A}"
                    max_file_size = 2048
                    relay_name = "from file"
                    "#
                ),
            )?;
            jail.set_env("MAX_FILE_SIZE", "4096");
            jail.set_env("BLOB_DIRECTORY", "/srv/blobs");

            let config = GateConfig::load().map_err(|e| e.to_string())?;
            assert_eq!(config.max_file_size, 4096);
            assert_eq!(config.blob_directory, PathBuf::from("/srv/blobs"));
            assert_eq!(config.relay_name, "from file");

            let allowed = config.allow_list().map_err(|e| e.to_string())?;
            assert_eq!(allowed.len(), 1);
            Ok(())
        });
    }

    #[test]
    fn test_allowed_users_from_env() {
        Jail::expect_with(|jail| {
            jail.set_env("ALLOWED_USERS", format!("{PK_A}, {PK_B}"));

            let config = GateConfig::load().map_err(|e| e.to_string())?;
            let allowed = config.allow_list().map_err(|e| e.to_string())?;
            assert_eq!(allowed.len(), 2);
            assert!(allowed.contains(&PublicKey::from_hex(PK_B).map_err(|e| e.to_string())?));
            Ok(())
        });
    }

    #[test]
    fn test_unrelated_env_ignored() {
        Jail::expect_with(|jail| {
            jail.set_env("PATH_TO_NOWHERE", "x");
            jail.set_env("HOME_DIRECTORY", "y");
            let config = GateConfig::load().map_err(|e| e.to_string())?;
            assert_eq!(config, GateConfig::default());
            Ok(())
        });
    }

    #[test]
    fn test_malformed_size_fails() {
        Jail::expect_with(|jail| {
            jail.set_env("MAX_FILE_SIZE", "ten megabytes");
            assert!(matches!(GateConfig::load(), Err(ConfigError::Load(_))));
            Ok(())
        });
    }

    #[test]
    fn test_malformed_identity_fails() {
        Jail::expect_with(|jail| {
            jail.set_env("ALLOWED_USERS", format!("{PK_A},pk1"));
            assert!(matches!(GateConfig::load(), Err(ConfigError::AllowList(_))));
            Ok(())
        });
    }

    #[test]
    fn test_explicit_path() {
        Jail::expect_with(|jail| {
            jail.create_file("custom.toml", "service_url = \"https://cdn.example\"")?;
            let config = GateConfig::load_from("custom.toml").map_err(|e| e.to_string())?;
            assert_eq!(config.service_url, "https://cdn.example");
            Ok(())
        });
    }
}
