use std::fmt;

use tracing::warn;

use crate::error::ConfigError;

const DEFAULT_BUCKET: &str = "images";
const DEFAULT_PLAYER_FOLDER: &str = "public/players";

/// Settings for the object storage that holds player pictures.
#[derive(Clone, PartialEq, Eq)]
pub struct StorageConfig {
    /// Public base URL of the hosted backend, e.g. `https://<project>.supabase.co`.
    ///
    /// Left empty when unset, which only produces broken image links.
    pub public_base_url: String,
    /// Key sent as both the bearer token and the `apikey` header.
    pub service_key: String,
    pub bucket: String,
    /// Folder inside the bucket that player pictures are uploaded to.
    pub player_folder: String,
}

/// Everything the bot needs to start, read once at startup.
#[derive(Clone)]
pub struct Config {
    pub discord_token: String,
    pub database_url: String,
    pub storage: StorageConfig,
    /// Base URL of the web dashboard hosting the team and points table screens.
    pub dashboard_url: Option<String>,
    /// Discord channel that receives audit and error logs.
    pub log_channel_id: Option<u64>,
}

// Secrets are redacted from debug output.
impl fmt::Debug for StorageConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageConfig")
            .field("public_base_url", &self.public_base_url)
            .field("service_key", &"<redacted>")
            .field("bucket", &self.bucket)
            .field("player_folder", &self.player_folder)
            .finish()
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("discord_token", &"<redacted>")
            .field("database_url", &"<redacted>")
            .field("storage", &self.storage)
            .field("dashboard_url", &self.dashboard_url)
            .field("log_channel_id", &self.log_channel_id)
            .finish()
    }
}

impl Config {
    /// Read the configuration from the process environment.
    ///
    /// In debug builds a `.env` file is loaded first.
    pub fn from_env() -> Result<Self, ConfigError> {
        #[cfg(debug_assertions)]
        dotenv::dotenv().ok();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from any key/value source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let require = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));

        let public_base_url = match get("SUPABASE_URL") {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => {
                warn!("SUPABASE_URL is not set; uploaded player images will have broken links");
                String::new()
            }
        };

        let log_channel_id = match get("LOG_CHANNEL_ID") {
            Some(raw) => match raw.parse::<u64>() {
                Ok(id) if id != 0 => Some(id),
                _ => {
                    return Err(ConfigError::Invalid {
                        name: "LOG_CHANNEL_ID",
                        expected: "a Discord channel id",
                        value: raw,
                    })
                }
            },
            None => None,
        };

        Ok(Self {
            discord_token: require("DISCORD_TOKEN")?,
            database_url: require("DATABASE_URL")?,
            storage: StorageConfig {
                public_base_url,
                service_key: require("SUPABASE_KEY")?,
                bucket: get("STORAGE_BUCKET").unwrap_or_else(|| DEFAULT_BUCKET.to_string()),
                player_folder: get("PLAYER_IMAGE_FOLDER")
                    .map(|folder| folder.trim_matches('/').to_string())
                    .unwrap_or_else(|| DEFAULT_PLAYER_FOLDER.to_string()),
            },
            dashboard_url: get("DASHBOARD_URL").map(|url| url.trim_end_matches('/').to_string()),
            log_channel_id,
        })
    }
}
