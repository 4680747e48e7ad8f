use serde::Deserialize;
use strum::{Display, EnumString};

use crate::error::AppResult;
use crate::models::DeployParams;

/// Environment variable prefix, e.g. `FALCOSIDEKICK_CHANNEL`
pub const ENV_PREFIX: &str = "FALCOSIDEKICK";

#[derive(Debug, Clone, Copy, Deserialize, Display, EnumString, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_channel")]
    pub channel: String,

    /// `None` follows the newest revision in `channel`
    #[serde(default)]
    pub revision: Option<i64>,

    #[serde(default = "default_juju_binary")]
    pub juju_binary: String,

    #[serde(default)]
    pub log_format: LogFormat,
}

/// How a caller wants to change the configured revision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RevisionOverride {
    #[default]
    Keep,
    Pin(i64),
    /// Explicitly unset, even if the environment pins one
    Latest,
}

fn default_channel() -> String {
    "2.32.0/edge".to_string()
}

fn default_juju_binary() -> String {
    "juju".to_string()
}

impl Config {
    /// Load from `.env` and `FALCOSIDEKICK_*` environment variables.
    ///
    /// Values of the wrong type are rejected rather than replaced by defaults.
    pub fn load() -> AppResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
    }

    pub fn from_source<S>(source: S) -> AppResult<Self>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let settings: Config = config::Config::builder()
            .add_source(source)
            .build()?
            .try_deserialize()?;

        Ok(settings)
    }

    /// Apply caller-supplied overrides on top of the loaded values
    pub fn with_overrides(mut self, channel: Option<String>, revision: RevisionOverride) -> Self {
        if let Some(channel) = channel {
            self.channel = channel;
        }
        match revision {
            RevisionOverride::Keep => {}
            RevisionOverride::Pin(r) => self.revision = Some(r),
            RevisionOverride::Latest => self.revision = None,
        }
        self
    }

    pub fn deploy_params(&self) -> DeployParams {
        DeployParams {
            channel: self.channel.clone(),
            revision: self.revision,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            channel: default_channel(),
            revision: None,
            juju_binary: default_juju_binary(),
            log_format: LogFormat::default(),
        }
    }
}
