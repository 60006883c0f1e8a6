//! Runtime configuration.
//!
//! Precedence, lowest first: environment defaults, `DRAFTLINE_*` variables, the
//! optional `draftline.ron` file, command-line flags.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use draftline_engine::{ClientSettings, Endpoints, PacerMode, PacerSettings};
use draftline_logging::{draft_debug, draft_info};
use serde::Deserialize;

pub const ENV_ENVIRONMENT: &str = "DRAFTLINE_ENV";
pub const ENV_BASE_URL: &str = "DRAFTLINE_API_BASE_URL";
pub const ENV_API_KEY: &str = "DRAFTLINE_API_KEY";
pub const ENV_TIMEOUT_SECS: &str = "DRAFTLINE_TIMEOUT_SECS";

pub const DEFAULT_CONFIG_FILE: &str = "draftline.ron";

const DEV_BASE_URL: &str = "http://localhost:8000";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    fn parse(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "dev" | "development" => Ok(Environment::Development),
            "prod" | "production" => Ok(Environment::Production),
            other => bail!("{ENV_ENVIRONMENT} must be dev or prod, got {other:?}"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: Environment,
    pub client: ClientSettings,
    pub pacer_mode: PacerMode,
    pub pacer: PacerSettings,
}

impl AppConfig {
    /// Reads the `DRAFTLINE_*` variables through `lookup`.
    ///
    /// Development falls back to a local backend; production needs an explicit
    /// base URL.
    pub fn from_env(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let environment = match lookup(ENV_ENVIRONMENT) {
            Some(value) => Environment::parse(&value)?,
            None => Environment::default(),
        };

        let base_url = match (lookup(ENV_BASE_URL), environment) {
            (Some(url), _) if !url.trim().is_empty() => url.trim().to_string(),
            (_, Environment::Development) => DEV_BASE_URL.to_string(),
            (_, Environment::Production) => {
                bail!("{ENV_BASE_URL} must be set when {ENV_ENVIRONMENT}=prod")
            }
        };

        let timeout_secs = match lookup(ENV_TIMEOUT_SECS) {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .with_context(|| format!("{ENV_TIMEOUT_SECS} must be a whole number of seconds"))?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        let client = ClientSettings {
            base_url,
            api_key: lookup(ENV_API_KEY).unwrap_or_default(),
            sync_timeout: Duration::from_secs(timeout_secs),
            ..ClientSettings::default()
        };

        Ok(Self {
            environment,
            client,
            pacer_mode: PacerMode::Immediate,
            pacer: PacerSettings::default(),
        })
    }

    /// Applies `draftline.ron` style overrides.
    pub fn apply_file(&mut self, file: ConfigFile) -> Result<()> {
        if let Some(base_url) = file.base_url {
            self.client.base_url = base_url;
        }
        if let Some(header) = file.api_key_header {
            self.client.api_key_header = header;
        }
        if let Some(secs) = file.connect_timeout_secs {
            self.client.connect_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = file.stream_timeout_secs {
            self.client.stream_timeout = (secs > 0).then(|| Duration::from_secs(secs));
        }
        if let Some(pacer) = file.pacer {
            if let Some(mode) = pacer.mode {
                self.pacer_mode = mode.parse()?;
            }
            if let Some(ms) = pacer.char_delay_ms {
                self.pacer.char_delay = Duration::from_millis(ms);
            }
            if let Some(ms) = pacer.preroll_ms {
                self.pacer.preroll = Duration::from_millis(ms);
            }
        }
        if let Some(endpoints) = file.endpoints {
            endpoints.apply(&mut self.client.endpoints);
        }
        Ok(())
    }
}

/// Loads `path`, or `None` when it does not exist and `required` is false.
pub fn load_file(path: &Path, required: bool) -> Result<Option<ConfigFile>> {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound && !required => {
            draft_debug!("no config file at {:?}", path);
            return Ok(None);
        }
        Err(err) => {
            return Err(err).with_context(|| format!("reading config file {}", path.display()))
        }
    };
    let file: ConfigFile = ron::from_str(&content)
        .with_context(|| format!("parsing config file {}", path.display()))?;
    draft_info!("loaded config file {:?}", path);
    Ok(Some(file))
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub base_url: Option<String>,
    pub api_key_header: Option<String>,
    pub connect_timeout_secs: Option<u64>,
    /// Zero removes the limit.
    pub stream_timeout_secs: Option<u64>,
    pub pacer: Option<PacerFile>,
    pub endpoints: Option<EndpointsFile>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PacerFile {
    pub mode: Option<String>,
    pub char_delay_ms: Option<u64>,
    pub preroll_ms: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EndpointsFile {
    pub personal_statement: Option<String>,
    pub essay_revision: Option<String>,
    pub resume: Option<String>,
    pub recommendation_letter: Option<String>,
    pub sectional_analysis: Option<String>,
    pub basic_query: Option<String>,
    pub ps_revision: Option<String>,
    pub ps_final_draft: Option<String>,
}

impl EndpointsFile {
    fn apply(self, endpoints: &mut Endpoints) {
        let pairs = [
            (self.personal_statement, &mut endpoints.personal_statement),
            (self.essay_revision, &mut endpoints.essay_revision),
            (self.resume, &mut endpoints.resume),
            (self.recommendation_letter, &mut endpoints.recommendation_letter),
            (self.sectional_analysis, &mut endpoints.sectional_analysis),
            (self.basic_query, &mut endpoints.basic_query),
            (self.ps_revision, &mut endpoints.ps_revision),
            (self.ps_final_draft, &mut endpoints.ps_final_draft),
        ];
        for (value, slot) in pairs {
            if let Some(value) = value {
                *slot = value;
            }
        }
    }
}
