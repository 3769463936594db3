use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub directory: DirectorySettings,
    pub narrative: NarrativeSettings,
    pub rooms: RoomServiceSettings,
    pub resolution: ResolutionSettings,
    pub scoring: ScoringSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DirectorySettings {
    pub base_url: String,
    pub api_key: String,
    pub page_limit: Option<usize>,
    pub timeout_secs: Option<u64>,
    pub max_cuisine_queries: Option<usize>,
    pub search_radius_meters: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NarrativeSettings {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub timeout_secs: Option<u64>,
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RoomServiceSettings {
    pub base_url: String,
    pub api_key: String,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResolutionSettings {
    pub explanation_count: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScoringSettings {
    #[serde(default)]
    pub weights: WeightsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeightsConfig {
    #[serde(default = "default_cuisine_weight")]
    pub cuisine: f64,
    #[serde(default = "default_vibe_weight")]
    pub vibe: f64,
    #[serde(default = "default_budget_comfort_weight")]
    pub budget_comfort: f64,
    #[serde(default = "default_distance_comfort_weight")]
    pub distance_comfort: f64,
    #[serde(default = "default_variance_penalty")]
    pub variance_penalty: f64,
    #[serde(default = "default_low_floor_penalty")]
    pub low_floor_penalty: f64,
    #[serde(default = "default_low_floor_threshold")]
    pub low_floor_threshold: f64,
    #[serde(default = "default_rating_bonus_cap")]
    pub rating_bonus_cap: f64,
    #[serde(default = "default_cuisine_neutral")]
    pub cuisine_neutral: f64,
}

impl Default for WeightsConfig {
    fn default() -> Self {
        Self {
            cuisine: default_cuisine_weight(),
            vibe: default_vibe_weight(),
            budget_comfort: default_budget_comfort_weight(),
            distance_comfort: default_distance_comfort_weight(),
            variance_penalty: default_variance_penalty(),
            low_floor_penalty: default_low_floor_penalty(),
            low_floor_threshold: default_low_floor_threshold(),
            rating_bonus_cap: default_rating_bonus_cap(),
            cuisine_neutral: default_cuisine_neutral(),
        }
    }
}

fn default_cuisine_weight() -> f64 { 0.4 }
fn default_vibe_weight() -> f64 { 0.2 }
fn default_budget_comfort_weight() -> f64 { 0.2 }
fn default_distance_comfort_weight() -> f64 { 0.2 }
fn default_variance_penalty() -> f64 { 0.6 }
fn default_low_floor_penalty() -> f64 { 0.4 }
fn default_low_floor_threshold() -> f64 { 0.35 }
fn default_rating_bonus_cap() -> f64 { 0.05 }
fn default_cuisine_neutral() -> f64 { 0.65 }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Environment variables (prefixed with MUNCH_)
    pub fn load() -> Result<Self, ConfigError> {
        let mut settings = Config::builder()
            // Add default config file
            .add_source(File::with_name("config/default").required(false))
            // Add local config file (for development overrides)
            .add_source(File::with_name("config/local").required(false))
            // Add environment variables (prefixed with MUNCH_)
            // e.g., MUNCH_SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("MUNCH")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        // Substitute well-known environment variables in string values
        settings = substitute_env_vars(settings)?;

        settings.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("MUNCH")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }
}

/// Substitute API keys from bare environment variables
///
/// Deploy targets usually inject DIRECTORY_API_KEY / NARRATIVE_API_KEY /
/// ROOMS_API_KEY directly rather than through the MUNCH_ prefix scheme.
fn substitute_env_vars(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let directory_api_key = env::var("DIRECTORY_API_KEY")
        .or_else(|_| env::var("MUNCH_DIRECTORY__API_KEY"))
        .ok();
    let narrative_api_key = env::var("NARRATIVE_API_KEY")
        .or_else(|_| env::var("MUNCH_NARRATIVE__API_KEY"))
        .ok();
    let rooms_api_key = env::var("ROOMS_API_KEY")
        .or_else(|_| env::var("MUNCH_ROOMS__API_KEY"))
        .ok();

    let mut builder = Config::builder().add_source(settings);

    if let Some(api_key) = directory_api_key {
        builder = builder.set_override("directory.api_key", api_key)?;
    }
    if let Some(api_key) = narrative_api_key {
        builder = builder.set_override("narrative.api_key", api_key)?;
    }
    if let Some(api_key) = rooms_api_key {
        builder = builder.set_override("rooms.api_key", api_key)?;
    }

    builder.build()
}
