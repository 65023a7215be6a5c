//! Configuration management for the travel planner
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::PlannerError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure for the travel planner
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlannerConfig {
    /// Language-model configuration
    #[serde(default)]
    pub llm: LlmConfig,
    /// Place search configuration
    #[serde(default)]
    pub places: PlacesConfig,
    /// Message delivery configuration
    #[serde(default)]
    pub delivery: DeliveryConfig,
    /// Export configuration
    #[serde(default)]
    pub export: ExportConfig,
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Language-model (Perplexity) settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// API key; generation is disabled without one
    pub api_key: Option<String>,
    /// Base URL of the chat-completions API
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,
    /// Model name
    #[serde(default = "default_llm_model")]
    pub model: String,
}

/// Place search (Google Places) settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacesConfig {
    /// API key; every place is synthetic without one
    pub api_key: Option<String>,
    /// Base URL for the Places API
    #[serde(default = "default_places_base_url")]
    pub base_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_places_timeout")]
    pub timeout_seconds: u32,
    /// Retries for transient failures
    #[serde(default = "default_places_max_retries")]
    pub max_retries: u32,
    /// Number of hotels per plan
    #[serde(default = "default_hotels")]
    pub hotels: usize,
    /// Number of restaurants per plan
    #[serde(default = "default_restaurants")]
    pub restaurants: usize,
    /// Number of attractions per plan
    #[serde(default = "default_attractions")]
    pub attractions: usize,
}

/// Delivery channel selection
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    #[default]
    Whatsapp,
    Email,
}

/// Message delivery settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryConfig {
    /// Which sender to build
    #[serde(default)]
    pub channel: Channel,
    /// Maximum characters per message
    #[serde(default = "default_max_chunk_len")]
    pub max_chunk_len: usize,
    /// Twilio WhatsApp settings
    #[serde(default)]
    pub twilio: TwilioConfig,
    /// SMTP e-mail settings
    #[serde(default)]
    pub email: EmailConfig,
}

/// Twilio credentials and numbers
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TwilioConfig {
    pub account_sid: Option<String>,
    pub auth_token: Option<String>,
    /// Sender, e.g. `whatsapp:+14155238886`
    pub from: Option<String>,
    /// Recipient, e.g. `whatsapp:+15005550006`
    pub to: Option<String>,
    #[serde(default = "default_twilio_base_url")]
    pub base_url: String,
}

/// SMTP credentials and recipient
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    #[serde(default = "default_smtp_relay")]
    pub relay: String,
    pub address: Option<String>,
    pub password: Option<String>,
    pub to: Option<String>,
}

/// Export settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Whether PDF export may be offered
    #[serde(default = "default_pdf_enabled")]
    pub pdf_enabled: bool,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_llm_base_url() -> String {
    "https://api.perplexity.ai".to_string()
}

fn default_llm_model() -> String {
    "sonar-pro".to_string()
}

fn default_places_base_url() -> String {
    "https://maps.googleapis.com/maps/api/place".to_string()
}

fn default_places_timeout() -> u32 {
    8
}

fn default_places_max_retries() -> u32 {
    1
}

fn default_hotels() -> usize {
    5
}

fn default_restaurants() -> usize {
    6
}

fn default_attractions() -> usize {
    8
}

fn default_max_chunk_len() -> usize {
    crate::chunk::DEFAULT_MAX_CHUNK_LEN
}

fn default_twilio_base_url() -> String {
    "https://api.twilio.com".to_string()
}

fn default_smtp_relay() -> String {
    "smtp.gmail.com".to_string()
}

fn default_pdf_enabled() -> bool {
    true
}

fn default_port() -> u16 {
    3000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_llm_base_url(),
            model: default_llm_model(),
        }
    }
}

impl Default for PlacesConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_places_base_url(),
            timeout_seconds: default_places_timeout(),
            max_retries: default_places_max_retries(),
            hotels: default_hotels(),
            restaurants: default_restaurants(),
            attractions: default_attractions(),
        }
    }
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            channel: Channel::default(),
            max_chunk_len: default_max_chunk_len(),
            twilio: TwilioConfig {
                base_url: default_twilio_base_url(),
                ..TwilioConfig::default()
            },
            email: EmailConfig::default(),
        }
    }
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            relay: default_smtp_relay(),
            address: None,
            password: None,
            to: None,
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            pdf_enabled: default_pdf_enabled(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl PlannerConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        // A missing .env file is normal
        let _ = dotenvy::dotenv();

        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // Environment overrides, e.g. TRAVELPLANNER__PLACES__TIMEOUT_SECONDS
        builder = builder.add_source(
            Environment::with_prefix("TRAVELPLANNER")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: PlannerConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_env_credentials(|name| std::env::var(name).ok());
        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("travelplanner").join("config.toml"))
    }

    /// Fill unset credentials from the well-known provider variables
    pub fn apply_env_credentials(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        fn fill(slot: &mut Option<String>, value: Option<String>) {
            if slot.as_deref().is_none_or(str::is_empty) {
                if let Some(value) = value.filter(|v| !v.is_empty()) {
                    *slot = Some(value);
                }
            }
        }

        fill(&mut self.llm.api_key, lookup("PERPLEXITY_API_KEY"));
        fill(&mut self.places.api_key, lookup("GOOGLE_MAPS_API_KEY"));

        let twilio = &mut self.delivery.twilio;
        fill(&mut twilio.account_sid, lookup("TWILIO_ACCOUNT_SID"));
        fill(&mut twilio.auth_token, lookup("TWILIO_AUTH_TOKEN"));
        fill(&mut twilio.from, lookup("TWILIO_WHATSAPP_NUMBER"));
        fill(&mut twilio.to, lookup("USER_WHATSAPP_NUMBER"));

        let email = &mut self.delivery.email;
        fill(&mut email.address, lookup("GMAIL_ADDRESS"));
        fill(&mut email.password, lookup("GMAIL_APP_PASSWORD"));
        fill(&mut email.to, lookup("NOTIFICATION_EMAIL"));
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        if self.llm.base_url.is_empty() {
            self.llm.base_url = default_llm_base_url();
        }
        if self.llm.model.is_empty() {
            self.llm.model = default_llm_model();
        }
        if self.places.base_url.is_empty() {
            self.places.base_url = default_places_base_url();
        }
        if self.places.timeout_seconds == 0 {
            self.places.timeout_seconds = default_places_timeout();
        }
        if self.delivery.max_chunk_len == 0 {
            self.delivery.max_chunk_len = default_max_chunk_len();
        }
        if self.delivery.twilio.base_url.is_empty() {
            self.delivery.twilio.base_url = default_twilio_base_url();
        }
        if self.delivery.email.relay.is_empty() {
            self.delivery.email.relay = default_smtp_relay();
        }
        if self.server.port == 0 {
            self.server.port = default_port();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.places.timeout_seconds > 300 {
            return Err(PlannerError::config("Place search timeout cannot exceed 300 seconds").into());
        }

        if self.places.max_retries > 10 {
            return Err(PlannerError::config("Place search max retries cannot exceed 10").into());
        }

        for (name, count) in [
            ("hotels", self.places.hotels),
            ("restaurants", self.places.restaurants),
            ("attractions", self.places.attractions),
        ] {
            if count > 20 {
                return Err(PlannerError::config(format!(
                    "Number of {name} cannot exceed 20"
                ))
                .into());
            }
        }

        if self.delivery.max_chunk_len > 10_000 {
            return Err(PlannerError::config("Message chunk length cannot exceed 10000").into());
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(PlannerError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(PlannerError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        for (name, url) in [
            ("Language model", &self.llm.base_url),
            ("Place search", &self.places.base_url),
            ("Twilio", &self.delivery.twilio.base_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(PlannerError::config(format!(
                    "{name} base URL must be a valid HTTP or HTTPS URL"
                ))
                .into());
            }
        }

        Ok(())
    }
}
