// Configuration management with layered configuration (file, env)

use crate::errors::ValidationError;
use crate::models::{DateFormat, FamilyKind};
use crate::schedule::{parse_cron_expression, parse_timezone};
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

/// Main settings structure containing all configuration options
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub database: DatabaseConfig,
    pub scheduler: SchedulerConfig,
    pub delivery: DeliveryConfig,
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    #[serde(default = "default_busy_timeout")]
    pub busy_timeout_seconds: u64,
}

fn default_busy_timeout() -> u64 {
    5
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    pub timezone: String,
    #[serde(default)]
    pub families: Vec<FamilyConfig>,
}

/// One category family: its source, cadences and title table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FamilyConfig {
    pub name: String,
    pub kind: FamilyKind,
    /// Short source tag used as the id prefix
    pub provider: String,
    pub crawl_cron: String,
    pub purge_cron: String,
    #[serde(default)]
    pub date_format: DateFormat,
    #[serde(default)]
    pub topic_prefix: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Category key -> listing endpoint
    #[serde(default)]
    pub categories: BTreeMap<String, String>,
}

fn default_request_timeout() -> u64 {
    10
}

fn default_enabled() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryConfig {
    pub mode: DeliveryMode,
    pub endpoint: String,
    #[serde(default)]
    pub server_key: String,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryMode {
    /// Log messages instead of pushing them
    Log,
    Fcm,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    pub log_level: String,
    pub metrics_port: Option<u16>,
    pub tracing_endpoint: Option<String>,
}

impl Settings {
    /// Load configuration with layered precedence: defaults → file → env
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_path("config")
    }

    /// Load configuration from a specific path
    pub fn load_from_path<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();

        let builder = Config::builder()
            // Start with default configuration
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Add local configuration (not committed to git)
            .add_source(File::from(config_dir.join("local.toml")).required(false))
            // Add environment-specific configuration
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.database.url.is_empty() {
            return Err(ValidationError::MissingField("database.url".to_string()));
        }
        if self.database.max_connections == 0 {
            return Err(invalid(
                "database.max_connections",
                "must be greater than 0",
            ));
        }

        parse_timezone(&self.scheduler.timezone)
            .map_err(|e| invalid("scheduler.timezone", &e.to_string()))?;

        let mut names = HashSet::new();
        let mut boards = HashSet::new();
        for family in &self.scheduler.families {
            family.validate()?;
            if !names.insert(family.name.as_str()) {
                return Err(invalid(
                    "scheduler.families.name",
                    &format!("duplicate family '{}'", family.name),
                ));
            }
            // Two families reading one board under the same tag would share ids
            for category in family.categories.keys() {
                if !boards.insert((family.provider.as_str(), category.to_ascii_lowercase())) {
                    return Err(invalid(
                        &format!("{}.categories", family.name),
                        &format!(
                            "provider '{}' already serves category '{}' in another family",
                            family.provider, category
                        ),
                    ));
                }
            }
        }

        if self.delivery.mode == DeliveryMode::Fcm {
            if self.delivery.endpoint.is_empty() {
                return Err(ValidationError::MissingField("delivery.endpoint".to_string()));
            }
            if self.delivery.server_key.is_empty() {
                return Err(ValidationError::MissingField(
                    "delivery.server_key".to_string(),
                ));
            }
        }
        if self.delivery.timeout_seconds == 0 {
            return Err(invalid("delivery.timeout_seconds", "must be greater than 0"));
        }

        Ok(())
    }
}

impl FamilyConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.is_empty() {
            return Err(ValidationError::MissingField("family.name".to_string()));
        }
        if self.provider.is_empty() {
            return Err(ValidationError::MissingField(format!(
                "{}.provider",
                self.name
            )));
        }
        if self.provider.contains(['-', '_']) {
            // Ids are `<provider>_<category>-<postId>`: the first '_' and '-' split them
            return Err(invalid(
                &format!("{}.provider", self.name),
                "must not contain '-' or '_'",
            ));
        }
        let mut tags = HashSet::new();
        for category in self.categories.keys() {
            if category.is_empty() || category.contains('-') {
                return Err(invalid(
                    &format!("{}.categories", self.name),
                    &format!("category key '{}' must be non-empty and free of '-'", category),
                ));
            }
            if !tags.insert(category.to_ascii_lowercase()) {
                return Err(invalid(
                    &format!("{}.categories", self.name),
                    &format!("category key '{}' differs from another only by case", category),
                ));
            }
        }
        for (field, expression) in [
            ("crawl_cron", &self.crawl_cron),
            ("purge_cron", &self.purge_cron),
        ] {
            parse_cron_expression(expression)
                .map_err(|e| invalid(&format!("{}.{}", self.name, field), &e.to_string()))?;
        }
        if self.request_timeout_seconds == 0 {
            return Err(invalid(
                &format!("{}.request_timeout_seconds", self.name),
                "must be greater than 0",
            ));
        }
        Ok(())
    }
}

fn invalid(field: &str, reason: &str) -> ValidationError {
    ValidationError::InvalidFieldValue {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "sqlite://data/notices.db".to_string(),
                max_connections: 5,
                busy_timeout_seconds: 5,
            },
            scheduler: SchedulerConfig {
                timezone: "Asia/Seoul".to_string(),
                families: Vec::new(),
            },
            delivery: DeliveryConfig {
                mode: DeliveryMode::Log,
                endpoint: "https://fcm.googleapis.com/fcm/send".to_string(),
                server_key: String::new(),
                timeout_seconds: 10,
            },
            observability: ObservabilityConfig {
                log_level: "info".to_string(),
                metrics_port: None,
                tracing_endpoint: None,
            },
        }
    }
}
