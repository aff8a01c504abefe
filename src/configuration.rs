use std::path::Path;
use std::str::FromStr;

use config::{Config, ConfigError, File};
use secrecy::{ExposeSecret, Secret};
use serde_aux::field_attributes::{
    deserialize_number_from_string, deserialize_option_number_from_string,
};

#[derive(serde::Deserialize, Clone)]
pub struct Settings {
    pub backend: BackendSettings,
    pub geocoding: GeocodingSettings,
    #[serde(default)]
    pub device: DeviceSettings,
    pub notifications: NotificationSettings,
    #[serde(default)]
    pub dashboard: DashboardSettings,
}

#[derive(serde::Deserialize, Clone)]
pub struct BackendSettings {
    pub base_url: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub timeout_secs: u64,
}

#[derive(serde::Deserialize, Clone)]
pub struct GeocodingSettings {
    pub primary_url: String,
    #[serde(default)]
    pub primary_key: Option<Secret<String>>,
    pub fallback_url: String,
    #[serde(default = "default_zoom", deserialize_with = "deserialize_number_from_string")]
    pub fallback_zoom: u8,
    pub user_agent: String,
}

fn default_zoom() -> u8 {
    9
}

impl GeocodingSettings {
    /// The primary provider key, if one is actually configured.
    pub fn primary_key(&self) -> Option<&Secret<String>> {
        self.primary_key
            .as_ref()
            .filter(|k| !k.expose_secret().trim().is_empty())
    }
}

/// Stand-in for the device position on hosts without a location sensor.
#[derive(serde::Deserialize, Clone, Default)]
pub struct DeviceSettings {
    #[serde(default, deserialize_with = "deserialize_option_number_from_string")]
    pub latitude: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_option_number_from_string")]
    pub longitude: Option<f64>,
}

#[derive(serde::Deserialize, Clone)]
pub struct AuthSettings {
    pub username: String,
    pub password: Secret<String>,
}

#[derive(serde::Deserialize, Clone)]
pub struct NotificationSettings {
    #[serde(default)]
    pub enabled: bool,
    pub protocol: String,
    pub host: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
    pub auth: AuthSettings,
    pub queue: String,
}

impl NotificationSettings {
    pub fn connection_string(&self) -> Secret<String> {
        Secret::new(format!(
            "{}://{}:{}@{}:{}/{}",
            self.protocol,
            self.auth.username,
            self.auth.password.expose_secret(),
            self.host,
            self.port,
            self.auth.username
        ))
    }
}

#[derive(serde::Deserialize, Clone, Default)]
pub struct DashboardSettings {
    /// Districts to compare once the directory is loaded.
    #[serde(default)]
    pub compare: Vec<u32>,
}

pub fn get_configuration() -> Result<Settings, ConfigError> {
    let base_path = std::env::current_dir()
        .map_err(|e| ConfigError::Message(format!("Failed to determine the current directory: {}", e)))?;
    get_configuration_from(&base_path.join("configuration"))
}

pub fn get_configuration_from(configuration_directory: &Path) -> Result<Settings, ConfigError> {
    let environment = Environment::current()?;

    let config = Config::builder()
        .add_source(File::from(configuration_directory.join("base")).required(true))
        .add_source(File::from(configuration_directory.join(environment.file_stem())).required(true))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    config.try_deserialize()
}

/// Which file is layered over `base`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Environment {
    Local,
    Production,
}

impl Environment {
    /// Read from `APP_ENVIRONMENT`; unset means local.
    pub fn current() -> Result<Self, ConfigError> {
        match std::env::var("APP_ENVIRONMENT") {
            Ok(value) => value.parse(),
            Err(_) => Ok(Environment::Local),
        }
    }

    pub fn file_stem(self) -> &'static str {
        match self {
            Environment::Local => "local",
            Environment::Production => "production",
        }
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "local" => Ok(Environment::Local),
            "production" => Ok(Environment::Production),
            other => Err(ConfigError::Message(format!(
                "unsupported APP_ENVIRONMENT `{}`, expected `local` or `production`",
                other
            ))),
        }
    }
}
