//! Configuration: runtime gauge settings and their INI persistence.
//!
//! [`GaugeConfig`] is the runtime configuration a [`crate::gauge::Plugin`]
//! consumes. [`ConfigFile`] persists it (plus the network backend timings)
//! as an INI file under the user configuration directory and powers the
//! CLI's `config get/set/list` surface through [`ConfigKey`].
//!
//! Defaults reproduce the behavior of the reference panel: GET against
//! `https://picsum.photos` sized to the panel (500-px square fallback when a
//! dimension is zero or at least 5000), PUT of a fixed two-key JSON document
//! to `https://httpbin.org/anything` with an `accept: application/json`
//! header.

use std::path::PathBuf;
use std::str::FromStr;

use ini::Ini;
use thiserror::Error;
use tracing::debug;

use crate::network::{HttpNetworkConfig, DEFAULT_RETENTION_SECS, DEFAULT_TIMEOUT_SECS};
use crate::request::CompletionPolicy;

/// Default GET base URL.
pub const DEFAULT_GET_URL: &str = "https://picsum.photos";

/// Default PUT target URL.
pub const DEFAULT_PUT_URL: &str = "https://httpbin.org/anything";

/// Default PUT body.
pub const DEFAULT_PUT_BODY: &str = r#"{"key1":"value1", "key2":"value2"}"#;

/// Fallback square size when the panel dimensions are unusable.
pub const DEFAULT_FETCH_SIZE: u32 = 500;

/// Panel dimensions at or above this value fall back to the default size.
pub const MAX_FETCH_DIMENSION: u32 = 5000;

/// Separator between header lines in the INI representation (`;` would
/// collide with INI comments).
const HEADER_SEPARATOR: char = '|';

/// What a gauge does when clicked.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ClickAction {
    /// Submit a GET for a fresh payload.
    #[default]
    Fetch,

    /// Submit the configured PUT upload.
    Upload,
}

impl ClickAction {
    /// Returns the configuration string for this action.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fetch => "fetch",
            Self::Upload => "upload",
        }
    }
}

impl std::fmt::Display for ClickAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ClickAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fetch" => Ok(Self::Fetch),
            "upload" => Ok(Self::Upload),
            other => Err(format!(
                "unknown click action '{}' (expected 'fetch' or 'upload')",
                other
            )),
        }
    }
}

/// Payload store settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoreSettings {
    /// Work directory for payload files.
    pub directory: PathBuf,

    /// Filename stem, e.g. `img`.
    pub stem: String,

    /// Filename extension without the dot, e.g. `jpeg`.
    pub extension: String,
}

impl Default for StoreSettings {
    fn default() -> Self {
        let base = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
        Self {
            directory: base.join("netgauge").join("work"),
            stem: "img".to_string(),
            extension: "jpeg".to_string(),
        }
    }
}

/// Runtime configuration for one plugin's gauges.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GaugeConfig {
    /// GET base URL; panel dimensions are appended as path segments.
    pub get_url: String,

    /// Fallback square size for unusable panel dimensions.
    pub default_size: u32,

    /// Dimension cutoff at or above which the fallback applies.
    pub max_dimension: u32,

    /// PUT target URL.
    pub put_url: String,

    /// Raw `name: value` header lines for the PUT.
    pub put_headers: Vec<String>,

    /// PUT body (expected to be JSON, but sent verbatim).
    pub put_body: String,

    /// What a click triggers.
    pub click_action: ClickAction,

    /// Terminal-handle policy for the tracker.
    pub completion_policy: CompletionPolicy,

    /// Payload store settings.
    pub store: StoreSettings,
}

impl Default for GaugeConfig {
    fn default() -> Self {
        Self {
            get_url: DEFAULT_GET_URL.to_string(),
            default_size: DEFAULT_FETCH_SIZE,
            max_dimension: MAX_FETCH_DIMENSION,
            put_url: DEFAULT_PUT_URL.to_string(),
            put_headers: vec!["accept: application/json".to_string()],
            put_body: DEFAULT_PUT_BODY.to_string(),
            click_action: ClickAction::default(),
            completion_policy: CompletionPolicy::default(),
            store: StoreSettings::default(),
        }
    }
}

/// Errors raised by configuration loading, saving, and key access.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O error reading or writing the config file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The INI file could not be parsed.
    #[error("Failed to parse config: {0}")]
    Parse(String),

    /// A value does not parse for its key.
    #[error("Invalid value for {key}: {message}")]
    InvalidValue {
        /// The offending key.
        key: &'static str,
        /// Why the value was rejected.
        message: String,
    },
}

/// Returns the path of the user configuration file.
pub fn config_file_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("netgauge")
        .join("config.ini")
}

/// Persisted configuration: gauge settings plus backend timings.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConfigFile {
    /// Gauge settings (sections `[network]`, `[store]`, `[gauge]`).
    pub gauge: GaugeConfig,

    /// Per-request timeout in seconds.
    pub timeout_secs: Option<u64>,

    /// Terminal-slot retention in seconds.
    pub retention_secs: Option<u64>,
}

impl ConfigFile {
    /// Loads the configuration from the default path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file exists but cannot be read or
    /// parsed. A missing file is not an error; defaults are returned.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&config_file_path())
    }

    /// Loads the configuration from a specific path.
    ///
    /// # Errors
    ///
    /// Same as [`ConfigFile::load`].
    pub fn load_from(path: &std::path::Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path).map_err(|e| ConfigError::Parse(e.to_string()))?;
        let mut config = Self::default();

        if let Some(section) = ini.section(Some("network")) {
            if let Some(v) = section.get("get_url") {
                config.gauge.get_url = v.to_string();
            }
            if let Some(v) = section.get("put_url") {
                config.gauge.put_url = v.to_string();
            }
            if let Some(v) = section.get("put_headers") {
                config.gauge.put_headers = split_headers(v);
            }
            if let Some(v) = section.get("put_body") {
                config.gauge.put_body = v.to_string();
            }
            if let Some(v) = section.get("timeout_secs") {
                config.timeout_secs = Some(parse_value("network.timeout_secs", v)?);
            }
            if let Some(v) = section.get("retention_secs") {
                config.retention_secs = Some(parse_value("network.retention_secs", v)?);
            }
        }

        if let Some(section) = ini.section(Some("store")) {
            if let Some(v) = section.get("directory") {
                config.gauge.store.directory = PathBuf::from(v);
            }
            if let Some(v) = section.get("stem") {
                config.gauge.store.stem = v.to_string();
            }
            if let Some(v) = section.get("extension") {
                config.gauge.store.extension = v.to_string();
            }
        }

        if let Some(section) = ini.section(Some("gauge")) {
            if let Some(v) = section.get("default_size") {
                config.gauge.default_size = parse_value("gauge.default_size", v)?;
            }
            if let Some(v) = section.get("max_dimension") {
                config.gauge.max_dimension = parse_value("gauge.max_dimension", v)?;
            }
            if let Some(v) = section.get("completion_policy") {
                config.gauge.completion_policy = parse_value("gauge.completion_policy", v)?;
            }
            if let Some(v) = section.get("click_action") {
                config.gauge.click_action = parse_value("gauge.click_action", v)?;
            }
        }

        Ok(config)
    }

    /// Saves the configuration to the default path, creating parent
    /// directories as needed.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] on write failure.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&config_file_path())
    }

    /// Saves the configuration to a specific path.
    ///
    /// # Errors
    ///
    /// Same as [`ConfigFile::save`].
    pub fn save_to(&self, path: &std::path::Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut ini = Ini::new();
        let network = Some("network");
        ini.set_to(network, "get_url".to_string(), self.gauge.get_url.clone());
        ini.set_to(network, "put_url".to_string(), self.gauge.put_url.clone());
        ini.set_to(
            network,
            "put_headers".to_string(),
            join_headers(&self.gauge.put_headers),
        );
        ini.set_to(network, "put_body".to_string(), self.gauge.put_body.clone());
        if let Some(secs) = self.timeout_secs {
            ini.set_to(network, "timeout_secs".to_string(), secs.to_string());
        }
        if let Some(secs) = self.retention_secs {
            ini.set_to(network, "retention_secs".to_string(), secs.to_string());
        }

        let store = Some("store");
        ini.set_to(
            store,
            "directory".to_string(),
            self.gauge.store.directory.to_string_lossy().to_string(),
        );
        ini.set_to(store, "stem".to_string(), self.gauge.store.stem.clone());
        ini.set_to(
            store,
            "extension".to_string(),
            self.gauge.store.extension.clone(),
        );

        let gauge = Some("gauge");
        ini.set_to(
            gauge,
            "default_size".to_string(),
            self.gauge.default_size.to_string(),
        );
        ini.set_to(
            gauge,
            "max_dimension".to_string(),
            self.gauge.max_dimension.to_string(),
        );
        ini.set_to(
            gauge,
            "completion_policy".to_string(),
            self.gauge.completion_policy.to_string(),
        );
        ini.set_to(
            gauge,
            "click_action".to_string(),
            self.gauge.click_action.to_string(),
        );

        ini.write_to_file(path)?;
        debug!(path = %path.display(), "config saved");
        Ok(())
    }

    /// Builds the backend configuration from the persisted timings.
    pub fn http_config(&self) -> HttpNetworkConfig {
        HttpNetworkConfig {
            timeout: std::time::Duration::from_secs(
                self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
            ),
            retention: std::time::Duration::from_secs(
                self.retention_secs.unwrap_or(DEFAULT_RETENTION_SECS),
            ),
        }
    }
}

fn split_headers(value: &str) -> Vec<String> {
    value
        .split(HEADER_SEPARATOR)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn join_headers(headers: &[String]) -> String {
    headers.join(&HEADER_SEPARATOR.to_string())
}

fn parse_value<T: FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e: T::Err| ConfigError::InvalidValue {
            key,
            message: e.to_string(),
        })
}

/// Addressable configuration keys for the CLI surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfigKey {
    NetworkGetUrl,
    NetworkPutUrl,
    NetworkPutHeaders,
    NetworkPutBody,
    NetworkTimeoutSecs,
    NetworkRetentionSecs,
    StoreDirectory,
    StoreStem,
    StoreExtension,
    GaugeDefaultSize,
    GaugeMaxDimension,
    GaugeCompletionPolicy,
    GaugeClickAction,
}

impl ConfigKey {
    /// All keys, in listing order.
    pub const ALL: [ConfigKey; 13] = [
        ConfigKey::NetworkGetUrl,
        ConfigKey::NetworkPutUrl,
        ConfigKey::NetworkPutHeaders,
        ConfigKey::NetworkPutBody,
        ConfigKey::NetworkTimeoutSecs,
        ConfigKey::NetworkRetentionSecs,
        ConfigKey::StoreDirectory,
        ConfigKey::StoreStem,
        ConfigKey::StoreExtension,
        ConfigKey::GaugeDefaultSize,
        ConfigKey::GaugeMaxDimension,
        ConfigKey::GaugeCompletionPolicy,
        ConfigKey::GaugeClickAction,
    ];

    /// The `section.key` name of this key.
    pub fn name(&self) -> &'static str {
        match self {
            Self::NetworkGetUrl => "network.get_url",
            Self::NetworkPutUrl => "network.put_url",
            Self::NetworkPutHeaders => "network.put_headers",
            Self::NetworkPutBody => "network.put_body",
            Self::NetworkTimeoutSecs => "network.timeout_secs",
            Self::NetworkRetentionSecs => "network.retention_secs",
            Self::StoreDirectory => "store.directory",
            Self::StoreStem => "store.stem",
            Self::StoreExtension => "store.extension",
            Self::GaugeDefaultSize => "gauge.default_size",
            Self::GaugeMaxDimension => "gauge.max_dimension",
            Self::GaugeCompletionPolicy => "gauge.completion_policy",
            Self::GaugeClickAction => "gauge.click_action",
        }
    }

    /// Reads this key's current value as a display string.
    pub fn get(&self, config: &ConfigFile) -> String {
        match self {
            Self::NetworkGetUrl => config.gauge.get_url.clone(),
            Self::NetworkPutUrl => config.gauge.put_url.clone(),
            Self::NetworkPutHeaders => join_headers(&config.gauge.put_headers),
            Self::NetworkPutBody => config.gauge.put_body.clone(),
            Self::NetworkTimeoutSecs => config
                .timeout_secs
                .map(|s| s.to_string())
                .unwrap_or_default(),
            Self::NetworkRetentionSecs => config
                .retention_secs
                .map(|s| s.to_string())
                .unwrap_or_default(),
            Self::StoreDirectory => config.gauge.store.directory.display().to_string(),
            Self::StoreStem => config.gauge.store.stem.clone(),
            Self::StoreExtension => config.gauge.store.extension.clone(),
            Self::GaugeDefaultSize => config.gauge.default_size.to_string(),
            Self::GaugeMaxDimension => config.gauge.max_dimension.to_string(),
            Self::GaugeCompletionPolicy => config.gauge.completion_policy.to_string(),
            Self::GaugeClickAction => config.gauge.click_action.to_string(),
        }
    }

    /// Writes a new value for this key.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if the value does not parse.
    pub fn set(&self, config: &mut ConfigFile, value: &str) -> Result<(), ConfigError> {
        match self {
            Self::NetworkGetUrl => config.gauge.get_url = value.to_string(),
            Self::NetworkPutUrl => config.gauge.put_url = value.to_string(),
            Self::NetworkPutHeaders => config.gauge.put_headers = split_headers(value),
            Self::NetworkPutBody => {
                // Sent verbatim, but flag obviously broken JSON early.
                if serde_json::from_str::<serde_json::Value>(value).is_err() {
                    return Err(ConfigError::InvalidValue {
                        key: self.name(),
                        message: "not valid JSON".to_string(),
                    });
                }
                config.gauge.put_body = value.to_string();
            }
            Self::NetworkTimeoutSecs => {
                config.timeout_secs = Some(parse_value(self.name(), value)?)
            }
            Self::NetworkRetentionSecs => {
                config.retention_secs = Some(parse_value(self.name(), value)?)
            }
            Self::StoreDirectory => config.gauge.store.directory = PathBuf::from(value),
            Self::StoreStem => config.gauge.store.stem = value.to_string(),
            Self::StoreExtension => config.gauge.store.extension = value.to_string(),
            Self::GaugeDefaultSize => {
                config.gauge.default_size = parse_value(self.name(), value)?
            }
            Self::GaugeMaxDimension => {
                config.gauge.max_dimension = parse_value(self.name(), value)?
            }
            Self::GaugeCompletionPolicy => {
                config.gauge.completion_policy = parse_value(self.name(), value)?
            }
            Self::GaugeClickAction => {
                config.gauge.click_action = parse_value(self.name(), value)?
            }
        }
        Ok(())
    }
}

impl std::fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for ConfigKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|key| key.name() == s.trim())
            .copied()
            .ok_or_else(|| format!("unknown configuration key '{}'", s))
    }
}
