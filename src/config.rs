use std::collections::HashMap;
use std::env;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use tracing::warn;

use crate::model::{BentoBox, BoxShape, create_box};
use crate::types::Size;

/// Source of raw configuration values; returns `None` for unset or blank variables.
type Lookup<'a> = &'a dyn Fn(&str) -> Option<String>;

/// Complete application configuration, loaded from environment variables or default values.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub storage: StorageConfig,
    pub bento: BoxConfig,
    pub suggestion: SuggestionConfig,
    pub log: LogConfig,
}

impl AppConfig {
    /// Creates a configuration from the currently available environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(&env_string)
    }

    /// Creates a configuration from fixed values, e.g. parsed from a file or set in tests.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let values: HashMap<String, String> = pairs
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.trim().to_string()))
            .filter(|(_, v)| !v.is_empty())
            .collect();
        Self::from_lookup(&|name: &str| values.get(name).cloned())
    }

    fn from_lookup(lookup: Lookup<'_>) -> Self {
        Self {
            api: ApiConfig::from_lookup(lookup),
            storage: StorageConfig::from_lookup(lookup),
            bento: BoxConfig::from_lookup(lookup),
            suggestion: SuggestionConfig::from_lookup(lookup),
            log: LogConfig::from_lookup(lookup),
        }
    }
}

/// Configuration for the API server.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    bind_ip: IpAddr,
    display_host: String,
    port: u16,
    docs_enabled: bool,
}

impl ApiConfig {
    const DEFAULT_HOST: &'static str = "0.0.0.0";
    const DEFAULT_BIND_IP: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);
    const DEFAULT_PORT: u16 = 8080;
    const HOST_VAR: &'static str = "BENTO_API_HOST";
    const PORT_VAR: &'static str = "BENTO_API_PORT";
    const DOCS_VAR: &'static str = "BENTO_API_DOCS";

    fn from_lookup(lookup: Lookup<'_>) -> Self {
        let host_value = lookup(Self::HOST_VAR).unwrap_or_else(|| Self::DEFAULT_HOST.to_string());
        let (bind_ip, effective_host) = match host_value.parse::<IpAddr>() {
            Ok(ip) => (ip, host_value),
            Err(err) => {
                warn!(
                    "Could not parse {} ('{}'): {}. Using {}.",
                    Self::HOST_VAR,
                    host_value,
                    err,
                    Self::DEFAULT_HOST
                );
                (Self::DEFAULT_BIND_IP, Self::DEFAULT_HOST.to_string())
            }
        };

        let port = match lookup(Self::PORT_VAR) {
            Some(raw) => match raw.parse::<u16>() {
                Ok(value) if value != 0 => value,
                Ok(_) => {
                    warn!(
                        "{} must not be 0. Using {}.",
                        Self::PORT_VAR,
                        Self::DEFAULT_PORT
                    );
                    Self::DEFAULT_PORT
                }
                Err(err) => {
                    warn!(
                        "Could not parse {} ('{}'): {}. Using {}.",
                        Self::PORT_VAR,
                        raw,
                        err,
                        Self::DEFAULT_PORT
                    );
                    Self::DEFAULT_PORT
                }
            },
            None => Self::DEFAULT_PORT,
        };

        let docs_enabled = lookup(Self::DOCS_VAR)
            .and_then(|raw| parse_bool(&raw, Self::DOCS_VAR))
            .unwrap_or(true);

        Self {
            bind_ip,
            display_host: effective_host,
            port,
            docs_enabled,
        }
    }

    /// Socket address to bind the server to.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_ip, self.port)
    }

    /// Visible hostname for logging and hints.
    pub fn display_host(&self) -> &str {
        &self.display_host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Whether `/docs` and `/docs/openapi.json` are served.
    pub fn docs_enabled(&self) -> bool {
        self.docs_enabled
    }

    /// Indicates whether binding to all interfaces.
    pub fn binds_to_all_interfaces(&self) -> bool {
        match self.bind_ip {
            IpAddr::V4(addr) => addr == Ipv4Addr::UNSPECIFIED,
            IpAddr::V6(addr) => addr == Ipv6Addr::UNSPECIFIED,
        }
    }
}

/// Where persisted collections live.
#[derive(Clone, Debug)]
pub struct StorageConfig {
    data_dir: PathBuf,
}

impl StorageConfig {
    const DEFAULT_DATA_DIR: &'static str = "./data";
    const DATA_DIR_VAR: &'static str = "BENTO_DATA_DIR";

    fn from_lookup(lookup: Lookup<'_>) -> Self {
        let data_dir = lookup(Self::DATA_DIR_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(Self::DEFAULT_DATA_DIR));
        Self { data_dir }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

/// Shape and outer dimensions of the box served by the API.
#[derive(Clone, Debug)]
pub struct BoxConfig {
    shape: BoxShape,
    dimensions: Size,
}

impl BoxConfig {
    pub const DEFAULT_SHAPE: BoxShape = BoxShape::Rectangle;
    pub const DEFAULT_WIDTH: f64 = 300.0;
    pub const DEFAULT_HEIGHT: f64 = 200.0;
    const SHAPE_VAR: &'static str = "BENTO_BOX_SHAPE";
    const WIDTH_VAR: &'static str = "BENTO_BOX_WIDTH";
    const HEIGHT_VAR: &'static str = "BENTO_BOX_HEIGHT";

    fn from_lookup(lookup: Lookup<'_>) -> Self {
        let shape = match lookup(Self::SHAPE_VAR) {
            Some(raw) => BoxShape::from_str(&raw).unwrap_or_else(|err| {
                warn!(
                    "{} is invalid: {}. Using {}.",
                    Self::SHAPE_VAR,
                    err,
                    Self::DEFAULT_SHAPE.as_str()
                );
                Self::DEFAULT_SHAPE
            }),
            None => Self::DEFAULT_SHAPE,
        };

        let width = load_f64_with_warning(
            lookup,
            Self::WIDTH_VAR,
            Self::DEFAULT_WIDTH,
            |value| value.is_finite() && value > 0.0,
            "must be greater than 0",
        );
        let height = load_f64_with_warning(
            lookup,
            Self::HEIGHT_VAR,
            Self::DEFAULT_HEIGHT,
            |value| value.is_finite() && value > 0.0,
            "must be greater than 0",
        );

        Self {
            shape,
            dimensions: Size::new(width, height),
        }
    }

    pub fn shape(&self) -> BoxShape {
        self.shape
    }

    pub fn dimensions(&self) -> Size {
        self.dimensions
    }

    /// Whether `bento` was built from this configuration.
    pub fn matches(&self, bento: &BentoBox) -> bool {
        bento.shape == self.shape && bento.dimensions == self.dimensions
    }

    /// Builds a fresh box with the default two-partition layout.
    pub fn build_box(&self) -> BentoBox {
        create_box(self.shape, self.dimensions, None)
    }
}

#[derive(Clone, Debug)]
pub struct SuggestionConfig {
    default_limit: usize,
}

impl SuggestionConfig {
    pub const DEFAULT_LIMIT: usize = 5;
    const LIMIT_VAR: &'static str = "BENTO_SUGGESTION_LIMIT";

    fn from_lookup(lookup: Lookup<'_>) -> Self {
        let default_limit = match lookup(Self::LIMIT_VAR) {
            Some(raw) => raw.parse::<usize>().unwrap_or_else(|err| {
                warn!(
                    "Could not parse {} ('{}'): {}. Using {}.",
                    Self::LIMIT_VAR,
                    raw,
                    err,
                    Self::DEFAULT_LIMIT
                );
                Self::DEFAULT_LIMIT
            }),
            None => Self::DEFAULT_LIMIT,
        };
        Self { default_limit }
    }

    /// Number of suggestions returned when a request names no limit; 0 means all.
    pub fn default_limit(&self) -> usize {
        self.default_limit
    }
}

impl Default for SuggestionConfig {
    fn default() -> Self {
        Self {
            default_limit: Self::DEFAULT_LIMIT,
        }
    }
}

#[derive(Clone, Debug)]
pub struct LogConfig {
    level: String,
}

impl LogConfig {
    const DEFAULT_LEVEL: &'static str = "info";
    const LEVEL_VAR: &'static str = "BENTO_LOG_LEVEL";

    /// Reads only the log level, so logging can be installed before the rest of
    /// the configuration reports its warnings.
    pub fn from_env() -> Self {
        Self::from_lookup(&env_string)
    }

    fn from_lookup(lookup: Lookup<'_>) -> Self {
        Self {
            level: lookup(Self::LEVEL_VAR).unwrap_or_else(|| Self::DEFAULT_LEVEL.to_string()),
        }
    }

    /// Filter directive used when `RUST_LOG` is not set.
    pub fn level(&self) -> &str {
        &self.level
    }
}

fn env_string(name: &str) -> Option<String> {
    match env::var(name) {
        Ok(value) => {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_owned())
            }
        }
        Err(env::VarError::NotPresent) => None,
        Err(err) => {
            warn!("Access to {} failed: {}. Using default value.", name, err);
            None
        }
    }
}

fn parse_bool(raw: &str, var_name: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" | "on" => Some(true),
        "0" | "false" | "no" | "n" | "off" => Some(false),
        other => {
            warn!(
                "Could not interpret {} ('{}') as boolean value. Using default value.",
                var_name, other
            );
            None
        }
    }
}

fn load_f64_with_warning(
    lookup: Lookup<'_>,
    var_name: &str,
    default: f64,
    validator: impl Fn(f64) -> bool,
    invalid_hint: &str,
) -> f64 {
    match lookup(var_name) {
        Some(raw) => match raw.parse::<f64>() {
            Ok(value) if validator(value) => value,
            Ok(_) => {
                warn!(
                    "{} contains invalid value '{}': {}. Using {}.",
                    var_name, raw, invalid_hint, default
                );
                default
            }
            Err(err) => {
                warn!(
                    "Could not parse {} ('{}') as number: {}. Using {}.",
                    var_name, raw, err, default
                );
                default
            }
        },
        None => default,
    }
}
