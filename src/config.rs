//! Configuration for an activation
//!
//! A configuration is resolved once when the linter is activated and is read
//! only afterwards. It can be built in code, or read from:
//! - `.a11yrc.yaml` / `.a11yrc.yml` / `.a11yrc.json` (project-level)
//! - the same names in the home directory (user-level)
//!
//! The custom filter predicate can only be set in code.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Target platform tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Device {
    Desktop,
    Mobile,
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Device::Desktop => write!(f, "desktop"),
            Device::Mobile => write!(f, "mobile"),
        }
    }
}

impl std::str::FromStr for Device {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "desktop" => Ok(Device::Desktop),
            "mobile" => Ok(Device::Mobile),
            _ => Err(format!("Unknown device: {}", s)),
        }
    }
}

/// Whether violations carry a serialization of their source element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IncludeSourceNode {
    #[default]
    Off,
    #[serde(alias = "asString")]
    AsString,
}

/// The custom filter predicate failed
#[derive(Debug, Clone, Error)]
#[error("filter predicate failed: {0}")]
pub struct FilterError(pub String);

impl FilterError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

type FilterFn = dyn Fn(&str, Option<&str>, &str) -> Result<bool, FilterError> + Send + Sync;

/// Predicate over `(tag name, element id, message)`; `false` suppresses the
/// violation
#[derive(Clone)]
pub struct CustomFilter(Arc<FilterFn>);

impl CustomFilter {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&str, Option<&str>, &str) -> Result<bool, FilterError> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn allows(&self, tag: &str, id: Option<&str>, message: &str) -> Result<bool, FilterError> {
        (self.0)(tag, id, message)
    }
}

impl fmt::Debug for CustomFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CustomFilter(..)")
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Rule ids to suppress
    pub exclude: Vec<String>,

    /// Platforms being targeted; `mobile` turns off desktop keyboard rules
    pub device: Vec<Device>,

    /// Custom suppression predicate
    #[serde(skip)]
    pub filter: Option<CustomFilter>,

    /// Attach the source element to violations
    pub include_source_node: IncludeSourceNode,

    /// Prepended to every emitted message
    pub warning_prefix: String,

    /// Run mount-time label rules
    pub label_resolution: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            exclude: Vec::new(),
            device: Vec::new(),
            filter: None,
            include_source_node: IncludeSourceNode::Off,
            warning_prefix: String::new(),
            label_resolution: true,
        }
    }
}

impl Config {
    /// Create default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Suppress a rule by id
    pub fn exclude(mut self, rule_id: &str) -> Self {
        self.exclude.push(rule_id.to_string());
        self
    }

    /// Add a target device
    pub fn with_device(mut self, device: Device) -> Self {
        if !self.device.contains(&device) {
            self.device.push(device);
        }
        self
    }

    /// Set the custom filter predicate
    pub fn with_filter<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, Option<&str>, &str) -> Result<bool, FilterError> + Send + Sync + 'static,
    {
        self.filter = Some(CustomFilter::new(f));
        self
    }

    /// Set whether violations carry their source element
    pub fn with_source_node(mut self, mode: IncludeSourceNode) -> Self {
        self.include_source_node = mode;
        self
    }

    /// Set the warning prefix
    pub fn with_warning_prefix(mut self, prefix: &str) -> Self {
        self.warning_prefix = prefix.to_string();
        self
    }

    /// Disable mount-time label rules
    pub fn without_label_resolution(mut self) -> Self {
        self.label_resolution = false;
        self
    }

    /// Check if a rule id is excluded
    pub fn is_excluded(&self, rule_id: &str) -> bool {
        self.exclude.iter().any(|id| id == rule_id)
    }

    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

        let config: Self = match ext {
            "yaml" | "yml" => serde_yaml::from_str(&content)?,
            "json" => serde_json::from_str(&content)?,
            _ => {
                return Err(ConfigError::Invalid(format!(
                    "Unknown config file format: {}",
                    ext
                )))
            }
        };

        log::debug!("loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Load configuration from default locations
    pub fn load_default() -> Result<Self, ConfigError> {
        let config_names = [".a11yrc.yaml", ".a11yrc.yml", ".a11yrc.json"];

        // Check current directory
        for name in &config_names {
            let path = PathBuf::from(name);
            if path.exists() {
                return Self::load(&path);
            }
        }

        // Check home directory
        if let Some(home) = dirs::home_dir() {
            for name in &config_names {
                let path = home.join(name);
                if path.exists() {
                    return Self::load(&path);
                }
            }
        }

        Ok(Self::default())
    }

    /// Merge another config into this one (other takes precedence)
    pub fn merge(&mut self, other: Self) {
        for id in other.exclude {
            if !self.is_excluded(&id) {
                self.exclude.push(id);
            }
        }
        for device in other.device {
            if !self.device.contains(&device) {
                self.device.push(device);
            }
        }
        if other.filter.is_some() {
            self.filter = other.filter;
        }
        if other.include_source_node != IncludeSourceNode::Off {
            self.include_source_node = other.include_source_node;
        }
        if !other.warning_prefix.is_empty() {
            self.warning_prefix = other.warning_prefix;
        }
        if !other.label_resolution {
            self.label_resolution = false;
        }
    }

    /// Merge CLI arguments into configuration
    pub fn merge_cli(
        &mut self,
        exclude: Option<Vec<String>>,
        device: Option<Vec<Device>>,
        include_source: bool,
        warning_prefix: Option<String>,
    ) {
        if let Some(exclude) = exclude {
            self.merge(Self {
                exclude,
                ..Self::default()
            });
        }
        if let Some(device) = device {
            self.merge(Self {
                device,
                ..Self::default()
            });
        }
        if include_source {
            self.include_source_node = IncludeSourceNode::AsString;
        }
        if let Some(prefix) = warning_prefix {
            self.warning_prefix = prefix;
        }
    }
}
