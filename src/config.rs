//! Export Configuration - one immutable record per invocation

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Exclusion is enabled but the exclusion prefix is empty")]
    EmptyPrefix,

    #[error("Image scale must be 1, 2 or 3, got {0}")]
    InvalidScale(u8),
}

/// Order in which collated artboards appear in the output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrderingPolicy {
    #[default]
    LeftRightTopBottom,
    TopBottomLeftRight,
    #[serde(alias = "source-list-order")]
    LayerList,
    #[serde(alias = "reversed-source-list-order")]
    LayerListReversed,
    #[serde(alias = "selection-order")]
    Selection,
}

impl OrderingPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LeftRightTopBottom => "left-right-top-bottom",
            Self::TopBottomLeftRight => "top-bottom-left-right",
            Self::LayerList => "layer-list",
            Self::LayerListReversed => "layer-list-reversed",
            Self::Selection => "selection",
        }
    }
}

impl fmt::Display for OrderingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum ImageScale {
    X1,
    X2,
    #[default]
    X3,
}

impl ImageScale {
    pub fn factor(&self) -> u8 {
        match self {
            Self::X1 => 1,
            Self::X2 => 2,
            Self::X3 => 3,
        }
    }
}

impl TryFrom<u8> for ImageScale {
    type Error = ConfigError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::X1),
            2 => Ok(Self::X2),
            3 => Ok(Self::X3),
            other => Err(ConfigError::InvalidScale(other)),
        }
    }
}

impl From<ImageScale> for u8 {
    fn from(scale: ImageScale) -> Self {
        scale.factor()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportConfig {
    #[serde(rename = "exportToImages", default)]
    pub as_images: bool,
    #[serde(rename = "imageExportScale", default)]
    pub image_scale: ImageScale,
    #[serde(default = "default_true")]
    pub exclude_with_prefix: bool,
    #[serde(rename = "exclusionPrefix", default = "default_prefix")]
    pub prefix: String,
    #[serde(rename = "order", default)]
    pub ordering: OrderingPolicy,
}

fn default_true() -> bool { true }
fn default_prefix() -> String { "-".to_string() }

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            as_images: false,
            image_scale: ImageScale::default(),
            exclude_with_prefix: true,
            prefix: default_prefix(),
            ordering: OrderingPolicy::default(),
        }
    }
}

impl ExportConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.exclude_with_prefix && self.prefix.is_empty() {
            return Err(ConfigError::EmptyPrefix);
        }
        Ok(())
    }

    /// True when `name` should be dropped by the exclusion rule.
    pub fn excludes(&self, name: &str) -> bool {
        self.exclude_with_prefix && name.starts_with(&self.prefix)
    }

    pub fn with_ordering(&self, ordering: OrderingPolicy) -> Self {
        Self { ordering, ..self.clone() }
    }
}
