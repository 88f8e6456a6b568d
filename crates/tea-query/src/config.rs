//! Query engine configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::LoadError;

pub const DEFAULT_PAGE_SIZE: u32 = 100;
pub const DEFAULT_MAX_PAGE_SIZE: u32 = 10_000;

/// Which name of a metadata object is shown in labels and metadata items.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DisplayProperty {
    #[default]
    Name,
    Shortname,
}

impl DisplayProperty {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_uppercase().as_str() {
            "NAME" => Some(Self::Name),
            "SHORTNAME" | "SHORT_NAME" => Some(Self::Shortname),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct QueryConfig {
    /// Page size when the request does not set one.
    pub default_page_size: u32,
    /// Upper bound applied to requested page sizes.
    pub max_page_size: u32,
    /// When false the geometry, longitude and latitude columns are omitted.
    pub spatial_support: bool,
    /// Organisation units substituted for `USER_ORGUNIT`.
    pub user_org_units: Vec<String>,
    pub display_property: DisplayProperty,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
            spatial_support: true,
            user_org_units: Vec::new(),
            display_property: DisplayProperty::Name,
        }
    }
}

impl QueryConfig {
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let contents = std::fs::read_to_string(path).map_err(|e| LoadError::io(path, e))?;
        let config: Self = toml::from_str(&contents).map_err(|e| LoadError::Toml {
            path: path.to_path_buf(),
            source: e,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), LoadError> {
        if self.max_page_size == 0 {
            return Err(LoadError::InvalidConfig {
                message: "max_page_size must be positive".to_string(),
            });
        }
        if self.default_page_size > self.max_page_size {
            return Err(LoadError::InvalidConfig {
                message: format!(
                    "default_page_size {} exceeds max_page_size {}",
                    self.default_page_size, self.max_page_size
                ),
            });
        }
        Ok(())
    }
}
