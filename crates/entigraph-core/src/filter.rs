//! Filter policies selecting which entities make it into a graph

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Inclusion policy applied by the assembler
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterPolicy {
    /// No filtering
    All,
    /// Exclude known system and metadata entities
    Business,
    /// Fixed core set plus custom entities, optionally restricted to prefixes
    CoreAndCustom {
        #[serde(default)]
        include_prefixes: Vec<String>,
    },
    /// Only entities flagged custom
    CustomOnly,
}

impl Default for FilterPolicy {
    fn default() -> Self {
        Self::CoreAndCustom {
            include_prefixes: Vec::new(),
        }
    }
}

impl FilterPolicy {
    /// Build a policy from the `filter_mode` and `prefixes` request parameters
    ///
    /// A missing mode selects `core_custom`. Prefixes are comma separated and
    /// only apply to `core_custom`.
    pub fn parse(mode: Option<&str>, prefixes: Option<&str>) -> Result<Self> {
        let policy = match mode {
            None => Self::default(),
            Some(mode) => mode.parse()?,
        };

        Ok(match policy {
            Self::CoreAndCustom { .. } => Self::CoreAndCustom {
                include_prefixes: prefixes.map(split_prefixes).unwrap_or_default(),
            },
            other => other,
        })
    }

    /// Restrict a core-and-custom policy to the given prefixes
    pub fn with_prefixes(self, prefixes: Vec<String>) -> Self {
        match self {
            Self::CoreAndCustom { .. } => Self::CoreAndCustom {
                include_prefixes: prefixes,
            },
            other => other,
        }
    }

    /// Wire name of the mode
    pub fn mode_name(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Business => "business",
            Self::CoreAndCustom { .. } => "core_custom",
            Self::CustomOnly => "custom",
        }
    }
}

impl FromStr for FilterPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "all" => Ok(Self::All),
            "business" => Ok(Self::Business),
            "core_custom" => Ok(Self::default()),
            "custom" => Ok(Self::CustomOnly),
            other => Err(Error::InvalidFilterMode(other.to_string())),
        }
    }
}

impl fmt::Display for FilterPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CoreAndCustom { include_prefixes } if !include_prefixes.is_empty() => {
                write!(f, "core_custom[{}]", include_prefixes.join(","))
            }
            other => f.write_str(other.mode_name()),
        }
    }
}

/// Split a comma separated prefix list, dropping blanks
pub fn split_prefixes(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

/// Interpret a request limit; only positive values truncate
pub fn positive_limit(limit: Option<i64>) -> Option<usize> {
    limit
        .filter(|l| *l > 0)
        .and_then(|l| usize::try_from(l).ok())
}
