//! Run configuration: file locations, source URLs and the alias table.
//!
//! Loaded once at startup from an optional JSON file; command-line flags
//! override individual fields. Every field has a default, so an empty `{}`
//! file is valid.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::reconcile::AliasMap;

pub const DEFAULT_COUNTRY_CODES_URL: &str = "https://www.countrycode.org/";
pub const DEFAULT_MEMBERS_URL: &str = "https://www.oecd.org/about/members-and-partners/";
pub const DEFAULT_OUTPUT_DIR: &str = "Output_Figures";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SourceConfig {
    pub country_codes_url: String,
    pub members_url: String,
    /// HTTP timeout; the client default applies when unset
    pub timeout_secs: Option<u64>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            country_codes_url: DEFAULT_COUNTRY_CODES_URL.to_string(),
            members_url: DEFAULT_MEMBERS_URL.to_string(),
            timeout_secs: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// OECD life expectancy CSV export
    pub data_file: Option<PathBuf>,
    /// Reference cache directory; platform cache dir when unset
    pub cache_dir: Option<PathBuf>,
    pub output_dir: PathBuf,
    /// Code-table spelling → membership spelling
    pub aliases: AliasMap,
    pub sources: SourceConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_file: None,
            cache_dir: None,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            aliases: AliasMap::default(),
            sources: SourceConfig::default(),
        }
    }
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        serde_json::from_str(&text).map_err(|e| Error::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Read `path` when given, otherwise start from defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Data file from the command line, falling back to the config file
    pub fn data_file(&self, override_path: Option<PathBuf>) -> Result<PathBuf> {
        override_path
            .or_else(|| self.data_file.clone())
            .ok_or_else(|| Error::Config {
                path: PathBuf::from("data_file"),
                reason: "no data file given; pass --data or set data_file".to_string(),
            })
    }
}
