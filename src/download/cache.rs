use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

const COUNTRY_CODES_FILE: &str = "country_codes.csv";
const MEMBERS_FILE: &str = "oecd_members.csv";

/// Location of the scraped reference files on disk.
///
/// Files are overwritten in place on refresh; two processes refreshing at the
/// same time can interleave writes.
#[derive(Debug, Clone)]
pub struct CacheManager {
    cache_dir: PathBuf,
}

impl CacheManager {
    pub fn new(custom_dir: Option<PathBuf>) -> Result<Self> {
        let cache_dir = match custom_dir {
            Some(dir) => dir,
            None => {
                let proj_dirs = ProjectDirs::from("", "", "oecd-life-expectancy").ok_or_else(
                    || Error::Config {
                        path: PathBuf::from("cache_dir"),
                        reason: "could not determine a default cache directory".to_string(),
                    },
                )?;
                proj_dirs.cache_dir().to_path_buf()
            }
        };

        fs::create_dir_all(&cache_dir).map_err(|e| Error::io(&cache_dir, e))?;

        Ok(Self { cache_dir })
    }

    /// Get the cache directory path
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Country code table (`name`, `iso` columns)
    pub fn country_codes_path(&self) -> PathBuf {
        self.cache_dir.join(COUNTRY_CODES_FILE)
    }

    /// OECD member list, one name per line
    pub fn members_path(&self) -> PathBuf {
        self.cache_dir.join(MEMBERS_FILE)
    }

    pub fn has_country_codes(&self) -> bool {
        self.country_codes_path().is_file()
    }

    pub fn has_members(&self) -> bool {
        self.members_path().is_file()
    }
}
