//! Country-name reconciliation between the code table and the OECD list.
//!
//! The country-code table and the OECD membership page spell a few countries
//! differently. An [`AliasMap`] rewrites the code-table spelling into the
//! membership spelling. It is a static lookup: a mismatch that is not in the
//! map goes undetected, so new mismatches are fixed by adding an entry to the
//! `aliases` section of the configuration file.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{Error, Result};

/// Spellings observed to differ between countrycode.org and oecd.org.
pub const DEFAULT_ALIASES: &[(&str, &str)] = &[
    ("Slovakia", "Slovak Republic"),
    ("South Korea", "Korea"),
];

/// Fixed substitution table from reference-table names to membership names
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, String>", into = "BTreeMap<String, String>")]
pub struct AliasMap {
    entries: BTreeMap<String, String>,
}

impl AliasMap {
    /// Build a map, rejecting chains (a target that is also a source) so that
    /// one application is always final.
    pub fn new<I, K, V>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let entries: BTreeMap<String, String> = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();

        for (from, to) in &entries {
            if from == to {
                return Err(Error::InvalidAlias {
                    from: from.clone(),
                    to: to.clone(),
                    reason: "alias maps a name to itself",
                });
            }
            if entries.contains_key(to) {
                return Err(Error::InvalidAlias {
                    from: from.clone(),
                    to: to.clone(),
                    reason: "target is itself an alias",
                });
            }
        }

        Ok(Self { entries })
    }

    pub fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Canonical spelling for a single name
    pub fn resolve<'a>(&'a self, name: &'a str) -> &'a str {
        self.entries.get(name).map(String::as_str).unwrap_or(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl Default for AliasMap {
    fn default() -> Self {
        Self {
            entries: DEFAULT_ALIASES
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

impl TryFrom<BTreeMap<String, String>> for AliasMap {
    type Error = Error;

    fn try_from(entries: BTreeMap<String, String>) -> Result<Self> {
        AliasMap::new(entries)
    }
}

impl From<AliasMap> for BTreeMap<String, String> {
    fn from(map: AliasMap) -> Self {
        map.entries
    }
}

/// Apply the alias map once to every name
pub fn reconcile<S: AsRef<str>>(names: &[S], aliases: &AliasMap) -> Vec<String> {
    names
        .iter()
        .map(|name| aliases.resolve(name.as_ref()).to_string())
        .collect()
}
