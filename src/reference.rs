//! Country-code reference table and OECD membership set.
//!
//! Both are read from the local cache when present. When the cache file is
//! missing, or a refresh is requested, they are fetched from a
//! [`ReferenceSource`] and the cache is rewritten before returning.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::download::CacheManager;
use crate::error::{Error, Result};
use crate::reconcile::AliasMap;

const CODE_LEN: usize = 3;

/// Row of the country-code table. `iso` is the compound field, e.g. `US / USA`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeRecord {
    pub name: String,
    pub iso: String,
}

/// Where reference data comes from on refresh
pub trait ReferenceSource {
    fn fetch_code_table(&self) -> Result<Vec<CodeRecord>>;
    fn fetch_members(&self) -> Result<Vec<String>>;
}

impl<S: ReferenceSource + ?Sized> ReferenceSource for &S {
    fn fetch_code_table(&self) -> Result<Vec<CodeRecord>> {
        (**self).fetch_code_table()
    }

    fn fetch_members(&self) -> Result<Vec<String>> {
        (**self).fetch_members()
    }
}

/// Take the final three-letter alphabetic token of a compound code field.
pub fn extract_code(compound: &str) -> Option<&str> {
    let token = compound
        .split(|c: char| !c.is_ascii_alphabetic())
        .filter(|t| !t.is_empty())
        .last()?;
    (token.len() == CODE_LEN).then_some(token)
}

/// Code → name mapping, kept in source order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReferenceTable {
    entries: Vec<(String, String)>,
    index: HashMap<String, usize>,
}

impl ReferenceTable {
    pub fn from_pairs<I, C, N>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (C, N)>,
        C: Into<String>,
        N: Into<String>,
    {
        let mut table = Self::default();
        for (code, name) in pairs {
            let code = code.into();
            // First occurrence wins.
            table.index.entry(code.clone()).or_insert(table.entries.len());
            table.entries.push((code, name.into()));
        }
        table
    }

    fn from_records(records: &[CodeRecord]) -> std::result::Result<Self, String> {
        let pairs = records
            .iter()
            .map(|r| {
                extract_code(&r.iso)
                    .map(|code| (code.to_string(), r.name.clone()))
                    .ok_or_else(|| format!("no three-letter code in '{}' ({})", r.iso, r.name))
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Self::from_pairs(pairs))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn name(&self, code: &str) -> Option<&str> {
        self.index
            .get(code)
            .map(|&idx| self.entries[idx].1.as_str())
    }

    /// Reconciled name for a code; unmapped codes pass through unchanged.
    pub fn canonical_name<'a>(&'a self, code: &'a str, aliases: &'a AliasMap) -> &'a str {
        aliases.resolve(self.name(code).unwrap_or(code))
    }

    /// Inverse lookup: first entry whose name, raw or reconciled, matches.
    pub fn code_for(&self, name: &str, aliases: &AliasMap) -> Result<&str> {
        self.entries
            .iter()
            .find(|(_, n)| n == name || aliases.resolve(n) == name)
            .map(|(code, _)| code.as_str())
            .ok_or_else(|| Error::NotFound {
                entity: name.to_string(),
            })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(c, n)| (c.as_str(), n.as_str()))
    }
}

/// Names eligible for top-N ranking
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MembershipSet {
    names: BTreeSet<String>,
}

impl MembershipSet {
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for MembershipSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            names: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Cache-or-refresh access to the reference data
pub struct ReferenceLoader<S> {
    cache: CacheManager,
    source: S,
}

impl<S: ReferenceSource> ReferenceLoader<S> {
    pub fn new(cache: CacheManager, source: S) -> Self {
        Self { cache, source }
    }

    pub fn cache(&self) -> &CacheManager {
        &self.cache
    }

    pub fn get_entity_names(&self, refresh: bool) -> Result<ReferenceTable> {
        let path = self.cache.country_codes_path();

        if !refresh && self.cache.has_country_codes() {
            debug!(path = %path.display(), "using cached country codes");
            return read_code_cache(&path);
        }

        // Validate before touching the cache so a bad page never replaces it.
        let (table, records) = usable_records(self.source.fetch_code_table()?);
        if table.is_empty() {
            return Err(Error::fetch(
                "country code source",
                "no fetched country row has a three-letter code",
            ));
        }

        write_code_cache(&path, &records)?;
        info!(path = %path.display(), countries = table.len(), "refreshed country codes");
        Ok(table)
    }

    pub fn get_membership_set(&self, refresh: bool) -> Result<MembershipSet> {
        let path = self.cache.members_path();

        if refresh || !self.cache.has_members() {
            let members = self.source.fetch_members()?;
            write_members_cache(&path, &members)?;
            info!(path = %path.display(), members = members.len(), "refreshed OECD members");
            return Ok(members.into_iter().collect());
        }

        debug!(path = %path.display(), "using cached OECD members");
        read_members_cache(&path)
    }
}

/// Drop fetched rows without a usable code, keeping the rest in order.
fn usable_records(records: Vec<CodeRecord>) -> (ReferenceTable, Vec<CodeRecord>) {
    let mut pairs = Vec::with_capacity(records.len());
    let mut kept = Vec::with_capacity(records.len());

    for record in records {
        match extract_code(&record.iso) {
            Some(code) => {
                pairs.push((code.to_string(), record.name.clone()));
                kept.push(record);
            }
            None => warn!(
                name = %record.name,
                iso = %record.iso,
                "skipping country without code"
            ),
        }
    }

    (ReferenceTable::from_pairs(pairs), kept)
}

fn write_code_cache(path: &Path, records: &[CodeRecord]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).map_err(|e| Error::csv(path, e))?;
    for record in records {
        writer.serialize(record).map_err(|e| Error::csv(path, e))?;
    }
    writer.flush().map_err(|e| Error::io(path, e))
}

fn read_code_cache(path: &Path) -> Result<ReferenceTable> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| Error::csv(path, e))?;

    let records = reader
        .deserialize::<CodeRecord>()
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::parse(path, e.to_string()))?;

    ReferenceTable::from_records(&records).map_err(|reason| Error::parse(path, reason))
}

fn write_members_cache(path: &Path, members: &[String]) -> Result<()> {
    let mut body = String::new();
    for member in members {
        body.push_str(member);
        body.push('\n');
    }
    fs::write(path, body).map_err(|e| Error::io(path, e))
}

fn read_members_cache(path: &Path) -> Result<MembershipSet> {
    let bytes = fs::read(path).map_err(|e| Error::io(path, e))?;
    let text = String::from_utf8(bytes).map_err(|e| Error::parse(path, e.to_string()))?;

    Ok(text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect())
}
