//! Top-N countries by total life expectancy for a single year.

use std::collections::HashSet;
use tracing::{debug, info};

use crate::error::Result;
use crate::parser::{Observation, TOTAL_SUBJECT};
use crate::reconcile::AliasMap;
use crate::reference::{MembershipSet, ReferenceTable};
use crate::table::{pivot, WideTable};

pub const DEFAULT_TOP_N: usize = 10;

/// Index label of ranked tables
pub const ENTITY_INDEX: &str = "LOCATION";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankQuery {
    pub year: i32,
    pub top_n: usize,
}

impl RankQuery {
    pub fn new(year: i32) -> Self {
        Self {
            year,
            top_n: DEFAULT_TOP_N,
        }
    }

    pub fn top(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }
}

/// Rank entities for `query.year`, restricted to `members` when given.
///
/// Rows are ordered by ascending total. Ranking ties on value go to the
/// alphabetically first name, so the selection does not depend on row order.
pub fn top_entities(
    observations: &[Observation],
    names: &ReferenceTable,
    aliases: &AliasMap,
    members: Option<&MembershipSet>,
    query: RankQuery,
) -> Result<WideTable<String>> {
    let year_rows: Vec<(&str, &Observation)> = observations
        .iter()
        .filter(|o| o.time_period == query.year)
        .map(|o| (names.canonical_name(&o.entity_code, aliases), o))
        .filter(|(name, _)| members.map_or(true, |m| m.contains(name)))
        .collect();

    let mut totals: Vec<(&str, f64)> = year_rows
        .iter()
        .filter(|(_, o)| o.is_total())
        .map(|(name, o)| (*name, o.value))
        .collect();
    totals.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));

    let mut selected: Vec<&str> = Vec::with_capacity(query.top_n);
    for &(name, _) in &totals {
        if selected.len() == query.top_n {
            break;
        }
        if !selected.contains(&name) {
            selected.push(name);
        }
    }
    debug!(year = query.year, candidates = totals.len(), ?selected, "selected top entities");

    let selected: HashSet<&str> = selected.into_iter().collect();
    let mut table = pivot(
        ENTITY_INDEX,
        year_rows
            .iter()
            .filter(|(name, _)| selected.contains(name))
            .map(|(name, o)| (name.to_string(), o.category.as_str(), o.value)),
    )?;
    table.sort_by_column(TOTAL_SUBJECT);

    info!(
        year = query.year,
        top_n = query.top_n,
        members_only = members.is_some(),
        rows = table.len(),
        "ranked entities"
    );
    Ok(table)
}
