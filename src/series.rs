//! Per-country life expectancy over a set of years.

use std::collections::BTreeSet;
use tracing::info;

use crate::error::Result;
use crate::parser::Observation;
use crate::reconcile::AliasMap;
use crate::reference::ReferenceTable;
use crate::table::{pivot, WideTable};

/// Index label of time-series tables
pub const TIME_INDEX: &str = "TIME";

/// Years from `start` to `end` inclusive, every `step` years
pub fn year_range(start: i32, end: i32, step: usize) -> Vec<i32> {
    (start..=end).step_by(step.max(1)).collect()
}

/// One row per requested year present in the data, ascending. Years with no
/// observations are left out rather than filled.
pub fn entity_series(
    observations: &[Observation],
    names: &ReferenceTable,
    aliases: &AliasMap,
    entity_name: &str,
    years: &[i32],
) -> Result<WideTable<i32>> {
    let code = names.code_for(entity_name, aliases)?;
    let wanted: BTreeSet<i32> = years.iter().copied().collect();

    let table = pivot(
        TIME_INDEX,
        observations
            .iter()
            .filter(|o| o.entity_code == code && wanted.contains(&o.time_period))
            .map(|o| (o.time_period, o.category.as_str(), o.value)),
    )?;

    info!(
        entity = entity_name,
        code,
        requested = wanted.len(),
        found = table.len(),
        "extracted time series"
    );
    Ok(table)
}
