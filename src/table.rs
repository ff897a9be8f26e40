//! Long-to-wide reshaping.
//!
//! A [`WideTable`] has one row per key (entity or year) and one column per
//! category. Pivoting refuses to overwrite a cell: two observations for the
//! same (key, category) are reported as [`Error::DataIntegrity`].

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Display;

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct WideRow<K> {
    pub key: K,
    /// One slot per table column, `None` where the source had no observation
    pub values: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WideTable<K> {
    index_name: String,
    columns: Vec<String>,
    rows: Vec<WideRow<K>>,
}

impl<K> WideTable<K> {
    pub fn index_name(&self) -> &str {
        &self.index_name
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[WideRow<K>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.rows.iter().map(|r| &r.key)
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    /// All values of one column in row order
    pub fn column(&self, column: &str) -> Option<Vec<Option<f64>>> {
        let idx = self.column_index(column)?;
        Some(self.rows.iter().map(|r| r.values[idx]).collect())
    }

    /// Stable sort by a column; rows missing the value go last.
    pub fn sort_by_column(&mut self, column: &str)
    where
        K: Ord,
    {
        let Some(idx) = self.column_index(column) else {
            return;
        };
        self.rows.sort_by(|a, b| {
            let ord = match (a.values[idx], b.values[idx]) {
                (Some(x), Some(y)) => x.total_cmp(&y),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            };
            ord.then_with(|| a.key.cmp(&b.key))
        });
    }
}

impl<K: PartialEq> WideTable<K> {
    pub fn get(&self, key: &K, column: &str) -> Option<f64> {
        let idx = self.column_index(column)?;
        self.rows.iter().find(|r| &r.key == key)?.values[idx]
    }
}

/// Pivot (key, category, value) triples into a wide table with rows ordered by
/// key and columns ordered by category name.
pub fn pivot<K, C, I>(index_name: impl Into<String>, cells: I) -> Result<WideTable<K>>
where
    K: Ord + Clone + Display,
    C: AsRef<str>,
    I: IntoIterator<Item = (K, C, f64)>,
{
    let mut grid: BTreeMap<K, BTreeMap<String, f64>> = BTreeMap::new();
    let mut categories: BTreeSet<String> = BTreeSet::new();

    for (key, category, value) in cells {
        let category = category.as_ref();
        let row = grid.entry(key.clone()).or_default();
        if row.insert(category.to_string(), value).is_some() {
            return Err(Error::DataIntegrity {
                key: key.to_string(),
                category: category.to_string(),
            });
        }
        categories.insert(category.to_string());
    }

    let columns: Vec<String> = categories.into_iter().collect();
    let rows = grid
        .into_iter()
        .map(|(key, mut cells)| WideRow {
            key,
            values: columns.iter().map(|c| cells.remove(c)).collect(),
        })
        .collect();

    Ok(WideTable {
        index_name: index_name.into(),
        columns,
        rows,
    })
}
