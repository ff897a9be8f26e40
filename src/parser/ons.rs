//! ONS UK suicide statistics, one row per age and one column per year.
//!
//! The first age band (`<10`) carries no data and is dropped. The open-ended
//! last band (`90+`) is placed at age 90.

use std::path::Path;
use tracing::info;

use crate::error::{Error, Result};

const AGE_COLUMN: &str = "Age";
const TOP_AGE: u32 = 90;

#[derive(Debug, Clone, PartialEq)]
pub struct AgeProfile {
    ages: Vec<u32>,
    years: Vec<String>,
    /// rates[year_idx][age_idx]
    rates: Vec<Vec<f64>>,
}

/// A single long-format cell of an [`AgeProfile`]
#[derive(Debug, Clone, PartialEq)]
pub struct AgeRate {
    pub year: String,
    pub age: u32,
    pub value: f64,
}

impl AgeProfile {
    pub fn ages(&self) -> &[u32] {
        &self.ages
    }

    pub fn years(&self) -> &[String] {
        &self.years
    }

    /// (age, value) pairs for one year column
    pub fn series(&self, year: &str) -> Option<Vec<(u32, f64)>> {
        let idx = self.years.iter().position(|y| y == year)?;
        Some(
            self.ages
                .iter()
                .copied()
                .zip(self.rates[idx].iter().copied())
                .collect(),
        )
    }

    /// Age with the highest rate; the youngest wins on ties
    pub fn peak(&self, year: &str) -> Option<(u32, f64)> {
        self.series(year)?
            .into_iter()
            .fold(None, |best: Option<(u32, f64)>, (age, value)| match best {
                Some((_, v)) if v >= value => best,
                _ => Some((age, value)),
            })
    }

    pub fn to_long(&self) -> Vec<AgeRate> {
        let mut rows = Vec::with_capacity(self.years.len() * self.ages.len());
        for (year, rates) in self.years.iter().zip(&self.rates) {
            for (age, value) in self.ages.iter().zip(rates) {
                rows.push(AgeRate {
                    year: year.clone(),
                    age: *age,
                    value: *value,
                });
            }
        }
        rows
    }
}

pub fn load_age_profile(path: &Path) -> Result<AgeProfile> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| Error::csv(path, e))?;

    let headers = reader.headers().map_err(|e| Error::csv(path, e))?.clone();
    let age_idx = headers
        .iter()
        .position(|h| h == AGE_COLUMN)
        .ok_or_else(|| Error::parse(path, "missing Age column"))?;
    let year_cols: Vec<(usize, String)> = headers
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != age_idx)
        .map(|(i, h)| (i, h.to_string()))
        .collect();

    let records = reader
        .records()
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::csv(path, e))?;

    let last = records.len().saturating_sub(1);
    let mut ages = Vec::new();
    let mut rates = vec![Vec::new(); year_cols.len()];

    // Row 0 is the empty <10 band.
    for (row_idx, record) in records.iter().enumerate().skip(1) {
        let raw_age = record.get(age_idx).unwrap_or_default();
        let age = if row_idx == last {
            TOP_AGE
        } else {
            raw_age
                .parse::<u32>()
                .map_err(|_| Error::parse(path, format!("invalid age '{raw_age}'")))?
        };
        ages.push(age);

        for (slot, (col, year)) in rates.iter_mut().zip(&year_cols) {
            let cell = record.get(*col).unwrap_or_default();
            let value = cell.parse::<f64>().map_err(|_| {
                Error::parse(path, format!("invalid rate '{cell}' for age {age} in {year}"))
            })?;
            slot.push(value);
        }
    }

    info!(
        path = %path.display(),
        ages = ages.len(),
        years = year_cols.len(),
        "loaded age profile"
    );

    Ok(AgeProfile {
        ages,
        years: year_cols.into_iter().map(|(_, y)| y).collect(),
        rates,
    })
}
