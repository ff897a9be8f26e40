use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

use crate::error::{Error, Result};

/// Subject code of the both-sexes series
pub const TOTAL_SUBJECT: &str = "TOT";

/// One long-format row of the OECD life-expectancy export
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Observation {
    #[serde(rename = "LOCATION")]
    pub entity_code: String,
    #[serde(rename = "TIME")]
    pub time_period: i32,
    #[serde(rename = "SUBJECT")]
    pub category: String,
    #[serde(rename = "Value")]
    pub value: f64,
}

impl Observation {
    pub fn new(
        entity_code: impl Into<String>,
        time_period: i32,
        category: impl Into<String>,
        value: f64,
    ) -> Self {
        Self {
            entity_code: entity_code.into(),
            time_period,
            category: category.into(),
            value,
        }
    }

    pub fn is_total(&self) -> bool {
        self.category == TOTAL_SUBJECT
    }
}

/// Load the OECD CSV export. Columns other than LOCATION, TIME, SUBJECT and
/// Value are ignored.
pub fn load_observations(path: &Path) -> Result<Vec<Observation>> {
    if !path.exists() {
        return Err(Error::io(
            path,
            std::io::Error::new(std::io::ErrorKind::NotFound, "data file not found"),
        ));
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| Error::csv(path, e))?;

    let mut observations = Vec::new();
    for result in reader.deserialize::<Observation>() {
        let row = result.map_err(|e| Error::csv(path, e))?;
        observations.push(row);
    }

    info!(path = %path.display(), rows = observations.len(), "loaded observations");
    debug!(
        first_year = observations.iter().map(|o| o.time_period).min(),
        last_year = observations.iter().map(|o| o.time_period).max(),
        "observation year range"
    );

    Ok(observations)
}
