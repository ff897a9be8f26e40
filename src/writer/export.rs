use std::fmt::Display;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::{Error, Result};
use crate::parser::AgeProfile;
use crate::table::WideTable;

/// `LifeExpectancy_2010.csv`
pub fn ranking_file_name(year: i32) -> String {
    format!("LifeExpectancy_{year}.csv")
}

/// First and last years present in a time-series table
pub fn year_span(table: &WideTable<i32>) -> Option<(i32, i32)> {
    Some((*table.keys().next()?, *table.keys().last()?))
}

/// `LifeExpectancy_Canada_(1960_2015).csv`, using the first and last years
/// actually present in the table. Path separators in the entity name become
/// underscores so the file stays inside the output directory.
pub fn series_file_name(entity: &str, table: &WideTable<i32>) -> String {
    let entity: String = entity
        .chars()
        .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
        .collect();
    match year_span(table) {
        Some((start, end)) => format!("LifeExpectancy_{entity}_({start}_{end}).csv"),
        None => format!("LifeExpectancy_{entity}.csv"),
    }
}

pub const AGE_PROFILE_FILE: &str = "SuicideStatistics.csv";

fn create_output(dir: &Path, file_name: &str) -> Result<(PathBuf, csv::Writer<fs::File>)> {
    fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))?;
    let path = dir.join(file_name);
    let writer = csv::Writer::from_path(&path).map_err(|e| Error::csv(&path, e))?;
    Ok((path, writer))
}

/// Write the index column followed by one column per category. Missing cells
/// are left empty.
pub fn write_table<K: Display>(
    dir: &Path,
    file_name: &str,
    table: &WideTable<K>,
) -> Result<PathBuf> {
    let (path, mut writer) = create_output(dir, file_name)?;

    let header = std::iter::once(table.index_name())
        .chain(table.columns().iter().map(String::as_str));
    writer.write_record(header).map_err(|e| Error::csv(&path, e))?;

    for row in table.rows() {
        let record = std::iter::once(row.key.to_string()).chain(
            row.values
                .iter()
                .map(|v| v.map(|v| v.to_string()).unwrap_or_default()),
        );
        writer.write_record(record).map_err(|e| Error::csv(&path, e))?;
    }
    writer.flush().map_err(|e| Error::io(&path, e))?;

    info!(path = %path.display(), rows = table.len(), "wrote table");
    Ok(path)
}

/// Long-format (year, age, value) export of an age profile
pub fn write_age_profile(dir: &Path, profile: &AgeProfile) -> Result<PathBuf> {
    let (path, mut writer) = create_output(dir, AGE_PROFILE_FILE)?;

    writer
        .write_record(["Year", "Age", "Value"])
        .map_err(|e| Error::csv(&path, e))?;
    for rate in profile.to_long() {
        writer
            .write_record([rate.year, rate.age.to_string(), rate.value.to_string()])
            .map_err(|e| Error::csv(&path, e))?;
    }
    writer.flush().map_err(|e| Error::io(&path, e))?;

    info!(path = %path.display(), "wrote age profile");
    Ok(path)
}
