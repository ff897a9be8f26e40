//! HTML extraction for the two reference pages.

use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::error::{Error, Result};
use crate::reference::CodeRecord;

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector must parse")
}

fn cell_text(el: ElementRef<'_>) -> String {
    // Population and area cells use thousands separators.
    el.text().collect::<String>().trim().replace(',', "")
}

/// Extract the `name` and `iso` columns of countrycode.org's `main-table`.
pub fn parse_country_table(html: &str, url: &str) -> Result<Vec<CodeRecord>> {
    let doc = Html::parse_document(html);

    let table = doc
        .select(&selector("table.main-table"))
        .next()
        .ok_or_else(|| Error::fetch(url, "no table with class 'main-table'"))?;

    let header: Vec<String> = table
        .select(&selector("thead th"))
        .map(|th| th.value().attr("data-field").unwrap_or_default().to_string())
        .collect();
    if header.is_empty() {
        return Err(Error::fetch(url, "main-table has no header row"));
    }

    let column = |field: &str| {
        header
            .iter()
            .position(|h| h == field)
            .ok_or_else(|| Error::fetch(url, format!("main-table has no '{field}' column")))
    };
    let name_idx = column("name")?;
    let iso_idx = column("iso")?;

    let mut records = Vec::new();
    for tr in table.select(&selector("tbody tr")) {
        let cells: Vec<String> = tr.select(&selector("td")).map(cell_text).collect();
        match (cells.get(name_idx), cells.get(iso_idx)) {
            (Some(name), Some(iso)) if !name.is_empty() => records.push(CodeRecord {
                name: name.clone(),
                iso: iso.clone(),
            }),
            _ => debug!(cells = cells.len(), "skipping short country row"),
        }
    }

    if records.is_empty() {
        return Err(Error::fetch(url, "main-table has no data rows"));
    }
    Ok(records)
}

/// Member names from the first `country-list__box` on the OECD members page.
/// Later boxes list partner countries.
pub fn parse_members(html: &str, url: &str) -> Result<Vec<String>> {
    let doc = Html::parse_document(html);

    let first_box = doc
        .select(&selector("div.country-list__box"))
        .next()
        .ok_or_else(|| Error::fetch(url, "no div with class 'country-list__box'"))?;

    let members: Vec<String> = first_box
        .select(&selector("a.country-list__country"))
        .map(|a| a.text().collect::<String>().trim().to_string())
        .filter(|name| !name.is_empty())
        .collect();

    if members.is_empty() {
        return Err(Error::fetch(url, "country list contains no members"));
    }
    Ok(members)
}
