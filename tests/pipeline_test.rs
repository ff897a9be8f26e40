//! End-to-end checks of the reference cache, ranking and time-series pipeline
//! against small on-disk fixtures and a fake reference source.

use once_cell::sync::Lazy;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::cell::Cell;
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::{NamedTempFile, TempDir};

use oecd_life_expectancy::download::CacheManager;
use oecd_life_expectancy::parser::{load_observations, Observation};
use oecd_life_expectancy::ranking::{top_entities, RankQuery};
use oecd_life_expectancy::reference::CodeRecord;
use oecd_life_expectancy::series::{entity_series, year_range};
use oecd_life_expectancy::writer::{ranking_file_name, write_table};
use oecd_life_expectancy::{
    reconcile, AliasMap, Error, MembershipSet, ReferenceLoader, ReferenceSource, Result,
};

// =============================================================================
// Fixtures
// =============================================================================

const RANDOM_SEED: u64 = 42;

const DATA_CSV: &str = "\
LOCATION,INDICATOR,SUBJECT,MEASURE,FREQUENCY,TIME,Value,Flag Codes
JPN,LIFEEXP,TOT,YR,A,2010,83.0,
JPN,LIFEEXP,MEN,YR,A,2010,79.6,
JPN,LIFEEXP,WOMEN,YR,A,2010,86.3,
CHE,LIFEEXP,TOT,YR,A,2010,82.6,
CHE,LIFEEXP,MEN,YR,A,2010,80.2,
CHE,LIFEEXP,WOMEN,YR,A,2010,84.9,
KOR,LIFEEXP,TOT,YR,A,2010,80.2,
KOR,LIFEEXP,MEN,YR,A,2010,76.8,
KOR,LIFEEXP,WOMEN,YR,A,2010,83.6,
SVK,LIFEEXP,TOT,YR,A,2010,75.6,
SVK,LIFEEXP,MEN,YR,A,2010,71.8,
SVK,LIFEEXP,WOMEN,YR,A,2010,79.3,
SGP,LIFEEXP,TOT,YR,A,2010,81.7,
SGP,LIFEEXP,MEN,YR,A,2010,79.2,
SGP,LIFEEXP,WOMEN,YR,A,2010,84.0,
CAN,LIFEEXP,MEN,YR,A,1960,68.3,
CAN,LIFEEXP,WOMEN,YR,A,1960,74.3,
CAN,LIFEEXP,TOT,YR,A,1960,71.3,
CAN,LIFEEXP,MEN,YR,A,1970,69.4,
CAN,LIFEEXP,WOMEN,YR,A,1970,76.4,
CAN,LIFEEXP,TOT,YR,A,1970,72.9,
";

/// Parsed once and shared by every test
static OBSERVATIONS: Lazy<Vec<Observation>> = Lazy::new(|| {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(DATA_CSV.as_bytes())
        .expect("Failed to write fixture");
    load_observations(file.path()).expect("Failed to load fixture")
});

fn code_records() -> Vec<CodeRecord> {
    [
        ("Japan", "JP / JPN"),
        ("Switzerland", "CH / CHE"),
        ("South Korea", "KR / KOR"),
        ("Slovakia", "SK / SVK"),
        ("Singapore", "SG / SGP"),
        ("Canada", "CA / CAN"),
    ]
    .into_iter()
    .map(|(name, iso)| CodeRecord {
        name: name.to_string(),
        iso: iso.to_string(),
    })
    .collect()
}

fn oecd_members() -> Vec<String> {
    ["Japan", "Switzerland", "Korea", "Slovak Republic", "Canada"]
        .into_iter()
        .map(String::from)
        .collect()
}

/// In-memory source that counts how often it is asked for data
#[derive(Default)]
struct FakeSource {
    code_fetches: Cell<usize>,
    member_fetches: Cell<usize>,
    offline: bool,
    /// Replaces the default code table when set
    codes: Option<Vec<CodeRecord>>,
}

impl FakeSource {
    fn offline() -> Self {
        Self {
            offline: true,
            ..Self::default()
        }
    }

    fn with_codes(codes: &[(&str, &str)]) -> Self {
        Self {
            codes: Some(
                codes
                    .iter()
                    .map(|(name, iso)| CodeRecord {
                        name: name.to_string(),
                        iso: iso.to_string(),
                    })
                    .collect(),
            ),
            ..Self::default()
        }
    }
}

impl ReferenceSource for FakeSource {
    fn fetch_code_table(&self) -> Result<Vec<CodeRecord>> {
        self.code_fetches.set(self.code_fetches.get() + 1);
        if self.offline {
            return Err(Error::Fetch {
                url: "fake://codes".to_string(),
                reason: "offline".to_string(),
            });
        }
        Ok(self.codes.clone().unwrap_or_else(code_records))
    }

    fn fetch_members(&self) -> Result<Vec<String>> {
        self.member_fetches.set(self.member_fetches.get() + 1);
        if self.offline {
            return Err(Error::Fetch {
                url: "fake://members".to_string(),
                reason: "offline".to_string(),
            });
        }
        Ok(oecd_members())
    }
}

fn loader<'a>(dir: &Path, source: &'a FakeSource) -> ReferenceLoader<&'a FakeSource> {
    let cache = CacheManager::new(Some(dir.to_path_buf())).expect("Failed to create cache");
    ReferenceLoader::new(cache, source)
}

fn keys(table: &oecd_life_expectancy::WideTable<String>) -> Vec<String> {
    table.keys().cloned().collect()
}

// =============================================================================
// Reference cache
// =============================================================================

#[test]
fn test_missing_cache_fetches_without_refresh() {
    let tmp = TempDir::new().unwrap();
    let source = FakeSource::default();
    let loader = loader(tmp.path(), &source);

    let names = loader.get_entity_names(false).unwrap();
    assert_eq!(source.code_fetches.get(), 1);
    assert_eq!(names.name("KOR"), Some("South Korea"));
    assert!(loader.cache().has_country_codes());

    let members = loader.get_membership_set(false).unwrap();
    assert_eq!(source.member_fetches.get(), 1);
    assert!(members.contains("Slovak Republic"));
    assert!(loader.cache().has_members());
}

#[test]
fn test_present_cache_is_read_without_fetching() {
    let tmp = TempDir::new().unwrap();
    let source = FakeSource::default();
    let loader = loader(tmp.path(), &source);

    let first = loader.get_entity_names(false).unwrap();
    let second = loader.get_entity_names(false).unwrap();
    assert_eq!(first, second);
    assert_eq!(source.code_fetches.get(), 1);

    let first = loader.get_membership_set(false).unwrap();
    let second = loader.get_membership_set(false).unwrap();
    assert_eq!(first, second);
    assert_eq!(source.member_fetches.get(), 1);
}

#[test]
fn test_refresh_always_fetches_and_rewrites() {
    let tmp = TempDir::new().unwrap();
    let source = FakeSource::default();
    let loader = loader(tmp.path(), &source);

    fs::write(loader.cache().members_path(), "Atlantis\n").unwrap();
    let members = loader.get_membership_set(true).unwrap();
    assert_eq!(source.member_fetches.get(), 1);
    assert!(!members.contains("Atlantis"));

    let cached = fs::read_to_string(loader.cache().members_path()).unwrap();
    assert!(cached.lines().any(|l| l == "Korea"));
    assert!(!cached.contains("Atlantis"));
}

#[test]
fn test_cached_members_skip_blank_lines() {
    let tmp = TempDir::new().unwrap();
    let source = FakeSource::offline();
    let loader = loader(tmp.path(), &source);

    fs::write(loader.cache().members_path(), "Austria\n\n  Korea \n").unwrap();
    let members = loader.get_membership_set(false).unwrap();
    assert_eq!(members.iter().collect::<Vec<_>>(), vec!["Austria", "Korea"]);
    assert_eq!(source.member_fetches.get(), 0);
}

#[test]
fn test_malformed_code_cache_is_parse_error() {
    let tmp = TempDir::new().unwrap();
    let source = FakeSource::default();
    let loader = loader(tmp.path(), &source);

    fs::write(loader.cache().country_codes_path(), "name,iso\nNowhere,N/A\n").unwrap();
    assert!(matches!(
        loader.get_entity_names(false).unwrap_err(),
        Error::Parse { .. }
    ));

    fs::write(loader.cache().country_codes_path(), "country\nCanada\n").unwrap();
    assert!(matches!(
        loader.get_entity_names(false).unwrap_err(),
        Error::Parse { .. }
    ));
    assert_eq!(source.code_fetches.get(), 0);
}

#[test]
fn test_fetch_error_propagates_and_leaves_no_cache() {
    let tmp = TempDir::new().unwrap();
    let source = FakeSource::offline();
    let loader = loader(tmp.path(), &source);

    assert!(matches!(
        loader.get_entity_names(false).unwrap_err(),
        Error::Fetch { .. }
    ));
    assert!(matches!(
        loader.get_membership_set(true).unwrap_err(),
        Error::Fetch { .. }
    ));
    assert!(!loader.cache().has_country_codes());
    assert!(!loader.cache().has_members());
}

#[test]
fn test_refresh_skips_rows_without_code() {
    let tmp = TempDir::new().unwrap();
    let source = FakeSource::with_codes(&[("Canada", "CA / CAN"), ("Nowhere", "N/A")]);
    let loader = loader(tmp.path(), &source);

    let names = loader.get_entity_names(true).unwrap();
    assert_eq!(names.len(), 1);
    assert_eq!(names.name("CAN"), Some("Canada"));

    // The rewritten cache only holds the usable row and reads back cleanly.
    let cached = loader.get_entity_names(false).unwrap();
    assert_eq!(cached, names);
    assert_eq!(source.code_fetches.get(), 1);
}

#[test]
fn test_refresh_without_usable_rows_keeps_old_cache() {
    let tmp = TempDir::new().unwrap();
    let source = FakeSource::with_codes(&[("Nowhere", "N/A")]);
    let loader = loader(tmp.path(), &source);

    assert!(matches!(
        loader.get_entity_names(true).unwrap_err(),
        Error::Fetch { .. }
    ));
    assert!(!loader.cache().has_country_codes());

    fs::write(loader.cache().country_codes_path(), "name,iso\nJapan,JP / JPN\n").unwrap();
    assert!(loader.get_entity_names(true).is_err());

    let cached = loader.get_entity_names(false).unwrap();
    assert_eq!(cached.name("JPN"), Some("Japan"));
    assert_eq!(source.code_fetches.get(), 2);
}

// =============================================================================
// Ranking
// =============================================================================

#[test]
fn test_top_oecd_countries_reconcile_names() {
    let tmp = TempDir::new().unwrap();
    let source = FakeSource::default();
    let loader = loader(tmp.path(), &source);
    let names = loader.get_entity_names(false).unwrap();
    let members = loader.get_membership_set(false).unwrap();

    let table = top_entities(
        &OBSERVATIONS,
        &names,
        &AliasMap::default(),
        Some(&members),
        RankQuery::new(2010),
    )
    .unwrap();

    // Singapore is not a member; Korea and Slovak Republic only match via aliases.
    assert_eq!(
        keys(&table),
        vec!["Slovak Republic", "Korea", "Switzerland", "Japan"]
    );
    assert_eq!(table.columns(), &["MEN", "TOT", "WOMEN"]);
    assert_eq!(table.get(&"Japan".to_string(), "WOMEN"), Some(86.3));
}

#[test]
fn test_membership_result_is_subset() {
    let members: MembershipSet = oecd_members().into_iter().collect();
    let names = oecd_life_expectancy::ReferenceTable::from_pairs(
        code_records()
            .into_iter()
            .map(|r| (r.iso[r.iso.len() - 3..].to_string(), r.name)),
    );

    let filtered = top_entities(
        &OBSERVATIONS,
        &names,
        &AliasMap::default(),
        Some(&members),
        RankQuery::new(2010).top(3),
    )
    .unwrap();
    assert_eq!(filtered.len(), 3);
    assert!(filtered.keys().all(|k| members.contains(k)));

    let unfiltered = top_entities(
        &OBSERVATIONS,
        &names,
        &AliasMap::default(),
        None,
        RankQuery::new(2010).top(3),
    )
    .unwrap();
    assert_eq!(keys(&unfiltered), vec!["Singapore", "Switzerland", "Japan"]);
}

#[test]
fn test_ranking_ignores_input_order() {
    let names = oecd_life_expectancy::ReferenceTable::from_pairs([
        ("JPN", "Japan"),
        ("CHE", "Switzerland"),
        ("KOR", "South Korea"),
        ("SVK", "Slovakia"),
        ("SGP", "Singapore"),
    ]);
    let aliases = AliasMap::default();
    let expected = top_entities(&OBSERVATIONS, &names, &aliases, None, RankQuery::new(2010).top(4))
        .unwrap();

    let mut rng = rand::rngs::StdRng::seed_from_u64(RANDOM_SEED);
    let mut shuffled: Vec<Observation> = OBSERVATIONS.to_vec();
    for _ in 0..5 {
        shuffled.shuffle(&mut rng);
        let table = top_entities(&shuffled, &names, &aliases, None, RankQuery::new(2010).top(4))
            .unwrap();
        assert_eq!(table, expected);
    }

    let totals: Vec<f64> = expected
        .column("TOT")
        .unwrap()
        .into_iter()
        .map(|v| v.unwrap())
        .collect();
    assert!(totals.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn test_ranked_table_written_to_output_dir() {
    let tmp = TempDir::new().unwrap();
    let names = oecd_life_expectancy::ReferenceTable::from_pairs([("JPN", "Japan")]);
    let table = top_entities(
        &OBSERVATIONS,
        &names,
        &AliasMap::default(),
        None,
        RankQuery::new(2010).top(1),
    )
    .unwrap();

    let out = tmp.path().join("Output_Figures");
    let path = write_table(&out, &ranking_file_name(2010), &table).unwrap();
    assert_eq!(path, out.join("LifeExpectancy_2010.csv"));
    assert_eq!(
        fs::read_to_string(path).unwrap(),
        "LOCATION,MEN,TOT,WOMEN\nJapan,79.6,83,86.3\n"
    );
}

// =============================================================================
// Time series and reconciliation
// =============================================================================

#[test]
fn test_series_returns_present_years_unmodified() {
    let names = oecd_life_expectancy::ReferenceTable::from_pairs([("CAN", "Canada")]);
    let table = entity_series(
        &OBSERVATIONS,
        &names,
        &AliasMap::default(),
        "Canada",
        &year_range(1960, 1975, 5),
    )
    .unwrap();

    assert_eq!(table.keys().copied().collect::<Vec<_>>(), vec![1960, 1970]);
    assert_eq!(table.get(&1960, "MEN"), Some(68.3));
    assert_eq!(table.get(&1970, "TOT"), Some(72.9));
    assert_eq!(table.get(&1970, "WOMEN"), Some(76.4));
}

#[test]
fn test_series_resolves_reconciled_name() {
    let names = oecd_life_expectancy::ReferenceTable::from_pairs([("KOR", "South Korea")]);
    let table = entity_series(
        &OBSERVATIONS,
        &names,
        &AliasMap::default(),
        "Korea",
        &[2010],
    )
    .unwrap();
    assert_eq!(table.get(&2010, "TOT"), Some(80.2));
}

#[test]
fn test_alias_application_is_order_independent() {
    let aliases = AliasMap::default();
    let mut names: Vec<String> = code_records().into_iter().map(|r| r.name).collect();
    let expected: std::collections::BTreeSet<String> =
        reconcile(&names, &aliases).into_iter().collect();

    let mut rng = rand::rngs::StdRng::seed_from_u64(RANDOM_SEED);
    for _ in 0..5 {
        names.shuffle(&mut rng);
        let reconciled = reconcile(&names, &aliases);
        for (raw, canonical) in names.iter().zip(&reconciled) {
            assert_eq!(canonical, aliases.resolve(raw));
        }
        assert_eq!(
            reconciled.into_iter().collect::<std::collections::BTreeSet<_>>(),
            expected
        );
    }
    assert!(expected.contains("Korea"));
    assert!(expected.contains("Slovak Republic"));
}
