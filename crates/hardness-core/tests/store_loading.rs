//! File-loading tests for the reference store using the JSON fixtures.

#![allow(clippy::unwrap_used, clippy::float_cmp)]

use std::path::{Path, PathBuf};

use hardness_core::{resolve, PopulationStats, ReferenceStore, ResolutionTier, StoreError};

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn load() -> ReferenceStore {
    ReferenceStore::load(
        &fixture("pincode_water_hardness.json"),
        &fixture("pincode_to_city.json"),
    )
    .unwrap()
}

#[test]
fn loads_both_files() {
    let store = load();
    assert_eq!(store.record_count(), 5);
    assert_eq!(store.postal_code_count(), 7);
    assert_eq!(store.city_count(), 3);
    assert_eq!(store.postal_codes_in("Delhi"), ["110001", "110002", "110005", "110010"]);
}

#[test]
fn statistics_ignore_null_readings() {
    let store = load();
    let stats = PopulationStats::from_store(&store).unwrap();
    let readings = [300.0, 420.0, 95.5, 140.0];
    let mu = readings.iter().sum::<f64>() / 4.0;
    assert!((stats.mu - mu).abs() < 1e-9);
    assert!(stats.sigma > 0.0);
}

#[test]
fn resolves_across_tiers() {
    let store = load();

    let exact = resolve(&store, "400002").unwrap();
    assert_eq!(exact.tier, ResolutionTier::Exact);
    assert_eq!(exact.ppm, 95.5);

    let same_city = resolve(&store, "110010").unwrap();
    assert_eq!(same_city.tier, ResolutionTier::SameCity);
    assert_eq!(same_city.ppm, 420.0);

    let excluded_code = resolve(&store, "400001").unwrap();
    assert_eq!(excluded_code.city, "Mumbai");
    assert_eq!(excluded_code.ppm, 95.5);

    let unknown = resolve(&store, "999999").unwrap();
    assert_eq!(unknown.tier, ResolutionTier::AnyRecord);
    assert_eq!(unknown.city, "Delhi");
    assert_eq!(unknown.ppm, 300.0);
}

#[test]
fn missing_file_is_an_io_error() {
    let err = ReferenceStore::load(
        &fixture("does_not_exist.json"),
        &fixture("pincode_to_city.json"),
    )
    .unwrap_err();
    assert!(matches!(err, StoreError::Io { .. }));
}

#[test]
fn malformed_file_is_a_parse_error() {
    let err = ReferenceStore::load(&fixture("malformed.json"), &fixture("pincode_to_city.json"))
        .unwrap_err();
    assert!(matches!(err, StoreError::Json { what: "hardness data", .. }));
}
