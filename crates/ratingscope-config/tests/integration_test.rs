//! Integration tests for ratingscope-config crate.

use ratingscope_common::test_utils::{config_fixtures, create_temp_dir};
use ratingscope_common::{Dimension, RatingsError};
use ratingscope_config::{FilterLoader, GroupColumn, Settings, SettingsLoader};
use std::collections::BTreeSet;
use std::fs;

#[test]
fn test_every_shipped_filter_loads() {
    let dir = create_temp_dir();
    config_fixtures::write_filters(dir.path());
    let loader = FilterLoader::new(dir.path());

    for name in loader.available().unwrap() {
        let filter = loader.load(&name).unwrap();
        assert_eq!(filter.name, name);
        assert!(!filter.series_order().is_empty());
    }
}

#[test]
fn test_repository_filters_match_fixtures() {
    let shipped = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../../config");
    let loader = FilterLoader::new(&shipped);

    assert_eq!(loader.available().unwrap(), config_fixtures::FILTER_NAMES);
    for name in config_fixtures::FILTER_NAMES {
        let on_disk = fs::read_to_string(shipped.join(format!("{name}.json"))).unwrap();
        assert_eq!(on_disk.trim_end(), config_fixtures::filter_json(name).unwrap());
        loader.load(name).unwrap();
    }
}

#[test]
fn test_bracket_filters_partition_their_source_labels() {
    let dir = create_temp_dir();
    config_fixtures::write_filters(dir.path());
    let loader = FilterLoader::new(dir.path());

    for name in ["age-brackets", "income-brackets"] {
        let filter = loader.load(name).unwrap();
        let brackets = filter.brackets.as_ref().unwrap();
        let listed: BTreeSet<&String> = filter
            .selector(brackets.source)
            .unwrap()
            .labels()
            .iter()
            .collect();

        let mut included = BTreeSet::new();
        for definition in &brackets.definitions {
            for raw in &definition.include {
                assert!(included.insert(raw), "{name}: {raw} included twice");
            }
        }
        let covered: BTreeSet<&String> = brackets
            .definitions
            .iter()
            .flat_map(|d| d.include.iter().chain(&d.exclude))
            .chain(&brackets.drop)
            .collect();
        assert_eq!(covered, listed, "{name}");
    }
}

#[test]
fn test_group_columns_of_shipped_filters() {
    let dir = create_temp_dir();
    config_fixtures::write_filters(dir.path());
    let loader = FilterLoader::new(dir.path());

    assert_eq!(loader.load("totals").unwrap().group_column(), None);
    assert_eq!(
        loader.load("dayparts").unwrap().group_column(),
        Some(GroupColumn::Dimension(Dimension::Daypart))
    );
    assert_eq!(
        loader.load("race").unwrap().group_column(),
        Some(GroupColumn::Dimension(Dimension::Characteristic))
    );
    assert_eq!(
        loader.load("age-brackets").unwrap().group_column(),
        Some(GroupColumn::Bracket("age_bracket".to_string()))
    );
}

#[test]
fn test_missing_filters_directory() {
    let dir = create_temp_dir();
    let loader = FilterLoader::new(dir.path().join("missing"));

    assert!(matches!(loader.available(), Err(RatingsError::Config { .. })));
    let error = loader.load("totals").unwrap_err();
    assert!(error.to_string().contains("available filters: none"));
}

#[test]
fn test_settings_file_round_trip() {
    let dir = create_temp_dir();
    let path = dir.path().join("ratingscope.yaml");
    let mut settings = Settings::default();
    settings.output_dir = "public".into();
    settings.chart.width = Some(1280);
    fs::write(&path, serde_yaml::to_string(&settings).unwrap()).unwrap();

    let loaded = SettingsLoader::parse_file(&path).unwrap();
    assert_eq!(loaded, settings);
}
