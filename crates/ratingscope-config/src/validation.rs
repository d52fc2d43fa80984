//! Validation utilities and the filter validator

use crate::schema::{BracketSpec, FilterDefinition, Selector};
use ratingscope_common::{Dimension, RatingsError, Result};
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::LazyLock;
use validator::ValidationError;

/// Regex pattern for validating hex color codes (e.g., #FFFFFF, #1f77b4)
pub static HEX_COLOR_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^#[0-9A-Fa-f]{6}$").expect("Invalid hex color regex pattern")
});

/// Validate that every palette entry is a hex color
pub fn validate_palette(colors: &[String]) -> std::result::Result<(), ValidationError> {
    if colors.iter().all(|color| HEX_COLOR_REGEX.is_match(color)) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_palette_color"))
    }
}

/// Validate a settings path (non-empty, no characters most filesystems reject)
pub fn validate_path(path: &Path) -> std::result::Result<(), ValidationError> {
    let text = path.to_string_lossy();
    if text.trim().is_empty() {
        return Err(ValidationError::new("empty_path"));
    }

    let invalid_chars = ['<', '>', '"', '|', '?', '*'];
    if text.chars().any(|c| invalid_chars.contains(&c)) {
        return Err(ValidationError::new("invalid_path_characters"));
    }

    Ok(())
}

/// Checks the structural invariants of a [`FilterDefinition`].
///
/// Every problem found is reported in one Configuration Error, prefixed with
/// the filter name, so a broken filter file can be fixed in one pass.
pub struct FilterValidator;

impl FilterValidator {
    /// Validates `filter`.
    pub fn validate(filter: &FilterDefinition) -> Result<()> {
        let mut problems = Vec::new();

        if filter.title.trim().is_empty() {
            problems.push("title cannot be empty".to_string());
        }

        for dimension in Dimension::ALL {
            if let Some(selector) = filter.selector(dimension) {
                Self::check_selector(dimension, selector, &mut problems);
            }
        }

        match &filter.brackets {
            Some(brackets) => Self::check_brackets(filter, brackets, &mut problems),
            None => {
                let multi: Vec<&str> = Dimension::ALL
                    .into_iter()
                    .filter(|d| filter.selector(*d).is_some_and(Selector::is_multi_valued))
                    .map(Dimension::column)
                    .collect();
                if multi.len() > 1 {
                    problems.push(format!(
                        "at most one selector may list several labels, found {}",
                        multi.join(", ")
                    ));
                }
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(RatingsError::config(format!(
                "filter '{}': {}",
                filter.name,
                problems.join("; ")
            )))
        }
    }

    fn check_selector(dimension: Dimension, selector: &Selector, problems: &mut Vec<String>) {
        let labels = selector.labels();
        if labels.is_empty() {
            problems.push(format!("{dimension} selector lists no labels"));
        }
        if labels.iter().any(|label| label.trim().is_empty()) {
            problems.push(format!("{dimension} selector contains an empty label"));
        }
        let mut seen = BTreeSet::new();
        for label in labels {
            if !seen.insert(label.as_str()) {
                problems.push(format!("{dimension} selector lists '{label}' twice"));
            }
        }
    }

    fn check_brackets(
        filter: &FilterDefinition,
        brackets: &BracketSpec,
        problems: &mut Vec<String>,
    ) {
        let source = brackets.source;

        if !ratingscope_common::is_safe_name(&brackets.column) || brackets.column == "month" {
            problems.push(format!(
                "bracket column '{}' must be a plain identifier other than 'month'",
                brackets.column
            ));
        }
        if brackets.definitions.is_empty() {
            problems.push("brackets define no bracket".to_string());
        }

        // Label uniqueness and per-bracket consistency.
        let mut bracket_labels = BTreeSet::new();
        let mut included_by: BTreeMap<&str, &str> = BTreeMap::new();
        let mut referenced: BTreeSet<&str> = BTreeSet::new();
        for definition in &brackets.definitions {
            let label = definition.label.as_str();
            if label.trim().is_empty() {
                problems.push("bracket label cannot be empty".to_string());
            }
            if !bracket_labels.insert(label) {
                problems.push(format!("bracket label '{label}' is defined twice"));
            }
            if definition.include.is_empty() {
                problems.push(format!("bracket '{label}' includes no label"));
            }
            for raw in &definition.include {
                if definition.exclude.contains(raw) {
                    problems.push(format!("bracket '{label}' both includes and excludes '{raw}'"));
                }
                if let Some(other) = included_by.insert(raw.as_str(), label) {
                    if other != label {
                        problems.push(format!(
                            "'{raw}' is included by both '{other}' and '{label}'"
                        ));
                    }
                }
                referenced.insert(raw.as_str());
            }
            referenced.extend(definition.exclude.iter().map(String::as_str));
        }

        for raw in &brackets.drop {
            if let Some(bracket) = included_by.get(raw.as_str()) {
                problems.push(format!("'{raw}' is dropped but included by '{bracket}'"));
            }
            referenced.insert(raw.as_str());
        }

        // Coverage against the source selector.
        match filter.selector(source) {
            None => problems.push(format!(
                "brackets over {source} need a {source} selector listing every raw label"
            )),
            Some(selector) => {
                let listed: BTreeSet<&str> = selector.labels().iter().map(String::as_str).collect();
                let unknown: Vec<&str> = referenced.difference(&listed).copied().collect();
                if !unknown.is_empty() {
                    problems.push(format!(
                        "brackets reference labels missing from the {source} selector: {}",
                        unknown.join(", ")
                    ));
                }
                let unassigned: Vec<&str> = listed.difference(&referenced).copied().collect();
                if !unassigned.is_empty() {
                    problems.push(format!(
                        "{source} labels are neither bracketed nor dropped: {}",
                        unassigned.join(", ")
                    ));
                }
            }
        }

        for dimension in Dimension::ALL {
            if dimension != source
                && filter.selector(dimension).is_some_and(Selector::is_multi_valued)
            {
                problems.push(format!(
                    "{dimension} selector lists several labels but brackets are built from {source}"
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::BracketDefinition;
    use proptest::prelude::*;

    fn filter(json: &str) -> FilterDefinition {
        let mut filter: FilterDefinition = serde_json::from_str(json).unwrap();
        filter.name = "test".to_string();
        filter
    }

    fn problems(json: &str) -> String {
        FilterValidator::validate(&filter(json)).unwrap_err().to_string()
    }

    #[test]
    fn test_hex_color_regex() {
        assert!(HEX_COLOR_REGEX.is_match("#FFFFFF"));
        assert!(HEX_COLOR_REGEX.is_match("#1f77b4"));

        assert!(!HEX_COLOR_REGEX.is_match("1f77b4"));
        assert!(!HEX_COLOR_REGEX.is_match("#FFF"));
        assert!(!HEX_COLOR_REGEX.is_match("#GGGGGG"));
        assert!(!HEX_COLOR_REGEX.is_match(""));
    }

    #[test]
    fn test_validate_path() {
        assert!(validate_path(Path::new("output")).is_ok());
        assert!(validate_path(Path::new("data/2023-01_2025-09.csv")).is_ok());
        assert!(validate_path(Path::new("")).is_err());
        assert!(validate_path(Path::new("out|put")).is_err());
    }

    #[test]
    fn test_shipped_filters_are_valid() {
        use ratingscope_common::test_utils::config_fixtures;

        for name in config_fixtures::FILTER_NAMES {
            let mut definition: FilterDefinition =
                serde_json::from_str(config_fixtures::filter_json(name).unwrap()).unwrap();
            definition.name = name.to_string();
            assert!(
                FilterValidator::validate(&definition).is_ok(),
                "{name}: {:?}",
                FilterValidator::validate(&definition)
            );
        }
    }

    #[test]
    fn test_two_multi_valued_selectors_rejected() {
        let message = problems(
            r#"{ "title": "Mixed", "daypart": ["Prime", "Daytime"], "demographic": ["P2+", "P18+"] }"#,
        );
        assert!(message.contains("filter 'test'"));
        assert!(message.contains("daypart, demographic"));
    }

    #[test]
    fn test_overlapping_brackets_rejected() {
        let message = problems(
            r#"{
                "title": "Overlap",
                "demographic": ["P18+", "P35-64"],
                "brackets": {
                    "source": "demographic",
                    "column": "age_bracket",
                    "definitions": [
                        { "label": "Adults", "include": ["P18+"] },
                        { "label": "Also adults", "include": ["P18+", "P35-64"] }
                    ]
                }
            }"#,
        );
        assert!(message.contains("'P18+' is included by both 'Adults' and 'Also adults'"));
    }

    #[test]
    fn test_silent_drop_rejected() {
        let message = problems(
            r#"{
                "title": "Gaps",
                "characteristic": ["$25K+", "$50K+", "$75K+"],
                "brackets": {
                    "source": "characteristic",
                    "column": "income_bracket",
                    "definitions": [
                        { "label": "$25K-$50K", "include": ["$25K+"], "exclude": ["$50K+"] }
                    ]
                }
            }"#,
        );
        assert!(message.contains("neither bracketed nor dropped: $75K+"));
    }

    #[test]
    fn test_explicit_drop_accepted() {
        let definition = filter(
            r#"{
                "title": "Upper income",
                "characteristic": ["$25K+", "$50K+", "Less than $25K"],
                "brackets": {
                    "source": "characteristic",
                    "column": "income_bracket",
                    "definitions": [
                        { "label": "$25K-$50K", "include": ["$25K+"], "exclude": ["$50K+"] },
                        { "label": "$50K+", "include": ["$50K+"] }
                    ],
                    "drop": ["Less than $25K"]
                }
            }"#,
        );
        assert!(FilterValidator::validate(&definition).is_ok());
    }

    #[test]
    fn test_unknown_and_self_excluded_labels_rejected() {
        let message = problems(
            r#"{
                "title": "Broken",
                "demographic": ["P18+"],
                "brackets": {
                    "source": "demographic",
                    "column": "age_bracket",
                    "definitions": [
                        { "label": "Adults", "include": ["P18+"], "exclude": ["P18+", "P99+"] },
                        { "label": "Adults", "include": [] }
                    ]
                }
            }"#,
        );
        assert!(message.contains("both includes and excludes 'P18+'"));
        assert!(message.contains("missing from the demographic selector: P99+"));
        assert!(message.contains("'Adults' is defined twice"));
        assert!(message.contains("includes no label"));
    }

    #[test]
    fn test_brackets_need_source_selector() {
        let message = problems(
            r#"{
                "title": "No source",
                "brackets": {
                    "source": "characteristic",
                    "column": "income_bracket",
                    "definitions": [ { "label": "All", "include": ["$25K+"] } ]
                }
            }"#,
        );
        assert!(message.contains("need a characteristic selector"));
    }

    #[test]
    fn test_brackets_forbid_other_multi_valued_selectors() {
        let message = problems(
            r#"{
                "title": "Two groups",
                "daypart": ["Prime", "Daytime"],
                "demographic": ["P18+"],
                "brackets": {
                    "source": "demographic",
                    "column": "age_bracket",
                    "definitions": [ { "label": "Adults", "include": ["P18+"] } ]
                }
            }"#,
        );
        assert!(message.contains("daypart selector lists several labels"));
    }

    #[test]
    fn test_selector_problems() {
        let message = problems(r#"{ "title": " ", "daypart": ["Prime", "Prime"], "demographic": [] }"#);
        assert!(message.contains("title cannot be empty"));
        assert!(message.contains("lists 'Prime' twice"));
        assert!(message.contains("demographic selector lists no labels"));
    }

    fn partitioned_filter(labels: &[String], assignment: &[usize], buckets: usize) -> FilterDefinition {
        let mut definitions: Vec<BracketDefinition> = (0..buckets)
            .map(|i| BracketDefinition {
                label: format!("Bracket {i}"),
                include: Vec::new(),
                exclude: Vec::new(),
            })
            .collect();
        let mut drop = Vec::new();
        for (label, slot) in labels.iter().zip(assignment) {
            match definitions.get_mut(*slot) {
                Some(definition) => definition.include.push(label.clone()),
                None => drop.push(label.clone()),
            }
        }
        definitions.retain(|d| !d.include.is_empty());
        FilterDefinition {
            name: "generated".to_string(),
            title: "Generated".to_string(),
            daypart: None,
            demographic: Some(Selector::Many(labels.to_vec())),
            characteristic: None,
            brackets: Some(BracketSpec {
                source: Dimension::Demographic,
                column: "generated_bracket".to_string(),
                definitions,
                drop,
            }),
        }
    }

    proptest! {
        #[test]
        fn prop_partitions_are_accepted(
            labels in prop::collection::btree_set("[A-Z][a-z0-9+]{1,6}", 1..8),
            seed in prop::collection::vec(0usize..4, 8),
        ) {
            let labels: Vec<String> = labels.into_iter().collect();
            // slot 3 means dropped; make sure at least one label is bracketed
            let mut assignment: Vec<usize> = seed[..labels.len()].to_vec();
            assignment[0] = 0;
            let definition = partitioned_filter(&labels, &assignment, 3);
            prop_assert!(FilterValidator::validate(&definition).is_ok());
        }

        #[test]
        fn prop_overlap_is_rejected(
            labels in prop::collection::btree_set("[A-Z][a-z0-9+]{1,6}", 2..8),
            seed in prop::collection::vec(0usize..3, 8),
        ) {
            let labels: Vec<String> = labels.into_iter().collect();
            let mut assignment: Vec<usize> = seed[..labels.len()].to_vec();
            assignment[0] = 0;
            assignment[1] = 1;
            let mut definition = partitioned_filter(&labels, &assignment, 3);
            let shared = labels[0].clone();
            let brackets = definition.brackets.as_mut().unwrap();
            let target = brackets
                .definitions
                .iter_mut()
                .find(|d| !d.include.contains(&shared))
                .unwrap();
            target.include.push(shared);
            prop_assert!(FilterValidator::validate(&definition).is_err());
        }

        #[test]
        fn prop_unassigned_label_is_rejected(
            labels in prop::collection::btree_set("[A-Z][a-z0-9+]{1,6}", 2..8),
            seed in prop::collection::vec(0usize..3, 8),
        ) {
            let labels: Vec<String> = labels.into_iter().collect();
            let mut assignment: Vec<usize> = seed[..labels.len()].to_vec();
            assignment[0] = 0;
            let mut definition = partitioned_filter(&labels, &assignment, 3);
            if let Some(Selector::Many(listed)) = definition.demographic.as_mut() {
                listed.push("Unassigned".to_string());
            }
            prop_assert!(FilterValidator::validate(&definition).is_err());
        }
    }
}
