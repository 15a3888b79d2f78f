use std::collections::BTreeMap;

use prism_core::{
    AggregatorRegistry, Color, Error, ThresholdSet, aggregate_sector, aggregate_sector_weighted,
    evaluate_color, parse_rules, resolve,
};

#[test]
fn threshold_priority_matches_documented_examples() {
    let thresholds = ThresholdSet::parse([
        (Color::Green, ">=0.4"),
        (Color::Yellow, ">=0.3"),
        (Color::Red, "<0.3"),
    ])
    .expect("parse thresholds");

    assert_eq!(evaluate_color(0.4, &thresholds).ok(), Some(Color::Green));
    assert_eq!(evaluate_color(0.3, &thresholds).ok(), Some(Color::Yellow));
    assert_eq!(evaluate_color(0.1, &thresholds).ok(), Some(Color::Red));
}

#[test]
fn sector_strategies_agree_with_registry() {
    let registry = AggregatorRegistry::new();
    let colors = [Color::Green, Color::Yellow, Color::Red];

    for method in ["worst_color", "best_color", "majority"] {
        assert_eq!(
            aggregate_sector(&colors, method).ok(),
            registry.aggregate(&colors, method).ok(),
            "{method}"
        );
    }
    assert_eq!(aggregate_sector(&colors, "worst_color").ok(), Some(Color::Red));
    assert_eq!(aggregate_sector(&colors, "best_color").ok(), Some(Color::Green));
    assert_eq!(
        aggregate_sector(&[Color::Green, Color::Yellow], "majority").ok(),
        Some(Color::Yellow)
    );
}

#[test]
fn empty_inputs_never_default_to_a_color() {
    assert!(matches!(aggregate_sector(&[], "worst_color"), Err(Error::EmptyInput)));
    let weights = BTreeMap::from([("a".to_string(), 1.0)]);
    let empty: BTreeMap<String, Color> = BTreeMap::new();
    let result = aggregate_sector_weighted(
        empty.iter().map(|(key, color)| (key.as_str(), *color)),
        &weights,
        None,
    );
    assert!(matches!(result, Err(Error::EmptyInput)));
}

#[test]
fn weighted_score_between_thresholds_is_yellow() {
    let colors = BTreeMap::from([("a".to_string(), Color::Green), ("b".to_string(), Color::Red)]);
    let weights = BTreeMap::from([("a".to_string(), 0.6), ("b".to_string(), 0.4)]);
    let color = aggregate_sector_weighted(
        colors.iter().map(|(key, color)| (key.as_str(), *color)),
        &weights,
        None,
    );
    assert_eq!(color.ok(), Some(Color::Yellow));
}

#[test]
fn catch_all_rule_handles_unlisted_combination() {
    let table = parse_rules(&["green|green=green", "red|*=red"], 2).expect("parse rules");
    let dimensions = vec!["a".to_string(), "b".to_string()];
    let input = BTreeMap::from([("a".to_string(), Color::Red), ("b".to_string(), Color::Green)]);
    assert_eq!(resolve(&input, &dimensions, &table).ok(), Some(Color::Red));

    let uncovered = BTreeMap::from([
        ("a".to_string(), Color::Yellow),
        ("b".to_string(), Color::Green),
    ]);
    assert!(matches!(
        resolve(&uncovered, &dimensions, &table),
        Err(Error::NoRuleMatch { .. })
    ));
}

#[test]
fn rule_parse_errors_convert_into_core_errors() {
    let err: Error = parse_rules(&["green|green"], 2)
        .expect_err("missing equals")
        .into();
    assert!(err.to_string().contains("missing '='"));
}
