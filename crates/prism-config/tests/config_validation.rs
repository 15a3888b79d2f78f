use std::path::{Path, PathBuf};

use prism_config::{
    ConfigError, config_json_schema, load_config, load_config_file, read_document,
    validate_config_json,
};
use prism_core::{AggregatorRegistry, FinalMethod, SectorMethod};
use serde_json::json;

fn model_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../../configs/models")
        .join(name)
}

#[test]
fn credit_pd_config_validates_against_schema() {
    let document = read_document(&model_path("credit_pd.yaml")).expect("read yaml config");
    let schema = serde_json::to_value(config_json_schema()).expect("schema json");

    let structural = validate_config_json(&document, &schema).expect("validate config json");
    assert!(structural.errors.is_empty(), "structural errors found");

    let validated = load_config(&document, &AggregatorRegistry::new())
        .expect("config validation should succeed");
    assert!(validated.warnings.is_empty(), "unexpected warnings");
    assert_eq!(validated.config.model_id, "credit_pd");
    assert_eq!(validated.rating.metrics.len(), 4);
    assert!(matches!(
        validated.rating.method_for("discriminatory_power"),
        SectorMethod::WeightedAverage(_)
    ));
    assert_eq!(validated.rating.method_for("stability"), &SectorMethod::WorstColor);
    let FinalMethod::Matrix(matrix) = &validated.rating.final_method else {
        panic!("expected matrix final method");
    };
    assert_eq!(matrix.dimensions.len(), 3);
    assert_eq!(matrix.rules.len(), 5);
}

#[test]
fn toml_config_loads_through_the_same_pipeline() {
    let validated = load_config_file(&model_path("scorecard_lite.toml"), &AggregatorRegistry::new())
        .expect("toml config");
    assert_eq!(validated.rating.sector_method, SectorMethod::Majority);
    assert_eq!(validated.config.metrics["gini"].color_field, None);
}

#[test]
fn invalid_file_reports_every_issue() {
    let document = json!({
        "model_id": "broken",
        "metrics": {
            "gini": {
                "metric_id": "gini",
                "sector": "discrimination",
                "color": {"green": "=> 0.4", "red": "< 0.3"}
            }
        },
        "aggregation": {
            "sector": {"overrides": {"discrimination": {"method": "weighted_avg"}}},
            "final": {
                "method": "matrix",
                "dimensions": ["discrimination"],
                "rules": ["green = purple"]
            }
        }
    });

    let report = load_config(&document, &AggregatorRegistry::new()).expect_err("invalid config");
    let codes: Vec<&str> = report.errors.iter().map(|issue| issue.code.as_str()).collect();
    assert_eq!(codes, vec!["invalid_threshold", "unknown_method", "invalid_rule"]);
}

#[test]
fn schema_rejects_wrong_types() {
    let document = json!({"model_id": "m", "metrics": {"gini": {"color": {"green": 0.4}}}});
    let report = load_config(&document, &AggregatorRegistry::new()).expect_err("wrong type");
    assert!(report.has_error("schema_violation"));
    assert!(report.errors[0].path.starts_with("/metrics/gini/color"));
}

#[test]
fn missing_file_is_an_io_error() {
    let result = load_config_file(&model_path("absent.yaml"), &AggregatorRegistry::new());
    assert!(matches!(result, Err(ConfigError::Io(_))));
}
