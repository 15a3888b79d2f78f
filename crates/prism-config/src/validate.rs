use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

use jsonschema::JSONSchema;
use prism_core::sector::{MATRIX, WEIGHTED_AVERAGE, WORST_COLOR};
use prism_core::{
    AggregatorRegistry, Color, FinalMethod, MatrixAggregation, MatrixRule, MetricSpec,
    RatingConfig, RuleTable, SectorMethod, Threshold, ThresholdSet, WeightedAverage,
};
use serde_json::Value;

use crate::errors::{ConfigError, IssueSeverity, ValidationIssue, ValidationReport};
use crate::model::{FinalAggregationConfig, ModelConfig, SectorOverride};
use crate::schema::config_json_schema;

/// Model configuration compiled into a rating configuration, with warnings.
#[derive(Debug, Clone)]
pub struct ValidatedConfig {
    pub config: ModelConfig,
    pub rating: RatingConfig,
    pub warnings: Vec<ValidationIssue>,
}

/// Validate a configuration document against the configuration JSON Schema.
pub fn validate_config_json(
    config_json: &Value,
    config_schema: &Value,
) -> Result<ValidationReport, ConfigError> {
    let compiled =
        JSONSchema::compile(config_schema).map_err(|err| ConfigError::Schema(err.to_string()))?;

    let mut report = ValidationReport::default();

    if let Err(errors) = compiled.validate(config_json) {
        for error in errors {
            let path = normalized_json_pointer(&error.instance_path.to_string());
            report.push_error(ValidationIssue::new(
                IssueSeverity::Error,
                "schema_violation",
                path,
                error.to_string(),
                None,
            ));
        }
    }

    Ok(report)
}

/// Validate the document end-to-end against an explicit schema.
pub fn validate_config(
    config_json: &Value,
    config_schema: &Value,
    registry: &AggregatorRegistry,
) -> Result<ValidatedConfig, ValidationReport> {
    let structural = match validate_config_json(config_json, config_schema) {
        Ok(report) => report,
        Err(err) => {
            return Err(ValidationReport::single_error(
                "schema_validation_error",
                "/",
                err.to_string(),
            ));
        }
    };

    if !structural.is_ok() {
        return Err(structural);
    }

    let config: ModelConfig = match serde_json::from_value(config_json.clone()) {
        Ok(config) => config,
        Err(err) => {
            return Err(ValidationReport::single_error(
                "invalid_config_json",
                "/",
                err.to_string(),
            ));
        }
    };

    compile_config(&config, registry)
}

/// Validate the document end-to-end against the built-in configuration schema.
pub fn load_config(
    config_json: &Value,
    registry: &AggregatorRegistry,
) -> Result<ValidatedConfig, ValidationReport> {
    let schema = serde_json::to_value(config_json_schema()).map_err(|err| {
        ValidationReport::single_error("schema_validation_error", "/", err.to_string())
    })?;
    validate_config(config_json, &schema, registry)
}

/// Check semantics and build the immutable [`RatingConfig`].
///
/// Every problem is collected before returning, so a single pass reports all
/// malformed thresholds, rules and method references.
pub fn compile_config(
    config: &ModelConfig,
    registry: &AggregatorRegistry,
) -> Result<ValidatedConfig, ValidationReport> {
    let mut report = ValidationReport::default();

    if config.model_id.trim().is_empty() {
        report.push_error(ValidationIssue::new(
            IssueSeverity::Error,
            "missing_model_id",
            "/model_id",
            "model_id must not be empty",
            None,
        ));
    }

    let metrics = compile_metrics(config, &mut report);
    let members = sector_members(config);

    let default_name = config.aggregation.sector.method.as_str();
    let sector_method = compile_default_method(config, &members, registry, &mut report);

    let mut sector_overrides = BTreeMap::new();
    for (sector, entry) in &config.aggregation.sector.overrides {
        let path = format!("/aggregation/sector/overrides/{}", pointer_segment(sector));
        let Some(metric_keys) = members.get(sector.as_str()) else {
            report.push_warning(ValidationIssue::new(
                IssueSeverity::Warning,
                "unused_override",
                path,
                format!("no metric belongs to sector '{sector}'"),
                Some("check the sector names used by metrics".to_string()),
            ));
            continue;
        };
        if let Some(method) = compile_override(
            sector,
            entry,
            default_name,
            metric_keys,
            registry,
            &path,
            &mut report,
        ) {
            sector_overrides.insert(sector.clone(), method);
        }
    }

    let sectors: BTreeSet<&str> = members.keys().copied().collect();
    let final_method = compile_final(&config.aggregation.overall, &sectors, registry, &mut report);

    if !report.is_ok() {
        return Err(report);
    }

    Ok(ValidatedConfig {
        config: config.clone(),
        rating: RatingConfig {
            metrics,
            sector_method,
            sector_overrides,
            final_method,
        },
        warnings: report.warnings,
    })
}

fn compile_metrics(
    config: &ModelConfig,
    report: &mut ValidationReport,
) -> BTreeMap<String, MetricSpec> {
    if config.metrics.is_empty() {
        report.push_error(ValidationIssue::new(
            IssueSeverity::Error,
            "metrics_empty",
            "/metrics",
            "at least one metric is required",
            None,
        ));
    }

    let mut metrics = BTreeMap::new();
    for (key, metric) in &config.metrics {
        let path = format!("/metrics/{}", pointer_segment(key));

        if metric.sector.trim().is_empty() {
            report.push_error(ValidationIssue::new(
                IssueSeverity::Error,
                "invalid_sector",
                format!("{path}/sector"),
                "sector must not be empty",
                Some("omit sector to use the default sector".to_string()),
            ));
        }

        if metric.metric_id.is_none() {
            report.push_warning(ValidationIssue::new(
                IssueSeverity::Warning,
                "missing_metric_id",
                format!("{path}/metric_id"),
                format!("metric '{key}' has no metric_id"),
                None,
            ));
        }

        let color_path = format!("{path}/color");
        if let Some(thresholds) = compile_thresholds(&metric.color, &color_path, report) {
            metrics.insert(key.clone(), MetricSpec::new(metric.sector.clone(), thresholds));
        }
    }
    metrics
}

fn compile_thresholds(
    entries: &BTreeMap<String, String>,
    path: &str,
    report: &mut ValidationReport,
) -> Option<ThresholdSet> {
    if entries.is_empty() {
        report.push_error(ValidationIssue::new(
            IssueSeverity::Error,
            "missing_thresholds",
            path,
            "at least one color threshold is required",
            Some("use keys green, yellow and red".to_string()),
        ));
        return None;
    }

    let mut thresholds = ThresholdSet::new();
    let mut valid = true;
    for (color_key, expr) in entries {
        let entry_path = format!("{path}/{}", pointer_segment(color_key));
        let color = match Color::from_str(color_key) {
            Ok(color) => color,
            Err(err) => {
                report.push_error(ValidationIssue::new(
                    IssueSeverity::Error,
                    "invalid_color",
                    entry_path,
                    err.to_string(),
                    Some("use green, yellow or red".to_string()),
                ));
                valid = false;
                continue;
            }
        };
        match Threshold::parse(expr) {
            Ok(threshold) => thresholds.insert(color, threshold),
            Err(err) => {
                report.push_error(ValidationIssue::new(
                    IssueSeverity::Error,
                    "invalid_threshold",
                    entry_path,
                    err.to_string(),
                    Some("expected an operator and a number, e.g. \">= 0.4\"".to_string()),
                ));
                valid = false;
            }
        }
    }

    valid.then_some(thresholds)
}

fn compile_default_method(
    config: &ModelConfig,
    members: &BTreeMap<&str, Vec<&str>>,
    registry: &AggregatorRegistry,
    report: &mut ValidationReport,
) -> SectorMethod {
    let path = "/aggregation/sector/method";
    let name = config.aggregation.sector.method.as_str();

    if name == WEIGHTED_AVERAGE || name == MATRIX {
        // Parameterized defaults only work when every sector carries its own parameters.
        for sector in members.keys() {
            if !config.aggregation.sector.overrides.contains_key(*sector) {
                report.push_error(ValidationIssue::new(
                    IssueSeverity::Error,
                    "missing_override",
                    path,
                    format!("sector '{sector}' has no override supplying {name} parameters"),
                    Some(format!(
                        "add aggregation.sector.overrides.{sector} or use a parameterless default"
                    )),
                ));
            }
        }
        return SectorMethod::default();
    }

    match simple_method(name, registry) {
        Some(method) => method,
        None => {
            report.push_error(unknown_method(path, name, registry));
            SectorMethod::default()
        }
    }
}

fn compile_override(
    sector: &str,
    entry: &SectorOverride,
    default_name: &str,
    metric_keys: &[&str],
    registry: &AggregatorRegistry,
    path: &str,
    report: &mut ValidationReport,
) -> Option<SectorMethod> {
    let method_path = format!("{path}/method");
    let name = entry.method.as_deref().unwrap_or(default_name);

    match name {
        WEIGHTED_AVERAGE => {
            if entry.dimensions.is_some() || entry.rules.is_some() {
                report.push_warning(ignored_parameters(path, name, "dimensions/rules"));
            }
            compile_weighted(entry, metric_keys, path, report).map(SectorMethod::WeightedAverage)
        }
        MATRIX => {
            if entry.weights.is_some() || entry.thresholds.is_some() {
                report.push_warning(ignored_parameters(path, name, "weights/thresholds"));
            }
            let rules = entry.rules.as_deref().unwrap_or_default();
            let known: BTreeSet<&str> = metric_keys.iter().copied().collect();
            compile_matrix(
                entry.dimensions.as_deref(),
                rules,
                path,
                &known,
                &format!("a metric of sector '{sector}'"),
                report,
            )
            .map(SectorMethod::Matrix)
        }
        _ => {
            if entry.weights.is_some()
                || entry.thresholds.is_some()
                || entry.dimensions.is_some()
                || entry.rules.is_some()
            {
                report.push_warning(ignored_parameters(path, name, "parameters"));
            }
            match simple_method(name, registry) {
                Some(method) => Some(method),
                None => {
                    report.push_error(unknown_method(&method_path, name, registry));
                    None
                }
            }
        }
    }
}

fn compile_weighted(
    entry: &SectorOverride,
    metric_keys: &[&str],
    path: &str,
    report: &mut ValidationReport,
) -> Option<WeightedAverage> {
    let weights_path = format!("{path}/weights");
    let Some(weights) = &entry.weights else {
        report.push_error(ValidationIssue::new(
            IssueSeverity::Error,
            "missing_weights",
            weights_path,
            "weighted_average requires weights",
            Some("map every metric of the sector to a positive weight".to_string()),
        ));
        return None;
    };

    let mut valid = true;
    for (metric, weight) in weights {
        let entry_path = format!("{weights_path}/{}", pointer_segment(metric));
        if !weight.is_finite() || *weight <= 0.0 {
            report.push_error(ValidationIssue::new(
                IssueSeverity::Error,
                "invalid_weight",
                entry_path.clone(),
                format!("weight for '{metric}' must be a positive number, got {weight}"),
                None,
            ));
            valid = false;
        }
        if !metric_keys.contains(&metric.as_str()) {
            report.push_warning(ValidationIssue::new(
                IssueSeverity::Warning,
                "unused_weight",
                entry_path,
                format!("'{metric}' is not a metric of this sector"),
                None,
            ));
        }
    }

    for metric in metric_keys {
        if !weights.contains_key(*metric) {
            report.push_error(ValidationIssue::new(
                IssueSeverity::Error,
                "missing_weight",
                weights_path.clone(),
                format!("no weight defined for metric '{metric}'"),
                None,
            ));
            valid = false;
        }
    }

    let thresholds = match &entry.thresholds {
        Some(entries) => compile_thresholds(entries, &format!("{path}/thresholds"), report),
        None => Some(ThresholdSet::weighted_default()),
    };

    match (valid, thresholds) {
        (true, Some(thresholds)) => {
            Some(WeightedAverage::new(weights.clone()).with_thresholds(thresholds))
        }
        _ => None,
    }
}

fn compile_matrix(
    dimensions: Option<&[String]>,
    rules: &[String],
    path: &str,
    known: &BTreeSet<&str>,
    known_label: &str,
    report: &mut ValidationReport,
) -> Option<MatrixAggregation> {
    let dimensions_path = format!("{path}/dimensions");
    let dimensions = match dimensions {
        Some(dimensions) if !dimensions.is_empty() => dimensions,
        _ => {
            report.push_error(ValidationIssue::new(
                IssueSeverity::Error,
                "missing_dimensions",
                dimensions_path,
                "matrix requires at least one dimension",
                None,
            ));
            return None;
        }
    };

    let mut valid = true;
    let mut seen = BTreeSet::new();
    for (idx, dimension) in dimensions.iter().enumerate() {
        let entry_path = format!("{dimensions_path}/{idx}");
        if !seen.insert(dimension.as_str()) {
            report.push_error(ValidationIssue::new(
                IssueSeverity::Error,
                "duplicate_dimension",
                entry_path,
                format!("dimension '{dimension}' is listed more than once"),
                None,
            ));
            valid = false;
        } else if !known.contains(dimension.as_str()) {
            report.push_warning(ValidationIssue::new(
                IssueSeverity::Warning,
                "unknown_dimension",
                entry_path,
                format!("'{dimension}' is not {known_label}"),
                Some("the dimension will always match as '*'".to_string()),
            ));
        }
    }

    let rules_path = format!("{path}/rules");
    if rules.is_empty() {
        report.push_error(ValidationIssue::new(
            IssueSeverity::Error,
            "missing_rules",
            rules_path.clone(),
            "matrix requires at least one rule",
            Some("add a catch-all rule such as \"* | * = red\"".to_string()),
        ));
        valid = false;
    }

    let mut table = RuleTable::new(dimensions.len());
    for (idx, rule) in rules.iter().enumerate() {
        let parsed = MatrixRule::parse(rule, dimensions.len())
            .and_then(|parsed| table.insert(rule, parsed));
        if let Err(err) = parsed {
            report.push_error(ValidationIssue::new(
                IssueSeverity::Error,
                "invalid_rule",
                format!("{rules_path}/{idx}"),
                err.to_string(),
                None,
            ));
            valid = false;
        }
    }

    valid.then(|| MatrixAggregation {
        dimensions: dimensions.to_vec(),
        rules: table,
    })
}

fn compile_final(
    overall: &FinalAggregationConfig,
    sectors: &BTreeSet<&str>,
    registry: &AggregatorRegistry,
    report: &mut ValidationReport,
) -> FinalMethod {
    let path = "/aggregation/final";
    let has_matrix_parameters = !overall.dimensions.is_empty() || !overall.rules.is_empty();

    match overall.method.as_deref() {
        None | Some(WORST_COLOR) => {
            if has_matrix_parameters {
                report.push_warning(ignored_parameters(path, WORST_COLOR, "dimensions/rules"));
            }
            FinalMethod::WorstColor
        }
        Some(MATRIX) => compile_matrix(
            Some(overall.dimensions.as_slice()),
            &overall.rules,
            path,
            sectors,
            "a sector",
            report,
        )
        .map(FinalMethod::Matrix)
        .unwrap_or_default(),
        Some(name) if name == WEIGHTED_AVERAGE || registry.contains(name) => {
            report.push_warning(ValidationIssue::new(
                IssueSeverity::Warning,
                "final_method_fallback",
                format!("{path}/method"),
                format!("final method '{name}' is not supported; using worst_color"),
                Some("use worst_color or matrix for the final rating".to_string()),
            ));
            FinalMethod::WorstColor
        }
        Some(name) => {
            report.push_error(unknown_method(&format!("{path}/method"), name, registry));
            FinalMethod::WorstColor
        }
    }
}

/// Metric keys per sector label.
fn sector_members(config: &ModelConfig) -> BTreeMap<&str, Vec<&str>> {
    let mut members: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for (key, metric) in &config.metrics {
        members
            .entry(metric.sector.as_str())
            .or_default()
            .push(key.as_str());
    }
    members
}

fn simple_method(name: &str, registry: &AggregatorRegistry) -> Option<SectorMethod> {
    SectorMethod::builtin(name).or_else(|| {
        registry
            .contains(name)
            .then(|| SectorMethod::Registered(name.to_string()))
    })
}

fn unknown_method(path: &str, name: &str, registry: &AggregatorRegistry) -> ValidationIssue {
    let mut known: Vec<&str> = registry.names().collect();
    known.extend(AggregatorRegistry::RESERVED);
    known.sort_unstable();
    ValidationIssue::new(
        IssueSeverity::Error,
        "unknown_method",
        path,
        format!("unknown aggregation method '{name}'"),
        Some(format!("expected one of: {}", known.join(", "))),
    )
}

fn ignored_parameters(path: &str, method: &str, what: &str) -> ValidationIssue {
    ValidationIssue::new(
        IssueSeverity::Warning,
        "ignored_parameters",
        path,
        format!("{what} are ignored by method '{method}'"),
        None,
    )
}

fn normalized_json_pointer(pointer: &str) -> String {
    if pointer.is_empty() {
        "/".to_string()
    } else {
        pointer.to_string()
    }
}

/// Escape a map key for use in a JSON pointer.
fn pointer_segment(key: &str) -> String {
    key.replace('~', "~0").replace('/', "~1")
}

#[cfg(test)]
mod tests {
    use super::*;
    use prism_core::{SectorAggregator, Result as CoreResult};
    use serde_json::json;

    fn parse(value: Value) -> ModelConfig {
        serde_json::from_value(value).expect("model config")
    }

    fn base() -> Value {
        json!({
            "model_id": "pd_model",
            "metrics": {
                "gini": {
                    "metric_id": "gini",
                    "sector": "discrimination",
                    "color": {"green": ">= 0.4", "yellow": ">= 0.3", "red": "< 0.3"}
                },
                "psi": {
                    "metric_id": "psi",
                    "sector": "stability",
                    "color": {"green": "< 0.1", "yellow": "< 0.25", "red": ">= 0.25"}
                }
            }
        })
    }

    #[test]
    fn defaults_compile_to_worst_color() {
        let validated = compile_config(&parse(base()), &AggregatorRegistry::new())
            .expect("valid config");
        assert!(validated.warnings.is_empty());
        assert_eq!(validated.rating.sector_method, SectorMethod::WorstColor);
        assert_eq!(validated.rating.final_method, FinalMethod::WorstColor);
        assert_eq!(validated.rating.metrics.len(), 2);
        assert_eq!(validated.rating.metrics["gini"].sector, "discrimination");
    }

    #[test]
    fn metric_without_sector_lands_in_default() {
        let config = parse(json!({
            "model_id": "m",
            "metrics": {"auc": {"metric_id": "auc", "color": {"green": ">= 0.7"}}}
        }));
        let validated = compile_config(&config, &AggregatorRegistry::new()).expect("valid");
        assert_eq!(validated.rating.metrics["auc"].sector, "default");
    }

    #[test]
    fn collects_every_malformed_threshold() {
        let config = parse(json!({
            "model_id": "m",
            "metrics": {
                "a": {"metric_id": "a", "color": {"green": "greater than 1"}},
                "b": {"metric_id": "b", "color": {"purple": ">= 1"}},
                "c": {"metric_id": "c", "color": {}}
            }
        }));
        let report = compile_config(&config, &AggregatorRegistry::new()).expect_err("invalid");
        assert!(report.has_error("invalid_threshold"));
        assert!(report.has_error("invalid_color"));
        assert!(report.has_error("missing_thresholds"));
        let paths: Vec<&str> = report.errors.iter().map(|issue| issue.path.as_str()).collect();
        assert!(paths.contains(&"/metrics/a/color/green"));
        assert!(paths.contains(&"/metrics/b/color/purple"));
        assert!(paths.contains(&"/metrics/c/color"));
    }

    #[test]
    fn unknown_sector_method_is_rejected() {
        let mut value = base();
        value["aggregation"] = json!({"sector": {"method": "median"}});
        let report =
            compile_config(&parse(value), &AggregatorRegistry::new()).expect_err("unknown");
        assert!(report.has_error("unknown_method"));
        assert_eq!(report.errors[0].path, "/aggregation/sector/method");
    }

    #[test]
    fn registered_method_is_accepted() {
        struct Median;
        impl SectorAggregator for Median {
            fn name(&self) -> &str {
                "median"
            }
            fn aggregate(&self, colors: &[Color]) -> CoreResult<Color> {
                let mut sorted = colors.to_vec();
                sorted.sort();
                Ok(sorted[sorted.len() / 2])
            }
        }

        let registry =
            AggregatorRegistry::with_aggregators([Box::new(Median) as Box<dyn SectorAggregator>])
                .expect("registry");
        let mut value = base();
        value["aggregation"] = json!({"sector": {"method": "median"}});
        let validated = compile_config(&parse(value), &registry).expect("valid");
        assert_eq!(
            validated.rating.sector_method,
            SectorMethod::Registered("median".to_string())
        );
    }

    #[test]
    fn weighted_override_requires_weight_per_metric() {
        let config = parse(json!({
            "model_id": "m",
            "metrics": {
                "a": {"metric_id": "a", "sector": "s", "color": {"green": ">= 1", "red": "< 1"}},
                "b": {"metric_id": "b", "sector": "s", "color": {"green": ">= 1", "red": "< 1"}}
            },
            "aggregation": {"sector": {"overrides": {"s": {
                "method": "weighted_average",
                "weights": {"a": 1.0, "z": 2.0}
            }}}}
        }));
        let report = compile_config(&config, &AggregatorRegistry::new()).expect_err("invalid");
        assert!(report.has_error("missing_weight"));
        assert!(report.has_warning("unused_weight"));
    }

    #[test]
    fn weighted_override_rejects_non_positive_weights() {
        let config = parse(json!({
            "model_id": "m",
            "metrics": {"a": {"metric_id": "a", "sector": "s", "color": {"green": ">= 1"}}},
            "aggregation": {"sector": {"overrides": {"s": {
                "method": "weighted_average",
                "weights": {"a": 0.0}
            }}}}
        }));
        let report = compile_config(&config, &AggregatorRegistry::new()).expect_err("invalid");
        assert!(report.has_error("invalid_weight"));
        assert_eq!(report.errors[0].path, "/aggregation/sector/overrides/s/weights/a");
    }

    #[test]
    fn weighted_override_compiles_custom_thresholds() {
        let config = parse(json!({
            "model_id": "m",
            "metrics": {"a": {"metric_id": "a", "sector": "s", "color": {"green": ">= 1"}}},
            "aggregation": {"sector": {"overrides": {"s": {
                "method": "weighted_average",
                "weights": {"a": 2.0},
                "thresholds": {"green": ">= 2.8", "yellow": ">= 2.0", "red": "< 2.0"}
            }}}}
        }));
        let validated = compile_config(&config, &AggregatorRegistry::new()).expect("valid");
        let SectorMethod::WeightedAverage(weighted) = validated.rating.method_for("s") else {
            panic!("expected weighted average");
        };
        assert_eq!(weighted.weights["a"], 2.0);
        assert_eq!(weighted.thresholds.evaluate(2.5).ok(), Some(Color::Yellow));
    }

    #[test]
    fn matrix_override_reports_rule_errors_by_index() {
        let config = parse(json!({
            "model_id": "m",
            "metrics": {
                "a": {"metric_id": "a", "sector": "s", "color": {"green": ">= 1"}},
                "b": {"metric_id": "b", "sector": "s", "color": {"green": ">= 1"}}
            },
            "aggregation": {"sector": {"overrides": {"s": {
                "method": "matrix",
                "dimensions": ["a", "b"],
                "rules": ["green | green = green", "green = green", "red | * = blue"]
            }}}}
        }));
        let report = compile_config(&config, &AggregatorRegistry::new()).expect_err("invalid");
        let paths: Vec<&str> = report
            .errors
            .iter()
            .filter(|issue| issue.code == "invalid_rule")
            .map(|issue| issue.path.as_str())
            .collect();
        assert_eq!(
            paths,
            vec![
                "/aggregation/sector/overrides/s/rules/1",
                "/aggregation/sector/overrides/s/rules/2"
            ]
        );
    }

    #[test]
    fn matrix_without_dimensions_is_rejected() {
        let mut value = base();
        value["aggregation"] = json!({"final": {"method": "matrix", "rules": ["* = red"]}});
        let report =
            compile_config(&parse(value), &AggregatorRegistry::new()).expect_err("invalid");
        assert!(report.has_error("missing_dimensions"));
    }

    #[test]
    fn final_matrix_warns_on_unknown_sector() {
        let mut value = base();
        value["aggregation"] = json!({"final": {
            "method": "matrix",
            "dimensions": ["discrimination", "calibration"],
            "rules": ["* | * = green"]
        }});
        let validated = compile_config(&parse(value), &AggregatorRegistry::new()).expect("valid");
        assert!(validated.warnings.iter().any(|issue| issue.code == "unknown_dimension"));
        assert_eq!(validated.rating.final_method.name(), MATRIX);
    }

    #[test]
    fn duplicate_final_dimension_is_rejected() {
        let mut value = base();
        value["aggregation"] = json!({"final": {
            "method": "matrix",
            "dimensions": ["stability", "stability"],
            "rules": ["* | * = green"]
        }});
        let report =
            compile_config(&parse(value), &AggregatorRegistry::new()).expect_err("invalid");
        assert!(report.has_error("duplicate_dimension"));
    }

    #[test]
    fn non_matrix_final_method_falls_back_with_warning() {
        let mut value = base();
        value["aggregation"] = json!({"final": {"method": "majority"}});
        let validated = compile_config(&parse(value), &AggregatorRegistry::new()).expect("valid");
        assert_eq!(validated.rating.final_method, FinalMethod::WorstColor);
        assert!(validated.warnings.iter().any(|issue| issue.code == "final_method_fallback"));
    }

    #[test]
    fn unknown_final_method_is_an_error() {
        let mut value = base();
        value["aggregation"] = json!({"final": {"method": "bogus"}});
        let report =
            compile_config(&parse(value), &AggregatorRegistry::new()).expect_err("invalid");
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].code, "unknown_method");
        assert_eq!(report.errors[0].path, "/aggregation/final/method");
    }

    #[test]
    fn unused_override_is_a_warning() {
        let mut value = base();
        value["aggregation"] = json!({
            "sector": {"overrides": {"calibration": {"method": "best_color"}}}
        });
        let validated = compile_config(&parse(value), &AggregatorRegistry::new()).expect("valid");
        assert!(validated.rating.sector_overrides.is_empty());
        assert!(validated.warnings.iter().any(|issue| issue.code == "unused_override"));
    }

    #[test]
    fn parameterized_default_needs_overrides_everywhere() {
        let mut value = base();
        value["aggregation"] = json!({"sector": {
            "method": "weighted_average",
            "overrides": {"stability": {"weights": {"psi": 1.0}}}
        }});
        let report =
            compile_config(&parse(value), &AggregatorRegistry::new()).expect_err("invalid");
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].message.contains("discrimination"));
    }

    #[test]
    fn override_without_method_inherits_default_name() {
        let mut value = base();
        value["aggregation"] = json!({"sector": {
            "method": "best_color",
            "overrides": {"stability": {}}
        }});
        let validated = compile_config(&parse(value), &AggregatorRegistry::new()).expect("valid");
        assert_eq!(validated.rating.method_for("stability"), &SectorMethod::BestColor);
    }

    #[test]
    fn structural_errors_stop_before_semantics() {
        let value = json!({"metrics": {"a": {"color": {"green": ">= 1"}}}});
        let report = load_config(&value, &AggregatorRegistry::new()).expect_err("missing model_id");
        assert!(report.has_error("schema_violation"));
    }

    #[test]
    fn missing_metric_id_is_only_a_warning() {
        let value = json!({"model_id": "m", "metrics": {"a": {"color": {"green": ">= 1"}}}});
        let validated = load_config(&value, &AggregatorRegistry::new()).expect("valid");
        assert_eq!(validated.warnings.len(), 1);
        assert_eq!(validated.warnings[0].path, "/metrics/a/metric_id");
    }

    #[test]
    fn pointer_segments_are_escaped() {
        assert_eq!(pointer_segment("a/b~c"), "a~1b~0c");
    }
}
