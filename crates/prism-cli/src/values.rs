use std::collections::BTreeMap;

use prism_config::ModelConfig;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValuesError {
    #[error("metric values document must be an object keyed by metric, got {0}")]
    NotAnObject(&'static str),
}

/// A value that could not be used for a declared metric.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedValue {
    pub metric: String,
    pub reason: String,
}

/// Numeric values ready for rating, plus entries that were ignored.
#[derive(Debug, Default)]
pub struct ExtractedValues {
    pub values: BTreeMap<String, f64>,
    pub skipped: Vec<SkippedValue>,
}

/// Pull one number per metric out of a values document.
///
/// Each entry is either a number or a metric result object; for objects the
/// metric's `color_field` names the member holding the value.
pub fn extract_values(
    document: &Value,
    config: &ModelConfig,
) -> Result<ExtractedValues, ValuesError> {
    let Value::Object(entries) = document else {
        return Err(ValuesError::NotAnObject(kind(document)));
    };

    let mut extracted = ExtractedValues::default();
    for (key, entry) in entries {
        let Some(metric) = config.metrics.get(key) else {
            extracted.skip(key, "metric is not declared in the model config");
            continue;
        };

        match entry {
            Value::Number(number) => match number.as_f64() {
                Some(value) => {
                    extracted.values.insert(key.clone(), value);
                }
                None => extracted.skip(key, "number is not representable as f64"),
            },
            Value::Object(result) => {
                let Some(field) = metric.color_field.as_deref() else {
                    extracted.skip(key, "result object given but no color_field is configured");
                    continue;
                };
                match result.get(field).and_then(Value::as_f64) {
                    Some(value) => {
                        extracted.values.insert(key.clone(), value);
                    }
                    None => {
                        extracted.skip(key, &format!("field '{field}' is missing or not numeric"))
                    }
                }
            }
            other => {
                let reason = format!("expected a number or object, got {}", kind(other));
                extracted.skip(key, &reason);
            }
        }
    }

    Ok(extracted)
}

impl ExtractedValues {
    fn skip(&mut self, metric: &str, reason: &str) {
        self.skipped.push(SkippedValue {
            metric: metric.to_string(),
            reason: reason.to_string(),
        });
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config() -> ModelConfig {
        serde_json::from_value(json!({
            "model_id": "m",
            "metrics": {
                "gini": {"color": {"green": ">= 0.4"}, "color_field": "gini_value"},
                "psi": {"color": {"green": "< 0.1"}},
                "auc": {"color": {"green": ">= 0.7"}}
            }
        }))
        .expect("config")
    }

    #[test]
    fn reads_plain_numbers_and_color_fields() {
        let document = json!({
            "gini": {"gini_value": 0.42, "n_obs": 1000},
            "psi": 0.07
        });
        let extracted = extract_values(&document, &config()).expect("extract");
        assert_eq!(extracted.values["gini"], 0.42);
        assert_eq!(extracted.values["psi"], 0.07);
        assert!(extracted.skipped.is_empty());
    }

    #[test]
    fn unusable_entries_are_skipped_with_reasons() {
        let document = json!({
            "gini": {"other": 1.0},
            "psi": {"psi_value": 0.1},
            "auc": "0.8",
            "ks": 0.3
        });
        let extracted = extract_values(&document, &config()).expect("extract");
        assert!(extracted.values.is_empty());
        let skipped: Vec<&str> = extracted
            .skipped
            .iter()
            .map(|entry| entry.metric.as_str())
            .collect();
        assert_eq!(skipped, vec!["auc", "gini", "ks", "psi"]);
        assert!(extracted.skipped[0].reason.contains("string"));
    }

    #[test]
    fn non_object_document_is_rejected() {
        let err = extract_values(&json!([0.4]), &config()).expect_err("array");
        assert!(err.to_string().contains("array"));
    }
}
