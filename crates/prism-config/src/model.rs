use std::collections::BTreeMap;

use prism_core::DEFAULT_SECTOR;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Monitored model and the metrics rated for it.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ModelConfig {
    /// Stable model identifier.
    pub model_id: String,
    /// Human-readable model name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_version: Option<String>,
    /// Metrics keyed by report key.
    pub metrics: BTreeMap<String, MetricConfig>,
    /// Sector and final aggregation settings.
    #[serde(default)]
    pub aggregation: AggregationConfig,
}

/// One rated metric.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct MetricConfig {
    /// Sector the metric rolls up into.
    #[serde(default = "default_sector")]
    pub sector: String,
    /// Threshold expression per color, e.g. `green: ">= 0.4"`.
    pub color: BTreeMap<String, String>,
    /// Identifier of the metric computation (consumed by the metric runner).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric_id: Option<String>,
    /// Where the metric is computed (consumed by the metric runner).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Metric computation inputs (shape depends on the metric).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inputs: Option<serde_json::Value>,
    /// Result field holding the value to rate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_field: Option<String>,
}

/// Two-layer aggregation settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct AggregationConfig {
    #[serde(default)]
    pub sector: SectorAggregationConfig,
    /// Final rating across sectors.
    #[serde(rename = "final", default)]
    pub overall: FinalAggregationConfig,
}

/// Sector-level method with per-sector overrides.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SectorAggregationConfig {
    /// Default method for every sector.
    #[serde(default = "default_method")]
    pub method: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub overrides: BTreeMap<String, SectorOverride>,
}

impl Default for SectorAggregationConfig {
    fn default() -> Self {
        Self {
            method: default_method(),
            overrides: BTreeMap::new(),
        }
    }
}

/// Method and parameters for a single sector.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct SectorOverride {
    /// Falls back to the sector-level default method.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    /// `weighted_average`: weight per metric key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weights: Option<BTreeMap<String, f64>>,
    /// `weighted_average`: score thresholds per color.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thresholds: Option<BTreeMap<String, String>>,
    /// `matrix`: metric keys in rule order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<Vec<String>>,
    /// `matrix`: rules such as `"red | * = red"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rules: Option<Vec<String>>,
}

/// Final aggregation: worst color by default, or a rule matrix over sectors.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct FinalAggregationConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    /// Sector names in rule order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dimensions: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<String>,
}

fn default_sector() -> String {
    DEFAULT_SECTOR.to_string()
}

fn default_method() -> String {
    prism_core::sector::WORST_COLOR.to_string()
}
