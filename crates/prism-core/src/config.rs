use std::collections::{BTreeMap, BTreeSet};

use crate::color::Color;
use crate::error::{Result, RuleParseError};
use crate::matrix::RuleTable;
use crate::sector::{BEST_COLOR, MAJORITY, MATRIX, WEIGHTED_AVERAGE, WORST_COLOR, WeightedAverage};
use crate::threshold::ThresholdSet;

/// Sector label used when a metric declares none.
pub const DEFAULT_SECTOR: &str = "default";

/// A metric's sector and thresholds.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSpec {
    pub sector: String,
    pub thresholds: ThresholdSet,
}

impl MetricSpec {
    pub fn new(sector: impl Into<String>, thresholds: ThresholdSet) -> Self {
        Self {
            sector: sector.into(),
            thresholds,
        }
    }
}

/// Matrix dimensions with a rule table of matching arity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatrixAggregation {
    pub dimensions: Vec<String>,
    pub rules: RuleTable,
}

impl MatrixAggregation {
    pub fn parse<S: AsRef<str>>(
        dimensions: Vec<String>,
        rules: &[S],
    ) -> std::result::Result<Self, RuleParseError> {
        let rules = RuleTable::parse(rules, dimensions.len())?;
        Ok(Self { dimensions, rules })
    }

    /// Resolve with inactive dimensions pinned to `*`.
    pub fn resolve_available<F>(&self, color_of: F) -> Result<Color>
    where
        F: Fn(&str) -> Option<Color>,
    {
        crate::matrix::resolve_available(&self.dimensions, &self.rules, color_of)
    }
}

/// How one sector's metric colors are combined.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum SectorMethod {
    #[default]
    WorstColor,
    BestColor,
    Majority,
    WeightedAverage(WeightedAverage),
    Matrix(MatrixAggregation),
    /// A parameterless method resolved through an `AggregatorRegistry`.
    Registered(String),
}

impl SectorMethod {
    pub fn name(&self) -> &str {
        match self {
            SectorMethod::WorstColor => WORST_COLOR,
            SectorMethod::BestColor => BEST_COLOR,
            SectorMethod::Majority => MAJORITY,
            SectorMethod::WeightedAverage(_) => WEIGHTED_AVERAGE,
            SectorMethod::Matrix(_) => MATRIX,
            SectorMethod::Registered(name) => name,
        }
    }

    /// Builtin parameterless method for `name`, if any.
    pub fn builtin(name: &str) -> Option<Self> {
        match name {
            WORST_COLOR => Some(SectorMethod::WorstColor),
            BEST_COLOR => Some(SectorMethod::BestColor),
            MAJORITY => Some(SectorMethod::Majority),
            _ => None,
        }
    }
}

/// How sector colors roll up into the final color.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum FinalMethod {
    #[default]
    WorstColor,
    Matrix(MatrixAggregation),
}

impl FinalMethod {
    pub fn name(&self) -> &str {
        match self {
            FinalMethod::WorstColor => WORST_COLOR,
            FinalMethod::Matrix(_) => MATRIX,
        }
    }
}

/// Immutable, fully parsed rating configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RatingConfig {
    pub metrics: BTreeMap<String, MetricSpec>,
    pub sector_method: SectorMethod,
    pub sector_overrides: BTreeMap<String, SectorMethod>,
    pub final_method: FinalMethod,
}

impl RatingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_metric(mut self, key: impl Into<String>, spec: MetricSpec) -> Self {
        self.metrics.insert(key.into(), spec);
        self
    }

    pub fn with_sector_method(mut self, method: SectorMethod) -> Self {
        self.sector_method = method;
        self
    }

    pub fn with_sector_override(mut self, sector: impl Into<String>, method: SectorMethod) -> Self {
        self.sector_overrides.insert(sector.into(), method);
        self
    }

    pub fn with_final_method(mut self, method: FinalMethod) -> Self {
        self.final_method = method;
        self
    }

    /// Override for `sector`, else the default sector method.
    pub fn method_for(&self, sector: &str) -> &SectorMethod {
        self.sector_overrides
            .get(sector)
            .unwrap_or(&self.sector_method)
    }

    /// Every sector label declared by a metric.
    pub fn sectors(&self) -> BTreeSet<&str> {
        self.metrics
            .values()
            .map(|spec| spec.sector.as_str())
            .collect()
    }
}
