use thiserror::Error;

use crate::threshold::ThresholdSet;

/// Core error type shared across Prism crates.
#[derive(Debug, Error)]
pub enum Error {
    /// A threshold expression does not follow `<op> <number>`.
    #[error("invalid threshold expression: {expr:?}")]
    InvalidThreshold { expr: String },
    /// No threshold in the set accepted the value.
    #[error("no threshold matched for value={value} with thresholds={thresholds}")]
    NoThresholdMatch { value: f64, thresholds: ThresholdSet },
    /// Aggregation was asked to combine nothing.
    #[error("cannot aggregate an empty set of colors")]
    EmptyInput,
    #[error("total weight is zero")]
    ZeroWeight,
    #[error("no weight defined for metric {0:?}")]
    MissingWeight(String),
    #[error("unknown aggregation method: {0:?}")]
    UnknownMethod(String),
    #[error("aggregation method {0:?} is already registered")]
    DuplicateMethod(String),
    /// Names owned by the parameterized methods cannot be registered.
    #[error("aggregation method {0:?} is reserved")]
    ReservedMethod(String),
    #[error(transparent)]
    RuleParse(#[from] RuleParseError),
    /// Even the all-wildcard key had no rule.
    #[error("no rule matched for colors {input}")]
    NoRuleMatch { input: String },
    #[error("no color provided for dimension {0:?}")]
    MissingDimension(String),
    #[error("invalid color: {0:?}")]
    InvalidColor(String),
}

/// Matrix rule syntax errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleParseError {
    #[error("invalid rule (missing '='): {rule:?}")]
    MissingEquals { rule: String },
    #[error("rule has {found} dimensions, expected {expected}: {rule:?}")]
    DimensionMismatch {
        rule: String,
        found: usize,
        expected: usize,
    },
    #[error("invalid color {token:?} in rule: {rule:?}")]
    InvalidToken { rule: String, token: String },
    #[error("invalid result color {result:?} in rule: {rule:?}")]
    InvalidResult { rule: String, result: String },
    #[error("rule conflicts with an earlier rule for the same colors: {rule:?}")]
    ConflictingRule { rule: String },
}

/// Convenience alias for results returned by Prism crates.
pub type Result<T> = std::result::Result<T, Error>;
