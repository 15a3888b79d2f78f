//! Core rating engine for Prism.
//!
//! This crate defines RAG colors, threshold evaluation, sector aggregation
//! strategies, and the matrix rule engine used for the final rating. Every
//! operation is a pure function of its inputs.

pub mod color;
pub mod config;
pub mod error;
pub mod matrix;
pub mod sector;
pub mod threshold;

pub use color::{Color, RuleToken};
pub use config::{
    DEFAULT_SECTOR, FinalMethod, MatrixAggregation, MetricSpec, RatingConfig, SectorMethod,
};
pub use error::{Error, Result, RuleParseError};
pub use matrix::{MatrixRule, RuleTable, parse_rules, resolve, resolve_available};
pub use sector::{
    AggregatorRegistry, BestColor, Majority, SectorAggregator, WeightedAverage, WorstColor,
    aggregate_sector, aggregate_sector_weighted, best_color, majority, worst_color,
};
pub use threshold::{Comparison, Threshold, ThresholdSet, evaluate_color, parse_threshold};
