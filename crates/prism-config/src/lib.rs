//! Model configuration files for Prism: data model, JSON Schema and validation.

pub mod errors;
pub mod load;
pub mod model;
pub mod schema;
pub mod validate;

pub use errors::{ConfigError, IssueSeverity, ValidationIssue, ValidationReport};
pub use load::{ConfigFormat, load_config_file, parse_document, read_document};
pub use model::{
    AggregationConfig, FinalAggregationConfig, MetricConfig, ModelConfig, SectorAggregationConfig,
    SectorOverride,
};
pub use schema::config_json_schema;
pub use validate::{
    ValidatedConfig, compile_config, load_config, validate_config, validate_config_json,
};
