use schemars::schema::RootSchema;
use schemars::schema_for;

use crate::model::ModelConfig;

/// Emit the JSON Schema for model configuration files.
pub fn config_json_schema() -> RootSchema {
    schema_for!(ModelConfig)
}
