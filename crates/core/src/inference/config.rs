//! Configuration for column type resolution

use serde::{Deserialize, Serialize};

use super::types::SqlType;

/// Configuration for column type resolution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", default)]
pub struct InferenceConfig {
    /// Type reported for a column in which every cell was blank
    pub empty_column_type: SqlType,

    /// Collect sample values for reporting
    pub collect_examples: bool,

    /// Maximum number of distinct samples kept per column
    pub max_examples: usize,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            empty_column_type: SqlType::Integer,
            collect_examples: true,
            max_examples: 3,
        }
    }
}

impl InferenceConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder for custom configuration
    pub fn builder() -> InferenceConfigBuilder {
        InferenceConfigBuilder::default()
    }
}

/// Builder for InferenceConfig
#[derive(Debug, Default)]
pub struct InferenceConfigBuilder {
    config: InferenceConfig,
}

impl InferenceConfigBuilder {
    /// Set the type used for all-blank columns
    pub fn empty_column_type(mut self, sql_type: SqlType) -> Self {
        self.config.empty_column_type = sql_type;
        self
    }

    /// Enable or disable example collection
    pub fn collect_examples(mut self, collect: bool) -> Self {
        self.config.collect_examples = collect;
        self
    }

    /// Set the maximum number of examples per column
    pub fn max_examples(mut self, max: usize) -> Self {
        self.config.max_examples = max;
        self
    }

    pub fn build(self) -> InferenceConfig {
        self.config
    }
}
