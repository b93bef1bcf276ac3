use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Free-form input of a step, keyed by property name.
pub type StepInput = Map<String, Value>;

/// The input key holding a connection reference.
pub const AUTH_INPUT_KEY: &str = "auth";

/// Where a block package is resolved from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PackageType {
    #[default]
    Registry,
    Archive,
}

/// Settings of a trigger backed by a block.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package_type: Option<PackageType>,
    #[serde(default)]
    pub input: StepInput,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceCode {
    pub code: String,
    #[serde(default)]
    pub package_json: String,
}

/// A boolean option that the owning block may hide from the builder.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ToggleOption {
    pub value: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hide: Option<bool>,
}

/// Failure behaviour of an action. Preserved as-is, never interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorHandlingOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub continue_on_failure: Option<ToggleOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_on_failure: Option<ToggleOption>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeSettings {
    pub source_code: SourceCode,
    #[serde(default)]
    pub input: StepInput,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_handling_options: Option<ErrorHandlingOptions>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockSettings {
    pub block_name: String,
    pub block_version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_name: Option<String>,
    #[serde(default)]
    pub package_type: PackageType,
    #[serde(default)]
    pub input: StepInput,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_handling_options: Option<ErrorHandlingOptions>,
}

/// A single comparison inside a condition group. The operator is kept opaque.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchCondition {
    pub operator: String,
    #[serde(default)]
    pub first_value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub second_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub case_sensitive: Option<bool>,
}

/// Conditions are an ordered list of AND-groups, each holding OR'd conditions.
pub type ConditionGroups = Vec<Vec<BranchCondition>>;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchSettings {
    #[serde(default)]
    pub conditions: ConditionGroups,
}

/// One entry of a split's branch catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SplitOption {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub conditions: ConditionGroups,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SplitSettings {
    #[serde(default)]
    pub options: Vec<SplitOption>,
    /// Id of the option executed when no other option matches.
    pub default_branch: String,
}

impl SplitSettings {
    pub fn has_option(&self, option_id: &str) -> bool {
        self.options.iter().any(|option| option.id == option_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoopSettings {
    pub items: String,
}
