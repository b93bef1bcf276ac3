use super::step::{Step, StepKind};
use crate::error::FlowDocumentError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;

/// Name given to the trigger of a freshly created flow version.
pub const DEFAULT_TRIGGER_NAME: &str = "trigger";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FlowVersionState {
    #[default]
    Draft,
    /// Terminal. Upstream services refuse further structural edits.
    Locked,
}

/// A snapshot of a flow's step tree, as persisted by the surrounding application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowVersion {
    pub id: String,
    pub flow_id: String,
    pub display_name: String,
    pub trigger: Step,
    #[serde(default)]
    pub valid: bool,
    #[serde(default)]
    pub state: FlowVersionState,
}

impl FlowVersion {
    /// Creates a draft holding only an `EMPTY` trigger.
    pub fn new_draft(
        id: impl Into<String>,
        flow_id: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            flow_id: flow_id.into(),
            display_name: display_name.into(),
            trigger: Step::new(DEFAULT_TRIGGER_NAME, "Select Trigger", StepKind::Empty)
                .with_valid(false),
            valid: false,
            state: FlowVersionState::Draft,
        }
    }

    pub fn is_locked(&self) -> bool {
        self.state == FlowVersionState::Locked
    }

    pub fn from_json(json: &str) -> Result<Self, FlowDocumentError> {
        parse_document(json)
    }

    pub fn to_json(&self) -> Result<String, FlowDocumentError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| FlowDocumentError::SerializationError(e.to_string()))
    }

    /// Loads a flow version from a JSON document on disk.
    pub fn from_file(path: &str) -> Result<Self, FlowDocumentError> {
        let json = fs::read_to_string(path).map_err(|e| FlowDocumentError::FileError {
            path: path.to_string(),
            message: e.to_string(),
        })?;
        Self::from_json(&json)
    }

    /// Writes the flow version as a pretty-printed JSON document.
    pub fn save(&self, path: &str) -> Result<(), FlowDocumentError> {
        let json = self.to_json()?;
        fs::write(path, json).map_err(|e| FlowDocumentError::FileError {
            path: path.to_string(),
            message: e.to_string(),
        })
    }
}

/// Parses a JSON document whose nesting grows with the length of its step chains.
///
/// Each step sits one level below its predecessor's `nextAction`, so the
/// parser runs without a recursion limit and grows its stack on demand.
pub(crate) fn parse_document<T: DeserializeOwned>(json: &str) -> Result<T, FlowDocumentError> {
    let to_parse_error = |e: serde_json::Error| FlowDocumentError::JsonParseError(e.to_string());
    let mut deserializer = serde_json::Deserializer::from_str(json);
    deserializer.disable_recursion_limit();
    let value = T::deserialize(serde_stacker::Deserializer::new(&mut deserializer))
        .map_err(to_parse_error)?;
    deserializer.end().map_err(to_parse_error)?;
    Ok(value)
}
