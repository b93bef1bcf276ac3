use crate::model::StepType;
use crate::operation::StepLocationRelativeToParent;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Machine-readable code shared by every structural violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    FlowOperationInvalid,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCode::FlowOperationInvalid => write!(f, "FLOW_OPERATION_INVALID"),
        }
    }
}

/// Errors raised when an operation would violate the structure of the step tree.
///
/// These are deterministic in their input and must not be retried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FlowOperationError {
    #[error("Step '{0}' already exists in the flow")]
    DuplicateStepName(String),

    #[error("Parent step '{0}' not found")]
    ParentNotFound(String),

    #[error("Step '{0}' not found")]
    StepNotFound(String),

    #[error("Cannot insert {location} of step '{parent}' because it is a {parent_type} step")]
    InvalidParentType {
        parent: String,
        parent_type: StepType,
        location: StepLocationRelativeToParent,
    },

    #[error("branchNodeId should be defined")]
    MissingBranchNodeId,

    #[error("Split '{step}' has no option '{option_id}'")]
    UnknownBranchOption { step: String, option_id: String },

    #[error("Step '{0}' is the trigger and cannot be targeted by an action operation")]
    TriggerNotAllowed(String),

    #[error("Step '{name}' has type {step_type}, which is not allowed below the trigger")]
    InvalidActionType { name: String, step_type: StepType },

    #[error("Option '{option_id}' of split '{step}' is the default branch and cannot be removed")]
    DefaultBranchRemoval { step: String, option_id: String },

    #[error("Cannot move step '{step}' under '{parent}', which lies inside it")]
    MoveIntoOwnSubtree { step: String, parent: String },
}

impl FlowOperationError {
    pub fn code(&self) -> ErrorCode {
        ErrorCode::FlowOperationInvalid
    }
}

/// Errors raised while reading or writing persisted documents.
#[derive(Error, Debug, Clone)]
pub enum FlowDocumentError {
    #[error("Failed to parse flow JSON: {0}")]
    JsonParseError(String),

    #[error("Failed to serialize flow: {0}")]
    SerializationError(String),

    #[error("Could not access file '{path}': {message}")]
    FileError { path: String, message: String },
}
