use crate::error::FlowDocumentError;
use crate::model::{
    BlockSettings, BranchSettings, CodeSettings, LoopSettings, SplitBranch, SplitSettings, Step,
    TriggerSettings, parse_document,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// A typed request to transform a `FlowVersion`.
///
/// Serialized as `{ "type": "ADD_ACTION", "request": { ... } }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "request", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Operation {
    AddAction(AddActionRequest),
    DeleteAction(DeleteActionRequest),
    UpdateAction(UpdateActionRequest),
    UpdateTrigger(UpdateTriggerRequest),
    DuplicateAction(DuplicateActionRequest),
    MoveAction(MoveActionRequest),
    LockFlow,
    RemoveConnections,
}

impl Operation {
    pub fn operation_type(&self) -> OperationType {
        match self {
            Operation::AddAction(_) => OperationType::AddAction,
            Operation::DeleteAction(_) => OperationType::DeleteAction,
            Operation::UpdateAction(_) => OperationType::UpdateAction,
            Operation::UpdateTrigger(_) => OperationType::UpdateTrigger,
            Operation::DuplicateAction(_) => OperationType::DuplicateAction,
            Operation::MoveAction(_) => OperationType::MoveAction,
            Operation::LockFlow => OperationType::LockFlow,
            Operation::RemoveConnections => OperationType::RemoveConnections,
        }
    }

    /// The step an operation is aimed at, for logging.
    pub fn target(&self) -> Option<&str> {
        match self {
            Operation::AddAction(request) => Some(&request.action.name),
            Operation::DeleteAction(request) => Some(&request.name),
            Operation::UpdateAction(request) => Some(&request.name),
            Operation::DuplicateAction(request) => Some(&request.step_name),
            Operation::MoveAction(request) => Some(&request.name),
            Operation::UpdateTrigger(_)
            | Operation::LockFlow
            | Operation::RemoveConnections => None,
        }
    }

    /// Parses a JSON array of operations.
    pub fn list_from_json(json: &str) -> Result<Vec<Operation>, FlowDocumentError> {
        parse_document(json)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationType {
    AddAction,
    DeleteAction,
    UpdateAction,
    UpdateTrigger,
    DuplicateAction,
    MoveAction,
    LockFlow,
    RemoveConnections,
}

impl OperationType {
    /// Whether the operation can change the step tree.
    pub fn is_structural(&self) -> bool {
        !matches!(self, OperationType::LockFlow)
    }
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OperationType::AddAction => "ADD_ACTION",
            OperationType::DeleteAction => "DELETE_ACTION",
            OperationType::UpdateAction => "UPDATE_ACTION",
            OperationType::UpdateTrigger => "UPDATE_TRIGGER",
            OperationType::DuplicateAction => "DUPLICATE_ACTION",
            OperationType::MoveAction => "MOVE_ACTION",
            OperationType::LockFlow => "LOCK_FLOW",
            OperationType::RemoveConnections => "REMOVE_CONNECTIONS",
        };
        write!(f, "{}", name)
    }
}

/// Where an inserted action lands relative to its parent step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StepLocationRelativeToParent {
    #[default]
    After,
    InsideTrueBranch,
    InsideFalseBranch,
    InsideLoop,
    InsideSplit,
}

impl fmt::Display for StepLocationRelativeToParent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StepLocationRelativeToParent::After => "AFTER",
            StepLocationRelativeToParent::InsideTrueBranch => "INSIDE_TRUE_BRANCH",
            StepLocationRelativeToParent::InsideFalseBranch => "INSIDE_FALSE_BRANCH",
            StepLocationRelativeToParent::InsideLoop => "INSIDE_LOOP",
            StepLocationRelativeToParent::InsideSplit => "INSIDE_SPLIT",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddActionRequest {
    pub parent_step: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_location_relative_to_parent: Option<StepLocationRelativeToParent>,
    /// Option id of the target branch, required for `INSIDE_SPLIT`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch_node_id: Option<String>,
    pub action: Step,
}

impl AddActionRequest {
    /// Inserts `action` as the continuation of `parent_step`.
    pub fn after(parent_step: impl Into<String>, action: Step) -> Self {
        Self {
            parent_step: parent_step.into(),
            step_location_relative_to_parent: None,
            branch_node_id: None,
            action,
        }
    }

    pub fn inside(
        parent_step: impl Into<String>,
        location: StepLocationRelativeToParent,
        action: Step,
    ) -> Self {
        Self {
            parent_step: parent_step.into(),
            step_location_relative_to_parent: Some(location),
            branch_node_id: None,
            action,
        }
    }

    pub fn inside_split(
        parent_step: impl Into<String>,
        branch_node_id: impl Into<String>,
        action: Step,
    ) -> Self {
        Self {
            parent_step: parent_step.into(),
            step_location_relative_to_parent: Some(StepLocationRelativeToParent::InsideSplit),
            branch_node_id: Some(branch_node_id.into()),
            action,
        }
    }

    pub fn location(&self) -> StepLocationRelativeToParent {
        self.step_location_relative_to_parent.unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteActionRequest {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateActionRequest {
    pub step_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveActionRequest {
    pub name: String,
    pub new_parent_step: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_location_relative_to_parent: Option<StepLocationRelativeToParent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch_node_id: Option<String>,
}

/// Type and settings of an action, as carried by an update request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "settings", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionSettings {
    Empty,
    Code(CodeSettings),
    Block(BlockSettings),
    Branch(BranchSettings),
    Split(SplitSettings),
    Loop(LoopSettings),
}

/// Replaces the scalar fields and settings of an existing action.
///
/// Structural pointers are optional: an absent pointer keeps the existing
/// subtree, a present one replaces it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateActionRequest {
    pub name: String,
    pub display_name: String,
    #[serde(default)]
    pub valid: bool,
    #[serde(flatten)]
    pub settings: ActionSettings,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_action: Option<Arc<Step>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_success_action: Option<Arc<Step>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_failure_action: Option<Arc<Step>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_loop_action: Option<Arc<Step>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branches: Option<Vec<SplitBranch>>,
}

impl UpdateActionRequest {
    /// A request that only replaces scalar fields and settings.
    pub fn new(
        name: impl Into<String>,
        display_name: impl Into<String>,
        settings: ActionSettings,
    ) -> Self {
        Self {
            name: name.into(),
            display_name: display_name.into(),
            valid: true,
            settings,
            next_action: None,
            on_success_action: None,
            on_failure_action: None,
            first_loop_action: None,
            branches: None,
        }
    }
}

/// Type and settings of the trigger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "settings", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TriggerKind {
    Empty,
    Trigger(TriggerSettings),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTriggerRequest {
    pub display_name: String,
    #[serde(default)]
    pub valid: bool,
    #[serde(flatten)]
    pub settings: TriggerKind,
    /// When present, replaces the first action of the flow.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_action: Option<Arc<Step>>,
}

impl UpdateTriggerRequest {
    pub fn new(display_name: impl Into<String>, settings: TriggerKind) -> Self {
        Self {
            display_name: display_name.into(),
            valid: true,
            settings,
            next_action: None,
        }
    }
}
