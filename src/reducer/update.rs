use crate::error::FlowOperationError;
use crate::model::{SplitBranch, SplitSettings, Step, StepKind};
use crate::operation::{ActionSettings, TriggerKind, UpdateActionRequest, UpdateTriggerRequest};
use crate::traversal::{StepIndex, get_all_steps};
use crate::traversal::index::step_at_mut;
use std::mem;
use std::sync::Arc;

/// Replaces the trigger's display name, settings and validity. Its first
/// action is only replaced when the request carries one.
pub(super) fn update_trigger(
    root: &mut Step,
    request: UpdateTriggerRequest,
) -> Result<(), FlowOperationError> {
    let UpdateTriggerRequest {
        display_name,
        valid,
        settings,
        next_action,
    } = request;

    root.display_name = display_name;
    root.valid = valid;
    root.kind = match settings {
        TriggerKind::Empty => StepKind::Empty,
        TriggerKind::Trigger(settings) => StepKind::Trigger { settings },
    };
    if let Some(next_action) = next_action {
        root.next_action = Some(next_action);
        validate_tree(root)?;
    }
    Ok(())
}

/// Child slots an update request supplies explicitly.
struct IncomingSlots {
    on_success_action: Option<Arc<Step>>,
    on_failure_action: Option<Arc<Step>>,
    first_loop_action: Option<Arc<Step>>,
    branches: Option<Vec<SplitBranch>>,
}

pub(super) fn update_action(
    root: &mut Step,
    request: UpdateActionRequest,
) -> Result<(), FlowOperationError> {
    let UpdateActionRequest {
        name,
        display_name,
        valid,
        settings,
        next_action,
        on_success_action,
        on_failure_action,
        first_loop_action,
        branches,
    } = request;

    let index = StepIndex::build(root)?;
    let path = index
        .path(&name)
        .ok_or_else(|| FlowOperationError::StepNotFound(name.clone()))?;
    if path.is_empty() {
        return Err(FlowOperationError::TriggerNotAllowed(name));
    }

    let step =
        step_at_mut(root, path).ok_or_else(|| FlowOperationError::StepNotFound(name.clone()))?;
    let incoming = IncomingSlots {
        on_success_action,
        on_failure_action,
        first_loop_action,
        branches,
    };
    let previous = mem::replace(&mut step.kind, StepKind::Empty);
    step.kind = merge_kind(&name, previous, settings, incoming)?;
    step.display_name = display_name;
    step.valid = valid;
    if let Some(next_action) = next_action {
        step.next_action = Some(next_action);
    }

    // Incoming subtrees may reintroduce names that already exist elsewhere.
    validate_tree(root)
}

/// Re-checks name uniqueness and that no trigger sits below the root.
fn validate_tree(root: &Step) -> Result<(), FlowOperationError> {
    StepIndex::build(root)?;
    match get_all_steps(root).into_iter().skip(1).find(|step| step.is_trigger()) {
        Some(step) => Err(FlowOperationError::InvalidActionType {
            name: step.name.clone(),
            step_type: step.step_type(),
        }),
        None => Ok(()),
    }
}

/// Builds the new kind from the incoming settings. Child slots absent from the
/// request are carried over when the step keeps its type.
fn merge_kind(
    name: &str,
    previous: StepKind,
    settings: ActionSettings,
    incoming: IncomingSlots,
) -> Result<StepKind, FlowOperationError> {
    let kind = match (settings, previous) {
        (ActionSettings::Empty, _) => StepKind::Empty,
        (ActionSettings::Code(settings), _) => StepKind::Code { settings },
        (ActionSettings::Block(settings), _) => StepKind::Block { settings },
        (
            ActionSettings::Branch(settings),
            StepKind::Branch {
                on_success_action,
                on_failure_action,
                ..
            },
        ) => StepKind::Branch {
            settings,
            on_success_action: incoming.on_success_action.or(on_success_action),
            on_failure_action: incoming.on_failure_action.or(on_failure_action),
        },
        (ActionSettings::Branch(settings), _) => StepKind::Branch {
            settings,
            on_success_action: incoming.on_success_action,
            on_failure_action: incoming.on_failure_action,
        },
        (
            ActionSettings::Loop(settings),
            StepKind::Loop {
                first_loop_action, ..
            },
        ) => StepKind::Loop {
            settings,
            first_loop_action: incoming.first_loop_action.or(first_loop_action),
        },
        (ActionSettings::Loop(settings), _) => StepKind::Loop {
            settings,
            first_loop_action: incoming.first_loop_action,
        },
        (ActionSettings::Split(settings), previous) => {
            ensure_default_branch_kept(name, &settings)?;
            let existing = match previous {
                StepKind::Split { branches, .. } => branches,
                _ => Vec::new(),
            };
            let branches = prune_branches(&settings, incoming.branches.unwrap_or(existing));
            StepKind::Split { settings, branches }
        }
    };
    Ok(kind)
}

fn ensure_default_branch_kept(
    name: &str,
    settings: &SplitSettings,
) -> Result<(), FlowOperationError> {
    if settings.has_option(&settings.default_branch) {
        Ok(())
    } else {
        Err(FlowOperationError::DefaultBranchRemoval {
            step: name.to_string(),
            option_id: settings.default_branch.clone(),
        })
    }
}

/// Drops branch entries whose option no longer exists.
fn prune_branches(settings: &SplitSettings, mut branches: Vec<SplitBranch>) -> Vec<SplitBranch> {
    branches.retain(|branch| settings.has_option(&branch.option_id));
    branches
}
