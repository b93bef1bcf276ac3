use crate::error::FlowOperationError;
use crate::model::{SplitBranch, Step, StepKind};
use crate::operation::{AddActionRequest, StepLocationRelativeToParent};
use crate::traversal::index::step_at_mut;
use crate::traversal::{StepIndex, get_all_steps};
use ahash::AHashSet;
use std::sync::Arc;

pub(super) fn add_action(
    root: &mut Step,
    request: AddActionRequest,
) -> Result<(), FlowOperationError> {
    let location = request.location();
    let AddActionRequest {
        parent_step,
        branch_node_id,
        action,
        ..
    } = request;

    let index = StepIndex::build(root)?;
    ensure_insertable(&index, &action)?;

    let parent_path = index
        .path(&parent_step)
        .ok_or_else(|| FlowOperationError::ParentNotFound(parent_step.clone()))?;
    let parent = step_at_mut(root, parent_path)
        .ok_or_else(|| FlowOperationError::ParentNotFound(parent_step.clone()))?;
    insert_into(parent, location, branch_node_id, action)
}

/// Checks that none of the names in `action`'s subtree exist in the tree or
/// repeat within the subtree, and that it holds no trigger.
pub(super) fn ensure_insertable(
    index: &StepIndex,
    action: &Step,
) -> Result<(), FlowOperationError> {
    let mut seen = AHashSet::new();
    for step in get_all_steps(action) {
        if step.is_trigger() {
            return Err(FlowOperationError::InvalidActionType {
                name: step.name.clone(),
                step_type: step.step_type(),
            });
        }
        if index.contains(&step.name) || !seen.insert(step.name.as_str()) {
            return Err(FlowOperationError::DuplicateStepName(step.name.clone()));
        }
    }
    Ok(())
}

/// Places `action` in the slot of `parent` selected by `location`.
///
/// Whatever occupied the slot becomes the continuation of the last step in
/// `action`'s chain, so nothing is orphaned.
pub(super) fn insert_into(
    parent: &mut Step,
    location: StepLocationRelativeToParent,
    branch_node_id: Option<String>,
    action: Step,
) -> Result<(), FlowOperationError> {
    let invalid_parent = |parent: &Step| FlowOperationError::InvalidParentType {
        parent: parent.name.clone(),
        parent_type: parent.step_type(),
        location,
    };

    let slot = match location {
        StepLocationRelativeToParent::After => &mut parent.next_action,
        StepLocationRelativeToParent::InsideTrueBranch => match &mut parent.kind {
            StepKind::Branch {
                on_success_action, ..
            } => on_success_action,
            _ => return Err(invalid_parent(parent)),
        },
        StepLocationRelativeToParent::InsideFalseBranch => match &mut parent.kind {
            StepKind::Branch {
                on_failure_action, ..
            } => on_failure_action,
            _ => return Err(invalid_parent(parent)),
        },
        StepLocationRelativeToParent::InsideLoop => match &mut parent.kind {
            StepKind::Loop {
                first_loop_action, ..
            } => first_loop_action,
            _ => return Err(invalid_parent(parent)),
        },
        StepLocationRelativeToParent::InsideSplit => match &mut parent.kind {
            StepKind::Split { settings, branches } => {
                let option_id = branch_node_id.ok_or(FlowOperationError::MissingBranchNodeId)?;
                if !settings.has_option(&option_id) {
                    return Err(FlowOperationError::UnknownBranchOption {
                        step: parent.name.clone(),
                        option_id,
                    });
                }
                let position = match branches.iter().position(|b| b.option_id == option_id) {
                    Some(position) => position,
                    None => {
                        branches.push(SplitBranch::new(option_id));
                        branches.len() - 1
                    }
                };
                &mut branches[position].next_action
            }
            _ => return Err(invalid_parent(parent)),
        },
    };

    splice(slot, action);
    Ok(())
}

/// Makes `action` the new head of `slot`, pushing the old content behind it.
pub(super) fn splice(slot: &mut Option<Arc<Step>>, mut action: Step) {
    if let Some(displaced) = slot.take() {
        attach_to_tail(&mut action, displaced);
    }
    *slot = Some(Arc::new(action));
}

fn attach_to_tail(step: &mut Step, continuation: Arc<Step>) {
    match &mut step.next_action {
        Some(next) => attach_to_tail(Arc::make_mut(next), continuation),
        slot @ None => *slot = Some(continuation),
    }
}
