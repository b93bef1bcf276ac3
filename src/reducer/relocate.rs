use super::add::insert_into;
use crate::error::FlowOperationError;
use crate::model::Step;
use crate::operation::MoveActionRequest;
use crate::traversal::index::{slot_at_mut, step_at_mut};
use crate::traversal::{StepIndex, is_child_of, step_at};
use std::sync::Arc;

/// Detaches a step with its owned subtrees and re-inserts it elsewhere. The
/// step's continuation stays where it was.
pub(super) fn move_action(
    root: &mut Step,
    request: MoveActionRequest,
) -> Result<(), FlowOperationError> {
    let location = request.step_location_relative_to_parent.unwrap_or_default();
    let MoveActionRequest {
        name,
        new_parent_step,
        branch_node_id,
        ..
    } = request;

    let index = StepIndex::build(root)?;
    let path = index
        .path(&name)
        .ok_or_else(|| FlowOperationError::StepNotFound(name.clone()))?;
    if path.is_empty() {
        return Err(FlowOperationError::TriggerNotAllowed(name));
    }
    if !index.contains(&new_parent_step) {
        return Err(FlowOperationError::ParentNotFound(new_parent_step));
    }

    let moving = step_at(root, path).ok_or_else(|| FlowOperationError::StepNotFound(name.clone()))?;
    if moving.name == new_parent_step || is_child_of(moving, &new_parent_step) {
        return Err(FlowOperationError::MoveIntoOwnSubtree {
            step: name,
            parent: new_parent_step,
        });
    }

    let slot =
        slot_at_mut(root, path).ok_or_else(|| FlowOperationError::StepNotFound(name.clone()))?;
    let detached = slot
        .take()
        .ok_or_else(|| FlowOperationError::StepNotFound(name.clone()))?;
    let mut moved = Arc::unwrap_or_clone(detached);
    *slot = moved.next_action.take();

    // Paths below the old position shifted when the step was detached.
    let index = StepIndex::build(root)?;
    let parent_path = index
        .path(&new_parent_step)
        .ok_or_else(|| FlowOperationError::ParentNotFound(new_parent_step.clone()))?;
    let parent = step_at_mut(root, parent_path)
        .ok_or_else(|| FlowOperationError::ParentNotFound(new_parent_step.clone()))?;
    insert_into(parent, location, branch_node_id, moved)
}
