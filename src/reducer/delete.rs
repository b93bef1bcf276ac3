use crate::error::FlowOperationError;
use crate::model::Step;
use crate::traversal::StepIndex;
use crate::traversal::index::slot_at_mut;

/// Removes the step named `name` together with every subtree it owns. Its
/// continuation takes over the slot the step occupied.
pub(super) fn delete_action(root: &mut Step, name: &str) -> Result<(), FlowOperationError> {
    let index = StepIndex::build(root)?;
    let path = index
        .path(name)
        .ok_or_else(|| FlowOperationError::StepNotFound(name.to_string()))?;
    if path.is_empty() {
        return Err(FlowOperationError::TriggerNotAllowed(name.to_string()));
    }

    let slot = slot_at_mut(root, path)
        .ok_or_else(|| FlowOperationError::StepNotFound(name.to_string()))?;
    let removed = slot.take();
    *slot = removed.and_then(|step| step.next_action.clone());
    Ok(())
}
