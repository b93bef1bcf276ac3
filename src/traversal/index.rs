use crate::error::FlowOperationError;
use crate::model::{Slot, Step};
use ahash::AHashMap;
use std::sync::Arc;
use tracing::trace;

/// Maps every step name to the slot path leading to it from the root.
///
/// Built with one traversal per operation; never cached across versions.
#[derive(Debug, Clone, Default)]
pub struct StepIndex {
    paths: AHashMap<String, Vec<Slot>>,
}

impl StepIndex {
    /// Indexes the tree rooted at `root`, failing on the first repeated name.
    pub fn build(root: &Step) -> Result<Self, FlowOperationError> {
        let mut index = Self::default();
        index.visit(root, Vec::new())?;
        trace!(steps = index.paths.len(), root = %root.name, "built step index");
        Ok(index)
    }

    fn visit(&mut self, step: &Step, path: Vec<Slot>) -> Result<(), FlowOperationError> {
        if self.paths.contains_key(&step.name) {
            return Err(FlowOperationError::DuplicateStepName(step.name.clone()));
        }
        self.paths.insert(step.name.clone(), path.clone());
        for (slot, child) in step.slots() {
            if let Some(child) = child {
                let mut child_path = path.clone();
                child_path.push(slot);
                self.visit(child, child_path)?;
            }
        }
        Ok(())
    }

    pub fn path(&self, name: &str) -> Option<&[Slot]> {
        self.paths.get(name).map(|path| path.as_slice())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.paths.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.paths.keys().map(|name| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

/// Follows `path` from `root` without modifying anything.
pub fn step_at<'a>(root: &'a Step, path: &[Slot]) -> Option<&'a Step> {
    let mut current = root;
    for slot in path {
        current = current.slot(*slot)?.as_deref()?;
    }
    Some(current)
}

/// Follows `path` from `root`, un-sharing every step on the way.
///
/// Subtrees off the path stay shared with any other version holding them.
pub(crate) fn step_at_mut<'a>(root: &'a mut Step, path: &[Slot]) -> Option<&'a mut Step> {
    let mut current = root;
    for slot in path {
        let child = current.slot_mut(*slot)?.as_mut()?;
        current = Arc::make_mut(child);
    }
    Some(current)
}

/// The slot holding the step at `path`, i.e. the last hop of the path.
pub(crate) fn slot_at_mut<'a>(
    root: &'a mut Step,
    path: &[Slot],
) -> Option<&'a mut Option<Arc<Step>>> {
    let (last, parent_path) = path.split_last()?;
    step_at_mut(root, parent_path)?.slot_mut(*last)
}
