//! Read-only utilities over a step tree.
//!
//! Every function walks the tree in the same canonical order: a step, then
//! the subtrees it owns (success before failure for a branch, `branches` array
//! order for a split, the body for a loop), then its continuation.

use crate::model::{Step, parse_connection_reference};
use ahash::{AHashMap, AHashSet};
use itertools::Itertools;

pub mod index;

pub use index::{StepIndex, step_at};

/// Flattens the tree rooted at `root` in canonical depth-first order.
pub fn get_all_steps(root: &Step) -> Vec<&Step> {
    let mut steps = Vec::new();
    collect_chain(root, &mut steps);
    steps
}

fn collect_chain<'a>(first: &'a Step, steps: &mut Vec<&'a Step>) {
    let mut current = Some(first);
    while let Some(step) = current {
        steps.push(step);
        for child in step.children() {
            collect_chain(child, steps);
        }
        current = step.next_action.as_deref();
    }
}

pub fn find_step_by_name<'a>(root: &'a Step, name: &str) -> Option<&'a Step> {
    get_all_steps(root).into_iter().find(|step| step.name == name)
}

/// Names of every block used in the tree, in order of first appearance.
pub fn get_used_blocks(root: &Step) -> Vec<String> {
    get_all_steps(root)
        .into_iter()
        .filter_map(|step| step.block_name())
        .unique()
        .map(str::to_string)
        .collect()
}

/// Maps each block name to the first connection referenced by one of its steps.
pub fn get_used_connections(root: &Step) -> AHashMap<String, String> {
    let mut connections = AHashMap::new();
    for step in get_all_steps(root) {
        let (Some(block_name), Some(auth)) = (step.block_name(), step.auth()) else {
            continue;
        };
        if let Some(connection_name) = parse_connection_reference(auth) {
            connections
                .entry(block_name.to_string())
                .or_insert_with(|| connection_name.to_string());
        }
    }
    connections
}

/// The smallest `{prefix}_{n}` (n >= 1) not yet used as a step name.
pub fn find_available_step_name(root: &Step, prefix: &str) -> String {
    let used: AHashSet<&str> = get_all_steps(root)
        .into_iter()
        .map(|step| step.name.as_str())
        .collect();
    next_free_name(prefix, |candidate| used.contains(candidate))
}

pub(crate) fn next_free_name(prefix: &str, is_taken: impl Fn(&str) -> bool) -> String {
    (1..)
        .map(|n| format!("{}_{}", prefix, n))
        .find(|candidate| !is_taken(candidate))
        .unwrap_or_else(|| prefix.to_string())
}

/// Every step inside the subtrees owned by `step`, excluding its continuation.
pub fn get_all_child_steps(step: &Step) -> Vec<&Step> {
    let mut steps = Vec::new();
    for child in step.children() {
        collect_chain(child, &mut steps);
    }
    steps
}

/// Whether the step named `name` lies inside a subtree owned by `parent`.
pub fn is_child_of(parent: &Step, name: &str) -> bool {
    get_all_child_steps(parent)
        .into_iter()
        .any(|step| step.name == name)
}

/// The steps traversed from the root to reach `name`, root first, target excluded.
///
/// Returns `None` when no step is named `name`.
pub fn find_path_to_step<'a>(root: &'a Step, name: &str) -> Option<Vec<&'a Step>> {
    let index = StepIndex::build(root).ok()?;
    let path = index.path(name)?;
    let mut ancestors = Vec::with_capacity(path.len());
    let mut current = root;
    for slot in path {
        ancestors.push(current);
        current = current.slot(*slot)?.as_deref()?;
    }
    Some(ancestors)
}
