use super::add::insert_into;
use crate::error::FlowOperationError;
use crate::model::{ConditionGroups, Step, StepKind};
use crate::operation::StepLocationRelativeToParent;
use crate::traversal::index::step_at_mut;
use crate::traversal::{StepIndex, get_all_steps, next_free_name, step_at};
use ahash::{AHashMap, AHashSet};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// Inserts a copy of `step_name` and its owned subtrees directly after it.
///
/// Every copied step gets a fresh `{prefix}_{n}` name, and `{{name...}}`
/// references inside the copy are rewritten to the new names.
pub(super) fn duplicate_action(
    root: &mut Step,
    step_name: &str,
    prefix: &str,
) -> Result<(), FlowOperationError> {
    let index = StepIndex::build(root)?;
    let path = index
        .path(step_name)
        .ok_or_else(|| FlowOperationError::StepNotFound(step_name.to_string()))?;
    if path.is_empty() {
        return Err(FlowOperationError::TriggerNotAllowed(step_name.to_string()));
    }

    let mut copy = step_at(root, path)
        .ok_or_else(|| FlowOperationError::StepNotFound(step_name.to_string()))?
        .clone();
    copy.next_action = None;

    let mut taken: AHashSet<String> = index.names().map(str::to_string).collect();
    let mut renames = AHashMap::new();
    for step in get_all_steps(&copy) {
        let fresh = next_free_name(prefix, |candidate| taken.contains(candidate));
        taken.insert(fresh.clone());
        renames.insert(step.name.clone(), fresh);
    }
    rename_subtree(&mut copy, &renames);
    debug!(source = step_name, copy = %copy.name, steps = renames.len(), "duplicated step");

    let original = step_at_mut(root, path)
        .ok_or_else(|| FlowOperationError::StepNotFound(step_name.to_string()))?;
    insert_into(original, StepLocationRelativeToParent::After, None, copy)
}

fn rename_subtree(step: &mut Step, renames: &AHashMap<String, String>) {
    if let Some(fresh) = renames.get(&step.name) {
        step.name = fresh.clone();
    }
    rewrite_kind(&mut step.kind, renames);
    for slot in step.slots_mut() {
        if let Some(child) = slot {
            rename_subtree(Arc::make_mut(child), renames);
        }
    }
}

fn rewrite_kind(kind: &mut StepKind, renames: &AHashMap<String, String>) {
    match kind {
        StepKind::Trigger { settings } => rewrite_input(&mut settings.input, renames),
        StepKind::Code { settings } => rewrite_input(&mut settings.input, renames),
        StepKind::Block { settings } => rewrite_input(&mut settings.input, renames),
        StepKind::Branch { settings, .. } => rewrite_conditions(&mut settings.conditions, renames),
        StepKind::Split { settings, .. } => {
            for option in &mut settings.options {
                rewrite_conditions(&mut option.conditions, renames);
            }
        }
        StepKind::Loop { settings, .. } => {
            settings.items = rewrite_references(&settings.items, renames);
        }
        StepKind::Empty => {}
    }
}

fn rewrite_input(input: &mut serde_json::Map<String, Value>, renames: &AHashMap<String, String>) {
    for value in input.values_mut() {
        rewrite_value(value, renames);
    }
}

fn rewrite_value(value: &mut Value, renames: &AHashMap<String, String>) {
    match value {
        Value::String(text) => *text = rewrite_references(text, renames),
        Value::Array(items) => items.iter_mut().for_each(|item| rewrite_value(item, renames)),
        Value::Object(fields) => fields
            .values_mut()
            .for_each(|field| rewrite_value(field, renames)),
        Value::Null | Value::Bool(_) | Value::Number(_) => {}
    }
}

fn rewrite_conditions(groups: &mut ConditionGroups, renames: &AHashMap<String, String>) {
    for condition in groups.iter_mut().flatten() {
        condition.first_value = rewrite_references(&condition.first_value, renames);
        if let Some(second) = &mut condition.second_value {
            *second = rewrite_references(second, renames);
        }
    }
}

/// Rewrites the step name that opens each `{{ ... }}` expression.
pub(crate) fn rewrite_references(text: &str, renames: &AHashMap<String, String>) -> String {
    let mut output = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find("{{") {
        let (head, tail) = rest.split_at(start + 2);
        output.push_str(head);
        let expression = tail.trim_start();
        output.push_str(&tail[..tail.len() - expression.len()]);

        let ident_len = expression
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .unwrap_or(expression.len());
        let ident = &expression[..ident_len];
        output.push_str(renames.get(ident).map(String::as_str).unwrap_or(ident));
        rest = &expression[ident_len..];
    }
    output.push_str(rest);
    output
}
