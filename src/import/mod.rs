//! Serializes a step subtree into an ordered list of `ADD_ACTION` requests.
//!
//! Replaying the requests through the reducer, starting from a tree that only
//! holds the anchor step, rebuilds the subtree exactly: steps are emitted in
//! the canonical traversal order, each one detached from its children, and
//! split steps keep their branch skeleton so empty branches survive.

use crate::model::{
    AUTH_INPUT_KEY, Connection, DEFAULT_TRIGGER_NAME, Step, StepKind, parse_connection_reference,
};
use crate::operation::{AddActionRequest, StepLocationRelativeToParent};
use serde_json::Value;
use tracing::trace;

/// Emits the requests that rebuild everything below `root`.
///
/// A trigger (or an `EMPTY` root) is the anchor: its actions are emitted with
/// the trigger as parent. Any other step is emitted itself, chained after a
/// trigger named `trigger`.
///
/// Block actions referencing a connection are rebound to the first active
/// connection in `connections` with the same block name.
pub fn get_import_operations(
    root: Option<&Step>,
    connections: &[Connection],
) -> Vec<AddActionRequest> {
    match root {
        None => Vec::new(),
        Some(step) if matches!(step.kind, StepKind::Trigger { .. } | StepKind::Empty) => step
            .next_action
            .as_deref()
            .map(|first| get_import_operations_into(first, &step.name, connections))
            .unwrap_or_default(),
        Some(step) => get_import_operations_into(step, DEFAULT_TRIGGER_NAME, connections),
    }
}

/// Emits the requests that chain `first` (and its continuation) after `parent_step`.
pub fn get_import_operations_into(
    first: &Step,
    parent_step: &str,
    connections: &[Connection],
) -> Vec<AddActionRequest> {
    ImportGenerator::new(connections, false).generate(first, parent_step)
}

/// Like [`get_import_operations_into`], but also binds block actions whose
/// `auth` was blanked, as in a prepared template.
pub(crate) fn get_template_operations_into(
    first: &Step,
    parent_step: &str,
    connections: &[Connection],
) -> Vec<AddActionRequest> {
    ImportGenerator::new(connections, true).generate(first, parent_step)
}

struct ImportGenerator<'a> {
    connections: &'a [Connection],
    /// Whether an empty `auth` is bound like a connection placeholder.
    bind_blank_auth: bool,
    operations: Vec<AddActionRequest>,
}

impl<'a> ImportGenerator<'a> {
    fn new(connections: &'a [Connection], bind_blank_auth: bool) -> Self {
        Self {
            connections,
            bind_blank_auth,
            operations: Vec::new(),
        }
    }

    fn generate(mut self, first: &Step, parent_step: &str) -> Vec<AddActionRequest> {
        self.emit_chain(first, parent_step, StepLocationRelativeToParent::After, None);
        self.operations
    }

    fn emit_chain(
        &mut self,
        first: &Step,
        parent_step: &str,
        location: StepLocationRelativeToParent,
        branch_node_id: Option<&str>,
    ) {
        let mut anchor = (parent_step.to_string(), location, branch_node_id.map(str::to_string));
        let mut current = Some(first);
        while let Some(step) = current {
            let (parent, location, branch) = anchor;
            trace!(
                step = %step.name,
                parent = %parent,
                location = %location,
                "emitting import operation"
            );
            self.operations.push(AddActionRequest {
                parent_step: parent,
                step_location_relative_to_parent: Some(location),
                branch_node_id: branch,
                action: self.rebind(step.detached()),
            });
            self.emit_children(step);
            anchor = (step.name.clone(), StepLocationRelativeToParent::After, None);
            current = step.next_action.as_deref();
        }
    }

    fn emit_children(&mut self, step: &Step) {
        match &step.kind {
            StepKind::Branch {
                on_success_action,
                on_failure_action,
                ..
            } => {
                if let Some(first) = on_success_action {
                    let location = StepLocationRelativeToParent::InsideTrueBranch;
                    self.emit_chain(first, &step.name, location, None);
                }
                if let Some(first) = on_failure_action {
                    let location = StepLocationRelativeToParent::InsideFalseBranch;
                    self.emit_chain(first, &step.name, location, None);
                }
            }
            StepKind::Split { branches, .. } => {
                for branch in branches {
                    if let Some(first) = &branch.next_action {
                        self.emit_chain(
                            first,
                            &step.name,
                            StepLocationRelativeToParent::InsideSplit,
                            Some(&branch.option_id),
                        );
                    }
                }
            }
            StepKind::Loop {
                first_loop_action: Some(first),
                ..
            } => self.emit_chain(first, &step.name, StepLocationRelativeToParent::InsideLoop, None),
            _ => {}
        }
    }

    /// Points a block action's connection placeholder at a matching connection.
    fn rebind(&self, mut step: Step) -> Step {
        let StepKind::Block { settings } = &mut step.kind else {
            return step;
        };
        let bindable = match settings.input.get(AUTH_INPUT_KEY).and_then(Value::as_str) {
            Some("") => self.bind_blank_auth,
            Some(auth) => parse_connection_reference(auth).is_some(),
            None => false,
        };
        if !bindable {
            return step;
        }
        if let Some(connection) = self
            .connections
            .iter()
            .find(|c| c.is_active() && c.block_name == settings.block_name)
        {
            settings
                .input
                .insert(AUTH_INPUT_KEY.to_string(), Value::String(connection.reference()));
        }
        step
    }
}
