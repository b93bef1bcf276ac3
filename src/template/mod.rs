//! Shareable flow templates with credentials stripped.

use crate::error::{FlowDocumentError, FlowOperationError};
use crate::import::get_template_operations_into;
use crate::model::{Connection, FlowVersion, Step, StepKind, parse_document};
use crate::operation::{Operation, TriggerKind, UpdateTriggerRequest};
use crate::reducer::Reducer;
use crate::traversal::get_used_blocks;
use serde::{Deserialize, Serialize};

/// A flow exported for sharing. Only the trigger keeps its connection reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowTemplate {
    pub display_name: String,
    pub trigger: Step,
    /// Blocks the template needs, in order of first use.
    pub blocks: Vec<String>,
}

/// Builds a template from a flow version, blanking every action's connection.
pub fn prepare_template(flow_version: &FlowVersion) -> Result<FlowTemplate, FlowOperationError> {
    let scrubbed = Reducer::default().apply(flow_version, Operation::RemoveConnections)?;
    Ok(FlowTemplate {
        display_name: scrubbed.display_name,
        blocks: get_used_blocks(&scrubbed.trigger),
        trigger: scrubbed.trigger,
    })
}

impl FlowTemplate {
    /// Rebuilds the template on top of `target`, binding block actions to
    /// `connections` where possible.
    ///
    /// A block action whose blanked `auth` has no active connection for its
    /// block keeps the empty value.
    pub fn instantiate(
        &self,
        reducer: &Reducer,
        target: &FlowVersion,
        connections: &[Connection],
    ) -> Result<FlowVersion, FlowOperationError> {
        let settings = match &self.trigger.kind {
            StepKind::Trigger { settings } => TriggerKind::Trigger(settings.clone()),
            _ => TriggerKind::Empty,
        };
        let mut update = UpdateTriggerRequest::new(self.trigger.display_name.clone(), settings);
        update.valid = self.trigger.valid;

        let mut operations = vec![Operation::UpdateTrigger(update)];
        if let Some(first) = self.trigger.next_action.as_deref() {
            operations.extend(
                get_template_operations_into(first, &target.trigger.name, connections)
                    .into_iter()
                    .map(Operation::AddAction),
            );
        }
        reducer.apply_all(target, operations)
    }

    pub fn from_json(json: &str) -> Result<Self, FlowDocumentError> {
        parse_document(json)
    }

    pub fn to_json(&self) -> Result<String, FlowDocumentError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| FlowDocumentError::SerializationError(e.to_string()))
    }
}
