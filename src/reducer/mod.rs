//! The structural reducer: `FlowVersion` + `Operation` -> new `FlowVersion`.
//!
//! The input version is never modified. The reducer clones it (sharing every
//! subtree behind `Arc`) and un-shares only the steps on the path to the
//! step being edited, so older versions stay valid and unchanged.

use crate::error::FlowOperationError;
use crate::model::{FlowVersion, FlowVersionState};
use crate::operation::Operation;
use crate::traversal::get_all_steps;
use tracing::debug;

mod add;
mod connections;
mod delete;
mod duplicate;
mod relocate;
mod update;

/// Default prefix of step names minted by the reducer.
pub const DEFAULT_STEP_NAME_PREFIX: &str = "step";

#[derive(Debug, Clone)]
pub struct ReducerConfig {
    /// Recompute `FlowVersion::valid` from its steps after each structural edit.
    pub recompute_validity: bool,
    /// Prefix used when the reducer has to name new steps.
    pub step_name_prefix: String,
}

impl Default for ReducerConfig {
    fn default() -> Self {
        Self {
            recompute_validity: true,
            step_name_prefix: DEFAULT_STEP_NAME_PREFIX.to_string(),
        }
    }
}

/// Applies operations to flow versions. Holds configuration only, no state.
#[derive(Debug, Clone, Default)]
pub struct Reducer {
    config: ReducerConfig,
}

pub struct ReducerBuilder {
    config: ReducerConfig,
}

impl ReducerBuilder {
    pub fn new() -> Self {
        Self {
            config: ReducerConfig::default(),
        }
    }

    pub fn recompute_validity(mut self, enabled: bool) -> Self {
        self.config.recompute_validity = enabled;
        self
    }

    pub fn step_name_prefix(mut self, prefix: &str) -> Self {
        self.config.step_name_prefix = prefix.to_string();
        self
    }

    pub fn build(self) -> Reducer {
        Reducer {
            config: self.config,
        }
    }
}

impl Default for ReducerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Reducer {
    pub fn builder() -> ReducerBuilder {
        ReducerBuilder::new()
    }

    pub fn config(&self) -> &ReducerConfig {
        &self.config
    }

    /// Applies one operation, returning the resulting version.
    ///
    /// On error nothing observable has changed: `flow_version` is untouched and
    /// no partial result is returned.
    pub fn apply(
        &self,
        flow_version: &FlowVersion,
        operation: Operation,
    ) -> Result<FlowVersion, FlowOperationError> {
        let operation_type = operation.operation_type();
        debug!(
            operation = %operation_type,
            target = operation.target().unwrap_or("-"),
            flow_version = %flow_version.id,
            "applying flow operation"
        );

        let mut next = flow_version.clone();
        let result = match operation {
            Operation::LockFlow => {
                next.state = FlowVersionState::Locked;
                Ok(())
            }
            Operation::UpdateTrigger(request) => update::update_trigger(&mut next.trigger, request),
            Operation::AddAction(request) => add::add_action(&mut next.trigger, request),
            Operation::DeleteAction(request) => {
                delete::delete_action(&mut next.trigger, &request.name)
            }
            Operation::UpdateAction(request) => update::update_action(&mut next.trigger, request),
            Operation::DuplicateAction(request) => duplicate::duplicate_action(
                &mut next.trigger,
                &request.step_name,
                &self.config.step_name_prefix,
            ),
            Operation::MoveAction(request) => relocate::move_action(&mut next.trigger, request),
            Operation::RemoveConnections => {
                connections::remove_connections(&mut next.trigger);
                Ok(())
            }
        };

        if let Err(e) = result {
            debug!(operation = %operation_type, error = %e, "flow operation rejected");
            return Err(e);
        }

        if self.config.recompute_validity && operation_type.is_structural() {
            next.valid = get_all_steps(&next.trigger).iter().all(|step| step.valid);
        }
        Ok(next)
    }

    /// Applies operations in order, stopping at the first failure.
    pub fn apply_all<I>(
        &self,
        flow_version: &FlowVersion,
        operations: I,
    ) -> Result<FlowVersion, FlowOperationError>
    where
        I: IntoIterator<Item = Operation>,
    {
        operations
            .into_iter()
            .try_fold(flow_version.clone(), |current, operation| {
                self.apply(&current, operation)
            })
    }
}

/// Applies `operation` with the default reducer configuration.
pub fn apply(
    flow_version: &FlowVersion,
    operation: Operation,
) -> Result<FlowVersion, FlowOperationError> {
    Reducer::default().apply(flow_version, operation)
}
