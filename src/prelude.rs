//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types and functions from the
//! stepgraph crate.
//!
//! # Example
//!
//! ```rust,no_run
//! use stepgraph::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! let version = FlowVersion::from_file("path/to/flow_version.json")?;
//! let json = std::fs::read_to_string("path/to/operations.json")?;
//! let operations = Operation::list_from_json(&json)?;
//!
//! let next = Reducer::builder().build().apply_all(&version, operations)?;
//! println!("{} steps", get_all_steps(&next.trigger).len());
//! # Ok(())
//! # }
//! ```

// Structural reducer
pub use crate::reducer::{Reducer, ReducerBuilder, ReducerConfig, apply};

// Model
pub use crate::model::{
    BlockSettings, BranchCondition, BranchSettings, CodeSettings, Connection, ConnectionStatus,
    ErrorHandlingOptions, FlowVersion, FlowVersionState, LoopSettings, PackageType, SourceCode,
    SplitBranch, SplitOption, SplitSettings, Step, StepKind, StepType, ToggleOption,
    TriggerSettings, connection_reference, parse_connection_reference,
};

// Operations
pub use crate::operation::{
    ActionSettings, AddActionRequest, DeleteActionRequest, DuplicateActionRequest,
    MoveActionRequest, Operation, OperationType, StepLocationRelativeToParent, TriggerKind,
    UpdateActionRequest, UpdateTriggerRequest,
};

// Traversal, import and templates
pub use crate::import::get_import_operations;
pub use crate::template::{FlowTemplate, prepare_template};
pub use crate::traversal::{
    find_available_step_name, find_step_by_name, get_all_steps, get_used_blocks,
    get_used_connections,
};

// Error types
pub use crate::error::{ErrorCode, FlowDocumentError, FlowOperationError};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
