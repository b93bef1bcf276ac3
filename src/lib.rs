//! # Stepgraph - Flow Step-Tree Engine
//!
//! **Stepgraph** is the structural-editing core of a flow builder. A flow is a
//! singly-rooted tree of steps: a trigger at the root, followed by actions,
//! two-way branches, N-way splits and loops. The engine applies typed
//! operations to an immutable `FlowVersion` and returns a new one, keeping the
//! tree's invariants intact:
//!
//! - step names are unique across the whole tree;
//! - the trigger is never retyped or removed by an action operation;
//! - a split's `branches` only reference options that still exist;
//! - deleting a step never orphans its continuation.
//!
//! The engine performs no I/O and keeps no state between calls. Versions share
//! untouched subtrees, so every earlier version stays valid after an edit.
//!
//! ## Core Workflow
//!
//! 1.  **Load a version**: deserialize a persisted `FlowVersion` (JSON) or start
//!     from `FlowVersion::new_draft`.
//! 2.  **Apply operations**: call `apply` (or a configured `Reducer`) with an
//!     `Operation` to get the next version.
//! 3.  **Inspect**: use the traversal helpers (`get_all_steps`, `get_used_blocks`,
//!     `get_used_connections`).
//! 4.  **Export**: turn a subtree into replayable `ADD_ACTION` requests with
//!     `get_import_operations`, or strip credentials with `prepare_template`.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use stepgraph::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let draft = FlowVersion::new_draft("v1", "flow-1", "Nightly sync");
//!
//!     let code = Step::new(
//!         "step_1",
//!         "Transform",
//!         StepKind::Code {
//!             settings: CodeSettings::default(),
//!         },
//!     );
//!     let version = apply(
//!         &draft,
//!         Operation::AddAction(AddActionRequest::after("trigger", code)),
//!     )?;
//!
//!     for step in get_all_steps(&version.trigger) {
//!         println!("{} ({})", step.name, step.step_type());
//!     }
//!
//!     let locked = apply(&version, Operation::LockFlow)?;
//!     assert!(locked.is_locked());
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod import;
pub mod model;
pub mod operation;
pub mod prelude;
pub mod reducer;
pub mod template;
pub mod traversal;
