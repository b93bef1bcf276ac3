use super::settings::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// A node of the flow tree.
///
/// `name` is the key every operation addresses a step by and is unique across
/// the whole tree. Child subtrees are held behind `Arc` so that versions
/// produced by the reducer share every subtree they did not touch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    pub name: String,
    pub display_name: String,
    #[serde(default)]
    pub valid: bool,
    #[serde(flatten)]
    pub kind: StepKind,
    /// The continuation executed after this step (and its owned subtrees).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_action: Option<Arc<Step>>,
}

/// The type-specific part of a step, discriminated by `"type"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum StepKind {
    Trigger {
        settings: TriggerSettings,
    },
    /// Placeholder used before a concrete trigger or action type is chosen.
    Empty,
    Code {
        settings: CodeSettings,
    },
    Block {
        settings: BlockSettings,
    },
    Branch {
        settings: BranchSettings,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        on_success_action: Option<Arc<Step>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        on_failure_action: Option<Arc<Step>>,
    },
    Split {
        settings: SplitSettings,
        #[serde(default)]
        branches: Vec<SplitBranch>,
    },
    Loop {
        settings: LoopSettings,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        first_loop_action: Option<Arc<Step>>,
    },
}

/// A split branch: the subtree run when the option `option_id` is selected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SplitBranch {
    pub option_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_action: Option<Arc<Step>>,
}

impl SplitBranch {
    pub fn new(option_id: impl Into<String>) -> Self {
        Self {
            option_id: option_id.into(),
            next_action: None,
        }
    }
}

/// The bare discriminant of a `StepKind`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StepType {
    Trigger,
    Empty,
    Code,
    Block,
    Branch,
    Split,
    Loop,
}

impl fmt::Display for StepType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StepType::Trigger => "TRIGGER",
            StepType::Empty => "EMPTY",
            StepType::Code => "CODE",
            StepType::Block => "BLOCK",
            StepType::Branch => "BRANCH",
            StepType::Split => "SPLIT",
            StepType::Loop => "LOOP",
        };
        write!(f, "{}", name)
    }
}

/// Addresses one child slot of a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Next,
    OnSuccess,
    OnFailure,
    LoopBody,
    /// Index into the split's `branches` array.
    SplitBranch(usize),
}

impl StepKind {
    pub fn step_type(&self) -> StepType {
        match self {
            StepKind::Trigger { .. } => StepType::Trigger,
            StepKind::Empty => StepType::Empty,
            StepKind::Code { .. } => StepType::Code,
            StepKind::Block { .. } => StepType::Block,
            StepKind::Branch { .. } => StepType::Branch,
            StepKind::Split { .. } => StepType::Split,
            StepKind::Loop { .. } => StepType::Loop,
        }
    }
}

impl Step {
    /// Creates a valid step without a continuation.
    pub fn new(name: impl Into<String>, display_name: impl Into<String>, kind: StepKind) -> Self {
        Self {
            name: name.into(),
            display_name: display_name.into(),
            valid: true,
            kind,
            next_action: None,
        }
    }

    /// Sets the continuation, consuming `self`.
    pub fn with_next(mut self, next: Step) -> Self {
        self.next_action = Some(Arc::new(next));
        self
    }

    pub fn with_valid(mut self, valid: bool) -> Self {
        self.valid = valid;
        self
    }

    pub fn step_type(&self) -> StepType {
        self.kind.step_type()
    }

    pub fn is_trigger(&self) -> bool {
        matches!(self.kind, StepKind::Trigger { .. })
    }

    /// Whether the step may appear below the root.
    pub fn is_action(&self) -> bool {
        !self.is_trigger()
    }

    /// The block a trigger or block action belongs to.
    pub fn block_name(&self) -> Option<&str> {
        match &self.kind {
            StepKind::Block { settings } => Some(settings.block_name.as_str()),
            StepKind::Trigger { settings } => settings.block_name.as_deref(),
            _ => None,
        }
    }

    pub fn input(&self) -> Option<&StepInput> {
        match &self.kind {
            StepKind::Trigger { settings } => Some(&settings.input),
            StepKind::Code { settings } => Some(&settings.input),
            StepKind::Block { settings } => Some(&settings.input),
            _ => None,
        }
    }

    pub fn input_mut(&mut self) -> Option<&mut StepInput> {
        match &mut self.kind {
            StepKind::Trigger { settings } => Some(&mut settings.input),
            StepKind::Code { settings } => Some(&mut settings.input),
            StepKind::Block { settings } => Some(&mut settings.input),
            _ => None,
        }
    }

    /// The connection reference held in `settings.input.auth`, if it is a string.
    pub fn auth(&self) -> Option<&str> {
        self.input()
            .and_then(|input| input.get(AUTH_INPUT_KEY))
            .and_then(|auth| auth.as_str())
    }

    /// Every child slot in traversal order: owned subtrees first, continuation last.
    pub fn slots(&self) -> Vec<(Slot, Option<&Arc<Step>>)> {
        let mut slots = Vec::new();
        match &self.kind {
            StepKind::Branch {
                on_success_action,
                on_failure_action,
                ..
            } => {
                slots.push((Slot::OnSuccess, on_success_action.as_ref()));
                slots.push((Slot::OnFailure, on_failure_action.as_ref()));
            }
            StepKind::Split { branches, .. } => {
                slots.extend(
                    branches
                        .iter()
                        .enumerate()
                        .map(|(i, branch)| (Slot::SplitBranch(i), branch.next_action.as_ref())),
                );
            }
            StepKind::Loop {
                first_loop_action, ..
            } => slots.push((Slot::LoopBody, first_loop_action.as_ref())),
            StepKind::Trigger { .. }
            | StepKind::Empty
            | StepKind::Code { .. }
            | StepKind::Block { .. } => {}
        }
        slots.push((Slot::Next, self.next_action.as_ref()));
        slots
    }

    /// Mutable counterpart of `slots`, in the same order.
    pub(crate) fn slots_mut(&mut self) -> Vec<&mut Option<Arc<Step>>> {
        let mut slots = Vec::new();
        match &mut self.kind {
            StepKind::Branch {
                on_success_action,
                on_failure_action,
                ..
            } => {
                slots.push(on_success_action);
                slots.push(on_failure_action);
            }
            StepKind::Split { branches, .. } => {
                slots.extend(branches.iter_mut().map(|branch| &mut branch.next_action));
            }
            StepKind::Loop {
                first_loop_action, ..
            } => slots.push(first_loop_action),
            StepKind::Trigger { .. }
            | StepKind::Empty
            | StepKind::Code { .. }
            | StepKind::Block { .. } => {}
        }
        slots.push(&mut self.next_action);
        slots
    }

    pub fn slot(&self, slot: Slot) -> Option<&Option<Arc<Step>>> {
        match (slot, &self.kind) {
            (Slot::Next, _) => Some(&self.next_action),
            (
                Slot::OnSuccess,
                StepKind::Branch {
                    on_success_action, ..
                },
            ) => Some(on_success_action),
            (
                Slot::OnFailure,
                StepKind::Branch {
                    on_failure_action, ..
                },
            ) => Some(on_failure_action),
            (Slot::LoopBody, StepKind::Loop { first_loop_action, .. }) => Some(first_loop_action),
            (Slot::SplitBranch(i), StepKind::Split { branches, .. }) => {
                branches.get(i).map(|branch| &branch.next_action)
            }
            _ => None,
        }
    }

    pub fn slot_mut(&mut self, slot: Slot) -> Option<&mut Option<Arc<Step>>> {
        match (slot, &mut self.kind) {
            (Slot::Next, _) => Some(&mut self.next_action),
            (
                Slot::OnSuccess,
                StepKind::Branch {
                    on_success_action, ..
                },
            ) => Some(on_success_action),
            (
                Slot::OnFailure,
                StepKind::Branch {
                    on_failure_action, ..
                },
            ) => Some(on_failure_action),
            (Slot::LoopBody, StepKind::Loop { first_loop_action, .. }) => Some(first_loop_action),
            (Slot::SplitBranch(i), StepKind::Split { branches, .. }) => {
                branches.get_mut(i).map(|branch| &mut branch.next_action)
            }
            _ => None,
        }
    }

    /// The heads of the subtrees this step owns, excluding its continuation.
    pub fn children(&self) -> Vec<&Step> {
        self.slots()
            .into_iter()
            .filter(|(slot, _)| *slot != Slot::Next)
            .filter_map(|(_, child)| child.map(|c| c.as_ref()))
            .collect()
    }

    /// A copy of this step with every child slot emptied. Split branch entries
    /// keep their option ids.
    pub fn detached(&self) -> Step {
        let kind = match &self.kind {
            StepKind::Branch { settings, .. } => StepKind::Branch {
                settings: settings.clone(),
                on_success_action: None,
                on_failure_action: None,
            },
            StepKind::Split { settings, branches } => StepKind::Split {
                settings: settings.clone(),
                branches: branches
                    .iter()
                    .map(|branch| SplitBranch::new(branch.option_id.clone()))
                    .collect(),
            },
            StepKind::Loop { settings, .. } => StepKind::Loop {
                settings: settings.clone(),
                first_loop_action: None,
            },
            other => other.clone(),
        };
        Step {
            name: self.name.clone(),
            display_name: self.display_name.clone(),
            valid: self.valid,
            kind,
            next_action: None,
        }
    }
}
