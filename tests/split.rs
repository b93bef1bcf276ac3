//! Tests for N-way split steps: branch insertion, option pruning and normalization.
mod common;

use common::*;
use serde_json::json;
use stepgraph::prelude::*;

/// `trigger -> step_1 (split A|B, default A)` with `step_2` under A and `step_3` under B.
fn split_flow() -> FlowVersion {
    let split = split_step("step_1", &["A", "B"], "A");
    let version = add(&draft(), AddActionRequest::after("trigger", split));
    let version = add(&version, AddActionRequest::inside_split("step_1", "A", code_step("step_2")));
    add(&version, AddActionRequest::inside_split("step_1", "B", code_step("step_3")))
}

fn branches_of<'a>(version: &'a FlowVersion, name: &str) -> &'a [SplitBranch] {
    match &find(version, name).kind {
        StepKind::Split { branches, .. } => branches,
        other => panic!("expected a split, got {:?}", other),
    }
}

#[test]
fn test_inside_split_creates_branch_entries_in_order() {
    let version = split_flow();
    let branches = branches_of(&version, "step_1");

    assert_eq!(branches.len(), 2);
    assert_eq!(branches[0].option_id, "A");
    assert_eq!(branches[0].next_action.as_ref().unwrap().name, "step_2");
    assert_eq!(branches[1].option_id, "B");
    assert_eq!(branches[1].next_action.as_ref().unwrap().name, "step_3");
    assert_eq!(
        step_names(&version.trigger),
        vec!["trigger", "step_1", "step_2", "step_3"]
    );
}

#[test]
fn test_inside_split_inserts_at_branch_head() {
    let version = add(
        &split_flow(),
        AddActionRequest::inside_split("step_1", "A", code_step("step_4")),
    );
    let branches = branches_of(&version, "step_1");

    assert_eq!(branches.len(), 2);
    let head = branches[0].next_action.as_ref().unwrap();
    assert_eq!(head.name, "step_4");
    assert_eq!(head.next_action.as_ref().unwrap().name, "step_2");
}

#[test]
fn test_inside_split_without_branch_node_id_fails() {
    let request = AddActionRequest {
        parent_step: "step_1".to_string(),
        step_location_relative_to_parent: Some(StepLocationRelativeToParent::InsideSplit),
        branch_node_id: None,
        action: code_step("step_4"),
    };
    let error = apply(&split_flow(), Operation::AddAction(request)).unwrap_err();

    assert_eq!(error, FlowOperationError::MissingBranchNodeId);
    assert_eq!(error.to_string(), "branchNodeId should be defined");
}

#[test]
fn test_inside_split_with_unknown_option_fails() {
    let version = split_flow();
    let result = apply(
        &version,
        Operation::AddAction(AddActionRequest::inside_split("step_1", "ZZZ", code_step("step_4"))),
    );

    assert_eq!(
        result,
        Err(FlowOperationError::UnknownBranchOption {
            step: "step_1".to_string(),
            option_id: "ZZZ".to_string(),
        })
    );
    let option_ids: Vec<&str> = branches_of(&version, "step_1")
        .iter()
        .map(|branch| branch.option_id.as_str())
        .collect();
    assert_eq!(option_ids, vec!["A", "B"]);
}

#[test]
fn test_inside_split_on_non_split_parent_fails() {
    let result = apply(
        &branch_flow(),
        Operation::AddAction(AddActionRequest::inside_split("step_4", "A", code_step("step_5"))),
    );
    assert_eq!(
        result,
        Err(FlowOperationError::InvalidParentType {
            parent: "step_4".to_string(),
            parent_type: StepType::Block,
            location: StepLocationRelativeToParent::InsideSplit,
        })
    );
}

#[test]
fn test_removing_an_option_prunes_its_branch() {
    let version = split_flow();
    let existing = branches_of(&version, "step_1").to_vec();

    let mut request = UpdateActionRequest::new(
        "step_1",
        "Router",
        ActionSettings::Split(split_settings(&["A"], "A")),
    );
    request.branches = Some(existing.clone());
    let result = apply(&version, Operation::UpdateAction(request)).unwrap();

    assert_eq!(branches_of(&result, "step_1"), &existing[..1]);
    assert!(find_step_by_name(&result.trigger, "step_3").is_none());
}

#[test]
fn test_removing_an_option_without_explicit_branches_prunes_existing_ones() {
    let request = UpdateActionRequest::new(
        "step_1",
        "Router",
        ActionSettings::Split(split_settings(&["A"], "A")),
    );
    let result = apply(&split_flow(), Operation::UpdateAction(request)).unwrap();

    let branches = branches_of(&result, "step_1");
    assert_eq!(branches.len(), 1);
    assert_eq!(branches[0].option_id, "A");
    assert_eq!(
        step_names(&result.trigger),
        vec!["trigger", "step_1", "step_2"]
    );
}

#[test]
fn test_removing_the_default_option_fails() {
    let version = split_flow();
    let request = UpdateActionRequest::new(
        "step_1",
        "Router",
        ActionSettings::Split(split_settings(&["B"], "A")),
    );
    let result = apply(&version, Operation::UpdateAction(request));

    assert_eq!(
        result,
        Err(FlowOperationError::DefaultBranchRemoval {
            step: "step_1".to_string(),
            option_id: "A".to_string(),
        })
    );
}

#[test]
fn test_changing_the_default_option_keeps_branches() {
    let request = UpdateActionRequest::new(
        "step_1",
        "Router",
        ActionSettings::Split(split_settings(&["A", "B"], "B")),
    );
    let result = apply(&split_flow(), Operation::UpdateAction(request)).unwrap();

    assert_eq!(branches_of(&result, "step_1").len(), 2);
    match &find(&result, "step_1").kind {
        StepKind::Split { settings, .. } => assert_eq!(settings.default_branch, "B"),
        other => panic!("expected a split, got {:?}", other),
    }
}

#[test]
fn test_missing_branches_are_normalized_to_empty() {
    let mut flow = branch_flow_json();
    flow["trigger"]["nextAction"] = json!({
        "name": "step_1",
        "displayName": "Router",
        "valid": true,
        "type": "SPLIT",
        "settings": {
            "options": [{ "id": "A", "name": "Branch 1", "conditions": [] }],
            "defaultBranch": "A"
        },
        "nextAction": {
            "name": "step_2",
            "displayName": "Code",
            "valid": true,
            "type": "CODE",
            "settings": { "sourceCode": { "code": "x", "packageJson": "{}" }, "input": {} }
        }
    });
    let version: FlowVersion = serde_json::from_value(flow).unwrap();

    let request = UpdateActionRequest::new(
        "step_2",
        "Renamed",
        ActionSettings::Code(CodeSettings::default()),
    );
    let once = apply(&version, Operation::UpdateAction(request.clone())).unwrap();
    let once_json = serde_json::to_value(&once).unwrap();
    assert_eq!(once_json["trigger"]["nextAction"]["branches"], json!([]));

    let twice = apply(&once, Operation::UpdateAction(request)).unwrap();
    assert_eq!(twice, once);
}

#[test]
fn test_changing_type_to_split_starts_without_branches() {
    let request = UpdateActionRequest::new(
        "step_4",
        "Router",
        ActionSettings::Split(split_settings(&["A", "B"], "A")),
    );
    let result = apply(&branch_flow(), Operation::UpdateAction(request)).unwrap();

    assert_eq!(find(&result, "step_4").step_type(), StepType::Split);
    assert!(branches_of(&result, "step_4").is_empty());
}
