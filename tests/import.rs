//! Tests for turning step trees into replayable `ADD_ACTION` requests.
mod common;

use common::*;
use serde_json::json;
use stepgraph::prelude::*;

fn replay(target: &FlowVersion, requests: Vec<AddActionRequest>) -> FlowVersion {
    Reducer::default()
        .apply_all(target, requests.into_iter().map(Operation::AddAction))
        .expect("import operations should replay cleanly")
}

#[test]
fn test_operations_for_branch_flow() {
    let version = branch_flow();
    let operations = get_import_operations(Some(&version.trigger), &[]);

    let summary: Vec<(&str, StepLocationRelativeToParent, &str)> = operations
        .iter()
        .map(|op| (op.parent_step.as_str(), op.location(), op.action.name.as_str()))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("trigger", StepLocationRelativeToParent::After, "step_1"),
            ("step_1", StepLocationRelativeToParent::InsideTrueBranch, "step_2"),
            ("step_1", StepLocationRelativeToParent::InsideFalseBranch, "step_3"),
            ("step_1", StepLocationRelativeToParent::After, "step_4"),
        ]
    );
    assert!(operations.iter().all(|op| op.action.next_action.is_none()));
    assert!(operations.iter().all(|op| op.action.children().is_empty()));
}

#[test]
fn test_replay_rebuilds_the_tree() {
    let version = rich_flow();
    let operations = get_import_operations(Some(&version.trigger), &[]);
    assert_eq!(operations.len(), get_all_steps(&version.trigger).len() - 1);

    let rebuilt = replay(&draft(), operations);
    assert_eq!(rebuilt.trigger.next_action, version.trigger.next_action);
}

#[test]
fn test_split_branches_keep_array_order_and_empty_entries() {
    let version = rich_flow();
    let operations = get_import_operations(Some(&version.trigger), &[]);

    let split_ops: Vec<(&str, Option<&str>)> = operations
        .iter()
        .filter(|op| op.location() == StepLocationRelativeToParent::InsideSplit)
        .map(|op| (op.action.name.as_str(), op.branch_node_id.as_deref()))
        .collect();
    assert_eq!(split_ops, vec![("step_8", Some("b")), ("step_9", Some("a"))]);

    let rebuilt = replay(&draft(), operations);
    match &find(&rebuilt, "step_7").kind {
        StepKind::Split { branches, .. } => {
            let ids: Vec<&str> = branches.iter().map(|b| b.option_id.as_str()).collect();
            assert_eq!(ids, vec!["b", "a", "c"]);
            assert!(branches[2].next_action.is_none());
        }
        other => panic!("expected a split, got {:?}", other),
    }
}

#[test]
fn test_action_root_is_chained_after_default_trigger() {
    let version = branch_flow();
    let first = version.trigger.next_action.as_deref();
    let operations = get_import_operations(first, &[]);

    assert_eq!(operations[0].parent_step, "trigger");
    assert_eq!(operations[0].action.name, "step_1");

    let rebuilt = replay(&draft(), operations);
    assert_eq!(rebuilt.trigger.next_action, version.trigger.next_action);
}

#[test]
fn test_nothing_to_import() {
    assert!(get_import_operations(None, &[]).is_empty());
    assert!(get_import_operations(Some(&draft().trigger), &[]).is_empty());
}

#[test]
fn test_block_connections_are_rebound_to_active_connections() {
    let version = rich_flow();
    let mut broken = Connection::new("c-0", "discord-broken", "discord");
    broken.status = ConnectionStatus::Error;
    let connections = vec![
        broken,
        Connection::new("c-1", "discord-main", "discord"),
        Connection::new("c-2", "discord-backup", "discord"),
        Connection::new("c-3", "slack-main", "slack"),
    ];

    let operations = get_import_operations(Some(&version.trigger), &connections);
    let auth_of = |name: &str| {
        operations
            .iter()
            .find(|op| op.action.name == name)
            .and_then(|op| op.action.auth())
            .map(str::to_string)
    };

    assert_eq!(auth_of("step_2").as_deref(), Some("{{connections['discord-main']}}"));
    assert_eq!(auth_of("step_9").as_deref(), Some("{{connections['discord-main']}}"));
    // No github connection available.
    assert_eq!(auth_of("step_5").as_deref(), Some("{{connections['gh']}}"));
    assert_eq!(auth_of("step_10"), None);
}

#[test]
fn test_non_reference_auth_is_left_alone() {
    let step = block_step("step_1", "http", Some("Bearer abc"));
    let operations = get_import_operations(
        Some(&step),
        &[Connection::new("c-1", "http-main", "http")],
    );
    assert_eq!(operations[0].action.auth(), Some("Bearer abc"));
}

#[test]
fn test_import_operations_serialize_as_add_actions() {
    let version = branch_flow();
    let operations: Vec<Operation> = get_import_operations(Some(&version.trigger), &[])
        .into_iter()
        .map(Operation::AddAction)
        .collect();

    let json = serde_json::to_value(&operations).unwrap();
    assert_eq!(json[0]["type"], json!("ADD_ACTION"));
    assert_eq!(json[0]["request"]["parentStep"], json!("trigger"));
    assert_eq!(json[0]["request"]["stepLocationRelativeToParent"], json!("AFTER"));
    assert_eq!(json[1]["request"]["stepLocationRelativeToParent"], json!("INSIDE_TRUE_BRANCH"));
    assert_eq!(json[1]["request"]["action"]["type"], json!("BLOCK"));

    let parsed = Operation::list_from_json(&serde_json::to_string(&json).unwrap()).unwrap();
    assert_eq!(parsed, operations);
}
