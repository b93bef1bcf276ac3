//! Common test utilities for building flow versions and steps.
use serde_json::json;
use stepgraph::prelude::*;

/// The branching flow used throughout the reducer tests.
///
/// `trigger (cron) -> step_1 (branch: 1 CONTAINS 1)`
/// - success: `step_2` (discord.send_message_webhook)
/// - failure: `step_3` (code)
/// - next: `step_4` (store.get)
#[allow(dead_code)]
pub fn branch_flow_json() -> serde_json::Value {
    json!({
        "id": "version-1",
        "flowId": "flow-1",
        "displayName": "Branching Flow",
        "valid": true,
        "state": "DRAFT",
        "trigger": {
            "name": "trigger",
            "displayName": "Cron Expression",
            "valid": true,
            "type": "TRIGGER",
            "settings": {
                "blockName": "schedule",
                "blockVersion": "0.1.0",
                "triggerName": "cron_expression",
                "input": { "cronExpression": "25 10 * * 0,1,2,3,4" }
            },
            "nextAction": {
                "name": "step_1",
                "displayName": "Branch",
                "valid": true,
                "type": "BRANCH",
                "settings": {
                    "conditions": [[{
                        "operator": "TEXT_CONTAINS",
                        "firstValue": "1",
                        "secondValue": "1",
                        "caseSensitive": true
                    }]]
                },
                "onSuccessAction": {
                    "name": "step_2",
                    "displayName": "Send Message Webhook",
                    "valid": true,
                    "type": "BLOCK",
                    "settings": {
                        "blockName": "discord",
                        "blockVersion": "0.2.1",
                        "actionName": "send_message_webhook",
                        "packageType": "REGISTRY",
                        "input": {
                            "auth": "{{connections['discord']}}",
                            "content": "hello"
                        }
                    }
                },
                "onFailureAction": {
                    "name": "step_3",
                    "displayName": "Code",
                    "valid": true,
                    "type": "CODE",
                    "settings": {
                        "sourceCode": { "code": "test", "packageJson": "{}" },
                        "input": {}
                    }
                },
                "nextAction": {
                    "name": "step_4",
                    "displayName": "Get",
                    "valid": true,
                    "type": "BLOCK",
                    "settings": {
                        "blockName": "store",
                        "blockVersion": "0.2.6",
                        "actionName": "get",
                        "packageType": "REGISTRY",
                        "input": { "key": "test", "store_scope": "COLLECTION" }
                    }
                }
            }
        }
    })
}

#[allow(dead_code)]
pub fn branch_flow() -> FlowVersion {
    serde_json::from_value(branch_flow_json()).expect("branch flow fixture should deserialize")
}

/// A flow exercising every step shape.
///
/// ```text
/// trigger -> step_1 (branch) -> step_4 (loop) -> step_7 (split) -> step_10 (store)
///   step_1 success: step_2 (discord), failure: step_3 (code)
///   step_4 body: step_5 (github) -> step_6 (code)
///   step_7 branches: [b: step_8 (code), a: step_9 (discord)], options a, b, c
/// ```
#[allow(dead_code)]
pub fn rich_flow_json() -> serde_json::Value {
    let mut flow = branch_flow_json();
    let step_4 = json!({
        "name": "step_4",
        "displayName": "Loop on Items",
        "valid": true,
        "type": "LOOP",
        "settings": { "items": "{{trigger.body.items}}" },
        "firstLoopAction": {
            "name": "step_5",
            "displayName": "Create Issue",
            "valid": true,
            "type": "BLOCK",
            "settings": {
                "blockName": "github",
                "blockVersion": "0.3.0",
                "actionName": "create_issue",
                "packageType": "REGISTRY",
                "input": { "auth": "{{connections['gh']}}", "title": "{{step_4.item}}" },
                "errorHandlingOptions": {
                    "continueOnFailure": { "value": false },
                    "retryOnFailure": { "value": true, "hide": true }
                }
            },
            "nextAction": {
                "name": "step_6",
                "displayName": "Log",
                "valid": true,
                "type": "CODE",
                "settings": {
                    "sourceCode": { "code": "log", "packageJson": "{}" },
                    "input": { "issue": "{{step_5.number}}" }
                }
            }
        },
        "nextAction": {
            "name": "step_7",
            "displayName": "Router",
            "valid": true,
            "type": "SPLIT",
            "settings": {
                "options": [
                    { "id": "a", "name": "Branch 1", "conditions": [] },
                    { "id": "b", "name": "Branch 2", "conditions": [] },
                    { "id": "c", "name": "Branch 3", "conditions": [] }
                ],
                "defaultBranch": "a"
            },
            "branches": [
                {
                    "optionId": "b",
                    "nextAction": {
                        "name": "step_8",
                        "displayName": "Code",
                        "valid": true,
                        "type": "CODE",
                        "settings": {
                            "sourceCode": { "code": "b", "packageJson": "{}" },
                            "input": {}
                        }
                    }
                },
                {
                    "optionId": "a",
                    "nextAction": {
                        "name": "step_9",
                        "displayName": "Notify",
                        "valid": true,
                        "type": "BLOCK",
                        "settings": {
                            "blockName": "discord",
                            "blockVersion": "0.2.1",
                            "actionName": "send_message_webhook",
                            "packageType": "REGISTRY",
                            "input": { "auth": "{{connections['other']}}" }
                        }
                    }
                },
                { "optionId": "c" }
            ],
            "nextAction": {
                "name": "step_10",
                "displayName": "Get",
                "valid": true,
                "type": "BLOCK",
                "settings": {
                    "blockName": "store",
                    "blockVersion": "0.2.6",
                    "actionName": "get",
                    "packageType": "REGISTRY",
                    "input": { "key": "done" }
                }
            }
        }
    });
    flow["trigger"]["nextAction"]["nextAction"] = step_4;
    flow
}

#[allow(dead_code)]
pub fn rich_flow() -> FlowVersion {
    serde_json::from_value(rich_flow_json()).expect("rich flow fixture should deserialize")
}

#[allow(dead_code)]
pub fn code_step(name: &str) -> Step {
    Step::new(
        name,
        "Code",
        StepKind::Code {
            settings: CodeSettings {
                source_code: SourceCode {
                    code: format!("// {}", name),
                    package_json: "{}".to_string(),
                },
                ..CodeSettings::default()
            },
        },
    )
}

#[allow(dead_code)]
pub fn block_step(name: &str, block_name: &str, auth: Option<&str>) -> Step {
    let mut input = serde_json::Map::new();
    if let Some(auth) = auth {
        input.insert("auth".to_string(), json!(auth));
    }
    Step::new(
        name,
        block_name,
        StepKind::Block {
            settings: BlockSettings {
                block_name: block_name.to_string(),
                block_version: "0.1.0".to_string(),
                action_name: Some("run".to_string()),
                input,
                ..BlockSettings::default()
            },
        },
    )
}

#[allow(dead_code)]
pub fn branch_step(name: &str) -> Step {
    Step::new(
        name,
        "Branch",
        StepKind::Branch {
            settings: BranchSettings::default(),
            on_success_action: None,
            on_failure_action: None,
        },
    )
}

#[allow(dead_code)]
pub fn loop_step(name: &str) -> Step {
    Step::new(
        name,
        "Loop",
        StepKind::Loop {
            settings: LoopSettings {
                items: "{{trigger.items}}".to_string(),
            },
            first_loop_action: None,
        },
    )
}

#[allow(dead_code)]
pub fn split_settings(option_ids: &[&str], default_branch: &str) -> SplitSettings {
    SplitSettings {
        options: option_ids
            .iter()
            .enumerate()
            .map(|(i, id)| SplitOption {
                id: id.to_string(),
                name: format!("Branch {}", i + 1),
                conditions: Vec::new(),
            })
            .collect(),
        default_branch: default_branch.to_string(),
    }
}

#[allow(dead_code)]
pub fn split_step(name: &str, option_ids: &[&str], default_branch: &str) -> Step {
    Step::new(
        name,
        "Router",
        StepKind::Split {
            settings: split_settings(option_ids, default_branch),
            branches: Vec::new(),
        },
    )
}

/// A fresh draft with a trigger named `trigger`.
#[allow(dead_code)]
pub fn draft() -> FlowVersion {
    FlowVersion::new_draft("version-1", "flow-1", "Test Flow")
}

/// Applies an `ADD_ACTION` with the given location, panicking on failure.
#[allow(dead_code)]
pub fn add(version: &FlowVersion, request: AddActionRequest) -> FlowVersion {
    apply(version, Operation::AddAction(request)).expect("add action should succeed")
}

#[allow(dead_code)]
pub fn step_names(root: &Step) -> Vec<String> {
    get_all_steps(root)
        .into_iter()
        .map(|step| step.name.clone())
        .collect()
}

#[allow(dead_code)]
pub fn find<'a>(version: &'a FlowVersion, name: &str) -> &'a Step {
    find_step_by_name(&version.trigger, name)
        .unwrap_or_else(|| panic!("step '{}' should exist", name))
}
