use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::json;
use stepgraph::prelude::*;

/// A CLI tool to generate random flow versions by replaying ADD_ACTION operations
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// The path to write the generated JSON file to
    #[arg(short, long, default_value = "generated_flow.json")]
    output: String,

    /// The number of actions to add below the trigger
    #[arg(long, default_value_t = 25)]
    steps: usize,

    /// Seed for reproducible output
    #[arg(long)]
    seed: Option<u64>,
}

/// A slot new actions can be inserted into.
#[derive(Clone)]
struct InsertionPoint {
    parent: String,
    location: StepLocationRelativeToParent,
    branch_node_id: Option<String>,
}

const BLOCKS: [(&str, &str); 4] = [
    ("discord", "send_message_webhook"),
    ("store", "get"),
    ("http", "send_request"),
    ("github", "create_issue"),
];

fn main() -> Result<()> {
    let cli = Cli::parse();
    let seed = cli.seed.unwrap_or_else(rand::random);
    let mut rng = StdRng::seed_from_u64(seed);

    println!(
        "Generating a flow with {} action(s) (seed {})...",
        cli.steps, seed
    );

    let mut version = FlowVersion::new_draft("generated", "generated-flow", "Generated Flow");
    version = apply(&version, Operation::UpdateTrigger(schedule_trigger()))?;

    let mut points = vec![InsertionPoint {
        parent: version.trigger.name.clone(),
        location: StepLocationRelativeToParent::After,
        branch_node_id: None,
    }];

    for _ in 0..cli.steps {
        let point = points[rng.random_range(0..points.len())].clone();
        let name = find_available_step_name(&version.trigger, "step");
        let action = random_action(&mut rng, &name);
        points.extend(insertion_points_of(&action));

        let request = AddActionRequest {
            parent_step: point.parent,
            step_location_relative_to_parent: Some(point.location),
            branch_node_id: point.branch_node_id,
            action,
        };
        version = apply(&version, Operation::AddAction(request))?;
    }

    version.save(&cli.output)?;

    println!("-> Steps in tree: {}", get_all_steps(&version.trigger).len());
    println!("-> Blocks used: {}", get_used_blocks(&version.trigger).join(", "));
    println!(
        "Successfully generated and saved flow version to '{}'",
        cli.output
    );
    Ok(())
}

fn schedule_trigger() -> UpdateTriggerRequest {
    let mut input = serde_json::Map::new();
    input.insert("cronExpression".to_string(), json!("0 * * * *"));
    UpdateTriggerRequest::new(
        "Every Hour",
        TriggerKind::Trigger(TriggerSettings {
            block_name: Some("schedule".to_string()),
            block_version: Some("0.1.0".to_string()),
            trigger_name: Some("cron_expression".to_string()),
            package_type: Some(PackageType::Registry),
            input,
        }),
    )
}

fn random_action(rng: &mut StdRng, name: &str) -> Step {
    let kind = match rng.random_range(0..10) {
        0..=3 => {
            let (block_name, action_name) = BLOCKS[rng.random_range(0..BLOCKS.len())];
            let mut input = serde_json::Map::new();
            input.insert(
                "auth".to_string(),
                json!(connection_reference(&format!("{}-connection", block_name))),
            );
            StepKind::Block {
                settings: BlockSettings {
                    block_name: block_name.to_string(),
                    block_version: "0.1.0".to_string(),
                    action_name: Some(action_name.to_string()),
                    input,
                    ..BlockSettings::default()
                },
            }
        }
        4..=5 => StepKind::Code {
            settings: CodeSettings {
                source_code: SourceCode {
                    code: "export const code = async (inputs) => inputs;".to_string(),
                    package_json: "{}".to_string(),
                },
                ..CodeSettings::default()
            },
        },
        6..=7 => StepKind::Branch {
            settings: BranchSettings {
                conditions: vec![vec![BranchCondition {
                    operator: "TEXT_CONTAINS".to_string(),
                    first_value: "1".to_string(),
                    second_value: Some("1".to_string()),
                    case_sensitive: Some(rng.random_bool(0.5)),
                }]],
            },
            on_success_action: None,
            on_failure_action: None,
        },
        8 => {
            let option_count = rng.random_range(2..=4);
            let options: Vec<SplitOption> = (1..=option_count)
                .map(|i| SplitOption {
                    id: format!("{}-option-{}", name, i),
                    name: format!("Branch {}", i),
                    conditions: Vec::new(),
                })
                .collect();
            StepKind::Split {
                settings: SplitSettings {
                    default_branch: options[0].id.clone(),
                    options,
                },
                branches: Vec::new(),
            }
        }
        _ => StepKind::Loop {
            settings: LoopSettings {
                items: "{{trigger.body.items}}".to_string(),
            },
            first_loop_action: None,
        },
    };
    Step::new(name, name.replace('_', " "), kind)
}

/// The places a freshly added action opens up for later insertions.
fn insertion_points_of(action: &Step) -> Vec<InsertionPoint> {
    let point = |location, branch_node_id| InsertionPoint {
        parent: action.name.clone(),
        location,
        branch_node_id,
    };
    let mut points = vec![point(StepLocationRelativeToParent::After, None)];
    match &action.kind {
        StepKind::Branch { .. } => {
            points.push(point(StepLocationRelativeToParent::InsideTrueBranch, None));
            points.push(point(StepLocationRelativeToParent::InsideFalseBranch, None));
        }
        StepKind::Loop { .. } => points.push(point(StepLocationRelativeToParent::InsideLoop, None)),
        StepKind::Split { settings, .. } => {
            for option in &settings.options {
                points.push(point(
                    StepLocationRelativeToParent::InsideSplit,
                    Some(option.id.clone()),
                ));
            }
        }
        _ => {}
    }
    points
}
