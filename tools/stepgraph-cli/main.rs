use clap::{Parser, Subcommand};
use stepgraph::prelude::*;
use std::fs;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

/// Applies operations to flow versions and inspects their step trees
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Log every applied operation (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Apply a JSON array of operations to a flow version
    Apply {
        /// Path to the flow version JSON file
        flow_path: String,
        /// Path to the operations JSON file
        operations_path: String,
        /// Write the resulting flow version here instead of stdout
        #[arg(short, long)]
        output: Option<String>,
        /// Keep the stored `valid` flag instead of recomputing it
        #[arg(long)]
        keep_validity: bool,
    },
    /// List every step in traversal order
    Steps {
        /// Path to the flow version JSON file
        flow_path: String,
    },
    /// Print the ADD_ACTION requests that rebuild the flow
    ExportOps {
        /// Path to the flow version JSON file
        flow_path: String,
        /// Optional JSON array of connections to rebind block actions to
        #[arg(short, long)]
        connections: Option<String>,
    },
    /// Print a shareable template with action credentials removed
    Template {
        /// Path to the flow version JSON file
        flow_path: String,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Apply {
            flow_path,
            operations_path,
            output,
            keep_validity,
        } => run_apply(&flow_path, &operations_path, output, keep_validity),
        Command::Steps { flow_path } => run_steps(&flow_path),
        Command::ExportOps {
            flow_path,
            connections,
        } => run_export_ops(&flow_path, connections),
        Command::Template { flow_path } => run_template(&flow_path),
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "stepgraph=debug" } else { "stepgraph=warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run_apply(flow_path: &str, operations_path: &str, output: Option<String>, keep_validity: bool) {
    let total_start = Instant::now();

    let version = load_flow(flow_path);
    let operations_json = fs::read_to_string(operations_path).unwrap_or_else(|e| {
        exit_with_error(&format!(
            "Failed to read operations file '{}': {}",
            operations_path, e
        ))
    });
    let operations = Operation::list_from_json(&operations_json)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to parse operations: {}", e)));
    let operation_count = operations.len();

    let reducer = Reducer::builder()
        .recompute_validity(!keep_validity)
        .build();
    let apply_start = Instant::now();
    let next = reducer
        .apply_all(&version, operations)
        .unwrap_or_else(|e| exit_with_error(&format!("{}: {}", e.code(), e)));
    let apply_duration = apply_start.elapsed();

    match output {
        Some(path) => {
            next.save(&path).unwrap_or_else(|e| {
                exit_with_error(&format!("Failed to save flow version: {}", e))
            });
            eprintln!("Saved flow version to '{}'", path);
        }
        None => println!("{}", to_json_or_exit(&next)),
    }

    eprintln!("\n--- Summary ---");
    eprintln!("Operations Applied:   {}", operation_count);
    eprintln!("Steps In Result:      {}", get_all_steps(&next.trigger).len());
    eprintln!("Valid:                {}", next.valid);
    eprintln!("Apply:                {:?}", apply_duration);
    eprintln!("Total Execution:      {:?}", total_start.elapsed());
}

fn run_steps(flow_path: &str) {
    let version = load_flow(flow_path);
    println!("Flow '{}' ({:?})", version.display_name, version.state);
    for step in get_all_steps(&version.trigger) {
        let marker = if step.valid { " " } else { "!" };
        println!(
            "{} {:<20} {:<8} {}",
            marker,
            step.name,
            step.step_type().to_string(),
            step.display_name
        );
    }

    let blocks = get_used_blocks(&version.trigger);
    if !blocks.is_empty() {
        println!("\nBlocks: {}", blocks.join(", "));
    }
    let connections = get_used_connections(&version.trigger);
    for (block, connection) in &connections {
        println!("  {} -> {}", block, connection);
    }
}

fn run_export_ops(flow_path: &str, connections_path: Option<String>) {
    let version = load_flow(flow_path);
    let connections: Vec<Connection> = match connections_path {
        Some(path) => {
            let json = fs::read_to_string(&path).unwrap_or_else(|e| {
                exit_with_error(&format!("Failed to read connections file '{}': {}", path, e))
            });
            serde_json::from_str(&json)
                .unwrap_or_else(|e| exit_with_error(&format!("Failed to parse connections: {}", e)))
        }
        None => Vec::new(),
    };

    let operations: Vec<Operation> = get_import_operations(Some(&version.trigger), &connections)
        .into_iter()
        .map(Operation::AddAction)
        .collect();
    let json = serde_json::to_string_pretty(&operations)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to serialize operations: {}", e)));
    println!("{}", json);
}

fn run_template(flow_path: &str) {
    let version = load_flow(flow_path);
    let template = prepare_template(&version)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to prepare template: {}", e)));
    let json = template
        .to_json()
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to serialize template: {}", e)));
    println!("{}", json);
}

fn load_flow(path: &str) -> FlowVersion {
    FlowVersion::from_file(path).unwrap_or_else(|e| exit_with_error(&e.to_string()))
}

fn to_json_or_exit(version: &FlowVersion) -> String {
    version
        .to_json()
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to serialize flow version: {}", e)))
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
