use clap::{Parser, Subcommand};
use kensa::prelude::*;
use kensa::serializer::DEFAULT_SLOT;
use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

/// Validate, order, run and convert identity-verification workflows
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Log at debug level (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check a workflow document against the structural rules
    Validate {
        /// Workflow JSON, in export or raw `{nodes, edges}` format
        workflow_path: String,
    },
    /// Print the execution order of a workflow
    Order { workflow_path: String },
    /// Run a workflow against the simulated verification services
    Run {
        workflow_path: String,

        /// Artificial latency per service call, in milliseconds
        #[arg(long, default_value_t = 0)]
        latency_ms: u64,

        /// Endpoints that should fail, e.g. `--fail /api/scanner`
        #[arg(long = "fail")]
        failing: Vec<String>,

        /// Write the finished workflow (with results) to this path
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Convert a workflow document to the labelled export format
    Export {
        workflow_path: String,

        /// Override the workflow name
        #[arg(long)]
        name: Option<String>,

        #[arg(short, long)]
        output: Option<String>,
    },
    /// Write the default verification workflow as an export document
    Template {
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Save a workflow document into a store slot
    Save {
        workflow_path: String,

        /// Directory holding the saved slots
        #[arg(long, default_value = ".kensa")]
        store: PathBuf,

        #[arg(long, default_value = DEFAULT_SLOT)]
        slot: String,
    },
    /// Load a workflow from a store slot and print it as an export document
    Load {
        #[arg(long, default_value = ".kensa")]
        store: PathBuf,

        #[arg(long, default_value = DEFAULT_SLOT)]
        slot: String,

        #[arg(short, long)]
        output: Option<String>,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Validate { workflow_path } => {
            let state = read_workflow(&workflow_path);
            let report = validate(state.graph());
            println!("{}", RunFormatter::format_report(&report));
            if !report.valid {
                std::process::exit(1);
            }
        }
        Command::Order { workflow_path } => {
            let state = read_workflow(&workflow_path);
            let schedule = Schedule::for_graph(state.graph());
            for (i, id) in schedule.order.iter().enumerate() {
                let label = state.node(id).map_or("?", |n| n.label.as_str());
                println!("{:>2}. {} ({})", i + 1, label, id);
            }
            if !schedule.is_complete() {
                exit_with_error(&format!(
                    "Only {} of {} nodes could be ordered; the workflow contains a cycle",
                    schedule.order.len(),
                    schedule.total
                ));
            }
        }
        Command::Run {
            workflow_path,
            latency_ms,
            failing,
            output,
        } => {
            let mut state = read_workflow(&workflow_path);
            let backend = failing
                .into_iter()
                .fold(
                    SimulatedBackend::builder().latency(Duration::from_millis(latency_ms)),
                    |builder, endpoint| builder.fail_endpoint(endpoint),
                )
                .build();
            let executor = Executor::new(backend);

            let run_start = Instant::now();
            let outcome = executor
                .run(&mut state)
                .await
                .unwrap_or_else(|e| exit_with_error(&format!("Run refused: {}", e)));

            println!("\n{}", RunFormatter::format_state(&state));
            println!("\n{}", RunFormatter::format_outcome(&outcome));
            println!("Total Execution: {:?}", run_start.elapsed());

            if let Some(path) = output {
                let text = serde_json::to_string_pretty(state.graph())
                    .unwrap_or_else(|e| exit_with_error(&format!("Failed to serialize run: {}", e)));
                write_output(Some(path), &text);
            }
            if !outcome.is_completed() {
                std::process::exit(1);
            }
        }
        Command::Export {
            workflow_path,
            name,
            output,
        } => {
            let mut state = read_workflow(&workflow_path);
            if let Some(name) = name {
                state.name = name;
            }
            write_output(output, &export_text(&state));
        }
        Command::Template { output } => {
            write_output(output, &export_text(&WorkflowState::from_template()));
        }
        Command::Save {
            workflow_path,
            store,
            slot,
        } => {
            let state = read_workflow(&workflow_path);
            let store = FileStore::new(store);
            save_workflow(&state, &store, &slot)
                .unwrap_or_else(|e| exit_with_error(&format!("Failed to save workflow: {}", e)));
            println!("Saved '{}' to slot '{}' in {}", state.name, slot, store.root().display());
        }
        Command::Load {
            store,
            slot,
            output,
        } => {
            let store = FileStore::new(store);
            let mut state = WorkflowState::default();
            let found = load_workflow(&mut state, &store, &slot)
                .unwrap_or_else(|e| exit_with_error(&format!("Failed to load workflow: {}", e)));
            if !found {
                exit_with_error(&format!("Slot '{}' is empty", slot));
            }
            write_output(output, &export_text(&state));
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn read_workflow(path: &str) -> WorkflowState {
    let json = fs::read_to_string(path)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to read workflow file '{}': {}", path, e)));
    let mut state = WorkflowState::default();
    import_workflow(&mut state, &json)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to import '{}': {}", path, e)));
    state
}

fn export_text(state: &WorkflowState) -> String {
    export_json(state).unwrap_or_else(|e| exit_with_error(&format!("Failed to export workflow: {}", e)))
}

fn write_output(path: Option<String>, text: &str) {
    match path {
        Some(path) => {
            fs::write(&path, text).unwrap_or_else(|e| {
                exit_with_error(&format!("Could not write to file '{}': {}", path, e))
            });
            println!("Wrote '{}'", path);
        }
        None => println!("{}", text),
    }
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
