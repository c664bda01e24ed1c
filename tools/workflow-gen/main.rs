use clap::Parser;
use kensa::prelude::*;
use rand::Rng;
use rand::rngs::ThreadRng;
use serde_json::json;
use std::fs;

/// A CLI tool to generate random, valid verification workflows for kensa
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// The path to write the generated export document to
    #[arg(short, long, default_value = "generated_workflow.json")]
    output: String,

    /// The minimum number of service steps between Start and End
    #[arg(long, default_value_t = 1)]
    min: usize,

    /// The maximum number of service steps between Start and End
    #[arg(long, default_value_t = 8)]
    max: usize,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut rng = rand::rng();

    if cli.min > cli.max {
        eprintln!(
            "Error: --min ({}) cannot be greater than --max ({})",
            cli.min, cli.max
        );
        std::process::exit(1);
    }

    let steps = rng.random_range(cli.min..=cli.max);
    println!("Generating a workflow with {} service step(s)...", steps);

    let state = generate_workflow(&mut rng, steps)?;
    let report = validate(state.graph());
    if !report.valid {
        return Err(format!("generated workflow is invalid: {:?}", report.errors).into());
    }

    fs::write(&cli.output, export_json(&state)?)?;
    println!(
        "Successfully generated {} nodes and saved the workflow to '{}'",
        state.graph().nodes().len(),
        cli.output
    );

    Ok(())
}

/// Builds `Start -> step* -> End`, where every Card Capture may be followed by its Scanner.
fn generate_workflow(rng: &mut ThreadRng, steps: usize) -> Result<WorkflowState> {
    let mut state = WorkflowState::new(format!("Generated workflow ({} steps)", steps));
    let mut column = 0.0;
    let mut previous = add_step(&mut state, NodeKind::Start, &mut column)?;

    let mut remaining = steps;
    while remaining > 0 {
        let kind = if rng.random_bool(0.5) {
            NodeKind::Liveness
        } else {
            NodeKind::CardCapture
        };
        let id = add_step(&mut state, kind.clone(), &mut column)?;
        state.connect(&previous, &id)?;
        previous = id;
        remaining -= 1;

        // Scanners can only hang off a Card Capture node.
        if kind == NodeKind::CardCapture && remaining > 0 && rng.random_bool(0.7) {
            let scanner = add_step(&mut state, NodeKind::Scanner, &mut column)?;
            state.connect(&previous, &scanner)?;
            previous = scanner;
            remaining -= 1;
        }
    }

    let end = add_step(&mut state, NodeKind::End, &mut column)?;
    state.connect(&previous, &end)?;
    Ok(state)
}

fn add_step(state: &mut WorkflowState, kind: NodeKind, column: &mut f64) -> Result<NodeId> {
    let mut node = WorkflowNode::new_with_generated_id(kind.clone()).at(*column, 100.0);
    if kind == NodeKind::CardCapture {
        node = node.with_input("documentType", json!("national_id"));
    }
    *column += 250.0;
    let id = node.id.clone();
    state.add_node(node)?;
    Ok(id)
}
