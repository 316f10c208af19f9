use blockflow::prelude::*;
use blockflow::remote::ApiCall;
use clap::Parser;
use std::fs;
use std::time::Instant;

/// Inspect a saved flowchart: diagnostics, creation order and a dry-run save
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the flowchart JSON file, as returned by the block backend
    flowchart_path: String,

    /// Optional editor configuration JSON (timing policy, import layout)
    #[arg(short, long)]
    config: Option<String>,

    /// Replay the save against an in-memory backend and list the calls it makes
    #[arg(short, long)]
    dry_run: bool,

    /// Write a local draft snapshot of the imported graph to this path
    #[arg(short, long)]
    snapshot: Option<String>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let total_start = Instant::now();

    // --- 1. File Loading ---
    let config = match &cli.config {
        Some(path) => {
            let json = fs::read_to_string(path).unwrap_or_else(|e| {
                exit_with_error(&format!("Failed to read config file '{}': {}", path, e))
            });
            serde_json::from_str::<EditorConfig>(&json)
                .unwrap_or_else(|e| exit_with_error(&format!("Failed to parse config JSON: {}", e)))
        }
        None => EditorConfig::default(),
    };

    let flowchart_json = fs::read_to_string(&cli.flowchart_path).unwrap_or_else(|e| {
        exit_with_error(&format!(
            "Failed to read flowchart file '{}': {}",
            cli.flowchart_path, e
        ))
    });
    let flowchart: Flowchart = serde_json::from_str(&flowchart_json)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to parse flowchart JSON: {}", e)));

    // --- 2. Import ---
    let import_start = Instant::now();
    let state = import_flowchart(&flowchart, &config.timing, &config.import_layout())
        .unwrap_or_else(|e| exit_with_error(&format!("Import failed: {}", e)));
    let block_ids = flowchart.blocks.iter().map(|b| b.id.clone()).collect();
    let graph = FlowGraph::builder()
        .with_timing_policy(config.timing)
        .with_state(state)
        .build();
    let mut editor = FlowEditor::from_graph(&flowchart.name, graph, Some(block_ids), config);
    let import_duration = import_start.elapsed();

    println!(
        "Imported '{}': {} blocks, {} connections",
        editor.name(),
        editor.graph().nodes().len(),
        editor.graph().edges().len()
    );

    // --- 3. Diagnostics ---
    let diagnostics = editor.view().diagnostics;
    if diagnostics.is_clean() {
        println!("\nNo issues found.");
    } else {
        println!("\n--- Issues ({}) ---", diagnostics.len());
        println!("{}", PlanFormatter::format_diagnostics(&diagnostics));
    }

    // --- 4. Creation Plan ---
    let plan_start = Instant::now();
    let plan = plan_export(editor.graph().state())
        .unwrap_or_else(|e| exit_with_error(&format!("Export planning failed: {}", e)));
    let plan_duration = plan_start.elapsed();

    println!("\n--- Creation Order ---");
    println!("{}", PlanFormatter::format_plan(&plan, editor.graph().state()));
    let forward = plan.forward_references();
    if !forward.is_empty() {
        println!("\n{} reference(s) will be filled in after creation:", forward.len());
        for reference in &forward {
            println!(
                "  -> {} {} {}",
                reference.node_id, reference.relation, reference.target
            );
        }
    }

    // --- 5. Dry-Run Save ---
    if cli.dry_run {
        let api = InMemoryBlockApi::new().with_blocks("dry-run", editor.name(), flowchart.blocks);
        let report = futures::executor::block_on(editor.save(&api, "dry-run"))
            .unwrap_or_else(|e| exit_with_error(&format!("Dry-run save failed: {}", e)));

        println!("\n--- Dry-Run Save ---");
        for call in api.calls() {
            match call {
                ApiCall::Create { block_id, .. } => println!("  create   {}", block_id),
                ApiCall::Update { block_id } => println!("  update   {}", block_id),
                ApiCall::Delete { block_id } => println!("  delete   {}", block_id),
                ApiCall::SetSequence { ordered_ids, .. } => {
                    println!("  sequence {}", ordered_ids.join(", "))
                }
                ApiCall::Get { flowchart_id } => println!("  get      {}", flowchart_id),
            }
        }
        println!(
            "Created {}, deleted {}, patched {}",
            report.created.len(),
            report.deleted,
            report.patched
        );
    }

    // --- 6. Snapshot ---
    if let Some(path) = &cli.snapshot {
        editor
            .snapshot()
            .save(path)
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to write snapshot: {}", e)));
        println!("\nSnapshot written to '{}'", path);
    }

    println!("\n--- Performance Summary ---");
    println!("Import:       {:?}", import_duration);
    println!("Planning:     {:?}", plan_duration);
    println!("Total:        {:?}", total_start.elapsed());
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
