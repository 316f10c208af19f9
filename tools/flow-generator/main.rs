use blockflow::prelude::*;
use clap::Parser;
use rand::Rng;
use rand::rngs::ThreadRng;
use rand::seq::SliceRandom;
use std::fs;

/// A CLI tool to generate random flowcharts for the Blockflow editor
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// The path to write the generated JSON file to
    #[arg(short, long, default_value = "generated_flow.json")]
    output: String,

    /// Number of message blocks to generate
    #[arg(short, long, default_value_t = 12)]
    blocks: usize,

    /// Chance that a block asks a yes/no question
    #[arg(long, default_value_t = 0.25)]
    branch_ratio: f64,

    /// Chance that a branch points back at an earlier block
    #[arg(long, default_value_t = 0.1)]
    loop_ratio: f64,
}

const PURPOSES: [&str; 6] = [
    "Greet the customer",
    "Ask for the customer's name",
    "Explain the offer",
    "Confirm the appointment",
    "Collect contact details",
    "Say goodbye",
];

const FIELDS: [&str; 5] = ["name", "email", "phone", "city", "birthday"];

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let mut rng = rand::rng();

    if cli.blocks == 0 {
        eprintln!("Error: --blocks must be at least 1");
        std::process::exit(1);
    }
    for (flag, ratio) in [("--branch-ratio", cli.branch_ratio), ("--loop-ratio", cli.loop_ratio)] {
        if !(0.0..=1.0).contains(&ratio) {
            eprintln!("Error: {} ({}) must be between 0 and 1", flag, ratio);
            std::process::exit(1);
        }
    }

    println!("Generating a flowchart with {} blocks...", cli.blocks);

    let flowchart = generate_flowchart(&mut rng, &cli);
    let branching = flowchart
        .blocks
        .iter()
        .filter(|b| b.block.condition.is_some())
        .count();

    let json_output = serde_json::to_string_pretty(&flowchart)?;
    fs::write(&cli.output, json_output)?;

    println!("-> {} block(s) ask a question.", branching);
    println!(
        "Successfully generated and saved flowchart to '{}'",
        cli.output
    );

    Ok(())
}

/// Builds a chain of blocks where some blocks branch. A branching block sends
/// `yes` down the chain and `no` either forward or back to an earlier block.
fn generate_flowchart(rng: &mut ThreadRng, cli: &Cli) -> Flowchart {
    let ids: Vec<String> = (1..=cli.blocks).map(|i| format!("gen-{}", i)).collect();
    let mut blocks = Vec::with_capacity(cli.blocks);
    let mut previous_branches = false;

    for (index, id) in ids.iter().enumerate() {
        let next = ids.get(index + 1);
        let branches = next.is_some() && rng.random_bool(cli.branch_ratio);

        let mut block = generate_content(rng, index);
        block.is_first_message = index == 0;
        // A block following a question is reached through the question's branch.
        if index > 0 && !previous_branches {
            block.previous_message_block_id = Some(ids[index - 1].clone());
        }

        if branches {
            block.condition = Some(format!("Question {}?", index + 1));
            block.positive_block_id = next.cloned();
            let back = index > 0 && rng.random_bool(cli.loop_ratio);
            block.negative_block_id = if back {
                Some(ids[rng.random_range(0..index)].clone())
            } else {
                next.cloned()
            };
        } else {
            block.is_last_message = next.is_none();
        }

        previous_branches = branches;
        blocks.push(RemoteBlock {
            id: id.clone(),
            block,
        });
    }

    Flowchart {
        name: format!("Generated flow ({} blocks)", cli.blocks),
        blocks,
    }
}

fn generate_content(rng: &mut ThreadRng, index: usize) -> BlockRequest {
    let purpose = PURPOSES[rng.random_range(0..PURPOSES.len())];
    let mut fields = FIELDS.to_vec();
    fields.shuffle(rng);
    fields.truncate(rng.random_range(0..=3));
    let data_collection: Vec<String> = fields.into_iter().map(str::to_string).collect();
    let timing = TimingPolicy::default().compute(
        &NodeData {
            data_collection: data_collection.clone(),
            ..NodeData::default()
        },
        true,
    );

    BlockRequest {
        title: format!("Message {}", index + 1),
        message_purpose: purpose.to_string(),
        examples: vec![format!("{} (variant {})", purpose, rng.random_range(1..=3))],
        data_collection,
        interval: timing.interval,
        ..BlockRequest::default()
    }
}
