//! Soroban Run - prints abacus instruction sequences
//!
//! Thin front end over `soroban-core`: builds a plan, instruction or bead
//! diff for the given values and prints it as text or JSON.

use std::process;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use soroban_core::{
    diff_chain, diff_from_values, validate_diff, AbacusConfig, BeadChange, BeadDiff, Planner,
};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "soroban-run")]
#[command(about = "Decompose abacus arithmetic into bead movements")]
struct Cli {
    #[command(flatten)]
    abacus: AbacusArgs,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug)]
struct AbacusArgs {
    /// Number of rods on the abacus
    #[arg(long, global = true, default_value_t = soroban_core::DEFAULT_COLUMNS)]
    columns: usize,

    /// Extra carry recursion levels beyond the digit count
    #[arg(long, global = true, default_value_t = 2)]
    depth_slack: usize,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the narrated step sequence.
    Plan {
        #[arg(allow_negative_numbers = true)]
        start: i64,
        #[arg(allow_negative_numbers = true)]
        target: i64,
    },

    /// Print the tutorial instruction and its validation result.
    Instruction {
        #[arg(allow_negative_numbers = true)]
        start: i64,
        #[arg(allow_negative_numbers = true)]
        target: i64,

        /// Operation label from an older tutorial format (display only)
        #[arg(long)]
        legacy_label: Option<String>,
    },

    /// Print the ordered bead changes between two values.
    Diff {
        #[arg(allow_negative_numbers = true)]
        from: i64,
        #[arg(allow_negative_numbers = true)]
        to: i64,
    },

    /// Print the bead diff for every hop through a list of checkpoints.
    Chain {
        #[arg(allow_negative_numbers = true)]
        start: i64,
        #[arg(required = true, allow_negative_numbers = true)]
        checkpoints: Vec<i64>,
    },
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "soroban_run=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = AbacusConfig {
        columns: cli.abacus.columns,
        depth_slack: cli.abacus.depth_slack,
    };
    let planner = match Planner::new(config) {
        Ok(planner) => planner,
        Err(e) => {
            error!("{}", e);
            process::exit(1);
        }
    };
    info!(columns = config.columns, depth_slack = config.depth_slack, "abacus configured");

    if let Err(e) = run(&planner, cli.command, cli.json) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(planner: &Planner, command: Commands, json: bool) -> Result<(), serde_json::Error> {
    let columns = planner.config().columns;
    match command {
        Commands::Plan { start, target } => {
            let sequence = planner.sequence(start, target);
            if json {
                return print_json(&sequence);
            }
            println!("{}", sequence.full_decomposition);
            for step in &sequence.steps {
                let flag = if step.is_valid { "" } else { "  [invalid]" };
                println!(
                    "  {:>2}. {:>8}  -> {:<8} {}{flag}",
                    step.step_index + 1,
                    step.mathematical_term,
                    step.expected_value,
                    step.english_instruction
                );
                print_changes(&step.changes(), "        ");
                for issue in &step.validation_issues {
                    println!("        ! {issue}");
                }
            }
            for segment in &sequence.segments {
                println!();
                println!("{}: {}", segment.title, segment.expression);
                println!("  {}", segment.summary);
            }
        }
        Commands::Instruction {
            start,
            target,
            legacy_label,
        } => {
            let instruction = planner.instruction(start, target, legacy_label.as_deref());
            let validation =
                soroban_core::validate_instruction_with(&instruction, planner.config());
            if json {
                return print_json(&serde_json::json!({
                    "instruction": instruction,
                    "validation": validation,
                }));
            }
            println!("{:?}: {}", instruction.expected_action, instruction.action_description);
            if let Some(lines) = &instruction.multi_step_instructions {
                for (index, line) in lines.iter().enumerate() {
                    println!("  {}. {line}", index + 1);
                }
            }
            print_changes(&instruction.highlight_beads, "  ");
            print_validation(validation.is_valid, &validation.messages());
        }
        Commands::Diff { from, to } => {
            let bead_diff = diff_from_values(from, to, columns);
            if json {
                return print_json(&bead_diff);
            }
            print_diff(&bead_diff);
        }
        Commands::Chain { start, checkpoints } => {
            let chain = diff_chain(start, &checkpoints, columns);
            if json {
                return print_json(&chain);
            }
            for hop in &chain {
                println!("{} -> {}", hop.from_value, hop.to_value);
                print_diff(&hop.diff);
            }
        }
    }
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_changes(changes: &[BeadChange], indent: &str) {
    for change in changes {
        let position = change
            .position
            .map_or(String::new(), |p| format!(" #{p}"));
        println!(
            "{indent}[{}] {:?} {:?}{position} @ {}",
            change.order,
            change.direction,
            change.bead_type,
            soroban_core::place_name(change.place_value)
        );
    }
}

fn print_diff(bead_diff: &BeadDiff) {
    println!("  {}", bead_diff.summary);
    print_changes(&bead_diff.changes, "    ");
    let validation = validate_diff(bead_diff);
    if !validation.is_valid {
        print_validation(false, &validation.messages());
    }
}

fn print_validation(is_valid: bool, messages: &[&str]) {
    if is_valid {
        println!("valid");
        return;
    }
    println!("invalid:");
    for message in messages {
        println!("  - {message}");
    }
}
