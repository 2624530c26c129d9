//! settlement-optimizer CLI
//!
//! Simplify recorded debts from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Settle debts from a JSON file with the default solver
//! settlement-optimizer optimize --input debts.json
//!
//! # Pick a solver, emit JSON and check the result
//! settlement-optimizer optimize --input debts.json --algorithm greedy --format json --validate
//!
//! # Check a settlement produced elsewhere
//! settlement-optimizer validate --original debts.json --optimized settlements.json
//!
//! # Generate a random debt network
//! settlement-optimizer generate --participants 10 --transfers 30 --seed 1
//! ```

use log::error;
use settlement_optimizer::core::transfer::Transfer;
use settlement_optimizer::graph::components::find_debt_cycles;
use settlement_optimizer::optimization::plan::SettlementPlan;
use settlement_optimizer::optimization::Algorithm;
use settlement_optimizer::simulation::stress_test::{generate_random_transfers, NetworkConfig};
use settlement_optimizer::validation::validator::{ValidationReport, Validator};
use std::fs;
use std::process;

fn print_usage() {
    eprintln!(
        r#"settlement-optimizer — balance-preserving debt simplification

USAGE:
    settlement-optimizer <COMMAND> [OPTIONS]

COMMANDS:
    optimize    Replace recorded debts with settlement transfers
    validate    Check settlement transfers against the original debts
    cycles      List groups of participants with circular debts
    generate    Generate a random debt network (for testing)
    help        Show this message

OPTIONS (optimize):
    --input <FILE>        Path to JSON transfers file
    --algorithm <NAME>    dinic (default), edmonds-karp or greedy
    --format <FORMAT>     Output format: text (default) or json
    --validate            Also validate the result against the input

OPTIONS (validate):
    --original <FILE>     Debts as recorded
    --optimized <FILE>    Settlement transfers to check
    --format <FORMAT>     Output format: text (default) or json

OPTIONS (cycles):
    --input <FILE>        Path to JSON transfers file

OPTIONS (generate):
    --participants <N>    Number of participants (default: 10)
    --transfers <N>       Number of debts (default: 30)
    --seed <N>            Seed for a reproducible network
    --output <FILE>       Write to file instead of stdout

Set RUST_LOG=debug to trace solver progress."#
    );
}

/// JSON schema for transfer files, both input and output.
#[derive(serde::Serialize, serde::Deserialize)]
struct TransfersFile {
    transfers: Vec<Transfer>,
}

#[derive(serde::Serialize)]
struct OptimizeOutput<'a> {
    plan: &'a SettlementPlan,
    #[serde(skip_serializing_if = "Option::is_none")]
    validation: Option<ValidationReport>,
}

fn load_transfers(path: &str) -> Vec<Transfer> {
    let content = fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error reading file '{}': {}", path, e);
        process::exit(1);
    });

    let file: TransfersFile = serde_json::from_str(&content).unwrap_or_else(|e| {
        eprintln!("Error parsing JSON: {}", e);
        eprintln!("Expected format:");
        eprintln!(
            r#"{{
  "transfers": [
    {{ "from": "alice", "to": "bob", "amount": 1250 }}
  ]
}}"#
        );
        process::exit(1);
    });
    file.transfers
}

fn to_json<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| {
        eprintln!("Error serializing output: {}", e);
        process::exit(1);
    })
}

/// Pull the value following a flag, exiting with `hint` if it is missing.
fn flag_value(args: &[String], i: &mut usize, hint: &str) -> String {
    *i += 1;
    args.get(*i).cloned().unwrap_or_else(|| {
        eprintln!("{}", hint);
        process::exit(1);
    })
}

/// Rendering of command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("unknown format '{}' (expected text or json)", s)),
        }
    }
}

fn parse_format(args: &[String], i: &mut usize) -> OutputFormat {
    let value = flag_value(args, i, "--format requires 'text' or 'json'");
    value.parse().unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        process::exit(1);
    })
}

fn parse_number<T: std::str::FromStr>(value: &str, flag: &str) -> T {
    value.parse().unwrap_or_else(|_| {
        eprintln!("{} requires a number, got '{}'", flag, value);
        process::exit(1);
    })
}

fn cmd_optimize(args: &[String]) {
    let mut input_path = None;
    let mut algorithm = Algorithm::default();
    let mut format = OutputFormat::default();
    let mut validate = false;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--input" => input_path = Some(flag_value(args, &mut i, "--input requires a file path")),
            "--algorithm" => {
                let name = flag_value(args, &mut i, "--algorithm requires a solver name");
                algorithm = name.parse().unwrap_or_else(|e| {
                    eprintln!("{}", e);
                    process::exit(1);
                });
            }
            "--format" => format = parse_format(args, &mut i),
            "--validate" => validate = true,
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                process::exit(1);
            }
        }
        i += 1;
    }

    let path = input_path.unwrap_or_else(|| {
        eprintln!("Error: --input <FILE> is required");
        process::exit(1);
    });

    let debts = load_transfers(&path);
    let plan = SettlementPlan::compute(algorithm, &debts).unwrap_or_else(|e| {
        error!("{} failed on {}: {}", algorithm, path, e);
        eprintln!("Error: {}", e);
        process::exit(1);
    });
    let report = validate.then(|| plan.validate(&debts, &Validator::all()));

    if format == OutputFormat::Json {
        println!(
            "{}",
            to_json(&OptimizeOutput {
                plan: &plan,
                validation: report,
            })
        );
    } else {
        println!("{}", plan);
        if let Some(report) = report {
            println!("{}", report);
        }
    }
}

fn cmd_validate(args: &[String]) {
    let mut original_path = None;
    let mut optimized_path = None;
    let mut format = OutputFormat::default();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--original" => {
                original_path = Some(flag_value(args, &mut i, "--original requires a file path"))
            }
            "--optimized" => {
                optimized_path = Some(flag_value(args, &mut i, "--optimized requires a file path"))
            }
            "--format" => format = parse_format(args, &mut i),
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                process::exit(1);
            }
        }
        i += 1;
    }

    let (Some(original_path), Some(optimized_path)) = (original_path, optimized_path) else {
        eprintln!("Error: --original <FILE> and --optimized <FILE> are required");
        process::exit(1);
    };

    let original = load_transfers(&original_path);
    let optimized = load_transfers(&optimized_path);
    let report = Validator::all().validate(&original, &optimized);

    if format == OutputFormat::Json {
        println!("{}", to_json(&report));
    } else {
        println!("{}", report);
    }
    if !report.valid {
        process::exit(2);
    }
}

fn cmd_cycles(args: &[String]) {
    let mut input_path = None;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--input" => input_path = Some(flag_value(args, &mut i, "--input requires a file path")),
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                process::exit(1);
            }
        }
        i += 1;
    }

    let path = input_path.unwrap_or_else(|| {
        eprintln!("Error: --input <FILE> is required");
        process::exit(1);
    });

    let debts = load_transfers(&path);
    let groups: Vec<_> = find_debt_cycles(&debts)
        .into_iter()
        .filter(|g| g.is_nettable())
        .collect();

    if groups.is_empty() {
        println!("No circular debts detected.");
        return;
    }
    for (n, group) in groups.iter().enumerate() {
        let names: Vec<&str> = group.participants.iter().map(|p| p.as_str()).collect();
        println!("  Group {}: {}", n, names.join(", "));
    }
    println!("\nTotal groups: {}", groups.len());
}

fn cmd_generate(args: &[String]) {
    let mut participants = 10usize;
    let mut transfers = 30usize;
    let mut seed = None;
    let mut output_path: Option<String> = None;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--participants" => {
                let value = flag_value(args, &mut i, "--participants requires a number");
                participants = parse_number(&value, "--participants");
            }
            "--transfers" => {
                let value = flag_value(args, &mut i, "--transfers requires a number");
                transfers = parse_number(&value, "--transfers");
            }
            "--seed" => {
                let value = flag_value(args, &mut i, "--seed requires a number");
                seed = Some(parse_number(&value, "--seed"));
            }
            "--output" => output_path = Some(flag_value(args, &mut i, "--output requires a file path")),
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                process::exit(1);
            }
        }
        i += 1;
    }

    let config = NetworkConfig {
        participant_count: participants,
        transfer_count: transfers,
        seed,
        ..Default::default()
    };
    let output = TransfersFile {
        transfers: generate_random_transfers(&config),
    };
    let json = to_json(&output);

    if let Some(path) = output_path {
        fs::write(&path, &json).unwrap_or_else(|e| {
            eprintln!("Error writing to '{}': {}", path, e);
            process::exit(1);
        });
        eprintln!(
            "Generated {} debts across {} participants → {}",
            output.transfers.len(),
            participants,
            path
        );
    } else {
        println!("{}", json);
    }
}

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let command = args[1].as_str();
    let rest = &args[2..];

    match command {
        "optimize" => cmd_optimize(rest),
        "validate" => cmd_validate(rest),
        "cycles" => cmd_cycles(rest),
        "generate" => cmd_generate(rest),
        "help" | "--help" | "-h" => print_usage(),
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            process::exit(1);
        }
    }
}
