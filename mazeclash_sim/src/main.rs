//! Mazeclash Simulation CLI
//!
//! Run deterministic failure-mode scenarios against the match scheduler.

use clap::Parser;
use mazeclash_core::{GameMaster, MatchConfig};
use mazeclash_env::MatchError;
use mazeclash_sim::scenarios::ScenarioId;
use mazeclash_sim::{
    GridUniverse, MatchRecorder, RandomWalkAgent, ScenarioResult, ScenarioRunner, SimContext,
    DEFAULT_LAYOUT,
};
use std::sync::Arc;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

/// Runs a seeded random-walk exhibition match and dumps the recording.
async fn run_exhibition(seed: u64, rounds: u32, export_path: &str) -> Result<(), MatchError> {
    let universe = GridUniverse::from_layout(DEFAULT_LAYOUT)
        .map_err(|err| MatchError::Config(err.to_string()))?;
    let topology = Arc::new(universe.adjacency());
    let config = MatchConfig::default().with_game_time(rounds);
    let mut gm = GameMaster::new(universe, topology, SimContext::shared(seed), config);

    let recorder = MatchRecorder::new();
    let handle = recorder.handle();
    gm.register_viewer(Box::new(recorder));
    gm.register_team(Box::new(RandomWalkAgent::new(seed ^ 1)), "blue")?;
    gm.register_team(Box::new(RandomWalkAgent::new(seed ^ 2)), "red")?;

    gm.play().await?;

    if let Some(summary) = gm.summary() {
        info!("{}", summary);
    }
    let record = handle.record();
    record
        .write_to_file(export_path)
        .map_err(|err| MatchError::Config(format!("failed to write {}: {}", export_path, err)))?;
    info!("Exported {} frames to {}", record.frames.len(), export_path);
    Ok(())
}

/// Mazeclash deterministic scenario CLI
#[derive(Parser, Debug)]
#[command(name = "mazeclash-sim")]
#[command(about = "Run deterministic failure-mode scenarios for the match scheduler", long_about = None)]
struct Args {
    /// Master seed for determinism
    #[arg(short, long, default_value = "42")]
    seed: u64,

    /// Scenario to run (stand_still_draw, timeout_disqualification,
    /// early_disconnect, food_rush, fallback_storm, seed_replay, all)
    #[arg(short = 'S', long, default_value = "all")]
    scenario: String,

    /// Number of consecutive seeds to test (for CI mode)
    #[arg(long, default_value = "1")]
    seeds: usize,

    /// Round limit for scenarios that run to the limit
    #[arg(short, long, default_value = "30")]
    rounds: u32,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// JSON output for CI parsing
    #[arg(long)]
    json: bool,

    /// Record a random-walk exhibition match to a JSON file instead of
    /// running scenarios
    #[arg(long)]
    export: Option<String>,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");

    if let Some(export_path) = &args.export {
        if let Err(err) = run_exhibition(args.seed, args.rounds, export_path).await {
            error!("Exhibition match failed: {}", err);
            std::process::exit(1);
        }
        return;
    }

    let scenarios: Vec<ScenarioId> = if args.scenario == "all" {
        ScenarioId::all()
    } else {
        vec![args.scenario.parse().unwrap_or_else(|err| {
            eprintln!("Error: {}", err);
            eprintln!(
                "Available scenarios: {}, all",
                ScenarioId::all()
                    .iter()
                    .map(|s| s.name())
                    .collect::<Vec<_>>()
                    .join(", ")
            );
            std::process::exit(1);
        })]
    };

    let mut all_results: Vec<ScenarioResult> = Vec::new();
    let mut failed_count = 0;

    for seed_offset in 0..args.seeds {
        let seed = args.seed.wrapping_add(seed_offset as u64);
        let runner = ScenarioRunner::new(seed).with_game_time(args.rounds);

        for scenario in &scenarios {
            let result = runner.run(*scenario).await;

            if !args.json {
                if result.passed {
                    info!("PASS {} (seed={})", scenario.name(), seed);
                } else {
                    error!(
                        "FAIL {} (seed={}): {}",
                        scenario.name(),
                        seed,
                        result.failure_reason.as_deref().unwrap_or("unknown")
                    );
                }
            }

            if !result.passed {
                failed_count += 1;
            }
            all_results.push(result);
        }
    }

    let total = all_results.len();
    let passed = total - failed_count;

    if args.json {
        let summary = serde_json::json!({
            "total": total,
            "passed": passed,
            "failed": failed_count,
            "results": all_results.iter().map(|r| {
                serde_json::json!({
                    "scenario": r.scenario.name(),
                    "seed": r.seed,
                    "passed": r.passed,
                    "rounds_played": r.rounds_played,
                    "failure_reason": r.failure_reason,
                    "summary": r.summary,
                })
            }).collect::<Vec<_>>(),
        });
        match serde_json::to_string_pretty(&summary) {
            Ok(json) => println!("{}", json),
            Err(err) => {
                error!("Failed to serialize summary: {}", err);
                std::process::exit(1);
            }
        }
    } else if failed_count == 0 {
        info!("All {} scenario runs passed", total);
    } else {
        error!("{}/{} scenario runs failed", failed_count, total);
        for result in &all_results {
            if !result.passed {
                error!(
                    "  - {} seed={}: {}",
                    result.scenario.name(),
                    result.seed,
                    result.failure_reason.as_deref().unwrap_or("unknown")
                );
            }
        }
    }

    if failed_count > 0 {
        std::process::exit(1);
    }
}
