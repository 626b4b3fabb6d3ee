// src/main.rs
//
// Research-harness CLI entrypoint for Caissa.
//
// Runs a training phase followed by a testing phase with the baseline
// random agent, then prints the run summaries and optionally writes the
// results table and a per-step JSONL log.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{ArgAction, Parser, ValueEnum};

use caissa::config::{AdapterKind, EnvConfig, OpponentKind, SubGoal};
use caissa::env::EnvironmentDriver;
use caissa::logging::FileSink;
use caissa::stats::{CommentaryTable, HumanStatsTable};
use caissa::{EncodeMode, RandomAgent};

#[derive(Copy, Clone, Debug, ValueEnum)]
enum AdapterArg {
    Board,
    BoardLanguage,
    ActivePieces,
    PriorActions,
    PossibleActions,
    Annotations,
    Combined,
}

impl From<AdapterArg> for AdapterKind {
    fn from(arg: AdapterArg) -> Self {
        match arg {
            AdapterArg::Board => AdapterKind::Board,
            AdapterArg::BoardLanguage => AdapterKind::BoardLanguage,
            AdapterArg::ActivePieces => AdapterKind::ActivePieces,
            AdapterArg::PriorActions => AdapterKind::PriorActions,
            AdapterArg::PossibleActions => AdapterKind::PossibleActions,
            AdapterArg::Annotations => AdapterKind::Annotations,
            AdapterArg::Combined => AdapterKind::Combined,
        }
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum OpponentArg {
    Random,
    Sampled,
}

impl From<OpponentArg> for OpponentKind {
    fn from(arg: OpponentArg) -> Self {
        match arg {
            OpponentArg::Random => OpponentKind::Random,
            OpponentArg::Sampled => OpponentKind::Sampled,
        }
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "caissa",
    about = "Language-state chess environment (research harness)",
    version
)]
struct Args {
    /// State adapter feeding the agent.
    #[arg(long, value_enum, default_value_t = AdapterArg::Combined)]
    adapter: AdapterArg,

    /// Opponent for training episodes.
    #[arg(long, value_enum, default_value_t = OpponentArg::Random)]
    training_opponent: OpponentArg,

    /// Opponent for testing episodes.
    #[arg(long, value_enum, default_value_t = OpponentArg::Random)]
    testing_opponent: OpponentArg,

    /// Training episodes to run.
    #[arg(long, default_value_t = 100)]
    train_episodes: u32,

    /// Testing episodes to run.
    #[arg(long, default_value_t = 20)]
    test_episodes: u32,

    /// Agent action cap per episode (both phases).
    #[arg(long, default_value_t = 50)]
    action_cap: u32,

    /// End episodes at the first capture instead of playing to a result.
    #[arg(long)]
    first_capture: bool,

    /// Deterministic seed for agent and opponents.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Human play-data JSON (required by the sampled opponent to be useful).
    #[arg(long)]
    play_data: Option<PathBuf>,

    /// Human game-count JSON, merged with --play-data.
    #[arg(long)]
    game_counts: Option<PathBuf>,

    /// Commentary JSON (required by the annotations adapter).
    #[arg(long)]
    commentary: Option<PathBuf>,

    /// Write per-step JSONL telemetry here.
    #[arg(long)]
    log: Option<PathBuf>,

    /// Write the episode results table here (JSONL).
    #[arg(long)]
    results: Option<PathBuf>,

    /// Also write a flat CSV next to --results.
    #[arg(long)]
    csv: bool,

    /// Verbosity: -v, -vv
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = EnvConfig::default()
        .with_adapter(args.adapter.into())
        .with_opponents(args.training_opponent.into(), args.testing_opponent.into())
        .with_episodes(args.train_episodes, args.test_episodes)
        .with_action_caps(args.action_cap, args.action_cap)
        .with_sub_goal(args.first_capture.then_some(SubGoal::FirstCapture))
        .with_seed(args.seed);

    println!(
        "caissa | cfg={} | adapter={} | train={}x{} vs {} | test={}x{} vs {} | seed={}",
        config.version,
        config.adapter.as_str(),
        config.num_train_episodes,
        config.training_action_cap,
        config.training_opponent.as_str(),
        config.num_test_episodes,
        config.testing_action_cap,
        config.testing_opponent.as_str(),
        config.seed,
    );

    let stats = match (&args.play_data, &args.game_counts) {
        (Some(play), Some(counts)) => {
            let table = HumanStatsTable::load(play, counts)?;
            if args.verbose > 0 {
                println!("loaded human stats for {} positions", table.len());
            }
            Arc::new(table)
        }
        (None, None) => Arc::new(HumanStatsTable::default()),
        _ => anyhow::bail!("--play-data and --game-counts must be given together"),
    };

    let commentary = match &args.commentary {
        Some(path) => {
            let table = CommentaryTable::load(path)?;
            if args.verbose > 0 {
                println!("loaded commentary for {} positions", table.len());
            }
            Some(Arc::new(table))
        }
        None => None,
    };

    let agent = Box::new(RandomAgent::new(args.seed));
    let mut driver = EnvironmentDriver::with_data(config, agent, stats, commentary)
        .context("building environment driver")?;

    if let Some(path) = &args.log {
        let sink = FileSink::create(
            path.to_str()
                .context("log path is not valid UTF-8")?,
        )
        .with_context(|| format!("creating log file {}", path.display()))?;
        driver.set_sink(Box::new(sink));
        // Log the readable form alongside the step data.
        driver.set_encode_mode(EncodeMode::Text);
    }

    driver.run(true).context("training phase")?;
    let train_summary = driver.results().summary();
    println!(
        "train | episodes={} | mean_reward={:.3} | mean_steps={:.1}",
        train_summary.episodes, train_summary.mean_reward, train_summary.mean_steps
    );

    driver.run(false).context("testing phase")?;
    let full_summary = driver.results().summary();
    println!(
        "total | episodes={} | mean_reward={:.3} | mean_steps={:.1}",
        full_summary.episodes, full_summary.mean_reward, full_summary.mean_steps
    );

    if let Some(path) = &args.results {
        driver.results().write_jsonl(path)?;
        if args.csv {
            driver.results().write_csv(&path.with_extension("csv"))?;
        }
        println!("results written to {}", path.display());
    }

    Ok(())
}
