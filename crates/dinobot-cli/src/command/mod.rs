use std::path::PathBuf;

use clap::{Parser, Subcommand};
use dinobot_evaluator::{
    game_loop::GameLoopConfig,
    policy::{Policy, PolicyFamily},
};
use rand::Rng;
use tracing_subscriber::filter::LevelFilter;

use crate::model::strategy_model::ModelDir;

use self::{play::PlayArg, sweep::SweepArg, train::TrainArg};

mod play;
mod sweep;
mod train;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// Log per-run and per-jump detail
    #[arg(long, short, global = true)]
    verbose: bool,
    /// Only log warnings and errors
    #[arg(long, short, global = true, conflicts_with = "verbose")]
    quiet: bool,
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Play games with a policy and report the scores
    Play(#[clap(flatten)] PlayArg),
    /// Tune a policy's strategy vector with SPSA
    Train(#[clap(flatten)] TrainArg),
    /// Score every threshold in a range to plot the cost curve
    Sweep(#[clap(flatten)] SweepArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    init_logging(args.verbose, args.quiet);
    match args.mode {
        Mode::Play(arg) => play::run(&arg)?,
        Mode::Train(arg) => train::run(&arg)?,
        Mode::Sweep(arg) => sweep::run(&arg)?,
    }
    Ok(())
}

fn init_logging(verbose: bool, quiet: bool) {
    let level = match (verbose, quiet) {
        (true, _) => LevelFilter::DEBUG,
        (false, true) => LevelFilter::WARN,
        (false, false) => LevelFilter::INFO,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Which policy to play with and where its parameters come from.
#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct PolicyArg {
    /// Policy family
    #[arg(long, default_value = "threshold")]
    family: PolicyFamily,
    /// Explicit strategy vector, comma separated; overrides any stored model
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    strategy: Option<Vec<f32>>,
    /// Directory of stored models, one `<family>.json` per family
    #[arg(long, default_value = "models")]
    models_dir: PathBuf,
}

impl PolicyArg {
    pub(crate) fn family(&self) -> PolicyFamily {
        self.family
    }

    pub(crate) fn models(&self) -> ModelDir {
        ModelDir::new(&self.models_dir)
    }

    /// Builds the policy from `--strategy`, a stored model, or a random sample, in that order.
    pub(crate) fn policy<R>(&self, rng: &mut R) -> anyhow::Result<Policy>
    where
        R: Rng + ?Sized,
    {
        match &self.strategy {
            Some(strategy) => Ok(Policy::from_strategy(self.family, strategy)?),
            None => Ok(Policy::load_or_init(self.family, &self.models(), rng)),
        }
    }
}

/// Game loop timing overrides.
#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct GameLoopArg {
    /// Seconds to wait before looking for the board
    #[arg(long, default_value_t = 5.0)]
    pre_start_delay: f32,
    /// Seconds to wait after each jump
    #[arg(long, default_value_t = 0.5)]
    jump_cooldown: f32,
    /// Game-over similarity must exceed this value to end a game
    #[arg(long, default_value_t = 0.6)]
    game_over_threshold: f32,
}

impl GameLoopArg {
    pub(crate) fn config(&self, report: bool) -> anyhow::Result<GameLoopConfig> {
        let seconds = |name: &str, value: f32| {
            std::time::Duration::try_from_secs_f32(value)
                .map_err(|err| anyhow::anyhow!("invalid --{name} {value}: {err}"))
        };
        Ok(GameLoopConfig {
            pre_start_delay: seconds("pre-start-delay", self.pre_start_delay)?,
            jump_cooldown: seconds("jump-cooldown", self.jump_cooldown)?,
            game_over_threshold: self.game_over_threshold,
            report,
            ..GameLoopConfig::default()
        })
    }
}
