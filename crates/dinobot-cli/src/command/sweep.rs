use std::path::PathBuf;

use dinobot_engine::ObstacleExtractor;
use dinobot_evaluator::{
    cost_evaluator::CostEvaluator, game_loop::GameLoopController, policy::ThresholdRule,
};
use dinobot_stats::descriptive::DescriptiveStats;
use serde::Serialize;

use crate::{backend::BoardArg, command::GameLoopArg, util::Output};

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct SweepArg {
    #[clap(flatten)]
    board: BoardArg,
    #[clap(flatten)]
    game_loop: GameLoopArg,
    /// First threshold
    #[arg(long, default_value_t = 60)]
    from: u16,
    /// Last threshold (inclusive)
    #[arg(long, default_value_t = 80)]
    to: u16,
    /// Threshold increment
    #[arg(long, default_value_t = 1)]
    step: u16,
    /// Games played per threshold
    #[arg(long, default_value_t = 20)]
    runs: usize,
    /// Output file path (stdout when omitted)
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, Serialize)]
struct SweepPoint {
    threshold: u16,
    score: f32,
}

#[derive(Debug, Clone, Copy, Serialize)]
struct ThresholdSummary {
    threshold: u16,
    min: f32,
    max: f32,
    mean: f32,
    std_dev: f32,
}

#[derive(Debug, Serialize)]
struct SweepReport {
    points: Vec<SweepPoint>,
    summary: Vec<ThresholdSummary>,
}

pub(crate) fn run(arg: &SweepArg) -> anyhow::Result<()> {
    let SweepArg {
        board,
        game_loop,
        from,
        to,
        step,
        runs,
        output,
    } = arg;
    anyhow::ensure!(*step > 0, "--step must be positive");
    anyhow::ensure!(from <= to, "--from must not exceed --to");

    let mut rng = board.rng();
    let board = board.board(&mut rng)?;
    let controller =
        GameLoopController::new(board, ObstacleExtractor::default(), game_loop.config(false)?);
    let mut evaluator = CostEvaluator::new(controller, 1);

    let mut points = vec![];
    let mut summary = vec![];
    for threshold in (*from..=*to).step_by(usize::from(*step)) {
        let policy = ThresholdRule::new(f32::from(threshold));
        let scores = (0..*runs)
            .map(|_| -evaluator.evaluate(&policy))
            .collect::<Vec<_>>();
        points.extend(scores.iter().map(|&score| SweepPoint { threshold, score }));

        let Some(stats) = DescriptiveStats::new(scores) else {
            continue;
        };
        eprintln!(
            "Threshold {threshold:3}: mean {:7.2}  std {:6.2}  min {:7.2}  max {:7.2}",
            stats.mean, stats.std_dev, stats.min, stats.max
        );
        summary.push(ThresholdSummary {
            threshold,
            min: stats.min,
            max: stats.max,
            mean: stats.mean,
            std_dev: stats.std_dev,
        });
    }

    if let Some(best) = summary.iter().max_by(|a, b| a.mean.total_cmp(&b.mean)) {
        eprintln!(
            "Best threshold: {} (mean score {:.2})",
            best.threshold, best.mean
        );
    }

    Output::save_json(&SweepReport { points, summary }, output.clone())?;
    Ok(())
}
