use std::path::PathBuf;

use chrono::Utc;
use dinobot_engine::ObstacleExtractor;
use dinobot_evaluator::{cost_evaluator::CostEvaluator, game_loop::GameLoopController};
use dinobot_training::{
    checkpoint::NoCheckpoint,
    objective::{Objective as _, PolicyObjective},
    spsa::{SpsaOptimizer, SpsaParams},
};

use crate::{
    backend::BoardArg,
    command::{GameLoopArg, PolicyArg},
    model::{checkpoint_file::CheckpointFile, strategy_model::StrategyModel},
    util::Output,
};

const DEFAULT: SpsaParams = SpsaParams::DEFAULT;

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct TrainArg {
    #[clap(flatten)]
    policy: PolicyArg,
    #[clap(flatten)]
    board: BoardArg,
    #[clap(flatten)]
    game_loop: GameLoopArg,
    /// Games averaged per cost evaluation
    #[arg(long, default_value_t = 3)]
    runs: usize,
    /// SPSA iterations
    #[arg(long, default_value_t = DEFAULT.max_iter)]
    max_iter: usize,
    /// Evaluate, log and checkpoint every this many iterations (0 disables)
    #[arg(long, default_value_t = DEFAULT.report)]
    report: usize,
    /// Step size numerator
    #[arg(long, default_value_t = DEFAULT.a)]
    a: f32,
    /// Step size decay exponent
    #[arg(long, default_value_t = DEFAULT.alpha)]
    alpha: f32,
    /// Perturbation size numerator
    #[arg(long, default_value_t = DEFAULT.c)]
    c: f32,
    /// Perturbation size decay exponent
    #[arg(long, default_value_t = DEFAULT.gamma)]
    gamma: f32,
    /// Stability constant (defaults to 5% of --max-iter)
    #[arg(long)]
    big_a: Option<f32>,
    /// Directory for checkpoints; none are written when omitted
    #[arg(long)]
    checkpoint_dir: Option<PathBuf>,
    /// Run name, used as the checkpoint file name (defaults to the policy family)
    #[arg(long)]
    name: Option<String>,
    /// Output file path (defaults to the family's file in the models directory)
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &TrainArg) -> anyhow::Result<()> {
    let TrainArg {
        policy,
        board,
        game_loop,
        runs,
        max_iter,
        report,
        a,
        alpha,
        c,
        gamma,
        big_a,
        checkpoint_dir,
        name,
        output,
    } = arg;

    let family = policy.family();
    let mut rng = board.rng();
    let board = board.board(&mut rng)?;
    let initial = policy.policy(&mut rng)?;
    eprintln!("Initial {family} strategy: {:.3?}", initial.strategy());

    let controller =
        GameLoopController::new(board, ObstacleExtractor::default(), game_loop.config(false)?);
    let mut objective = PolicyObjective::new(family, CostEvaluator::new(controller, *runs));

    let params = SpsaParams {
        a: *a,
        alpha: *alpha,
        c: *c,
        gamma: *gamma,
        big_a: *big_a,
        max_iter: *max_iter,
        report: *report,
    };
    eprintln!(
        "SPSA: {max_iter} iterations, A = {:.1}, {runs} games per evaluation",
        params.stability_constant()
    );
    let optimizer = SpsaOptimizer::new(params);
    let theta = initial.strategy().to_vec();
    let result = match checkpoint_dir {
        Some(dir) => {
            let name = name.clone().unwrap_or_else(|| family.to_string());
            let mut sink = CheckpointFile::new(dir, &name);
            eprintln!("Checkpoints: {}", sink.path().display());
            optimizer.minimize(theta, &mut objective, &mut rng, &mut sink)
        }
        None => optimizer.minimize(theta, &mut objective, &mut rng, &mut NoCheckpoint),
    };

    eprintln!("Training completed ({} cost evaluations)", objective.evaluations());
    eprintln!("  Cost history: {:.3?}", result.costs);

    let final_cost = objective.cost(&result.theta);
    let model = StrategyModel {
        family,
        trained_at: Utc::now(),
        final_cost,
        strategy: result.theta,
    };
    let output = output
        .clone()
        .unwrap_or_else(|| policy.models().model_path(family));
    Output::save_json(&model, Some(output.clone()))?;

    eprintln!();
    eprintln!("Model saved successfully");
    eprintln!("  Path: {}", output.display());
    eprintln!("  Family: {}", model.family);
    eprintln!("  Trained at: {}", model.trained_at);
    eprintln!("  Final cost: {:.3}", model.final_cost);
    eprintln!("  Strategy: {:.3?}", model.strategy);

    Ok(())
}
