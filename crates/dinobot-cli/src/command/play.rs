use dinobot_engine::{GameBackend, ObstacleExtractor};
use dinobot_evaluator::{
    cost_evaluator::CostEvaluator, game_loop::GameLoopController, policy::DecisionPolicy,
};
use dinobot_stats::descriptive::DescriptiveStats;

use crate::{
    backend::BoardArg,
    command::{GameLoopArg, PolicyArg},
};

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct PlayArg {
    #[clap(flatten)]
    policy: PolicyArg,
    #[clap(flatten)]
    board: BoardArg,
    #[clap(flatten)]
    game_loop: GameLoopArg,
    /// Number of games to play
    #[arg(long, default_value_t = 1)]
    games: usize,
    /// Play even if the policy fails the sanity checks
    #[arg(long, default_value_t = false)]
    skip_checks: bool,
}

pub(crate) fn run(arg: &PlayArg) -> anyhow::Result<()> {
    let PlayArg {
        policy,
        board,
        game_loop,
        games,
        skip_checks,
    } = arg;

    let mut rng = board.rng();
    let board = board.board(&mut rng)?;
    let policy = policy.policy(&mut rng)?;
    eprintln!("Policy: {} {:.3?}", policy.family(), policy.strategy());

    let controller =
        GameLoopController::new(board, ObstacleExtractor::default(), game_loop.config(true)?);
    let evaluator = CostEvaluator::new(controller, 1);
    if let Err(failure) = evaluator.sanity_check(&policy) {
        if !*skip_checks {
            anyhow::bail!("policy fails the sanity checks: {failure}");
        }
        log::warn!("policy fails the sanity checks: {failure}");
    }
    let mut controller = evaluator.into_controller();

    let scores = play_games(&mut controller, &policy, *games);

    if let Some(stats) = DescriptiveStats::new(scores) {
        eprintln!("Score Stats ({} games):", stats.count);
        eprintln!("  Min:  {:.2}", stats.min);
        eprintln!("  Max:  {:.2}", stats.max);
        eprintln!("  Mean: {:.2}", stats.mean);
        eprintln!("  Std:  {:.2}", stats.std_dev);
    }
    Ok(())
}

/// Plays `games` games in a row; a game whose board cannot be located scores 0.
fn play_games<B, P>(
    controller: &mut GameLoopController<B>,
    policy: &P,
    games: usize,
) -> Vec<f32>
where
    B: GameBackend,
    P: DecisionPolicy + ?Sized,
{
    (0..games)
        .map(|game| match controller.play(policy) {
            Ok(playthrough) => {
                eprintln!(
                    "Game #{game}: score {:.2}s, {} jumps, {} frames, {} restarts",
                    playthrough.score, playthrough.jumps, playthrough.frames, playthrough.restarts
                );
                playthrough.score
            }
            Err(err) => {
                log::warn!("game #{game}: {err}, scoring it as 0");
                0.0
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use dinobot_engine::sim::{SimConfig, SimulatedBoard};
    use dinobot_evaluator::{game_loop::GameLoopConfig, policy::ThresholdRule};
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;

    #[test]
    fn test_unlocatable_board_scores_zero() {
        let config = SimConfig {
            visible: false,
            ..SimConfig::default()
        };
        let board = SimulatedBoard::new(config, Pcg32::seed_from_u64(3)).unwrap();
        let mut controller = GameLoopController::new(
            board,
            ObstacleExtractor::default(),
            GameLoopConfig::default(),
        );
        let scores = play_games(&mut controller, &ThresholdRule::new(70.0), 2);
        assert_eq!(scores, vec![0.0, 0.0]);
        assert_eq!(controller.backend().counters().jumps, 0);
    }
}
