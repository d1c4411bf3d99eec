//! Cost evaluation: the objective the optimizer minimizes.
//!
//! ```text
//! cost = -(score₁ + score₂ + ... + scoreₙ) / n        n = num_runs
//! ```
//!
//! Lower is better: a policy surviving 40 s on average costs `-40.0`.
//!
//! # Sanity Checks
//!
//! A playthrough takes seconds to minutes of real time, so two behavioral checks run
//! before any game is played:
//!
//! 1. With no obstacle in view, the policy must not jump.
//! 2. With an obstacle at position 5 and width 1, the policy must jump.
//!
//! A policy failing either check costs exactly `0.0`, the score of a game that was never
//! played, and no playthrough is started. Both checks are evaluated at a score of one second.
//!
//! Playthroughs run with the controller's `report` flag off; it is restored afterwards.

use dinobot_engine::{GameBackend, ObstacleState};
use dinobot_stats::descriptive::DescriptiveStats;

use crate::{
    game_loop::GameLoopController,
    policy::{DecisionPolicy, JUMP_CONFIDENCE},
};

/// Obstacle state a sane policy must jump over.
pub const NEAR_OBSTACLE: ObstacleState = ObstacleState::new(5, 1);

/// Score the sanity checks are evaluated at.
pub const SANITY_CHECK_SCORE: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, derive_more::Display, derive_more::Error)]
pub enum SanityCheckFailure {
    #[display("jumps with no obstacle in view (confidence {confidence:.3})")]
    JumpsWithoutObstacle { confidence: f64 },
    #[display("does not jump over a near obstacle (confidence {confidence:.3})")]
    IgnoresNearObstacle { confidence: f64 },
}

/// Outcome of one cost evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CostSummary {
    pub cost: f32,
    /// Spread of the playthrough scores, `None` if nothing was played.
    pub scores: Option<DescriptiveStats>,
    /// Why the policy was rejected without playing.
    pub rejected: Option<SanityCheckFailure>,
}

/// Averages negated playthrough scores over several runs.
#[derive(Debug)]
pub struct CostEvaluator<B> {
    controller: GameLoopController<B>,
    num_runs: usize,
}

impl<B> CostEvaluator<B>
where
    B: GameBackend,
{
    /// Creates a cost evaluator.
    ///
    /// # Arguments
    /// * `controller` - Game loop used for every playthrough
    /// * `num_runs` - Playthroughs averaged per evaluation (at least one is played)
    pub fn new(controller: GameLoopController<B>, num_runs: usize) -> Self {
        Self {
            controller,
            num_runs: num_runs.max(1),
        }
    }

    #[must_use]
    pub fn controller(&self) -> &GameLoopController<B> {
        &self.controller
    }

    pub fn into_controller(self) -> GameLoopController<B> {
        self.controller
    }

    #[must_use]
    pub fn num_runs(&self) -> usize {
        self.num_runs
    }

    /// Runs both pre-flight checks without playing.
    pub fn sanity_check<P>(&self, policy: &P) -> Result<(), SanityCheckFailure>
    where
        P: DecisionPolicy + ?Sized,
    {
        let empty = self.controller.extractor().empty_state;
        let confidence = policy.decide(empty, SANITY_CHECK_SCORE);
        if confidence.is_nan() || confidence >= JUMP_CONFIDENCE {
            return Err(SanityCheckFailure::JumpsWithoutObstacle { confidence });
        }

        let confidence = policy.decide(NEAR_OBSTACLE, SANITY_CHECK_SCORE);
        if confidence.is_nan() || confidence < JUMP_CONFIDENCE {
            return Err(SanityCheckFailure::IgnoresNearObstacle { confidence });
        }
        Ok(())
    }

    /// Returns the cost of `policy`; lower is better.
    pub fn evaluate<P>(&mut self, policy: &P) -> f32
    where
        P: DecisionPolicy + ?Sized,
    {
        self.evaluate_detailed(policy).cost
    }

    /// Returns the cost of `policy` together with the per-run score spread.
    #[expect(clippy::cast_precision_loss)]
    pub fn evaluate_detailed<P>(&mut self, policy: &P) -> CostSummary
    where
        P: DecisionPolicy + ?Sized,
    {
        if let Err(failure) = self.sanity_check(policy) {
            log::debug!("policy rejected without playing: {failure}");
            return CostSummary {
                cost: 0.0,
                scores: None,
                rejected: Some(failure),
            };
        }

        let report = self.controller.config().report;
        self.controller.set_report(false);
        let scores = (0..self.num_runs)
            .map(|_| self.controller.play_score(policy))
            .collect::<Vec<_>>();
        self.controller.set_report(report);
        let cost = -scores.iter().sum::<f32>() / self.num_runs as f32;
        let scores = DescriptiveStats::new(scores);
        if let Some(stats) = &scores {
            log::debug!(
                "cost {cost:.3} over {} runs (min {:.1}, max {:.1}, std {:.2})",
                stats.count,
                stats.min,
                stats.max,
                stats.std_dev
            );
        }

        CostSummary {
            cost,
            scores,
            rejected: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use dinobot_engine::{Clock, Frame, InputActuator, Key, ObstacleExtractor, PerceptionSource, Region};

    use super::*;
    use crate::{
        game_loop::GameLoopConfig,
        policy::{LinearLogistic, Policy, PolicyFamily, ThresholdRule},
    };

    /// Backend where every game lasts a fixed number of frames.
    #[derive(Debug)]
    struct FixedLengthGames {
        frames_per_game: Vec<usize>,
        game: usize,
        frame: usize,
        now: Duration,
        located: usize,
    }

    impl FixedLengthGames {
        fn new(frames_per_game: Vec<usize>) -> Self {
            Self {
                frames_per_game,
                game: 0,
                frame: 0,
                now: Duration::ZERO,
                located: 0,
            }
        }
    }

    impl PerceptionSource for FixedLengthGames {
        fn locate_region_of_interest(&mut self) -> Option<Region> {
            self.located += 1;
            Some(Region::new(0, 0, 20, 4))
        }

        fn capture_frame(&mut self, _region: Region) -> Frame {
            self.now += Duration::from_secs(1);
            self.frame += 1;
            Frame::filled(20, 4, 200)
        }

        fn game_over_similarity(&mut self, _frame: &Frame) -> f32 {
            if self.frame >= self.frames_per_game[self.game] {
                1.0
            } else {
                0.0
            }
        }
    }

    impl InputActuator for FixedLengthGames {
        fn press_key(&mut self, _key: Key) {}

        fn press_combo(&mut self, _keys: &[Key]) {
            self.game += 1;
            self.frame = 0;
        }

        fn move_cursor_to(&mut self, _x: i32, _y: i32) {}

        fn click(&mut self) {}
    }

    impl Clock for FixedLengthGames {
        fn now(&self) -> Duration {
            self.now
        }

        fn sleep(&mut self, duration: Duration) {
            self.now += duration;
        }
    }

    fn evaluator(frames_per_game: Vec<usize>, num_runs: usize) -> CostEvaluator<FixedLengthGames> {
        let config = GameLoopConfig {
            report: false,
            ..GameLoopConfig::default()
        };
        let controller = GameLoopController::new(
            FixedLengthGames::new(frames_per_game),
            ObstacleExtractor::default(),
            config,
        );
        CostEvaluator::new(controller, num_runs)
    }

    #[test]
    fn test_cost_is_negated_mean_score() {
        let mut evaluator = evaluator(vec![3, 6, 9], 3);
        let summary = evaluator.evaluate_detailed(&ThresholdRule::new(60.0));

        assert!((summary.cost + 6.0).abs() < 1e-5);
        assert_eq!(summary.rejected, None);
        let scores = summary.scores.unwrap();
        assert_eq!(scores.count, 3);
        assert!((scores.min - 3.0).abs() < 1e-5);
        assert!((scores.max - 9.0).abs() < 1e-5);
        assert_eq!(evaluator.controller().backend().located, 3);
    }

    #[test]
    fn test_jumping_on_empty_board_costs_zero_without_playing() {
        let mut evaluator = evaluator(vec![5], 3);
        for policy in [ThresholdRule::new(600.0), ThresholdRule::new(1000.0)] {
            assert_eq!(evaluator.evaluate(&policy), 0.0);
        }
        let logistic = LinearLogistic::new(&[1.0]).unwrap();
        assert_eq!(evaluator.evaluate(&logistic), 0.0);
        assert_eq!(evaluator.controller().backend().located, 0);
    }

    #[test]
    fn test_ignoring_near_obstacle_costs_zero_without_playing() {
        let mut evaluator = evaluator(vec![5], 3);
        let summary = evaluator.evaluate_detailed(&ThresholdRule::new(4.0));
        assert_eq!(summary.cost, 0.0);
        assert!(summary.scores.is_none());
        assert!(matches!(
            summary.rejected,
            Some(SanityCheckFailure::IgnoresNearObstacle { .. })
        ));

        let logistic = LinearLogistic::new(&[-1.0]).unwrap();
        assert_eq!(evaluator.evaluate(&logistic), 0.0);
        assert_eq!(evaluator.controller().backend().located, 0);
    }

    #[test]
    fn test_sanity_check_boundaries() {
        let evaluator = evaluator(vec![], 1);
        assert!(evaluator.sanity_check(&ThresholdRule::new(5.0)).is_ok());
        assert!(evaluator.sanity_check(&ThresholdRule::new(599.5)).is_ok());

        // Confidence exactly 0.5 on the empty board counts as jumping.
        let on_the_fence = Policy::from_strategy(PolicyFamily::Logistic, &[0.0]).unwrap();
        assert_eq!(
            evaluator.sanity_check(&on_the_fence),
            Err(SanityCheckFailure::JumpsWithoutObstacle { confidence: 0.5 })
        );

        let hand_tuned =
            Policy::from_strategy(PolicyFamily::Logistic, &[74.8, -0.8, -0.95, 0.95]).unwrap();
        assert!(evaluator.sanity_check(&hand_tuned).is_ok());
    }

    #[test]
    fn test_nan_confidence_costs_zero_without_playing() {
        let mut evaluator = evaluator(vec![5], 3);
        let nan_bias = Policy::from_strategy(PolicyFamily::Logistic, &[f32::NAN]).unwrap();
        let summary = evaluator.evaluate_detailed(&nan_bias);
        assert_eq!(summary.cost, 0.0);
        assert!(matches!(
            summary.rejected,
            Some(SanityCheckFailure::JumpsWithoutObstacle { confidence }) if confidence.is_nan()
        ));

        // An infinite weight on an always-zero feature gives `inf * 0 = NaN`.
        let infinite_slot =
            Policy::from_strategy(PolicyFamily::Logistic, &[0.0, 0.0, 0.0, 0.0, f32::INFINITY])
                .unwrap();
        assert_eq!(evaluator.evaluate(&infinite_slot), 0.0);
        assert_eq!(evaluator.controller().backend().located, 0);
    }

    #[test]
    fn test_at_least_one_run() {
        let mut evaluator = evaluator(vec![4], 0);
        assert_eq!(evaluator.num_runs(), 1);
        assert!((evaluator.evaluate(&ThresholdRule::new(60.0)) + 4.0).abs() < 1e-5);
    }
}
