//! Objectives: what the optimizer minimizes.
//!
//! The optimizer only sees parameter vectors and scalar costs. [`PolicyObjective`] bridges
//! that to policies: every candidate vector becomes a fresh policy of a fixed family, which
//! is then scored by a [`CostEvaluator`]. The policy a playthrough uses is never mutated
//! while the game runs.
//!
//! Closures `FnMut(&[f32]) -> f32` are objectives too, which is what tests use.

use dinobot_engine::GameBackend;
use dinobot_evaluator::{
    cost_evaluator::CostEvaluator,
    policy::{Policy, PolicyFamily},
};

/// A scalar function of a parameter vector; lower is better.
pub trait Objective {
    fn cost(&mut self, theta: &[f32]) -> f32;
}

impl<F> Objective for F
where
    F: FnMut(&[f32]) -> f32,
{
    fn cost(&mut self, theta: &[f32]) -> f32 {
        self(theta)
    }
}

/// Scores strategy vectors by playing with a policy of one family.
#[derive(Debug)]
pub struct PolicyObjective<B> {
    family: PolicyFamily,
    evaluator: CostEvaluator<B>,
    evaluations: usize,
}

impl<B> PolicyObjective<B>
where
    B: GameBackend,
{
    pub fn new(family: PolicyFamily, evaluator: CostEvaluator<B>) -> Self {
        Self {
            family,
            evaluator,
            evaluations: 0,
        }
    }

    #[must_use]
    pub fn family(&self) -> PolicyFamily {
        self.family
    }

    #[must_use]
    pub fn evaluator(&self) -> &CostEvaluator<B> {
        &self.evaluator
    }

    pub fn into_evaluator(self) -> CostEvaluator<B> {
        self.evaluator
    }

    /// Number of cost evaluations requested so far.
    #[must_use]
    pub fn evaluations(&self) -> usize {
        self.evaluations
    }
}

impl<B> Objective for PolicyObjective<B>
where
    B: GameBackend,
{
    fn cost(&mut self, theta: &[f32]) -> f32 {
        self.evaluations += 1;
        match Policy::from_strategy(self.family, theta) {
            Ok(policy) => self.evaluator.evaluate(&policy),
            Err(err) => {
                log::warn!("{err}, costing it as 0");
                0.0
            }
        }
    }
}
