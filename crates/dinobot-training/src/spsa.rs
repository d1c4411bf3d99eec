//! Simultaneous Perturbation Stochastic Approximation.
//!
//! SPSA minimizes a noisy scalar function of a real vector using two evaluations per
//! iteration, independent of the number of parameters.
//!
//! # Iteration
//!
//! For iteration `n` (zero-based):
//!
//! ```text
//! aₙ = a / (n + 1 + A)^α          step size
//! cₙ = c / (n + 1)^γ              perturbation size
//! Δ  ∈ {+1, -1}ᵈ                  uniform, independent per component
//! y⁺ = cost(θ + cₙΔ)
//! y⁻ = cost(θ - cₙΔ)
//! gᵢ = (y⁺ - y⁻) / (2 cₙ Δᵢ)
//! θ  ← θ - aₙ g
//! ```
//!
//! The stability constant `A` defaults to 5% of `max_iter`. With `α, γ > 0` both
//! schedules are strictly decreasing.
//!
//! # Reporting
//!
//! When `report > 0`, after every iteration `n > 0` with `n % report == 0` the updated theta
//! is evaluated once more. That cost is appended to the cost history, logged, and a
//! [`Checkpoint`] is handed to the sink. The extra evaluation is diagnostic only and does
//! not feed the gradient.
//!
//! # Termination
//!
//! The optimizer runs exactly `max_iter` iterations. There is no convergence test.

use rand::Rng;

use crate::{
    checkpoint::{Checkpoint, CheckpointSink},
    objective::Objective,
    theta,
};

/// SPSA gain schedule and budget.
#[derive(Debug, Clone, PartialEq)]
pub struct SpsaParams {
    /// Step size numerator
    pub a: f32,
    /// Step size decay exponent
    pub alpha: f32,
    /// Perturbation size numerator
    pub c: f32,
    /// Perturbation size decay exponent
    pub gamma: f32,
    /// Stability constant `A`; `None` means 5% of `max_iter`
    pub big_a: Option<f32>,
    /// Number of iterations
    pub max_iter: usize,
    /// Reporting cadence in iterations; 0 disables reporting
    pub report: usize,
}

impl Default for SpsaParams {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl SpsaParams {
    pub const DEFAULT: Self = Self {
        a: 5.0,
        alpha: 0.602,
        c: 20.0,
        gamma: 0.101,
        big_a: None,
        max_iter: 1000,
        report: 10,
    };

    /// Stability constant `A` in effect.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn stability_constant(&self) -> f32 {
        self.big_a.unwrap_or(0.05 * self.max_iter as f32)
    }

    /// Step size `aₙ` for iteration `n`.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn step_size(&self, n: usize) -> f32 {
        self.a / (n as f32 + 1.0 + self.stability_constant()).powf(self.alpha)
    }

    /// Perturbation size `cₙ` for iteration `n`.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn perturbation_size(&self, n: usize) -> f32 {
        self.c / (n as f32 + 1.0).powf(self.gamma)
    }

    fn is_report_iteration(&self, n: usize) -> bool {
        self.report > 0 && n > 0 && n.is_multiple_of(self.report)
    }
}

/// Output of [`SpsaOptimizer::minimize`].
#[derive(Debug, Clone, PartialEq)]
pub struct SpsaResult {
    /// Final parameters.
    pub theta: Vec<f32>,
    /// Cost of theta at every reporting iteration.
    pub costs: Vec<f32>,
    /// Theta at the start of every iteration.
    pub thetas: Vec<Vec<f32>>,
}

#[derive(Debug, Clone)]
pub struct SpsaOptimizer {
    params: SpsaParams,
}

impl SpsaOptimizer {
    #[must_use]
    pub fn new(params: SpsaParams) -> Self {
        Self { params }
    }

    #[must_use]
    pub fn params(&self) -> &SpsaParams {
        &self.params
    }

    /// Minimizes `objective` starting from `theta`.
    ///
    /// # Arguments
    ///
    /// * `theta` - Initial parameters
    /// * `objective` - Function to minimize; called twice per iteration plus once per report
    /// * `rng` - Source of perturbation directions
    /// * `sink` - Receives a checkpoint at every reporting iteration
    pub fn minimize<O, R, S>(
        &self,
        mut theta: Vec<f32>,
        objective: &mut O,
        rng: &mut R,
        sink: &mut S,
    ) -> SpsaResult
    where
        O: Objective + ?Sized,
        R: Rng + ?Sized,
        S: CheckpointSink + ?Sized,
    {
        let params = &self.params;
        let mut costs = vec![];
        let mut thetas = Vec::with_capacity(params.max_iter);

        for n in 0..params.max_iter {
            let a_n = params.step_size(n);
            let c_n = params.perturbation_size(n);
            let delta = theta::perturbation(rng, theta.len());

            let cost_plus = objective.cost(&theta::offset(&theta, &delta, c_n));
            let cost_minus = objective.cost(&theta::offset(&theta, &delta, -c_n));
            let gradient = theta::gradient_estimate(cost_plus, cost_minus, c_n, &delta);

            thetas.push(theta.clone());
            theta::descend(&mut theta, &gradient, a_n);

            if params.is_report_iteration(n) {
                let cost = objective.cost(&theta);
                costs.push(cost);
                log::info!("iteration {n}: cost {cost:.3}, theta {theta:?}");

                let checkpoint = Checkpoint {
                    iteration: n,
                    theta: &theta,
                    costs: &costs,
                    thetas: &thetas,
                };
                if let Err(err) = sink.save(&checkpoint) {
                    log::warn!("failed to save checkpoint at iteration {n}: {err}");
                }
            }
        }

        SpsaResult {
            theta,
            costs,
            thetas,
        }
    }
}
