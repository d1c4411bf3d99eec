//! Training system for tuning policy strategy vectors with SPSA.
//!
//! A playthrough lasts seconds to minutes of real time and its score is noisy, so the
//! optimizer must get by with as few cost evaluations as possible and no gradient.
//! Simultaneous Perturbation Stochastic Approximation needs exactly two evaluations per
//! iteration, however many parameters the strategy has.
//!
//! # How Training Works
//!
//! 1. **Perturb** - Draw a random ±1 direction and evaluate the cost on both sides of theta
//! 2. **Estimate** - Turn the cost difference into a gradient estimate for every component
//! 3. **Step** - Move theta against the estimate with a decaying step size
//! 4. **Report** - Every `report` iterations, evaluate theta itself, log it and checkpoint
//! 5. **Repeat** - Until the iteration budget is spent; there is no convergence test
//!
//! # Architecture
//!
//! ```text
//! SPSA Optimizer (spsa)
//!     ↓ minimizes
//! Objective (objective)
//!     ↓ builds a policy per theta, scored by
//! Cost Evaluator (dinobot-evaluator)
//!     ↓ plays on
//! Game Backend (dinobot-engine)
//! ```
//!
//! Progress is persisted through a [`CheckpointSink`](checkpoint::CheckpointSink); the
//! optimizer itself never touches the filesystem.
//!
//! # Example
//!
//! ```rust
//! use dinobot_training::{
//!     checkpoint::NoCheckpoint,
//!     spsa::{SpsaOptimizer, SpsaParams},
//! };
//! use rand::SeedableRng as _;
//!
//! let params = SpsaParams {
//!     a: 0.2,
//!     c: 0.1,
//!     max_iter: 500,
//!     report: 0,
//!     ..SpsaParams::default()
//! };
//! let mut rng = rand::rngs::StdRng::seed_from_u64(0);
//! let mut cost = |theta: &[f32]| (theta[0] - 3.0).powi(2);
//! let result = SpsaOptimizer::new(params).minimize(vec![0.0], &mut cost, &mut rng, &mut NoCheckpoint);
//! assert!((result.theta[0] - 3.0).abs() < 0.01);
//! ```
//!
//! # Current Limitations
//!
//! - **No early stopping**: The caller inspects the cost history instead
//! - **No bounds**: Theta may wander into regions every policy rejects, where the cost is a
//!   flat zero and the gradient estimate vanishes
//! - **Sequential**: The two evaluations of an iteration run one after the other

pub mod checkpoint;
pub mod objective;
pub mod spsa;
pub mod theta;
