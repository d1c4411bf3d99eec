//! Decision policies and the machinery that scores them by playing.
//!
//! This crate implements three levels, each built on the one before:
//!
//! 1. **Decision** ([`policy`]) - Maps the nearest obstacle and the elapsed score to a jump
//!    confidence in `[0.0, 1.0]`. Two families exist: a hard threshold on the obstacle's
//!    position, and a logistic regression over `[1, position, width, score]`.
//!
//! 2. **Playthrough** ([`game_loop`]) - Plays one full game: locate the board, start the game,
//!    poll frames, ask the policy, press jump, detect a frozen board and restart, detect game
//!    over and report the survival time.
//!
//! 3. **Cost** ([`cost_evaluator`]) - Turns a policy into the scalar an optimizer minimizes:
//!    the negated mean survival time over several playthroughs, after two cheap behavioral
//!    checks that reject obviously broken policies without playing.
//!
//! # Architecture
//!
//! ```text
//! Cost Evaluator (negated mean score)
//!     ↓ plays through
//! Game Loop Controller (one game, with restarts)
//!     ↓ asks
//! Decision Policy (jump confidence per frame)
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use dinobot_engine::{
//!     ObstacleExtractor,
//!     sim::{SimConfig, SimulatedBoard},
//! };
//! use dinobot_evaluator::{
//!     cost_evaluator::CostEvaluator,
//!     game_loop::{GameLoopConfig, GameLoopController},
//!     policy::{Policy, PolicyFamily},
//! };
//!
//! let board = SimulatedBoard::new(SimConfig::default(), rand::rng()).unwrap();
//! let controller =
//!     GameLoopController::new(board, ObstacleExtractor::default(), GameLoopConfig::default());
//! let mut evaluator = CostEvaluator::new(controller, 3);
//!
//! let policy = Policy::from_strategy(PolicyFamily::Threshold, &[70.0]).unwrap();
//! let cost = evaluator.evaluate(&policy);
//! println!("cost: {cost:.2}");
//! ```

pub mod cost_evaluator;
pub mod game_loop;
pub mod policy;
