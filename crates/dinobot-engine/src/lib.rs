//! Board-level building blocks for the runner bot.
//!
//! This crate owns everything between the screen and the decision policy:
//!
//! - [`Frame`] - One grayscale capture of the board region
//! - [`ObstacleExtractor`] / [`ObstacleState`] - Reduce a frame to the nearest obstacle
//! - [`backend`] - The boundary traits the game loop drives: perception (frame capture,
//!   region location, game-over matching), input (key presses, cursor) and wall clock
//! - [`sim`] - A simulated runner board implementing the same traits over virtual time
//!
//! Screen capture, template correlation and OS input injection are not implemented here;
//! they live behind [`PerceptionSource`] and [`InputActuator`].
//!
//! # Example
//!
//! ```
//! use dinobot_engine::{Frame, ObstacleExtractor, ObstacleState};
//!
//! // Light background with a dark block in columns 3..7
//! let frame = Frame::from_fn(9, 4, |x, _y| if (3..7).contains(&x) { 2 } else { 10 });
//! let extractor = ObstacleExtractor::default();
//! assert_eq!(extractor.extract(&frame), ObstacleState::new(3, 4));
//! ```

pub use self::{backend::*, core::*};

pub mod backend;
pub mod core;
pub mod sim;
