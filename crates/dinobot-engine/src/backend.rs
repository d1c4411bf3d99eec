//! Boundary traits between the game loop and the outside world.
//!
//! The game loop never touches the screen, the keyboard or the wall clock directly.
//! It drives a [`GameBackend`], which is any type implementing all three of:
//!
//! - [`PerceptionSource`] - locates the board region, captures frames, scores how closely a
//!   frame matches the "game over" banner
//! - [`InputActuator`] - injects key presses, key combinations and cursor events
//! - [`Clock`] - reads elapsed time and performs blocking pauses
//!
//! A desktop backend wires these to screen capture, template matching and OS input
//! injection. [`SimulatedBoard`](crate::sim::SimulatedBoard) implements them over virtual
//! time, and tests implement them with scripted frames.

use std::{
    thread,
    time::{Duration, Instant},
};

use serde::{Deserialize, Serialize};

use crate::Frame;

/// A key the actuator can press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Space,
    Ctrl,
    Char(char),
}

impl Key {
    /// Starts the game and makes the runner jump.
    pub const JUMP: Self = Self::Space;
    /// Reloads the page after a game over.
    pub const RESTART_COMBO: [Self; 2] = [Self::Ctrl, Self::Char('r')];
}

/// Screen rectangle in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Region {
    pub top: i32,
    pub left: i32,
    pub width: i32,
    pub height: i32,
}

impl Region {
    #[must_use]
    pub const fn new(top: i32, left: i32, width: i32, height: i32) -> Self {
        Self {
            top,
            left,
            width,
            height,
        }
    }

    /// Derives the board region from where the runner marker was found.
    ///
    /// The board starts half a marker width in front of the marker (the runner moves
    /// forward during the start animation), spans the rest of the board to the right, and is
    /// twice the marker height tall, ending at the marker's bottom edge.
    ///
    /// # Arguments
    ///
    /// * `marker` - Matched location and size of the runner template
    /// * `board_width` - Width of the whole board template
    #[must_use]
    pub const fn from_marker(marker: Region, board_width: i32) -> Self {
        Self {
            top: marker.top - marker.height,
            left: marker.left + marker.width * 3 / 2,
            width: board_width - marker.width,
            height: 2 * marker.height,
        }
    }

    /// Returns the `(x, y)` center point.
    #[must_use]
    pub const fn center(&self) -> (i32, i32) {
        (self.left + self.width / 2, self.top + self.height / 2)
    }
}

/// Produces frames of the board and the geometry of the board itself.
pub trait PerceptionSource {
    /// Locates the playable board on screen, `None` if it cannot be found.
    fn locate_region_of_interest(&mut self) -> Option<Region>;

    /// Captures a grayscale frame of `region`.
    fn capture_frame(&mut self, region: Region) -> Frame;

    /// Returns how closely `frame` matches the "game over" reference image.
    ///
    /// The value is a normalized correlation score, typically in `[0.0, 1.0]`.
    fn game_over_similarity(&mut self, frame: &Frame) -> f32;
}

/// Injects input events into the game.
pub trait InputActuator {
    fn press_key(&mut self, key: Key);

    /// Presses `keys` together and releases them in reverse order.
    fn press_combo(&mut self, keys: &[Key]);

    fn move_cursor_to(&mut self, x: i32, y: i32);

    fn click(&mut self);
}

/// Monotonic time source with blocking pauses.
pub trait Clock {
    /// Time elapsed since an arbitrary fixed origin.
    fn now(&self) -> Duration;

    /// Blocks for `duration`.
    fn sleep(&mut self, duration: Duration);
}

/// Everything the game loop needs from its environment.
pub trait GameBackend: PerceptionSource + InputActuator + Clock {}

impl<T> GameBackend for T where T: PerceptionSource + InputActuator + Clock + ?Sized {}

/// [`Clock`] backed by [`Instant`] and [`thread::sleep`].
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemClock {
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn sleep(&mut self, duration: Duration) {
        thread::sleep(duration);
    }
}
