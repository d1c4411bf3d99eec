//! Simulated runner board for offline play and tests.
//!
//! [`SimulatedBoard`] implements every [`GameBackend`](crate::GameBackend) trait over virtual
//! time, so a full playthrough that would take minutes on screen runs in a fraction of a
//! second and is reproducible from the RNG seed.
//!
//! # Model
//!
//! - The runner stands still just left of the board region; obstacles spawn at the right edge
//!   and scroll left at `base_speed + acceleration * t` pixels per second (capped at
//!   `max_speed`).
//! - A jump key press while grounded keeps the runner airborne for `jump_duration` seconds.
//! - An obstacle overlapping the runner's columns while it is grounded ends the game.
//! - The first jump key press starts the game, unless it is ignored with probability
//!   `start_ignore_probability`: the board then stays frozen until the page is reloaded,
//!   which is exactly the condition the game loop's stuck detection exists for.
//! - Every frame capture advances time by `frame_interval`, standing in for capture latency.

use std::{collections::VecDeque, time::Duration};

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{Clock, Frame, InputActuator, Key, PerceptionSource, Region};

/// Geometry and physics of the simulated board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Screen location and size of the runner marker.
    pub marker: Region,
    /// Width of the whole board, marker included.
    pub board_width: i32,
    /// Whether [`PerceptionSource::locate_region_of_interest`] can find the board.
    pub visible: bool,
    pub background_shade: u8,
    pub obstacle_shade: u8,
    /// Height of obstacles in pixels, measured from the bottom of the board region.
    pub obstacle_height: i32,
    pub min_obstacle_width: f32,
    pub max_obstacle_width: f32,
    /// Range of free space between one obstacle's right edge and the next one's left edge.
    pub min_obstacle_gap: f32,
    pub max_obstacle_gap: f32,
    /// Scroll speed at the start of a game, in pixels per second.
    pub base_speed: f32,
    /// Scroll speed increase per second of play.
    pub acceleration: f32,
    pub max_speed: f32,
    /// Seconds the runner stays airborne after a jump.
    pub jump_duration: f32,
    /// Virtual seconds that pass while a frame is captured.
    pub frame_interval: f32,
    /// Integration step in seconds.
    pub physics_step: f32,
    /// Probability that the key press meant to start the game is lost.
    pub start_ignore_probability: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            marker: Region::new(200, 40, 40, 15),
            board_width: 640,
            visible: true,
            background_shade: 247,
            obstacle_shade: 83,
            obstacle_height: 20,
            min_obstacle_width: 15.0,
            max_obstacle_width: 50.0,
            min_obstacle_gap: 180.0,
            max_obstacle_gap: 600.0,
            base_speed: 300.0,
            acceleration: 4.0,
            max_speed: 1000.0,
            jump_duration: 0.6,
            frame_interval: 1.0 / 30.0,
            physics_step: 0.005,
            start_ignore_probability: 0.0,
        }
    }
}

/// A [`SimConfig`] value the simulation cannot run with.
#[derive(
    Debug, Clone, Copy, PartialEq, derive_more::Display, derive_more::Error, derive_more::IsVariant,
)]
pub enum SimConfigError {
    #[display("obstacle width range {min}..={max} must be finite, non-negative and non-empty")]
    ObstacleWidth { min: f32, max: f32 },
    #[display("obstacle gap range {min}..={max} must be finite, non-negative and non-empty")]
    ObstacleGap { min: f32, max: f32 },
    #[display("start ignore probability {probability} is outside [0, 1]")]
    StartIgnoreProbability { probability: f64 },
    #[display("frame interval {seconds} is not a finite non-negative number of seconds")]
    FrameInterval { seconds: f32 },
}

impl SimConfig {
    /// Checks every value that obstacle sampling and frame timing depend on.
    pub fn validate(&self) -> Result<(), SimConfigError> {
        let valid_range =
            |min: f32, max: f32| min.is_finite() && max.is_finite() && 0.0 <= min && min <= max;
        if !valid_range(self.min_obstacle_width, self.max_obstacle_width) {
            return Err(SimConfigError::ObstacleWidth {
                min: self.min_obstacle_width,
                max: self.max_obstacle_width,
            });
        }
        if !valid_range(self.min_obstacle_gap, self.max_obstacle_gap) {
            return Err(SimConfigError::ObstacleGap {
                min: self.min_obstacle_gap,
                max: self.max_obstacle_gap,
            });
        }
        if !(0.0..=1.0).contains(&self.start_ignore_probability) {
            return Err(SimConfigError::StartIgnoreProbability {
                probability: self.start_ignore_probability,
            });
        }
        if !(self.frame_interval.is_finite() && self.frame_interval >= 0.0) {
            return Err(SimConfigError::FrameInterval {
                seconds: self.frame_interval,
            });
        }
        Ok(())
    }

    /// Board region derived from the marker, as a real perception source would report it.
    #[must_use]
    pub fn region(&self) -> Region {
        Region::from_marker(self.marker, self.board_width)
    }

    /// Runner's horizontal span `(left, right)` relative to the board region's left edge.
    #[expect(clippy::cast_precision_loss)]
    fn runner_span(&self) -> (f32, f32) {
        let left = (self.marker.left - self.region().left) as f32;
        (left, left + self.marker.width as f32)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum SimPhase {
    /// Waiting for the start key press.
    Idle,
    Running,
    Crashed,
}

#[derive(Debug, Clone, Copy)]
struct SimObstacle {
    x: f32,
    width: f32,
}

/// Input events received by the board, for inspection in tests and diagnostics.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct InputCounters {
    pub jumps: usize,
    pub restarts: usize,
    pub clicks: usize,
    pub ignored_starts: usize,
}

/// A runner game simulated over virtual time.
#[derive(Debug, Clone)]
pub struct SimulatedBoard<R> {
    config: SimConfig,
    rng: R,
    now: Duration,
    phase: SimPhase,
    run_time: f32,
    airborne_left: f32,
    obstacles: VecDeque<SimObstacle>,
    spawn_distance: f32,
    counters: InputCounters,
}

impl<R> SimulatedBoard<R>
where
    R: Rng,
{
    pub fn new(config: SimConfig, rng: R) -> Result<Self, SimConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            rng,
            now: Duration::ZERO,
            phase: SimPhase::Idle,
            run_time: 0.0,
            airborne_left: 0.0,
            obstacles: VecDeque::new(),
            spawn_distance: 0.0,
            counters: InputCounters::default(),
        })
    }

    #[must_use]
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    #[must_use]
    pub fn phase(&self) -> SimPhase {
        self.phase
    }

    #[must_use]
    pub fn counters(&self) -> InputCounters {
        self.counters
    }

    /// Seconds the current game has been running.
    #[must_use]
    pub fn run_time(&self) -> f32 {
        self.run_time
    }

    /// Current scroll speed in pixels per second.
    #[must_use]
    pub fn speed(&self) -> f32 {
        (self.config.base_speed + self.config.acceleration * self.run_time)
            .min(self.config.max_speed)
    }

    fn reset(&mut self) {
        self.phase = SimPhase::Idle;
        self.run_time = 0.0;
        self.airborne_left = 0.0;
        self.obstacles.clear();
        self.spawn_distance = 0.0;
    }

    fn advance(&mut self, duration: Duration) {
        let mut remaining = duration.as_secs_f32();
        let step = self.config.physics_step.max(1e-4);
        while remaining > 0.0 {
            let dt = remaining.min(step);
            self.step(dt);
            remaining -= dt;
        }
        self.now += duration;
    }

    fn step(&mut self, dt: f32) {
        if !self.phase.is_running() {
            return;
        }

        let distance = self.speed() * dt;
        for obstacle in &mut self.obstacles {
            obstacle.x -= distance;
        }
        self.spawn_distance -= distance;
        self.run_time += dt;
        self.airborne_left = (self.airborne_left - dt).max(0.0);

        let (runner_left, runner_right) = self.config.runner_span();
        self.obstacles
            .retain(|obstacle| obstacle.x + obstacle.width >= runner_left);

        if self.spawn_distance <= 0.0 {
            self.spawn_obstacle();
        }

        let grounded = self.airborne_left <= 0.0;
        let hit = self.obstacles.iter().any(|obstacle| {
            obstacle.x < runner_right && obstacle.x + obstacle.width > runner_left
        });
        if grounded && hit {
            self.phase = SimPhase::Crashed;
        }
    }

    #[expect(clippy::cast_precision_loss)]
    fn spawn_obstacle(&mut self) {
        let config = &self.config;
        let width = self
            .rng
            .random_range(config.min_obstacle_width..=config.max_obstacle_width);
        let gap = self
            .rng
            .random_range(config.min_obstacle_gap..=config.max_obstacle_gap);
        self.obstacles.push_back(SimObstacle {
            x: config.region().width as f32,
            width,
        });
        self.spawn_distance = width + gap;
    }

    fn render(&self, width: i32, height: i32) -> Frame {
        let width = usize::try_from(width).unwrap_or(0);
        let height = usize::try_from(height).unwrap_or(0);
        let obstacle_top =
            height.saturating_sub(usize::try_from(self.config.obstacle_height).unwrap_or(0));

        let mut dark_columns = vec![false; width];
        for obstacle in &self.obstacles {
            let (start, end) = column_span(obstacle.x, obstacle.width, width);
            for column in &mut dark_columns[start..end] {
                *column = true;
            }
        }

        Frame::from_fn(width, height, |x, y| {
            if y >= obstacle_top && dark_columns[x] {
                self.config.obstacle_shade
            } else {
                self.config.background_shade
            }
        })
    }
}

#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn column_span(x: f32, width: f32, board_width: usize) -> (usize, usize) {
    let clamp = |v: f32| v.clamp(0.0, board_width as f32) as usize;
    let start = clamp(x.floor());
    let end = clamp((x + width).ceil());
    (start, end.max(start))
}

impl<R> PerceptionSource for SimulatedBoard<R>
where
    R: Rng,
{
    fn locate_region_of_interest(&mut self) -> Option<Region> {
        self.config.visible.then(|| self.config.region())
    }

    fn capture_frame(&mut self, region: Region) -> Frame {
        self.advance(Duration::from_secs_f32(self.config.frame_interval));
        self.render(region.width, region.height)
    }

    fn game_over_similarity(&mut self, _frame: &Frame) -> f32 {
        if self.phase.is_crashed() { 0.93 } else { 0.18 }
    }
}

impl<R> InputActuator for SimulatedBoard<R>
where
    R: Rng,
{
    fn press_key(&mut self, key: Key) {
        if key != Key::JUMP {
            return;
        }
        match self.phase {
            SimPhase::Idle => {
                if self.rng.random_bool(self.config.start_ignore_probability) {
                    self.counters.ignored_starts += 1;
                } else {
                    self.phase = SimPhase::Running;
                }
            }
            SimPhase::Running => {
                self.counters.jumps += 1;
                if self.airborne_left <= 0.0 {
                    self.airborne_left = self.config.jump_duration;
                }
            }
            SimPhase::Crashed => {}
        }
    }

    fn press_combo(&mut self, keys: &[Key]) {
        if keys == Key::RESTART_COMBO {
            self.counters.restarts += 1;
            self.reset();
        }
    }

    fn move_cursor_to(&mut self, _x: i32, _y: i32) {}

    fn click(&mut self) {
        self.counters.clicks += 1;
    }
}

impl<R> Clock for SimulatedBoard<R>
where
    R: Rng,
{
    fn now(&self) -> Duration {
        self.now
    }

    fn sleep(&mut self, duration: Duration) {
        self.advance(duration);
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;
    use crate::{ObstacleExtractor, ObstacleState};

    fn board(config: SimConfig) -> SimulatedBoard<Pcg32> {
        SimulatedBoard::new(config, Pcg32::seed_from_u64(7)).unwrap()
    }

    #[test]
    fn test_idle_board_is_frozen_and_empty() {
        let mut board = board(SimConfig::default());
        let region = board.locate_region_of_interest().unwrap();
        let extractor = ObstacleExtractor::default();
        for _ in 0..100 {
            let frame = board.capture_frame(region);
            assert_eq!(extractor.extract(&frame), ObstacleState::EMPTY);
        }
        assert!(board.phase().is_idle());
        assert_eq!(board.run_time(), 0.0);
    }

    #[test]
    fn test_obstacle_approaches_after_start() {
        let mut board = board(SimConfig::default());
        let region = board.locate_region_of_interest().unwrap();
        let extractor = ObstacleExtractor::default();
        board.press_key(Key::JUMP);
        assert!(board.phase().is_running());

        let first = extractor.extract(&board.capture_frame(region));
        assert!(first.width > 0);
        let later = extractor.extract(&board.capture_frame(region));
        assert!(later.position < first.position);
    }

    #[test]
    fn test_never_jumping_crashes() {
        let mut board = board(SimConfig::default());
        board.press_key(Key::JUMP);
        board.sleep(Duration::from_secs(10));
        assert!(board.phase().is_crashed());
        let frame = board.capture_frame(board.config().region());
        assert!(board.game_over_similarity(&frame) > 0.6);
    }

    #[test]
    fn test_restart_combo_resets() {
        let mut board = board(SimConfig::default());
        board.press_key(Key::JUMP);
        board.sleep(Duration::from_secs(10));
        board.press_combo(&Key::RESTART_COMBO);
        assert!(board.phase().is_idle());
        assert_eq!(board.counters().restarts, 1);
        let frame = board.capture_frame(board.config().region());
        assert!(board.game_over_similarity(&frame) < 0.6);
    }

    #[test]
    fn test_ignored_start_keeps_board_idle() {
        let mut board = board(SimConfig {
            start_ignore_probability: 1.0,
            ..SimConfig::default()
        });
        board.press_key(Key::JUMP);
        assert!(board.phase().is_idle());
        assert_eq!(board.counters().ignored_starts, 1);
    }

    #[test]
    fn test_hidden_board_cannot_be_located() {
        let mut board = board(SimConfig {
            visible: false,
            ..SimConfig::default()
        });
        assert_eq!(board.locate_region_of_interest(), None);
    }

    #[test]
    fn test_config_deserializes_with_defaults() {
        let config: SimConfig = serde_json::from_str(r#"{ "acceleration": 50.0 }"#).unwrap();
        assert_eq!(config.acceleration, 50.0);
        assert_eq!(config.board_width, SimConfig::default().board_width);
        assert_eq!(config.region(), Region::new(185, 100, 600, 30));
    }

    mod config_validation {
        use super::*;

        fn rejected(json: &str) -> SimConfigError {
            let config: SimConfig = serde_json::from_str(json).unwrap();
            SimulatedBoard::new(config, Pcg32::seed_from_u64(7)).unwrap_err()
        }

        #[test]
        fn test_default_is_valid() {
            assert_eq!(SimConfig::default().validate(), Ok(()));
        }

        #[test]
        fn test_inverted_width_range() {
            assert_eq!(
                rejected(r#"{ "min_obstacle_width": 60.0, "max_obstacle_width": 10.0 }"#),
                SimConfigError::ObstacleWidth {
                    min: 60.0,
                    max: 10.0
                }
            );
            assert!(rejected(r#"{ "min_obstacle_width": -1.0 }"#).is_obstacle_width());
        }

        #[test]
        fn test_inverted_gap_range() {
            let err = rejected(r#"{ "min_obstacle_gap": 700.0, "max_obstacle_gap": 200.0 }"#);
            assert!(err.is_obstacle_gap());
            assert_eq!(
                err.to_string(),
                "obstacle gap range 700..=200 must be finite, non-negative and non-empty"
            );
        }

        #[test]
        fn test_probability_out_of_range() {
            assert_eq!(
                rejected(r#"{ "start_ignore_probability": 1.5 }"#),
                SimConfigError::StartIgnoreProbability { probability: 1.5 }
            );
            assert!(
                rejected(r#"{ "start_ignore_probability": -0.1 }"#).is_start_ignore_probability()
            );
        }

        #[test]
        fn test_negative_frame_interval() {
            assert_eq!(
                rejected(r#"{ "frame_interval": -0.1 }"#),
                SimConfigError::FrameInterval { seconds: -0.1 }
            );
            let nan = SimConfig {
                frame_interval: f32::NAN,
                ..SimConfig::default()
            };
            assert!(nan.validate().unwrap_err().is_frame_interval());
        }
    }
}
