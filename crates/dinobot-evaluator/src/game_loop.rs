//! Game loop: playing one full game with a decision policy.
//!
//! # State Machine
//!
//! ```text
//!             locate board ──(not found)──▶ PerceptionUnavailable
//!                  │
//!  Starting ──click, start key, pause──▶ Running ◀──(board changed)── check
//!                  ▲                        │  every frame:               │
//!                  │                        │    capture, extract, decide │
//!                  │                        │    jump + cooldown          │
//!                  │                        ├──(check interval elapsed)───┘
//!                  │                        │
//!           StuckRecovering ◀─(board identical to last check)
//!                                           │
//!                                           └──(game-over match)──▶ GameOver
//! ```
//!
//! - **Starting**: wait `pre_start_delay` so the page can settle, locate the board, click its
//!   center, press the start key, and wait `start_animation_delay` for the intro animation.
//!   A board that cannot be located aborts the playthrough; it is not retried.
//! - **Running**: each tick captures a frame, reduces it to the nearest obstacle, computes the
//!   score as seconds since entering Running, and asks the policy. A jump is followed by
//!   a blocking `jump_cooldown`.
//! - **StuckRecovering**: every `stuck_check_interval` the obstacle state is compared with
//!   the one recorded at the previous check. If nothing changed, the game most likely never
//!   started; the attempt is discarded, score included, and the game is started again from
//!   scratch. Restarts are unbounded.
//! - **GameOver**: the frame matches the game-over banner above `game_over_threshold`. The
//!   final score is recorded, the page is reloaded with the restart key combination, and
//!   the score is returned. Matches at or below the threshold count as still playing.
//!
//! Pauses go through the backend's [`Clock`](dinobot_engine::Clock), so the loop runs
//! unchanged on a real screen or a simulated board.

use std::time::Duration;

use dinobot_engine::{GameBackend, Key, ObstacleExtractor, ObstacleState, Region};

use crate::policy::DecisionPolicy;

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("game board could not be located on screen")]
pub struct PerceptionUnavailable;

/// Timing and matching parameters for the game loop.
#[derive(Debug, Clone, PartialEq)]
pub struct GameLoopConfig {
    /// Pause before looking for the board.
    pub pre_start_delay: Duration,
    /// Pause after pressing the start key, covering the intro animation.
    pub start_animation_delay: Duration,
    /// Pause after every jump key press.
    pub jump_cooldown: Duration,
    /// Interval between two stuck-board checks.
    pub stuck_check_interval: Duration,
    /// Game-over similarity must exceed this to end the game.
    pub game_over_threshold: f32,
    /// Log the countdown and final score at `info` level instead of `debug`.
    pub report: bool,
}

impl Default for GameLoopConfig {
    fn default() -> Self {
        Self {
            pre_start_delay: Duration::from_secs(5),
            start_animation_delay: Duration::from_secs(1),
            jump_cooldown: Duration::from_millis(500),
            stuck_check_interval: Duration::from_secs(10),
            game_over_threshold: 0.6,
            report: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum LoopState {
    Starting,
    Running,
    StuckRecovering,
    GameOver,
}

/// Result of one completed playthrough.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Playthrough {
    /// Seconds survived in the final attempt.
    pub score: f32,
    /// Jump key presses in the final attempt.
    pub jumps: usize,
    /// Frames processed in the final attempt.
    pub frames: usize,
    /// Attempts discarded because the board was stuck.
    pub restarts: usize,
}

enum Attempt {
    Finished {
        score: f32,
        jumps: usize,
        frames: usize,
    },
    Stuck,
}

/// Plays games on a [`GameBackend`].
#[derive(Debug)]
pub struct GameLoopController<B> {
    backend: B,
    extractor: ObstacleExtractor,
    config: GameLoopConfig,
    state: LoopState,
}

impl<B> GameLoopController<B>
where
    B: GameBackend,
{
    pub fn new(backend: B, extractor: ObstacleExtractor, config: GameLoopConfig) -> Self {
        Self {
            backend,
            extractor,
            config,
            state: LoopState::Starting,
        }
    }

    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn into_backend(self) -> B {
        self.backend
    }

    #[must_use]
    pub fn extractor(&self) -> &ObstacleExtractor {
        &self.extractor
    }

    #[must_use]
    pub fn config(&self) -> &GameLoopConfig {
        &self.config
    }

    pub fn set_report(&mut self, report: bool) {
        self.config.report = report;
    }

    /// State the loop is in, or ended in.
    #[must_use]
    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Plays one game to the end, restarting whenever the board is stuck.
    pub fn play<P>(&mut self, policy: &P) -> Result<Playthrough, PerceptionUnavailable>
    where
        P: DecisionPolicy + ?Sized,
    {
        let mut restarts = 0;
        loop {
            let region = self.start()?;
            match self.run(policy, region) {
                Attempt::Finished {
                    score,
                    jumps,
                    frames,
                } => {
                    return Ok(Playthrough {
                        score,
                        jumps,
                        frames,
                        restarts,
                    });
                }
                Attempt::Stuck => {
                    restarts += 1;
                    log::warn!("game looks stuck, restarting (restart #{restarts})");
                }
            }
        }
    }

    /// Plays one game and returns its score, or `0.0` if the board cannot be located.
    pub fn play_score<P>(&mut self, policy: &P) -> f32
    where
        P: DecisionPolicy + ?Sized,
    {
        match self.play(policy) {
            Ok(playthrough) => playthrough.score,
            Err(err) => {
                log::warn!("{err}, scoring the playthrough as 0");
                0.0
            }
        }
    }

    fn start(&mut self) -> Result<Region, PerceptionUnavailable> {
        self.state = LoopState::Starting;
        self.wait_before_start();

        let Some(region) = self.backend.locate_region_of_interest() else {
            log::error!("can't find the game board, reposition the window and rerun");
            return Err(PerceptionUnavailable);
        };
        let (x, y) = region.center();
        self.backend.move_cursor_to(x, y);
        self.backend.click();

        self.backend.press_key(Key::JUMP);
        self.backend.sleep(self.config.start_animation_delay);
        Ok(region)
    }

    fn wait_before_start(&mut self) {
        let delay = self.config.pre_start_delay;
        if !self.config.report {
            self.backend.sleep(delay);
            return;
        }

        let whole_secs = delay.as_secs();
        for remaining in (1..=whole_secs).rev() {
            log::info!("starting in {remaining}");
            self.backend.sleep(Duration::from_secs(1));
        }
        self.backend
            .sleep(delay.saturating_sub(Duration::from_secs(whole_secs)));
    }

    fn run<P>(&mut self, policy: &P, region: Region) -> Attempt
    where
        P: DecisionPolicy + ?Sized,
    {
        self.state = LoopState::Running;
        let started_at = self.backend.now();
        let mut last_check = started_at;
        let mut checked_obstacles = self.extractor.empty_state;
        let mut jumps = 0;
        let mut frames = 0;

        loop {
            let frame = self.backend.capture_frame(region);
            let obstacles = self.extractor.extract(&frame);
            frames += 1;
            let now = self.backend.now();
            let score = now.saturating_sub(started_at).as_secs_f32();

            if now.saturating_sub(last_check) > self.config.stuck_check_interval {
                last_check = now;
                if self.is_stuck(checked_obstacles, obstacles) {
                    return Attempt::Stuck;
                }
                checked_obstacles = obstacles;
            }

            if policy.should_jump(obstacles, score) {
                log::debug!("jump at {score:.2}s: {obstacles:?}");
                self.backend.press_key(Key::JUMP);
                jumps += 1;
                self.backend.sleep(self.config.jump_cooldown);
            }

            if self.backend.game_over_similarity(&frame) > self.config.game_over_threshold {
                self.state = LoopState::GameOver;
                let score = self
                    .backend
                    .now()
                    .saturating_sub(started_at)
                    .as_secs_f32();
                if self.config.report {
                    log::info!("game over, score: {score:.1}");
                } else {
                    log::debug!("game over, score: {score:.1}");
                }
                self.backend.press_combo(&Key::RESTART_COMBO);
                return Attempt::Finished {
                    score,
                    jumps,
                    frames,
                };
            }
        }
    }

    fn is_stuck(&mut self, previous: ObstacleState, current: ObstacleState) -> bool {
        self.state = LoopState::StuckRecovering;
        if previous == current {
            return true;
        }
        self.state = LoopState::Running;
        false
    }
}
