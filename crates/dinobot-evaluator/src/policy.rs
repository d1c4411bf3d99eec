//! Decision policies: mapping the nearest obstacle to a jump confidence.
//!
//! Every policy implements [`DecisionPolicy::decide`], returning a confidence in
//! `[0.0, 1.0]`. The game loop jumps when the confidence reaches [`JUMP_CONFIDENCE`].
//!
//! # Families
//!
//! ## Threshold Rule
//!
//! ```text
//! confidence = 1 if position <= threshold else 0
//! ```
//!
//! One parameter, no smoothing, and the score is ignored. Simple enough that a cost curve
//! over the threshold can be plotted by brute force.
//!
//! ## Linear Logistic
//!
//! ```text
//! features   = [1, position, width, score, 0, 0, 0, 0]
//! confidence = σ(w · features)     σ(z) = 1 / (1 + e^-z)
//! ```
//!
//! The feature layout has [`STRATEGY_SLOTS`] slots. Only the first four carry data today;
//! the rest are reserved for additional obstacles and are always zero, so any strategy of
//! length 1 to 8 is accepted and trailing weights are inert.
//!
//! # Strategy Vectors
//!
//! A policy's parameters are its *strategy vector* ([`Policy::strategy`]). The optimizer
//! never mutates a policy in place: it builds a new one for every candidate vector with
//! [`Policy::with_strategy`], so a policy is frozen for the duration of a playthrough.
//!
//! Initialization is explicit. [`Policy::load_or_init`] asks a [`StrategySource`] for a
//! stored vector and falls back to a standard-normal sample from the injected RNG.

use std::{fmt, ops::RangeInclusive};

use arrayvec::ArrayVec;
use dinobot_engine::ObstacleState;
use rand::Rng;
use rand_distr::{Distribution as _, StandardNormal};
use serde::{Deserialize, Serialize};

/// Confidence at or above which the game loop jumps.
pub const JUMP_CONFIDENCE: f64 = 0.5;

/// Number of slots in the logistic feature layout.
pub const STRATEGY_SLOTS: usize = 8;

/// Maps the observed obstacle and elapsed score to a jump confidence.
pub trait DecisionPolicy: fmt::Debug {
    /// Returns the confidence in `[0.0, 1.0]` that jumping now is right.
    ///
    /// # Arguments
    /// * `obstacles` - Nearest obstacle, or the empty sentinel
    /// * `score` - Seconds survived so far in this playthrough
    fn decide(&self, obstacles: ObstacleState, score: f32) -> f64;

    fn should_jump(&self, obstacles: ObstacleState, score: f32) -> bool {
        self.decide(obstacles, score) >= JUMP_CONFIDENCE
    }
}

#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    derive_more::Display,
    derive_more::FromStr,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum PolicyFamily {
    #[default]
    #[display("threshold")]
    Threshold,
    #[display("logistic")]
    Logistic,
}

impl PolicyFamily {
    /// Strategy lengths a policy of this family accepts.
    #[must_use]
    pub const fn strategy_lengths(self) -> RangeInclusive<usize> {
        match self {
            Self::Threshold => 1..=1,
            Self::Logistic => 1..=STRATEGY_SLOTS,
        }
    }

    /// Length of a freshly sampled strategy.
    #[must_use]
    pub const fn initial_len(self) -> usize {
        match self {
            Self::Threshold => 1,
            Self::Logistic => STRATEGY_SLOTS,
        }
    }
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("strategy of length {len} is not valid for a {family} policy")]
pub struct StrategyLengthError {
    family: PolicyFamily,
    len: usize,
}

impl StrategyLengthError {
    fn check(family: PolicyFamily, strategy: &[f32]) -> Result<(), Self> {
        if family.strategy_lengths().contains(&strategy.len()) {
            Ok(())
        } else {
            Err(Self {
                family,
                len: strategy.len(),
            })
        }
    }
}

/// Jumps when the obstacle is at or closer than a fixed position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdRule {
    threshold: f32,
}

impl ThresholdRule {
    #[must_use]
    pub const fn new(threshold: f32) -> Self {
        Self { threshold }
    }

    #[must_use]
    pub fn threshold(&self) -> f32 {
        self.threshold
    }
}

impl DecisionPolicy for ThresholdRule {
    fn decide(&self, obstacles: ObstacleState, _score: f32) -> f64 {
        if f32::from(obstacles.position) <= self.threshold {
            1.0
        } else {
            0.0
        }
    }
}

/// Logistic regression over the obstacle and the elapsed score.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearLogistic {
    weights: ArrayVec<f32, STRATEGY_SLOTS>,
}

impl LinearLogistic {
    pub fn new(weights: &[f32]) -> Result<Self, StrategyLengthError> {
        StrategyLengthError::check(PolicyFamily::Logistic, weights)?;
        Ok(Self {
            weights: weights.iter().copied().collect(),
        })
    }

    #[must_use]
    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    /// Feature layout: `[1 (bias), position, width, score]`, zero-filled to
    /// [`STRATEGY_SLOTS`].
    #[must_use]
    pub fn features(obstacles: ObstacleState, score: f32) -> [f32; STRATEGY_SLOTS] {
        let [position, width] = obstacles.features();
        let mut features = [0.0; STRATEGY_SLOTS];
        features[..4].copy_from_slice(&[1.0, position, width, score]);
        features
    }

    /// Dot product of the weights with the feature layout, before squashing.
    ///
    /// Accumulated in `f64` so the squash keeps resolution at large magnitudes.
    #[must_use]
    pub fn activation(&self, obstacles: ObstacleState, score: f32) -> f64 {
        self.weights
            .iter()
            .zip(Self::features(obstacles, score))
            .map(|(&w, f)| f64::from(w) * f64::from(f))
            .sum()
    }
}

impl DecisionPolicy for LinearLogistic {
    fn decide(&self, obstacles: ObstacleState, score: f32) -> f64 {
        logistic(self.activation(obstacles, score))
    }
}

/// Numerically stable logistic function.
///
/// The result lies strictly inside `(0, 1)` for `|z|` up to about 36. Beyond that it
/// saturates to exactly `1.0` (positive side) or keeps shrinking towards `0.0` until it
/// underflows near `z = -745`.
#[must_use]
pub fn logistic(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

/// Provides previously persisted strategy vectors.
pub trait StrategySource {
    /// Returns the stored strategy for `family`, if one exists.
    fn load_strategy(&self, family: PolicyFamily) -> Option<Vec<f32>>;
}

/// A [`StrategySource`] with nothing stored.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoStoredStrategy;

impl StrategySource for NoStoredStrategy {
    fn load_strategy(&self, _family: PolicyFamily) -> Option<Vec<f32>> {
        None
    }
}

/// A policy of any family.
#[derive(Debug, Clone, PartialEq)]
pub enum Policy {
    Threshold(ThresholdRule),
    Logistic(LinearLogistic),
}

impl Policy {
    /// Builds a policy of `family` with the given parameters.
    pub fn from_strategy(
        family: PolicyFamily,
        strategy: &[f32],
    ) -> Result<Self, StrategyLengthError> {
        StrategyLengthError::check(family, strategy)?;
        Ok(match family {
            PolicyFamily::Threshold => Self::Threshold(ThresholdRule::new(strategy[0])),
            PolicyFamily::Logistic => Self::Logistic(LinearLogistic::new(strategy)?),
        })
    }

    /// Samples every parameter from a standard normal distribution.
    pub fn random<R>(family: PolicyFamily, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        let strategy = (0..family.initial_len())
            .map(|_| StandardNormal.sample(rng))
            .collect::<Vec<f32>>();
        match family {
            PolicyFamily::Threshold => Self::Threshold(ThresholdRule::new(strategy[0])),
            PolicyFamily::Logistic => Self::Logistic(LinearLogistic {
                weights: strategy.into_iter().collect(),
            }),
        }
    }

    /// Uses the stored strategy for `family` if there is a valid one, otherwise a random one.
    pub fn load_or_init<S, R>(family: PolicyFamily, source: &S, rng: &mut R) -> Self
    where
        S: StrategySource + ?Sized,
        R: Rng + ?Sized,
    {
        if let Some(strategy) = source.load_strategy(family) {
            match Self::from_strategy(family, &strategy) {
                Ok(policy) => return policy,
                Err(err) => log::warn!("ignoring stored {family} strategy: {err}"),
            }
        }
        log::info!("no {family} strategy given, sampling from a standard normal distribution");
        Self::random(family, rng)
    }

    #[must_use]
    pub fn family(&self) -> PolicyFamily {
        match self {
            Self::Threshold(_) => PolicyFamily::Threshold,
            Self::Logistic(_) => PolicyFamily::Logistic,
        }
    }

    /// Current parameters, in the layout [`Policy::from_strategy`] accepts.
    #[must_use]
    pub fn strategy(&self) -> &[f32] {
        match self {
            Self::Threshold(rule) => std::slice::from_ref(&rule.threshold),
            Self::Logistic(logistic) => logistic.weights(),
        }
    }

    /// Returns a policy of the same family with other parameters.
    pub fn with_strategy(&self, strategy: &[f32]) -> Result<Self, StrategyLengthError> {
        Self::from_strategy(self.family(), strategy)
    }
}

impl DecisionPolicy for Policy {
    fn decide(&self, obstacles: ObstacleState, score: f32) -> f64 {
        match self {
            Self::Threshold(rule) => rule.decide(obstacles, score),
            Self::Logistic(logistic) => logistic.decide(obstacles, score),
        }
    }
}
