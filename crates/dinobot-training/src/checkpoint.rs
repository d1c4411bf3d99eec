//! Optimizer checkpoints.
//!
//! At every reporting interval the optimizer hands a [`Checkpoint`] to a [`CheckpointSink`].
//! A checkpoint is the complete optimizer state as of that iteration, so a sink storing it
//! should overwrite the previous one rather than append.
//!
//! The optimizer treats a failing sink as non-fatal: the error is logged and training
//! continues, since the next interval writes the full state again.

use std::{convert::Infallible, fmt};

use serde::Serialize;

/// Snapshot of optimizer progress, borrowed from the running optimizer.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Checkpoint<'a> {
    /// Zero-based iteration that was just completed.
    pub iteration: usize,
    /// Parameters after this iteration's update.
    pub theta: &'a [f32],
    /// Cost of theta at every reporting interval so far.
    pub costs: &'a [f32],
    /// Theta before the update of every iteration so far.
    pub thetas: &'a [Vec<f32>],
}

/// Destination for checkpoints.
pub trait CheckpointSink {
    type Error: fmt::Display;

    fn save(&mut self, checkpoint: &Checkpoint<'_>) -> Result<(), Self::Error>;
}

/// A [`CheckpointSink`] that drops everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCheckpoint;

impl CheckpointSink for NoCheckpoint {
    type Error = Infallible;

    fn save(&mut self, _checkpoint: &Checkpoint<'_>) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl<S> CheckpointSink for &mut S
where
    S: CheckpointSink + ?Sized,
{
    type Error = S::Error;

    fn save(&mut self, checkpoint: &Checkpoint<'_>) -> Result<(), Self::Error> {
        (**self).save(checkpoint)
    }
}
