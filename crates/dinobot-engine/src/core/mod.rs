//! Frame data and the obstacle reduction applied to it every polling tick.

pub use self::{frame::*, obstacle::*};

mod frame;
mod obstacle;
