//! Pool augmentation passes.

pub use blur::*;
pub use rotate::*;

mod blur;
mod rotate;
