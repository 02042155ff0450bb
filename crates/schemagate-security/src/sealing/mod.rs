//! Connection hash sealing.

mod sealer;

pub use sealer::*;
