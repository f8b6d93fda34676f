pub mod engine;
pub mod outcome;

pub use engine::{geometric_mean, predict, RATE_CAP, RATE_FLOOR};
pub use outcome::{Factor, PredictionResult, RankedRate};
