pub mod estimator;
pub mod prior;

pub use estimator::{Estimate, EpochReport, GradientEval, Observation, RewardEstimator};
pub use prior::RewardPrior;
