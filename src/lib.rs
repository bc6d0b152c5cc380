//! Reward inference from the state of the world: maximum causal entropy IRL
//! on finite-horizon tabular MDPs, explaining why an agent is found in a
//! given state after a known number of steps.

pub mod config;
pub mod envs;
pub mod error;
pub mod irl;
pub mod mdps;

pub type Discrete = usize;
pub type Continous = f64;

pub use config::{EstimatorConfig, PriorConfig, RunConfig};
pub use error::{IrlError, Result};
pub use irl::{Estimate, Observation, RewardEstimator, RewardPrior};
pub use mdps::{
    mdp::{Mdp, Transition, Transitions},
    solvers::{
        occupancy::{occupancy_measures, occupancy_with_sensitivity, OccupancyTrace},
        soft_value_iteration::{soft_value_iteration, PolicySequence, Temperature},
    },
    transition_model::TransitionModel,
};
