use super::prior::RewardPrior;
use crate::config::EstimatorConfig;
use crate::error::{IrlError, Result};
use crate::mdps::mdp::Mdp;
use crate::mdps::solvers::{
    occupancy::{occupancy_measures, occupancy_with_sensitivity},
    soft_value_iteration::{soft_value_iteration, PolicySequence, Temperature},
};
use crate::{Continous, Discrete};
use ndarray::{Array1, ArrayView1};
use rand::prelude::*;
use serde::Serialize;
use statrs::distribution::Normal;
use tracing::{debug, info, warn};

const P_0_SUM_TOLERANCE: Continous = 1e-6;
/// The likelihood gradient below only holds for undiscounted backups.
const GAMMA: Continous = 1.;

/// The agent is observed in `s_current` after `horizon` steps from `p_0`.
#[derive(Debug, Clone, Copy)]
pub struct Observation<'o> {
    pub s_current: Discrete,
    pub p_0: ArrayView1<'o, Continous>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EpochReport {
    pub epoch: usize,
    pub grad_norm: Continous,
    /// Last-step occupancy of the observed state before the update.
    pub p_current: Continous,
    /// `ln p_current` plus the prior's log-density.
    pub log_likelihood: Continous,
}

#[derive(Debug, Clone)]
pub struct Estimate {
    pub reward: Array1<Continous>,
    pub converged: bool,
    pub grad_norm: Continous,
    pub history: Vec<EpochReport>,
}

impl Estimate {
    pub fn epochs(&self) -> usize {
        self.history.len()
    }
}

/// Gradient of the log-likelihood at one reward vector.
#[derive(Debug, Clone)]
pub struct GradientEval {
    pub grad: Array1<Continous>,
    pub p_current: Continous,
}

/// Maximum causal entropy IRL from a single observed state: gradient ascent
/// on `log p(s_T = s_current | r)` (plus the prior's log-density).
pub struct RewardEstimator<'a> {
    mdp: &'a dyn Mdp,
    config: EstimatorConfig,
    prior: Option<RewardPrior>,
}

impl<'a> RewardEstimator<'a> {
    pub fn new(mdp: &'a dyn Mdp, config: EstimatorConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            mdp,
            config,
            prior: None,
        })
    }

    pub fn with_prior(mut self, prior: RewardPrior) -> Result<Self> {
        check_len("prior", self.mdp.num_features(), prior.dim())?;
        self.prior = Some(prior);

        Ok(self)
    }

    /// Run gradient ascent from `r_init`, or from a small random reward
    /// vector when none is given.
    pub fn estimate(
        &self,
        obs: Observation,
        r_init: Option<Array1<Continous>>,
    ) -> Result<Estimate> {
        self.check_observation(&obs)?;
        let mut r_vec = match r_init {
            Some(r) => r,
            None => self.random_reward()?,
        };
        check_len("initial reward", self.mdp.num_features(), r_vec.len())?;
        info!(
            s_current = obs.s_current,
            horizon = self.config.horizon,
            "Initial reward vector: {r_vec}"
        );

        let mut history = Vec::with_capacity(self.config.epochs);
        let mut grad_norm = Continous::INFINITY;
        for epoch in 0..self.config.epochs {
            let eval = self.eval_gradient(r_vec.view(), &obs, epoch)?;
            grad_norm = eval.grad.dot(&eval.grad).sqrt();
            history.push(EpochReport {
                epoch,
                grad_norm,
                p_current: eval.p_current,
                log_likelihood: eval.p_current.ln() + self.log_prior(r_vec.view())?,
            });

            if grad_norm < self.config.threshold {
                info!(epoch, grad_norm, "Converged; reward vector: {r_vec}");
                return Ok(Estimate {
                    reward: r_vec,
                    converged: true,
                    grad_norm,
                    history,
                });
            }

            r_vec.scaled_add(self.config.learning_rate, &eval.grad);
            debug!(
                epoch,
                grad_norm,
                p_current = eval.p_current,
                "Reward vector: {r_vec}"
            );
        }

        warn!(
            epochs = self.config.epochs,
            grad_norm, "Epoch budget exhausted before convergence"
        );
        Ok(Estimate {
            reward: r_vec,
            converged: false,
            grad_norm,
            history,
        })
    }

    /// `dL/dr = (G[s_current] / d_last[s_current] - sum_t D_t @ F) / tau`,
    /// plus the prior's log-density gradient. `HardMax` uses `tau = 1`.
    pub fn gradient(&self, r_vec: ArrayView1<Continous>, obs: Observation) -> Result<GradientEval> {
        self.check_observation(&obs)?;
        check_len("reward", self.mdp.num_features(), r_vec.len())?;

        self.eval_gradient(r_vec, &obs, 0)
    }

    /// `log d_last[s_current] + prior.logpdf(r_vec)`. Not used by
    /// [`RewardEstimator::estimate`]; see
    /// [`RewardEstimator::finite_difference_gradient`].
    pub fn log_likelihood(&self, r_vec: ArrayView1<Continous>, obs: Observation) -> Result<Continous> {
        self.check_observation(&obs)?;
        check_len("reward", self.mdp.num_features(), r_vec.len())?;

        let policies = self.policies(r_vec).map_err(|e| e.at_epoch(0))?;
        let d_list = occupancy_measures(self.mdp.transition_model(), &policies, obs.p_0)?;
        let p_current = d_list[d_list.len() - 1][obs.s_current];
        if p_current == 0. {
            return Err(IrlError::InfeasibleTrajectory {
                state: obs.s_current,
                epoch: 0,
            });
        }

        Ok(p_current.ln() + self.log_prior(r_vec)?)
    }

    /// Central differences of [`RewardEstimator::log_likelihood`].
    pub fn finite_difference_gradient(
        &self,
        r_vec: ArrayView1<Continous>,
        obs: Observation,
        eps: Continous,
    ) -> Result<Array1<Continous>> {
        let mut grad = Array1::zeros(r_vec.len());
        for i in 0..r_vec.len() {
            let (mut r_plus, mut r_minus) = (r_vec.to_owned(), r_vec.to_owned());
            r_plus[i] += eps;
            r_minus[i] -= eps;
            grad[i] = (self.log_likelihood(r_plus.view(), obs)?
                - self.log_likelihood(r_minus.view(), obs)?)
                / (2. * eps);
        }

        Ok(grad)
    }

    fn eval_gradient(
        &self,
        r_vec: ArrayView1<Continous>,
        obs: &Observation,
        epoch: usize,
    ) -> Result<GradientEval> {
        let f = self.mdp.feature_matrix().view();
        let policies = self.policies(r_vec).map_err(|e| e.at_epoch(epoch))?;
        let trace =
            occupancy_with_sensitivity(self.mdp.transition_model(), &policies, obs.p_0, f)?;

        let p_current = trace.last_step()[obs.s_current];
        if p_current == 0. {
            warn!(epoch, s_current = obs.s_current, "No feasible trajectory");
            return Err(IrlError::InfeasibleTrajectory {
                state: obs.s_current,
                epoch,
            });
        }

        let inv_tau = match self.config.temperature {
            Temperature::Soft(tau) => tau.recip(),
            Temperature::HardMax => 1.,
        };
        let mut grad = (&trace.sensitivity.row(obs.s_current) / p_current
            - trace.feature_expectation(f))
            * inv_tau;
        if let Some(prior) = &self.prior {
            grad += &prior.logpdf_grad(r_vec)?;
        }
        if grad.iter().any(|g| !g.is_finite()) {
            return Err(IrlError::NumericalInstability {
                what: "reward gradient",
                epoch: Some(epoch),
            });
        }

        Ok(GradientEval { grad, p_current })
    }

    fn policies(&self, r_vec: ArrayView1<Continous>) -> Result<PolicySequence> {
        let r_s = self.mdp.feature_matrix().dot(&r_vec);

        soft_value_iteration(
            self.mdp.transition_model(),
            r_s.view(),
            GAMMA,
            self.config.horizon,
            self.config.temperature,
        )
    }

    fn log_prior(&self, r_vec: ArrayView1<Continous>) -> Result<Continous> {
        match &self.prior {
            Some(prior) => prior.logpdf(r_vec),
            None => Ok(0.),
        }
    }

    fn random_reward(&self) -> Result<Array1<Continous>> {
        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let normal =
            Normal::new(0., 1.).map_err(|e| IrlError::invalid("init_scale", e.to_string()))?;

        Ok((0..self.mdp.num_features())
            .map(|_| self.config.init_scale * normal.sample(&mut rng))
            .collect())
    }

    fn check_observation(&self, obs: &Observation) -> Result<()> {
        let n_s = self.mdp.n_s();
        if obs.s_current >= n_s {
            return Err(IrlError::invalid(
                "s_current",
                format!("{} is outside 0..{n_s}", obs.s_current),
            ));
        }
        check_len("initial distribution", n_s, obs.p_0.len())?;
        if obs.p_0.iter().any(|&p| !p.is_finite() || p < 0.) {
            return Err(IrlError::invalid(
                "initial distribution",
                "entries must be finite and non-negative",
            ));
        }
        let total = obs.p_0.sum();
        if (total - 1.).abs() > P_0_SUM_TOLERANCE {
            return Err(IrlError::invalid(
                "initial distribution",
                format!("must sum to 1, sums to {total}"),
            ));
        }

        Ok(())
    }
}

fn check_len(what: &'static str, expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(IrlError::DimensionMismatch {
            what,
            expected,
            actual,
        });
    }

    Ok(())
}
