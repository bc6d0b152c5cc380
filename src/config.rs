use crate::error::{IrlError, Result};
use crate::irl::prior::RewardPrior;
use crate::mdps::solvers::soft_value_iteration::Temperature;
use crate::{Continous, Discrete};
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Gradient-ascent settings for the reward estimator.
///
/// Value iteration inside the estimator is always undiscounted, so there is no
/// `gamma` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EstimatorConfig {
    pub horizon: usize,
    pub temperature: Temperature,
    pub learning_rate: Continous,
    /// Epoch budget.
    pub epochs: usize,
    /// Stop once the gradient norm drops below this.
    pub threshold: Continous,
    /// Std-dev of the random initial reward vector.
    pub init_scale: Continous,
    pub seed: Option<u64>,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            horizon: 10,
            temperature: Temperature::Soft(1.),
            learning_rate: 0.2,
            epochs: 200,
            threshold: 1e-3,
            init_scale: 0.01,
            seed: None,
        }
    }
}

impl EstimatorConfig {
    pub fn validate(&self) -> Result<()> {
        if self.horizon == 0 {
            return Err(IrlError::invalid("horizon", "must be at least 1"));
        }
        self.temperature.validate()?;
        positive_finite("learning_rate", self.learning_rate)?;
        positive_finite("threshold", self.threshold)?;
        if !(self.init_scale.is_finite() && self.init_scale >= 0.) {
            return Err(IrlError::invalid(
                "init_scale",
                format!("must be non-negative and finite, got {}", self.init_scale),
            ));
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriorKind {
    Gaussian,
    Laplace,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriorConfig {
    pub kind: PriorKind,
    pub mu: Vec<Continous>,
    /// Sigma for the Gaussian, b for the Laplace.
    pub scale: Continous,
}

impl PriorConfig {
    pub fn build(&self) -> Result<RewardPrior> {
        let mu = Array1::from_vec(self.mu.clone());
        match self.kind {
            PriorKind::Gaussian => RewardPrior::gaussian(mu, self.scale),
            PriorKind::Laplace => RewardPrior::laplace(mu, self.scale),
        }
    }
}

/// Everything the demo binary needs for one inference run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub s_current: Discrete,
    pub estimator: EstimatorConfig,
    pub prior: Option<PriorConfig>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            s_current: 3,
            estimator: EstimatorConfig {
                horizon: 3,
                ..Default::default()
            },
            prior: None,
        }
    }
}

impl RunConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.estimator.validate()?;

        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_json_str(&std::fs::read_to_string(path)?)
    }
}

fn positive_finite(name: &'static str, x: Continous) -> Result<()> {
    if !(x.is_finite() && x > 0.) {
        return Err(IrlError::invalid(
            name,
            format!("must be positive and finite, got {x}"),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assertor::*;
    use rstest::rstest;

    #[test]
    fn empty_json_gives_defaults() {
        let config = RunConfig::from_json_str("{}").unwrap();

        assert_that!(config).is_equal_to(RunConfig::default());
    }

    #[test]
    fn partial_json_overrides_fields() {
        let config = RunConfig::from_json_str(
            r#"{
                "s_current": 2,
                "estimator": { "horizon": 5, "temperature": "hard_max", "seed": 7 },
                "prior": { "kind": "laplace", "mu": [0.0, 1.0], "scale": 0.5 }
            }"#,
        )
        .unwrap();

        assert_that!(config.s_current).is_equal_to(2);
        assert_that!(config.estimator.horizon).is_equal_to(5);
        assert_that!(config.estimator.temperature).is_equal_to(Temperature::HardMax);
        assert_that!(config.estimator.seed).is_equal_to(Some(7));
        assert_that!(config.estimator.learning_rate).is_equal_to(0.2);

        let prior = config.prior.unwrap().build().unwrap();
        assert!(matches!(prior, RewardPrior::Laplace(_)));
        assert_that!(prior.dim()).is_equal_to(2);
    }

    #[test]
    fn soft_temperature_round_trips() {
        let config = EstimatorConfig {
            temperature: Temperature::Soft(0.5),
            ..Default::default()
        };

        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains(r#""temperature":{"soft":0.5}"#));
        let back: EstimatorConfig = serde_json::from_str(&json).unwrap();
        assert_that!(back).is_equal_to(config);
    }

    #[rstest]
    #[case(r#"{"estimator": {"horizon": 0}}"#)]
    #[case(r#"{"estimator": {"learning_rate": -0.1}}"#)]
    #[case(r#"{"estimator": {"threshold": 0.0}}"#)]
    #[case(r#"{"estimator": {"temperature": {"soft": 0.0}}}"#)]
    #[case(r#"{"estimator": {"init_scale": -1.0}}"#)]
    fn invalid_values_are_rejected(#[case] json: &str) {
        assert!(matches!(
            RunConfig::from_json_str(json),
            Err(IrlError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn discount_is_not_configurable() {
        assert!(matches!(
            RunConfig::from_json_str(r#"{"estimator": {"gamma": 0.9}}"#),
            Err(IrlError::Config(_))
        ));
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        assert!(matches!(
            RunConfig::from_json_str("{ horizon: }"),
            Err(IrlError::Config(_))
        ));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        assert!(matches!(
            RunConfig::from_file("/nonexistent/rlsp.json"),
            Err(IrlError::Io(_))
        ));
    }
}
