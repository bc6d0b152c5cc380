use crate::error::{IrlError, Result};
use crate::Continous;
use ndarray::{Array1, ArrayView1};
use rand::distributions::Distribution;
use rand::Rng;
use statrs::distribution::{Continuous, Laplace, Normal};

/// Independent per-coordinate prior over the reward vector.
#[derive(Debug, Clone)]
pub enum RewardPrior {
    Gaussian(GaussianPrior),
    Laplace(LaplacePrior),
}

#[derive(Debug, Clone)]
pub struct GaussianPrior {
    mu: Array1<Continous>,
    sigma: Continous,
    marginals: Vec<Normal>,
}

#[derive(Debug, Clone)]
pub struct LaplacePrior {
    mu: Array1<Continous>,
    b: Continous,
    marginals: Vec<Laplace>,
}

impl RewardPrior {
    pub fn gaussian(mu: Array1<Continous>, sigma: Continous) -> Result<Self> {
        check_scale("gaussian", sigma)?;
        let marginals = mu
            .iter()
            .map(|&m| Normal::new(m, sigma))
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| IrlError::InvalidPrior(format!("gaussian: {e}")))?;

        Ok(Self::Gaussian(GaussianPrior {
            mu,
            sigma,
            marginals,
        }))
    }

    pub fn laplace(mu: Array1<Continous>, b: Continous) -> Result<Self> {
        check_scale("laplace", b)?;
        let marginals = mu
            .iter()
            .map(|&m| Laplace::new(m, b))
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| IrlError::InvalidPrior(format!("laplace: {e}")))?;

        Ok(Self::Laplace(LaplacePrior { mu, b, marginals }))
    }

    pub fn dim(&self) -> usize {
        self.mu().len()
    }

    pub fn mu(&self) -> &Array1<Continous> {
        match self {
            Self::Gaussian(g) => &g.mu,
            Self::Laplace(l) => &l.mu,
        }
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Array1<Continous> {
        match self {
            Self::Gaussian(g) => g.marginals.iter().map(|d| d.sample(rng)).collect(),
            Self::Laplace(l) => l.marginals.iter().map(|d| d.sample(rng)).collect(),
        }
    }

    /// Joint density, the product of the marginals.
    pub fn pdf(&self, x: ArrayView1<Continous>) -> Result<Continous> {
        Ok(self.logpdf(x)?.exp())
    }

    pub fn logpdf(&self, x: ArrayView1<Continous>) -> Result<Continous> {
        self.check_dim(x)?;

        Ok(match self {
            Self::Gaussian(g) => g
                .marginals
                .iter()
                .zip(x.iter())
                .map(|(d, &xi)| d.ln_pdf(xi))
                .sum(),
            Self::Laplace(l) => l
                .marginals
                .iter()
                .zip(x.iter())
                .map(|(d, &xi)| d.ln_pdf(xi))
                .sum(),
        })
    }

    /// Gradient of [`RewardPrior::logpdf`] with respect to `x`.
    ///
    /// The Laplace log-density has a kink at `mu`; the zero subgradient is
    /// used there.
    pub fn logpdf_grad(&self, x: ArrayView1<Continous>) -> Result<Array1<Continous>> {
        self.check_dim(x)?;

        Ok(match self {
            Self::Gaussian(g) => (&g.mu - &x) / (g.sigma * g.sigma),
            Self::Laplace(l) => ndarray::Zip::from(&l.mu)
                .and(&x)
                .map_collect(|&m, &xi| {
                    if xi == m {
                        0.
                    } else {
                        (m - xi).signum() / l.b
                    }
                }),
        })
    }

    fn check_dim(&self, x: ArrayView1<Continous>) -> Result<()> {
        if x.len() != self.dim() {
            return Err(IrlError::DimensionMismatch {
                what: "prior argument",
                expected: self.dim(),
                actual: x.len(),
            });
        }

        Ok(())
    }
}

fn check_scale(kind: &str, scale: Continous) -> Result<()> {
    if !(scale.is_finite() && scale > 0.) {
        return Err(IrlError::InvalidPrior(format!(
            "{kind}: scale must be positive and finite, got {scale}"
        )));
    }

    Ok(())
}
