//! Normal-Inverse-Gamma conjugate updates for sequential risk estimation.
//!
//! Models an unknown (mean, variance) pair with a NIG(mu, kappa, alpha, beta)
//! prior and folds observations in one at a time with the closed-form
//! single-observation update. Folding a sequence incrementally is exactly
//! equivalent to replaying it from the prior; callers rely on that to rebuild
//! persisted posteriors from history.
//!
//! # Parameterization
//!
//! - `mu`    = location of the mean prior
//! - `kappa` = pseudo-count / precision scale on the mean (kappa > 0)
//! - `alpha` = Inverse-Gamma shape on the variance (alpha > 0)
//! - `beta`  = Inverse-Gamma scale on the variance (beta > 0)

use crate::math::normal::normal_cdf;
use serde::{Deserialize, Serialize};

/// Normal-Inverse-Gamma parameter set (prior or posterior).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NigParams {
    pub mu: f64,
    pub kappa: f64,
    pub alpha: f64,
    pub beta: f64,
}

impl NigParams {
    pub fn new(mu: f64, kappa: f64, alpha: f64, beta: f64) -> Self {
        NigParams {
            mu,
            kappa,
            alpha,
            beta,
        }
    }

    /// Whether all parameters are finite and the positivity constraints hold.
    pub fn is_valid(&self) -> bool {
        self.mu.is_finite()
            && self.kappa.is_finite()
            && self.alpha.is_finite()
            && self.beta.is_finite()
            && self.kappa > 0.0
            && self.alpha > 0.0
            && self.beta > 0.0
    }

    /// Fold a single observation into the posterior.
    ///
    /// Conjugate update:
    /// `kappa' = kappa + 1`
    /// `mu'    = (kappa*mu + x) / kappa'`
    /// `alpha' = alpha + 1/2`
    /// `beta'  = beta + kappa*(x - mu)^2 / (2*kappa')`
    #[must_use]
    pub fn observe(&self, x: f64) -> NigParams {
        let kappa_n = self.kappa + 1.0;
        NigParams {
            mu: (self.kappa * self.mu + x) / kappa_n,
            kappa: kappa_n,
            alpha: self.alpha + 0.5,
            beta: self.beta + 0.5 * self.kappa * (x - self.mu).powi(2) / kappa_n,
        }
    }

    /// Fold a sequence of observations in order.
    #[must_use]
    pub fn fold<I>(self, xs: I) -> NigParams
    where
        I: IntoIterator<Item = f64>,
    {
        xs.into_iter().fold(self, |state, x| state.observe(x))
    }

    /// Posterior point estimate of the observation sigma,
    /// `sqrt(beta / (alpha - 1))`. Undefined unless `alpha > 1`.
    pub fn posterior_sigma(&self) -> Option<f64> {
        if self.alpha > 1.0 && self.beta >= 0.0 {
            Some((self.beta / (self.alpha - 1.0)).sqrt())
        } else {
            None
        }
    }

    /// Scale of the Student-t predictive distribution for a new observation,
    /// `sqrt(beta * (kappa + 1) / (alpha * kappa))`.
    /// Undefined unless `alpha > 0` and `kappa > 0`.
    pub fn predictive_sigma(&self) -> Option<f64> {
        if self.alpha > 0.0 && self.kappa > 0.0 && self.beta >= 0.0 {
            Some((self.beta * (self.kappa + 1.0) / (self.alpha * self.kappa)).sqrt())
        } else {
            None
        }
    }

    /// 95% normal-approximation credible interval on the posterior mean,
    /// `mu ± 1.96 * posterior_sigma / sqrt(kappa)`.
    pub fn credible_interval_95(&self) -> Option<(f64, f64)> {
        let sigma = self.posterior_sigma()?;
        if self.kappa <= 0.0 {
            return None;
        }
        let stderr = sigma / self.kappa.sqrt();
        Some((self.mu - 1.96 * stderr, self.mu + 1.96 * stderr))
    }

    /// Probability that a new observation lands outside `[lower, upper]`,
    /// approximating the Student-t predictive with a Normal of the
    /// predictive sigma. Returns 0.0 when the predictive is undefined or
    /// degenerate.
    pub fn predictive_outside_prob(&self, lower: f64, upper: f64) -> f64 {
        match self.predictive_sigma() {
            Some(s) if s.is_finite() && s > 0.0 => {
                let inside = normal_cdf(upper, self.mu, s) - normal_cdf(lower, self.mu, s);
                if inside.is_nan() {
                    return 0.0;
                }
                (1.0 - inside).clamp(0.0, 1.0)
            }
            _ => 0.0,
        }
    }
}
