//! Bayesian sequential risk estimator.
//!
//! Maintains a per-stream Normal-Inverse-Gamma posterior over the stream's
//! true (mean, variance) and derives the probability that a new observation
//! lands outside the configured action limits. Unlike the frequentist
//! engine, which checks the observed value, this estimates where the
//! stream's true level is heading.
//!
//! The posterior is seeded from the prior effective at the first included
//! observation and only ever advanced by the conjugate update; incremental
//! ingestion and full replay must produce identical state.

use chrono::{DateTime, Utc};
use qc_common::{BayesianRisk, CredibleInterval, Result, StreamId};
use qc_config::StreamConfig;
use qc_math::NigParams;
use tracing::debug;

use crate::store::{ConfigStore, PosteriorState, PosteriorStore, RecordStore};

/// Compute the Bayesian risk for one measurement and advance the persisted
/// posterior.
///
/// Missing prior config degrades to zero risk with no state write. The
/// read-modify-write goes through [`PosteriorStore::update`] in one atomic
/// step, so concurrent ingestion for the same stream never loses an
/// observation.
pub fn infer_risk<C, P>(
    configs: &C,
    posteriors: &P,
    config: &StreamConfig,
    value: f64,
    timestamp: DateTime<Utc>,
) -> Result<BayesianRisk>
where
    C: ConfigStore + ?Sized,
    P: PosteriorStore + ?Sized,
{
    let Some(prior) = configs.effective_prior(&config.stream_id, timestamp)? else {
        return Ok(BayesianRisk::zero());
    };

    let state = posteriors.update(&config.stream_id, &mut |existing| {
        let (seed, n_obs) = match &existing {
            Some(state) => (state.params(), state.n_obs),
            None => (
                NigParams::new(prior.mu0, prior.kappa0, prior.alpha0, prior.beta0),
                0,
            ),
        };
        PosteriorState::from_params(seed.observe(value), n_obs + 1, timestamp)
    })?;

    let risk = derive_risk(&state.params(), config);

    debug!(
        stream_id = %config.stream_id,
        n_obs = state.n_obs,
        risk_score = risk.risk_score,
        "posterior updated"
    );

    Ok(risk)
}

/// Derive the risk outputs from a posterior against the configured limits.
///
/// Only `probability_outside_limits` and `risk_score` are guaranteed;
/// degenerate posteriors (alpha <= 1 etc.) omit the dependent fields
/// instead of failing.
fn derive_risk(posterior: &NigParams, config: &StreamConfig) -> BayesianRisk {
    let (lower, upper) = config.action_limits();
    let probability = posterior.predictive_outside_prob(lower, upper);
    let risk_score = (probability * 100.0).round().clamp(0.0, 100.0) as u8;

    BayesianRisk {
        probability_outside_limits: probability,
        risk_score,
        posterior_mean: Some(posterior.mu),
        posterior_sigma: posterior.posterior_sigma(),
        predictive_sigma: posterior.predictive_sigma(),
        credible_interval: posterior
            .credible_interval_95()
            .map(|(lo, hi)| CredibleInterval {
                lower: lo,
                upper: hi,
            }),
    }
}

/// Discard and rebuild a stream's posterior from its full included history.
///
/// Used after a correction invalidates previously included records. Returns
/// the rebuilt state, or `None` (with any old state deleted) when no
/// included records or no prior exist.
pub fn rebuild_posterior<C, R, P>(
    configs: &C,
    records: &R,
    posteriors: &P,
    stream_id: &StreamId,
) -> Result<Option<PosteriorState>>
where
    C: ConfigStore + ?Sized,
    R: RecordStore + ?Sized,
    P: PosteriorStore + ?Sized,
{
    posteriors.delete(stream_id)?;

    let history = records.included_records(stream_id)?;
    let Some(first) = history.first() else {
        return Ok(None);
    };
    let Some(prior) = configs.effective_prior(stream_id, first.timestamp)? else {
        return Ok(None);
    };

    let mut params = NigParams::new(prior.mu0, prior.kappa0, prior.alpha0, prior.beta0);
    let mut updated_at = first.timestamp;
    for record in &history {
        params = params.observe(record.result_value);
        updated_at = record.timestamp;
    }

    let state = PosteriorState::from_params(params, history.len() as u64, updated_at);
    posteriors.put(stream_id, state.clone())?;

    debug!(
        stream_id = %stream_id,
        n_obs = state.n_obs,
        "posterior rebuilt from history"
    );

    Ok(Some(state))
}
