//! Semantic validation for stream and prior configuration.

use crate::{PriorConfig, StreamConfig};
use thiserror::Error;

/// Validation result type.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Configuration validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("Semantic validation failed: {0}")]
    SemanticError(String),
}

impl ValidationError {
    fn invalid(field: &str, message: impl Into<String>) -> Self {
        ValidationError::InvalidValue {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Validate a stream configuration version semantically.
pub fn validate_stream_config(config: &StreamConfig) -> ValidationResult<()> {
    if config.stream_id.as_str().is_empty() {
        return Err(ValidationError::MissingField("stream_id".to_string()));
    }

    if !config.target_value.is_finite() {
        return Err(ValidationError::invalid(
            "target_value",
            "must be finite".to_string(),
        ));
    }

    if !(config.sigma.is_finite() && config.sigma > 0.0) {
        return Err(ValidationError::invalid(
            "sigma",
            format!("must be > 0, got {}", config.sigma),
        ));
    }

    if !(config.warning_limit_sd > 0.0) {
        return Err(ValidationError::invalid(
            "warning_limit_sd",
            format!("must be > 0, got {}", config.warning_limit_sd),
        ));
    }

    if config.action_limit_sd < config.warning_limit_sd {
        return Err(ValidationError::SemanticError(format!(
            "action_limit_sd ({}) must be >= warning_limit_sd ({})",
            config.action_limit_sd, config.warning_limit_sd
        )));
    }

    if let (Some(min), Some(max)) = (config.min_value, config.max_value) {
        if min >= max {
            return Err(ValidationError::SemanticError(format!(
                "min_value ({min}) must be < max_value ({max})"
            )));
        }
    }

    if config.risk_threshold_warn > config.risk_threshold_hold {
        return Err(ValidationError::SemanticError(format!(
            "risk_threshold_warn ({}) must be <= risk_threshold_hold ({})",
            config.risk_threshold_warn, config.risk_threshold_hold
        )));
    }

    if config.risk_threshold_hold > 100 {
        return Err(ValidationError::invalid(
            "risk_threshold_hold",
            format!("must be <= 100, got {}", config.risk_threshold_hold),
        ));
    }

    match (config.baseline_start, config.baseline_end) {
        (Some(start), Some(end)) if start > end => {
            return Err(ValidationError::SemanticError(format!(
                "baseline_start ({start}) must be <= baseline_end ({end})"
            )));
        }
        (Some(_), None) | (None, Some(_)) => {
            return Err(ValidationError::SemanticError(
                "baseline_start and baseline_end must be set together".to_string(),
            ));
        }
        _ => {}
    }

    if config.rule_set.is_empty() {
        return Err(ValidationError::invalid(
            "rule_set",
            "must enable at least one rule".to_string(),
        ));
    }

    if let Some(table) = &config.unit_conversions {
        for (unit, factor) in table {
            if !(factor.is_finite() && *factor > 0.0) {
                return Err(ValidationError::invalid(
                    "unit_conversions",
                    format!("factor for {unit} must be > 0, got {factor}"),
                ));
            }
        }
    }

    Ok(())
}

/// Validate prior hyperparameters semantically.
pub fn validate_prior_config(prior: &PriorConfig) -> ValidationResult<()> {
    if prior.stream_id.as_str().is_empty() {
        return Err(ValidationError::MissingField("stream_id".to_string()));
    }

    if !prior.mu0.is_finite() {
        return Err(ValidationError::invalid("mu0", "must be finite".to_string()));
    }

    for (field, value) in [
        ("kappa0", prior.kappa0),
        ("alpha0", prior.alpha0),
        ("beta0", prior.beta0),
    ] {
        if !(value.is_finite() && value > 0.0) {
            return Err(ValidationError::invalid(
                field,
                format!("must be > 0, got {value}"),
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono::Utc;
    use qc_common::StreamId;

    fn base_config() -> StreamConfig {
        serde_json::from_str(
            r#"{
                "stream_id": "hba1c-arch-l1",
                "effective_from": "2026-01-01T00:00:00Z",
                "analyte": "HbA1c",
                "method": "HPLC",
                "instrument": "Architect",
                "qc_level": "Level 1",
                "control_material_lot": "LOT-001",
                "units": "%",
                "target_value": 5.2,
                "sigma": 0.25
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn base_config_is_valid() {
        assert!(validate_stream_config(&base_config()).is_ok());
    }

    #[test]
    fn rejects_non_positive_sigma() {
        let mut config = base_config();
        config.sigma = 0.0;
        assert!(matches!(
            validate_stream_config(&config),
            Err(ValidationError::InvalidValue { field, .. }) if field == "sigma"
        ));
    }

    #[test]
    fn rejects_inverted_limits_and_thresholds() {
        let mut config = base_config();
        config.action_limit_sd = 1.5;
        assert!(validate_stream_config(&config).is_err());

        let mut config = base_config();
        config.risk_threshold_warn = 90;
        config.risk_threshold_hold = 80;
        assert!(validate_stream_config(&config).is_err());
    }

    #[test]
    fn rejects_half_open_baseline_window() {
        let mut config = base_config();
        config.baseline_start = Some(Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap());
        assert!(validate_stream_config(&config).is_err());
    }

    #[test]
    fn rejects_empty_rule_set() {
        let mut config = base_config();
        config.rule_set.clear();
        assert!(validate_stream_config(&config).is_err());
    }

    #[test]
    fn prior_positivity_enforced() {
        let mut prior = PriorConfig {
            stream_id: StreamId::from("s"),
            version: 1,
            effective_from: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
            created_by: "system".to_string(),
            mu0: 5.2,
            kappa0: 4.0,
            alpha0: 3.0,
            beta0: 0.1875,
        };
        assert!(validate_prior_config(&prior).is_ok());
        prior.kappa0 = 0.0;
        assert!(validate_prior_config(&prior).is_err());
    }
}
