use thiserror::Error;

use crate::config::{ServiceSettings, Settings};

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

pub struct ConfigValidator;

impl ConfigValidator {
    pub fn validate(settings: &Settings) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(e) = Self::validate_service(&settings.service) {
            errors.extend(e);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn validate_service(service: &ServiceSettings) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if service.url.is_empty() {
            errors.push(ValidationError::MissingField("service.url".to_string()));
        } else {
            match reqwest::Url::parse(&service.url) {
                Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
                Ok(url) => errors.push(ValidationError::InvalidValue {
                    field: "service.url".to_string(),
                    reason: format!("Unsupported scheme '{}'", url.scheme()),
                }),
                Err(e) => errors.push(ValidationError::InvalidValue {
                    field: "service.url".to_string(),
                    reason: e.to_string(),
                }),
            }
        }

        if service.assistant_id.trim().is_empty() {
            errors.push(ValidationError::MissingField("service.assistant_id".to_string()));
        }

        if service.connect_timeout_seconds == 0 {
            errors.push(ValidationError::InvalidValue {
                field: "service.connect_timeout_seconds".to_string(),
                reason: "Timeout must be greater than 0".to_string(),
            });
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
