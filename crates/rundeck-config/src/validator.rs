//! Configuration validation.

use crate::error::ConfigError;
use crate::schema::Config;

/// Oldest API version that accepts JSON job definitions on import.
pub const MIN_API_VERSION: u32 = 14;

/// Validation result.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }

    /// Turn the first error into a `ConfigError`, handing back the warnings otherwise.
    pub fn into_result(self) -> Result<Vec<ValidationWarning>, ConfigError> {
        match self.errors.into_iter().next() {
            Some(error) => Err(ConfigError::InvalidValue {
                field: error.path,
                message: error.message,
            }),
            None => Ok(self.warnings),
        }
    }
}

/// A validation error.
#[derive(Debug)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// A validation warning.
#[derive(Debug)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration.
    pub fn validate(config: &Config) -> ValidationResult {
        let mut result = ValidationResult::default();
        Self::validate_provider(config, &mut result);
        result
    }

    fn validate_provider(config: &Config, result: &mut ValidationResult) {
        let provider = &config.provider;

        if provider.url.is_empty() {
            result.add_error(ValidationError::new("provider.url", "url cannot be empty"));
        } else if !provider.url.starts_with("http://") && !provider.url.starts_with("https://") {
            result.add_error(ValidationError::new(
                "provider.url",
                "url must start with http:// or https://",
            ));
        }

        if provider.api_version < MIN_API_VERSION {
            result.add_error(ValidationError::new(
                "provider.api_version",
                format!(
                    "api_version {} is too old, JSON job import needs at least {}",
                    provider.api_version, MIN_API_VERSION
                ),
            ));
        }

        if provider.timeout_seconds == 0 {
            result.add_error(ValidationError::new(
                "provider.timeout_seconds",
                "timeout_seconds must be greater than 0",
            ));
        }

        match provider.auth_token.as_deref() {
            None | Some("") => result.add_warning(ValidationWarning::new(
                "provider.auth_token",
                "auth_token is not set, requests will be rejected unless the server allows anonymous access",
            )),
            Some(_) => {}
        }
    }
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
