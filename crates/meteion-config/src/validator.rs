//! Configuration validation.

use crate::error::ConfigError;
use crate::schema::Config;

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

    /// Convert into an error carrying the first problem, if any.
    pub fn into_result(self) -> Result<Vec<ValidationWarning>, ConfigError> {
        match self.errors.into_iter().next() {
            Some(first) => Err(ConfigError::InvalidValue {
                field: first.path,
                message: first.message,
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

        Self::validate_server(config, &mut result);
        Self::validate_webhook(config, &mut result);
        Self::validate_chat(config, &mut result);

        result
    }

    fn validate_server(config: &Config, result: &mut ValidationResult) {
        if config.server.port == 0 {
            result.add_error(ValidationError::new("server.port", "Port cannot be 0"));
        }

        if config.server.host.is_empty() {
            result.add_error(ValidationError::new("server.host", "Host cannot be empty"));
        } else if !is_loopback(&config.server.host) {
            result.add_warning(ValidationWarning::new(
                "server.host",
                format!(
                    "'{}' is not a loopback address; the control server has no authentication",
                    config.server.host
                ),
            ));
        }

        if config.server.request_timeout_seconds == 0 {
            result.add_error(ValidationError::new(
                "server.request_timeout_seconds",
                "request_timeout_seconds must be greater than 0",
            ));
        }

        if config.server.max_body_bytes == 0 {
            result.add_error(ValidationError::new(
                "server.max_body_bytes",
                "max_body_bytes must be greater than 0",
            ));
        }
    }

    fn validate_webhook(config: &Config, result: &mut ValidationResult) {
        let webhook = &config.webhook;

        if !webhook.url.starts_with("http://") && !webhook.url.starts_with("https://") {
            result.add_error(ValidationError::new(
                "webhook.url",
                "url must start with http:// or https://",
            ));
        }

        if webhook.heartbeat_interval_seconds == 0 {
            result.add_error(ValidationError::new(
                "webhook.heartbeat_interval_seconds",
                "heartbeat_interval_seconds must be greater than 0",
            ));
        }

        if webhook.timeout_seconds == 0 {
            result.add_error(ValidationError::new(
                "webhook.timeout_seconds",
                "timeout_seconds must be greater than 0",
            ));
        } else if webhook.heartbeat_interval_seconds > 0
            && webhook.heartbeat_interval_seconds < webhook.timeout_seconds
        {
            result.add_warning(ValidationWarning::new(
                "webhook.heartbeat_interval_seconds",
                "heartbeat interval is shorter than the request timeout; probes may pile up",
            ));
        }
    }

    fn validate_chat(config: &Config, result: &mut ValidationResult) {
        if config.chat.lock_timeout_ms == 0 {
            result.add_error(ValidationError::new(
                "chat.lock_timeout_ms",
                "lock_timeout_ms must be greater than 0",
            ));
        }
    }
}

fn is_loopback(host: &str) -> bool {
    match host.parse::<std::net::IpAddr>() {
        Ok(ip) => ip.is_loopback(),
        Err(_) => host.eq_ignore_ascii_case("localhost"),
    }
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
