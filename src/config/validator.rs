//! Config validation: bounds and identifier safety.

use crate::config::ServerConfig;
use crate::error::ConfigError;

/// Schema names are interpolated into DDL, so only plain identifiers are accepted.
pub fn is_plain_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    s.len() <= 63 && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

pub fn validate(config: &ServerConfig) -> Result<(), ConfigError> {
    if !is_plain_identifier(&config.schema) {
        return Err(ConfigError::Validation(format!(
            "schema '{}' must be a plain identifier ([A-Za-z_][A-Za-z0-9_]*)",
            config.schema
        )));
    }
    if config.max_connections == 0 {
        return Err(ConfigError::Validation("max_connections must be at least 1".into()));
    }
    if config.max_students_per_course == 0 {
        return Err(ConfigError::Validation("max_students_per_course must be at least 1".into()));
    }
    if config.max_body_bytes == 0 {
        return Err(ConfigError::Validation("max_body_bytes must be at least 1".into()));
    }
    if config.database_url.trim().is_empty() {
        return Err(ConfigError::Validation("database_url must not be empty".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers() {
        assert!(is_plain_identifier("public"));
        assert!(is_plain_identifier("_school_2"));
        assert!(!is_plain_identifier(""));
        assert!(!is_plain_identifier("2fast"));
        assert!(!is_plain_identifier("a\"; DROP"));
    }

    #[test]
    fn zero_limits_are_rejected() {
        let config = ServerConfig {
            max_students_per_course: 0,
            ..Default::default()
        };
        assert!(validate(&config).is_err());
        assert!(validate(&ServerConfig::default()).is_ok());
    }
}
