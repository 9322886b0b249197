//! Configuration validation rules

use crate::config::types::Config;
use crate::ConfigError;

/// Validates a parsed configuration
///
/// Rules:
/// - credentials must be non-empty (the login state machine needs them)
/// - pacing delay range must be non-empty and ordered
/// - navigation attempt bounds must be at least 1
/// - the API endpoint, when present, must be an absolute HTTP(S) URL
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.credentials.email.trim().is_empty() {
        return Err(ConfigError::Validation(
            "credentials.email must not be empty".to_string(),
        ));
    }
    if config.credentials.password.is_empty() {
        return Err(ConfigError::Validation(
            "credentials.password must not be empty".to_string(),
        ));
    }

    if config.browser.cookies_path.trim().is_empty() {
        return Err(ConfigError::Validation(
            "browser.cookies-path must not be empty".to_string(),
        ));
    }

    if config.pacing.min_delay_ms > config.pacing.max_delay_ms {
        return Err(ConfigError::Validation(format!(
            "pacing.min-delay-ms ({}) must not exceed pacing.max-delay-ms ({})",
            config.pacing.min_delay_ms, config.pacing.max_delay_ms
        )));
    }

    if config.navigation.max_nav_attempts == 0 {
        return Err(ConfigError::Validation(
            "navigation.max-nav-attempts must be at least 1".to_string(),
        ));
    }
    if config.navigation.max_reload_attempts == 0 {
        return Err(ConfigError::Validation(
            "navigation.max-reload-attempts must be at least 1".to_string(),
        ));
    }
    if config.navigation.max_scroll_steps == 0 {
        return Err(ConfigError::Validation(
            "navigation.max-scroll-steps must be at least 1".to_string(),
        ));
    }
    if config.navigation.page_timeout_ms == 0 {
        return Err(ConfigError::Validation(
            "navigation.page-timeout-ms must be at least 1".to_string(),
        ));
    }

    if let Some(api) = &config.api {
        if !api.endpoint.starts_with("http://") && !api.endpoint.starts_with("https://") {
            return Err(ConfigError::Validation(format!(
                "api.endpoint must be an absolute HTTP(S) URL, got: {}",
                api.endpoint
            )));
        }
    }

    if config.storage.database_path.trim().is_empty() {
        return Err(ConfigError::Validation(
            "storage.database-path must not be empty".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::*;

    fn valid_config() -> Config {
        Config {
            credentials: CredentialsConfig {
                email: "crawler@example.com".to_string(),
                password: "hunter2".to_string(),
            },
            api: Some(ApiConfig {
                endpoint: "https://api.example.com".to_string(),
                key: "k".to_string(),
                secret: "s".to_string(),
            }),
            browser: BrowserConfig {
                cookies_path: "./cookies.json".to_string(),
                user_agent: "TestAgent/1.0".to_string(),
                headless: true,
            },
            navigation: NavigationConfig::default(),
            pacing: PacingConfig {
                min_delay_ms: 1000,
                max_delay_ms: 2000,
                max_crash_retries: 3,
            },
            storage: StorageConfig {
                database_path: "./vitae.db".to_string(),
            },
        }
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(validate(&valid_config()).is_ok());
    }

    #[test]
    fn test_empty_email_rejected() {
        let mut config = valid_config();
        config.credentials.email = "  ".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_inverted_pacing_range_rejected() {
        let mut config = valid_config();
        config.pacing.min_delay_ms = 5000;
        config.pacing.max_delay_ms = 1000;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_equal_pacing_bounds_allowed() {
        let mut config = valid_config();
        config.pacing.min_delay_ms = 1000;
        config.pacing.max_delay_ms = 1000;
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_zero_attempts_rejected() {
        let mut config = valid_config();
        config.navigation.max_nav_attempts = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_relative_api_endpoint_rejected() {
        let mut config = valid_config();
        config.api.as_mut().unwrap().endpoint = "api.example.com".to_string();
        assert!(validate(&config).is_err());
    }
}
