use crate::config::types::{
    Config, ExtractionConfig, IdentificationConfig, PipelineConfig, RuleEntry, UserAgentConfig,
};
use crate::url::ClassifierRule;
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_user_agent_config(&config.user_agent)?;
    validate_pipeline_config(&config.pipeline)?;
    validate_extraction_config(&config.extraction)?;
    validate_identification_config(&config.identification)?;
    validate_classifier_rules(&config.classifier_rules)?;
    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.client_name.is_empty() {
        return Err(ConfigError::Validation(
            "client_name cannot be empty".to_string(),
        ));
    }

    if !config
        .client_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "client_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.client_name
        )));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;

    Ok(())
}

/// Validates link preparation configuration
fn validate_pipeline_config(config: &PipelineConfig) -> Result<(), ConfigError> {
    if config.max_links < 1 || config.max_links > 50 {
        return Err(ConfigError::Validation(format!(
            "max_links must be between 1 and 50, got {}",
            config.max_links
        )));
    }

    if config.max_redirect_hops < 1 || config.max_redirect_hops > 5 {
        return Err(ConfigError::Validation(format!(
            "max_redirect_hops must be between 1 and 5, got {}",
            config.max_redirect_hops
        )));
    }

    if config.resolve_timeout_secs < 1 || config.resolve_timeout_secs > 120 {
        return Err(ConfigError::Validation(format!(
            "resolve_timeout_secs must be between 1 and 120, got {}",
            config.resolve_timeout_secs
        )));
    }

    for pattern in &config.blocked_domains {
        validate_domain_pattern(pattern)?;
    }

    Ok(())
}

/// Validates extraction provider configuration
fn validate_extraction_config(config: &ExtractionConfig) -> Result<(), ConfigError> {
    validate_endpoint("extraction api_url", &config.api_url)?;

    if config.api_key_env.is_empty() {
        return Err(ConfigError::Validation(
            "extraction api_key_env cannot be empty".to_string(),
        ));
    }

    if config.max_concurrent_jobs < 1 || config.max_concurrent_jobs > 64 {
        return Err(ConfigError::Validation(format!(
            "max_concurrent_jobs must be between 1 and 64, got {}",
            config.max_concurrent_jobs
        )));
    }

    if config.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "extraction request_timeout_secs must be >= 1, got {}",
            config.request_timeout_secs
        )));
    }

    if config.max_poll_attempts < 1 {
        return Err(ConfigError::Validation(format!(
            "max_poll_attempts must be >= 1, got {}",
            config.max_poll_attempts
        )));
    }

    Ok(())
}

/// Validates identification configuration
fn validate_identification_config(config: &IdentificationConfig) -> Result<(), ConfigError> {
    validate_endpoint("identification api_url", &config.api_url)?;

    if config.model.trim().is_empty() {
        return Err(ConfigError::Validation("model cannot be empty".to_string()));
    }

    if !(0.0..=2.0).contains(&config.temperature) {
        return Err(ConfigError::Validation(format!(
            "temperature must be between 0.0 and 2.0, got {}",
            config.temperature
        )));
    }

    if config.max_search_terms < 1 || config.max_search_terms > 10 {
        return Err(ConfigError::Validation(format!(
            "max_search_terms must be between 1 and 10, got {}",
            config.max_search_terms
        )));
    }

    Ok(())
}

/// Validates extra classifier rules by compiling them
fn validate_classifier_rules(rules: &[RuleEntry]) -> Result<(), ConfigError> {
    for entry in rules {
        if let Some(domain) = &entry.domain {
            validate_domain_pattern(domain)?;
        }
        ClassifierRule::from_entry(entry)?;
    }
    Ok(())
}

/// Validates an absolute http(s) endpoint
fn validate_endpoint(name: &str, value: &str) -> Result<(), ConfigError> {
    let url =
        Url::parse(value).map_err(|e| ConfigError::InvalidUrl(format!("Invalid {}: {}", name, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "{} must use http or https, got '{}'",
            name, value
        )));
    }

    Ok(())
}

/// Validates a domain pattern (supports wildcards)
fn validate_domain_pattern(pattern: &str) -> Result<(), ConfigError> {
    if pattern.is_empty() {
        return Err(ConfigError::InvalidPattern(
            "Domain pattern cannot be empty".to_string(),
        ));
    }

    let domain = pattern.strip_prefix("*.").unwrap_or(pattern);
    match domain.strip_suffix(".*") {
        // `brand.*` is checked as `brand.x`
        Some(brand) => validate_domain_string(&format!("{}.x", brand)),
        None => validate_domain_string(domain),
    }
}

/// Validates a domain string (without wildcard prefix)
fn validate_domain_string(domain: &str) -> Result<(), ConfigError> {
    if domain.is_empty() {
        return Err(ConfigError::InvalidPattern(
            "Domain cannot be empty".to_string(),
        ));
    }

    if !domain
        .chars()
        .all(|c| c.is_alphanumeric() || c == '.' || c == '-')
    {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' contains invalid characters",
            domain
        )));
    }

    if domain.starts_with('.')
        || domain.ends_with('.')
        || domain.starts_with('-')
        || domain.ends_with('-')
    {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' cannot start or end with '.' or '-'",
            domain
        )));
    }

    if domain.contains("..") {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' cannot contain consecutive dots",
            domain
        )));
    }

    if !domain.contains('.') {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' must contain at least one dot (e.g., 'example.com')",
            domain
        )));
    }

    Ok(())
}
