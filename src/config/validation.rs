use crate::config::types::{
    ChunkingConfig, ClassifierConfig, Config, CrawlerConfig, OutputConfig, ScopeConfig,
    SinkConfig, UserAgentConfig,
};
use crate::url::ScopePolicy;
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_scope_config(&config.scope)?;
    validate_chunking_config(&config.chunking)?;
    if let Some(classifier) = &config.classifier {
        validate_classifier_config(classifier)?;
    }
    validate_output_config(&config.output)?;
    if let Some(sink) = &config.sink {
        validate_sink_config(sink)?;
    }
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_concurrent_pages_open < 1 || config.max_concurrent_pages_open > 100 {
        return Err(ConfigError::Validation(format!(
            "max_concurrent_pages_open must be between 1 and 100, got {}",
            config.max_concurrent_pages_open
        )));
    }

    if config.request_timeout == 0 {
        return Err(ConfigError::Validation(
            "request_timeout must be greater than 0ms".to_string(),
        ));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;

    validate_email(&config.contact_email)?;

    Ok(())
}

/// Validates seeds and scope patterns
///
/// Every seed must itself be admitted by the scope predicate; a seed that the
/// crawl would refuse to fetch is a configuration mistake, not a runtime skip.
fn validate_scope_config(config: &ScopeConfig) -> Result<(), ConfigError> {
    if config.seeds.is_empty() {
        return Err(ConfigError::Validation(
            "scope must list at least one seed URL".to_string(),
        ));
    }

    if config.domains.is_empty() && config.patterns.is_empty() {
        return Err(ConfigError::Validation(
            "scope must list at least one domain or pattern".to_string(),
        ));
    }

    for domain in &config.domains {
        validate_domain_pattern(domain)?;
    }

    let policy = ScopePolicy::from_config(config)?;

    for seed in &config.seeds {
        let url = Url::parse(seed)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid seed URL '{}': {}", seed, e)))?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::Validation(format!(
                "Seed URL '{}' must use HTTP or HTTPS",
                seed
            )));
        }

        if !policy.allows(&url) {
            return Err(ConfigError::Validation(format!(
                "Seed URL '{}' is outside the configured scope",
                seed
            )));
        }
    }

    Ok(())
}

/// Validates chunking parameters
fn validate_chunking_config(config: &ChunkingConfig) -> Result<(), ConfigError> {
    if config.max_chunk_length == 0 {
        return Err(ConfigError::Validation(
            "max_chunk_length must be greater than 0".to_string(),
        ));
    }

    if config.overlap_length >= config.max_chunk_length {
        return Err(ConfigError::Validation(format!(
            "overlap_length must be less than max_chunk_length ({}), got {}",
            config.max_chunk_length, config.overlap_length
        )));
    }

    Ok(())
}

fn validate_classifier_config(config: &ClassifierConfig) -> Result<(), ConfigError> {
    if config.keywords.iter().all(|k| k.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "classifier must list at least one non-empty keyword".to_string(),
        ));
    }

    if config.min_matches < 1 {
        return Err(ConfigError::Validation(
            "classifier min_matches must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.directory.is_empty() {
        return Err(ConfigError::Validation(
            "output directory cannot be empty".to_string(),
        ));
    }

    if config.file_prefix.is_empty() {
        return Err(ConfigError::Validation(
            "output file_prefix cannot be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_sink_config(config: &SinkConfig) -> Result<(), ConfigError> {
    let endpoint = Url::parse(&config.endpoint)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid sink endpoint: {}", e)))?;

    if endpoint.scheme() != "http" && endpoint.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "Sink endpoint '{}' must use HTTP or HTTPS",
            config.endpoint
        )));
    }

    if config.collection_name.trim().is_empty() {
        return Err(ConfigError::Validation(
            "sink collection_name cannot be empty".to_string(),
        ));
    }

    if config.queue_capacity == 0 {
        return Err(ConfigError::Validation(
            "sink queue_capacity must be greater than 0".to_string(),
        ));
    }

    if config.request_timeout == 0 {
        return Err(ConfigError::Validation(
            "sink request_timeout must be greater than 0ms".to_string(),
        ));
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

    match pattern.strip_prefix("*.") {
        Some(domain) => validate_domain_string(domain),
        None => validate_domain_string(pattern),
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

    Ok(())
}

/// Basic email validation
fn validate_email(email: &str) -> Result<(), ConfigError> {
    let (local, domain) = email
        .split_once('@')
        .ok_or_else(|| ConfigError::Validation(format!("Invalid email format: '{}'", email)))?;

    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    if !domain.contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid email domain: '{}'",
            email
        )));
    }

    Ok(())
}
