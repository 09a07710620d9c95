use crate::config::types::{Config, CrawlerConfig, FetchConfig, OutputConfig, SiteConfig, UserAgentConfig};
use crate::ConfigError;
use regex::Regex;
use url::Url;

/// Upper bound on simultaneously in-flight requests
const MAX_CONCURRENT_REQUESTS: usize = 1000;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_fetch_config(&config.fetch)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;
    validate_site_config(&config.site)?;
    Ok(())
}

/// Validates crawl session configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.site_map_url).map_err(|e| {
        ConfigError::InvalidUrl(format!(
            "Invalid site_map_url '{}': {}",
            config.site_map_url, e
        ))
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::Validation(format!(
            "site_map_url '{}' must use http or https",
            config.site_map_url
        )));
    }

    if config.cache_key.is_empty() {
        return Err(ConfigError::Validation(
            "cache_key cannot be empty".to_string(),
        ));
    }

    if config.url_cache_key.is_empty() {
        return Err(ConfigError::Validation(
            "url_cache_key cannot be empty".to_string(),
        ));
    }

    if config.fetch_limit == Some(0) {
        return Err(ConfigError::Validation(
            "fetch_limit must be >= 1 when set".to_string(),
        ));
    }

    Ok(())
}

/// Validates fetch pool configuration
fn validate_fetch_config(config: &FetchConfig) -> Result<(), ConfigError> {
    if config.max_concurrent_requests < 1 || config.max_concurrent_requests > MAX_CONCURRENT_REQUESTS
    {
        return Err(ConfigError::Validation(format!(
            "max_concurrent_requests must be between 1 and {}, got {}",
            MAX_CONCURRENT_REQUESTS, config.max_concurrent_requests
        )));
    }

    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "timeout_secs must be >= 1, got {}",
            config.timeout_secs
        )));
    }

    if config.connect_timeout_secs < 1 || config.connect_timeout_secs > config.timeout_secs {
        return Err(ConfigError::Validation(format!(
            "connect_timeout_secs must be between 1 and timeout_secs ({}), got {}",
            config.timeout_secs, config.connect_timeout_secs
        )));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    // Validate crawler name: non-empty, alphanumeric + hyphens only
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

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.cache_path.is_empty() {
        return Err(ConfigError::Validation(
            "cache_path cannot be empty".to_string(),
        ));
    }

    if config.html_dir.is_empty() {
        return Err(ConfigError::Validation(
            "html_dir cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates site adapter configuration
fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    validate_pattern("index_pattern", &config.index_pattern)?;
    validate_pattern("content_pattern", &config.content_pattern)?;
    Ok(())
}

fn validate_pattern(name: &str, pattern: &str) -> Result<(), ConfigError> {
    if pattern.is_empty() {
        return Err(ConfigError::InvalidPattern(format!(
            "{} cannot be empty",
            name
        )));
    }

    Regex::new(pattern)
        .map(|_| ())
        .map_err(|e| ConfigError::InvalidPattern(format!("{} '{}': {}", name, pattern, e)))
}

/// Basic email validation
fn validate_email(email: &str) -> Result<(), ConfigError> {
    if email.is_empty() {
        return Err(ConfigError::Validation(
            "contact_email cannot be empty".to_string(),
        ));
    }

    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    if !parts[1].contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid email domain: '{}'",
            email
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn crawler_config(site_map_url: &str) -> CrawlerConfig {
        CrawlerConfig {
            site_map_url: site_map_url.to_string(),
            cache_key: "recipes".to_string(),
            url_cache_key: "recipes-pages".to_string(),
            read_structure_cache: false,
            read_response_cache: false,
            debug_mode: false,
            fetch_limit: None,
        }
    }

    #[test]
    fn test_validate_crawler_config() {
        assert!(validate_crawler_config(&crawler_config("https://example.com/sitemap")).is_ok());
        assert!(validate_crawler_config(&crawler_config("http://127.0.0.1:8080/")).is_ok());

        assert!(matches!(
            validate_crawler_config(&crawler_config("not a url")),
            Err(ConfigError::InvalidUrl(_))
        ));
        assert!(matches!(
            validate_crawler_config(&crawler_config("ftp://example.com/")),
            Err(ConfigError::Validation(_))
        ));

        let mut config = crawler_config("https://example.com/");
        config.cache_key.clear();
        assert!(validate_crawler_config(&config).is_err());

        let mut config = crawler_config("https://example.com/");
        config.fetch_limit = Some(0);
        assert!(validate_crawler_config(&config).is_err());
    }

    #[test]
    fn test_validate_fetch_config() {
        assert!(validate_fetch_config(&FetchConfig::default()).is_ok());

        let unbounded = FetchConfig {
            max_concurrent_requests: 5000,
            ..FetchConfig::default()
        };
        assert!(validate_fetch_config(&unbounded).is_err());

        let zero = FetchConfig {
            max_concurrent_requests: 0,
            ..FetchConfig::default()
        };
        assert!(validate_fetch_config(&zero).is_err());

        let slow_connect = FetchConfig {
            timeout_secs: 5,
            connect_timeout_secs: 10,
            ..FetchConfig::default()
        };
        assert!(validate_fetch_config(&slow_connect).is_err());
    }

    #[test]
    fn test_validate_pattern() {
        assert!(validate_pattern("index_pattern", "/sitemap/").is_ok());
        assert!(validate_pattern("content_pattern", r"/recipes/\d+").is_ok());

        assert!(validate_pattern("index_pattern", "").is_err());
        assert!(matches!(
            validate_pattern("content_pattern", "(unclosed"),
            Err(ConfigError::InvalidPattern(_))
        ));
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("user@example.com").is_ok());
        assert!(validate_email("admin@sub.example.com").is_ok());

        assert!(validate_email("").is_err());
        assert!(validate_email("invalid").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("user@").is_err());
        assert!(validate_email("user@domain").is_err());
    }
}
