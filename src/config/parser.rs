use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigResult;
use std::path::Path;

/// Parses and validates a configuration document
///
/// Both cache keys and the site-map URL are required; every other key
/// falls back to its default.
pub fn parse_config(content: &str) -> ConfigResult<Config> {
    let config: Config = toml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}

/// Reads a TOML configuration file and hands it to [`parse_config`]
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use sitemap_harvest::config::load_config;
///
/// let config = load_config(Path::new("harvest.toml")).unwrap();
/// println!("Cache key: {}", config.crawler.cache_key);
/// ```
pub fn load_config(path: &Path) -> ConfigResult<Config> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ConfigError;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const BASE_CONFIG: &str = r#"
[crawler]
site-map-url = "https://recipes.example.com/sitemap"
cache-key = "recipes"
url-cache-key = "recipes-pages"

[user-agent]
crawler-name = "TestCrawler"
crawler-version = "1.0"
contact-url = "https://example.com/about"
contact-email = "admin@example.com"

[output]
cache-path = "./test.db"
"#;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = parse_config(BASE_CONFIG).unwrap();

        assert_eq!(config.crawler.cache_key, "recipes");
        assert_eq!(config.crawler.url_cache_key, "recipes-pages");
        assert!(!config.crawler.read_structure_cache);
        assert!(!config.crawler.read_response_cache);
        assert!(!config.crawler.debug_mode);
        assert_eq!(config.crawler.fetch_limit, None);
        assert_eq!(config.fetch.max_concurrent_requests, 200);
        assert_eq!(config.fetch.connect_timeout_secs, 10);
        assert_eq!(config.output.html_dir, "./html_pages");
        assert_eq!(config.site.index_pattern, "sitemap");
        assert_eq!(config.site.max_depth, 5);
    }

    #[test]
    fn test_mode_flags_and_fetch_limit() {
        let content = BASE_CONFIG.replace(
            "url-cache-key = \"recipes-pages\"\n",
            "url-cache-key = \"recipes-pages\"\n\
             read-structure-cache = true\n\
             read-response-cache = true\n\
             debug-mode = true\n\
             fetch-limit = 25\n",
        );

        let config = parse_config(&content).unwrap();

        assert!(config.crawler.read_structure_cache);
        assert!(config.crawler.read_response_cache);
        assert!(config.crawler.debug_mode);
        assert_eq!(config.crawler.fetch_limit, Some(25));
    }

    #[test]
    fn test_response_cache_without_key_is_rejected() {
        let content = BASE_CONFIG.replace(
            "url-cache-key = \"recipes-pages\"\n",
            "read-response-cache = true\n",
        );

        let err = parse_config(&content).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.to_string().contains("url-cache-key"));
    }

    #[test]
    fn test_empty_structure_key_is_rejected() {
        let content = BASE_CONFIG.replace("cache-key = \"recipes\"", "cache-key = \"\"");
        assert!(matches!(
            parse_config(&content),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_zero_fetch_limit_is_rejected() {
        let content = BASE_CONFIG.replace(
            "url-cache-key = \"recipes-pages\"\n",
            "url-cache-key = \"recipes-pages\"\nfetch-limit = 0\n",
        );
        assert!(matches!(
            parse_config(&content),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_bad_content_pattern_is_rejected() {
        let content = format!("{}\n[site]\ncontent-pattern = \"/recipes/(\"\n", BASE_CONFIG);
        assert!(matches!(
            parse_config(&content),
            Err(ConfigError::InvalidPattern(_))
        ));
    }

    #[test]
    fn test_non_http_site_map_is_rejected() {
        let content = BASE_CONFIG.replace(
            "https://recipes.example.com/sitemap",
            "ftp://recipes.example.com/sitemap",
        );
        assert!(parse_config(&content).is_err());
    }

    #[test]
    fn test_load_config_reads_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(BASE_CONFIG.as_bytes()).unwrap();
        file.flush().unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(
            config.crawler.site_map_url,
            "https://recipes.example.com/sitemap"
        );
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config(Path::new("/nonexistent/harvest.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
