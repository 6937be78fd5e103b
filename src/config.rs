use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for the lecture search tool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Catalog location settings
    pub catalog: CatalogConfig,

    /// Search index settings
    pub search: SearchConfig,

    /// Excerpt window and highlighting settings
    pub excerpt: ExcerptConfig,

    /// Interactive mode settings
    pub interactive: InteractiveConfig,

    /// HTTP API settings
    pub server: ServerConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Path or http(s) URL of the chapters JSON document
    pub source: String,

    /// HTTP request timeout in seconds
    pub request_timeout_seconds: u64,
}

/// Which index implementation backs the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchBackend {
    /// Weighted fuzzy matching with per-field character spans
    Fuzzy,
    /// Token matching with prefix and stem expansion, no positions
    Terms,
}

impl std::str::FromStr for SearchBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "fuzzy" => Ok(SearchBackend::Fuzzy),
            "terms" => Ok(SearchBackend::Terms),
            other => Err(anyhow!("Unknown search backend: {}", other)),
        }
    }
}

/// Searchable chapter fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChapterField {
    Title,
    Course,
    FormattedDate,
    TranscriptSegment,
    SearchText,
}

/// A field together with its ranking weight
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeightedKey {
    pub field: ChapterField,
    pub weight: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Index implementation
    pub backend: SearchBackend,

    /// Fuzzy strictness (0.0 = exact, 1.0 = anything goes)
    pub threshold: f64,

    /// Shortest contiguous run that counts as a fuzzy match
    pub min_match_char_length: usize,

    /// Let query terms match as token prefixes (term backend)
    pub prefix_matching: bool,

    /// Weighted keys for the fuzzy backend
    pub fuzzy_keys: Vec<WeightedKey>,

    /// Weighted keys for the term backend
    pub term_keys: Vec<WeightedKey>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExcerptConfig {
    /// Maximum window length in characters, markup excluded
    pub max_length: usize,

    /// Characters kept before the anchor
    pub context_before: usize,

    /// Shortest query term located in the transcript
    pub min_term_length: usize,

    /// Retry unmatched terms with common suffixes stripped
    pub stem_fallback: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InteractiveConfig {
    /// Quiet period after the last input before searching
    pub debounce_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Port for the HTTP API
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// tracing env-filter directive
    pub log_level: String,
}

impl Config {
    /// Load configuration from the first config file found, else the environment
    pub fn load() -> Result<Self> {
        let config_paths = ["lecture-search.toml", "config/lecture-search.toml"];

        for path in &config_paths {
            if let Ok(config_str) = std::fs::read_to_string(path) {
                match toml::from_str(&config_str) {
                    Ok(config) => {
                        tracing::info!("📄 Loaded configuration from: {}", path);
                        return Ok(config);
                    }
                    Err(e) => {
                        tracing::warn!("Failed to parse config file {}: {}", path, e);
                    }
                }
            }
        }

        Self::from_env()
    }

    /// Load configuration from an explicit file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let config_str = std::fs::read_to_string(path)
            .map_err(|e| anyhow!("Failed to read config {}: {}", path.display(), e))?;
        let config = toml::from_str(&config_str)
            .map_err(|e| anyhow!("Failed to parse config {}: {}", path.display(), e))?;
        tracing::info!("📄 Loaded configuration from: {}", path.display());
        Ok(config)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(source) = std::env::var("LECTURE_SEARCH_CATALOG") {
            config.catalog.source = source;
        }

        if let Ok(backend) = std::env::var("LECTURE_SEARCH_BACKEND") {
            config.search.backend = backend.parse()?;
        }

        if let Ok(max_length) = std::env::var("LECTURE_SEARCH_MAX_EXCERPT") {
            config.excerpt.max_length = max_length.parse().unwrap_or(200);
        }

        if let Ok(port) = std::env::var("LECTURE_SEARCH_PORT") {
            config.server.port = port.parse().unwrap_or(8080);
        }

        if let Ok(log_level) = std::env::var("LECTURE_SEARCH_LOG_LEVEL") {
            config.logging.log_level = log_level;
        }

        Ok(config)
    }

    /// Save configuration to file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let config_str = toml::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), config_str)?;
        tracing::info!("💾 Configuration saved to: {}", path.as_ref().display());
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.catalog.source.trim().is_empty() {
            return Err(anyhow!("catalog.source must not be empty"));
        }

        if self.excerpt.max_length == 0 {
            return Err(anyhow!("excerpt.max_length must be greater than 0"));
        }

        if self.excerpt.context_before >= self.excerpt.max_length {
            return Err(anyhow!(
                "excerpt.context_before ({}) must be smaller than excerpt.max_length ({})",
                self.excerpt.context_before,
                self.excerpt.max_length
            ));
        }

        if !(0.0..=1.0).contains(&self.search.threshold) {
            return Err(anyhow!("search.threshold must be within 0.0..=1.0"));
        }

        if self.interactive.debounce_ms == 0 {
            return Err(anyhow!("interactive.debounce_ms must be greater than 0"));
        }

        tracing::debug!("✅ Configuration validation passed");
        Ok(())
    }

    /// Get runtime configuration summary
    pub fn summary(&self) -> String {
        format!(
            "Lecture Search Configuration:\n\
            - Catalog: {}\n\
            - Backend: {:?}\n\
            - Threshold: {}\n\
            - Excerpt: {} chars ({} before anchor)\n\
            - Stem Fallback: {}\n\
            - Debounce: {}ms",
            self.catalog.source,
            self.search.backend,
            self.search.threshold,
            self.excerpt.max_length,
            self.excerpt.context_before,
            self.excerpt.stem_fallback,
            self.interactive.debounce_ms
        )
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            backend: SearchBackend::Fuzzy,
            threshold: 0.3,
            min_match_char_length: 3,
            prefix_matching: true,
            fuzzy_keys: vec![
                WeightedKey { field: ChapterField::Title, weight: 2.0 },
                WeightedKey { field: ChapterField::Course, weight: 1.0 },
                WeightedKey { field: ChapterField::FormattedDate, weight: 1.0 },
                WeightedKey { field: ChapterField::SearchText, weight: 3.0 },
            ],
            term_keys: vec![
                WeightedKey { field: ChapterField::Title, weight: 2.0 },
                WeightedKey { field: ChapterField::TranscriptSegment, weight: 1.0 },
                WeightedKey { field: ChapterField::Course, weight: 1.0 },
                WeightedKey { field: ChapterField::FormattedDate, weight: 1.0 },
            ],
        }
    }
}

impl Default for ExcerptConfig {
    fn default() -> Self {
        Self {
            max_length: 200,
            context_before: 60,
            min_term_length: 3,
            stem_fallback: true,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalog: CatalogConfig {
                source: "chapters.json".to_string(),
                request_timeout_seconds: 30,
            },
            search: SearchConfig::default(),
            excerpt: ExcerptConfig::default(),
            interactive: InteractiveConfig { debounce_ms: 300 },
            server: ServerConfig { port: 8080 },
            logging: LoggingConfig {
                log_level: "lecture_search=info,warn".to_string(),
            },
        }
    }
}

/// Configuration builder for programmatic config creation
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn with_catalog_source(mut self, source: impl Into<String>) -> Self {
        self.config.catalog.source = source.into();
        self
    }

    pub fn with_backend(mut self, backend: SearchBackend) -> Self {
        self.config.search.backend = backend;
        self
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.config.search.threshold = threshold;
        self
    }

    pub fn with_max_excerpt_length(mut self, max_length: usize) -> Self {
        self.config.excerpt.max_length = max_length;
        self
    }

    pub fn with_context_before(mut self, context_before: usize) -> Self {
        self.config.excerpt.context_before = context_before;
        self
    }

    pub fn enable_stem_fallback(mut self, enable: bool) -> Self {
        self.config.excerpt.stem_fallback = enable;
        self
    }

    pub fn with_debounce_ms(mut self, debounce_ms: u64) -> Self {
        self.config.interactive.debounce_ms = debounce_ms;
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.config.server.port = port;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.excerpt.max_length, 200);
        assert_eq!(config.excerpt.context_before, 60);
        assert_eq!(config.search.backend, SearchBackend::Fuzzy);
        assert_eq!(config.interactive.debounce_ms, 300);
    }

    #[test]
    fn test_config_builder() {
        let config = ConfigBuilder::new()
            .with_backend(SearchBackend::Terms)
            .with_max_excerpt_length(150)
            .with_context_before(50)
            .enable_stem_fallback(false)
            .build();

        assert_eq!(config.search.backend, SearchBackend::Terms);
        assert_eq!(config.excerpt.max_length, 150);
        assert_eq!(config.excerpt.context_before, 50);
        assert!(!config.excerpt.stem_fallback);
    }

    #[test]
    fn test_config_validation() {
        assert!(Config::default().validate().is_ok());

        let config = ConfigBuilder::new()
            .with_max_excerpt_length(40)
            .with_context_before(60)
            .build();
        assert!(config.validate().is_err());

        let config = ConfigBuilder::new().with_threshold(1.5).build();
        assert!(config.validate().is_err());

        let config = ConfigBuilder::new().with_catalog_source("  ").build();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_roundtrip_keeps_backend() {
        let config = ConfigBuilder::new().with_backend(SearchBackend::Terms).build();
        let text = toml::to_string_pretty(&config).unwrap();
        assert!(text.contains("backend = \"terms\""));

        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed.search.backend, SearchBackend::Terms);
        assert_eq!(parsed.search.fuzzy_keys.len(), 4);
    }

    #[test]
    fn test_backend_from_str() {
        assert_eq!("Fuzzy".parse::<SearchBackend>().unwrap(), SearchBackend::Fuzzy);
        assert_eq!("terms".parse::<SearchBackend>().unwrap(), SearchBackend::Terms);
        assert!("bm25".parse::<SearchBackend>().is_err());
    }
}
