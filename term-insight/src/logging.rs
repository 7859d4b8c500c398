//! Logging configuration for analysis runs.
//!
//! The analyzers emit `tracing` events: `info` at run boundaries, `debug` for
//! skipped columns and pairs, `warn` for degraded insights and partial runs.
//! [`LogConfig`] controls the optional, chattier events of the engine, and
//! [`setup`] installs a `tracing-subscriber` pipeline for applications that do
//! not configure their own.

use tracing::Level;

/// Per-engine logging settings.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Base log level for analyzer components
    pub base_level: Level,
    /// Whether to log every finished work item of a concurrent run
    pub log_work_items: bool,
    /// Whether to log the resolved column roles at the start of a run
    pub log_column_roles: bool,
    /// Maximum length for logged column names
    pub max_field_length: usize,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            base_level: Level::INFO,
            log_work_items: false,
            log_column_roles: true,
            max_field_length: 256,
        }
    }
}

impl LogConfig {
    /// Everything on, long field values.
    pub fn verbose() -> Self {
        Self {
            base_level: Level::DEBUG,
            log_work_items: true,
            log_column_roles: true,
            max_field_length: 1024,
        }
    }

    /// Run boundaries and warnings only.
    pub fn production() -> Self {
        Self {
            base_level: Level::WARN,
            log_work_items: false,
            log_column_roles: false,
            max_field_length: 128,
        }
    }

    pub fn balanced() -> Self {
        Self::default()
    }

    /// Whether events at `level` pass the base level.
    pub fn enabled(&self, level: Level) -> bool {
        level <= self.base_level
    }

    /// Whether the engine logs resolved column roles (an `info` event).
    pub fn logs_column_roles(&self) -> bool {
        self.log_column_roles && self.enabled(Level::INFO)
    }

    /// Whether the engine logs each finished work item (a `debug` event).
    pub fn logs_work_items(&self) -> bool {
        self.log_work_items && self.enabled(Level::DEBUG)
    }
}

/// Truncates a value to at most `max_length` bytes, respecting UTF-8
/// character boundaries.
pub fn truncate_field(value: &str, max_length: usize) -> String {
    if value.len() <= max_length {
        return value.to_string();
    }
    let mut end = max_length;
    while !value.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...(truncated)", &value[..end])
}

/// Subscriber setup for binaries and tests.
pub mod setup {
    use tracing::Level;

    /// Configuration for the global subscriber.
    #[derive(Debug, Clone)]
    pub struct LoggingConfig {
        /// Log level for everything else
        pub level: Level,
        /// Log level for `term_insight` targets
        pub insight_level: Level,
        /// Whether to use JSON output format
        pub json_format: bool,
        /// Environment filter override
        pub env_filter: Option<String>,
    }

    impl Default for LoggingConfig {
        fn default() -> Self {
            Self {
                level: Level::INFO,
                insight_level: Level::DEBUG,
                json_format: false,
                env_filter: None,
            }
        }
    }

    impl LoggingConfig {
        /// JSON output, warnings from dependencies, info from the analyzers.
        pub fn production() -> Self {
            Self {
                level: Level::WARN,
                insight_level: Level::INFO,
                json_format: true,
                env_filter: None,
            }
        }

        pub fn development() -> Self {
            Self {
                level: Level::DEBUG,
                insight_level: Level::DEBUG,
                json_format: false,
                env_filter: None,
            }
        }

        pub fn with_level(mut self, level: Level) -> Self {
            self.level = level;
            self
        }

        pub fn with_insight_level(mut self, level: Level) -> Self {
            self.insight_level = level;
            self
        }

        pub fn with_json_format(mut self, enabled: bool) -> Self {
            self.json_format = enabled;
            self
        }

        pub fn with_env_filter(mut self, filter: impl Into<String>) -> Self {
            self.env_filter = Some(filter.into());
            self
        }

        /// Builds the environment filter directive.
        pub fn env_filter(&self) -> String {
            match self.env_filter {
                Some(ref filter) => filter.clone(),
                None => format!(
                    "{},term_insight={}",
                    self.level.as_str().to_lowercase(),
                    self.insight_level.as_str().to_lowercase()
                ),
            }
        }
    }

    /// Installs the global subscriber. `RUST_LOG` takes precedence over the
    /// configured filter.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use term_insight::logging::setup::{init_logging, LoggingConfig};
    ///
    /// init_logging(LoggingConfig::development().with_json_format(true)).unwrap();
    /// ```
    pub fn init_logging(config: LoggingConfig) -> Result<(), Box<dyn std::error::Error>> {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(config.env_filter()));

        let fmt_layer = if config.json_format {
            tracing_subscriber::fmt::layer().json().boxed()
        } else {
            tracing_subscriber::fmt::layer().boxed()
        };

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::setup::LoggingConfig;
    use super::*;

    #[test]
    fn test_log_config_presets() {
        let default = LogConfig::default();
        assert_eq!(default.base_level, Level::INFO);
        assert!(!default.log_work_items);
        assert!(default.log_column_roles);

        let verbose = LogConfig::verbose();
        assert!(verbose.log_work_items);
        assert!(verbose.enabled(Level::DEBUG));

        let production = LogConfig::production();
        assert!(!production.log_column_roles);
        assert!(production.enabled(Level::WARN));
        assert!(!production.enabled(Level::INFO));
    }

    #[test]
    fn test_base_level_gates_engine_events() {
        assert!(LogConfig::default().logs_column_roles());
        assert!(!LogConfig::default().logs_work_items());
        assert!(LogConfig::verbose().logs_work_items());

        let quiet = LogConfig {
            base_level: Level::WARN,
            log_work_items: true,
            log_column_roles: true,
            ..LogConfig::default()
        };
        assert!(!quiet.logs_column_roles());
        assert!(!quiet.logs_work_items());

        let info_only = LogConfig {
            log_work_items: true,
            ..LogConfig::balanced()
        };
        assert!(info_only.logs_column_roles());
        assert!(!info_only.logs_work_items());
    }

    #[test]
    fn test_truncate_field() {
        assert_eq!(truncate_field("hello", 10), "hello");
        assert_eq!(
            truncate_field("this is a very long column name", 10),
            "this is a ...(truncated)"
        );
        // "é" is two bytes; a cut inside it backs off to the boundary
        assert_eq!(truncate_field("aé", 2), "a...(truncated)");
    }

    #[test]
    fn test_env_filter_directive() {
        assert_eq!(LoggingConfig::default().env_filter(), "info,term_insight=debug");
        assert_eq!(
            LoggingConfig::production().env_filter(),
            "warn,term_insight=info"
        );
        assert_eq!(
            LoggingConfig::default().with_env_filter("trace").env_filter(),
            "trace"
        );
    }
}
