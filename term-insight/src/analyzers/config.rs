//! Configuration for an analysis run.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::analyzers::errors::{AnalyzerError, AnalyzerResult};
use crate::analyzers::inference::ClassifierConfig;

/// Which association results are kept in the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AssociationRetention {
    /// Keep every eligible (categorical, numeric) pair, annotated with significance.
    #[default]
    All,
    /// Keep only pairs whose p-value is below the significance level.
    SignificantOnly,
}

/// Configuration shared by all analyzers of a run.
///
/// Every field has a default, so partial JSON documents deserialize cleanly:
///
/// ```rust
/// use term_insight::analyzers::AnalysisConfig;
///
/// let config: AnalysisConfig =
///     serde_json::from_str(r#"{"strong_correlation_threshold": 0.6}"#).unwrap();
/// assert_eq!(config.strong_correlation_threshold, 0.6);
/// assert_eq!(config.max_categorical_cardinality, 30);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Minimum |pearson| (exclusive) for a pair to be reported (default: 0.5)
    pub strong_correlation_threshold: f64,
    /// |pearson| above which a reported pair is Strong rather than Moderate (default: 0.7)
    pub strong_correlation_cutoff: f64,
    /// p-value below which an ANOVA result is significant (default: 0.05)
    pub anova_significance_level: f64,
    /// Categorical columns with more distinct values are skipped (default: 30)
    pub max_categorical_cardinality: usize,
    /// Number of entries kept in a categorical distribution (default: 10)
    pub top_distribution_size: usize,
    /// Explicit temporal column, overriding auto-detection (default: None)
    pub temporal_column_name: Option<String>,
    /// Numeric columns with fewer distinct values also act as ANOVA grouping
    /// columns; `None` disables this (default: Some(20))
    pub numeric_as_categorical_below: Option<usize>,
    /// Which association results are retained (default: All)
    pub association_retention: AssociationRetention,
    /// |z| above which a time-series point is an anomaly (default: 3.0)
    pub anomaly_z_threshold: f64,
    /// Column classifier settings
    pub classifier: ClassifierConfig,
    /// Maximum concurrent work items for concurrent runs (default: CPU count)
    pub max_parallelism: Option<usize>,
    /// Overall deadline for concurrent runs (default: None)
    #[serde(with = "optional_duration_ms")]
    pub timeout: Option<Duration>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            strong_correlation_threshold: 0.5,
            strong_correlation_cutoff: 0.7,
            anova_significance_level: 0.05,
            max_categorical_cardinality: 30,
            top_distribution_size: 10,
            temporal_column_name: None,
            numeric_as_categorical_below: Some(20),
            association_retention: AssociationRetention::All,
            anomaly_z_threshold: 3.0,
            classifier: ClassifierConfig::default(),
            max_parallelism: None,
            timeout: None,
        }
    }
}

impl AnalysisConfig {
    /// Creates a new builder starting from the defaults.
    pub fn builder() -> AnalysisConfigBuilder {
        AnalysisConfigBuilder {
            config: Self::default(),
        }
    }

    /// Checks that all thresholds are usable.
    pub fn validate(&self) -> AnalyzerResult<()> {
        if !(self.strong_correlation_threshold > 0.0 && self.strong_correlation_threshold < 1.0) {
            return Err(AnalyzerError::invalid_config(format!(
                "strong_correlation_threshold must be in (0, 1), got {}",
                self.strong_correlation_threshold
            )));
        }
        if !(self.strong_correlation_cutoff >= self.strong_correlation_threshold
            && self.strong_correlation_cutoff < 1.0)
        {
            return Err(AnalyzerError::invalid_config(format!(
                "strong_correlation_cutoff must be in [{}, 1), got {}",
                self.strong_correlation_threshold, self.strong_correlation_cutoff
            )));
        }
        if !(self.anova_significance_level > 0.0 && self.anova_significance_level < 1.0) {
            return Err(AnalyzerError::invalid_config(format!(
                "anova_significance_level must be in (0, 1), got {}",
                self.anova_significance_level
            )));
        }
        if self.max_categorical_cardinality == 0 {
            return Err(AnalyzerError::invalid_config(
                "max_categorical_cardinality must be at least 1",
            ));
        }
        if self.top_distribution_size == 0 {
            return Err(AnalyzerError::invalid_config(
                "top_distribution_size must be at least 1",
            ));
        }
        if !(self.anomaly_z_threshold > 0.0 && self.anomaly_z_threshold.is_finite()) {
            return Err(AnalyzerError::invalid_config(format!(
                "anomaly_z_threshold must be positive, got {}",
                self.anomaly_z_threshold
            )));
        }
        if self.max_parallelism == Some(0) {
            return Err(AnalyzerError::invalid_config(
                "max_parallelism must be at least 1",
            ));
        }
        Ok(())
    }

    /// Effective number of concurrent work items.
    pub fn parallelism(&self) -> usize {
        self.max_parallelism.unwrap_or_else(num_cpus::get).max(1)
    }
}

/// Builder for AnalysisConfig.
#[derive(Debug, Clone)]
pub struct AnalysisConfigBuilder {
    config: AnalysisConfig,
}

impl AnalysisConfigBuilder {
    /// Sets the minimum |pearson| for reported pairs.
    pub fn strong_correlation_threshold(mut self, threshold: f64) -> Self {
        self.config.strong_correlation_threshold = threshold;
        self
    }

    /// Sets the |pearson| above which a pair is Strong.
    pub fn strong_correlation_cutoff(mut self, cutoff: f64) -> Self {
        self.config.strong_correlation_cutoff = cutoff;
        self
    }

    /// Sets the ANOVA significance level.
    pub fn anova_significance_level(mut self, level: f64) -> Self {
        self.config.anova_significance_level = level;
        self
    }

    /// Sets the maximum cardinality of grouping columns.
    pub fn max_categorical_cardinality(mut self, max: usize) -> Self {
        self.config.max_categorical_cardinality = max;
        self
    }

    /// Sets the number of entries kept in categorical distributions.
    pub fn top_distribution_size(mut self, size: usize) -> Self {
        self.config.top_distribution_size = size;
        self
    }

    /// Forces a specific temporal column.
    pub fn temporal_column(mut self, name: impl Into<String>) -> Self {
        self.config.temporal_column_name = Some(name.into());
        self
    }

    /// Sets (or disables) the low-cardinality numeric grouping threshold.
    pub fn numeric_as_categorical_below(mut self, threshold: Option<usize>) -> Self {
        self.config.numeric_as_categorical_below = threshold;
        self
    }

    /// Sets the association retention policy.
    pub fn association_retention(mut self, retention: AssociationRetention) -> Self {
        self.config.association_retention = retention;
        self
    }

    /// Sets the anomaly z-score threshold.
    pub fn anomaly_z_threshold(mut self, threshold: f64) -> Self {
        self.config.anomaly_z_threshold = threshold;
        self
    }

    /// Sets the classifier configuration.
    pub fn classifier(mut self, classifier: ClassifierConfig) -> Self {
        self.config.classifier = classifier;
        self
    }

    /// Limits concurrent work items.
    pub fn max_parallelism(mut self, max: usize) -> Self {
        self.config.max_parallelism = Some(max);
        self
    }

    /// Sets the overall deadline of concurrent runs.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = Some(timeout);
        self
    }

    /// Validates and builds the configuration.
    pub fn build(self) -> AnalyzerResult<AnalysisConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

mod optional_duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(d) => serializer.serialize_some(&(d.as_millis() as u64)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<u64>::deserialize(deserializer)?.map(Duration::from_millis))
    }
}
