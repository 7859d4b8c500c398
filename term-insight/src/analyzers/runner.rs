//! Orchestration of a full analysis run.
//!
//! The [`AnalysisEngine`] validates the dataset, classifies every column once,
//! runs the stats, correlation, association and time-series analyzers over
//! the classified view, and merges their output into an [`AnalysisReport`].
//!
//! Two entry points exist:
//!
//! - [`AnalysisEngine::analyze`] runs everything on the calling thread.
//! - [`AnalysisEngine::analyze_concurrent`] splits the run into independent
//!   work items (one per column, column pair or grouping pair) executed on
//!   tokio's blocking pool, bounded by [`AnalysisConfig::parallelism`]. A
//!   configured timeout or a triggered [`CancellationToken`] stops the run
//!   early and returns the completed work as a partial report.
//!
//! Both produce the same report for the same input when run to completion.

use std::sync::Arc;

use tokio::sync::{watch, Semaphore};
use tokio::task::{JoinError, JoinSet};
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};

use crate::analyzers::association::{AssociationAnalyzer, AssociationResult};
use crate::analyzers::config::AnalysisConfig;
use crate::analyzers::context::{ClassifiedColumn, ClassifiedDataset};
use crate::analyzers::correlation::{sort_pairs, CorrelationAnalyzer, CorrelationPair};
use crate::analyzers::errors::{AnalyzerError, AnalyzerResult};
use crate::analyzers::inference::{distinct_count, ColumnClassifier, ColumnKind};
use crate::analyzers::profiler::{ColumnStats, DescriptiveStatsComputer};
use crate::analyzers::report::AnalysisReport;
use crate::analyzers::time_series::{TemporalIndex, TimeSeriesAnalyzer, TimeSeriesInsight};
use crate::dataset::Dataset;
use crate::logging::{truncate_field, LogConfig};

/// Type alias for progress callback function.
pub type ProgressCallback = Arc<dyn Fn(f64) + Send + Sync>;

/// Cooperative cancellation signal for concurrent runs.
///
/// Clones share the same signal.
#[derive(Debug, Clone)]
pub struct CancellationToken {
    sender: Arc<watch::Sender<bool>>,
}

impl CancellationToken {
    /// Creates a token that is not cancelled.
    pub fn new() -> Self {
        let (sender, _) = watch::channel(false);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Signals cancellation to every clone of this token.
    pub fn cancel(&self) {
        self.sender.send_replace(true);
    }

    /// Checks if cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        *self.sender.borrow()
    }

    /// Resolves once cancellation is requested.
    pub async fn cancelled(&self) {
        let mut receiver = self.sender.subscribe();
        // The sender lives in `self`, so the channel cannot close here.
        let _ = receiver.wait_for(|cancelled| *cancelled).await;
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

/// The analyzers of one run, configured from an [`AnalysisConfig`].
#[derive(Debug, Clone)]
struct AnalyzerSuite {
    stats: DescriptiveStatsComputer,
    correlation: CorrelationAnalyzer,
    association: AssociationAnalyzer,
    time_series: TimeSeriesAnalyzer,
}

impl AnalyzerSuite {
    fn from_config(config: &AnalysisConfig, classifier: &ColumnClassifier) -> Self {
        Self {
            stats: DescriptiveStatsComputer::new()
                .with_top_distribution_size(config.top_distribution_size)
                .with_classifier(classifier.clone()),
            correlation: CorrelationAnalyzer::new(
                config.strong_correlation_threshold,
                config.strong_correlation_cutoff,
            ),
            association: AssociationAnalyzer::new(config.max_categorical_cardinality)
                .with_significance_level(config.anova_significance_level)
                .with_retention(config.association_retention),
            time_series: TimeSeriesAnalyzer::new(classifier.clone())
                .with_anomaly_z_threshold(config.anomaly_z_threshold),
        }
    }
}

/// Column roles resolved before any analyzer runs.
#[derive(Debug, Clone)]
struct AnalysisPlan {
    kinds: Vec<ColumnKind>,
    numeric: Vec<usize>,
    grouping: Vec<usize>,
    temporal: Option<usize>,
}

/// One independent unit of work in a concurrent run.
#[derive(Debug, Clone, Copy)]
enum WorkItem {
    Stats(usize),
    Correlation(usize, usize),
    Association(usize, usize),
    TimeSeries(usize),
}

#[derive(Debug)]
enum WorkOutput {
    Stats(usize, ColumnStats),
    Correlation(Option<CorrelationPair>),
    Association(usize, usize, Option<AssociationResult>),
    TimeSeries(usize, Option<TimeSeriesInsight>),
}

/// Results gathered from the finished work items of a concurrent run.
#[derive(Debug, Default)]
struct Collected {
    stats: Vec<Option<ColumnStats>>,
    correlations: Vec<CorrelationPair>,
    associations: Vec<(usize, usize, AssociationResult)>,
    time_series: Vec<(usize, TimeSeriesInsight)>,
    completed: usize,
    lost: usize,
}

impl Collected {
    fn new(column_count: usize) -> Self {
        Self {
            stats: vec![None; column_count],
            ..Self::default()
        }
    }

    /// Merges one joined task. A task that failed or panicked is counted as
    /// lost and the rest of the run is unaffected.
    fn absorb(&mut self, joined: Result<AnalyzerResult<WorkOutput>, JoinError>) {
        let output = match joined {
            Ok(Ok(output)) => output,
            Ok(Err(error)) => {
                warn!(%error, "Work item failed, continuing without it");
                self.lost += 1;
                return;
            }
            Err(error) => {
                warn!(%error, "Analysis task failed, continuing without it");
                self.lost += 1;
                return;
            }
        };

        match output {
            WorkOutput::Stats(idx, stats) => self.stats[idx] = Some(stats),
            WorkOutput::Correlation(pair) => self.correlations.extend(pair),
            WorkOutput::Association(cat, num, result) => {
                self.associations.extend(result.map(|r| (cat, num, r)))
            }
            WorkOutput::TimeSeries(idx, insight) => {
                self.time_series.extend(insight.map(|i| (idx, i)))
            }
        }
        self.completed += 1;
    }
}

/// Runs the full analysis over a dataset.
///
/// # Example
///
/// ```rust
/// use term_insight::analyzers::{AnalysisConfig, AnalysisEngine};
/// use term_insight::dataset::Dataset;
///
/// let dataset = Dataset::builder()
///     .numeric_column("x", [1.0, 2.0, 3.0, 4.0, 5.0].map(Some))
///     .numeric_column("y", [2.0, 4.0, 6.0, 8.0, 10.0].map(Some))
///     .build()
///     .unwrap();
///
/// let engine = AnalysisEngine::new(AnalysisConfig::default()).unwrap();
/// let report = engine.analyze(&dataset).unwrap();
///
/// assert_eq!(report.correlations().len(), 1);
/// assert_eq!(report.correlations()[0].pearson, 1.0);
/// ```
#[derive(Clone)]
pub struct AnalysisEngine {
    config: AnalysisConfig,
    classifier: ColumnClassifier,
    suite: Arc<AnalyzerSuite>,
    log_config: LogConfig,
    on_progress: Option<ProgressCallback>,
}

impl std::fmt::Debug for AnalysisEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalysisEngine")
            .field("config", &self.config)
            .field("log_config", &self.log_config)
            .field("has_progress_callback", &self.on_progress.is_some())
            .finish()
    }
}

impl Default for AnalysisEngine {
    fn default() -> Self {
        Self::from_valid_config(AnalysisConfig::default())
    }
}

impl AnalysisEngine {
    /// Creates an engine after validating the configuration.
    pub fn new(config: AnalysisConfig) -> AnalyzerResult<Self> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    fn from_valid_config(config: AnalysisConfig) -> Self {
        let classifier = ColumnClassifier::with_config(config.classifier.clone());
        let suite = Arc::new(AnalyzerSuite::from_config(&config, &classifier));
        Self {
            config,
            classifier,
            suite,
            log_config: LogConfig::default(),
            on_progress: None,
        }
    }

    /// Sets the logging behavior of this engine.
    pub fn with_log_config(mut self, log_config: LogConfig) -> Self {
        self.log_config = log_config;
        self
    }

    /// Sets a progress callback that will be called during execution.
    ///
    /// The callback receives a float between 0.0 and 1.0 indicating progress.
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(f64) + Send + Sync + 'static,
    {
        self.on_progress = Some(Arc::new(callback));
        self
    }

    /// Returns the configuration of this engine.
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Analyzes a dataset on the calling thread.
    ///
    /// Fails only for structural input problems: no columns, no rows, or an
    /// explicitly configured temporal column that is absent or not temporal.
    #[instrument(skip(self, dataset), fields(columns = dataset.column_count(), rows = dataset.row_count()))]
    pub fn analyze(&self, dataset: &Dataset) -> AnalyzerResult<AnalysisReport> {
        let plan = self.plan(dataset)?;
        info!(
            numeric = plan.numeric.len(),
            grouping = plan.grouping.len(),
            "Starting analysis"
        );
        self.log_column_roles(dataset, &plan);

        let classified = ClassifiedDataset::new(dataset, plan.kinds.clone());
        let suite = &self.suite;

        let column_stats = suite.stats.compute_all(&classified);
        self.report_progress(0.25);

        let correlations = suite
            .correlation
            .compute_correlations(&classified, &plan.numeric);
        self.report_progress(0.5);

        let associations =
            suite
                .association
                .compute_associations(&classified, &plan.grouping, &plan.numeric);
        self.report_progress(0.75);

        let time_series = match plan.temporal {
            Some(temporal) => suite
                .time_series
                .analyze_time_series(&classified, temporal, &plan.numeric),
            None => Vec::new(),
        };
        self.report_progress(1.0);

        let report = self.assemble(
            dataset,
            &plan,
            column_stats,
            correlations,
            associations,
            time_series,
            false,
        );
        info!(
            correlations = report.correlations().len(),
            associations = report.associations().len(),
            time_series = report.time_series().len(),
            "Analysis completed"
        );
        Ok(report)
    }

    /// Analyzes a dataset on tokio's blocking pool.
    ///
    /// Returns a partial report (see [`AnalysisReport::is_partial`]) when the
    /// configured timeout elapses or `cancel` is triggered before every work
    /// item has finished.
    #[instrument(skip(self, dataset, cancel), fields(columns = dataset.column_count(), rows = dataset.row_count()))]
    pub async fn analyze_concurrent(
        &self,
        dataset: Arc<Dataset>,
        cancel: CancellationToken,
    ) -> AnalyzerResult<AnalysisReport> {
        let deadline = self.config.timeout.map(|timeout| Instant::now() + timeout);

        // Planning classifies every cell and runs on the blocking pool.
        let (plan, index, items) = {
            let engine = self.clone();
            let dataset = Arc::clone(&dataset);
            let span = tracing::Span::current();
            tokio::task::spawn_blocking(move || {
                span.in_scope(|| -> AnalyzerResult<_> {
                    let plan = engine.plan(&dataset)?;
                    let index = plan.temporal.map(|temporal| {
                        Arc::new(
                            engine
                                .suite
                                .time_series
                                .build_index(&dataset.columns()[temporal]),
                        )
                    });
                    let items = engine.work_items(&dataset, &plan);
                    Ok((plan, index, items))
                })
            })
            .await
            .map_err(|e| AnalyzerError::execution(format!("planning task failed: {e}")))??
        };
        self.log_column_roles(&dataset, &plan);

        let total = items.len();
        let parallelism = self.config.parallelism();
        info!(work_items = total, parallelism, "Starting concurrent analysis");

        let semaphore = Arc::new(Semaphore::new(parallelism));
        let kinds: Arc<[ColumnKind]> = plan.kinds.clone().into();
        let mut tasks = JoinSet::new();

        for item in items {
            let semaphore = Arc::clone(&semaphore);
            let dataset = Arc::clone(&dataset);
            let suite = Arc::clone(&self.suite);
            let kinds = Arc::clone(&kinds);
            let index = index.clone();
            tasks.spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|e| AnalyzerError::execution(e.to_string()))?;
                tokio::task::spawn_blocking(move || {
                    run_item(item, &dataset, &kinds, &suite, index.as_deref())
                })
                .await
                .map_err(|e| AnalyzerError::execution(format!("work item {item:?} failed: {e}")))
            });
        }

        let mut collected = Collected::new(dataset.column_count());
        let mut partial = false;

        loop {
            if !tasks.is_empty() && deadline.is_some_and(|d| Instant::now() >= d) {
                partial = true;
                warn!(
                    completed = collected.completed,
                    total,
                    "Analysis timed out, returning partial report"
                );
                break;
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    partial = !tasks.is_empty();
                    if partial {
                        warn!(
                            completed = collected.completed,
                            total,
                            "Analysis cancelled, returning partial report"
                        );
                    }
                    break;
                }
                _ = wait_until(deadline) => continue,
                joined = tasks.join_next() => {
                    let Some(joined) = joined else { break };
                    collected.absorb(joined);

                    let finished = collected.completed + collected.lost;
                    if self.log_config.logs_work_items() {
                        debug!(finished, total, "Work item finished");
                    }
                    if total > 0 {
                        self.report_progress(finished as f64 / total as f64);
                    }
                }
            }
        }

        if partial {
            tasks.abort_all();
        }
        if collected.lost > 0 {
            warn!(lost = collected.lost, total, "Some work items failed, returning partial report");
            partial = true;
        }

        let Collected {
            stats,
            mut correlations,
            mut associations,
            mut time_series,
            completed,
            ..
        } = collected;
        sort_pairs(&mut correlations);
        associations.sort_by_key(|(cat, num, _)| (*cat, *num));
        time_series.sort_by_key(|(idx, _)| *idx);

        let report = self.assemble(
            &dataset,
            &plan,
            stats.into_iter().flatten().collect(),
            correlations,
            associations.into_iter().map(|(_, _, r)| r).collect(),
            time_series.into_iter().map(|(_, i)| i).collect(),
            partial,
        );
        info!(
            completed,
            total,
            partial,
            correlations = report.correlations().len(),
            associations = report.associations().len(),
            "Concurrent analysis finished"
        );
        Ok(report)
    }

    /// Validates the dataset and resolves column roles.
    fn plan(&self, dataset: &Dataset) -> AnalyzerResult<AnalysisPlan> {
        if dataset.column_count() == 0 {
            return Err(AnalyzerError::EmptyDataset);
        }
        if dataset.row_count() == 0 {
            return Err(AnalyzerError::NoRows);
        }

        let kinds = self.classifier.classify_all(dataset);
        let classified = ClassifiedDataset::new(dataset, kinds);

        let temporal = match &self.config.temporal_column_name {
            Some(name) => {
                let idx = classified
                    .index_of(name)
                    .ok_or_else(|| AnalyzerError::TemporalColumnNotFound(name.clone()))?;
                if classified.column(idx).kind() != ColumnKind::Temporal {
                    return Err(AnalyzerError::NotTemporal(name.clone()));
                }
                Some(idx)
            }
            None => classified.columns_of_kind(ColumnKind::Temporal).first().copied(),
        };

        let numeric = classified.columns_of_kind(ColumnKind::Numeric);
        let grouping = classified
            .columns()
            .enumerate()
            .filter(|(_, column)| self.is_grouping_column(*column))
            .map(|(idx, _)| idx)
            .collect();

        Ok(AnalysisPlan {
            kinds: classified.kinds().to_vec(),
            numeric,
            grouping,
            temporal,
        })
    }

    /// Categorical columns, plus numeric columns with few enough distinct
    /// values when `numeric_as_categorical_below` is set.
    fn is_grouping_column(&self, column: ClassifiedColumn<'_>) -> bool {
        match column.kind() {
            ColumnKind::Categorical => true,
            ColumnKind::Numeric => self
                .config
                .numeric_as_categorical_below
                .is_some_and(|below| distinct_count(column.column()) < below),
            ColumnKind::Temporal => false,
        }
    }

    fn work_items(&self, dataset: &Dataset, plan: &AnalysisPlan) -> Vec<WorkItem> {
        let mut items: Vec<WorkItem> = (0..dataset.column_count()).map(WorkItem::Stats).collect();

        for (i, &a) in plan.numeric.iter().enumerate() {
            for &b in &plan.numeric[i + 1..] {
                items.push(WorkItem::Correlation(a, b));
            }
        }

        for &cat in &plan.grouping {
            if !self
                .suite
                .association
                .accepts_grouping_column(&dataset.columns()[cat])
            {
                debug!(
                    column = dataset.columns()[cat].name(),
                    "Skipping high-cardinality grouping column"
                );
                continue;
            }
            for &num in &plan.numeric {
                if num != cat {
                    items.push(WorkItem::Association(cat, num));
                }
            }
        }

        if plan.temporal.is_some() {
            items.extend(plan.numeric.iter().copied().map(WorkItem::TimeSeries));
        }

        items
    }

    #[allow(clippy::too_many_arguments)]
    fn assemble(
        &self,
        dataset: &Dataset,
        plan: &AnalysisPlan,
        column_stats: Vec<ColumnStats>,
        correlations: Vec<CorrelationPair>,
        associations: Vec<AssociationResult>,
        time_series: Vec<TimeSeriesInsight>,
        partial: bool,
    ) -> AnalysisReport {
        AnalysisReport {
            row_count: dataset.row_count(),
            column_kinds: dataset
                .columns()
                .iter()
                .zip(&plan.kinds)
                .map(|(column, kind)| (column.name().to_string(), *kind))
                .collect(),
            temporal_column: plan
                .temporal
                .map(|idx| dataset.columns()[idx].name().to_string()),
            column_stats,
            correlations,
            associations,
            time_series,
            partial,
        }
    }

    fn log_column_roles(&self, dataset: &Dataset, plan: &AnalysisPlan) {
        if !self.log_config.logs_column_roles() {
            return;
        }
        let max = self.log_config.max_field_length;
        let names = |indices: &[usize]| -> Vec<String> {
            indices
                .iter()
                .map(|&idx| truncate_field(dataset.columns()[idx].name(), max))
                .collect()
        };
        info!(
            numeric = ?names(&plan.numeric),
            grouping = ?names(&plan.grouping),
            temporal = plan
                .temporal
                .map(|idx| truncate_field(dataset.columns()[idx].name(), max)),
            "Resolved column roles"
        );
    }

    fn report_progress(&self, progress: f64) {
        if let Some(ref callback) = self.on_progress {
            callback(progress);
        }
    }
}

fn run_item(
    item: WorkItem,
    dataset: &Dataset,
    kinds: &[ColumnKind],
    suite: &AnalyzerSuite,
    index: Option<&TemporalIndex>,
) -> WorkOutput {
    let column = |idx: usize| &dataset.columns()[idx];

    match item {
        WorkItem::Stats(idx) => {
            let stats = suite
                .stats
                .compute_stats(ClassifiedColumn::new(column(idx), kinds[idx]));
            WorkOutput::Stats(idx, stats)
        }
        WorkItem::Correlation(a, b) => {
            let pair = suite.correlation.correlate(column(a), column(b));
            WorkOutput::Correlation(suite.correlation.is_reportable(&pair).then_some(pair))
        }
        WorkItem::Association(cat, num) => {
            let result = suite
                .association
                .associate(column(cat), column(num))
                .filter(|r| suite.association.is_retained(r));
            WorkOutput::Association(cat, num, result)
        }
        WorkItem::TimeSeries(idx) => {
            let insight = index.and_then(|index| suite.time_series.analyze_column(index, column(idx)));
            WorkOutput::TimeSeries(idx, insight)
        }
    }
}

/// Resolves at `deadline`, or never without one.
async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn mixed_dataset() -> Dataset {
        Dataset::builder()
            .text_column(
                "event_date",
                [
                    "2024-03-01", "2024-03-02", "2024-03-03", "2024-03-04", "2024-03-05",
                    "2024-03-06",
                ]
                .map(Some),
            )
            .numeric_column("sales", [10.0, 12.0, 14.0, 16.0, 18.0, 20.0].map(Some))
            .numeric_column("cost", [5.0, 6.0, 7.0, 8.0, 9.0, 10.0].map(Some))
            .text_column("region", ["n", "n", "n", "s", "s", "s"].map(Some))
            .build()
            .unwrap()
    }

    #[test]
    fn test_rejects_empty_inputs() {
        let engine = AnalysisEngine::default();

        let no_columns = Dataset::new(Vec::new()).unwrap();
        assert!(matches!(
            engine.analyze(&no_columns),
            Err(AnalyzerError::EmptyDataset)
        ));

        let no_rows = Dataset::builder()
            .numeric_column("x", Vec::<Option<f64>>::new())
            .build()
            .unwrap();
        assert!(matches!(engine.analyze(&no_rows), Err(AnalyzerError::NoRows)));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = AnalysisConfig {
            top_distribution_size: 0,
            ..AnalysisConfig::default()
        };
        assert!(matches!(
            AnalysisEngine::new(config),
            Err(AnalyzerError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_temporal_override_errors() {
        let dataset = mixed_dataset();

        let missing = AnalysisEngine::new(
            AnalysisConfig::builder()
                .temporal_column("nope")
                .build()
                .unwrap(),
        )
        .unwrap();
        assert!(matches!(
            missing.analyze(&dataset),
            Err(AnalyzerError::TemporalColumnNotFound(name)) if name == "nope"
        ));

        let wrong_kind = AnalysisEngine::new(
            AnalysisConfig::builder()
                .temporal_column("sales")
                .build()
                .unwrap(),
        )
        .unwrap();
        assert!(matches!(
            wrong_kind.analyze(&dataset),
            Err(AnalyzerError::NotTemporal(name)) if name == "sales"
        ));
    }

    #[test]
    fn test_full_run() {
        let report = AnalysisEngine::default().analyze(&mixed_dataset()).unwrap();

        assert_eq!(report.row_count(), 6);
        assert_eq!(report.temporal_column(), Some("event_date"));
        assert_eq!(report.column_kind("region"), Some(ColumnKind::Categorical));
        assert_eq!(report.all_column_stats().len(), 4);
        assert_eq!(report.correlations().len(), 1);
        assert!(report.association("region", "sales").is_some());
        assert_eq!(report.time_series().len(), 2);
        assert!(!report.is_partial());
    }

    #[test]
    fn test_progress_callback() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let engine = AnalysisEngine::default().on_progress(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        engine.analyze(&mixed_dataset()).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_concurrent_matches_sequential() {
        let dataset = Arc::new(mixed_dataset());
        let engine = AnalysisEngine::default();

        let sequential = engine.analyze(&dataset).unwrap();
        let concurrent = engine
            .analyze_concurrent(Arc::clone(&dataset), CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(sequential, concurrent);
    }

    #[tokio::test]
    async fn test_failed_tasks_are_counted_as_lost() {
        let dataset = Arc::new(mixed_dataset());
        let classifier = ColumnClassifier::new();
        let kinds: Arc<[ColumnKind]> = classifier.classify_all(&dataset).into();
        let suite = Arc::new(AnalyzerSuite::from_config(&AnalysisConfig::default(), &classifier));

        let mut tasks: JoinSet<AnalyzerResult<WorkOutput>> = JoinSet::new();
        tasks.spawn_blocking(|| -> AnalyzerResult<WorkOutput> { panic!("analyzer crashed") });
        tasks.spawn(async { Err(AnalyzerError::execution("permit closed")) });
        {
            let (dataset, kinds, suite) = (Arc::clone(&dataset), Arc::clone(&kinds), Arc::clone(&suite));
            tasks.spawn_blocking(move || Ok(run_item(WorkItem::Stats(1), &dataset, &kinds, &suite, None)));
        }

        let mut collected = Collected::new(dataset.column_count());
        while let Some(joined) = tasks.join_next().await {
            collected.absorb(joined);
        }

        assert_eq!(collected.lost, 2);
        assert_eq!(collected.completed, 1);
        assert_eq!(
            collected.stats[1].as_ref().map(|s| s.column_name.as_str()),
            Some("sales")
        );
        assert!(collected.stats[0].is_none());
    }

    #[tokio::test]
    async fn test_cancelled_before_start_is_partial() {
        let token = CancellationToken::new();
        token.cancel();
        assert!(token.is_cancelled());

        let report = AnalysisEngine::default()
            .analyze_concurrent(Arc::new(mixed_dataset()), token)
            .await
            .unwrap();

        assert!(report.is_partial());
        assert_eq!(report.row_count(), 6);
        assert_eq!(report.column_kinds().len(), 4);
    }
}
