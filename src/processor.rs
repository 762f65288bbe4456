//! Trend processor.
//!
//! The [TrendProcessor] owns the dataset and answers trend queries against it. The dataset is
//! loaded at most once, either explicitly at start-up via [TrendProcessor::load] or by the first
//! query. Concurrent first queries wait for a single load. A failed load is not cached, so every
//! query against a missing data file fails fast with the same error.

use crate::cli::CommandLineArgs;
use crate::dataset::{Dataset, DATE_COLUMN};
use crate::diagnostics::{self, JobKind, JobLog};
use crate::error::TrendsError;
use crate::metrics::DATASET_ROWS;
use crate::models::{Aggregate, TrendQuery, TrendSeries};
use crate::operations;
use crate::types::IntoDValue;

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;

use polars::prelude::*;
use serde::Serialize;
use tokio::sync::OnceCell;
use tracing::{event, Level};

/// Summary of the dataset for the monitor.
#[derive(Debug, Serialize)]
pub struct DatasetStatus {
    /// Path of the data file
    pub source: String,
    pub loaded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows: Option<usize>,
    pub columns: Vec<String>,
}

/// Job description of the warmup job.
pub const WARMUP_DESCRIPTION: &str = "Startup Warmup Checks";

/// Name of the per-date total in the aggregated frame.
const TOTAL_COLUMN: &str = "total";

/// Computes a trend series from a dataset.
///
/// Rows are filtered by the query's scope, grouped by date and reduced with the query's
/// aggregate. Groups are emitted in ascending date order. Rows without a date and groups without
/// a value are dropped, so labels and data stay aligned.
///
/// # Arguments
///
/// * `dataset`: Dataset to query
/// * `query`: Trend query
pub fn trends(dataset: &Dataset, query: &TrendQuery) -> Result<TrendSeries, TrendsError> {
    let metric = dataset.column(&query.metric)?;
    let aggregate = operations::aggregate_fn(query.aggregate);

    let totals = dataset
        .select(&query.scope())?
        .filter(col(DATE_COLUMN).is_not_null())
        .group_by([col(DATE_COLUMN)])
        .agg([aggregate(col(metric.name()), metric.dtype()).alias(TOTAL_COLUMN)])
        .filter(col(TOTAL_COLUMN).is_not_null())
        .sort(DATE_COLUMN, SortOptions::default())
        .with_column(col(DATE_COLUMN).cast(DataType::Utf8))
        .collect()?;

    let labels = totals.column(DATE_COLUMN)?;
    let values = totals.column(TOTAL_COLUMN)?;
    let mut series = TrendSeries::default();
    for row in 0..totals.height() {
        if let (AnyValue::Utf8(label), Some(total)) =
            (labels.get(row)?, values.get(row)?.into_dvalue())
        {
            series.push(label.to_string(), total);
        }
    }
    Ok(series)
}

/// Run a trivial query so that the engine is initialised and the job log is never empty.
fn warmup() -> Result<(), TrendsError> {
    let frame = DataFrame::new(vec![Series::new("n", &[1_i64])])?;
    frame.lazy().select([col("n").sum()]).collect()?;
    Ok(())
}

/// Job description of a trend query.
fn describe(query: &TrendQuery) -> String {
    match query.aggregate {
        Aggregate::Sum => format!("Trend Analysis: {} in {}", query.metric, query.country),
        aggregate => format!(
            "Trend Analysis: {} of {} in {}",
            aggregate, query.metric, query.country
        ),
    }
}

/// URL of the monitor as derived from its bind address.
fn reported_monitor_url(host: &str, port: u16) -> String {
    match host.parse::<IpAddr>() {
        Ok(ip) => format!("http://{}", SocketAddr::new(ip, port)),
        Err(_) => format!("http://{}:{}", host, port),
    }
}

/// Owner of the dataset and entry point for trend queries.
#[derive(Debug)]
pub struct TrendProcessor {
    /// Path of the CSV data file.
    data_file: PathBuf,

    /// Dataset, set by the first successful load.
    dataset: OnceCell<Arc<Dataset>>,

    /// Recently completed jobs.
    jobs: JobLog,

    /// Monitor URL as reported by its bind address.
    monitor_url: String,

    /// Whether to run aggregations on the Rayon thread pool.
    use_rayon: bool,
}

impl TrendProcessor {
    /// Create a [TrendProcessor]. The data file is not read until the first load.
    ///
    /// Runs a warmup job, which is the first entry of the job log.
    pub fn new(args: &CommandLineArgs) -> Self {
        let jobs = JobLog::new(args.job_history);
        let job = jobs.start(JobKind::Startup, WARMUP_DESCRIPTION.to_string());
        let result = warmup();
        if let Err(err) = &result {
            event!(Level::WARN, "Warmup failed: {}", err);
        }
        jobs.finish(job, result.is_ok());
        Self {
            data_file: PathBuf::from(&args.data_file),
            dataset: OnceCell::new(),
            jobs,
            monitor_url: reported_monitor_url(&args.monitor_host, args.monitor_port),
            use_rayon: args.use_rayon,
        }
    }

    /// URL of the monitor, rewritten to the loopback address so it opens in a local browser.
    pub fn diagnostics_url(&self) -> String {
        diagnostics::loopback_url(&self.monitor_url)
    }

    /// Log of recently completed jobs.
    pub fn jobs(&self) -> &JobLog {
        &self.jobs
    }

    /// Current state of the dataset.
    pub fn status(&self) -> DatasetStatus {
        let dataset = self.dataset.get();
        DatasetStatus {
            source: self.data_file.display().to_string(),
            loaded: dataset.is_some(),
            rows: dataset.map(|dataset| dataset.len()),
            columns: dataset
                .map(|dataset| dataset.column_names())
                .unwrap_or_default(),
        }
    }

    /// Return the dataset, loading it if this is the first call.
    #[tracing::instrument(level = "DEBUG", skip(self))]
    pub async fn load(&self) -> Result<Arc<Dataset>, TrendsError> {
        self.dataset
            .get_or_try_init(|| self.read_data_file())
            .await
            .cloned()
    }

    /// Read and parse the data file on the blocking thread pool.
    async fn read_data_file(&self) -> Result<Arc<Dataset>, TrendsError> {
        let name = self
            .data_file
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.data_file.display().to_string());
        let job = self.jobs.start(JobKind::Load, format!("Loading Data: {name}"));

        let path = self.data_file.clone();
        let result = match tokio::task::spawn_blocking(move || Dataset::load(path)).await {
            Ok(result) => result,
            Err(err) => Err(err.into()),
        };
        self.jobs.finish(job, result.is_ok());

        match result {
            Ok(dataset) => {
                DATASET_ROWS.set(i64::try_from(dataset.len()).unwrap_or(i64::MAX));
                event!(
                    Level::INFO,
                    "Data loaded from {} ({} rows)",
                    self.data_file.display(),
                    dataset.len()
                );
                Ok(Arc::new(dataset))
            }
            Err(err) => {
                event!(Level::ERROR, "Failed to load data: {}", err);
                Err(err)
            }
        }
    }

    /// Compute the trend series for a query.
    ///
    /// Loads the dataset first if necessary.
    #[tracing::instrument(level = "DEBUG", skip(self))]
    pub async fn get_trends(&self, query: &TrendQuery) -> Result<TrendSeries, TrendsError> {
        let dataset = self.load().await?;
        let job = self.jobs.start(JobKind::Trend, describe(query));
        let result = if self.use_rayon {
            let query = query.clone();
            tokio_rayon::spawn(move || trends(&dataset, &query)).await
        } else {
            trends(&dataset, query)
        };
        self.jobs.finish(job, result.is_ok());
        result
    }
}
