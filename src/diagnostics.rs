//! Diagnostics support: the monitor URL and the log of recent jobs.

use crate::metrics::{JOBS_COMPLETED, JOB_DURATION};

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Instant;

use serde::Serialize;
use strum_macros::Display;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tracing::{event, Level};
use url::Url;

/// Address substituted for whatever host the monitor reports.
pub const LOOPBACK: &str = "127.0.0.1";

/// Host name rewritten by the fallback substitution.
const DOCKER_HOST: &str = "host.docker.internal";

/// Rewrite a reported monitor URL so that it points at the loopback address.
///
/// The scheme and port are kept; any path is dropped. If the URL cannot be parsed or has no port,
/// falls back to substituting `host.docker.internal` by the loopback address.
///
/// # Arguments
///
/// * `reported`: URL of the monitor as reported by the server that binds it
pub fn loopback_url(reported: &str) -> String {
    match Url::parse(reported) {
        Ok(url) if url.has_host() => match url.port_or_known_default() {
            Some(port) => format!("{}://{}:{}", url.scheme(), LOOPBACK, port),
            None => reported.replace(DOCKER_HOST, LOOPBACK),
        },
        _ => reported.replace(DOCKER_HOST, LOOPBACK),
    }
}

/// Kind of job
#[derive(Clone, Copy, Debug, Display, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum JobKind {
    /// Checks run once when the processor is created
    Startup,
    /// Loading the data file
    Load,
    /// Computing a trend series
    Trend,
}

/// Outcome of a job
#[derive(Clone, Copy, Debug, Display, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum JobStatus {
    Succeeded,
    Failed,
}

/// A completed job.
#[derive(Clone, Debug, Serialize)]
pub struct JobRecord {
    /// Sequence number, starting at 1
    pub id: u64,
    pub kind: JobKind,
    /// Human readable description, e.g. `Trend Analysis: confirmed in USA`
    pub description: String,
    pub status: JobStatus,
    pub duration_seconds: f64,
    /// RFC 3339 completion time
    pub completed_at: String,
}

/// A job in progress, returned by [JobLog::start].
#[derive(Debug)]
pub struct Job {
    kind: JobKind,
    description: String,
    started: Instant,
}

/// Bounded log of the most recently completed jobs.
#[derive(Debug)]
pub struct JobLog {
    capacity: usize,
    next_id: AtomicU64,
    records: Mutex<VecDeque<JobRecord>>,
}

impl JobLog {
    /// Returns a new JobLog that keeps at most `capacity` records.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            next_id: AtomicU64::new(1),
            records: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    /// Start timing a job.
    pub fn start(&self, kind: JobKind, description: String) -> Job {
        event!(Level::DEBUG, %kind, "Starting job: {}", description);
        Job {
            kind,
            description,
            started: Instant::now(),
        }
    }

    /// Record the outcome of a job and return its record.
    pub fn finish(&self, job: Job, succeeded: bool) -> JobRecord {
        let elapsed = job.started.elapsed().as_secs_f64();
        let status = if succeeded {
            JobStatus::Succeeded
        } else {
            JobStatus::Failed
        };
        JOBS_COMPLETED
            .with_label_values(&[&job.kind.to_string(), &status.to_string()])
            .inc();
        JOB_DURATION
            .with_label_values(&[&job.kind.to_string()])
            .observe(elapsed);
        event!(
            Level::INFO,
            kind = %job.kind,
            %status,
            duration = elapsed,
            "Finished job: {}",
            job.description
        );

        let record = JobRecord {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            kind: job.kind,
            description: job.description,
            status,
            duration_seconds: elapsed,
            completed_at: OffsetDateTime::now_utc()
                .format(&Rfc3339)
                .unwrap_or_default(),
        };
        if self.capacity > 0 {
            let mut records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
            if records.len() == self.capacity {
                records.pop_front();
            }
            records.push_back(record.clone());
        }
        record
    }

    /// Recently completed jobs, newest first.
    pub fn recent(&self) -> Vec<JobRecord> {
        let records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        records.iter().rev().cloned().collect()
    }
}
