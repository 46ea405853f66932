//! Batch sync: bounded concurrent upserts, then garbage collection.
//!
//! Every record runs as its own task, with at most `concurrency` upserts in
//! flight. Remote ids of successful upserts are collected under a lock.
//! Garbage collection waits for every task and runs only if none failed.
//! A failure never cancels work already in flight.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::{Mutex, Semaphore};
use tokio::task::JoinSet;

use cinedeck_core::types::{MovieRecord, NoteId};

use crate::error::{RecordFailure, SyncError};
use crate::reconcile::{GcResult, Reconciler, UpsertResult};
use crate::remote::RemoteStore;

/// Default number of upserts in flight.
pub const DEFAULT_CONCURRENCY: usize = 5;

/// One record that reconciled successfully.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordOutcome {
    pub external_id: i64,
    pub title: String,
    pub result: UpsertResult,
}

/// What happened to garbage collection.
#[derive(Debug)]
pub enum GcStatus {
    /// Some upsert failed, so nothing was collected.
    Skipped,
    Completed(GcResult),
    Failed(SyncError),
}

/// Summary of a batch run.
#[derive(Debug)]
pub struct BatchReport {
    /// Successful records, in input order.
    pub outcomes: Vec<RecordOutcome>,
    pub failures: Vec<RecordFailure>,
    pub gc: GcStatus,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl BatchReport {
    pub fn elapsed(&self) -> Duration {
        self.finished_at - self.started_at
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty() && !matches!(self.gc, GcStatus::Failed(_))
    }

    /// Count of outcomes matching `pred`.
    pub fn count(&self, pred: impl Fn(&UpsertResult) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(&o.result)).count()
    }

    /// Ids removed (or that would be) by garbage collection.
    pub fn deleted(&self) -> &[NoteId] {
        match &self.gc {
            GcStatus::Completed(gc) => &gc.deleted,
            _ => &[],
        }
    }

    /// The error that makes this batch a failure, if any.
    pub fn into_error(self) -> Option<SyncError> {
        if !self.failures.is_empty() {
            return Some(SyncError::Batch {
                failures: self.failures,
            });
        }
        match self.gc {
            GcStatus::Failed(err) => Some(err),
            _ => None,
        }
    }
}

type TaskOutput = (usize, i64, String, Result<UpsertResult, SyncError>);

/// Upsert every record, then collect stale notes.
pub async fn run_batch<S>(
    reconciler: Arc<Reconciler<S>>,
    records: Vec<MovieRecord>,
    concurrency: usize,
) -> BatchReport
where
    S: RemoteStore + 'static,
{
    let started_at = Utc::now();
    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
    let keep: Arc<Mutex<HashSet<NoteId>>> = Arc::new(Mutex::new(HashSet::new()));
    let mut tasks: JoinSet<TaskOutput> = JoinSet::new();

    tracing::info!(
        records = records.len(),
        concurrency = concurrency.max(1),
        "starting batch"
    );

    for (index, record) in records.into_iter().enumerate() {
        let semaphore = Arc::clone(&semaphore);
        let keep = Arc::clone(&keep);
        let reconciler = Arc::clone(&reconciler);
        tasks.spawn(async move {
            let result = match semaphore.acquire_owned().await {
                Ok(_permit) => {
                    let result = reconciler.upsert(&record).await;
                    if let Some(id) = result.as_ref().ok().and_then(UpsertResult::id) {
                        keep.lock().await.insert(id);
                    }
                    result
                }
                Err(err) => Err(SyncError::Worker(err.to_string())),
            };
            (index, record.external_id, record.title, result)
        });
    }

    let mut outcomes: Vec<(usize, RecordOutcome)> = Vec::new();
    let mut failures = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, external_id, title, Ok(result))) => outcomes.push((
                index,
                RecordOutcome {
                    external_id,
                    title,
                    result,
                },
            )),
            Ok((_, external_id, title, Err(error))) => {
                tracing::warn!(external_id, title = %title, "upsert failed: {error}");
                failures.push(RecordFailure {
                    external_id: Some(external_id),
                    title: Some(title),
                    error,
                });
            }
            Err(join_err) => {
                tracing::warn!("upsert task failed: {join_err}");
                failures.push(RecordFailure {
                    external_id: None,
                    title: None,
                    error: SyncError::Worker(join_err.to_string()),
                });
            }
        }
    }
    outcomes.sort_by_key(|(index, _)| *index);
    let outcomes = outcomes.into_iter().map(|(_, outcome)| outcome).collect();

    let gc = if failures.is_empty() {
        let keep = keep.lock().await.clone();
        match reconciler.garbage_collect(&keep).await {
            Ok(result) => GcStatus::Completed(result),
            Err(err) => {
                tracing::warn!("garbage collection failed: {err}");
                GcStatus::Failed(err)
            }
        }
    } else {
        tracing::warn!(
            failed = failures.len(),
            "skipping garbage collection after failed upserts"
        );
        GcStatus::Skipped
    };

    BatchReport {
        outcomes,
        failures,
        gc,
        started_at,
        finished_at: Utc::now(),
    }
}
