//! # cinedeck-sync
//!
//! Reconciliation of movie records against a remote flashcard store.
//!
//! [`Reconciler::upsert`] brings one record's note in line, and
//! [`run_batch`] upserts a whole catalog under bounded concurrency before
//! garbage-collecting notes no record claims. The store itself sits behind
//! the [`RemoteStore`] trait.

pub mod diff;
pub mod error;
pub mod payload;
pub mod pipeline;
pub mod reconcile;
pub mod remote;

pub use diff::{diff_records, ChangeKind, RecordDiff};
pub use error::{RecordFailure, RemoteError, SyncError};
pub use payload::build_payload;
pub use pipeline::{run_batch, BatchReport, GcStatus, RecordOutcome, DEFAULT_CONCURRENCY};
pub use reconcile::{GcResult, Plan, Reconciler, Target, UpsertResult, MAX_CREATE_ATTEMPTS};
pub use remote::{NewNote, NotePayload, RemoteStore};
