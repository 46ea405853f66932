//! Per-record reconciliation against the remote store.
//!
//! ## `upsert` state machine
//!
//! 1. Reject records without a cloze (before any remote call).
//! 2. Query the remote by model, deck and external-id tag.
//! 3. Found: decode, compare. Equal → unchanged. Different → update.
//! 4. Not found: create. A duplicate title appends ` <external id>` to the
//!    title and retries, up to [`MAX_CREATE_ATTEMPTS`] attempts in total.
//!
//! A zero id from a successful create or update is an error.

use std::collections::HashSet;

use cinedeck_core::codec;
use cinedeck_core::compare::{compare, FieldMismatch};
use cinedeck_core::note::{decode_note, RawNote, FIELD_TITLE};
use cinedeck_core::types::{MovieRecord, NoteId};
use cinedeck_renderer::Renderer;

use crate::error::{RemoteError, SyncError};
use crate::payload::build_payload;
use crate::remote::{NewNote, NotePayload, RemoteStore};

/// Create attempts per record, the first one included.
pub const MAX_CREATE_ATTEMPTS: u32 = 3;

// ---------------------------------------------------------------------------
// Target
// ---------------------------------------------------------------------------

/// Deck and note type every managed note lives in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub deck: String,
    pub model: String,
}

impl Target {
    pub fn new(deck: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            deck: deck.into(),
            model: model.into(),
        }
    }

    /// Every managed note: `note:<model> deck:<deck>`.
    pub fn scope_filter(&self) -> String {
        format!(
            "note:{} deck:{}",
            search_term(&self.model),
            search_term(&self.deck)
        )
    }

    /// The note for one record: scope plus `tag:tmdb:<id>`.
    pub fn record_filter(&self, external_id: i64) -> String {
        format!(
            "{} {}",
            self.scope_filter(),
            codec::external_id_filter(external_id)
        )
    }
}

fn search_term(value: &str) -> String {
    if value.chars().any(char::is_whitespace) {
        format!("\"{value}\"")
    } else {
        value.to_string()
    }
}

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// Outcome of a single upsert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpsertResult {
    /// A new note was created; `attempts` counts duplicate-title retries.
    Created { id: NoteId, attempts: u32 },
    /// The existing note differed and was rewritten.
    Updated { id: NoteId },
    /// The existing note already matches.
    Unchanged { id: NoteId },
    /// `--dry-run`: a note would have been created.
    WouldCreate,
    /// `--dry-run`: the existing note would have been rewritten.
    WouldUpdate { id: NoteId },
}

impl UpsertResult {
    /// Remote id backing the record, when one exists.
    pub fn id(&self) -> Option<NoteId> {
        match self {
            UpsertResult::Created { id, .. }
            | UpsertResult::Updated { id }
            | UpsertResult::Unchanged { id }
            | UpsertResult::WouldUpdate { id } => Some(*id),
            UpsertResult::WouldCreate => None,
        }
    }
}

/// What [`Reconciler::upsert`] would do for a record, without writing.
#[derive(Debug, Clone, PartialEq)]
pub enum Plan {
    Create {
        payload: NotePayload,
    },
    Update {
        id: NoteId,
        existing: RawNote,
        payload: NotePayload,
        mismatches: Vec<FieldMismatch>,
    },
    Unchanged {
        id: NoteId,
    },
}

/// Outcome of garbage collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GcResult {
    /// Ids deleted, or that would be deleted in dry-run.
    pub deleted: Vec<NoteId>,
    pub dry_run: bool,
}

// ---------------------------------------------------------------------------
// Reconciler
// ---------------------------------------------------------------------------

pub struct Reconciler<S> {
    store: S,
    renderer: Renderer,
    target: Target,
    dry_run: bool,
}

impl<S: RemoteStore> Reconciler<S> {
    pub fn new(store: S, renderer: Renderer, target: Target) -> Self {
        Self {
            store,
            renderer,
            target,
            dry_run: false,
        }
    }

    /// In dry-run mode queries still run but nothing is written.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    /// Decide what an upsert of `record` has to do.
    pub async fn plan(&self, record: &MovieRecord) -> Result<Plan, SyncError> {
        if !record.has_cloze() {
            return Err(SyncError::InvalidRecord {
                external_id: record.external_id,
            });
        }

        let filter = self.target.record_filter(record.external_id);
        let mut found = self.store.query(&filter).await?;
        if found.len() > 1 {
            tracing::warn!(
                external_id = record.external_id,
                count = found.len(),
                "several notes share one external id, using the first"
            );
        }
        if found.is_empty() {
            tracing::debug!(external_id = record.external_id, "no remote note");
            let payload = build_payload(record, &self.renderer)?;
            return Ok(Plan::Create { payload });
        }

        let existing = found.swap_remove(0);
        if existing.id.is_zero() {
            return Err(SyncError::ZeroIdentifier {
                external_id: record.external_id,
                operation: "query",
            });
        }
        let stored = decode_note(&existing)?;
        let comparison = compare(&stored, record);
        if comparison.is_equal() {
            return Ok(Plan::Unchanged { id: existing.id });
        }

        for mismatch in &comparison.mismatches {
            tracing::debug!(
                external_id = record.external_id,
                field = mismatch.field,
                remote = %mismatch.left,
                local = %mismatch.right,
                "field differs"
            );
        }
        let payload = build_payload(record, &self.renderer)?;
        Ok(Plan::Update {
            id: existing.id,
            existing,
            payload,
            mismatches: comparison.mismatches,
        })
    }

    /// Bring the remote note for `record` in line with it.
    pub async fn upsert(&self, record: &MovieRecord) -> Result<UpsertResult, SyncError> {
        match self.plan(record).await? {
            Plan::Unchanged { id } => {
                tracing::debug!(external_id = record.external_id, %id, "unchanged");
                Ok(UpsertResult::Unchanged { id })
            }
            Plan::Update { id, .. } if self.dry_run => {
                tracing::info!("[dry-run] would update: {} ({id})", record.title);
                Ok(UpsertResult::WouldUpdate { id })
            }
            Plan::Update { id, payload, .. } => {
                let updated = self.store.update(id, &payload).await?;
                if updated.is_zero() {
                    return Err(SyncError::ZeroIdentifier {
                        external_id: record.external_id,
                        operation: "update",
                    });
                }
                tracing::info!("updated: {} ({updated})", record.title);
                Ok(UpsertResult::Updated { id: updated })
            }
            Plan::Create { .. } if self.dry_run => {
                tracing::info!("[dry-run] would create: {}", record.title);
                Ok(UpsertResult::WouldCreate)
            }
            Plan::Create { payload } => self.create(record, payload).await,
        }
    }

    async fn create(
        &self,
        record: &MovieRecord,
        payload: NotePayload,
    ) -> Result<UpsertResult, SyncError> {
        let mut note = NewNote {
            deck: self.target.deck.clone(),
            model: self.target.model.clone(),
            payload,
        };

        for attempt in 1..=MAX_CREATE_ATTEMPTS {
            match self.store.create(&note).await {
                Ok(id) if id.is_zero() => {
                    return Err(SyncError::ZeroIdentifier {
                        external_id: record.external_id,
                        operation: "create",
                    })
                }
                Ok(id) => {
                    tracing::info!("created: {} ({id})", record.title);
                    return Ok(UpsertResult::Created {
                        id,
                        attempts: attempt,
                    });
                }
                Err(RemoteError::DuplicateTitle) => {
                    tracing::warn!(
                        external_id = record.external_id,
                        attempt,
                        "duplicate title, retrying with external id appended"
                    );
                    if let Some(title) = note.payload.fields.get_mut(FIELD_TITLE) {
                        title.push_str(&format!(" {}", record.external_id));
                    }
                }
                Err(err) => return Err(err.into()),
            }
        }

        Err(SyncError::DuplicateTitleExhausted {
            external_id: record.external_id,
            attempts: MAX_CREATE_ATTEMPTS,
        })
    }

    /// Decode every managed note.
    pub async fn remote_records(&self) -> Result<Vec<MovieRecord>, SyncError> {
        let notes = self.store.query(&self.target.scope_filter()).await?;
        notes
            .iter()
            .map(|note| decode_note(note).map_err(SyncError::from))
            .collect()
    }

    /// Delete every managed note whose id is not in `keep`, in one call.
    ///
    /// No delete is issued when nothing is stale.
    pub async fn garbage_collect(&self, keep: &HashSet<NoteId>) -> Result<GcResult, SyncError> {
        let mut stale: Vec<NoteId> = self
            .store
            .find_ids(&self.target.scope_filter())
            .await?
            .into_iter()
            .filter(|id| !keep.contains(id))
            .collect();
        stale.sort_unstable();
        stale.dedup();

        if stale.is_empty() {
            tracing::debug!("garbage collection: nothing to delete");
            return Ok(GcResult {
                deleted: stale,
                dry_run: self.dry_run,
            });
        }
        if self.dry_run {
            tracing::info!("[dry-run] would delete {} note(s)", stale.len());
            return Ok(GcResult {
                deleted: stale,
                dry_run: true,
            });
        }

        self.store.delete(&stale).await?;
        tracing::info!("deleted {} stale note(s)", stale.len());
        Ok(GcResult {
            deleted: stale,
            dry_run: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_filter_combines_scope_and_tag() {
        let target = Target::new("Cine2Nerdle", "Movie");
        assert_eq!(target.record_filter(603), "note:Movie deck:Cine2Nerdle tag:tmdb:603");
    }

    #[test]
    fn names_with_spaces_are_quoted() {
        let target = Target::new("My Films", "Movie");
        assert_eq!(target.scope_filter(), "note:Movie deck:\"My Films\"");
    }

    #[test]
    fn would_create_has_no_id() {
        assert_eq!(UpsertResult::WouldCreate.id(), None);
        assert_eq!(
            UpsertResult::Created {
                id: NoteId(4),
                attempts: 1
            }
            .id(),
            Some(NoteId(4))
        );
    }
}
