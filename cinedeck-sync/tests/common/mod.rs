//! In-memory [`RemoteStore`] that records every call.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use cinedeck_core::note::{RawNote, FIELD_TITLE};
use cinedeck_core::types::{AttributeValue, MovieRecord, NoteId};
use cinedeck_sync::{NewNote, NotePayload, RemoteError, RemoteStore};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Query(String),
    Create { title: String },
    Update(NoteId),
    Delete(Vec<NoteId>),
}

#[derive(Default)]
struct State {
    notes: BTreeMap<NoteId, RawNote>,
    next_id: i64,
    calls: Vec<Call>,
    duplicate_failures: u32,
    failing_ids: HashSet<i64>,
    zero_id_on_create: bool,
    zero_id_on_update: bool,
}

#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
    delay: Option<Duration>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        let store = Self::default();
        store.state.lock().unwrap().next_id = 1000;
        store
    }

    /// Every query sleeps, so concurrent upserts overlap.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// The next `n` creates answer with a duplicate-title error.
    pub fn fail_duplicates(&self, n: u32) {
        self.state.lock().unwrap().duplicate_failures = n;
    }

    /// Queries for `external_id` fail with a communication error.
    pub fn fail_record(&self, external_id: i64) {
        self.state.lock().unwrap().failing_ids.insert(external_id);
    }

    pub fn zero_id_on_create(&self) {
        self.state.lock().unwrap().zero_id_on_create = true;
    }

    /// Updates apply but answer with id 0.
    pub fn zero_id_on_update(&self) {
        self.state.lock().unwrap().zero_id_on_update = true;
    }

    /// Seed a note directly, bypassing call recording.
    pub fn insert(&self, id: i64, fields: BTreeMap<String, String>, tags: Vec<String>) {
        let id = NoteId(id);
        self.state
            .lock()
            .unwrap()
            .notes
            .insert(id, RawNote { id, fields, tags });
    }

    pub fn note(&self, id: NoteId) -> Option<RawNote> {
        self.state.lock().unwrap().notes.get(&id).cloned()
    }

    pub fn ids(&self) -> Vec<NoteId> {
        self.state.lock().unwrap().notes.keys().copied().collect()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|c| pred(c)).count()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn record(&self, call: Call) {
        self.state.lock().unwrap().calls.push(call);
    }
}

fn external_id_in(filter: &str) -> Option<i64> {
    filter
        .split_whitespace()
        .find_map(|term| term.strip_prefix("tag:tmdb:"))
        .and_then(|id| id.parse().ok())
}

#[async_trait]
impl RemoteStore for MemoryStore {
    async fn query(&self, filter: &str) -> Result<Vec<RawNote>, RemoteError> {
        self.record(Call::Query(filter.to_string()));
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let state = self.state.lock().unwrap();
        let wanted = external_id_in(filter);
        if let Some(id) = wanted {
            if state.failing_ids.contains(&id) {
                return Err(RemoteError::Communication(format!("boom for {id}")));
            }
        }
        let tag = wanted.map(|id| format!("tmdb:{id}"));
        Ok(state
            .notes
            .values()
            .filter(|note| tag.as_ref().map_or(true, |t| note.tags.contains(t)))
            .cloned()
            .collect())
    }

    async fn create(&self, note: &NewNote) -> Result<NoteId, RemoteError> {
        let title = note.payload.fields.get(FIELD_TITLE).cloned().unwrap_or_default();
        self.record(Call::Create {
            title: title.clone(),
        });
        let mut state = self.state.lock().unwrap();
        if state.duplicate_failures > 0 {
            state.duplicate_failures -= 1;
            return Err(RemoteError::DuplicateTitle);
        }
        if state.zero_id_on_create {
            return Ok(NoteId(0));
        }
        state.next_id += 1;
        let id = NoteId(state.next_id);
        state.notes.insert(
            id,
            RawNote {
                id,
                fields: note.payload.fields.clone(),
                tags: note.payload.tags.clone(),
            },
        );
        Ok(id)
    }

    async fn update(&self, id: NoteId, payload: &NotePayload) -> Result<NoteId, RemoteError> {
        self.record(Call::Update(id));
        let mut state = self.state.lock().unwrap();
        let note = state
            .notes
            .get_mut(&id)
            .ok_or_else(|| RemoteError::Communication(format!("no note {id}")))?;
        note.fields = payload.fields.clone();
        note.tags = payload.tags.clone();
        if state.zero_id_on_update {
            return Ok(NoteId(0));
        }
        Ok(id)
    }

    async fn delete(&self, ids: &[NoteId]) -> Result<(), RemoteError> {
        self.record(Call::Delete(ids.to_vec()));
        let mut state = self.state.lock().unwrap();
        for id in ids {
            state.notes.remove(id);
        }
        Ok(())
    }
}

/// A publishable record with one clozed director.
pub fn movie(external_id: i64, title: &str) -> MovieRecord {
    let mut record = MovieRecord::new(external_id, title);
    record.release_year = 2000;
    record.popularity = 10.0;
    record.genres = vec!["Drama".into()];
    record.director = vec![AttributeValue::cloze(format!("Director {external_id}"))];
    record.cast = vec![AttributeValue::plain("Someone")];
    record
}

/// Fields and tags of a managed note that no catalog record claims.
pub fn orphan(external_id: i64) -> (BTreeMap<String, String>, Vec<String>) {
    let mut fields = BTreeMap::new();
    fields.insert(FIELD_TITLE.to_string(), format!("Orphan {external_id}"));
    fields.insert("Popularity".to_string(), "1.00".to_string());
    fields.insert("Release Date".to_string(), "1990".to_string());
    (fields, vec![format!("tmdb:{external_id}")])
}
