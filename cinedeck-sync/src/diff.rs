//! Unified diff support for `cinedeck diff`.
//!
//! Each record is planned exactly as `sync` would; nothing is written.

use std::collections::BTreeMap;

use similar::TextDiff;

use cinedeck_core::types::MovieRecord;

use crate::reconcile::{Plan, Reconciler};
use crate::remote::RemoteStore;
use crate::SyncError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Create,
    Update,
}

/// Diff of one record that would change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordDiff {
    pub external_id: i64,
    pub title: String,
    pub kind: ChangeKind,
    pub unified_diff: String,
}

/// Plan every record and diff the ones that would change.
///
/// Records are processed sequentially; the first failure aborts.
pub async fn diff_records<S: RemoteStore>(
    reconciler: &Reconciler<S>,
    records: &[MovieRecord],
) -> Result<Vec<RecordDiff>, SyncError> {
    let mut diffs = Vec::new();
    for record in records {
        let (kind, old_header, old, new) = match reconciler.plan(record).await? {
            Plan::Unchanged { .. } => continue,
            Plan::Create { payload } => (
                ChangeKind::Create,
                "/dev/null".to_string(),
                String::new(),
                note_text(&payload.fields, &payload.tags),
            ),
            Plan::Update {
                id,
                existing,
                payload,
                ..
            } => (
                ChangeKind::Update,
                format!("a/note/{id}"),
                note_text(&existing.fields, &existing.tags),
                note_text(&payload.fields, &payload.tags),
            ),
        };

        let new_header = format!("b/catalog/{}", record.external_id);
        let unified = TextDiff::from_lines(&old, &new)
            .unified_diff()
            .header(&old_header, &new_header)
            .context_radius(3)
            .to_string();

        diffs.push(RecordDiff {
            external_id: record.external_id,
            title: record.title.clone(),
            kind,
            unified_diff: unified,
        });
    }
    Ok(diffs)
}

/// Line-oriented rendering of a note: fields by name, then sorted tags.
pub fn note_text(fields: &BTreeMap<String, String>, tags: &[String]) -> String {
    let mut out = String::new();
    for (name, value) in fields {
        out.push_str(name);
        out.push_str(":\n");
        for line in value.replace("\r\n", "\n").lines() {
            out.push_str("  ");
            out.push_str(line);
            out.push('\n');
        }
    }
    let mut sorted: Vec<&String> = tags.iter().collect();
    sorted.sort();
    out.push_str("tags:\n");
    for tag in sorted {
        out.push_str("  ");
        out.push_str(tag);
        out.push('\n');
    }
    out
}
