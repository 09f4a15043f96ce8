//! Record-keeping engine: binds fields out of the document, applies the
//! save/replace reconciliation policy, and projects stored history for
//! display.

pub mod binder;
pub mod events;
pub mod view;

use std::collections::BTreeSet;

use tracing::debug;

use sagbook_core::catalog::FieldCatalog;
use sagbook_core::clock::{MsClock, TimeSource};
use sagbook_core::field::{Field, Position};
use sagbook_core::Snapshot;
use sagbook_storage::{BlobStore, HistoryStore, PushOutcome, WriteMode};

pub use binder::{bind_document, Document, SlideDoc, BASELINE_SLIDE_ID, FINAL_SLIDE_ID};
pub use events::{NavigationObserver, Notice, Notifier, NullNotifier, SagKind};
pub use view::{build_history_view, RecordCard, RecordRow};

/// The session-level engine. Owns the bound fields, the history store, and
/// the trigger state; every mutation of stored history flows through it.
///
/// Persistence failures never surface here: the store degrades to an empty
/// or non-durable history and the session keeps working, so none of these
/// methods return errors.
pub struct Engine<S: BlobStore> {
    catalog: FieldCatalog,
    fields: Vec<Field>,
    history: HistoryStore<S>,
    clock: Box<dyn TimeSource>,
    notifier: Box<dyn Notifier>,
    /// Field keys that already auto-saved once this session; cleared per
    /// field when its value goes blank again.
    snapshotted: BTreeSet<String>,
    /// Set during programmatic writes (restore, clear) so reconciliation
    /// triggers only fire for user-driven edits.
    suppress_triggers: bool,
    date_propagated: bool,
}

impl<S: BlobStore> Engine<S> {
    pub fn new(store: S) -> Self {
        let catalog = FieldCatalog::default();
        let history = HistoryStore::new(store, catalog.clone());
        Self {
            catalog,
            fields: Vec::new(),
            history,
            clock: Box::new(MsClock::new()),
            notifier: Box::new(NullNotifier),
            snapshotted: BTreeSet::new(),
            suppress_triggers: false,
            date_propagated: false,
        }
    }

    pub fn with_clock(mut self, clock: Box<dyn TimeSource>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_notifier(mut self, notifier: Box<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn set_max_history(&mut self, max_len: usize) {
        self.history.set_max_len(max_len);
    }

    pub fn catalog(&self) -> &FieldCatalog {
        &self.catalog
    }

    /// Scan the document's record areas and (re)bind all fields. Existing
    /// values and trigger state are discarded.
    pub fn bind(&mut self, doc: &Document) {
        self.fields = bind_document(&self.catalog, doc);
        self.snapshotted.clear();
        self.date_propagated = false;
        debug!(fields = self.fields.len(), "document bound");
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn field_value(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.key.to_string() == key)
            .map(|f| f.value.as_str())
    }

    /// Apply a user edit to the field addressed by its full key. Returns
    /// false when no such field is bound.
    ///
    /// A user edit can trigger the one-time baseline-to-final date
    /// propagation and the first-fill auto-save.
    pub fn set_field(&mut self, key: &str, value: &str) -> bool {
        let Some(idx) = self.fields.iter().position(|f| f.key.to_string() == key) else {
            return false;
        };
        self.apply_value(idx, value);
        true
    }

    /// Accept a measurement from an external calculator and write it into
    /// every bound field of that kind, through the normal edit path.
    pub fn propose_value(&mut self, kind: SagKind, value: &str) {
        let id = kind.canonical_id();
        let targets: Vec<usize> = self
            .fields
            .iter()
            .enumerate()
            .filter(|(_, f)| f.key.canonical_id == id)
            .map(|(i, _)| i)
            .collect();
        for idx in targets {
            self.apply_value(idx, value);
        }
    }

    /// Leave-slide reconciliation. Only the two record areas participate;
    /// when the combined snapshot is structurally equal to the last stored
    /// record (after key compression) nothing is written.
    pub fn leave_slide(&mut self, from_id: &str, to_id: &str) {
        let _ = to_id;
        if from_id != BASELINE_SLIDE_ID && from_id != FINAL_SLIDE_ID {
            return;
        }
        let snapshot = self.combined_snapshot();
        let compressed = self.history.compress_values(snapshot.values.clone());
        if let Some(last) = self.history.last()
            && last.values == compressed
        {
            debug!("leave-slide snapshot unchanged; skipping write");
            return;
        }
        let outcome = self.commit(snapshot, WriteMode::ReplaceLast);
        if outcome.written {
            self.notifier.notice(Notice::SnapshotSaved);
        }
    }

    /// Explicit save request: always appends a new record. Returns whether
    /// anything was written.
    pub fn save_snapshot_now(&mut self) -> bool {
        let snapshot = self.combined_snapshot();
        let outcome = self.commit(snapshot, WriteMode::Append);
        self.notifier.notice(if outcome.written {
            Notice::SnapshotSaved
        } else {
            Notice::NothingToSave
        });
        outcome.written
    }

    /// Blank every bound field and re-arm the per-field auto-save triggers.
    /// No history entry results (an all-empty append is dropped).
    pub fn clear_fields(&mut self) {
        self.suppress_triggers = true;
        for field in &mut self.fields {
            field.value.clear();
        }
        self.suppress_triggers = false;
        self.snapshotted.clear();
        self.date_propagated = false;
        self.notifier.notice(Notice::FieldsCleared);
    }

    /// Write a stored record's values back into the bound fields, skipping
    /// keys with no live counterpart, then replace the most recent record
    /// with the resulting state. `index` addresses storage order.
    pub fn restore(&mut self, index: usize) -> bool {
        let history = self.history.load();
        let Some(snapshot) = history.get(index) else {
            return false;
        };
        let values = snapshot.values.clone();

        self.suppress_triggers = true;
        for (key, value) in &values {
            if let Some(field) = self.fields.iter_mut().find(|f| f.key.to_string() == *key) {
                field.value = value.clone();
            }
        }
        self.suppress_triggers = false;

        let fresh = self.combined_snapshot();
        self.commit(fresh, WriteMode::ReplaceLast);
        self.notifier.notice(Notice::SnapshotRestored);
        true
    }

    /// Delete the record at `index` (storage order). False when out of range.
    pub fn delete(&mut self, index: usize) -> bool {
        if !self.history.delete(index) {
            return false;
        }
        self.notifier.history_changed();
        self.notifier.notice(Notice::RecordDeleted);
        true
    }

    /// Stored history, oldest first.
    pub fn history(&self) -> Vec<Snapshot> {
        self.history.load()
    }

    /// Stored history projected for display, most recent first.
    pub fn history_view(&self) -> Vec<RecordCard> {
        build_history_view(&self.catalog, &self.history.load())
    }

    fn apply_value(&mut self, idx: usize, value: &str) {
        let was_blank = self.fields[idx].is_blank();
        self.fields[idx].value = value.to_string();
        if self.suppress_triggers {
            return;
        }
        let field = &self.fields[idx];
        if field.date_typed && field.origin == Some(Position::Baseline) && !field.is_blank() {
            self.propagate_date(self.fields[idx].value.clone());
        }
        self.first_fill(idx, was_blank);
    }

    /// One-time baseline-to-final date propagation: the first time a
    /// baseline date gets a value, copy it into every still-empty final date
    /// field. Routed through the normal edit path so first-fill sees it.
    fn propagate_date(&mut self, value: String) {
        if self.date_propagated {
            return;
        }
        let targets: Vec<usize> = self
            .fields
            .iter()
            .enumerate()
            .filter(|(_, f)| f.date_typed && f.origin == Some(Position::Final) && f.is_blank())
            .map(|(i, _)| i)
            .collect();
        if targets.is_empty() {
            return;
        }
        self.date_propagated = true;
        for idx in targets {
            self.apply_value(idx, &value);
        }
        self.notifier.notice(Notice::DateAutofilled);
    }

    /// First-fill auto-save: a date or notes-class field going blank to
    /// non-blank appends a full snapshot, once per field per session. Going
    /// blank again re-arms the trigger.
    fn first_fill(&mut self, idx: usize, was_blank: bool) {
        let field = &self.fields[idx];
        let key = field.key.to_string();
        if field.is_blank() {
            self.snapshotted.remove(&key);
            return;
        }
        let eligible = field.date_typed || is_notes_class(&field.key.canonical_id);
        if !eligible || !was_blank || self.snapshotted.contains(&key) {
            return;
        }
        let snapshot = self.combined_snapshot();
        let outcome = self.commit(snapshot, WriteMode::Append);
        if outcome.written {
            self.snapshotted.insert(key);
        }
    }

    /// Current state of every bound field as one snapshot, empty values
    /// included, stamped with the final record area's slide id.
    fn combined_snapshot(&mut self) -> Snapshot {
        let mut snapshot = Snapshot::new(self.clock.now_ms(), FINAL_SLIDE_ID);
        for field in &self.fields {
            snapshot
                .values
                .insert(field.key.to_string(), field.value.clone());
        }
        snapshot
    }

    fn commit(&mut self, snapshot: Snapshot, mode: WriteMode) -> PushOutcome {
        let outcome = self.history.push(snapshot, mode);
        if outcome.written {
            self.notifier.history_changed();
            if outcome.trimmed > 0 {
                self.notifier
                    .notice(Notice::HistoryTrimmed(self.history.max_len()));
            }
        }
        outcome
    }
}

impl<S: BlobStore> NavigationObserver for Engine<S> {
    fn before_transition(&mut self, from_id: &str, to_id: &str) {
        self.leave_slide(from_id, to_id);
    }
}

fn is_notes_class(canonical_id: &str) -> bool {
    canonical_id == "notes"
        || canonical_id == "note"
        || canonical_id.ends_with("-notes")
        || canonical_id.ends_with("-note")
}
