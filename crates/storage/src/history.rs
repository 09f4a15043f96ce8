use std::collections::BTreeMap;

use tracing::{debug, warn};

use sagbook_core::catalog::FieldCatalog;
use sagbook_core::field::Position;
use sagbook_core::normalize::normalize;
use sagbook_core::Snapshot;

use crate::traits::BlobStore;

/// Storage key of the serialized history blob.
pub const HISTORY_KEY: &str = "suspension-history";

/// Maximum retained snapshots before eviction from the oldest end.
pub const DEFAULT_HISTORY_MAX: usize = 100;

/// Whether a write grows history or mutates the most recent entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    Append,
    ReplaceLast,
}

/// What a `push` actually did, so callers can notify accordingly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PushOutcome {
    pub written: bool,
    pub trimmed: usize,
}

/// Ordered, size-bounded sequence of snapshots persisted as one blob.
///
/// Every operation is a full read-modify-write of the blob. Backend
/// failures degrade rather than surface: reads fall back to empty history
/// and writes are best-effort, so the in-memory session stays usable when
/// persistence is gone.
pub struct HistoryStore<S: BlobStore> {
    store: S,
    key: String,
    max_len: usize,
    catalog: FieldCatalog,
}

impl<S: BlobStore> HistoryStore<S> {
    pub fn new(store: S, catalog: FieldCatalog) -> Self {
        Self {
            store,
            key: HISTORY_KEY.to_string(),
            max_len: DEFAULT_HISTORY_MAX,
            catalog,
        }
    }

    pub fn max_len(&self) -> usize {
        self.max_len
    }

    pub fn set_max_len(&mut self, max_len: usize) {
        self.max_len = max_len.max(1);
    }

    /// Read all stored snapshots, oldest first. Missing or unreadable blobs
    /// are an empty history, never an error.
    pub fn load(&self) -> Vec<Snapshot> {
        let raw = match self.store.read(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!(key = %self.key, error = %e, "history read failed; treating as empty");
                return Vec::new();
            }
        };
        match serde_json::from_str(&raw) {
            Ok(history) => history,
            Err(e) => {
                debug!(key = %self.key, error = %e, "malformed history blob; treating as empty");
                Vec::new()
            }
        }
    }

    pub fn last(&self) -> Option<Snapshot> {
        self.load().pop()
    }

    /// Write policy for one snapshot. Keys are compressed to the canonical
    /// `{position}::{id}` short form before any comparison or storage.
    ///
    /// Empty snapshots are dropped on append; on replace they still
    /// overwrite a non-empty last entry (an explicit clear is legitimate
    /// state) but are a no-op against empty history.
    pub fn push(&mut self, mut snapshot: Snapshot, mode: WriteMode) -> PushOutcome {
        snapshot.values = self.compress_values(snapshot.values);
        let mut history = self.load();

        if !snapshot.has_values() {
            match mode {
                WriteMode::Append => return PushOutcome::default(),
                WriteMode::ReplaceLast => {
                    let Some(last) = history.last_mut() else {
                        return PushOutcome::default();
                    };
                    *last = snapshot;
                    self.persist(&history);
                    return PushOutcome {
                        written: true,
                        trimmed: 0,
                    };
                }
            }
        }

        match mode {
            WriteMode::Append => history.push(snapshot),
            WriteMode::ReplaceLast => match history.last_mut() {
                Some(last) => *last = snapshot,
                None => history.push(snapshot),
            },
        }

        let trimmed = if history.len() > self.max_len {
            let excess = history.len() - self.max_len;
            history.drain(..excess);
            excess
        } else {
            0
        };

        self.persist(&history);
        PushOutcome {
            written: true,
            trimmed,
        }
    }

    /// Remove the snapshot at `index` (storage order, oldest first).
    pub fn delete(&mut self, index: usize) -> bool {
        let mut history = self.load();
        if index >= history.len() {
            return false;
        }
        history.remove(index);
        self.persist(&history);
        true
    }

    /// Rewrite a raw bound-field key to `{baseline|final}::{canonical_id}`
    /// using the same catalog resolution the normalizer applies, so stored
    /// records never depend on incidental label wording. Keys with an
    /// unknown or missing position head default to the final area.
    pub fn compress_key(&self, raw_key: &str) -> String {
        compress_key(&self.catalog, raw_key)
    }

    pub fn compress_values(&self, values: BTreeMap<String, String>) -> BTreeMap<String, String> {
        compress_values(&self.catalog, values)
    }

    fn persist(&mut self, history: &[Snapshot]) {
        let blob = match serde_json::to_string(history) {
            Ok(blob) => blob,
            Err(e) => {
                warn!(error = %e, "history serialization failed; write skipped");
                return;
            }
        };
        if let Err(e) = self.store.write(&self.key, &blob) {
            warn!(key = %self.key, error = %e, "history write failed; changes not durable");
        }
    }
}

pub fn compress_key(catalog: &FieldCatalog, raw_key: &str) -> String {
    let (head, suffix) = match raw_key.split_once("::") {
        Some((head, suffix)) => (head, suffix),
        None => ("", raw_key),
    };
    let position =
        Position::parse(head.trim().to_lowercase().as_str()).unwrap_or(Position::Final);
    format!("{}::{}", position, compress_id(catalog, suffix))
}

/// Already-resolved ids are fixed points, including the deterministic
/// `-2`/`-3` collision suffixes the binder assigns. Re-resolving those
/// would prefix-match them back onto the base id and merge two distinct
/// fields into one stored key.
fn compress_id(catalog: &FieldCatalog, suffix: &str) -> String {
    if catalog.entry(suffix).is_some() {
        return suffix.to_string();
    }
    if let Some((base, digits)) = suffix.rsplit_once('-')
        && !digits.is_empty()
        && digits.chars().all(|c| c.is_ascii_digit())
        && catalog.entry(base).is_some()
    {
        return suffix.to_string();
    }
    normalize(catalog, suffix)
}

pub fn compress_values(
    catalog: &FieldCatalog,
    values: BTreeMap<String, String>,
) -> BTreeMap<String, String> {
    values
        .into_iter()
        .map(|(key, value)| (compress_key(catalog, &key), value))
        .collect()
}
