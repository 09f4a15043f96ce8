use std::cell::RefCell;
use std::rc::Rc;

use sagbook_core::clock::TimeSource;
use sagbook_engine::{Document, Engine, Notice, Notifier, SlideDoc};
use sagbook_storage::{BlobStore, MemoryStore, StorageError};

/// Deterministic time source: strictly increasing millisecond ticks from a
/// fixed origin.
pub struct ManualTime {
    next: i64,
}

impl ManualTime {
    pub fn new() -> Self {
        Self { next: 1_000 }
    }
}

impl Default for ManualTime {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for ManualTime {
    fn now_ms(&mut self) -> i64 {
        self.next += 1;
        self.next
    }
}

/// Backend that fails every operation, for exercising degraded persistence.
#[derive(Debug, Default)]
pub struct FailingStore;

impl BlobStore for FailingStore {
    fn read(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Err(StorageError::Unavailable("backend offline".to_string()))
    }

    fn write(&mut self, _key: &str, _blob: &str) -> Result<(), StorageError> {
        Err(StorageError::Unavailable("backend offline".to_string()))
    }
}

/// A representative document: the two record areas surrounded by plain
/// presentation slides.
pub fn sample_document() -> Document {
    Document {
        slides: vec![
            SlideDoc::new("1", &["Suspension setup guide"]),
            SlideDoc::new(
                "3",
                &[
                    "Date: _____",
                    "Sag F: _____ R: _____",
                    "Front Preload: _____ turns from full soft",
                    "Rear Preload: _____",
                    "Front Rebound: _____",
                    "Notes: __________",
                ],
            ),
            SlideDoc::new("5", &["Clicker adjustment basics"]),
            SlideDoc::new(
                "9",
                &[
                    "Date: _____",
                    "Sag F: _____ R: _____",
                    "Front Compression: _____",
                    "Front Preload: _____",
                    "Rear Preload: _____",
                    "Rear Rebound: _____",
                    "Notes: __________",
                ],
            ),
        ],
    }
}

struct RecordingNotifier {
    notices: Rc<RefCell<Vec<Notice>>>,
    history_changes: Rc<RefCell<usize>>,
}

impl Notifier for RecordingNotifier {
    fn history_changed(&mut self) {
        *self.history_changes.borrow_mut() += 1;
    }

    fn notice(&mut self, notice: Notice) {
        self.notices.borrow_mut().push(notice);
    }
}

/// An engine wired to an in-memory backend, a deterministic clock, and a
/// recording notifier.
pub struct TestSession {
    pub engine: Engine<MemoryStore>,
    notices: Rc<RefCell<Vec<Notice>>>,
    history_changes: Rc<RefCell<usize>>,
}

impl TestSession {
    /// Session bound to [`sample_document`].
    pub fn new() -> Self {
        Self::with_store(MemoryStore::new())
    }

    /// Session bound to [`sample_document`] over a pre-seeded backend.
    pub fn with_store(store: MemoryStore) -> Self {
        Self::build(store, &sample_document())
    }

    /// Session bound to a custom document.
    pub fn with_document(doc: &Document) -> Self {
        Self::build(MemoryStore::new(), doc)
    }

    fn build(store: MemoryStore, doc: &Document) -> Self {
        let notices = Rc::new(RefCell::new(Vec::new()));
        let history_changes = Rc::new(RefCell::new(0));
        let mut engine = Engine::new(store)
            .with_clock(Box::new(ManualTime::new()))
            .with_notifier(Box::new(RecordingNotifier {
                notices: Rc::clone(&notices),
                history_changes: Rc::clone(&history_changes),
            }));
        engine.bind(doc);
        Self {
            engine,
            notices,
            history_changes,
        }
    }

    /// Notices emitted so far, in order.
    pub fn notices(&self) -> Vec<Notice> {
        self.notices.borrow().clone()
    }

    /// Drain and return the emitted notices.
    pub fn take_notices(&self) -> Vec<Notice> {
        std::mem::take(&mut *self.notices.borrow_mut())
    }

    pub fn history_changes(&self) -> usize {
        *self.history_changes.borrow()
    }
}

impl Default for TestSession {
    fn default() -> Self {
        Self::new()
    }
}
