/// User-facing confirmations emitted by the engine. The host decides how to
/// render them (toast, status line, log).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    SnapshotSaved,
    SnapshotRestored,
    RecordDeleted,
    FieldsCleared,
    NothingToSave,
    DateAutofilled,
    /// Oldest records were evicted; carries the configured capacity.
    HistoryTrimmed(usize),
}

/// Outbound notification surface of the engine.
///
/// `history_changed` fires after every logical mutation of stored history,
/// including trims, so a history view can re-render from `load()` alone.
pub trait Notifier {
    fn history_changed(&mut self) {}

    fn notice(&mut self, notice: Notice) {
        let _ = notice;
    }
}

/// Discards everything.
#[derive(Debug, Default)]
pub struct NullNotifier;

impl Notifier for NullNotifier {}

/// Hook invoked by the host's navigation layer before a slide transition
/// commits. The engine registers as an observer rather than wrapping the
/// navigation call itself.
pub trait NavigationObserver {
    fn before_transition(&mut self, from_id: &str, to_id: &str);
}

/// Which measurement an external calculator is handing over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SagKind {
    Front,
    Rear,
}

impl SagKind {
    pub fn canonical_id(self) -> &'static str {
        match self {
            Self::Front => "front-sag",
            Self::Rear => "rear-sag",
        }
    }
}
