use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One historical or current record: a timestamped set of field values.
///
/// `values` maps position-qualified field keys to value text; absent keys
/// are treated as empty, not as deletions. The `BTreeMap` makes equality
/// order-independent, which the leave-slide no-op check relies on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub timestamp: i64,
    pub slide: String,
    #[serde(default)]
    pub values: BTreeMap<String, String>,
}

impl Snapshot {
    pub fn new(timestamp: i64, slide: impl Into<String>) -> Self {
        Self {
            timestamp,
            slide: slide.into(),
            values: BTreeMap::new(),
        }
    }

    /// True when at least one value is non-empty after trimming.
    pub fn has_values(&self) -> bool {
        self.values.values().any(|v| !v.trim().is_empty())
    }
}
