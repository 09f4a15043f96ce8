/// One recognized measurement field: a stable short id, a display label,
/// and the lowercase aliases used to recognize it from freeform labels.
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    pub id: String,
    pub label: String,
    pub aliases: Vec<String>,
}

impl CatalogEntry {
    pub fn new(id: &str, label: &str, aliases: &[&str]) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            aliases: aliases.iter().map(|a| a.to_lowercase()).collect(),
        }
    }
}

/// Static table of every recognized measurement field. Immutable at runtime;
/// consulted, never mutated.
///
/// Declaration order matters: resolution walks entries in order, so more
/// specific fields must precede generic fallbacks.
#[derive(Debug, Clone)]
pub struct FieldCatalog {
    entries: Vec<CatalogEntry>,
}

impl FieldCatalog {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn entry(&self, id: &str) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Resolve a freeform label to a catalog entry.
    ///
    /// Exact alias matches win over prefix matches; within each pass the
    /// first entry in declaration order wins.
    pub fn resolve(&self, label: &str) -> Option<&CatalogEntry> {
        let norm = label.trim().to_lowercase();
        if norm.is_empty() {
            return None;
        }
        self.entries
            .iter()
            .find(|e| e.aliases.iter().any(|a| *a == norm))
            .or_else(|| {
                self.entries
                    .iter()
                    .find(|e| e.aliases.iter().any(|a| norm.starts_with(a.as_str())))
            })
    }
}

impl Default for FieldCatalog {
    fn default() -> Self {
        Self::new(vec![
            CatalogEntry::new("date", "Date", &["date"]),
            CatalogEntry::new(
                "front-compression",
                "Front Compression",
                &["front-compression", "front compression"],
            ),
            CatalogEntry::new(
                "front-preload",
                "Front Preload",
                &["front-preload", "front preload"],
            ),
            CatalogEntry::new(
                "front-rebound",
                "Front Rebound",
                &["front-rebound", "front rebound"],
            ),
            CatalogEntry::new(
                "rear-preload",
                "Rear Preload",
                &["rear-preload", "rear preload"],
            ),
            CatalogEntry::new(
                "rear-rebound",
                "Rear Rebound",
                &["rear-rebound", "rear rebound"],
            ),
            CatalogEntry::new(
                "front-sag",
                "Front Sag",
                &["front-sag", "sag-f", "sag (front)", "front sag"],
            ),
            CatalogEntry::new(
                "rear-sag",
                "Rear Sag",
                &["rear-sag", "sag-r", "sag (rear)", "rear sag"],
            ),
            CatalogEntry::new("notes", "Notes", &["notes"]),
        ])
    }
}
