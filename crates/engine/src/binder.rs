use sagbook_core::catalog::FieldCatalog;
use sagbook_core::field::{Field, FieldKey, Position};
use sagbook_core::normalize::normalize;

/// Slide identifier of the baseline record area.
pub const BASELINE_SLIDE_ID: &str = "3";
/// Slide identifier of the final record area.
pub const FINAL_SLIDE_ID: &str = "9";

/// Minimum run of underscores recognized as one blank-fill placeholder.
const PLACEHOLDER_MIN_RUN: usize = 3;

/// Textual content of one slide: an identifier and its paragraphs.
#[derive(Debug, Clone, Default)]
pub struct SlideDoc {
    pub id: String,
    pub paragraphs: Vec<String>,
}

impl SlideDoc {
    pub fn new(id: &str, paragraphs: &[&str]) -> Self {
        Self {
            id: id.to_string(),
            paragraphs: paragraphs.iter().map(|p| p.to_string()).collect(),
        }
    }
}

/// The document the binder scans. Only the two designated record areas are
/// consulted; every other slide is plain presentation content.
#[derive(Debug, Clone, Default)]
pub struct Document {
    pub slides: Vec<SlideDoc>,
}

impl Document {
    pub fn slide(&self, id: &str) -> Option<&SlideDoc> {
        self.slides.iter().find(|s| s.id == id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SagRole {
    Front,
    Rear,
}

impl SagRole {
    fn canonical_id(self) -> &'static str {
        match self {
            Self::Front => "front-sag",
            Self::Rear => "rear-sag",
        }
    }
}

/// Scan-time metadata for one placeholder. Discarded after resolution so no
/// intermediate identifiers leak into the stored key.
#[derive(Debug, Clone)]
struct FieldDescriptor {
    raw_label: String,
    position: Position,
    role: Option<SagRole>,
    date_typed: bool,
}

/// Bind every blank-fill placeholder in the two designated record areas.
///
/// Two-phase: a pure scan producing descriptors, then a pure resolve turning
/// descriptors into `Field`s with position-qualified canonical keys. An
/// absent record area is a no-op, not an error.
pub fn bind_document(catalog: &FieldCatalog, doc: &Document) -> Vec<Field> {
    let mut fields = Vec::new();
    for (slide_id, position) in [
        (BASELINE_SLIDE_ID, Position::Baseline),
        (FINAL_SLIDE_ID, Position::Final),
    ] {
        let Some(slide) = doc.slide(slide_id) else {
            continue;
        };
        for descriptor in scan_slide(slide, position) {
            resolve_field(catalog, descriptor, &mut fields);
        }
    }
    fields
}

fn scan_slide(slide: &SlideDoc, position: Position) -> Vec<FieldDescriptor> {
    let mut out = Vec::new();
    for paragraph in &slide.paragraphs {
        let placeholders = count_placeholders(paragraph);
        if placeholders == 0 {
            continue;
        }
        let raw_label = label_text(paragraph);
        let date_typed = is_date_label(&raw_label);
        let front = has_marker(paragraph, 'f');
        let rear = has_marker(paragraph, 'r');

        for index in 0..placeholders {
            // With both markers in one paragraph, assignment is by placeholder
            // order: first -> front, second -> rear. Excess placeholders stay
            // uncategorized and fall through to label-based resolution.
            let role = if front && rear {
                match index {
                    0 => Some(SagRole::Front),
                    1 => Some(SagRole::Rear),
                    _ => None,
                }
            } else if front {
                Some(SagRole::Front)
            } else if rear {
                Some(SagRole::Rear)
            } else {
                None
            };
            out.push(FieldDescriptor {
                raw_label: raw_label.clone(),
                position,
                role,
                date_typed,
            });
        }
    }
    out
}

fn resolve_field(catalog: &FieldCatalog, descriptor: FieldDescriptor, fields: &mut Vec<Field>) {
    let canonical_id = match descriptor.role {
        Some(role) => role.canonical_id().to_string(),
        None => normalize(catalog, &descriptor.raw_label),
    };
    let canonical_id = disambiguate(fields, descriptor.position, canonical_id);
    let mut field = Field::new(FieldKey::new(descriptor.position, canonical_id));
    field.date_typed = descriptor.date_typed;
    fields.push(field);
}

/// Keys must be unique per position; later collisions get a deterministic
/// `-2`, `-3`, ... suffix in binding order.
fn disambiguate(fields: &[Field], position: Position, canonical_id: String) -> String {
    let taken = |id: &str| {
        fields
            .iter()
            .any(|f| f.key.position == position && f.key.canonical_id == id)
    };
    if !taken(&canonical_id) {
        return canonical_id;
    }
    let mut n = 2;
    loop {
        let candidate = format!("{canonical_id}-{n}");
        if !taken(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

/// Count placeholder runs: any run of 3+ underscores is a single
/// placeholder, never split into multiple fields.
fn count_placeholders(text: &str) -> usize {
    let mut count = 0;
    let mut run = 0;
    for ch in text.chars() {
        if ch == '_' {
            run += 1;
        } else {
            if run >= PLACEHOLDER_MIN_RUN {
                count += 1;
            }
            run = 0;
        }
    }
    if run >= PLACEHOLDER_MIN_RUN {
        count += 1;
    }
    count
}

/// Paragraph text with placeholder runs removed and whitespace collapsed;
/// this is the raw label handed to the normalizer.
fn label_text(text: &str) -> String {
    let mut stripped = String::with_capacity(text.len());
    let mut run = String::new();
    for ch in text.chars() {
        if ch == '_' {
            run.push(ch);
            continue;
        }
        if !run.is_empty() {
            if run.len() < PLACEHOLDER_MIN_RUN {
                stripped.push_str(&run);
            }
            run.clear();
        }
        stripped.push(ch);
    }
    if !run.is_empty() && run.len() < PLACEHOLDER_MIN_RUN {
        stripped.push_str(&run);
    }
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// A paragraph marks its field as date-typed when it starts with the word
/// "date" or contains "date" followed by a colon.
fn is_date_label(label: &str) -> bool {
    let lower = label.to_lowercase();
    if let Some(rest) = lower.strip_prefix("date")
        && !rest.chars().next().is_some_and(|c| c.is_ascii_alphanumeric())
    {
        return true;
    }
    let bytes = lower.as_bytes();
    for (i, _) in lower.match_indices("date") {
        let boundary_before = i == 0 || !bytes[i - 1].is_ascii_alphanumeric();
        if !boundary_before {
            continue;
        }
        let after = lower[i + 4..].trim_start();
        if after.starts_with(':') {
            return true;
        }
    }
    false
}

/// Detect an explicit "F:" / "R:" marker token at a word boundary.
fn has_marker(text: &str, marker: char) -> bool {
    let lower = text.to_lowercase();
    let needle = format!("{marker}:");
    let bytes = lower.as_bytes();
    lower.match_indices(&needle).any(|(i, _)| {
        i == 0 || !bytes[i - 1].is_ascii_alphanumeric()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn underscore_runs_collapse_to_one_placeholder() {
        assert_eq!(count_placeholders("Notes: __________"), 1);
        assert_eq!(count_placeholders("Sag F: _____ R: _____"), 2);
        assert_eq!(count_placeholders("a __ b"), 0);
        assert_eq!(count_placeholders("___"), 1);
    }

    #[test]
    fn label_strips_placeholders_and_collapses_whitespace() {
        assert_eq!(label_text("Front Preload: _____ turns"), "Front Preload: turns");
        assert_eq!(label_text("a __ b ____"), "a __ b");
    }

    #[test]
    fn date_labels_are_detected() {
        assert!(is_date_label("Date: "));
        assert!(is_date_label("Setup date :"));
        assert!(is_date_label("Date"));
        assert!(!is_date_label("Update: rebound"));
        assert!(!is_date_label("Candidates:"));
    }

    #[test]
    fn markers_require_word_boundary() {
        assert!(has_marker("Sag F: 32", 'f'));
        assert!(has_marker("front R:", 'r'));
        assert!(!has_marker("Ref: manual", 'f'));
    }
}
