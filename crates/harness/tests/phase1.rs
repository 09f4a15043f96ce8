//! Phase 1: document scanning, field binding, and key normalization.

use sagbook_core::catalog::FieldCatalog;
use sagbook_core::field::Field;
use sagbook_engine::{bind_document, Document, SlideDoc};
use sagbook_harness::sample_document;

fn bind(doc: &Document) -> Vec<Field> {
    bind_document(&FieldCatalog::default(), doc)
}

fn keys(fields: &[Field]) -> Vec<String> {
    fields.iter().map(|f| f.key.to_string()).collect()
}

fn baseline_doc(paragraphs: &[&str]) -> Document {
    Document {
        slides: vec![SlideDoc::new("3", paragraphs)],
    }
}

#[test]
fn sample_document_binds_expected_keys() {
    let fields = bind(&sample_document());
    assert_eq!(
        keys(&fields),
        vec![
            "baseline::date",
            "baseline::front-sag",
            "baseline::rear-sag",
            "baseline::front-preload",
            "baseline::rear-preload",
            "baseline::front-rebound",
            "baseline::notes",
            "final::date",
            "final::front-sag",
            "final::rear-sag",
            "final::front-compression",
            "final::front-preload",
            "final::rear-preload",
            "final::rear-rebound",
            "final::notes",
        ]
    );
}

#[test]
fn absent_record_area_is_a_noop() {
    let doc = Document {
        slides: vec![SlideDoc::new("5", &["Clicker adjustment basics"])],
    };
    assert!(bind(&doc).is_empty());

    let only_baseline = baseline_doc(&["Notes: _____"]);
    assert_eq!(keys(&bind(&only_baseline)), vec!["baseline::notes"]);
}

#[test]
fn markers_assign_roles_in_placeholder_order() {
    let doc = baseline_doc(&["Sag F: _____ R: _____"]);
    assert_eq!(
        keys(&bind(&doc)),
        vec!["baseline::front-sag", "baseline::rear-sag"]
    );
}

#[test]
fn excess_placeholders_fall_back_to_label_resolution() {
    let doc = baseline_doc(&["Sag F: _____ R: _____ spare _____"]);
    let bound = keys(&bind(&doc));
    assert_eq!(bound[0], "baseline::front-sag");
    assert_eq!(bound[1], "baseline::rear-sag");
    // Third placeholder has no marker slot left; its key comes from the
    // label text before the first colon.
    assert_eq!(bound[2], "baseline::sag-f");
}

#[test]
fn single_marker_applies_to_every_placeholder() {
    let doc = baseline_doc(&["F: _____ _____"]);
    assert_eq!(
        keys(&bind(&doc)),
        vec!["baseline::front-sag", "baseline::front-sag-2"]
    );
}

#[test]
fn duplicate_labels_get_deterministic_suffixes() {
    let doc = baseline_doc(&["Notes: _____", "Notes: _____", "Notes: _____"]);
    assert_eq!(
        keys(&bind(&doc)),
        vec!["baseline::notes", "baseline::notes-2", "baseline::notes-3"]
    );
}

#[test]
fn same_label_across_positions_needs_no_suffix() {
    let doc = Document {
        slides: vec![
            SlideDoc::new("3", &["Notes: _____"]),
            SlideDoc::new("9", &["Notes: _____"]),
        ],
    };
    assert_eq!(keys(&bind(&doc)), vec!["baseline::notes", "final::notes"]);
}

#[test]
fn degenerate_label_gets_a_generated_id() {
    let doc = baseline_doc(&["??? _____"]);
    let fields = bind(&doc);
    assert_eq!(fields.len(), 1);
    let id = &fields[0].key.canonical_id;
    assert!(id.starts_with("field-"), "unexpected id {id}");
    assert_eq!(id.len(), "field-".len() + 6);
}

#[test]
fn date_typing_follows_the_label() {
    let fields = bind(&sample_document());
    let date = fields
        .iter()
        .find(|f| f.key.to_string() == "baseline::date")
        .unwrap();
    assert!(date.date_typed);
    let sag = fields
        .iter()
        .find(|f| f.key.to_string() == "baseline::front-sag")
        .unwrap();
    assert!(!sag.date_typed);

    let setup = bind(&baseline_doc(&["Setup date: _____"]));
    assert!(setup[0].date_typed);
    let update = bind(&baseline_doc(&["Update: _____"]));
    assert!(!update[0].date_typed);
}

#[test]
fn unlabeled_measurements_keep_distinct_slugged_keys() {
    let doc = baseline_doc(&["Chain slack: _____", "Tire pressure (cold): _____"]);
    assert_eq!(
        keys(&bind(&doc)),
        vec!["baseline::chain-slack", "baseline::tire-pressure-cold"]
    );
}
