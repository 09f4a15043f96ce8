use sagbook_core::catalog::FieldCatalog;
use sagbook_core::Snapshot;

/// One catalog row of a rendered record: the two position columns side by
/// side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordRow {
    pub field_id: String,
    pub label: String,
    pub baseline: String,
    pub final_value: String,
}

/// One stored record, ready for display. `index` is the storage-order index
/// (oldest first) so deletes can address the underlying entry directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordCard {
    pub index: usize,
    pub timestamp: i64,
    pub rows: Vec<RecordRow>,
}

/// Project stored history into display cards, most recent first. Rows follow
/// catalog declaration order; values whose key suffix resolves to no catalog
/// entry are bucketed under the notes row rather than dropped.
pub fn build_history_view(catalog: &FieldCatalog, history: &[Snapshot]) -> Vec<RecordCard> {
    history
        .iter()
        .enumerate()
        .rev()
        .map(|(index, snapshot)| RecordCard {
            index,
            timestamp: snapshot.timestamp,
            rows: build_rows(catalog, snapshot),
        })
        .collect()
}

fn build_rows(catalog: &FieldCatalog, snapshot: &Snapshot) -> Vec<RecordRow> {
    let mut rows: Vec<RecordRow> = catalog
        .entries()
        .iter()
        .map(|entry| RecordRow {
            field_id: entry.id.clone(),
            label: entry.label.clone(),
            baseline: String::new(),
            final_value: String::new(),
        })
        .collect();

    for (key, value) in &snapshot.values {
        let (head, suffix) = key.split_once("::").unwrap_or(("final", key.as_str()));
        let field_id = bucket_id(catalog, suffix);
        let Some(row) = rows.iter_mut().find(|r| r.field_id == field_id) else {
            continue;
        };
        if head == "baseline" {
            row.baseline = value.clone();
        } else {
            row.final_value = value.clone();
        }
    }
    rows
}

fn bucket_id<'a>(catalog: &'a FieldCatalog, suffix: &'a str) -> &'a str {
    if catalog.entry(suffix).is_some() {
        return suffix;
    }
    match catalog.resolve(suffix) {
        Some(entry) => &entry.id,
        None => "notes",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(timestamp: i64, pairs: &[(&str, &str)]) -> Snapshot {
        let mut snap = Snapshot::new(timestamp, "9");
        snap.values = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        snap
    }

    #[test]
    fn cards_are_most_recent_first_with_storage_indices() {
        let catalog = FieldCatalog::default();
        let history = vec![
            snapshot(100, &[("baseline::front-sag", "32")]),
            snapshot(200, &[("final::front-sag", "30")]),
        ];
        let cards = build_history_view(&catalog, &history);
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].timestamp, 200);
        assert_eq!(cards[0].index, 1);
        assert_eq!(cards[1].timestamp, 100);
        assert_eq!(cards[1].index, 0);
    }

    #[test]
    fn positions_land_in_their_columns() {
        let catalog = FieldCatalog::default();
        let history = vec![snapshot(
            1,
            &[("baseline::front-sag", "32"), ("final::front-sag", "30")],
        )];
        let cards = build_history_view(&catalog, &history);
        let row = cards[0]
            .rows
            .iter()
            .find(|r| r.field_id == "front-sag")
            .unwrap();
        assert_eq!(row.baseline, "32");
        assert_eq!(row.final_value, "30");
    }

    #[test]
    fn unresolvable_keys_bucket_under_notes() {
        let catalog = FieldCatalog::default();
        let history = vec![snapshot(1, &[("final::chain-slack", "35mm")])];
        let cards = build_history_view(&catalog, &history);
        let notes = cards[0]
            .rows
            .iter()
            .find(|r| r.field_id == "notes")
            .unwrap();
        assert_eq!(notes.final_value, "35mm");
    }

    #[test]
    fn rows_follow_catalog_order() {
        let catalog = FieldCatalog::default();
        let history = vec![snapshot(1, &[("final::notes", "ok")])];
        let cards = build_history_view(&catalog, &history);
        let ids: Vec<&str> = cards[0].rows.iter().map(|r| r.field_id.as_str()).collect();
        let catalog_ids: Vec<&str> = catalog.entries().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, catalog_ids);
    }
}
