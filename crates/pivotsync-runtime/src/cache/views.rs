use super::lock;
use pivotsync_types::{FieldConfiguration, SourceField, TableId, TableView};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
struct Entry {
    view: Option<Arc<TableView>>,
    fields: Option<Arc<FieldConfiguration>>,
    field_names: HashMap<usize, String>,
}

/// Last fetched view per table, plus the field configuration it was
/// rendered from.
///
/// Views are never checked for staleness; whoever fetches a newer one
/// overwrites the entry.
#[derive(Debug, Default)]
pub struct ViewCache {
    entries: Mutex<HashMap<TableId, Entry>>,
}

impl ViewCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: TableId) -> Option<Arc<TableView>> {
        lock(&self.entries).get(&id).and_then(|e| e.view.clone())
    }

    pub fn set(&self, id: TableId, view: TableView) {
        lock(&self.entries).entry(id).or_default().view = Some(Arc::new(view));
    }

    /// Drop the view and field configuration of `id`.
    pub fn delete(&self, id: TableId) {
        lock(&self.entries).remove(&id);
    }

    pub fn clear(&self) {
        lock(&self.entries).clear();
    }

    /// Record the source fields and zone configuration of `id`.
    ///
    /// Source names win over zone names, since value zone names are
    /// display names ("Sum of Sales").
    pub fn set_fields(&self, id: TableId, source_fields: &[SourceField], cfg: FieldConfiguration) {
        let mut field_names: HashMap<usize, String> = HashMap::new();
        for info in cfg.all_fields() {
            field_names.insert(info.source_index, info.name.clone());
        }
        for source in source_fields {
            field_names.insert(source.index, source.name.clone());
        }

        let mut entries = lock(&self.entries);
        let entry = entries.entry(id).or_default();
        entry.fields = Some(Arc::new(cfg));
        entry.field_names = field_names;
    }

    pub fn fields(&self, id: TableId) -> Option<Arc<FieldConfiguration>> {
        lock(&self.entries).get(&id).and_then(|e| e.fields.clone())
    }

    /// Name of source field `source_index` of table `id`, if known.
    pub fn field_name(&self, id: TableId, source_index: usize) -> Option<String> {
        lock(&self.entries)
            .get(&id)
            .and_then(|e| e.field_names.get(&source_index).cloned())
    }

    pub fn len(&self) -> usize {
        lock(&self.entries).len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.entries).is_empty()
    }
}
