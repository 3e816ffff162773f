//! Hierarchy assembly: turns a flat set of entries into one nested document.
//!
//! Entries are grouped by parent and each group is ordered by position. Starting from
//! the root group, every entry becomes a `title: value` pair, where the value is either
//! the entry's own value (no children) or the assembled children:
//!
//! | Entry value | Children rendered as                          |
//! |-------------|-----------------------------------------------|
//! | sequence    | `[{child: value}, ...]`, one mapping per child |
//! | anything    | `{child: value, ...}`                          |
//!
//! Entries whose parent is not part of the input are unreachable from the root and do
//! not appear in the output.

use crate::model::{Entry, EntryId, Mapping, Value};
use indexmap::IndexMap;

/// Assemble `entries` into a document. No root-level entries yield an empty mapping.
pub fn preprocess<'a>(entries: impl IntoIterator<Item = &'a Entry>) -> Mapping {
    let mut groups: IndexMap<Option<EntryId>, Vec<&'a Entry>> = IndexMap::new();
    for entry in entries {
        groups.entry(entry.parent()).or_default().push(entry);
    }
    for group in groups.values_mut() {
        group.sort_by_key(|e| e.position());
    }

    match groups.get(&None) {
        Some(roots) => assemble_mapping(roots, &groups),
        None => Mapping::new(),
    }
}

fn assemble_mapping(group: &[&Entry], groups: &IndexMap<Option<EntryId>, Vec<&Entry>>) -> Mapping {
    let mut mapping = Mapping::with_capacity(group.len());
    for entry in group {
        mapping.push(entry.title(), resolve(entry, groups));
    }
    mapping
}

fn resolve(entry: &Entry, groups: &IndexMap<Option<EntryId>, Vec<&Entry>>) -> Value {
    let Some(children) = groups.get(&Some(entry.id())) else {
        return entry.value().clone();
    };
    match entry.value() {
        Value::Sequence(_) => Value::Sequence(
            children
                .iter()
                .map(|child| {
                    let mut single = Mapping::with_capacity(1);
                    single.push(child.title(), resolve(child, groups));
                    Value::Mapping(single)
                })
                .collect(),
        ),
        _ => Value::Mapping(assemble_mapping(children, groups)),
    }
}
