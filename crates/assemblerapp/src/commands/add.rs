use crate::commands::{plural, CmdMessage, CmdResult};
use crate::entries::node_attribute_entries;
use crate::error::Result;
use crate::filter::AttributeFilter;
use crate::host::{AttributeHandle, NodeHandle, SceneHost};
use crate::model::{Entry, EntryId};
use crate::store::EntryStore;

/// Add prepared entries. Entries already in the store are left alone.
pub fn run(store: &mut EntryStore, entries: Vec<Entry>) -> Result<CmdResult> {
    let ids: Vec<EntryId> = entries
        .iter()
        .map(|e| e.id())
        .filter(|id| !store.contains(*id))
        .collect();
    let added = store.add_all(entries)?;

    let mut result = CmdResult::default().with_affected_entries(ids);
    result.add_message(CmdMessage::success(format!("Added {}", plural(added, "entry"))));
    Ok(result)
}

/// The entry bound to `node` in this store, creating it at the root if missing.
fn node_entry<H: SceneHost + ?Sized>(
    store: &mut EntryStore,
    host: &H,
    node: NodeHandle,
    result: &mut CmdResult,
) -> Result<EntryId> {
    let existing = store
        .entries()
        .find(|e| e.node_binding().map(|b| b.node) == Some(node))
        .map(|e| e.id());
    if let Some(id) = existing {
        return Ok(id);
    }
    let entry = Entry::from_node(host, node)?;
    let id = entry.id();
    store.add(entry)?;
    result.affected_entries.push(id);
    Ok(id)
}

/// Whether `attr` already has an entry under `parent`.
fn has_attribute(store: &EntryStore, parent: EntryId, attr: AttributeHandle) -> bool {
    store
        .children(Some(parent))
        .iter()
        .any(|e| e.attribute_binding().map(|b| b.attribute) == Some(attr))
}

/// Add `node` and every attribute of it that passes `filter`, nested under the node.
pub fn node<H: SceneHost + ?Sized>(
    store: &mut EntryStore,
    host: &H,
    node: NodeHandle,
    filter: &AttributeFilter,
) -> Result<CmdResult> {
    let mut result = CmdResult::default();
    let parent = node_entry(store, host, node, &mut result)?;

    let listing = node_attribute_entries(host, node)?;
    for skipped in listing.skipped {
        result.add_message(CmdMessage::warning(skipped.error.to_string()));
    }
    for entry in listing.entries {
        let attr = entry.attribute_binding().map(|b| b.attribute);
        if !filter.matches(&entry) || attr.is_some_and(|a| has_attribute(store, parent, a)) {
            continue;
        }
        let id = entry.id();
        store.add(entry.with_parent(parent))?;
        result.affected_entries.push(id);
    }

    result.add_message(CmdMessage::success(format!(
        "Added {}",
        plural(result.affected_entries.len(), "entry")
    )));
    Ok(result)
}

/// Add single attributes, each nested under an entry for its node.
///
/// An attribute that cannot be extracted is reported and skipped.
pub fn attributes<H: SceneHost + ?Sized>(
    store: &mut EntryStore,
    host: &H,
    attrs: &[AttributeHandle],
) -> Result<CmdResult> {
    let mut result = CmdResult::default();
    for &attr in attrs {
        let entry = match Entry::from_attribute(host, attr) {
            Ok(entry) => entry,
            Err(e) if e.is_attribute_local() => {
                tracing::warn!(%attr, error = %e, "skipping attribute");
                result.add_message(CmdMessage::warning(e.to_string()));
                continue;
            }
            Err(e) => return Err(e),
        };
        let node = host.attribute_node(attr)?;
        let parent = node_entry(store, host, node, &mut result)?;
        if has_attribute(store, parent, attr) {
            continue;
        }
        let id = entry.id();
        store.add(entry.with_parent(parent))?;
        result.affected_entries.push(id);
    }

    result.add_message(CmdMessage::success(format!(
        "Added {}",
        plural(result.affected_entries.len(), "entry")
    )));
    Ok(result)
}
