use crate::commands::{plural, CmdMessage, CmdResult};
use crate::error::Result;
use crate::model::EntryId;
use crate::store::EntryStore;

/// Remove entries together with everything nested under them.
pub fn run(store: &mut EntryStore, ids: &[EntryId]) -> Result<CmdResult> {
    let removed = store.remove_all(ids.iter().copied())?;
    let affected: Vec<EntryId> = removed.iter().map(|e| e.id()).collect();

    let mut result = CmdResult::default();
    if affected.is_empty() {
        result.add_message(CmdMessage::info("Nothing to remove"));
    } else {
        result.add_message(CmdMessage::success(format!(
            "Removed {}",
            plural(affected.len(), "entry")
        )));
    }
    Ok(result.with_affected_entries(affected))
}

/// Remove every entry.
pub fn clear(store: &mut EntryStore) -> Result<CmdResult> {
    let affected: Vec<EntryId> = store.entries().map(|e| e.id()).collect();
    store.clear();
    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Cleared {}",
        plural(affected.len(), "entry")
    )));
    Ok(result.with_affected_entries(affected))
}
