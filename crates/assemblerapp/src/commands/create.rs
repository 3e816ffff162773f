use crate::commands::{CmdMessage, CmdResult};
use crate::error::{AssemblerError, Result};
use crate::model::{Entry, EntryId, Value, ValueKind};
use crate::store::EntryStore;

/// Create a user entry of `kind` from `text`, appended under `parent`.
///
/// Without text the entry starts with the empty value of its kind.
pub fn run(
    store: &mut EntryStore,
    title: String,
    kind: ValueKind,
    text: Option<&str>,
    parent: Option<EntryId>,
) -> Result<CmdResult> {
    if title.is_empty() {
        return Err(AssemblerError::InvalidTitle);
    }
    let value = match text {
        Some(text) => Value::parse_as(kind, text)?,
        None => Value::empty_of(kind)
            .ok_or_else(|| AssemblerError::InvalidValue(format!("cannot create a {} entry", kind)))?,
    };

    let mut entry = Entry::user(title, value);
    if let Some(parent) = parent {
        entry = entry.with_parent(parent);
    }
    let id = entry.id();
    let title = entry.title().to_string();
    store.add(entry)?;

    let mut result = CmdResult::default().with_affected_entries(vec![id]);
    result.add_message(CmdMessage::success(format!("Entry created: {}", title)));
    Ok(result)
}
