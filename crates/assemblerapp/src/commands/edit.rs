use crate::commands::{CmdMessage, CmdResult};
use crate::error::{AssemblerError, Result};
use crate::model::{EntryId, Value, ValueKind};
use crate::store::EntryStore;

/// Changes from the properties dialog. `None` leaves a field as it is.
#[derive(Debug, Clone, Default)]
pub struct EntryEdit {
    pub title: Option<String>,
    pub value: Option<(ValueKind, String)>,
}

impl EntryEdit {
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            value: None,
        }
    }

    pub fn value(kind: ValueKind, text: impl Into<String>) -> Self {
        Self {
            title: None,
            value: Some((kind, text.into())),
        }
    }
}

/// Apply `edit` to an entry. Nothing changes unless every part of the edit is valid.
pub fn run(store: &mut EntryStore, id: EntryId, edit: EntryEdit) -> Result<CmdResult> {
    let entry = store.get(id).ok_or(AssemblerError::EntryNotFound(id))?;

    if matches!(&edit.title, Some(t) if t.is_empty()) {
        return Err(AssemblerError::InvalidTitle);
    }
    let value = match &edit.value {
        Some(_) if entry.is_host_bound() => {
            return Err(AssemblerError::ImmutableValue(entry.title().to_string()))
        }
        Some((kind, text)) => Some(Value::parse_as(*kind, text)?),
        None => None,
    };

    let entry = store.get_mut(id).ok_or(AssemblerError::EntryNotFound(id))?;
    if let Some(title) = edit.title {
        entry.set_title(title)?;
    }
    if let Some(value) = value {
        entry.set_value(value)?;
    }

    let mut result = CmdResult::default().with_affected_entries(vec![id]);
    result.add_message(CmdMessage::success(format!("Entry updated: {}", entry.title())));
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::memory::fixtures::SceneFixture;
    use crate::model::Entry;

    #[test]
    fn renames_and_retypes_user_entry() {
        let mut store = EntryStore::new();
        let entry = Entry::user("old", "text");
        let id = entry.id();
        store.add(entry).unwrap();

        run(
            &mut store,
            id,
            EntryEdit {
                title: Some("enabled".into()),
                value: Some((ValueKind::Boolean, "yes".into())),
            },
        )
        .unwrap();

        let entry = store.get(id).unwrap();
        assert_eq!(entry.title(), "enabled");
        assert_eq!(entry.value(), &Value::Bool(true));
    }

    #[test]
    fn host_bound_entries_can_be_renamed_but_not_revalued() {
        let fixture = SceneFixture::new();
        let radius = fixture.attr(fixture.sphere, "radius");
        let entry = Entry::from_attribute(&fixture.scene, radius).unwrap();
        let id = entry.id();
        let mut store = EntryStore::new();
        store.add(entry).unwrap();

        assert!(matches!(
            run(&mut store, id, EntryEdit::value(ValueKind::Number, "3")),
            Err(AssemblerError::ImmutableValue(_))
        ));
        run(&mut store, id, EntryEdit::title("r")).unwrap();
        assert_eq!(store.get(id).unwrap().title(), "r");
        assert_eq!(store.get(id).unwrap().value(), &Value::Float(2.0));
    }

    #[test]
    fn invalid_value_leaves_title_unchanged() {
        let mut store = EntryStore::new();
        let entry = Entry::user("n", 1.0);
        let id = entry.id();
        store.add(entry).unwrap();

        let edit = EntryEdit {
            title: Some("renamed".into()),
            value: Some((ValueKind::Number, "one".into())),
        };
        assert!(run(&mut store, id, edit).is_err());
        assert_eq!(store.get(id).unwrap().title(), "n");
    }

    #[test]
    fn missing_entry_fails() {
        let mut store = EntryStore::new();
        assert!(matches!(
            run(&mut store, EntryId::new(), EntryEdit::title("x")),
            Err(AssemblerError::EntryNotFound(_))
        ));
    }
}
