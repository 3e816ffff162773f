use crate::commands::{plural, CmdMessage, CmdResult};
use crate::error::Result;
use crate::model::EntryId;
use crate::store::moves::MoveOutcome;
use crate::store::EntryStore;

/// Outliner arrow moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    /// One level out, before the former parent.
    Left,
    /// Into the next sibling.
    Right,
}

pub fn run(store: &mut EntryStore, ids: &[EntryId], direction: Direction) -> Result<CmdResult> {
    let outcome = match direction {
        Direction::Up => store.move_up(ids)?,
        Direction::Down => store.move_down(ids)?,
        Direction::Left => store.outdent(ids)?,
        Direction::Right => store.indent(ids)?,
    };
    Ok(report(outcome))
}

/// Move entries under `target` (or to the root), after its existing children.
pub fn into(store: &mut EntryStore, ids: &[EntryId], target: Option<EntryId>) -> Result<CmdResult> {
    let outcome = store.move_into(ids, target)?;
    Ok(report(outcome))
}

fn report(outcome: MoveOutcome) -> CmdResult {
    let mut result = CmdResult::default();
    if !outcome.skipped.is_empty() {
        result.add_message(CmdMessage::info(format!(
            "{} could not move",
            plural(outcome.skipped.len(), "entry")
        )));
    }
    result.with_affected_entries(outcome.moved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AssemblerError;
    use crate::model::Entry;

    fn store_with(titles: &[&str]) -> (EntryStore, Vec<EntryId>) {
        let mut store = EntryStore::new();
        let ids = titles
            .iter()
            .map(|t| {
                let entry = Entry::new(*t);
                let id = entry.id();
                store.add(entry).unwrap();
                id
            })
            .collect();
        (store, ids)
    }

    #[test]
    fn right_then_left_round_trips() {
        let (mut store, ids) = store_with(&["a", "b"]);
        run(&mut store, &[ids[0]], Direction::Right).unwrap();
        assert_eq!(store.get(ids[0]).unwrap().parent(), Some(ids[1]));
        run(&mut store, &[ids[0]], Direction::Left).unwrap();
        assert_eq!(store.get(ids[0]).unwrap().parent(), None);
        assert_eq!(store.get(ids[0]).unwrap().position(), 0);
    }

    #[test]
    fn blocked_move_is_reported() {
        let (mut store, ids) = store_with(&["a", "b"]);
        let result = run(&mut store, &[ids[0]], Direction::Up).unwrap();
        assert!(result.affected_entries.is_empty());
        assert_eq!(result.messages[0].content, "1 entry could not move");
    }

    #[test]
    fn into_rejects_cycle() {
        let (mut store, ids) = store_with(&["a", "b"]);
        into(&mut store, &[ids[1]], Some(ids[0])).unwrap();
        assert!(matches!(
            into(&mut store, &[ids[0]], Some(ids[1])),
            Err(AssemblerError::CycleDetected { .. })
        ));
    }
}
