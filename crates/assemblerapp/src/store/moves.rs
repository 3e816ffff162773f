//! Outliner moves.
//!
//! Each move takes a selection of entries and groups it by parent. A group is moved as
//! a unit or, when the move is impossible for any of its members, skipped whole: the
//! topmost member of a group cannot move up, a root-level group cannot be outdented, and
//! a group without a following unselected sibling cannot be indented.

use super::EntryStore;
use crate::error::Result;
use crate::model::EntryId;
use indexmap::IndexMap;

/// What a group move did.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MoveOutcome {
    pub moved: Vec<EntryId>,
    pub skipped: Vec<EntryId>,
}

impl MoveOutcome {
    fn skip(&mut self, group: &[EntryId]) {
        self.skipped.extend_from_slice(group);
    }
}

impl EntryStore {
    /// Group `ids` by parent, in order of first appearance, members sorted by position.
    fn selection_groups(&self, ids: &[EntryId]) -> Result<IndexMap<Option<EntryId>, Vec<EntryId>>> {
        let mut groups: IndexMap<Option<EntryId>, Vec<EntryId>> = IndexMap::new();
        for id in ids {
            let entry = self.require(*id)?;
            let group = groups.entry(entry.parent()).or_default();
            if !group.contains(id) {
                group.push(*id);
            }
        }
        for group in groups.values_mut() {
            group.sort_by_key(|id| self.entries.get(id).map(|e| e.position()));
        }
        Ok(groups)
    }

    /// Swap each selected entry with the sibling above it.
    pub fn move_up(&mut self, ids: &[EntryId]) -> Result<MoveOutcome> {
        let mut outcome = MoveOutcome::default();
        for (parent, group) in self.selection_groups(ids)? {
            let mut order = self.sibling_order(parent);
            let indices: Vec<usize> = group.iter().filter_map(|id| index_of(&order, *id)).collect();
            if indices.first() == Some(&0) {
                outcome.skip(&group);
                continue;
            }
            for idx in indices {
                order.swap(idx - 1, idx);
            }
            self.apply_order(parent, &order);
            outcome.moved.extend(group);
        }
        Ok(outcome)
    }

    /// Swap each selected entry with the sibling below it.
    pub fn move_down(&mut self, ids: &[EntryId]) -> Result<MoveOutcome> {
        let mut outcome = MoveOutcome::default();
        for (parent, group) in self.selection_groups(ids)? {
            let mut order = self.sibling_order(parent);
            let mut indices: Vec<usize> = group.iter().filter_map(|id| index_of(&order, *id)).collect();
            indices.reverse();
            if indices.first() == Some(&(order.len() - 1)) {
                outcome.skip(&group);
                continue;
            }
            for idx in indices {
                order.swap(idx, idx + 1);
            }
            self.apply_order(parent, &order);
            outcome.moved.extend(group);
        }
        Ok(outcome)
    }

    /// Move each selected entry up one level, just before its former parent.
    pub fn outdent(&mut self, ids: &[EntryId]) -> Result<MoveOutcome> {
        let mut outcome = MoveOutcome::default();
        for (parent, group) in self.selection_groups(ids)? {
            let Some(parent_id) = parent else {
                outcome.skip(&group);
                continue;
            };
            let grandparent = self.require(parent_id)?.parent();

            let mut old_order = self.sibling_order(parent);
            old_order.retain(|id| !group.contains(id));
            let mut new_order = self.sibling_order(grandparent);
            for id in &group {
                let at = index_of(&new_order, parent_id).unwrap_or(new_order.len());
                new_order.insert(at, *id);
            }

            self.apply_order(parent, &old_order);
            self.apply_order(grandparent, &new_order);
            outcome.moved.extend(group);
        }
        Ok(outcome)
    }

    /// Move the selected entries under the nearest following sibling that is not
    /// itself selected, at the top of its children and in their current order.
    pub fn indent(&mut self, ids: &[EntryId]) -> Result<MoveOutcome> {
        let mut outcome = MoveOutcome::default();
        for (parent, group) in self.selection_groups(ids)? {
            let order = self.sibling_order(parent);
            let target = group.iter().find_map(|id| {
                let idx = index_of(&order, *id)?;
                order.get(idx + 1).filter(|next| !group.contains(next)).copied()
            });
            let Some(target) = target else {
                outcome.skip(&group);
                continue;
            };

            let mut old_order = order;
            old_order.retain(|id| !group.contains(id));
            let mut new_order = self.sibling_order(Some(target));
            for (k, id) in group.iter().enumerate() {
                new_order.insert(k, *id);
            }

            self.apply_order(parent, &old_order);
            self.apply_order(Some(target), &new_order);
            outcome.moved.extend(group);
        }
        Ok(outcome)
    }

    /// Move entries to the end of `target`'s children, or to the root level.
    ///
    /// Every entry is checked before any is moved.
    pub fn move_into(&mut self, ids: &[EntryId], target: Option<EntryId>) -> Result<MoveOutcome> {
        for id in ids {
            self.require(*id)?;
            self.check_parent(*id, target)?;
        }
        let mut outcome = MoveOutcome::default();
        for id in ids {
            if outcome.moved.contains(id) {
                continue;
            }
            if self.require(*id)?.parent() == target {
                outcome.skipped.push(*id);
                continue;
            }
            self.reparent(*id, target)?;
            outcome.moved.push(*id);
        }
        Ok(outcome)
    }
}

fn index_of(order: &[EntryId], id: EntryId) -> Option<usize> {
    order.iter().position(|e| *e == id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AssemblerError;
    use crate::model::Entry;
    use crate::store::test_support::assert_dense;

    /// root: a, b, c, d
    fn flat() -> (EntryStore, Vec<EntryId>) {
        let mut store = EntryStore::new();
        let mut ids = Vec::new();
        for title in ["a", "b", "c", "d"] {
            let entry = Entry::new(title);
            ids.push(entry.id());
            store.add(entry).unwrap();
        }
        (store, ids)
    }

    fn titles(store: &EntryStore, parent: Option<EntryId>) -> Vec<String> {
        store
            .children(parent)
            .iter()
            .map(|e| e.title().to_string())
            .collect()
    }

    #[test]
    fn move_up_swaps_with_previous_sibling() {
        let (mut store, ids) = flat();
        let outcome = store.move_up(&[ids[2], ids[3]]).unwrap();
        assert_eq!(outcome.moved.len(), 2);
        assert_eq!(titles(&store, None), vec!["a", "c", "d", "b"]);
        assert_dense(&store);
    }

    #[test]
    fn move_up_skips_group_at_top() {
        let (mut store, ids) = flat();
        let outcome = store.move_up(&[ids[0], ids[2]]).unwrap();
        assert!(outcome.moved.is_empty());
        assert_eq!(outcome.skipped.len(), 2);
        assert_eq!(titles(&store, None), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn move_down_swaps_with_next_sibling() {
        let (mut store, ids) = flat();
        store.move_down(&[ids[0], ids[1]]).unwrap();
        assert_eq!(titles(&store, None), vec!["c", "a", "b", "d"]);
        assert_dense(&store);
    }

    #[test]
    fn move_down_skips_group_at_bottom() {
        let (mut store, ids) = flat();
        let outcome = store.move_down(&[ids[3]]).unwrap();
        assert_eq!(outcome.skipped, vec![ids[3]]);
        assert_eq!(titles(&store, None), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn indent_moves_into_next_unselected_sibling() {
        let (mut store, ids) = flat();
        store.indent(&[ids[0], ids[1]]).unwrap();
        assert_eq!(titles(&store, None), vec!["c", "d"]);
        assert_eq!(titles(&store, Some(ids[2])), vec!["a", "b"]);
        assert_dense(&store);
    }

    #[test]
    fn indent_puts_entries_above_existing_children() {
        let (mut store, ids) = flat();
        store.indent(&[ids[2]]).unwrap();
        store.indent(&[ids[1]]).unwrap();
        assert_eq!(titles(&store, Some(ids[3])), vec!["b", "c"]);
    }

    #[test]
    fn indent_without_following_sibling_is_skipped() {
        let (mut store, ids) = flat();
        let outcome = store.indent(&[ids[3]]).unwrap();
        assert_eq!(outcome.skipped, vec![ids[3]]);
        assert_eq!(titles(&store, None), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn outdent_places_entries_before_former_parent() {
        let (mut store, ids) = flat();
        store.indent(&[ids[0], ids[1]]).unwrap();
        store.outdent(&[ids[0], ids[1]]).unwrap();
        assert_eq!(titles(&store, None), vec!["a", "b", "c", "d"]);
        assert!(store.children(Some(ids[2])).is_empty());
        assert_dense(&store);
    }

    #[test]
    fn outdent_at_root_is_skipped() {
        let (mut store, ids) = flat();
        let outcome = store.outdent(&[ids[1]]).unwrap();
        assert_eq!(outcome.skipped, vec![ids[1]]);
    }

    #[test]
    fn groups_move_independently() {
        let (mut store, ids) = flat();
        store.indent(&[ids[0]]).unwrap();
        // root: b, c(a), d
        let outcome = store.move_up(&[ids[0], ids[3]]).unwrap();
        assert_eq!(outcome.skipped, vec![ids[0]]);
        assert_eq!(outcome.moved, vec![ids[3]]);
        assert_eq!(titles(&store, None), vec!["b", "d", "c"]);
    }

    #[test]
    fn unknown_entry_fails_before_moving() {
        let (mut store, ids) = flat();
        let result = store.move_down(&[ids[0], EntryId::new()]);
        assert!(matches!(result, Err(AssemblerError::EntryNotFound(_))));
        assert_eq!(titles(&store, None), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn move_into_rejects_cycles_up_front() {
        let (mut store, ids) = flat();
        store.move_into(&[ids[1]], Some(ids[0])).unwrap();
        let result = store.move_into(&[ids[2], ids[0]], Some(ids[1]));
        assert!(matches!(result, Err(AssemblerError::CycleDetected { .. })));
        assert_eq!(store.get(ids[2]).unwrap().parent(), None);
    }

    #[test]
    fn move_into_skips_entries_already_there() {
        let (mut store, ids) = flat();
        let outcome = store.move_into(&[ids[1], ids[2]], Some(ids[0])).unwrap();
        assert_eq!(outcome.moved, vec![ids[1], ids[2]]);
        let again = store.move_into(&[ids[1]], Some(ids[0])).unwrap();
        assert_eq!(again.skipped, vec![ids[1]]);
        assert_eq!(titles(&store, Some(ids[0])), vec!["b", "c"]);
    }
}
