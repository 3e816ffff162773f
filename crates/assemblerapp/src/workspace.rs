//! Document tabs.
//!
//! A [`Workspace`] always holds at least one tab: closing the last one replaces it with
//! a fresh, empty tab. New tabs are labelled `Untitled - N` with the smallest unused N.

use crate::error::{AssemblerError, Result};
use crate::store::EntryStore;

#[derive(Debug, Clone)]
pub struct Tab {
    label: String,
    pub store: EntryStore,
}

impl Tab {
    fn new(label: String) -> Self {
        Self {
            label,
            store: EntryStore::new(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

#[derive(Debug, Clone)]
pub struct Workspace {
    tabs: Vec<Tab>,
    active: usize,
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new()
    }
}

impl Workspace {
    pub fn new() -> Self {
        let mut workspace = Self {
            tabs: Vec::new(),
            active: 0,
        };
        workspace.open_tab(None);
        workspace
    }

    pub fn len(&self) -> usize {
        self.tabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    pub fn tabs(&self) -> &[Tab] {
        &self.tabs
    }

    pub fn tab(&self, index: usize) -> Result<&Tab> {
        self.tabs.get(index).ok_or(AssemblerError::TabNotFound(index))
    }

    pub fn tab_mut(&mut self, index: usize) -> Result<&mut Tab> {
        self.tabs
            .get_mut(index)
            .ok_or(AssemblerError::TabNotFound(index))
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn active(&self) -> &Tab {
        &self.tabs[self.active]
    }

    pub fn active_mut(&mut self) -> &mut Tab {
        &mut self.tabs[self.active]
    }

    /// Append a tab and make it active. Returns its index.
    pub fn open_tab(&mut self, label: Option<String>) -> usize {
        let label = label
            .filter(|l| !l.is_empty())
            .unwrap_or_else(|| self.default_label());
        self.tabs.push(Tab::new(label));
        self.active = self.tabs.len() - 1;
        self.active
    }

    fn default_label(&self) -> String {
        (1..)
            .map(|n| format!("Untitled - {}", n))
            .find(|label| self.tabs.iter().all(|t| &t.label != label))
            .unwrap_or_default()
    }

    pub fn activate(&mut self, index: usize) -> Result<()> {
        self.tab(index)?;
        self.active = index;
        Ok(())
    }

    pub fn rename_tab(&mut self, index: usize, label: impl Into<String>) -> Result<()> {
        let label = label.into();
        if label.is_empty() {
            return Err(AssemblerError::InvalidTitle);
        }
        self.tab_mut(index)?.label = label;
        Ok(())
    }

    /// Close a tab, returning it. The active tab stays the same tab where possible.
    pub fn close_tab(&mut self, index: usize) -> Result<Tab> {
        self.tab(index)?;
        let closed = self.tabs.remove(index);
        if self.tabs.is_empty() {
            self.open_tab(None);
        } else if self.active > index || self.active >= self.tabs.len() {
            self.active = self.active.saturating_sub(1);
        }
        Ok(closed)
    }

    /// Close every tab, leaving one fresh tab.
    pub fn close_all(&mut self) {
        self.tabs.clear();
        self.open_tab(None);
    }
}
