//! # API Facade
//!
//! [`AssemblerApi`] is the single entry point for UI clients. It owns the scene host,
//! the open document tabs and the configuration, and dispatches each call to the
//! matching `commands::*` function against the active tab.
//!
//! The facade holds no business logic and does no I/O of its own beyond what a command
//! does (export writes a file). Commands are tested in their modules; tests here check
//! the wiring.
//!
//! ## Generic Over SceneHost
//!
//! `AssemblerApi<H: SceneHost>` works with any host adapter. The CLI and the tests use
//! [`MemoryScene`](crate::host::memory::MemoryScene).
//!
//! ## Selection Watching
//!
//! Callbacks registered through [`AssemblerApi::subscribe_selection`] are tracked and
//! deregistered from the host when the API is dropped, so a closed tool never leaves
//! callbacks behind in the host.

use crate::commands::{self, edit::EntryEdit, move_entries::Direction, CmdResult};
use crate::config::AssemblerConfig;
use crate::encode::DocumentEncoder;
use crate::error::Result;
use crate::filter::AttributeFilter;
use crate::host::{AttributeHandle, CallbackToken, HostError, NodeHandle, SceneHost, SelectionCallback};
use crate::model::{EntryId, ValueKind};
use crate::workspace::Workspace;
use std::path::Path;

pub struct AssemblerApi<H: SceneHost> {
    host: H,
    workspace: Workspace,
    config: AssemblerConfig,
    subscriptions: Vec<CallbackToken>,
}

impl<H: SceneHost> AssemblerApi<H> {
    pub fn new(host: H, config: AssemblerConfig) -> Self {
        Self {
            host,
            workspace: Workspace::new(),
            config,
            subscriptions: Vec::new(),
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn workspace_mut(&mut self) -> &mut Workspace {
        &mut self.workspace
    }

    pub fn config(&self) -> &AssemblerConfig {
        &self.config
    }

    /// The attribute filter the configuration asks for.
    pub fn default_filter(&self) -> AttributeFilter {
        AttributeFilter::from_config(&self.config)
    }

    /// The encoder the configuration asks for.
    pub fn default_encoder(&self) -> DocumentEncoder {
        DocumentEncoder::new(self.config.include_indentation, self.config.indentation_size)
    }

    // --- Explorer ---

    pub fn explore_selection(&self, filter: &AttributeFilter) -> Result<CmdResult> {
        commands::explore::selection(&self.host, filter)
    }

    pub fn explore_nodes(&self, nodes: &[NodeHandle], filter: &AttributeFilter) -> Result<CmdResult> {
        commands::explore::run(&self.host, nodes, filter)
    }

    // --- Outliner (active tab) ---

    pub fn add_nodes(&mut self, nodes: &[NodeHandle], filter: &AttributeFilter) -> Result<CmdResult> {
        let store = &mut self.workspace.active_mut().store;
        let mut result = CmdResult::default();
        for &node in nodes {
            let added = commands::add::node(store, &self.host, node, filter)?;
            result.affected_entries.extend(added.affected_entries);
            result.messages.extend(added.messages);
        }
        Ok(result)
    }

    pub fn add_attributes(&mut self, attrs: &[AttributeHandle]) -> Result<CmdResult> {
        let store = &mut self.workspace.active_mut().store;
        commands::add::attributes(store, &self.host, attrs)
    }

    pub fn create_entry(
        &mut self,
        title: impl Into<String>,
        kind: ValueKind,
        text: Option<&str>,
        parent: Option<EntryId>,
    ) -> Result<CmdResult> {
        let store = &mut self.workspace.active_mut().store;
        commands::create::run(store, title.into(), kind, text, parent)
    }

    pub fn edit_entry(&mut self, id: EntryId, edit: EntryEdit) -> Result<CmdResult> {
        commands::edit::run(&mut self.workspace.active_mut().store, id, edit)
    }

    pub fn remove_entries(&mut self, ids: &[EntryId]) -> Result<CmdResult> {
        commands::remove::run(&mut self.workspace.active_mut().store, ids)
    }

    pub fn clear_entries(&mut self) -> Result<CmdResult> {
        commands::remove::clear(&mut self.workspace.active_mut().store)
    }

    pub fn move_entries(&mut self, ids: &[EntryId], direction: Direction) -> Result<CmdResult> {
        commands::move_entries::run(&mut self.workspace.active_mut().store, ids, direction)
    }

    pub fn move_entries_into(&mut self, ids: &[EntryId], target: Option<EntryId>) -> Result<CmdResult> {
        commands::move_entries::into(&mut self.workspace.active_mut().store, ids, target)
    }

    // --- Previewer ---

    pub fn preview(&self) -> Result<CmdResult> {
        self.preview_with(&self.default_encoder())
    }

    pub fn preview_with(&self, encoder: &DocumentEncoder) -> Result<CmdResult> {
        commands::preview::run(&self.workspace.active().store, encoder)
    }

    pub fn export(&self, path: &Path, encoder: &DocumentEncoder) -> Result<CmdResult> {
        commands::export::run(&self.workspace.active().store, encoder, path)
    }

    // --- Selection watching ---

    pub fn subscribe_selection(&mut self, callback: SelectionCallback) -> Result<CallbackToken> {
        let token = self.host.register_selection_changed(callback)?;
        self.subscriptions.push(token);
        Ok(token)
    }

    pub fn unsubscribe_selection(&mut self, token: CallbackToken) -> Result<()> {
        if !self.subscriptions.contains(&token) {
            return Err(HostError::UnknownCallback(token).into());
        }
        self.host.deregister_callback(token)?;
        self.subscriptions.retain(|t| *t != token);
        Ok(())
    }
}

impl<H: SceneHost> Drop for AssemblerApi<H> {
    fn drop(&mut self) {
        for token in self.subscriptions.drain(..) {
            if let Err(error) = self.host.deregister_callback(token) {
                tracing::warn!(%error, "failed to deregister selection callback");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::memory::fixtures::SceneFixture;
    use crate::host::memory::MemoryScene;
    use std::cell::Cell;
    use std::rc::Rc;

    fn api() -> (AssemblerApi<MemoryScene>, NodeHandle, NodeHandle) {
        let fixture = SceneFixture::new();
        let (cube, sphere) = (fixture.cube, fixture.sphere);
        (
            AssemblerApi::new(fixture.scene, AssemblerConfig::default()),
            cube,
            sphere,
        )
    }

    #[test]
    fn add_then_preview_active_tab() {
        let (mut api, _, sphere) = api();
        api.add_nodes(&[sphere], &AttributeFilter::default()).unwrap();
        let preview = api.preview().unwrap();
        assert_eq!(preview.document.as_deref(), Some("{\"pSphere1\": {\"radius\": 2.0}}"));
    }

    #[test]
    fn preview_follows_configured_indentation() {
        let fixture = SceneFixture::new();
        let config = AssemblerConfig {
            include_indentation: true,
            indentation_size: 2,
            ..AssemblerConfig::default()
        };
        let sphere = fixture.sphere;
        let mut api = AssemblerApi::new(fixture.scene, config);
        api.add_nodes(&[sphere], &AttributeFilter::default()).unwrap();
        assert_eq!(
            api.preview().unwrap().document.as_deref(),
            Some("{\n  \"pSphere1\": {\"radius\": 2.0}\n}")
        );
        let compact = api.preview_with(&DocumentEncoder::compact()).unwrap();
        assert_eq!(compact.document.as_deref(), Some("{\"pSphere1\": {\"radius\": 2.0}}"));
    }

    #[test]
    fn tabs_hold_separate_documents() {
        let (mut api, _, sphere) = api();
        api.add_nodes(&[sphere], &AttributeFilter::default()).unwrap();
        api.workspace_mut().open_tab(None);
        assert_eq!(api.preview().unwrap().document.as_deref(), Some(""));
        api.workspace_mut().activate(0).unwrap();
        assert_ne!(api.preview().unwrap().document.as_deref(), Some(""));
    }

    #[test]
    fn explore_selection_uses_host_selection() {
        let (api, _, _) = api();
        let result = api.explore_selection(&api.default_filter()).unwrap();
        assert_eq!(result.listed_nodes.len(), 2);
    }

    #[test]
    fn remove_and_move_go_through_active_store() {
        let (mut api, cube, _) = api();
        let tx = api.host().find_attribute(cube, "translateX").unwrap();
        let ty = api.host().find_attribute(cube, "translateY").unwrap();
        let added = api.add_attributes(&[tx, ty]).unwrap();
        let ids = added.affected_entries;
        // node, tx, ty
        assert_eq!(ids.len(), 3);

        api.move_entries(&[ids[2]], Direction::Up).unwrap();
        let text = api.preview().unwrap().document.unwrap();
        assert_eq!(text, "{\"pCube1\": {\"translateY\": 1.0, \"translateX\": 3.5}}");

        api.remove_entries(&[ids[0]]).unwrap();
        assert!(api.workspace().active().store.is_empty());
    }

    #[test]
    fn selection_callbacks_fire_until_unsubscribed() {
        let (mut api, cube, _) = api();
        let fired = Rc::new(Cell::new(0));
        let counter = fired.clone();
        api.subscribe_selection(Box::new(move || counter.set(counter.get() + 1)))
            .unwrap();

        api.host_mut().select(&[cube]);
        assert_eq!(fired.get(), 1);
        assert_eq!(api.host().callback_count(), 1);

        let token = api.subscribe_selection(Box::new(|| {})).unwrap();
        api.unsubscribe_selection(token).unwrap();
        assert!(api.unsubscribe_selection(token).is_err());
        assert_eq!(api.host().callback_count(), 1);

        api.host_mut().select(&[]);
        assert_eq!(fired.get(), 2);
    }
}
