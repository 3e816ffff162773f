//! # Command Layer
//!
//! Each user operation lives in its own submodule as a plain `run` function over the
//! domain types: an [`EntryStore`](crate::store::EntryStore), a
//! [`SceneHost`](crate::host::SceneHost), an encoder. Commands return a structured
//! [`CmdResult`] and never print, prompt or pick exit codes; the UI decides how to
//! render what they return.
//!
//! ## Structured Returns
//!
//! - `affected_entries`: ids of entries added, removed, moved or edited
//! - `listed_nodes`: explorer rows (a node with its visible attributes)
//! - `document`: assembled document text (preview)
//! - `paths`: files written (export)
//! - `messages`: leveled messages (info, success, warning, error)
//!
//! Attribute-local failures (an unsupported kind, a failed read) never fail a command.
//! They come back as warnings and the command carries on with the remaining attributes.
//!
//! ## Command Modules
//!
//! - [`explore`]: list nodes and their filtered attributes
//! - [`add`]: add host-bound or prepared entries to a document
//! - [`create`]: create a user entry from a title, kind and text value
//! - [`edit`]: rename an entry or replace its value
//! - [`remove`]: remove entries with their subtrees, or clear a document
//! - [`move_entries`]: outliner moves and reparenting
//! - [`preview`]: assemble and encode a document
//! - [`export`]: write the encoded document to a file

use crate::model::{Entry, EntryId};
use serde::Serialize;
use std::path::PathBuf;

pub mod add;
pub mod create;
pub mod edit;
pub mod explore;
pub mod export;
pub mod move_entries;
pub mod preview;
pub mod remove;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, Serialize)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Error,
            content: content.into(),
        }
    }
}

/// One explorer row: a node entry and the attribute entries that passed the filter.
#[derive(Debug, Clone)]
pub struct NodeListing {
    pub node: Entry,
    pub attributes: Vec<Entry>,
}

#[derive(Debug, Default)]
pub struct CmdResult {
    pub affected_entries: Vec<EntryId>,
    pub listed_nodes: Vec<NodeListing>,
    pub document: Option<String>,
    pub paths: Vec<PathBuf>,
    pub messages: Vec<CmdMessage>,
}

impl CmdResult {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn with_affected_entries(mut self, ids: Vec<EntryId>) -> Self {
        self.affected_entries = ids;
        self
    }

    pub fn with_listed_nodes(mut self, nodes: Vec<NodeListing>) -> Self {
        self.listed_nodes = nodes;
        self
    }

    pub fn with_document(mut self, document: String) -> Self {
        self.document = Some(document);
        self
    }

    pub fn with_paths(mut self, paths: Vec<PathBuf>) -> Self {
        self.paths = paths;
        self
    }

    pub fn warnings(&self) -> impl Iterator<Item = &CmdMessage> {
        self.messages
            .iter()
            .filter(|m| m.level == MessageLevel::Warning)
    }
}

pub(crate) fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{} {}", count, noun)
    } else {
        format!("{} {}s", count, noun)
    }
}
