//! Attribute filtering for the explorer listing.
//!
//! Flags apply to attribute entries only. The search term is matched case-insensitively
//! against an attribute's `node.longName` path and its title, or against the
//! title for any other entry.

use crate::config::AssemblerConfig;
use crate::model::Entry;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeFilter {
    pub connected_only: bool,
    pub show_non_keyable: bool,
    pub show_hidden: bool,
    pub search: Option<String>,
}

impl Default for AttributeFilter {
    fn default() -> Self {
        Self {
            connected_only: false,
            show_non_keyable: true,
            show_hidden: false,
            search: None,
        }
    }
}

impl AttributeFilter {
    /// A filter that lets every entry through.
    pub fn all() -> Self {
        Self {
            show_hidden: true,
            ..Self::default()
        }
    }

    pub fn from_config(config: &AssemblerConfig) -> Self {
        Self {
            connected_only: config.connected_only,
            show_non_keyable: config.show_non_keyable,
            show_hidden: config.show_hidden,
            search: None,
        }
    }

    /// Set the search term. An empty term clears it.
    pub fn with_search(mut self, term: impl Into<String>) -> Self {
        let term = term.into();
        self.search = (!term.is_empty()).then(|| term.to_lowercase());
        self
    }

    pub fn matches(&self, entry: &Entry) -> bool {
        match entry.attribute_binding() {
            Some(binding) => {
                if self.connected_only && !binding.connected {
                    return false;
                }
                if !self.show_non_keyable && !binding.keyable {
                    return false;
                }
                if !self.show_hidden && binding.hidden {
                    return false;
                }
                self.search_matches(&binding.path) || self.search_matches(entry.title())
            }
            None => self.search_matches(entry.title()),
        }
    }

    fn search_matches(&self, text: &str) -> bool {
        match &self.search {
            Some(term) => text.to_lowercase().contains(term.as_str()),
            None => true,
        }
    }
}
