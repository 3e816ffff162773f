//! Host-bound entries.
//!
//! Node entries wrap a scene node; their value is an empty mapping that child entries
//! fill in when the document is assembled. Attribute entries extract their value once,
//! before the entry exists: if extraction fails, no entry is created.

use crate::error::{AssemblerError, Result};
use crate::extract::extract;
use crate::host::{AttributeHandle, NodeHandle, SceneHost};
use crate::model::{AttributeBinding, Entry, EntrySource, Mapping, NodeBinding, Value};

impl Entry {
    pub fn from_node<H: SceneHost + ?Sized>(host: &H, node: NodeHandle) -> Result<Entry> {
        let title = host.node_name(node)?;
        let uuid = host.node_uuid(node)?;
        Ok(Entry::bound(
            title,
            Value::Mapping(Mapping::new()),
            EntrySource::Node(NodeBinding { node, uuid }),
        ))
    }

    pub fn from_attribute<H: SceneHost + ?Sized>(host: &H, attr: AttributeHandle) -> Result<Entry> {
        let value = extract(host, attr)?;
        let binding = AttributeBinding {
            node: host.attribute_node(attr)?,
            attribute: attr,
            path: host.attribute_path(attr)?,
            keyable: host.is_keyable(attr)?,
            connected: host.is_connected(attr)?,
            hidden: host.is_hidden(attr)?,
        };
        let title = host.attribute_long_name(attr)?;
        Ok(Entry::bound(title, value, EntrySource::Attribute(binding)))
    }
}

/// Attribute entries of one node, with the attributes that could not be extracted.
#[derive(Debug, Default)]
pub struct AttributeListing {
    pub entries: Vec<Entry>,
    pub skipped: Vec<SkippedAttribute>,
}

#[derive(Debug)]
pub struct SkippedAttribute {
    pub attribute: AttributeHandle,
    pub error: AssemblerError,
}

/// Build an entry for every attribute of `node`.
///
/// A failing attribute is recorded in `skipped` and never stops its siblings. Only a
/// failure to list the node's attributes at all is returned as an error.
pub fn node_attribute_entries<H: SceneHost + ?Sized>(
    host: &H,
    node: NodeHandle,
) -> Result<AttributeListing> {
    let mut listing = AttributeListing::default();
    for attr in host.node_attributes(node)? {
        match Entry::from_attribute(host, attr) {
            Ok(entry) => listing.entries.push(entry),
            Err(error) => {
                tracing::warn!(%attr, %error, "skipping attribute");
                listing.skipped.push(SkippedAttribute {
                    attribute: attr,
                    error,
                });
            }
        }
    }
    Ok(listing)
}
