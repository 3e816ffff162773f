//! # Domain Model: Entries and Values
//!
//! This module defines the core data structures of the assembler: [`Entry`], the unit
//! of a user-assembled document, and [`Value`], the plain data an entry carries.
//!
//! ## Entries
//!
//! An entry is a titled, positioned, parented unit of data. Entries are flat records:
//! the tree lives in the `parent` reference plus the integer `position` among siblings,
//! and the nested view is rebuilt on demand by [`crate::preprocess`].
//!
//! ```text
//! Entry { id, title, value, parent: Option<EntryId>, position, created_at, source }
//! ```
//!
//! `parent` and `position` are owned by [`crate::store::EntryStore`]: they can be
//! requested before insertion (`with_parent`) but only the store mutates them, so the
//! no-cycle and dense-position invariants are enforced in one place.
//!
//! ## Identity
//!
//! Two entries are the same entry only if they share an [`EntryId`], a random UUID
//! stamped at construction. Equality and hashing ignore `title`, `position` and
//! `parent`, so renaming or moving an entry never corrupts set membership. Clones keep
//! their id and therefore their identity.
//!
//! ## Sources
//!
//! | Source | Value | Editable value |
//! |--------|-------|----------------|
//! | `User` | whatever the user typed | yes |
//! | `Node` | always a mapping, filled by child entries | no |
//! | `Attribute` | extracted once at construction | no |

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use uuid::Uuid;

use crate::error::{AssemblerError, Result};
use crate::host::{AttributeHandle, NodeHandle};

/// Stable per-instance identity of an [`Entry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntryId(Uuid);

impl EntryId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EntryId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Short form is enough to tell entries apart in messages.
        write!(f, "{}", &self.0.to_string()[..8])
    }
}

/// A bare reference to another entry used as a value. Encodes as the entry's title.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryRef {
    pub id: EntryId,
    pub title: String,
}

impl From<&Entry> for EntryRef {
    fn from(entry: &Entry) -> Self {
        Self {
            id: entry.id,
            title: entry.title.clone(),
        }
    }
}

/// Plain, host-independent document data.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Sequence(Vec<Value>),
    Mapping(Mapping),
    Entry(EntryRef),
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Boolean,
            Value::Integer(_) | Value::Float(_) => ValueKind::Number,
            Value::String(_) => ValueKind::String,
            Value::Sequence(_) => ValueKind::Array,
            Value::Mapping(_) => ValueKind::Object,
            Value::Entry(_) => ValueKind::Reference,
        }
    }

    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            Value::Mapping(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[Value]> {
        match self {
            Value::Sequence(s) => Some(s),
            _ => None,
        }
    }

    /// The empty value a user gets when picking a kind without typing anything.
    pub fn empty_of(kind: ValueKind) -> Option<Value> {
        match kind {
            ValueKind::String => Some(Value::String(String::new())),
            ValueKind::Number => Some(Value::Float(0.0)),
            ValueKind::Object => Some(Value::Mapping(Mapping::new())),
            ValueKind::Array => Some(Value::Sequence(Vec::new())),
            ValueKind::Boolean => Some(Value::Bool(false)),
            ValueKind::Null => Some(Value::Null),
            ValueKind::Reference | ValueKind::Host => None,
        }
    }

    /// Parse user input as a value of the given kind.
    ///
    /// Numbers are always read as floating point. Objects and arrays start empty and
    /// ignore the input; their content comes from child entries.
    pub fn parse_as(kind: ValueKind, input: &str) -> Result<Value> {
        match kind {
            ValueKind::String => Ok(Value::String(input.to_string())),
            ValueKind::Number => input
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite())
                .map(Value::Float)
                .ok_or_else(|| AssemblerError::InvalidValue(format!("'{}' is not a number", input))),
            ValueKind::Boolean => match input.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" | "on" => Ok(Value::Bool(true)),
                "false" | "0" | "no" | "off" | "" => Ok(Value::Bool(false)),
                other => Err(AssemblerError::InvalidValue(format!(
                    "'{}' is not a boolean",
                    other
                ))),
            },
            ValueKind::Object | ValueKind::Array | ValueKind::Null => {
                Ok(Value::empty_of(kind).unwrap_or_default())
            }
            ValueKind::Reference | ValueKind::Host => Err(AssemblerError::InvalidValue(format!(
                "{} values cannot be typed in",
                kind
            ))),
        }
    }

    /// Convert to a `serde_json::Value`. Entry references become their title.
    pub fn to_json(&self) -> Result<serde_json::Value> {
        Ok(match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Integer(i) => serde_json::Value::from(*i),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .ok_or_else(|| AssemblerError::Serialization {
                    path: "$".to_string(),
                    message: format!("{} has no JSON representation", f),
                })?,
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Sequence(items) => serde_json::Value::Array(
                items.iter().map(Value::to_json).collect::<Result<_>>()?,
            ),
            Value::Mapping(m) => {
                let mut map = serde_json::Map::with_capacity(m.len());
                for (k, v) in m.iter() {
                    map.insert(k.to_string(), v.to_json()?);
                }
                serde_json::Value::Object(map)
            }
            Value::Entry(r) => serde_json::Value::String(r.title.clone()),
        })
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Integer(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Sequence(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => {
                Value::Mapping(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Mapping> for Value {
    fn from(m: Mapping) -> Self {
        Value::Mapping(m)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Sequence(items)
    }
}

/// Insertion-ordered key/value pairs.
///
/// Keys are not required to be unique: sibling entries may share a title and the
/// assembled document keeps each of them, in order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Mapping {
    pairs: Vec<(String, Value)>,
}

impl Mapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            pairs: Vec::with_capacity(capacity),
        }
    }

    /// Append a pair, keeping any earlier pair with the same key.
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.pairs.push((key.into(), value.into()));
    }

    /// Set `key`, replacing the first existing pair in place or appending.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        let value = value.into();
        match self.pairs.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = value,
            None => self.pairs.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.pairs.iter().map(|(k, _)| k.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.pairs.iter().map(|(_, v)| v)
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Mapping {
    fn from_iter<T: IntoIterator<Item = (K, Value)>>(iter: T) -> Self {
        Self {
            pairs: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

impl IntoIterator for Mapping {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.pairs.into_iter()
    }
}

/// Kind of value an entry holds, as offered to a user editing an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    String,
    Number,
    Object,
    Array,
    Boolean,
    Null,
    Reference,
    /// Bound to a scene node or attribute; not user-editable.
    Host,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::String => "string",
            ValueKind::Number => "number",
            ValueKind::Object => "object",
            ValueKind::Array => "array",
            ValueKind::Boolean => "boolean",
            ValueKind::Null => "null",
            ValueKind::Reference => "reference",
            ValueKind::Host => "host",
        };
        f.write_str(name)
    }
}

impl std::str::FromStr for ValueKind {
    type Err = AssemblerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "string" => Ok(ValueKind::String),
            "number" => Ok(ValueKind::Number),
            "object" => Ok(ValueKind::Object),
            "array" => Ok(ValueKind::Array),
            "boolean" | "bool" => Ok(ValueKind::Boolean),
            "null" => Ok(ValueKind::Null),
            other => Err(AssemblerError::InvalidValue(format!(
                "unknown value kind '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeBinding {
    pub node: NodeHandle,
    pub uuid: String,
}

/// Host attribute an entry was extracted from, with the flags the explorer filters on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeBinding {
    pub node: NodeHandle,
    pub attribute: AttributeHandle,
    /// `node.longName`
    pub path: String,
    pub keyable: bool,
    pub connected: bool,
    pub hidden: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntrySource {
    User,
    Node(NodeBinding),
    Attribute(AttributeBinding),
}

#[derive(Debug, Clone)]
pub struct Entry {
    id: EntryId,
    title: String,
    value: Value,
    parent: Option<EntryId>,
    position: usize,
    created_at: DateTime<Utc>,
    source: EntrySource,
}

impl Entry {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: EntryId::new(),
            title: title.into(),
            value: Value::Null,
            parent: None,
            position: 0,
            created_at: Utc::now(),
            source: EntrySource::User,
        }
    }

    pub(crate) fn bound(title: String, value: Value, source: EntrySource) -> Self {
        Self {
            value,
            source,
            ..Self::new(title)
        }
    }

    /// A user entry holding `value`. Host-bound entries only get their value from the
    /// host, and after that only [`Entry::set_value`] can change a value.
    pub fn user(title: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            value: value.into(),
            ..Self::new(title)
        }
    }

    /// Request a parent before the entry is added to a store.
    pub fn with_parent(mut self, parent: EntryId) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn id(&self) -> EntryId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn parent(&self) -> Option<EntryId> {
        self.parent
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn source(&self) -> &EntrySource {
        &self.source
    }

    pub fn is_host_bound(&self) -> bool {
        !matches!(self.source, EntrySource::User)
    }

    pub fn attribute_binding(&self) -> Option<&AttributeBinding> {
        match &self.source {
            EntrySource::Attribute(binding) => Some(binding),
            _ => None,
        }
    }

    pub fn node_binding(&self) -> Option<&NodeBinding> {
        match &self.source {
            EntrySource::Node(binding) => Some(binding),
            _ => None,
        }
    }

    pub fn value_kind(&self) -> ValueKind {
        if self.is_host_bound() {
            ValueKind::Host
        } else {
            self.value.kind()
        }
    }

    pub fn set_title(&mut self, title: impl Into<String>) -> Result<()> {
        let title = title.into();
        if title.is_empty() {
            return Err(AssemblerError::InvalidTitle);
        }
        self.title = title;
        Ok(())
    }

    pub fn set_value(&mut self, value: impl Into<Value>) -> Result<()> {
        if self.is_host_bound() {
            return Err(AssemblerError::ImmutableValue(self.title.clone()));
        }
        self.value = value.into();
        Ok(())
    }

    pub(crate) fn set_parent(&mut self, parent: Option<EntryId>) {
        self.parent = parent;
    }

    pub(crate) fn set_position(&mut self, position: usize) {
        self.position = position;
    }
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Entry {}

impl Hash for Entry {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
