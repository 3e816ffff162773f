//! # Document Encoding
//!
//! Renders an assembled document as JSON text. Output is always valid JSON, but the
//! layout is not a plain pretty-print:
//!
//! - Members are separated by `", "` and keys by `": "`, in both compact and indented
//!   output. With indentation on, a separator is followed by the newline of the next
//!   member, so expanded lines end in `", "`.
//! - With indentation on, a container only expands across lines when it holds more
//!   than one value. A leaf counts 1, an empty container 0, and a non-empty nested
//!   container 1 plus its own count. `{"a": 1}` stays on one line while
//!   `{"node": {"a": 1}}` expands its outer level only.
//! - Indentation is `size` spaces per depth, before each member and before the closing
//!   bracket.
//!
//! Scalars use `serde_json`'s literal encoding: escaped strings, integers without a
//! fraction, floats with one. Entry references render as their title. A float with no
//! JSON form (NaN, infinity) fails with [`AssemblerError::Serialization`], naming the
//! key path of the value such as `pCube1.worldMatrix[0][3]`.

use crate::error::{AssemblerError, Result};
use crate::model::{Mapping, Value};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DocumentEncoder {
    indent: Option<usize>,
}

impl DocumentEncoder {
    pub fn compact() -> Self {
        Self { indent: None }
    }

    pub fn indented(size: usize) -> Self {
        Self { indent: Some(size) }
    }

    pub fn new(include_indentation: bool, indentation_size: usize) -> Self {
        if include_indentation {
            Self::indented(indentation_size)
        } else {
            Self::compact()
        }
    }

    /// Encode a document. An empty document encodes to an empty string.
    pub fn encode(&self, document: &Mapping) -> Result<String> {
        if document.is_empty() {
            return Ok(String::new());
        }
        let mut out = String::new();
        self.write_mapping(&mut out, document, 0, "")?;
        Ok(out)
    }

    /// Encode any value with the same rules, without the empty-document special case.
    pub fn encode_value(&self, value: &Value) -> Result<String> {
        let mut out = String::new();
        self.write_value(&mut out, value, 0, "")?;
        Ok(out)
    }

    fn write_value(&self, out: &mut String, value: &Value, depth: usize, path: &str) -> Result<()> {
        match value {
            Value::Mapping(m) => self.write_mapping(out, m, depth, path),
            Value::Sequence(items) => self.write_sequence(out, items, depth, path),
            leaf => write_leaf(out, leaf, path),
        }
    }

    fn write_mapping(&self, out: &mut String, mapping: &Mapping, depth: usize, path: &str) -> Result<()> {
        let size = self.size_for(value_count(mapping.values()));
        out.push('{');
        for (i, (key, value)) in mapping.iter().enumerate() {
            newline(out, size, depth + 1);
            out.push_str(&serde_json::to_string(key)?);
            out.push_str(": ");
            self.write_value(out, value, depth + 1, &key_path(path, key))?;
            if i + 1 < mapping.len() {
                out.push_str(", ");
            }
        }
        newline(out, size, depth);
        out.push('}');
        Ok(())
    }

    fn write_sequence(&self, out: &mut String, items: &[Value], depth: usize, path: &str) -> Result<()> {
        let size = self.size_for(value_count(items.iter()));
        out.push('[');
        for (i, item) in items.iter().enumerate() {
            newline(out, size, depth + 1);
            self.write_value(out, item, depth + 1, &format!("{}[{}]", path, i))?;
            if i + 1 < items.len() {
                out.push_str(", ");
            }
        }
        newline(out, size, depth);
        out.push(']');
        Ok(())
    }

    /// Indentation for a container with `count` values: none unless it holds several.
    fn size_for(&self, count: usize) -> usize {
        match self.indent {
            Some(size) if count > 1 => size,
            _ => 0,
        }
    }
}

fn newline(out: &mut String, size: usize, depth: usize) {
    if size > 0 {
        out.push('\n');
        out.extend(std::iter::repeat(' ').take(size * depth));
    }
}

/// Values a container holds for the expand decision. A leaf counts 1, an empty
/// container 0, and a non-empty container 1 for itself plus its own values, so only
/// the innermost single-leaf container stays on one line.
fn value_count<'a>(values: impl Iterator<Item = &'a Value>) -> usize {
    values
        .map(|v| match v {
            Value::Mapping(m) if m.is_empty() => 0,
            Value::Sequence(s) if s.is_empty() => 0,
            Value::Mapping(m) => 1 + value_count(m.values()),
            Value::Sequence(s) => 1 + value_count(s.iter()),
            _ => 1,
        })
        .sum()
}

fn key_path(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", parent, key)
    }
}

fn write_leaf(out: &mut String, value: &Value, path: &str) -> Result<()> {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Integer(i) => out.push_str(&i.to_string()),
        Value::Float(f) if !f.is_finite() => {
            return Err(AssemblerError::Serialization {
                path: if path.is_empty() { "$".to_string() } else { path.to_string() },
                message: format!("{} has no JSON representation", f),
            });
        }
        Value::Float(f) => out.push_str(&serde_json::to_string(f)?),
        Value::String(s) => out.push_str(&serde_json::to_string(s)?),
        Value::Entry(r) => out.push_str(&serde_json::to_string(&r.title)?),
        Value::Mapping(_) | Value::Sequence(_) => {
            return Err(AssemblerError::Serialization {
                path: path.to_string(),
                message: "container passed as a leaf".to_string(),
            });
        }
    }
    Ok(())
}
