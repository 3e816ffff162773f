//! # Value Extraction
//!
//! Converts one host attribute into a plain [`Value`], dispatching on the attribute's
//! [`AttributeKind`]. The dispatch is ordered and the first match wins, because the
//! host's own classification is not mutually exclusive:
//!
//! 1. Compound kind, or the plug-level compound flag: a mapping of each child's short
//!    name to its extracted value, in host-declared child order.
//! 2. Unit kinds (angle, distance, time): the value in internal units.
//! 3. Numeric kinds: boolean, integer family (widened to `i64`), float family.
//! 4. Enum: the integer selector.
//! 5. Typed data: numeric payloads reuse step 3; strings, arrays, 4x4 matrices
//!    (row-major), matrix arrays, and meshes (the name of a newly created node).
//! 6. Generic, component lists, lattices and anything unrecognised fail with
//!    [`AssemblerError::UnsupportedAttributeKind`].
//!
//! Host accessor failures surface as [`AssemblerError::ExtractionFailure`].
//!
//! Extraction holds no state between calls. Mesh payloads are the one non-idempotent
//! case: each extraction may materialise another host node.

use crate::error::{AssemblerError, Result};
use crate::host::{AttributeHandle, AttributeKind, DataKind, HostError, Matrix4, NumericKind, SceneHost};
use crate::model::{Mapping, Value};

/// Extract the current value of `attr`.
pub fn extract<H: SceneHost + ?Sized>(host: &H, attr: AttributeHandle) -> Result<Value> {
    let kind = host.attribute_kind(attr).map_err(|e| failure(host, attr, e))?;
    let is_compound = host.is_compound(attr).map_err(|e| failure(host, attr, e))?;
    tracing::debug!(%attr, %kind, is_compound, "extracting attribute");

    if is_compound || kind == AttributeKind::Compound {
        return extract_compound(host, attr);
    }

    let read = |result: std::result::Result<Value, HostError>| result.map_err(|e| failure(host, attr, e));

    match &kind {
        AttributeKind::Compound => extract_compound(host, attr),
        AttributeKind::Unit(unit) => read(host.read_unit(attr, *unit).map(Value::Float)),
        AttributeKind::Numeric(numeric) => read(read_numeric(host, attr, *numeric)),
        AttributeKind::Enum => read(host.read_enum(attr).map(Value::Integer)),
        AttributeKind::Typed(data) => extract_typed(host, attr, data, &kind),
        AttributeKind::Generic | AttributeKind::Unknown(_) => Err(unsupported(host, attr, &kind)),
    }
}

fn extract_compound<H: SceneHost + ?Sized>(host: &H, attr: AttributeHandle) -> Result<Value> {
    let children = host
        .compound_children(attr)
        .map_err(|e| failure(host, attr, e))?;
    let mut mapping = Mapping::with_capacity(children.len());
    for child in children {
        let name = host
            .attribute_short_name(child)
            .map_err(|e| failure(host, child, e))?;
        mapping.insert(name, extract(host, child)?);
    }
    Ok(Value::Mapping(mapping))
}

fn read_numeric<H: SceneHost + ?Sized>(
    host: &H,
    attr: AttributeHandle,
    numeric: NumericKind,
) -> std::result::Result<Value, HostError> {
    match numeric {
        NumericKind::Boolean => host.read_bool(attr).map(Value::Bool),
        NumericKind::Byte
        | NumericKind::Char
        | NumericKind::Short
        | NumericKind::Long
        | NumericKind::Int
        | NumericKind::Int64 => host.read_integer(attr).map(Value::Integer),
        NumericKind::Float | NumericKind::Double => host.read_float(attr).map(Value::Float),
    }
}

fn extract_typed<H: SceneHost + ?Sized>(
    host: &H,
    attr: AttributeHandle,
    data: &DataKind,
    kind: &AttributeKind,
) -> Result<Value> {
    let value = match data {
        DataKind::Numeric(numeric) => read_numeric(host, attr, *numeric),
        DataKind::String => host.read_string(attr).map(Value::String),
        DataKind::StringArray => host
            .read_string_array(attr)
            .map(|items| Value::Sequence(items.into_iter().map(Value::String).collect())),
        DataKind::DoubleArray | DataKind::FloatArray => host
            .read_float_array(attr)
            .map(|items| Value::Sequence(items.into_iter().map(Value::Float).collect())),
        DataKind::IntArray => host
            .read_int_array(attr)
            .map(|items| Value::Sequence(items.into_iter().map(Value::Integer).collect())),
        DataKind::PointArray => host
            .read_point_array(attr)
            .map(|items| Value::Sequence(items.iter().map(|p| floats(p)).collect())),
        DataKind::VectorArray => host
            .read_vector_array(attr)
            .map(|items| Value::Sequence(items.iter().map(|v| floats(v)).collect())),
        DataKind::Matrix => host.read_matrix(attr).map(|m| matrix(&m)),
        DataKind::MatrixArray => host
            .read_matrix_array(attr)
            .map(|items| Value::Sequence(items.iter().map(matrix).collect())),
        DataKind::Mesh => host
            .create_mesh(attr)
            .and_then(|node| host.node_name(node))
            .map(Value::String),
        DataKind::ComponentList | DataKind::Lattice | DataKind::Other(_) => {
            return Err(unsupported(host, attr, kind));
        }
    };
    value.map_err(|e| failure(host, attr, e))
}

fn floats(components: &[f64]) -> Value {
    Value::Sequence(components.iter().copied().map(Value::Float).collect())
}

fn matrix(m: &Matrix4) -> Value {
    Value::Sequence(m.iter().map(|row| floats(row)).collect())
}

/// Human-readable label for diagnostics; falls back to the handle if the host cannot
/// name the attribute.
fn label<H: SceneHost + ?Sized>(host: &H, attr: AttributeHandle) -> String {
    host.attribute_path(attr)
        .or_else(|_| host.attribute_short_name(attr))
        .unwrap_or_else(|_| attr.to_string())
}

fn failure<H: SceneHost + ?Sized>(host: &H, attr: AttributeHandle, source: HostError) -> AssemblerError {
    AssemblerError::ExtractionFailure {
        attribute: label(host, attr),
        source,
    }
}

fn unsupported<H: SceneHost + ?Sized>(host: &H, attr: AttributeHandle, kind: &AttributeKind) -> AssemblerError {
    AssemblerError::UnsupportedAttributeKind {
        attribute: label(host, attr),
        kind: kind.to_string(),
    }
}
