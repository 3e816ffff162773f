//! # Host Layer
//!
//! The assembler never touches a content-creation application directly. Everything it
//! needs from the live scene goes through the narrow [`SceneHost`] accessor contract,
//! implemented once per host runtime.
//!
//! ## Handles
//!
//! [`NodeHandle`] and [`AttributeHandle`] are opaque ids minted by the adapter. The core
//! copies them around and hands them back; it never interprets or mutates them.
//!
//! ## Kind Tags
//!
//! The adapter classifies each attribute once, into an [`AttributeKind`]. The tag has a
//! textual form used by scene files and diagnostics:
//!
//! | Tag | Text |
//! |-----|------|
//! | `Compound` | `compound` |
//! | `Unit(Angle)` | `unit.angle` |
//! | `Numeric(Double)` | `numeric.double` |
//! | `Enum` | `enum` |
//! | `Typed(Matrix)` | `typed.matrix` |
//! | `Typed(Numeric(Int))` | `typed.numeric.int` |
//! | `Generic` | `generic` |
//!
//! Any other text parses to `Unknown`, which extraction rejects.
//!
//! ## Implementations
//!
//! - [`memory::MemoryScene`]: in-memory scene, used by tests and the CLI.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub mod memory;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeHandle(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AttributeHandle(pub u64);

impl fmt::Display for NodeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

impl fmt::Display for AttributeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "attr#{}", self.0)
    }
}

/// Token returned by a callback registration, needed to deregister it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallbackToken(pub u64);

pub type SelectionCallback = Box<dyn FnMut()>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum HostError {
    #[error("Node not found: {0}")]
    NodeNotFound(NodeHandle),

    #[error("Attribute not found: {0}")]
    AttributeNotFound(AttributeHandle),

    #[error("Expected {expected} data, found {found}")]
    TypeMismatch { expected: String, found: String },

    #[error("Unknown callback: {0:?}")]
    UnknownCallback(CallbackToken),

    #[error("{0}")]
    Other(String),
}

pub type HostResult<T> = std::result::Result<T, HostError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitKind {
    Angle,
    Distance,
    Time,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumericKind {
    Boolean,
    Byte,
    Char,
    Short,
    Long,
    Int,
    Int64,
    Float,
    Double,
}

/// Payload kind of a typed-data attribute.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DataKind {
    Numeric(NumericKind),
    String,
    StringArray,
    DoubleArray,
    FloatArray,
    IntArray,
    PointArray,
    VectorArray,
    Matrix,
    MatrixArray,
    Mesh,
    ComponentList,
    Lattice,
    Other(String),
}

/// Dispatch tag for an attribute, produced once by the host adapter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AttributeKind {
    Compound,
    Unit(UnitKind),
    Numeric(NumericKind),
    Enum,
    Typed(DataKind),
    Generic,
    Unknown(String),
}

pub type Matrix4 = [[f64; 4]; 4];

/// Accessor contract between the assembler and a live scene.
///
/// All reads take `&self`. Implementations needing to record side effects (mesh
/// materialisation, callback bookkeeping) use interior mutability, as the host calls
/// happen on a single thread.
pub trait SceneHost {
    // --- Nodes ---

    fn node_name(&self, node: NodeHandle) -> HostResult<String>;

    /// Stable host-side identifier of a node.
    fn node_uuid(&self, node: NodeHandle) -> HostResult<String>;

    /// All attributes of a node, in host-declared order.
    fn node_attributes(&self, node: NodeHandle) -> HostResult<Vec<AttributeHandle>>;

    // --- Attribute metadata ---

    fn attribute_node(&self, attr: AttributeHandle) -> HostResult<NodeHandle>;

    fn attribute_short_name(&self, attr: AttributeHandle) -> HostResult<String>;

    /// Long attribute name, without the node (`translateX`).
    fn attribute_long_name(&self, attr: AttributeHandle) -> HostResult<String>;

    /// `node.longName`, the attribute as a user would type it.
    fn attribute_path(&self, attr: AttributeHandle) -> HostResult<String> {
        let node = self.attribute_node(attr)?;
        Ok(format!("{}.{}", self.node_name(node)?, self.attribute_long_name(attr)?))
    }

    fn attribute_kind(&self, attr: AttributeHandle) -> HostResult<AttributeKind>;

    /// Plug-level compound flag, which can be set even when the kind tag is not `Compound`.
    fn is_compound(&self, attr: AttributeHandle) -> HostResult<bool>;

    /// Child attributes of a compound, in host-declared order.
    fn compound_children(&self, attr: AttributeHandle) -> HostResult<Vec<AttributeHandle>>;

    fn is_keyable(&self, attr: AttributeHandle) -> HostResult<bool>;

    fn is_connected(&self, attr: AttributeHandle) -> HostResult<bool>;

    fn is_hidden(&self, attr: AttributeHandle) -> HostResult<bool>;

    // --- Attribute values ---

    fn read_bool(&self, attr: AttributeHandle) -> HostResult<bool>;

    fn read_integer(&self, attr: AttributeHandle) -> HostResult<i64>;

    fn read_float(&self, attr: AttributeHandle) -> HostResult<f64>;

    /// Unit value in the host's internal unit, without display conversion.
    fn read_unit(&self, attr: AttributeHandle, unit: UnitKind) -> HostResult<f64>;

    /// Enum selector, not its label.
    fn read_enum(&self, attr: AttributeHandle) -> HostResult<i64>;

    fn read_string(&self, attr: AttributeHandle) -> HostResult<String>;

    fn read_string_array(&self, attr: AttributeHandle) -> HostResult<Vec<String>>;

    /// Double and float array payloads.
    fn read_float_array(&self, attr: AttributeHandle) -> HostResult<Vec<f64>>;

    fn read_int_array(&self, attr: AttributeHandle) -> HostResult<Vec<i64>>;

    /// Homogeneous points as `[x, y, z, w]`.
    fn read_point_array(&self, attr: AttributeHandle) -> HostResult<Vec<[f64; 4]>>;

    fn read_vector_array(&self, attr: AttributeHandle) -> HostResult<Vec<[f64; 3]>>;

    /// Row-major 4x4 matrix.
    fn read_matrix(&self, attr: AttributeHandle) -> HostResult<Matrix4>;

    fn read_matrix_array(&self, attr: AttributeHandle) -> HostResult<Vec<Matrix4>>;

    /// Materialise the mesh held by a mesh payload as a new scene node.
    ///
    /// Not idempotent: every call may create another node.
    fn create_mesh(&self, attr: AttributeHandle) -> HostResult<NodeHandle>;

    // --- Selection ---

    fn active_selection(&self) -> HostResult<Vec<NodeHandle>>;

    fn register_selection_changed(&self, callback: SelectionCallback) -> HostResult<CallbackToken>;

    fn deregister_callback(&self, token: CallbackToken) -> HostResult<()>;
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            UnitKind::Angle => "angle",
            UnitKind::Distance => "distance",
            UnitKind::Time => "time",
        })
    }
}

impl FromStr for UnitKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "angle" => Ok(UnitKind::Angle),
            "distance" => Ok(UnitKind::Distance),
            "time" => Ok(UnitKind::Time),
            other => Err(format!("unknown unit kind '{}'", other)),
        }
    }
}

impl fmt::Display for NumericKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            NumericKind::Boolean => "boolean",
            NumericKind::Byte => "byte",
            NumericKind::Char => "char",
            NumericKind::Short => "short",
            NumericKind::Long => "long",
            NumericKind::Int => "int",
            NumericKind::Int64 => "int64",
            NumericKind::Float => "float",
            NumericKind::Double => "double",
        })
    }
}

impl FromStr for NumericKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "boolean" | "bool" => Ok(NumericKind::Boolean),
            "byte" => Ok(NumericKind::Byte),
            "char" => Ok(NumericKind::Char),
            "short" => Ok(NumericKind::Short),
            "long" => Ok(NumericKind::Long),
            "int" => Ok(NumericKind::Int),
            "int64" => Ok(NumericKind::Int64),
            "float" => Ok(NumericKind::Float),
            "double" => Ok(NumericKind::Double),
            other => Err(format!("unknown numeric kind '{}'", other)),
        }
    }
}

impl fmt::Display for DataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataKind::Numeric(n) => write!(f, "numeric.{}", n),
            DataKind::String => f.write_str("string"),
            DataKind::StringArray => f.write_str("string_array"),
            DataKind::DoubleArray => f.write_str("double_array"),
            DataKind::FloatArray => f.write_str("float_array"),
            DataKind::IntArray => f.write_str("int_array"),
            DataKind::PointArray => f.write_str("point_array"),
            DataKind::VectorArray => f.write_str("vector_array"),
            DataKind::Matrix => f.write_str("matrix"),
            DataKind::MatrixArray => f.write_str("matrix_array"),
            DataKind::Mesh => f.write_str("mesh"),
            DataKind::ComponentList => f.write_str("component_list"),
            DataKind::Lattice => f.write_str("lattice"),
            DataKind::Other(name) => f.write_str(name),
        }
    }
}

impl From<&str> for DataKind {
    fn from(s: &str) -> Self {
        if let Some(numeric) = s.strip_prefix("numeric.") {
            if let Ok(kind) = numeric.parse() {
                return DataKind::Numeric(kind);
            }
        }
        match s {
            "string" => DataKind::String,
            "string_array" => DataKind::StringArray,
            "double_array" => DataKind::DoubleArray,
            "float_array" => DataKind::FloatArray,
            "int_array" => DataKind::IntArray,
            "point_array" => DataKind::PointArray,
            "vector_array" => DataKind::VectorArray,
            "matrix" => DataKind::Matrix,
            "matrix_array" => DataKind::MatrixArray,
            "mesh" => DataKind::Mesh,
            "component_list" => DataKind::ComponentList,
            "lattice" => DataKind::Lattice,
            other => DataKind::Other(other.to_string()),
        }
    }
}

impl fmt::Display for AttributeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeKind::Compound => f.write_str("compound"),
            AttributeKind::Unit(u) => write!(f, "unit.{}", u),
            AttributeKind::Numeric(n) => write!(f, "numeric.{}", n),
            AttributeKind::Enum => f.write_str("enum"),
            AttributeKind::Typed(d) => write!(f, "typed.{}", d),
            AttributeKind::Generic => f.write_str("generic"),
            AttributeKind::Unknown(name) => f.write_str(name),
        }
    }
}

impl From<&str> for AttributeKind {
    fn from(s: &str) -> Self {
        let unknown = || AttributeKind::Unknown(s.to_string());
        match s.split_once('.') {
            None => match s {
                "compound" => AttributeKind::Compound,
                "enum" => AttributeKind::Enum,
                "generic" => AttributeKind::Generic,
                _ => unknown(),
            },
            Some(("unit", rest)) => rest.parse().map(AttributeKind::Unit).unwrap_or_else(|_| unknown()),
            Some(("numeric", rest)) => rest
                .parse()
                .map(AttributeKind::Numeric)
                .unwrap_or_else(|_| unknown()),
            Some(("typed", rest)) => AttributeKind::Typed(DataKind::from(rest)),
            Some(_) => unknown(),
        }
    }
}

impl From<String> for AttributeKind {
    fn from(s: String) -> Self {
        AttributeKind::from(s.as_str())
    }
}

impl Serialize for AttributeKind {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for AttributeKind {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Ok(AttributeKind::from(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_text_round_trips() {
        let kinds = [
            AttributeKind::Compound,
            AttributeKind::Unit(UnitKind::Time),
            AttributeKind::Numeric(NumericKind::Int64),
            AttributeKind::Enum,
            AttributeKind::Typed(DataKind::MatrixArray),
            AttributeKind::Typed(DataKind::Numeric(NumericKind::Float)),
            AttributeKind::Generic,
        ];
        for kind in kinds {
            assert_eq!(AttributeKind::from(kind.to_string().as_str()), kind);
        }
    }

    #[test]
    fn unrecognised_text_is_unknown() {
        assert_eq!(
            AttributeKind::from("numeric.quaternion"),
            AttributeKind::Unknown("numeric.quaternion".into())
        );
        assert_eq!(
            AttributeKind::from("message"),
            AttributeKind::Unknown("message".into())
        );
        assert_eq!(
            AttributeKind::from("typed.nurbs_curve"),
            AttributeKind::Typed(DataKind::Other("nurbs_curve".into()))
        );
    }

    #[test]
    fn kind_deserializes_from_json_string() {
        let kind: AttributeKind = serde_json::from_str("\"unit.angle\"").unwrap();
        assert_eq!(kind, AttributeKind::Unit(UnitKind::Angle));
    }
}
