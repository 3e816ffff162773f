use super::{
    AttributeHandle, AttributeKind, CallbackToken, HostError, HostResult, Matrix4, NodeHandle,
    SceneHost, SelectionCallback, UnitKind,
};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;
use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::path::Path;

/// Serializable description of a scene, as read from a scene file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SceneDescription {
    #[serde(default)]
    pub nodes: Vec<NodeSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeSpec {
    pub name: String,
    #[serde(default)]
    pub uuid: Option<String>,
    #[serde(default)]
    pub selected: bool,
    #[serde(default)]
    pub attributes: Vec<AttributeSpec>,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributeSpec {
    pub name: String,
    #[serde(default)]
    pub long_name: Option<String>,
    pub kind: AttributeKind,
    #[serde(default)]
    pub value: Json,
    #[serde(default = "default_true")]
    pub keyable: bool,
    #[serde(default)]
    pub connected: bool,
    #[serde(default)]
    pub hidden: bool,
    /// Plug-level compound flag, independent of `kind`.
    #[serde(default)]
    pub compound: bool,
    #[serde(default)]
    pub children: Vec<AttributeSpec>,
}

impl AttributeSpec {
    pub fn new(name: impl Into<String>, kind: impl Into<AttributeKind>, value: Json) -> Self {
        Self {
            name: name.into(),
            long_name: None,
            kind: kind.into(),
            value,
            keyable: true,
            connected: false,
            hidden: false,
            compound: false,
            children: Vec::new(),
        }
    }

    pub fn compound(name: impl Into<String>, children: Vec<AttributeSpec>) -> Self {
        Self {
            children,
            ..Self::new(name, AttributeKind::Compound, Json::Null)
        }
    }

    pub fn long_name(mut self, long_name: impl Into<String>) -> Self {
        self.long_name = Some(long_name.into());
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn non_keyable(mut self) -> Self {
        self.keyable = false;
        self
    }

    pub fn connected(mut self) -> Self {
        self.connected = true;
        self
    }

    pub fn compound_plug(mut self, children: Vec<AttributeSpec>) -> Self {
        self.compound = true;
        self.children = children;
        self
    }
}

struct MemNode {
    name: String,
    uuid: String,
    attributes: Vec<AttributeHandle>,
}

struct MemAttribute {
    node: NodeHandle,
    short_name: String,
    long_name: String,
    kind: AttributeKind,
    value: Json,
    keyable: bool,
    connected: bool,
    hidden: bool,
    compound: bool,
    children: Vec<AttributeHandle>,
}

/// In-memory scene host.
///
/// Uses `RefCell`/`Cell` for the state that host reads may change (materialised
/// meshes, callback registrations), since hosts are driven from a single thread.
#[derive(Default)]
pub struct MemoryScene {
    nodes: RefCell<Vec<MemNode>>,
    attributes: Vec<MemAttribute>,
    selection: Vec<NodeHandle>,
    callbacks: RefCell<Vec<(CallbackToken, SelectionCallback)>>,
    /// Tokens of the callbacks taken out for the notification in progress.
    notifying: RefCell<Vec<CallbackToken>>,
    /// Deregistered during the notification in progress, dropped once it ends.
    detached: RefCell<HashSet<CallbackToken>>,
    next_token: Cell<u64>,
    meshes_created: Cell<u64>,
    failing_reads: RefCell<HashSet<AttributeHandle>>,
}

impl MemoryScene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_description(description: SceneDescription) -> Self {
        let mut scene = Self::new();
        let mut selected = Vec::new();
        for node_spec in description.nodes {
            let node = match &node_spec.uuid {
                Some(uuid) => scene.add_node_with_uuid(&node_spec.name, uuid),
                None => scene.add_node(&node_spec.name),
            };
            for attr_spec in node_spec.attributes {
                scene.add_attribute(node, attr_spec);
            }
            if node_spec.selected {
                selected.push(node);
            }
        }
        scene.selection = selected;
        scene
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let description: SceneDescription = serde_json::from_str(text)?;
        Ok(Self::from_description(description))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn add_node(&mut self, name: &str) -> NodeHandle {
        let uuid = format!("{:08X}-MEM", self.nodes.borrow().len());
        self.add_node_with_uuid(name, &uuid)
    }

    pub fn add_node_with_uuid(&mut self, name: &str, uuid: &str) -> NodeHandle {
        let mut nodes = self.nodes.borrow_mut();
        nodes.push(MemNode {
            name: name.to_string(),
            uuid: uuid.to_string(),
            attributes: Vec::new(),
        });
        NodeHandle(nodes.len() as u64 - 1)
    }

    /// Register an attribute (and its children, recursively) on a node.
    pub fn add_attribute(&mut self, node: NodeHandle, spec: AttributeSpec) -> AttributeHandle {
        let handle = self.register_attribute(node, spec);
        if let Some(n) = self.nodes.borrow_mut().get_mut(node.0 as usize) {
            n.attributes.push(handle);
        }
        handle
    }

    fn register_attribute(&mut self, node: NodeHandle, spec: AttributeSpec) -> AttributeHandle {
        let children = spec
            .children
            .into_iter()
            .map(|child| self.register_attribute(node, child))
            .collect();
        self.attributes.push(MemAttribute {
            node,
            long_name: spec.long_name.unwrap_or_else(|| spec.name.clone()),
            short_name: spec.name,
            kind: spec.kind,
            value: spec.value,
            keyable: spec.keyable,
            connected: spec.connected,
            hidden: spec.hidden,
            compound: spec.compound,
            children,
        });
        AttributeHandle(self.attributes.len() as u64 - 1)
    }

    pub fn set_value(&mut self, attr: AttributeHandle, value: Json) -> HostResult<()> {
        let slot = self
            .attributes
            .get_mut(attr.0 as usize)
            .ok_or(HostError::AttributeNotFound(attr))?;
        slot.value = value;
        Ok(())
    }

    /// Replace the active selection and notify every registered callback.
    pub fn select(&mut self, nodes: &[NodeHandle]) {
        self.selection = nodes.to_vec();
        self.notify_selection_changed();
    }

    fn notify_selection_changed(&self) {
        // Callbacks may register or deregister callbacks, so run them outside the borrow.
        let mut running = std::mem::take(&mut *self.callbacks.borrow_mut());
        *self.notifying.borrow_mut() = running.iter().map(|(token, _)| *token).collect();
        for (token, callback) in running.iter_mut() {
            let detached = self.detached.borrow().contains(token);
            if !detached {
                callback();
            }
        }
        self.notifying.borrow_mut().clear();
        let detached = std::mem::take(&mut *self.detached.borrow_mut());
        running.retain(|(token, _)| !detached.contains(token));

        let mut callbacks = self.callbacks.borrow_mut();
        running.append(&mut callbacks);
        *callbacks = running;
    }

    /// Make every value read of `attr` fail, to exercise error handling.
    pub fn set_simulate_read_error(&self, attr: AttributeHandle, simulate: bool) {
        let mut failing = self.failing_reads.borrow_mut();
        if simulate {
            failing.insert(attr);
        } else {
            failing.remove(&attr);
        }
    }

    pub fn nodes(&self) -> Vec<NodeHandle> {
        (0..self.nodes.borrow().len() as u64).map(NodeHandle).collect()
    }

    pub fn find_node(&self, name: &str) -> Option<NodeHandle> {
        self.nodes
            .borrow()
            .iter()
            .position(|n| n.name == name)
            .map(|i| NodeHandle(i as u64))
    }

    /// Find an attribute of `node` by short or long name, including compound children.
    pub fn find_attribute(&self, node: NodeHandle, name: &str) -> Option<AttributeHandle> {
        self.attributes
            .iter()
            .position(|a| a.node == node && (a.short_name == name || a.long_name == name))
            .map(|i| AttributeHandle(i as u64))
    }

    pub fn meshes_created(&self) -> u64 {
        self.meshes_created.get()
    }

    pub fn callback_count(&self) -> usize {
        self.callbacks.borrow().len()
    }

    fn attr(&self, attr: AttributeHandle) -> HostResult<&MemAttribute> {
        self.attributes
            .get(attr.0 as usize)
            .ok_or(HostError::AttributeNotFound(attr))
    }

    fn value_of(&self, attr: AttributeHandle) -> HostResult<&Json> {
        if self.failing_reads.borrow().contains(&attr) {
            return Err(HostError::Other(format!("Simulated read failure on {}", attr)));
        }
        Ok(&self.attr(attr)?.value)
    }

    fn with_node<T>(&self, node: NodeHandle, f: impl FnOnce(&MemNode) -> T) -> HostResult<T> {
        self.nodes
            .borrow()
            .get(node.0 as usize)
            .map(f)
            .ok_or(HostError::NodeNotFound(node))
    }
}

fn json_type(value: &Json) -> &'static str {
    match value {
        Json::Null => "null",
        Json::Bool(_) => "boolean",
        Json::Number(_) => "number",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    }
}

fn mismatch(expected: &str, found: &Json) -> HostError {
    HostError::TypeMismatch {
        expected: expected.to_string(),
        found: json_type(found).to_string(),
    }
}

fn as_f64(value: &Json) -> HostResult<f64> {
    value.as_f64().ok_or_else(|| mismatch("float", value))
}

fn as_i64(value: &Json) -> HostResult<i64> {
    value.as_i64().ok_or_else(|| mismatch("integer", value))
}

fn as_array(value: &Json) -> HostResult<&Vec<Json>> {
    value.as_array().ok_or_else(|| mismatch("array", value))
}

fn as_fixed<const N: usize>(value: &Json) -> HostResult<[f64; N]> {
    let items = as_array(value)?;
    if items.len() != N {
        return Err(HostError::TypeMismatch {
            expected: format!("{} components", N),
            found: format!("{} components", items.len()),
        });
    }
    let mut out = [0.0; N];
    for (slot, item) in out.iter_mut().zip(items) {
        *slot = as_f64(item)?;
    }
    Ok(out)
}

fn as_point(value: &Json) -> HostResult<[f64; 4]> {
    match as_array(value)?.len() {
        3 => {
            let [x, y, z] = as_fixed::<3>(value)?;
            Ok([x, y, z, 1.0])
        }
        _ => as_fixed::<4>(value),
    }
}

fn as_matrix(value: &Json) -> HostResult<Matrix4> {
    let rows = as_array(value)?;
    if rows.len() == 16 {
        let flat = as_fixed::<16>(value)?;
        let mut m = [[0.0; 4]; 4];
        for (i, v) in flat.iter().enumerate() {
            m[i / 4][i % 4] = *v;
        }
        return Ok(m);
    }
    if rows.len() != 4 {
        return Err(mismatch("4x4 matrix", value));
    }
    let mut m = [[0.0; 4]; 4];
    for (row, item) in m.iter_mut().zip(rows) {
        *row = as_fixed::<4>(item)?;
    }
    Ok(m)
}

impl SceneHost for MemoryScene {
    fn node_name(&self, node: NodeHandle) -> HostResult<String> {
        self.with_node(node, |n| n.name.clone())
    }

    fn node_uuid(&self, node: NodeHandle) -> HostResult<String> {
        self.with_node(node, |n| n.uuid.clone())
    }

    fn node_attributes(&self, node: NodeHandle) -> HostResult<Vec<AttributeHandle>> {
        self.with_node(node, |n| n.attributes.clone())
    }

    fn attribute_node(&self, attr: AttributeHandle) -> HostResult<NodeHandle> {
        Ok(self.attr(attr)?.node)
    }

    fn attribute_short_name(&self, attr: AttributeHandle) -> HostResult<String> {
        Ok(self.attr(attr)?.short_name.clone())
    }

    fn attribute_long_name(&self, attr: AttributeHandle) -> HostResult<String> {
        Ok(self.attr(attr)?.long_name.clone())
    }

    fn attribute_kind(&self, attr: AttributeHandle) -> HostResult<AttributeKind> {
        Ok(self.attr(attr)?.kind.clone())
    }

    fn is_compound(&self, attr: AttributeHandle) -> HostResult<bool> {
        Ok(self.attr(attr)?.compound)
    }

    fn compound_children(&self, attr: AttributeHandle) -> HostResult<Vec<AttributeHandle>> {
        Ok(self.attr(attr)?.children.clone())
    }

    fn is_keyable(&self, attr: AttributeHandle) -> HostResult<bool> {
        Ok(self.attr(attr)?.keyable)
    }

    fn is_connected(&self, attr: AttributeHandle) -> HostResult<bool> {
        Ok(self.attr(attr)?.connected)
    }

    fn is_hidden(&self, attr: AttributeHandle) -> HostResult<bool> {
        Ok(self.attr(attr)?.hidden)
    }

    fn read_bool(&self, attr: AttributeHandle) -> HostResult<bool> {
        let value = self.value_of(attr)?;
        match value {
            Json::Bool(b) => Ok(*b),
            Json::Number(n) => Ok(n.as_f64().is_some_and(|v| v != 0.0)),
            other => Err(mismatch("boolean", other)),
        }
    }

    fn read_integer(&self, attr: AttributeHandle) -> HostResult<i64> {
        as_i64(self.value_of(attr)?)
    }

    fn read_float(&self, attr: AttributeHandle) -> HostResult<f64> {
        as_f64(self.value_of(attr)?)
    }

    fn read_unit(&self, attr: AttributeHandle, _unit: UnitKind) -> HostResult<f64> {
        // Scene files store unit values in internal units already.
        as_f64(self.value_of(attr)?)
    }

    fn read_enum(&self, attr: AttributeHandle) -> HostResult<i64> {
        as_i64(self.value_of(attr)?)
    }

    fn read_string(&self, attr: AttributeHandle) -> HostResult<String> {
        let value = self.value_of(attr)?;
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| mismatch("string", value))
    }

    fn read_string_array(&self, attr: AttributeHandle) -> HostResult<Vec<String>> {
        as_array(self.value_of(attr)?)?
            .iter()
            .map(|v| {
                v.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| mismatch("string", v))
            })
            .collect()
    }

    fn read_float_array(&self, attr: AttributeHandle) -> HostResult<Vec<f64>> {
        as_array(self.value_of(attr)?)?.iter().map(as_f64).collect()
    }

    fn read_int_array(&self, attr: AttributeHandle) -> HostResult<Vec<i64>> {
        as_array(self.value_of(attr)?)?.iter().map(as_i64).collect()
    }

    fn read_point_array(&self, attr: AttributeHandle) -> HostResult<Vec<[f64; 4]>> {
        as_array(self.value_of(attr)?)?.iter().map(as_point).collect()
    }

    fn read_vector_array(&self, attr: AttributeHandle) -> HostResult<Vec<[f64; 3]>> {
        as_array(self.value_of(attr)?)?
            .iter()
            .map(as_fixed::<3>)
            .collect()
    }

    fn read_matrix(&self, attr: AttributeHandle) -> HostResult<Matrix4> {
        as_matrix(self.value_of(attr)?)
    }

    fn read_matrix_array(&self, attr: AttributeHandle) -> HostResult<Vec<Matrix4>> {
        as_array(self.value_of(attr)?)?.iter().map(as_matrix).collect()
    }

    fn create_mesh(&self, attr: AttributeHandle) -> HostResult<NodeHandle> {
        let a = self.attr(attr)?;
        self.value_of(attr)?;
        let count = self.meshes_created.get() + 1;
        self.meshes_created.set(count);

        let mut nodes = self.nodes.borrow_mut();
        nodes.push(MemNode {
            name: format!("polySurface{}", count),
            uuid: format!("{:08X}-MESH", count),
            attributes: Vec::new(),
        });
        tracing::debug!(source = %a.short_name, count, "materialised mesh node");
        Ok(NodeHandle(nodes.len() as u64 - 1))
    }

    fn active_selection(&self) -> HostResult<Vec<NodeHandle>> {
        Ok(self.selection.clone())
    }

    fn register_selection_changed(&self, callback: SelectionCallback) -> HostResult<CallbackToken> {
        let token = CallbackToken(self.next_token.get());
        self.next_token.set(token.0 + 1);
        self.callbacks.borrow_mut().push((token, callback));
        Ok(token)
    }

    fn deregister_callback(&self, token: CallbackToken) -> HostResult<()> {
        let mut callbacks = self.callbacks.borrow_mut();
        let before = callbacks.len();
        callbacks.retain(|(t, _)| *t != token);
        if callbacks.len() < before {
            return Ok(());
        }
        drop(callbacks);

        if self.notifying.borrow().contains(&token) && self.detached.borrow_mut().insert(token) {
            return Ok(());
        }
        Err(HostError::UnknownCallback(token))
    }
}

// --- Test Fixtures ---

#[cfg(any(test, feature = "test_utils"))]
pub mod fixtures {
    use super::*;
    use serde_json::json;

    /// A cube with one attribute of most supported kinds, plus one that cannot be
    /// extracted, and a sphere with a single attribute.
    pub struct SceneFixture {
        pub scene: MemoryScene,
        pub cube: NodeHandle,
        pub sphere: NodeHandle,
    }

    impl Default for SceneFixture {
        fn default() -> Self {
            Self::new()
        }
    }

    impl SceneFixture {
        pub fn new() -> Self {
            let mut scene = MemoryScene::new();
            let cube = scene.add_node("pCube1");
            scene.add_attribute(
                cube,
                AttributeSpec::compound(
                    "t",
                    vec![
                        AttributeSpec::new("tx", "unit.distance", json!(3.5)).long_name("translateX"),
                        AttributeSpec::new("ty", "unit.distance", json!(1.0)).long_name("translateY"),
                        AttributeSpec::new("tz", "unit.distance", json!(0.0)).long_name("translateZ"),
                    ],
                )
                .long_name("translate"),
            );
            scene.add_attribute(
                cube,
                AttributeSpec::new("v", "numeric.boolean", json!(true)).long_name("visibility"),
            );
            scene.add_attribute(
                cube,
                AttributeSpec::new("rx", "unit.angle", json!(0.5)).long_name("rotateX"),
            );
            scene.add_attribute(
                cube,
                AttributeSpec::new("caching", "numeric.int", json!(1)).non_keyable(),
            );
            scene.add_attribute(
                cube,
                AttributeSpec::new("nodeState", "enum", json!(2)).hidden(),
            );
            scene.add_attribute(
                cube,
                AttributeSpec::new("creator", "typed.string", json!("artist")).connected(),
            );
            scene.add_attribute(
                cube,
                AttributeSpec::new("instObjGroups", "typed.component_list", json!(null)),
            );

            let sphere = scene.add_node("pSphere1");
            scene.add_attribute(
                sphere,
                AttributeSpec::new("radius", "numeric.double", json!(2.0)),
            );

            scene.select(&[cube, sphere]);
            Self {
                scene,
                cube,
                sphere,
            }
        }

        pub fn attr(&self, node: NodeHandle, name: &str) -> AttributeHandle {
            self.scene
                .find_attribute(node, name)
                .unwrap_or_else(|| panic!("fixture has no attribute {}", name))
        }
    }
}
