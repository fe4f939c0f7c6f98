//! Arena-backed scene tree.
//!
//! Nodes live in a slot vector and refer to each other by index, so removal
//! and traversal never chase owning pointers. Paths are `/`-separated names
//! starting at the root (`Root/Player/Sprite`).

use std::collections::BTreeMap;

use serde::Serialize;

use mcpbridge_core::protocol::value::{
    Color, Quaternion, Transform2D, Transform3D, Variant, Vector2, Vector3,
};
use mcpbridge_core::{BridgeError, ResourceKind, Result};

/// Types that behave like GUI controls.
const CONTROL_TYPES: &[&str] = &[
    "Control",
    "Label",
    "Button",
    "Panel",
    "TextureRect",
    "ColorRect",
    "LineEdit",
    "Container",
    "HBoxContainer",
    "VBoxContainer",
];

#[derive(Debug, Clone)]
struct Node {
    name: String,
    type_name: String,
    parent: Option<usize>,
    children: Vec<usize>,
    properties: BTreeMap<String, Variant>,
}

/// Serialized view of a subtree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    pub path: String,
    pub children: Vec<NodeInfo>,
    /// Set when the walk stopped at the depth bound with children left.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub truncated: bool,
}

#[derive(Debug, Clone)]
pub struct SceneTree {
    slots: Vec<Option<Node>>,
    root: usize,
}

/// Initial properties of a freshly created node.
pub fn default_properties(type_name: &str) -> BTreeMap<String, Variant> {
    let mut props = BTreeMap::new();

    if CONTROL_TYPES.contains(&type_name) {
        props.insert("position".into(), Variant::Vector2(Vector2::default()));
        props.insert("size".into(), Variant::Vector2(Vector2 { x: 40.0, y: 40.0 }));
        props.insert("modulate".into(), Variant::Color(Color { r: 1.0, g: 1.0, b: 1.0, a: 1.0 }));
        props.insert("visible".into(), Variant::Bool(true));
    } else if type_name.ends_with("2D") {
        props.insert("position".into(), Variant::Vector2(Vector2::default()));
        props.insert("rotation".into(), Variant::Float(0.0));
        props.insert("scale".into(), Variant::Vector2(Vector2 { x: 1.0, y: 1.0 }));
        props.insert("modulate".into(), Variant::Color(Color { r: 1.0, g: 1.0, b: 1.0, a: 1.0 }));
        props.insert("transform".into(), Variant::Transform2D(Transform2D::default()));
        props.insert("visible".into(), Variant::Bool(true));
    } else if type_name.ends_with("3D") {
        props.insert("position".into(), Variant::Vector3(Vector3::default()));
        props.insert("rotation".into(), Variant::Vector3(Vector3::default()));
        props.insert("scale".into(), Variant::Vector3(Vector3 { x: 1.0, y: 1.0, z: 1.0 }));
        props.insert("quaternion".into(), Variant::Quaternion(Quaternion::default()));
        props.insert("transform".into(), Variant::Transform3D(Transform3D::default()));
        props.insert("visible".into(), Variant::Bool(true));
    }

    props
}

impl SceneTree {
    pub fn new(root_name: impl Into<String>, root_type: impl Into<String>) -> Self {
        let root_type = root_type.into();
        let root = Node {
            name: root_name.into(),
            properties: default_properties(&root_type),
            type_name: root_type,
            parent: None,
            children: Vec::new(),
        };
        Self {
            slots: vec![Some(root)],
            root: 0,
        }
    }

    pub fn root(&self) -> usize {
        self.root
    }

    fn node(&self, id: usize) -> Result<&Node> {
        self.slots
            .get(id)
            .and_then(Option::as_ref)
            .ok_or_else(|| BridgeError::Internal(format!("dangling node id {id}")))
    }

    fn node_mut(&mut self, id: usize) -> Result<&mut Node> {
        self.slots
            .get_mut(id)
            .and_then(Option::as_mut)
            .ok_or_else(|| BridgeError::Internal(format!("dangling node id {id}")))
    }

    pub fn root_name(&self) -> &str {
        self.slots
            .get(self.root)
            .and_then(Option::as_ref)
            .map(|n| n.name.as_str())
            .unwrap_or_default()
    }

    /// Resolve `Root/A/B` (a leading `/` is tolerated).
    pub fn resolve(&self, path: &str) -> Result<usize> {
        let not_found = || BridgeError::not_found(ResourceKind::Node, path);

        let mut segments = path.trim_start_matches('/').split('/').filter(|s| !s.is_empty());
        let first = segments.next().ok_or_else(not_found)?;
        if first != self.root_name() {
            return Err(not_found());
        }

        let mut current = self.root;
        for seg in segments {
            let node = self.node(current)?;
            current = node
                .children
                .iter()
                .copied()
                .find(|&c| self.node(c).map(|n| n.name == seg).unwrap_or(false))
                .ok_or_else(not_found)?;
        }
        Ok(current)
    }

    pub fn path_of(&self, id: usize) -> Result<String> {
        let mut names = Vec::new();
        let mut cursor = Some(id);
        while let Some(i) = cursor {
            let node = self.node(i)?;
            names.push(node.name.as_str());
            cursor = node.parent;
        }
        names.reverse();
        Ok(names.join("/"))
    }

    pub fn add_child(&mut self, parent: usize, name: &str, type_name: &str) -> Result<usize> {
        if name.is_empty() || name.contains('/') {
            return Err(BridgeError::HostExecution(format!("invalid node name: {name:?}")));
        }
        let siblings = self.node(parent)?.children.clone();
        for s in siblings {
            if self.node(s)?.name == name {
                return Err(BridgeError::HostExecution(format!(
                    "node already exists: {}/{name}",
                    self.path_of(parent)?
                )));
            }
        }

        let id = self.slots.len();
        self.slots.push(Some(Node {
            name: name.to_string(),
            type_name: type_name.to_string(),
            parent: Some(parent),
            children: Vec::new(),
            properties: default_properties(type_name),
        }));
        self.node_mut(parent)?.children.push(id);
        Ok(id)
    }

    /// Remove a node and its whole subtree. The root cannot be removed.
    pub fn remove(&mut self, id: usize) -> Result<()> {
        let parent = self
            .node(id)?
            .parent
            .ok_or_else(|| BridgeError::HostExecution("cannot remove the scene root".into()))?;
        self.node_mut(parent)?.children.retain(|&c| c != id);

        let mut stack = vec![id];
        while let Some(i) = stack.pop() {
            if let Some(node) = self.slots.get_mut(i).and_then(Option::take) {
                stack.extend(node.children);
            }
        }
        Ok(())
    }

    pub fn property(&self, id: usize, name: &str) -> Result<Option<&Variant>> {
        Ok(self.node(id)?.properties.get(name))
    }

    pub fn set_property(&mut self, id: usize, name: &str, value: Variant) -> Result<()> {
        self.node_mut(id)?.properties.insert(name.to_string(), value);
        Ok(())
    }

    pub fn node_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Nested view of the whole tree, at most `max_depth` levels below root.
    pub fn walk(&self, max_depth: usize) -> Result<NodeInfo> {
        let root_path = self.root_name().to_string();
        self.walk_from(self.root, root_path, 0, max_depth)
    }

    fn walk_from(&self, id: usize, path: String, depth: usize, max_depth: usize) -> Result<NodeInfo> {
        let node = self.node(id)?;
        let mut info = NodeInfo {
            name: node.name.clone(),
            type_name: node.type_name.clone(),
            path,
            children: Vec::new(),
            truncated: false,
        };

        if depth >= max_depth {
            info.truncated = !node.children.is_empty();
            return Ok(info);
        }

        for &child in &node.children {
            let child_path = format!("{}/{}", info.path, self.node(child)?.name);
            info.children.push(self.walk_from(child, child_path, depth + 1, max_depth)?);
        }
        Ok(info)
    }
}
