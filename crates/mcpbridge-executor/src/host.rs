//! The seam between the executor and a live editor.

use serde_json::Value;

use mcpbridge_core::protocol::envelope::Params;
use mcpbridge_core::protocol::value::Variant;
use mcpbridge_core::Result;

use crate::scene::NodeInfo;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectInfo {
    pub name: String,
    pub version: String,
    pub path: String,
}

/// Effects the executor can perform against the editor.
///
/// Implementations report absent nodes/files/scenes as `BridgeError::NotFound`
/// and effect failures as `BridgeError::HostExecution`. Node paths are
/// relative to the edited scene and start with its root name
/// (`Root/Player`).
pub trait EditorHost: Send + Sync {
    fn project_info(&self) -> Result<ProjectInfo>;

    fn read_file(&self, path: &str) -> Result<String>;

    /// Returns the number of bytes written.
    fn write_file(&self, path: &str, content: &str) -> Result<usize>;

    /// Node tree of a scene, walked at most `max_depth` levels below the root.
    fn scene_nodes(&self, scene_path: &str, max_depth: usize) -> Result<NodeInfo>;

    /// `parent_path` defaults to the scene root. Returns the new node's path.
    fn add_node(&self, parent_path: Option<&str>, node_type: &str, node_name: &str) -> Result<String>;

    fn remove_node(&self, node_path: &str) -> Result<()>;

    fn node_property(&self, node_path: &str, property: &str) -> Result<Variant>;

    /// Decodes `raw` against the shape of the property's current value
    /// (`Shape::Other` when unset) and stores it, as one step. Returns what
    /// the node now holds.
    fn set_node_property(&self, node_path: &str, property: &str, raw: Value) -> Result<Variant>;

    /// Paths of files with extension `file_type` under `search_path`, sorted.
    fn find_files(&self, file_type: &str, search_path: &str) -> Result<Vec<String>>;

    fn run_tool_method(&self, method: &str, params: &Params) -> Result<Value>;
}
