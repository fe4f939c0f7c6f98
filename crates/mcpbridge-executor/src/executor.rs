//! Request envelope -> editor effect -> response envelope.

use std::sync::Arc;

use serde_json::{json, Value};

use mcpbridge_core::protocol::command::{self, CommandTable};
use mcpbridge_core::protocol::envelope::{parse_request, Params, Request, Response};
use mcpbridge_core::protocol::value::encode;
use mcpbridge_core::{BridgeError, Result};

use crate::host::EditorHost;

pub const DEFAULT_MAX_TREE_DEPTH: usize = 64;

/// Runs commands against an `EditorHost`.
///
/// Validation uses the same dispatch table as the bridge, so a request that
/// reaches the executor directly gets the same error envelopes.
pub struct Executor {
    host: Arc<dyn EditorHost>,
    table: CommandTable,
    max_tree_depth: usize,
}

/// Success payload: the command's fields plus a human-readable `message`.
fn done(v: Value, message: String) -> Params {
    let mut data = match v {
        Value::Object(m) => m,
        _ => Params::new(),
    };
    data.insert("message".into(), Value::String(message));
    data
}

impl Executor {
    pub fn new(host: Arc<dyn EditorHost>) -> Self {
        Self {
            host,
            table: CommandTable::builtin(),
            max_tree_depth: DEFAULT_MAX_TREE_DEPTH,
        }
    }

    pub fn with_max_tree_depth(mut self, depth: usize) -> Self {
        self.max_tree_depth = depth;
        self
    }

    /// Handle one text frame; always yields exactly one response frame.
    pub fn handle_text(&self, raw: &str) -> String {
        match parse_request(raw) {
            Ok(req) => self.execute(&req).to_text(),
            Err(rejected) => {
                tracing::warn!(error = %rejected.error, "rejected request frame");
                rejected.into_response().to_text()
            }
        }
    }

    /// Success payloads always echo `command`.
    pub fn execute(&self, req: &Request) -> Response {
        let res = self
            .table
            .validate(req)
            .and_then(|spec| self.run(spec.name, req))
            .map(|mut data| {
                data.insert("command".into(), Value::String(req.command.clone()));
                data
            });

        match &res {
            Ok(_) => tracing::debug!(id = ?req.id, command = %req.command, "command ok"),
            Err(e) => tracing::debug!(id = ?req.id, command = %req.command, error = %e, "command failed"),
        }
        Response::from_result(req.id.clone(), res)
    }

    fn run(&self, name: &str, req: &Request) -> Result<Params> {
        let host = self.host.as_ref();
        match name {
            command::GET_PROJECT_INFO => {
                let info = host.project_info()?;
                let data = json!({
                    "project_name": info.name,
                    "version": info.version,
                    "project_path": info.path,
                });
                Ok(done(data, "Project info retrieved successfully".into()))
            }
            command::GET_FILE_CONTENT => {
                let path = req.require_str("file_path")?;
                let content = host.read_file(path)?;
                let data = json!({ "file_path": path, "content": content });
                Ok(done(data, format!("File content retrieved for: {path}")))
            }
            command::SET_FILE_CONTENT => {
                let path = req.require_str("file_path")?;
                let content = req.require_str("content")?;
                let written = host.write_file(path, content)?;
                let data = json!({ "file_path": path, "bytes_written": written });
                Ok(done(data, format!("File content set successfully for: {path}")))
            }
            command::GET_SCENE_NODES => {
                let scene_path = req.require_str("scene_path")?;
                let tree = host.scene_nodes(scene_path, self.max_tree_depth)?;
                let nodes = serde_json::to_value(&tree)
                    .map_err(|e| BridgeError::Internal(format!("node tree encode failed: {e}")))?;
                let data = json!({ "scene_path": scene_path, "nodes": nodes });
                Ok(done(data, format!("Scene nodes retrieved for: {scene_path}")))
            }
            command::ADD_NODE => {
                let node_type = req.require_str("node_type")?;
                let node_name = req.require_str("node_name")?;
                let parent_path = req.opt_str("parent_path")?;
                let node_path = host.add_node(parent_path, node_type, node_name)?;
                let data = json!({
                    "node_path": node_path,
                    "node_type": node_type,
                    "node_name": node_name,
                });
                Ok(done(data, format!("Node {node_name} added successfully")))
            }
            command::REMOVE_NODE => {
                let node_path = req.require_str("node_path")?;
                host.remove_node(node_path)?;
                let data = json!({ "node_path": node_path });
                Ok(done(data, format!("Node {node_path} removed successfully")))
            }
            command::GET_NODE_PROPERTY => {
                let node_path = req.require_str("node_path")?;
                let property = req.require_str("property_name")?;
                let value = host.node_property(node_path, property)?;
                let data = json!({
                    "node_path": node_path,
                    "property_name": property,
                    "property_value": encode(&value),
                });
                Ok(done(data, format!("Property {property} retrieved for node {node_path}")))
            }
            command::SET_NODE_PROPERTY => {
                let node_path = req.require_str("node_path")?;
                let property = req.require_str("property_name")?;
                let raw = req.require("property_value")?.clone();
                let stored = host.set_node_property(node_path, property, raw)?;
                let data = json!({
                    "node_path": node_path,
                    "property_name": property,
                    "property_value": encode(&stored),
                });
                Ok(done(data, format!("Property {property} set successfully for node {node_path}")))
            }
            command::FIND_ALL_FILES_BY_TYPE => {
                let file_type = req.require_str("file_type")?;
                let search_path = req.opt_str("search_path")?.unwrap_or("res://");
                let files = host.find_files(file_type, search_path)?;
                let data = json!({
                    "file_type": file_type,
                    "search_path": search_path,
                    "files": files,
                });
                Ok(done(data, format!("Files of type {file_type} found in {search_path}")))
            }
            command::RUN_TOOL_METHOD => {
                let method = req.require_str("method_name")?;
                let params = match req.param("method_params") {
                    None => Params::new(),
                    Some(Value::Object(m)) => m.clone(),
                    Some(_) => return Err(BridgeError::invalid_parameter("method_params", "an object")),
                };
                let result = host.run_tool_method(method, &params)?;
                let data = json!({ "method_name": method, "result": result });
                Ok(done(data, format!("Tool method {method} executed successfully")))
            }
            other => Err(BridgeError::UnknownCommand(other.to_string())),
        }
    }
}
