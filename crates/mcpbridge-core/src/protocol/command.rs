//! Command dispatch table.
//!
//! Maps a command name to its contract: required/optional parameter keys,
//! the fields of its success payload, and whether it mutates host state.
//! Names match exactly and case-sensitively.

use std::collections::HashMap;

use crate::error::{BridgeError, Result};
use crate::protocol::envelope::Request;

/// Declared contract of one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub name: &'static str,
    /// Checked in order; the first absent key is reported.
    pub required: &'static [&'static str],
    pub optional: &'static [&'static str],
    pub result_fields: &'static [&'static str],
    /// Informational only, never enforced by the dispatcher.
    pub mutates_host: bool,
}

pub const GET_PROJECT_INFO: &str = "GetProjectInfo";
pub const GET_FILE_CONTENT: &str = "GetFileContent";
pub const SET_FILE_CONTENT: &str = "SetFileContent";
pub const GET_SCENE_NODES: &str = "GetSceneNodes";
pub const ADD_NODE: &str = "AddNode";
pub const REMOVE_NODE: &str = "RemoveNode";
pub const GET_NODE_PROPERTY: &str = "GetNodeProperty";
pub const SET_NODE_PROPERTY: &str = "SetNodeProperty";
pub const FIND_ALL_FILES_BY_TYPE: &str = "FindAllFilesByType";
pub const RUN_TOOL_METHOD: &str = "RunToolMethod";

/// The editor command vocabulary.
pub const BUILTIN_COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        name: GET_PROJECT_INFO,
        required: &[],
        optional: &[],
        result_fields: &["project_name", "version", "project_path"],
        mutates_host: false,
    },
    CommandSpec {
        name: GET_FILE_CONTENT,
        required: &["file_path"],
        optional: &[],
        result_fields: &["file_path", "content"],
        mutates_host: false,
    },
    CommandSpec {
        name: SET_FILE_CONTENT,
        required: &["file_path", "content"],
        optional: &[],
        result_fields: &["file_path", "bytes_written"],
        mutates_host: true,
    },
    CommandSpec {
        name: GET_SCENE_NODES,
        required: &["scene_path"],
        optional: &[],
        result_fields: &["scene_path", "nodes"],
        mutates_host: false,
    },
    CommandSpec {
        name: ADD_NODE,
        required: &["node_type", "node_name"],
        optional: &["parent_path"],
        result_fields: &["node_path"],
        mutates_host: true,
    },
    CommandSpec {
        name: REMOVE_NODE,
        required: &["node_path"],
        optional: &[],
        result_fields: &["node_path"],
        mutates_host: true,
    },
    CommandSpec {
        name: GET_NODE_PROPERTY,
        required: &["node_path", "property_name"],
        optional: &[],
        result_fields: &["property_value"],
        mutates_host: false,
    },
    CommandSpec {
        name: SET_NODE_PROPERTY,
        required: &["node_path", "property_name", "property_value"],
        optional: &[],
        result_fields: &["property_value"],
        mutates_host: true,
    },
    CommandSpec {
        name: FIND_ALL_FILES_BY_TYPE,
        required: &["file_type"],
        optional: &["search_path"],
        result_fields: &["files"],
        mutates_host: false,
    },
    CommandSpec {
        name: RUN_TOOL_METHOD,
        required: &["method_name"],
        optional: &["method_params"],
        result_fields: &["result"],
        mutates_host: true,
    },
];

/// Registry of command contracts.
#[derive(Debug, Clone, Default)]
pub struct CommandTable {
    specs: HashMap<&'static str, CommandSpec>,
}

impl CommandTable {
    pub fn new() -> Self {
        Self {
            specs: HashMap::new(),
        }
    }

    /// Table holding every built-in editor command.
    pub fn builtin() -> Self {
        let mut table = Self::new();
        for spec in BUILTIN_COMMANDS {
            table.specs.insert(spec.name, spec.clone());
        }
        table
    }

    /// Register a contract. A name can only be registered once.
    pub fn register(&mut self, spec: CommandSpec) -> Result<()> {
        if self.specs.contains_key(spec.name) {
            return Err(BridgeError::Internal(format!(
                "command already registered: {}",
                spec.name
            )));
        }
        self.specs.insert(spec.name, spec);
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Result<&CommandSpec> {
        self.specs
            .get(name)
            .ok_or_else(|| BridgeError::UnknownCommand(name.to_string()))
    }

    /// Lookup plus required-parameter check.
    pub fn validate(&self, req: &Request) -> Result<&CommandSpec> {
        let spec = self.lookup(&req.command)?;
        for key in spec.required {
            req.require(key)?;
        }
        Ok(spec)
    }

    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.specs.keys().copied().collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}
