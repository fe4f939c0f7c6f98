//! Dispatch table contract tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use serde_json::json;

use mcpbridge_core::protocol::command::{CommandSpec, CommandTable, BUILTIN_COMMANDS};
use mcpbridge_core::protocol::envelope::parse_request;
use mcpbridge_core::BridgeError;

fn req(raw: serde_json::Value) -> mcpbridge_core::protocol::envelope::Request {
    parse_request(&raw.to_string()).unwrap()
}

#[test]
fn builtin_table_has_every_command() {
    let table = CommandTable::builtin();
    assert_eq!(table.len(), BUILTIN_COMMANDS.len());
    assert_eq!(table.len(), 10);
    assert!(table.lookup("GetNodeProperty").is_ok());
}

#[test]
fn lookup_is_exact_and_case_sensitive() {
    let table = CommandTable::builtin();
    assert_eq!(
        table.lookup("getnodeproperty").unwrap_err(),
        BridgeError::UnknownCommand("getnodeproperty".into())
    );
    assert!(table.lookup("GetNode").is_err());
    assert!(table.lookup("GetNodePropertyX").is_err());
}

#[test]
fn unknown_command_message_names_it() {
    let table = CommandTable::builtin();
    let err = table.validate(&req(json!({"id": "x", "command": "InvalidCommand"}))).unwrap_err();
    assert_eq!(err.to_string(), "Unknown command: InvalidCommand");
}

#[test]
fn missing_parameter_names_the_key() {
    let table = CommandTable::builtin();
    let err = table
        .validate(&req(json!({
            "id": "s1",
            "command": "SetNodeProperty",
            "params": {"node_path": "Root/Player", "property_value": 1}
        })))
        .unwrap_err();
    assert_eq!(err, BridgeError::MissingParameter("property_name".into()));
    assert!(err.to_string().ends_with("property_name"));
}

#[test]
fn null_parameter_counts_as_missing() {
    let table = CommandTable::builtin();
    let err = table
        .validate(&req(json!({"id": "g", "command": "GetFileContent", "params": {"file_path": null}})))
        .unwrap_err();
    assert_eq!(err, BridgeError::MissingParameter("file_path".into()));
}

#[test]
fn optional_parameters_are_not_required() {
    let table = CommandTable::builtin();
    let spec = table
        .validate(&req(json!({
            "id": "a",
            "command": "AddNode",
            "params": {"node_type": "Sprite2D", "node_name": "PlayerSprite"}
        })))
        .unwrap();
    assert!(spec.mutates_host);
    assert_eq!(spec.optional, &["parent_path"]);
}

#[test]
fn register_refuses_duplicates() {
    let mut table = CommandTable::builtin();
    let dup = CommandSpec {
        name: "GetProjectInfo",
        required: &[],
        optional: &[],
        result_fields: &[],
        mutates_host: false,
    };
    assert!(table.register(dup).is_err());

    let fresh = CommandSpec {
        name: "ReloadScene",
        required: &["scene_path"],
        optional: &[],
        result_fields: &["scene_path"],
        mutates_host: true,
    };
    table.register(fresh).unwrap();
    assert!(table.lookup("ReloadScene").is_ok());
}

#[test]
fn wrongly_typed_parameter_is_not_a_json_error() {
    let mut params = serde_json::Map::new();
    params.insert("file_path".into(), json!(42));
    let r = mcpbridge_core::protocol::envelope::Request::new("w1", "GetFileContent", params);

    // Present, so validation passes; the typed accessor rejects it.
    assert!(CommandTable::builtin().validate(&r).is_ok());
    let err = r.require_str("file_path").unwrap_err();
    assert_eq!(err, BridgeError::invalid_parameter("file_path", "a string"));
    assert_eq!(err.code().as_str(), "INVALID_PARAMETER");
    assert_eq!(err.to_string(), "Invalid parameter 'file_path': expected a string");
}
