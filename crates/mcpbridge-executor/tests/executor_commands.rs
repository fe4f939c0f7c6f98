//! Command execution against the in-memory editor host.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::Arc;

use serde_json::{json, Value};

use mcpbridge_core::protocol::envelope::Params;
use mcpbridge_core::protocol::value::{Shape, Variant, Vector2};
use mcpbridge_executor::{EditorHost, Executor, SceneHost, SceneTree, ToolMethod};

fn executor() -> Executor {
    Executor::new(Arc::new(SceneHost::demo()))
}

fn call(exec: &Executor, req: Value) -> Value {
    serde_json::from_str(&exec.handle_text(&req.to_string())).unwrap()
}

#[test]
fn get_node_property_encodes_vector() {
    let resp = call(
        &executor(),
        json!({"id": "t1", "command": "GetNodeProperty",
               "params": {"node_path": "Root/Player", "property_name": "position"}}),
    );
    assert_eq!(resp["id"], "t1");
    assert_eq!(resp["status"], "success");
    assert_eq!(resp["data"]["property_value"], json!({"x": 100.0, "y": 200.0}));
}

#[test]
fn set_node_property_decodes_against_existing_shape() {
    let exec = executor();
    let resp = call(
        &exec,
        json!({"id": "s1", "command": "SetNodeProperty",
               "params": {"node_path": "Root/Player", "property_name": "position",
                          "property_value": {"x": 5}}}),
    );
    assert_eq!(resp["status"], "success");
    assert_eq!(resp["data"]["property_value"], json!({"x": 5.0, "y": 0.0}));

    let resp = call(
        &exec,
        json!({"id": "s2", "command": "SetNodeProperty",
               "params": {"node_path": "Root/Player", "property_name": "modulate",
                          "property_value": {"r": 0.25, "g": 0.5, "b": 1}}}),
    );
    assert_eq!(resp["data"]["property_value"], json!({"r": 0.25, "g": 0.5, "b": 1.0, "a": 1.0}));
}

#[test]
fn set_unknown_property_passes_json_through() {
    let exec = executor();
    let value = json!({"hp": 10, "tags": ["hero"]});
    let resp = call(
        &exec,
        json!({"id": "s3", "command": "SetNodeProperty",
               "params": {"node_path": "Root/Player", "property_name": "stats", "property_value": value}}),
    );
    assert_eq!(resp["data"]["property_value"], value);
}

#[test]
fn transform_is_reported_as_string() {
    let resp = call(
        &executor(),
        json!({"id": "t", "command": "GetNodeProperty",
               "params": {"node_path": "Root/Camera", "property_name": "transform"}}),
    );
    assert_eq!(resp["data"]["property_value"], "[X: (1, 0), Y: (0, 1), O: (0, 0)]");
}

#[test]
fn missing_node_is_not_found() {
    let resp = call(
        &executor(),
        json!({"id": "n", "command": "GetNodeProperty",
               "params": {"node_path": "Root/Ghost", "property_name": "position"}}),
    );
    assert_eq!(resp["status"], "error");
    assert_eq!(resp["error"], "Node not found: Root/Ghost");
    assert!(resp.get("data").is_none());
}

#[test]
fn add_then_remove_node() {
    let exec = executor();
    let resp = call(
        &exec,
        json!({"id": "a", "command": "AddNode",
               "params": {"parent_path": "Root", "node_type": "Sprite2D", "node_name": "PlayerSprite"}}),
    );
    assert_eq!(resp["data"]["node_path"], "Root/PlayerSprite");

    let dup = call(
        &exec,
        json!({"id": "a2", "command": "AddNode",
               "params": {"node_type": "Sprite2D", "node_name": "PlayerSprite"}}),
    );
    assert_eq!(dup["status"], "error");

    let resp = call(&exec, json!({"id": "r", "command": "RemoveNode", "params": {"node_path": "Root/PlayerSprite"}}));
    assert_eq!(resp["status"], "success");

    let resp = call(&exec, json!({"id": "r2", "command": "RemoveNode", "params": {"node_path": "Root/PlayerSprite"}}));
    assert_eq!(resp["error"], "Node not found: Root/PlayerSprite");
}

#[test]
fn removing_root_is_refused() {
    let resp = call(&executor(), json!({"id": "r", "command": "RemoveNode", "params": {"node_path": "Root"}}));
    assert_eq!(resp["status"], "error");
    assert!(resp["error"].as_str().unwrap().contains("root"));
}

#[test]
fn file_round_trip() {
    let exec = executor();
    let resp = call(
        &exec,
        json!({"id": "w", "command": "SetFileContent",
               "params": {"file_path": "res://scripts/enemy.gd", "content": "extends Node\n"}}),
    );
    assert_eq!(resp["data"]["bytes_written"], 13);

    let resp = call(&exec, json!({"id": "r", "command": "GetFileContent", "params": {"file_path": "res://scripts/enemy.gd"}}));
    assert_eq!(resp["data"]["content"], "extends Node\n");

    let resp = call(&exec, json!({"id": "m", "command": "GetFileContent", "params": {"file_path": "res://nope.gd"}}));
    assert_eq!(resp["error"], "File not found: res://nope.gd");
}

#[test]
fn find_files_by_type() {
    let exec = executor();
    let resp = call(
        &exec,
        json!({"id": "f", "command": "FindAllFilesByType", "params": {"file_type": "gd", "search_path": "res://scripts"}}),
    );
    assert_eq!(resp["data"]["files"], json!(["res://scripts/player.gd"]));

    let resp = call(&exec, json!({"id": "f2", "command": "FindAllFilesByType", "params": {"file_type": ".tscn"}}));
    assert_eq!(resp["data"]["files"], json!(["res://main.tscn", "res://scenes/main.tscn"]));

    let resp = call(
        &exec,
        json!({"id": "f3", "command": "FindAllFilesByType", "params": {"file_type": "gd", "search_path": "res://missing"}}),
    );
    assert_eq!(resp["error"], "Directory not found: res://missing");
}

#[test]
fn scene_nodes_returns_nested_tree() {
    let resp = call(&executor(), json!({"id": "g", "command": "GetSceneNodes", "params": {"scene_path": "res://scenes/main.tscn"}}));
    let root = &resp["data"]["nodes"];
    assert_eq!(root["name"], "Root");
    assert_eq!(root["children"][0]["path"], "Root/Player");
    assert_eq!(root["children"][0]["children"][0]["type"], "Sprite2D");
    assert_eq!(root["children"][1]["name"], "Camera");
}

#[test]
fn scene_walk_stops_at_depth_bound() {
    let exec = Executor::new(Arc::new(SceneHost::demo())).with_max_tree_depth(1);
    let resp = call(&exec, json!({"id": "g", "command": "GetSceneNodes", "params": {"scene_path": "res://scenes/main.tscn"}}));
    let player = &resp["data"]["nodes"]["children"][0];
    assert_eq!(player["truncated"], true);
    assert_eq!(player["children"], json!([]));
    assert!(resp["data"]["nodes"]["children"][1].get("truncated").is_none());
}

#[test]
fn unknown_scene_is_not_found() {
    let resp = call(&executor(), json!({"id": "g", "command": "GetSceneNodes", "params": {"scene_path": "res://nope.tscn"}}));
    assert_eq!(resp["error"], "Scene not found: res://nope.tscn");
}

#[test]
fn run_tool_method() {
    let exec = executor();
    let resp = call(
        &exec,
        json!({"id": "x", "command": "RunToolMethod", "params": {"method_name": "echo", "method_params": {"a": 1}}}),
    );
    assert_eq!(resp["data"]["result"], json!({"a": 1}));

    let resp = call(&exec, json!({"id": "y", "command": "RunToolMethod", "params": {"method_name": "build_project"}}));
    assert_eq!(resp["error"], "Method not found: build_project");
}

#[test]
fn project_info_fields() {
    let resp = call(&executor(), json!({"id": "p", "command": "GetProjectInfo"}));
    let data = &resp["data"];
    assert_eq!(data["project_name"], "GodotMCPProject");
    assert_eq!(data["version"], "4.5");
    assert!(data["project_path"].is_string());
}

#[test]
fn validation_errors_are_envelopes() {
    let exec = executor();
    let resp = call(&exec, json!({"id": "u", "command": "InvalidCommand", "params": {}}));
    assert_eq!(resp["id"], "u");
    assert_eq!(resp["error"], "Unknown command: InvalidCommand");

    let resp = call(&exec, json!({"id": "m", "command": "AddNode", "params": {"node_type": "Node"}}));
    assert_eq!(resp["error"], "Missing required parameter: node_name");

    let raw = exec.handle_text("{oops");
    let resp: Value = serde_json::from_str(&raw).unwrap();
    assert!(resp["id"].is_null());
    assert_eq!(resp["status"], "error");
}

#[test]
fn success_payload_echoes_command_and_message() {
    let resp = call(
        &executor(),
        json!({"id": "c", "command": "RemoveNode", "params": {"node_path": "Root/Camera"}}),
    );
    assert_eq!(resp["data"]["command"], "RemoveNode");
    assert_eq!(resp["data"]["message"], "Node Root/Camera removed successfully");
}

#[test]
fn wrongly_typed_parameter_names_the_key() {
    let exec = executor();
    let resp = call(&exec, json!({"id": "w", "command": "GetFileContent", "params": {"file_path": 7}}));
    assert_eq!(resp["error"], "Invalid parameter 'file_path': expected a string");

    let resp = call(
        &exec,
        json!({"id": "w2", "command": "RunToolMethod", "params": {"method_name": "echo", "method_params": [1]}}),
    );
    assert_eq!(resp["error"], "Invalid parameter 'method_params': expected an object");
}

#[test]
fn registered_tool_method_returns_its_result() {
    let host = Arc::new(SceneHost::demo());
    let double: ToolMethod = Arc::new(|params: &Params| -> mcpbridge_core::Result<Value> {
        let n = params.get("n").and_then(Value::as_i64).unwrap_or(0);
        Ok(json!(n * 2))
    });
    host.register_tool_method("double", double).unwrap();

    let exec = Executor::new(host);
    let resp = call(
        &exec,
        json!({"id": "d", "command": "RunToolMethod", "params": {"method_name": "double", "method_params": {"n": 21}}}),
    );
    assert_eq!(resp["data"]["result"], 42);
    assert_eq!(resp["data"]["message"], "Tool method double executed successfully");
}

#[test]
fn node_commands_follow_the_edited_scene() {
    let mut level = SceneTree::new("Level", "Node3D");
    let root = level.root();
    level.add_child(root, "Floor", "MeshInstance3D").unwrap();
    assert_eq!(level.node_count(), 2);

    let host = Arc::new(SceneHost::demo().with_scene("res://scenes/level.tscn", level, false));
    let exec = Executor::new(Arc::clone(&host) as Arc<dyn EditorHost>);
    let get_floor = json!({"id": "g", "command": "GetNodeProperty",
                           "params": {"node_path": "Level/Floor", "property_name": "position"}});

    let resp = call(&exec, get_floor.clone());
    assert_eq!(resp["error"], "Node not found: Level/Floor");

    host.edit_scene("res://scenes/level.tscn").unwrap();
    let resp = call(&exec, get_floor);
    assert_eq!(resp["data"]["property_value"], json!({"x": 0.0, "y": 0.0, "z": 0.0}));

    let err = host.edit_scene("res://scenes/none.tscn").unwrap_err();
    assert_eq!(err.to_string(), "Scene not found: res://scenes/none.tscn");
}

#[test]
fn property_write_decodes_and_stores_in_one_step() {
    let host = SceneHost::demo();
    let stored = host
        .set_node_property("Root/Player", "position", json!({"y": 9}))
        .unwrap();
    assert_eq!(stored, Variant::Vector2(Vector2 { x: 0.0, y: 9.0 }));
    assert_eq!(host.node_property("Root/Player", "position").unwrap(), stored);

    // Unset properties keep the JSON structure.
    let stored = host
        .set_node_property("Root/Player", "notes", json!({"x": 1}))
        .unwrap();
    assert_eq!(stored.shape(), Shape::Other);
}

#[test]
fn scene_tree_counts_nodes_after_removal() {
    let mut tree = SceneTree::new("Root", "Node");
    let root = tree.root();
    let a = tree.add_child(root, "A", "Node").unwrap();
    tree.add_child(a, "B", "Node").unwrap();
    assert_eq!(tree.node_count(), 3);

    tree.remove(a).unwrap();
    assert_eq!(tree.node_count(), 1);
}
