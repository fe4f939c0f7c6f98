//! In-memory editor host.
//!
//! Holds project metadata, a `res://` file store, scenes keyed by path and a
//! set of callable tool methods. Node commands act on the edited scene.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use serde_json::Value;

use mcpbridge_core::protocol::envelope::Params;
use mcpbridge_core::protocol::value::{decode, Shape, Variant, Vector2};
use mcpbridge_core::{BridgeError, ResourceKind, Result};

use crate::host::{EditorHost, ProjectInfo};
use crate::scene::{NodeInfo, SceneTree};

pub const PROJECT_ROOT: &str = "res://";

/// A callable tool method. Receives `method_params`.
pub type ToolMethod = Arc<dyn Fn(&Params) -> Result<Value> + Send + Sync>;

struct HostState {
    project: ProjectInfo,
    files: BTreeMap<String, String>,
    scenes: BTreeMap<String, SceneTree>,
    edited_scene: String,
    tools: HashMap<String, ToolMethod>,
}

impl HostState {
    fn edited(&self) -> Result<&SceneTree> {
        self.scenes
            .get(&self.edited_scene)
            .ok_or_else(|| BridgeError::not_found(ResourceKind::Scene, self.edited_scene.clone()))
    }

    fn edited_mut(&mut self) -> Result<&mut SceneTree> {
        let key = self.edited_scene.clone();
        self.scenes
            .get_mut(&key)
            .ok_or_else(|| BridgeError::not_found(ResourceKind::Scene, key))
    }
}

pub struct SceneHost {
    state: Mutex<HostState>,
}

impl SceneHost {
    /// Empty project with a single `Root` scene at `res://main.tscn`.
    pub fn new(project: ProjectInfo) -> Self {
        let main = "res://main.tscn".to_string();
        let mut scenes = BTreeMap::new();
        scenes.insert(main.clone(), SceneTree::new("Root", "Node2D"));

        let echo: ToolMethod =
            Arc::new(|params: &Params| -> Result<Value> { Ok(Value::Object(params.clone())) });
        let mut tools: HashMap<String, ToolMethod> = HashMap::new();
        tools.insert("echo".into(), echo);

        Self {
            state: Mutex::new(HostState {
                project,
                files: BTreeMap::new(),
                scenes,
                edited_scene: main,
                tools,
            }),
        }
    }

    /// Small sample project: a player with a sprite, a camera and a script.
    pub fn demo() -> Self {
        let host = Self::new(ProjectInfo {
            name: "GodotMCPProject".into(),
            version: "4.5".into(),
            path: "/path/to/project".into(),
        })
        .with_file("res://project.godot", "config_version=5\n")
        .with_file(
            "res://scripts/player.gd",
            "extends CharacterBody2D\n\nfunc _ready():\n\tpass\n",
        );

        let mut scene = SceneTree::new("Root", "Node2D");
        let root = scene.root();
        let built = scene
            .add_child(root, "Player", "CharacterBody2D")
            .and_then(|player| {
                scene.set_property(
                    player,
                    "position",
                    Variant::Vector2(Vector2 { x: 100.0, y: 200.0 }),
                )?;
                scene.add_child(player, "Sprite", "Sprite2D")?;
                scene.add_child(root, "Camera", "Camera2D")
            });
        if let Err(e) = built {
            tracing::warn!(error = %e, "demo scene incomplete");
        }

        host.with_scene("res://scenes/main.tscn", scene, true)
    }

    pub fn with_file(self, path: &str, content: &str) -> Self {
        if let Ok(mut st) = self.state.lock() {
            st.files.insert(path.to_string(), content.to_string());
        }
        self
    }

    pub fn with_scene(self, path: &str, scene: SceneTree, edit: bool) -> Self {
        if let Ok(mut st) = self.state.lock() {
            st.scenes.insert(path.to_string(), scene);
            if edit {
                st.edited_scene = path.to_string();
            }
        }
        self
    }

    /// Switch the scene that node commands operate on.
    pub fn edit_scene(&self, path: &str) -> Result<()> {
        let mut st = self.lock()?;
        if !st.scenes.contains_key(path) {
            return Err(BridgeError::not_found(ResourceKind::Scene, path));
        }
        st.edited_scene = path.to_string();
        Ok(())
    }

    pub fn register_tool_method(&self, name: &str, method: ToolMethod) -> Result<()> {
        self.lock()?.tools.insert(name.to_string(), method);
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, HostState>> {
        self.state
            .lock()
            .map_err(|_| BridgeError::Internal("host state lock poisoned".into()))
    }
}

/// `search_path` as a directory prefix ending in `/`.
fn dir_prefix(search_path: &str) -> String {
    if search_path.is_empty() || search_path == PROJECT_ROOT {
        PROJECT_ROOT.to_string()
    } else if search_path.ends_with('/') {
        search_path.to_string()
    } else {
        format!("{search_path}/")
    }
}

impl EditorHost for SceneHost {
    fn project_info(&self) -> Result<ProjectInfo> {
        Ok(self.lock()?.project.clone())
    }

    fn read_file(&self, path: &str) -> Result<String> {
        self.lock()?
            .files
            .get(path)
            .cloned()
            .ok_or_else(|| BridgeError::not_found(ResourceKind::File, path))
    }

    fn write_file(&self, path: &str, content: &str) -> Result<usize> {
        if !path.starts_with(PROJECT_ROOT) {
            return Err(BridgeError::HostExecution(format!(
                "path outside project: {path}"
            )));
        }
        self.lock()?
            .files
            .insert(path.to_string(), content.to_string());
        Ok(content.len())
    }

    fn scene_nodes(&self, scene_path: &str, max_depth: usize) -> Result<NodeInfo> {
        let st = self.lock()?;
        let scene = st
            .scenes
            .get(scene_path)
            .ok_or_else(|| BridgeError::not_found(ResourceKind::Scene, scene_path))?;
        scene.walk(max_depth)
    }

    fn add_node(&self, parent_path: Option<&str>, node_type: &str, node_name: &str) -> Result<String> {
        let mut st = self.lock()?;
        let scene = st.edited_mut()?;
        let parent = match parent_path {
            Some(p) if !p.is_empty() => scene.resolve(p)?,
            _ => scene.root(),
        };
        let id = scene.add_child(parent, node_name, node_type)?;
        scene.path_of(id)
    }

    fn remove_node(&self, node_path: &str) -> Result<()> {
        let mut st = self.lock()?;
        let scene = st.edited_mut()?;
        let id = scene.resolve(node_path)?;
        scene.remove(id)
    }

    fn node_property(&self, node_path: &str, property: &str) -> Result<Variant> {
        let st = self.lock()?;
        let scene = st.edited()?;
        let id = scene.resolve(node_path)?;
        scene
            .property(id, property)?
            .cloned()
            .ok_or_else(|| BridgeError::not_found(ResourceKind::Property, format!("{node_path}:{property}")))
    }

    fn set_node_property(&self, node_path: &str, property: &str, raw: Value) -> Result<Variant> {
        let mut st = self.lock()?;
        let scene = st.edited_mut()?;
        let id = scene.resolve(node_path)?;
        let shape = scene
            .property(id, property)?
            .map(Variant::shape)
            .unwrap_or(Shape::Other);
        let value = decode(raw, shape);
        scene.set_property(id, property, value.clone())?;
        Ok(value)
    }

    fn find_files(&self, file_type: &str, search_path: &str) -> Result<Vec<String>> {
        let ext = format!(".{}", file_type.trim_start_matches('.'));
        let prefix = dir_prefix(search_path);

        let st = self.lock()?;
        let all: BTreeSet<&String> = st.files.keys().chain(st.scenes.keys()).collect();

        if prefix != PROJECT_ROOT && !all.iter().any(|p| p.starts_with(&prefix)) {
            return Err(BridgeError::not_found(ResourceKind::Directory, search_path));
        }

        Ok(all
            .into_iter()
            .filter(|p| p.starts_with(&prefix) && p.ends_with(&ext))
            .cloned()
            .collect())
    }

    fn run_tool_method(&self, method: &str, params: &Params) -> Result<Value> {
        // Release the lock before running user code.
        let tool = self
            .lock()?
            .tools
            .get(method)
            .cloned()
            .ok_or_else(|| BridgeError::not_found(ResourceKind::Method, method))?;
        tool(params)
    }
}
