//! Project repository contract and JSON file implementation.
//!
//! # Responsibility
//! - Load and save whole projects as `{ "meta": {..}, "nodes": [..] }`.
//! - Decode leniently: a bad field degrades to its default, a bad node
//!   degrades to a blank node.
//!
//! # Invariants
//! - Only unparsable JSON or a wrong top-level shape fails a load.
//! - Nodes loaded without an id get distinct fallback ids (`node`, `node-2`, ..).
//! - Saves replace the target file in one rename step and leave no staging file.
//!
//! # See also
//! - `model::project` for field meanings.

use crate::model::project::{lines_to_list, Node, Project, QuestMeta, QuestOption};
use crate::render::sanitize::{sanitize_id, FALLBACK_ID};
use log::{error, info, warn};
use serde_json::{Map, Value};
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::Instant;

pub type RepoResult<T> = Result<T, RepoError>;

/// Persistence error for project load/save.
#[derive(Debug)]
pub enum RepoError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Json(serde_json::Error),
    /// JSON parsed but is not shaped like a project.
    InvalidShape(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "{}: {source}", path.display()),
            Self::Json(err) => write!(f, "invalid project JSON: {err}"),
            Self::InvalidShape(message) => write!(f, "invalid project shape: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Json(err) => Some(err),
            Self::InvalidShape(_) => None,
        }
    }
}

impl From<serde_json::Error> for RepoError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

/// Repository interface for whole-project persistence.
pub trait ProjectRepository {
    fn load(&self) -> RepoResult<Project>;
    fn save(&self, project: &Project) -> RepoResult<()>;
}

/// Project stored as one pretty-printed JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileProjectRepository {
    path: PathBuf,
}

impl JsonFileProjectRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> RepoError {
        RepoError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl ProjectRepository for JsonFileProjectRepository {
    fn load(&self) -> RepoResult<Project> {
        let started_at = Instant::now();
        info!("event=project_load module=repo status=start");

        let result = std::fs::read_to_string(&self.path)
            .map_err(|err| self.io_error(err))
            .and_then(|text| project_from_str(&text));

        match &result {
            Ok(project) => info!(
                "event=project_load module=repo status=ok duration_ms={} nodes={}",
                started_at.elapsed().as_millis(),
                project.nodes.len()
            ),
            Err(err) => error!(
                "event=project_load module=repo status=error duration_ms={} error={}",
                started_at.elapsed().as_millis(),
                err
            ),
        }
        result
    }

    fn save(&self, project: &Project) -> RepoResult<()> {
        let started_at = Instant::now();
        info!("event=project_save module=repo status=start");

        let result = project_to_string(project).and_then(|text| {
            let staging = self.path.with_extension("json.tmp");
            let written = std::fs::write(&staging, text)
                .and_then(|()| std::fs::rename(&staging, &self.path));
            written.map_err(|err| {
                let _ = std::fs::remove_file(&staging);
                self.io_error(err)
            })
        });

        match &result {
            Ok(()) => info!(
                "event=project_save module=repo status=ok duration_ms={} nodes={}",
                started_at.elapsed().as_millis(),
                project.nodes.len()
            ),
            Err(err) => error!(
                "event=project_save module=repo status=error duration_ms={} error={}",
                started_at.elapsed().as_millis(),
                err
            ),
        }
        result
    }
}

/// Serializes a project to the saved-file format.
pub fn project_to_string(project: &Project) -> RepoResult<String> {
    Ok(serde_json::to_string_pretty(project)?)
}

/// Parses saved-file text, degrading malformed fields.
pub fn project_from_str(text: &str) -> RepoResult<Project> {
    let value: Value = serde_json::from_str(text)?;
    project_from_value(&value)
}

/// Builds a project from parsed JSON, degrading malformed fields.
///
/// # Errors
/// - Root is not an object.
/// - `meta` is present but not an object, or `nodes` is present but not an array.
pub fn project_from_value(value: &Value) -> RepoResult<Project> {
    let root = value
        .as_object()
        .ok_or_else(|| RepoError::InvalidShape("root must be an object".to_string()))?;

    let mut decoder = Decoder::default();

    let meta = match root.get("meta") {
        None | Some(Value::Null) => QuestMeta::blank(),
        Some(Value::Object(fields)) => decoder.meta(fields),
        Some(_) => return Err(RepoError::InvalidShape("`meta` must be an object".to_string())),
    };

    let mut nodes: Vec<Node> = match root.get("nodes") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items.iter().map(|item| decoder.node(item)).collect(),
        Some(_) => return Err(RepoError::InvalidShape("`nodes` must be an array".to_string())),
    };
    assign_fallback_ids(&mut nodes);

    if decoder.degraded > 0 {
        warn!(
            "event=project_decode module=repo status=degraded fields={}",
            decoder.degraded
        );
    }

    Ok(Project::with_nodes(meta, nodes))
}

/// Gives every id-less node a fallback id no other node sanitizes to.
fn assign_fallback_ids(nodes: &mut [Node]) {
    let mut taken: BTreeSet<String> = nodes
        .iter()
        .filter(|node| !node.node_id.trim().is_empty())
        .map(|node| sanitize_id(&node.node_id))
        .collect();

    let mut suffix = 1usize;
    for node in nodes.iter_mut().filter(|node| node.node_id.trim().is_empty()) {
        let id = loop {
            let candidate = match suffix {
                1 => FALLBACK_ID.to_string(),
                n => format!("{FALLBACK_ID}-{n}"),
            };
            suffix += 1;
            if !taken.contains(&candidate) {
                break candidate;
            }
        };
        taken.insert(id.clone());
        node.node_id = id;
    }
}

const META_KEYS: &[&str] = &[
    "quest_name",
    "region",
    "short_description",
    "quest_giver",
    "prerequisite",
    "quest_type",
    "meta_short",
    "rewards",
    "important_flags",
    "version_stamp",
    "closing_notes",
    "extra",
];

/// Counts fields that had to fall back to a default.
#[derive(Default)]
struct Decoder {
    degraded: usize,
}

impl Decoder {
    fn text(&mut self, fields: &Map<String, Value>, key: &str) -> String {
        match fields.get(key) {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(value)) => value.clone(),
            Some(Value::Number(value)) => value.to_string(),
            Some(Value::Bool(value)) => value.to_string(),
            Some(_) => {
                self.degraded += 1;
                String::new()
            }
        }
    }

    fn list(&mut self, fields: &Map<String, Value>, key: &str) -> Vec<String> {
        match fields.get(key) {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::String(text)) => lines_to_list(text),
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|item| match item {
                    Value::String(value) => Some(value.clone()),
                    _ => {
                        self.degraded += 1;
                        None
                    }
                })
                .collect(),
            Some(_) => {
                self.degraded += 1;
                Vec::new()
            }
        }
    }

    fn meta(&mut self, fields: &Map<String, Value>) -> QuestMeta {
        let mut extra = BTreeMap::new();
        if let Some(value) = fields.get("extra") {
            match value {
                Value::Object(entries) => {
                    for (key, entry) in entries {
                        match entry {
                            Value::String(text) => {
                                extra.insert(key.clone(), text.clone());
                            }
                            _ => self.degraded += 1,
                        }
                    }
                }
                Value::Null => {}
                _ => self.degraded += 1,
            }
        }
        for (key, value) in fields {
            if META_KEYS.contains(&key.as_str()) {
                continue;
            }
            if let Value::String(text) = value {
                // An entry inside `extra` wins over a stray key of the same name.
                match extra.entry(key.clone()) {
                    Entry::Vacant(slot) => {
                        slot.insert(text.clone());
                    }
                    Entry::Occupied(_) => self.degraded += 1,
                }
            }
        }

        QuestMeta {
            quest_name: self.text(fields, "quest_name"),
            region: self.text(fields, "region"),
            short_description: self.text(fields, "short_description"),
            quest_giver: self.text(fields, "quest_giver"),
            prerequisite: self.text(fields, "prerequisite"),
            quest_type: self.text(fields, "quest_type"),
            meta_short: self.text(fields, "meta_short"),
            rewards: self.text(fields, "rewards"),
            important_flags: self.text(fields, "important_flags"),
            version_stamp: self.text(fields, "version_stamp"),
            closing_notes: self.text(fields, "closing_notes"),
            extra,
        }
    }

    fn node(&mut self, value: &Value) -> Node {
        let Some(fields) = value.as_object() else {
            self.degraded += 1;
            return Node::new("", "");
        };

        let node_id = self.text(fields, "node_id");
        let options = match fields.get("options") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items.iter().map(|item| self.option(item)).collect(),
            Some(_) => {
                self.degraded += 1;
                Vec::new()
            }
        };

        Node {
            node_id,
            title: self.text(fields, "title"),
            scene: self.text(fields, "scene"),
            dialog: self.text(fields, "dialog"),
            content: self.text(fields, "content"),
            info_items: self.list(fields, "info_items"),
            tech_flags: self.list(fields, "tech_flags"),
            outcomes: self.list(fields, "outcomes"),
            notes: self.text(fields, "notes"),
            options,
        }
    }

    fn option(&mut self, value: &Value) -> QuestOption {
        match value.as_object() {
            Some(fields) => QuestOption {
                label: self.text(fields, "label"),
                target: self.text(fields, "target"),
            },
            None => {
                self.degraded += 1;
                QuestOption::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        project_from_str, project_from_value, project_to_string, JsonFileProjectRepository,
        ProjectRepository, RepoError,
    };
    use crate::model::project::{Node, Project};
    use crate::render::find_id_conflicts;
    use serde_json::json;

    #[test]
    fn saved_text_loads_back_unchanged() {
        let mut project = Project::new();
        project.meta.extra.insert("author".into(), "Mira".into());
        project.nodes[0] = Node::new("start", "Start").with_option("Go", "end");
        let text = project_to_string(&project).unwrap();
        assert_eq!(project_from_str(&text).unwrap(), project);
    }

    #[test]
    fn missing_keys_default_to_blank() {
        let project = project_from_value(&json!({ "nodes": [{ "title": "Only title" }] })).unwrap();
        assert_eq!(project.meta.quest_name, "");
        assert_eq!(project.nodes[0].node_id, "node");
        assert_eq!(project.nodes[0].title, "Only title");
        assert!(project.nodes[0].options.is_empty());
    }

    #[test]
    fn wrong_field_types_degrade_per_field() {
        let project = project_from_value(&json!({
            "meta": { "quest_name": "Lost Mine", "region": ["x"] },
            "nodes": [
                { "node_id": "a", "title": 7, "dialog": { "bad": true }, "info_items": ["ok", 3] },
                "not a node",
                { "node_id": "b", "options": [{ "label": "Go", "target": "a" }, 12] }
            ]
        }))
        .unwrap();

        assert_eq!(project.meta.quest_name, "Lost Mine");
        assert_eq!(project.meta.region, "");
        assert_eq!(project.nodes.len(), 3);
        assert_eq!(project.nodes[0].title, "7");
        assert_eq!(project.nodes[0].dialog, "");
        assert_eq!(project.nodes[0].info_items, vec!["ok".to_string()]);
        assert_eq!(project.nodes[1].node_id, "node");
        assert_eq!(project.nodes[2].options.len(), 2);
        assert_eq!(project.nodes[2].options[1].target, "");
    }

    #[test]
    fn id_less_nodes_get_distinct_fallback_ids() {
        let project = project_from_value(&json!({
            "nodes": ["bad", 7, { "node_id": "ok" }, { "title": "No id" }, { "node_id": "node-3" }]
        }))
        .unwrap();

        let ids: Vec<&str> = project.nodes.iter().map(|n| n.node_id.as_str()).collect();
        assert_eq!(ids, vec!["node", "node-2", "ok", "node-4", "node-3"]);
        assert!(find_id_conflicts(&project.nodes).is_empty());
    }

    #[test]
    fn fallback_ids_skip_ids_already_in_use() {
        let project = project_from_value(&json!({
            "nodes": [{ "node_id": "Node" }, { "title": "No id" }]
        }))
        .unwrap();
        assert_eq!(project.nodes[1].node_id, "node-2");
    }

    #[test]
    fn extra_entries_win_over_stray_meta_keys() {
        let project = project_from_value(&json!({
            "meta": { "extra": { "author": "A" }, "author": "B", "editor": "C" }
        }))
        .unwrap();
        assert_eq!(project.meta.extra.get("author").map(String::as_str), Some("A"));
        assert_eq!(project.meta.extra.get("editor").map(String::as_str), Some("C"));
    }

    #[test]
    fn failed_save_leaves_no_staging_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("quest.json");
        std::fs::create_dir(&target).unwrap();
        std::fs::write(target.join("keep.txt"), "x").unwrap();

        let result = JsonFileProjectRepository::new(&target).save(&Project::new());

        assert!(matches!(result, Err(RepoError::Io { .. })));
        assert!(!dir.path().join("quest.json.tmp").exists());
        assert!(target.join("keep.txt").exists());
    }

    #[test]
    fn list_fields_accept_multiline_text() {
        let project = project_from_value(&json!({
            "nodes": [{ "node_id": "a", "outcomes": "good\n\n bad " }]
        }))
        .unwrap();
        assert_eq!(project.nodes[0].outcomes, vec!["good".to_string(), "bad".to_string()]);
    }

    #[test]
    fn unknown_meta_strings_become_extra_entries() {
        let project = project_from_value(&json!({
            "meta": { "quest_name": "Q", "author": "Mira", "pages": 3 }
        }))
        .unwrap();
        assert_eq!(project.meta.extra.get("author").map(String::as_str), Some("Mira"));
        assert!(!project.meta.extra.contains_key("pages"));
    }

    #[test]
    fn wrong_root_shape_is_fatal() {
        assert!(matches!(
            project_from_value(&json!([1, 2])),
            Err(RepoError::InvalidShape(_))
        ));
        assert!(matches!(
            project_from_value(&json!({ "nodes": "start" })),
            Err(RepoError::InvalidShape(_))
        ));
        assert!(matches!(project_from_str("{ nope"), Err(RepoError::Json(_))));
    }
}
