//! Quest project model.
//!
//! # Responsibility
//! - Define the canonical in-memory record handed to the renderer.
//! - Keep the JSON wire names used by saved project files.
//!
//! # Invariants
//! - `Node::node_id` is raw user input; sanitized form must be unique per project.
//! - `QuestOption::target` is stored unsanitized and resolved at render time.
//! - `top` and `end` are document anchors, never node ids.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Anchor id of the overview section rendered before all nodes.
pub const ANCHOR_TOP: &str = "top";
/// Anchor id of the closing section rendered after all nodes.
pub const ANCHOR_END: &str = "end";

/// One player choice on a node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestOption {
    /// Text shown to the reader.
    pub label: String,
    /// Raw destination: a node id or one of the fixed anchors.
    pub target: String,
}

impl QuestOption {
    pub fn new(label: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            target: target.into(),
        }
    }
}

/// One scene of the quest graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// HTML anchor source; sanitized before it reaches the document.
    pub node_id: String,
    pub title: String,
    /// Short scene label, e.g. location or time of day.
    pub scene: String,
    /// Spoken lines; line breaks are preserved in the output.
    pub dialog: String,
    /// Free-form body text.
    pub content: String,
    /// Important facts, rendered as a bullet list.
    pub info_items: Vec<String>,
    /// Technical flags set by this scene, rendered collapsed.
    pub tech_flags: Vec<String>,
    /// Possible endings/outcomes, rendered collapsed.
    pub outcomes: Vec<String>,
    pub notes: String,
    pub options: Vec<QuestOption>,
}

impl Node {
    /// Creates an empty node with the given id and title.
    pub fn new(node_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            node_id: node_id.into(),
            title: title.into(),
            scene: String::new(),
            dialog: String::new(),
            content: String::new(),
            info_items: Vec::new(),
            tech_flags: Vec::new(),
            outcomes: Vec::new(),
            notes: String::new(),
            options: Vec::new(),
        }
    }

    /// Appends an option and returns the node for chaining.
    pub fn with_option(mut self, label: impl Into<String>, target: impl Into<String>) -> Self {
        self.options.push(QuestOption::new(label, target));
        self
    }

    /// Title shown in headings and nav chips; falls back to the id.
    pub fn display_title(&self) -> &str {
        let title = self.title.trim();
        if title.is_empty() {
            self.node_id.trim()
        } else {
            title
        }
    }
}

impl Default for Node {
    fn default() -> Self {
        Self::new("start", "Start")
    }
}

/// Descriptive quest metadata shown in the header and overview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestMeta {
    pub quest_name: String,
    pub region: String,
    pub short_description: String,
    pub quest_giver: String,
    pub prerequisite: String,
    pub quest_type: String,
    pub meta_short: String,
    pub rewards: String,
    pub important_flags: String,
    /// Free-form "as of" label; the footer falls back to the export time.
    pub version_stamp: String,
    /// Body of the `end` section; a placeholder is rendered when blank.
    #[serde(default)]
    pub closing_notes: String,
    /// Additional key/value pairs, rendered after the named fields.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

impl QuestMeta {
    /// Metadata with every field blank.
    ///
    /// Used by loaders where missing keys must not invent content.
    pub fn blank() -> Self {
        Self {
            quest_name: String::new(),
            region: String::new(),
            short_description: String::new(),
            quest_giver: String::new(),
            prerequisite: String::new(),
            quest_type: String::new(),
            meta_short: String::new(),
            rewards: String::new(),
            important_flags: String::new(),
            version_stamp: String::new(),
            closing_notes: String::new(),
            extra: BTreeMap::new(),
        }
    }
}

impl Default for QuestMeta {
    fn default() -> Self {
        Self {
            quest_name: "Neue Quest".to_string(),
            region: "Unbekannt".to_string(),
            short_description: "Kurzbeschreibung hier…".to_string(),
            ..Self::blank()
        }
    }
}

/// A complete quest: metadata plus nodes in document order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub meta: QuestMeta,
    /// Declared order is document order and nav order.
    pub nodes: Vec<Node>,
}

impl Project {
    /// Creates a project with default metadata and one `start` node.
    pub fn new() -> Self {
        Self {
            meta: QuestMeta::default(),
            nodes: vec![Node::default()],
        }
    }

    /// Creates a project from explicit parts.
    pub fn with_nodes(meta: QuestMeta, nodes: Vec<Node>) -> Self {
        Self { meta, nodes }
    }
}

impl Default for Project {
    fn default() -> Self {
        Self::new()
    }
}

/// Splits editor text into trimmed, non-empty lines.
pub fn lines_to_list(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Joins list entries into one editor text block.
pub fn list_to_lines(items: &[String]) -> String {
    items.join("\n")
}
