//! Project editing use-cases.
//!
//! # Responsibility
//! - Provide the node list operations an editing surface needs.
//! - Keep sanitized node ids unique while editing.
//!
//! # Invariants
//! - A project under edit always keeps at least one node.
//! - Renamed ids are stored sanitized and never collide with another node
//!   or a fixed anchor.

use crate::model::project::{Node, Project, QuestOption, ANCHOR_END, ANCHOR_TOP};
use crate::render::sanitize::sanitize_id;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

const NEW_NODE_ID_BASE: &str = "knoten";
const NEW_NODE_TITLE_BASE: &str = "Knoten";
const NEW_NODE_OPTION_LABEL: &str = "Weiter";

/// Editing error for node operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    IndexOutOfRange { index: usize, len: usize },
    /// The only remaining node cannot be removed.
    LastNode,
    /// Another node (or a fixed anchor) already uses this id.
    DuplicateId(String),
}

impl Display for EditError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IndexOutOfRange { index, len } => {
                write!(f, "node index {index} out of range (len {len})")
            }
            Self::LastNode => write!(f, "at least one node must remain"),
            Self::DuplicateId(id) => write!(f, "node id `{id}` already exists"),
        }
    }
}

impl Error for EditError {}

pub type EditResult<T> = Result<T, EditError>;

/// Owns a project while it is being edited.
#[derive(Debug, Clone)]
pub struct ProjectEditor {
    project: Project,
}

impl ProjectEditor {
    /// Wraps a project; an empty node list gets the default start node.
    pub fn new(mut project: Project) -> Self {
        if project.nodes.is_empty() {
            project.nodes.push(Node::default());
        }
        Self { project }
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    /// Returns the project for export or saving.
    pub fn into_project(self) -> Project {
        self.project
    }

    pub fn len(&self) -> usize {
        self.project.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.project.nodes.is_empty()
    }

    pub fn node(&self, index: usize) -> EditResult<&Node> {
        let len = self.len();
        self.project
            .nodes
            .get(index)
            .ok_or(EditError::IndexOutOfRange { index, len })
    }

    /// Mutable access for free-text fields.
    ///
    /// Changing `node_id` through this handle bypasses the collision check;
    /// use `rename_node` for ids.
    pub fn node_mut(&mut self, index: usize) -> EditResult<&mut Node> {
        let len = self.len();
        self.project
            .nodes
            .get_mut(index)
            .ok_or(EditError::IndexOutOfRange { index, len })
    }

    /// Appends a node with the next free `knoten-N` id.
    ///
    /// The new node links to `end` so it is never a dead end.
    pub fn add_node(&mut self) -> usize {
        let mut counter = 1;
        let mut id = format!("{NEW_NODE_ID_BASE}-{counter}");
        while self.id_in_use(&id, None) {
            counter += 1;
            id = format!("{NEW_NODE_ID_BASE}-{counter}");
        }

        let node = Node::new(id.as_str(), format!("{NEW_NODE_TITLE_BASE} {counter}"))
            .with_option(NEW_NODE_OPTION_LABEL, ANCHOR_END);
        self.project.nodes.push(node);
        info!("event=node_add module=service status=ok node_id={id}");
        self.len() - 1
    }

    /// Removes the node at `index` and returns it.
    pub fn remove_node(&mut self, index: usize) -> EditResult<Node> {
        self.node(index)?;
        if self.len() <= 1 {
            return Err(EditError::LastNode);
        }
        let removed = self.project.nodes.remove(index);
        info!(
            "event=node_remove module=service status=ok node_id={}",
            sanitize_id(&removed.node_id)
        );
        Ok(removed)
    }

    /// Moves a node by `delta` positions.
    ///
    /// Returns `Ok(false)` without changes when the destination is outside
    /// the list.
    pub fn move_node(&mut self, index: usize, delta: isize) -> EditResult<bool> {
        self.node(index)?;
        let destination = match index.checked_add_signed(delta) {
            Some(value) if value < self.len() => value,
            _ => return Ok(false),
        };
        let node = self.project.nodes.remove(index);
        self.project.nodes.insert(destination, node);
        Ok(true)
    }

    /// Sets a node id from raw input and returns the stored sanitized id.
    pub fn rename_node(&mut self, index: usize, raw_id: &str) -> EditResult<String> {
        self.node(index)?;
        let id = sanitize_id(raw_id);
        if self.id_in_use(&id, Some(index)) {
            return Err(EditError::DuplicateId(id));
        }
        self.project.nodes[index].node_id = id.clone();
        Ok(id)
    }

    /// Derives the node id from its title.
    pub fn id_from_title(&mut self, index: usize) -> EditResult<String> {
        let title = self.node(index)?.title.clone();
        self.rename_node(index, &title)
    }

    /// Replaces the option list of a node.
    pub fn set_options(&mut self, index: usize, options: Vec<QuestOption>) -> EditResult<()> {
        self.node_mut(index)?.options = options;
        Ok(())
    }

    fn id_in_use(&self, id: &str, except: Option<usize>) -> bool {
        if id == ANCHOR_TOP || id == ANCHOR_END {
            return true;
        }
        self.project
            .nodes
            .iter()
            .enumerate()
            .any(|(index, node)| Some(index) != except && sanitize_id(&node.node_id) == id)
    }
}
