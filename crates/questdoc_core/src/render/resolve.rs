//! Cross-reference resolution for option targets.
//!
//! # Responsibility
//! - Build the document-wide set of addressable anchors.
//! - Classify option targets as resolved or unresolved.
//! - Detect node ids that would produce colliding section anchors.
//!
//! # Invariants
//! - Known targets are always sanitized node ids plus `top` and `end`.
//! - Targets are sanitized with the same rules as node ids before lookup.

use crate::model::project::{Node, Project, ANCHOR_END, ANCHOR_TOP};
use crate::render::sanitize::sanitize_id;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{Display, Formatter};

/// Outcome of resolving one option target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Target names a node or fixed anchor; holds the sanitized id.
    Resolved(String),
    /// Target names nothing known; holds the id the link still points at.
    Unresolved(String),
}

impl Resolution {
    /// Fragment id used in the rendered `href`.
    pub fn href_id(&self) -> &str {
        match self {
            Self::Resolved(id) | Self::Unresolved(id) => id,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved(_))
    }
}

/// Set of anchor ids an option may link to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnownTargets {
    ids: BTreeSet<String>,
}

impl KnownTargets {
    /// Builds the set from node ids plus the two fixed anchors.
    pub fn from_nodes(nodes: &[Node]) -> Self {
        let mut ids: BTreeSet<String> = nodes
            .iter()
            .map(|node| sanitize_id(&node.node_id))
            .collect();
        ids.insert(ANCHOR_TOP.to_string());
        ids.insert(ANCHOR_END.to_string());
        Self { ids }
    }

    /// Resolves a raw option target.
    ///
    /// An unresolved blank target links to `top` instead of the fallback id.
    pub fn resolve(&self, target_raw: &str) -> Resolution {
        let id = sanitize_id(target_raw);
        if self.ids.contains(&id) {
            Resolution::Resolved(id)
        } else if target_raw.trim().is_empty() {
            Resolution::Unresolved(ANCHOR_TOP.to_string())
        } else {
            Resolution::Unresolved(id)
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.ids.len()
    }
}

/// Node id that cannot get its own section anchor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdConflict {
    /// Two nodes sanitize to the same id.
    Duplicate {
        id: String,
        first: usize,
        second: usize,
    },
    /// A node sanitizes to `top` or `end`.
    ReservedAnchor { id: String, index: usize },
}

impl Display for IdConflict {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Duplicate { id, first, second } => write!(
                f,
                "nodes #{first} and #{second} both resolve to id `{id}`"
            ),
            Self::ReservedAnchor { id, index } => {
                write!(f, "node #{index} resolves to reserved anchor `{id}`")
            }
        }
    }
}

/// Lists all sanitized-id collisions in node order.
///
/// Each later occurrence is reported against the first node holding the id.
pub fn find_id_conflicts(nodes: &[Node]) -> Vec<IdConflict> {
    let mut first_seen = BTreeMap::<String, usize>::new();
    let mut conflicts = Vec::new();

    for (index, node) in nodes.iter().enumerate() {
        let id = sanitize_id(&node.node_id);
        if id == ANCHOR_TOP || id == ANCHOR_END {
            conflicts.push(IdConflict::ReservedAnchor { id, index });
            continue;
        }
        match first_seen.get(&id) {
            Some(&first) => conflicts.push(IdConflict::Duplicate {
                id,
                first,
                second: index,
            }),
            None => {
                first_seen.insert(id, index);
            }
        }
    }

    conflicts
}

/// One option whose target does not resolve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedLink {
    /// Sanitized id of the node carrying the option.
    pub node_id: String,
    pub option_index: usize,
    pub label: String,
    /// Raw target as entered.
    pub target: String,
}

/// Lists every unresolved option of a project in document order.
pub fn audit_links(project: &Project) -> Vec<UnresolvedLink> {
    let known = KnownTargets::from_nodes(&project.nodes);
    let mut unresolved = Vec::new();

    for node in &project.nodes {
        let node_id = sanitize_id(&node.node_id);
        for (option_index, option) in node.options.iter().enumerate() {
            if !known.resolve(&option.target).is_resolved() {
                unresolved.push(UnresolvedLink {
                    node_id: node_id.clone(),
                    option_index,
                    label: option.label.clone(),
                    target: option.target.clone(),
                });
            }
        }
    }

    unresolved
}
