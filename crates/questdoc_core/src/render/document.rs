//! Whole-document assembly.
//!
//! # Responsibility
//! - Compose head, header/nav, fixed anchor sections, node sections and
//!   footer into one HTML5 string.
//! - Refuse projects whose node ids would collide as section anchors.
//!
//! # Invariants
//! - `KnownTargets` is computed once per call and shared by all nodes.
//! - Node sections and nav chips follow the project's declared order.
//! - Output depends only on the project and `RenderOptions`.

use crate::model::project::{Project, QuestMeta, ANCHOR_END, ANCHOR_TOP};
use crate::render::assets::{SCRIPT_BLOCK, STYLE_BLOCK};
use crate::render::escape::escape_html;
use crate::render::node::render_node;
use crate::render::resolve::{find_id_conflicts, IdConflict, KnownTargets};
use crate::render::sanitize::sanitize_id;
use log::debug;
use std::error::Error;
use std::fmt::{Display, Formatter};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";
const EMPTY_VALUE: &str = "—";
const END_PLACEHOLDER: &str = "[Hier ist Platz für das, was der Spieler gelernt hat, welche Weltinfos gesetzt wurden und mögliche Follow-ups.]";

/// Render-time settings that are not part of the project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Embed the hash-highlight script.
    pub include_script: bool,
    /// Footer timestamp, already formatted.
    pub generated_at: String,
}

impl RenderOptions {
    /// Options stamped with the current local time.
    pub fn now() -> Self {
        Self::at(chrono::Local::now().format(TIMESTAMP_FORMAT).to_string())
    }

    /// Options with a fixed timestamp, for reproducible output.
    pub fn at(generated_at: impl Into<String>) -> Self {
        Self {
            include_script: true,
            generated_at: generated_at.into(),
        }
    }

    pub fn without_script(mut self) -> Self {
        self.include_script = false;
        self
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::now()
    }
}

/// Conditions that prevent a consistent document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// Two nodes sanitize to the same section id.
    DuplicateNodeId {
        id: String,
        first: usize,
        second: usize,
    },
    /// A node sanitizes to a fixed anchor id.
    ReservedNodeId { id: String, index: usize },
}

impl Display for RenderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateNodeId { id, first, second } => write!(
                f,
                "duplicate node id `{id}` (nodes #{first} and #{second})"
            ),
            Self::ReservedNodeId { id, index } => {
                write!(f, "node #{index} uses reserved anchor id `{id}`")
            }
        }
    }
}

impl Error for RenderError {}

impl From<IdConflict> for RenderError {
    fn from(value: IdConflict) -> Self {
        match value {
            IdConflict::Duplicate { id, first, second } => {
                Self::DuplicateNodeId { id, first, second }
            }
            IdConflict::ReservedAnchor { id, index } => Self::ReservedNodeId { id, index },
        }
    }
}

/// Renders `project` into one self-contained HTML document.
///
/// # Errors
/// - Returns the first id conflict found in node order.
pub fn render_document(project: &Project, options: &RenderOptions) -> Result<String, RenderError> {
    if let Some(conflict) = find_id_conflicts(&project.nodes).into_iter().next() {
        return Err(conflict.into());
    }

    let meta = &project.meta;
    let known = KnownTargets::from_nodes(&project.nodes);
    let quest_name = or_placeholder(&meta.quest_name);

    let node_sections = project
        .nodes
        .iter()
        .map(|node| render_node(node, &known))
        .collect::<Vec<_>>()
        .join("\n\n    ");

    let script = if options.include_script {
        SCRIPT_BLOCK
    } else {
        ""
    };

    let html = format!(
        r#"<!doctype html>
<html lang="de">
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width,initial-scale=1" />
  <title>Quest-Präsentator: {title}</title>
{STYLE_BLOCK}
</head>
<body>
  <header>
    <h1>Quest: {title}</h1>
    <p><strong>Region:</strong> {region}</p>
    {nav}
    <hr>
  </header>
  <main>
    {top}

    {node_sections}

    {end}
  </main>
  <footer>
    <hr>
    <p><small>{footer}</small></p>
  </footer>
{script}
</body>
</html>
"#,
        title = escape_html(quest_name),
        region = escape_html(or_placeholder(&meta.region)),
        nav = render_nav(project),
        top = render_top_section(project),
        end = render_end_section(meta),
        footer = render_footer(meta, options),
    );

    debug!(
        "event=render_document module=render status=ok nodes={} targets={} bytes={}",
        project.nodes.len(),
        known.len(),
        html.len()
    );
    Ok(html)
}

fn or_placeholder(value: &str) -> &str {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        EMPTY_VALUE
    } else {
        trimmed
    }
}

fn render_nav(project: &Project) -> String {
    let mut parts = vec![
        r#"<nav aria-label="Quest-Navigation">"#.to_string(),
        format!(r##"  <a href="#{ANCHOR_TOP}">Übersicht</a>"##),
    ];
    for node in &project.nodes {
        parts.push(format!(
            r##"  <a href="#{}">{}</a>"##,
            escape_html(&sanitize_id(&node.node_id)),
            escape_html(node.display_title())
        ));
    }
    parts.push("</nav>".to_string());
    parts.join("\n    ")
}

fn meta_entries(meta: &QuestMeta) -> Vec<(&str, &str)> {
    let mut entries = vec![
        ("Questgeber", meta.quest_giver.as_str()),
        ("Voraussetzung", meta.prerequisite.as_str()),
        ("Art", meta.quest_type.as_str()),
        ("Kurzbeschreibung", meta.meta_short.as_str()),
        ("Belohnungen", meta.rewards.as_str()),
        ("Wichtige Flags", meta.important_flags.as_str()),
    ];
    entries.extend(
        meta.extra
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str())),
    );
    entries
}

fn render_top_section(project: &Project) -> String {
    let meta = &project.meta;
    let mut parts = vec![
        format!(r#"<section id="{ANCHOR_TOP}">"#),
        "  <h2>Übersicht</h2>".to_string(),
        format!(
            "  <p><strong>Kurzbeschreibung:</strong> {}</p>",
            escape_html(or_placeholder(&meta.short_description))
        ),
        "  <p><strong>Quest Metadaten</strong></p>".to_string(),
        "  <ul>".to_string(),
    ];
    for (key, value) in meta_entries(meta) {
        parts.push(format!(
            "    <li><strong>{}:</strong> {}</li>",
            escape_html(key),
            escape_html(or_placeholder(value))
        ));
    }
    parts.push("  </ul>".to_string());
    if let Some(first) = project.nodes.first() {
        parts.push("  <hr>".to_string());
        parts.push(format!(
            r##"  <p><a href="#{}">→ Zum Start</a></p>"##,
            escape_html(&sanitize_id(&first.node_id))
        ));
    }
    parts.push("</section>".to_string());
    parts.join("\n    ")
}

fn render_end_section(meta: &QuestMeta) -> String {
    let notes = meta.closing_notes.trim();
    let body = if notes.is_empty() {
        END_PLACEHOLDER
    } else {
        notes
    };
    [
        format!(r#"<section id="{ANCHOR_END}">"#),
        "  <h2>Ende / Notizen</h2>".to_string(),
        format!("  <p>{}</p>", escape_html(body)),
        format!(r##"  <p><a href="#{ANCHOR_TOP}">↑ Zur Übersicht</a></p>"##),
        "</section>".to_string(),
    ]
    .join("\n    ")
}

fn render_footer(meta: &QuestMeta, options: &RenderOptions) -> String {
    let generated = escape_html(&options.generated_at);
    let version = meta.version_stamp.trim();
    if version.is_empty() {
        format!("Quest-Präsentator | Erzeugt: {generated}")
    } else {
        format!(
            "Quest-Präsentator | Stand: {} | Erzeugt: {generated}",
            escape_html(version)
        )
    }
}
