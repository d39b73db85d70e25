//! Per-node section rendering.
//!
//! # Invariants
//! - The section id is the node's sanitized id.
//! - Blank fields produce no markup at all.
//! - Every user-supplied string passes `escape_html` exactly once.

use crate::model::project::{Node, QuestOption, ANCHOR_TOP};
use crate::render::escape::escape_html;
use crate::render::resolve::{KnownTargets, Resolution};
use crate::render::sanitize::sanitize_id;

/// Literal appended to options whose target does not resolve.
pub const UNRESOLVED_MARKER: &str = "(Ziel unbekannt)";

const OPTION_LABEL_FALLBACK: &str = "Option";

/// Renders one `<section>` for `node`.
pub fn render_node(node: &Node, known: &KnownTargets) -> String {
    let id = sanitize_id(&node.node_id);
    let mut parts = vec![
        format!(r#"<section id="{}">"#, escape_html(&id)),
        format!("  <h2>{}</h2>", escape_html(node.display_title())),
    ];

    push_labeled(&mut parts, "Szene", &node.scene);

    let dialog = node.dialog.trim();
    if !dialog.is_empty() {
        parts.push("  <p><strong>Dialog:</strong></p>".to_string());
        parts.push(format!(
            "  <blockquote><pre>{}</pre></blockquote>",
            escape_html(dialog)
        ));
    }

    push_labeled(&mut parts, "Inhalt", &node.content);

    if let Some(block) = render_item_list("Wichtige Information", &node.info_items) {
        parts.push(block);
    }
    if let Some(block) = render_details("Technik/Flags", &node.tech_flags) {
        parts.push(block);
    }
    if let Some(block) = render_details("Enden/Outcomes (Notizblock)", &node.outcomes) {
        parts.push(block);
    }

    push_labeled(&mut parts, "Notizen", &node.notes);

    if !node.options.is_empty() {
        parts.push("  <h3>Optionen</h3>".to_string());
        parts.push("  <ol>".to_string());
        for option in &node.options {
            parts.push(format!("    {}", render_option(option, known)));
        }
        parts.push("  </ol>".to_string());
    }

    parts.push(format!(
        r##"  <p><a href="#{ANCHOR_TOP}">↑ Zur Übersicht</a></p>"##
    ));
    parts.push("</section>".to_string());
    parts.join("\n    ")
}

/// Renders one option list item, flagged when its target is unknown.
pub fn render_option(option: &QuestOption, known: &KnownTargets) -> String {
    let label = option.label.trim();
    let label = if label.is_empty() {
        OPTION_LABEL_FALLBACK
    } else {
        label
    };

    match known.resolve(&option.target) {
        Resolution::Resolved(id) => format!(
            r##"<li><a href="#{}">{}</a></li>"##,
            escape_html(&id),
            escape_html(label)
        ),
        Resolution::Unresolved(id) => format!(
            r##"<li class="unresolved"><a href="#{}">{}</a> <em class="target-unknown">{UNRESOLVED_MARKER}</em></li>"##,
            escape_html(&id),
            escape_html(label)
        ),
    }
}

fn push_labeled(parts: &mut Vec<String>, label: &str, value: &str) {
    let value = value.trim();
    if value.is_empty() {
        return;
    }
    parts.push(format!(
        "  <p><strong>{}:</strong> {}</p>",
        escape_html(label),
        escape_html(value)
    ));
}

fn non_blank(items: &[String]) -> Vec<&str> {
    items
        .iter()
        .map(|item| item.trim())
        .filter(|item| !item.is_empty())
        .collect()
}

fn render_item_list(title: &str, items: &[String]) -> Option<String> {
    let items = non_blank(items);
    if items.is_empty() {
        return None;
    }
    let mut lines = vec![
        format!("  <p><strong>{}:</strong></p>", escape_html(title)),
        "  <ul>".to_string(),
    ];
    lines.extend(
        items
            .iter()
            .map(|item| format!("    <li>{}</li>", escape_html(item))),
    );
    lines.push("  </ul>".to_string());
    Some(lines.join("\n    "))
}

fn render_details(title: &str, items: &[String]) -> Option<String> {
    let items = non_blank(items);
    if items.is_empty() {
        return None;
    }
    let mut lines = vec![
        "  <details>".to_string(),
        format!("    <summary>{}</summary>", escape_html(title)),
        "    <ul>".to_string(),
    ];
    lines.extend(
        items
            .iter()
            .map(|item| format!("      <li>{}</li>", escape_html(item))),
    );
    lines.push("    </ul>".to_string());
    lines.push("  </details>".to_string());
    Some(lines.join("\n    "))
}

#[cfg(test)]
mod tests {
    use super::{render_node, render_option, UNRESOLVED_MARKER};
    use crate::model::project::{Node, QuestOption};
    use crate::render::resolve::KnownTargets;

    fn known(ids: &[&str]) -> KnownTargets {
        let nodes: Vec<Node> = ids.iter().map(|id| Node::new(*id, *id)).collect();
        KnownTargets::from_nodes(&nodes)
    }

    #[test]
    fn minimal_node_omits_empty_blocks() {
        let html = render_node(&Node::new("Act 1: Start!", "Start"), &known(&[]));
        assert!(html.starts_with(r#"<section id="act-1-start">"#));
        assert!(html.contains("<h2>Start</h2>"));
        for absent in ["Szene", "Dialog", "Inhalt", "<details>", "Optionen", "Notizen", "<ul>"] {
            assert!(!html.contains(absent), "unexpected {absent} in {html}");
        }
        assert!(html.ends_with("</section>"));
    }

    #[test]
    fn dialog_keeps_line_breaks() {
        let mut node = Node::new("inn", "Inn");
        node.dialog = "\n  Wirt: Willkommen!\nHeld: Danke.\n\n".to_string();
        let html = render_node(&node, &known(&["inn"]));
        assert!(html.contains("<pre>Wirt: Willkommen!\nHeld: Danke.</pre>"));
    }

    #[test]
    fn fields_render_in_fixed_order() {
        let mut node = Node::new("n", "N");
        node.scene = "Nacht".into();
        node.dialog = "Hallo".into();
        node.content = "Text".into();
        node.info_items = vec!["info".into()];
        node.tech_flags = vec!["flag_a".into()];
        node.outcomes = vec!["ending".into()];
        node.notes = "note".into();
        node.options = vec![QuestOption::new("Weiter", "end")];
        let html = render_node(&node, &known(&["n"]));

        let positions: Vec<usize> = [
            "<h2>", "Szene", "<pre>", "Inhalt", "Wichtige Information", "Technik/Flags",
            "Enden/Outcomes", "Notizen", "Optionen", "Zur Übersicht",
        ]
        .iter()
        .map(|needle| html.find(needle).unwrap_or_else(|| panic!("missing {needle}")))
        .collect();
        assert!(positions.windows(2).all(|pair| pair[0] < pair[1]), "{html}");
    }

    #[test]
    fn blank_list_entries_are_skipped() {
        let mut node = Node::new("n", "N");
        node.info_items = vec!["  ".into(), "".into()];
        let html = render_node(&node, &known(&["n"]));
        assert!(!html.contains("Wichtige Information"));
    }

    #[test]
    fn option_labels_and_targets_are_escaped() {
        let option = QuestOption::new(r#"<b>"Run" & 'hide'</b>"#, "end");
        let html = render_option(&option, &known(&[]));
        assert_eq!(
            html,
            r##"<li><a href="#end">&lt;b&gt;&quot;Run&quot; &amp; &#39;hide&#39;&lt;/b&gt;</a></li>"##
        );
    }

    #[test]
    fn unresolved_option_is_marked() {
        let html = render_option(&QuestOption::new("Cave", "cave"), &known(&["start"]));
        assert!(html.contains(r##"href="#cave""##));
        assert!(html.contains(UNRESOLVED_MARKER));
    }

    #[test]
    fn blank_label_and_target_fall_back() {
        let html = render_option(&QuestOption::new(" ", ""), &known(&[]));
        assert!(html.contains(r##"<a href="#top">Option</a>"##));
        assert!(html.contains(UNRESOLVED_MARKER));
    }
}
