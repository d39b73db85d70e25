use questdoc_core::{
    render_document, EditError, Node, Project, ProjectEditor, QuestMeta, QuestOption,
    RenderOptions, ANCHOR_END, UNRESOLVED_MARKER,
};

#[test]
fn added_nodes_get_unique_ids_and_link_to_end() {
    let mut editor = ProjectEditor::new(Project::new());
    let first = editor.add_node();
    let second = editor.add_node();

    assert_eq!(editor.node(first).unwrap().node_id, "knoten-1");
    assert_eq!(editor.node(second).unwrap().node_id, "knoten-2");
    assert_eq!(editor.node(second).unwrap().title, "Knoten 2");
    assert_eq!(
        editor.node(second).unwrap().options,
        vec![QuestOption::new("Weiter", ANCHOR_END)]
    );
}

#[test]
fn last_node_cannot_be_removed() {
    let mut editor = ProjectEditor::new(Project::new());
    assert_eq!(editor.remove_node(0).unwrap_err(), EditError::LastNode);

    editor.add_node();
    let removed = editor.remove_node(0).unwrap();
    assert_eq!(removed.node_id, "start");
    assert_eq!(editor.len(), 1);
}

#[test]
fn rename_sanitizes_and_rejects_collisions() {
    let project = Project::with_nodes(
        QuestMeta::default(),
        vec![Node::new("start", "Start"), Node::new("cave", "Höhle")],
    );
    let mut editor = ProjectEditor::new(project);

    assert_eq!(editor.rename_node(1, " Die Höhle! ").unwrap(), "die-hoehle");
    assert_eq!(
        editor.rename_node(1, "START").unwrap_err(),
        EditError::DuplicateId("start".to_string())
    );
    assert_eq!(
        editor.rename_node(1, "End").unwrap_err(),
        EditError::DuplicateId("end".to_string())
    );
    assert_eq!(editor.node(1).unwrap().node_id, "die-hoehle");
}

#[test]
fn id_from_title_uses_sanitized_title() {
    let mut editor = ProjectEditor::new(Project::new());
    editor.node_mut(0).unwrap().title = "Act 1: Start!".to_string();
    assert_eq!(editor.id_from_title(0).unwrap(), "act-1-start");
}

#[test]
fn moving_nodes_changes_document_order() {
    let mut editor = ProjectEditor::new(Project::new());
    editor.add_node();
    assert!(editor.move_node(0, 1).unwrap());

    let html = render_document(editor.project(), &RenderOptions::at("t")).unwrap();
    let moved = html.find(r#"<section id="knoten-1">"#).unwrap();
    let start = html.find(r#"<section id="start">"#).unwrap();
    assert!(moved < start);
}

#[test]
fn edited_options_resolve_after_rename() {
    let mut editor = ProjectEditor::new(Project::new());
    let cave = editor.add_node();
    editor
        .set_options(0, vec![QuestOption::new("Zur Höhle", "Höhle")])
        .unwrap();

    let before = render_document(editor.project(), &RenderOptions::at("t")).unwrap();
    assert!(before.contains(UNRESOLVED_MARKER));

    editor.rename_node(cave, "Höhle").unwrap();
    let project = editor.into_project();
    let after = render_document(&project, &RenderOptions::at("t")).unwrap();
    assert!(!after.contains(UNRESOLVED_MARKER));
    assert!(after.contains(r##"<li><a href="#hoehle">Zur Höhle</a></li>"##));
}
