//! Core logic for questdoc, a branching quest editor with HTML export.
//! This crate owns the model, the document renderer, and project persistence.

pub mod logging;
pub mod model;
pub mod render;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status, LogSettings};
pub use model::project::{
    lines_to_list, list_to_lines, Node, Project, QuestMeta, QuestOption, ANCHOR_END, ANCHOR_TOP,
};
pub use render::{
    audit_links, escape_html, find_id_conflicts, render_document, render_node, sanitize_id,
    IdConflict, KnownTargets, RenderError, RenderOptions, Resolution, UnresolvedLink,
    FALLBACK_ID, UNRESOLVED_MARKER,
};
pub use repo::project_repo::{
    project_from_str, project_from_value, project_to_string, JsonFileProjectRepository,
    ProjectRepository, RepoError, RepoResult,
};
pub use service::export_service::{ExportError, ExportReport, ExportService, ProjectAudit};
pub use service::project_service::{EditError, EditResult, ProjectEditor};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
