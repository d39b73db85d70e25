//! HTML export use-case.
//!
//! # Responsibility
//! - Load a project through a repository, render it, write the document.
//! - Report unresolved links and id conflicts to callers.
//!
//! # Invariants
//! - The output file is only written when rendering succeeded.
//! - Unresolved links never fail an export.

use crate::model::project::Project;
use crate::render::document::{render_document, RenderError, RenderOptions};
use crate::render::resolve::{audit_links, find_id_conflicts, IdConflict, UnresolvedLink};
use crate::repo::project_repo::{ProjectRepository, RepoError};
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Export failure.
#[derive(Debug)]
pub enum ExportError {
    Repo(RepoError),
    Render(RenderError),
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl Display for ExportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Repo(err) => write!(f, "{err}"),
            Self::Render(err) => write!(f, "{err}"),
            Self::Write { path, source } => {
                write!(f, "failed to write `{}`: {source}", path.display())
            }
        }
    }
}

impl Error for ExportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::Render(err) => Some(err),
            Self::Write { source, .. } => Some(source),
        }
    }
}

impl From<RepoError> for ExportError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<RenderError> for ExportError {
    fn from(value: RenderError) -> Self {
        Self::Render(value)
    }
}

/// Summary of one finished export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReport {
    pub output: PathBuf,
    pub node_count: usize,
    pub bytes: usize,
    pub unresolved: Vec<UnresolvedLink>,
}

/// Integrity findings for a project, without rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectAudit {
    pub conflicts: Vec<IdConflict>,
    pub unresolved: Vec<UnresolvedLink>,
}

impl ProjectAudit {
    pub fn of(project: &Project) -> Self {
        Self {
            conflicts: find_id_conflicts(&project.nodes),
            unresolved: audit_links(project),
        }
    }

    /// `true` when the project can be exported.
    pub fn is_exportable(&self) -> bool {
        self.conflicts.is_empty()
    }
}

/// Export service over a project repository.
pub struct ExportService<R: ProjectRepository> {
    repo: R,
}

impl<R: ProjectRepository> ExportService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Loads the project without rendering it.
    pub fn load(&self) -> Result<Project, ExportError> {
        Ok(self.repo.load()?)
    }

    /// Checks id uniqueness and link targets.
    pub fn check(&self) -> Result<ProjectAudit, ExportError> {
        let project = self.repo.load()?;
        Ok(ProjectAudit::of(&project))
    }

    /// Renders the stored project and writes it to `output`.
    pub fn export_html(
        &self,
        output: impl AsRef<Path>,
        options: &RenderOptions,
    ) -> Result<ExportReport, ExportError> {
        let output = output.as_ref();
        let started_at = Instant::now();
        info!("event=export_html module=service status=start");

        let project = self.repo.load()?;
        let html = match render_document(&project, options) {
            Ok(html) => html,
            Err(err) => {
                error!(
                    "event=export_html module=service status=error error_code=render_failed error={}",
                    err
                );
                return Err(err.into());
            }
        };

        if let Err(source) = std::fs::write(output, html.as_bytes()) {
            error!(
                "event=export_html module=service status=error error_code=write_failed error={}",
                source
            );
            return Err(ExportError::Write {
                path: output.to_path_buf(),
                source,
            });
        }

        let unresolved = audit_links(&project);
        if !unresolved.is_empty() {
            warn!(
                "event=export_html module=service status=ok unresolved_links={}",
                unresolved.len()
            );
        }
        info!(
            "event=export_html module=service status=ok duration_ms={} nodes={} bytes={}",
            started_at.elapsed().as_millis(),
            project.nodes.len(),
            html.len()
        );

        Ok(ExportReport {
            output: output.to_path_buf(),
            node_count: project.nodes.len(),
            bytes: html.len(),
            unresolved,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::ProjectAudit;
    use crate::model::project::{Node, Project, QuestMeta};

    #[test]
    fn audit_flags_conflicts_and_dead_links() {
        let project = Project::with_nodes(
            QuestMeta::default(),
            vec![
                Node::new("a", "A").with_option("lost", "nowhere"),
                Node::new("A", "again"),
            ],
        );
        let audit = ProjectAudit::of(&project);
        assert!(!audit.is_exportable());
        assert_eq!(audit.conflicts.len(), 1);
        assert_eq!(audit.unresolved.len(), 1);
        assert_eq!(audit.unresolved[0].target, "nowhere");
    }
}
