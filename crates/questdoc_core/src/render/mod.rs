//! HTML document renderer and cross-reference resolver.
//!
//! # Responsibility
//! - Turn a `Project` snapshot into one linked, self-contained HTML document.
//! - Validate option targets against the addressable anchor set.
//!
//! # Invariants
//! - Rendering never mutates the project and performs no I/O.
//! - Unresolved targets are rendered and flagged, never dropped.
//!
//! # See also
//! - `service::export_service` for the file-writing use-case.

pub mod assets;
pub mod document;
pub mod escape;
pub mod node;
pub mod resolve;
pub mod sanitize;

pub use document::{render_document, RenderError, RenderOptions};
pub use escape::escape_html;
pub use node::{render_node, UNRESOLVED_MARKER};
pub use resolve::{audit_links, find_id_conflicts, IdConflict, KnownTargets, Resolution, UnresolvedLink};
pub use sanitize::{sanitize_id, FALLBACK_ID};
