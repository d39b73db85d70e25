//! Quest domain model.
//!
//! # Responsibility
//! - Define the project/node/option shapes consumed by the renderer.
//! - Provide the defaults a freshly created project starts from.
//!
//! # Invariants
//! - A `Project` exclusively owns its metadata and nodes.
//! - Fixed anchors (`top`, `end`) are never stored as nodes.
//!
//! # See also
//! - `render` for how these shapes become a document.

pub mod project;
