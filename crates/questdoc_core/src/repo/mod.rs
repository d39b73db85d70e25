//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the project load/save contract used by services.
//! - Keep file format details out of rendering and editing code.
//!
//! # Invariants
//! - Loaded projects always carry a complete metadata record.

pub mod project_repo;
