//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls and rendering into use-case level APIs.
//! - Keep CLI/editor layers decoupled from file format details.

pub mod export_service;
pub mod project_service;
