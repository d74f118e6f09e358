//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls inside unit-of-work scopes.
//! - Keep UI layers decoupled from storage rows and SQLite details.

pub mod category_service;
