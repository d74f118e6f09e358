//! Repository layer: row mapping and generic primary-key persistence.
//!
//! # Responsibility
//! - Define the mapping contract between row types and tables.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Repository writes validate rows before any SQL mutation.
//! - Repository APIs return semantic errors (`NotFound`, `InvalidAttribute`,
//!   `Integrity`) in addition to DB transport errors.

pub mod base_repo;
pub mod category_repo;
pub mod mapping;
