//! Domain model handed to service callers.
//!
//! # Responsibility
//! - Define detached business objects, independent of storage rows.
//!
//! # Invariants
//! - Business objects are immutable once constructed.

pub mod category;
