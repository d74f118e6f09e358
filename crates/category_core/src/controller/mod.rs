//! UI-facing controllers.
//!
//! # Responsibility
//! - Give presentation code one call per use case.
//! - Route user-facing failures to a presenter instead of the caller.

pub mod category_controller;
