//! Unit-of-work scoping for repository calls.
//!
//! # Responsibility
//! - Bound a group of repository calls to one session and one transaction.
//! - Decide commit or rollback when the group finishes.
//!
//! # Invariants
//! - At most one scope is active per `UnitOfWork` at a time.
//! - Commit-or-rollback runs before the scope's session is released.

pub mod unit_of_work;
