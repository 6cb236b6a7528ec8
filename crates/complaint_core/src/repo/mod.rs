//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the complaint store and identity directory contracts.
//! - Isolate SQLite query details from lifecycle orchestration.
//!
//! # Invariants
//! - Repository writes must enforce `Complaint::validate()` before persistence.
//! - Repository APIs return semantic errors (`NotFound`) in addition to DB
//!   transport errors.

pub mod complaint_repo;
mod schema;
pub mod user_repo;
