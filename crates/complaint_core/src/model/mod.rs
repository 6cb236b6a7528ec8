//! Domain model for citizen complaints.
//!
//! # Responsibility
//! - Define canonical data structures used by the lifecycle engine and store.
//!
//! # Invariants
//! - Every complaint is identified by a stable `ComplaintId`.
//! - Complaints reference their reporter weakly; they never own a `User`.

pub mod complaint;
pub mod user;
