//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into complaint lifecycle use-cases.
//! - Keep transport layers decoupled from storage details.

pub mod complaint_service;
pub mod transition;
