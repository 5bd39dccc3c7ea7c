//! Unified domain model for entity mentions.
//!
//! # Responsibility
//! - Define canonical data structures used by matching and reconciliation.
//! - Keep one reference shape for companies, contacts, topics and categories.
//!
//! # Invariants
//! - Every reference has exactly one dedup key.
//! - Entity kinds form a closed set; every kind-specific branch is exhaustive.
//!
//! # See also
//! - docs/architecture/mentions.md

pub mod company_type;
pub mod entity;
pub mod slug;
