//! On-demand entity lookup for autocomplete and manual mention entry.
//!
//! # Responsibility
//! - Resolve partial queries into typed, selectable entity references.
//! - Keep limit normalization and kind filtering inside core.
//!
//! # See also
//! - docs/architecture/mentions.md

pub mod resolver;

pub use resolver::{EntitySearchResolver, SearchMode};
