//! Avagama Core
//!
//! Foundational types shared by the Avagama workspace. This crate has no
//! dependencies on application-level code (database, HTTP, configuration).
//!
//! ## Module Organization
//!
//! - `error` - Core error types (`CoreError`, `CoreResult`)
//! - `shape` - Tagged view over untyped JSON trees and ordered key probes
//! - `kinds` - Discovery types and record statuses shared across crates

pub mod error;
pub mod kinds;
pub mod shape;

// ── Error Types ────────────────────────────────────────────────────────
pub use error::{CoreError, CoreResult};

// ── Value Shapes ───────────────────────────────────────────────────────
pub use shape::{is_truthy, probe, probe_truthy, scalar_text, Shape};

// ── Shared Tags ────────────────────────────────────────────────────────
pub use kinds::{DiscoveryType, RecordStatus};
