//! Integration Tests Module
//!
//! End-to-end tests over the public API: normalization of realistic agent
//! responses, tracking set merges against file-backed SQLite, and the
//! discovery and evaluation flows wired through `AppState` with a scripted
//! agent.

// Agent response normalization tests
mod normalize_test;

// Tracking set merge tests
mod tracking_test;

// Discovery and evaluation flow tests
mod flows_test;
