//! Driver facade module.
//!
//! This module provides the session-wide entry point and the resolution
//! engine behind every element lookup.
//!
//! # Components
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Driver`] | Binds a remote driver to resolution and views |
//! | [`DriverBuilder`] | Fluent configuration builder |
//! | [`Options`] | Wait budgets and gesture timings |
//! | [`resolve`] | Polling selector → element resolution |

// ============================================================================
// Submodules
// ============================================================================

/// Fluent builder pattern for driver configuration.
pub mod builder;

/// Core driver implementation.
pub mod core;

/// Wait budgets and gesture timings.
pub mod options;

/// Selector → element resolution with bounded waiting.
pub mod resolve;

// ============================================================================
// Re-exports
// ============================================================================

pub use builder::DriverBuilder;
pub use core::Driver;
pub use options::Options;
