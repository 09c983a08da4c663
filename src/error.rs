//! Error types for the view object model.
//!
//! This module defines all error types used throughout the crate.
//!
//! # Usage
//!
//! All fallible operations return [`Result<T>`] which uses [`Error`]:
//!
//! ```ignore
//! use vom::{Result, Selector};
//!
//! async fn example(driver: &vom::Driver) -> Result<()> {
//!     let button = driver.find_element(&Selector::id("login_button")).await?;
//!     button.click().await?;
//!     Ok(())
//! }
//! ```
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Resolution | [`Error::ElementNotFound`], [`Error::InvalidSelector`] |
//! | Measurement | [`Error::Screenshot`] |
//! | Page objects | [`Error::ConstructionFailure`], [`Error::Coercion`], [`Error::InvalidArgument`] |
//! | Remote driver | [`Error::Transport`] |
//! | Configuration | [`Error::Config`] |
//! | External | [`Error::Json`], [`Error::Image`] |
//!
//! Only [`Error::ElementNotFound`] has a recovery path: the nullable lookups
//! turn it into `None`. Everything else reaches the caller unchanged.

// ============================================================================
// Imports
// ============================================================================

use std::result::Result as StdResult;

use image::ImageError;
use thiserror::Error;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
///
/// All fallible operations in this crate return this type.
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
///
/// Each variant includes relevant context for debugging.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Resolution Errors
    // ========================================================================
    /// Element not found by selector.
    ///
    /// Returned when the wait budget is exhausted with zero matches.
    #[error("Element not found: selector={selector}, waited {elapsed_ms}ms")]
    ElementNotFound {
        /// Selector used, after the rewrite hook ran.
        selector: String,
        /// Milliseconds spent polling before giving up.
        elapsed_ms: u64,
    },

    /// Selector expression rejected before lookup.
    #[error("Invalid selector: {message}")]
    InvalidSelector {
        /// Description of what is wrong with the selector.
        message: String,
    },

    // ========================================================================
    // Measurement Errors
    // ========================================================================
    /// Screenshot could not be taken or decoded.
    ///
    /// Reported in place of a not-found error: an unreadable screenshot
    /// usually means the element is gone.
    #[error("Can't take screenshot: {message}")]
    Screenshot {
        /// Description of the decode or sampling failure.
        message: String,
    },

    // ========================================================================
    // Page Object Errors
    // ========================================================================
    /// A view could not be constructed.
    ///
    /// Always fatal; never retried.
    #[error("Failed to create an instance of {view}: {message}")]
    ConstructionFailure {
        /// Name of the view type that failed.
        view: String,
        /// Why construction failed.
        message: String,
    },

    /// An action result could not be coerced to the declared type.
    #[error("Cannot coerce {actual} into {expected}")]
    Coercion {
        /// Declared return type.
        expected: String,
        /// What the native interaction produced.
        actual: String,
    },

    /// Invalid argument passed to an action.
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Description of the invalid argument.
        message: String,
    },

    // ========================================================================
    // Remote Driver Errors
    // ========================================================================
    /// Failure surfaced by the remote UI driver itself.
    ///
    /// Session loss, protocol errors and the like. Never retried here.
    #[error("Transport error: {message}")]
    Transport {
        /// Description supplied by the remote driver.
        message: String,
    },

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Configuration error.
    ///
    /// Returned when driver configuration is invalid.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    // ========================================================================
    // External Errors
    // ========================================================================
    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Image encoding error.
    #[error("Image error: {0}")]
    Image(#[from] ImageError),
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates an element not found error.
    #[inline]
    pub fn element_not_found(selector: impl Into<String>, elapsed_ms: u64) -> Self {
        Self::ElementNotFound {
            selector: selector.into(),
            elapsed_ms,
        }
    }

    /// Creates an invalid selector error.
    #[inline]
    pub fn invalid_selector(message: impl Into<String>) -> Self {
        Self::InvalidSelector {
            message: message.into(),
        }
    }

    /// Creates a screenshot error.
    #[inline]
    pub fn screenshot(message: impl Into<String>) -> Self {
        Self::Screenshot {
            message: message.into(),
        }
    }

    /// Creates a construction failure.
    #[inline]
    pub fn construction_failure(view: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConstructionFailure {
            view: view.into(),
            message: message.into(),
        }
    }

    /// Creates a coercion error.
    #[inline]
    pub fn coercion(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::Coercion {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Creates an invalid argument error.
    #[inline]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Creates a transport error.
    #[inline]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Creates a configuration error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` for the one error the nullable lookups swallow.
    #[inline]
    #[must_use]
    pub fn is_element_not_found(&self) -> bool {
        matches!(self, Self::ElementNotFound { .. })
    }

    /// Returns `true` if this error means the element is absent or gone.
    ///
    /// Includes screenshot failures, which are reported as not-found.
    #[inline]
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ElementNotFound { .. } | Self::Screenshot { .. })
    }

    /// Returns `true` if this error came from the remote driver.
    #[inline]
    #[must_use]
    pub fn is_transport_error(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }

    /// Returns `true` if this is a programming error in a page object.
    #[inline]
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::ConstructionFailure { .. } | Self::Coercion { .. } | Self::Config { .. }
        )
    }
}

// ============================================================================
// Tests
// ============================================================================
