//! Element locator strategies.
//!
//! Provides Appium-like selectors for addressing elements on a screen.
//!
//! # Example
//!
//! ```ignore
//! use vom::Selector;
//!
//! // Resource ID (the most common on mobile)
//! let btn = driver.find_element(&Selector::id("login_button")).await?;
//!
//! // Accessibility ID
//! let menu = driver.find_element(&Selector::accessibility_id("Open menu")).await?;
//!
//! // Exact text
//! let link = driver.find_element(&Selector::text("Forgot password?")).await?;
//!
//! // XPath
//! let cell = driver.find_element(&Selector::xpath("//android.widget.TextView[2]")).await?;
//! ```
//!
//! Selectors are plain values: build them once, reuse them across views.
//! A [`SelectorRewrite`] registered on the driver may adjust every selector
//! just before it is resolved.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

// ============================================================================
// Selector Enum
// ============================================================================

/// Element locator strategy plus its expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "strategy", content = "value")]
pub enum Selector {
    /// Native resource / DOM id.
    ///
    /// # Example
    /// ```ignore
    /// Selector::Id("com.example:id/login_button".into())
    /// ```
    #[serde(rename = "id")]
    Id(String),

    /// Accessibility identifier (content-desc on Android, name on iOS).
    #[serde(rename = "accessibilityId")]
    AccessibilityId(String),

    /// XPath expression over the native view hierarchy.
    ///
    /// # Example
    /// ```ignore
    /// Selector::XPath("//android.widget.Button[@text='OK']".into())
    /// ```
    #[serde(rename = "xpath")]
    XPath(String),

    /// Exact text match.
    #[serde(rename = "text")]
    Text(String),

    /// Partial text match.
    #[serde(rename = "partialText")]
    PartialText(String),

    /// Native class name (e.g. `android.widget.EditText`).
    #[serde(rename = "className")]
    ClassName(String),

    /// CSS selector, for web contexts.
    #[serde(rename = "css")]
    Css(String),

    /// Name attribute.
    #[serde(rename = "name")]
    Name(String),
}

impl Selector {
    /// Creates an ID selector.
    #[inline]
    pub fn id(id: impl Into<String>) -> Self {
        Self::Id(id.into())
    }

    /// Creates an accessibility ID selector.
    #[inline]
    pub fn accessibility_id(id: impl Into<String>) -> Self {
        Self::AccessibilityId(id.into())
    }

    /// Creates an XPath selector.
    #[inline]
    pub fn xpath(expr: impl Into<String>) -> Self {
        Self::XPath(expr.into())
    }

    /// Creates an exact text selector.
    #[inline]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Creates a partial text selector.
    #[inline]
    pub fn partial_text(text: impl Into<String>) -> Self {
        Self::PartialText(text.into())
    }

    /// Creates a class name selector.
    #[inline]
    pub fn class_name(class: impl Into<String>) -> Self {
        Self::ClassName(class.into())
    }

    /// Creates a CSS selector.
    #[inline]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    /// Creates a name attribute selector.
    #[inline]
    pub fn name(name: impl Into<String>) -> Self {
        Self::Name(name.into())
    }

    /// Returns the strategy name passed to the remote driver.
    #[must_use]
    pub fn strategy(&self) -> &'static str {
        match self {
            Self::Id(_) => "id",
            Self::AccessibilityId(_) => "accessibility id",
            Self::XPath(_) => "xpath",
            Self::Text(_) => "text",
            Self::PartialText(_) => "partial text",
            Self::ClassName(_) => "class name",
            Self::Css(_) => "css selector",
            Self::Name(_) => "name",
        }
    }

    /// Returns the selector expression.
    #[must_use]
    pub fn value(&self) -> &str {
        match self {
            Self::Id(v)
            | Self::AccessibilityId(v)
            | Self::XPath(v)
            | Self::Text(v)
            | Self::PartialText(v)
            | Self::ClassName(v)
            | Self::Css(v)
            | Self::Name(v) => v,
        }
    }

    /// Rejects expressions no backend could resolve.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidSelector`] if the expression is blank.
    pub fn validate(&self) -> Result<()> {
        if self.value().trim().is_empty() {
            return Err(Error::invalid_selector(format!(
                "empty expression for strategy '{}'",
                self.strategy()
            )));
        }
        Ok(())
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.strategy(), self.value())
    }
}

// ============================================================================
// SelectorRewrite
// ============================================================================

/// Hook that rewrites a selector right before it is resolved.
///
/// Registered once on the driver. Useful to prefix resource ids with the
/// application package, or to map one strategy onto another per platform.
///
/// Any `Fn(Selector) -> Selector` closure is a rewrite hook.
pub trait SelectorRewrite: Send + Sync {
    /// Returns the selector to resolve in place of `selector`.
    fn on_selector_load(&self, selector: Selector) -> Selector;
}

impl<F> SelectorRewrite for F
where
    F: Fn(Selector) -> Selector + Send + Sync,
{
    fn on_selector_load(&self, selector: Selector) -> Selector {
        self(selector)
    }
}

// ============================================================================
// Tests
// ============================================================================
