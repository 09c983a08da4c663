//! Remote UI driver capability.
//!
//! The engine never talks to a device or browser directly. Everything goes
//! through [`RemoteDriver`], implemented by whatever transport the caller
//! uses (Appium, a W3C WebDriver session, an in-memory double).
//!
//! Implementations report their own failures as
//! [`Error::Transport`](crate::Error::Transport); the engine propagates those
//! unchanged and never retries them. A lookup that simply finds nothing is
//! not a failure: [`find_one`](RemoteDriver::find_one) returns `Ok(None)`.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;
use crate::geometry::{Point, Size};
use crate::identifiers::ElementId;
use crate::page::Selector;

// ============================================================================
// Scope
// ============================================================================

/// Where a lookup searches.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Scope {
    /// The whole screen.
    Root,
    /// The subtree under one element.
    Element(ElementId),
}

impl Scope {
    /// Returns the parent element, if the scope is a subtree.
    #[inline]
    #[must_use]
    pub fn element(&self) -> Option<&ElementId> {
        match self {
            Self::Root => None,
            Self::Element(id) => Some(id),
        }
    }
}

// ============================================================================
// RemoteDriver
// ============================================================================

/// Primitives a device or browser session must provide.
///
/// One instance serves one session. Calls are issued one at a time.
#[async_trait]
pub trait RemoteDriver: Send + Sync {
    /// Single lookup attempt. `Ok(None)` when nothing matches.
    async fn find_one(&self, scope: &Scope, selector: &Selector) -> Result<Option<ElementId>>;

    /// Single lookup attempt returning every match in document order.
    async fn find_all(&self, scope: &Scope, selector: &Selector) -> Result<Vec<ElementId>>;

    /// Taps the screen at `point`.
    async fn click(&self, point: Point) -> Result<()>;

    /// Native click on an element.
    async fn click_element(&self, element: &ElementId) -> Result<()>;

    /// Types `text` into an element.
    async fn send_keys(&self, element: &ElementId, text: &str) -> Result<()>;

    /// Clears an editable element.
    async fn clear(&self, element: &ElementId) -> Result<()>;

    /// Reads an element's visible text.
    async fn text(&self, element: &ElementId) -> Result<String>;

    /// Top-left corner of an element.
    async fn location(&self, element: &ElementId) -> Result<Point>;

    /// Dimensions of an element.
    async fn size(&self, element: &ElementId) -> Result<Size>;

    /// Reads a native attribute. `Ok(None)` if the element lacks it.
    async fn attribute(&self, element: &ElementId, name: &str) -> Result<Option<String>>;

    /// Whether the element accepts input.
    async fn is_enabled(&self, element: &ElementId) -> Result<bool>;

    /// Encoded image (PNG or JPEG) of the screen or of one element.
    async fn screenshot(&self, scope: &Scope) -> Result<Vec<u8>>;

    /// Slides a finger in a straight line from `from` to `to`.
    async fn slide_finger(&self, from: Point, to: Point, duration: Duration) -> Result<()>;

    /// Presses an element, holds for `hold`, then releases.
    async fn hold_and_release(&self, element: &ElementId, hold: Duration) -> Result<()>;
}
