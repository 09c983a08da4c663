//! Driver facade: one per test session.
//!
//! The [`Driver`] binds a [`RemoteDriver`] to the resolution engine and to the
//! view registry. Every [`Element`] and view holds a clone of it; the session
//! ends when the last clone is dropped.
//!
//! # Example
//!
//! ```ignore
//! use vom::{Driver, Selector};
//!
//! let driver = Driver::builder()
//!     .remote(my_appium_session)
//!     .view::<LoginView>()
//!     .build()?;
//!
//! let button = driver.find_element(&Selector::id("login_button")).await?;
//! button.click().await?;
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use image::DynamicImage;
use tracing::debug;

use crate::color::{self, Rgb};
use crate::error::{Error, Result};
use crate::geometry::Point;
use crate::page::view::{self, NewView, View, ViewRegistry};
use crate::page::{Element, Selector, SelectorRewrite};
use crate::remote::{RemoteDriver, Scope};

use super::builder::DriverBuilder;
use super::options::Options;
use super::resolve;

// ============================================================================
// Types
// ============================================================================

/// Internal shared state for the driver.
pub(crate) struct DriverInner {
    /// Session capability, exclusively owned by this driver.
    pub remote: Arc<dyn RemoteDriver>,

    /// Wait budgets and gesture timings.
    pub options: Options,

    /// Applied to every selector before it is resolved.
    pub rewrite: Option<Arc<dyn SelectorRewrite>>,

    /// Views constructible by name.
    pub views: ViewRegistry,
}

// ============================================================================
// Driver
// ============================================================================

/// Session-wide entry point.
///
/// Cheap to clone; clones share the same session. Calls on one driver must
/// be serialized by the caller.
#[derive(Clone)]
pub struct Driver {
    /// Shared inner state.
    pub(crate) inner: Arc<DriverInner>,
}

// ============================================================================
// Driver - Display
// ============================================================================

impl fmt::Debug for Driver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Driver")
            .field("options", &self.inner.options)
            .field("rewrite", &self.inner.rewrite.is_some())
            .field("views", &self.inner.views)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Driver - Constructors
// ============================================================================

impl Driver {
    /// Creates a configuration builder for the driver.
    #[inline]
    #[must_use]
    pub fn builder() -> DriverBuilder {
        DriverBuilder::new()
    }

    /// Wraps a remote driver with default options and no views registered.
    #[must_use]
    pub fn new(remote: impl RemoteDriver + 'static) -> Self {
        Self::from_parts(Arc::new(remote), Options::new(), None, ViewRegistry::new())
    }

    pub(crate) fn from_parts(
        remote: Arc<dyn RemoteDriver>,
        options: Options,
        rewrite: Option<Arc<dyn SelectorRewrite>>,
        views: ViewRegistry,
    ) -> Self {
        Self {
            inner: Arc::new(DriverInner {
                remote,
                options,
                rewrite,
                views,
            }),
        }
    }
}

// ============================================================================
// Driver - Accessors
// ============================================================================

impl Driver {
    /// Returns the driver options.
    #[inline]
    #[must_use]
    pub fn options(&self) -> &Options {
        &self.inner.options
    }

    /// Returns the underlying remote driver.
    #[inline]
    #[must_use]
    pub fn remote(&self) -> &dyn RemoteDriver {
        self.inner.remote.as_ref()
    }

    /// Returns the view registry.
    #[inline]
    #[must_use]
    pub fn views(&self) -> &ViewRegistry {
        &self.inner.views
    }

    /// Applies the rewrite hook, then validates the result.
    pub(crate) fn prepare(&self, selector: &Selector) -> Result<Selector> {
        let selector = match &self.inner.rewrite {
            Some(hook) => {
                let rewritten = hook.on_selector_load(selector.clone());
                if &rewritten != selector {
                    debug!(from = %selector, to = %rewritten, "Selector rewritten");
                }
                rewritten
            }
            None => selector.clone(),
        };

        selector.validate()?;
        Ok(selector)
    }
}

// ============================================================================
// Driver - Element Search
// ============================================================================

impl Driver {
    /// Finds an element anywhere on screen, waiting up to the default budget.
    ///
    /// # Errors
    ///
    /// [`Error::ElementNotFound`] if nothing matches in time.
    pub async fn find_element(&self, selector: &Selector) -> Result<Element> {
        resolve::resolve(self, &Scope::Root, selector, None).await
    }

    /// Finds an element, waiting up to `wait`. Zero means a single attempt.
    pub async fn find_element_timeout(&self, selector: &Selector, wait: Duration) -> Result<Element> {
        resolve::resolve(self, &Scope::Root, selector, Some(wait)).await
    }

    /// Single lookup attempt; `None` instead of a not-found error.
    pub async fn find_nullable_element(&self, selector: &Selector) -> Result<Option<Element>> {
        resolve::resolve_optional(self, &Scope::Root, selector, Some(Duration::ZERO)).await
    }

    /// Waits up to `wait`; `None` instead of a not-found error.
    pub async fn find_nullable_element_timeout(
        &self,
        selector: &Selector,
        wait: Duration,
    ) -> Result<Option<Element>> {
        resolve::resolve_optional(self, &Scope::Root, selector, Some(wait)).await
    }

    /// Finds all matches, waiting up to the default budget for the first.
    ///
    /// An empty result is not an error.
    pub async fn find_elements(&self, selector: &Selector) -> Result<Vec<Element>> {
        resolve::resolve_all(self, &Scope::Root, selector, None).await
    }

    /// Finds all matches, waiting up to `wait` for the first.
    pub async fn find_elements_timeout(
        &self,
        selector: &Selector,
        wait: Duration,
    ) -> Result<Vec<Element>> {
        resolve::resolve_all(self, &Scope::Root, selector, Some(wait)).await
    }
}

// ============================================================================
// Driver - Screen Primitives
// ============================================================================

impl Driver {
    /// Taps the screen at `point`.
    pub async fn click_at(&self, point: Point) -> Result<()> {
        debug!(%point, "Tapping screen");
        self.remote().click(point).await
    }

    /// Slides a finger from `from` to `to` over `duration`.
    pub async fn slide_finger(&self, from: Point, to: Point, duration: Duration) -> Result<()> {
        debug!(
            %from,
            %to,
            duration_ms = duration.as_millis() as u64,
            "Sliding finger"
        );
        self.remote().slide_finger(from, to, duration).await
    }

    /// Encoded full-screen screenshot.
    pub async fn screenshot(&self) -> Result<Vec<u8>> {
        self.remote().screenshot(&Scope::Root).await
    }

    /// Decoded full-screen screenshot.
    ///
    /// # Errors
    ///
    /// [`Error::Screenshot`] if the image cannot be decoded.
    pub async fn screenshot_image(&self) -> Result<DynamicImage> {
        let bytes = self.screenshot().await?;
        color::decode(&bytes)
    }

    /// Color of one screen pixel.
    ///
    /// # Errors
    ///
    /// [`Error::Screenshot`] if the image cannot be decoded or `point` is
    /// off screen.
    pub async fn color_at(&self, point: Point) -> Result<Rgb> {
        let image = self.screenshot_image().await?;
        let (Ok(x), Ok(y)) = (u32::try_from(point.x), u32::try_from(point.y)) else {
            return Err(Error::screenshot(format!("point {point} is off screen")));
        };
        color::pixel(&image, x, y)
    }
}

// ============================================================================
// Driver - Views
// ============================================================================

impl Driver {
    /// Constructs a fresh `V` bound to this driver.
    #[must_use]
    pub fn view<V: NewView>(&self) -> V {
        view::instantiate::<V>(self)
    }

    /// Constructs the view registered under `name`.
    ///
    /// # Errors
    ///
    /// [`Error::ConstructionFailure`] if no view is registered under `name`.
    pub fn view_named(&self, name: &str) -> Result<Box<dyn View>> {
        self.inner.views.instantiate(name, self)
    }
}

// ============================================================================
// Tests
// ============================================================================
