//! Resolved UI element handle.
//!
//! An [`Element`] is bound to exactly one native element reference for its
//! whole life. It never looks itself up again: once the screen changes, drop
//! it and resolve a fresh one.
//!
//! # Example
//!
//! ```ignore
//! let field = driver.find_element(&Selector::id("username")).await?;
//!
//! // Typing clicks to focus first and taps away afterwards
//! field.set_text("alice").await?;
//!
//! // Geometry
//! let center = field.get_center_point().await?;
//!
//! // Pixels
//! let color = field.get_average_color().await?;
//! assert_eq!(color.to_string(), "255,255,255");
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as Base64Standard;
use image::{DynamicImage, GenericImageView};
use tracing::debug;

use crate::color::{self, Rgb};
use crate::driver::{Driver, resolve};
use crate::error::{Error, Result};
use crate::geometry::{Point, Rect, Size};
use crate::identifiers::ElementId;
use crate::remote::{RemoteDriver, Scope};

use super::selector::Selector;
use super::view::{self, NewView};

// ============================================================================
// Types
// ============================================================================

/// Internal shared state for an element.
pub(crate) struct ElementInner {
    /// Native element reference.
    pub id: ElementId,

    /// Session this element belongs to.
    pub driver: Driver,
}

// ============================================================================
// Element
// ============================================================================

/// A handle to one resolved native element.
///
/// Clones share the same binding.
#[derive(Clone)]
pub struct Element {
    /// Shared inner state.
    pub(crate) inner: Arc<ElementInner>,
}

// ============================================================================
// Element - Display
// ============================================================================

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Element")
            .field("id", &self.inner.id)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Element - Constructor
// ============================================================================

impl Element {
    /// Creates a new element handle.
    pub(crate) fn new(id: ElementId, driver: Driver) -> Self {
        Self {
            inner: Arc::new(ElementInner { id, driver }),
        }
    }
}

// ============================================================================
// Element - Accessors
// ============================================================================

impl Element {
    /// Returns the native element reference.
    #[inline]
    #[must_use]
    pub fn id(&self) -> &ElementId {
        &self.inner.id
    }

    /// Returns the driver this element belongs to.
    #[inline]
    #[must_use]
    pub fn driver(&self) -> &Driver {
        &self.inner.driver
    }

    #[inline]
    fn remote(&self) -> &dyn RemoteDriver {
        self.inner.driver.remote()
    }
}

// ============================================================================
// Element - Actions
// ============================================================================

impl Element {
    /// Clicks the element.
    pub async fn click(&self) -> Result<()> {
        debug!(element_id = %self.inner.id, "Clicking element");
        self.remote().click_element(&self.inner.id).await
    }

    /// Clicks the element and returns the view it navigates to.
    pub async fn click_into<V: NewView>(&self) -> Result<V> {
        self.click().await?;
        Ok(view::instantiate::<V>(&self.inner.driver))
    }

    /// Types `text` into the element.
    ///
    /// Clicks first to focus, then removes focus if the element kept it.
    pub async fn set_text(&self, text: &str) -> Result<()> {
        debug!(element_id = %self.inner.id, text_len = text.len(), "Setting text");
        self.click().await?;
        self.remote().send_keys(&self.inner.id, text).await?;
        self.remove_focus().await
    }

    /// Clears the element's content.
    ///
    /// Focus handling is the same as [`set_text`](Self::set_text).
    pub async fn clear(&self) -> Result<()> {
        debug!(element_id = %self.inner.id, "Clearing element");
        self.click().await?;
        self.remote().clear(&self.inner.id).await?;
        self.remove_focus().await
    }

    /// Presses and holds for the configured long-press time, then releases.
    pub async fn long_press(&self) -> Result<()> {
        let hold = self.inner.driver.options().long_press();
        debug!(
            element_id = %self.inner.id,
            hold_ms = hold.as_millis() as u64,
            "Long pressing element"
        );
        self.remote().hold_and_release(&self.inner.id, hold).await
    }

    /// Drags from the element's center to `target` over the configured
    /// default duration.
    pub async fn drag(&self, target: Point) -> Result<()> {
        let duration = self.inner.driver.options().drag_duration();
        self.drag_for(target, duration).await
    }

    /// Drags from the element's center to `target` over `duration`.
    pub async fn drag_for(&self, target: Point, duration: Duration) -> Result<()> {
        let center = self.get_center_point().await?;
        debug!(element_id = %self.inner.id, from = %center, to = %target, "Dragging element");
        self.inner.driver.slide_finger(center, target, duration).await
    }
}

// ============================================================================
// Element - Properties
// ============================================================================

impl Element {
    /// Gets the element's visible text.
    pub async fn get_text(&self) -> Result<String> {
        self.remote().text(&self.inner.id).await
    }

    /// Gets an attribute value.
    ///
    /// Returns `None` if the attribute doesn't exist.
    pub async fn get_attribute(&self, name: &str) -> Result<Option<String>> {
        self.remote().attribute(&self.inner.id, name).await
    }

    /// Checks if the element is enabled.
    pub async fn is_enabled(&self) -> Result<bool> {
        self.remote().is_enabled(&self.inner.id).await
    }

    /// Checks the native `focused` attribute.
    ///
    /// Absent or anything other than `true` (any case) reads as `false`.
    pub async fn is_focused(&self) -> Result<bool> {
        let focused = self.get_attribute("focused").await?;
        Ok(focused.is_some_and(|v| v.trim().eq_ignore_ascii_case("true")))
    }

    /// Takes focus away by tapping one pixel above the element.
    ///
    /// Does nothing if the element is not focused.
    pub async fn remove_focus(&self) -> Result<()> {
        if !self.is_focused().await? {
            return Ok(());
        }

        let rect = self.get_rect().await?;
        debug!(element_id = %self.inner.id, "Removing focus");
        self.inner.driver.click_at(rect.just_above()).await
    }
}

// ============================================================================
// Element - Geometry
// ============================================================================

impl Element {
    /// Gets the element's dimensions.
    pub async fn get_size(&self) -> Result<Size> {
        self.remote().size(&self.inner.id).await
    }

    /// Gets the element's top-left corner.
    pub async fn get_point(&self) -> Result<Point> {
        self.remote().location(&self.inner.id).await
    }

    /// Gets the element's bounds.
    pub async fn get_rect(&self) -> Result<Rect> {
        let point = self.get_point().await?;
        let size = self.get_size().await?;
        Ok(Rect::new(point, size))
    }

    /// Gets the element's geometric center.
    pub async fn get_center_point(&self) -> Result<Point> {
        Ok(self.get_rect().await?.center())
    }
}

// ============================================================================
// Element - Screenshot
// ============================================================================

impl Element {
    /// Captures an encoded screenshot of this element.
    pub async fn take_screenshot(&self) -> Result<Vec<u8>> {
        self.remote()
            .screenshot(&Scope::Element(self.inner.id.clone()))
            .await
    }

    /// Captures a screenshot of this element, base64-encoded.
    pub async fn screenshot_base64(&self) -> Result<String> {
        let bytes = self.take_screenshot().await?;
        Ok(Base64Standard.encode(bytes))
    }

    /// Decodes this element's own screenshot.
    ///
    /// # Errors
    ///
    /// [`Error::Screenshot`] if the image cannot be decoded.
    pub async fn get_image(&self) -> Result<DynamicImage> {
        let bytes = self.take_screenshot().await?;
        color::decode(&bytes)
    }

    /// Cuts this element's bounds out of a full-screen screenshot.
    ///
    /// The crop region is clamped to the screen.
    ///
    /// # Errors
    ///
    /// [`Error::Screenshot`] if the image cannot be decoded or the element
    /// lies entirely off screen.
    pub async fn crop_from_screen(&self) -> Result<DynamicImage> {
        let rect = self.get_rect().await?;
        let screen = self.inner.driver.screenshot_image().await?;
        let (screen_width, screen_height) = screen.dimensions();

        let x = u32::try_from(rect.origin.x.max(0)).unwrap_or(0);
        let y = u32::try_from(rect.origin.y.max(0)).unwrap_or(0);
        if x >= screen_width || y >= screen_height {
            return Err(Error::screenshot(format!(
                "element at {} is outside the {screen_width}x{screen_height} screen",
                rect.origin
            )));
        }

        let width = u32::try_from(rect.size.width)
            .unwrap_or(0)
            .min(screen_width - x);
        let height = u32::try_from(rect.size.height)
            .unwrap_or(0)
            .min(screen_height - y);
        if width == 0 || height == 0 {
            return Err(Error::screenshot("element has zero dimensions"));
        }

        Ok(screen.crop_imm(x, y, width, height))
    }

    /// Color of the pixel at the center of this element's screenshot.
    pub async fn get_center_color(&self) -> Result<Rgb> {
        let image = self.get_image().await?;
        color::center_color(&image)
    }

    /// Most frequent color inside this element's screenshot.
    ///
    /// See [`color::average_color`].
    pub async fn get_average_color(&self) -> Result<Rgb> {
        let image = self.get_image().await?;
        color::average_color(&image)
    }
}

// ============================================================================
// Element - Nested Search
// ============================================================================

impl Element {
    /// Finds a descendant, waiting up to the default budget.
    pub async fn find_element(&self, selector: &Selector) -> Result<Element> {
        resolve::resolve(&self.inner.driver, &self.scope(), selector, None).await
    }

    /// Finds a descendant, waiting up to `wait`.
    pub async fn find_element_timeout(&self, selector: &Selector, wait: Duration) -> Result<Element> {
        resolve::resolve(&self.inner.driver, &self.scope(), selector, Some(wait)).await
    }

    /// Single attempt; `None` if no descendant matches.
    pub async fn find_nullable_element(&self, selector: &Selector) -> Result<Option<Element>> {
        resolve::resolve_optional(
            &self.inner.driver,
            &self.scope(),
            selector,
            Some(Duration::ZERO),
        )
        .await
    }

    /// Waits up to `wait`; `None` if no descendant matches.
    pub async fn find_nullable_element_timeout(
        &self,
        selector: &Selector,
        wait: Duration,
    ) -> Result<Option<Element>> {
        resolve::resolve_optional(&self.inner.driver, &self.scope(), selector, Some(wait)).await
    }

    /// Finds all matching descendants.
    pub async fn find_elements(&self, selector: &Selector) -> Result<Vec<Element>> {
        resolve::resolve_all(&self.inner.driver, &self.scope(), selector, None).await
    }

    /// Finds all matching descendants, waiting up to `wait` for the first.
    pub async fn find_elements_timeout(
        &self,
        selector: &Selector,
        wait: Duration,
    ) -> Result<Vec<Element>> {
        resolve::resolve_all(&self.inner.driver, &self.scope(), selector, Some(wait)).await
    }

    #[inline]
    fn scope(&self) -> Scope {
        Scope::Element(self.inner.id.clone())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;

    use crate::driver::Options;
    use crate::testing::{MockCall, MockElement, MockRemote, solid_png};

    fn setup(element: MockElement) -> (MockRemote, Driver, ElementId) {
        let remote = MockRemote::new();
        let id = remote.add(element);
        let driver = Driver::new(remote.clone());
        (remote, driver, id)
    }

    fn bound(driver: &Driver, id: &ElementId) -> Element {
        Element::new(id.clone(), driver.clone())
    }

    #[test]
    fn test_element_is_clone() {
        fn assert_clone<T: Clone>() {}
        assert_clone::<Element>();
    }

    #[test]
    fn test_element_is_debug() {
        fn assert_debug<T: std::fmt::Debug>() {}
        assert_debug::<Element>();
    }

    #[tokio::test(start_paused = true)]
    async fn test_center_point() {
        let (_, driver, id) =
            setup(MockElement::new(Selector::id("box")).at(10, 20).size(101, 51));
        let element = bound(&driver, &id);

        assert_eq!(element.get_center_point().await.unwrap(), Point::new(60, 45));
    }

    #[tokio::test(start_paused = true)]
    async fn test_click_on_unfocused_element_taps_once() {
        let (remote, driver, _) = setup(MockElement::new(Selector::id("login_button")));
        let element = driver
            .find_element(&Selector::id("login_button"))
            .await
            .unwrap();

        element.click().await.unwrap();
        element.remove_focus().await.unwrap();

        assert_eq!(remote.clicks(), vec![element.id().clone()]);
        assert!(remote.taps().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_text_focuses_types_and_defocuses() {
        let (remote, driver, id) = setup(
            MockElement::new(Selector::id("username"))
                .at(100, 40)
                .size(200, 50)
                .focusable(),
        );
        let element = bound(&driver, &id);

        element.set_text("alice").await.unwrap();

        assert_eq!(remote.text_of(&id), "alice");
        assert_eq!(remote.taps(), vec![Point::new(200, 39)]);
        assert!(!element.is_focused().await.unwrap());

        let calls = remote.calls();
        let click = calls
            .iter()
            .position(|c| matches!(c, MockCall::ClickElement(_)))
            .unwrap();
        let keys = calls
            .iter()
            .position(|c| matches!(c, MockCall::SendKeys(..)))
            .unwrap();
        assert!(click < keys);
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_empties_text() {
        let (remote, driver, id) = setup(
            MockElement::new(Selector::id("search"))
                .text("old")
                .focusable(),
        );
        let element = bound(&driver, &id);

        element.clear().await.unwrap();

        assert_eq!(remote.text_of(&id), "");
        assert_eq!(remote.taps().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_is_focused_parsing() {
        let remote = MockRemote::new();
        let yes = remote.add(MockElement::new(Selector::id("a")).attribute("focused", "TRUE"));
        let junk = remote.add(MockElement::new(Selector::id("b")).attribute("focused", "maybe"));
        let absent = remote.add(MockElement::new(Selector::id("c")));
        let driver = Driver::new(remote);

        assert!(bound(&driver, &yes).is_focused().await.unwrap());
        assert!(!bound(&driver, &junk).is_focused().await.unwrap());
        assert!(!bound(&driver, &absent).is_focused().await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_remove_focus_is_idempotent() {
        let (remote, driver, id) = setup(
            MockElement::new(Selector::id("field"))
                .at(0, 10)
                .size(20, 20)
                .attribute("focused", "true"),
        );
        let element = bound(&driver, &id);

        element.remove_focus().await.unwrap();
        element.remove_focus().await.unwrap();

        assert_eq!(remote.taps(), vec![Point::new(10, 9)]);
        assert!(!element.is_focused().await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_long_press_holds_configured_time() {
        let (remote, driver, id) = setup(MockElement::new(Selector::id("item")));
        let element = bound(&driver, &id);

        element.long_press().await.unwrap();

        assert!(remote.calls().contains(&MockCall::HoldAndRelease(id, Duration::from_secs(2))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_drag_uses_default_duration() {
        let (remote, driver, id) =
            setup(MockElement::new(Selector::id("slider")).at(0, 0).size(40, 20));
        let element = bound(&driver, &id);

        element.drag(Point::new(100, 200)).await.unwrap();

        assert_eq!(
            remote.slides(),
            vec![(Point::new(20, 10), Point::new(100, 200), Duration::from_millis(100))]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_drag_respects_configured_duration() {
        let remote = MockRemote::new();
        let id = remote.add(MockElement::new(Selector::id("slider")).at(0, 0).size(40, 20));
        let driver = Driver::builder()
            .remote(remote.clone())
            .options(Options::new().with_drag_duration(Duration::from_millis(750)))
            .build()
            .unwrap();

        bound(&driver, &id)
            .drag(Point::new(5, 5))
            .await
            .unwrap();

        assert_eq!(remote.slides()[0].2, Duration::from_millis(750));
    }

    #[tokio::test(start_paused = true)]
    async fn test_average_color_of_solid_element() {
        let (_, driver, id) = setup(
            MockElement::new(Selector::id("swatch"))
                .size(60, 30)
                .screenshot(solid_png(60, 30, Rgb::new(255, 0, 0))),
        );
        let element = bound(&driver, &id);

        assert_eq!(element.get_average_color().await.unwrap().to_string(), "255,0,0");
        assert_eq!(element.get_center_color().await.unwrap().to_string(), "255,0,0");
    }

    #[tokio::test(start_paused = true)]
    async fn test_unreadable_screenshot_reports_not_found() {
        let (_, driver, id) = setup(
            MockElement::new(Selector::id("ghost")).screenshot(b"garbage".to_vec()),
        );
        let element = bound(&driver, &id);

        let err = element.get_average_color().await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test(start_paused = true)]
    async fn test_crop_from_screen_is_clamped() {
        let remote = MockRemote::new();
        remote.set_screen(solid_png(100, 100, Rgb::new(0, 255, 0)));
        let id = remote.add(MockElement::new(Selector::id("edge")).at(80, 90).size(50, 50));
        let driver = Driver::new(remote);

        let image = bound(&driver, &id).crop_from_screen().await.unwrap();
        assert_eq!(image.dimensions(), (20, 10));
    }

    #[tokio::test(start_paused = true)]
    async fn test_screenshot_base64() {
        let (_, driver, id) =
            setup(MockElement::new(Selector::id("x")).screenshot(vec![1, 2, 3]));
        let encoded = bound(&driver, &id).screenshot_base64().await.unwrap();
        assert_eq!(encoded, "AQID");
    }

    #[tokio::test(start_paused = true)]
    async fn test_nested_nullable_search() {
        let remote = MockRemote::new();
        let list = remote.add(MockElement::new(Selector::id("list")));
        remote.add(MockElement::new(Selector::text("Row 1")).child_of(&list));
        remote.add(MockElement::new(Selector::text("Elsewhere")));
        let driver = Driver::new(remote);
        let list = bound(&driver, &list);

        assert!(list.find_nullable_element(&Selector::text("Row 1")).await.unwrap().is_some());
        assert!(list.find_nullable_element(&Selector::text("Elsewhere")).await.unwrap().is_none());
        assert_eq!(list.find_elements(&Selector::text("Row 1")).await.unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_nested_search_waits_for_late_rows() {
        let remote = MockRemote::new();
        let list = remote.add(MockElement::new(Selector::id("list")));
        remote.add(
            MockElement::new(Selector::class_name("row"))
                .child_of(&list)
                .appears_after(Duration::from_secs(1)),
        );
        let driver = Driver::new(remote);
        let list = bound(&driver, &list);

        let rows = list
            .find_elements_timeout(&Selector::class_name("row"), Duration::from_secs(3))
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);

        let none = list
            .find_elements_timeout(&Selector::class_name("cell"), Duration::ZERO)
            .await
            .unwrap();
        assert!(none.is_empty());
    }

    proptest! {
        #[test]
        fn prop_remove_focus_twice_equals_once(focused in any::<bool>()) {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_time()
                .start_paused(true)
                .build()
                .unwrap();

            runtime.block_on(async {
                let (remote, driver, id) = setup(
                    MockElement::new(Selector::id("f"))
                        .at(5, 5)
                        .size(10, 10)
                        .attribute("focused", if focused { "true" } else { "false" }),
                );
                let element = bound(&driver, &id);

                element.remove_focus().await.unwrap();
                let after_once = element.is_focused().await.unwrap();
                let taps_once = remote.taps().len();

                element.remove_focus().await.unwrap();
                assert_eq!(element.is_focused().await.unwrap(), after_once);
                assert_eq!(remote.taps().len(), taps_once);
                assert_eq!(taps_once, usize::from(focused));
            });
        }
    }
}
