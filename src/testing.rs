//! In-memory remote driver.
//!
//! [`MockRemote`] implements [`RemoteDriver`] over a list of scripted
//! [`MockElement`]s and records every call it receives, so page objects can
//! be exercised without a device.
//!
//! Appearance delays use [`tokio::time::Instant`]; under a paused test clock
//! they elapse instantly and deterministically.
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//! use vom::testing::{MockElement, MockRemote};
//! use vom::{Driver, Selector};
//!
//! let remote = MockRemote::new();
//! remote.add(
//!     MockElement::new(Selector::id("login_button"))
//!         .text("Log in")
//!         .appears_after(Duration::from_secs(2)),
//! );
//!
//! let driver = Driver::new(remote.clone());
//! driver.find_element(&Selector::id("login_button")).await?.click().await?;
//! assert_eq!(remote.clicks().len(), 1);
//! ```

use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use image::{DynamicImage, ImageFormat, RgbImage};
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use tokio::time::Instant;

use crate::color::Rgb;
use crate::error::{Error, Result};
use crate::geometry::{Point, Rect, Size};
use crate::identifiers::ElementId;
use crate::page::Selector;
use crate::remote::{RemoteDriver, Scope};

/// Size given to elements that never call [`MockElement::size`].
const DEFAULT_SIZE: Size = Size::new(100, 40);

// ============================================================================
// MockElement
// ============================================================================

/// Scripted element.
#[derive(Debug, Clone)]
pub struct MockElement {
    selector: Selector,
    text: String,
    rect: Rect,
    attributes: FxHashMap<String, String>,
    focusable: bool,
    enabled: bool,
    appears_after: Duration,
    parent: Option<ElementId>,
    screenshot: Option<Vec<u8>>,
}

impl MockElement {
    /// Element matched by `selector`, visible at once.
    #[must_use]
    pub fn new(selector: Selector) -> Self {
        Self {
            selector,
            text: String::new(),
            rect: Rect::new(Point::default(), DEFAULT_SIZE),
            attributes: FxHashMap::default(),
            focusable: false,
            enabled: true,
            appears_after: Duration::ZERO,
            parent: None,
            screenshot: None,
        }
    }

    /// Visible text.
    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Top-left corner.
    #[must_use]
    pub fn at(mut self, x: i32, y: i32) -> Self {
        self.rect.origin = Point::new(x, y);
        self
    }

    /// Dimensions.
    #[must_use]
    pub fn size(mut self, width: i32, height: i32) -> Self {
        self.rect.size = Size::new(width, height);
        self
    }

    /// Native attribute.
    #[must_use]
    pub fn attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Gains focus when clicked, loses it on a tap elsewhere.
    #[must_use]
    pub fn focusable(mut self) -> Self {
        self.focusable = true;
        self.attributes
            .entry("focused".to_string())
            .or_insert_with(|| "false".to_string());
        self
    }

    /// Enabled state.
    #[must_use]
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Invisible to lookups until `delay` after the remote was created.
    #[must_use]
    pub fn appears_after(mut self, delay: Duration) -> Self {
        self.appears_after = delay;
        self
    }

    /// Places the element in `parent`'s subtree.
    #[must_use]
    pub fn child_of(mut self, parent: &ElementId) -> Self {
        self.parent = Some(parent.clone());
        self
    }

    /// Encoded image returned by element screenshots.
    #[must_use]
    pub fn screenshot(mut self, bytes: Vec<u8>) -> Self {
        self.screenshot = Some(bytes);
        self
    }

    fn matches(&self, selector: &Selector) -> bool {
        if &self.selector == selector {
            return true;
        }
        match selector {
            Selector::Text(text) => !self.text.is_empty() && &self.text == text,
            Selector::PartialText(text) => !self.text.is_empty() && self.text.contains(text.as_str()),
            _ => false,
        }
    }
}

// ============================================================================
// MockCall
// ============================================================================

/// One recorded interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    /// Screen tap.
    Click(Point),
    /// Native element click.
    ClickElement(ElementId),
    /// Typed text.
    SendKeys(ElementId, String),
    /// Cleared field.
    Clear(ElementId),
    /// Finger slide.
    SlideFinger(Point, Point, Duration),
    /// Long press.
    HoldAndRelease(ElementId, Duration),
}

// ============================================================================
// MockRemote
// ============================================================================

#[derive(Default)]
struct State {
    elements: Vec<(ElementId, MockElement)>,
    calls: Vec<MockCall>,
    lookups: usize,
    screen: Option<Vec<u8>>,
    failure: Option<String>,
}

impl State {
    fn check(&self) -> Result<()> {
        match &self.failure {
            Some(message) => Err(Error::transport(message.clone())),
            None => Ok(()),
        }
    }

    fn node(&self, id: &ElementId) -> Result<&MockElement> {
        self.elements
            .iter()
            .find(|(candidate, _)| candidate == id)
            .map(|(_, element)| element)
            .ok_or_else(|| Error::transport(format!("stale element reference: {id}")))
    }

    fn node_mut(&mut self, id: &ElementId) -> Result<&mut MockElement> {
        self.elements
            .iter_mut()
            .find(|(candidate, _)| candidate == id)
            .map(|(_, element)| element)
            .ok_or_else(|| Error::transport(format!("stale element reference: {id}")))
    }

    fn is_descendant(&self, id: &ElementId, ancestor: &ElementId) -> bool {
        let mut current = self.node(id).ok().and_then(|e| e.parent.clone());
        while let Some(parent) = current {
            if &parent == ancestor {
                return true;
            }
            current = self.node(&parent).ok().and_then(|e| e.parent.clone());
        }
        false
    }

    fn matching(&self, scope: &Scope, selector: &Selector, now: Duration) -> Vec<ElementId> {
        self.elements
            .iter()
            .filter(|(_, element)| element.appears_after <= now && element.matches(selector))
            .filter(|(id, _)| match scope.element() {
                Some(ancestor) => self.is_descendant(id, ancestor),
                None => true,
            })
            .map(|(id, _)| id.clone())
            .collect()
    }
}

/// Scripted, call-recording [`RemoteDriver`].
///
/// Clones share state, so a test keeps one clone for assertions after
/// handing another to the driver.
#[derive(Clone)]
pub struct MockRemote {
    state: Arc<Mutex<State>>,
    created_at: Instant,
}

impl std::fmt::Debug for MockRemote {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("MockRemote")
            .field("elements", &state.elements.len())
            .field("calls", &state.calls.len())
            .field("lookups", &state.lookups)
            .finish_non_exhaustive()
    }
}

impl Default for MockRemote {
    fn default() -> Self {
        Self::new()
    }
}

impl MockRemote {
    /// Empty screen. Appearance delays count from now.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(State::default())),
            created_at: Instant::now(),
        }
    }

    /// Adds an element, returning its reference.
    pub fn add(&self, element: MockElement) -> ElementId {
        let id = ElementId::generate();
        self.state.lock().elements.push((id.clone(), element));
        id
    }

    /// Encoded image returned by full-screen screenshots.
    pub fn set_screen(&self, bytes: Vec<u8>) {
        self.state.lock().screen = Some(bytes);
    }

    /// Every later call fails with a transport error.
    pub fn fail_with(&self, message: impl Into<String>) {
        self.state.lock().failure = Some(message.into());
    }

    /// Recorded interactions, oldest first.
    #[must_use]
    pub fn calls(&self) -> Vec<MockCall> {
        self.state.lock().calls.clone()
    }

    /// Elements clicked natively.
    #[must_use]
    pub fn clicks(&self) -> Vec<ElementId> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                MockCall::ClickElement(id) => Some(id),
                _ => None,
            })
            .collect()
    }

    /// Screen taps.
    #[must_use]
    pub fn taps(&self) -> Vec<Point> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                MockCall::Click(point) => Some(point),
                _ => None,
            })
            .collect()
    }

    /// Finger slides.
    #[must_use]
    pub fn slides(&self) -> Vec<(Point, Point, Duration)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                MockCall::SlideFinger(from, to, duration) => Some((from, to, duration)),
                _ => None,
            })
            .collect()
    }

    /// Current text of an element; empty if unknown.
    #[must_use]
    pub fn text_of(&self, id: &ElementId) -> String {
        self.state
            .lock()
            .node(id)
            .map(|element| element.text.clone())
            .unwrap_or_default()
    }

    /// Lookup attempts received, failed ones included.
    #[must_use]
    pub fn lookup_count(&self) -> usize {
        self.state.lock().lookups
    }

    fn elapsed(&self) -> Duration {
        Instant::now().saturating_duration_since(self.created_at)
    }
}

// ============================================================================
// RemoteDriver Implementation
// ============================================================================

#[async_trait]
impl RemoteDriver for MockRemote {
    async fn find_one(&self, scope: &Scope, selector: &Selector) -> Result<Option<ElementId>> {
        let now = self.elapsed();
        let mut state = self.state.lock();
        state.lookups += 1;
        state.check()?;
        Ok(state.matching(scope, selector, now).into_iter().next())
    }

    async fn find_all(&self, scope: &Scope, selector: &Selector) -> Result<Vec<ElementId>> {
        let now = self.elapsed();
        let mut state = self.state.lock();
        state.lookups += 1;
        state.check()?;
        Ok(state.matching(scope, selector, now))
    }

    async fn click(&self, point: Point) -> Result<()> {
        let mut state = self.state.lock();
        state.check()?;
        state.calls.push(MockCall::Click(point));
        for (_, element) in &mut state.elements {
            let tracks_focus = element.focusable || element.attributes.contains_key("focused");
            if tracks_focus && !element.rect.contains(point) {
                element
                    .attributes
                    .insert("focused".to_string(), "false".to_string());
            }
        }
        Ok(())
    }

    async fn click_element(&self, id: &ElementId) -> Result<()> {
        let mut state = self.state.lock();
        state.check()?;
        let element = state.node_mut(id)?;
        if element.focusable {
            element
                .attributes
                .insert("focused".to_string(), "true".to_string());
        }
        state.calls.push(MockCall::ClickElement(id.clone()));
        Ok(())
    }

    async fn send_keys(&self, id: &ElementId, text: &str) -> Result<()> {
        let mut state = self.state.lock();
        state.check()?;
        state.node_mut(id)?.text.push_str(text);
        state.calls.push(MockCall::SendKeys(id.clone(), text.to_string()));
        Ok(())
    }

    async fn clear(&self, id: &ElementId) -> Result<()> {
        let mut state = self.state.lock();
        state.check()?;
        state.node_mut(id)?.text.clear();
        state.calls.push(MockCall::Clear(id.clone()));
        Ok(())
    }

    async fn text(&self, id: &ElementId) -> Result<String> {
        let state = self.state.lock();
        state.check()?;
        Ok(state.node(id)?.text.clone())
    }

    async fn location(&self, id: &ElementId) -> Result<Point> {
        let state = self.state.lock();
        state.check()?;
        Ok(state.node(id)?.rect.origin)
    }

    async fn size(&self, id: &ElementId) -> Result<Size> {
        let state = self.state.lock();
        state.check()?;
        Ok(state.node(id)?.rect.size)
    }

    async fn attribute(&self, id: &ElementId, name: &str) -> Result<Option<String>> {
        let state = self.state.lock();
        state.check()?;
        Ok(state.node(id)?.attributes.get(name).cloned())
    }

    async fn is_enabled(&self, id: &ElementId) -> Result<bool> {
        let state = self.state.lock();
        state.check()?;
        Ok(state.node(id)?.enabled)
    }

    async fn screenshot(&self, scope: &Scope) -> Result<Vec<u8>> {
        let state = self.state.lock();
        state.check()?;
        let bytes = match scope {
            Scope::Root => state.screen.clone(),
            Scope::Element(id) => state.node(id)?.screenshot.clone(),
        };
        bytes.ok_or_else(|| Error::screenshot("no image scripted for this scope"))
    }

    async fn slide_finger(&self, from: Point, to: Point, duration: Duration) -> Result<()> {
        let mut state = self.state.lock();
        state.check()?;
        state.calls.push(MockCall::SlideFinger(from, to, duration));
        Ok(())
    }

    async fn hold_and_release(&self, id: &ElementId, hold: Duration) -> Result<()> {
        let mut state = self.state.lock();
        state.check()?;
        state.node(id)?;
        state.calls.push(MockCall::HoldAndRelease(id.clone(), hold));
        Ok(())
    }
}

// ============================================================================
// Images
// ============================================================================

/// PNG of `width`x`height` pixels, all `color`.
///
/// Empty if either dimension is zero.
#[must_use]
pub fn solid_png(width: u32, height: u32, color: Rgb) -> Vec<u8> {
    let pixels = RgbImage::from_pixel(width, height, image::Rgb([color.r, color.g, color.b]));
    let mut bytes = Vec::new();
    match DynamicImage::ImageRgb8(pixels).write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png) {
        Ok(()) => bytes,
        Err(_) => Vec::new(),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_delayed_element_becomes_visible() {
        let remote = MockRemote::new();
        let id = remote.add(
            MockElement::new(Selector::id("late")).appears_after(Duration::from_secs(1)),
        );

        assert_eq!(remote.find_one(&Scope::Root, &Selector::id("late")).await.unwrap(), None);
        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(
            remote.find_one(&Scope::Root, &Selector::id("late")).await.unwrap(),
            Some(id)
        );
        assert_eq!(remote.lookup_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_text_selector_matches_current_text() {
        let remote = MockRemote::new();
        let id = remote.add(MockElement::new(Selector::id("greeting")).text("Hello there"));

        let exact = remote.find_all(&Scope::Root, &Selector::text("Hello there")).await.unwrap();
        let partial = remote.find_all(&Scope::Root, &Selector::partial_text("there")).await.unwrap();
        assert_eq!(exact, vec![id.clone()]);
        assert_eq!(partial, vec![id]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_counts_lookup() {
        let remote = MockRemote::new();
        remote.fail_with("socket closed");

        let err = remote.find_one(&Scope::Root, &Selector::id("x")).await.unwrap_err();
        assert!(err.is_transport_error());
        assert_eq!(remote.lookup_count(), 1);
        assert!(remote.click(Point::new(0, 0)).await.is_err());
        assert!(remote.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_nested_descendants_match_scope() {
        let remote = MockRemote::new();
        let outer = remote.add(MockElement::new(Selector::id("outer")));
        let middle = remote.add(MockElement::new(Selector::id("middle")).child_of(&outer));
        let leaf = remote.add(MockElement::new(Selector::id("leaf")).child_of(&middle));

        let scope = Scope::Element(outer);
        assert_eq!(
            remote.find_one(&scope, &Selector::id("leaf")).await.unwrap(),
            Some(leaf)
        );
        assert_eq!(remote.find_one(&scope, &Selector::id("outer")).await.unwrap(), None);
    }

    #[test]
    fn test_solid_png_decodes() {
        let bytes = solid_png(4, 3, Rgb::new(9, 8, 7));
        let image = image::load_from_memory(&bytes).unwrap();
        assert_eq!((image.width(), image.height()), (4, 3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_screenshot_is_screenshot_error() {
        let remote = MockRemote::new();
        let err = remote.screenshot(&Scope::Root).await.unwrap_err();
        assert!(matches!(err, Error::Screenshot { .. }));
    }
}
