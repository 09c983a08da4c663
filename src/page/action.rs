//! Declarative page actions.
//!
//! An action declaration is a record: which interaction to run
//! ([`ActionKind`]), how long to wait for its selector ([`WaitUntil`]) and
//! what to hand back ([`ReturnKind`]). One generic [`invoke`] consults the
//! record, so page objects never hand-roll waits or lookups.
//!
//! Dispatch runs in three steps:
//!
//! 1. Resolve the bound selector within the declared wait.
//! 2. Run the native interaction on the resolved element.
//! 3. Shape the result: nothing, a coerced value, or a freshly built view.
//!
//! # Example
//!
//! ```ignore
//! let table = ActionTable::new()
//!     .declare("title", Selector::id("title"), ActionSpec::get_text())
//!     .declare("rows", Selector::class_name("row"), ActionSpec::get_texts().wait_seconds(3))
//!     .declare("delete", Selector::id("row_0"), ActionSpec::long_press())
//!     .declare(
//!         "open_settings",
//!         Selector::accessibility_id("Settings"),
//!         ActionSpec::click().returns_view::<SettingsView>(),
//!     );
//! ```

use std::fmt;
use std::sync::LazyLock;
use std::time::Duration;

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::color::Rgb;
use crate::driver::{Driver, resolve};
use crate::error::{Error, Result};
use crate::geometry::Point;
use crate::remote::Scope;

use super::element::Element;
use super::selector::Selector;
use super::view::{NewView, View, ViewFactory};

// ============================================================================
// WaitUntil
// ============================================================================

/// How long an action waits for its selector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum WaitUntil {
    /// Resolve the way a plain element binding does: default budget.
    #[default]
    Bound,
    /// Poll for up to this many seconds. Zero is a single attempt.
    Seconds(u64),
}

impl WaitUntil {
    /// Budget handed to the resolution engine; `None` means the default.
    #[inline]
    #[must_use]
    pub const fn budget(self) -> Option<Duration> {
        match self {
            Self::Bound => None,
            Self::Seconds(seconds) => Some(Duration::from_secs(seconds)),
        }
    }
}

impl From<i64> for WaitUntil {
    /// Negative values mean [`WaitUntil::Bound`].
    fn from(seconds: i64) -> Self {
        u64::try_from(seconds).map_or(Self::Bound, Self::Seconds)
    }
}

// ============================================================================
// ActionKind
// ============================================================================

/// Native interaction an action performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    /// Native click.
    Click,
    /// Focus, type [`ActionInput::Text`], defocus.
    SetText,
    /// Read visible text.
    GetText,
    /// Read the text of every match.
    GetTexts,
    /// Focus, clear, defocus.
    Clear,
    /// Hold for the configured time, then release.
    LongPress,
    /// Read the `focused` attribute.
    IsFocused,
    /// Read the enabled state.
    IsEnabled,
    /// Read the attribute named by [`ActionInput::Attribute`].
    GetAttribute,
    /// Slide from the element's center, see [`ActionInput::Drag`].
    Drag,
    /// Tap just outside the element if it has focus.
    RemoveFocus,
    /// Pixel at the center of the element's screenshot.
    GetCenterColor,
    /// Most frequent color of the element's screenshot.
    GetAverageColor,
}

// ============================================================================
// Return Shapes
// ============================================================================

/// Data types an action result can be coerced into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataKind {
    /// A string.
    Text,
    /// A list of strings.
    Texts,
    /// A boolean.
    Bool,
    /// An `"R,G,B"` color.
    Color,
}

impl DataKind {
    fn name(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Texts => "texts",
            Self::Bool => "bool",
            Self::Color => "color",
        }
    }
}

/// What an action hands back.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ReturnKind {
    /// Nothing, whatever the interaction produced.
    #[default]
    Nothing,
    /// The interaction's value, coerced.
    Data(DataKind),
    /// A fresh view of a type known at compile time.
    View(ViewFactory),
    /// A fresh view looked up in the driver's registry.
    ViewNamed(String),
}

// ============================================================================
// ActionSpec
// ============================================================================

/// One action declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionSpec {
    /// Interaction to run.
    pub kind: ActionKind,
    /// Wait for the selector.
    pub wait_until: WaitUntil,
    /// Result shape.
    pub returns: ReturnKind,
}

impl ActionSpec {
    /// Declares `kind` with the default wait, returning nothing.
    #[inline]
    #[must_use]
    pub fn new(kind: ActionKind) -> Self {
        Self {
            kind,
            wait_until: WaitUntil::Bound,
            returns: ReturnKind::Nothing,
        }
    }

    /// Click.
    #[must_use]
    pub fn click() -> Self {
        Self::new(ActionKind::Click)
    }

    /// Type text.
    #[must_use]
    pub fn set_text() -> Self {
        Self::new(ActionKind::SetText)
    }

    /// Read text, returning it.
    #[must_use]
    pub fn get_text() -> Self {
        Self::new(ActionKind::GetText).returns(DataKind::Text)
    }

    /// Read every match's text, returning the list.
    #[must_use]
    pub fn get_texts() -> Self {
        Self::new(ActionKind::GetTexts).returns(DataKind::Texts)
    }

    /// Clear.
    #[must_use]
    pub fn clear() -> Self {
        Self::new(ActionKind::Clear)
    }

    /// Long press.
    #[must_use]
    pub fn long_press() -> Self {
        Self::new(ActionKind::LongPress)
    }

    /// Drag.
    #[must_use]
    pub fn drag() -> Self {
        Self::new(ActionKind::Drag)
    }

    /// Sets the wait.
    #[inline]
    #[must_use]
    pub fn wait_until(mut self, wait_until: WaitUntil) -> Self {
        self.wait_until = wait_until;
        self
    }

    /// Waits up to `seconds` for the selector.
    #[inline]
    #[must_use]
    pub fn wait_seconds(self, seconds: u64) -> Self {
        self.wait_until(WaitUntil::Seconds(seconds))
    }

    /// Returns the interaction's value coerced into `kind`.
    #[inline]
    #[must_use]
    pub fn returns(mut self, kind: DataKind) -> Self {
        self.returns = ReturnKind::Data(kind);
        self
    }

    /// Returns a fresh `V` after the interaction.
    #[inline]
    #[must_use]
    pub fn returns_view<V: NewView>(mut self) -> Self {
        self.returns = ReturnKind::View(ViewFactory::of::<V>());
        self
    }

    /// Returns a fresh instance of the view registered under `name`.
    #[inline]
    #[must_use]
    pub fn returns_view_named(mut self, name: impl Into<String>) -> Self {
        self.returns = ReturnKind::ViewNamed(name.into());
        self
    }
}

// ============================================================================
// Input / Output
// ============================================================================

/// Arguments an action may need.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ActionInput {
    /// No argument.
    #[default]
    None,
    /// Text to type.
    Text(String),
    /// Attribute name to read.
    Attribute(String),
    /// Drag destination; `None` duration means the configured default.
    Drag {
        /// Where the finger ends.
        target: Point,
        /// How long the slide takes.
        duration: Option<Duration>,
    },
}

impl ActionInput {
    /// Text argument.
    #[inline]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Attribute name argument.
    #[inline]
    pub fn attribute(name: impl Into<String>) -> Self {
        Self::Attribute(name.into())
    }

    /// Drag to `target` over the configured default duration.
    #[inline]
    #[must_use]
    pub fn drag_to(target: Point) -> Self {
        Self::Drag {
            target,
            duration: None,
        }
    }
}

/// Shaped result of an action.
pub enum ActionOutput {
    /// No value.
    Nothing,
    /// A string.
    Text(String),
    /// A list of strings.
    Texts(Vec<String>),
    /// A boolean.
    Bool(bool),
    /// A color.
    Color(Rgb),
    /// A freshly built view.
    View(Box<dyn View>),
}

impl fmt::Debug for ActionOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nothing => f.write_str("Nothing"),
            Self::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Self::Texts(texts) => f.debug_tuple("Texts").field(texts).finish(),
            Self::Bool(value) => f.debug_tuple("Bool").field(value).finish(),
            Self::Color(color) => f.debug_tuple("Color").field(color).finish(),
            Self::View(view) => f.debug_tuple("View").field(&view.view_name()).finish(),
        }
    }
}

impl ActionOutput {
    /// Short name of the variant, for diagnostics.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Nothing => "nothing",
            Self::Text(_) => "text",
            Self::Texts(_) => "texts",
            Self::Bool(_) => "bool",
            Self::Color(_) => "color",
            Self::View(_) => "view",
        }
    }

    /// Converts a native value into the declared data type.
    ///
    /// # Errors
    ///
    /// [`Error::Coercion`] if no sensible conversion exists.
    pub fn coerce(self, kind: DataKind) -> Result<Self> {
        match (self, kind) {
            (Self::Text(text), DataKind::Text) => Ok(Self::Text(text)),
            (Self::Texts(texts), DataKind::Text) => Ok(Self::Text(texts.join("\n"))),
            (Self::Bool(value), DataKind::Text) => Ok(Self::Text(value.to_string())),
            (Self::Color(color), DataKind::Text) => Ok(Self::Text(color.to_string())),

            (Self::Texts(texts), DataKind::Texts) => Ok(Self::Texts(texts)),
            (Self::Text(text), DataKind::Texts) => Ok(Self::Texts(vec![text])),

            (Self::Bool(value), DataKind::Bool) => Ok(Self::Bool(value)),
            (Self::Text(text), DataKind::Bool) => match text.trim() {
                t if t.eq_ignore_ascii_case("true") => Ok(Self::Bool(true)),
                t if t.eq_ignore_ascii_case("false") => Ok(Self::Bool(false)),
                _ => Err(Error::coercion(kind.name(), format!("text '{text}'"))),
            },

            (Self::Color(color), DataKind::Color) => Ok(Self::Color(color)),
            (Self::Text(text), DataKind::Color) => text.parse().map(Self::Color),

            (other, kind) => Err(Error::coercion(kind.name(), other.kind_name())),
        }
    }
}

// ============================================================================
// FromActionOutput
// ============================================================================

/// Types an [`ActionOutput`] can be extracted into.
pub trait FromActionOutput: Sized {
    /// Extracts the value, coercing where needed.
    fn from_output(output: ActionOutput) -> Result<Self>;
}

impl FromActionOutput for () {
    fn from_output(_: ActionOutput) -> Result<Self> {
        Ok(())
    }
}

impl FromActionOutput for String {
    fn from_output(output: ActionOutput) -> Result<Self> {
        match output.coerce(DataKind::Text)? {
            ActionOutput::Text(text) => Ok(text),
            other => Err(Error::coercion("text", other.kind_name())),
        }
    }
}

impl FromActionOutput for Vec<String> {
    fn from_output(output: ActionOutput) -> Result<Self> {
        match output.coerce(DataKind::Texts)? {
            ActionOutput::Texts(texts) => Ok(texts),
            other => Err(Error::coercion("texts", other.kind_name())),
        }
    }
}

impl FromActionOutput for bool {
    fn from_output(output: ActionOutput) -> Result<Self> {
        match output.coerce(DataKind::Bool)? {
            ActionOutput::Bool(value) => Ok(value),
            other => Err(Error::coercion("bool", other.kind_name())),
        }
    }
}

impl FromActionOutput for Rgb {
    fn from_output(output: ActionOutput) -> Result<Self> {
        match output.coerce(DataKind::Color)? {
            ActionOutput::Color(color) => Ok(color),
            other => Err(Error::coercion("color", other.kind_name())),
        }
    }
}

impl FromActionOutput for Option<String> {
    fn from_output(output: ActionOutput) -> Result<Self> {
        match output {
            ActionOutput::Nothing => Ok(None),
            other => String::from_output(other).map(Some),
        }
    }
}

// ============================================================================
// ActionTable
// ============================================================================

/// An action bound to the selector it operates on.
#[derive(Debug, Clone, PartialEq)]
pub struct Declared {
    /// Target selector.
    pub selector: Selector,
    /// Declaration.
    pub action: ActionSpec,
}

impl Declared {
    /// Dispatches this declaration.
    pub async fn invoke(&self, driver: &Driver, input: ActionInput) -> Result<ActionOutput> {
        invoke(driver, &self.selector, &self.action, input).await
    }
}

static EMPTY_TABLE: LazyLock<ActionTable> = LazyLock::new(ActionTable::new);

/// A view's action declarations, by name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActionTable {
    actions: FxHashMap<String, Declared>,
}

impl ActionTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared empty table.
    #[must_use]
    pub fn empty() -> &'static Self {
        &EMPTY_TABLE
    }

    /// Declares `name`. A repeated name replaces the earlier declaration.
    #[must_use]
    pub fn declare(mut self, name: impl Into<String>, selector: Selector, action: ActionSpec) -> Self {
        self.actions.insert(name.into(), Declared { selector, action });
        self
    }

    /// Looks up a declaration.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Declared> {
        self.actions.get(name)
    }

    /// Number of declarations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Returns `true` if nothing is declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

// ============================================================================
// Dispatch
// ============================================================================

/// Runs one action declaration against `selector`.
///
/// # Errors
///
/// - [`Error::ElementNotFound`] if the selector does not resolve in time
///   (except [`ActionKind::GetTexts`], which reads an empty list)
/// - [`Error::InvalidArgument`] if `input` does not fit the action
/// - [`Error::Coercion`] or [`Error::ConstructionFailure`] while shaping
///
/// An interaction that yields no value (an absent attribute) stays
/// [`ActionOutput::Nothing`] whatever data type is declared.
/// - remote driver errors, unchanged
pub async fn invoke(
    driver: &Driver,
    selector: &Selector,
    action: &ActionSpec,
    input: ActionInput,
) -> Result<ActionOutput> {
    let budget = action.wait_until.budget();
    debug!(
        action = ?action.kind,
        %selector,
        wait_until = ?action.wait_until,
        "Invoking action"
    );

    let native = if action.kind == ActionKind::GetTexts {
        let elements = resolve::resolve_all(driver, &Scope::Root, selector, budget).await?;
        let mut texts = Vec::with_capacity(elements.len());
        for element in &elements {
            texts.push(element.get_text().await?);
        }
        ActionOutput::Texts(texts)
    } else {
        let element = resolve::resolve(driver, &Scope::Root, selector, budget).await?;
        interact(&element, action.kind, input).await?
    };

    shape(driver, native, &action.returns)
}

async fn interact(element: &Element, kind: ActionKind, input: ActionInput) -> Result<ActionOutput> {
    let output = match (kind, input) {
        (ActionKind::Click, _) => {
            element.click().await?;
            ActionOutput::Nothing
        }
        (ActionKind::SetText, ActionInput::Text(text)) => {
            element.set_text(&text).await?;
            ActionOutput::Nothing
        }
        (ActionKind::GetText, _) => ActionOutput::Text(element.get_text().await?),
        (ActionKind::Clear, _) => {
            element.clear().await?;
            ActionOutput::Nothing
        }
        (ActionKind::LongPress, _) => {
            element.long_press().await?;
            ActionOutput::Nothing
        }
        (ActionKind::IsFocused, _) => ActionOutput::Bool(element.is_focused().await?),
        (ActionKind::IsEnabled, _) => ActionOutput::Bool(element.is_enabled().await?),
        (ActionKind::GetAttribute, ActionInput::Attribute(name)) => {
            match element.get_attribute(&name).await? {
                Some(value) => ActionOutput::Text(value),
                None => ActionOutput::Nothing,
            }
        }
        (ActionKind::Drag, ActionInput::Drag { target, duration }) => {
            match duration {
                Some(duration) => element.drag_for(target, duration).await?,
                None => element.drag(target).await?,
            }
            ActionOutput::Nothing
        }
        (ActionKind::RemoveFocus, _) => {
            element.remove_focus().await?;
            ActionOutput::Nothing
        }
        (ActionKind::GetCenterColor, _) => ActionOutput::Color(element.get_center_color().await?),
        (ActionKind::GetAverageColor, _) => {
            ActionOutput::Color(element.get_average_color().await?)
        }
        (kind, input) => {
            return Err(Error::invalid_argument(format!(
                "{kind:?} cannot take {input:?}"
            )));
        }
    };

    Ok(output)
}

fn shape(driver: &Driver, native: ActionOutput, returns: &ReturnKind) -> Result<ActionOutput> {
    match returns {
        ReturnKind::Nothing => Ok(ActionOutput::Nothing),
        ReturnKind::Data(_) if matches!(native, ActionOutput::Nothing) => Ok(ActionOutput::Nothing),
        ReturnKind::Data(kind) => native.coerce(*kind),
        ReturnKind::View(factory) => Ok(ActionOutput::View(factory.build(driver.clone()))),
        ReturnKind::ViewNamed(name) => driver.view_named(name).map(ActionOutput::View),
    }
}

// ============================================================================
// Tests
// ============================================================================
