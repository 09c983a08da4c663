//! Page objects.
//!
//! A view is a typed page object for one logical screen: it holds the
//! [`Driver`] and an [`ActionTable`] of selector-bound declarations.
//!
//! Views are never cached. Every navigation builds a fresh one, either
//! directly through [`NewView::new`] (type checked at compile time) or by
//! name through the driver's [`ViewRegistry`].
//!
//! # Example
//!
//! ```ignore
//! use vom::{ActionSpec, ActionTable, Driver, NewView, Selector, View, ViewExt};
//!
//! struct LoginView {
//!     driver: Driver,
//!     actions: ActionTable,
//! }
//!
//! impl View for LoginView {
//!     fn driver(&self) -> &Driver { &self.driver }
//!     fn actions(&self) -> &ActionTable { &self.actions }
//! }
//!
//! impl NewView for LoginView {
//!     fn new(driver: Driver) -> Self {
//!         let actions = ActionTable::new()
//!             .declare("username", Selector::id("username"), ActionSpec::set_text())
//!             .declare(
//!                 "submit",
//!                 Selector::id("login_button"),
//!                 ActionSpec::click().wait_seconds(5).returns_view::<HomeView>(),
//!             );
//!         Self { driver, actions }
//!     }
//! }
//!
//! let home: HomeView = driver
//!     .view::<LoginView>()
//!     .perform_view("submit", ActionInput::None)
//!     .await?;
//! ```

use std::any::{Any, type_name};
use std::fmt;

use async_trait::async_trait;
use rustc_hash::FxHashMap;
use tracing::{debug, warn};

use crate::driver::Driver;
use crate::error::{Error, Result};

use super::action::{ActionInput, ActionOutput, ActionTable, FromActionOutput};

// ============================================================================
// View
// ============================================================================

/// A typed page object.
pub trait View: Any + Send + Sync {
    /// Driver this view was built with.
    fn driver(&self) -> &Driver;

    /// Declared actions. Empty unless overridden.
    fn actions(&self) -> &ActionTable {
        ActionTable::empty()
    }

    /// Short type name, for diagnostics.
    fn view_name(&self) -> &'static str {
        short_type_name::<Self>()
    }
}

impl dyn View {
    /// Returns `true` if the view is a `V`.
    #[must_use]
    pub fn is<V: View>(&self) -> bool {
        let any: &dyn Any = self;
        any.is::<V>()
    }

    /// Recovers the concrete view type.
    #[must_use]
    pub fn downcast<V: View>(self: Box<Self>) -> Option<Box<V>> {
        let any: Box<dyn Any> = self;
        any.downcast::<V>().ok()
    }
}

impl fmt::Debug for dyn View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(self.view_name())
            .field("actions", &self.actions().len())
            .finish_non_exhaustive()
    }
}

/// A view constructible from nothing but a driver.
pub trait NewView: View + Sized {
    /// Builds the view. Must not touch the remote driver.
    fn new(driver: Driver) -> Self;
}

/// Builds a fresh `V` bound to `driver`.
#[must_use]
pub fn instantiate<V: NewView>(driver: &Driver) -> V {
    debug!(view = short_type_name::<V>(), "Instantiating view");
    V::new(driver.clone())
}

/// Last path segment of a type name, without generic arguments.
pub(crate) fn short_type_name<T: ?Sized>() -> &'static str {
    let full = type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

// ============================================================================
// ViewFactory
// ============================================================================

/// Zero-argument constructor for one view type.
#[derive(Clone, Copy)]
pub struct ViewFactory {
    name: &'static str,
    build: fn(Driver) -> Box<dyn View>,
}

impl ViewFactory {
    /// Factory for `V`.
    #[must_use]
    pub fn of<V: NewView>() -> Self {
        Self {
            name: short_type_name::<V>(),
            build: build_boxed::<V>,
        }
    }

    /// Name of the view type this factory builds.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Builds a fresh view bound to `driver`.
    #[must_use]
    pub fn build(&self, driver: Driver) -> Box<dyn View> {
        debug!(view = self.name, "Instantiating view");
        (self.build)(driver)
    }
}

impl fmt::Debug for ViewFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ViewFactory").field(&self.name).finish()
    }
}

impl PartialEq for ViewFactory {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && std::ptr::fn_addr_eq(self.build, other.build)
    }
}

fn build_boxed<V: NewView>(driver: Driver) -> Box<dyn View> {
    Box::new(V::new(driver))
}

// ============================================================================
// ViewRegistry
// ============================================================================

/// Views constructible by name, populated when the driver is built.
#[derive(Clone, Default)]
pub struct ViewRegistry {
    factories: FxHashMap<String, ViewFactory>,
}

impl ViewRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `V` under its short type name.
    pub fn register<V: NewView>(&mut self) {
        let factory = ViewFactory::of::<V>();
        self.factories.insert(factory.name().to_string(), factory);
    }

    /// Registers `V` under `name`.
    pub fn register_as<V: NewView>(&mut self, name: impl Into<String>) {
        self.factories.insert(name.into(), ViewFactory::of::<V>());
    }

    /// Returns `true` if `name` is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Number of registered names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Returns `true` if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Builds the view registered under `name`.
    ///
    /// # Errors
    ///
    /// [`Error::ConstructionFailure`] if `name` is not registered.
    pub fn instantiate(&self, name: &str, driver: &Driver) -> Result<Box<dyn View>> {
        match self.factories.get(name) {
            Some(factory) => Ok(factory.build(driver.clone())),
            None => {
                warn!(view = name, "No view registered under this name");
                Err(Error::construction_failure(
                    name,
                    "no view registered under this name",
                ))
            }
        }
    }
}

impl fmt::Debug for ViewRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_set().entries(names).finish()
    }
}

// ============================================================================
// ViewExt
// ============================================================================

/// Runs declared actions on any view.
#[async_trait]
pub trait ViewExt: View {
    /// Dispatches the action declared under `name`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] if the view declares no such action, plus
    /// whatever the action itself returns.
    async fn perform(&self, name: &str, input: ActionInput) -> Result<ActionOutput> {
        let declared = self.actions().get(name).ok_or_else(|| {
            Error::invalid_argument(format!(
                "{} declares no action '{name}'",
                self.view_name()
            ))
        })?;

        declared.invoke(self.driver(), input).await
    }

    /// Dispatches and extracts a typed value.
    async fn perform_into<T>(&self, name: &str, input: ActionInput) -> Result<T>
    where
        T: FromActionOutput + Send + 'static,
    {
        let output = self.perform(name, input).await?;
        T::from_output(output)
    }

    /// Dispatches an action declared to navigate, returning the new view.
    ///
    /// # Errors
    ///
    /// [`Error::ConstructionFailure`] if the action does not produce a `V`.
    async fn perform_view<V: View>(&self, name: &str, input: ActionInput) -> Result<V> {
        match self.perform(name, input).await? {
            ActionOutput::View(view) => {
                let produced = view.view_name();
                view.downcast::<V>().map(|view| *view).ok_or_else(|| {
                    Error::construction_failure(
                        short_type_name::<V>(),
                        format!("action '{name}' produced {produced}"),
                    )
                })
            }
            other => Err(Error::construction_failure(
                short_type_name::<V>(),
                format!("action '{name}' produced {} instead of a view", other.kind_name()),
            )),
        }
    }
}

#[async_trait]
impl<T: View + ?Sized> ViewExt for T {}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use crate::testing::MockRemote;

    struct Login {
        driver: Driver,
    }

    impl View for Login {
        fn driver(&self) -> &Driver {
            &self.driver
        }
    }

    impl NewView for Login {
        fn new(driver: Driver) -> Self {
            Self { driver }
        }
    }

    struct Home {
        driver: Driver,
    }

    impl View for Home {
        fn driver(&self) -> &Driver {
            &self.driver
        }
    }

    impl NewView for Home {
        fn new(driver: Driver) -> Self {
            Self { driver }
        }
    }

    #[test]
    fn test_short_type_name() {
        assert_eq!(short_type_name::<Login>(), "Login");
        assert_eq!(short_type_name::<Vec<String>>(), "Vec");
    }

    #[test]
    fn test_factory_builds_exact_type() {
        let driver = Driver::new(MockRemote::new());
        let view = ViewFactory::of::<Home>().build(driver);

        assert_eq!(view.view_name(), "Home");
        assert!(view.is::<Home>());
        assert!(!view.is::<Login>());
        assert!(view.downcast::<Home>().is_some());
    }

    #[test]
    fn test_registry_lookup() {
        let mut registry = ViewRegistry::new();
        registry.register::<Login>();
        registry.register_as::<Home>("Dashboard");
        let driver = Driver::new(MockRemote::new());

        assert_eq!(registry.len(), 2);
        assert!(registry.instantiate("Login", &driver).unwrap().is::<Login>());
        assert!(registry.instantiate("Dashboard", &driver).unwrap().is::<Home>());
    }

    #[test]
    fn test_registry_miss_is_construction_failure() {
        let registry = ViewRegistry::new();
        let driver = Driver::new(MockRemote::new());

        let err = registry.instantiate("Settings", &driver).unwrap_err();
        assert!(matches!(
            err,
            Error::ConstructionFailure { ref view, .. } if view == "Settings"
        ));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_instances_share_the_session() {
        let driver = Driver::new(MockRemote::new());
        let first = instantiate::<Login>(&driver);
        let second = driver.view::<Login>();

        assert!(std::sync::Arc::ptr_eq(&first.driver.inner, &second.driver.inner));
        assert!(first.actions().is_empty());
    }

    #[test]
    fn test_registry_debug_lists_names() {
        let mut registry = ViewRegistry::new();
        registry.register::<Login>();
        registry.register::<Home>();
        assert_eq!(format!("{registry:?}"), r#"{"Home", "Login"}"#);
    }
}
