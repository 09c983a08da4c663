//! Builder pattern for driver configuration.
//!
//! Provides a fluent API for configuring and creating [`Driver`] instances.
//!
//! # Example
//!
//! ```ignore
//! use vom::{Driver, Options, Selector};
//!
//! let driver = Driver::builder()
//!     .remote(session)
//!     .options(Options::from_json(&config_text)?)
//!     .on_selector_load(|selector: Selector| match selector {
//!         Selector::Id(id) => Selector::id(format!("com.example:id/{id}")),
//!         other => other,
//!     })
//!     .view::<LoginView>()
//!     .view::<HomeView>()
//!     .build()?;
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::page::SelectorRewrite;
use crate::page::view::{NewView, ViewRegistry};
use crate::remote::RemoteDriver;

use super::core::Driver;
use super::options::Options;

// ============================================================================
// DriverBuilder
// ============================================================================

/// Builder for configuring a [`Driver`] instance.
///
/// Use [`Driver::builder()`] to create a new builder.
#[derive(Default, Clone)]
pub struct DriverBuilder {
    /// Session capability.
    remote: Option<Arc<dyn RemoteDriver>>,
    /// Driver options.
    options: Options,
    /// Selector rewrite hook.
    rewrite: Option<Arc<dyn SelectorRewrite>>,
    /// Views constructible by name.
    views: ViewRegistry,
}

impl fmt::Debug for DriverBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DriverBuilder")
            .field("remote", &self.remote.is_some())
            .field("options", &self.options)
            .field("rewrite", &self.rewrite.is_some())
            .field("views", &self.views)
            .finish()
    }
}

// ============================================================================
// DriverBuilder Implementation
// ============================================================================

impl DriverBuilder {
    /// Creates a new driver builder with no configuration.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the remote driver session.
    #[inline]
    #[must_use]
    pub fn remote(mut self, remote: impl RemoteDriver + 'static) -> Self {
        self.remote = Some(Arc::new(remote));
        self
    }

    /// Sets an already shared remote driver session.
    #[inline]
    #[must_use]
    pub fn remote_arc(mut self, remote: Arc<dyn RemoteDriver>) -> Self {
        self.remote = Some(remote);
        self
    }

    /// Replaces the driver options.
    #[inline]
    #[must_use]
    pub fn options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    /// Registers the selector rewrite hook. A later call replaces it.
    #[inline]
    #[must_use]
    pub fn on_selector_load(mut self, hook: impl SelectorRewrite + 'static) -> Self {
        self.rewrite = Some(Arc::new(hook));
        self
    }

    /// Registers `V` under its type name.
    #[inline]
    #[must_use]
    pub fn view<V: NewView>(mut self) -> Self {
        self.views.register::<V>();
        self
    }

    /// Registers `V` under `name`.
    #[inline]
    #[must_use]
    pub fn view_as<V: NewView>(mut self, name: impl Into<String>) -> Self {
        self.views.register_as::<V>(name);
        self
    }

    /// Builds the driver with validation.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if no remote driver was set
    /// - [`Error::Config`] if the options are invalid
    pub fn build(self) -> Result<Driver> {
        let remote = self.remote.ok_or_else(|| {
            Error::config(
                "Remote driver is required. Use .remote() to set it.\n\
                 Example: Driver::builder().remote(session)",
            )
        })?;

        self.options.validate()?;

        Ok(Driver::from_parts(
            remote,
            self.options,
            self.rewrite,
            self.views,
        ))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Duration;

    use crate::page::{ActionTable, Selector, View};
    use crate::testing::MockRemote;

    struct Splash {
        driver: Driver,
    }

    impl View for Splash {
        fn driver(&self) -> &Driver {
            &self.driver
        }

        fn actions(&self) -> &ActionTable {
            ActionTable::empty()
        }
    }

    impl NewView for Splash {
        fn new(driver: Driver) -> Self {
            Self { driver }
        }
    }

    #[test]
    fn test_new_creates_empty_builder() {
        let builder = DriverBuilder::new();
        assert!(builder.remote.is_none());
        assert!(builder.rewrite.is_none());
        assert!(builder.views.is_empty());
        assert_eq!(builder.options, Options::new());
    }

    #[test]
    fn test_build_fails_without_remote() {
        let err = DriverBuilder::new().build().unwrap_err();
        assert!(err.to_string().contains("Remote driver"));
    }

    #[test]
    fn test_build_fails_with_zero_poll_interval() {
        let err = DriverBuilder::new()
            .remote(MockRemote::new())
            .options(Options::new().with_poll_interval(Duration::ZERO))
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn test_build_keeps_configuration() {
        let driver = DriverBuilder::new()
            .remote(MockRemote::new())
            .options(Options::new().with_drag_duration(Duration::from_millis(40)))
            .on_selector_load(|s: Selector| s)
            .view::<Splash>()
            .view_as::<Splash>("Start")
            .build()
            .unwrap();

        assert_eq!(driver.options().drag_duration(), Duration::from_millis(40));
        assert!(driver.views().contains("Splash"));
        assert!(driver.views().contains("Start"));
        assert!(driver.inner.rewrite.is_some());
    }

    #[test]
    fn test_builder_is_clone() {
        let builder = DriverBuilder::new().remote(MockRemote::new());
        let cloned = builder.clone();
        assert!(cloned.remote.is_some());
    }
}
