//! View Object Model - typed page objects for UI test automation.
//!
//! This library sits between test code and a remote UI driver (Appium, a W3C
//! WebDriver session, or anything implementing [`RemoteDriver`]). Tests talk
//! to typed views; views declare selector-bound actions; the engine resolves
//! selectors with bounded polling and dispatches the native interaction.
//!
//! # Architecture
//!
//! - **[`Driver`]**: one per session, owns the remote driver, wait budgets,
//!   the selector rewrite hook and the view registry
//! - **[`Element`]**: handle to one resolved element, with focus-aware
//!   actions, geometry and color sampling
//! - **[`View`]**: page object for one screen, built fresh on every
//!   navigation
//! - **[`ActionTable`]**: declarations dispatched by one generic routine
//!
//! # Quick Start
//!
//! ```ignore
//! use vom::{ActionInput, Driver, Result, Selector, ViewExt};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let driver = Driver::builder()
//!         .remote(appium_session)
//!         .view::<LoginView>()
//!         .view::<HomeView>()
//!         .build()?;
//!
//!     let login = driver.view::<LoginView>();
//!     login.perform("username", ActionInput::text("alice")).await?;
//!     let home: HomeView = login.perform_view("submit", ActionInput::None).await?;
//!     let title: String = home.perform_into("title", ActionInput::None).await?;
//!     println!("Landed on {title}");
//!
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`color`] | Screenshot decoding and color sampling |
//! | [`driver`] | Driver facade, builder, options and resolution |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`geometry`] | Points, sizes and rectangles |
//! | [`identifiers`] | Native element references |
//! | [`page`] | Selectors, elements, views and actions |
//! | [`remote`] | The [`RemoteDriver`] capability |
//! | [`testing`] | In-memory remote driver |

// ============================================================================
// Modules
// ============================================================================

/// Screenshot decoding and color sampling.
pub mod color;

/// Driver facade and configuration.
///
/// Use [`Driver::builder()`] to create a configured driver instance.
pub mod driver;

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Screen geometry.
pub mod geometry;

/// Type-safe identifiers.
pub mod identifiers;

/// Page object layer: selectors, elements, views, actions.
pub mod page;

/// Remote UI driver capability.
pub mod remote;

/// Scripted in-memory [`RemoteDriver`] for tests.
pub mod testing;

// ============================================================================
// Re-exports
// ============================================================================

// Driver types
pub use driver::{Driver, DriverBuilder, Options};

// Error types
pub use error::{Error, Result};

// Page types
pub use page::{
    ActionInput, ActionKind, ActionOutput, ActionSpec, ActionTable, DataKind, Declared, Element,
    FromActionOutput, NewView, ReturnKind, Selector, SelectorRewrite, View, ViewExt, ViewFactory,
    ViewRegistry, WaitUntil,
};

// Value types
pub use color::Rgb;
pub use geometry::{Point, Rect, Size};
pub use identifiers::ElementId;

// Remote driver
pub use remote::{RemoteDriver, Scope};
