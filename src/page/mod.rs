//! Page object layer.
//!
//! This module contains the types page objects are written with:
//!
//! - [`Selector`] - Locator strategy plus expression
//! - [`Element`] - Handle to one resolved on-screen element
//! - [`View`] - Typed page object for one logical screen
//! - [`ActionTable`] - Declarative, selector-bound actions of a view

// ============================================================================
// Submodules
// ============================================================================

/// Declarative actions and their dispatch.
pub mod action;

/// Resolved element handle.
pub mod element;

/// Element locator strategies.
pub mod selector;

/// Page objects, factories and the name registry.
pub mod view;

// ============================================================================
// Re-exports
// ============================================================================

pub use action::{
    ActionInput, ActionKind, ActionOutput, ActionSpec, ActionTable, DataKind, Declared,
    FromActionOutput, ReturnKind, WaitUntil,
};
pub use element::Element;
pub use selector::{Selector, SelectorRewrite};
pub use view::{NewView, View, ViewExt, ViewFactory, ViewRegistry};
