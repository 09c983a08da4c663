//! Type-safe identifiers for remote UI entities.
//!
//! The remote driver hands out opaque references for the native elements it
//! finds. Wrapping them keeps them from being confused with selector
//! expressions or text.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

// ============================================================================
// ElementId
// ============================================================================

/// Opaque reference to one native element, as issued by the remote driver.
///
/// Cheap to clone.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(Arc<str>);

impl ElementId {
    /// Wraps a native element reference.
    #[inline]
    #[must_use]
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(Arc::from(id.as_ref()))
    }

    /// Generates a fresh random reference.
    #[inline]
    #[must_use]
    pub fn generate() -> Self {
        Self::new(uuid::Uuid::new_v4().to_string())
    }

    /// Returns the reference as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ElementId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ElementId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_id_display() {
        let id = ElementId::new("00000000-0000-0000-0000-000000000001");
        assert_eq!(id.to_string(), "00000000-0000-0000-0000-000000000001");
        assert_eq!(id.as_str(), "00000000-0000-0000-0000-000000000001");
    }

    #[test]
    fn test_generated_ids_are_unique() {
        assert_ne!(ElementId::generate(), ElementId::generate());
    }

    #[test]
    fn test_serde_transparent() {
        let id = ElementId::new("abc");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"abc\"");
        let back: ElementId = serde_json::from_str("\"abc\"").unwrap();
        assert_eq!(back, id);
    }
}
