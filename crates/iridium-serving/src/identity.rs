//! Opaque caller identity.
//!
//! The transport layer resolves request tokens; the serving core only ever
//! receives the resulting label and uses it in log fields. Credentials never
//! reach this crate.

use serde::{Deserialize, Serialize};

/// A caller identity label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity(String);

impl Identity {
    /// Wraps a resolved identity label. Blank labels collapse to
    /// `anonymous`.
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        let label = label.into();
        if label.trim().is_empty() { Self::anonymous() } else { Self(label) }
    }

    /// The identity used when the transport layer supplies none.
    #[must_use]
    pub fn anonymous() -> Self {
        Self("anonymous".to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}
