use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier for a participant of a shared event.
///
/// Identifiers are totally ordered; every helper and solver iterates
/// participants in this order so that results are reproducible.
///
/// # Examples
///
/// ```
/// use settlement_optimizer::core::participant::ParticipantId;
///
/// let alice = ParticipantId::new("alice");
/// let bob = ParticipantId::new("bob");
/// assert!(alice < bob);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(String);

impl ParticipantId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the string representation of this participant ID.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ParticipantId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ParticipantId {
    fn from(s: String) -> Self {
        Self(s)
    }
}
