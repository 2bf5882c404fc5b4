//! What to do when an order ID arrives a second time.

use std::str::FromStr;

/// Handling of a second notification for an order ID that is already stored.
///
/// Notifications are delivered at least once, so the same order routinely
/// arrives twice with the same payload. Both policies accept that case.
/// They differ only when the payload changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DuplicatePolicy {
    /// The latest notification replaces the stored order.
    #[default]
    Overwrite,

    /// A different payload for a stored order ID is refused with
    /// [`OrderError::Conflict`](super::OrderError::Conflict). An identical
    /// payload is accepted and nothing is written.
    RejectConflict,
}

impl DuplicatePolicy {
    /// Returns the configuration name of the policy.
    pub fn as_str(&self) -> &'static str {
        match self {
            DuplicatePolicy::Overwrite => "overwrite",
            DuplicatePolicy::RejectConflict => "reject",
        }
    }
}

impl std::fmt::Display for DuplicatePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown duplicate policy name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown duplicate policy: {0} (expected \"overwrite\" or \"reject\")")]
pub struct UnknownDuplicatePolicy(pub String);

impl FromStr for DuplicatePolicy {
    type Err = UnknownDuplicatePolicy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "overwrite" => Ok(DuplicatePolicy::Overwrite),
            "reject" | "reject_conflict" | "reject-conflict" => Ok(DuplicatePolicy::RejectConflict),
            _ => Err(UnknownDuplicatePolicy(s.to_string())),
        }
    }
}
