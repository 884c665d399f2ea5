//! Propagation modes
//!
//! A propagation mode decides, from the ambient transaction status, whether
//! a unit of work joins the current transaction, runs in a fresh one, or
//! runs with no transaction at all.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Transaction-boundary strategy for one invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Propagation {
    /// Join the active transaction, or begin one if none exists
    #[default]
    Required,
    /// Always begin a fresh transaction, suspending any active one
    RequiresNew,
    /// Join the active transaction; fail if none exists
    Mandatory,
    /// Run without a transaction; fail if one exists
    Never,
    /// Run without a transaction, suspending any active one
    NotSupported,
    /// Join the active transaction if there is one, otherwise run without
    Supports,
}

impl Propagation {
    /// All modes
    pub const ALL: [Propagation; 6] = [
        Propagation::Required,
        Propagation::RequiresNew,
        Propagation::Mandatory,
        Propagation::Never,
        Propagation::NotSupported,
        Propagation::Supports,
    ];

    /// Canonical snake_case name
    pub fn name(self) -> &'static str {
        match self {
            Propagation::Required => "required",
            Propagation::RequiresNew => "requires_new",
            Propagation::Mandatory => "mandatory",
            Propagation::Never => "never",
            Propagation::NotSupported => "not_supported",
            Propagation::Supports => "supports",
        }
    }
}

impl fmt::Display for Propagation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when parsing an unknown propagation name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown propagation '{0}'")]
pub struct ParsePropagationError(pub String);

impl FromStr for Propagation {
    type Err = ParsePropagationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Propagation::ALL
            .iter()
            .copied()
            .find(|p| p.name() == s)
            .ok_or_else(|| ParsePropagationError(s.to_string()))
    }
}
