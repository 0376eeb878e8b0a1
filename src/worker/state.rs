//! Worker lifecycle state

use std::fmt;

/// Lifecycle phase of an offline worker
///
/// `Pending -> Installing -> Installed -> Activating -> Active`, or
/// `Installing -> Redundant` when precaching fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Pending,
    Installing,
    Installed,
    Activating,
    Active,
    Redundant,
}

impl WorkerState {
    /// Whether fetch events are intercepted in this state
    pub fn is_serving(&self) -> bool {
        matches!(self, Self::Active)
    }

    pub fn can_install(&self) -> bool {
        matches!(self, Self::Pending)
    }

    pub fn can_activate(&self) -> bool {
        matches!(self, Self::Installed)
    }
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Installing => write!(f, "installing"),
            Self::Installed => write!(f, "installed"),
            Self::Activating => write!(f, "activating"),
            Self::Active => write!(f, "active"),
            Self::Redundant => write!(f, "redundant"),
        }
    }
}
