//! Status transition policies.
//!
//! The default policy is a flat relabeling: every state may move to every
//! other state, including itself. `Guarded` restricts moves to the forward
//! triage path and treats `RESOLVED`/`REJECTED` as terminal.

use crate::model::complaint::ComplaintStatus;
use std::fmt::{Display, Formatter};

/// Which status moves the lifecycle engine accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusTransitionPolicy {
    /// Complete transition graph.
    #[default]
    Unrestricted,
    /// Forward-only triage with terminal outcomes.
    Guarded,
}

impl StatusTransitionPolicy {
    /// Returns whether `from -> to` is accepted under this policy.
    pub fn allows(self, from: ComplaintStatus, to: ComplaintStatus) -> bool {
        use ComplaintStatus::{InProgress, Pending, Rejected, Resolved};

        match self {
            Self::Unrestricted => true,
            Self::Guarded => {
                from == to
                    || matches!(
                        (from, to),
                        (Pending, InProgress)
                            | (Pending, Rejected)
                            | (InProgress, Resolved)
                            | (InProgress, Rejected)
                    )
            }
        }
    }

    /// Parses `unrestricted|guarded`, case-insensitive.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "unrestricted" | "flat" => Some(Self::Unrestricted),
            "guarded" | "strict" => Some(Self::Guarded),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unrestricted => "unrestricted",
            Self::Guarded => "guarded",
        }
    }
}

impl Display for StatusTransitionPolicy {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
