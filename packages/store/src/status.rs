//! Project and invoice status values.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A status string that is not part of any known progression.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("unknown status `{0}`")]
pub struct UnknownStatus(pub String);

/// Attempted status change that skips ahead or moves backwards.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("cannot move a project from `{from}` to `{to}`")]
pub struct InvalidTransition {
    pub from: ProjectStatus,
    pub to: ProjectStatus,
}

/// Project lifecycle. Projects move forward one step at a time:
/// `proposal → contract → invoiced → paid → complete`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    Proposal,
    Contract,
    Invoiced,
    Paid,
    Complete,
}

impl ProjectStatus {
    pub const ALL: [ProjectStatus; 5] = [
        ProjectStatus::Proposal,
        ProjectStatus::Contract,
        ProjectStatus::Invoiced,
        ProjectStatus::Paid,
        ProjectStatus::Complete,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::Proposal => "proposal",
            ProjectStatus::Contract => "contract",
            ProjectStatus::Invoiced => "invoiced",
            ProjectStatus::Paid => "paid",
            ProjectStatus::Complete => "complete",
        }
    }

    /// The next status in the progression, or `None` from `complete`.
    pub fn next(&self) -> Option<ProjectStatus> {
        match self {
            ProjectStatus::Proposal => Some(ProjectStatus::Contract),
            ProjectStatus::Contract => Some(ProjectStatus::Invoiced),
            ProjectStatus::Invoiced => Some(ProjectStatus::Paid),
            ProjectStatus::Paid => Some(ProjectStatus::Complete),
            ProjectStatus::Complete => None,
        }
    }

    /// Validate a forward step. Anything but the immediate successor is
    /// rejected; the caller's state stays as it was.
    pub fn advance_to(self, to: ProjectStatus) -> Result<ProjectStatus, InvalidTransition> {
        if can_advance(self, to) {
            Ok(to)
        } else {
            Err(InvalidTransition { from: self, to })
        }
    }
}

/// Whether `next` is the immediate successor of `current`.
pub fn can_advance(current: ProjectStatus, next: ProjectStatus) -> bool {
    current.next() == Some(next)
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProjectStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "proposal" => Ok(ProjectStatus::Proposal),
            "contract" => Ok(ProjectStatus::Contract),
            "invoiced" => Ok(ProjectStatus::Invoiced),
            "paid" => Ok(ProjectStatus::Paid),
            "complete" => Ok(ProjectStatus::Complete),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// Whether an invoice has gone out to the client.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentStatus {
    #[default]
    Unsent,
    Sent,
}

impl SentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SentStatus::Unsent => "unsent",
            SentStatus::Sent => "sent",
        }
    }
}

impl fmt::Display for SentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SentStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unsent" => Ok(SentStatus::Unsent),
            "sent" => Ok(SentStatus::Sent),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// How much of an invoice has been paid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaidStatus {
    #[default]
    Unpaid,
    Partial,
    Paid,
}

impl PaidStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaidStatus::Unpaid => "unpaid",
            PaidStatus::Partial => "partial",
            PaidStatus::Paid => "paid",
        }
    }
}

impl fmt::Display for PaidStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaidStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unpaid" => Ok(PaidStatus::Unpaid),
            "partial" => Ok(PaidStatus::Partial),
            "paid" => Ok(PaidStatus::Paid),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_the_immediate_successor_is_reachable() {
        assert!(can_advance(ProjectStatus::Proposal, ProjectStatus::Contract));
        assert!(can_advance(ProjectStatus::Contract, ProjectStatus::Invoiced));
        assert!(can_advance(ProjectStatus::Invoiced, ProjectStatus::Paid));
        assert!(can_advance(ProjectStatus::Paid, ProjectStatus::Complete));

        // No going backwards, no skipping, no self-transition.
        assert!(!can_advance(ProjectStatus::Paid, ProjectStatus::Proposal));
        assert!(!can_advance(ProjectStatus::Contract, ProjectStatus::Paid));
        assert!(!can_advance(ProjectStatus::Invoiced, ProjectStatus::Invoiced));
        assert!(!can_advance(ProjectStatus::Complete, ProjectStatus::Proposal));
    }

    #[test]
    fn advance_to_reports_the_offending_pair() {
        let err = ProjectStatus::Contract.advance_to(ProjectStatus::Paid).unwrap_err();
        assert_eq!(err.from, ProjectStatus::Contract);
        assert_eq!(err.to, ProjectStatus::Paid);
        assert_eq!(err.to_string(), "cannot move a project from `contract` to `paid`");

        assert_eq!(
            ProjectStatus::Proposal.advance_to(ProjectStatus::Contract),
            Ok(ProjectStatus::Contract)
        );
    }

    #[test]
    fn statuses_round_trip_through_their_strings() {
        for status in ProjectStatus::ALL {
            assert_eq!(status.as_str().parse::<ProjectStatus>(), Ok(status));
        }
        assert_eq!("sent".parse::<SentStatus>(), Ok(SentStatus::Sent));
        assert_eq!("partial".parse::<PaidStatus>(), Ok(PaidStatus::Partial));
        assert!("done".parse::<ProjectStatus>().is_err());
    }
}
