//! Application status lifecycle.
//!
//! `TRANSITIONS` lists every legal status change. Display labels and the
//! withdrawal rule sit beside it and are served by the dictionary endpoint.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ApplicationStatus {
    Applied,
    Shortlisted,
    OnHold,
    Rejected,
    Selected,
}

/// Legal `(from, to)` edges. Anything absent is rejected.
pub const TRANSITIONS: &[(ApplicationStatus, ApplicationStatus)] = &[
    (ApplicationStatus::Applied, ApplicationStatus::Shortlisted),
    (ApplicationStatus::Applied, ApplicationStatus::OnHold),
    (ApplicationStatus::Applied, ApplicationStatus::Rejected),
    (ApplicationStatus::Shortlisted, ApplicationStatus::Selected),
    (ApplicationStatus::Shortlisted, ApplicationStatus::Rejected),
    (ApplicationStatus::OnHold, ApplicationStatus::Shortlisted),
    (ApplicationStatus::OnHold, ApplicationStatus::Rejected),
];

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 5] = [
        ApplicationStatus::Applied,
        ApplicationStatus::Shortlisted,
        ApplicationStatus::OnHold,
        ApplicationStatus::Rejected,
        ApplicationStatus::Selected,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            ApplicationStatus::Applied => "applied",
            ApplicationStatus::Shortlisted => "shortlisted",
            ApplicationStatus::OnHold => "on-hold",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::Selected => "selected",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Applied => "Applied",
            ApplicationStatus::Shortlisted => "Shortlisted",
            ApplicationStatus::OnHold => "On Hold",
            ApplicationStatus::Rejected => "Rejected",
            ApplicationStatus::Selected => "Selected",
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            ApplicationStatus::Rejected | ApplicationStatus::Selected
        )
    }

    /// Candidates may pull out only while no decision has been taken.
    pub const fn can_withdraw(self) -> bool {
        matches!(self, ApplicationStatus::Applied | ApplicationStatus::OnHold)
    }

    pub fn can_transition_to(self, target: ApplicationStatus) -> bool {
        TRANSITIONS
            .iter()
            .any(|&(from, to)| from == self && to == target)
    }

    pub fn successors(self) -> Vec<ApplicationStatus> {
        TRANSITIONS
            .iter()
            .filter(|(from, _)| *from == self)
            .map(|&(_, to)| to)
            .collect()
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApplicationStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        ApplicationStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| Error::Validation(format!("Unknown application status: '{}'", s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states_have_no_successors() {
        for status in ApplicationStatus::ALL {
            if status.is_terminal() {
                assert!(status.successors().is_empty(), "{status} should be terminal");
            }
        }
    }

    #[test]
    fn nothing_leads_back_to_applied() {
        for status in ApplicationStatus::ALL {
            assert!(!status.can_transition_to(ApplicationStatus::Applied));
        }
    }

    #[test]
    fn on_hold_cannot_be_selected_directly() {
        assert!(!ApplicationStatus::OnHold.can_transition_to(ApplicationStatus::Selected));
        assert!(ApplicationStatus::OnHold.can_transition_to(ApplicationStatus::Shortlisted));
    }

    #[test]
    fn withdrawal_only_before_a_decision() {
        let withdrawable: Vec<_> = ApplicationStatus::ALL
            .into_iter()
            .filter(|s| s.can_withdraw())
            .collect();
        assert_eq!(
            withdrawable,
            vec![ApplicationStatus::Applied, ApplicationStatus::OnHold]
        );
    }

    #[test]
    fn parses_wire_names_and_underscore_variant() {
        assert_eq!(
            "on-hold".parse::<ApplicationStatus>().unwrap(),
            ApplicationStatus::OnHold
        );
        assert_eq!(
            "ON_HOLD".parse::<ApplicationStatus>().unwrap(),
            ApplicationStatus::OnHold
        );
        let err = "hired".parse::<ApplicationStatus>().unwrap_err();
        assert_eq!(err.code(), "validation_error");
    }

    #[test]
    fn serde_uses_kebab_case() {
        let json = serde_json::to_string(&ApplicationStatus::OnHold).unwrap();
        assert_eq!(json, "\"on-hold\"");
    }
}
