//! Transition table for the scan session
//!
//! Pure function of (mode, trigger). Side effects live in
//! [`ScanSession`](crate::ScanSession); this table only decides where to go.
//!
//! | From    | Trigger        | To      |
//! |---------|----------------|---------|
//! | Pending | Start          | Active  |
//! | Active  | ScanAccepted   | Success |
//! | Active  | ScanRejected   | Error   |
//! | Active  | CaptureFailed  | Error   |
//! | Active  | Cancel         | Pending |
//! | Success | Reset          | Pending |
//! | Error   | Reset          | Pending |
//!
//! Every other pair leaves the mode unchanged.

use crate::mode::ScanMode;
use serde::{Deserialize, Serialize};
use std::fmt;

/// What drove a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trigger {
    /// Operator pressed start
    Start,
    /// Operator cancelled a running capture
    Cancel,
    /// Operator reset after success or error
    Reset,
    /// Decoded payload parsed
    ScanAccepted,
    /// Decoded payload failed to parse
    ScanRejected,
    /// Camera/decoder fault, including failure to activate
    CaptureFailed,
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Trigger::Start => "start",
            Trigger::Cancel => "cancel",
            Trigger::Reset => "reset",
            Trigger::ScanAccepted => "scan_accepted",
            Trigger::ScanRejected => "scan_rejected",
            Trigger::CaptureFailed => "capture_failed",
        };
        f.write_str(name)
    }
}

/// Next mode, or `None` when the trigger means nothing in this mode
pub fn next_mode(mode: ScanMode, trigger: Trigger) -> Option<ScanMode> {
    use ScanMode::*;
    use Trigger::*;

    match (mode, trigger) {
        (Pending, Start) => Some(Active),
        (Active, ScanAccepted) => Some(Success),
        (Active, ScanRejected) | (Active, CaptureFailed) => Some(Error),
        (Active, Cancel) => Some(Pending),
        (Success, Reset) | (Error, Reset) => Some(Pending),
        _ => None,
    }
}

/// Total form of [`next_mode`]: ignored triggers keep the current mode
pub fn step(mode: ScanMode, trigger: Trigger) -> ScanMode {
    next_mode(mode, trigger).unwrap_or(mode)
}

/// Fold a trigger sequence from `initial`
pub fn replay(initial: ScanMode, triggers: &[Trigger]) -> ScanMode {
    triggers.iter().fold(initial, |mode, t| step(mode, *t))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_MODES: [ScanMode; 4] = [
        ScanMode::Pending,
        ScanMode::Active,
        ScanMode::Success,
        ScanMode::Error,
    ];

    const ALL_TRIGGERS: [Trigger; 6] = [
        Trigger::Start,
        Trigger::Cancel,
        Trigger::Reset,
        Trigger::ScanAccepted,
        Trigger::ScanRejected,
        Trigger::CaptureFailed,
    ];

    #[test]
    fn test_defined_transitions() {
        assert_eq!(next_mode(ScanMode::Pending, Trigger::Start), Some(ScanMode::Active));
        assert_eq!(next_mode(ScanMode::Active, Trigger::ScanAccepted), Some(ScanMode::Success));
        assert_eq!(next_mode(ScanMode::Active, Trigger::ScanRejected), Some(ScanMode::Error));
        assert_eq!(next_mode(ScanMode::Active, Trigger::CaptureFailed), Some(ScanMode::Error));
        assert_eq!(next_mode(ScanMode::Active, Trigger::Cancel), Some(ScanMode::Pending));
        assert_eq!(next_mode(ScanMode::Success, Trigger::Reset), Some(ScanMode::Pending));
        assert_eq!(next_mode(ScanMode::Error, Trigger::Reset), Some(ScanMode::Pending));
    }

    #[test]
    fn test_table_has_exactly_seven_edges() {
        let edges = ALL_MODES
            .iter()
            .flat_map(|m| ALL_TRIGGERS.iter().map(move |t| (*m, *t)))
            .filter(|(m, t)| next_mode(*m, *t).is_some())
            .count();
        assert_eq!(edges, 7);
    }

    #[test]
    fn test_start_outside_pending_is_ignored() {
        for mode in [ScanMode::Active, ScanMode::Success, ScanMode::Error] {
            assert_eq!(step(mode, Trigger::Start), mode);
        }
    }

    #[test]
    fn test_scan_results_outside_active_are_ignored() {
        for mode in [ScanMode::Pending, ScanMode::Success, ScanMode::Error] {
            assert_eq!(step(mode, Trigger::ScanAccepted), mode);
            assert_eq!(step(mode, Trigger::ScanRejected), mode);
            assert_eq!(step(mode, Trigger::CaptureFailed), mode);
        }
    }

    #[test]
    fn test_replay() {
        let seq = [
            Trigger::Start,
            Trigger::CaptureFailed,
            Trigger::Start,
            Trigger::Reset,
            Trigger::Start,
            Trigger::ScanAccepted,
        ];
        assert_eq!(replay(ScanMode::Pending, &seq), ScanMode::Success);
    }
}
