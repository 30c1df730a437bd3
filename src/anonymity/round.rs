// Copyright 2026 Dissent Contributors.
//
// This file is licensed under the GNU General Public License v3.0 or later
// <https://www.gnu.org/licenses/gpl-3.0.html>. This file may not be copied,
// modified, or distributed except according to that license.

//! `Round`: one execution of the anonymous-exchange protocol (spec.md
//! §3, §4.1, §4.2, §5). Grounded on SPEC_FULL.md §3's sum-type Design
//! Note: the original's round class hierarchy collapses into one
//! envelope carrying a closed `RoundKind` tag, since only the
//! lifecycle/bookkeeping shared by every round variant is in scope here
//! (the shuffling/DC-net algorithms themselves are Non-goals).

use crate::identity::{group::Group, Id};

/// A round's lifecycle state, transitioning monotonically
/// `Created -> Started -> Stopped` (spec.md §3).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RoundState {
    Created,
    Started,
    Stopped,
}

/// Which anonymous-exchange protocol this round instance runs. Only the
/// tag and its phase/slot numbering are modeled here (spec.md §9 Open
/// Question 3: "reimplementations must fix the binding at the round
/// interface"); the cryptographic body of each kind is a Non-goal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RoundKind {
    /// A single-phase, single-slot round (e.g. a trivial shuffle).
    Plain,
    /// A round whose corrupted slots trigger the blame sub-protocol
    /// (spec.md §4.5); owns the phase/slot numbering that
    /// `AlibiData`/`MessageHistory` are indexed by.
    Tolerant { phase_count: u32, slot_count: u32 },
}

impl RoundKind {
    /// The `(phase, slot)` pairs this round kind will drive its
    /// tolerant-round bookkeeping with, in order. Empty for `Plain`.
    pub fn phase_slot_pairs(&self) -> Vec<(u32, u32)> {
        match self {
            RoundKind::Plain => Vec::new(),
            RoundKind::Tolerant {
                phase_count,
                slot_count,
            } => (0..*phase_count)
                .flat_map(|phase| (0..*slot_count).map(move |slot| (phase, slot)))
                .collect(),
        }
    }
}

/// Why a round stopped, carried on its terminal transition (spec.md §7
/// "round abort").
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StopReason {
    Finished,
    SessionStopped,
    Interrupted,
    BadMembers(Vec<Id>),
    Other(String),
}

/// `(round_id, group, local identity, started, stopped, successful, stop
/// reason, bad-member list, interrupted flag)` (spec.md §3). The
/// network and data-provider callback the original carries are supplied
/// at the call site instead of stored on the envelope, since they are
/// Non-goal externalities (`net`/`session` own them).
pub struct Round {
    pub round_id: Id,
    pub kind: RoundKind,
    pub group: Group,
    pub local_id: Id,
    state: RoundState,
    successful: bool,
    stop_reason: Option<StopReason>,
    bad_members: Vec<Id>,
    interrupted: bool,
}

impl Round {
    pub fn new(round_id: Id, kind: RoundKind, group: Group, local_id: Id) -> Self {
        Round {
            round_id,
            kind,
            group,
            local_id,
            state: RoundState::Created,
            successful: false,
            stop_reason: None,
            bad_members: Vec::new(),
            interrupted: false,
        }
    }

    pub fn state(&self) -> RoundState {
        self.state
    }

    pub fn is_started(&self) -> bool {
        self.state == RoundState::Started
    }

    pub fn is_stopped(&self) -> bool {
        self.state == RoundState::Stopped
    }

    pub fn successful(&self) -> bool {
        self.successful
    }

    pub fn stop_reason(&self) -> Option<&StopReason> {
        self.stop_reason.as_ref()
    }

    pub fn bad_members(&self) -> &[Id] {
        &self.bad_members
    }

    /// `Created -> Started`. A no-op (returns `false`) if the round is
    /// not in `Created`.
    pub fn start(&mut self) -> bool {
        if self.state != RoundState::Created {
            return false;
        }
        self.state = RoundState::Started;
        true
    }

    /// Names members as having deviated (spec.md §4.5's blame
    /// sub-protocol outcome); they are removed from the group by the
    /// session on round completion, not here.
    pub fn accuse(&mut self, member: Id) {
        if !self.bad_members.contains(&member) {
            self.bad_members.push(member);
        }
    }

    /// The single terminal `-> Stopped` transition (spec.md §3: "exactly
    /// one terminal transition emits a finished notification"). A no-op
    /// if already stopped.
    pub fn stop(&mut self, reason: StopReason, successful: bool) -> bool {
        if self.state == RoundState::Stopped {
            return false;
        }
        self.interrupted = matches!(reason, StopReason::Interrupted);
        self.stop_reason = Some(reason);
        self.successful = successful;
        self.state = RoundState::Stopped;
        true
    }

    pub fn interrupted(&self) -> bool {
        self.interrupted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::group::SubgroupPolicy;

    fn round() -> Round {
        let group = Group::new(vec![], Id::ZERO, SubgroupPolicy::CompleteGroup);
        Round::new(Id::from_counter(1), RoundKind::Plain, group, Id::from_counter(2))
    }

    #[test]
    fn lifecycle_is_monotonic_created_started_stopped() {
        let mut round = round();
        assert_eq!(round.state(), RoundState::Created);
        assert!(round.start());
        assert_eq!(round.state(), RoundState::Started);
        assert!(round.stop(StopReason::Finished, true));
        assert_eq!(round.state(), RoundState::Stopped);
        // starting a stopped round is a no-op
        assert!(!round.start());
    }

    #[test]
    fn only_the_first_stop_is_recorded() {
        let mut round = round();
        assert!(round.stop(StopReason::SessionStopped, false));
        assert!(!round.stop(StopReason::Finished, true));
        assert_eq!(round.stop_reason(), Some(&StopReason::SessionStopped));
        assert!(!round.successful());
    }

    #[test]
    fn tolerant_round_enumerates_every_phase_slot_pair() {
        let kind = RoundKind::Tolerant {
            phase_count: 2,
            slot_count: 3,
        };
        assert_eq!(kind.phase_slot_pairs().len(), 6);
    }

    #[test]
    fn accuse_does_not_duplicate_a_member() {
        let mut round = round();
        let bad = Id::from_counter(9);
        round.accuse(bad);
        round.accuse(bad);
        assert_eq!(round.bad_members(), &[bad]);
    }
}
