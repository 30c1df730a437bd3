// Copyright 2026 Dissent Contributors.
//
// This file is licensed under the GNU General Public License v3.0 or later
// <https://www.gnu.org/licenses/gpl-3.0.html>. This file may not be copied,
// modified, or distributed except according to that license.

//! The join -> round -> send cycle (spec.md §4.1, §4.2), grounded on
//! `examples/original_source/src/Anonymity/Sessions/Session.hpp`+`.cpp`
//! and `SessionLeader.hpp`+`.cpp`.

pub mod group_holder;
pub mod scheduler;
pub mod session;
pub mod session_leader;

pub use group_holder::GroupHolder;
pub use scheduler::{ManualScheduler, Scheduler, TimerToken, TokioScheduler};
pub use session::{PrepareOutcome, PrepareRequest, Session};
pub use session_leader::SessionLeader;

/// The smallest roster size a round may run with (spec.md §4.7).
pub const MINIMUM_ROUND_SIZE: usize = 3;
