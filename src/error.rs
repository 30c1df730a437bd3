// Copyright 2026 Dissent Contributors.
//
// This file is licensed under the GNU General Public License v3.0 or later
// <https://www.gnu.org/licenses/gpl-3.0.html>. This file may not be copied,
// modified, or distributed except according to that license.

//! Crate-wide error type.
//!
//! One variant per error category, each carrying enough context to
//! reconstruct the log line that reported it. Leaf modules with a handful
//! of purely local failure modes (`messaging::entry_log`,
//! `anonymity::tolerant::accusation`) define their own small error enum and
//! convert into this one via `#[from]` at the boundary, e.g.
//! `convert_bincode_error` below.

use crate::identity::Id;
use thiserror::Error;

/// A specialised `Result` type for the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the crate.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// A handler rejected a message as malformed, stale, or from a
    /// non-member sender. Logged and dropped; the sender is not
    /// disconnected (spec.md §7.1).
    #[error("protocol violation from {sender}: {reason}")]
    ProtocolViolation { sender: Id, reason: String },

    /// A signature or other cryptographic check failed. Fatal for the
    /// handshake in progress; the peer is not registered (spec.md §7.2).
    #[error("cryptographic failure for {who}: {reason}")]
    Crypto { who: Id, reason: String },

    /// The group does not currently satisfy §4.7's sufficiency check.
    /// Non-fatal: the session parks in `PrepareDeferred` (spec.md §7.3).
    #[error("group insufficient: {reason}")]
    GroupInsufficient { reason: String },

    /// A round was stopped before completing successfully (spec.md §7.4).
    #[error("round {round_id} aborted: {reason}")]
    RoundAborted { round_id: Id, reason: String },

    /// RNG exhaustion, disk I/O, or another resource failure fatal to the
    /// affected session (spec.md §7.5).
    #[error("resource failure: {0}")]
    Resource(String),

    /// Wire (de)serialization failed.
    #[error("serialisation error: {0}")]
    Serialisation(String),

    /// A configuration value was missing or malformed.
    #[error("configuration error: {0}")]
    Config(String),
}

pub(crate) fn convert_bincode_error(err: bincode::Error) -> Error {
    Error::Serialisation(err.as_ref().to_string())
}

impl From<crate::messaging::entry_log::LogError> for Error {
    fn from(err: crate::messaging::entry_log::LogError) -> Self {
        Error::ProtocolViolation {
            sender: Id::ZERO,
            reason: err.to_string(),
        }
    }
}

impl From<crate::anonymity::tolerant::accusation::AccusationError> for Error {
    fn from(err: crate::anonymity::tolerant::accusation::AccusationError) -> Self {
        Error::Serialisation(err.to_string())
    }
}
