// Copyright 2026 Dissent Contributors.
//
// This file is licensed under the GNU General Public License v3.0 or later
// <https://www.gnu.org/licenses/gpl-3.0.html>. This file may not be copied,
// modified, or distributed except according to that license.

//! Wire messages exchanged between a member and its leader (spec.md §6),
//! grounded on `examples/fakelionel-safe_network/src/messaging/system/
//! mod.rs`'s closed-enum pattern. The original's per-message Qt classes
//! become one tagged `WireMessage` enum; double-dispatch on message type
//! is replaced by exhaustive matching.

pub mod data_envelope;
pub mod entry;
pub mod entry_log;
pub mod acknowledgement_log;

use crate::identity::Id;
use serde::{Deserialize, Serialize};

/// `SM::*` wire messages (spec.md §6's table). Every message carries
/// `session_id` except `ChallengeRequest`/`ChallengeResponse`, which are
/// addressed to the leader directly and precede session membership.
#[derive(Clone, Serialize, Deserialize, custom_debug::Debug)]
pub enum WireMessage {
    /// member -> leader.
    Register {
        session_id: Id,
        #[debug(skip)]
        ident: Vec<u8>,
    },
    /// member -> leader; authenticator-specific payload.
    ChallengeRequest {
        #[debug(skip)]
        data: Vec<u8>,
    },
    /// member -> leader; authenticator-specific payload.
    ChallengeResponse {
        #[debug(skip)]
        data: Vec<u8>,
    },
    /// leader -> members.
    Prepare {
        session_id: Id,
        round_id: Id,
        interrupt: bool,
        #[debug(skip)]
        group: Option<Vec<u8>>,
    },
    /// member -> leader.
    Prepared { session_id: Id, round_id: Id },
    /// leader -> members.
    Begin { session_id: Id, round_id: Id },
    /// peer -> peer; payload is a round data envelope
    /// (`messaging::data_envelope`).
    Data {
        session_id: Id,
        #[debug(skip)]
        payload: Vec<u8>,
    },
    /// member -> leader.
    Disconnect {
        session_id: Id,
        remote_id: Id,
        round_closed: bool,
    },
}

/// Failure categories carried on an unsuccessful response (spec.md §6).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    InvalidInput,
    InvalidSender,
    Other,
}

/// The outcome of a request/response exchange. `Ok` carries the
/// leader-supplied response payload (`true` for a bare acknowledgement);
/// `Err` carries an [`ErrorKind`] and a human-readable reason.
pub type WireResult<T> = std::result::Result<T, (ErrorKind, String)>;
