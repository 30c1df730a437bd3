// Copyright 2026 Dissent Contributors.
//
// This file is licensed under the GNU General Public License v3.0 or later
// <https://www.gnu.org/licenses/gpl-3.0.html>. This file may not be copied,
// modified, or distributed except according to that license.

//! Narrow transport seams `Session`/`SessionLeader` are built against: the
//! raw transport and the overlay/connection table are external
//! collaborators, hidden behind a small trait so the rest of a node only
//! ever calls into it, and tests can substitute an in-memory double
//! instead of holding a live transport.
//!
//! Every method is synchronous: a `send`/`broadcast` call enqueues the
//! message with the transport and returns immediately (spec.md §9 Design
//! Note, "signal/slot -> explicit callbacks"), matching the single
//! suspension-point model of spec.md §5 rather than introducing `async`
//! call chains through session logic that has no use for one.

use crate::identity::Id;
use crate::messaging::WireMessage;

/// The subset of the overlay/connection table that session logic reads:
/// whether a direct connection to a peer currently exists, and how many
/// connections are live (spec.md §4.1's `ShouldRegister` rule for a
/// `ManagedSubgroup` node outside the subgroup).
pub trait ConnectionTable: Send + Sync {
    fn is_connected(&self, id: Id) -> bool;
    fn count(&self) -> usize;
}

/// The message-sending seam (spec.md §6's wire messages). A real
/// implementation owns the transport and connection table; this crate
/// only needs to hand it outgoing messages and ask about connectivity.
pub trait Network: Send + Sync {
    /// Sends `message` to `dest`. Errors are transport failures (spec.md
    /// §7.5's "resource failure"); a missing peer is not itself an error
    /// at this layer (the caller observes it through `ConnectionTable`).
    fn send(&self, dest: Id, message: WireMessage) -> crate::Result<()>;

    /// Sends `message` to every id in `dests`, stopping at the first
    /// failure.
    fn broadcast(&self, dests: &[Id], message: WireMessage) -> crate::Result<()> {
        for dest in dests {
            self.send(*dest, message.clone())?;
        }
        Ok(())
    }

    fn connection_table(&self) -> &dyn ConnectionTable;
}

#[cfg(any(test, feature = "test-utils"))]
pub mod test_util {
    //! An in-memory `Network`/`ConnectionTable` double for session tests.

    use super::*;
    use std::collections::HashSet;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct FakeConnectionTable {
        connected: Mutex<HashSet<Id>>,
    }

    impl FakeConnectionTable {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn connect(&self, id: Id) {
            self.connected.lock().unwrap().insert(id);
        }

        pub fn disconnect(&self, id: Id) {
            self.connected.lock().unwrap().remove(&id);
        }
    }

    impl ConnectionTable for FakeConnectionTable {
        fn is_connected(&self, id: Id) -> bool {
            self.connected.lock().unwrap().contains(&id)
        }

        fn count(&self) -> usize {
            self.connected.lock().unwrap().len()
        }
    }

    /// Records every message handed to it instead of sending anything.
    #[derive(Default)]
    pub struct RecordingNetwork {
        pub connections: FakeConnectionTable,
        pub sent: Mutex<Vec<(Id, WireMessage)>>,
    }

    impl RecordingNetwork {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn sent_messages(&self) -> Vec<(Id, WireMessage)> {
            self.sent.lock().unwrap().clone()
        }
    }

    impl Network for RecordingNetwork {
        fn send(&self, dest: Id, message: WireMessage) -> crate::Result<()> {
            self.sent.lock().unwrap().push((dest, message));
            Ok(())
        }

        fn connection_table(&self) -> &dyn ConnectionTable {
            &self.connections
        }
    }

    /// Lets a test hold onto an `Arc<RecordingNetwork>` for inspection
    /// while also handing a `Box<dyn Network>` of the same instance to
    /// the code under test.
    impl Network for std::sync::Arc<RecordingNetwork> {
        fn send(&self, dest: Id, message: WireMessage) -> crate::Result<()> {
            (**self).send(dest, message)
        }

        fn connection_table(&self) -> &dyn ConnectionTable {
            (**self).connection_table()
        }
    }
}
