// Copyright 2026 Dissent Contributors.
//
// This file is licensed under the GNU General Public License v3.0 or later
// <https://www.gnu.org/licenses/gpl-3.0.html>. This file may not be copied,
// modified, or distributed except according to that license.

//! `AcknowledgementLog`: a keyed, append-only mapping from sent `seq_id`
//! to `Acknowledgement` (spec.md §3, §4.6), grounded on
//! `examples/original_source/src/PeerReview/AcknowledgementLog.hpp`+`.cpp`.

use super::entry::{Entry, EntryKind};
use std::collections::BTreeMap;

/// `sent_seq_id -> Acknowledgement` (an [`Entry`] whose [`EntryKind`] is
/// `Ack`). Re-inserting the exact same ack is idempotent; a differing ack
/// for the same key is rejected and the log is left unchanged.
#[derive(Clone, Default)]
pub struct AcknowledgementLog {
    acks: BTreeMap<u32, Entry>,
}

impl AcknowledgementLog {
    pub fn new() -> Self {
        AcknowledgementLog::default()
    }

    pub fn len(&self) -> usize {
        self.acks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.acks.is_empty()
    }

    pub fn at(&self, sent_seq_id: u32) -> Option<&Entry> {
        self.acks.get(&sent_seq_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&u32, &Entry)> {
        self.acks.iter()
    }

    /// Inserts `ack`. Returns `true` on success: a fresh key, or an exact
    /// duplicate of an existing entry. Returns `false` (log unchanged) if
    /// a different ack already occupies the same `sent_seq_id`.
    pub fn insert(&mut self, ack: Entry) -> bool {
        let sent_seq_id = match &ack.kind {
            EntryKind::Ack { sent_seq_id, .. } => *sent_seq_id,
            _ => return false,
        };
        match self.acks.get(&sent_seq_id) {
            Some(existing) => *existing == ack,
            None => {
                self.acks.insert(sent_seq_id, ack);
                true
            }
        }
    }

    /// Symmetric to [`crate::messaging::entry_log::EntryLog::serialize`]
    /// (SPEC_FULL.md §2's supplement, grounded on
    /// `AcknowledgementLog::Serialize`/`Parse` in the original).
    pub fn serialize(&self) -> crate::Result<Vec<u8>> {
        let entries: Vec<&Entry> = self.acks.values().collect();
        bincode::serialize(&entries).map_err(crate::error::convert_bincode_error)
    }

    pub fn parse(bytes: &[u8]) -> crate::Result<Self> {
        let entries: Vec<Entry> = bincode::deserialize(bytes).map_err(crate::error::convert_bincode_error)?;
        let mut log = AcknowledgementLog::new();
        for entry in entries {
            if !log.insert(entry) {
                return Err(crate::Error::Serialisation(
                    "parsed acknowledgement log contains conflicting entries".to_string(),
                ));
            }
        }
        Ok(log)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::Id;

    fn ack(sent_seq_id: u32, sent_hash: [u8; 32]) -> Entry {
        Entry::new(
            0,
            Id::ZERO,
            [0u8; 32],
            EntryKind::Ack {
                sent_hash,
                sent_seq_id,
            },
        )
    }

    #[test]
    fn inserting_twice_with_equal_ack_is_idempotent() {
        let mut log = AcknowledgementLog::new();
        let a = ack(3, [1u8; 32]);
        assert!(log.insert(a.clone()));
        assert!(log.insert(a));
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn differing_ack_for_same_key_is_rejected() {
        let mut log = AcknowledgementLog::new();
        assert!(log.insert(ack(3, [1u8; 32])));
        assert!(!log.insert(ack(3, [2u8; 32])));
        assert_eq!(log.at(3).unwrap().message_hash(), [1u8; 32]);
    }

    #[test]
    fn serialize_then_parse_round_trips() {
        let mut log = AcknowledgementLog::new();
        log.insert(ack(1, [1u8; 32]));
        log.insert(ack(2, [2u8; 32]));
        let bytes = log.serialize().unwrap();
        let back = AcknowledgementLog::parse(&bytes).unwrap();
        assert_eq!(back.len(), 2);
        assert_eq!(back.at(1).unwrap().message_hash(), [1u8; 32]);
    }

    #[test]
    fn non_ack_entries_are_rejected() {
        let mut log = AcknowledgementLog::new();
        let send = Entry::new_send(0, Id::ZERO, [0u8; 32], b"x".to_vec());
        assert!(!log.insert(send));
        assert!(log.is_empty());
    }
}
