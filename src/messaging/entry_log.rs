// Copyright 2026 Dissent Contributors.
//
// This file is licensed under the GNU General Public License v3.0 or later
// <https://www.gnu.org/licenses/gpl-3.0.html>. This file may not be copied,
// modified, or distributed except according to that license.

//! `EntryLog`: an append-only, hash-chained sequence of [`Entry`] records
//! (spec.md §3, §4.6), grounded on
//! `examples/original_source/src/PeerReview/EntryLog.hpp`+`.cpp`.

use super::entry::{Entry, Hash32};
use thiserror::Error;

/// Rejection reasons for [`EntryLog::append`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LogError {
    #[error("entry seq_id {got} does not follow previous seq_id {expected}")]
    SequenceMismatch { expected: u32, got: u32 },
    #[error("entry previous_hash does not match the log's chain head")]
    PreviousHashMismatch,
}

/// An append-only sequence of [`Entry`] records plus a `base_hash` (spec.md
/// §3). `append` enforces both sequence-id and previous-hash continuity;
/// an insertion that would violate either is rejected and the log is left
/// unchanged.
#[derive(Clone, Default)]
pub struct EntryLog {
    base_hash: Hash32,
    entries: Vec<Entry>,
}

impl EntryLog {
    pub fn new(base_hash: Hash32) -> Self {
        EntryLog {
            base_hash,
            entries: Vec::new(),
        }
    }

    pub fn base_hash(&self) -> Hash32 {
        self.base_hash
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Entry> {
        self.entries.iter()
    }

    pub fn at(&self, idx: usize) -> Option<&Entry> {
        self.entries.get(idx)
    }

    /// The seq_id the next appended entry must carry, or `None` on an
    /// empty log (the original's `PreviousSequenceId` returns `-1`, so the
    /// next expected id is `0`; we model "no previous entry" explicitly).
    pub fn next_seq_id(&self) -> u32 {
        self.entries.last().map_or(0, |e| e.seq_id + 1)
    }

    /// The hash the next appended entry's `previous_hash` must match:
    /// the last entry's `message_hash`, or `base_hash` on an empty log.
    pub fn previous_hash(&self) -> Hash32 {
        self.entries.last().map_or(self.base_hash, Entry::message_hash)
    }

    /// Appends `entry` if it continues the chain; rejects (without
    /// mutating the log) otherwise.
    pub fn append(&mut self, entry: Entry) -> Result<(), LogError> {
        let expected_seq = self.next_seq_id();
        if entry.seq_id != expected_seq {
            return Err(LogError::SequenceMismatch {
                expected: expected_seq,
                got: entry.seq_id,
            });
        }
        if entry.previous_hash != self.previous_hash() {
            return Err(LogError::PreviousHashMismatch);
        }
        self.entries.push(entry);
        Ok(())
    }

    /// Serializes `base_hash` plus every entry, in order, for persisting
    /// or replaying a peer-review log (SPEC_FULL.md §2's "`EntryLog::
    /// parse_log`/`Entry` binary (de)serialization" supplement; the
    /// original's `EntryLog::Serialize`/`ParseLog`).
    pub fn serialize(&self) -> crate::Result<Vec<u8>> {
        bincode::serialize(&(self.base_hash, &self.entries))
            .map_err(crate::error::convert_bincode_error)
    }

    /// Parses a buffer produced by [`Self::serialize`] back into an
    /// `EntryLog`, re-validating chain continuity as it goes so a
    /// corrupted on-disk log cannot silently reappear as valid.
    pub fn parse_log(bytes: &[u8]) -> crate::Result<Self> {
        let (base_hash, entries): (Hash32, Vec<Entry>) =
            bincode::deserialize(bytes).map_err(crate::error::convert_bincode_error)?;
        let mut log = EntryLog::new(base_hash);
        for entry in entries {
            log.append(entry)?;
        }
        Ok(log)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::Id;

    fn send(seq: u32, prev: Hash32, payload: &[u8]) -> Entry {
        Entry::new_send(seq, Id::ZERO, prev, payload.to_vec())
    }

    #[test]
    fn appends_a_well_formed_chain() {
        let mut log = EntryLog::new([0u8; 32]);
        let e0 = send(0, log.previous_hash(), b"a");
        let h0 = e0.message_hash();
        log.append(e0).unwrap();
        let e1 = send(1, h0, b"b");
        log.append(e1).unwrap();
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn rejects_seq_id_gap() {
        let mut log = EntryLog::new([0u8; 32]);
        let bad = send(1, log.previous_hash(), b"a");
        assert_eq!(
            log.append(bad),
            Err(LogError::SequenceMismatch { expected: 0, got: 1 })
        );
        assert!(log.is_empty());
    }

    #[test]
    fn rejects_previous_hash_mismatch() {
        let mut log = EntryLog::new([0u8; 32]);
        let bad = send(0, [9u8; 32], b"a");
        assert_eq!(log.append(bad), Err(LogError::PreviousHashMismatch));
    }

    #[test]
    fn serialize_then_parse_log_round_trips() {
        let mut log = EntryLog::new([0u8; 32]);
        for i in 0..3u32 {
            log.append(send(i, log.previous_hash(), &[i as u8])).unwrap();
        }
        let bytes = log.serialize().unwrap();
        let back = EntryLog::parse_log(&bytes).unwrap();
        assert_eq!(back.len(), 3);
        assert_eq!(back.base_hash(), log.base_hash());
    }

    #[test]
    fn parse_log_rejects_a_corrupted_chain() {
        let mut log = EntryLog::new([0u8; 32]);
        log.append(send(0, log.previous_hash(), b"a")).unwrap();
        log.append(send(1, log.previous_hash(), b"b")).unwrap();
        let mut entries: Vec<Entry> = log.iter().cloned().collect();
        entries[1].previous_hash = [9u8; 32];
        let bytes = bincode::serialize(&(log.base_hash(), &entries)).unwrap();
        assert!(EntryLog::parse_log(&bytes).is_err());
    }

    #[test]
    fn adjacent_entries_satisfy_log_continuity_invariant() {
        let mut log = EntryLog::new([0u8; 32]);
        for i in 0..5u32 {
            let e = send(i, log.previous_hash(), &[i as u8]);
            log.append(e).unwrap();
        }
        for w in 0..log.len() - 1 {
            let a = log.at(w).unwrap();
            let b = log.at(w + 1).unwrap();
            assert_eq!(b.seq_id, a.seq_id + 1);
            assert_eq!(b.previous_hash, a.message_hash());
        }
    }
}
