// Copyright 2026 Dissent Contributors.
//
// This file is licensed under the GNU General Public License v3.0 or later
// <https://www.gnu.org/licenses/gpl-3.0.html>. This file may not be copied,
// modified, or distributed except according to that license.

//! `Entry`: a hash-chained, signed log record (spec.md §3, §4.6), grounded
//! on `examples/original_source/src/PeerReview/Entry.hpp` + `.cpp`,
//! `SendEntry.hpp`, `ReceiveEntry.hpp`, and `Acknowledgement.hpp`. The
//! original's `SEND`/`RECEIVE`/`ACK` subclasses become one closed
//! `EntryKind` enum per Design Note §9.

use crate::identity::Id;
use ed25519_dalek::{Keypair, PublicKey, Signature, Signer, Verifier};
use serde::{Deserialize, Serialize};

/// Output of `blake3::hash`, stored as a plain 32-byte array so `Entry`
/// stays `Serialize`/`Deserialize` without pulling `blake3`'s own hash
/// type into the wire format.
pub type Hash32 = [u8; 32];

fn hash(bytes: &[u8]) -> Hash32 {
    *blake3::hash(bytes).as_bytes()
}

/// Variant-specific payload of an `Entry` (spec.md §4.6).
#[derive(Clone, Serialize, Deserialize, custom_debug::Debug)]
pub enum EntryKind {
    /// Carries the outgoing payload; `message_hash = H(payload)`.
    Send {
        #[debug(skip)]
        payload: Vec<u8>,
    },
    /// References a previously logged `Send` entry by its `entry_hash`;
    /// `message_hash = send_entry_hash`. The full referenced entry is kept
    /// inline (spec.md §6: "RECEIVE: append serialized SendEntry") rather
    /// than looked up, so a `ReceiveEntry` is independently verifiable.
    Receive { send_entry: Box<Entry> },
    /// Acknowledges a previously received message; `message_hash =
    /// sent_hash`.
    Ack { sent_hash: Hash32, sent_seq_id: u32 },
}

/// A single hash-chained log record (spec.md §3).
#[derive(Clone, Serialize, Deserialize, custom_debug::Debug)]
pub struct Entry {
    pub seq_id: u32,
    pub destination: Id,
    pub previous_hash: Hash32,
    pub kind: EntryKind,
    #[debug(skip)]
    pub signature: Option<Signature>,
}

impl Entry {
    pub fn new(seq_id: u32, destination: Id, previous_hash: Hash32, kind: EntryKind) -> Self {
        Entry {
            seq_id,
            destination,
            previous_hash,
            kind,
            signature: None,
        }
    }

    pub fn new_send(seq_id: u32, destination: Id, previous_hash: Hash32, payload: Vec<u8>) -> Self {
        Entry::new(seq_id, destination, previous_hash, EntryKind::Send { payload })
    }

    pub fn new_receive(
        seq_id: u32,
        destination: Id,
        previous_hash: Hash32,
        send_entry: Entry,
    ) -> Self {
        Entry::new(
            seq_id,
            destination,
            previous_hash,
            EntryKind::Receive {
                send_entry: Box::new(send_entry),
            },
        )
    }

    /// Builds an `ACK` entry from the `RECEIVE` entry it acknowledges,
    /// matching the original's derive-from-`ReceiveEntry` constructor.
    pub fn new_ack_from_receive(
        seq_id: u32,
        destination: Id,
        previous_hash: Hash32,
        receive_entry: &Entry,
    ) -> Option<Self> {
        let (sent_hash, sent_seq_id) = match &receive_entry.kind {
            EntryKind::Receive { send_entry } => (send_entry.entry_hash(), send_entry.seq_id),
            _ => return None,
        };
        Some(Entry::new(
            seq_id,
            destination,
            previous_hash,
            EntryKind::Ack {
                sent_hash,
                sent_seq_id,
            },
        ))
    }

    /// `message_hash`, variant-specific per spec.md §4.6.
    pub fn message_hash(&self) -> Hash32 {
        match &self.kind {
            EntryKind::Send { payload } => hash(payload),
            EntryKind::Receive { send_entry } => send_entry.entry_hash(),
            EntryKind::Ack { sent_hash, .. } => *sent_hash,
        }
    }

    /// `entry_hash = H(previous_hash ∥ be32(seq_id) ∥ destination ∥
    /// message_hash)` (spec.md §3). Recomputed on each call rather than
    /// cached, since `Entry` here is an immutable value (the original
    /// caches it on first use because its entries are long-lived mutable
    /// objects).
    pub fn entry_hash(&self) -> Hash32 {
        let mut buf = Vec::with_capacity(32 + 4 + crate::identity::ID_LEN + 32);
        buf.extend_from_slice(&self.previous_hash);
        buf.extend_from_slice(&self.seq_id.to_be_bytes());
        buf.extend_from_slice(self.destination.as_bytes());
        buf.extend_from_slice(&self.message_hash());
        hash(&buf)
    }

    /// Signs `entry_hash` with `key`, only if not already signed.
    pub fn sign(&mut self, key: &Keypair) {
        if self.signature.is_none() {
            self.signature = Some(key.sign(&self.entry_hash()));
        }
    }

    /// Verifies the stored signature against `entry_hash`.
    pub fn verify(&self, key: &PublicKey) -> bool {
        match &self.signature {
            Some(sig) => key.verify(&self.entry_hash(), sig).is_ok(),
            None => false,
        }
    }

    /// Binary (de)serialization of a single entry (spec.md §6's wire
    /// shape extended, per SPEC_FULL.md §2, to whole-entry persistence
    /// needed to replay or archive peer-review evidence).
    pub fn to_bytes(&self) -> crate::Result<Vec<u8>> {
        bincode::serialize(self).map_err(crate::error::convert_bincode_error)
    }

    pub fn from_bytes(bytes: &[u8]) -> crate::Result<Self> {
        bincode::deserialize(bytes).map_err(crate::error::convert_bincode_error)
    }
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        std::mem::discriminant(&self.kind) == std::mem::discriminant(&other.kind)
            && self.entry_hash() == other.entry_hash()
            && self.signature.as_ref().map(Signature::to_bytes)
                == other.signature.as_ref().map(Signature::to_bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::OsRng;

    fn keypair() -> Keypair {
        Keypair::generate(&mut OsRng)
    }

    #[test]
    fn send_message_hash_is_payload_hash() {
        let e = Entry::new_send(0, Id::ZERO, [0u8; 32], b"hello".to_vec());
        assert_eq!(e.message_hash(), hash(b"hello"));
    }

    #[test]
    fn receive_message_hash_is_send_entry_hash() {
        let send = Entry::new_send(0, Id::ZERO, [0u8; 32], b"hello".to_vec());
        let recv = Entry::new_receive(1, Id::ZERO, send.entry_hash(), send.clone());
        assert_eq!(recv.message_hash(), send.entry_hash());
    }

    #[test]
    fn sign_then_verify_round_trips() {
        let key = keypair();
        let mut e = Entry::new_send(0, Id::ZERO, [0u8; 32], b"hello".to_vec());
        e.sign(&key);
        assert!(e.verify(&key.public));
    }

    #[test]
    fn sign_is_a_no_op_once_signed() {
        let key = keypair();
        let mut e = Entry::new_send(0, Id::ZERO, [0u8; 32], b"hello".to_vec());
        e.sign(&key);
        let first = e.signature.unwrap();
        e.sign(&key);
        assert_eq!(first.to_bytes(), e.signature.unwrap().to_bytes());
    }

    #[test]
    fn binary_round_trip_preserves_the_signature() {
        let key = keypair();
        let mut e = Entry::new_send(0, Id::ZERO, [0u8; 32], b"hello".to_vec());
        e.sign(&key);
        let bytes = e.to_bytes().unwrap();
        let back = Entry::from_bytes(&bytes).unwrap();
        assert_eq!(e, back);
        assert!(back.verify(&key.public));
    }

    #[test]
    fn tampered_entry_fails_verification() {
        let key = keypair();
        let mut e = Entry::new_send(0, Id::ZERO, [0u8; 32], b"hello".to_vec());
        e.sign(&key);
        e.seq_id = 5;
        assert!(!e.verify(&key.public));
    }
}
