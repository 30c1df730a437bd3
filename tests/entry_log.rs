// Copyright 2026 Dissent Contributors.
//
// This file is licensed under the GNU General Public License v3.0 or later
// <https://www.gnu.org/licenses/gpl-3.0.html>. This file may not be copied,
// modified, or distributed except according to that license.

//! spec.md §8's peer-review log invariants: `EntryLog`'s hash-chain
//! continuity and `AcknowledgementLog`'s ack idempotence, exercised end
//! to end across a `Send` -> `Receive` -> `Ack` exchange between two
//! simulated peers, plus serialize/parse persistence of both logs.

use dissent::identity::Id;
use dissent::messaging::acknowledgement_log::AcknowledgementLog;
use dissent::messaging::entry::Entry;
use dissent::messaging::entry_log::{EntryLog, LogError};

/// A sender's log and a recipient's log stay chain-consistent across a
/// full send/receive/ack round trip, and the recipient's derived `Ack`
/// entry references exactly the `Send` entry it received.
#[test]
fn send_receive_ack_round_trip_preserves_log_continuity() {
    let sender = Id::from_counter(1);
    let recipient = Id::from_counter(2);

    let mut sender_log = EntryLog::new([0u8; 32]);
    let send_entry = Entry::new_send(
        sender_log.next_seq_id(),
        recipient,
        sender_log.previous_hash(),
        b"hello".to_vec(),
    );
    let send_hash = send_entry.entry_hash();
    sender_log.append(send_entry.clone()).unwrap();

    let mut recipient_log = EntryLog::new([0u8; 32]);
    let receive_entry = Entry::new_receive(
        recipient_log.next_seq_id(),
        recipient,
        recipient_log.previous_hash(),
        send_entry.clone(),
    );
    recipient_log.append(receive_entry.clone()).unwrap();

    let ack_entry = Entry::new_ack_from_receive(
        recipient_log.next_seq_id(),
        sender,
        recipient_log.previous_hash(),
        &receive_entry,
    )
    .expect("a receive entry always yields an ack");
    recipient_log.append(ack_entry.clone()).unwrap();

    assert_eq!(ack_entry.message_hash(), send_hash);
    assert_eq!(recipient_log.len(), 2);

    for w in 0..recipient_log.len() - 1 {
        let a = recipient_log.at(w).unwrap();
        let b = recipient_log.at(w + 1).unwrap();
        assert_eq!(b.seq_id, a.seq_id + 1);
        assert_eq!(b.previous_hash, a.message_hash());
    }
}

/// The sender records the matching `Ack` it gets back in its own
/// `AcknowledgementLog`; re-delivering the identical ack (a retried wire
/// message) is idempotent, but a conflicting ack for the same
/// `sent_seq_id` is rejected and the log is left untouched.
#[test]
fn acknowledgement_log_is_idempotent_and_rejects_conflicting_acks() {
    let send_entry = Entry::new_send(0, Id::from_counter(2), [0u8; 32], b"payload".to_vec());
    let send_hash = send_entry.entry_hash();

    let ack = Entry::new(
        0,
        Id::from_counter(1),
        [0u8; 32],
        dissent::messaging::entry::EntryKind::Ack {
            sent_hash: send_hash,
            sent_seq_id: 0,
        },
    );

    let mut acks = AcknowledgementLog::new();
    assert!(acks.insert(ack.clone()));
    // Re-delivery of the exact same ack (e.g. a retransmitted wire
    // message) must not be treated as a conflict.
    assert!(acks.insert(ack.clone()));
    assert_eq!(acks.len(), 1);

    let conflicting = Entry::new(
        0,
        Id::from_counter(1),
        [0u8; 32],
        dissent::messaging::entry::EntryKind::Ack {
            sent_hash: [0xffu8; 32],
            sent_seq_id: 0,
        },
    );
    assert!(!acks.insert(conflicting));
    assert_eq!(acks.at(0).unwrap().message_hash(), send_hash);
}

/// A log persisted with `serialize` and reloaded with `parse_log`
/// reproduces the same chain, including derived `Receive`/`Ack` entries,
/// and the `AcknowledgementLog` survives the same round trip.
#[test]
fn entry_log_and_acknowledgement_log_survive_a_persistence_round_trip() {
    let mut log = EntryLog::new([7u8; 32]);
    let mut acks = AcknowledgementLog::new();

    for i in 0..4u32 {
        let send = Entry::new_send(log.next_seq_id(), Id::from_counter(10 + i as u64), log.previous_hash(), vec![i as u8]);
        let hash = send.entry_hash();
        log.append(send).unwrap();
        acks.insert(Entry::new(
            i,
            Id::from_counter(1),
            [0u8; 32],
            dissent::messaging::entry::EntryKind::Ack {
                sent_hash: hash,
                sent_seq_id: i,
            },
        ));
    }

    let log_bytes = log.serialize().unwrap();
    let acks_bytes = acks.serialize().unwrap();

    let restored_log = EntryLog::parse_log(&log_bytes).unwrap();
    let restored_acks = AcknowledgementLog::parse(&acks_bytes).unwrap();

    assert_eq!(restored_log.len(), 4);
    assert_eq!(restored_log.base_hash(), log.base_hash());
    assert_eq!(restored_acks.len(), 4);
    for i in 0..4u32 {
        assert_eq!(restored_acks.at(i).unwrap().message_hash(), acks.at(i).unwrap().message_hash());
    }
}

/// An entry that skips ahead in sequence id is rejected without
/// mutating the log, regardless of how many entries already precede it.
#[test]
fn a_sequence_gap_is_rejected_deep_in_an_established_chain() {
    let mut log = EntryLog::new([0u8; 32]);
    for i in 0..5u32 {
        log.append(Entry::new_send(i, Id::ZERO, log.previous_hash(), vec![i as u8]))
            .unwrap();
    }
    let gap = Entry::new_send(7, Id::ZERO, log.previous_hash(), b"late".to_vec());
    assert_eq!(
        log.append(gap),
        Err(LogError::SequenceMismatch { expected: 5, got: 7 })
    );
    assert_eq!(log.len(), 5);
}
