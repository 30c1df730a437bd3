// Copyright 2026 Dissent Contributors.
//
// This file is licensed under the GNU General Public License v3.0 or later
// <https://www.gnu.org/licenses/gpl-3.0.html>. This file may not be copied,
// modified, or distributed except according to that license.

//! `AlibiData`: records each member's outbound message shares for a
//! tolerant round so a later [`Accusation`](super::Accusation) can be
//! answered with evidence (spec.md §4.5), grounded on
//! `examples/original_source/src/Anonymity/Tolerant/AlibiData.hpp`+`.cpp`.

use super::Accusation;
use std::collections::HashMap;

struct SlotData {
    phase_rng_byte_idx: u32,
    slot_rng_byte_idx: u32,
    xor_messages: Vec<Option<Vec<u8>>>,
}

/// Per-slot, per-phase outbound message shares, retained only until the
/// slot is confirmed clean (spec.md §4.5's corrupted-slot retention
/// discipline).
pub struct AlibiData {
    corrupted_slots: Vec<bool>,
    n_members: usize,
    data: Vec<HashMap<u32, SlotData>>,
    phase_rng_byte_idx: u32,
}

impl AlibiData {
    pub fn new(n_slots: usize, n_members: usize) -> Self {
        AlibiData {
            corrupted_slots: vec![false; n_slots],
            n_members,
            data: (0..n_slots).map(|_| HashMap::new()).collect(),
            phase_rng_byte_idx: 0,
        }
    }

    /// Records the random-stream byte offset the current phase started
    /// consuming from; subsequent [`Self::store_message`] calls in this
    /// phase carry it forward until the next call.
    pub fn store_phase_rng_byte_index(&mut self, byte_index: u32) {
        self.phase_rng_byte_idx = byte_index;
    }

    /// Records `member`'s outbound share for `(phase, slot)`. The slot's
    /// random-stream offset is chained from the previous slot's recorded
    /// message length, matching the original's sequential byte-stream
    /// consumption.
    pub fn store_message(&mut self, phase: u32, slot: usize, member: usize, message: Vec<u8>) {
        let phase_rng_byte_idx = self.phase_rng_byte_idx;
        let n_members = self.n_members;

        let prev_slot_rng_byte_idx = if slot > 0 {
            self.data[slot - 1]
                .get(&phase)
                .map(|prev| {
                    let prev_len = prev
                        .xor_messages
                        .iter()
                        .find_map(|m| m.as_ref().map(|b| b.len() as u32))
                        .unwrap_or(0);
                    prev.slot_rng_byte_idx + prev_len
                })
                .unwrap_or(0)
        } else {
            0
        };

        let entry = self.data[slot].entry(phase).or_insert_with(|| SlotData {
            phase_rng_byte_idx,
            slot_rng_byte_idx: prev_slot_rng_byte_idx,
            xor_messages: vec![None; n_members],
        });
        entry.xor_messages[member] = Some(message);
    }

    /// The random-stream byte offset `(phase, slot)` started consuming
    /// from.
    pub fn get_slot_rng_byte_offset(&self, phase: u32, slot: usize) -> Option<u32> {
        self.data[slot]
            .get(&phase)
            .map(|d| d.phase_rng_byte_idx + d.slot_rng_byte_idx)
    }

    /// One bit per member: the value each member's share contributed at
    /// the accused byte/bit position.
    pub fn get_alibi_bits(&self, slot: usize, accusation: &Accusation) -> Vec<bool> {
        let entry = self.data[slot]
            .get(&accusation.phase())
            .expect("alibi requested for a phase with no recorded messages");
        let byte = accusation.byte_idx() as usize;
        let bit = accusation.bit_idx();
        (0..self.n_members)
            .map(|member| {
                let msg = entry.xor_messages[member]
                    .as_ref()
                    .expect("alibi requested before this member's message was stored");
                (msg[byte] >> bit) & 1 == 1
            })
            .collect()
    }

    /// Clears every slot's recorded messages except those still marked
    /// corrupted (spec.md §4.5: evidence for a clean slot is dropped once
    /// the phase completes; a slot under active blame keeps its history).
    pub fn next_phase(&mut self) {
        for (idx, corrupted) in self.corrupted_slots.iter().enumerate() {
            if !corrupted {
                self.data[idx].clear();
            }
        }
    }

    pub fn mark_slot_corrupted(&mut self, slot: usize) {
        self.corrupted_slots[slot] = true;
    }

    pub fn mark_slot_blame_finished(&mut self, slot: usize) {
        self.corrupted_slots[slot] = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alibi_bits_reflect_the_accused_position() {
        let mut alibi = AlibiData::new(2, 3);
        alibi.store_message(0, 0, 0, vec![0b0000_0010]);
        alibi.store_message(0, 0, 1, vec![0b0000_0000]);
        alibi.store_message(0, 0, 2, vec![0b0000_0010]);

        let accusation = Accusation::new(0, 0, 0b0000_0010).unwrap();
        assert_eq!(alibi.get_alibi_bits(0, &accusation), vec![true, false, true]);
    }

    #[test]
    fn next_phase_clears_only_uncorrupted_slots() {
        let mut alibi = AlibiData::new(2, 1);
        alibi.store_message(0, 0, 0, vec![1]);
        alibi.store_message(0, 1, 0, vec![1]);
        alibi.mark_slot_corrupted(1);

        alibi.next_phase();

        let accusation = Accusation::new(0, 0, 1).unwrap();
        assert!(std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            alibi.get_alibi_bits(0, &accusation)
        }))
        .is_err());
        assert_eq!(alibi.get_alibi_bits(1, &accusation), vec![true]);
    }

    #[test]
    fn slot_rng_offset_chains_from_the_previous_slots_message_length() {
        let mut alibi = AlibiData::new(2, 1);
        alibi.store_phase_rng_byte_index(100);
        alibi.store_message(0, 0, 0, vec![1, 2, 3]);
        alibi.store_message(0, 1, 0, vec![4]);

        assert_eq!(alibi.get_slot_rng_byte_offset(0, 0), Some(100));
        assert_eq!(alibi.get_slot_rng_byte_offset(0, 1), Some(103));
    }
}
