// Copyright 2026 Dissent Contributors.
//
// This file is licensed under the GNU General Public License v3.0 or later
// <https://www.gnu.org/licenses/gpl-3.0.html>. This file may not be copied,
// modified, or distributed except according to that license.

//! `MessageHistory`: the receive-side dual of [`AlibiData`](super::AlibiData) —
//! records what each member actually sent, so it can be compared against
//! their claimed alibi bits (spec.md §4.5), grounded on
//! `examples/original_source/src/Anonymity/Tolerant/MessageHistory.hpp`.

use super::Accusation;
use std::collections::HashMap;

/// Retains received user and server messages per slot/phase, with the
/// same corrupted-slot retention discipline as `AlibiData`.
pub struct MessageHistory {
    corrupted_slots: Vec<bool>,
    num_users: usize,
    num_servers: usize,
    user_data: Vec<HashMap<u32, Vec<Option<Vec<u8>>>>>,
    server_data: Vec<HashMap<u32, Vec<Option<Vec<u8>>>>>,
}

impl MessageHistory {
    pub fn new(n_slots: usize, num_users: usize, num_servers: usize) -> Self {
        MessageHistory {
            corrupted_slots: vec![false; n_slots],
            num_users,
            num_servers,
            user_data: (0..n_slots).map(|_| HashMap::new()).collect(),
            server_data: (0..n_slots).map(|_| HashMap::new()).collect(),
        }
    }

    pub fn add_user_message(&mut self, phase: u32, slot: usize, user_idx: usize, message: Vec<u8>) {
        let num_users = self.num_users;
        let entry = self.user_data[slot]
            .entry(phase)
            .or_insert_with(|| vec![None; num_users]);
        entry[user_idx] = Some(message);
    }

    pub fn add_server_message(
        &mut self,
        phase: u32,
        slot: usize,
        server_idx: usize,
        message: Vec<u8>,
    ) {
        let num_servers = self.num_servers;
        let entry = self.server_data[slot]
            .entry(phase)
            .or_insert_with(|| vec![None; num_servers]);
        entry[server_idx] = Some(message);
    }

    pub fn get_user_output_bit(&self, slot: usize, user_idx: usize, accusation: &Accusation) -> bool {
        let entry = self.user_data[slot]
            .get(&accusation.phase())
            .expect("output bit requested for a phase with no recorded user messages");
        let msg = entry[user_idx]
            .as_ref()
            .expect("no message recorded for this user in this slot/phase");
        (msg[accusation.byte_idx() as usize] >> accusation.bit_idx()) & 1 == 1
    }

    pub fn get_server_output_bit(
        &self,
        slot: usize,
        server_idx: usize,
        accusation: &Accusation,
    ) -> bool {
        let entry = self.server_data[slot]
            .get(&accusation.phase())
            .expect("output bit requested for a phase with no recorded server messages");
        let msg = entry[server_idx]
            .as_ref()
            .expect("no message recorded for this server in this slot/phase");
        (msg[accusation.byte_idx() as usize] >> accusation.bit_idx()) & 1 == 1
    }

    pub fn next_phase(&mut self) {
        for (idx, corrupted) in self.corrupted_slots.iter().enumerate() {
            if !corrupted {
                self.user_data[idx].clear();
                self.server_data[idx].clear();
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
    fn output_bit_reflects_the_accused_position_of_the_recorded_message() {
        let mut history = MessageHistory::new(1, 2, 2);
        history.add_user_message(0, 0, 0, vec![0b0000_0001]);
        history.add_user_message(0, 0, 1, vec![0b0000_0000]);

        let accusation = Accusation::new(0, 0, 0b0000_0001).unwrap();
        assert!(history.get_user_output_bit(0, 0, &accusation));
        assert!(!history.get_user_output_bit(0, 1, &accusation));
    }

    #[test]
    fn next_phase_preserves_corrupted_slot_history() {
        let mut history = MessageHistory::new(2, 1, 1);
        history.add_server_message(0, 1, 0, vec![0b0000_0010]);
        history.mark_slot_corrupted(1);

        history.next_phase();

        let accusation = Accusation::new(0, 0, 0b0000_0010).unwrap();
        assert!(history.get_server_output_bit(1, 0, &accusation));
    }
}
