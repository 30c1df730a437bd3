// Copyright 2026 Dissent Contributors.
//
// This file is licensed under the GNU General Public License v3.0 or later
// <https://www.gnu.org/licenses/gpl-3.0.html>. This file may not be copied,
// modified, or distributed except according to that license.

//! `BlameMatrix`: reconciles every user's and server's alibi for a
//! corrupted slot against the output bit each actually produced,
//! identifying which of them deviated (spec.md §4.5), grounded on
//! `examples/original_source/src/Anonymity/Tolerant/BlameMatrix.hpp`+`.cpp`.

use super::Conflict;

#[derive(Clone, Copy, Default)]
struct BitPair {
    user_bit: bool,
    server_bit: bool,
}

/// A `num_users x num_servers` grid of alibi bits for one corrupted
/// slot, plus the output bit each user and server actually produced. A
/// participant is "bad" when the XOR of its alibi bits across the other
/// side disagrees with its own recorded output bit.
pub struct BlameMatrix {
    num_users: usize,
    num_servers: usize,
    data: Vec<Vec<BitPair>>,
    user_output_bits: Vec<bool>,
    server_output_bits: Vec<bool>,
}

impl BlameMatrix {
    pub fn new(num_users: usize, num_servers: usize) -> Self {
        BlameMatrix {
            num_users,
            num_servers,
            data: vec![vec![BitPair::default(); num_servers]; num_users],
            user_output_bits: vec![false; num_users],
            server_output_bits: vec![false; num_servers],
        }
    }

    /// `bits[server_idx]` is the alibi bit `user_idx` claims it
    /// contributed toward `server_idx`'s share of the slot.
    pub fn add_user_alibi(&mut self, user_idx: usize, bits: &[bool]) {
        assert_eq!(bits.len(), self.num_servers);
        for (server_idx, bit) in bits.iter().enumerate() {
            self.data[user_idx][server_idx].user_bit = *bit;
        }
    }

    /// `bits[user_idx]` is the alibi bit `server_idx` claims it received
    /// from `user_idx` for the slot.
    pub fn add_server_alibi(&mut self, server_idx: usize, bits: &[bool]) {
        assert_eq!(bits.len(), self.num_users);
        for (user_idx, bit) in bits.iter().enumerate() {
            self.data[user_idx][server_idx].server_bit = *bit;
        }
    }

    pub fn add_user_output_bit(&mut self, user_idx: usize, bit: bool) {
        self.user_output_bits[user_idx] = bit;
    }

    pub fn add_server_output_bit(&mut self, server_idx: usize, bit: bool) {
        self.server_output_bits[server_idx] = bit;
    }

    /// Users whose claimed alibi bits, XORed across every server, don't
    /// reproduce the output bit they actually sent.
    pub fn bad_users(&self) -> Vec<usize> {
        (0..self.num_users)
            .filter(|&user_idx| {
                let xor = (0..self.num_servers)
                    .fold(false, |acc, server_idx| acc ^ self.data[user_idx][server_idx].user_bit);
                xor != self.user_output_bits[user_idx]
            })
            .collect()
    }

    /// Servers whose claimed alibi bits, XORed across every user, don't
    /// reproduce the output bit they actually emitted.
    pub fn bad_servers(&self) -> Vec<usize> {
        (0..self.num_servers)
            .filter(|&server_idx| {
                let xor = (0..self.num_users)
                    .fold(false, |acc, user_idx| acc ^ self.data[user_idx][server_idx].server_bit);
                xor != self.server_output_bits[server_idx]
            })
            .collect()
    }

    /// Every (user, server) pair whose alibi bits for this slot disagree
    /// with each other, regardless of whose fault it turns out to be.
    pub fn conflicts(&self, slot_idx: usize) -> Vec<Conflict> {
        let mut out = Vec::new();
        for user_idx in 0..self.num_users {
            for server_idx in 0..self.num_servers {
                let pair = self.data[user_idx][server_idx];
                if pair.user_bit != pair.server_bit {
                    out.push(Conflict {
                        slot_idx,
                        user_idx,
                        user_bit: pair.user_bit,
                        server_idx,
                        server_bit: pair.server_bit,
                    });
                }
            }
        }
        out
    }
}
