// Copyright 2026 Dissent Contributors.
//
// This file is licensed under the GNU General Public License v3.0 or later
// <https://www.gnu.org/licenses/gpl-3.0.html>. This file may not be copied,
// modified, or distributed except according to that license.

//! `StaticBuddyPolicy`: fixed buddy groups of minimum size `set_size`,
//! assigned once at construction and never revisited (spec.md §4.3),
//! grounded on
//! `examples/original_source/src/Anonymity/Buddies/StaticBuddyPolicy.hpp`+`.cpp`.

use super::BuddyState;
use rand::seq::SliceRandom;
use rand::SeedableRng;

pub struct StaticBuddyPolicy {
    state: BuddyState,
}

impl StaticBuddyPolicy {
    /// Groups members in ascending id order.
    pub fn by_id(count: usize, set_size: usize) -> Self {
        Self::from_order(count, set_size, (0..count).collect())
    }

    /// Groups members under a seeded pseudorandom permutation, so every
    /// node derives the same grouping from `(count, set_size)` without
    /// coordination.
    pub fn random(count: usize, set_size: usize) -> Self {
        let mut seed_input = Vec::with_capacity(8);
        seed_input.extend_from_slice(&(count as u32).to_be_bytes());
        seed_input.extend_from_slice(&(set_size as u32).to_be_bytes());
        let seed = *blake3::hash(&seed_input).as_bytes();
        let mut rng = rand::rngs::StdRng::from_seed(seed);

        let mut order: Vec<usize> = (0..count).collect();
        order.shuffle(&mut rng);
        Self::from_order(count, set_size, order)
    }

    /// Groups members by ascending online time.
    pub fn by_online_time(count: usize, set_size: usize, online_times: &[i64]) -> Self {
        assert_eq!(online_times.len(), count);
        let mut order: Vec<usize> = (0..count).collect();
        order.sort_by_key(|&idx| online_times[idx]);
        Self::from_order(count, set_size, order)
    }

    fn from_order(count: usize, set_size: usize, order: Vec<usize>) -> Self {
        let mut state = BuddyState::new(count);
        organize(&mut state, &order, set_size);
        StaticBuddyPolicy { state }
    }

    /// Group assignments never change once constructed.
    pub fn set_online_members(&mut self, online: Vec<bool>) {
        self.state.online_members = online;
        self.state.recompute_group_online();
    }

    pub fn useful_members(&self) -> Vec<bool> {
        self.state.useful_members()
    }

    pub fn count(&self) -> usize {
        self.state.count
    }

    pub fn online_members(&self) -> &[bool] {
        &self.state.online_members
    }
}

/// Chunks `order` into groups of at least `set_size`, distributing the
/// remainder by enlarging some groups by exactly one member (spec.md
/// §4.3).
fn organize(state: &mut BuddyState, order: &[usize], set_size: usize) {
    let groups = order.len() / set_size;
    assert!(groups > 0, "not enough members to form a single buddy set");
    let mut remaining = order.len() % set_size;
    let min = set_size + remaining / groups;
    remaining %= groups;

    let mut group_idx = state.total_groups() as i64;
    let mut group: Vec<usize> = Vec::new();
    for &idx in order {
        group.push(idx);
        state.set_member_group(idx, group_idx);
        if group.len() == min {
            if remaining > 0 {
                remaining -= 1;
            } else {
                state.append_group(std::mem::take(&mut group));
                group_idx = state.total_groups() as i64;
            }
        }
    }
    debug_assert!(group.is_empty(), "organize left a dangling partial group");
}
