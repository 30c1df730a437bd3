// Copyright 2026 Dissent Contributors.
//
// This file is licensed under the GNU General Public License v3.0 or later
// <https://www.gnu.org/licenses/gpl-3.0.html>. This file may not be copied,
// modified, or distributed except according to that license.

//! `NullBuddyPolicy`: every member is its own buddy (spec.md §4.3),
//! grounded on
//! `examples/original_source/src/Anonymity/Buddies/NullBuddyPolicy.hpp`+`.cpp`.

use super::{BuddyState, OFFLINE_UNALLOCATED, ONLINE_UNALLOCATED};

pub struct NullBuddyPolicy {
    state: BuddyState,
}

impl NullBuddyPolicy {
    pub fn new(count: usize) -> Self {
        NullBuddyPolicy {
            state: BuddyState::new(count),
        }
    }

    pub fn set_online_members(&mut self, online: Vec<bool>) {
        self.state.online_members = online;
        for idx in 0..self.state.count {
            let gid = if self.state.online_members[idx] {
                ONLINE_UNALLOCATED
            } else {
                OFFLINE_UNALLOCATED
            };
            self.state.set_member_group(idx, gid);
        }
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn useful_members_tracks_online_members_exactly() {
        let mut policy = NullBuddyPolicy::new(4);
        policy.set_online_members(vec![true, false, true, false]);
        assert_eq!(policy.useful_members(), vec![true, false, true, false]);
    }
}
