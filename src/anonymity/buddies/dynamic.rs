// Copyright 2026 Dissent Contributors.
//
// This file is licensed under the GNU General Public License v3.0 or later
// <https://www.gnu.org/licenses/gpl-3.0.html>. This file may not be copied,
// modified, or distributed except according to that license.

//! `DynamicBuddyPolicy`: buddy groups that reform as members churn
//! online/offline (spec.md §4.3), grounded on
//! `examples/original_source/src/Anonymity/Buddies/DynamicBuddyPolicy.hpp`+`.cpp`.

use super::BuddyState;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::HashSet;

pub struct DynamicBuddyPolicy {
    state: BuddyState,
    set_size: usize,
    online_times: Option<Vec<i64>>,
    rng: Option<rand::rngs::StdRng>,
    configured: bool,
    online_set: HashSet<usize>,
    offline_set: HashSet<usize>,
    last_online_members: Vec<bool>,
}

impl DynamicBuddyPolicy {
    pub fn new(count: usize, set_size: usize, random: bool) -> Self {
        let rng = if random {
            Some(rand::rngs::StdRng::from_entropy())
        } else {
            None
        };
        DynamicBuddyPolicy {
            state: BuddyState::new(count),
            set_size,
            online_times: None,
            rng,
            configured: false,
            online_set: HashSet::new(),
            offline_set: HashSet::new(),
            last_online_members: vec![false; count],
        }
    }

    pub fn with_online_times(count: usize, set_size: usize, online_times: Vec<i64>) -> Self {
        assert_eq!(online_times.len(), count);
        DynamicBuddyPolicy {
            state: BuddyState::new(count),
            set_size,
            online_times: Some(online_times),
            rng: None,
            configured: false,
            online_set: HashSet::new(),
            offline_set: HashSet::new(),
            last_online_members: vec![false; count],
        }
    }

    /// `elapsed_ms` is ignored unless per-member online timers are
    /// enabled (`with_online_times`).
    pub fn set_online_members(&mut self, online: Vec<bool>, elapsed_ms: i64) {
        self.state.online_members = online.clone();
        self.update_buddies(online, elapsed_ms);
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

    fn update_buddies(&mut self, online_members: Vec<bool>, elapsed_ms: i64) {
        if !self.configured {
            for idx in 0..self.state.count {
                if online_members[idx] {
                    self.online_set.insert(idx);
                    self.state
                        .set_member_group(idx, super::ONLINE_UNALLOCATED);
                } else {
                    self.offline_set.insert(idx);
                    self.state
                        .set_member_group(idx, super::OFFLINE_UNALLOCATED);
                }
            }
            self.configured = true;
            self.last_online_members = online_members;
            return;
        }

        if self.online_set.is_empty() && self.offline_set.is_empty() {
            return;
        }

        if let Some(times) = &mut self.online_times {
            for idx in 0..self.state.count {
                if online_members[idx] && self.last_online_members[idx] {
                    times[idx] += elapsed_ms;
                }
            }
        }

        let now_offline: Vec<usize> = self
            .online_set
            .iter()
            .copied()
            .filter(|&uid| !online_members[uid])
            .collect();
        self.build_offline_group(now_offline);

        let now_online: Vec<usize> = self
            .offline_set
            .iter()
            .copied()
            .filter(|&uid| online_members[uid])
            .collect();
        self.build_online_group(now_online);

        self.last_online_members = online_members;
    }

    /// Open Question #1 (spec.md §9): when the still-online pool is
    /// below `2 * set_size`, the whole pool is folded into one group
    /// even if that leaves it under `set_size`. Preserved verbatim, with
    /// a warning surfaced rather than a behavior change.
    fn build_offline_group(&mut self, now_offline: Vec<usize>) {
        if now_offline.is_empty() {
            return;
        }

        let group: Vec<usize> = if self.online_set.len() < 2 * self.set_size {
            self.online_set.drain().collect()
        } else if now_offline.len() == self.set_size {
            now_offline.clone()
        } else {
            let order: Vec<usize> = if let Some(times) = &self.online_times {
                let mut order: Vec<usize> = self.online_set.iter().copied().collect();
                order.sort_by_key(|&uid| times[uid]);
                order
            } else {
                let mut order: Vec<usize> = self.online_set.iter().copied().collect();
                if let Some(rng) = &mut self.rng {
                    order.shuffle(rng);
                }
                order
            };

            let mut group = now_offline.clone();
            let mut idx = 0;
            while group.len() < self.set_size && idx < order.len() {
                let uid = order[idx];
                idx += 1;
                if now_offline.contains(&uid) {
                    continue;
                }
                group.push(uid);
            }
            group
        };

        if group.len() < self.set_size {
            tracing::warn!(
                group_size = group.len(),
                set_size = self.set_size,
                "offline buddy group folded below the configured minimum size"
            );
        }

        let group_idx = self.state.append_group(group.clone());
        for uid in &group {
            self.state.set_member_group(*uid, group_idx as i64);
        }
    }

    fn build_online_group(&mut self, now_online: Vec<usize>) {
        if now_online.len() < self.set_size {
            return;
        }

        let (group, remainder) = if now_online.len() > self.set_size * 2 {
            let (head, tail) = now_online.split_at(self.set_size);
            (head.to_vec(), tail.to_vec())
        } else {
            (now_online, Vec::new())
        };

        let group_idx = self.state.append_group(group.clone());
        for uid in &group {
            self.state.set_member_group(*uid, group_idx as i64);
            self.offline_set.remove(uid);
        }

        if !remainder.is_empty() {
            self.build_online_group(remainder);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_call_only_allocates_online_or_offline_unallocated() {
        let mut policy = DynamicBuddyPolicy::new(4, 2, false);
        policy.set_online_members(vec![true, true, false, false], 0);
        assert_eq!(policy.useful_members(), vec![true, true, false, false]);
    }

    #[test]
    fn a_member_going_offline_below_double_set_size_folds_the_whole_pool() {
        let mut policy = DynamicBuddyPolicy::new(3, 2, false);
        policy.set_online_members(vec![true, true, true], 0);
        policy.set_online_members(vec![true, true, false], 0);
        assert_eq!(policy.state.groups.len(), 1);
        assert_eq!(policy.state.groups[0].len(), 3);
    }

    #[test]
    fn members_returning_online_form_a_group_once_set_size_is_reached() {
        let mut policy = DynamicBuddyPolicy::new(4, 2, false);
        policy.set_online_members(vec![false, false, false, false], 0);
        policy.set_online_members(vec![true, true, false, false], 0);
        assert_eq!(policy.state.groups.len(), 1);
        assert_eq!(policy.state.groups[0].len(), 2);
        let useful = policy.useful_members();
        assert!(useful[0] && useful[1]);
    }

    #[test]
    fn online_time_counters_advance_only_for_members_online_both_snapshots() {
        let mut policy = DynamicBuddyPolicy::with_online_times(2, 2, vec![0, 0]);
        policy.set_online_members(vec![true, false], 0);
        policy.set_online_members(vec![true, true], 1000);
        assert_eq!(policy.online_times.as_ref().unwrap()[0], 1000);
        assert_eq!(policy.online_times.as_ref().unwrap()[1], 0);
    }
}
