// Copyright 2026 Dissent Contributors.
//
// This file is licensed under the GNU General Public License v3.0 or later
// <https://www.gnu.org/licenses/gpl-3.0.html>. This file may not be copied,
// modified, or distributed except according to that license.

//! `BuddyMonitor`: per-round anonymity-set bookkeeping on top of a
//! [`BuddyPolicy`] (spec.md §4.4), grounded on
//! `examples/original_source/src/Anonymity/Buddies/BuddyMonitor.hpp`+`.cpp`.
//! The two `n * n` compatibility matrices are flat bit vectors with
//! explicit row stride (spec.md §9 Design Note, "arena/index for buddy
//! matrices") rather than a `Vec<Vec<bool>>`.

use super::buddies::BuddyPolicy;

pub struct BuddyMonitor {
    policy: BuddyPolicy,
    n: usize,
    /// `member_set[j * n + i] == true` iff member `j` is still
    /// compatible with pseudonym `i`.
    member_set: Vec<bool>,
    /// `nym_set[i * n + j] == true` iff pseudonym `i` is still
    /// compatible with member `j`.
    nym_set: Vec<bool>,
    used_nyms: Vec<bool>,
    min_anon: usize,
}

impl BuddyMonitor {
    pub fn new(policy: BuddyPolicy, min_anon: usize) -> Self {
        let n = policy.count();
        BuddyMonitor {
            policy,
            n,
            member_set: vec![true; n * n],
            nym_set: vec![true; n * n],
            used_nyms: vec![false; n],
            min_anon,
        }
    }

    fn member_idx(&self, j: usize, i: usize) -> usize {
        j * self.n + i
    }

    fn nym_idx(&self, i: usize, j: usize) -> usize {
        i * self.n + j
    }

    fn row_ones(matrix: &[bool], row: usize, n: usize) -> usize {
        matrix[row * n..row * n + n].iter().filter(|b| **b).count()
    }

    pub fn set_online_members(&mut self, online: Vec<bool>, elapsed_ms: i64) {
        self.policy.set_online_members(online, elapsed_ms);
    }

    pub fn useful_members(&self) -> Vec<bool> {
        self.policy.useful_members()
    }

    /// Marks pseudonym `idx` active; every member not currently useful is
    /// eliminated from its anonymity set and vice versa (spec.md §4.4).
    pub fn set_active_nym(&mut self, idx: usize) {
        self.used_nyms[idx] = true;
        let useful = self.policy.useful_members();
        for j in 0..self.n {
            if useful[j] {
                continue;
            }
            let midx = self.member_idx(j, idx);
            let nidx = self.nym_idx(idx, j);
            self.member_set[midx] = false;
            self.nym_set[nidx] = false;
        }
    }

    pub fn set_active_nyms(&mut self, nyms: &[bool]) {
        for idx in 0..self.n {
            if nyms[idx] {
                self.set_active_nym(idx);
            }
        }
    }

    /// Tentatively reveals each candidate in order, rolling back any
    /// candidate whose clearing would push a member below `min_anon`
    /// (spec.md §4.4, the buddy-floor invariant tested in spec.md §8).
    /// A pure query: it predicts the effect of revealing `candidates`
    /// without mutating monitor state, matching
    /// `BuddyMonitor::ShouldRevealNyms` in the original.
    pub fn should_reveal_nyms(&self, candidates: &[bool]) -> Vec<bool> {
        if self.min_anon == 0 {
            return candidates.to_vec();
        }
        assert_eq!(candidates.len(), self.n);

        let useful = self.policy.useful_members();
        let mut working = self.member_set.clone();
        let mut rv = vec![false; self.n];

        for idx in 0..self.n {
            if !candidates[idx] {
                continue;
            }

            let reachable = (0..self.n)
                .filter(|&j| self.nym_set[self.nym_idx(idx, j)] && useful[j])
                .count();
            if reachable < self.min_anon {
                continue;
            }

            let backup = working.clone();
            let mut bad = false;
            for j in 0..self.n {
                if useful[j] {
                    continue;
                }
                let midx = j * self.n + idx;
                if working[midx] && Self::row_ones(&working, j, self.n) == self.min_anon {
                    bad = true;
                    break;
                }
                working[midx] = false;
            }

            if bad {
                working = backup;
            } else {
                rv[idx] = true;
            }
        }

        rv
    }

    pub fn nym_anonymity(&self, idx: usize) -> usize {
        Self::row_ones(&self.nym_set, idx, self.n)
    }

    pub fn member_anonymity(&self, idx: usize) -> usize {
        Self::row_ones(&self.member_set, idx, self.n)
    }

    pub fn conservative_anonymity(&self, idx: usize) -> i64 {
        self.nym_anonymity(idx) as i64 - self.used_nyms.iter().filter(|b| **b).count() as i64
    }

    pub fn member_score(&self, idx: usize) -> f64 {
        let mut total = 0usize;
        for j in 0..self.n {
            if !self.nym_set[self.nym_idx(idx, j)] {
                continue;
            }
            total += self.member_anonymity(j);
        }
        total as f64 / self.n as f64
    }

    pub fn nym_score(&self, idx: usize) -> f64 {
        let mut total = 0usize;
        for j in 0..self.n {
            if !self.member_set[self.member_idx(idx, j)] {
                continue;
            }
            total += self.nym_anonymity(j);
        }
        total as f64 / self.n as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anonymity::buddies::NullBuddyPolicy;

    fn monitor_with_offline(n: usize, min_anon: usize, offline: &[usize]) -> BuddyMonitor {
        let mut policy = BuddyPolicy::Null(NullBuddyPolicy::new(n));
        let online: Vec<bool> = (0..n).map(|i| !offline.contains(&i)).collect();
        policy.set_online_members(online, 0);
        BuddyMonitor::new(policy, min_anon)
    }

    #[test]
    fn at_construction_every_member_anonymity_equals_n() {
        let monitor = monitor_with_offline(5, 0, &[]);
        for idx in 0..5 {
            assert_eq!(monitor.member_anonymity(idx), 5);
            assert_eq!(monitor.nym_anonymity(idx), 5);
        }
    }

    #[test]
    fn used_nyms_only_transitions_zero_to_one() {
        let mut monitor = monitor_with_offline(4, 0, &[2]);
        monitor.set_active_nym(1);
        assert!(monitor.used_nyms[1]);
        monitor.set_active_nym(1);
        assert!(monitor.used_nyms[1]);
    }

    #[test]
    fn min_anon_zero_reveals_everything() {
        let monitor = monitor_with_offline(4, 0, &[]);
        let candidates = vec![true, false, true, false];
        assert_eq!(monitor.should_reveal_nyms(&candidates), candidates);
    }

    #[test]
    fn reveal_floor_never_drops_a_members_anonymity_below_the_minimum() {
        let mut monitor = monitor_with_offline(8, 3, &[4, 5]);
        monitor.set_active_nym(0);
        monitor.set_active_nym(1);

        let candidates = vec![true, true, true, false, false, false, false, false];
        let revealed = monitor.should_reveal_nyms(&candidates);

        // revealed must be a subset of candidates
        for idx in 0..8 {
            if revealed[idx] {
                assert!(candidates[idx]);
            }
        }

        monitor.set_active_nyms(&revealed);
        for j in 0..8 {
            assert!(monitor.member_anonymity(j) >= 3 || monitor.useful_members()[j]);
        }
    }

    #[test]
    fn conservative_anonymity_subtracts_used_nym_count() {
        let mut monitor = monitor_with_offline(4, 0, &[]);
        monitor.set_active_nym(0);
        monitor.set_active_nym(1);
        assert_eq!(monitor.conservative_anonymity(2), monitor.nym_anonymity(2) as i64 - 2);
    }
}
