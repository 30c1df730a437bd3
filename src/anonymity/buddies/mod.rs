// Copyright 2026 Dissent Contributors.
//
// This file is licensed under the GNU General Public License v3.0 or later
// <https://www.gnu.org/licenses/gpl-3.0.html>. This file may not be copied,
// modified, or distributed except according to that license.

//! `BuddyPolicy`: partitions members into buddy groups (spec.md §4.3),
//! grounded on `examples/original_source/src/Anonymity/Buddies/
//! BuddyPolicy.hpp`+`.cpp`. The original's abstract base class becomes
//! [`BuddyState`], a plain struct of the bookkeeping every variant shares;
//! `Null`/`Static`/`Dynamic` each own one and implement their own
//! `update_buddies`, dispatched through the [`BuddyPolicy`] enum per the
//! sum-type Design Note (spec.md §9).

mod dynamic;
mod null;
mod static_policy;

pub use dynamic::DynamicBuddyPolicy;
pub use null::NullBuddyPolicy;
pub use static_policy::StaticBuddyPolicy;

/// Sentinel group id for an online member not yet assigned to a buddy
/// group.
pub const ONLINE_UNALLOCATED: i64 = -1;
/// Sentinel group id for an offline member not yet assigned to a buddy
/// group.
pub const OFFLINE_UNALLOCATED: i64 = -2;

/// The bookkeeping shared by every `BuddyPolicy` variant: the online bit
/// vector, the member→group assignment, and the set of groups
/// (recorded only for their "is every member currently online" status).
pub(crate) struct BuddyState {
    count: usize,
    groups: Vec<Vec<usize>>,
    group_online: Vec<bool>,
    members: Vec<i64>,
    online_members: Vec<bool>,
}

impl BuddyState {
    fn new(count: usize) -> Self {
        BuddyState {
            count,
            groups: Vec::new(),
            group_online: Vec::new(),
            members: vec![ONLINE_UNALLOCATED; count],
            online_members: vec![false; count],
        }
    }

    fn total_groups(&self) -> usize {
        self.groups.len()
    }

    fn append_group(&mut self, group: Vec<usize>) -> usize {
        let idx = self.groups.len();
        self.groups.push(group);
        self.group_online.push(false);
        idx
    }

    fn set_member_group(&mut self, uid: usize, gid: i64) {
        self.members[uid] = gid;
    }

    /// A group is online iff every member in it is currently online
    /// (spec.md §4.3).
    fn recompute_group_online(&mut self) {
        for (idx, group) in self.groups.iter().enumerate() {
            self.group_online[idx] = group.iter().all(|&uid| self.online_members[uid]);
        }
    }

    /// `u[i] = 1` iff member *i* is online-unallocated or belongs to an
    /// online group; offline-unallocated members are never useful
    /// (spec.md §4.3).
    fn useful_members(&self) -> Vec<bool> {
        (0..self.count)
            .map(|idx| {
                let gid = self.members[idx];
                gid != OFFLINE_UNALLOCATED
                    && (gid == ONLINE_UNALLOCATED || self.group_online[gid as usize])
            })
            .collect()
    }
}

/// The partitioning policies spec.md §4.3 names, sharing one dispatch
/// surface.
pub enum BuddyPolicy {
    Null(NullBuddyPolicy),
    Static(StaticBuddyPolicy),
    Dynamic(DynamicBuddyPolicy),
}

impl BuddyPolicy {
    /// Updates the online bit vector and re-derives buddy groups.
    /// `elapsed_ms` is the wall-clock time since the previous call,
    /// supplied by the caller rather than read from a clock internally
    /// (spec.md §9 Design Note, "timers as explicit events"); only
    /// [`DynamicBuddyPolicy`] with per-member online timers enabled
    /// consumes it.
    pub fn set_online_members(&mut self, online: Vec<bool>, elapsed_ms: i64) {
        match self {
            BuddyPolicy::Null(p) => p.set_online_members(online),
            BuddyPolicy::Static(p) => p.set_online_members(online),
            BuddyPolicy::Dynamic(p) => p.set_online_members(online, elapsed_ms),
        }
    }

    pub fn useful_members(&self) -> Vec<bool> {
        match self {
            BuddyPolicy::Null(p) => p.useful_members(),
            BuddyPolicy::Static(p) => p.useful_members(),
            BuddyPolicy::Dynamic(p) => p.useful_members(),
        }
    }

    pub fn count(&self) -> usize {
        match self {
            BuddyPolicy::Null(p) => p.count(),
            BuddyPolicy::Static(p) => p.count(),
            BuddyPolicy::Dynamic(p) => p.count(),
        }
    }

    pub fn online_members(&self) -> &[bool] {
        match self {
            BuddyPolicy::Null(p) => p.online_members(),
            BuddyPolicy::Static(p) => p.online_members(),
            BuddyPolicy::Dynamic(p) => p.online_members(),
        }
    }
}
