// Copyright 2026 Dissent Contributors.
//
// This file is licensed under the GNU General Public License v3.0 or later
// <https://www.gnu.org/licenses/gpl-3.0.html>. This file may not be copied,
// modified, or distributed except according to that license.

//! `Group`: an immutable, sorted roster of public identities plus a
//! leader and a subgroup policy (spec.md §3). Groups are never mutated in
//! place; `Group::add_member`/`Group::remove_member` return a new value,
//! matching `AddGroupMember`/`RemoveGroupMember` in
//! `examples/original_source/src/Identity/Group.hpp` and the
//! immutable-update style of `examples/fakelionel-safe_network/src/
//! routing/section/mod.rs` (`Section::merge_members` and friends).

use super::id::Id;
use super::public_identity::PublicIdentity;
use std::collections::BTreeMap;

/// How the group's subgroup (a smaller roster some round implementations
/// restrict participation to) is derived.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum SubgroupPolicy {
    /// The subgroup is the whole roster.
    CompleteGroup,
    /// The subgroup is the first ten roster entries.
    FixedSubgroup,
    /// The subgroup is supplied explicitly and evolves independently.
    ManagedSubgroup,
    /// There is no subgroup; `Group::is_sufficient` always returns false.
    DisabledGroup,
}

/// An immutable roster of public identities, a leader, a subgroup policy
/// and (for every policy but `DisabledGroup`) the subgroup itself.
#[derive(Clone)]
pub struct Group {
    roster: Vec<PublicIdentity>,
    id_to_index: BTreeMap<Id, usize>,
    leader: Id,
    subgroup_policy: SubgroupPolicy,
    subgroup: Option<Box<Group>>,
}

fn sorted_unique_roster(mut roster: Vec<PublicIdentity>) -> Vec<PublicIdentity> {
    roster.sort();
    roster.dedup_by(|a, b| a.id == b.id);
    roster
}

fn index_roster(roster: &[PublicIdentity]) -> BTreeMap<Id, usize> {
    roster.iter().enumerate().map(|(i, p)| (p.id, i)).collect()
}

impl Group {
    /// An empty group under `DisabledGroup`.
    pub fn empty() -> Self {
        Group {
            roster: Vec::new(),
            id_to_index: BTreeMap::new(),
            leader: Id::ZERO,
            subgroup_policy: SubgroupPolicy::DisabledGroup,
            subgroup: None,
        }
    }

    /// A plain roster with no subgroup tracking, used as the value stored
    /// under `subgroup` for policies other than `DisabledGroup` (the
    /// subgroup itself never has a sub-subgroup).
    fn plain(roster: Vec<PublicIdentity>) -> Self {
        let roster = sorted_unique_roster(roster);
        let id_to_index = index_roster(&roster);
        Group {
            roster,
            id_to_index,
            leader: Id::ZERO,
            subgroup_policy: SubgroupPolicy::DisabledGroup,
            subgroup: None,
        }
    }

    /// Builds a group under `CompleteGroup`, `FixedSubgroup`, or
    /// `DisabledGroup`. Use [`Group::with_managed_subgroup`] for
    /// `ManagedSubgroup`, which requires an explicit subgroup roster.
    pub fn new(roster: Vec<PublicIdentity>, leader: Id, policy: SubgroupPolicy) -> Self {
        assert_ne!(
            policy,
            SubgroupPolicy::ManagedSubgroup,
            "ManagedSubgroup requires an explicit subgroup roster; use with_managed_subgroup"
        );
        let roster = sorted_unique_roster(roster);
        let id_to_index = index_roster(&roster);
        let subgroup = match policy {
            SubgroupPolicy::DisabledGroup => None,
            SubgroupPolicy::FixedSubgroup => {
                let n = roster.len().min(10);
                Some(Box::new(Group::plain(roster[..n].to_vec())))
            }
            SubgroupPolicy::CompleteGroup => Some(Box::new(Group::plain(roster.clone()))),
            SubgroupPolicy::ManagedSubgroup => unreachable!("checked above"),
        };
        Group {
            roster,
            id_to_index,
            leader,
            subgroup_policy: policy,
            subgroup,
        }
    }

    /// Builds a group under `ManagedSubgroup`, whose subgroup roster is
    /// supplied explicitly (spec.md §3).
    pub fn with_managed_subgroup(
        roster: Vec<PublicIdentity>,
        leader: Id,
        subgroup_roster: Vec<PublicIdentity>,
    ) -> Self {
        let roster = sorted_unique_roster(roster);
        let id_to_index = index_roster(&roster);
        Group {
            roster,
            id_to_index,
            leader,
            subgroup_policy: SubgroupPolicy::ManagedSubgroup,
            subgroup: Some(Box::new(Group::plain(subgroup_roster))),
        }
    }

    pub fn len(&self) -> usize {
        self.roster.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roster.is_empty()
    }

    pub fn roster(&self) -> &[PublicIdentity] {
        &self.roster
    }

    pub fn leader(&self) -> Id {
        self.leader
    }

    pub fn subgroup_policy(&self) -> SubgroupPolicy {
        self.subgroup_policy
    }

    /// `None` under `DisabledGroup`; `Some` for every other policy.
    pub fn subgroup(&self) -> Option<&Group> {
        self.subgroup.as_deref()
    }

    /// Returns `Id::ZERO` out of range, matching the original's sentinel
    /// return rather than panicking or returning `Option`.
    pub fn get_id(&self, idx: usize) -> Id {
        self.roster.get(idx).map(|p| p.id).unwrap_or(Id::ZERO)
    }

    pub fn get_index(&self, id: Id) -> Option<usize> {
        self.id_to_index.get(&id).copied()
    }

    pub fn contains(&self, id: Id) -> bool {
        self.id_to_index.contains_key(&id)
    }

    pub fn get_identity(&self, id: Id) -> Option<&PublicIdentity> {
        self.get_index(id).map(|i| &self.roster[i])
    }

    /// The roster entry one position after `id`, wrapping around the end
    /// (`Group::Next` in the original). `Id::ZERO` if `id` is not a
    /// member.
    pub fn next_after(&self, id: Id) -> Id {
        match self.get_index(id) {
            Some(idx) => self.get_id((idx + 1) % self.roster.len()),
            None => Id::ZERO,
        }
    }

    /// The roster entry one position before `id`, wrapping around the
    /// start (`Group::Previous` in the original).
    pub fn previous(&self, id: Id) -> Id {
        match self.get_index(id) {
            Some(idx) => self.get_id((idx + self.roster.len() - 1) % self.roster.len()),
            None => Id::ZERO,
        }
    }

    /// Returns a new group with `ident` inserted. The subgroup is
    /// recomputed under `FixedSubgroup`/`CompleteGroup`; under
    /// `ManagedSubgroup` the existing subgroup roster is preserved, since
    /// it is expected to evolve independently of the main roster.
    pub fn add_member(&self, ident: PublicIdentity) -> Group {
        let mut roster = self.roster.clone();
        roster.push(ident);
        self.rebuild(roster)
    }

    /// Returns a new group with `id` removed from the roster (and, for
    /// `ManagedSubgroup`, from the subgroup too, if present).
    pub fn remove_member(&self, id: Id) -> Group {
        let roster: Vec<_> = self
            .roster
            .iter()
            .filter(|p| p.id != id)
            .cloned()
            .collect();
        let mut rebuilt = self.rebuild(roster);
        if self.subgroup_policy == SubgroupPolicy::ManagedSubgroup {
            if let Some(sub) = &self.subgroup {
                let sub_roster: Vec<_> =
                    sub.roster.iter().filter(|p| p.id != id).cloned().collect();
                rebuilt.subgroup = Some(Box::new(Group::plain(sub_roster)));
            }
        }
        rebuilt
    }

    fn rebuild(&self, roster: Vec<PublicIdentity>) -> Group {
        match self.subgroup_policy {
            SubgroupPolicy::ManagedSubgroup => Group {
                roster: sorted_unique_roster(roster.clone()),
                id_to_index: index_roster(&sorted_unique_roster(roster)),
                leader: self.leader,
                subgroup_policy: SubgroupPolicy::ManagedSubgroup,
                subgroup: self.subgroup.clone(),
            },
            other => Group::new(roster, self.leader, other),
        }
    }

    /// `true` iff every member of `other` is a member of `self`
    /// (`IsSubset` in the original).
    pub fn is_subset(&self, other: &Group) -> bool {
        other.roster.iter().all(|p| self.contains(p.id))
    }

    /// Splits the symmetric difference between two rosters into members
    /// lost (present in `old`, absent from `new`) and gained (present in
    /// `new`, absent from `old`), matching `Group::Difference` in the
    /// original (`std::set_symmetric_difference` over sorted rosters).
    pub fn difference(old: &Group, new: &Group) -> (Vec<Id>, Vec<Id>) {
        let lost = old
            .roster
            .iter()
            .filter(|p| !new.contains(p.id))
            .map(|p| p.id)
            .collect();
        let gained = new
            .roster
            .iter()
            .filter(|p| !old.contains(p.id))
            .map(|p| p.id)
            .collect();
        (lost, gained)
    }

    /// The group sufficiency check of spec.md §4.7, parameterized on a
    /// caller-supplied connectivity predicate so it doesn't need to know
    /// about the transport layer.
    pub fn is_sufficient(
        &self,
        local_id: Id,
        minimum_round_size: usize,
        is_connected: impl Fn(Id) -> bool,
    ) -> bool {
        if self.roster.len() < minimum_round_size {
            return false;
        }
        let subgroup = match &self.subgroup {
            Some(s) => s,
            None => return false,
        };
        match self.subgroup_policy {
            SubgroupPolicy::DisabledGroup => false,
            SubgroupPolicy::CompleteGroup | SubgroupPolicy::FixedSubgroup => subgroup
                .roster
                .iter()
                .all(|p| p.id == local_id || is_connected(p.id)),
            SubgroupPolicy::ManagedSubgroup => {
                if subgroup.contains(local_id) {
                    subgroup
                        .roster
                        .iter()
                        .all(|p| p.id == local_id || is_connected(p.id))
                } else {
                    subgroup.roster.iter().any(|p| is_connected(p.id))
                }
            }
        }
    }
}

#[derive(serde::Serialize, serde::Deserialize)]
struct WireGroup {
    roster: Vec<PublicIdentity>,
    leader: Id,
    subgroup_policy: SubgroupPolicy,
    subgroup_roster: Option<Vec<PublicIdentity>>,
}

impl Group {
    /// Serializes the roster, leader, policy, and (if present) the
    /// subgroup roster, for `SM::Prepare`'s optional `group` field
    /// (spec.md §6).
    pub fn to_bytes(&self) -> Vec<u8> {
        let wire = WireGroup {
            roster: self.roster.clone(),
            leader: self.leader,
            subgroup_policy: self.subgroup_policy,
            subgroup_roster: self.subgroup.as_ref().map(|s| s.roster.clone()),
        };
        bincode::serialize(&wire).expect("Group serialization is infallible")
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, bincode::Error> {
        let wire: WireGroup = bincode::deserialize(bytes)?;
        Ok(match wire.subgroup_policy {
            SubgroupPolicy::ManagedSubgroup => Group::with_managed_subgroup(
                wire.roster,
                wire.leader,
                wire.subgroup_roster.unwrap_or_default(),
            ),
            other => Group::new(wire.roster, wire.leader, other),
        })
    }
}

impl PartialEq for Group {
    fn eq(&self, other: &Self) -> bool {
        if self.roster != other.roster
            || self.leader != other.leader
            || self.subgroup_policy != other.subgroup_policy
        {
            return false;
        }
        if self.subgroup_policy == SubgroupPolicy::DisabledGroup {
            return true;
        }
        match (&self.subgroup, &other.subgroup) {
            (None, None) => true,
            (Some(a), Some(b)) => a.roster.is_empty() && b.roster.is_empty() || a.roster == b.roster,
            _ => false,
        }
    }
}
impl Eq for Group {}
