// Copyright 2026 Dissent Contributors.
//
// This file is licensed under the GNU General Public License v3.0 or later
// <https://www.gnu.org/licenses/gpl-3.0.html>. This file may not be copied,
// modified, or distributed except according to that license.

//! `GroupHolder`: the single owning slot a session installs a new
//! [`Group`] value into, replacing the old one atomically (spec.md §5,
//! "the group is immutable; updates produce new group values installed
//! atomically into the group holder"; spec.md §9 Design Note, "owned
//! group values instead of shared mutable groups"). Grounded on
//! `examples/original_source/src/Identity/GroupHolder.hpp`, reduced from
//! a `QObject` with a `GroupChange` signal to a plain cell, since the
//! crate's callback story already lives on `Session` itself.

use crate::identity::group::Group;
use std::cell::RefCell;

/// Holds the session's current group. `Group` is cheaply `Clone`d out on
/// read so callers (including a round already in flight against the
/// previous value) keep a stable snapshot for the duration of their
/// handler (spec.md §9, "concurrent readers of a previous value remain
/// valid for the duration of their handler").
pub struct GroupHolder {
    group: RefCell<Group>,
}

impl GroupHolder {
    pub fn new(group: Group) -> Self {
        GroupHolder {
            group: RefCell::new(group),
        }
    }

    pub fn group(&self) -> Group {
        self.group.borrow().clone()
    }

    pub fn set_group(&self, group: Group) {
        *self.group.borrow_mut() = group;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::{Id, SubgroupPolicy};

    #[test]
    fn set_group_replaces_the_held_value() {
        let holder = GroupHolder::new(Group::empty());
        let replacement = Group::new(vec![], Id::from_counter(1), SubgroupPolicy::CompleteGroup);
        holder.set_group(replacement.clone());
        assert_eq!(holder.group(), replacement);
    }
}
