// Copyright 2026 Dissent Contributors.
//
// This file is licensed under the GNU General Public License v3.0 or later
// <https://www.gnu.org/licenses/gpl-3.0.html>. This file may not be copied,
// modified, or distributed except according to that license.

use super::credentials::{DiffieHellmanPublic, VerificationKey};
use super::id::Id;
use serde::{Deserialize, Serialize};

/// `(Id, verification_key, dh_public, is_super_peer)` (spec.md §3).
///
/// Total-ordered first by `Id`, then by serialized verification key, then
/// by DH public component, matching `PublicIdentity::operator<` in
/// `examples/original_source/src/Identity/PublicIdentity.hpp`.
#[derive(Clone, Serialize, Deserialize)]
pub struct PublicIdentity {
    pub id: Id,
    pub verification_key: VerificationKey,
    pub dh_public: DiffieHellmanPublic,
    pub is_super_peer: bool,
}

impl PublicIdentity {
    pub fn new(
        id: Id,
        verification_key: VerificationKey,
        dh_public: DiffieHellmanPublic,
        is_super_peer: bool,
    ) -> Self {
        PublicIdentity {
            id,
            verification_key,
            dh_public,
            is_super_peer,
        }
    }
}

impl PartialEq for PublicIdentity {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.verification_key == other.verification_key
            && self.dh_public == other.dh_public
    }
}
impl Eq for PublicIdentity {}

impl PartialOrd for PublicIdentity {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PublicIdentity {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.id
            .cmp(&other.id)
            .then_with(|| self.verification_key.cmp(&other.verification_key))
            .then_with(|| self.dh_public.cmp(&other.dh_public))
    }
}
