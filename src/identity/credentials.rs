// Copyright 2026 Dissent Contributors.
//
// This file is licensed under the GNU General Public License v3.0 or later
// <https://www.gnu.org/licenses/gpl-3.0.html>. This file may not be copied,
// modified, or distributed except according to that license.

//! Narrow trait seams over the cryptographic primitives spec.md §1 names
//! as an external collaborator. The crate never implements signing or key
//! agreement itself; it only defines the shapes `Group`/`PublicIdentity`/
//! `Authenticator` need, backed here by `ed25519-dalek`/`x25519-dalek` so
//! the rest of the crate and its tests have something concrete to hold.

use serde::{Deserialize, Serialize};

/// A verification key usable to check a signature produced by the
/// matching `SigningKey`. Distinct from `signature::Verifier` so it can be
/// stored, compared and ordered as plain bytes (spec.md §3: public
/// identities are ordered by "serialized verification key").
#[derive(Clone, Serialize, Deserialize)]
pub struct VerificationKey(#[serde(with = "serde_bytes")] pub Vec<u8>);

impl VerificationKey {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl PartialEq for VerificationKey {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}
impl Eq for VerificationKey {}
impl PartialOrd for VerificationKey {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for VerificationKey {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.cmp(&other.0)
    }
}

impl From<ed25519_dalek::PublicKey> for VerificationKey {
    fn from(key: ed25519_dalek::PublicKey) -> Self {
        VerificationKey(key.to_bytes().to_vec())
    }
}

/// A Diffie-Hellman public component, ordered and compared as raw bytes
/// (spec.md §3's third ordering key for public identities).
#[derive(Clone, Serialize, Deserialize)]
pub struct DiffieHellmanPublic(#[serde(with = "serde_bytes")] pub Vec<u8>);

impl DiffieHellmanPublic {
    /// The original returns an empty byte array for an absent/unknown DH
    /// key rather than an `Option` (`Group::EmptyKey`); kept here for
    /// parity with `Group::get_public_diffie_hellman`'s out-of-range case.
    pub fn empty() -> Self {
        DiffieHellmanPublic(Vec::new())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl PartialEq for DiffieHellmanPublic {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}
impl Eq for DiffieHellmanPublic {}
impl PartialOrd for DiffieHellmanPublic {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for DiffieHellmanPublic {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.cmp(&other.0)
    }
}

impl From<x25519_dalek::PublicKey> for DiffieHellmanPublic {
    fn from(key: x25519_dalek::PublicKey) -> Self {
        DiffieHellmanPublic(key.as_bytes().to_vec())
    }
}
