// Copyright 2026 Dissent Contributors.
//
// This file is licensed under the GNU General Public License v3.0 or later
// <https://www.gnu.org/licenses/gpl-3.0.html>. This file may not be copied,
// modified, or distributed except according to that license.

use super::credentials::{DiffieHellmanPublic, VerificationKey};
use super::id::Id;
use super::public_identity::PublicIdentity;

/// `(Id, signing_key, dh_private, is_super_peer)` (spec.md §3). Never
/// leaves the owner; only `public_identity_of` crosses the boundary into
/// wire messages.
pub struct PrivateIdentity {
    pub id: Id,
    pub signing_key: ed25519_dalek::Keypair,
    pub dh_private: x25519_dalek::StaticSecret,
    pub is_super_peer: bool,
}

impl PrivateIdentity {
    pub fn new(
        id: Id,
        signing_key: ed25519_dalek::Keypair,
        dh_private: x25519_dalek::StaticSecret,
        is_super_peer: bool,
    ) -> Self {
        PrivateIdentity {
            id,
            signing_key,
            dh_private,
            is_super_peer,
        }
    }
}

/// Derives the public identity carried in a `PublicIdentity`, the Rust
/// equivalent of `GetPublicIdentity(PrivateIdentity)` in
/// `examples/original_source/src/Identity/PrivateIdentity.hpp`.
pub fn public_identity_of(ident: &PrivateIdentity) -> PublicIdentity {
    let verification_key = VerificationKey::from(ident.signing_key.public);
    let dh_public = DiffieHellmanPublic::from(x25519_dalek::PublicKey::from(&ident.dh_private));
    PublicIdentity::new(ident.id, verification_key, dh_public, ident.is_super_peer)
}
