// Copyright 2026 Dissent Contributors.
//
// This file is licensed under the GNU General Public License v3.0 or later
// <https://www.gnu.org/licenses/gpl-3.0.html>. This file may not be copied,
// modified, or distributed except according to that license.

//! `LrsAuthenticator`: one-shot, anonymous authentication against a
//! linkable ring signature, grounded on
//! `examples/original_source/src/Identity/Authentication/
//! LRSAuthenticator.hpp`+`.cpp`. The ring signature scheme itself is an
//! external primitive (spec.md §1 Non-goals); this crate only needs the
//! shape of its verifier, expressed as the [`LinkableRingVerifier`] trait
//! seam so a real implementation can be plugged in without touching
//! session logic. No challenge round trip is required: the signed
//! identity is itself the proof of membership.

use super::{sanity_check_identity, ChallengeResult, VerifyResult};
use crate::identity::{Id, PublicIdentity};
use std::collections::HashSet;
use std::sync::Arc;

/// Verifies a linkable ring signature over a message and extracts its
/// linkage tag, the quantity the authenticator tracks to reject a second
/// signature produced by the same signing key (spec.md §9 Design Note).
pub trait LinkableRingVerifier: Send + Sync {
    /// Checks `signature` against `message` under this verifier's ring.
    fn verify(&self, message: &[u8], signature: &[u8]) -> bool;

    /// Extracts the linkage tag embedded in `signature`, without
    /// re-verifying it.
    fn tag_of(&self, signature: &[u8]) -> Vec<u8>;
}

#[derive(serde::Serialize, serde::Deserialize)]
struct Response {
    identity: Vec<u8>,
    signature: Vec<u8>,
}

/// Authenticates members anonymously: anyone who can produce a valid
/// signature under the ring may join, but each linkage tag may only be
/// used once (preventing a single ring member from registering twice).
pub struct LrsAuthenticator {
    verifier: Arc<dyn LinkableRingVerifier>,
    tags: HashSet<Vec<u8>>,
}

impl LrsAuthenticator {
    pub fn new(verifier: Arc<dyn LinkableRingVerifier>) -> Self {
        LrsAuthenticator {
            verifier,
            tags: HashSet::new(),
        }
    }

    /// No challenge is needed; the signed identity carries its own proof.
    pub fn request_challenge(&mut self, _member: Id, _data: &[u8]) -> ChallengeResult {
        Ok(Vec::new())
    }

    pub fn verify_response(&mut self, member: Id, data: &[u8]) -> VerifyResult {
        let response: Response =
            bincode::deserialize(data).map_err(|e| format!("malformed response: {}", e))?;

        let ident: PublicIdentity = bincode::deserialize(&response.identity)
            .map_err(|e| format!("malformed identity: {}", e))?;
        sanity_check_identity(member, &ident)?;
        if ident.dh_public.as_bytes().is_empty() {
            return Err("invalid DH key".to_string());
        }

        let tag = self.verifier.tag_of(&response.signature);
        if self.tags.contains(&tag) {
            return Err("ring signature tag already registered".to_string());
        }

        if !self.verifier.verify(&response.identity, &response.signature) {
            return Err("invalid ring signature".to_string());
        }

        self.tags.insert(tag);
        Ok(ident)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::credentials::{DiffieHellmanPublic, VerificationKey};

    struct FakeRing {
        valid: bool,
    }

    impl LinkableRingVerifier for FakeRing {
        fn verify(&self, _message: &[u8], _signature: &[u8]) -> bool {
            self.valid
        }

        fn tag_of(&self, signature: &[u8]) -> Vec<u8> {
            signature.to_vec()
        }
    }

    fn ident(id: Id) -> PublicIdentity {
        PublicIdentity::new(
            id,
            VerificationKey(vec![9, 9, 9]),
            DiffieHellmanPublic(vec![1]),
            false,
        )
    }

    fn response_bytes(id: Id, tag: Vec<u8>) -> Vec<u8> {
        let identity = bincode::serialize(&ident(id)).unwrap();
        bincode::serialize(&Response {
            identity,
            signature: tag,
        })
        .unwrap()
    }

    #[test]
    fn accepts_a_fresh_valid_signature() {
        let mut auth = LrsAuthenticator::new(Arc::new(FakeRing { valid: true }));
        let id = Id::from_counter(1);
        let data = response_bytes(id, vec![1, 2, 3]);
        assert!(auth.verify_response(id, &data).is_ok());
    }

    #[test]
    fn rejects_a_reused_tag() {
        let mut auth = LrsAuthenticator::new(Arc::new(FakeRing { valid: true }));
        let first = Id::from_counter(1);
        let second = Id::from_counter(2);
        let tag = vec![1, 2, 3];
        assert!(auth.verify_response(first, &response_bytes(first, tag.clone())).is_ok());
        assert!(auth.verify_response(second, &response_bytes(second, tag)).is_err());
    }

    #[test]
    fn rejects_an_invalid_signature() {
        let mut auth = LrsAuthenticator::new(Arc::new(FakeRing { valid: false }));
        let id = Id::from_counter(1);
        let data = response_bytes(id, vec![4, 5, 6]);
        assert!(auth.verify_response(id, &data).is_err());
    }
}
