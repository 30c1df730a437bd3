// Copyright 2026 Dissent Contributors.
//
// This file is licensed under the GNU General Public License v3.0 or later
// <https://www.gnu.org/licenses/gpl-3.0.html>. This file may not be copied,
// modified, or distributed except according to that license.

//! `NullAuthenticator`/`TwoPhaseNullAuthenticator`: accept every member,
//! differing only in whether the challenge round trip is mandatory
//! first. Grounded on
//! `examples/original_source/src/Identity/Authentication/NullAuthenticator.hpp`
//! and the client-side `RequireRequestChallenge` flag in
//! `NullAuthenticate.hpp`/`TwoPhaseNullAuthenticate.hpp`, which this
//! module's leader-side variants mirror by tracking whether a member was
//! challenged before its response arrives.

use super::{sanity_check_identity, ChallengeResult, VerifyResult};
use crate::identity::{Id, PublicIdentity};
use std::collections::HashSet;

/// Accepts any well-formed identity without requiring a challenge first.
#[derive(Default)]
pub struct NullAuthenticator;

impl NullAuthenticator {
    pub fn new() -> Self {
        NullAuthenticator
    }

    pub fn request_challenge(&mut self, _member: Id, _data: &[u8]) -> ChallengeResult {
        Ok(Vec::new())
    }

    pub fn verify_response(&mut self, member: Id, data: &[u8]) -> VerifyResult {
        let ident: PublicIdentity =
            bincode::deserialize(data).map_err(|e| format!("malformed identity: {}", e))?;
        sanity_check_identity(member, &ident)?;
        Ok(ident)
    }
}

/// As [`NullAuthenticator`], but `verify_response` is rejected unless
/// `request_challenge` was already issued for that member.
#[derive(Default)]
pub struct TwoPhaseNullAuthenticator {
    challenged: HashSet<Id>,
}

impl TwoPhaseNullAuthenticator {
    pub fn new() -> Self {
        TwoPhaseNullAuthenticator::default()
    }

    pub fn request_challenge(&mut self, member: Id, _data: &[u8]) -> ChallengeResult {
        self.challenged.insert(member);
        Ok(Vec::new())
    }

    pub fn verify_response(&mut self, member: Id, data: &[u8]) -> VerifyResult {
        if !self.challenged.remove(&member) {
            return Err("verify_response without a prior request_challenge".to_string());
        }
        let ident: PublicIdentity =
            bincode::deserialize(data).map_err(|e| format!("malformed identity: {}", e))?;
        sanity_check_identity(member, &ident)?;
        Ok(ident)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::credentials::{DiffieHellmanPublic, VerificationKey};

    fn ident(id: Id) -> PublicIdentity {
        PublicIdentity::new(id, VerificationKey(vec![1, 2, 3]), DiffieHellmanPublic::empty(), false)
    }

    #[test]
    fn null_accepts_without_a_challenge() {
        let mut auth = NullAuthenticator::new();
        let id = Id::from_counter(1);
        let bytes = bincode::serialize(&ident(id)).unwrap();
        assert!(auth.verify_response(id, &bytes).is_ok());
    }

    #[test]
    fn two_phase_requires_a_prior_challenge() {
        let mut auth = TwoPhaseNullAuthenticator::new();
        let id = Id::from_counter(1);
        let bytes = bincode::serialize(&ident(id)).unwrap();
        assert!(auth.verify_response(id, &bytes).is_err());
        auth.request_challenge(id, &[]).unwrap();
        assert!(auth.verify_response(id, &bytes).is_ok());
    }

    #[test]
    fn rejects_identity_whose_id_does_not_match_sender() {
        let mut auth = NullAuthenticator::new();
        let claimed = Id::from_counter(2);
        let bytes = bincode::serialize(&ident(claimed)).unwrap();
        assert!(auth.verify_response(Id::from_counter(1), &bytes).is_err());
    }
}
