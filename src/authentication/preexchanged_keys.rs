// Copyright 2026 Dissent Contributors.
//
// This file is licensed under the GNU General Public License v3.0 or later
// <https://www.gnu.org/licenses/gpl-3.0.html>. This file may not be copied,
// modified, or distributed except according to that license.

//! `PreExchangedKeysAuthenticator`: the leader (Alice) side of the
//! mutual challenge/response protocol from Stinson's Protocol 9.6,
//! grounded on
//! `examples/original_source/src/Identity/Authentication/
//! PreExchangedKeyAuthenticator.hpp`+`.cpp`:
//!
//! 1. Bob sends a nonce `r_B` as his challenge request.
//! 2. Alice picks `r_A`, signs `(r_B, r_A)`, and sends back the signed
//!    message.
//! 3. Bob replies with his identity, `(r_B, r_A)`, and his own
//!    signature over it.
//! 4. Alice accepts once Bob's signature verifies and his echoed
//!    `r_A` matches the one she issued.

use super::{sanity_check_identity, ChallengeResult, VerifyResult};
use crate::identity::{Id, PrivateIdentity, PublicIdentity};
use ed25519_dalek::{PublicKey, Signature, Signer, Verifier};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::convert::TryFrom;

const NONCE_LEN: usize = 32;

#[derive(Serialize, Deserialize)]
struct ToSign {
    bob_nonce: Vec<u8>,
    alice_nonce: Vec<u8>,
}

#[derive(Serialize, Deserialize)]
struct Challenge {
    to_sign: Vec<u8>,
    signature: Vec<u8>,
}

#[derive(Serialize, Deserialize)]
struct ResponseMsg {
    bob_ident: PublicIdentity,
    bob_nonce: Vec<u8>,
    alice_nonce: Vec<u8>,
}

#[derive(Serialize, Deserialize)]
struct Response {
    msg: Vec<u8>,
    signature: Vec<u8>,
}

/// The leader side ("Alice") of the protocol, authenticating against a
/// fixed roster of pre-exchanged public identities.
pub struct PreExchangedKeysAuthenticator {
    alice_ident: PrivateIdentity,
    roster: HashMap<Id, PublicIdentity>,
    nonces: HashMap<Id, Vec<u8>>,
}

impl PreExchangedKeysAuthenticator {
    pub fn new(alice_ident: PrivateIdentity, roster: Vec<PublicIdentity>) -> Self {
        PreExchangedKeysAuthenticator {
            alice_ident,
            roster: roster.into_iter().map(|ident| (ident.id, ident)).collect(),
            nonces: HashMap::new(),
        }
    }

    pub fn request_challenge(&mut self, member: Id, data: &[u8]) -> ChallengeResult {
        if !self.roster.contains_key(&member) {
            return Err("member is not in the pre-exchanged roster".to_string());
        }
        if data.is_empty() {
            return Err("empty nonce".to_string());
        }

        let mut alice_nonce = vec![0u8; NONCE_LEN];
        rand::thread_rng().fill_bytes(&mut alice_nonce);

        let to_sign = bincode::serialize(&ToSign {
            bob_nonce: data.to_vec(),
            alice_nonce: alice_nonce.clone(),
        })
        .map_err(|e| format!("failed to encode challenge: {}", e))?;
        let signature = self.alice_ident.signing_key.sign(&to_sign);

        self.nonces.insert(member, alice_nonce);
        bincode::serialize(&Challenge {
            to_sign,
            signature: signature.to_bytes().to_vec(),
        })
        .map_err(|e| format!("failed to encode challenge: {}", e))
    }

    pub fn verify_response(&mut self, member: Id, data: &[u8]) -> VerifyResult {
        let nonce = self
            .nonces
            .get(&member)
            .ok_or_else(|| "response for a member with no outstanding challenge".to_string())?
            .clone();

        let response: Response =
            bincode::deserialize(data).map_err(|e| format!("malformed response: {}", e))?;

        let bob_key = &self
            .roster
            .get(&member)
            .ok_or_else(|| "member is not in the pre-exchanged roster".to_string())?
            .verification_key;
        let bob_public = PublicKey::from_bytes(bob_key.as_bytes())
            .map_err(|e| format!("invalid verification key: {}", e))?;
        let signature = Signature::try_from(response.signature.as_slice())
            .map_err(|e| format!("malformed signature: {}", e))?;
        bob_public
            .verify(&response.msg, &signature)
            .map_err(|_| "signature does not verify".to_string())?;

        let parsed: ResponseMsg = bincode::deserialize(&response.msg)
            .map_err(|e| format!("malformed response message: {}", e))?;
        sanity_check_identity(member, &parsed.bob_ident)?;
        if parsed.alice_nonce != nonce {
            return Err("nonce mismatch".to_string());
        }

        self.nonces.remove(&member);
        Ok(parsed.bob_ident)
    }
}
