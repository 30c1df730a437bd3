// Copyright 2026 Dissent Contributors.
//
// This file is licensed under the GNU General Public License v3.0 or later
// <https://www.gnu.org/licenses/gpl-3.0.html>. This file may not be copied,
// modified, or distributed except according to that license.

//! Identity and group types (spec.md §3): `Id`, `PublicIdentity`,
//! `PrivateIdentity`, `Group`.

pub mod credentials;
pub mod group;
pub mod id;
pub mod private_identity;
pub mod public_identity;

pub use credentials::{DiffieHellmanPublic, VerificationKey};
pub use group::{Group, SubgroupPolicy};
pub use id::{Id, ID_LEN};
pub use private_identity::{public_identity_of, PrivateIdentity};
pub use public_identity::PublicIdentity;
