// Copyright 2026 Dissent Contributors.
//
// This file is licensed under the GNU General Public License v3.0 or later
// <https://www.gnu.org/licenses/gpl-3.0.html>. This file may not be copied,
// modified, or distributed except according to that license.

//! spec.md §8 scenarios covering the tolerant-round blame sub-protocol:
//! an `Accusation`'s wire round trip, and `BlameMatrix` singling out the
//! one participant whose alibi disagrees with its own recorded output.

use dissent::anonymity::tolerant::{Accusation, AccusationError, BlameMatrix};

/// spec.md §8 scenario 4: the example accusation bytes `00 00 00 07 00
/// 00 00 2A 03` decode to phase 7, byte_idx 42, bit_idx 3.
#[test]
fn wire_bytes_decode_to_the_documented_phase_and_indices() {
    let bytes = [0u8, 0, 0, 7, 0, 0, 0, 0x2A, 3];
    let acc = Accusation::from_bytes(&bytes).unwrap();
    assert_eq!(acc.phase(), 7);
    assert_eq!(acc.byte_idx(), 42);
    assert_eq!(acc.bit_idx(), 3);
    assert_eq!(acc.to_bytes(), bytes);
}

/// An accusation built from a corruption bitmask derives `bit_idx` from
/// the least-significant set bit, then round-trips through the wire
/// format unchanged.
#[test]
fn accusation_built_from_a_bitmask_round_trips() {
    let acc = Accusation::new(12, 99, 0b0001_0000).unwrap();
    assert_eq!(acc.bit_idx(), 4);
    let bytes = acc.to_bytes();
    assert_eq!(Accusation::from_bytes(&bytes).unwrap(), acc);
}

/// A zero bitmask names no corrupted bit and is rejected outright.
#[test]
fn zero_bitmask_is_rejected() {
    assert_eq!(Accusation::new(0, 0, 0), Err(AccusationError::InvalidMask(0)));
}

/// spec.md §8 scenario 6: blame identifies the deviator. 4 users, 2
/// servers; every alibi is consistent except server 1's claim about
/// user 2, which server 1 then contradicts with its own output bit.
#[test]
fn blame_matrix_identifies_the_one_deviating_server() {
    let mut matrix = BlameMatrix::new(4, 2);

    let user_alibis = [
        vec![true, false],
        vec![false, false],
        vec![true, true],
        vec![false, true],
    ];
    for (user_idx, bits) in user_alibis.iter().enumerate() {
        matrix.add_user_alibi(user_idx, bits);
        let xor = bits.iter().fold(false, |a, b| a ^ b);
        matrix.add_user_output_bit(user_idx, xor);
    }

    // Server 0's alibi is honest and matches its own output.
    let server0_bits = vec![true, false, true, false];
    matrix.add_server_alibi(0, &server0_bits);
    matrix.add_server_output_bit(0, server0_bits.iter().fold(false, |a, b| a ^ b));

    // Server 1 claims the same bits the users reported...
    let server1_bits = vec![false, false, true, true];
    matrix.add_server_alibi(1, &server1_bits);
    // ...but reports an output bit that doesn't match their XOR.
    let honest_output = server1_bits.iter().fold(false, |a, b| a ^ b);
    matrix.add_server_output_bit(1, !honest_output);

    assert!(matrix.bad_users().is_empty());
    assert_eq!(matrix.bad_servers(), vec![1]);
    // The lie is in server 1's own reported output, not in a
    // user/server alibi disagreement, so no cell-level conflict exists.
    assert!(matrix.conflicts(3).is_empty());
}

/// Conflicting user/server alibi bits for the same cell surface as a
/// `Conflict`, tagged with the slot index the caller supplies.
#[test]
fn disagreeing_alibi_bits_surface_as_a_conflict_for_the_slot() {
    let mut matrix = BlameMatrix::new(2, 2);
    matrix.add_user_alibi(0, &[true, false]);
    matrix.add_user_alibi(1, &[false, true]);
    matrix.add_server_alibi(0, &[true, true]);
    matrix.add_server_alibi(1, &[false, true]);

    let conflicts = matrix.conflicts(5);
    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0].slot_idx, 5);
    assert_eq!(conflicts[0].user_idx, 1);
    assert_eq!(conflicts[0].server_idx, 0);
    assert!(!conflicts[0].user_bit);
    assert!(conflicts[0].server_bit);
}
