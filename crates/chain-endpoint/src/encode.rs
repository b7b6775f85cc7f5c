//! Minimal SCALE encoding helpers for the two pallets this workspace constructs
//! calls against (`balances`, `utility`). Full runtime-generic SCALE encoding would
//! require a type-level codegen step this workspace does not take on; instead we hand
//! -encode the handful of argument shapes the safe builder ever produces.

use parity_scale_codec::{Compact, Encode};

/// SCALE-encodes a `MultiAddress::Id(AccountId32)` pointing at `public_key`.
pub fn encode_multi_address(public_key: &[u8; 32]) -> Vec<u8> {
    let mut out = Vec::with_capacity(33);
    out.push(0u8); // MultiAddress::Id variant index
    out.extend_from_slice(public_key);
    out
}

/// SCALE-encodes a balance as `Compact<u128>`.
pub fn encode_compact_balance(value: u128) -> Vec<u8> {
    Compact(value).encode()
}

/// SCALE-encodes a full call: `[pallet_index, call_index] ++ args`.
pub fn encode_call(pallet_index: u8, call_index: u8, mut args: Vec<u8>) -> Vec<u8> {
    let mut out = Vec::with_capacity(2 + args.len());
    out.push(pallet_index);
    out.push(call_index);
    out.append(&mut args);
    out
}

/// SCALE-encodes `balances.transfer_allow_death` / `transfer_keep_alive` / legacy
/// `transfer` args: `(dest: MultiAddress, value: Compact<u128>)`.
pub fn encode_transfer_args(recipient_public_key: &[u8; 32], value: u128) -> Vec<u8> {
    let mut out = encode_multi_address(recipient_public_key);
    out.extend(encode_compact_balance(value));
    out
}

/// SCALE-encodes `utility.batch` / `batch_all` args: `(calls: Vec<RuntimeCall>)`,
/// where each element is an already fully-encoded call's bytes.
pub fn encode_batch_args(calls: &[Vec<u8>]) -> Vec<u8> {
    let mut out = Compact(calls.len() as u32).encode();
    for call in calls {
        out.extend_from_slice(call);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multi_address_id_is_one_plus_thirty_two_bytes() {
        let pk = [7u8; 32];
        let encoded = encode_multi_address(&pk);
        assert_eq!(encoded.len(), 33);
        assert_eq!(encoded[0], 0);
        assert_eq!(&encoded[1..], &pk[..]);
    }

    #[test]
    fn transfer_args_concatenate_address_then_compact_value() {
        let pk = [1u8; 32];
        let encoded = encode_transfer_args(&pk, 15_000_000_000u128);
        let expected_value = encode_compact_balance(15_000_000_000u128);
        assert_eq!(&encoded[..33], &encode_multi_address(&pk)[..]);
        assert_eq!(&encoded[33..], &expected_value[..]);
    }

    #[test]
    fn batch_args_prefix_with_a_compact_length() {
        let calls = vec![vec![1, 2, 3], vec![4, 5]];
        let encoded = encode_batch_args(&calls);
        assert_eq!(&encoded[1..], &[1, 2, 3, 4, 5][..]);
    }
}
