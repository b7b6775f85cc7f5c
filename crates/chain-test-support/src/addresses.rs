//! Deterministic, valid SS58 test addresses.
//!
//! Encoding a real address requires a 32-byte public key; these build one from a
//! repeated seed byte so tests can produce distinct, checksum-valid addresses without
//! needing an actual keypair.

use chain_types::address::Ss58Address;

/// A valid SS58 address (prefix 0) derived from `seed`.
pub fn sample_address(seed: u8) -> String {
    sample_address_with_prefix(0, seed)
}

/// A valid SS58 address encoded with a given prefix, derived from `seed`.
pub fn sample_address_with_prefix(prefix: u16, seed: u8) -> String {
    Ss58Address::from_public_key(prefix, [seed; 32]).encode(prefix)
}
