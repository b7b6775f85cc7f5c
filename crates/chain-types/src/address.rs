//! SS58 address decoding and re-encoding.
//!
//! SS58 is base58check with a chain-specific numeric prefix baked into the payload:
//! `base58(prefix_bytes ++ public_key ++ checksum)` where the checksum is the first
//! `CHECKSUM_LEN` bytes of `blake2b-512("SS58PRE" ++ prefix_bytes ++ public_key)`.
//! A public key therefore encodes to a different string on every chain; re-encoding
//! means decoding ignoring the source prefix and encoding again with the target one.

use dcrypt::algorithms::hash::blake2::Blake2b;
use dcrypt::algorithms::hash::HashFunction;

const SS58_PREFIX_SALT: &[u8] = b"SS58PRE";
const CHECKSUM_LEN: usize = 2;
const PUBLIC_KEY_LEN: usize = 32;

/// Errors decoding or re-encoding an SS58 address.
#[derive(Debug, Clone, thiserror::Error)]
pub enum AddressError {
    /// The string was not valid base58.
    #[error("address is not valid base58: {0}")]
    InvalidBase58(String),
    /// The decoded payload had an unexpected length.
    #[error("address payload has unexpected length {0}")]
    InvalidLength(usize),
    /// The trailing checksum bytes did not match the computed checksum.
    #[error("address checksum mismatch")]
    ChecksumMismatch,
}

impl crate::error::ErrorCode for AddressError {
    fn code(&self) -> &'static str {
        match self {
            Self::InvalidBase58(_) => "INVALID_ADDRESS",
            Self::InvalidLength(_) => "INVALID_ADDRESS",
            Self::ChecksumMismatch => "INVALID_ADDRESS",
        }
    }
}

/// A decoded SS58 address: the raw public key plus the chain prefix it was encoded with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ss58Address {
    prefix: u16,
    public_key: [u8; PUBLIC_KEY_LEN],
}

impl Ss58Address {
    /// Builds an address directly from a known raw public key, bypassing `decode`.
    /// Used when an address is derived from a keypair rather than parsed from input.
    pub fn from_public_key(prefix: u16, public_key: [u8; PUBLIC_KEY_LEN]) -> Self {
        Self { prefix, public_key }
    }

    /// Decodes a base58check SS58 string, validating its checksum.
    ///
    /// Only the simple (single-byte prefix, 32-byte public key) address form is
    /// supported, which covers every Polkadot-style chain prefix in `0..64`.
    pub fn decode(address: &str) -> Result<Self, AddressError> {
        let raw = bs58::decode(address)
            .into_vec()
            .map_err(|e| AddressError::InvalidBase58(e.to_string()))?;

        if raw.len() != 1 + PUBLIC_KEY_LEN + CHECKSUM_LEN {
            return Err(AddressError::InvalidLength(raw.len()));
        }

        let (body, checksum) = raw.split_at(raw.len() - CHECKSUM_LEN);
        let expected = checksum_bytes(body);
        if checksum != expected {
            return Err(AddressError::ChecksumMismatch);
        }

        let prefix = body[0] as u16;
        let mut public_key = [0u8; PUBLIC_KEY_LEN];
        public_key.copy_from_slice(&body[1..]);

        Ok(Self { prefix, public_key })
    }

    /// Re-encodes this address's raw public key using a (possibly different) prefix,
    /// ignoring the prefix it was originally decoded with.
    pub fn encode(&self, prefix: u16) -> String {
        let mut body = Vec::with_capacity(1 + PUBLIC_KEY_LEN);
        body.push(prefix as u8);
        body.extend_from_slice(&self.public_key);
        let checksum = checksum_bytes(&body);
        body.extend_from_slice(&checksum);
        bs58::encode(body).into_string()
    }

    /// The prefix this address was decoded with.
    pub fn prefix(&self) -> u16 {
        self.prefix
    }

    /// The raw 32-byte public key, independent of any chain prefix.
    pub fn public_key(&self) -> &[u8; PUBLIC_KEY_LEN] {
        &self.public_key
    }
}

/// Decodes `address` and re-encodes it using `target_prefix`. A no-op (returns the
/// same string) when the address is already encoded with the target prefix.
pub fn reencode(address: &str, target_prefix: u16) -> Result<String, AddressError> {
    let decoded = Ss58Address::decode(address)?;
    Ok(decoded.encode(target_prefix))
}

fn checksum_bytes(body: &[u8]) -> [u8; CHECKSUM_LEN] {
    let mut preimage = Vec::with_capacity(SS58_PREFIX_SALT.len() + body.len());
    preimage.extend_from_slice(SS58_PREFIX_SALT);
    preimage.extend_from_slice(body);
    let digest = Blake2b::digest(&preimage).expect("blake2b-512 digest never fails");
    let bytes = digest.as_ref();
    let mut checksum = [0u8; CHECKSUM_LEN];
    checksum.copy_from_slice(&bytes[..CHECKSUM_LEN]);
    checksum
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_public_key() -> [u8; PUBLIC_KEY_LEN] {
        let mut key = [0u8; PUBLIC_KEY_LEN];
        for (i, b) in key.iter_mut().enumerate() {
            *b = i as u8;
        }
        key
    }

    #[test]
    fn encode_then_decode_round_trips_the_public_key() {
        let addr = Ss58Address {
            prefix: 0,
            public_key: sample_public_key(),
        };
        let encoded = addr.encode(2);
        let decoded = Ss58Address::decode(&encoded).unwrap();
        assert_eq!(decoded.public_key(), addr.public_key());
        assert_eq!(decoded.prefix(), 2);
    }

    #[test]
    fn reencoding_with_same_prefix_is_a_no_op() {
        let addr = Ss58Address {
            prefix: 42,
            public_key: sample_public_key(),
        };
        let encoded = addr.encode(42);
        let reencoded = reencode(&encoded, 42).unwrap();
        assert_eq!(encoded, reencoded);
    }

    #[test]
    fn rejects_tampered_checksum() {
        let addr = Ss58Address {
            prefix: 0,
            public_key: sample_public_key(),
        };
        let mut raw = bs58::decode(addr.encode(0)).into_vec().unwrap();
        *raw.last_mut().unwrap() ^= 0xff;
        let tampered = bs58::encode(raw).into_string();
        assert!(matches!(
            Ss58Address::decode(&tampered),
            Err(AddressError::ChecksumMismatch)
        ));
    }

    #[test]
    fn rejects_wrong_length_payload() {
        let short = bs58::encode([0u8; 10]).into_string();
        assert!(matches!(
            Ss58Address::decode(&short),
            Err(AddressError::InvalidLength(_))
        ));
    }
}
