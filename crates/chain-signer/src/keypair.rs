//! An Ed25519 keypair-backed `Signer`.

use async_trait::async_trait;
use chain_api::{Signer, SignedExtrinsic, SignerError};
use chain_types::address::Ss58Address;
use chain_types::agent::{PreparedTransaction, RegistryId};
use dcrypt::api::Signature as SignatureTrait;
use dcrypt::sign::eddsa::{Ed25519, Ed25519PublicKey, Ed25519SecretKey};
use rand::rngs::OsRng;
use serde::Serialize;

/// The wire shape a `SignedExtrinsic`'s bytes decode to. Not a real Substrate
/// extrinsic encoding — this subsystem never submits directly to a live runtime
/// without going through `ChainApi`, so a self-describing envelope is enough to
/// prove the call was signed by a specific key over specific bytes.
#[derive(Serialize)]
struct SignedEnvelope<'a> {
    call: &'a [u8],
    signature: Vec<u8>,
    public_key: Vec<u8>,
}

/// Signs prepared transactions with a single in-process Ed25519 keypair. Intended
/// for demonstrations and tests; a production host is expected to delegate to a
/// hardware wallet or browser extension instead.
pub struct KeypairSigner {
    public_key: Ed25519PublicKey,
    secret_key: Ed25519SecretKey,
    ss58_prefix: u16,
}

impl KeypairSigner {
    /// Generates a fresh random keypair.
    pub fn generate(ss58_prefix: u16) -> Result<Self, SignerError> {
        let mut rng = OsRng;
        let (public_key, secret_key) =
            Ed25519::keypair(&mut rng).map_err(|e| SignerError::Failed(format!("key generation failed: {e:?}")))?;
        Ok(Self { public_key, secret_key, ss58_prefix })
    }

    /// Derives a keypair from a 32-byte seed, for reproducible demos and tests.
    pub fn from_seed(seed: [u8; 32], ss58_prefix: u16) -> Result<Self, SignerError> {
        let secret_key =
            Ed25519SecretKey::from_seed(&seed).map_err(|e| SignerError::Failed(format!("invalid seed: {e:?}")))?;
        let public_key = secret_key.public_key().map_err(|e| SignerError::Failed(format!("key derivation failed: {e:?}")))?;
        Ok(Self { public_key, secret_key, ss58_prefix })
    }

    /// This signer's own address, SS58-encoded at its configured prefix.
    pub fn address(&self) -> String {
        let mut raw = [0u8; 32];
        raw.copy_from_slice(self.public_key.to_bytes().as_ref());
        Ss58Address::from_public_key(self.ss58_prefix, raw).encode(self.ss58_prefix)
    }
}

#[async_trait]
impl Signer for KeypairSigner {
    async fn sign(&self, tx: &PreparedTransaction, sender: &str) -> Result<SignedExtrinsic, SignerError> {
        let sender_key = Ss58Address::decode(sender).map_err(|e| SignerError::UnknownAccount(e.to_string()))?;
        let mut own_key = [0u8; 32];
        own_key.copy_from_slice(self.public_key.to_bytes().as_ref());
        if sender_key.public_key() != &own_key {
            return Err(SignerError::UnknownAccount(sender.to_string()));
        }

        let signature = Ed25519::sign(&tx.call_bytes, &self.secret_key)
            .map_err(|e| SignerError::Failed(format!("signing failed: {e:?}")))?;

        let envelope = SignedEnvelope {
            call: &tx.call_bytes,
            signature: signature.to_bytes().as_ref().to_vec(),
            public_key: own_key.to_vec(),
        };
        let bytes = serde_json::to_vec(&envelope).map_err(|e| SignerError::Failed(e.to_string()))?;

        Ok(SignedExtrinsic { registry: registry_of(tx), bytes })
    }
}

fn registry_of(tx: &PreparedTransaction) -> RegistryId {
    tx.registry.clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chain_types::agent::RegistryId as Rid;

    fn tx(sender_prefix: u16) -> (KeypairSigner, PreparedTransaction) {
        let signer = KeypairSigner::from_seed([7u8; 32], sender_prefix).unwrap();
        let tx = PreparedTransaction {
            registry: Rid("r".to_string()),
            section: "balances".to_string(),
            method: "transfer_allow_death".to_string(),
            call_bytes: b"some call".to_vec(),
            summary: "balances.transfer_allow_death".to_string(),
        };
        (signer, tx)
    }

    #[tokio::test]
    async fn signs_when_the_sender_matches_the_keypair() {
        let (signer, tx) = tx(0);
        let address = signer.address();
        let signed = signer.sign(&tx, &address).await.expect("should sign");
        assert_eq!(signed.registry, Rid("r".to_string()));
        assert!(!signed.bytes.is_empty());
    }

    #[tokio::test]
    async fn rejects_a_sender_that_does_not_match_the_keypair() {
        let (signer, tx) = tx(0);
        let other = KeypairSigner::from_seed([9u8; 32], 0).unwrap();
        let err = signer.sign(&tx, &other.address()).await.expect_err("should fail");
        assert!(matches!(err, SignerError::UnknownAccount(_)));
    }

    #[tokio::test]
    async fn is_insensitive_to_the_sender_address_prefix() {
        let (signer, tx) = tx(0);
        let reencoded = chain_types::address::reencode(&signer.address(), 42).unwrap();
        let signed = signer.sign(&tx, &reencoded).await.expect("should sign regardless of prefix");
        assert!(!signed.bytes.is_empty());
    }
}
