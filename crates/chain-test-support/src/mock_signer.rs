//! Fake signer and approval-handler implementations for the executioner's tests.

use async_trait::async_trait;
use chain_api::{
    ApprovalHandler, BatchSigningRequest, SignedExtrinsic, Signer, SignerError, SigningRequest,
};
use chain_types::agent::{PreparedTransaction, RegistryId};
use parking_lot::Mutex;

/// A signer that always succeeds, recording every call for assertions about
/// at-most-once submission.
#[derive(Default)]
pub struct RecordingSigner {
    calls: Mutex<Vec<(PreparedTransaction, String)>>,
}

impl RecordingSigner {
    /// A fresh signer with no recorded calls.
    pub fn new() -> Self {
        Self::default()
    }

    /// How many times [`Signer::sign`] has been invoked.
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait]
impl Signer for RecordingSigner {
    async fn sign(&self, tx: &PreparedTransaction, sender: &str) -> Result<SignedExtrinsic, SignerError> {
        self.calls.lock().push((tx.clone(), sender.to_string()));
        Ok(SignedExtrinsic { registry: tx.registry.clone(), bytes: tx.call_bytes.clone() })
    }
}

/// A signer that always declines, for rejection-path tests.
pub struct RefusingSigner;

#[async_trait]
impl Signer for RefusingSigner {
    async fn sign(&self, _tx: &PreparedTransaction, _sender: &str) -> Result<SignedExtrinsic, SignerError> {
        Err(SignerError::Declined)
    }
}

/// An approval handler with a fixed verdict, recording how many times it was asked.
pub struct FixedApprovalHandler {
    approve: bool,
    single_requests: Mutex<u32>,
    batch_requests: Mutex<u32>,
}

impl FixedApprovalHandler {
    /// An approval handler that always returns `approve`.
    pub fn new(approve: bool) -> Self {
        Self { approve, single_requests: Mutex::new(0), batch_requests: Mutex::new(0) }
    }

    /// How many single-item approval requests were issued.
    pub fn single_request_count(&self) -> u32 {
        *self.single_requests.lock()
    }

    /// How many batch approval requests were issued.
    pub fn batch_request_count(&self) -> u32 {
        *self.batch_requests.lock()
    }
}

#[async_trait]
impl ApprovalHandler for FixedApprovalHandler {
    async fn request_approval(&self, _request: &SigningRequest) -> bool {
        *self.single_requests.lock() += 1;
        self.approve
    }

    async fn request_batch_approval(&self, _request: &BatchSigningRequest) -> bool {
        *self.batch_requests.lock() += 1;
        self.approve
    }
}

/// Asserts the registry on a signed extrinsic matches expectations, a common
/// end-of-test check for cross-registry scenarios.
pub fn assert_registry(signed: &SignedExtrinsic, expected: &RegistryId) {
    assert_eq!(&signed.registry, expected, "signed extrinsic registry mismatch");
}
