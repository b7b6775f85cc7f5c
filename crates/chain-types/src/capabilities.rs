//! The immutable `ChainCapabilities` snapshot captured once per execution session.

use crate::amount::Amount;
use serde::{Deserialize, Serialize};

/// Which native-transfer and batch methods a connected runtime exposes, plus the
/// constants needed to build and display a transfer. Captured once per session;
/// re-detection requires opening a new session (see `chain-capability`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainCapabilities {
    /// `balances.transfer_allow_death` is present.
    pub has_transfer_allow_death: bool,
    /// `balances.transfer_keep_alive` is present.
    pub has_transfer_keep_alive: bool,
    /// Only the legacy `balances.transfer` is present (superseded by the two above).
    pub has_legacy_transfer: bool,
    /// `utility.batch` / `utility.batch_all` are present.
    pub has_utility: bool,
    /// `utility.batch_all` specifically is present (required for atomic batches).
    pub has_batch_all: bool,
    /// The chain's SS58 address prefix.
    pub ss58_prefix: u16,
    /// Decimal places of the native token.
    pub decimals: u32,
    /// The native token's ticker symbol.
    pub symbol: String,
    /// The existential deposit, in the smallest unit.
    pub existential_deposit: Amount,
    /// The runtime's `specName`, e.g. `"polkadot"`.
    pub spec_name: String,
    /// The runtime's `specVersion`.
    pub spec_version: u32,
    /// True if probing found nothing and every field above fell back to a default.
    pub used_defaults: bool,
}

impl ChainCapabilities {
    /// The conservative defaults used when a probe finds nothing: SS58 prefix 0,
    /// 10 decimals, zero existential deposit (with a warning from the caller).
    pub fn defaults() -> Self {
        Self {
            has_transfer_allow_death: false,
            has_transfer_keep_alive: false,
            has_legacy_transfer: false,
            has_utility: false,
            has_batch_all: false,
            ss58_prefix: 0,
            decimals: 10,
            symbol: String::new(),
            existential_deposit: Amount::zero(),
            spec_name: String::new(),
            spec_version: 0,
            used_defaults: true,
        }
    }

    /// Any transfer method at all is available.
    pub fn has_any_transfer(&self) -> bool {
        self.has_transfer_allow_death || self.has_transfer_keep_alive || self.has_legacy_transfer
    }
}
