#![forbid(unsafe_code)]
#![deny(missing_docs)]

//! # Capability detector
//!
//! Probes one active `ExecutionSession` once and captures an immutable
//! [`ChainCapabilities`] snapshot. Re-detection is never performed in place; a new
//! session means a new snapshot, keeping capabilities and live connection state from
//! being conflated (see the "Conflation of configuration and state" design note).

use chain_api::ExecutionSession;
use chain_types::capabilities::ChainCapabilities;
use chain_types::error::Warning;

/// Detects capabilities against an active session. The detector does no failover of
/// its own: if a probe fails, the session itself is considered unusable and the
/// error is surfaced rather than retried.
pub async fn detect(session: &ExecutionSession) -> Result<(ChainCapabilities, Vec<Warning>), DetectError> {
    let api = session.api().map_err(|e| DetectError::SessionInactive(e.to_string()))?;
    let mut warnings = Vec::new();

    let has_transfer_allow_death = api.has_call("balances", "transfer_allow_death").await?;
    let has_transfer_keep_alive = api.has_call("balances", "transfer_keep_alive").await?;
    let has_legacy_transfer = api.has_call("balances", "transfer").await?;
    let has_utility = api.has_call("utility", "batch").await?;
    let has_batch_all = api.has_call("utility", "batch_all").await?;

    let ss58_prefix = match api.ss58_prefix().await? {
        Some(p) => p,
        None => {
            warnings.push(Warning::new("missing_ss58_prefix", "chain did not advertise an SS58 prefix; defaulting to 0"));
            0
        }
    };
    let decimals = match api.token_decimals().await? {
        Some(d) => d,
        None => {
            warnings.push(Warning::new("missing_decimals", "chain did not advertise token decimals; defaulting to 10"));
            10
        }
    };
    let symbol = api.token_symbol().await?.unwrap_or_else(|| "UNIT".to_string());

    let (existential_deposit, used_ed_default) = match api.existential_deposit().await? {
        Some(ed) => (ed, false),
        None => {
            warnings.push(Warning::new(
                "missing_existential_deposit",
                "chain did not advertise an existential deposit; defaulting to 0",
            ));
            (chain_types::amount::Amount::zero(), true)
        }
    };

    let (spec_name, spec_version) = api.runtime_spec().await?;

    let caps = ChainCapabilities {
        has_transfer_allow_death,
        has_transfer_keep_alive,
        has_legacy_transfer,
        has_utility,
        has_batch_all,
        ss58_prefix,
        decimals,
        symbol,
        existential_deposit,
        spec_name,
        spec_version,
        used_defaults: used_ed_default,
    };
    Ok((caps, warnings))
}

/// Errors detecting capabilities against a session.
#[derive(Debug, thiserror::Error)]
pub enum DetectError {
    /// The session was no longer active when probing began.
    #[error("session inactive: {0}")]
    SessionInactive(String),
    /// One of the underlying RPC probes failed.
    #[error(transparent)]
    Chain(#[from] chain_api::ChainError),
}

impl chain_types::ErrorCode for DetectError {
    fn code(&self) -> &'static str {
        match self {
            Self::SessionInactive(_) => "SESSION_INACTIVE",
            Self::Chain(_) => "CAPABILITY_PROBE_FAILED",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chain_test_support::mock_session_with;

    #[tokio::test]
    async fn missing_advertised_values_fall_back_to_documented_defaults() {
        let session = mock_session_with(|builder| builder.without_ss58_prefix().without_existential_deposit());
        let (caps, warnings) = detect(&session).await.expect("detect");
        assert_eq!(caps.ss58_prefix, 0);
        assert!(caps.used_defaults);
        assert!(warnings.iter().any(|w| w.kind == "missing_existential_deposit"));
    }

    #[tokio::test]
    async fn fully_advertised_chain_detects_without_warnings() {
        let session = mock_session_with(|builder| builder);
        let (caps, warnings) = detect(&session).await.expect("detect");
        assert_eq!(caps.decimals, 10);
        assert!(warnings.is_empty());
    }
}
