#![forbid(unsafe_code)]
#![deny(missing_docs)]

//! # Safe transaction builder
//!
//! Builds `balances` transfers and `utility` batches against an active session's
//! detected capabilities. Construction never submits anything: the result is an
//! unsigned [`PreparedTransaction`] plus the warnings accumulated along the way.

use chain_api::{CallArgs, ExecutionSession};
use chain_types::address::{self, AddressError};
use chain_types::agent::PreparedTransaction;
use chain_types::amount::{Amount, AmountError};
use chain_types::capabilities::ChainCapabilities;
use chain_types::error::Warning;
use std::str::FromStr;

/// Which chain role a transfer targets. Affects only the plausibility check in
/// [`build_transfer`]; the session itself determines which runtime is actually
/// reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChainRole {
    /// The relay chain itself.
    Relay,
    /// A system/asset parachain.
    AssetHub,
}

/// An amount as it arrives from a caller, before normalization.
#[derive(Debug, Clone)]
pub enum AmountInput {
    /// A decimal or plain-integer string, interpreted against `caps.decimals`.
    Text(String),
    /// A native integer, already in the smallest unit.
    Integer(u128),
    /// An arbitrary-precision value already normalized to the smallest unit.
    Normalized(Amount),
}

/// One transfer's parameters, as the caller supplies them.
#[derive(Debug, Clone)]
pub struct TransferParams {
    /// The sending address; used to look up the balance the reaping check runs
    /// against.
    pub sender: String,
    /// The recipient address, any SS58 prefix.
    pub recipient: String,
    /// The amount to send.
    pub amount: AmountInput,
    /// Whether the keep-alive variant is preferred when available.
    pub keep_alive: bool,
    /// Which chain role this transfer targets.
    pub chain: ChainRole,
}

/// The outcome of building one or more transfers: the unsigned transaction, the
/// method ultimately selected, the re-encoded recipient(s), the normalized amount(s),
/// and every warning accumulated while building.
#[derive(Debug, Clone)]
pub struct BuildResult {
    /// The unsigned transaction, ready for simulation/approval/signing.
    pub transaction: PreparedTransaction,
    /// The `balances`/`utility` method ultimately selected.
    pub method: String,
    /// The recipient(s), re-encoded to `caps.ss58_prefix`.
    pub recipients: Vec<String>,
    /// The normalized amount(s), in the smallest unit, in input order.
    pub amounts: Vec<Amount>,
    /// The fee estimate the reaping check was run against.
    pub estimated_fee: Amount,
    /// Non-fatal warnings accumulated while building.
    pub warnings: Vec<Warning>,
}

/// Errors building a transaction.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// The session was inactive when building began.
    #[error("session inactive")]
    SessionInactive,
    /// The requested chain role doesn't match what the session's capabilities
    /// indicate.
    #[error("chain type mismatch: requested {requested:?}, session looks like spec {spec_name}")]
    ChainTypeMismatch {
        /// What the caller asked for.
        requested: ChainRole,
        /// The session's detected runtime spec name.
        spec_name: String,
    },
    /// The amount could not be normalized.
    #[error(transparent)]
    InvalidAmount(#[from] AmountError),
    /// The recipient address could not be decoded or re-encoded.
    #[error(transparent)]
    InvalidAddress(#[from] AddressError),
    /// No available transfer method satisfies the request.
    #[error("no transfer method satisfies the request")]
    InsufficientCapabilities,
    /// The batch size was outside `[1, 100]`.
    #[error("batch size {0} outside the allowed range of 1 to 100")]
    BatchSizeOutOfRange(usize),
    /// One or more batch elements were built against a different registry than the
    /// session's.
    #[error("batch element registry does not match the session's")]
    CrossRegistry,
    /// The session's `construct_call` produced a transaction whose section/method
    /// does not match what was requested.
    #[error("metadata mismatch: expected {expected}, got {got}")]
    MetadataMismatch {
        /// What was requested.
        expected: String,
        /// What the session actually produced.
        got: String,
    },
    /// The underlying chain API call failed.
    #[error(transparent)]
    Chain(#[from] chain_api::ChainError),
}

impl chain_types::ErrorCode for BuildError {
    fn code(&self) -> &'static str {
        match self {
            Self::SessionInactive => "SESSION_INACTIVE",
            Self::ChainTypeMismatch { .. } => "CHAIN_TYPE_MISMATCH",
            Self::InvalidAmount(e) => e.code(),
            Self::InvalidAddress(e) => e.code(),
            Self::InsufficientCapabilities => "INSUFFICIENT_CAPABILITIES",
            Self::BatchSizeOutOfRange(_) => "INVALID_BATCH_SIZE",
            Self::CrossRegistry => "CROSS_REGISTRY",
            Self::MetadataMismatch { .. } => "METADATA_MISMATCH",
            Self::Chain(_) => "CHAIN_ERROR",
        }
    }
}

fn looks_like_asset_hub(spec_name: &str) -> bool {
    let lower = spec_name.to_lowercase();
    ["asset-hub", "statemint", "statemine", "westmint"].iter().any(|needle| lower.contains(needle))
}

fn looks_like_known_relay(spec_name: &str) -> bool {
    let lower = spec_name.to_lowercase();
    ["polkadot", "kusama", "westend", "rococo"].iter().any(|needle| lower == *needle)
}

fn check_chain_type(requested: ChainRole, caps: &ChainCapabilities, warnings: &mut Vec<Warning>) -> Result<(), BuildError> {
    match requested {
        ChainRole::AssetHub => {
            if looks_like_known_relay(&caps.spec_name) {
                return Err(BuildError::ChainTypeMismatch { requested, spec_name: caps.spec_name.clone() });
            }
            if !looks_like_asset_hub(&caps.spec_name) {
                warnings.push(Warning::new(
                    "unconfirmed_asset_hub",
                    format!("session's runtime spec `{}` does not look like a known asset hub", caps.spec_name),
                ));
            }
        }
        ChainRole::Relay => {
            if looks_like_asset_hub(&caps.spec_name) {
                return Err(BuildError::ChainTypeMismatch { requested, spec_name: caps.spec_name.clone() });
            }
        }
    }
    Ok(())
}

fn normalize_amount(input: &AmountInput, decimals: u32) -> Result<Amount, AmountError> {
    match input {
        AmountInput::Text(s) => Amount::parse(s, decimals),
        AmountInput::Integer(v) => Ok(Amount::from_u128(*v)),
        AmountInput::Normalized(a) => Ok(a.clone()),
    }
}

fn reencode_recipient(recipient: &str, ss58_prefix: u16) -> Result<String, AddressError> {
    address::reencode(recipient, ss58_prefix)
}

fn select_method(keep_alive: bool, caps: &ChainCapabilities, warnings: &mut Vec<Warning>) -> Result<&'static str, BuildError> {
    if keep_alive {
        if caps.has_transfer_keep_alive {
            return Ok("transfer_keep_alive");
        }
        return Err(BuildError::InsufficientCapabilities);
    }
    if caps.has_transfer_allow_death {
        return Ok("transfer_allow_death");
    }
    if caps.has_legacy_transfer {
        warnings.push(Warning::new("legacy_method", "chain only exposes the legacy balances.transfer method"));
        return Ok("transfer");
    }
    Err(BuildError::InsufficientCapabilities)
}

/// Warns when the sender's projected post-transfer balance would fall below the
/// existential deposit. `transfer_keep_alive` already guarantees this on-chain, so it
/// is skipped.
fn check_reaping(
    method: &str,
    free: &Amount,
    estimated_fee: &Amount,
    amount: &Amount,
    existential_deposit: &Amount,
    decimals: u32,
    warnings: &mut Vec<Warning>,
) {
    if method == "transfer_keep_alive" {
        return;
    }
    let projected = (free - estimated_fee)
        .and_then(|remaining| &remaining - amount)
        .unwrap_or_else(Amount::zero);
    if projected < *existential_deposit {
        warnings.push(Warning::new(
            "reaping_risk",
            format!(
                "projected post-transfer balance {} is below the existential deposit {}; the account may be reaped",
                projected.format_decimal(decimals),
                existential_deposit.format_decimal(decimals)
            ),
        ));
    }
}

/// Builds a single `balances` transfer.
pub async fn build_transfer(
    session: &ExecutionSession,
    params: &TransferParams,
    caps: &ChainCapabilities,
) -> Result<BuildResult, BuildError> {
    let api = session.api().map_err(|_| BuildError::SessionInactive)?;
    let mut warnings = Vec::new();

    check_chain_type(params.chain, caps, &mut warnings)?;

    let amount = normalize_amount(&params.amount, caps.decimals)?;
    let recipient = reencode_recipient(&params.recipient, caps.ss58_prefix)?;

    if amount < caps.existential_deposit {
        warnings.push(Warning::new(
            "below_existential_deposit",
            format!(
                "amount {} is below the existential deposit {}",
                amount.format_decimal(caps.decimals),
                caps.existential_deposit.format_decimal(caps.decimals)
            ),
        ));
    }

    let method = select_method(params.keep_alive, caps, &mut warnings)?;

    let args = CallArgs::new()
        .with("dest", serde_json::Value::String(recipient.clone()))
        .with("value", serde_json::Value::String(amount.as_biguint().to_string()));

    let tx = api.construct_call("balances", method, args)?;
    if tx.section != "balances" || tx.method != method {
        return Err(BuildError::MetadataMismatch { expected: format!("balances.{method}"), got: format!("{}.{}", tx.section, tx.method) });
    }

    let estimated_fee = api.query_fee(&tx).await?;
    let sender_balance = api.account_balance(&params.sender).await?;
    check_reaping(method, &sender_balance.free, &estimated_fee, &amount, &caps.existential_deposit, caps.decimals, &mut warnings);

    Ok(BuildResult {
        transaction: tx,
        method: method.to_string(),
        recipients: vec![recipient],
        amounts: vec![amount],
        estimated_fee,
        warnings,
    })
}

/// Builds a `utility.batch`/`batch_all` wrapping one transfer per element of
/// `transfers`. All elements must build against the session's own registry; any
/// mismatch fails the whole batch before construction.
pub async fn build_batch(
    session: &ExecutionSession,
    transfers: &[TransferParams],
    caps: &ChainCapabilities,
    atomic: bool,
) -> Result<BuildResult, BuildError> {
    let api = session.api().map_err(|_| BuildError::SessionInactive)?;
    if transfers.is_empty() || transfers.len() > 100 {
        return Err(BuildError::BatchSizeOutOfRange(transfers.len()));
    }
    if !caps.has_utility {
        return Err(BuildError::InsufficientCapabilities);
    }
    if atomic && !caps.has_batch_all {
        return Err(BuildError::InsufficientCapabilities);
    }

    let mut warnings = Vec::new();
    let mut recipients = Vec::new();
    let mut amounts = Vec::new();
    let mut call_bytes = Vec::new();
    let mut total_fee = Amount::zero();

    for params in transfers {
        let single = build_transfer(session, params, caps).await?;
        if &single.transaction.registry != session.registry() {
            return Err(BuildError::CrossRegistry);
        }
        warnings.extend(single.warnings);
        recipients.extend(single.recipients);
        amounts.extend(single.amounts);
        total_fee = total_fee + single.estimated_fee;
        call_bytes.push(serde_json::Value::String(hex::encode(&single.transaction.call_bytes)));
    }

    let batch_method = if atomic { "batch_all" } else { "batch" };
    warnings.push(Warning::new(
        "batch_mode",
        format!("wrapped {} transfers with utility.{batch_method}", transfers.len()),
    ));

    let args = CallArgs::new().with("calls", serde_json::Value::Array(call_bytes));
    let tx = api.construct_call("utility", batch_method, args)?;
    if tx.section != "utility" || tx.method != batch_method {
        return Err(BuildError::MetadataMismatch {
            expected: format!("utility.{batch_method}"),
            got: format!("{}.{}", tx.section, tx.method),
        });
    }

    Ok(BuildResult { transaction: tx, method: batch_method.to_string(), recipients, amounts, estimated_fee: total_fee, warnings })
}

/// Wraps a list of already-built `PreparedTransaction`s (all against `session`'s own
/// registry) into a single `utility.batch`/`batch_all` call. Unlike [`build_batch`],
/// which builds each transfer itself, this takes calls an executioner has already
/// prepared for individual items and is only responsible for the wrapping step —
/// used when batching a suffix of an execution array's queued transactions.
pub async fn wrap_prepared_batch(
    session: &ExecutionSession,
    calls: &[PreparedTransaction],
    caps: &ChainCapabilities,
    atomic: bool,
) -> Result<BuildResult, BuildError> {
    let api = session.api().map_err(|_| BuildError::SessionInactive)?;
    if calls.is_empty() || calls.len() > 100 {
        return Err(BuildError::BatchSizeOutOfRange(calls.len()));
    }
    if !caps.has_utility {
        return Err(BuildError::InsufficientCapabilities);
    }
    if atomic && !caps.has_batch_all {
        return Err(BuildError::InsufficientCapabilities);
    }
    for call in calls {
        if call.registry != *session.registry() {
            return Err(BuildError::CrossRegistry);
        }
    }

    let call_bytes: Vec<serde_json::Value> = calls.iter().map(|c| serde_json::Value::String(hex::encode(&c.call_bytes))).collect();
    let batch_method = if atomic { "batch_all" } else { "batch" };
    let warnings = vec![Warning::new("batch_mode", format!("wrapped {} queued transactions with utility.{batch_method}", calls.len()))];

    let args = CallArgs::new().with("calls", serde_json::Value::Array(call_bytes));
    let tx = api.construct_call("utility", batch_method, args)?;
    if tx.section != "utility" || tx.method != batch_method {
        return Err(BuildError::MetadataMismatch {
            expected: format!("utility.{batch_method}"),
            got: format!("{}.{}", tx.section, tx.method),
        });
    }

    let estimated_fee = api.query_fee(&tx).await?;
    Ok(BuildResult { transaction: tx, method: batch_method.to_string(), recipients: Vec::new(), amounts: Vec::new(), estimated_fee, warnings })
}

impl FromStr for ChainRole {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "relay" => Ok(Self::Relay),
            "asset_hub" => Ok(Self::AssetHub),
            _ => Err(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chain_api::AccountBalance;
    use chain_test_support::{mock_session, mock_session_with, sample_address};

    fn caps(spec_name: &str) -> ChainCapabilities {
        ChainCapabilities {
            spec_name: spec_name.to_string(),
            spec_version: 1,
            has_transfer_allow_death: true,
            has_transfer_keep_alive: true,
            has_legacy_transfer: false,
            has_utility: true,
            has_batch_all: true,
            ss58_prefix: 0,
            decimals: 10,
            symbol: "UNIT".to_string(),
            existential_deposit: Amount::from_u128(100_000_000),
            used_defaults: false,
        }
    }

    fn transfer(sender_seed: u8, recipient_seed: u8, amount: u128) -> TransferParams {
        TransferParams {
            sender: sample_address(sender_seed),
            recipient: sample_address(recipient_seed),
            amount: AmountInput::Integer(amount),
            keep_alive: false,
            chain: ChainRole::Relay,
        }
    }

    #[tokio::test]
    async fn keep_alive_is_preferred_when_requested_and_available() {
        let session = mock_session();
        let mut params = transfer(1, 2, 1_000_000_000);
        params.keep_alive = true;
        let result = build_transfer(&session, &params, &caps("mock-spec")).await.unwrap();
        assert_eq!(result.method, "transfer_keep_alive");
    }

    #[tokio::test]
    async fn falls_back_to_legacy_transfer_with_a_warning_when_nothing_else_is_exposed() {
        let session = mock_session_with(|b| b.legacy_only());
        let mut c = caps("mock-spec");
        c.has_transfer_allow_death = false;
        c.has_transfer_keep_alive = false;
        c.has_legacy_transfer = true;
        let params = transfer(1, 2, 1_000_000_000);
        let result = build_transfer(&session, &params, &c).await.unwrap();
        assert_eq!(result.method, "transfer");
        assert!(result.warnings.iter().any(|w| w.kind == "legacy_method"));
    }

    #[tokio::test]
    async fn requesting_keep_alive_without_the_capability_fails() {
        let session = mock_session_with(|b| b.without_keep_alive());
        let mut c = caps("mock-spec");
        c.has_transfer_keep_alive = false;
        let mut params = transfer(1, 2, 1_000_000_000);
        params.keep_alive = true;
        let err = build_transfer(&session, &params, &c).await.unwrap_err();
        assert!(matches!(err, BuildError::InsufficientCapabilities));
    }

    #[tokio::test]
    async fn warns_when_allow_death_would_reap_the_sender() {
        let sender = sample_address(1);
        let session = mock_session_with(|b| {
            b.with_balance(
                sender.clone(),
                AccountBalance { free: Amount::from_u128(250_000_000), reserved: Amount::zero(), frozen: Amount::zero() },
            )
            .with_fee(Amount::from_u128(50_000_000))
        });
        let params = transfer(1, 2, 150_000_000);
        let result = build_transfer(&session, &params, &caps("mock-spec")).await.unwrap();
        assert!(result.warnings.iter().any(|w| w.kind == "reaping_risk"), "{:?}", result.warnings);
    }

    #[tokio::test]
    async fn keep_alive_never_produces_a_reaping_warning() {
        let sender = sample_address(1);
        let session = mock_session_with(|b| {
            b.with_balance(
                sender.clone(),
                AccountBalance { free: Amount::from_u128(250_000_000), reserved: Amount::zero(), frozen: Amount::zero() },
            )
            .with_fee(Amount::from_u128(50_000_000))
        });
        let mut params = transfer(1, 2, 150_000_000);
        params.keep_alive = true;
        let result = build_transfer(&session, &params, &caps("mock-spec")).await.unwrap();
        assert!(!result.warnings.iter().any(|w| w.kind == "reaping_risk"));
    }

    #[tokio::test]
    async fn asset_hub_request_against_a_known_relay_is_rejected() {
        let session = mock_session();
        let mut params = transfer(1, 2, 1_000_000_000);
        params.chain = ChainRole::AssetHub;
        let err = build_transfer(&session, &params, &caps("polkadot")).await.unwrap_err();
        assert!(matches!(err, BuildError::ChainTypeMismatch { .. }));
    }

    #[tokio::test]
    async fn ambiguous_parachain_name_warns_instead_of_failing() {
        let session = mock_session();
        let mut params = transfer(1, 2, 1_000_000_000);
        params.chain = ChainRole::AssetHub;
        let result = build_transfer(&session, &params, &caps("some-parachain")).await.unwrap();
        assert!(result.warnings.iter().any(|w| w.kind == "unconfirmed_asset_hub"));
    }

    #[tokio::test]
    async fn batch_size_zero_and_over_the_cap_are_rejected() {
        let session = mock_session();
        let c = caps("mock-spec");
        let empty: Vec<TransferParams> = Vec::new();
        assert!(matches!(build_batch(&session, &empty, &c, false).await.unwrap_err(), BuildError::BatchSizeOutOfRange(0)));

        let too_many: Vec<TransferParams> = (0..101u128).map(|i| transfer(1, 2, i + 1)).collect();
        assert!(matches!(build_batch(&session, &too_many, &c, false).await.unwrap_err(), BuildError::BatchSizeOutOfRange(101)));
    }

    #[tokio::test]
    async fn atomic_batch_requires_batch_all() {
        let session = mock_session_with(|b| b.without_batch_all());
        let mut c = caps("mock-spec");
        c.has_batch_all = false;
        let transfers = vec![transfer(1, 2, 1_000_000_000)];
        let err = build_batch(&session, &transfers, &c, true).await.unwrap_err();
        assert!(matches!(err, BuildError::InsufficientCapabilities));
    }

    #[tokio::test]
    async fn batch_wraps_every_element_and_reports_the_chosen_method() {
        let session = mock_session();
        let c = caps("mock-spec");
        let transfers = vec![transfer(1, 2, 1_000_000_000), transfer(1, 3, 2_000_000_000)];
        let result = build_batch(&session, &transfers, &c, true).await.unwrap();
        assert_eq!(result.method, "batch_all");
        assert_eq!(result.recipients.len(), 2);
        assert_eq!(result.amounts.len(), 2);
    }

    #[tokio::test]
    async fn wrap_prepared_batch_wraps_already_built_transactions() {
        let session = mock_session();
        let c = caps("mock-spec");
        let transfers = vec![transfer(1, 2, 1_000_000_000), transfer(1, 3, 2_000_000_000)];
        let mut prepared = Vec::new();
        for t in &transfers {
            prepared.push(build_transfer(&session, t, &c).await.unwrap().transaction);
        }
        let result = wrap_prepared_batch(&session, &prepared, &c, true).await.unwrap();
        assert_eq!(result.method, "batch_all");
    }

    #[tokio::test]
    async fn wrap_prepared_batch_rejects_cross_registry_calls() {
        let session = mock_session();
        let c = caps("mock-spec");
        let mut prepared = build_transfer(&session, &transfer(1, 2, 1_000_000_000), &c).await.unwrap().transaction;
        prepared.registry = chain_types::agent::RegistryId("other-registry".to_string());
        let err = wrap_prepared_batch(&session, &[prepared], &c, true).await.unwrap_err();
        assert!(matches!(err, BuildError::CrossRegistry));
    }
}
