//! The native-token transfer agent: single transfers and independent/atomic batches.

use crate::error::AgentError;
use crate::params::{BatchTransferAgentParams, TransferAgentParams};
use chain_api::ExecutionSession;
use chain_builder::{AmountInput, TransferParams};
use chain_types::address::Ss58Address;
use chain_types::agent::{AgentMetadata, AgentResult};
use chain_types::amount::Amount;
use chain_types::error::Warning;

/// Validates that `sender` and `recipient` decode to distinct public keys,
/// independent of which SS58 prefix either was encoded with.
fn assert_distinct_accounts(sender: &str, recipient: &str) -> Result<(), AgentError> {
    let sender_key = Ss58Address::decode(sender)?;
    let recipient_key = Ss58Address::decode(recipient)?;
    if sender_key.public_key() == recipient_key.public_key() {
        return Err(AgentError::SameSenderRecipient);
    }
    Ok(())
}

fn validation_method_and_warnings(enable_simulation: bool) -> (Option<String>, Vec<Warning>) {
    let mut warnings = Vec::new();
    if enable_simulation {
        warnings.push(Warning::new(
            "simulation_unavailable",
            "no simulator configured for this agent; falling back to a fee query estimate",
        ));
    }
    (Some("fee_query".to_string()), warnings)
}

/// A stateless agent exposing native-token transfer operations. Registered under the
/// name `"AssetTransferAgent"`.
#[derive(Debug, Default, Clone, Copy)]
pub struct AssetTransferAgent;

impl AssetTransferAgent {
    /// A fresh agent instance. Agents carry no state across calls.
    pub fn new() -> Self {
        Self
    }

    /// Builds a single native-token transfer, validating the sender, recipient, and
    /// balance before ever touching the safe builder.
    pub async fn transfer(&self, session: &ExecutionSession, params: &TransferAgentParams) -> Result<AgentResult, AgentError> {
        assert_distinct_accounts(&params.address, &params.recipient)?;

        let (caps, mut warnings) = chain_capability::detect(session).await?;
        let amount = Amount::parse(&params.amount, caps.decimals)?;
        if amount.is_zero() {
            return Err(AgentError::NonPositiveAmount);
        }

        let api = session.api().map_err(|_| AgentError::SessionInactive)?;
        if params.validate_balance {
            let balance = api.account_balance(&params.address).await?;
            if amount > balance.spendable() {
                return Err(AgentError::InsufficientBalance { free: balance.free, required: amount });
            }
        }

        let (validation_method, sim_warnings) = validation_method_and_warnings(params.enable_simulation);
        warnings.extend(sim_warnings);

        let build_params = TransferParams {
            sender: params.address.clone(),
            recipient: params.recipient.clone(),
            amount: AmountInput::Normalized(amount),
            keep_alive: params.keep_alive,
            chain: params.chain,
        };
        let built = chain_builder::build_transfer(session, &build_params, &caps).await?;
        warnings.extend(built.warnings);

        let metadata = AgentMetadata {
            chain_name: Some(caps.spec_name.clone()),
            decimals: Some(caps.decimals),
            symbol: Some(caps.symbol.clone()),
            method: Some(built.method.clone()),
            sender: Some(params.address.clone()),
            validation_method,
            extra: Default::default(),
        };

        Ok(AgentResult::transaction(
            format!("Transfer {} to {}", built.amounts[0].format_decimal(caps.decimals), built.recipients[0]),
            built.transaction,
            built.estimated_fee,
            warnings,
            metadata,
        ))
    }

    /// Builds a batch of native-token transfers wrapped in `utility.batch`/`batch_all`.
    pub async fn batch_transfer(&self, session: &ExecutionSession, params: &BatchTransferAgentParams) -> Result<AgentResult, AgentError> {
        if params.transfers.is_empty() || params.transfers.len() > 100 {
            return Err(AgentError::BatchSizeOutOfRange(params.transfers.len()));
        }
        for element in &params.transfers {
            assert_distinct_accounts(&params.address, &element.recipient)?;
        }

        let (caps, mut warnings) = chain_capability::detect(session).await?;

        let mut normalized = Vec::with_capacity(params.transfers.len());
        let mut total = Amount::zero();
        for element in &params.transfers {
            let amount = Amount::parse(&element.amount, caps.decimals)?;
            if amount.is_zero() {
                return Err(AgentError::NonPositiveAmount);
            }
            total = total + amount.clone();
            normalized.push((element, amount));
        }

        let api = session.api().map_err(|_| AgentError::SessionInactive)?;
        if params.validate_balance {
            let balance = api.account_balance(&params.address).await?;
            if total > balance.spendable() {
                return Err(AgentError::InsufficientBalance { free: balance.free, required: total });
            }
        }

        let (validation_method, sim_warnings) = validation_method_and_warnings(params.enable_simulation);
        warnings.extend(sim_warnings);

        let build_params: Vec<TransferParams> = normalized
            .into_iter()
            .map(|(element, amount)| TransferParams {
                sender: params.address.clone(),
                recipient: element.recipient.clone(),
                amount: AmountInput::Normalized(amount),
                keep_alive: element.keep_alive,
                chain: element.chain,
            })
            .collect();

        let built = chain_builder::build_batch(session, &build_params, &caps, params.atomic).await?;
        warnings.extend(built.warnings);

        let metadata = AgentMetadata {
            chain_name: Some(caps.spec_name.clone()),
            decimals: Some(caps.decimals),
            symbol: Some(caps.symbol.clone()),
            method: Some(built.method.clone()),
            sender: Some(params.address.clone()),
            validation_method,
            extra: Default::default(),
        };

        Ok(AgentResult::transaction(
            format!("Batch transfer to {} recipients", built.recipients.len()),
            built.transaction,
            built.estimated_fee,
            warnings,
            metadata,
        ))
    }
}
