//! A thin demonstration binary wiring the engine's pieces into a runnable process:
//! endpoint sessions, capability detection, plan extraction, orchestration, and
//! execution with a keypair signer and a stdin approval prompt. Not part of the
//! engine's own contract — a host embeds the library crates directly instead.

use anyhow::{anyhow, Context, Result};
use chain_agents::AgentRegistry;
use chain_api::{ExecutionSession, LlmAdapter, LlmContext};
use chain_array::ExecutionArray;
use chain_endpoint::{EndpointManager, EndpointManagerConfig, InMemoryHealthStore, SubstrateConnector};
use chain_executioner::{Executioner, ExecutorOptions};
use chain_orchestrator::{extract_plan, OrchestrateOptions, Orchestrator, SessionSet};
use chain_signer::{KeypairSigner, StdioApprovalHandler};
use chain_types::capabilities::ChainCapabilities;
use clap::Parser;
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser, Debug)]
#[clap(name = "wallet-cli", about = "Natural-language wallet request demo")]
struct Opts {
    /// The natural-language request to resolve, e.g. "send 5 DOT to Alice".
    request: String,

    /// TOML config file with endpoint lists and signer seed. Falls back to the
    /// public Polkadot/Asset Hub RPC endpoints and a freshly generated key when
    /// absent.
    #[clap(long)]
    config: Option<PathBuf>,

    /// Skip the LLM call entirely and resolve this plan JSON file instead, for
    /// offline demos that don't have a model endpoint configured.
    #[clap(long)]
    plan_file: Option<PathBuf>,

    /// An OpenAI-compatible chat completions URL. Required unless --plan-file is
    /// given.
    #[clap(long, env = "WALLET_CLI_LLM_API_URL")]
    llm_api_url: Option<String>,

    /// Bearer token for the LLM endpoint.
    #[clap(long, env = "WALLET_CLI_LLM_API_KEY")]
    llm_api_key: Option<String>,

    /// Model name passed to the LLM endpoint.
    #[clap(long, env = "WALLET_CLI_LLM_MODEL", default_value = "gpt-4o-mini")]
    llm_model: String,

    /// Sign and broadcast without a manual approval prompt. Off by default: every
    /// transaction is shown to the operator first.
    #[clap(long)]
    auto_approve: bool,
}

#[derive(Debug, Deserialize, Default)]
struct WalletCliConfig {
    #[serde(default = "default_relay_endpoints")]
    relay_endpoints: Vec<String>,
    #[serde(default = "default_asset_hub_endpoints")]
    asset_hub_endpoints: Vec<String>,
    /// 64 hex characters, a fixed Ed25519 seed for reproducible demos. A random
    /// keypair is generated when absent.
    signer_seed: Option<String>,
}

fn default_relay_endpoints() -> Vec<String> {
    vec!["wss://rpc.polkadot.io".to_string()]
}

fn default_asset_hub_endpoints() -> Vec<String> {
    vec!["wss://polkadot-asset-hub-rpc.polkadot.io".to_string()]
}

fn load_config(path: Option<&PathBuf>) -> Result<WalletCliConfig> {
    match path {
        Some(path) => {
            let raw = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
            toml::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
        }
        None => Ok(WalletCliConfig { relay_endpoints: default_relay_endpoints(), asset_hub_endpoints: default_asset_hub_endpoints(), signer_seed: None }),
    }
}

fn parse_seed(hex: &str) -> Result<[u8; 32]> {
    let bytes = hex::decode(hex).context("signer_seed must be 64 hex characters")?;
    bytes.as_slice().try_into().map_err(|_| anyhow!("signer_seed must decode to exactly 32 bytes"))
}

async fn open_session(endpoints: Vec<String>, storage_key: &str) -> Result<(ExecutionSession, ChainCapabilities)> {
    let config = EndpointManagerConfig { endpoints, storage_key: storage_key.to_string(), ..EndpointManagerConfig::default() };
    let manager = EndpointManager::new(config, Arc::new(SubstrateConnector), Arc::new(InMemoryHealthStore::new()))
        .map_err(|e| anyhow!("building endpoint manager for {storage_key}: {e}"))?;
    let session = manager.open_execution_session().await.map_err(|e| anyhow!("opening {storage_key} session: {e}"))?;
    let (capabilities, warnings) = chain_capability::detect(&session).await.map_err(|e| anyhow!("detecting {storage_key} capabilities: {e}"))?;
    for warning in &warnings {
        tracing::warn!(role = storage_key, message = %warning.message, "capability warning");
    }
    Ok((session, capabilities))
}

async fn resolve_plan_text(opts: &Opts) -> Result<String> {
    if let Some(path) = &opts.plan_file {
        return std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()));
    }

    let api_url = opts.llm_api_url.as_deref().ok_or_else(|| anyhow!("either --plan-file or --llm-api-url/WALLET_CLI_LLM_API_URL is required"))?;
    let api_key = opts.llm_api_key.clone().unwrap_or_default();
    let adapter = chain_llm_http::HttpLlmAdapter::new(api_url, api_key, opts.llm_model.clone());

    let system_prompt = "You are a wallet assistant. Translate the user's request into an \
        ExecutionPlan JSON object with fields id, originalRequest, steps, status, \
        requiresApproval, createdAt.";
    adapter.complete(&opts.request, system_prompt, &LlmContext::default()).await.map_err(|e| anyhow!("llm request failed: {e}"))
}

#[tokio::main]
async fn main() -> Result<()> {
    chain_telemetry::init_tracing()?;

    let opts = Opts::parse();
    let config = load_config(opts.config.as_ref())?;

    let (relay_session, relay_caps) = open_session(config.relay_endpoints.clone(), "relay").await?;
    let (asset_hub_session, asset_hub_caps) = open_session(config.asset_hub_endpoints.clone(), "asset_hub").await?;
    let ss58_prefix = relay_session
        .api()
        .map_err(|e| anyhow!("relay session inactive: {e}"))?
        .ss58_prefix()
        .await
        .map_err(|e| anyhow!("querying ss58 prefix: {e}"))?
        .unwrap_or(0);

    let signer = Arc::new(match &config.signer_seed {
        Some(hex) => KeypairSigner::from_seed(parse_seed(hex)?, ss58_prefix)?,
        None => {
            let signer = KeypairSigner::generate(ss58_prefix)?;
            println!("generated a fresh signing key: {}", signer.address());
            println!("fund it before approving any transfer from this address");
            signer
        }
    });

    let plan_text = resolve_plan_text(&opts).await?;
    let plan = extract_plan(&plan_text)?.ok_or_else(|| anyhow!("the model's response did not contain a recognizable execution plan"))?;
    println!("resolved plan {} with {} step(s)", plan.id, plan.steps.len());

    let registry = AgentRegistry::with_builtin_agents();
    let orchestrator = Orchestrator::new(registry);
    let sessions = SessionSet::new(relay_session.clone(), asset_hub_session.clone());
    let array: ExecutionArray = orchestrator.orchestrate(&plan, &sessions, OrchestrateOptions::default()).await?;

    let executioner = Executioner::new(signer, Arc::new(StdioApprovalHandler::new()))
        .with_session(relay_session, relay_caps)
        .with_session(asset_hub_session, asset_hub_caps);

    let options = ExecutorOptions { auto_approve: opts.auto_approve, timeout: Duration::from_secs(300), ..ExecutorOptions::default() };

    loop {
        let state = executioner.run_pass(&array, &options).await;
        println!("{state:?}");
        if state.pending == 0 {
            break;
        }
    }

    Ok(())
}

