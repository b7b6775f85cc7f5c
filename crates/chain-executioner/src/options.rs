//! Knobs controlling one `run_pass`.

use std::time::Duration;

/// How one pass over an execution array's pending items should run.
#[derive(Debug, Clone)]
pub struct ExecutorOptions {
    /// Process pending items one at a time, in array order, stopping on the first
    /// failure unless `continue_on_error`. When false, non-transaction items run
    /// concurrently and transaction items are still processed sequentially afterward.
    pub sequential: bool,
    /// In sequential mode, keep processing later items after one fails instead of
    /// stopping the pass.
    pub continue_on_error: bool,
    /// After the per-item phase, look for a batchable suffix of pending transaction
    /// items on the same registry and submit them as one `utility.batch`/`batch_all`.
    pub allow_batching: bool,
    /// Skip the approval callback and sign every transaction as soon as it is ready.
    pub auto_approve: bool,
    /// Run a pre-approval dry-run through the configured simulator, when present.
    pub enable_simulation: bool,
    /// The maximum time to wait for a submitted extrinsic to reach a terminal status.
    pub timeout: Duration,
}

impl Default for ExecutorOptions {
    fn default() -> Self {
        Self {
            sequential: true,
            continue_on_error: false,
            allow_batching: true,
            auto_approve: false,
            enable_simulation: false,
            timeout: Duration::from_secs(300),
        }
    }
}
