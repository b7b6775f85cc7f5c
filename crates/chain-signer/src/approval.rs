//! A console-prompt `ApprovalHandler`, for demonstrations and manual testing.

use async_trait::async_trait;
use chain_api::{ApprovalHandler, BatchSigningRequest, SigningRequest};
use std::io::{self, Write};

/// Prompts the operator on stdin/stdout before approving a signing request. Blocking
/// I/O is moved onto a blocking thread so it never stalls the async runtime.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdioApprovalHandler;

impl StdioApprovalHandler {
    /// A fresh handler.
    pub fn new() -> Self {
        Self
    }
}

fn is_affirmative(line: &str) -> bool {
    matches!(line.trim().to_lowercase().as_str(), "y" | "yes")
}

fn prompt(description: String) -> bool {
    print!("{description}\napprove? [y/N] ");
    let _ = io::stdout().flush();
    let mut line = String::new();
    if io::stdin().read_line(&mut line).is_err() {
        return false;
    }
    is_affirmative(&line)
}

#[async_trait]
impl ApprovalHandler for StdioApprovalHandler {
    async fn request_approval(&self, request: &SigningRequest) -> bool {
        let description = format!(
            "{}\nfee estimate: {}\nsender: {}\nwarnings: {}",
            request.description,
            request.estimated_fee.to_u128().ok().map(|n| n.to_string()).unwrap_or_else(|| "n/a".to_string()),
            request.sender,
            request.warnings.iter().map(|w| w.message.as_str()).collect::<Vec<_>>().join("; "),
        );
        tokio::task::spawn_blocking(move || prompt(description)).await.unwrap_or(false)
    }

    async fn request_batch_approval(&self, request: &BatchSigningRequest) -> bool {
        let description = format!(
            "batch of {} transactions:\n{}\naggregated fee estimate: {}\nsender: {}",
            request.item_ids.len(),
            request.descriptions.join("\n"),
            request.estimated_fee.to_u128().ok().map(|n| n.to_string()).unwrap_or_else(|| "n/a".to_string()),
            request.sender,
        );
        tokio::task::spawn_blocking(move || prompt(description)).await.unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_y_and_yes_case_insensitively() {
        assert!(is_affirmative("y"));
        assert!(is_affirmative("Y\n"));
        assert!(is_affirmative("yes"));
        assert!(is_affirmative("YES\n"));
    }

    #[test]
    fn rejects_anything_else() {
        assert!(!is_affirmative("n"));
        assert!(!is_affirmative(""));
        assert!(!is_affirmative("\n"));
        assert!(!is_affirmative("sure"));
    }
}
