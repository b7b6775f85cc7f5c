//! The seam between the endpoint manager's retry/ordering logic and however a
//! concrete `ChainApi` gets connected.

use async_trait::async_trait;
use chain_api::ChainApi;
use std::sync::Arc;
use std::time::Duration;

/// Errors establishing a connection to one endpoint. Distinguishes the two timeout
/// phases the endpoint manager must account for separately.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConnectError {
    /// The websocket itself did not open within `connect_timeout`.
    #[error("connect timed out after {0:?}")]
    ConnectTimeout(Duration),
    /// The websocket opened but the API failed to become ready (metadata fetch,
    /// handshake) within `init_timeout`, including disconnection during init.
    #[error("init timed out or failed after {0:?}: {1}")]
    InitFailed(Duration, String),
    /// The transport rejected the connection outright (bad URL, refused, TLS error).
    #[error("connection refused: {0}")]
    Refused(String),
}

impl chain_types::ErrorCode for ConnectError {
    fn code(&self) -> &'static str {
        match self {
            Self::ConnectTimeout(_) => "CONNECT_TIMEOUT",
            Self::InitFailed(..) => "INIT_TIMEOUT",
            Self::Refused(_) => "CONNECTION_REFUSED",
        }
    }
}

/// Produces a connected, ready `ChainApi` handle for one endpoint URL. Implementations
/// own the transport; the endpoint manager only depends on this trait so that tests
/// can substitute a fake without opening real sockets.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Connects to `url`, enforcing `connect_timeout` on the transport handshake and
    /// `init_timeout` on readiness (metadata fetch) afterward.
    async fn connect(
        &self,
        url: &str,
        connect_timeout: Duration,
        init_timeout: Duration,
    ) -> Result<Arc<dyn ChainApi>, ConnectError>;

    /// Opens a bare connection for a background health check without constructing a
    /// full API handle, returning only whether it succeeded. The default
    /// implementation delegates to [`Connector::connect`] with a single combined
    /// timeout; transports where a lighter probe exists may override this.
    async fn probe(&self, url: &str, timeout: Duration) -> bool {
        self.connect(url, timeout, timeout).await.is_ok()
    }
}
