#![forbid(unsafe_code)]
#![deny(missing_docs)]

//! # Endpoint manager
//!
//! Owns an ordered set of RPC endpoints for one chain role (relay, asset hub, ...):
//! tracks health, fails over transparently for reads, and hands out immutable
//! execution sessions bound to exactly one endpoint. The concrete websocket
//! `ChainApi` implementation and its SCALE call encoding live here too, since they
//! are the one place in the workspace that actually opens a socket.

/// The concrete websocket-backed `ChainApi` and its `Connector` adapter.
pub mod substrate;
/// The seam between the manager's retry logic and a concrete transport.
pub mod connector;
/// Minimal SCALE encoding for `balances`/`utility` call arguments.
pub mod encode;
/// Per-endpoint health records and selection ordering.
pub mod health;
/// The endpoint manager itself.
pub mod manager;
/// Decoding call indices out of runtime metadata.
pub mod metadata;
/// Persistence for the health map across process restarts.
pub mod store;

pub use connector::{ConnectError, Connector};
pub use health::{compare_for_selection, order_candidates, EndpointHealth};
pub use manager::{EndpointManager, EndpointManagerConfig, EndpointManagerError};
pub use metadata::{CallIndexTable, MetadataError};
pub use store::{FileHealthStore, HealthStore, HealthStoreError, InMemoryHealthStore, PersistedHealthMap};
pub use substrate::{SubstrateChainApi, SubstrateConnector};
