//! Upstream protocol client
//!
//! Speaks to the upstream object model over either the modern JSON API or
//! legacy XML-RPC, negotiating between them per session.

pub mod client;
pub mod legacy;
pub mod modern;
pub mod session;
pub mod transport;
pub mod types;
pub mod xmlrpc;


pub use client::ProtocolClient;
pub use session::{SessionSnapshot, SessionState};
pub use transport::{Credentials, ProtocolTransport, TransportError};
pub use types::{
    AuthOutcome, DomainTerm, FieldValue, ModelInfo, Protocol, Record, RpcCall, SearchOptions,
    UpstreamMethod, fallback_models,
};
