//! catalog-client: typed RPC client for a remote catalog backend.
//!
//! Issues request/response calls over an injected messaging channel, memoizes
//! successful responses per logical key, and keeps the connection alive across
//! faults with a background recovery worker. The transport, the concrete wire
//! codec, and the compression format are external collaborators injected at
//! the trait seams in [`channel`] and [`codec`].

pub mod cache;
pub mod channel;
pub mod codec;
pub mod config;
pub mod error;
pub mod protocol;
pub mod recovery;

mod client;
mod proxy;

pub use channel::MessageChannel;
pub use client::CatalogClient;
pub use codec::{
    CodecAdapter, Decompressor, DiagnosticSink, DirSink, IdentityDecompressor, JsonCodec,
    PayloadCodec,
};
pub use config::{ConfigSource, EnvConfig};
pub use error::{ChannelError, ClientError};
pub use protocol::{
    CatalogEntry, DatabaseCatalog, DatabaseDetails, DetailsRequest, Request, Response,
};
pub use proxy::CatalogProxy;
pub use recovery::{FaultSignal, RecoveryWorker};
