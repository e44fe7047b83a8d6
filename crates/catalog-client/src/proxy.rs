//! RPC proxy: typed catalog operations over the messaging channel.

use std::sync::Arc;

use crate::cache::{FetchMap, FetchSlot};
use crate::channel::MessageChannel;
use crate::codec::{CodecAdapter, PayloadCodec};
use crate::config::{self, ConfigSource};
use crate::error::ClientError;
use crate::protocol::{
    self, DatabaseCatalog, DatabaseDetails, DetailsRequest, Request, Response,
};

/// Issues typed requests over the channel and memoizes successful responses.
///
/// Both operations are safe to call concurrently. Each serializes population
/// with respect to itself; the two caches are independent of each other.
/// Failed fetches are never cached, so a later call may retry once the
/// backend recovers.
pub struct CatalogProxy<C> {
    channel: Arc<dyn MessageChannel>,
    adapter: CodecAdapter<C>,
    config: Arc<dyn ConfigSource>,
    catalog: FetchSlot<DatabaseCatalog>,
    details: FetchMap<DatabaseDetails>,
}

impl<C: PayloadCodec> CatalogProxy<C> {
    pub fn new(
        channel: Arc<dyn MessageChannel>,
        adapter: CodecAdapter<C>,
        config: Arc<dyn ConfigSource>,
    ) -> Self {
        Self {
            channel,
            adapter,
            config,
            catalog: FetchSlot::new(),
            details: FetchMap::new(),
        }
    }

    /// Fetch the database catalog, memoized for the proxy's lifetime.
    pub async fn database_catalog(&self) -> Result<DatabaseCatalog, ClientError> {
        self.catalog.get_or_fetch(self.fetch_catalog()).await
    }

    /// Fetch details for one database, memoized per id.
    ///
    /// Fails with [`ClientError::InvalidArgument`] for an empty id without
    /// contacting the channel.
    pub async fn database_details(
        &self,
        database_id: &str,
    ) -> Result<DatabaseDetails, ClientError> {
        if database_id.is_empty() {
            return Err(ClientError::InvalidArgument("database id must not be empty"));
        }
        self.details
            .get_or_fetch(database_id, self.fetch_details(database_id))
            .await
    }

    async fn fetch_catalog(&self) -> Result<DatabaseCatalog, ClientError> {
        let request = Request {
            message_type: protocol::GET_DATABASES.to_string(),
            payload: Vec::new(),
            timeout: config::request_timeout(self.config.as_ref()),
        };
        let data = self.round_trip(request).await?;
        self.adapter.deserialize(&data)
    }

    async fn fetch_details(&self, database_id: &str) -> Result<DatabaseDetails, ClientError> {
        let payload = self.adapter.serialize(&DetailsRequest {
            database_id: database_id.to_string(),
        })?;
        let request = Request {
            message_type: protocol::details_message_type(database_id),
            payload,
            timeout: config::request_timeout(self.config.as_ref()),
        };
        let data = self.round_trip(request).await?;
        self.adapter.deserialize(&data)
    }

    /// Send one request and classify the response into exactly one outcome.
    async fn round_trip(&self, request: Request) -> Result<Vec<u8>, ClientError> {
        let message_type = request.message_type.clone();
        let response = self.channel.send(request).await?;
        match response {
            Response::Payload { data } => Ok(data),
            Response::Error {
                code: protocol::UNKNOWN_MESSAGE_TYPE,
                ..
            } => {
                tracing::warn!(%message_type, "no backend configured for message type");
                Err(ClientError::BackendUnavailable)
            }
            Response::Error { code, message } => Err(ClientError::Backend { code, message }),
            Response::Malformed => Err(ClientError::ProtocolViolation),
        }
    }
}
