//! Client lifecycle: channel open, fault recovery, shutdown.

use std::sync::Arc;
use std::time::Duration;

use crate::channel::MessageChannel;
use crate::codec::{CodecAdapter, PayloadCodec};
use crate::config::ConfigSource;
use crate::error::ClientError;
use crate::protocol::{DatabaseCatalog, DatabaseDetails};
use crate::proxy::CatalogProxy;
use crate::recovery::{FaultSignal, RETRY_DELAY, RecoveryWorker};

/// Owning façade: the RPC proxy plus the recovery worker that keeps the
/// channel open underneath it.
pub struct CatalogClient<C> {
    channel: Arc<dyn MessageChannel>,
    proxy: CatalogProxy<C>,
    signal: Arc<FaultSignal>,
    recovery: RecoveryWorker,
}

impl<C: PayloadCodec> CatalogClient<C> {
    /// Open the channel and start the recovery worker.
    ///
    /// An initial open failure does not fail initialization: the fault signal
    /// is pre-raised so the worker begins recovery immediately instead of
    /// waiting for an external fault notification.
    pub async fn initialize(
        channel: Arc<dyn MessageChannel>,
        adapter: CodecAdapter<C>,
        config: Arc<dyn ConfigSource>,
    ) -> Self {
        Self::initialize_with_retry_delay(channel, adapter, config, RETRY_DELAY).await
    }

    pub(crate) async fn initialize_with_retry_delay(
        channel: Arc<dyn MessageChannel>,
        adapter: CodecAdapter<C>,
        config: Arc<dyn ConfigSource>,
        retry_delay: Duration,
    ) -> Self {
        let signal = FaultSignal::new();

        if let Err(error) = channel.open().await {
            tracing::error!(%error, "failed to open channel, starting recovery");
            signal.raise();
        }

        let recovery =
            RecoveryWorker::spawn(Arc::clone(&channel), Arc::clone(&signal), retry_delay);
        let proxy = CatalogProxy::new(Arc::clone(&channel), adapter, config);

        Self {
            channel,
            proxy,
            signal,
            recovery,
        }
    }

    /// Handle for the channel glue to deliver fault events: every channel
    /// fault callback should raise this signal.
    pub fn fault_signal(&self) -> Arc<FaultSignal> {
        Arc::clone(&self.signal)
    }

    pub async fn database_catalog(&self) -> Result<DatabaseCatalog, ClientError> {
        self.proxy.database_catalog().await
    }

    pub async fn database_details(
        &self,
        database_id: &str,
    ) -> Result<DatabaseDetails, ClientError> {
        self.proxy.database_details(database_id).await
    }

    /// Stop the recovery worker, then close the channel.
    ///
    /// Returns only after the worker task has fully exited. Precondition:
    /// callers have drained in-flight operations.
    pub async fn shutdown(self) -> Result<(), ClientError> {
        self.recovery.shutdown().await;
        self.channel.close().await?;
        Ok(())
    }
}
