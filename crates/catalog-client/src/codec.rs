//! Payload codec and diagnostic capture.
//!
//! [`CodecAdapter`] turns typed payloads into wire bytes through an injected
//! [`PayloadCodec`] and can mirror a decoded copy of every payload to a
//! [`DiagnosticSink`] for offline inspection. Capture is best-effort: it never
//! alters the returned bytes and never fails the primary operation.

use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Serialize, de::DeserializeOwned};

use crate::error::ClientError;

/// Codec for turning typed payloads into wire bytes and back.
pub trait PayloadCodec: Send + Sync {
    /// Encode a value into bytes.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ClientError>;

    /// Decode bytes into a value.
    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, ClientError>;
}

/// JSON codec backed by serde_json.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonCodec;

impl PayloadCodec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ClientError> {
        serde_json::to_vec(value).map_err(|e| ClientError::Codec(e.to_string()))
    }

    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, ClientError> {
        serde_json::from_slice(bytes).map_err(|e| ClientError::Codec(e.to_string()))
    }
}

/// Sink that persists diagnostic artifacts.
pub trait DiagnosticSink: Send + Sync {
    fn write(&self, filename: &str, data: &[u8]) -> io::Result<()>;
}

/// Writes diagnostic artifacts into a fixed directory.
#[derive(Debug, Clone)]
pub struct DirSink {
    dir: PathBuf,
}

impl DirSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl DiagnosticSink for DirSink {
    fn write(&self, filename: &str, data: &[u8]) -> io::Result<()> {
        std::fs::write(self.dir.join(filename), data)
    }
}

/// Decodes wire bytes into a human-readable form, used only for diagnostics.
pub trait Decompressor: Send + Sync {
    fn decode(&self, bytes: &[u8]) -> io::Result<Vec<u8>>;
}

/// Pass-through for uncompressed wire formats.
#[derive(Debug, Default, Clone, Copy)]
pub struct IdentityDecompressor;

impl Decompressor for IdentityDecompressor {
    fn decode(&self, bytes: &[u8]) -> io::Result<Vec<u8>> {
        Ok(bytes.to_vec())
    }
}

struct DiagnosticCapture {
    sink: Box<dyn DiagnosticSink>,
    decompressor: Box<dyn Decompressor>,
    counter: AtomicU64,
    process_id: u32,
}

impl DiagnosticCapture {
    /// Mirror `bytes` to the sink under a unique filename. Failures are
    /// logged and swallowed so the encode/decode this shadows is unaffected.
    fn capture(&self, type_name: &str, bytes: &[u8]) {
        let id = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        let filename = format!("P{}_C{}_{}.xml", self.process_id, id, type_name);

        let readable = match self.decompressor.decode(bytes) {
            Ok(readable) => readable,
            Err(error) => {
                tracing::warn!(%filename, %error, "diagnostic decode failed");
                return;
            }
        };

        if let Err(error) = self.sink.write(&filename, &readable) {
            tracing::warn!(%filename, %error, "diagnostic write failed");
        }
    }
}

/// Codec adapter with optional diagnostic capture.
///
/// The capture counter is owned by the adapter instance, so filenames are
/// unique across all threads sharing it.
pub struct CodecAdapter<C> {
    codec: C,
    capture: Option<DiagnosticCapture>,
}

impl<C: PayloadCodec> CodecAdapter<C> {
    pub fn new(codec: C) -> Self {
        Self {
            codec,
            capture: None,
        }
    }

    /// Enable diagnostic capture through the given sink and decompressor.
    pub fn with_diagnostics(
        codec: C,
        sink: impl DiagnosticSink + 'static,
        decompressor: impl Decompressor + 'static,
    ) -> Self {
        Self {
            codec,
            capture: Some(DiagnosticCapture {
                sink: Box::new(sink),
                decompressor: Box::new(decompressor),
                counter: AtomicU64::new(0),
                process_id: std::process::id(),
            }),
        }
    }

    /// Encode `payload`, mirroring the produced bytes to the diagnostic sink
    /// when capture is enabled.
    pub fn serialize<T: Serialize>(&self, payload: &T) -> Result<Vec<u8>, ClientError> {
        let bytes = self.codec.encode(payload)?;
        if let Some(capture) = &self.capture {
            capture.capture(short_type_name::<T>(), &bytes);
        }
        Ok(bytes)
    }

    /// Decode `bytes`, mirroring the raw bytes to the diagnostic sink before
    /// decoding when capture is enabled.
    pub fn deserialize<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, ClientError> {
        if let Some(capture) = &self.capture {
            capture.capture(short_type_name::<T>(), bytes);
        }
        self.codec.decode(bytes)
    }
}

fn short_type_name<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    full.rsplit("::").next().unwrap_or(full)
}
