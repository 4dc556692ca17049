//! Batch update
//!
//! Validates a batch payload, resolves every entry against one layout
//! snapshot, and sends the resulting command stream over the serial link in
//! a single write. The transport sits behind an async mutex held for the
//! whole write, so streams from concurrent batches never interleave.
//!
//! A batch is never abandoned part way through. The write timeout only
//! bounds the wait for the link to accept the first bytes; once it has, the
//! rest of the stream is written to completion so the controller never sees
//! a strip left open or a torn record.

use alloc::vec::Vec;

use bindicator_protocol::hex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::Mutex;
use embassy_time::{with_timeout, Duration};
use embedded_io_async::{Error as _, ErrorKind, Write};
use serde_json::Value;

use crate::batch::CommandBatch;
use crate::layout::{LayoutStore, LayoutTable};
use crate::request::{parse_batch, InputShapeError};

/// Status reported for a successful batch
pub const STATUS_OK: u16 = 200;

/// Status reported for a payload that is not an array
pub const STATUS_BAD_REQUEST: u16 = 400;

/// Status reported when the serial write fails
pub const STATUS_INTERNAL_ERROR: u16 = 500;

/// Default bound on a single batch write
pub const DEFAULT_WRITE_TIMEOUT_MS: u64 = 1000;

/// Byte representation of the stream on the serial link
///
/// The strip controller reads ASCII hex, two characters per command byte.
/// `Binary` sends the same records unencoded, for controllers that take raw
/// bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum WireEncoding {
    /// Raw command bytes
    Binary,
    /// Lowercase ASCII hex of the command bytes
    #[default]
    Hex,
}

impl WireEncoding {
    /// Convert a raw command stream into its on-wire form
    pub fn encode(self, stream: Vec<u8>) -> Vec<u8> {
        match self {
            WireEncoding::Binary => stream,
            WireEncoding::Hex => stream.iter().flat_map(|&b| hex::encode_byte(b)).collect(),
        }
    }
}

/// Updater configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UpdaterConfig {
    /// On-wire form of the stream
    pub encoding: WireEncoding,
    /// Upper bound on waiting for the link to accept a batch's first bytes
    pub write_timeout: Duration,
}

impl Default for UpdaterConfig {
    fn default() -> Self {
        Self {
            encoding: WireEncoding::Hex,
            write_timeout: Duration::from_millis(DEFAULT_WRITE_TIMEOUT_MS),
        }
    }
}

/// Serial link failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransportError {
    /// Underlying write or flush failed
    Io(ErrorKind),
    /// Link accepted nothing within the configured timeout; nothing was sent
    Timeout,
}

/// Batch update failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UpdateError {
    /// Payload was not an array; nothing was sent
    MalformedInput,
    /// Stream could not be written; no retry is attempted
    Transport(TransportError),
}

impl UpdateError {
    /// Status code reported to the caller
    pub fn status_code(&self) -> u16 {
        match self {
            UpdateError::MalformedInput => STATUS_BAD_REQUEST,
            UpdateError::Transport(_) => STATUS_INTERNAL_ERROR,
        }
    }
}

impl From<InputShapeError> for UpdateError {
    fn from(_: InputShapeError) -> Self {
        UpdateError::MalformedInput
    }
}

impl From<TransportError> for UpdateError {
    fn from(e: TransportError) -> Self {
        UpdateError::Transport(e)
    }
}

/// Applies bindicator batches to the LED strips
pub struct BindicatorUpdater<'a, W> {
    layout: &'a LayoutStore,
    transport: Mutex<CriticalSectionRawMutex, W>,
    config: UpdaterConfig,
}

impl<'a, W: Write> BindicatorUpdater<'a, W> {
    /// Create an updater that owns the serial transport
    pub fn new(layout: &'a LayoutStore, transport: W, config: UpdaterConfig) -> Self {
        Self {
            layout,
            transport: Mutex::new(transport),
            config,
        }
    }

    /// Consume the updater and return the transport
    pub fn into_transport(self) -> W {
        self.transport.into_inner()
    }

    /// Active configuration
    pub fn config(&self) -> &UpdaterConfig {
        &self.config
    }

    /// Build the on-wire stream for a batch without sending it
    ///
    /// Before any layout is loaded every entry resolves as a miss.
    pub fn encode_batch(&self, payload: &Value) -> Result<Vec<u8>, UpdateError> {
        let requests = parse_batch(payload)?;

        let snapshot = self.layout.snapshot();
        let empty = LayoutTable::new();
        let table = match snapshot.as_deref() {
            Some(table) => table,
            None => {
                #[cfg(feature = "defmt")]
                defmt::warn!("Batch received before layout was loaded");
                &empty
            }
        };

        #[cfg(feature = "defmt")]
        {
            let entries = payload.as_array().map_or(0, |entries| entries.len());
            if requests.len() < entries {
                defmt::debug!("Dropped {} invalid entries", entries - requests.len());
            }
        }

        let batch = CommandBatch::from_requests(table, &requests);

        #[cfg(feature = "defmt")]
        defmt::debug!(
            "Batch resolved {} pixels on {} strips",
            batch.pixel_count(),
            batch.touched_strips().count()
        );

        Ok(self.config.encoding.encode(batch.finish()))
    }

    /// Apply a batch payload
    ///
    /// `Ok(())` is the empty success payload. A malformed payload fails
    /// before anything is written; a batch that touches no strip writes
    /// nothing.
    pub async fn apply_batch(&self, payload: &Value) -> Result<(), UpdateError> {
        let stream = self.encode_batch(payload)?;
        if stream.is_empty() {
            #[cfg(feature = "defmt")]
            defmt::debug!("Batch touched no strips, nothing to send");
            return Ok(());
        }

        self.transmit(&stream).await?;
        Ok(())
    }

    /// Write one transmission unit while holding the transport
    ///
    /// Only the first write is raced against the timeout. The link must not
    /// take any bytes from a write that is dropped before it returns, so a
    /// timeout leaves the wire untouched.
    async fn transmit(&self, stream: &[u8]) -> Result<(), TransportError> {
        let mut transport = self.transport.lock().await;
        let tx = &mut *transport;

        let first = with_timeout(self.config.write_timeout, tx.write(stream)).await;
        let accepted = match first {
            Ok(Ok(0)) => Err(TransportError::Io(ErrorKind::WriteZero)),
            Ok(Ok(accepted)) => Ok(accepted),
            Ok(Err(e)) => Err(TransportError::Io(e.kind())),
            Err(_) => Err(TransportError::Timeout),
        };

        let outcome = match accepted {
            Ok(accepted) => {
                // Committed: the rest of the unit goes out whatever it takes
                let rest = stream.get(accepted..).unwrap_or_default();
                let finished = match tx.write_all(rest).await {
                    Ok(()) => tx.flush().await,
                    Err(e) => Err(e),
                };
                finished.map_err(|e| TransportError::Io(e.kind()))
            }
            Err(e) => Err(e),
        };

        match outcome {
            Ok(()) => {
                #[cfg(feature = "defmt")]
                defmt::trace!("Sent {} bytes", stream.len());
            }
            Err(TransportError::Timeout) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("Strip link did not accept the batch in time");
            }
            Err(TransportError::Io(_kind)) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("Strip link write failed: {:?}", _kind);
            }
        }
        outcome
    }
}
