//! The wire frame exchanged between VAST components: a 4-byte big-endian
//! length prefix followed by a `bincode`-encoded [`Envelope`]. Any
//! wire-compatible framing would satisfy spec.md §6; this one is chosen
//! for being a self-describing binary serialization already present in
//! the workspace's dependency graph, not for bit-compatibility with the
//! original's Broccoli format (explicitly out of scope).

use serde::{Deserialize, Serialize};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use uuid::Uuid;

/// Frames above this size are rejected rather than read into memory whole.
pub const MAX_FRAME_LEN: u32 = 64 * 1024 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error("frame of {0} bytes exceeds the {MAX_FRAME_LEN}-byte limit")]
    TooLarge(u32),
    #[error("encode failed: {0}")]
    Encode(#[from] bincode::error::EncodeError),
    #[error("decode failed: {0}")]
    Decode(#[from] bincode::error::DecodeError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Control verbs and payloads carried between component actors, per
/// spec.md §6's `run`/`query`/`cancel`/`store`/`lookup`/`ack`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Envelope {
    /// Starts a component actor's main loop (sent by the CLI on launch).
    Run,
    /// A query string submitted to Search, tagged with the id the caller
    /// will use to correlate `Ack`/results/`Cancel`.
    Query { query_id: Uuid, text: String },
    /// Cancels the query or operation identified by `query_id`.
    Cancel { query_id: Uuid },
    /// A segment handed to Archive to persist.
    Store { segment_id: Uuid, bytes: Vec<u8> },
    /// An ID-range lookup request against Archive or Index.
    Lookup { lo: u64, hi: u64 },
    /// Acknowledges completion of a prior `Store`/`Query`/`Lookup`.
    Ack { id: Uuid },
}

fn codec_config() -> bincode::config::Configuration {
    bincode::config::standard()
}

/// Encodes `envelope` as a complete length-prefixed frame.
pub fn encode_frame(envelope: &Envelope) -> Result<Vec<u8>, FrameError> {
    let body = bincode::serde::encode_to_vec(envelope, codec_config())?;
    let len = u32::try_from(body.len()).map_err(|_| FrameError::TooLarge(u32::MAX))?;
    if len > MAX_FRAME_LEN {
        return Err(FrameError::TooLarge(len));
    }
    let mut frame = Vec::with_capacity(4 + body.len());
    frame.extend_from_slice(&len.to_be_bytes());
    frame.extend_from_slice(&body);
    Ok(frame)
}

/// Reads one complete frame from `reader`, blocking until it arrives.
pub async fn read_frame<R: AsyncRead + Unpin>(reader: &mut R) -> Result<Envelope, FrameError> {
    let mut len_buf = [0u8; 4];
    reader.read_exact(&mut len_buf).await?;
    let len = u32::from_be_bytes(len_buf);
    if len > MAX_FRAME_LEN {
        return Err(FrameError::TooLarge(len));
    }
    let mut body = vec![0u8; len as usize];
    reader.read_exact(&mut body).await?;
    let (envelope, _) = bincode::serde::decode_from_slice(&body, codec_config())?;
    Ok(envelope)
}

/// Writes `envelope` to `writer` as one complete frame.
pub async fn write_frame<W: AsyncWrite + Unpin>(
    writer: &mut W,
    envelope: &Envelope,
) -> Result<(), FrameError> {
    let frame = encode_frame(envelope)?;
    writer.write_all(&frame).await?;
    Ok(())
}
