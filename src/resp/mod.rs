//! RESP2/RESP3 wire codec (C1): an incremental byte-level decoder plus a
//! protocol-version-aware encoder. See spec §4.1.

mod decode;
mod encode;
mod value;

pub use decode::Decoder;
pub use encode::{encode, format_double};
pub use value::Reply;

/// Negotiated protocol version for a session. RESP2 is the default until a
/// client upgrades via `HELLO 3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtoVersion {
    Resp2,
    Resp3,
}

/// A single decoded RESP value, as read off the wire. Bulk/verbatim/blob-error
/// payloads are raw bytes — never interpreted as text.
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    SimpleString(Vec<u8>),
    Error(Vec<u8>),
    Integer(i64),
    BulkString(Vec<u8>),
    NullBulk,
    Array(Vec<Frame>),
    NullArray,
    Null,
    Double(f64),
    Boolean(bool),
    BigNumber(Vec<u8>),
    BlobError(Vec<u8>),
    VerbatimString { format: [u8; 3], text: Vec<u8> },
    Map(Vec<(Frame, Frame)>),
    Set(Vec<Frame>),
    Push(Vec<Frame>),
}

impl Frame {
    /// Extract a top-level command: an array of bulk strings. Inline commands
    /// (bare lines, no `*` framing) are also accepted, matching the classic
    /// Redis inline-command fallback.
    pub fn into_command(self) -> Option<Vec<Vec<u8>>> {
        match self {
            Frame::Array(items) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    match item {
                        Frame::BulkString(b) => out.push(b),
                        Frame::SimpleString(b) => out.push(b),
                        _ => return None,
                    }
                }
                Some(out)
            }
            _ => None,
        }
    }
}

pub const DEFAULT_MAX_ARRAY_LEN: i64 = 1 << 20;
pub const DEFAULT_MAX_BULK_LEN: i64 = 512 * 1024 * 1024;
