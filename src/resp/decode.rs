//! Incremental RESP decoder. Restartable: a partial frame at the end of the
//! buffer is left untouched until more bytes arrive, rather than re-parsed
//! from scratch (spec §4.1, §9 "Streaming decode").

use bytes::{Buf, BytesMut};

use super::{Frame, DEFAULT_MAX_ARRAY_LEN, DEFAULT_MAX_BULK_LEN};
use crate::error::ProtocolError;

pub struct Decoder {
    buf: BytesMut,
    max_array_len: i64,
    max_bulk_len: i64,
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder {
    pub fn new() -> Self {
        Decoder {
            buf: BytesMut::new(),
            max_array_len: DEFAULT_MAX_ARRAY_LEN,
            max_bulk_len: DEFAULT_MAX_BULK_LEN,
        }
    }

    pub fn with_limits(max_array_len: i64, max_bulk_len: i64) -> Self {
        Decoder {
            buf: BytesMut::new(),
            max_array_len,
            max_bulk_len,
        }
    }

    /// Feed freshly-read socket bytes into the rolling buffer.
    pub fn feed(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Try to decode every complete top-level value currently buffered.
    /// Returns as many whole frames as are available; the remainder (a
    /// partial frame, or nothing) stays buffered for the next `feed`.
    pub fn decode_all(&mut self) -> Result<Vec<Frame>, ProtocolError> {
        let mut out = Vec::new();
        loop {
            match self.try_decode_one()? {
                Some(frame) => out.push(frame),
                None => break,
            }
        }
        Ok(out)
    }

    /// Attempt to decode a single top-level value from the buffer without
    /// consuming anything if the buffer holds an incomplete frame.
    fn try_decode_one(&mut self) -> Result<Option<Frame>, ProtocolError> {
        let snapshot = self.buf.clone();
        match parse_frame(&snapshot, self.max_array_len, self.max_bulk_len)? {
            Some((frame, consumed)) => {
                self.buf.advance(consumed);
                Ok(Some(frame))
            }
            None => Ok(None),
        }
    }
}

/// Parse exactly one frame starting at `buf[0]`. Returns `None` if `buf`
/// does not yet contain a complete frame (more bytes needed). Never
/// interprets bulk/verbatim/blob-error payload bytes as text.
fn parse_frame(
    buf: &[u8],
    max_array_len: i64,
    max_bulk_len: i64,
) -> Result<Option<(Frame, usize)>, ProtocolError> {
    if buf.is_empty() {
        return Ok(None);
    }
    let marker = buf[0];
    let rest = &buf[1..];
    match marker {
        b'+' => parse_line(rest).map(|opt| opt.map(|(line, n)| (Frame::SimpleString(line), n + 1))),
        b'-' => parse_line(rest).map(|opt| opt.map(|(line, n)| (Frame::Error(line), n + 1))),
        b':' => parse_integer_line(rest).map(|opt| opt.map(|(v, n)| (Frame::Integer(v), n + 1))),
        b'_' => {
            // "_\r\n"
            match find_crlf(rest) {
                Some(0) => Ok(Some((Frame::Null, 1 + 2))),
                Some(_) => Err(ProtocolError::MissingCrlf),
                None => Ok(None),
            }
        }
        b'#' => {
            if rest.len() < 3 {
                return Ok(None);
            }
            let b = match rest[0] {
                b't' => true,
                b'f' => false,
                other => return Err(ProtocolError::InvalidTypeByte(other)),
            };
            if &rest[1..3] != b"\r\n" {
                return Err(ProtocolError::MissingCrlf);
            }
            Ok(Some((Frame::Boolean(b), 1 + 3)))
        }
        b',' => parse_line(rest).map(|opt| {
            opt.and_then(|(line, n)| {
                std::str::from_utf8(&line)
                    .ok()
                    .and_then(|s| s.parse::<f64>().ok())
                    .map(|v| (Frame::Double(v), n + 1))
            })
        }),
        b'(' => parse_line(rest).map(|opt| opt.map(|(line, n)| (Frame::BigNumber(line), n + 1))),
        b'$' => parse_bulk(rest, max_bulk_len, |b| Frame::BulkString(b), || Frame::NullBulk),
        b'!' => parse_bulk(rest, max_bulk_len, Frame::BlobError, || Frame::BlobError(Vec::new())),
        b'=' => {
            match parse_bulk(rest, max_bulk_len, |b| b, || Vec::new())? {
                None => Ok(None),
                Some((bytes, n)) => {
                    if bytes.len() < 4 || bytes[3] != b':' {
                        return Err(ProtocolError::InvalidLength);
                    }
                    let mut format = [0u8; 3];
                    format.copy_from_slice(&bytes[..3]);
                    let text = bytes[4..].to_vec();
                    Ok(Some((Frame::VerbatimString { format, text }, n)))
                }
            }
        }
        b'*' => parse_array(rest, max_array_len, max_bulk_len),
        b'~' => parse_aggregate(rest, max_array_len, max_bulk_len, Frame::Set),
        b'>' => parse_aggregate(rest, max_array_len, max_bulk_len, Frame::Push),
        b'%' => parse_map(rest, max_array_len, max_bulk_len),
        b'|' => {
            // Attribute: metadata preceding the next value. We parse and
            // discard it, then parse the value that follows.
            match parse_map(rest, max_array_len, max_bulk_len)? {
                None => Ok(None),
                Some((_attrs, n)) => {
                    let tail = &buf[1 + n..];
                    match parse_frame(tail, max_array_len, max_bulk_len)? {
                        None => Ok(None),
                        Some((frame, m)) => Ok(Some((frame, 1 + n + m))),
                    }
                }
            }
        }
        // Inline command fallback: a line with no type marker, terminated by
        // CRLF, split on whitespace into bulk-string-equivalent arguments.
        _ => parse_inline(buf, max_array_len),
    }
}

fn find_crlf(buf: &[u8]) -> Option<usize> {
    buf.windows(2).position(|w| w == b"\r\n")
}

fn parse_line(buf: &[u8]) -> Result<Option<(Vec<u8>, usize)>, ProtocolError> {
    match find_crlf(buf) {
        Some(idx) => Ok(Some((buf[..idx].to_vec(), idx + 2))),
        None => Ok(None),
    }
}

fn parse_integer_line(buf: &[u8]) -> Result<Option<(i64, usize)>, ProtocolError> {
    match parse_line(buf)? {
        None => Ok(None),
        Some((line, n)) => {
            let s = std::str::from_utf8(&line).map_err(|_| ProtocolError::InvalidLength)?;
            let v: i64 = s.trim().parse().map_err(|_| ProtocolError::InvalidLength)?;
            Ok(Some((v, n)))
        }
    }
}

fn parse_bulk<T>(
    buf: &[u8],
    max_bulk_len: i64,
    make: impl FnOnce(Vec<u8>) -> T,
    make_null: impl FnOnce() -> T,
) -> Result<Option<(T, usize)>, ProtocolError> {
    let (len, header_len) = match parse_integer_line(buf)? {
        None => return Ok(None),
        Some(v) => v,
    };
    if len == -1 {
        return Ok(Some((make_null(), header_len)));
    }
    if len < -1 {
        return Err(ProtocolError::InvalidLength);
    }
    if len > max_bulk_len {
        return Err(ProtocolError::BulkTooLarge(len, max_bulk_len as usize));
    }
    let len = len as usize;
    let body_start = header_len;
    let body_end = body_start + len;
    let total = body_end + 2;
    if buf.len() < total {
        return Ok(None);
    }
    if &buf[body_end..total] != b"\r\n" {
        return Err(ProtocolError::MissingCrlf);
    }
    let payload = buf[body_start..body_end].to_vec();
    Ok(Some((make(payload), total)))
}

fn parse_array(
    buf: &[u8],
    max_array_len: i64,
    max_bulk_len: i64,
) -> Result<Option<(Frame, usize)>, ProtocolError> {
    let (len, header_len) = match parse_integer_line(buf)? {
        None => return Ok(None),
        Some(v) => v,
    };
    if len == -1 {
        return Ok(Some((Frame::NullArray, header_len)));
    }
    if len < -1 {
        return Err(ProtocolError::InvalidMultibulkLength);
    }
    if len > max_array_len {
        return Err(ProtocolError::ArrayTooLarge(len, max_array_len as usize));
    }
    let mut items = Vec::with_capacity(len as usize);
    let mut consumed = header_len;
    for _ in 0..len {
        match parse_frame(&buf[consumed..], max_array_len, max_bulk_len)? {
            None => return Ok(None),
            Some((frame, n)) => {
                items.push(frame);
                consumed += n;
            }
        }
    }
    Ok(Some((Frame::Array(items), consumed)))
}

fn parse_aggregate(
    buf: &[u8],
    max_array_len: i64,
    max_bulk_len: i64,
    make: impl FnOnce(Vec<Frame>) -> Frame,
) -> Result<Option<(Frame, usize)>, ProtocolError> {
    match parse_array(buf, max_array_len, max_bulk_len)? {
        None => Ok(None),
        Some((Frame::Array(items), n)) => Ok(Some((make(items), n))),
        Some((Frame::NullArray, n)) => Ok(Some((make(Vec::new()), n))),
        _ => unreachable!(),
    }
}

fn parse_map(
    buf: &[u8],
    max_array_len: i64,
    max_bulk_len: i64,
) -> Result<Option<(Frame, usize)>, ProtocolError> {
    let (len, header_len) = match parse_integer_line(buf)? {
        None => return Ok(None),
        Some(v) => v,
    };
    if len < 0 {
        return Err(ProtocolError::InvalidMultibulkLength);
    }
    if len * 2 > max_array_len {
        return Err(ProtocolError::ArrayTooLarge(len, max_array_len as usize));
    }
    let mut pairs = Vec::with_capacity(len as usize);
    let mut consumed = header_len;
    for _ in 0..len {
        let (key, kn) = match parse_frame(&buf[consumed..], max_array_len, max_bulk_len)? {
            None => return Ok(None),
            Some(v) => v,
        };
        consumed += kn;
        let (val, vn) = match parse_frame(&buf[consumed..], max_array_len, max_bulk_len)? {
            None => return Ok(None),
            Some(v) => v,
        };
        consumed += vn;
        pairs.push((key, val));
    }
    Ok(Some((Frame::Map(pairs), consumed)))
}

/// Legacy inline-command parsing: a single CRLF-terminated line, split on
/// whitespace, honoring simple single/double quoting. No type marker.
fn parse_inline(buf: &[u8], max_array_len: i64) -> Result<Option<(Frame, usize)>, ProtocolError> {
    let idx = match find_crlf(buf) {
        Some(idx) => idx,
        None => {
            if buf.len() > 64 * 1024 {
                return Err(ProtocolError::InvalidMultibulkLength);
            }
            return Ok(None);
        }
    };
    let line = &buf[..idx];
    let args = split_inline_args(line)?;
    if args.len() as i64 > max_array_len {
        return Err(ProtocolError::ArrayTooLarge(args.len() as i64, max_array_len as usize));
    }
    let frame = Frame::Array(args.into_iter().map(Frame::BulkString).collect());
    Ok(Some((frame, idx + 2)))
}

fn split_inline_args(line: &[u8]) -> Result<Vec<Vec<u8>>, ProtocolError> {
    let mut args = Vec::new();
    let mut i = 0;
    while i < line.len() {
        while i < line.len() && line[i].is_ascii_whitespace() {
            i += 1;
        }
        if i >= line.len() {
            break;
        }
        let mut current = Vec::new();
        if line[i] == b'"' || line[i] == b'\'' {
            let quote = line[i];
            i += 1;
            let mut closed = false;
            while i < line.len() {
                if line[i] == quote {
                    i += 1;
                    closed = true;
                    break;
                }
                current.push(line[i]);
                i += 1;
            }
            if !closed {
                return Err(ProtocolError::UnbalancedQuotes);
            }
        } else {
            while i < line.len() && !line[i].is_ascii_whitespace() {
                current.push(line[i]);
                i += 1;
            }
        }
        args.push(current);
    }
    Ok(args)
}
