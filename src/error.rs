//! Error taxonomy: protocol errors close the connection, command errors
//! are serialized inline and the connection continues.

use thiserror::Error;

/// A decode failure from the RESP codec (spec §7 "Protocol errors").
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("Protocol error: invalid type byte '{0}'")]
    InvalidTypeByte(u8),
    #[error("Protocol error: expected CRLF terminator")]
    MissingCrlf,
    #[error("Protocol error: invalid bulk length")]
    InvalidLength,
    #[error("Protocol error: invalid multibulk length")]
    InvalidMultibulkLength,
    #[error("Protocol error: bulk length {0} exceeds limit of {1} bytes")]
    BulkTooLarge(i64, usize),
    #[error("Protocol error: multibulk length {0} exceeds limit of {1} elements")]
    ArrayTooLarge(i64, usize),
    #[error("Protocol error: unbalanced quotes in request")]
    UnbalancedQuotes,
    #[error("Protocol error: expected top-level array of bulk strings")]
    NotAnArrayOfBulkStrings,
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// An error produced by a command handler (spec §7 "Command errors").
///
/// Carries the exact wire text after the leading `-`, so the dispatcher can
/// serialize it without re-deriving Redis's exact error strings.
#[derive(Debug, Error, Clone)]
#[error("{0}")]
pub struct CommandError(pub String);

impl CommandError {
    pub fn new(msg: impl Into<String>) -> Self {
        CommandError(msg.into())
    }

    pub fn wrong_type() -> Self {
        CommandError::new("WRONGTYPE Operation against a key holding the wrong kind of value")
    }

    pub fn wrong_args(cmd: &str) -> Self {
        CommandError::new(format!("ERR wrong number of arguments for '{cmd}' command"))
    }

    pub fn unknown_command(cmd: &str) -> Self {
        CommandError::new(format!("ERR unknown command '{cmd}'"))
    }

    pub fn not_integer() -> Self {
        CommandError::new("ERR value is not an integer or out of range")
    }

    pub fn not_float() -> Self {
        CommandError::new("ERR value is not a valid float")
    }

    pub fn overflow() -> Self {
        CommandError::new("ERR increment or decrement would overflow")
    }

    pub fn invalid_expire() -> Self {
        CommandError::new("ERR invalid expire time")
    }

    pub fn syntax() -> Self {
        CommandError::new("ERR syntax error")
    }

    pub fn no_auth() -> Self {
        CommandError::new("NOAUTH Authentication required")
    }

    pub fn wrong_pass() -> Self {
        CommandError::new("WRONGPASS invalid username-password pair")
    }

    pub fn no_proto() -> Self {
        CommandError::new("NOPROTO unsupported protocol version")
    }

    pub fn internal() -> Self {
        CommandError::new("ERR internal server error")
    }
}

impl From<&str> for CommandError {
    fn from(s: &str) -> Self {
        CommandError::new(s)
    }
}
