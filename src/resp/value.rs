//! The logical reply shape a command handler produces. The encoder renders
//! it to wire bytes according to the session's negotiated protocol version
//! (spec §9 "Response shaping by protocol version").

#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Ok,
    SimpleString(String),
    Error(String),
    Integer(i64),
    Bulk(Vec<u8>),
    Nil,
    Double(f64),
    Boolean(bool),
    Array(Vec<Reply>),
    /// Rendered as a flat k,v,k,v… array under RESP2 and a native map (`%`)
    /// under RESP3.
    Map(Vec<(Reply, Reply)>),
    /// Rendered as an array under RESP2 and a native set (`~`) under RESP3.
    Set(Vec<Reply>),
    Push(Vec<Reply>),
    Verbatim { format: [u8; 3], text: Vec<u8> },
    NoReply,
}

impl Reply {
    pub fn bulk(bytes: impl Into<Vec<u8>>) -> Reply {
        Reply::Bulk(bytes.into())
    }

    pub fn simple(s: impl Into<String>) -> Reply {
        Reply::SimpleString(s.into())
    }

    pub fn error(s: impl Into<String>) -> Reply {
        Reply::Error(s.into())
    }

    pub fn from_strings(items: impl IntoIterator<Item = Vec<u8>>) -> Reply {
        Reply::Array(items.into_iter().map(Reply::Bulk).collect())
    }
}

impl From<crate::error::CommandError> for Reply {
    fn from(e: crate::error::CommandError) -> Self {
        Reply::Error(e.0)
    }
}
