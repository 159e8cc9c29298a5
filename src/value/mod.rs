//! Typed value model (C4): a sum type over string/hash/list/set/zset/stream/
//! json, each kind owning its own small operations module, plus a common
//! expiration header (spec §3).

mod stream;
mod zset;

pub use stream::{Stream, StreamEntry, StreamId};
pub use zset::ZSet;

use std::collections::{HashMap, HashSet, VecDeque};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    String,
    Hash,
    List,
    Set,
    SortedSet,
    Stream,
    Json,
}

impl Kind {
    pub fn type_name(self) -> &'static str {
        match self {
            Kind::String => "string",
            Kind::Hash => "hash",
            Kind::List => "list",
            Kind::Set => "set",
            Kind::SortedSet => "zset",
            Kind::Stream => "stream",
            Kind::Json => "ReJSON-RL",
        }
    }
}

#[derive(Debug, Clone)]
pub enum Payload {
    String(Vec<u8>),
    Hash(HashMap<Vec<u8>, Vec<u8>>),
    List(VecDeque<Vec<u8>>),
    Set(HashSet<Vec<u8>>),
    SortedSet(ZSet),
    Stream(Stream),
    Json(serde_json::Value),
}

impl Payload {
    pub fn kind(&self) -> Kind {
        match self {
            Payload::String(_) => Kind::String,
            Payload::Hash(_) => Kind::Hash,
            Payload::List(_) => Kind::List,
            Payload::Set(_) => Kind::Set,
            Payload::SortedSet(_) => Kind::SortedSet,
            Payload::Stream(_) => Kind::Stream,
            Payload::Json(_) => Kind::Json,
        }
    }

    /// Collections collapsing to empty after a mutation remove the key; for
    /// the String/Json kinds "empty" never triggers removal (spec §3 open
    /// question — we apply removal uniformly across all collection kinds,
    /// see DESIGN.md).
    pub fn is_empty_collection(&self) -> bool {
        match self {
            Payload::Hash(m) => m.is_empty(),
            Payload::List(l) => l.is_empty(),
            Payload::Set(s) => s.is_empty(),
            Payload::SortedSet(z) => z.is_empty(),
            Payload::Stream(s) => s.is_empty(),
            Payload::String(_) | Payload::Json(_) => false,
        }
    }
}

/// A stored value: a typed payload plus an optional absolute expiration
/// instant.
#[derive(Debug, Clone)]
pub struct Value {
    pub payload: Payload,
    pub expires_at: Option<Instant>,
}

impl Value {
    pub fn new(payload: Payload) -> Self {
        Value { payload, expires_at: None }
    }

    pub fn kind(&self) -> Kind {
        self.payload.kind()
    }

    pub fn is_expired(&self) -> bool {
        matches!(self.expires_at, Some(at) if Instant::now() >= at)
    }

    pub fn set_expiration(&mut self, seconds: i64) {
        self.expires_at = Some(Instant::now() + Duration::from_secs(seconds.max(0) as u64));
    }

    pub fn set_expiration_ms(&mut self, millis: i64) {
        self.expires_at = Some(Instant::now() + Duration::from_millis(millis.max(0) as u64));
    }

    pub fn remove_expiration(&mut self) -> bool {
        self.expires_at.take().is_some()
    }

    /// Seconds remaining, or -1 if no expiration is set. The "-2: no such
    /// key" case is the store's responsibility, not the value's.
    pub fn ttl_seconds(&self) -> i64 {
        match self.expires_at {
            None => -1,
            Some(at) => {
                let now = Instant::now();
                if at <= now {
                    0
                } else {
                    (at - now).as_secs() as i64
                }
            }
        }
    }

    pub fn as_string(&self) -> Option<&[u8]> {
        match &self.payload {
            Payload::String(s) => Some(s),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ttl_seconds_negative_one_when_unset() {
        let v = Value::new(Payload::String(b"x".to_vec()));
        assert_eq!(v.ttl_seconds(), -1);
    }

    #[test]
    fn persist_clears_expiration() {
        let mut v = Value::new(Payload::String(b"x".to_vec()));
        v.set_expiration(10);
        assert!(v.remove_expiration());
        assert_eq!(v.ttl_seconds(), -1);
    }

    #[test]
    fn empty_hash_is_reported_as_empty_collection() {
        let v = Value::new(Payload::Hash(HashMap::new()));
        assert!(v.payload.is_empty_collection());
    }
}
