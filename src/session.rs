//! Per-connection session state (C3). One `Session` is created on accept and
//! destroyed on close; it carries protocol version, name, client id, library
//! metadata and auth state (spec §3 "Session", §4.2).

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use crate::resp::ProtoVersion;

static NEXT_CLIENT_ID: AtomicU64 = AtomicU64::new(1);

pub struct Session {
    pub client_id: u64,
    pub name: Option<String>,
    pub lib_name: Option<String>,
    pub lib_version: Option<String>,
    pub connected_at: Instant,
    pub proto: ProtoVersion,
    pub authenticated: bool,
}

impl Session {
    /// Allocate a new session with a freshly incremented, process-unique
    /// client id, default RESP2, unauthenticated — unless no auth hook is
    /// configured, in which case every connection starts authenticated
    /// (spec §4.6: "When unset, AUTH always succeeds").
    pub fn new(auth_required: bool) -> Self {
        Session {
            client_id: NEXT_CLIENT_ID.fetch_add(1, Ordering::Relaxed),
            name: None,
            lib_name: None,
            lib_version: None,
            connected_at: Instant::now(),
            proto: ProtoVersion::Resp2,
            authenticated: !auth_required,
        }
    }

    pub fn is_resp3(&self) -> bool {
        matches!(self.proto, ProtoVersion::Resp3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_ids_are_unique_and_monotonic() {
        let a = Session::new(false);
        let b = Session::new(false);
        assert!(b.client_id > a.client_id);
    }

    #[test]
    fn starts_authenticated_when_no_hook_configured() {
        assert!(Session::new(false).authenticated);
        assert!(!Session::new(true).authenticated);
    }
}
