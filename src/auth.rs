//! Optional pluggable auth hook (C8). Process-global, set once at startup;
//! pure and thread-safe, consulted by AUTH and HELLO AUTH (spec §4.6).

use once_cell::sync::OnceCell;
use std::sync::Arc;

pub type AuthPredicate = dyn Fn(Option<&[u8]>, &[u8]) -> bool + Send + Sync;

static AUTH_HOOK: OnceCell<Arc<AuthPredicate>> = OnceCell::new();

/// Install the process-global auth hook. Intended to be called once, at
/// startup, before the listener accepts connections.
pub fn set_auth_hook(hook: Arc<AuthPredicate>) {
    let _ = AUTH_HOOK.set(hook);
}

pub fn is_configured() -> bool {
    AUTH_HOOK.get().is_some()
}

/// Check a username/password pair against the configured hook. When no hook
/// is configured, AUTH always succeeds.
pub fn check(user: Option<&[u8]>, password: &[u8]) -> bool {
    match AUTH_HOOK.get() {
        Some(hook) => hook(user, password),
        None => true,
    }
}
