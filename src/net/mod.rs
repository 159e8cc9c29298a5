//! Connection listener and per-connection I/O loop (C2): accept loop plus
//! one tokio task per client, replacing the teacher's raw-libc epoll reactor
//! (`anet.rs`, `ae.rs`, `eventloop.rs`) with the tokio runtime, grounded in
//! iscsi-client-rs's `pdu_connection` accept/serve split and rusty-timer's
//! `services/server` accept loop (spec §4.2, §5).

mod connection;
mod listener;

pub use listener::{run, Shared};
