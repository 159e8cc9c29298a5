//! Per-connection task: read bytes, decode RESP frames, dispatch, write
//! replies, until EOF, a protocol error, QUIT, or an idle timeout elapses
//! (spec §4.2, §5 "Idle connections").

use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::auth;
use crate::dispatch::{self, Context};
use crate::error::CommandError;
use crate::resp::{Decoder, Reply};
use crate::session::Session;

use super::Shared;

pub async fn serve(stream: TcpStream, peer: std::net::SocketAddr, shared: Arc<Shared>) {
    shared.info.record_connection();
    tracing::debug!(%peer, "accepted connection");
    let _ = stream.set_nodelay(true);

    let auth_required = shared.config.require_pass.is_some() || auth::is_configured();
    let mut session = Session::new(auth_required);
    let mut decoder = Decoder::new();
    let mut stream = stream;
    let mut buf = [0u8; 16 * 1024];
    let idle_timeout = shared.config.idle_timeout_seconds.map(|s| Duration::from_secs(s as u64));

    loop {
        let read_result = match idle_timeout {
            Some(d) => match tokio::time::timeout(d, stream.read(&mut buf)).await {
                Ok(r) => r,
                Err(_) => {
                    tracing::debug!(%peer, "idle timeout, closing connection");
                    break;
                }
            },
            None => stream.read(&mut buf).await,
        };

        let n = match read_result {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) => {
                tracing::debug!(%peer, error = %e, "read error, closing connection");
                break;
            }
        };
        decoder.feed(&buf[..n]);

        let frames = match decoder.decode_all() {
            Ok(frames) => frames,
            Err(e) => {
                let reply = Reply::error(format!("ERR {e}"));
                let _ = stream.write_all(&crate::resp::encode(&reply, session.proto)).await;
                break;
            }
        };

        let mut quit = false;
        for frame in frames {
            let argv = match frame.into_command() {
                Some(argv) => argv,
                None => {
                    let reply = Reply::from(CommandError::new("ERR Protocol error: expected array of bulk strings"));
                    let _ = stream.write_all(&crate::resp::encode(&reply, session.proto)).await;
                    continue;
                }
            };

            if !session.authenticated && !argv.is_empty() {
                let name = String::from_utf8_lossy(&argv[0]).to_ascii_uppercase();
                if !matches!(name.as_str(), "AUTH" | "HELLO" | "QUIT") {
                    let reply = Reply::from(CommandError::no_auth());
                    let _ = stream.write_all(&crate::resp::encode(&reply, session.proto)).await;
                    continue;
                }
            }

            let is_quit = argv.first().map(|c| c.eq_ignore_ascii_case(b"QUIT")).unwrap_or(false);

            let mut ctx = Context {
                store: &shared.store,
                session: &mut session,
                config: &shared.config,
                info: &shared.info,
            };
            let reply = dispatch::dispatch(&mut ctx, &argv);
            if !matches!(reply, Reply::NoReply) {
                if stream.write_all(&crate::resp::encode(&reply, session.proto)).await.is_err() {
                    quit = true;
                    break;
                }
            }
            if is_quit {
                quit = true;
                break;
            }
        }
        if quit {
            break;
        }
    }
    tracing::debug!(%peer, "connection closed");
}
