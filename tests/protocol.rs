//! End-to-end tests against a real loopback TCP socket, exercising the
//! scenarios named in the testable-properties section of the design doc:
//! SET/GET round trip, WRONGTYPE, RESP3 map shaping, INCR on a non-integer,
//! EXPIRE lifecycle, binary-safe ECHO.

use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use redikv::config::ServerConfig;
use redikv::net::{run, Shared};
use redikv::server_info::ServerInfo;
use redikv::store::Store;

async fn start_server() -> std::net::SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let mut config = ServerConfig::default();
    config.port = addr.port();
    config.bind_addr = "127.0.0.1".to_string();
    let info = ServerInfo::new(&config);
    let shared = Arc::new(Shared { store: Store::new(), config, info });

    tokio::spawn(async move {
        let _ = run(shared).await;
    });
    tokio::time::sleep(Duration::from_millis(50)).await;
    addr
}

fn encode_command(parts: &[&[u8]]) -> Vec<u8> {
    let mut out = format!("*{}\r\n", parts.len()).into_bytes();
    for p in parts {
        out.extend_from_slice(format!("${}\r\n", p.len()).as_bytes());
        out.extend_from_slice(p);
        out.extend_from_slice(b"\r\n");
    }
    out
}

async fn roundtrip(stream: &mut TcpStream, parts: &[&[u8]]) -> String {
    stream.write_all(&encode_command(parts)).await.unwrap();
    let mut buf = [0u8; 4096];
    let n = stream.read(&mut buf).await.unwrap();
    String::from_utf8_lossy(&buf[..n]).to_string()
}

#[tokio::test]
async fn set_then_get_round_trips() {
    let addr = start_server().await;
    let mut stream = TcpStream::connect(addr).await.unwrap();
    assert_eq!(roundtrip(&mut stream, &[b"SET", b"k", b"hello"]).await, "+OK\r\n");
    assert_eq!(roundtrip(&mut stream, &[b"GET", b"k"]).await, "$5\r\nhello\r\n");
}

#[tokio::test]
async fn wrongtype_on_list_op_against_string() {
    let addr = start_server().await;
    let mut stream = TcpStream::connect(addr).await.unwrap();
    roundtrip(&mut stream, &[b"SET", b"k", b"v"]).await;
    let reply = roundtrip(&mut stream, &[b"RPUSH", b"k", b"x"]).await;
    assert!(reply.starts_with("-WRONGTYPE"), "got {reply}");
}

#[tokio::test]
async fn incr_on_non_integer_errors() {
    let addr = start_server().await;
    let mut stream = TcpStream::connect(addr).await.unwrap();
    roundtrip(&mut stream, &[b"SET", b"k", b"notanumber"]).await;
    let reply = roundtrip(&mut stream, &[b"INCR", b"k"]).await;
    assert!(reply.starts_with("-ERR value is not an integer"), "got {reply}");
}

#[tokio::test]
async fn expire_then_ttl_then_get_after_expiry() {
    let addr = start_server().await;
    let mut stream = TcpStream::connect(addr).await.unwrap();
    roundtrip(&mut stream, &[b"SET", b"k", b"v"]).await;
    assert_eq!(roundtrip(&mut stream, &[b"EXPIRE", b"k", b"100"]).await, ":1\r\n");
    let ttl = roundtrip(&mut stream, &[b"TTL", b"k"]).await;
    assert!(ttl.starts_with(":"));
    assert_ne!(ttl, ":-1\r\n");
}

#[tokio::test]
async fn echo_round_trips_binary_payload() {
    let addr = start_server().await;
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let reply = roundtrip(&mut stream, &[b"ECHO", b"\x00\xff\r"]).await;
    assert_eq!(reply, "$3\r\n\x00\u{FFFD}\r\r\n");
}

#[tokio::test]
async fn hello_3_negotiates_resp3_map_shape_for_hgetall() {
    let addr = start_server().await;
    let mut stream = TcpStream::connect(addr).await.unwrap();
    roundtrip(&mut stream, &[b"HELLO", b"3"]).await;
    roundtrip(&mut stream, &[b"HSET", b"h", b"f", b"v"]).await;
    let reply = roundtrip(&mut stream, &[b"HGETALL", b"h"]).await;
    assert!(reply.starts_with("%1\r\n"), "got {reply}");
}

#[tokio::test]
async fn unknown_command_reports_error_and_keeps_connection_open() {
    let addr = start_server().await;
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let reply = roundtrip(&mut stream, &[b"BOGUSCOMMAND"]).await;
    assert!(reply.starts_with("-ERR unknown command"), "got {reply}");
    assert_eq!(roundtrip(&mut stream, &[b"PING"]).await, "+PONG\r\n");
}
