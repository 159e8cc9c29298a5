//! Reply encoder. Wire shape depends only on the session's negotiated
//! protocol version, never on the individual handler (spec §4.1, §9).

use super::{ProtoVersion, Reply};

/// "G17" shortest round-trippable decimal for an IEEE-754 double.
pub fn format_double(v: f64) -> String {
    if v.is_infinite() {
        return if v > 0.0 { "inf".to_string() } else { "-inf".to_string() };
    }
    if v.is_nan() {
        return "nan".to_string();
    }
    let mut s = format!("{v}");
    if !s.contains('.') && !s.contains('e') && !s.contains("inf") && !s.contains("nan") {
        s.push_str(".0"); // keep round-trippable float formatting unambiguous
    }
    s
}

pub fn encode(reply: &Reply, proto: ProtoVersion) -> Vec<u8> {
    let mut out = Vec::new();
    write_reply(&mut out, reply, proto);
    out
}

fn write_bulk(out: &mut Vec<u8>, bytes: &[u8]) {
    out.extend_from_slice(format!("${}\r\n", bytes.len()).as_bytes());
    out.extend_from_slice(bytes);
    out.extend_from_slice(b"\r\n");
}

fn write_reply(out: &mut Vec<u8>, reply: &Reply, proto: ProtoVersion) {
    match reply {
        Reply::Ok => out.extend_from_slice(b"+OK\r\n"),
        Reply::SimpleString(s) => {
            out.push(b'+');
            out.extend_from_slice(s.as_bytes());
            out.extend_from_slice(b"\r\n");
        }
        Reply::Error(s) => {
            out.push(b'-');
            out.extend_from_slice(s.as_bytes());
            out.extend_from_slice(b"\r\n");
        }
        Reply::Integer(n) => {
            out.extend_from_slice(format!(":{n}\r\n").as_bytes());
        }
        Reply::Bulk(bytes) => write_bulk(out, bytes),
        Reply::Nil => match proto {
            ProtoVersion::Resp2 => out.extend_from_slice(b"$-1\r\n"),
            ProtoVersion::Resp3 => out.extend_from_slice(b"_\r\n"),
        },
        Reply::Boolean(b) => match proto {
            ProtoVersion::Resp2 => out.extend_from_slice(if *b { b":1\r\n" } else { b":0\r\n" }),
            ProtoVersion::Resp3 => out.extend_from_slice(if *b { b"#t\r\n" } else { b"#f\r\n" }),
        },
        Reply::Double(v) => {
            let s = format_double(*v);
            match proto {
                ProtoVersion::Resp2 => write_bulk(out, s.as_bytes()),
                ProtoVersion::Resp3 => {
                    out.push(b',');
                    out.extend_from_slice(s.as_bytes());
                    out.extend_from_slice(b"\r\n");
                }
            }
        }
        Reply::Array(items) => {
            out.extend_from_slice(format!("*{}\r\n", items.len()).as_bytes());
            for item in items {
                write_reply(out, item, proto);
            }
        }
        Reply::Map(pairs) => match proto {
            ProtoVersion::Resp2 => {
                out.extend_from_slice(format!("*{}\r\n", pairs.len() * 2).as_bytes());
                for (k, v) in pairs {
                    write_reply(out, k, proto);
                    write_reply(out, v, proto);
                }
            }
            ProtoVersion::Resp3 => {
                out.extend_from_slice(format!("%{}\r\n", pairs.len()).as_bytes());
                for (k, v) in pairs {
                    write_reply(out, k, proto);
                    write_reply(out, v, proto);
                }
            }
        },
        Reply::Set(items) => match proto {
            ProtoVersion::Resp2 => {
                out.extend_from_slice(format!("*{}\r\n", items.len()).as_bytes());
                for item in items {
                    write_reply(out, item, proto);
                }
            }
            ProtoVersion::Resp3 => {
                out.extend_from_slice(format!("~{}\r\n", items.len()).as_bytes());
                for item in items {
                    write_reply(out, item, proto);
                }
            }
        },
        Reply::Push(items) => match proto {
            ProtoVersion::Resp2 => {
                out.extend_from_slice(format!("*{}\r\n", items.len()).as_bytes());
                for item in items {
                    write_reply(out, item, proto);
                }
            }
            ProtoVersion::Resp3 => {
                out.extend_from_slice(format!(">{}\r\n", items.len()).as_bytes());
                for item in items {
                    write_reply(out, item, proto);
                }
            }
        },
        Reply::Verbatim { format, text } => match proto {
            ProtoVersion::Resp2 => write_bulk(out, text),
            ProtoVersion::Resp3 => {
                let total = 4 + text.len();
                out.extend_from_slice(format!("={total}\r\n").as_bytes());
                out.extend_from_slice(format);
                out.push(b':');
                out.extend_from_slice(text);
                out.extend_from_slice(b"\r\n");
            }
        },
        Reply::NoReply => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nil_differs_by_protocol() {
        assert_eq!(encode(&Reply::Nil, ProtoVersion::Resp2), b"$-1\r\n");
        assert_eq!(encode(&Reply::Nil, ProtoVersion::Resp3), b"_\r\n");
    }

    #[test]
    fn map_flattens_under_resp2() {
        let m = Reply::Map(vec![
            (Reply::bulk(*b"a"), Reply::bulk(*b"1")),
            (Reply::bulk(*b"b"), Reply::bulk(*b"2")),
        ]);
        assert_eq!(
            encode(&m, ProtoVersion::Resp2),
            b"*4\r\n$1\r\na\r\n$1\r\n1\r\n$1\r\nb\r\n$1\r\n2\r\n"
        );
        assert_eq!(
            encode(&m, ProtoVersion::Resp3),
            b"%2\r\n$1\r\na\r\n$1\r\n1\r\n$1\r\nb\r\n$1\r\n2\r\n"
        );
    }

    #[test]
    fn echo_round_trips_binary_bulk() {
        let r = Reply::bulk(*b"\x00\xff\r");
        assert_eq!(encode(&r, ProtoVersion::Resp2), b"$3\r\n\x00\xff\r\r\n");
    }
}
