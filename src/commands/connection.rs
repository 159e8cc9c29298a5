//! Connection / session commands (spec §4.5 "Connection / session").

use crate::auth;
use crate::dispatch::Context;
use crate::error::CommandError;
use crate::resp::{ProtoVersion, Reply};

pub fn ping(_ctx: &mut Context, argv: &[Vec<u8>]) -> Result<Reply, CommandError> {
    match argv.len() {
        1 => Ok(Reply::simple("PONG")),
        2 => Ok(Reply::bulk(argv[1].clone())),
        _ => Err(CommandError::wrong_args("ping")),
    }
}

pub fn echo(_ctx: &mut Context, argv: &[Vec<u8>]) -> Result<Reply, CommandError> {
    // Bytes pass through unchanged: no text codec touches the payload.
    Ok(Reply::bulk(argv[1].clone()))
}

pub fn auth(ctx: &mut Context, argv: &[Vec<u8>]) -> Result<Reply, CommandError> {
    let (user, password) = match argv.len() {
        2 => (None, argv[1].as_slice()),
        3 => (Some(argv[1].as_slice()), argv[2].as_slice()),
        _ => return Err(CommandError::wrong_args("auth")),
    };
    if auth::check(user, password) {
        ctx.session.authenticated = true;
        Ok(Reply::Ok)
    } else {
        Err(CommandError::wrong_pass())
    }
}

pub fn hello(ctx: &mut Context, argv: &[Vec<u8>]) -> Result<Reply, CommandError> {
    let mut i = 1;
    if i < argv.len() {
        let version = super::util::parse_i64(&argv[i]).map_err(|_| CommandError::no_proto())?;
        match version {
            2 => ctx.session.proto = ProtoVersion::Resp2,
            3 => ctx.session.proto = ProtoVersion::Resp3,
            _ => return Err(CommandError::no_proto()),
        }
        i += 1;
    }
    while i < argv.len() {
        match super::util::uppercase(&argv[i]).as_str() {
            "AUTH" if i + 2 < argv.len() => {
                let user = &argv[i + 1];
                let pass = &argv[i + 2];
                if auth::check(Some(user), pass) {
                    ctx.session.authenticated = true;
                } else {
                    return Err(CommandError::wrong_pass());
                }
                i += 3;
            }
            "SETNAME" if i + 1 < argv.len() => {
                ctx.session.name = Some(String::from_utf8_lossy(&argv[i + 1]).to_string());
                i += 2;
            }
            _ => return Err(CommandError::syntax()),
        }
    }

    // 7 pairs, regardless of auth outcome (spec §9 open question).
    let pairs = vec![
        (Reply::bulk(*b"server"), Reply::bulk(*b"redikv")),
        (Reply::bulk(*b"version"), Reply::bulk(b"7.0.0".to_vec())),
        (
            Reply::bulk(*b"proto"),
            Reply::Integer(if ctx.session.is_resp3() { 3 } else { 2 }),
        ),
        (Reply::bulk(*b"id"), Reply::Integer(ctx.session.client_id as i64)),
        (Reply::bulk(*b"mode"), Reply::bulk(*b"standalone")),
        (Reply::bulk(*b"role"), Reply::bulk(*b"master")),
        (Reply::bulk(*b"modules"), Reply::Array(Vec::new())),
    ];
    Ok(Reply::Map(pairs))
}

pub fn select(_ctx: &mut Context, argv: &[Vec<u8>]) -> Result<Reply, CommandError> {
    let idx = super::util::parse_i64(&argv[1])?;
    if idx == 0 {
        Ok(Reply::Ok)
    } else {
        Err(CommandError::new("ERR DB index is out of range, only database 0 is supported"))
    }
}

pub fn quit(_ctx: &mut Context, _argv: &[Vec<u8>]) -> Result<Reply, CommandError> {
    Ok(Reply::Ok)
}

pub fn client(ctx: &mut Context, argv: &[Vec<u8>]) -> Result<Reply, CommandError> {
    let sub = super::util::uppercase(&argv[1]);
    match sub.as_str() {
        "SETNAME" if argv.len() == 3 => {
            ctx.session.name = Some(String::from_utf8_lossy(&argv[2]).to_string());
            Ok(Reply::Ok)
        }
        "GETNAME" => Ok(Reply::bulk(ctx.session.name.clone().unwrap_or_default())),
        "ID" => Ok(Reply::Integer(ctx.session.client_id as i64)),
        "SETINFO" if argv.len() == 4 => {
            match super::util::uppercase(&argv[2]).as_str() {
                "LIB-NAME" => ctx.session.lib_name = Some(String::from_utf8_lossy(&argv[3]).to_string()),
                "LIB-VER" => ctx.session.lib_version = Some(String::from_utf8_lossy(&argv[3]).to_string()),
                _ => return Err(CommandError::syntax()),
            }
            Ok(Reply::Ok)
        }
        _ => Err(CommandError::new(format!(
            "ERR Unknown CLIENT subcommand or wrong number of arguments for '{}'",
            sub.to_lowercase()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;
    use crate::server_info::ServerInfo;
    use crate::session::Session;
    use crate::store::Store;

    fn run(argv: &[&[u8]]) -> Result<Reply, CommandError> {
        let store = Store::new();
        let mut session = Session::new(false);
        let config = ServerConfig::default();
        let info = ServerInfo::new(&config);
        let mut ctx = Context { store: &store, session: &mut session, config: &config, info: &info };
        let argv: Vec<Vec<u8>> = argv.iter().map(|s| s.to_vec()).collect();
        match argv[0].to_ascii_uppercase().as_slice() {
            b"PING" => ping(&mut ctx, &argv),
            b"ECHO" => echo(&mut ctx, &argv),
            b"SELECT" => select(&mut ctx, &argv),
            _ => unreachable!(),
        }
    }

    #[test]
    fn ping_without_args_is_pong() {
        assert_eq!(run(&[b"PING"]).unwrap(), Reply::simple("PONG"));
    }

    #[test]
    fn echo_round_trips_binary_bytes() {
        let r = run(&[b"ECHO", b"\x00\xff\r"]).unwrap();
        assert_eq!(r, Reply::bulk(*b"\x00\xff\r"));
    }

    #[test]
    fn select_rejects_nonzero_db() {
        assert!(run(&[b"SELECT", b"1"]).is_err());
        assert!(run(&[b"SELECT", b"0"]).is_ok());
    }
}
