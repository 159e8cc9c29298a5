//! String commands (spec §4.5 "Strings").

use crate::dispatch::Context;
use crate::error::CommandError;
use crate::resp::Reply;
use crate::value::{Kind, Payload, Value};

enum Expiry {
    None,
    Seconds(i64),
    Millis(i64),
}

enum Presence {
    Any,
    IfNotExists,
    IfExists,
}

pub fn set(ctx: &mut Context, argv: &[Vec<u8>]) -> Result<Reply, CommandError> {
    let key = &argv[1];
    let value = &argv[2];
    let mut expiry = Expiry::None;
    let mut presence = Presence::Any;

    let mut i = 3;
    while i < argv.len() {
        match super::util::uppercase(&argv[i]).as_str() {
            "EX" if i + 1 < argv.len() => {
                expiry = Expiry::Seconds(super::util::parse_i64(&argv[i + 1])?);
                i += 2;
            }
            "PX" if i + 1 < argv.len() => {
                expiry = Expiry::Millis(super::util::parse_i64(&argv[i + 1])?);
                i += 2;
            }
            "NX" => {
                presence = Presence::IfNotExists;
                i += 1;
            }
            "XX" => {
                presence = Presence::IfExists;
                i += 1;
            }
            _ => return Err(CommandError::syntax()),
        }
    }

    let exists = ctx.store.exists(key);
    match presence {
        Presence::IfNotExists if exists => return Ok(Reply::Nil),
        Presence::IfExists if !exists => return Ok(Reply::Nil),
        _ => {}
    }

    let mut v = Value::new(Payload::String(value.clone()));
    match expiry {
        Expiry::None => {}
        Expiry::Seconds(s) if s <= 0 => return Err(CommandError::invalid_expire()),
        Expiry::Seconds(s) => v.set_expiration(s),
        Expiry::Millis(m) if m <= 0 => return Err(CommandError::invalid_expire()),
        Expiry::Millis(m) => v.set_expiration_ms(m),
    }
    ctx.store.add_or_replace(key.clone(), v);
    Ok(Reply::Ok)
}

pub fn get(ctx: &mut Context, argv: &[Vec<u8>]) -> Result<Reply, CommandError> {
    match ctx.store.get(&argv[1]) {
        Some(v) if v.kind() == Kind::String => Ok(Reply::bulk(v.as_string().unwrap().to_vec())),
        Some(_) => Err(CommandError::wrong_type()),
        None => Ok(Reply::Nil),
    }
}

pub fn mset(ctx: &mut Context, argv: &[Vec<u8>]) -> Result<Reply, CommandError> {
    if (argv.len() - 1) % 2 != 0 {
        return Err(CommandError::wrong_args("mset"));
    }
    for pair in argv[1..].chunks(2) {
        ctx.store.add_or_replace(pair[0].clone(), Value::new(Payload::String(pair[1].clone())));
    }
    Ok(Reply::Ok)
}

pub fn mget(ctx: &mut Context, argv: &[Vec<u8>]) -> Result<Reply, CommandError> {
    let replies = argv[1..]
        .iter()
        .map(|k| match ctx.store.get(k) {
            Some(v) if v.kind() == Kind::String => Reply::bulk(v.as_string().unwrap().to_vec()),
            _ => Reply::Nil,
        })
        .collect();
    Ok(Reply::Array(replies))
}

fn incr_by(ctx: &mut Context, key: &[u8], delta: i64) -> Result<Reply, CommandError> {
    let mut entry = ctx
        .store
        .get_or_create_mut(key, Kind::String, || Value::new(Payload::String(b"0".to_vec())))
        .map_err(|_| CommandError::wrong_type())?;
    let current = match &entry.payload {
        Payload::String(s) => super::util::parse_i64(s)?,
        _ => unreachable!(),
    };
    let next = current.checked_add(delta).ok_or_else(CommandError::overflow)?;
    entry.payload = Payload::String(next.to_string().into_bytes());
    Ok(Reply::Integer(next))
}

pub fn incr(ctx: &mut Context, argv: &[Vec<u8>]) -> Result<Reply, CommandError> {
    incr_by(ctx, &argv[1], 1)
}

pub fn decr(ctx: &mut Context, argv: &[Vec<u8>]) -> Result<Reply, CommandError> {
    incr_by(ctx, &argv[1], -1)
}

pub fn incrby(ctx: &mut Context, argv: &[Vec<u8>]) -> Result<Reply, CommandError> {
    let delta = super::util::parse_i64(&argv[2])?;
    incr_by(ctx, &argv[1], delta)
}

pub fn decrby(ctx: &mut Context, argv: &[Vec<u8>]) -> Result<Reply, CommandError> {
    let delta = super::util::parse_i64(&argv[2])?;
    let delta = delta.checked_neg().ok_or_else(CommandError::overflow)?;
    incr_by(ctx, &argv[1], delta)
}

pub fn incrbyfloat(ctx: &mut Context, argv: &[Vec<u8>]) -> Result<Reply, CommandError> {
    let delta = super::util::parse_f64(&argv[2])?;
    let mut entry = ctx
        .store
        .get_or_create_mut(&argv[1], Kind::String, || Value::new(Payload::String(b"0".to_vec())))
        .map_err(|_| CommandError::wrong_type())?;
    let current = match &entry.payload {
        Payload::String(s) => super::util::parse_f64(s)?,
        _ => unreachable!(),
    };
    let next = current + delta;
    let rendered = crate::resp::format_double(next).into_bytes();
    entry.payload = Payload::String(rendered.clone());
    Ok(Reply::bulk(rendered))
}

pub fn strlen(ctx: &mut Context, argv: &[Vec<u8>]) -> Result<Reply, CommandError> {
    match ctx.store.get(&argv[1]) {
        Some(v) if v.kind() == Kind::String => Ok(Reply::Integer(v.as_string().unwrap().len() as i64)),
        Some(_) => Err(CommandError::wrong_type()),
        None => Ok(Reply::Integer(0)),
    }
}

pub fn getrange(ctx: &mut Context, argv: &[Vec<u8>]) -> Result<Reply, CommandError> {
    let start = super::util::parse_i64(&argv[2])?;
    let end = super::util::parse_i64(&argv[3])?;
    match ctx.store.get(&argv[1]) {
        Some(v) if v.kind() == Kind::String => {
            let s = v.as_string().unwrap();
            match super::util::clamp_range(start, end, s.len()) {
                Some((lo, hi)) => Ok(Reply::bulk(s[lo..=hi].to_vec())),
                None => Ok(Reply::bulk(Vec::new())),
            }
        }
        Some(_) => Err(CommandError::wrong_type()),
        None => Ok(Reply::bulk(Vec::new())),
    }
}

pub fn append(ctx: &mut Context, argv: &[Vec<u8>]) -> Result<Reply, CommandError> {
    let mut entry = ctx
        .store
        .get_or_create_mut(&argv[1], Kind::String, || Value::new(Payload::String(Vec::new())))
        .map_err(|_| CommandError::wrong_type())?;
    match &mut entry.payload {
        Payload::String(s) => {
            s.extend_from_slice(&argv[2]);
            Ok(Reply::Integer(s.len() as i64))
        }
        _ => unreachable!(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;
    use crate::server_info::ServerInfo;
    use crate::session::Session;
    use crate::store::Store;

    fn context<'a>(store: &'a Store, session: &'a mut Session, config: &'a ServerConfig, info: &'a ServerInfo) -> Context<'a> {
        Context { store, session, config, info }
    }

    #[test]
    fn set_then_get_round_trips() {
        let store = Store::new();
        let mut session = Session::new(false);
        let config = ServerConfig::default();
        let info = ServerInfo::new(&config);
        let mut ctx = context(&store, &mut session, &config, &info);
        set(&mut ctx, &[b"SET".to_vec(), b"k".to_vec(), b"v".to_vec()]).unwrap();
        assert_eq!(get(&mut ctx, &[b"GET".to_vec(), b"k".to_vec()]).unwrap(), Reply::bulk(*b"v"));
    }

    #[test]
    fn get_on_wrong_type_errors() {
        let store = Store::new();
        store.add_or_replace(b"h".to_vec(), Value::new(Payload::Hash(Default::default())));
        let mut session = Session::new(false);
        let config = ServerConfig::default();
        let info = ServerInfo::new(&config);
        let mut ctx = context(&store, &mut session, &config, &info);
        assert!(get(&mut ctx, &[b"GET".to_vec(), b"h".to_vec()]).is_err());
    }

    #[test]
    fn incr_on_non_integer_string_errors() {
        let store = Store::new();
        store.add_or_replace(b"k".to_vec(), Value::new(Payload::String(b"abc".to_vec())));
        let mut session = Session::new(false);
        let config = ServerConfig::default();
        let info = ServerInfo::new(&config);
        let mut ctx = context(&store, &mut session, &config, &info);
        assert!(incr(&mut ctx, &[b"INCR".to_vec(), b"k".to_vec()]).is_err());
    }

    #[test]
    fn incr_overflow_is_reported() {
        let store = Store::new();
        store.add_or_replace(b"k".to_vec(), Value::new(Payload::String(i64::MAX.to_string().into_bytes())));
        let mut session = Session::new(false);
        let config = ServerConfig::default();
        let info = ServerInfo::new(&config);
        let mut ctx = context(&store, &mut session, &config, &info);
        assert!(incr(&mut ctx, &[b"INCR".to_vec(), b"k".to_vec()]).is_err());
    }
}
