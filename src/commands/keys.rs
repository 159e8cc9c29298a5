//! Generic key-space commands (spec §4.5 "Keys"): existence, expiration,
//! renaming, pattern scanning.

use crate::dispatch::Context;
use crate::error::CommandError;
use crate::resp::Reply;

pub fn del(ctx: &mut Context, argv: &[Vec<u8>]) -> Result<Reply, CommandError> {
    let removed = argv[1..].iter().filter(|k| ctx.store.remove(k)).count();
    Ok(Reply::Integer(removed as i64))
}

pub fn exists(ctx: &mut Context, argv: &[Vec<u8>]) -> Result<Reply, CommandError> {
    let count = argv[1..].iter().filter(|k| ctx.store.exists(k)).count();
    Ok(Reply::Integer(count as i64))
}

pub fn keys(ctx: &mut Context, argv: &[Vec<u8>]) -> Result<Reply, CommandError> {
    Ok(Reply::from_strings(ctx.store.keys_matching(&argv[1])))
}

/// A minimal non-resumable SCAN: cursor is always "0" (full scan each call),
/// acceptable for a single-node in-memory server with no rehash concerns.
pub fn scan(ctx: &mut Context, argv: &[Vec<u8>]) -> Result<Reply, CommandError> {
    let mut pattern: Vec<u8> = b"*".to_vec();
    let mut i = 2;
    while i < argv.len() {
        match super::util::uppercase(&argv[i]).as_str() {
            "MATCH" if i + 1 < argv.len() => {
                pattern = argv[i + 1].clone();
                i += 2;
            }
            "COUNT" if i + 1 < argv.len() => {
                i += 2;
            }
            _ => return Err(CommandError::syntax()),
        }
    }
    let matched = ctx.store.keys_matching(&pattern);
    Ok(Reply::Array(vec![Reply::bulk(*b"0"), Reply::from_strings(matched)]))
}

pub fn type_cmd(ctx: &mut Context, argv: &[Vec<u8>]) -> Result<Reply, CommandError> {
    match ctx.store.kind_of(&argv[1]) {
        Some(kind) => Ok(Reply::simple(kind.type_name())),
        None => Ok(Reply::simple("none")),
    }
}

pub fn ttl(ctx: &mut Context, argv: &[Vec<u8>]) -> Result<Reply, CommandError> {
    match ctx.store.get(&argv[1]) {
        Some(v) => Ok(Reply::Integer(v.ttl_seconds())),
        None => Ok(Reply::Integer(-2)),
    }
}

pub fn expire(ctx: &mut Context, argv: &[Vec<u8>]) -> Result<Reply, CommandError> {
    let seconds = super::util::parse_i64(&argv[2])?;
    match ctx.store.get_mut(&argv[1]) {
        Some(mut v) => {
            v.set_expiration(seconds);
            Ok(Reply::Integer(1))
        }
        None => Ok(Reply::Integer(0)),
    }
}

pub fn persist(ctx: &mut Context, argv: &[Vec<u8>]) -> Result<Reply, CommandError> {
    match ctx.store.get_mut(&argv[1]) {
        Some(mut v) => Ok(Reply::Integer(v.remove_expiration() as i64)),
        None => Ok(Reply::Integer(0)),
    }
}

pub fn rename(ctx: &mut Context, argv: &[Vec<u8>]) -> Result<Reply, CommandError> {
    if ctx.store.rename(&argv[1], &argv[2]) {
        Ok(Reply::Ok)
    } else {
        Err(CommandError::new("ERR no such key"))
    }
}

pub fn dbsize(ctx: &mut Context, _argv: &[Vec<u8>]) -> Result<Reply, CommandError> {
    Ok(Reply::Integer(ctx.store.len() as i64))
}

pub fn flushdb(ctx: &mut Context, _argv: &[Vec<u8>]) -> Result<Reply, CommandError> {
    ctx.store.clear();
    Ok(Reply::Ok)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;
    use crate::server_info::ServerInfo;
    use crate::session::Session;
    use crate::store::Store;
    use crate::value::{Payload, Value};

    fn context<'a>(store: &'a Store, session: &'a mut Session, config: &'a ServerConfig, info: &'a ServerInfo) -> Context<'a> {
        Context { store, session, config, info }
    }

    #[test]
    fn del_counts_only_existing_keys() {
        let store = Store::new();
        store.add_or_replace(b"a".to_vec(), Value::new(Payload::String(vec![])));
        let mut session = Session::new(false);
        let config = ServerConfig::default();
        let info = ServerInfo::new(&config);
        let mut ctx = context(&store, &mut session, &config, &info);
        let argv = vec![b"DEL".to_vec(), b"a".to_vec(), b"missing".to_vec()];
        assert_eq!(del(&mut ctx, &argv).unwrap(), Reply::Integer(1));
    }

    #[test]
    fn ttl_reports_minus_two_for_missing_key() {
        let store = Store::new();
        let mut session = Session::new(false);
        let config = ServerConfig::default();
        let info = ServerInfo::new(&config);
        let mut ctx = context(&store, &mut session, &config, &info);
        let argv = vec![b"TTL".to_vec(), b"nope".to_vec()];
        assert_eq!(ttl(&mut ctx, &argv).unwrap(), Reply::Integer(-2));
    }

    #[test]
    fn type_cmd_reports_none_for_missing_key() {
        let store = Store::new();
        let mut session = Session::new(false);
        let config = ServerConfig::default();
        let info = ServerInfo::new(&config);
        let mut ctx = context(&store, &mut session, &config, &info);
        let argv = vec![b"TYPE".to_vec(), b"nope".to_vec()];
        assert_eq!(type_cmd(&mut ctx, &argv).unwrap(), Reply::simple("none"));
    }
}
