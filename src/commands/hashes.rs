//! Hash commands (spec §4.5 "Hashes", supplement to the distilled spec).

use crate::dispatch::Context;
use crate::error::CommandError;
use crate::resp::Reply;
use crate::value::{Kind, Payload, Value};

pub fn hset(ctx: &mut Context, argv: &[Vec<u8>]) -> Result<Reply, CommandError> {
    if (argv.len() - 2) % 2 != 0 {
        return Err(CommandError::wrong_args("hset"));
    }
    let mut entry = ctx
        .store
        .get_or_create_mut(&argv[1], Kind::Hash, || Value::new(Payload::Hash(Default::default())))
        .map_err(|_| CommandError::wrong_type())?;
    let map = match &mut entry.payload {
        Payload::Hash(m) => m,
        _ => unreachable!(),
    };
    let mut added = 0;
    for pair in argv[2..].chunks(2) {
        if map.insert(pair[0].clone(), pair[1].clone()).is_none() {
            added += 1;
        }
    }
    Ok(Reply::Integer(added))
}

/// HMSET is HSET's legacy alias, differing only in reply shape (`+OK`
/// instead of the added-field count).
pub fn hmset(ctx: &mut Context, argv: &[Vec<u8>]) -> Result<Reply, CommandError> {
    hset(ctx, argv)?;
    Ok(Reply::Ok)
}

pub fn hget(ctx: &mut Context, argv: &[Vec<u8>]) -> Result<Reply, CommandError> {
    match ctx.store.get(&argv[1]) {
        Some(v) => match &v.payload {
            Payload::Hash(m) => Ok(m.get(&argv[2]).cloned().map(Reply::bulk).unwrap_or(Reply::Nil)),
            _ => Err(CommandError::wrong_type()),
        },
        None => Ok(Reply::Nil),
    }
}

pub fn hgetall(ctx: &mut Context, argv: &[Vec<u8>]) -> Result<Reply, CommandError> {
    match ctx.store.get(&argv[1]) {
        Some(v) => match &v.payload {
            Payload::Hash(m) => {
                let pairs = m.iter().map(|(k, v)| (Reply::bulk(k.clone()), Reply::bulk(v.clone()))).collect();
                Ok(Reply::Map(pairs))
            }
            _ => Err(CommandError::wrong_type()),
        },
        None => Ok(Reply::Map(Vec::new())),
    }
}

pub fn hdel(ctx: &mut Context, argv: &[Vec<u8>]) -> Result<Reply, CommandError> {
    let removed = match ctx.store.get_mut(&argv[1]) {
        Some(mut entry) => match &mut entry.payload {
            Payload::Hash(m) => argv[2..].iter().filter(|f| m.remove(f.as_slice()).is_some()).count(),
            _ => return Err(CommandError::wrong_type()),
        },
        None => 0,
    };
    ctx.store.remove_if_empty(&argv[1]);
    Ok(Reply::Integer(removed as i64))
}

pub fn hlen(ctx: &mut Context, argv: &[Vec<u8>]) -> Result<Reply, CommandError> {
    match ctx.store.get(&argv[1]) {
        Some(v) => match &v.payload {
            Payload::Hash(m) => Ok(Reply::Integer(m.len() as i64)),
            _ => Err(CommandError::wrong_type()),
        },
        None => Ok(Reply::Integer(0)),
    }
}

pub fn hexists(ctx: &mut Context, argv: &[Vec<u8>]) -> Result<Reply, CommandError> {
    match ctx.store.get(&argv[1]) {
        Some(v) => match &v.payload {
            Payload::Hash(m) => Ok(Reply::Boolean(m.contains_key(&argv[2]))),
            _ => Err(CommandError::wrong_type()),
        },
        None => Ok(Reply::Boolean(false)),
    }
}

pub fn hscan(ctx: &mut Context, argv: &[Vec<u8>]) -> Result<Reply, CommandError> {
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
    let items = match ctx.store.get(&argv[1]) {
        Some(v) => match &v.payload {
            Payload::Hash(m) => m
                .iter()
                .filter(|(k, _)| crate::glob::matches(&pattern, k))
                .flat_map(|(k, v)| [Reply::bulk(k.clone()), Reply::bulk(v.clone())])
                .collect(),
            _ => return Err(CommandError::wrong_type()),
        },
        None => Vec::new(),
    };
    Ok(Reply::Array(vec![Reply::bulk(*b"0"), Reply::Array(items)]))
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
    fn hset_then_hget_round_trips() {
        let store = Store::new();
        let mut session = Session::new(false);
        let config = ServerConfig::default();
        let info = ServerInfo::new(&config);
        let mut ctx = context(&store, &mut session, &config, &info);
        hset(&mut ctx, &[b"HSET".to_vec(), b"h".to_vec(), b"f".to_vec(), b"v".to_vec()]).unwrap();
        assert_eq!(
            hget(&mut ctx, &[b"HGET".to_vec(), b"h".to_vec(), b"f".to_vec()]).unwrap(),
            Reply::bulk(*b"v")
        );
    }

    #[test]
    fn hdel_removes_key_when_last_field_gone() {
        let store = Store::new();
        let mut session = Session::new(false);
        let config = ServerConfig::default();
        let info = ServerInfo::new(&config);
        let mut ctx = context(&store, &mut session, &config, &info);
        hset(&mut ctx, &[b"HSET".to_vec(), b"h".to_vec(), b"f".to_vec(), b"v".to_vec()]).unwrap();
        hdel(&mut ctx, &[b"HDEL".to_vec(), b"h".to_vec(), b"f".to_vec()]).unwrap();
        assert!(!ctx.store.exists(b"h"));
    }
}
