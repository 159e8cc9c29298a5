//! List commands (spec §4.5 "Lists").

use crate::dispatch::Context;
use crate::error::CommandError;
use crate::resp::Reply;
use crate::value::{Kind, Payload, Value};

pub fn rpush(ctx: &mut Context, argv: &[Vec<u8>]) -> Result<Reply, CommandError> {
    let mut entry = ctx
        .store
        .get_or_create_mut(&argv[1], Kind::List, || Value::new(Payload::List(Default::default())))
        .map_err(|_| CommandError::wrong_type())?;
    match &mut entry.payload {
        Payload::List(list) => {
            for v in &argv[2..] {
                list.push_back(v.clone());
            }
            Ok(Reply::Integer(list.len() as i64))
        }
        _ => unreachable!(),
    }
}

pub fn lpush(ctx: &mut Context, argv: &[Vec<u8>]) -> Result<Reply, CommandError> {
    let mut entry = ctx
        .store
        .get_or_create_mut(&argv[1], Kind::List, || Value::new(Payload::List(Default::default())))
        .map_err(|_| CommandError::wrong_type())?;
    match &mut entry.payload {
        Payload::List(list) => {
            for v in &argv[2..] {
                list.push_front(v.clone());
            }
            Ok(Reply::Integer(list.len() as i64))
        }
        _ => unreachable!(),
    }
}

fn pop(ctx: &mut Context, argv: &[Vec<u8>], front: bool) -> Result<Reply, CommandError> {
    let count = if argv.len() > 2 { Some(super::util::parse_i64(&argv[2])?.max(0) as usize) } else { None };
    let popped = match ctx.store.get_mut(&argv[1]) {
        Some(mut entry) => match &mut entry.payload {
            Payload::List(list) => {
                let n = count.unwrap_or(1).min(list.len());
                let mut out = Vec::with_capacity(n);
                for _ in 0..n {
                    let item = if front { list.pop_front() } else { list.pop_back() };
                    match item {
                        Some(v) => out.push(v),
                        None => break,
                    }
                }
                out
            }
            _ => return Err(CommandError::wrong_type()),
        },
        None => Vec::new(),
    };
    ctx.store.remove_if_empty(&argv[1]);

    if count.is_some() {
        if popped.is_empty() {
            Ok(Reply::Nil)
        } else {
            Ok(Reply::from_strings(popped))
        }
    } else {
        match popped.into_iter().next() {
            Some(v) => Ok(Reply::bulk(v)),
            None => Ok(Reply::Nil),
        }
    }
}

pub fn rpop(ctx: &mut Context, argv: &[Vec<u8>]) -> Result<Reply, CommandError> {
    pop(ctx, argv, false)
}

pub fn lpop(ctx: &mut Context, argv: &[Vec<u8>]) -> Result<Reply, CommandError> {
    pop(ctx, argv, true)
}

pub fn lrange(ctx: &mut Context, argv: &[Vec<u8>]) -> Result<Reply, CommandError> {
    let start = super::util::parse_i64(&argv[2])?;
    let stop = super::util::parse_i64(&argv[3])?;
    match ctx.store.get(&argv[1]) {
        Some(v) => match &v.payload {
            Payload::List(list) => match super::util::clamp_range(start, stop, list.len()) {
                Some((lo, hi)) => Ok(Reply::from_strings(list.iter().skip(lo).take(hi - lo + 1).cloned())),
                None => Ok(Reply::Array(Vec::new())),
            },
            _ => Err(CommandError::wrong_type()),
        },
        None => Ok(Reply::Array(Vec::new())),
    }
}

pub fn llen(ctx: &mut Context, argv: &[Vec<u8>]) -> Result<Reply, CommandError> {
    match ctx.store.get(&argv[1]) {
        Some(v) => match &v.payload {
            Payload::List(list) => Ok(Reply::Integer(list.len() as i64)),
            _ => Err(CommandError::wrong_type()),
        },
        None => Ok(Reply::Integer(0)),
    }
}

fn normalize_index(i: i64, len: usize) -> Option<usize> {
    let len = len as i64;
    let idx = if i < 0 { len + i } else { i };
    if idx < 0 || idx >= len {
        None
    } else {
        Some(idx as usize)
    }
}

pub fn lindex(ctx: &mut Context, argv: &[Vec<u8>]) -> Result<Reply, CommandError> {
    let i = super::util::parse_i64(&argv[2])?;
    match ctx.store.get(&argv[1]) {
        Some(v) => match &v.payload {
            Payload::List(list) => match normalize_index(i, list.len()) {
                Some(idx) => Ok(Reply::bulk(list[idx].clone())),
                None => Ok(Reply::Nil),
            },
            _ => Err(CommandError::wrong_type()),
        },
        None => Ok(Reply::Nil),
    }
}

pub fn lset(ctx: &mut Context, argv: &[Vec<u8>]) -> Result<Reply, CommandError> {
    let i = super::util::parse_i64(&argv[2])?;
    match ctx.store.get_mut(&argv[1]) {
        Some(mut entry) => match &mut entry.payload {
            Payload::List(list) => match normalize_index(i, list.len()) {
                Some(idx) => {
                    list[idx] = argv[3].clone();
                    Ok(Reply::Ok)
                }
                None => Err(CommandError::new("ERR index out of range")),
            },
            _ => Err(CommandError::wrong_type()),
        },
        None => Err(CommandError::new("ERR no such key")),
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
    fn rpush_then_lrange_preserves_order() {
        let store = Store::new();
        let mut session = Session::new(false);
        let config = ServerConfig::default();
        let info = ServerInfo::new(&config);
        let mut ctx = context(&store, &mut session, &config, &info);
        rpush(&mut ctx, &[b"RPUSH".to_vec(), b"l".to_vec(), b"a".to_vec(), b"b".to_vec()]).unwrap();
        assert_eq!(
            lrange(&mut ctx, &[b"LRANGE".to_vec(), b"l".to_vec(), b"0".to_vec(), b"-1".to_vec()]).unwrap(),
            Reply::Array(vec![Reply::bulk(*b"a"), Reply::bulk(*b"b")])
        );
    }

    #[test]
    fn rpop_removes_key_when_list_drained() {
        let store = Store::new();
        let mut session = Session::new(false);
        let config = ServerConfig::default();
        let info = ServerInfo::new(&config);
        let mut ctx = context(&store, &mut session, &config, &info);
        rpush(&mut ctx, &[b"RPUSH".to_vec(), b"l".to_vec(), b"a".to_vec()]).unwrap();
        rpop(&mut ctx, &[b"RPOP".to_vec(), b"l".to_vec()]).unwrap();
        assert!(!ctx.store.exists(b"l"));
    }
}
