//! Set commands (spec §4.5 "Sets").

use rand::seq::SliceRandom;

use crate::dispatch::Context;
use crate::error::CommandError;
use crate::resp::Reply;
use crate::value::{Kind, Payload, Value};

pub fn sadd(ctx: &mut Context, argv: &[Vec<u8>]) -> Result<Reply, CommandError> {
    let mut entry = ctx
        .store
        .get_or_create_mut(&argv[1], Kind::Set, || Value::new(Payload::Set(Default::default())))
        .map_err(|_| CommandError::wrong_type())?;
    match &mut entry.payload {
        Payload::Set(set) => {
            let added = argv[2..].iter().filter(|m| set.insert((*m).clone())).count();
            Ok(Reply::Integer(added as i64))
        }
        _ => unreachable!(),
    }
}

pub fn srem(ctx: &mut Context, argv: &[Vec<u8>]) -> Result<Reply, CommandError> {
    let removed = match ctx.store.get_mut(&argv[1]) {
        Some(mut entry) => match &mut entry.payload {
            Payload::Set(set) => argv[2..].iter().filter(|m| set.remove(m.as_slice())).count(),
            _ => return Err(CommandError::wrong_type()),
        },
        None => 0,
    };
    ctx.store.remove_if_empty(&argv[1]);
    Ok(Reply::Integer(removed as i64))
}

pub fn smembers(ctx: &mut Context, argv: &[Vec<u8>]) -> Result<Reply, CommandError> {
    match ctx.store.get(&argv[1]) {
        Some(v) => match &v.payload {
            Payload::Set(set) => Ok(Reply::Set(set.iter().cloned().map(Reply::bulk).collect())),
            _ => Err(CommandError::wrong_type()),
        },
        None => Ok(Reply::Set(Vec::new())),
    }
}

pub fn sismember(ctx: &mut Context, argv: &[Vec<u8>]) -> Result<Reply, CommandError> {
    match ctx.store.get(&argv[1]) {
        Some(v) => match &v.payload {
            Payload::Set(set) => Ok(Reply::Boolean(set.contains(&argv[2]))),
            _ => Err(CommandError::wrong_type()),
        },
        None => Ok(Reply::Boolean(false)),
    }
}

pub fn scard(ctx: &mut Context, argv: &[Vec<u8>]) -> Result<Reply, CommandError> {
    match ctx.store.get(&argv[1]) {
        Some(v) => match &v.payload {
            Payload::Set(set) => Ok(Reply::Integer(set.len() as i64)),
            _ => Err(CommandError::wrong_type()),
        },
        None => Ok(Reply::Integer(0)),
    }
}

pub fn spop(ctx: &mut Context, argv: &[Vec<u8>]) -> Result<Reply, CommandError> {
    let count = if argv.len() > 2 { Some(super::util::parse_i64(&argv[2])?.max(0) as usize) } else { None };
    let popped = match ctx.store.get_mut(&argv[1]) {
        Some(mut entry) => match &mut entry.payload {
            Payload::Set(set) => {
                let n = count.unwrap_or(1).min(set.len());
                let mut rng = rand::thread_rng();
                let chosen: Vec<Vec<u8>> = set.iter().cloned().collect::<Vec<_>>().choose_multiple(&mut rng, n).cloned().collect();
                for m in &chosen {
                    set.remove(m);
                }
                chosen
            }
            _ => return Err(CommandError::wrong_type()),
        },
        None => Vec::new(),
    };
    ctx.store.remove_if_empty(&argv[1]);

    if count.is_some() {
        Ok(Reply::Set(popped.into_iter().map(Reply::bulk).collect()))
    } else {
        match popped.into_iter().next() {
            Some(m) => Ok(Reply::bulk(m)),
            None => Ok(Reply::Nil),
        }
    }
}

pub fn srandmember(ctx: &mut Context, argv: &[Vec<u8>]) -> Result<Reply, CommandError> {
    let count = if argv.len() > 2 { Some(super::util::parse_i64(&argv[2])?) } else { None };
    let members: Vec<Vec<u8>> = match ctx.store.get(&argv[1]) {
        Some(v) => match &v.payload {
            Payload::Set(set) => set.iter().cloned().collect(),
            _ => return Err(CommandError::wrong_type()),
        },
        None => Vec::new(),
    };
    let mut rng = rand::thread_rng();
    match count {
        None => match members.choose(&mut rng) {
            Some(m) => Ok(Reply::bulk(m.clone())),
            None => Ok(Reply::Nil),
        },
        Some(n) if n >= 0 => {
            let n = (n as usize).min(members.len());
            Ok(Reply::from_strings(members.choose_multiple(&mut rng, n).cloned()))
        }
        Some(n) => {
            // Negative count: length -n, duplicates allowed.
            let n = (-n) as usize;
            if members.is_empty() {
                return Ok(Reply::Array(Vec::new()));
            }
            let picked: Vec<Vec<u8>> = (0..n).map(|_| members.choose(&mut rng).unwrap().clone()).collect();
            Ok(Reply::from_strings(picked))
        }
    }
}

pub fn sunion(ctx: &mut Context, argv: &[Vec<u8>]) -> Result<Reply, CommandError> {
    let mut out: std::collections::HashSet<Vec<u8>> = Default::default();
    for key in &argv[1..] {
        if let Some(v) = ctx.store.get(key) {
            match &v.payload {
                Payload::Set(set) => out.extend(set.iter().cloned()),
                _ => return Err(CommandError::wrong_type()),
            }
        }
    }
    Ok(Reply::Set(out.into_iter().map(Reply::bulk).collect()))
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
    fn sadd_reports_only_newly_added() {
        let store = Store::new();
        let mut session = Session::new(false);
        let config = ServerConfig::default();
        let info = ServerInfo::new(&config);
        let mut ctx = context(&store, &mut session, &config, &info);
        sadd(&mut ctx, &[b"SADD".to_vec(), b"s".to_vec(), b"a".to_vec()]).unwrap();
        let r = sadd(&mut ctx, &[b"SADD".to_vec(), b"s".to_vec(), b"a".to_vec(), b"b".to_vec()]).unwrap();
        assert_eq!(r, Reply::Integer(1));
    }

    #[test]
    fn sunion_merges_across_keys() {
        let store = Store::new();
        let mut session = Session::new(false);
        let config = ServerConfig::default();
        let info = ServerInfo::new(&config);
        let mut ctx = context(&store, &mut session, &config, &info);
        sadd(&mut ctx, &[b"SADD".to_vec(), b"a".to_vec(), b"x".to_vec()]).unwrap();
        sadd(&mut ctx, &[b"SADD".to_vec(), b"b".to_vec(), b"y".to_vec()]).unwrap();
        let r = sunion(&mut ctx, &[b"SUNION".to_vec(), b"a".to_vec(), b"b".to_vec()]).unwrap();
        match r {
            Reply::Set(items) => assert_eq!(items.len(), 2),
            _ => panic!("expected set"),
        }
    }
}
