//! Sorted set commands (spec §4.5 "Sorted sets").

use crate::dispatch::Context;
use crate::error::CommandError;
use crate::resp::Reply;
use crate::value::{Kind, Payload, Value, ZSet};

pub fn zadd(ctx: &mut Context, argv: &[Vec<u8>]) -> Result<Reply, CommandError> {
    if (argv.len() - 2) % 2 != 0 {
        return Err(CommandError::wrong_args("zadd"));
    }
    // Validate every score before mutating anything: Redis applies ZADD
    // all-or-nothing, never a partial set of the pairs.
    let pairs: Vec<(f64, &Vec<u8>)> = argv[2..]
        .chunks(2)
        .map(|pair| super::util::parse_f64(&pair[0]).map(|score| (score, &pair[1])))
        .collect::<Result<Vec<_>, _>>()?;

    let mut entry = ctx
        .store
        .get_or_create_mut(&argv[1], Kind::SortedSet, || Value::new(Payload::SortedSet(ZSet::new())))
        .map_err(|_| CommandError::wrong_type())?;
    let zset = match &mut entry.payload {
        Payload::SortedSet(z) => z,
        _ => unreachable!(),
    };
    let mut added = 0;
    for (score, member) in pairs {
        if zset.insert(member.clone(), score) {
            added += 1;
        }
    }
    Ok(Reply::Integer(added))
}

pub fn zrem(ctx: &mut Context, argv: &[Vec<u8>]) -> Result<Reply, CommandError> {
    let removed = match ctx.store.get_mut(&argv[1]) {
        Some(mut entry) => match &mut entry.payload {
            Payload::SortedSet(z) => argv[2..].iter().filter(|m| z.remove(m)).count(),
            _ => return Err(CommandError::wrong_type()),
        },
        None => 0,
    };
    ctx.store.remove_if_empty(&argv[1]);
    Ok(Reply::Integer(removed as i64))
}

pub fn zscore(ctx: &mut Context, argv: &[Vec<u8>]) -> Result<Reply, CommandError> {
    match ctx.store.get(&argv[1]) {
        Some(v) => match &v.payload {
            Payload::SortedSet(z) => Ok(z.score(&argv[2]).map(|s| Reply::Double(s)).unwrap_or(Reply::Nil)),
            _ => Err(CommandError::wrong_type()),
        },
        None => Ok(Reply::Nil),
    }
}

pub fn zcard(ctx: &mut Context, argv: &[Vec<u8>]) -> Result<Reply, CommandError> {
    match ctx.store.get(&argv[1]) {
        Some(v) => match &v.payload {
            Payload::SortedSet(z) => Ok(Reply::Integer(z.len() as i64)),
            _ => Err(CommandError::wrong_type()),
        },
        None => Ok(Reply::Integer(0)),
    }
}

fn render_pairs(pairs: Vec<(Vec<u8>, f64)>, with_scores: bool) -> Reply {
    if with_scores {
        Reply::Array(
            pairs
                .into_iter()
                .flat_map(|(m, s)| [Reply::bulk(m), Reply::Double(s)])
                .collect(),
        )
    } else {
        Reply::from_strings(pairs.into_iter().map(|(m, _)| m))
    }
}

pub fn zrange(ctx: &mut Context, argv: &[Vec<u8>]) -> Result<Reply, CommandError> {
    let start = super::util::parse_i64(&argv[2])?;
    let stop = super::util::parse_i64(&argv[3])?;
    let with_scores = argv.len() > 4 && super::util::uppercase(&argv[4]) == "WITHSCORES";
    if argv.len() > 4 && !with_scores {
        return Err(CommandError::syntax());
    }
    match ctx.store.get(&argv[1]) {
        Some(v) => match &v.payload {
            Payload::SortedSet(z) => Ok(render_pairs(z.range_by_rank(start, stop), with_scores)),
            _ => Err(CommandError::wrong_type()),
        },
        None => Ok(Reply::Array(Vec::new())),
    }
}

pub fn zincrby(ctx: &mut Context, argv: &[Vec<u8>]) -> Result<Reply, CommandError> {
    let delta = super::util::parse_f64(&argv[2])?;
    let mut entry = ctx
        .store
        .get_or_create_mut(&argv[1], Kind::SortedSet, || Value::new(Payload::SortedSet(ZSet::new())))
        .map_err(|_| CommandError::wrong_type())?;
    let zset = match &mut entry.payload {
        Payload::SortedSet(z) => z,
        _ => unreachable!(),
    };
    let next = zset.score(&argv[3]).unwrap_or(0.0) + delta;
    zset.insert(argv[3].clone(), next);
    Ok(Reply::Double(next))
}

pub fn zrangebyscore(ctx: &mut Context, argv: &[Vec<u8>]) -> Result<Reply, CommandError> {
    let min = super::util::parse_f64(&argv[2])?;
    let max = super::util::parse_f64(&argv[3])?;
    let with_scores = argv.len() > 4 && super::util::uppercase(&argv[4]) == "WITHSCORES";
    if argv.len() > 4 && !with_scores {
        return Err(CommandError::syntax());
    }
    match ctx.store.get(&argv[1]) {
        Some(v) => match &v.payload {
            Payload::SortedSet(z) => Ok(render_pairs(z.range_by_score(min, max), with_scores)),
            _ => Err(CommandError::wrong_type()),
        },
        None => Ok(Reply::Array(Vec::new())),
    }
}

pub fn zrank(ctx: &mut Context, argv: &[Vec<u8>]) -> Result<Reply, CommandError> {
    match ctx.store.get(&argv[1]) {
        Some(v) => match &v.payload {
            Payload::SortedSet(z) => Ok(z.rank(&argv[2]).map(|r| Reply::Integer(r as i64)).unwrap_or(Reply::Nil)),
            _ => Err(CommandError::wrong_type()),
        },
        None => Ok(Reply::Nil),
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
    fn zadd_then_zrange_is_score_ordered() {
        let store = Store::new();
        let mut session = Session::new(false);
        let config = ServerConfig::default();
        let info = ServerInfo::new(&config);
        let mut ctx = context(&store, &mut session, &config, &info);
        zadd(&mut ctx, &[b"ZADD".to_vec(), b"z".to_vec(), b"2".to_vec(), b"b".to_vec(), b"1".to_vec(), b"a".to_vec()]).unwrap();
        let r = zrange(&mut ctx, &[b"ZRANGE".to_vec(), b"z".to_vec(), b"0".to_vec(), b"-1".to_vec()]).unwrap();
        assert_eq!(r, Reply::Array(vec![Reply::bulk(*b"a"), Reply::bulk(*b"b")]));
    }

    #[test]
    fn zincrby_creates_member_at_delta() {
        let store = Store::new();
        let mut session = Session::new(false);
        let config = ServerConfig::default();
        let info = ServerInfo::new(&config);
        let mut ctx = context(&store, &mut session, &config, &info);
        let r = zincrby(&mut ctx, &[b"ZINCRBY".to_vec(), b"z".to_vec(), b"5".to_vec(), b"m".to_vec()]).unwrap();
        assert_eq!(r, Reply::Double(5.0));
    }
}
