//! Stream commands (spec §4.5 "Streams", supplement to the distilled spec).

use std::time::{SystemTime, UNIX_EPOCH};

use crate::dispatch::Context;
use crate::error::CommandError;
use crate::resp::Reply;
use crate::value::{Kind, Payload, StreamId, Value};

fn now_ms() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_millis() as u64).unwrap_or(0)
}

pub fn xadd(ctx: &mut Context, argv: &[Vec<u8>]) -> Result<Reply, CommandError> {
    if (argv.len() - 3) % 2 != 0 {
        return Err(CommandError::wrong_args("xadd"));
    }
    let fields: Vec<(Vec<u8>, Vec<u8>)> = argv[3..].chunks(2).map(|c| (c[0].clone(), c[1].clone())).collect();

    // Parse the explicit id, if any, before creating (and possibly leaving
    // behind) the stream entry: a malformed id must never materialize a key
    // that didn't exist before this command.
    let explicit_id = if argv[2] == b"*" {
        None
    } else {
        Some(StreamId::parse(&argv[2]).ok_or_else(CommandError::syntax)?)
    };

    let mut entry = ctx
        .store
        .get_or_create_mut(&argv[1], Kind::Stream, || Value::new(Payload::Stream(Default::default())))
        .map_err(|_| CommandError::wrong_type())?;
    let stream = match &mut entry.payload {
        Payload::Stream(s) => s,
        _ => unreachable!(),
    };

    let result = match explicit_id {
        None => Ok(stream.next_auto_id(now_ms())),
        Some(parsed) => stream.try_append_explicit(parsed, fields.clone()).map(|_| parsed),
    };

    let id = match result {
        Ok(id) => id,
        Err(_) => {
            drop(entry);
            ctx.store.remove_if_empty(&argv[1]);
            return Err(CommandError::new(
                "ERR The ID specified in XADD is equal or smaller than the target stream top item",
            ));
        }
    };
    if explicit_id.is_none() {
        stream.push(id, fields);
    }
    Ok(Reply::bulk(id.to_string().into_bytes()))
}

pub fn xrange(ctx: &mut Context, argv: &[Vec<u8>]) -> Result<Reply, CommandError> {
    let start = parse_range_id(&argv[2])?;
    let end = parse_range_id(&argv[3])?;
    let mut count = None;
    if argv.len() > 5 && super::util::uppercase(&argv[4]) == "COUNT" {
        count = Some(super::util::parse_i64(&argv[5])?.max(0) as usize);
    }
    match ctx.store.get(&argv[1]) {
        Some(v) => match &v.payload {
            Payload::Stream(s) => {
                let entries = s.range(start, end, count);
                Ok(Reply::Array(
                    entries
                        .into_iter()
                        .map(|e| {
                            let fields = e.fields.iter().flat_map(|(k, v)| [Reply::bulk(k.clone()), Reply::bulk(v.clone())]).collect();
                            Reply::Array(vec![Reply::bulk(e.id.to_string().into_bytes()), Reply::Array(fields)])
                        })
                        .collect(),
                ))
            }
            _ => Err(CommandError::wrong_type()),
        },
        None => Ok(Reply::Array(Vec::new())),
    }
}

fn parse_range_id(bytes: &[u8]) -> Result<StreamId, CommandError> {
    match bytes {
        b"-" => Ok(StreamId::MIN),
        b"+" => Ok(StreamId::MAX),
        _ => StreamId::parse(bytes).ok_or_else(CommandError::syntax),
    }
}

pub fn xlen(ctx: &mut Context, argv: &[Vec<u8>]) -> Result<Reply, CommandError> {
    match ctx.store.get(&argv[1]) {
        Some(v) => match &v.payload {
            Payload::Stream(s) => Ok(Reply::Integer(s.len() as i64)),
            _ => Err(CommandError::wrong_type()),
        },
        None => Ok(Reply::Integer(0)),
    }
}

pub fn xdel(ctx: &mut Context, argv: &[Vec<u8>]) -> Result<Reply, CommandError> {
    let removed = match ctx.store.get_mut(&argv[1]) {
        Some(mut entry) => match &mut entry.payload {
            Payload::Stream(s) => argv[2..]
                .iter()
                .filter_map(|b| StreamId::parse(b))
                .filter(|id| s.delete(*id))
                .count(),
            _ => return Err(CommandError::wrong_type()),
        },
        None => 0,
    };
    ctx.store.remove_if_empty(&argv[1]);
    Ok(Reply::Integer(removed as i64))
}

pub fn xinfo(ctx: &mut Context, argv: &[Vec<u8>]) -> Result<Reply, CommandError> {
    if super::util::uppercase(&argv[1]) != "STREAM" {
        return Err(CommandError::syntax());
    }
    match ctx.store.get(&argv[2]) {
        Some(v) => match &v.payload {
            Payload::Stream(s) => Ok(Reply::Map(vec![
                (Reply::bulk(*b"length"), Reply::Integer(s.len() as i64)),
                (Reply::bulk(*b"last-generated-id"), Reply::bulk(s.last_id().to_string().into_bytes())),
            ])),
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
    fn xadd_auto_id_then_xlen() {
        let store = Store::new();
        let mut session = Session::new(false);
        let config = ServerConfig::default();
        let info = ServerInfo::new(&config);
        let mut ctx = context(&store, &mut session, &config, &info);
        xadd(&mut ctx, &[b"XADD".to_vec(), b"s".to_vec(), b"*".to_vec(), b"f".to_vec(), b"v".to_vec()]).unwrap();
        assert_eq!(xlen(&mut ctx, &[b"XLEN".to_vec(), b"s".to_vec()]).unwrap(), Reply::Integer(1));
    }

    #[test]
    fn xadd_rejects_id_not_greater_than_last() {
        let store = Store::new();
        let mut session = Session::new(false);
        let config = ServerConfig::default();
        let info = ServerInfo::new(&config);
        let mut ctx = context(&store, &mut session, &config, &info);
        xadd(&mut ctx, &[b"XADD".to_vec(), b"s".to_vec(), b"5-0".to_vec(), b"f".to_vec(), b"v".to_vec()]).unwrap();
        assert!(xadd(&mut ctx, &[b"XADD".to_vec(), b"s".to_vec(), b"5-0".to_vec(), b"f".to_vec(), b"v".to_vec()]).is_err());
    }
}
