//! JSON.* commands (spec §4.5 "Json", supplement to the distilled spec): a
//! reduced ReJSON-like surface storing a `serde_json::Value` per key, with a
//! simple dotted-path addressing scheme (no full JSONPath).

use serde_json::Value as Json;

use crate::dispatch::Context;
use crate::error::CommandError;
use crate::resp::Reply;
use crate::value::{Kind, Payload, Value};

fn path_segments(path: &[u8]) -> Vec<String> {
    let s = String::from_utf8_lossy(path);
    let s = s.trim_start_matches('$').trim_start_matches('.');
    if s.is_empty() {
        Vec::new()
    } else {
        s.split('.').map(|p| p.to_string()).collect()
    }
}

fn navigate<'a>(root: &'a Json, segments: &[String]) -> Option<&'a Json> {
    let mut current = root;
    for seg in segments {
        current = current.as_object()?.get(seg)?;
    }
    Some(current)
}

fn navigate_mut<'a>(root: &'a mut Json, segments: &[String]) -> Option<&'a mut Json> {
    let mut current = root;
    for seg in segments {
        if !current.is_object() {
            *current = Json::Object(Default::default());
        }
        current = current.as_object_mut()?.entry(seg.clone()).or_insert(Json::Null);
    }
    Some(current)
}

/// Same walk as `navigate`, but yielding `&mut Json` for callers that need to
/// mutate the node in place once found. Unlike `navigate_mut`, a missing or
/// non-object segment along the way is a lookup failure (`None`), never an
/// auto-vivified empty object — for callers like `json_del` that must not
/// create structure while merely looking for something to remove.
fn navigate_mut_existing<'a>(root: &'a mut Json, segments: &[String]) -> Option<&'a mut Json> {
    let mut current = root;
    for seg in segments {
        current = current.as_object_mut()?.get_mut(seg)?;
    }
    Some(current)
}

pub fn json_set(ctx: &mut Context, argv: &[Vec<u8>]) -> Result<Reply, CommandError> {
    let new_value: Json = serde_json::from_slice(&argv[3]).map_err(|_| CommandError::new("ERR invalid JSON"))?;
    let segments = path_segments(&argv[2]);

    let mut entry = ctx
        .store
        .get_or_create_mut(&argv[1], Kind::Json, || Value::new(Payload::Json(Json::Null)))
        .map_err(|_| CommandError::wrong_type())?;
    match &mut entry.payload {
        Payload::Json(root) => {
            if segments.is_empty() {
                *root = new_value;
            } else {
                match navigate_mut(root, &segments) {
                    Some(slot) => *slot = new_value,
                    None => return Err(CommandError::new("ERR path does not exist")),
                }
            }
            Ok(Reply::Ok)
        }
        _ => unreachable!(),
    }
}

pub fn json_get(ctx: &mut Context, argv: &[Vec<u8>]) -> Result<Reply, CommandError> {
    let segments = if argv.len() > 2 { path_segments(&argv[2]) } else { Vec::new() };
    match ctx.store.get(&argv[1]) {
        Some(v) => match &v.payload {
            Payload::Json(root) => match navigate(root, &segments) {
                Some(found) => Ok(Reply::bulk(serde_json::to_vec(found).expect("json serializes"))),
                None => Ok(Reply::Nil),
            },
            _ => Err(CommandError::wrong_type()),
        },
        None => Ok(Reply::Nil),
    }
}

pub fn json_del(ctx: &mut Context, argv: &[Vec<u8>]) -> Result<Reply, CommandError> {
    let segments = if argv.len() > 2 { path_segments(&argv[2]) } else { Vec::new() };
    if segments.is_empty() {
        return Ok(Reply::Integer(ctx.store.remove(&argv[1]) as i64));
    }
    let removed = match ctx.store.get_mut(&argv[1]) {
        Some(mut entry) => match &mut entry.payload {
            Payload::Json(root) => {
                let (parent_path, leaf) = segments.split_at(segments.len() - 1);
                match navigate_mut_existing(root, parent_path).and_then(|p| p.as_object_mut()) {
                    Some(obj) => obj.remove(&leaf[0]).is_some(),
                    None => false,
                }
            }
            _ => return Err(CommandError::wrong_type()),
        },
        None => false,
    };
    Ok(Reply::Integer(removed as i64))
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
    fn set_root_then_get_round_trips() {
        let store = Store::new();
        let mut session = Session::new(false);
        let config = ServerConfig::default();
        let info = ServerInfo::new(&config);
        let mut ctx = context(&store, &mut session, &config, &info);
        json_set(&mut ctx, &[b"JSON.SET".to_vec(), b"k".to_vec(), b"$".to_vec(), br#"{"a":1}"#.to_vec()]).unwrap();
        let r = json_get(&mut ctx, &[b"JSON.GET".to_vec(), b"k".to_vec()]).unwrap();
        assert_eq!(r, Reply::bulk(br#"{"a":1}"#.to_vec()));
    }

    #[test]
    fn get_on_nested_path() {
        let store = Store::new();
        let mut session = Session::new(false);
        let config = ServerConfig::default();
        let info = ServerInfo::new(&config);
        let mut ctx = context(&store, &mut session, &config, &info);
        json_set(&mut ctx, &[b"JSON.SET".to_vec(), b"k".to_vec(), b"$".to_vec(), br#"{"a":{"b":2}}"#.to_vec()]).unwrap();
        let r = json_get(&mut ctx, &[b"JSON.GET".to_vec(), b"k".to_vec(), b"$.a.b".to_vec()]).unwrap();
        assert_eq!(r, Reply::bulk(b"2".to_vec()));
    }
}
