//! Introspection and compatibility-stub commands (spec §4.5 "Introspection /
//! stubs"): enough of INFO/CONFIG/CLUSTER/etc. for off-the-shelf clients to
//! complete their handshake without actually running a cluster or pub/sub.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::dispatch::Context;
use crate::error::CommandError;
use crate::resp::Reply;

pub fn info(ctx: &mut Context, _argv: &[Vec<u8>]) -> Result<Reply, CommandError> {
    let text = format!(
        "# Server\r\nredis_mode:standalone\r\nredis_version:{version}\r\nos:{os}\r\narch_bits:{arch_bits}\r\n\
         tcp_port:{port}\r\nuptime_in_seconds:{uptime}\r\nprocess_id:{pid}\r\n\
         # Clients\r\nconnected_clients:1\r\n\
         # Memory\r\nused_memory:0\r\nused_memory_peak:0\r\ntotal_system_memory:0\r\n\
         # Stats\r\ntotal_commands_processed:{cmds}\r\ntotal_connections_received:{conns}\r\n\
         # Replication\r\nrole:master\r\nconnected_slaves:0\r\nmaster_repl_offset:0\r\nrepl_backlog_size:{backlog}\r\n\
         # Keyspace\r\ndb0:keys={keys},expires=0,avg_ttl=0\r\n",
        version = ctx.info.redis_version,
        os = std::env::consts::OS,
        arch_bits = if cfg!(target_pointer_width = "64") { 64 } else { 32 },
        port = ctx.info.tcp_port,
        uptime = ctx.info.uptime_seconds(),
        pid = ctx.info.pid,
        cmds = ctx.info.commands_processed.load(std::sync::atomic::Ordering::Relaxed),
        conns = ctx.info.connections_received.load(std::sync::atomic::Ordering::Relaxed),
        backlog = ctx.info.replication_backlog_size,
        keys = ctx.store.len(),
    );
    Ok(Reply::bulk(text.into_bytes()))
}

pub fn time(_ctx: &mut Context, _argv: &[Vec<u8>]) -> Result<Reply, CommandError> {
    let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default();
    Ok(Reply::Array(vec![
        Reply::bulk(now.as_secs().to_string().into_bytes()),
        Reply::bulk(now.subsec_micros().to_string().into_bytes()),
    ]))
}

pub fn role(_ctx: &mut Context, _argv: &[Vec<u8>]) -> Result<Reply, CommandError> {
    Ok(Reply::Array(vec![Reply::bulk(*b"master"), Reply::Integer(0), Reply::Array(Vec::new())]))
}

pub fn command(_ctx: &mut Context, _argv: &[Vec<u8>]) -> Result<Reply, CommandError> {
    Ok(Reply::Array(Vec::new()))
}

pub fn config(ctx: &mut Context, argv: &[Vec<u8>]) -> Result<Reply, CommandError> {
    match super::util::uppercase(&argv[1]).as_str() {
        "GET" if argv.len() == 3 => {
            let pairs = match super::util::uppercase(&argv[2]).as_str() {
                "MAXMEMORY" => vec![(Reply::bulk(*b"maxmemory"), Reply::bulk(*b"0"))],
                "PORT" => vec![(Reply::bulk(*b"port"), Reply::bulk(ctx.config.port.to_string().into_bytes()))],
                "DATABASES" => vec![(
                    Reply::bulk(*b"databases"),
                    Reply::bulk(ctx.config.database_count.to_string().into_bytes()),
                )],
                "SLAVE-READ-ONLY" => vec![(Reply::bulk(*b"slave-read-only"), Reply::bulk(*b"yes"))],
                _ => Vec::new(),
            };
            Ok(Reply::Map(pairs))
        }
        "SET" if argv.len() == 4 => Ok(Reply::Ok),
        _ => Err(CommandError::syntax()),
    }
}

pub fn memory(_ctx: &mut Context, argv: &[Vec<u8>]) -> Result<Reply, CommandError> {
    match super::util::uppercase(&argv[1]).as_str() {
        "USAGE" => Ok(Reply::Integer(0)),
        "DOCTOR" => Ok(Reply::bulk(*b"Sam, I detected no issues.")),
        _ => Err(CommandError::syntax()),
    }
}

pub fn acl(_ctx: &mut Context, argv: &[Vec<u8>]) -> Result<Reply, CommandError> {
    match super::util::uppercase(&argv[1]).as_str() {
        "WHOAMI" => Ok(Reply::bulk(*b"default")),
        "LIST" => Ok(Reply::Array(vec![Reply::bulk(*b"user default on nopass ~* &* +@all")])),
        "USERS" => Ok(Reply::Array(vec![Reply::bulk(*b"default")])),
        "CAT" => Ok(Reply::Array(Vec::new())),
        _ => Err(CommandError::syntax()),
    }
}

pub fn module(_ctx: &mut Context, argv: &[Vec<u8>]) -> Result<Reply, CommandError> {
    match super::util::uppercase(&argv[1]).as_str() {
        "LIST" => Ok(Reply::Array(Vec::new())),
        _ => Err(CommandError::syntax()),
    }
}

pub fn latency(_ctx: &mut Context, argv: &[Vec<u8>]) -> Result<Reply, CommandError> {
    match super::util::uppercase(&argv[1]).as_str() {
        "HISTORY" => Ok(Reply::Array(Vec::new())),
        "LATEST" => Ok(Reply::Array(Vec::new())),
        "RESET" => Ok(Reply::Integer(0)),
        _ => Err(CommandError::syntax()),
    }
}

/// This server has no sentinel to run, but `SENTINEL MASTERS` is common
/// enough in client handshakes that it gets a fixed mock reply rather than
/// an error (spec §4.5 "fixed mock"); every other subcommand reports
/// cluster support as disabled.
pub fn sentinel(_ctx: &mut Context, argv: &[Vec<u8>]) -> Result<Reply, CommandError> {
    match super::util::uppercase(&argv[1]).as_str() {
        "MASTERS" => Ok(Reply::Array(vec![Reply::Map(vec![
            (Reply::bulk(*b"name"), Reply::bulk(*b"mymaster")),
            (Reply::bulk(*b"ip"), Reply::bulk(*b"127.0.0.1")),
            (Reply::bulk(*b"port"), Reply::bulk(*b"6379")),
            (Reply::bulk(*b"flags"), Reply::bulk(*b"master")),
        ])])),
        _ => Err(CommandError::new("ERR This instance has cluster support disabled")),
    }
}

pub fn cluster(_ctx: &mut Context, argv: &[Vec<u8>]) -> Result<Reply, CommandError> {
    match super::util::uppercase(&argv[1]).as_str() {
        "INFO" => Ok(Reply::bulk(*b"cluster_enabled:0\r\ncluster_state:ok\r\n")),
        "MYID" => Ok(Reply::bulk(*b"0000000000000000000000000000000000000000")),
        "SLOTS" | "SHARDS" => Ok(Reply::Array(Vec::new())),
        "NODES" => Err(CommandError::new("ERR This instance has cluster support disabled")),
        _ => Err(CommandError::syntax()),
    }
}

/// Single-node server has no subscribers to fan out to; PUBLISH always
/// reports zero receivers (spec §4.5 "Pub/sub is a stub").
pub fn publish(_ctx: &mut Context, _argv: &[Vec<u8>]) -> Result<Reply, CommandError> {
    Ok(Reply::Integer(0))
}

pub fn subscribe(_ctx: &mut Context, argv: &[Vec<u8>]) -> Result<Reply, CommandError> {
    let replies = argv[1..]
        .iter()
        .enumerate()
        .map(|(i, ch)| {
            Reply::Push(vec![Reply::bulk(*b"subscribe"), Reply::bulk(ch.clone()), Reply::Integer(i as i64 + 1)])
        })
        .collect::<Vec<_>>();
    Ok(Reply::Array(replies))
}

pub fn unsubscribe(_ctx: &mut Context, argv: &[Vec<u8>]) -> Result<Reply, CommandError> {
    Ok(Reply::Push(vec![Reply::bulk(*b"unsubscribe"), argv.get(1).map(|c| Reply::bulk(c.clone())).unwrap_or(Reply::Nil), Reply::Integer(0)]))
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
    fn role_reports_master() {
        let store = Store::new();
        let mut session = Session::new(false);
        let config = ServerConfig::default();
        let info = ServerInfo::new(&config);
        let mut ctx = context(&store, &mut session, &config, &info);
        let r = role(&mut ctx, &[b"ROLE".to_vec()]).unwrap();
        assert_eq!(r, Reply::Array(vec![Reply::bulk(*b"master"), Reply::Integer(0), Reply::Array(Vec::new())]));
    }

    #[test]
    fn publish_reports_zero_receivers() {
        let store = Store::new();
        let mut session = Session::new(false);
        let config = ServerConfig::default();
        let info = ServerInfo::new(&config);
        let mut ctx = context(&store, &mut session, &config, &info);
        let r = publish(&mut ctx, &[b"PUBLISH".to_vec(), b"ch".to_vec(), b"msg".to_vec()]).unwrap();
        assert_eq!(r, Reply::Integer(0));
    }
}
