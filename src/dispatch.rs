//! Command dispatcher (C6): uppercased name lookup, arity validation,
//! handler invocation, response shaping via the RESP encoder (spec §4.3).
//!
//! Grounded in the teacher's `CMD_TABLE` / `RedisCommand { name, proc, arity,
//! flags }` (`src/cmd.rs`), generalized to the full command set of
//! spec §4.5 and to RESP-array argv instead of a query-buffer split on
//! whitespace.

use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};

use once_cell::sync::Lazy;

use crate::commands;
use crate::config::ServerConfig;
use crate::error::CommandError;
use crate::resp::Reply;
use crate::server_info::ServerInfo;
use crate::session::Session;
use crate::store::Store;

/// Everything a handler needs besides its own arguments.
pub struct Context<'a> {
    pub store: &'a Store,
    pub session: &'a mut Session,
    pub config: &'a ServerConfig,
    pub info: &'a ServerInfo,
}

pub type Handler = fn(&mut Context, &[Vec<u8>]) -> Result<Reply, CommandError>;

pub struct CommandSpec {
    pub name: &'static str,
    /// Positive: exact argc including the command name. Negative: minimum
    /// argc (variadic), same convention as the teacher's `RedisCommand::arity`.
    pub arity: i32,
    pub handler: Handler,
}

fn arity_ok(spec: &CommandSpec, argc: usize) -> bool {
    if spec.arity >= 0 {
        argc == spec.arity as usize
    } else {
        argc >= (-spec.arity) as usize
    }
}

static CMD_TABLE: Lazy<HashMap<&'static str, CommandSpec>> = Lazy::new(build_table);

fn cmd(name: &'static str, arity: i32, handler: Handler) -> (&'static str, CommandSpec) {
    (name, CommandSpec { name, arity, handler })
}

fn build_table() -> HashMap<&'static str, CommandSpec> {
    use commands::*;
    HashMap::from([
        // Connection / session
        cmd("PING", -1, connection::ping),
        cmd("ECHO", 2, connection::echo),
        cmd("AUTH", -2, connection::auth),
        cmd("HELLO", -1, connection::hello),
        cmd("SELECT", 2, connection::select),
        cmd("QUIT", 1, connection::quit),
        cmd("CLIENT", -2, connection::client),
        // Keys
        cmd("DEL", -2, keys::del),
        cmd("EXISTS", -2, keys::exists),
        cmd("KEYS", 2, keys::keys),
        cmd("SCAN", -2, keys::scan),
        cmd("TYPE", 2, keys::type_cmd),
        cmd("TTL", 2, keys::ttl),
        cmd("EXPIRE", 3, keys::expire),
        cmd("PERSIST", 2, keys::persist),
        cmd("RENAME", 3, keys::rename),
        cmd("DBSIZE", 1, keys::dbsize),
        cmd("FLUSHDB", -1, keys::flushdb),
        // Strings
        cmd("SET", -3, strings::set),
        cmd("GET", 2, strings::get),
        cmd("MSET", -3, strings::mset),
        cmd("MGET", -2, strings::mget),
        cmd("INCR", 2, strings::incr),
        cmd("DECR", 2, strings::decr),
        cmd("INCRBY", 3, strings::incrby),
        cmd("DECRBY", 3, strings::decrby),
        cmd("INCRBYFLOAT", 3, strings::incrbyfloat),
        cmd("STRLEN", 2, strings::strlen),
        cmd("GETRANGE", 4, strings::getrange),
        cmd("APPEND", 3, strings::append),
        // Hashes
        cmd("HSET", -4, hashes::hset),
        cmd("HMSET", -4, hashes::hmset),
        cmd("HGET", 3, hashes::hget),
        cmd("HGETALL", 2, hashes::hgetall),
        cmd("HDEL", -3, hashes::hdel),
        cmd("HLEN", 2, hashes::hlen),
        cmd("HEXISTS", 3, hashes::hexists),
        cmd("HSCAN", -3, hashes::hscan),
        // Lists
        cmd("RPUSH", -3, lists::rpush),
        cmd("LPUSH", -3, lists::lpush),
        cmd("RPOP", -2, lists::rpop),
        cmd("LPOP", -2, lists::lpop),
        cmd("LRANGE", 4, lists::lrange),
        cmd("LLEN", 2, lists::llen),
        cmd("LINDEX", 3, lists::lindex),
        cmd("LSET", 4, lists::lset),
        // Sets
        cmd("SADD", -3, sets::sadd),
        cmd("SREM", -3, sets::srem),
        cmd("SMEMBERS", 2, sets::smembers),
        cmd("SISMEMBER", 3, sets::sismember),
        cmd("SCARD", 2, sets::scard),
        cmd("SPOP", -2, sets::spop),
        cmd("SRANDMEMBER", -2, sets::srandmember),
        cmd("SUNION", -2, sets::sunion),
        // Sorted sets
        cmd("ZADD", -4, zsets::zadd),
        cmd("ZREM", -3, zsets::zrem),
        cmd("ZSCORE", 3, zsets::zscore),
        cmd("ZCARD", 2, zsets::zcard),
        cmd("ZRANGE", -4, zsets::zrange),
        cmd("ZINCRBY", 4, zsets::zincrby),
        cmd("ZRANGEBYSCORE", -4, zsets::zrangebyscore),
        cmd("ZRANK", -3, zsets::zrank),
        // Streams
        cmd("XADD", -5, streams::xadd),
        cmd("XRANGE", -4, streams::xrange),
        cmd("XLEN", 2, streams::xlen),
        cmd("XDEL", -3, streams::xdel),
        cmd("XINFO", -3, streams::xinfo),
        // JSON
        cmd("JSON.SET", -4, json::json_set),
        cmd("JSON.GET", -2, json::json_get),
        cmd("JSON.DEL", -2, json::json_del),
        // Introspection / stubs
        cmd("INFO", -1, introspection::info),
        cmd("TIME", 1, introspection::time),
        cmd("ROLE", 1, introspection::role),
        cmd("COMMAND", -1, introspection::command),
        cmd("CONFIG", -2, introspection::config),
        cmd("MEMORY", -2, introspection::memory),
        cmd("ACL", -2, introspection::acl),
        cmd("MODULE", -2, introspection::module),
        cmd("LATENCY", -2, introspection::latency),
        cmd("SENTINEL", -2, introspection::sentinel),
        cmd("CLUSTER", -2, introspection::cluster),
        cmd("PUBLISH", 3, introspection::publish),
        cmd("SUBSCRIBE", -2, introspection::subscribe),
        cmd("UNSUBSCRIBE", -1, introspection::unsubscribe),
    ])
}

/// Dispatch one already-decoded command (argv\[0\] is the command name).
/// Unexpected panics inside a handler are caught and reported as
/// `ERR internal server error`; the connection is never torn down for this
/// reason alone (spec §4.3, §7).
pub fn dispatch(ctx: &mut Context, argv: &[Vec<u8>]) -> Reply {
    if argv.is_empty() {
        return Reply::error(CommandError::unknown_command("").0);
    }
    let name = String::from_utf8_lossy(&argv[0]).to_ascii_uppercase();

    let spec = match CMD_TABLE.get(name.as_str()) {
        Some(spec) => spec,
        None => return Reply::error(CommandError::unknown_command(&name.to_lowercase()).0),
    };

    if !arity_ok(spec, argv.len()) {
        return Reply::error(CommandError::wrong_args(&name.to_lowercase()).0);
    }

    ctx.info.record_command();
    match catch_unwind(AssertUnwindSafe(|| (spec.handler)(ctx, argv))) {
        Ok(Ok(reply)) => reply,
        Ok(Err(e)) => Reply::from(e),
        Err(_) => {
            tracing::error!(command = %name, "command handler panicked");
            Reply::from(CommandError::internal())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server_info::ServerInfo;

    fn ctx<'a>(store: &'a Store, session: &'a mut Session, config: &'a ServerConfig, info: &'a ServerInfo) -> Context<'a> {
        Context { store, session, config, info }
    }

    #[test]
    fn unknown_command_is_reported_by_name() {
        let store = Store::new();
        let mut session = Session::new(false);
        let config = ServerConfig::default();
        let info = ServerInfo::new(&config);
        let mut c = ctx(&store, &mut session, &config, &info);
        let reply = dispatch(&mut c, &[b"BOGUS".to_vec()]);
        assert_eq!(reply, Reply::error("ERR unknown command 'bogus'"));
    }

    #[test]
    fn wrong_arity_is_rejected_before_handler_runs() {
        let store = Store::new();
        let mut session = Session::new(false);
        let config = ServerConfig::default();
        let info = ServerInfo::new(&config);
        let mut c = ctx(&store, &mut session, &config, &info);
        let reply = dispatch(&mut c, &[b"GET".to_vec()]);
        assert_eq!(reply, Reply::error("ERR wrong number of arguments for 'get' command"));
    }
}
