//! Server configuration surface (spec §6) and the CLI/file layering that
//! populates it: built-in defaults, then an optional config file, then CLI
//! flags (highest precedence).
//!
//! The file format is the same directive-per-line shape the teacher's
//! `RedisServer::load_server_config` parsed (`src/server.rs`): blank lines
//! and lines starting with `#` are skipped, everything else is
//! `directive arg...` split on whitespace.

use std::fs::File;
use std::io::{BufRead, BufReader};

use clap::Parser;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageMode {
    Ram,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub bind_addr: String,
    pub database_count: u32,
    pub redis_compatibility_version: String,
    pub storage_mode: StorageMode,
    pub replication_backlog_size: u64,
    pub idle_timeout_seconds: Option<u32>,
    pub require_pass: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            port: 6379,
            bind_addr: String::new(),
            database_count: 16,
            redis_compatibility_version: "7.0.0".to_string(),
            storage_mode: StorageMode::Ram,
            replication_backlog_size: 1024 * 1024,
            idle_timeout_seconds: None,
            require_pass: None,
        }
    }
}

impl ServerConfig {
    /// Apply directives parsed from a config file, one per line. Unknown
    /// directives are logged and ignored rather than treated as fatal,
    /// since this server recognizes a reduced option set (spec §6).
    pub fn apply_file(&mut self, filename: &str) -> anyhow::Result<()> {
        let file = File::open(filename)?;
        for (line_num, line) in BufReader::new(file).lines().enumerate() {
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let argv: Vec<&str> = trimmed.split_whitespace().collect();
            if let Err(e) = self.apply_directive(&argv) {
                tracing::warn!(line = line_num + 1, directive = trimmed, error = %e, "ignoring unrecognized config directive");
            }
        }
        Ok(())
    }

    fn apply_directive(&mut self, argv: &[&str]) -> anyhow::Result<()> {
        match argv {
            ["port", p] => self.port = p.parse()?,
            ["bind", addr] => self.bind_addr = addr.to_string(),
            ["databases", n] => self.database_count = n.parse()?,
            ["timeout", secs] => {
                let secs: u32 = secs.parse()?;
                self.idle_timeout_seconds = if secs == 0 { None } else { Some(secs) };
            }
            ["requirepass", pass] => self.require_pass = Some(pass.to_string()),
            ["repl-backlog-size", n] => self.replication_backlog_size = n.parse()?,
            other => anyhow::bail!("unknown directive: {}", other.join(" ")),
        }
        Ok(())
    }
}

/// Command-line flags, highest-precedence layer over the config file.
#[derive(Debug, Parser)]
#[command(name = "redikv-server", about = "A Redis-wire-compatible single-node key-value server")]
pub struct Cli {
    /// Optional config file, parsed with the same directive syntax redis.conf uses.
    pub config_file: Option<String>,

    #[arg(long)]
    pub port: Option<u16>,

    #[arg(long)]
    pub bind: Option<String>,

    #[arg(long)]
    pub requirepass: Option<String>,
}

impl Cli {
    pub fn into_config(self) -> anyhow::Result<ServerConfig> {
        let mut config = ServerConfig::default();
        if let Some(path) = &self.config_file {
            config.apply_file(path)?;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(bind) = self.bind {
            config.bind_addr = bind;
        }
        if let Some(pass) = self.requirepass {
            config.require_pass = Some(pass);
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_use_standard_port() {
        assert_eq!(ServerConfig::default().port, 6379);
    }

    #[test]
    fn file_directives_override_defaults() {
        let mut file = tempfile_for_test();
        writeln!(file, "# comment\nport 7777\ndatabases 1\n").unwrap();
        let path = file.path_string();
        let mut cfg = ServerConfig::default();
        cfg.apply_file(&path).unwrap();
        assert_eq!(cfg.port, 7777);
        assert_eq!(cfg.database_count, 1);
    }

    struct TempConfigFile {
        path: std::path::PathBuf,
        file: File,
    }
    impl TempConfigFile {
        fn path_string(&self) -> String {
            self.path.to_string_lossy().to_string()
        }
    }
    impl Write for TempConfigFile {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.file.write(buf)
        }
        fn flush(&mut self) -> std::io::Result<()> {
            self.file.flush()
        }
    }
    fn tempfile_for_test() -> TempConfigFile {
        let path = std::env::temp_dir().join(format!("redikv-test-config-{}.conf", std::process::id()));
        let file = File::create(&path).unwrap();
        TempConfigFile { path, file }
    }
}
