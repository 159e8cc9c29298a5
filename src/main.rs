use std::sync::Arc;

use clap::Parser;

use redikv::config::Cli;
use redikv::net::{self, Shared};
use redikv::server_info::ServerInfo;
use redikv::store::Store;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    redikv::log::init();

    let cli = Cli::parse();
    let config = cli.into_config()?;

    if let Some(pass) = config.require_pass.clone() {
        redikv::auth::set_auth_hook(Arc::new(move |_user, password| password == pass.as_bytes()));
    }

    let info = ServerInfo::new(&config);
    let shared = Arc::new(Shared { store: Store::new(), config, info });

    net::run(shared).await
}
