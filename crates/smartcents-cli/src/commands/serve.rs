//! Web server command

use std::path::Path;

use anyhow::Result;
use smartcents_core::{Config, SmartCents, TipClient, TipGenerator};
use smartcents_server::ServerConfig;

use super::open_db;

pub async fn cmd_serve(
    db_path: &Path,
    no_encrypt: bool,
    config: Config,
    host: Option<&str>,
    port: Option<u16>,
) -> Result<()> {
    let db = open_db(db_path, no_encrypt)?;
    let host = host.unwrap_or(&config.server.host).to_string();
    let port = port.unwrap_or(config.server.port);

    let server_config = ServerConfig::from_settings(&config.server);
    let tips = TipClient::from_config(&config.tips);

    println!("🚀 Starting SmartCents server...");
    println!("   Database: {}", db_path.display());
    println!("   URL: http://{}:{}", host, port);
    println!("   Tips: {} ({})", tips.backend_name(), tips.model());
    if server_config.require_auth() {
        println!("   Auth: API key required");
    } else {
        println!("   Auth: disabled (do not expose to the network)");
    }
    println!();

    let app = SmartCents::new(db, config);
    smartcents_server::serve(app, tips, &host, port, server_config).await
}
