//! Core command implementations and shared utilities
//!
//! This module contains:
//! - `open_db` - Shared utility to open the database
//! - `open_app` - Open the database and wrap it in the application context
//! - `cmd_init` - Initialize the database

use std::path::Path;

use anyhow::{Context, Result};
use smartcents_core::{Config, Database, SmartCents};

use super::App;

/// Open database with encryption by default, or unencrypted if --no-encrypt
pub fn open_db(db_path: &Path, no_encrypt: bool) -> Result<Database> {
    let path_str = db_path
        .to_str()
        .context("Database path must be valid UTF-8")?;
    tracing::debug!(path = path_str, encrypted = !no_encrypt, "Opening database");
    if no_encrypt {
        Database::new_unencrypted(path_str).context("Failed to open database (unencrypted)")
    } else {
        Database::new(path_str).context("Failed to open database")
    }
}

pub fn open_app(db_path: &Path, no_encrypt: bool, config: Config) -> Result<App> {
    let db = open_db(db_path, no_encrypt)?;
    Ok(SmartCents::new(db, config))
}

pub fn cmd_init(db_path: &Path, no_encrypt: bool) -> Result<()> {
    println!("🔧 Initializing database at {}...", db_path.display());

    open_db(db_path, no_encrypt)?;

    if no_encrypt {
        println!("   ⚠️  Encryption: DISABLED (--no-encrypt)");
    } else {
        println!("   🔒 Encryption: ENABLED");
    }

    println!("✅ Database initialized successfully!");
    println!();
    println!("Next steps:");
    println!("  1. Record income: smartcents add income 20 allowance");
    println!("  2. Check your score: smartcents score --explain");
    println!("  3. Start web UI: smartcents serve");

    Ok(())
}
