// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Scheduler daemon for one fleet instance.
//!
//! Any number of these run in parallel against the same database; the
//! lease lock ensures at most one scans per period. HTTP controllers
//! live in a separate service and call the `vergabe-api` gateway.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]
#![allow(clippy::multiple_crate_versions)]

use std::sync::Arc;
use std::time::Duration as StdDuration;

use clap::Parser;
use time::Duration;
use tokio::sync::Mutex;
use tracing::info;
use vergabe_persistence::Persistence;
use vergabe_scheduler::{SchedulerConfig, run_scheduler};

/// Vergabe scheduler daemon - drives time-triggered assignment transitions
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the `SQLite` database file. If not provided, uses an
    /// in-memory database (useful only for smoke testing).
    #[arg(short, long)]
    database: Option<String>,

    /// MySQL connection URL. Takes precedence over --database.
    #[arg(long)]
    mysql_url: Option<String>,

    /// Seconds between scan attempts.
    #[arg(long, default_value_t = 30)]
    scan_interval: u64,

    /// Seconds a claimed scan lock lives without renewal.
    #[arg(long, default_value_t = 150)]
    lock_lease: i64,

    /// This instance's identity. Generated randomly if not provided.
    #[arg(long)]
    instance_id: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Initializing Vergabe scheduler daemon");

    let persistence: Persistence = if let Some(url) = &args.mysql_url {
        info!("Using MySQL database");
        Persistence::new_with_mysql(url)?
    } else if let Some(db_path) = &args.database {
        info!("Using file-based database at: {}", db_path);
        Persistence::new_with_file(db_path)?
    } else {
        info!("Using in-memory database");
        Persistence::new_in_memory()?
    };

    let config: SchedulerConfig = SchedulerConfig {
        scan_interval: StdDuration::from_secs(args.scan_interval),
        lock_lease: Duration::seconds(args.lock_lease),
        instance_id: args
            .instance_id
            .unwrap_or_else(SchedulerConfig::random_instance_id),
    };
    info!(instance_id = %config.instance_id, "Scheduler configured");

    let persistence: Arc<Mutex<Persistence>> = Arc::new(Mutex::new(persistence));
    let scheduler = tokio::spawn(run_scheduler(persistence, config));

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received; the lease will expire on its own");
        }
        result = scheduler => {
            result?;
        }
    }

    Ok(())
}
