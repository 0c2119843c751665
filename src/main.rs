//! Todo API (v1)
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌──────────────────────────────────────────────┐
//!                      │                  TODO API                     │
//!                      │                                               │
//!     Client Request   │  ┌─────────┐   ┌───────────┐   ┌──────────┐  │
//!     ─────────────────┼─▶│   net   │──▶│   http    │──▶│  routing │  │
//!                      │  │listener │   │ WebServer │   │TodoRouter│  │
//!                      │  └─────────┘   └───────────┘   └────┬─────┘  │
//!                      │                                     ▼        │
//!                      │                              ┌────────────┐  │
//!                      │                              │   todos    │  │
//!                      │                              │ repository │──┼──▶ MongoDB
//!                      │                              └────────────┘  │
//!                      │  ┌─────────────────────────────────────────┐ │
//!                      │  │          Cross-Cutting Concerns          │ │
//!                      │  │  config · observability · lifecycle      │ │
//!                      │  └─────────────────────────────────────────┘ │
//!                      └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use todo_api::lifecycle::{start, StartOptions};

#[derive(Debug, Parser)]
#[command(name = "todo-api", version, about = "Todo CRUD service")]
struct Cli {
    /// TOML file with feature toggles (corsEnabled, databaseEnabled, ...).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Environment label; overrides APP_ENV.
    #[arg(short, long)]
    env: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    start(StartOptions {
        config_path: cli.config,
        environment: cli.env,
    })
    .await?;

    Ok(())
}
