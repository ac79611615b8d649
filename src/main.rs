//! Game Task Board
//!
//! A small web board for tracking game development tasks split across
//! planner, designer and programmer work.

use anyhow::Result;
use clap::Parser;
use game_task_board::board::Board;
use game_task_board::cli::{Cli, Command};
use game_task_board::config::Config;
use game_task_board::db::Database;
use game_task_board::logging::{self, LogTarget};
use game_task_board::storage::UploadStore;
use game_task_board::web::{self, BoardServer};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init(&LogTarget::parse(&cli.log), cli.verbose)?;

    let mut config = Config::load_with_env(cli.config.as_deref().map(Path::new))?;
    cli.apply_overrides(&mut config);
    config.ensure_dirs()?;

    let db = Database::open(&config.server.db_path)?;
    info!("Database ready at {:?}", config.server.db_path);

    match cli.command {
        Some(Command::InitDb) => {
            info!("Database initialized");
        }
        Some(Command::Serve) | None => {
            run_server(config, db).await?;
        }
    }

    Ok(())
}

async fn run_server(config: Config, db: Database) -> Result<()> {
    let store = UploadStore::new(&config.server.upload_dir);
    store.ensure_dir()?;
    info!("Storing uploads in {:?}", store.dir());

    let board = Board::new(Arc::new(db), store);
    let state = BoardServer::new(board, config.server.max_upload_bytes());
    let (shutdown_tx, _addr, handle) =
        web::start_server(state, config.server.bind_addr()).await?;

    tokio::signal::ctrl_c().await?;
    info!("Received shutdown signal");

    if shutdown_tx.send(()).is_err() {
        warn!("Server already stopped");
    }
    handle.await?;
    Ok(())
}
