//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `threadnote_core` wiring end to end: config, logging, SQLite store.
//! - Print the board in root order with reply and connection counts.

use log::info;
use std::process::ExitCode;
use threadnote_core::db::open_db;
use threadnote_core::{init_logging, CoreConfig, NoteService, SqliteNoteStore};

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("threadnote: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("threadnote_core ping={}", threadnote_core::ping());
    println!("threadnote_core version={}", threadnote_core::core_version());

    let config = CoreConfig::from_env()?;
    if let Some(logging) = config.logging.as_ref() {
        init_logging(logging)?;
    }

    let mut conn = open_db(&config.db_path)?;
    let store = SqliteNoteStore::try_new(&mut conn)?;
    let mut service = NoteService::open(store)?;
    if service.seed_if_empty()? {
        info!("event=cli_seed module=cli status=ok");
        println!("seeded sample notebook into {}", config.db_path.display());
    }

    for (position, summary) in service.summaries().iter().enumerate() {
        println!(
            "{:>2}. {} [replies={} connections={}]",
            position + 1,
            summary.title,
            summary.reply_count,
            summary.connection_count
        );
        for connected in service.find_connected_threads(&summary.id) {
            println!("      -> {}", connected.title);
        }
    }
    Ok(())
}
