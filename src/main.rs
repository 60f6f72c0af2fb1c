mod cli;
mod commands;
mod database;
mod models;
mod services;
mod utils;

use anyhow::Context;
use clap::Parser;

use cli::{Cli, Command};
use services::tracker::TrackerController;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    utils::config::load_dotenv();
    env_logger::init();

    let cli = Cli::parse();

    let data_dir = utils::config::data_dir().context("failed to resolve data directory")?;
    std::fs::create_dir_all(&data_dir).context("failed to create data directory")?;

    let settings = utils::config::read_settings(&data_dir);

    // A store that cannot be opened is fatal; there is no degraded mode.
    let db_path = data_dir.join("worklog.db");
    let conn = database::init_database(&db_path).context("failed to open the entry store")?;
    let store = database::EntryStore::new(conn, db_path);

    let mut tracker = TrackerController::new(store, settings, data_dir);
    tracker.refresh().context("failed to load entries")?;

    match cli.command {
        Command::Add {
            date,
            description,
            images,
        } => commands::entry::add_entry(&mut tracker, date, description, images).await,
        Command::List => commands::entry::list_entries(&tracker).await,
        Command::Show { id } => commands::entry::show_entry(&tracker, id).await,
        Command::Edit {
            id,
            date,
            description,
            add_images,
            remove_images,
        } => {
            commands::entry::edit_entry(&mut tracker, id, date, description, add_images, remove_images)
                .await
        }
        Command::Delete { id } => commands::entry::delete_entry(&mut tracker, id).await,
        Command::Clear { force } => commands::storage::clear_data(&mut tracker, force).await,
        Command::Export { path } => commands::storage::export_data(&tracker, path).await,
        Command::Import { path, force } => {
            commands::storage::import_data(&mut tracker, path, force).await
        }
        Command::Stats => commands::storage::show_stats(&tracker).await,
    }
}
