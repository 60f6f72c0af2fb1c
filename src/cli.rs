use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = env!("CARGO_PKG_NAME"))]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = env!("CARGO_PKG_DESCRIPTION"))]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Clone)]
pub enum Command {
    /// Add a new entry
    Add {
        /// Entry date, stored as-is (e.g. 2024-01-05)
        #[arg(long, short)]
        date: String,

        /// What happened that day
        #[arg(long, short = 'm')]
        description: String,

        /// Image file to compress and attach (repeatable)
        #[arg(long = "image")]
        images: Vec<PathBuf>,
    },
    /// List all entries, newest first
    List,
    /// Show one entry in full
    Show {
        /// Id of the entry to show
        id: i64,
    },
    /// Edit an existing entry
    Edit {
        /// Id of the entry to edit
        id: i64,

        /// New date
        #[arg(long, short)]
        date: Option<String>,

        /// New description
        #[arg(long, short = 'm')]
        description: Option<String>,

        /// Image file to compress and append (repeatable)
        #[arg(long = "add-image")]
        add_images: Vec<PathBuf>,

        /// Zero-based index of an attached image to drop (repeatable)
        #[arg(long = "remove-image")]
        remove_images: Vec<usize>,
    },
    /// Delete an entry
    Delete {
        /// Id of the entry to delete
        id: i64,
    },
    /// Delete every entry
    Clear {
        /// Confirm the irreversible wipe
        #[arg(long)]
        force: bool,
    },
    /// Export all entries to a JSON file
    Export {
        /// Target file (defaults to the data directory)
        path: Option<PathBuf>,
    },
    /// Import entries from a JSON export, replacing ALL current data
    Import {
        /// Export file to import
        path: PathBuf,

        /// Confirm replacing the current entries
        #[arg(long)]
        force: bool,
    },
    /// Show storage usage statistics
    Stats,
}
