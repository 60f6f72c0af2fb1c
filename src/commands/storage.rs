use anyhow::{bail, Result};
use std::path::PathBuf;

use crate::services::tracker::TrackerController;

pub async fn show_stats(tracker: &TrackerController) -> Result<()> {
    let stats = tracker.storage_stats();
    let used_mb = stats.used_bytes as f64 / (1024.0 * 1024.0);

    println!("Storage statistics:");
    println!("  Entries: {}", stats.entry_count);
    println!("  Used:    {used_mb:.2} MB");
    if stats.quota_bytes > 0 {
        let quota_mb = stats.quota_bytes as f64 / (1024.0 * 1024.0);
        println!("  Quota:   {quota_mb:.2} MB");
    } else {
        println!("  Quota:   unknown");
    }
    Ok(())
}

pub async fn export_data(tracker: &TrackerController, path: Option<PathBuf>) -> Result<()> {
    let (path, count) = tracker.export_to_file(path).await?;
    println!("Exported {count} entries to {}", path.display());
    Ok(())
}

pub async fn import_data(
    tracker: &mut TrackerController,
    path: PathBuf,
    force: bool,
) -> Result<()> {
    if !force {
        bail!("import replaces all current entries; pass --force to confirm");
    }

    let count = tracker.import_from_file(&path).await?;
    println!("Imported {count} entries (previous data replaced)");
    Ok(())
}

pub async fn clear_data(tracker: &mut TrackerController, force: bool) -> Result<()> {
    if !force {
        bail!("this deletes every entry and cannot be undone; pass --force to confirm");
    }

    tracker.clear_all().await?;
    println!("All entries cleared");
    Ok(())
}
