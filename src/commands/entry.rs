use anyhow::{bail, Context, Result};
use std::path::PathBuf;

use crate::models::{Entry, EntryPatch};
use crate::services::tracker::{StageOutcome, TrackerController};
use crate::utils::files::read_selected_files;

pub async fn add_entry(
    tracker: &mut TrackerController,
    date: String,
    description: String,
    image_paths: Vec<PathBuf>,
) -> Result<()> {
    let mut session = tracker.begin_staging();

    if !image_paths.is_empty() {
        let files = read_selected_files(&image_paths)?;
        for outcome in tracker.stage_images(&mut session, files).await {
            report_outcome(&outcome);
        }
    }

    let summary = if session.is_empty() {
        String::new()
    } else {
        format!(" ({} image(s) attached)", session.len())
    };
    let id = tracker.add_entry(&date, &description, session).await?;
    println!("Added entry {id}{summary}");
    Ok(())
}

pub async fn list_entries(tracker: &TrackerController) -> Result<()> {
    let entries = tracker.entries();
    if entries.is_empty() {
        println!("No entries yet. Add your first entry!");
        return Ok(());
    }

    for entry in entries {
        print_summary(entry);
    }
    Ok(())
}

pub async fn show_entry(tracker: &TrackerController, id: i64) -> Result<()> {
    let entry = tracker
        .entry(id)?
        .with_context(|| format!("entry {id} not found"))?;

    println!("Entry {}", entry.id);
    println!("  Date:        {}", entry.date);
    println!("  Description: {}", entry.description);
    println!("  Images:      {}", entry.images.len());
    println!("  Created:     {}", entry.created_at);
    if let Some(updated_at) = &entry.updated_at {
        println!("  Updated:     {updated_at}");
    }
    Ok(())
}

pub async fn edit_entry(
    tracker: &mut TrackerController,
    id: i64,
    date: Option<String>,
    description: Option<String>,
    add_images: Vec<PathBuf>,
    remove_images: Vec<usize>,
) -> Result<()> {
    let Some(existing) = tracker.entry(id)? else {
        bail!("entry {id} not found");
    };

    // The edit session starts from the entry's current images; removals are
    // applied before new attachments so the given indexes refer to the
    // displayed order.
    let mut session = tracker.begin_staging_for(&existing);
    let mut removals = remove_images;
    removals.sort_unstable_by(|a, b| b.cmp(a));
    for index in removals {
        session.remove(index);
    }

    if !add_images.is_empty() {
        let files = read_selected_files(&add_images)?;
        for outcome in tracker.stage_images(&mut session, files).await {
            report_outcome(&outcome);
        }
    }

    if !session.is_empty() {
        println!("Attached images:");
        for (index, label) in session.labels().iter().enumerate() {
            println!("  [{index}] {label}");
        }
    }

    let patch = EntryPatch {
        date,
        description,
        images: Some(session.into_payloads()),
    };
    tracker.update_entry(id, patch).await?;
    println!("Updated entry {id}");
    Ok(())
}

pub async fn delete_entry(tracker: &mut TrackerController, id: i64) -> Result<()> {
    tracker.delete_entry(id).await?;
    println!("Deleted entry {id}");
    Ok(())
}

fn print_summary(entry: &Entry) {
    let images = match entry.images.len() {
        0 => String::new(),
        n => format!(" [{n} image(s)]"),
    };
    println!("{:>4}  {}  {}{}", entry.id, entry.date, entry.description, images);
}

fn report_outcome(outcome: &StageOutcome) {
    match outcome {
        StageOutcome::Staged {
            file_name,
            compression_ratio,
        } => println!("Compressed {file_name}: {compression_ratio}% reduction"),
        StageOutcome::Skipped { file_name, reason } => {
            println!("Skipped {file_name}: {reason}")
        }
    }
}
