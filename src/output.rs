//! Snapshot assembly and atomic JSON persistence.

use std::collections::HashMap;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;

use crate::model::{NewsItem, Snapshot};

/// Builds the output snapshot from the merged item mapping.
///
/// Items are sorted descending by a numeric key derived from `published`;
/// unknown timestamps take key `0` and therefore sort last. Known quirk,
/// preserved deliberately: an item genuinely dated at or before the Unix
/// epoch gets the same key as an undated one.
pub fn build_snapshot(items: HashMap<String, NewsItem>, days_back: u32) -> Snapshot {
    let mut list: Vec<NewsItem> = items.into_values().collect();
    list.sort_by_key(|item| {
        std::cmp::Reverse(item.published.map(|p| p.timestamp()).unwrap_or(0))
    });

    Snapshot {
        generated_at: Utc::now(),
        days_back,
        total_items: list.len(),
        items: list,
    }
}

/// Writes the snapshot as pretty-printed JSON, replacing any prior file.
///
/// Parent directories are created as needed. The content goes to a temporary
/// file in the destination directory first, is synced, then renamed over the
/// target — the previous snapshot stays intact until the new one is complete,
/// and a failed run never leaves a partial file behind.
///
/// # Errors
///
/// Any I/O or serialization failure is fatal to the run; the caller aborts
/// with a non-zero exit.
pub fn write_snapshot(snapshot: &Snapshot, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create output directory '{}'", parent.display())
            })?;
        }
    }

    let content =
        serde_json::to_string_pretty(snapshot).context("Failed to serialize snapshot")?;

    // Randomized temp filename so concurrent runs cannot collide on the
    // intermediate path.
    use std::time::{SystemTime, UNIX_EPOCH};
    let random_suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    let temp_path = path.with_extension(format!("tmp.{:016x}", random_suffix));

    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&temp_path)
        .with_context(|| {
            format!(
                "Failed to create temporary file '{}': check directory permissions",
                temp_path.display()
            )
        })?;

    file.write_all(content.as_bytes()).with_context(|| {
        let _ = std::fs::remove_file(&temp_path);
        format!(
            "Failed to write snapshot to temporary file '{}'",
            temp_path.display()
        )
    })?;

    file.sync_all().with_context(|| {
        let _ = std::fs::remove_file(&temp_path);
        format!(
            "Failed to sync temporary file '{}' to disk",
            temp_path.display()
        )
    })?;

    drop(file);

    std::fs::rename(&temp_path, path).with_context(|| {
        let _ = std::fs::remove_file(&temp_path);
        format!(
            "Failed to rename '{}' to '{}'",
            temp_path.display(),
            path.display()
        )
    })?;

    Ok(())
}
