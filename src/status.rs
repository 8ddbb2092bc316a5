// Status display: what the last runs left in the snapshot directory.

use anyhow::Result;

use crate::store::JsonFileStore;

/// Display snapshot store status to the terminal. Makes no network calls.
pub fn show(store: &JsonFileStore) -> Result<()> {
    let snapshots = store.list()?;

    if snapshots.is_empty() {
        println!("Snapshots: none in {}", store.dir().display());
        println!("\nRun `groupwatch run` to collect them.");
        return Ok(());
    }

    let total: u64 = snapshots.iter().map(|s| s.size).sum();
    println!(
        "Snapshots: {} in {} ({})",
        snapshots.len(),
        store.dir().display(),
        format_bytes(total)
    );

    match snapshots.iter().filter_map(|s| s.modified).max() {
        Some(latest) => println!("Last write: {}", latest.format("%Y-%m-%d %H:%M:%S UTC")),
        None => println!("Last write: unknown"),
    }

    let largest = snapshots.iter().max_by_key(|s| s.size);
    if let Some(largest) = largest {
        println!(
            "Largest: group {} ({})",
            largest.id,
            format_bytes(largest.size)
        );
    }

    Ok(())
}

/// Human-readable size of the snapshot directory.
fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 3] = ["KB", "MB", "GB"];
    if bytes < 1024 {
        return format!("{bytes} B");
    }

    let mut size = bytes as f64 / 1024.0;
    let mut unit = 0;
    while size >= 1024.0 && unit + 1 < UNITS.len() {
        size /= 1024.0;
        unit += 1;
    }
    format!("{size:.1} {}", UNITS[unit])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_byte_sizes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.0 KB");
        assert_eq!(format_bytes(3 * 1024 * 1024), "3.0 MB");
        assert_eq!(format_bytes(5 * 1024 * 1024 * 1024), "5.0 GB");
    }

    #[test]
    fn lists_only_snapshot_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("7.json"), vec![b' '; 2048]).unwrap();
        std::fs::write(dir.path().join("7.json.tmp"), "{").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "x").unwrap();
        let store = JsonFileStore::new(dir.path());

        let listed = store.list().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, "7");
        assert_eq!(format_bytes(listed[0].size), "2.0 KB");
        assert!(show(&store).is_ok());
    }

    #[test]
    fn missing_directory_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("nope"));
        assert!(show(&store).is_ok());
    }
}
