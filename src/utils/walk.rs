use ignore::Walk;
use std::path::PathBuf;
use tracing::warn;

/// Expands dropped paths into regular files, walking directories.
///
/// Directory walks honour `.gitignore` and hidden-file rules; explicitly
/// dropped files are always kept.
pub fn expand_paths(paths: impl IntoIterator<Item = PathBuf>) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for path in paths {
        if path.is_file() {
            files.push(path);
            continue;
        }
        if !path.is_dir() {
            warn!("Skipping {}: not a file or directory", path.display());
            continue;
        }

        for entry in Walk::new(&path) {
            match entry {
                Ok(entry) if entry.path().is_file() => files.push(entry.into_path()),
                Ok(_) => {}
                Err(e) => warn!("Skipping unreadable entry under {}: {}", path.display(), e),
            }
        }
    }

    files
}
