//! Working-copy materialization.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use indexmap::IndexMap;

/// Make `dir` contain exactly the given file set.
///
/// Every pre-existing entry except `.git` is removed, so nothing from a
/// previous run survives while a freshly cloned or initialized repository
/// in the same directory keeps its metadata. I/O errors are fatal for the
/// run and propagate to the caller; there is no retry.
pub fn publish_files(files: &IndexMap<String, String>, dir: &Path) -> Result<()> {
    if dir.exists() {
        for entry in
            fs::read_dir(dir).with_context(|| format!("reading {}", dir.display()))?
        {
            let entry = entry?;
            if entry.file_name() == ".git" {
                continue;
            }
            let path = entry.path();
            if entry.file_type()?.is_dir() {
                fs::remove_dir_all(&path)
                    .with_context(|| format!("removing {}", path.display()))?;
            } else {
                fs::remove_file(&path)
                    .with_context(|| format!("removing {}", path.display()))?;
            }
        }
    } else {
        fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }

    for (name, content) in files {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        fs::write(&path, content).with_context(|| format!("writing {}", path.display()))?;
    }

    Ok(())
}
