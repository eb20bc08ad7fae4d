//! Loading of labeled text corpora from a directory tree.
//!
//! The expected layout is `<root>/<split>/<category>/<file>`: the parent
//! directory of a file names its category and the grandparent names the
//! dataset split. `<root>/<category>/<file>` is accepted as well, in which
//! case the split is left open. Hidden files and directories are skipped,
//! bytes are decoded as UTF-8 lossily, and documents are returned sorted by
//! path so every run sees the same order.

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use crate::error::{HashlearnError, Result};
use crate::ml::dataset::{Document, LabeledDocument};

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with('.'))
}

fn collect_files(dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if is_hidden(&path) {
            continue;
        }
        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            collect_files(&path, files)?;
        } else if file_type.is_file() || (file_type.is_symlink() && path.is_file()) {
            files.push(path);
        } else if file_type.is_symlink() {
            debug!("not following directory link {}", path.display());
        }
    }
    Ok(())
}

fn dir_name(path: &Path) -> Option<String> {
    path.file_name().map(|name| name.to_string_lossy().into_owned())
}

/// Read one text file with lossy UTF-8 decoding.
pub fn read_text<P: AsRef<Path>>(path: P) -> Result<String> {
    let bytes = fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Load every document below `root`.
pub fn load_directory<P: AsRef<Path>>(root: P) -> Result<Vec<LabeledDocument>> {
    let root = root.as_ref();
    if !root.is_dir() {
        return Err(HashlearnError::invalid_argument(format!(
            "corpus root {} is not a directory",
            root.display()
        )));
    }

    let mut files = Vec::new();
    collect_files(root, &mut files)?;
    files.sort();

    let mut documents = Vec::with_capacity(files.len());
    for path in files {
        let relative = path.strip_prefix(root).unwrap_or(&path);
        let mut ancestors = relative.ancestors().skip(1);
        let category = ancestors
            .next()
            .filter(|parent| !parent.as_os_str().is_empty())
            .and_then(dir_name);
        let Some(category) = category else {
            debug!("skipping {} outside any category directory", path.display());
            continue;
        };
        let split = ancestors
            .next()
            .filter(|grandparent| !grandparent.as_os_str().is_empty())
            .and_then(dir_name);

        let document = Document::new(relative.to_string_lossy(), read_text(&path)?);
        let mut labeled = LabeledDocument::new(document, category);
        if let Some(split) = split {
            labeled = labeled.with_split(split);
        }
        documents.push(labeled);
    }

    debug!("loaded {} documents from {}", documents.len(), root.display());
    Ok(documents)
}
