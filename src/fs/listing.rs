use std::ffi::{OsStr, OsString};
use std::fs;
use std::path::Path;

use crate::error::{AppError, Result};

/// Separator marker appended to directory display entries.
pub const DIR_MARKER: char = '/';

/// Synthetic entry that moves the cursor to the parent directory.
pub const PARENT_ENTRY: &str = "../";

/// One filesystem entry as seen while enumerating a directory.
///
/// `name` is the raw OS name, used for every path join. Only
/// [`Entry::display`] is lossy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub name: OsString,
    pub is_dir: bool,
}

impl Entry {
    /// The synthetic `../` row.
    pub fn parent() -> Self {
        Self {
            name: OsString::from(PARENT_ENTRY.trim_end_matches(DIR_MARKER)),
            is_dir: true,
        }
    }

    /// Build an entry from a `read_dir` item.
    ///
    /// Symlinks are followed for the directory test so that linked
    /// directories can be entered. Dangling links count as files.
    fn from_dir_entry(entry: &fs::DirEntry) -> Self {
        let name = entry.file_name();
        let is_dir = match entry.file_type() {
            Ok(ft) if ft.is_symlink() => fs::metadata(entry.path())
                .map(|m| m.is_dir())
                .unwrap_or(false),
            Ok(ft) => ft.is_dir(),
            Err(_) => false,
        };
        Self { name, is_dir }
    }

    pub fn is_hidden(&self) -> bool {
        self.name.as_encoded_bytes().first() == Some(&b'.')
    }

    pub fn name(&self) -> &OsStr {
        &self.name
    }

    /// The line shown for this entry, with the directory marker if needed.
    pub fn display(&self) -> String {
        let name = self.name.to_string_lossy();
        if self.is_dir {
            format!("{name}{DIR_MARKER}")
        } else {
            name.into_owned()
        }
    }
}

/// Whether a display line names a directory.
pub fn is_dir_line(line: &str) -> bool {
    line.ends_with(DIR_MARKER)
}

/// Enumerate `dir` in raw filesystem order.
///
/// The order is whatever the OS returns and is not stable across
/// filesystems. Entries that fail to stat mid-enumeration are skipped.
pub fn entries(dir: &Path) -> Result<impl Iterator<Item = Entry>> {
    let read_dir = fs::read_dir(dir).map_err(|e| AppError::from_io(e, dir))?;
    Ok(read_dir.filter_map(|entry| entry.ok().map(|e| Entry::from_dir_entry(&e))))
}

/// Enumerate `dir`, dropping hidden entries unless asked.
pub fn visible_entries(dir: &Path, include_hidden: bool) -> Result<Vec<Entry>> {
    Ok(entries(dir)?
        .filter(|e| include_hidden || !e.is_hidden())
        .collect())
}

/// Display lines for `entries`, in the same order.
pub fn display_lines(entries: &[Entry]) -> Vec<String> {
    entries.iter().map(Entry::display).collect()
}
