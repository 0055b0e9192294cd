use std::ffi::OsStr;
use std::fs;
use std::io::{BufRead, BufReader, ErrorKind, Read};
use std::path::{Component, Path, PathBuf};
use std::process::{Command, Stdio};

use crate::error::{AppError, Result};
use crate::fs::listing::{self, Entry, DIR_MARKER};

/// Sentinel for a directory whose only entries are hidden and filtered out.
pub const NO_VISIBLE_ENTRIES_LINE: &str = "NO VISIBLE ENTRIES";
/// Sentinel for preview targets that aren't regular files.
pub const NO_PREVIEW_LINE: &str = "NO PREVIEW AVAILABLE";

/// Bytes of a file read for its preview, however long its lines are.
pub const MAX_PREVIEW_BYTES: u64 = 64 * 1024;

/// Validated current-directory cursor over the filesystem.
///
/// `path` always names a directory that was readable when the cursor last
/// moved. Every move either commits a validated path or leaves `path`
/// untouched.
#[derive(Debug, Clone)]
pub struct Navigator {
    path: PathBuf,
    viewer: String,
}

impl Navigator {
    /// Create a navigator rooted at `/` that opens files with `viewer`.
    pub fn new(viewer: impl Into<String>) -> Self {
        Self {
            path: PathBuf::from("/"),
            viewer: viewer.into(),
        }
    }

    /// Create a navigator and move it to `start`.
    ///
    /// `start` is absolute or `~`-relative; any other path is walked from the
    /// working directory.
    pub fn open(start: &str, viewer: impl Into<String>) -> Result<Self> {
        let mut nav = Self::new(viewer);
        if start.starts_with('~') || start.starts_with(DIR_MARKER) {
            nav.move_absolute(start)?;
        } else {
            let cwd = std::env::current_dir()?;
            nav.move_absolute(&cwd.to_string_lossy())?;
            nav.move_multiple(start)?;
        }
        Ok(nav)
    }

    pub fn current_path(&self) -> &Path {
        &self.path
    }

    /// The cursor as a display string, used for the header.
    pub fn header(&self) -> String {
        self.path.to_string_lossy().to_string()
    }

    pub fn is_root(&self) -> bool {
        self.path.parent().is_none()
    }

    /// Jump to `path`, which must start with `~` or `/`.
    pub fn move_absolute(&mut self, path: &str) -> Result<()> {
        let trimmed = strip_trailing_separator(path);
        let resolved = if trimmed == "~" {
            home_dir()?
        } else if let Some(rest) = trimmed.strip_prefix("~/") {
            home_dir()?.join(rest)
        } else if trimmed.starts_with('/') {
            PathBuf::from(trimmed)
        } else {
            return Err(AppError::InvalidPath(format!(
                "{path} is neither absolute nor home-relative"
            )));
        };
        let resolved = normalize(&resolved);
        ensure_readable_dir(&resolved)?;
        log::debug!("cursor moved to {}", resolved.display());
        self.path = resolved;
        Ok(())
    }

    /// Step into `name` relative to the cursor.
    ///
    /// `.` is a no-op and `..` truncates to the parent (a no-op at `/`).
    pub fn move_one(&mut self, name: &str) -> Result<()> {
        let name = strip_trailing_separator(name);
        match name {
            "" | "." => Ok(()),
            ".." => {
                self.path.pop();
                Ok(())
            }
            _ if name.contains(DIR_MARKER) => Err(AppError::InvalidPath(format!(
                "{name} is not a single path segment"
            ))),
            _ => self.step_into(OsStr::new(name)),
        }
    }

    /// Step into a listed entry, resolved by its raw name.
    pub fn enter(&mut self, entry: &Entry) -> Result<()> {
        if *entry == Entry::parent() {
            self.path.pop();
            return Ok(());
        }
        self.step_into(entry.name())
    }

    fn step_into(&mut self, name: &OsStr) -> Result<()> {
        let next = self.path.join(name);
        ensure_readable_dir(&next)?;
        log::debug!("cursor moved to {}", next.display());
        self.path = next;
        Ok(())
    }

    /// Apply [`Navigator::move_one`] to each `/`-separated segment of `path`.
    ///
    /// Stops at the first failing segment. Segments applied before the
    /// failure stay applied: the cursor is left wherever navigation got to.
    pub fn move_multiple(&mut self, path: &str) -> Result<()> {
        for segment in path.split(DIR_MARKER).filter(|s| !s.is_empty()) {
            self.move_one(segment)?;
        }
        Ok(())
    }

    /// List the cursor directory, with a leading `../` unless at the root.
    ///
    /// Entries come in raw filesystem enumeration order.
    pub fn list(&self, include_hidden: bool) -> Result<Vec<Entry>> {
        let mut entries = Vec::new();
        if !self.is_root() {
            entries.push(Entry::parent());
        }
        entries.extend(listing::visible_entries(&self.path, include_hidden)?);
        Ok(entries)
    }

    /// Preview listing of the subdirectory `name`: at most `n` entries.
    ///
    /// Unreadable and empty directories yield a single sentinel line instead
    /// of an error.
    pub fn list_first_n(
        &self,
        name: impl AsRef<Path>,
        n: usize,
        include_hidden: bool,
    ) -> Result<Vec<String>> {
        if n == 0 {
            return Ok(Vec::new());
        }
        let target = self.path.join(name);
        match first_entries(&target, n, include_hidden) {
            Err(err) => match err.sentinel() {
                Some(line) => Ok(vec![line.to_string()]),
                None => Err(err),
            },
            ok => ok,
        }
    }

    /// Preview of the file `name`: its first `n` lines, fewer if it's shorter.
    ///
    /// At most [`MAX_PREVIEW_BYTES`] are read.
    pub fn read_first_n(&self, name: impl AsRef<Path>, n: usize) -> Result<Vec<String>> {
        if n == 0 {
            return Ok(Vec::new());
        }
        let target = self.path.join(name);
        match first_lines(&target, n) {
            Err(err) => match err.sentinel() {
                Some(line) => Ok(vec![line.to_string()]),
                None => Err(err),
            },
            ok => ok,
        }
    }

    /// Run the configured viewer on `name` and block until it exits.
    ///
    /// The viewer inherits stdin/stdout/stderr, so the caller must have
    /// released the terminal first.
    pub fn view_externally(&self, name: impl AsRef<Path>) -> Result<()> {
        let target = self.path.join(name);
        log::info!("opening {} with {}", target.display(), self.viewer);
        let status = Command::new(&self.viewer)
            .arg(&target)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|e| {
                AppError::ExternalProcess(format!("could not launch {}: {e}", self.viewer))
            })?;
        if !status.success() {
            return Err(AppError::ExternalProcess(format!(
                "{} exited with {status}",
                self.viewer
            )));
        }
        Ok(())
    }
}

fn home_dir() -> Result<PathBuf> {
    dirs::home_dir().ok_or_else(|| AppError::InvalidPath("home directory is unknown".into()))
}

/// Strip one trailing `/`, keeping a lone `/` intact.
fn strip_trailing_separator(path: &str) -> &str {
    if path.len() > 1 {
        path.strip_suffix(DIR_MARKER).unwrap_or(path)
    } else {
        path
    }
}

/// Resolve `.` and `..` components lexically.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Fail unless `path` is a directory that can be enumerated right now.
fn ensure_readable_dir(path: &Path) -> Result<()> {
    let meta = fs::metadata(path).map_err(|e| AppError::from_io(e, path))?;
    if !meta.is_dir() {
        return Err(AppError::NotADirectory(path.to_path_buf()));
    }
    fs::read_dir(path).map_err(|e| AppError::from_io(e, path))?;
    Ok(())
}

fn first_entries(dir: &Path, n: usize, include_hidden: bool) -> Result<Vec<String>> {
    let mut seen_any = false;
    let mut lines = Vec::new();
    for entry in listing::entries(dir)? {
        seen_any = true;
        if !include_hidden && entry.is_hidden() {
            continue;
        }
        lines.push(entry.display());
        if lines.len() == n {
            break;
        }
    }
    if !seen_any {
        return Err(AppError::EmptyDirectory(dir.to_path_buf()));
    }
    if lines.is_empty() {
        lines.push(NO_VISIBLE_ENTRIES_LINE.to_string());
    }
    Ok(lines)
}

fn first_lines(path: &Path, n: usize) -> Result<Vec<String>> {
    let meta = match fs::metadata(path) {
        Ok(meta) => meta,
        // Dangling or looping symlink: the link itself exists, its target doesn't resolve.
        Err(err)
            if err.kind() != ErrorKind::PermissionDenied && fs::symlink_metadata(path).is_ok() =>
        {
            return Ok(vec![NO_PREVIEW_LINE.to_string()]);
        }
        Err(err) => return Err(AppError::from_io(err, path)),
    };
    if !meta.is_file() {
        return Ok(vec![NO_PREVIEW_LINE.to_string()]);
    }

    let file = fs::File::open(path).map_err(|e| AppError::from_io(e, path))?;
    let mut lines = Vec::with_capacity(n);
    for chunk in BufReader::new(file.take(MAX_PREVIEW_BYTES))
        .split(b'\n')
        .take(n)
    {
        let mut bytes = chunk?;
        if bytes.last() == Some(&b'\r') {
            bytes.pop();
        }
        lines.push(String::from_utf8_lossy(&bytes).into_owned());
    }
    Ok(lines)
}
