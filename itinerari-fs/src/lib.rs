//! Capability-based filesystem helpers for the audit tools.
//!
//! Every helper resolves an ambient directory handle once with `cap-std` and
//! performs the operation relative to it, so callers never touch `std::fs`
//! directly.
#![forbid(unsafe_code)]

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8};
use std::io;
use std::path::Component;

/// What a path currently points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    /// Nothing exists at the path.
    Missing,
    /// A regular file.
    File,
    /// A directory.
    Directory,
    /// Something else, such as a socket or device.
    Other,
}

/// Inspect `path` without following it into a handle.
///
/// # Errors
/// Propagates I/O failures other than the entry being absent.
pub fn path_kind(path: &Utf8Path) -> io::Result<PathKind> {
    let (dir, name) = match open_dir_and_file(path) {
        Ok(pair) => pair,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(PathKind::Missing),
        Err(err) => return Err(err),
    };
    match dir.metadata(name.as_str()) {
        Ok(meta) if meta.is_file() => Ok(PathKind::File),
        Ok(meta) if meta.is_dir() => Ok(PathKind::Directory),
        Ok(_) => Ok(PathKind::Other),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(PathKind::Missing),
        Err(err) => Err(err),
    }
}

/// Open an existing file for reading.
///
/// # Errors
/// Fails when the file cannot be opened.
pub fn open_utf8_file(path: &Utf8Path) -> io::Result<fs_utf8::File> {
    let (dir, name) = open_dir_and_file(path)?;
    dir.open(name.as_str())
}

/// Create `path`, truncating any previous content.
///
/// The parent directory is created when missing.
///
/// # Errors
/// Fails when the parent cannot be created or the file cannot be opened for
/// writing.
pub fn create_truncated(path: &Utf8Path) -> io::Result<fs_utf8::File> {
    ensure_parent_dir(path)?;
    let (dir, name) = open_dir_and_file(path)?;
    dir.create(name.as_str())
}

/// Open the parent directory of `path` and return it with the file name.
///
/// # Errors
/// Fails when `path` has no file name or the parent cannot be opened.
pub fn open_dir_and_file(path: &Utf8Path) -> io::Result<(fs_utf8::Dir, String)> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_str().is_empty() => parent,
        _ => Utf8Path::new("."),
    };
    let file_name = path
        .file_name()
        .ok_or_else(|| io::Error::other(format!("path {path} has no file name")))?
        .to_owned();
    let dir = fs_utf8::Dir::open_ambient_dir(parent, ambient_authority())?;
    Ok((dir, file_name))
}

/// Create `dir` and any missing ancestors.
///
/// # Errors
/// Fails when a component exists as a non-directory or cannot be created.
pub fn ensure_dir(dir: &Utf8Path) -> io::Result<()> {
    if dir.as_str().is_empty() || dir == Utf8Path::new("/") {
        return Ok(());
    }
    let (base, relative) = base_dir_and_relative(dir)?;
    if relative.as_str().is_empty() {
        return Ok(());
    }
    base.create_dir_all(&relative)
}

/// Ensure the parent directory of `path` exists.
///
/// # Errors
/// Fails when the parent cannot be created.
pub fn ensure_parent_dir(path: &Utf8Path) -> io::Result<()> {
    path.parent().map_or(Ok(()), ensure_dir)
}

/// Split a path into an ambient base directory and the relative remainder.
///
/// Absolute paths are anchored at the filesystem root (or the Windows drive
/// prefix); relative paths at the current directory.
///
/// # Errors
/// Fails when the base cannot be opened or the path is not UTF-8.
pub fn base_dir_and_relative(path: &Utf8Path) -> io::Result<(fs_utf8::Dir, Utf8PathBuf)> {
    let std_path = path.as_std_path();

    let (base, relative) = match std_path.components().next() {
        Some(Component::Prefix(prefix)) => {
            let prefix_str = prefix
                .as_os_str()
                .to_str()
                .ok_or_else(|| io::Error::other("non-UTF-8 path prefix"))?;
            let base = Utf8PathBuf::from(prefix_str).join(std::path::MAIN_SEPARATOR.to_string());
            let relative = std_path
                .strip_prefix(base.as_std_path())
                .or_else(|_| std_path.strip_prefix(prefix.as_os_str()))
                .map_err(|_| io::Error::other("failed to strip prefix from path"))?
                .to_path_buf();
            (base, relative)
        }
        Some(Component::RootDir) => {
            let base = Utf8PathBuf::from(std::path::MAIN_SEPARATOR.to_string());
            let relative = std_path
                .strip_prefix(base.as_std_path())
                .map_err(|_| io::Error::other("failed to strip root from absolute path"))?
                .to_path_buf();
            (base, relative)
        }
        _ => (Utf8PathBuf::from("."), std_path.to_path_buf()),
    };

    let dir = fs_utf8::Dir::open_ambient_dir(&base, ambient_authority())?;
    let relative =
        Utf8PathBuf::from_path_buf(relative).map_err(|_| io::Error::other("non-UTF-8 path"))?;
    Ok((dir, relative))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use std::io::{Read, Write};
    use tempfile::TempDir;

    #[fixture]
    fn temp_dir() -> TempDir {
        TempDir::new().unwrap_or_else(|err| panic!("create temporary directory: {err}"))
    }

    fn utf8(dir: &TempDir) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(dir.path().to_path_buf())
            .unwrap_or_else(|path| panic!("non-UTF-8 temp path {path:?}"))
    }

    #[rstest]
    fn classifies_paths(temp_dir: TempDir) {
        let root = utf8(&temp_dir);
        let file = root.join("Report.txt");
        std::fs::write(&file, "x").unwrap_or_else(|err| panic!("write fixture: {err}"));

        assert_eq!(path_kind(&root).ok(), Some(PathKind::Directory));
        assert_eq!(path_kind(&file).ok(), Some(PathKind::File));
        assert_eq!(path_kind(&root.join("absent.xml")).ok(), Some(PathKind::Missing));
        assert_eq!(path_kind(&root.join("no/such/dir.xml")).ok(), Some(PathKind::Missing));
    }

    #[rstest]
    fn create_truncated_builds_parents_and_replaces_content(temp_dir: TempDir) {
        let target = utf8(&temp_dir).join("out/nested/logging.log");
        std::fs::create_dir_all(target.parent().unwrap_or(&target))
            .unwrap_or_else(|err| panic!("create fixture dir: {err}"));
        std::fs::write(&target, "stale content")
            .unwrap_or_else(|err| panic!("write fixture: {err}"));

        let mut file = create_truncated(&target).unwrap_or_else(|err| panic!("create: {err}"));
        file.write_all(b"fresh").unwrap_or_else(|err| panic!("write: {err}"));
        drop(file);

        let mut contents = String::new();
        open_utf8_file(&target)
            .and_then(|mut reopened| reopened.read_to_string(&mut contents))
            .unwrap_or_else(|err| panic!("read back: {err}"));
        assert_eq!(contents, "fresh");
    }

    #[rstest]
    fn ensure_dir_is_idempotent(temp_dir: TempDir) {
        let target = utf8(&temp_dir).join("a/b");

        ensure_dir(&target).unwrap_or_else(|err| panic!("first create: {err}"));
        ensure_dir(&target).unwrap_or_else(|err| panic!("second create: {err}"));

        assert_eq!(path_kind(&target).ok(), Some(PathKind::Directory));
    }

    #[rstest]
    fn bare_file_name_resolves_against_current_dir() {
        let (_, name) =
            open_dir_and_file(Utf8Path::new("Report.txt")).unwrap_or_else(|err| panic!("{err}"));
        assert_eq!(name, "Report.txt");
    }
}
