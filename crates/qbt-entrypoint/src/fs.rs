//! Filesystem primitives shared by the bootstrap stages.

use std::fs::{DirBuilder, OpenOptions, Permissions};
use std::io::{self, Write};
use std::os::unix::fs::{DirBuilderExt, OpenOptionsExt, PermissionsExt};
use std::path::Path;

use tempfile::Builder;

/// Mode applied to directories created on the way to a target file.
pub(crate) const DIRECTORY_MODE: u32 = 0o755;

/// Mode applied to files the entrypoint materialises.
pub(crate) const FILE_MODE: u32 = 0o644;

/// Result of a write that refuses to replace an existing entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WriteOutcome {
    Written,
    AlreadyExists,
}

/// Creates every missing ancestor of `path`.
pub(crate) fn create_parent_directories(path: &Path) -> io::Result<()> {
    let Some(parent) = path.parent() else {
        return Ok(());
    };
    let mut builder = DirBuilder::new();
    builder.recursive(true).mode(DIRECTORY_MODE);
    builder.create(parent)
}

/// Writes `contents` to `path` unless an entry already exists there.
///
/// The payload is staged in a temporary file beside the target, fsync'd,
/// then linked into place without clobbering, so a reader never observes a
/// partially written file and an existing file is never replaced.
pub(crate) fn write_new_file(path: &Path, contents: &[u8]) -> io::Result<WriteOutcome> {
    let directory = path.parent().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::NotFound,
            "target path did not have a parent directory",
        )
    })?;

    let mut builder = Builder::new();
    builder.prefix(
        path.file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("qbt-entrypoint"),
    );
    builder.permissions(Permissions::from_mode(FILE_MODE));

    let mut file = builder.tempfile_in(directory)?;
    file.write_all(contents)?;
    file.as_file().sync_all()?;
    match file.persist_noclobber(path) {
        Ok(_) => Ok(WriteOutcome::Written),
        Err(error) if error.error.kind() == io::ErrorKind::AlreadyExists => {
            Ok(WriteOutcome::AlreadyExists)
        }
        Err(error) => Err(error.error),
    }
}

/// Writes `contents` through the dangling symlink at `path`.
///
/// The link is followed, so the file is created at its target. The
/// target's directory must already exist.
pub(crate) fn write_through_link(path: &Path, contents: &[u8]) -> io::Result<()> {
    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(FILE_MODE)
        .open(path)?;
    file.write_all(contents)?;
    file.sync_all()
}

/// Whether `path` is a symlink whose target does not exist.
pub(crate) fn is_dangling_link(path: &Path) -> bool {
    let is_link = std::fs::symlink_metadata(path)
        .is_ok_and(|metadata| metadata.file_type().is_symlink());
    is_link
        && std::fs::metadata(path).is_err_and(|error| error.kind() == io::ErrorKind::NotFound)
}
