use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::Path;

fn reject_symlink(path: &Path) -> io::Result<()> {
    let metadata = fs::symlink_metadata(path)?;
    if metadata.file_type().is_symlink() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("refusing to follow symlink: {}", path.display()),
        ));
    }
    Ok(())
}

/// Opens `path` for reading.
///
/// With `follow_symlinks` unset, a symlink at `path` is rejected instead of
/// being resolved, so callers that already decided to skip symlinks cannot be
/// raced into reading through one.
pub fn safe_open_file(path: &Path, follow_symlinks: bool) -> io::Result<File> {
    if !follow_symlinks {
        reject_symlink(path)?;
    }
    File::open(path)
}

/// Creates (or truncates) `path` for writing, creating missing parent directories.
pub fn safe_create_file(path: &Path, follow_symlinks: bool) -> io::Result<File> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    if !follow_symlinks {
        match reject_symlink(path) {
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            result => result?,
        }
    }

    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
}
