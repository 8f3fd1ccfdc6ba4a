//! Atomic replacement of runtime files.

use std::io::{self, Write};
use std::path::Path;

use tempfile::Builder;

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

/// Replaces `path` with `contents` so readers never see a partial file.
///
/// The data is synced before the temporary file is renamed into place.
pub(super) fn atomic_write(path: &Path, contents: &[u8]) -> io::Result<()> {
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
            .unwrap_or(env!("CARGO_PKG_NAME")),
    );
    #[cfg(unix)]
    builder.permissions(std::fs::Permissions::from_mode(0o600));

    let mut file = builder.tempfile_in(directory)?;
    file.write_all(contents)?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|error| error.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaces_existing_contents() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("nexusd.health");
        std::fs::write(&path, b"old and longer").expect("seed file");

        atomic_write(&path, b"new").expect("atomic write");

        assert_eq!(std::fs::read(&path).expect("read back"), b"new");
        let leftovers = std::fs::read_dir(dir.path()).expect("list dir").count();
        assert_eq!(leftovers, 1, "temporary file should be renamed away");
    }

    #[cfg(unix)]
    #[test]
    fn written_files_are_private() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("nexusd.pid");

        atomic_write(&path, b"42\n").expect("atomic write");

        let mode = std::fs::metadata(&path).expect("metadata").permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
