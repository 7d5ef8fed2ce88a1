//! Post-conversion handling of the source file.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::types::AfterAction;

/// Apply the configured after-action to a successfully converted source.
pub fn run_after_action(source: &Path, action: &AfterAction) -> io::Result<()> {
    match action {
        AfterAction::Leave => Ok(()),
        AfterAction::Trash => trash::delete(source).map_err(|e| {
            io::Error::new(
                io::ErrorKind::Other,
                format!("Failed to move {} to trash: {}", source.display(), e),
            )
        }),
        AfterAction::MoveTo(folder) => move_to_folder(source, folder),
    }
}

/// Move `source` into `folder`, renaming on collision.
///
/// Does nothing when the source already lives in the folder. A rename can
/// fail across filesystems, so it falls back to copy + delete.
pub fn move_to_folder(source: &Path, folder: &Path) -> io::Result<()> {
    if let (Ok(parent), Ok(target_dir)) = (
        source.parent().map(fs::canonicalize).transpose(),
        fs::canonicalize(folder),
    ) {
        if parent == Some(target_dir) {
            return Ok(());
        }
    }

    let name = source
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "source has no file name"))?;
    let target = collision_free_path(folder, name);

    if fs::rename(source, &target).is_ok() {
        return Ok(());
    }

    move_with_copy(source, &target).map_err(|e| {
        io::Error::new(
            io::ErrorKind::Other,
            format!(
                "Failed to move file from {} to {}: {}",
                source.display(),
                target.display(),
                e
            ),
        )
    })
}

/// First path in `folder` with the given name that does not exist yet,
/// inserting " (2)", " (3)", ... before the extension on collision.
fn collision_free_path(folder: &Path, name: &std::ffi::OsStr) -> PathBuf {
    let candidate = folder.join(name);
    if !candidate.exists() {
        return candidate;
    }

    let name_path = Path::new(name);
    let stem = name_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = name_path.extension().map(|e| e.to_string_lossy().into_owned());

    for i in 2u32.. {
        let numbered = match &ext {
            Some(ext) => format!("{} ({}).{}", stem, i, ext),
            None => format!("{} ({})", stem, i),
        };
        let candidate = folder.join(numbered);
        if !candidate.exists() {
            return candidate;
        }
    }
    unreachable!()
}

/// Copy then delete, removing the partial target if anything fails.
///
/// The target keeps the source's modification time.
fn move_with_copy(source: &Path, target: &Path) -> io::Result<()> {
    let result = copy_with_mtime(source, target).and_then(|_| fs::remove_file(source));
    if result.is_err() {
        let _ = fs::remove_file(target);
    }
    result
}

fn copy_with_mtime(source: &Path, target: &Path) -> io::Result<()> {
    let modified = fs::metadata(source)?.modified()?;
    fs::copy(source, target)?;
    let file = fs::File::options().write(true).open(target)?;
    file.set_times(fs::FileTimes::new().set_modified(modified))
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, SystemTime};

    use super::*;
    use tempfile::tempdir;

    #[test]
    fn moves_file_into_folder() {
        let src_dir = tempdir().unwrap();
        let dst_dir = tempdir().unwrap();
        let source = src_dir.path().join("track.kml");
        fs::write(&source, b"data").unwrap();

        move_to_folder(&source, dst_dir.path()).unwrap();

        assert!(!source.exists());
        assert!(dst_dir.path().join("track.kml").exists());
    }

    #[test]
    fn same_folder_is_a_no_op() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("track.kml");
        fs::write(&source, b"data").unwrap();

        move_to_folder(&source, dir.path()).unwrap();

        assert!(source.exists());
    }

    #[test]
    fn renames_on_collision() {
        let src_dir = tempdir().unwrap();
        let dst_dir = tempdir().unwrap();
        let source = src_dir.path().join("track.kml");
        fs::write(&source, b"new").unwrap();
        fs::write(dst_dir.path().join("track.kml"), b"old").unwrap();
        fs::write(dst_dir.path().join("track (2).kml"), b"older").unwrap();

        move_to_folder(&source, dst_dir.path()).unwrap();

        let moved = dst_dir.path().join("track (3).kml");
        assert!(moved.exists());
        assert_eq!(fs::read(moved).unwrap(), b"new");
    }

    #[test]
    fn collision_rename_without_extension() {
        let src_dir = tempdir().unwrap();
        let dst_dir = tempdir().unwrap();
        let source = src_dir.path().join("track");
        fs::write(&source, b"new").unwrap();
        fs::write(dst_dir.path().join("track"), b"old").unwrap();

        move_to_folder(&source, dst_dir.path()).unwrap();

        assert!(dst_dir.path().join("track (2)").exists());
    }

    #[test]
    fn copy_fallback_keeps_modification_time() {
        let src_dir = tempdir().unwrap();
        let dst_dir = tempdir().unwrap();
        let source = src_dir.path().join("track.kml");
        fs::write(&source, b"data").unwrap();

        let past = SystemTime::UNIX_EPOCH + Duration::from_secs(1_000_000_000);
        let file = fs::File::options().write(true).open(&source).unwrap();
        file.set_times(fs::FileTimes::new().set_modified(past)).unwrap();
        drop(file);

        let target = dst_dir.path().join("track.kml");
        move_with_copy(&source, &target).unwrap();

        assert!(!source.exists());
        assert_eq!(fs::metadata(&target).unwrap().modified().unwrap(), past);
    }

    #[test]
    fn leave_does_nothing() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("track.kml");
        fs::write(&source, b"data").unwrap();

        run_after_action(&source, &AfterAction::Leave).unwrap();

        assert!(source.exists());
    }
}
