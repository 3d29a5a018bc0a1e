// File: ./src/storage.rs
use anyhow::Result;
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use uuid::Uuid;

pub struct LocalStorage;

impl LocalStorage {
    /// Atomic write: Write to .tmp file then rename
    pub fn atomic_write<P: AsRef<Path>, C: AsRef<[u8]>>(path: P, contents: C) -> Result<()> {
        let path = path.as_ref();
        let tmp_path = path.with_extension("tmp");
        let written = fs::write(&tmp_path, contents).and_then(|_| fs::rename(&tmp_path, path));
        if written.is_err() {
            let _ = fs::remove_file(&tmp_path);
        }
        Ok(written?)
    }

    fn lock_path(path: &Path) -> PathBuf {
        path.with_extension("lock")
    }

    /// Runs `f` while holding an exclusive advisory lock next to `path`.
    pub fn with_lock<T, F>(path: &Path, f: F) -> Result<T>
    where
        F: FnOnce() -> Result<T>,
    {
        let lock_file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(Self::lock_path(path))?;
        lock_file.lock_exclusive()?;
        let result = f();
        // Unlock explicitly; dropping the handle would also release it.
        let _ = FileExt::unlock(&lock_file);
        result
    }

    /// True if `dir` exists (creating it if needed) and this process can
    /// create files in it, checked by creating and removing a scratch file.
    pub fn ensure_writable_dir(dir: &Path) -> Result<bool> {
        if !dir.exists() {
            match fs::create_dir_all(dir) {
                Err(e) if is_access_refusal(&e) => return Ok(false),
                other => other?,
            }
        }
        let meta = fs::metadata(dir)?;
        if !meta.is_dir() || meta.permissions().readonly() {
            return Ok(false);
        }

        let scratch = dir.join(format!(".pdfcal-{}.check", Uuid::new_v4()));
        let created = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&scratch);
        let granted = create_outcome(created)?;
        if granted {
            let _ = fs::remove_file(&scratch);
        }
        Ok(granted)
    }
}

fn is_access_refusal(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::PermissionDenied | io::ErrorKind::ReadOnlyFilesystem
    )
}

/// Maps the result of creating a scratch file to "may write here".
fn create_outcome(created: io::Result<File>) -> io::Result<bool> {
    match created {
        Ok(_) => Ok(true),
        Err(e) if is_access_refusal(&e) => Ok(false),
        Err(e) => Err(e),
    }
}
