//! File access for snapshots and encrypted exports.

use crate::crypto::aead::secure_random;
use crate::error::{CodecError, Result};
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// A file on disk that is read whole and replaced atomically.
#[derive(Clone, Debug)]
pub struct Storage {
    path: PathBuf,
}

impl Storage {
    /// Creates a new Storage instance with the given path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns `true` if the storage file exists.
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Loads the entire file into memory.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Io`] if the file cannot be read.
    pub fn load(&self) -> Result<Vec<u8>> {
        fs::read(&self.path)
            .map_err(|e| CodecError::io(format!("failed to read {}", self.path.display()), e))
    }

    /// Saves data to the file using atomic write.
    ///
    /// Data goes to a temporary file with a random name in the same
    /// directory, which is synced and then renamed over the target. The
    /// parent directory is synced afterwards so the rename is persisted.
    ///
    /// If the call fails or the process dies part way, the target holds
    /// either its previous content or nothing; never a partial write.
    ///
    /// Creates parent directories if they don't exist.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Io`] if the file cannot be written.
    pub fn save(&self, data: &[u8]) -> Result<()> {
        if let Some(parent) = self.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                CodecError::io(format!("failed to create {}", parent.display()), e)
            })?;
        }

        let tmp_path = self.random_tmp_path()?;

        if let Err(e) = write_synced(&tmp_path, data) {
            let _ = fs::remove_file(&tmp_path);
            return Err(CodecError::io("failed to write temporary file", e));
        }

        if let Err(e) = self.atomic_replace(&tmp_path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e);
        }

        // The target is already replaced; syncing the directory is best effort
        // since directory handles cannot be opened or fsynced on every platform.
        if let Some(dir) = self.parent().and_then(|p| File::open(p).ok()) {
            let _ = dir.sync_all();
        }

        log::debug!("wrote {} bytes to {}", data.len(), self.path.display());
        Ok(())
    }

    /// Returns the path to the storage file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn parent(&self) -> Option<&Path> {
        self.path.parent().filter(|p| !p.as_os_str().is_empty())
    }

    /// Generates a unique temporary file path in the same directory.
    ///
    /// Format: `filename.tmp.<randomhex>`
    fn random_tmp_path(&self) -> Result<PathBuf> {
        let mut buf = [0u8; 8]; // 64 bit entropy
        secure_random(&mut buf)?;

        let rand_string = buf.iter().map(|b| format!("{:02x}", b)).collect::<String>();

        let file_name = self.path.file_name().ok_or_else(|| {
            CodecError::io(
                format!("{} is not a file path", self.path.display()),
                std::io::Error::from(std::io::ErrorKind::InvalidInput),
            )
        })?;

        let tmp_name = format!("{}.tmp.{}", file_name.to_string_lossy(), rand_string);

        Ok(self.path.with_file_name(tmp_name))
    }

    /// Atomically replaces the target file with the temporary file.
    ///
    /// Uses Windows `ReplaceFileW` API with `REPLACEFILE_WRITE_THROUGH` flag
    /// when the target exists; `ReplaceFileW` refuses a missing target.
    #[cfg(target_os = "windows")]
    fn atomic_replace(&self, tmp_path: &Path) -> Result<()> {
        use std::ffi::OsStr;
        use std::os::windows::ffi::OsStrExt;
        use windows_sys::Win32::Storage::FileSystem::{REPLACEFILE_WRITE_THROUGH, ReplaceFileW};

        if !self.path.exists() {
            return fs::rename(tmp_path, &self.path)
                .map_err(|e| CodecError::io("atomic replace failed", e));
        }

        fn to_wide(s: &OsStr) -> Vec<u16> {
            s.encode_wide().chain(std::iter::once(0)).collect()
        }

        let target_w = to_wide(self.path.as_os_str());
        let tmp_w = to_wide(tmp_path.as_os_str());

        // SAFETY:
        // - Strings are valid UTF-16 and null-terminated
        // - Pointers remain valid during the call
        // - Windows does not retain the pointers after return
        let result = unsafe {
            ReplaceFileW(
                target_w.as_ptr(),
                tmp_w.as_ptr(),
                std::ptr::null(),
                REPLACEFILE_WRITE_THROUGH,
                std::ptr::null(),
                std::ptr::null(),
            )
        };

        if result == 0 {
            let err = std::io::Error::last_os_error();
            return Err(CodecError::io("atomic replace failed", err));
        }

        Ok(())
    }

    /// Atomically replaces the target file with the temporary file.
    ///
    /// On Unix, `rename()` is atomic when both paths are on the same filesystem.
    #[cfg(not(target_os = "windows"))]
    fn atomic_replace(&self, tmp_path: &Path) -> Result<()> {
        fs::rename(tmp_path, &self.path).map_err(|e| CodecError::io("atomic replace failed", e))
    }
}

fn write_synced(path: &Path, data: &[u8]) -> std::io::Result<()> {
    // fail if the temp name is already taken
    let mut file = OpenOptions::new().write(true).create_new(true).open(path)?;
    file.write_all(data)?;
    file.sync_all()
}
