//! Producers and consumers of plaintext settings snapshots.
//!
//! The codec never looks inside a snapshot. Whatever dumps the browser's
//! bookmarks, domain settings and preferences hands over bytes through
//! [`ExportSource`]; whatever restores them takes bytes through
//! [`ImportSink`].

use zeroize::{Zeroize, Zeroizing};

use crate::error::Result;
use crate::storage::Storage;

/// Supplies the plaintext snapshot to export.
pub trait ExportSource {
    fn export_snapshot(&self) -> Result<Zeroizing<Vec<u8>>>;
}

/// Receives a decrypted snapshot to import.
pub trait ImportSink {
    fn import_snapshot(&mut self, snapshot: &[u8]) -> Result<()>;
}

impl ExportSource for [u8] {
    fn export_snapshot(&self) -> Result<Zeroizing<Vec<u8>>> {
        Ok(Zeroizing::new(self.to_vec()))
    }
}

impl ImportSink for Vec<u8> {
    fn import_snapshot(&mut self, snapshot: &[u8]) -> Result<()> {
        self.zeroize();
        self.extend_from_slice(snapshot);
        Ok(())
    }
}

/// A plaintext snapshot file, such as an unencrypted database export.
#[derive(Clone, Debug)]
pub struct SnapshotFile {
    storage: Storage,
}

impl SnapshotFile {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }
}

impl ExportSource for SnapshotFile {
    fn export_snapshot(&self) -> Result<Zeroizing<Vec<u8>>> {
        self.storage.load().map(Zeroizing::new)
    }
}

impl ImportSink for SnapshotFile {
    fn import_snapshot(&mut self, snapshot: &[u8]) -> Result<()> {
        self.storage.save(snapshot)
    }
}
