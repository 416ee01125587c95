//! Password-protected export and import of browser settings snapshots.
//!
//! An export file is `salt (32) || iv (12) || AES-256-GCM ciphertext || tag (16)`,
//! keyed by the first 32 bytes of `SHA-512(password || salt)`.
//!
//! ```no_run
//! use settings_codec::SettingsCodec;
//!
//! let encrypted = SettingsCodec::encrypt(b"snapshot", "hunter2")?;
//! let plaintext = SettingsCodec::decrypt(&encrypted, "hunter2")?;
//! assert_eq!(&plaintext[..], b"snapshot");
//! # Ok::<(), settings_codec::CodecError>(())
//! ```

mod codec;
pub mod crypto;
mod error;
pub mod format;
mod snapshot;
mod storage;

pub use crate::codec::{SettingsCodec, inspect};
pub use crate::error::{CodecError, Result};
pub use crate::format::{BlobInfo, EncryptedBlob};
pub use crate::snapshot::{ExportSource, ImportSink, SnapshotFile};
pub use crate::storage::Storage;
