//! Password-based encryption of settings snapshots.

use std::path::Path;

use log::{debug, warn};
use zeroize::Zeroizing;

use crate::crypto;
use crate::error::Result;
use crate::format::{self, EncryptedBlob};
use crate::snapshot::{ExportSource, ImportSink, SnapshotFile};
use crate::storage::Storage;

/// Converts between plaintext snapshots and password-protected exports.
///
/// Every call derives a fresh key from a fresh salt and IV. Nothing is kept
/// between calls. Keys, hasher state and cipher key schedules are wiped
/// before returning.
#[derive(Debug, Clone, Copy, Default)]
pub struct SettingsCodec;

impl SettingsCodec {
    /// Encrypts `plaintext` into `salt || iv || ciphertext || tag`.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Crypto`](crate::CodecError::Crypto) if the random generator or cipher fails.
    pub fn encrypt(plaintext: &[u8], password: &str) -> Result<Vec<u8>> {
        let salt = crypto::generate_salt()?;
        let key = crypto::derive_key(password, &salt[..])?;
        let iv = crypto::generate_iv()?;

        let ciphertext = crypto::encrypt(&key, &iv, plaintext)?;
        drop(key);

        let blob = EncryptedBlob::new(*salt, *iv, ciphertext);
        debug!("encrypted {} byte snapshot", plaintext.len());

        Ok(format::serialize(&blob))
    }

    /// Decrypts an encrypted export and verifies its tag.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Format`](crate::CodecError::Format) if `data` is shorter than 44 bytes and
    /// [`CodecError::Authentication`](crate::CodecError::Authentication) if the password is wrong or the data
    /// was modified.
    pub fn decrypt(data: &[u8], password: &str) -> Result<Zeroizing<Vec<u8>>> {
        let blob = format::parse(data)?;
        let key = crypto::derive_key(password, blob.salt())?;

        match crypto::decrypt(&key, blob.iv(), blob.ciphertext()) {
            Ok(plaintext) => {
                debug!("decrypted {} byte snapshot", plaintext.len());
                Ok(plaintext)
            }
            Err(e) => {
                if e.is_authentication() {
                    warn!("tag verification failed for {} byte export", data.len());
                }
                Err(e)
            }
        }
    }

    /// Pulls a snapshot from `source` and writes the encrypted export to `dest`.
    pub fn export<S>(source: &S, password: &str, dest: &Storage) -> Result<()>
    where
        S: ExportSource + ?Sized,
    {
        let plaintext = source.export_snapshot()?;
        let encrypted = Self::encrypt(&plaintext, password)?;
        dest.save(&encrypted)
    }

    /// Decrypts the export in `src` and hands the snapshot to `sink`.
    ///
    /// The sink is not touched unless decryption fully succeeds.
    pub fn import<K>(src: &Storage, password: &str, sink: &mut K) -> Result<()>
    where
        K: ImportSink + ?Sized,
    {
        let encrypted = src.load()?;
        let plaintext = Self::decrypt(&encrypted, password)?;
        sink.import_snapshot(&plaintext)
    }

    /// Encrypts the snapshot file at `src` into `dst`.
    pub fn encrypt_file(src: &Path, dst: &Path, password: &str) -> Result<()> {
        let source = SnapshotFile::new(Storage::new(src));
        Self::export(&source, password, &Storage::new(dst))
    }

    /// Decrypts the export at `src` into the snapshot file `dst`.
    pub fn decrypt_file(src: &Path, dst: &Path, password: &str) -> Result<()> {
        let mut sink = SnapshotFile::new(Storage::new(dst));
        Self::import(&Storage::new(src), password, &mut sink)
    }
}

/// Checks the layout of an export without decrypting it.
pub fn inspect(data: &[u8]) -> Result<format::BlobInfo> {
    format::parse(data).map(|blob| blob.info())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{IV_LEN, SALT_LEN, TAG_LEN};
    use crate::error::CodecError;
    use std::fs;
    use tempfile::tempdir;

    const SNAPSHOT: &[u8] = b"settings-snapshot-v1";
    const PASSWORD: &str = "correct horse battery staple";

    #[test]
    fn known_snapshot_roundtrip() {
        let encrypted = SettingsCodec::encrypt(SNAPSHOT, PASSWORD).unwrap();
        assert_eq!(encrypted.len(), SALT_LEN + IV_LEN + SNAPSHOT.len() + TAG_LEN);

        let plaintext = SettingsCodec::decrypt(&encrypted, PASSWORD).unwrap();
        assert_eq!(&plaintext[..], SNAPSHOT);
    }

    #[test]
    fn wrong_password_fails_authentication() {
        let encrypted = SettingsCodec::encrypt(SNAPSHOT, PASSWORD).unwrap();

        match SettingsCodec::decrypt(&encrypted, "wrong") {
            Err(CodecError::Authentication) => {}
            other => panic!("expected Authentication, got: {:?}", other.map(|p| p.len())),
        }
    }

    #[test]
    fn roundtrip_and_wrong_password_across_lengths() {
        let large: Vec<u8> = (0..64 * 1024 + 7).map(|i| (i * 31 % 251) as u8).collect();
        let inputs: Vec<Vec<u8>> = vec![
            vec![0x5a],
            vec![0xff; 15],
            (0..16).collect(),
            vec![0u8; 17],
            large,
        ];

        for plaintext in &inputs {
            let encrypted = SettingsCodec::encrypt(plaintext, PASSWORD).unwrap();
            assert_eq!(encrypted.len(), SALT_LEN + IV_LEN + plaintext.len() + TAG_LEN);

            let decrypted = SettingsCodec::decrypt(&encrypted, PASSWORD).unwrap();
            assert_eq!(&decrypted[..], &plaintext[..], "len {}", plaintext.len());

            let err = SettingsCodec::decrypt(&encrypted, "wrong").unwrap_err();
            assert!(err.is_authentication(), "len {}", plaintext.len());
        }
    }

    #[test]
    fn any_flipped_bit_is_detected() {
        let encrypted = SettingsCodec::encrypt(SNAPSHOT, PASSWORD).unwrap();

        for byte in SALT_LEN + IV_LEN..encrypted.len() {
            for bit in 0..8 {
                let mut tampered = encrypted.clone();
                tampered[byte] ^= 1 << bit;

                let err = SettingsCodec::decrypt(&tampered, PASSWORD).unwrap_err();
                assert!(err.is_authentication(), "byte {byte} bit {bit}");
            }
        }
    }

    #[test]
    fn flipped_salt_or_iv_is_detected() {
        let encrypted = SettingsCodec::encrypt(SNAPSHOT, PASSWORD).unwrap();

        for byte in [0, SALT_LEN - 1, SALT_LEN, SALT_LEN + IV_LEN - 1] {
            let mut tampered = encrypted.clone();
            tampered[byte] ^= 0x80;
            assert!(SettingsCodec::decrypt(&tampered, PASSWORD).unwrap_err().is_authentication());
        }
    }

    #[test]
    fn truncated_input_is_format_error() {
        for len in [0, 10, 43] {
            let err = SettingsCodec::decrypt(&vec![0u8; len], PASSWORD).unwrap_err();
            assert!(matches!(err, CodecError::Format(_)), "len {len}");
        }
    }

    #[test]
    fn header_only_input_fails_authentication() {
        let err = SettingsCodec::decrypt(&[0u8; 44], PASSWORD).unwrap_err();
        assert!(err.is_authentication());
    }

    #[test]
    fn encryption_is_randomized() {
        let a = SettingsCodec::encrypt(SNAPSHOT, PASSWORD).unwrap();
        let b = SettingsCodec::encrypt(SNAPSHOT, PASSWORD).unwrap();

        assert_ne!(a[..SALT_LEN], b[..SALT_LEN]);
        assert_ne!(a[SALT_LEN..SALT_LEN + IV_LEN], b[SALT_LEN..SALT_LEN + IV_LEN]);
        assert_ne!(a[SALT_LEN + IV_LEN..], b[SALT_LEN + IV_LEN..]);
    }

    #[test]
    fn empty_snapshot_roundtrip() {
        let encrypted = SettingsCodec::encrypt(b"", PASSWORD).unwrap();
        assert_eq!(encrypted.len(), SALT_LEN + IV_LEN + TAG_LEN);

        assert!(SettingsCodec::decrypt(&encrypted, PASSWORD).unwrap().is_empty());
    }

    #[test]
    fn empty_password_roundtrip() {
        let encrypted = SettingsCodec::encrypt(SNAPSHOT, "").unwrap();
        assert_eq!(&SettingsCodec::decrypt(&encrypted, "").unwrap()[..], SNAPSHOT);
    }

    #[test]
    fn export_and_import_through_collaborators() {
        let dir = tempdir().unwrap();
        let export = Storage::new(dir.path().join("settings.enc"));

        SettingsCodec::export(SNAPSHOT, PASSWORD, &export).unwrap();

        let mut restored = Vec::new();
        SettingsCodec::import(&export, PASSWORD, &mut restored).unwrap();
        assert_eq!(restored, SNAPSHOT);
    }

    #[test]
    fn failed_import_leaves_sink_untouched() {
        let dir = tempdir().unwrap();
        let export = Storage::new(dir.path().join("settings.enc"));
        SettingsCodec::export(SNAPSHOT, PASSWORD, &export).unwrap();

        let mut restored = b"previous".to_vec();
        let err = SettingsCodec::import(&export, "wrong", &mut restored).unwrap_err();

        assert!(err.is_authentication());
        assert_eq!(restored, b"previous");
    }

    #[test]
    fn file_roundtrip() {
        let dir = tempdir().unwrap();
        let plain = dir.path().join("settings.db");
        let encrypted = dir.path().join("settings.enc");
        let restored = dir.path().join("restored.db");
        fs::write(&plain, SNAPSHOT).unwrap();

        SettingsCodec::encrypt_file(&plain, &encrypted, PASSWORD).unwrap();
        SettingsCodec::decrypt_file(&encrypted, &restored, PASSWORD).unwrap();

        assert_eq!(fs::read(restored).unwrap(), SNAPSHOT);
    }

    #[test]
    fn failed_decrypt_file_leaves_no_output() {
        let dir = tempdir().unwrap();
        let encrypted = dir.path().join("settings.enc");
        let restored = dir.path().join("restored.db");
        fs::write(&encrypted, SettingsCodec::encrypt(SNAPSHOT, PASSWORD).unwrap()).unwrap();

        assert!(SettingsCodec::decrypt_file(&encrypted, &restored, "wrong").is_err());

        let entries: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec!["settings.enc"]);
    }

    #[test]
    fn missing_source_is_io_error() {
        let dir = tempdir().unwrap();
        let err = SettingsCodec::encrypt_file(
            &dir.path().join("none.db"),
            &dir.path().join("out.enc"),
            PASSWORD,
        )
        .unwrap_err();

        assert!(matches!(err, CodecError::Io { .. }));
        assert!(!dir.path().join("out.enc").exists());
    }

    #[test]
    fn inspect_reports_layout() {
        let encrypted = SettingsCodec::encrypt(SNAPSHOT, PASSWORD).unwrap();
        let info = inspect(&encrypted).unwrap();

        assert_eq!(info.plaintext_len, Some(SNAPSHOT.len()));
        assert!(inspect(&[0u8; 3]).is_err());
    }
}
