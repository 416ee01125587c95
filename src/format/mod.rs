//! File format handling for encrypted settings exports.
//!
//! Only the headerless legacy layout exists. It carries no magic bytes or
//! version field, so there is nothing to dispatch on; a future versioned
//! layout would need its own marker and leave [`legacy`] untouched.

use serde::Serialize;
use std::fmt;
use zeroize::Zeroize;

use crate::crypto::{IV_LEN, SALT_LEN, TAG_LEN};
use crate::error::Result;

pub mod legacy;

/// A parsed encrypted settings file.
///
/// The salt and IV are wiped when the blob is dropped.
pub struct EncryptedBlob {
    salt: [u8; SALT_LEN],
    iv: [u8; IV_LEN],
    ciphertext: Vec<u8>,
}

impl Drop for EncryptedBlob {
    fn drop(&mut self) {
        self.salt.zeroize();
        self.iv.zeroize();
    }
}

impl fmt::Debug for EncryptedBlob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncryptedBlob")
            .field("salt_len", &self.salt.len())
            .field("iv_len", &self.iv.len())
            .field("ciphertext_len", &self.ciphertext.len())
            .finish()
    }
}

impl EncryptedBlob {
    pub fn new(salt: [u8; SALT_LEN], iv: [u8; IV_LEN], ciphertext: Vec<u8>) -> Self {
        Self {
            salt,
            iv,
            ciphertext,
        }
    }

    /// Returns the salt used for key derivation.
    pub fn salt(&self) -> &[u8; SALT_LEN] {
        &self.salt
    }

    /// Returns the GCM nonce.
    pub fn iv(&self) -> &[u8; IV_LEN] {
        &self.iv
    }

    /// Returns the ciphertext with its trailing tag.
    pub fn ciphertext(&self) -> &[u8] {
        &self.ciphertext
    }

    pub fn info(&self) -> BlobInfo {
        BlobInfo {
            total_len: legacy::HEADER_LEN + self.ciphertext.len(),
            salt_len: SALT_LEN,
            iv_len: IV_LEN,
            ciphertext_len: self.ciphertext.len(),
            tag_len: TAG_LEN,
            plaintext_len: self.ciphertext.len().checked_sub(TAG_LEN),
        }
    }
}

/// Layout summary of an encrypted file, readable without the password.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct BlobInfo {
    pub total_len: usize,
    pub salt_len: usize,
    pub iv_len: usize,
    pub ciphertext_len: usize,
    pub tag_len: usize,
    /// `None` when the file is too short to hold a tag.
    pub plaintext_len: Option<usize>,
}

impl fmt::Display for BlobInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Format:      legacy (salt || iv || ciphertext || tag)")?;
        writeln!(f, "Total:       {} bytes", self.total_len)?;
        writeln!(f, "Salt:        {} bytes", self.salt_len)?;
        writeln!(f, "IV:          {} bytes", self.iv_len)?;
        writeln!(f, "Ciphertext:  {} bytes (incl. {}-byte tag)", self.ciphertext_len, self.tag_len)?;
        match self.plaintext_len {
            Some(n) => write!(f, "Plaintext:   {n} bytes"),
            None => write!(f, "Plaintext:   unknown (too short for a tag)"),
        }
    }
}

/// Parses an encrypted settings file.
///
/// # Errors
///
/// Returns [`CodecError::Format`](crate::CodecError::Format) if the input is
/// shorter than salt and IV together.
pub fn parse(data: &[u8]) -> Result<EncryptedBlob> {
    legacy::parse(data)
}

/// Serializes an encrypted blob to bytes.
pub fn serialize(blob: &EncryptedBlob) -> Vec<u8> {
    legacy::serialize(blob)
}
