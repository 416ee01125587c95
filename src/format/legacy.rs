//! Legacy headerless export format.
//!
//! ```text
//! SALT (32) | IV (12) | CIPHERTEXT | TAG (16)
//! ```

use super::EncryptedBlob;
use crate::{
    crypto::{IV_LEN, SALT_LEN},
    error::{CodecError, Result},
};

pub const HEADER_LEN: usize = SALT_LEN + IV_LEN;

/// Parses a legacy encrypted file.
///
/// # Errors
///
/// Returns an error if the file is shorter than [`HEADER_LEN`].
pub fn parse(data: &[u8]) -> Result<EncryptedBlob> {
    if data.len() < HEADER_LEN {
        return Err(CodecError::Format(format!(
            "truncated encrypted file ({} bytes, need at least {HEADER_LEN})",
            data.len()
        )));
    }

    let (salt, rest) = data.split_at(SALT_LEN);
    let (iv, ciphertext) = rest.split_at(IV_LEN);

    let salt: [u8; SALT_LEN] = salt
        .try_into()
        .map_err(|_| CodecError::Format("invalid salt length".into()))?;
    let iv: [u8; IV_LEN] = iv
        .try_into()
        .map_err(|_| CodecError::Format("invalid iv length".into()))?;

    Ok(EncryptedBlob::new(salt, iv, ciphertext.to_vec()))
}

/// Serializes a blob to legacy format bytes.
pub fn serialize(blob: &EncryptedBlob) -> Vec<u8> {
    let mut buf = Vec::with_capacity(HEADER_LEN + blob.ciphertext().len());

    buf.extend_from_slice(blob.salt());
    buf.extend_from_slice(blob.iv());
    buf.extend_from_slice(blob.ciphertext());

    buf
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_is_salt_iv_ciphertext() {
        let blob = EncryptedBlob::new([1u8; SALT_LEN], [2u8; IV_LEN], vec![3u8; 20]);

        let bytes = serialize(&blob);
        assert_eq!(bytes.len(), HEADER_LEN + 20);
        assert!(bytes[..SALT_LEN].iter().all(|b| *b == 1));
        assert!(bytes[SALT_LEN..HEADER_LEN].iter().all(|b| *b == 2));
        assert!(bytes[HEADER_LEN..].iter().all(|b| *b == 3));

        let parsed = parse(&bytes).unwrap();
        assert_eq!(parsed.salt(), blob.salt());
        assert_eq!(parsed.iv(), blob.iv());
        assert_eq!(parsed.ciphertext(), blob.ciphertext());
    }

    #[test]
    fn exactly_header_length_parses_with_empty_ciphertext() {
        let parsed = parse(&[0u8; HEADER_LEN]).unwrap();
        assert!(parsed.ciphertext().is_empty());
    }

    #[test]
    fn too_short_fails() {
        for len in [0, 1, SALT_LEN, HEADER_LEN - 1] {
            let err = parse(&vec![0u8; len]).unwrap_err();
            assert!(matches!(err, CodecError::Format(_)));
            assert!(err.to_string().contains("truncated encrypted file"));
        }
    }
}
