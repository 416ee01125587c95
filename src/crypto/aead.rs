use super::{IV_LEN, KEY_LEN, SALT_LEN};
use crate::error::{CodecError, Result};
use aes_gcm::{
    Aes256Gcm, Key, Nonce,
    aead::{Aead, KeyInit},
};
use getrandom::fill;
use zeroize::Zeroizing;

/// Fill buffer with cryptographically secure random bytes
pub(crate) fn secure_random(buf: &mut [u8]) -> Result<()> {
    fill(buf).map_err(|e| CodecError::Crypto(format!("OS random generator unavailable: {e}")))
}

/// Generate salt
pub fn generate_salt() -> Result<Zeroizing<[u8; SALT_LEN]>> {
    let mut salt = Zeroizing::new([0u8; SALT_LEN]);
    secure_random(&mut salt[..])?;
    Ok(salt)
}

/// Generate a fresh 96-bit GCM nonce
pub fn generate_iv() -> Result<Zeroizing<[u8; IV_LEN]>> {
    let mut iv = Zeroizing::new([0u8; IV_LEN]);
    secure_random(&mut iv[..])?;
    Ok(iv)
}

/// Encrypt plaintext, returning ciphertext with the 16-byte tag appended
pub fn encrypt(key: &[u8; KEY_LEN], iv: &[u8; IV_LEN], plaintext: &[u8]) -> Result<Vec<u8>> {
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));

    cipher
        .encrypt(Nonce::from_slice(iv), plaintext)
        .map_err(|_| CodecError::Crypto("encryption failed".into()))
}

/// Decrypt and verify ciphertext with its trailing tag
pub fn decrypt(key: &[u8; KEY_LEN], iv: &[u8; IV_LEN], ciphertext: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));

    let plaintext = cipher
        .decrypt(Nonce::from_slice(iv), ciphertext)
        .map_err(|_| CodecError::Authentication)?;
    Ok(Zeroizing::new(plaintext))
}
