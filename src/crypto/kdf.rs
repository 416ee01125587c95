use sha2::{Digest, Sha512, digest::Output};
use zeroize::{Zeroize, Zeroizing};

use super::KEY_LEN;
use crate::error::Result;

/// SHA-512 state that is wiped when dropped.
///
/// The hasher buffers the tail of `password || salt` internally and has no
/// `Drop` of its own.
struct WipingSha512(Sha512);

impl Drop for WipingSha512 {
    fn drop(&mut self) {
        // SAFETY:
        // - Sha512 is plain integer state (chaining values, block counter,
        //   block buffer and its position) with no pointers and no Drop impl
        // - All-zero bytes are a valid value for every one of those fields
        // - The slice covers exactly the value and is not used past this call
        let bytes = unsafe {
            std::slice::from_raw_parts_mut(
                (&mut self.0 as *mut Sha512).cast::<u8>(),
                std::mem::size_of::<Sha512>(),
            )
        };
        bytes.zeroize();
    }
}

/// Derive an AES-256 key from a password and salt.
///
/// The key is the first 32 bytes of `SHA-512(password || salt)`. This is a
/// single hash pass with no work factor, kept so existing export files stay
/// readable.
pub fn derive_key(password: &str, salt: &[u8]) -> Result<Zeroizing<[u8; KEY_LEN]>> {
    let mut hasher = WipingSha512(Sha512::new());
    hasher.0.update(password.as_bytes());
    hasher.0.update(salt);

    let mut digest = Output::<Sha512>::default();
    hasher.0.finalize_into_reset(&mut digest);
    drop(hasher);

    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    key.copy_from_slice(&digest[..KEY_LEN]);
    digest.as_mut_slice().zeroize();

    Ok(key)
}
