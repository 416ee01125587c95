//! Cryptographic primitives for the settings codec.
//!
//! Provides randomness, key derivation, and AES-256-GCM encryption.

pub mod aead;
pub mod kdf;

pub use aead::{decrypt, encrypt, generate_iv, generate_salt};
pub use kdf::derive_key;

/// Length of the salt (32 bytes).
pub const SALT_LEN: usize = 32;
/// Length of the IV (12 bytes / 96-bit GCM nonce).
pub const IV_LEN: usize = 12;
/// Length of the encryption key (32 bytes / 256 bits).
pub const KEY_LEN: usize = 32;
/// Length of the GCM authentication tag (16 bytes / 128 bits).
pub const TAG_LEN: usize = 16;
