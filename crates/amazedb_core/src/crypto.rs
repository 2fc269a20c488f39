//! Encryption at rest for group files and export packages.
//!
//! Every group file, and every export package, is a single **token**:
//!
//! ```text
//! base64url( version (1) || nonce (12) || ciphertext || tag (16) )
//! ```
//!
//! ## Security Model
//!
//! - AES-256-GCM authenticated encryption
//! - A fresh random nonce for every token
//! - The version byte is bound as associated data, so it cannot be altered
//! - Keys are zeroized on drop and redacted from `Debug` output
//!
//! ## Usage
//!
//! ```
//! use amazedb_core::crypto::{CryptoManager, EncryptionKey};
//!
//! let manager = CryptoManager::new(EncryptionKey::generate());
//! let token = manager.seal(b"[]").unwrap();
//! assert_eq!(manager.open(&token).unwrap(), b"[]");
//! ```

use crate::error::{CoreError, CoreResult};
use aes_gcm::{
    aead::{generic_array::GenericArray, Aead, KeyInit, Payload},
    Aes256Gcm, Nonce,
};
use base64::{engine::general_purpose::URL_SAFE, Engine as _};
use rand::RngCore;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Size of the AES-256 key in bytes.
pub const KEY_SIZE: usize = 32;
/// Size of the GCM nonce in bytes.
pub const NONCE_SIZE: usize = 12;
/// Size of the GCM authentication tag in bytes.
pub const TAG_SIZE: usize = 16;
/// Current token format version.
pub const TOKEN_VERSION: u8 = 1;

/// Encryption key for AES-256-GCM.
///
/// One key is issued per database and shared by all of its groups.
/// The key is automatically zeroized when dropped.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct EncryptionKey {
    bytes: [u8; KEY_SIZE],
}

impl EncryptionKey {
    /// Generates a new random encryption key.
    #[must_use]
    pub fn generate() -> Self {
        let mut bytes = [0u8; KEY_SIZE];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self { bytes }
    }

    /// Creates a key from raw bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes slice is not exactly 32 bytes.
    pub fn from_bytes(bytes: &[u8]) -> CoreResult<Self> {
        if bytes.len() != KEY_SIZE {
            return Err(CoreError::invalid_key(format!(
                "expected {KEY_SIZE} bytes, got {}",
                bytes.len()
            )));
        }

        let mut key_bytes = [0u8; KEY_SIZE];
        key_bytes.copy_from_slice(bytes);
        Ok(Self { bytes: key_bytes })
    }

    /// Parses a key from its URL-safe base64 text form.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not base64 or has the wrong length.
    pub fn from_base64(text: &str) -> CoreResult<Self> {
        let mut decoded = URL_SAFE
            .decode(text.trim())
            .map_err(|e| CoreError::invalid_key(e.to_string()))?;
        let key = Self::from_bytes(&decoded);
        decoded.zeroize();
        key
    }

    /// Returns the URL-safe base64 text form of this key.
    ///
    /// # Security
    ///
    /// The result is the key itself; don't log it.
    #[must_use]
    pub fn to_base64(&self) -> String {
        URL_SAFE.encode(self.bytes)
    }

    /// Returns the key as a byte slice.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.bytes
    }
}

impl PartialEq for EncryptionKey {
    fn eq(&self, other: &Self) -> bool {
        self.bytes == other.bytes
    }
}

impl Eq for EncryptionKey {}

impl std::fmt::Debug for EncryptionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncryptionKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

/// Manages encryption and decryption operations under one key.
pub struct CryptoManager {
    key: EncryptionKey,
    cipher: Aes256Gcm,
}

impl CryptoManager {
    /// Creates a new crypto manager with the given key.
    #[must_use]
    pub fn new(key: EncryptionKey) -> Self {
        // EncryptionKey is always exactly KEY_SIZE bytes, AES-256's key size.
        let cipher = Aes256Gcm::new(GenericArray::from_slice(key.as_bytes()));
        Self { key, cipher }
    }

    /// Returns the key this manager encrypts with.
    #[must_use]
    pub fn key(&self) -> &EncryptionKey {
        &self.key
    }

    /// Encrypts plaintext into a versioned text token.
    ///
    /// # Errors
    ///
    /// Returns an error if encryption fails.
    pub fn seal(&self, plaintext: &[u8]) -> CoreResult<Vec<u8>> {
        let aad = [TOKEN_VERSION];
        let sealed = self.encrypt_with_aad(plaintext, &aad)?;

        let mut raw = Vec::with_capacity(1 + sealed.len());
        raw.push(TOKEN_VERSION);
        raw.extend(sealed);

        Ok(URL_SAFE.encode(raw).into_bytes())
    }

    /// Decrypts a token produced by [`seal`](Self::seal).
    ///
    /// # Errors
    ///
    /// Returns `DecryptionFailed` if the token is not base64, has an unknown
    /// version, is truncated, or fails authentication (wrong key or
    /// tampered content). No partially decrypted data is ever returned.
    pub fn open(&self, token: &[u8]) -> CoreResult<Vec<u8>> {
        let raw = URL_SAFE
            .decode(token.trim_ascii())
            .map_err(|_| CoreError::decryption_failed("token is not valid base64"))?;

        let Some((&version, sealed)) = raw.split_first() else {
            return Err(CoreError::decryption_failed("token is empty"));
        };
        if version != TOKEN_VERSION {
            return Err(CoreError::decryption_failed(format!(
                "unsupported token version: {version}"
            )));
        }

        self.decrypt_with_aad(sealed, &[version])
    }

    /// Encrypts with associated data, which is authenticated but not
    /// encrypted. Output: `nonce (12) || ciphertext || tag (16)`.
    fn encrypt_with_aad(&self, plaintext: &[u8], aad: &[u8]) -> CoreResult<Vec<u8>> {
        let mut nonce_bytes = [0u8; NONCE_SIZE];
        rand::thread_rng().fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let payload = Payload {
            msg: plaintext,
            aad,
        };

        let ciphertext = self
            .cipher
            .encrypt(nonce, payload)
            .map_err(|_| CoreError::encryption_failed("encryption error"))?;

        let mut result = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        result.extend_from_slice(&nonce_bytes);
        result.extend(ciphertext);

        Ok(result)
    }

    /// Reverses `encrypt_with_aad`; the same associated data must be given.
    fn decrypt_with_aad(&self, ciphertext: &[u8], aad: &[u8]) -> CoreResult<Vec<u8>> {
        if ciphertext.len() < NONCE_SIZE + TAG_SIZE {
            return Err(CoreError::decryption_failed("ciphertext too short"));
        }

        let nonce = Nonce::from_slice(&ciphertext[..NONCE_SIZE]);
        let payload = Payload {
            msg: &ciphertext[NONCE_SIZE..],
            aad,
        };

        self.cipher
            .decrypt(nonce, payload)
            .map_err(|_| CoreError::decryption_failed("authentication failed: wrong key or tampered data"))
    }
}

impl std::fmt::Debug for CryptoManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CryptoManager")
            .field("cipher", &"Aes256Gcm")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_key() {
        let key1 = EncryptionKey::generate();
        let key2 = EncryptionKey::generate();
        assert_ne!(key1.as_bytes(), key2.as_bytes());
    }

    #[test]
    fn key_wrong_size() {
        assert!(EncryptionKey::from_bytes(&[0u8; 16]).is_err());
        assert!(EncryptionKey::from_bytes(&[0u8; 64]).is_err());
    }

    #[test]
    fn key_base64_text_form() {
        let key = EncryptionKey::from_bytes(&[7u8; KEY_SIZE]).unwrap();
        let text = key.to_base64();
        assert_eq!(EncryptionKey::from_base64(&text).unwrap(), key);
        assert!(matches!(
            EncryptionKey::from_base64("not base64!"),
            Err(CoreError::InvalidKey { .. })
        ));
    }

    #[test]
    fn key_debug_is_redacted() {
        let key = EncryptionKey::from_bytes(&[9u8; KEY_SIZE]).unwrap();
        let debug = format!("{key:?}");
        assert!(debug.contains("REDACTED"));
        assert!(!debug.contains(&key.to_base64()));
    }

    #[test]
    fn seal_open_roundtrip() {
        let manager = CryptoManager::new(EncryptionKey::generate());
        let token = manager.seal(br#"[{"a":1}]"#).unwrap();

        assert!(token.iter().all(u8::is_ascii));
        assert_eq!(manager.open(&token).unwrap(), br#"[{"a":1}]"#);
    }

    #[test]
    fn seal_produces_different_tokens() {
        let manager = CryptoManager::new(EncryptionKey::generate());
        assert_ne!(manager.seal(b"same").unwrap(), manager.seal(b"same").unwrap());
    }

    #[test]
    fn open_with_wrong_key_fails() {
        let token = CryptoManager::new(EncryptionKey::generate())
            .seal(b"secret")
            .unwrap();
        let other = CryptoManager::new(EncryptionKey::generate());

        assert!(matches!(
            other.open(&token),
            Err(CoreError::DecryptionFailed { .. })
        ));
    }

    #[test]
    fn open_tampered_token_fails() {
        let manager = CryptoManager::new(EncryptionKey::generate());
        let token = manager.seal(b"data").unwrap();

        let mut raw = URL_SAFE.decode(&token).unwrap();
        let last = raw.len() - 1;
        raw[last] ^= 0xFF;
        let tampered = URL_SAFE.encode(raw).into_bytes();

        assert!(matches!(
            manager.open(&tampered),
            Err(CoreError::DecryptionFailed { .. })
        ));
    }

    #[test]
    fn open_rejects_other_version() {
        let manager = CryptoManager::new(EncryptionKey::generate());
        let token = manager.seal(b"data").unwrap();

        let mut raw = URL_SAFE.decode(&token).unwrap();
        raw[0] = 2;
        let rewritten = URL_SAFE.encode(raw).into_bytes();

        assert!(matches!(
            manager.open(&rewritten),
            Err(CoreError::DecryptionFailed { .. })
        ));
    }

    #[test]
    fn open_garbage_fails() {
        let manager = CryptoManager::new(EncryptionKey::generate());
        assert!(manager.open(b"").is_err());
        assert!(manager.open(b"%%%").is_err());
        assert!(manager.open(URL_SAFE.encode([1u8; 8]).as_bytes()).is_err());
    }

    #[test]
    fn token_layout() {
        let manager = CryptoManager::new(EncryptionKey::generate());
        let token = manager.seal(b"Hello, AmazeDB!").unwrap();

        let raw = URL_SAFE.decode(&token).unwrap();
        assert_eq!(raw[0], TOKEN_VERSION);
        assert_eq!(raw.len(), 1 + NONCE_SIZE + 15 + TAG_SIZE);
    }
}
