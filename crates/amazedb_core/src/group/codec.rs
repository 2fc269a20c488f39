//! Load and save of a group's encrypted document sequence.

use crate::crypto::CryptoManager;
use crate::error::{CoreError, CoreResult};
use amazedb_codec::{from_json, to_json, Document};
use amazedb_storage::{StorageBackend, StorageError};
use tracing::debug;

/// Reads, decrypts, and parses the whole sequence.
///
/// # Errors
///
/// `ResourceNotFound` if the blob is missing, `DecryptionFailed` on a wrong
/// key or tampered content, and a codec error if the plaintext is not an
/// array of documents.
pub(crate) fn load(
    backend: &dyn StorageBackend,
    crypto: &CryptoManager,
) -> CoreResult<Vec<Document>> {
    let token = read_token(backend)?;
    let plaintext = crypto.open(&token)?;
    let documents = from_json(&plaintext)?;
    debug!(location = %backend.location(), count = documents.len(), "loaded group");
    Ok(documents)
}

/// Reads the stored token without opening it.
///
/// # Errors
///
/// `ResourceNotFound` if the blob is missing, or a storage error.
pub(crate) fn read_token(backend: &dyn StorageBackend) -> CoreResult<Vec<u8>> {
    backend.read_all().map_err(|e| match e {
        StorageError::NotFound { location } => CoreError::resource_not_found(location),
        other => other.into(),
    })
}

/// Serializes, encrypts, and replaces the whole sequence.
///
/// # Errors
///
/// Returns an error if encoding, encryption, or the write fails. A failed
/// write leaves the previous content in place.
pub(crate) fn save(
    backend: &mut dyn StorageBackend,
    crypto: &CryptoManager,
    documents: &[Document],
) -> CoreResult<()> {
    let plaintext = to_json(documents)?;
    let token = crypto.seal(&plaintext)?;
    backend.replace(&token)?;
    debug!(location = %backend.location(), count = documents.len(), "saved group");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::EncryptionKey;
    use amazedb_codec::Value;
    use amazedb_storage::InMemoryBackend;

    fn crypto() -> CryptoManager {
        CryptoManager::new(EncryptionKey::generate())
    }

    #[test]
    fn save_then_load() {
        let crypto = crypto();
        let mut backend = InMemoryBackend::new();
        let docs = vec![Document::from([("a", Value::from(1))])];

        save(&mut backend, &crypto, &docs).unwrap();
        assert_eq!(load(&backend, &crypto).unwrap(), docs);
    }

    #[test]
    fn stored_blob_is_not_plaintext() {
        let crypto = crypto();
        let mut backend = InMemoryBackend::new();
        save(&mut backend, &crypto, &[Document::from([("secret", "hunter2")])]).unwrap();

        let raw = backend.data().unwrap();
        assert!(!String::from_utf8_lossy(&raw).contains("hunter2"));
    }

    #[test]
    fn missing_blob_is_resource_not_found() {
        let err = load(&InMemoryBackend::new(), &crypto()).unwrap_err();
        assert!(matches!(err, CoreError::ResourceNotFound { .. }));
    }

    #[test]
    fn wrong_key_is_decryption_failed() {
        let mut backend = InMemoryBackend::new();
        save(&mut backend, &crypto(), &[]).unwrap();

        let err = load(&backend, &crypto()).unwrap_err();
        assert!(matches!(err, CoreError::DecryptionFailed { .. }));
    }

    #[test]
    fn non_array_plaintext_is_codec_error() {
        let crypto = crypto();
        let backend = InMemoryBackend::with_data(crypto.seal(br#"{"a": 1}"#).unwrap());
        assert!(matches!(
            load(&backend, &crypto),
            Err(CoreError::Codec(_))
        ));
    }
}
