//! CDN envelope decryption
//!
//! The CDN answers info requests with a base64 blob. Decoded, the first 16
//! bytes are the CBC IV and the remainder is AES-128 ciphertext with PKCS#7
//! padding, wrapping a JSON document.

use crate::{Error, Result};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use cbc::cipher::{BlockDecryptMut, KeyIvInit, block_padding::Pkcs7};
use serde::de::DeserializeOwned;

type Aes128CbcDec = cbc::Decryptor<aes::Aes128>;

const BLOCK_SIZE: usize = 16;

/// Decrypt an envelope into raw plaintext bytes
pub fn decrypt_envelope(envelope: &str, key: &[u8; 16]) -> Result<Vec<u8>> {
    // Upstream sometimes line-wraps the blob
    let compact: String = envelope.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        return Err(Error::decryption("envelope is empty"));
    }

    let raw = STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| Error::decryption(format!("invalid base64: {}", e)))?;

    if raw.len() < BLOCK_SIZE * 2 {
        return Err(Error::decryption(format!(
            "envelope too short: {} bytes",
            raw.len()
        )));
    }

    let (iv, ciphertext) = raw.split_at(BLOCK_SIZE);
    if ciphertext.len() % BLOCK_SIZE != 0 {
        return Err(Error::decryption(format!(
            "ciphertext length {} is not a multiple of {}",
            ciphertext.len(),
            BLOCK_SIZE
        )));
    }

    let cipher = Aes128CbcDec::new_from_slices(key, iv)
        .map_err(|e| Error::decryption(format!("failed to initialize AES decryptor: {}", e)))?;

    let mut buffer = ciphertext.to_vec();
    let plaintext_len = cipher
        .decrypt_padded_mut::<Pkcs7>(&mut buffer)
        .map_err(|_| Error::decryption("bad padding (wrong key?)"))?
        .len();
    buffer.truncate(plaintext_len);

    Ok(buffer)
}

/// Decrypt an envelope and parse the plaintext as JSON
pub fn unpack_envelope<T: DeserializeOwned>(envelope: &str, key: &[u8; 16]) -> Result<T> {
    let plaintext = decrypt_envelope(envelope, key)?;
    let text = std::str::from_utf8(&plaintext)
        .map_err(|e| Error::decryption(format!("plaintext is not UTF-8: {}", e)))?;

    serde_json::from_str(text)
        .map_err(|e| Error::decryption(format!("plaintext is not valid JSON: {}", e)))
}
