//! Just-in-time asset decryption.
//!
//! The encrypted model file is laid out as a 16-byte IV, the ciphertext,
//! and a trailing HMAC-SHA256 tag over (IV ‖ ciphertext). The tag makes a
//! wrong password fail loudly instead of yielding plausible garbage.
//!
//! This is a deliberately weak, obscurity-only scheme: the password ships
//! inside the client. Its goal is casual deterrence, not confidentiality
//! against a motivated attacker.

use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

use crate::errors::{Result, VitrineError};

type HmacSha256 = Hmac<Sha256>;

/// Length of the initialization-vector prefix.
pub const IV_LEN: usize = 16;
/// Length of the trailing authentication tag.
pub const TAG_LEN: usize = 32;

const KEYSTREAM_BLOCK: usize = 32;

fn derive_key(password: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hasher.finalize().into()
}

fn new_mac(key: &[u8; 32]) -> HmacSha256 {
    HmacSha256::new_from_slice(key).expect("HMAC can take key of any size")
}

fn keystream_block(key: &[u8; 32], iv: &[u8], counter: u64) -> [u8; KEYSTREAM_BLOCK] {
    let mut mac = new_mac(key);
    mac.update(iv);
    mac.update(&counter.to_le_bytes());
    mac.finalize().into_bytes().into()
}

fn apply_keystream(key: &[u8; 32], iv: &[u8], data: &mut [u8], mut progress: impl FnMut(f32)) {
    let total = data.len();
    for (counter, chunk) in data.chunks_mut(KEYSTREAM_BLOCK).enumerate() {
        let block = keystream_block(key, iv, counter as u64);
        for (byte, k) in chunk.iter_mut().zip(block.iter()) {
            *byte ^= k;
        }
        // Report roughly every 64 KiB to keep the callback cheap.
        if counter % 2048 == 0 {
            progress(((counter * KEYSTREAM_BLOCK) as f32 / total.max(1) as f32).min(1.0));
        }
    }
    progress(1.0);
}

/// Decrypts an encrypted asset, verifying its authentication tag first.
///
/// # Errors
///
/// [`VitrineError::Decryption`] when the input is shorter than the IV and
/// tag, or the tag does not verify (wrong password, tampered IV, truncated
/// or corrupted ciphertext). Error messages never include the password.
pub fn decrypt(encrypted: &[u8], password: &str) -> Result<Vec<u8>> {
    decrypt_with_progress(encrypted, password, |_| {})
}

/// Like [`decrypt`], reporting fractional progress in `[0, 1]` along the way.
pub fn decrypt_with_progress(
    encrypted: &[u8],
    password: &str,
    mut progress: impl FnMut(f32),
) -> Result<Vec<u8>> {
    if encrypted.len() < IV_LEN + TAG_LEN {
        return Err(VitrineError::Decryption(format!(
            "input too short: {} bytes, need at least {}",
            encrypted.len(),
            IV_LEN + TAG_LEN
        )));
    }

    let (iv, rest) = encrypted.split_at(IV_LEN);
    let (ciphertext, tag) = rest.split_at(rest.len() - TAG_LEN);

    let key = derive_key(password);

    let mut mac = new_mac(&key);
    mac.update(iv);
    mac.update(ciphertext);
    mac.verify_slice(tag)
        .map_err(|_| VitrineError::Decryption("ciphertext authentication failed".to_string()))?;

    let mut plaintext = ciphertext.to_vec();
    apply_keystream(&key, iv, &mut plaintext, &mut progress);
    Ok(plaintext)
}

/// Encrypts plaintext into the asset layout. The tool side of the pipeline;
/// also exercised by the round-trip tests.
#[must_use]
pub fn encrypt(plaintext: &[u8], password: &str, iv: [u8; IV_LEN]) -> Vec<u8> {
    let key = derive_key(password);

    let mut ciphertext = plaintext.to_vec();
    apply_keystream(&key, &iv, &mut ciphertext, |_| {});

    let mut mac = new_mac(&key);
    mac.update(&iv);
    mac.update(&ciphertext);
    let tag = mac.finalize().into_bytes();

    let mut out = Vec::with_capacity(IV_LEN + ciphertext.len() + TAG_LEN);
    out.extend_from_slice(&iv);
    out.extend_from_slice(&ciphertext);
    out.extend_from_slice(&tag);
    out
}
