//! Asset Pipeline Tests
//!
//! Tests for:
//! - Encrypt/decrypt round trips and the authenticated-failure contract
//! - Tamper and truncation detection
//! - Decryption progress reporting
//! - Model ingestion rejecting malformed input
//! - The async load pipeline's loading-signal protocol

use vitrine::assets::crypto::{self, IV_LEN, TAG_LEN};
use vitrine::assets::{
    load_encrypted_model, AssetReader, FileAssetReader, LoadingSignal, ModelIngestor,
};
use vitrine::errors::VitrineError;

const PASSWORD: &str = "desk-scene-2024";

fn test_iv() -> [u8; IV_LEN] {
    let mut iv = [0u8; IV_LEN];
    for (i, byte) in iv.iter_mut().enumerate() {
        *byte = (i as u8).wrapping_mul(37).wrapping_add(11);
    }
    iv
}

// ============================================================================
// Crypto
// ============================================================================

#[test]
fn round_trip_recovers_plaintext() -> anyhow::Result<()> {
    let plaintext: Vec<u8> = (0..u8::MAX).cycle().take(200_000).collect();
    let encrypted = crypto::encrypt(&plaintext, PASSWORD, test_iv());

    assert_eq!(encrypted.len(), IV_LEN + plaintext.len() + TAG_LEN);
    let decrypted = crypto::decrypt(&encrypted, PASSWORD)?;
    assert_eq!(decrypted, plaintext);
    Ok(())
}

#[test]
fn empty_plaintext_round_trips() {
    let encrypted = crypto::encrypt(&[], PASSWORD, test_iv());
    assert_eq!(encrypted.len(), IV_LEN + TAG_LEN);
    assert!(crypto::decrypt(&encrypted, PASSWORD).expect("round trip").is_empty());
}

#[test]
fn wrong_password_fails_loudly() {
    let encrypted = crypto::encrypt(b"binary model payload", PASSWORD, test_iv());
    let err = crypto::decrypt(&encrypted, "not-the-password").unwrap_err();
    assert!(matches!(err, VitrineError::Decryption(_)));
    // Error text never leaks either password.
    let message = err.to_string();
    assert!(!message.contains(PASSWORD));
    assert!(!message.contains("not-the-password"));
}

#[test]
fn tampered_ciphertext_is_rejected() {
    let mut encrypted = crypto::encrypt(b"binary model payload", PASSWORD, test_iv());
    let mid = IV_LEN + 4;
    encrypted[mid] ^= 0x01;
    assert!(matches!(
        crypto::decrypt(&encrypted, PASSWORD),
        Err(VitrineError::Decryption(_))
    ));
}

#[test]
fn tampered_iv_is_rejected() {
    let mut encrypted = crypto::encrypt(b"binary model payload", PASSWORD, test_iv());
    encrypted[0] ^= 0xff;
    assert!(matches!(
        crypto::decrypt(&encrypted, PASSWORD),
        Err(VitrineError::Decryption(_))
    ));
}

#[test]
fn truncated_input_is_rejected() {
    let encrypted = crypto::encrypt(b"binary model payload", PASSWORD, test_iv());
    // Chopping off part of the tag still leaves enough bytes to pass the
    // length check, so this exercises tag verification proper.
    assert!(matches!(
        crypto::decrypt(&encrypted[..encrypted.len() - 8], PASSWORD),
        Err(VitrineError::Decryption(_))
    ));
    // Shorter than IV + tag fails the structural check.
    assert!(matches!(
        crypto::decrypt(&encrypted[..IV_LEN + TAG_LEN - 1], PASSWORD),
        Err(VitrineError::Decryption(_))
    ));
}

#[test]
fn decrypt_progress_is_monotonic_and_completes() {
    let plaintext = vec![0xa5u8; 300_000];
    let encrypted = crypto::encrypt(&plaintext, PASSWORD, test_iv());

    let mut reports: Vec<f32> = Vec::new();
    let decrypted = crypto::decrypt_with_progress(&encrypted, PASSWORD, |fraction| {
        reports.push(fraction);
    })
    .expect("round trip");
    assert_eq!(decrypted, plaintext);

    assert!(!reports.is_empty());
    assert!(reports.windows(2).all(|w| w[1] >= w[0]));
    assert_eq!(*reports.last().unwrap(), 1.0);
}

// ============================================================================
// Model ingestion
// ============================================================================

#[test]
fn garbage_bytes_are_malformed_not_a_panic() {
    let err = ModelIngestor::parse(b"definitely not gltf").unwrap_err();
    assert!(matches!(err, VitrineError::MalformedAsset(_)));
}

#[test]
fn truncated_glb_header_is_malformed() {
    // Valid magic, then nothing.
    let err = ModelIngestor::parse(b"glTF").unwrap_err();
    assert!(matches!(err, VitrineError::MalformedAsset(_)));
}

// ============================================================================
// Load pipeline signal protocol
// ============================================================================

#[derive(Default)]
struct RecordingSignal {
    progress: Vec<f32>,
    loaded: u32,
    failed: u32,
    cleared: u32,
}

impl LoadingSignal for RecordingSignal {
    fn report_progress(&mut self, percent: f32) {
        self.progress.push(percent);
    }
    fn loaded(&mut self) {
        self.loaded += 1;
    }
    fn failed(&mut self, _message: &str) {
        self.failed += 1;
    }
    fn clear(&mut self) {
        self.cleared += 1;
    }
}

fn temp_path(name: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!("vitrine-test-{}-{name}", std::process::id()))
}

#[tokio::test]
async fn file_reader_resolves_uris_against_its_root() -> anyhow::Result<()> {
    let name = format!("vitrine-test-{}-reader.bin", std::process::id());
    let path = std::env::temp_dir().join(&name);
    tokio::fs::write(&path, b"blob").await?;

    let reader = FileAssetReader::new(std::env::temp_dir());
    let bytes = reader.read_bytes(&name).await?;
    tokio::fs::remove_file(&path).await.ok();

    assert_eq!(bytes, b"blob");
    assert!(matches!(
        reader.read_bytes("vitrine-test-no-such-asset.bin").await,
        Err(VitrineError::Io(_))
    ));
    Ok(())
}

#[tokio::test]
async fn missing_file_signals_failed_exactly_once() {
    let mut signal = RecordingSignal::default();
    let result =
        load_encrypted_model(temp_path("does-not-exist.bin"), PASSWORD, &mut signal).await;

    assert!(result.is_err());
    assert_eq!(signal.failed, 1);
    assert_eq!(signal.loaded, 0);
    assert_eq!(signal.cleared, 0);
}

#[tokio::test]
async fn wrong_password_signals_failed_exactly_once() {
    let path = temp_path("wrong-password.bin");
    let encrypted = crypto::encrypt(b"payload", PASSWORD, test_iv());
    tokio::fs::write(&path, &encrypted).await.expect("write fixture");

    let mut signal = RecordingSignal::default();
    let result = load_encrypted_model(&path, "wrong", &mut signal).await;
    tokio::fs::remove_file(&path).await.ok();

    assert!(matches!(result, Err(VitrineError::Decryption(_))));
    assert_eq!(signal.failed, 1);
    assert_eq!(signal.loaded, 0);
}

#[tokio::test]
async fn decrypted_garbage_fails_at_ingestion() {
    // The tag verifies, so the pipeline reaches the parser and fails there.
    let path = temp_path("not-a-model.bin");
    let encrypted = crypto::encrypt(b"authenticated but not a model", PASSWORD, test_iv());
    tokio::fs::write(&path, &encrypted).await.expect("write fixture");

    let mut signal = RecordingSignal::default();
    let result = load_encrypted_model(&path, PASSWORD, &mut signal).await;
    tokio::fs::remove_file(&path).await.ok();

    assert!(matches!(result, Err(VitrineError::MalformedAsset(_))));
    assert_eq!(signal.failed, 1);
    assert_eq!(signal.loaded, 0);

    // Read and decrypt stages still reported progress before the failure.
    assert!(signal.progress.iter().any(|&p| p > 0.0));
    assert!(signal.progress.iter().all(|&p| (0.0..=100.0).contains(&p)));
}
