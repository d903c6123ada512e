//! Asset pipeline: encrypted fetch, just-in-time decryption and model
//! ingestion.
//!
//! The whole pipeline runs off the render path as the session's single
//! asynchronous boundary. It gates the model-ready signal, never the render
//! loop, which keeps serving placeholder frames while loading is in flight.

pub mod crypto;
pub mod io;
pub mod model;

pub use io::{AssetReader, FileAssetReader};
pub use model::{Model, ModelIngestor};

use std::path::Path;

use crate::errors::Result;

/// Callback interface of the external loading-UI collaborator.
///
/// The core only emits signals; it does not own the loading chrome. On a
/// fatal pipeline error, [`LoadingSignal::failed`] fires exactly once and
/// no `loaded` follows.
pub trait LoadingSignal {
    /// Fractional pipeline progress, `0.0..=100.0` percent.
    fn report_progress(&mut self, percent: f32);
    /// The model is ready for display.
    fn loaded(&mut self);
    /// Terminal failure; the page degrades to its static fallback.
    fn failed(&mut self, message: &str);
    /// Dismiss the loading chrome.
    fn clear(&mut self);
}

/// No-op signal for headless use.
pub struct NullLoadingSignal;

impl LoadingSignal for NullLoadingSignal {
    fn report_progress(&mut self, _percent: f32) {}
    fn loaded(&mut self) {}
    fn failed(&mut self, _message: &str) {}
    fn clear(&mut self) {}
}

// Progress budget split across the pipeline stages.
const READ_SHARE: f32 = 20.0;
const DECRYPT_SHARE: f32 = 60.0;

/// Reads, decrypts and parses an encrypted model file.
///
/// Progress and the terminal loaded/failed state are reported through
/// `signal`. Callers are expected to cache the resulting [`Model`]
/// themselves; repeated invocation re-runs the whole pipeline.
pub async fn load_encrypted_model(
    path: impl AsRef<Path>,
    password: &str,
    signal: &mut dyn LoadingSignal,
) -> Result<Model> {
    let path = path.as_ref();
    let reader = FileAssetReader::new(path.parent().unwrap_or(Path::new(".")));
    let uri = path
        .file_name()
        .and_then(std::ffi::OsStr::to_str)
        .unwrap_or_default();
    load_encrypted_model_with(&reader, uri, password, signal).await
}

/// Like [`load_encrypted_model`], reading through an arbitrary
/// [`AssetReader`].
pub async fn load_encrypted_model_with<R: AssetReader>(
    reader: &R,
    uri: &str,
    password: &str,
    signal: &mut dyn LoadingSignal,
) -> Result<Model> {
    match load_inner(reader, uri, password, signal).await {
        Ok(model) => {
            signal.report_progress(100.0);
            signal.loaded();
            signal.clear();
            Ok(model)
        }
        Err(err) => {
            log::error!("model load failed: {err}");
            signal.failed(&err.to_string());
            Err(err)
        }
    }
}

async fn load_inner<R: AssetReader>(
    reader: &R,
    uri: &str,
    password: &str,
    signal: &mut dyn LoadingSignal,
) -> Result<Model> {
    signal.report_progress(0.0);
    let encrypted = reader.read_bytes(uri).await?;
    signal.report_progress(READ_SHARE);

    let plaintext = crypto::decrypt_with_progress(&encrypted, password, |fraction| {
        signal.report_progress(READ_SHARE + fraction * DECRYPT_SHARE);
    })?;

    ModelIngestor::parse(&plaintext)
}
