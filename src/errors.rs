//! Error Types
//!
//! The main error type [`VitrineError`] covers every failure mode of the
//! character pipeline: asset decryption, model ingestion, bone-group
//! resolution, animation binding and timeline registration.
//!
//! All public APIs return [`Result<T>`], an alias for
//! `std::result::Result<T, VitrineError>`.

use thiserror::Error;

/// The main error type for the vitrine engine.
#[derive(Error, Debug)]
pub enum VitrineError {
    // ========================================================================
    // Asset Pipeline Errors
    // ========================================================================
    /// Key derivation or ciphertext verification failed.
    ///
    /// The message never contains the password that was used.
    #[error("decryption failed: {0}")]
    Decryption(String),

    /// The binary model container (or one of its streams) could not be
    /// decoded, or it violates a structural invariant (e.g. a cyclic
    /// node hierarchy).
    #[error("malformed model asset: {0}")]
    MalformedAsset(String),

    // ========================================================================
    // Animation Errors
    // ========================================================================
    /// A symbolic bone-group name has no definition in the registry.
    #[error("unknown bone group: {0:?}")]
    UnknownBoneGroup(String),

    /// An animation action referenced a clip that does not bind to any
    /// bone of the target skeleton.
    #[error("clip {clip:?} is incompatible with the bound skeleton")]
    IncompatibleClip {
        /// Name of the offending clip
        clip: String,
    },

    /// A keyframe mapping was registered with non-increasing progress
    /// values, or its endpoints are not 0.0 and 1.0.
    #[error("invalid keyframe sequence: {0}")]
    InvalidKeyframeSequence(String),

    // ========================================================================
    // I/O & Parsing Errors
    // ========================================================================
    /// File I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error (bone-group tables).
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<gltf::Error> for VitrineError {
    fn from(err: gltf::Error) -> Self {
        VitrineError::MalformedAsset(err.to_string())
    }
}

/// Alias for `Result<T, VitrineError>`.
pub type Result<T> = std::result::Result<T, VitrineError>;
