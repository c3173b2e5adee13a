//! Error types for kit codec operations

use crate::control::Control;
use crate::constants::VOICE_MARKER;

/// Errors that can occur while decoding, editing or encoding a kit
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KitError {
    /// Buffer length does not match any admissible total
    #[error("Malformed record ({len} bytes): {reason}")]
    MalformedRecord {
        /// Length of the rejected buffer or region.
        len: usize,
        /// What did not match.
        reason: String,
    },

    /// Marker bytes absent or corrupted inside a voice region
    #[error("Marker mismatch in voice {voice}: expected {expected:?}, got {found:?}")]
    MarkerMismatch {
        /// Index (0-3) of the voice whose marker failed.
        voice: usize,
        /// The bytes found at the marker offset.
        found: [u8; 4],
        /// The marker that was expected.
        expected: [u8; 4],
    },

    /// A control value outside its admissible range
    #[error("Value {value} out of range for {control} ({min}..={max})", min = .control.min(), max = .control.max())]
    OutOfRange {
        /// The control that was written.
        control: Control,
        /// The rejected value.
        value: i32,
    },

    /// Storage-layer failure while reading or writing a kit file
    #[error("Source unavailable: {path}: {reason}")]
    SourceUnavailable {
        /// Path that could not be accessed.
        path: String,
        /// Underlying I/O error message.
        reason: String,
    },

    /// Voice index outside 0-3
    #[error("Invalid voice index {0}: must be 0-3")]
    InvalidVoiceIndex(usize),

    /// Header length outside the observed range
    #[error("Invalid header length {len}: must be 47-59 bytes")]
    InvalidHeader {
        /// The rejected header length.
        len: usize,
    },

    /// Control name that does not match any hardware control
    #[error("Unknown control: {0}")]
    UnknownControl(String),
}

impl KitError {
    /// Build a marker mismatch for `voice` from the bytes found in its region
    pub(crate) fn marker_mismatch(voice: usize, found: &[u8]) -> Self {
        let mut bytes = [0u8; 4];
        let n = found.len().min(bytes.len());
        bytes[..n].copy_from_slice(&found[..n]);
        KitError::MarkerMismatch {
            voice,
            found: bytes,
            expected: *VOICE_MARKER,
        }
    }

    /// Wrap an I/O failure on `path`
    pub fn source_unavailable(path: impl AsRef<std::path::Path>, err: std::io::Error) -> Self {
        KitError::SourceUnavailable {
            path: path.as_ref().display().to_string(),
            reason: err.to_string(),
        }
    }
}
