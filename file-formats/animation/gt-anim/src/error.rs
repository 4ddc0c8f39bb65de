use std::io;
use thiserror::Error;

/// Error types for skeleton and animation clip import
#[derive(Error, Debug)]
pub enum RigError {
    /// I/O error while reading an asset from disk
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Bad magic number or unsupported version
    #[error("Format error in {asset}: {reason}")]
    Format {
        /// Kind of asset being imported
        asset: &'static str,
        /// What did not match
        reason: String,
    },

    /// A joint, track or keyframe count exceeds the fixed capacity
    #[error("Capacity exceeded: {what} count {count} exceeds limit {limit}")]
    CapacityExceeded {
        /// Which count overflowed
        what: &'static str,
        /// Count found in the asset
        count: usize,
        /// Maximum supported count
        limit: usize,
    },

    /// Data that is structurally inconsistent (lengths, links, singular matrices)
    #[error("Corrupt data: {0}")]
    CorruptData(String),

    /// An animation track or vertex references a bone the skeleton does not have
    #[error("Missing bone: import id {import_id} is not part of skeleton '{skeleton}'")]
    MissingBone {
        /// Import id that could not be resolved
        import_id: u32,
        /// Name of the target skeleton
        skeleton: String,
    },

    /// Playback asked for a clip the library does not hold
    #[error("Clip not found: {0}")]
    ClipNotFound(String),
}

impl RigError {
    /// Shorthand for a magic number mismatch
    pub(crate) fn bad_magic(asset: &'static str, expected: u32, found: u32) -> Self {
        Self::Format {
            asset,
            reason: format!("expected magic {expected:#010x}, found {found:#010x}"),
        }
    }

    /// Shorthand for an unsupported version
    pub(crate) fn bad_version(asset: &'static str, expected: u32, found: u32) -> Self {
        Self::Format {
            asset,
            reason: format!("unsupported version {found}, expected {expected}"),
        }
    }
}

/// Result type using RigError
pub type Result<T> = std::result::Result<T, RigError>;
