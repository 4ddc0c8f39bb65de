//! Animation clips
//!
//! Clips are imported against a canonical [`Skeleton`](crate::Skeleton):
//! tracks in the asset name their bone by import id and are stored here by
//! canonical index, so sampling never needs a lookup.

mod clip;
mod import;
mod interpolation;

pub use clip::{AnimationClip, AnimationLibrary, BoneTrack, Keyframe};
pub use import::{KEYFRAME_SIZE, import_clip};
pub use interpolation::{TrackSample, find_bracket};
