//! Skeletal animation runtime for GT rig assets
//!
//! This crate imports skeletons and keyframed animation clips from the GT
//! binary asset formats and evaluates them into per-bone skinning matrices.
//!
//! - Skeletons come in three encodings ([`SkeletonFormat`]) and are sorted so
//!   that every joint's parent precedes it, which lets every later pass be a
//!   single forward loop.
//! - Clips bind their tracks to bones by import id at load time.
//! - A [`RigContext`] owns the per-instance state (playback and pose
//!   buffers) while skeletons and clip libraries are shared through `Arc`.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use gt_anim::{
//!     AnimationLibrary, PlaybackConfig, PoseOptions, RigContext, SkeletonFormat,
//!     load_clip, load_skeleton,
//! };
//!
//! let skeleton = load_skeleton("hero.skel", SkeletonFormat::Flat)?;
//! let walk = load_clip("walk.anim", &skeleton)?;
//!
//! let library: AnimationLibrary = [walk].into_iter().collect();
//! let mut rig = RigContext::new(
//!     Arc::new(skeleton),
//!     Arc::new(library),
//!     PlaybackConfig::default(),
//!     PoseOptions::default(),
//! );
//! rig.play_named("walk")?;
//! rig.tick(1.0 / 60.0);
//!
//! let palette = rig.pose().gpu_data();
//! # Ok::<(), gt_anim::RigError>(())
//! ```

use std::path::Path;

pub mod animation;
pub mod context;
pub mod encode;
pub mod error;
pub mod math;
pub mod playback;
pub mod pose;
pub mod skeleton;
pub mod skinning;
pub mod stream;
pub mod summary;

pub use animation::{AnimationClip, AnimationLibrary, BoneTrack, Keyframe, import_clip};
pub use context::RigContext;
pub use encode::{encode_clip, encode_flat_skeleton};
pub use error::{Result, RigError};
pub use playback::{AnimationState, PlaybackConfig, PlaybackStatus};
pub use pose::{Pose, PoseOptions};
pub use skeleton::{Joint, Skeleton, SkeletonFormat, import_skeleton};
pub use summary::{ClipSummary, SkeletonSummary};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Most joints a skeleton may hold; also the size of the skinning palette
pub const MAX_JOINTS: usize = 128;

/// Most keyframes a single track may hold
pub const MAX_KEYFRAMES: usize = 65_536;

/// Read and import a skeleton file
///
/// The skeleton is named after the file stem when the format stores no name.
pub fn load_skeleton<P: AsRef<Path>>(path: P, format: SkeletonFormat) -> Result<Skeleton> {
    let path = path.as_ref();
    let data = std::fs::read(path)?;
    let skeleton = import_skeleton(&data, format)?;
    if skeleton.name().is_empty() {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        return Ok(skeleton.with_name(stem));
    }
    Ok(skeleton)
}

/// Read and import a clip file against `skeleton`
pub fn load_clip<P: AsRef<Path>>(path: P, skeleton: &Skeleton) -> Result<AnimationClip> {
    let data = std::fs::read(path)?;
    import_clip(&data, skeleton)
}
