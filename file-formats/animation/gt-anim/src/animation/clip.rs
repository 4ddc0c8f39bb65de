//! Keyframes, per-bone tracks, clips and the clip library

use glam::{Quat, Vec3};

use crate::error::{Result, RigError};

/// A single sampled pose of one bone
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keyframe {
    /// Time in seconds
    pub time: f32,
    /// Local translation
    pub translation: Vec3,
    /// Local rotation
    pub rotation: Quat,
}

impl Keyframe {
    /// Create a keyframe
    pub fn new(time: f32, translation: Vec3, rotation: Quat) -> Self {
        Self {
            time,
            translation,
            rotation,
        }
    }
}

/// Keyframes of one bone, ordered by non-decreasing time
///
/// An empty track means the bone keeps its bind pose.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoneTrack {
    keyframes: Vec<Keyframe>,
}

impl BoneTrack {
    /// Track without keyframes
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a track, rejecting timestamps that go backwards or are not finite
    pub fn new(keyframes: Vec<Keyframe>) -> Result<Self> {
        for (i, key) in keyframes.iter().enumerate() {
            if !key.time.is_finite() {
                return Err(RigError::CorruptData(format!(
                    "keyframe {i} has non-finite time {}",
                    key.time
                )));
            }
        }
        if let Some(i) = keyframes.windows(2).position(|w| w[1].time < w[0].time) {
            return Err(RigError::CorruptData(format!(
                "keyframe {} at {} precedes keyframe {} at {}",
                i + 1,
                keyframes[i + 1].time,
                i,
                keyframes[i].time
            )));
        }
        Ok(Self { keyframes })
    }

    /// Keyframes in time order
    pub fn keyframes(&self) -> &[Keyframe] {
        &self.keyframes
    }

    /// Number of keyframes
    pub fn len(&self) -> usize {
        self.keyframes.len()
    }

    /// True when the bone is not animated
    pub fn is_empty(&self) -> bool {
        self.keyframes.is_empty()
    }

    /// Timestamp of the last keyframe, 0 for an empty track
    pub fn end_time(&self) -> f32 {
        self.keyframes.last().map_or(0.0, |k| k.time)
    }
}

/// An immutable animation, one track per canonical bone
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationClip {
    name: String,
    duration: f32,
    tracks: Vec<BoneTrack>,
}

impl AnimationClip {
    /// Build a clip; the duration is the latest timestamp of any track
    pub fn new(name: impl Into<String>, tracks: Vec<BoneTrack>) -> Self {
        let duration = tracks
            .iter()
            .map(BoneTrack::end_time)
            .fold(0.0f32, f32::max);
        Self {
            name: name.into(),
            duration,
            tracks,
        }
    }

    /// Clip name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Length in seconds
    pub fn duration(&self) -> f32 {
        self.duration
    }

    /// Tracks indexed by canonical bone index
    pub fn tracks(&self) -> &[BoneTrack] {
        &self.tracks
    }

    /// Track of the bone at canonical `index`
    pub fn track(&self, index: usize) -> Option<&BoneTrack> {
        self.tracks.get(index)
    }

    /// Number of bones that carry keyframes
    pub fn animated_bone_count(&self) -> usize {
        self.tracks.iter().filter(|t| !t.is_empty()).count()
    }

    /// Total keyframes across all tracks
    pub fn keyframe_count(&self) -> usize {
        self.tracks.iter().map(BoneTrack::len).sum()
    }
}

/// The set of clips available to a rig
///
/// Built once at load time and shared read-only (usually behind an `Arc`)
/// by every instance that plays from it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnimationLibrary {
    clips: Vec<AnimationClip>,
}

impl AnimationLibrary {
    /// Create an empty library
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a clip, returning its index
    pub fn push(&mut self, clip: AnimationClip) -> usize {
        self.clips.push(clip);
        self.clips.len() - 1
    }

    /// Clip at `index`
    pub fn get(&self, index: usize) -> Option<&AnimationClip> {
        self.clips.get(index)
    }

    /// Index of the first clip named `name`
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.clips.iter().position(|c| c.name() == name)
    }

    /// First clip named `name`
    pub fn by_name(&self, name: &str) -> Option<&AnimationClip> {
        self.index_of(name).and_then(|i| self.get(i))
    }

    /// Number of clips
    pub fn len(&self) -> usize {
        self.clips.len()
    }

    /// True when no clips are loaded
    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    /// Iterate clips in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &AnimationClip> {
        self.clips.iter()
    }
}

impl FromIterator<AnimationClip> for AnimationLibrary {
    fn from_iter<I: IntoIterator<Item = AnimationClip>>(iter: I) -> Self {
        Self {
            clips: iter.into_iter().collect(),
        }
    }
}
