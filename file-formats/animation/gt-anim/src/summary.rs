//! Flat descriptive views of skeletons and clips for reporting

use crate::animation::AnimationClip;
use crate::skeleton::{Skeleton, SkeletonFormat};

/// One row of a [`SkeletonSummary`]
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct JointSummary {
    /// Canonical index
    pub index: usize,
    /// Position in the source asset
    pub import_id: u32,
    /// Joint name
    pub name: String,
    /// Canonical parent index, -1 for a root
    pub parent: i32,
    /// Distance from the root
    pub depth: usize,
    /// Object-space bind translation
    pub bind_translation: [f32; 3],
}

/// Overview of an imported skeleton
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SkeletonSummary {
    /// Skeleton name
    pub name: String,
    /// Source format
    pub format: SkeletonFormat,
    /// Number of joints
    pub joint_count: usize,
    /// Number of root joints
    pub root_count: usize,
    /// Deepest joint depth
    pub max_depth: usize,
    /// Joints in canonical order
    pub joints: Vec<JointSummary>,
}

impl SkeletonSummary {
    /// Summarise `skeleton`
    pub fn new(skeleton: &Skeleton) -> Self {
        let depths = skeleton.depths();
        let joints = skeleton
            .joints()
            .iter()
            .enumerate()
            .map(|(index, joint)| JointSummary {
                index,
                import_id: joint.import_id,
                name: skeleton.joint_name(index).to_string(),
                parent: joint.parent,
                depth: depths[index],
                bind_translation: joint.global_bind.w_axis.truncate().to_array(),
            })
            .collect();

        Self {
            name: skeleton.name().to_string(),
            format: skeleton.format(),
            joint_count: skeleton.len(),
            root_count: skeleton.roots().count(),
            max_depth: depths.iter().copied().max().unwrap_or(0),
            joints,
        }
    }
}

/// One animated bone of a [`ClipSummary`]
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TrackSummary {
    /// Canonical bone index
    pub bone: usize,
    /// Bone name
    pub bone_name: String,
    /// Import id the track is stored under
    pub import_id: u32,
    /// Number of keyframes
    pub keyframes: usize,
    /// First keyframe time
    pub start: f32,
    /// Last keyframe time
    pub end: f32,
}

/// Overview of an imported clip
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ClipSummary {
    /// Clip name
    pub name: String,
    /// Length in seconds
    pub duration: f32,
    /// Bones with keyframes
    pub animated_bones: usize,
    /// Bones of the skeleton
    pub total_bones: usize,
    /// Keyframes across all tracks
    pub keyframes: usize,
    /// Non-empty tracks in canonical bone order
    pub tracks: Vec<TrackSummary>,
}

impl ClipSummary {
    /// Summarise `clip` as bound to `skeleton`
    pub fn new(clip: &AnimationClip, skeleton: &Skeleton) -> Self {
        let tracks = clip
            .tracks()
            .iter()
            .zip(skeleton.joints())
            .enumerate()
            .filter(|(_, (track, _))| !track.is_empty())
            .map(|(bone, (track, joint))| TrackSummary {
                bone,
                bone_name: skeleton.joint_name(bone).to_string(),
                import_id: joint.import_id,
                keyframes: track.len(),
                start: track.keyframes().first().map_or(0.0, |k| k.time),
                end: track.end_time(),
            })
            .collect();

        Self {
            name: clip.name().to_string(),
            duration: clip.duration(),
            animated_bones: clip.animated_bone_count(),
            total_bones: skeleton.len(),
            keyframes: clip.keyframe_count(),
            tracks,
        }
    }
}
