//! Per-instance pose buffers
//!
//! A [`Pose`] holds everything that changes from tick to tick for one
//! animated instance: local transforms, global transforms and the skinning
//! palette. The skeleton and clips it reads from stay shared and immutable.
//!
//! One evaluation is three passes over the joints in canonical order:
//! [`Pose::sample_clip`] writes local transforms, [`Pose::update_global`]
//! composes them down the hierarchy and [`Pose::update_skin`] combines them
//! with the inverse bind poses.

use glam::{Mat4, Vec3};

use crate::MAX_JOINTS;
use crate::animation::AnimationClip;
use crate::math::{compose_tr, to_gpu, translation_of};
use crate::skeleton::Skeleton;

/// Options for local transform composition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoseOptions {
    /// Prepend the bind-pose local translation to sampled non-root bones
    ///
    /// With this set, a non-root bone's local transform is
    /// `T(bind offset) * T(sampled) * R(sampled)` while a root bone gets
    /// `T(sampled) * R(sampled)`. Clearing it gives every bone the root form.
    ///
    /// The asymmetry matches how existing assets were authored and is kept
    /// on by default until it is confirmed for new content.
    pub prepend_bind_offset_to_non_root: bool,
}

impl Default for PoseOptions {
    fn default() -> Self {
        Self {
            prepend_bind_offset_to_non_root: true,
        }
    }
}

/// Local, global and skinning matrices of one animated instance
#[derive(Debug, Clone, PartialEq)]
pub struct Pose {
    local: Vec<Mat4>,
    global: Vec<Mat4>,
    skin: Vec<Mat4>,
}

impl Pose {
    /// Create buffers for `skeleton`, initialised to its bind pose
    ///
    /// The skinning palette has [`MAX_JOINTS`] entries, all identity until
    /// the first [`update_skin`](Self::update_skin).
    pub fn new(skeleton: &Skeleton) -> Self {
        let joints = skeleton.joints();
        Self {
            local: joints.iter().map(|j| j.local_bind).collect(),
            global: joints.iter().map(|j| j.global_bind).collect(),
            skin: vec![Mat4::IDENTITY; MAX_JOINTS],
        }
    }

    /// Local transforms in canonical order
    pub fn local(&self) -> &[Mat4] {
        &self.local
    }

    /// Global transforms in canonical order
    pub fn global(&self) -> &[Mat4] {
        &self.global
    }

    /// Skinning palette indexed by import id
    pub fn skin(&self) -> &[Mat4] {
        &self.skin
    }

    /// Skinning matrix for the bone with this import id
    pub fn skin_matrix(&self, import_id: u32) -> Option<&Mat4> {
        self.skin.get(import_id as usize)
    }

    /// Put every local transform back to the bind pose
    pub fn reset_to_bind_pose(&mut self, skeleton: &Skeleton) {
        for (local, joint) in self.local.iter_mut().zip(skeleton.joints()) {
            *local = joint.local_bind;
        }
    }

    /// Write local transforms for every bone with keyframes in `clip`
    ///
    /// Bones with an empty (or missing) track are not touched, so call
    /// [`reset_to_bind_pose`](Self::reset_to_bind_pose) first for a clean
    /// evaluation.
    pub fn sample_clip(
        &mut self,
        skeleton: &Skeleton,
        clip: &AnimationClip,
        time: f32,
        options: &PoseOptions,
    ) {
        for (i, (local, joint)) in self.local.iter_mut().zip(skeleton.joints()).enumerate() {
            let Some(sample) = clip.track(i).and_then(|track| track.sample(time)) else {
                continue;
            };

            let animated = compose_tr(sample.translation, sample.rotation);
            *local = if options.prepend_bind_offset_to_non_root && !joint.is_root() {
                Mat4::from_translation(translation_of(&joint.local_bind)) * animated
            } else {
                animated
            };
        }
    }

    /// Replace the translation of one local transform, keeping its rotation
    pub fn set_local_translation(&mut self, index: usize, translation: Vec3) {
        if let Some(local) = self.local.get_mut(index) {
            local.w_axis = translation.extend(1.0);
        }
    }

    /// Compose global transforms in one forward pass
    pub fn update_global(&mut self, skeleton: &Skeleton) {
        for (i, joint) in skeleton.joints().iter().enumerate().take(self.local.len()) {
            self.global[i] = match joint.parent_index() {
                Some(p) => self.global[p] * self.local[i],
                None => self.local[i],
            };
        }
    }

    /// Compute `skin[import_id] = global * inverse_bind` for every joint
    pub fn update_skin(&mut self, skeleton: &Skeleton) {
        for (global, joint) in self.global.iter().zip(skeleton.joints()) {
            if let Some(slot) = self.skin.get_mut(joint.import_id as usize) {
                *slot = *global * joint.inverse_bind;
            }
        }
    }

    /// Full evaluation: reset, sample, compose, skin
    ///
    /// `None` evaluates the bind pose.
    pub fn evaluate(
        &mut self,
        skeleton: &Skeleton,
        clip: Option<&AnimationClip>,
        time: f32,
        options: &PoseOptions,
    ) {
        self.reset_to_bind_pose(skeleton);
        if let Some(clip) = clip {
            self.sample_clip(skeleton, clip, time, options);
        }
        self.update_global(skeleton);
        self.update_skin(skeleton);
    }

    /// Skinning palette flattened to column-major floats for upload
    pub fn gpu_data(&self) -> Vec<f32> {
        let mut data = Vec::with_capacity(self.skin.len() * 16);
        for matrix in &self.skin {
            data.extend_from_slice(&to_gpu(matrix));
        }
        data
    }
}
