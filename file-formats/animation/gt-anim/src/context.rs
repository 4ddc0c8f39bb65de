//! The per-instance evaluation context

use std::sync::Arc;

use glam::Vec3;
use log::trace;

use crate::animation::AnimationLibrary;
use crate::error::Result;
use crate::playback::{AnimationState, PlaybackConfig, TickEvents};
use crate::pose::{Pose, PoseOptions};
use crate::skeleton::Skeleton;

/// Everything needed to animate one character
///
/// The skeleton and clip library are shared; the playback state and pose
/// buffers belong to this instance. Several contexts can share one
/// skeleton and library and be evaluated independently.
#[derive(Debug, Clone)]
pub struct RigContext {
    skeleton: Arc<Skeleton>,
    library: Arc<AnimationLibrary>,
    state: AnimationState,
    pose: Pose,
    options: PoseOptions,
}

impl RigContext {
    /// Create an idle context holding the bind pose
    pub fn new(
        skeleton: Arc<Skeleton>,
        library: Arc<AnimationLibrary>,
        config: PlaybackConfig,
        options: PoseOptions,
    ) -> Self {
        let mut pose = Pose::new(&skeleton);
        pose.evaluate(&skeleton, None, 0.0, &options);
        Self {
            skeleton,
            library,
            state: AnimationState::new(config),
            pose,
            options,
        }
    }

    /// Shared skeleton
    pub fn skeleton(&self) -> &Arc<Skeleton> {
        &self.skeleton
    }

    /// Shared clip library
    pub fn library(&self) -> &Arc<AnimationLibrary> {
        &self.library
    }

    /// Playback state
    pub fn state(&self) -> &AnimationState {
        &self.state
    }

    /// Playback state, mutable (sequence list, config changes)
    pub fn state_mut(&mut self) -> &mut AnimationState {
        &mut self.state
    }

    /// Current pose buffers
    pub fn pose(&self) -> &Pose {
        &self.pose
    }

    /// Pose composition options
    pub fn options(&self) -> &PoseOptions {
        &self.options
    }

    /// Start playing a clip by library index
    pub fn play(&mut self, index: usize) -> Result<()> {
        self.state.play(index, &self.library)
    }

    /// Start playing a clip by name
    pub fn play_named(&mut self, name: &str) -> Result<()> {
        self.state.play_named(name, &self.library)
    }

    /// Object-space offset accumulated by root motion
    pub fn root_offset(&self) -> Vec3 {
        self.state.root_motion().offset()
    }

    /// Stop playback and return every buffer to the bind pose
    pub fn reset_to_bind_pose(&mut self) {
        self.state.stop();
        self.pose.evaluate(&self.skeleton, None, 0.0, &self.options);
    }

    /// Advance by `delta` seconds and recompute the skinning palette
    ///
    /// Runs playback, then samples the clip into local transforms, applies
    /// root motion to bone 0, composes global transforms and finally the
    /// skinning matrices.
    pub fn tick(&mut self, delta: f32) -> TickEvents {
        let events = self.state.advance(delta, &self.library);
        self.evaluate();
        events
    }

    /// Jump to `time` in the current clip and evaluate there
    pub fn seek(&mut self, time: f32) {
        self.state.seek(time, &self.library);
        self.evaluate();
    }

    /// Recompute the pose at the current time without advancing
    pub fn evaluate(&mut self) {
        let skeleton = &self.skeleton;
        self.pose.reset_to_bind_pose(skeleton);

        if let Some(clip) = self.state.current_clip(&self.library) {
            let time = self.state.time();
            self.pose.sample_clip(skeleton, clip, time, &self.options);

            if self.state.config().root_motion {
                let reference = clip
                    .track(0)
                    .and_then(|track| track.sample(time))
                    .and_then(|sample| self.state.root_motion_mut().accumulate(sample.translation));
                if let Some(reference) = reference {
                    self.pose.set_local_translation(0, reference);
                    trace!("Root offset now {:?}", self.state.root_motion().offset());
                }
            }
        }

        self.pose.update_global(skeleton);
        self.pose.update_skin(skeleton);
    }
}
