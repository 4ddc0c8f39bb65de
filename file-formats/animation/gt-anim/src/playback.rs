//! Playback state of one animated instance
//!
//! [`AnimationState`] advances time, wraps it when looping, steps through a
//! clip sequence and keeps the root-motion accumulator. It refers to clips
//! by index into a shared [`AnimationLibrary`] and never owns them.
//!
//! Looping handles one wrap per tick. A tick longer than the clip leaves
//! the time outside `[0, duration)` and the next tick wraps again.

use glam::Vec3;
use log::{debug, trace, warn};

use crate::animation::{AnimationClip, AnimationLibrary};
use crate::error::{Result, RigError};

/// Playback settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackConfig {
    /// Time scale; negative plays backwards
    pub speed: f32,
    /// Wrap at either end instead of holding the end pose
    pub looping: bool,
    /// On every wrap, move on to the next clip of the sequence
    pub sequence: bool,
    /// Transfer bone 0's translation into an object-space offset
    pub root_motion: bool,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            speed: 1.0,
            looping: true,
            sequence: false,
            root_motion: false,
        }
    }
}

/// Whether a clip is playing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackStatus {
    /// Holding the bind pose
    #[default]
    Idle,
    /// Sampling the current clip
    Playing,
}

/// What happened during one [`AnimationState::advance`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickEvents {
    /// Time crossed an end of the clip and was wrapped
    pub wrapped: bool,
    /// The current clip changed
    pub clip_changed: bool,
}

/// Root-motion accumulator
///
/// Each tick the change of bone 0's sampled translation since the previous
/// tick is added to `offset`; the bone itself is pinned to the clip's first
/// sample. The baseline restarts whenever playback enters a clip: at the
/// sample for the entry time, which is the clip's end when playing backwards.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RootMotion {
    baseline: Option<Vec3>,
    reference: Option<Vec3>,
    offset: Vec3,
}

impl RootMotion {
    /// First sampled translation of bone 0 in `clip`
    pub fn first_sample(clip: &AnimationClip) -> Option<Vec3> {
        clip.track(0)
            .and_then(|track| track.keyframes().first())
            .map(|key| key.translation)
    }

    /// Restart the baseline at bone 0's sample for `time`
    pub fn reset_baseline(&mut self, clip: &AnimationClip, time: f32) {
        self.reference = Self::first_sample(clip);
        self.baseline = clip
            .track(0)
            .and_then(|track| track.sample(time))
            .map(|sample| sample.translation);
    }

    /// Accumulate the move to `current` and return the translation bone 0 should keep
    ///
    /// `None` when the clip does not animate bone 0.
    pub fn accumulate(&mut self, current: Vec3) -> Option<Vec3> {
        let reference = self.reference?;
        if let Some(baseline) = self.baseline {
            self.offset += current - baseline;
        }
        self.baseline = Some(current);
        Some(reference)
    }

    /// Total object-space offset transferred so far
    pub fn offset(&self) -> Vec3 {
        self.offset
    }

    /// Clear the accumulated offset
    pub fn clear_offset(&mut self) {
        self.offset = Vec3::ZERO;
    }
}

/// Playback state: current clip, time, sequence position and root motion
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AnimationState {
    config: PlaybackConfig,
    status: PlaybackStatus,
    clip: Option<usize>,
    time: f32,
    sequence: Vec<usize>,
    root_motion: RootMotion,
}

impl AnimationState {
    /// Idle state with the given settings
    pub fn new(config: PlaybackConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Current settings
    pub fn config(&self) -> &PlaybackConfig {
        &self.config
    }

    /// Change settings without restarting playback
    pub fn set_config(&mut self, config: PlaybackConfig) {
        self.config = config;
    }

    /// Idle or playing
    pub fn status(&self) -> PlaybackStatus {
        self.status
    }

    /// True while a clip is playing
    pub fn is_playing(&self) -> bool {
        self.status == PlaybackStatus::Playing
    }

    /// Current playback time in seconds
    pub fn time(&self) -> f32 {
        self.time
    }

    /// Library index of the current clip
    pub fn clip_index(&self) -> Option<usize> {
        self.clip
    }

    /// The current clip, if playing
    pub fn current_clip<'a>(&self, library: &'a AnimationLibrary) -> Option<&'a AnimationClip> {
        match self.status {
            PlaybackStatus::Playing => self.clip.and_then(|i| library.get(i)),
            PlaybackStatus::Idle => None,
        }
    }

    /// Root-motion accumulator
    pub fn root_motion(&self) -> &RootMotion {
        &self.root_motion
    }

    /// Root-motion accumulator, mutable
    pub fn root_motion_mut(&mut self) -> &mut RootMotion {
        &mut self.root_motion
    }

    /// Clips visited in sequence mode; empty means library order
    pub fn sequence(&self) -> &[usize] {
        &self.sequence
    }

    /// Set the ordered clip list used in sequence mode
    pub fn set_sequence(&mut self, sequence: Vec<usize>, library: &AnimationLibrary) -> Result<()> {
        if let Some(&bad) = sequence.iter().find(|&&i| library.get(i).is_none()) {
            return Err(RigError::ClipNotFound(format!("index {bad}")));
        }
        self.sequence = sequence;
        Ok(())
    }

    /// Start playing clip `index` from time 0 (or from the end when speed is negative)
    pub fn play(&mut self, index: usize, library: &AnimationLibrary) -> Result<()> {
        let clip = library
            .get(index)
            .ok_or_else(|| RigError::ClipNotFound(format!("index {index}")))?;
        self.status = PlaybackStatus::Playing;
        self.clip = Some(index);
        self.time = if self.config.speed < 0.0 {
            clip.duration()
        } else {
            0.0
        };
        self.root_motion.reset_baseline(clip, self.time);
        debug!("Playing clip {index} '{}' ({:.3}s)", clip.name(), clip.duration());
        Ok(())
    }

    /// Start playing the clip with this name
    pub fn play_named(&mut self, name: &str, library: &AnimationLibrary) -> Result<()> {
        let index = library
            .index_of(name)
            .ok_or_else(|| RigError::ClipNotFound(name.to_string()))?;
        self.play(index, library)
    }

    /// Jump to `time` in the current clip
    ///
    /// Looping playback wraps the time into `[0, duration)`, otherwise it is
    /// clamped to `[0, duration]`. The root-motion baseline restarts at the
    /// new time. Non-finite times are ignored.
    pub fn seek(&mut self, time: f32, library: &AnimationLibrary) {
        let Some(clip) = self.current_clip(library) else {
            return;
        };
        if !time.is_finite() {
            warn!("Ignoring seek to non-finite time {time}");
            return;
        }
        let duration = clip.duration();
        self.time = if duration <= 0.0 {
            0.0
        } else if self.config.looping {
            time.rem_euclid(duration)
        } else {
            time.clamp(0.0, duration)
        };
        self.root_motion.reset_baseline(clip, self.time);
    }

    /// Return to the idle state at time 0
    pub fn stop(&mut self) {
        self.status = PlaybackStatus::Idle;
        self.clip = None;
        self.time = 0.0;
        self.root_motion = RootMotion::default();
    }

    /// Advance time by `speed * delta`, wrapping or clamping at the clip ends
    ///
    /// A non-finite step leaves the state unchanged.
    pub fn advance(&mut self, delta: f32, library: &AnimationLibrary) -> TickEvents {
        let mut events = TickEvents::default();
        if self.status == PlaybackStatus::Idle {
            return events;
        }
        let Some((index, duration)) = self
            .clip
            .and_then(|i| library.get(i).map(|c| (i, c.duration())))
        else {
            self.stop();
            return events;
        };

        let step = self.config.speed * delta;
        if !step.is_finite() {
            warn!("Ignoring non-finite time step {step}");
            return events;
        }
        self.time += step;

        if duration <= 0.0 {
            self.time = 0.0;
            return events;
        }

        if !self.config.looping {
            self.time = self.time.clamp(0.0, duration);
            return events;
        }

        // Resting exactly on the end only wraps when moving towards it
        let forward = self.time > duration || (self.time == duration && step > 0.0);
        let backward = self.time < 0.0;
        if !forward && !backward {
            return events;
        }
        events.wrapped = true;

        let next = if self.config.sequence {
            self.step_sequence(index, forward, library.len())
        } else {
            index
        };
        let Some(next_clip) = library.get(next) else {
            self.stop();
            return events;
        };

        let entry = if forward {
            self.time -= duration;
            0.0
        } else {
            self.time += next_clip.duration();
            next_clip.duration()
        };
        if next != index {
            events.clip_changed = true;
            self.clip = Some(next);
            debug!("Sequence advanced to clip {next} '{}'", next_clip.name());
        }
        self.root_motion.reset_baseline(next_clip, entry);
        trace!("Wrapped to {:.4}s", self.time);
        events
    }

    fn step_sequence(&self, current: usize, forward: bool, library_len: usize) -> usize {
        if self.sequence.is_empty() {
            if library_len == 0 {
                return current;
            }
            return if forward {
                (current + 1) % library_len
            } else {
                (current + library_len - 1) % library_len
            };
        }

        let len = self.sequence.len();
        match self.sequence.iter().position(|&i| i == current) {
            Some(pos) if forward => self.sequence[(pos + 1) % len],
            Some(pos) => self.sequence[(pos + len - 1) % len],
            None => self.sequence[0],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::{BoneTrack, Keyframe};
    use glam::Quat;

    fn clip(name: &str, duration: f32) -> AnimationClip {
        let track = BoneTrack::new(vec![
            Keyframe::new(0.0, Vec3::ZERO, Quat::IDENTITY),
            Keyframe::new(duration, Vec3::new(duration, 0.0, 0.0), Quat::IDENTITY),
        ])
        .unwrap();
        AnimationClip::new(name, vec![track])
    }

    fn library() -> AnimationLibrary {
        [clip("a", 2.0), clip("b", 1.0), clip("c", 4.0)]
            .into_iter()
            .collect()
    }

    #[test]
    fn test_loop_wrap_forward() {
        let library = library();
        let mut state = AnimationState::new(PlaybackConfig::default());
        state.play(0, &library).unwrap();

        state.advance(1.8, &library);
        let events = state.advance(0.5, &library);
        assert!(events.wrapped);
        assert!(!events.clip_changed);
        assert!((state.time() - 0.3).abs() < 1e-5);
    }

    #[test]
    fn test_loop_wrap_backward() {
        let library = library();
        let mut state = AnimationState::new(PlaybackConfig {
            speed: -1.0,
            ..PlaybackConfig::default()
        });
        state.play(0, &library).unwrap();
        assert_eq!(state.time(), 2.0);

        state.advance(2.25, &library);
        assert!((state.time() - 1.75).abs() < 1e-5);
    }

    #[test]
    fn test_single_wrap_per_tick() {
        let library = library();
        let mut state = AnimationState::new(PlaybackConfig::default());
        state.play(1, &library).unwrap();
        state.advance(2.5, &library);
        // Only one duration is subtracted per tick
        assert!((state.time() - 1.5).abs() < 1e-5);
        state.advance(0.0, &library);
        assert!((state.time() - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_no_loop_clamps() {
        let library = library();
        let mut state = AnimationState::new(PlaybackConfig {
            looping: false,
            ..PlaybackConfig::default()
        });
        state.play(0, &library).unwrap();
        let events = state.advance(5.0, &library);
        assert_eq!(events, TickEvents::default());
        assert_eq!(state.time(), 2.0);
        assert!(state.is_playing());
    }

    #[test]
    fn test_sequence_advances_on_wrap() {
        let library = library();
        let mut state = AnimationState::new(PlaybackConfig {
            sequence: true,
            ..PlaybackConfig::default()
        });
        state.set_sequence(vec![2, 0], &library).unwrap();
        state.play(2, &library).unwrap();

        let events = state.advance(4.5, &library);
        assert!(events.clip_changed);
        assert_eq!(state.clip_index(), Some(0));
        assert!((state.time() - 0.5).abs() < 1e-5);

        state.advance(2.0, &library);
        assert_eq!(state.clip_index(), Some(2));
    }

    #[test]
    fn test_sequence_library_order_and_reverse() {
        let library = library();
        let mut state = AnimationState::new(PlaybackConfig {
            speed: -1.0,
            sequence: true,
            ..PlaybackConfig::default()
        });
        state.play(0, &library).unwrap();
        state.advance(2.5, &library);
        // Reverse steps to the previous clip, wrapping to the last one
        assert_eq!(state.clip_index(), Some(2));
        assert!((state.time() - 3.5).abs() < 1e-5);
    }

    #[test]
    fn test_zero_duration_holds_zero() {
        let library: AnimationLibrary = [AnimationClip::new("empty", vec![BoneTrack::empty()])]
            .into_iter()
            .collect();
        let mut state = AnimationState::new(PlaybackConfig::default());
        state.play(0, &library).unwrap();
        let events = state.advance(1.0, &library);
        assert_eq!(state.time(), 0.0);
        assert!(!events.wrapped);
    }

    #[test]
    fn test_seek() {
        let library = library();
        let mut state = AnimationState::new(PlaybackConfig::default());
        state.play(0, &library).unwrap();
        state.seek(5.5, &library);
        assert!((state.time() - 1.5).abs() < 1e-6);
        state.seek(-0.5, &library);
        assert!((state.time() - 1.5).abs() < 1e-6);

        state.set_config(PlaybackConfig {
            looping: false,
            ..PlaybackConfig::default()
        });
        state.seek(5.5, &library);
        assert_eq!(state.time(), 2.0);
    }

    #[test]
    fn test_root_motion_baseline_at_entry_time() {
        let clip = clip("walk", 2.0);
        let mut motion = RootMotion::default();

        // Entering at the end, as reverse playback does
        motion.reset_baseline(&clip, 2.0);
        assert_eq!(motion.accumulate(Vec3::new(1.5, 0.0, 0.0)), Some(Vec3::ZERO));
        assert_eq!(motion.offset(), Vec3::new(-0.5, 0.0, 0.0));
    }

    #[test]
    fn test_reverse_rest_on_end_does_not_wrap() {
        let library = library();
        let mut state = AnimationState::new(PlaybackConfig {
            speed: -1.0,
            sequence: true,
            ..PlaybackConfig::default()
        });
        state.play(0, &library).unwrap();

        let events = state.advance(0.0, &library);
        assert_eq!(events, TickEvents::default());
        assert_eq!(state.time(), 2.0);
        assert_eq!(state.clip_index(), Some(0));
    }

    #[test]
    fn test_forward_step_onto_end_wraps() {
        let library = library();
        let mut state = AnimationState::new(PlaybackConfig::default());
        state.play(0, &library).unwrap();
        let events = state.advance(2.0, &library);
        assert!(events.wrapped);
        assert_eq!(state.time(), 0.0);
    }

    #[test]
    fn test_non_finite_input_is_ignored() {
        let library = library();
        let mut state = AnimationState::new(PlaybackConfig::default());
        state.play(0, &library).unwrap();
        state.advance(0.5, &library);

        state.seek(f32::NAN, &library);
        state.seek(f32::INFINITY, &library);
        assert_eq!(state.time(), 0.5);

        let events = state.advance(f32::NAN, &library);
        assert_eq!(events, TickEvents::default());
        state.advance(f32::NEG_INFINITY, &library);
        assert_eq!(state.time(), 0.5);
    }

    #[test]
    fn test_idle_does_not_advance() {
        let library = library();
        let mut state = AnimationState::new(PlaybackConfig::default());
        state.advance(1.0, &library);
        assert_eq!(state.status(), PlaybackStatus::Idle);
        assert_eq!(state.time(), 0.0);
        assert!(state.current_clip(&library).is_none());
    }

    #[test]
    fn test_play_unknown_clip() {
        let library = library();
        let mut state = AnimationState::default();
        assert!(matches!(
            state.play(7, &library),
            Err(RigError::ClipNotFound(_))
        ));
        assert!(matches!(
            state.play_named("jump", &library),
            Err(RigError::ClipNotFound(_))
        ));
        assert!(state.set_sequence(vec![0, 9], &library).is_err());
    }

    #[test]
    fn test_root_motion_accumulates() {
        let clip = clip("walk", 2.0);
        let mut motion = RootMotion::default();
        motion.reset_baseline(&clip, 0.0);

        assert_eq!(motion.accumulate(Vec3::new(0.5, 0.0, 0.0)), Some(Vec3::ZERO));
        assert_eq!(motion.accumulate(Vec3::new(1.5, 0.0, 0.0)), Some(Vec3::ZERO));
        assert_eq!(motion.offset(), Vec3::new(1.5, 0.0, 0.0));

        // Wrap: baseline restarts at the first sample, offset is kept
        motion.reset_baseline(&clip, 0.0);
        motion.accumulate(Vec3::new(0.25, 0.0, 0.0));
        assert_eq!(motion.offset(), Vec3::new(1.75, 0.0, 0.0));
    }

    #[test]
    fn test_root_motion_without_root_track() {
        let clip = AnimationClip::new("still", vec![BoneTrack::empty()]);
        let mut motion = RootMotion::default();
        motion.reset_baseline(&clip, 0.0);
        assert_eq!(motion.accumulate(Vec3::ONE), None);
        assert_eq!(motion.offset(), Vec3::ZERO);
    }
}
