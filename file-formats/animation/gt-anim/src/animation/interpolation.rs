//! Keyframe bracketing and track sampling

use glam::{Quat, Vec3};

use super::clip::{BoneTrack, Keyframe};
use crate::math::slerp;

/// Translation and rotation sampled from a track
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackSample {
    /// Interpolated translation
    pub translation: Vec3,
    /// Interpolated rotation, unit length
    pub rotation: Quat,
}

impl From<&Keyframe> for TrackSample {
    fn from(key: &Keyframe) -> Self {
        Self {
            translation: key.translation,
            rotation: key.rotation,
        }
    }
}

/// Find the keyframes bracketing `time`
///
/// Returns `(prev, next)` with `prev.time <= time < next.time`. Before the
/// first keyframe both are 0, at or after the last both are the last index,
/// and a time landing exactly on a keyframe returns that keyframe twice.
/// A NaN time is treated as before the first keyframe. `None` for an empty
/// slice.
pub fn find_bracket(keyframes: &[Keyframe], time: f32) -> Option<(usize, usize)> {
    let last = keyframes.len().checked_sub(1)?;

    if time.is_nan() || time <= keyframes[0].time {
        return Some((0, 0));
    }
    if time >= keyframes[last].time {
        return Some((last, last));
    }

    // First keyframe strictly after `time`; 1..=last given the checks above
    let next = keyframes.partition_point(|k| k.time <= time);
    let Some(prev) = next.checked_sub(1) else {
        return Some((0, 0));
    };
    if keyframes[prev].time == time {
        return Some((prev, prev));
    }
    Some((prev, next))
}

impl BoneTrack {
    /// Sample the track at `time`, clamping outside the keyed range
    ///
    /// `None` for an empty track, which leaves the bone at its bind pose.
    pub fn sample(&self, time: f32) -> Option<TrackSample> {
        let keyframes = self.keyframes();
        let (prev, next) = find_bracket(keyframes, time)?;
        let a = &keyframes[prev];
        if prev == next {
            return Some(a.into());
        }

        let b = &keyframes[next];
        let alpha = ((time - a.time) / (b.time - a.time)).clamp(0.0, 1.0);
        Some(TrackSample {
            translation: a.translation.lerp(b.translation, alpha),
            rotation: slerp(a.rotation, b.rotation, alpha),
        })
    }
}
