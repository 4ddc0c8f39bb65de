//! Animation clip asset parser

use log::{debug, warn};

use super::clip::{AnimationClip, BoneTrack, Keyframe};
use crate::error::{Result, RigError};
use crate::skeleton::Skeleton;
use crate::skeleton::format::{GT_MAGIC, GT_VERSION};
use crate::stream::ByteStream;
use crate::{MAX_JOINTS, MAX_KEYFRAMES};

const ASSET: &str = "animation clip";

/// Encoded size of one keyframe: time, translation, rotation
pub const KEYFRAME_SIZE: usize = 4 + 3 * 4 + 4 * 4;

/// Parse a clip and bind its tracks to the canonical bones of `skeleton`
///
/// Tracks are stored by import id; each is moved to the canonical index of
/// its bone. Bones without a track in the file get an empty track.
pub fn import_clip(data: &[u8], skeleton: &Skeleton) -> Result<AnimationClip> {
    let mut stream = ByteStream::new(data);

    let magic = stream.read_u32();
    if magic != GT_MAGIC {
        return Err(RigError::bad_magic(ASSET, GT_MAGIC, magic));
    }
    let version = stream.read_u32();
    if version != GT_VERSION {
        return Err(RigError::bad_version(ASSET, GT_VERSION, version));
    }

    let name = stream.read_string_u32("clip name")?;
    let num_tracks = stream.read_u32() as usize;
    if num_tracks > MAX_JOINTS {
        return Err(RigError::CapacityExceeded {
            what: "track",
            count: num_tracks,
            limit: MAX_JOINTS,
        });
    }

    let mut tracks: Vec<Option<BoneTrack>> = vec![None; skeleton.len()];
    for track_index in 0..num_tracks {
        let import_id = stream.read_u32();
        let bone = skeleton
            .index_of_import_id(import_id)
            .ok_or_else(|| RigError::MissingBone {
                import_id,
                skeleton: skeleton.name().to_string(),
            })?;

        let num_keyframes = stream.read_u32() as usize;
        if num_keyframes > MAX_KEYFRAMES {
            return Err(RigError::CapacityExceeded {
                what: "keyframe",
                count: num_keyframes,
                limit: MAX_KEYFRAMES,
            });
        }
        stream.ensure_remaining(
            num_keyframes * KEYFRAME_SIZE,
            &format!("keyframes of track {track_index}"),
        )?;

        let keyframes = (0..num_keyframes)
            .map(|_| {
                let time = stream.read_f32();
                let translation = stream.read_vec3();
                let rotation = stream.read_quat();
                Keyframe::new(time, translation, rotation)
            })
            .collect();
        let track = BoneTrack::new(keyframes).map_err(|e| match e {
            RigError::CorruptData(reason) => {
                RigError::CorruptData(format!("track {track_index} (import id {import_id}): {reason}"))
            }
            other => other,
        })?;

        if track.is_empty() {
            warn!(
                "clip '{name}' track {track_index} for bone '{}' has no keyframes",
                skeleton.joint_name(bone)
            );
        }
        if tracks[bone].replace(track).is_some() {
            return Err(RigError::CorruptData(format!(
                "clip '{name}' has a second track for import id {import_id}"
            )));
        }
    }

    let clip = AnimationClip::new(name, tracks.into_iter().map(Option::unwrap_or_default).collect());
    debug!(
        "Imported clip '{}': {} tracks, {} keyframes, {:.3}s",
        clip.name(),
        clip.animated_bone_count(),
        clip.keyframe_count(),
        clip.duration()
    );
    Ok(clip)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skeleton::{SkeletonFormat, import_skeleton};
    use glam::{Mat4, Quat, Vec3};

    fn skeleton() -> Skeleton {
        // root listed second, so import id 1 sorts to index 0
        let mut data = Vec::new();
        data.extend(&0xdead_beefu32.to_le_bytes());
        data.extend(&1u32.to_le_bytes());
        data.extend(&2u32.to_le_bytes());
        for (name, parent) in [("child", 1i32), ("root", -1)] {
            data.extend(&(name.len() as u32).to_le_bytes());
            data.extend(name.as_bytes());
            for v in Mat4::IDENTITY.to_cols_array() {
                data.extend(&v.to_le_bytes());
            }
            data.extend(&parent.to_le_bytes());
        }
        import_skeleton(&data, SkeletonFormat::Flat).unwrap()
    }

    fn clip_header(data: &mut Vec<u8>, name: &str, tracks: u32) {
        data.extend(&0xdead_beefu32.to_le_bytes());
        data.extend(&1u32.to_le_bytes());
        data.extend(&(name.len() as u32).to_le_bytes());
        data.extend(name.as_bytes());
        data.extend(&tracks.to_le_bytes());
    }

    fn track(data: &mut Vec<u8>, import_id: u32, times: &[f32]) {
        data.extend(&import_id.to_le_bytes());
        data.extend(&(times.len() as u32).to_le_bytes());
        for &t in times {
            data.extend(&t.to_le_bytes());
            for v in [t, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0] {
                data.extend(&v.to_le_bytes());
            }
        }
    }

    #[test]
    fn test_import_binds_by_import_id() {
        let skeleton = skeleton();
        let mut data = Vec::new();
        clip_header(&mut data, "wave", 1);
        track(&mut data, 0, &[0.0, 0.5, 1.5]);

        let clip = import_clip(&data, &skeleton).unwrap();
        assert_eq!(clip.name(), "wave");
        assert_eq!(clip.duration(), 1.5);
        assert_eq!(clip.tracks().len(), 2);
        // import id 0 ("child") lives at canonical index 1
        assert!(clip.track(0).unwrap().is_empty());
        let child = clip.track(1).unwrap();
        assert_eq!(child.len(), 3);
        assert_eq!(
            child.keyframes()[1],
            Keyframe::new(0.5, Vec3::new(0.5, 0.0, 0.0), Quat::IDENTITY)
        );
    }

    #[test]
    fn test_missing_bone() {
        let mut data = Vec::new();
        clip_header(&mut data, "wave", 1);
        track(&mut data, 9, &[0.0]);
        let err = import_clip(&data, &skeleton()).unwrap_err();
        assert!(matches!(err, RigError::MissingBone { import_id: 9, .. }));
    }

    #[test]
    fn test_too_many_tracks() {
        let mut data = Vec::new();
        clip_header(&mut data, "wave", 129);
        let err = import_clip(&data, &skeleton()).unwrap_err();
        assert!(matches!(err, RigError::CapacityExceeded { what: "track", .. }));
    }

    #[test]
    fn test_keyframes_past_end_are_corrupt() {
        let mut data = Vec::new();
        clip_header(&mut data, "wave", 1);
        track(&mut data, 0, &[0.0, 1.0]);
        data.truncate(data.len() - 4);
        let err = import_clip(&data, &skeleton()).unwrap_err();
        assert!(matches!(err, RigError::CorruptData(_)));
    }

    #[test]
    fn test_duplicate_track_is_corrupt() {
        let mut data = Vec::new();
        clip_header(&mut data, "wave", 2);
        track(&mut data, 1, &[0.0]);
        track(&mut data, 1, &[1.0]);
        let err = import_clip(&data, &skeleton()).unwrap_err();
        assert!(matches!(err, RigError::CorruptData(_)));
    }

    #[test]
    fn test_decreasing_time_is_corrupt() {
        let mut data = Vec::new();
        clip_header(&mut data, "wave", 1);
        track(&mut data, 1, &[1.0, 0.5]);
        let err = import_clip(&data, &skeleton()).unwrap_err();
        assert!(matches!(err, RigError::CorruptData(msg) if msg.contains("import id 1")));
    }

    #[test]
    fn test_bad_magic() {
        let mut data = Vec::new();
        clip_header(&mut data, "wave", 0);
        data[0] = 0;
        let err = import_clip(&data, &skeleton()).unwrap_err();
        assert!(matches!(err, RigError::Format { .. }));
    }
}
