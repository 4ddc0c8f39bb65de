//! Writers for the flat skeleton format and the clip format

use std::io::Write;

use crate::animation::AnimationClip;
use crate::error::Result;
use crate::skeleton::Skeleton;
use crate::skeleton::format::{GT_MAGIC, GT_VERSION};

/// Extension trait for writing little-endian values
trait WriteLittleEndian: Write {
    fn write_u32_le(&mut self, value: u32) -> Result<()> {
        self.write_all(&value.to_le_bytes())?;
        Ok(())
    }

    fn write_i32_le(&mut self, value: i32) -> Result<()> {
        self.write_all(&value.to_le_bytes())?;
        Ok(())
    }

    fn write_f32_le(&mut self, value: f32) -> Result<()> {
        self.write_all(&value.to_le_bytes())?;
        Ok(())
    }

    fn write_floats_le(&mut self, values: &[f32]) -> Result<()> {
        for &value in values {
            self.write_f32_le(value)?;
        }
        Ok(())
    }

    fn write_string_u32(&mut self, value: &str) -> Result<()> {
        self.write_u32_le(value.len() as u32)?;
        self.write_all(value.as_bytes())?;
        Ok(())
    }
}

impl<W: Write + ?Sized> WriteLittleEndian for W {}

/// Write `skeleton` in the flat format (format C)
///
/// Joints are written in canonical order with object-space bind matrices,
/// so a re-import needs no reordering. The re-imported import ids are the
/// canonical indices of this skeleton.
pub fn write_flat_skeleton<W: Write>(skeleton: &Skeleton, writer: &mut W) -> Result<()> {
    writer.write_u32_le(GT_MAGIC)?;
    writer.write_u32_le(GT_VERSION)?;
    writer.write_u32_le(skeleton.len() as u32)?;

    for (i, joint) in skeleton.joints().iter().enumerate() {
        writer.write_string_u32(skeleton.joint_name(i))?;
        writer.write_floats_le(&joint.global_bind.to_cols_array())?;
        writer.write_i32_le(joint.parent)?;
    }
    Ok(())
}

/// Encode `skeleton` in the flat format into a new buffer
pub fn encode_flat_skeleton(skeleton: &Skeleton) -> Result<Vec<u8>> {
    let mut data = Vec::new();
    write_flat_skeleton(skeleton, &mut data)?;
    Ok(data)
}

/// Write `clip` in the clip format
///
/// Each non-empty track is stored under the import id of its bone in
/// `skeleton`; empty tracks are left out.
pub fn write_clip<W: Write>(clip: &AnimationClip, skeleton: &Skeleton, writer: &mut W) -> Result<()> {
    let tracks: Vec<_> = clip
        .tracks()
        .iter()
        .zip(skeleton.joints())
        .filter(|(track, _)| !track.is_empty())
        .collect();

    writer.write_u32_le(GT_MAGIC)?;
    writer.write_u32_le(GT_VERSION)?;
    writer.write_string_u32(clip.name())?;
    writer.write_u32_le(tracks.len() as u32)?;

    for (track, joint) in tracks {
        writer.write_u32_le(joint.import_id)?;
        writer.write_u32_le(track.len() as u32)?;
        for key in track.keyframes() {
            writer.write_f32_le(key.time)?;
            writer.write_floats_le(&key.translation.to_array())?;
            writer.write_floats_le(&key.rotation.to_array())?;
        }
    }
    Ok(())
}

/// Encode `clip` into a new buffer
pub fn encode_clip(clip: &AnimationClip, skeleton: &Skeleton) -> Result<Vec<u8>> {
    let mut data = Vec::new();
    write_clip(clip, skeleton, &mut data)?;
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::{BoneTrack, Keyframe, import_clip, KEYFRAME_SIZE};
    use crate::skeleton::{SkeletonFormat, import_skeleton};
    use glam::{Mat4, Quat, Vec3};
    use pretty_assertions::assert_eq;

    fn skeleton() -> Skeleton {
        let mut data = Vec::new();
        data.extend(&0xdead_beefu32.to_le_bytes());
        data.extend(&1u32.to_le_bytes());
        data.extend(&3u32.to_le_bytes());
        for (name, x, parent) in [("tip", 3.0f32, 2i32), ("base", 0.0, -1), ("mid", 1.0, 1)] {
            data.extend(&(name.len() as u32).to_le_bytes());
            data.extend(name.as_bytes());
            for v in Mat4::from_translation(Vec3::new(x, 0.0, 0.0)).to_cols_array() {
                data.extend(&v.to_le_bytes());
            }
            data.extend(&parent.to_le_bytes());
        }
        import_skeleton(&data, SkeletonFormat::Flat).unwrap()
    }

    #[test]
    fn test_flat_reimport_matches() {
        let original = skeleton();
        let data = encode_flat_skeleton(&original).unwrap();
        let reimported = import_skeleton(&data, SkeletonFormat::Flat).unwrap();

        assert_eq!(reimported.len(), original.len());
        for i in 0..original.len() {
            assert_eq!(reimported.joint_name(i), original.joint_name(i));
            let (a, b) = (&reimported.joints()[i], &original.joints()[i]);
            assert_eq!(a.parent, b.parent);
            assert_eq!(a.import_id, i as u32);
            assert!(a.local_bind.abs_diff_eq(b.local_bind, 1e-6));
            assert!(a.global_bind.abs_diff_eq(b.global_bind, 1e-6));
        }
    }

    #[test]
    fn test_clip_omits_empty_tracks() {
        let skeleton = skeleton();
        let track = BoneTrack::new(vec![
            Keyframe::new(0.0, Vec3::ZERO, Quat::IDENTITY),
            Keyframe::new(0.5, Vec3::Y, Quat::from_rotation_x(0.5)),
        ])
        .unwrap();
        // Canonical order is base, mid, tip; animate mid only
        let clip = AnimationClip::new("bend", vec![BoneTrack::empty(), track, BoneTrack::empty()]);

        let data = encode_clip(&clip, &skeleton).unwrap();
        let header = 4 + 4 + 4 + 4 + 4;
        assert_eq!(data.len(), header + 8 + 2 * KEYFRAME_SIZE);
        // mid was the third joint in the file
        assert_eq!(&data[20..24], &2u32.to_le_bytes());

        let reimported = import_clip(&data, &skeleton).unwrap();
        assert_eq!(reimported, clip);
    }
}
