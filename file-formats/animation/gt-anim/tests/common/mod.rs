//! Asset builders shared by the integration tests
#![allow(dead_code)]

use glam::{Mat4, Quat, Vec3};
use gt_anim::Keyframe;

/// Initialise test logging once
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn put_f32s(data: &mut Vec<u8>, values: &[f32]) {
    for v in values {
        data.extend(&v.to_le_bytes());
    }
}

/// A joint of the child-list formats
pub struct ListedJoint<'a> {
    pub name: &'a str,
    pub position: Vec3,
    pub scale: Vec3,
    pub rotation: Quat,
    pub is_root: bool,
    pub children: &'a [u16],
}

impl<'a> ListedJoint<'a> {
    pub fn new(name: &'a str, position: Vec3, is_root: bool, children: &'a [u16]) -> Self {
        Self {
            name,
            position,
            scale: Vec3::ONE,
            rotation: Quat::IDENTITY,
            is_root,
            children,
        }
    }
}

fn put_children(data: &mut Vec<u8>, joint: &ListedJoint<'_>) {
    data.push(u8::from(joint.is_root));
    data.extend(&(joint.children.len() as u16).to_le_bytes());
    for child in joint.children {
        data.extend(&child.to_le_bytes());
    }
}

/// Encode a hierarchical (format A) skeleton
pub fn hierarchical_skeleton(name: &str, joints: &[ListedJoint<'_>]) -> Vec<u8> {
    let mut data = Vec::new();
    data.extend(&383_405_658u32.to_le_bytes());
    data.push(1);
    data.extend(&(name.len() as u16).to_le_bytes());
    data.extend(name.as_bytes());
    data.extend(&(joints.len() as u16).to_le_bytes());
    for joint in joints {
        data.extend(&(joint.name.len() as u16).to_le_bytes());
        data.extend(joint.name.as_bytes());
        put_f32s(&mut data, &joint.position.to_array());
        put_children(&mut data, joint);
    }
    data
}

/// Encode a TRS (format B) skeleton
pub fn trs_skeleton(joints: &[ListedJoint<'_>]) -> Vec<u8> {
    let mut data = Vec::new();
    data.extend(&0xdead_beefu32.to_le_bytes());
    data.extend(&1u32.to_le_bytes());
    data.extend(&(joints.len() as u16).to_le_bytes());
    for joint in joints {
        data.extend(&(joint.name.len() as u16).to_le_bytes());
        data.extend(joint.name.as_bytes());
        put_f32s(&mut data, &joint.position.to_array());
        put_f32s(&mut data, &joint.scale.to_array());
        put_f32s(&mut data, &joint.rotation.to_array());
        put_children(&mut data, joint);
    }
    data
}

/// Encode a flat (format C) skeleton from `(name, global bind, parent)`
pub fn flat_skeleton(joints: &[(&str, Mat4, i32)]) -> Vec<u8> {
    let mut data = Vec::new();
    data.extend(&0xdead_beefu32.to_le_bytes());
    data.extend(&1u32.to_le_bytes());
    data.extend(&(joints.len() as u32).to_le_bytes());
    for (name, bind, parent) in joints {
        data.extend(&(name.len() as u32).to_le_bytes());
        data.extend(name.as_bytes());
        put_f32s(&mut data, &bind.to_cols_array());
        data.extend(&parent.to_le_bytes());
    }
    data
}

/// Encode a clip from `(import id, keyframes)` tracks
pub fn clip(name: &str, tracks: &[(u32, Vec<Keyframe>)]) -> Vec<u8> {
    let mut data = Vec::new();
    data.extend(&0xdead_beefu32.to_le_bytes());
    data.extend(&1u32.to_le_bytes());
    data.extend(&(name.len() as u32).to_le_bytes());
    data.extend(name.as_bytes());
    data.extend(&(tracks.len() as u32).to_le_bytes());
    for (import_id, keys) in tracks {
        data.extend(&import_id.to_le_bytes());
        data.extend(&(keys.len() as u32).to_le_bytes());
        for key in keys {
            data.extend(&key.time.to_le_bytes());
            put_f32s(&mut data, &key.translation.to_array());
            put_f32s(&mut data, &key.rotation.to_array());
        }
    }
    data
}

/// A five joint rig stored out of order, in the hierarchical format
///
/// File order: `[hand_l, spine, hand_r, hips, head]`
///
/// ```text
/// hips (3)
/// └── spine (1)
///     ├── hand_l (0)
///     ├── hand_r (2)
///     └── head (4)
/// ```
pub fn upper_body() -> Vec<u8> {
    hierarchical_skeleton(
        "upper_body",
        &[
            ListedJoint::new("hand_l", Vec3::new(-1.0, 0.5, 0.0), false, &[]),
            ListedJoint::new("spine", Vec3::new(0.0, 1.0, 0.0), false, &[0, 2, 4]),
            ListedJoint::new("hand_r", Vec3::new(1.0, 0.5, 0.0), false, &[]),
            ListedJoint::new("hips", Vec3::new(0.0, 1.0, 0.0), true, &[1]),
            ListedJoint::new("head", Vec3::new(0.0, 0.75, 0.0), false, &[]),
        ],
    )
}

/// Keyframes moving from `a` to `b` over `duration` with a quarter turn about Y
pub fn two_keys(a: Vec3, b: Vec3, duration: f32) -> Vec<Keyframe> {
    vec![
        Keyframe::new(0.0, a, Quat::IDENTITY),
        Keyframe::new(duration, b, Quat::from_rotation_y(std::f32::consts::FRAC_PI_2)),
    ]
}
