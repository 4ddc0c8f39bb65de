//! Vertex skinning contract
//!
//! Mesh vertices reference up to four bones by *import id*, the identity the
//! bone had in its source asset, together with four weights. The skinning
//! palette produced by [`Pose::update_skin`](crate::pose::Pose::update_skin)
//! is indexed the same way, so a vertex shader can use the indices as-is.
//!
//! The functions here are the CPU reference for that shader: they blend the
//! palette matrices by weight, skip weights below a threshold and
//! renormalise the rest.
//!
//! # Example
//!
//! ```rust,no_run
//! use gt_anim::skinning::{SkinInfluence, SkinningOptions, skin_position, validate_influences};
//! use gt_anim::{Pose, PoseOptions, SkeletonFormat, import_skeleton};
//! use glam::Vec3;
//!
//! let data = std::fs::read("hero.skel")?;
//! let skeleton = import_skeleton(&data, SkeletonFormat::Flat)?;
//! let influences = [SkinInfluence::single(0)];
//! validate_influences(&influences, &skeleton)?;
//!
//! let mut pose = Pose::new(&skeleton);
//! pose.evaluate(&skeleton, None, 0.0, &PoseOptions::default());
//! let p = skin_position(Vec3::ZERO, &influences[0], pose.skin(), &SkinningOptions::default());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use glam::{Mat4, Vec3};

use crate::error::{Result, RigError};
use crate::skeleton::Skeleton;

/// Bone indices (import ids) and weights of one vertex
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkinInfluence {
    /// Import ids of the influencing bones
    pub indices: [u32; 4],
    /// Weight of each bone; ideally summing to 1
    pub weights: [f32; 4],
}

impl SkinInfluence {
    /// A vertex bound rigidly to one bone
    pub fn single(import_id: u32) -> Self {
        Self {
            indices: [import_id, 0, 0, 0],
            weights: [1.0, 0.0, 0.0, 0.0],
        }
    }
}

/// Options for CPU skinning
#[derive(Debug, Clone)]
pub struct SkinningOptions {
    /// Divide by the weight total when it is not 1
    pub normalize_weights: bool,
    /// Weights below this are ignored
    pub weight_threshold: f32,
}

impl Default for SkinningOptions {
    fn default() -> Self {
        Self {
            normalize_weights: true,
            weight_threshold: 0.001,
        }
    }
}

/// Check every weighted bone reference against the skeleton
///
/// Fails with [`RigError::MissingBone`] for the first import id that the
/// skeleton does not contain. Zero-weight slots are not checked.
pub fn validate_influences(influences: &[SkinInfluence], skeleton: &Skeleton) -> Result<()> {
    for influence in influences {
        for (&import_id, &weight) in influence.indices.iter().zip(&influence.weights) {
            if weight != 0.0 && skeleton.index_of_import_id(import_id).is_none() {
                return Err(RigError::MissingBone {
                    import_id,
                    skeleton: skeleton.name().to_string(),
                });
            }
        }
    }
    Ok(())
}

/// Weighted blend of the palette matrices for one vertex
///
/// `None` when no bone carries enough weight; the caller keeps the bind
/// pose position in that case.
pub fn blend_matrix(
    influence: &SkinInfluence,
    palette: &[Mat4],
    options: &SkinningOptions,
) -> Option<Mat4> {
    let mut blended = Mat4::ZERO;
    let mut total_weight = 0.0f32;

    for (&index, &weight) in influence.indices.iter().zip(&influence.weights) {
        if weight < options.weight_threshold {
            continue;
        }
        let Some(matrix) = palette.get(index as usize) else {
            continue;
        };
        blended += *matrix * weight;
        total_weight += weight;
    }

    if total_weight < options.weight_threshold {
        return None;
    }
    if options.normalize_weights && (total_weight - 1.0).abs() > f32::EPSILON {
        blended *= 1.0 / total_weight;
    }
    Some(blended)
}

/// Skin a bind-pose position
pub fn skin_position(
    position: Vec3,
    influence: &SkinInfluence,
    palette: &[Mat4],
    options: &SkinningOptions,
) -> Vec3 {
    blend_matrix(influence, palette, options)
        .map_or(position, |m| m.transform_point3(position))
}

/// Skin a bind-pose normal; the result is renormalised
pub fn skin_normal(
    normal: Vec3,
    influence: &SkinInfluence,
    palette: &[Mat4],
    options: &SkinningOptions,
) -> Vec3 {
    blend_matrix(influence, palette, options)
        .map_or(normal, |m| m.transform_vector3(normal).normalize_or_zero())
}
