//! Bind pose resolution on a sorted skeleton

use log::debug;

use super::Skeleton;
use super::format::BindSpace;
use crate::error::{Result, RigError};
use crate::math::try_inverse;

/// Fill in the missing bind pose space and both inverse bind poses
///
/// Joints are visited in canonical order, so a parent's global bind pose is
/// final before any child reads it. Local-space sources get
/// `global = parent_global * local`; global-space sources get
/// `local = inverse(parent_global) * global`. Running it twice is harmless.
///
/// A singular bind matrix fails with [`RigError::CorruptData`].
pub fn resolve_bind_pose(skeleton: &mut Skeleton) -> Result<()> {
    let space = skeleton.bind_space;

    for i in 0..skeleton.joints.len() {
        let parent = skeleton.joints[i].parent_index();
        let parent_bind = match parent {
            Some(p) if p >= i => {
                return Err(RigError::CorruptData(format!(
                    "joint {i} has parent {p}, which does not precede it"
                )));
            }
            Some(p) => Some((skeleton.joints[p].global_bind, skeleton.joints[p].inverse_bind)),
            None => None,
        };

        let joint = &mut skeleton.joints[i];
        match space {
            BindSpace::Local => {
                joint.global_bind = match parent_bind {
                    Some((parent_global, _)) => parent_global * joint.local_bind,
                    None => joint.local_bind,
                };
            }
            BindSpace::Global => {
                joint.local_bind = match parent_bind {
                    Some((_, parent_inverse)) => parent_inverse * joint.global_bind,
                    None => joint.global_bind,
                };
            }
        }

        joint.inverse_bind = try_inverse(&joint.global_bind).ok_or_else(|| {
            RigError::CorruptData(format!(
                "global bind pose of joint {i} ('{}') is singular",
                skeleton.names.get(i).unwrap_or_default()
            ))
        })?;
        joint.local_inverse_bind = try_inverse(&joint.local_bind).ok_or_else(|| {
            RigError::CorruptData(format!(
                "local bind pose of joint {i} ('{}') is singular",
                skeleton.names.get(i).unwrap_or_default()
            ))
        })?;
    }

    debug!(
        "Resolved bind pose for '{}' ({} joints, {:?} source)",
        skeleton.name,
        skeleton.joints.len(),
        space
    );
    Ok(())
}
