//! Skeleton import and canonical joint hierarchy
//!
//! Import is a three step pipeline, each step usable on its own:
//!
//! 1. [`UnsortedSkeleton::parse`] reads one of the [`SkeletonFormat`]s into
//!    file order, with `import_id` set to each joint's position in the file.
//! 2. [`sort_hierarchy`] reorders the joints so that every parent precedes
//!    its children and rewrites parent links to canonical indices.
//! 3. [`resolve_bind_pose`] derives the global (or local) bind pose and the
//!    inverse bind poses in one forward pass.
//!
//! [`import_skeleton`] runs all three. Any failure aborts the import and no
//! partially built skeleton is returned.
//!
//! A [`Skeleton`] is immutable once built. Current local and global
//! transforms live in a per-instance [`Pose`](crate::pose::Pose), so one
//! skeleton can be shared by many animated instances.

mod bind_pose;
pub mod format;
pub mod import;
mod names;
mod sort;

pub use bind_pose::resolve_bind_pose;
pub use format::{BindSpace, SkeletonFormat};
pub use import::{RawJoint, UnsortedSkeleton};
pub use names::NameTable;
pub use sort::sort_hierarchy;

use glam::Mat4;

use crate::error::{Result, RigError};
use crate::math::translation_of;

/// A joint of a canonical skeleton
///
/// The joint's index is its position in [`Skeleton::joints`].
#[derive(Debug, Clone, PartialEq)]
pub struct Joint {
    /// Parent index, `-1` for a root; always less than the joint's own index
    pub parent: i32,
    /// Position of the joint in the source asset
    pub import_id: u32,
    /// Bind pose relative to the parent
    pub local_bind: Mat4,
    /// Bind pose in object space
    pub global_bind: Mat4,
    /// Inverse of `global_bind`
    pub inverse_bind: Mat4,
    /// Inverse of `local_bind`
    pub local_inverse_bind: Mat4,
}

impl Joint {
    fn unresolved(parent: i32, import_id: u32, space: BindSpace, bind: Mat4) -> Self {
        let (local_bind, global_bind) = match space {
            BindSpace::Local => (bind, Mat4::IDENTITY),
            BindSpace::Global => (Mat4::IDENTITY, bind),
        };
        Self {
            parent,
            import_id,
            local_bind,
            global_bind,
            inverse_bind: Mat4::IDENTITY,
            local_inverse_bind: Mat4::IDENTITY,
        }
    }

    /// True for joints without a parent
    pub fn is_root(&self) -> bool {
        self.parent < 0
    }

    /// Parent index, `None` for a root
    pub fn parent_index(&self) -> Option<usize> {
        usize::try_from(self.parent).ok()
    }
}

/// A topologically ordered joint hierarchy with resolved bind poses
#[derive(Debug, Clone, PartialEq)]
pub struct Skeleton {
    name: String,
    format: SkeletonFormat,
    bind_space: BindSpace,
    joints: Vec<Joint>,
    names: NameTable,
    by_import_id: Vec<Option<usize>>,
}

impl Skeleton {
    fn from_sorted(
        name: String,
        format: SkeletonFormat,
        bind_space: BindSpace,
        joints: Vec<Joint>,
        names: NameTable,
    ) -> Result<Self> {
        let slots = joints
            .iter()
            .map(|j| j.import_id as usize + 1)
            .max()
            .unwrap_or(0);
        let mut by_import_id = vec![None; slots];
        for (index, joint) in joints.iter().enumerate() {
            let slot = &mut by_import_id[joint.import_id as usize];
            if slot.is_some() {
                return Err(RigError::CorruptData(format!(
                    "import id {} appears more than once",
                    joint.import_id
                )));
            }
            *slot = Some(index);
        }

        Ok(Self {
            name,
            format,
            bind_space,
            joints,
            names,
            by_import_id,
        })
    }

    /// Skeleton name (empty when the format stores none)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Replace the skeleton name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Format the skeleton was imported from
    pub fn format(&self) -> SkeletonFormat {
        self.format
    }

    /// Number of joints
    pub fn len(&self) -> usize {
        self.joints.len()
    }

    /// True for a skeleton without joints
    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }

    /// Joints in canonical order
    pub fn joints(&self) -> &[Joint] {
        &self.joints
    }

    /// Joint at canonical `index`
    pub fn joint(&self, index: usize) -> Option<&Joint> {
        self.joints.get(index)
    }

    /// Name of the joint at canonical `index` (empty when out of range)
    pub fn joint_name(&self, index: usize) -> &str {
        self.names.get(index).unwrap_or_default()
    }

    /// All joint names in canonical order
    pub fn names(&self) -> &NameTable {
        &self.names
    }

    /// Canonical index of the joint with this import id
    pub fn index_of_import_id(&self, import_id: u32) -> Option<usize> {
        self.by_import_id.get(import_id as usize).copied().flatten()
    }

    /// Canonical index of the first joint with this name
    pub fn index_of_name(&self, name: &str) -> Option<usize> {
        self.names.position(name)
    }

    /// Largest import id plus one; the size of an import-id indexed palette
    pub fn import_id_span(&self) -> usize {
        self.by_import_id.len()
    }

    /// Canonical indices of the root joints
    pub fn roots(&self) -> impl Iterator<Item = usize> + '_ {
        self.joints
            .iter()
            .enumerate()
            .filter(|(_, j)| j.is_root())
            .map(|(i, _)| i)
    }

    /// Canonical indices of the direct children of `index`
    pub fn children_of(&self, index: usize) -> impl Iterator<Item = usize> + '_ {
        self.joints
            .iter()
            .enumerate()
            .filter(move |(_, j)| j.parent_index() == Some(index))
            .map(|(i, _)| i)
    }

    /// Depth of every joint, roots at 0
    pub fn depths(&self) -> Vec<usize> {
        let mut depths = Vec::with_capacity(self.joints.len());
        for joint in &self.joints {
            let depth = joint
                .parent_index()
                .and_then(|p| depths.get(p))
                .map_or(0, |d| d + 1);
            depths.push(depth);
        }
        depths
    }

    /// Whether every joint's parent precedes it
    pub fn is_topologically_ordered(&self) -> bool {
        self.joints.iter().enumerate().all(|(i, j)| match j.parent_index() {
            Some(p) => p < i,
            None => j.parent == -1,
        })
    }

    /// Object-space bind translation of a joint
    pub fn bind_translation(&self, index: usize) -> Option<glam::Vec3> {
        self.joints.get(index).map(|j| translation_of(&j.global_bind))
    }
}

/// Parse, sort and resolve a skeleton asset
pub fn import_skeleton(data: &[u8], format: SkeletonFormat) -> Result<Skeleton> {
    let unsorted = UnsortedSkeleton::parse(data, format)?;
    let mut skeleton = sort_hierarchy(unsorted)?;
    resolve_bind_pose(&mut skeleton)?;
    Ok(skeleton)
}
