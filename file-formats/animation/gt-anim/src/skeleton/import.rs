//! Skeleton asset parsers
//!
//! Each parser yields joints in file order with `import_id` equal to the
//! position in the file. Parent links point into that same file order; the
//! sorter turns them into canonical indices.

use glam::Mat4;
use log::{debug, warn};

use super::format::{BindSpace, SkeletonFormat};
use crate::MAX_JOINTS;
use crate::error::{Result, RigError};
use crate::math::compose_trs;
use crate::stream::ByteStream;

const ASSET: &str = "skeleton";

/// A joint as read from the asset, before hierarchy sorting
#[derive(Debug, Clone, PartialEq)]
pub struct RawJoint {
    /// Joint name
    pub name: String,
    /// Parent position in file order, `None` for a root
    pub parent: Option<usize>,
    /// Position in the file
    pub import_id: u32,
    /// Bind pose in the space given by [`UnsortedSkeleton::bind_space`]
    pub bind: Mat4,
}

/// Skeleton in file order, as produced by the importers
#[derive(Debug, Clone, PartialEq)]
pub struct UnsortedSkeleton {
    /// Skeleton name (only the hierarchical format stores one)
    pub name: String,
    /// Source format
    pub format: SkeletonFormat,
    /// Space of every [`RawJoint::bind`]
    pub bind_space: BindSpace,
    /// Joints in file order
    pub joints: Vec<RawJoint>,
}

impl UnsortedSkeleton {
    /// Parse `data` as a skeleton in the given format
    pub fn parse(data: &[u8], format: SkeletonFormat) -> Result<Self> {
        let mut stream = ByteStream::new(data);

        let magic = stream.read_u32();
        if magic != format.magic() {
            return Err(RigError::bad_magic(ASSET, format.magic(), magic));
        }

        let skeleton = match format {
            SkeletonFormat::Hierarchical => parse_hierarchical(&mut stream)?,
            SkeletonFormat::Trs => parse_trs(&mut stream)?,
            SkeletonFormat::Flat => parse_flat(&mut stream)?,
        };

        debug!(
            "Parsed {} skeleton '{}' with {} joints",
            format,
            skeleton.name,
            skeleton.joints.len()
        );
        Ok(skeleton)
    }
}

fn check_joint_count(count: usize) -> Result<()> {
    if count > MAX_JOINTS {
        return Err(RigError::CapacityExceeded {
            what: "joint",
            count,
            limit: MAX_JOINTS,
        });
    }
    Ok(())
}

/// Joint record of the child-list formats, before parents are known
struct ListedJoint {
    name: String,
    local_bind: Mat4,
    is_root: bool,
    children: Vec<u16>,
}

fn read_children(stream: &mut ByteStream<'_>, joint: usize) -> Result<Vec<u16>> {
    let count = stream.read_u16() as usize;
    stream.ensure_remaining(count * 2, &format!("child list of joint {joint}"))?;
    Ok((0..count).map(|_| stream.read_u16()).collect())
}

fn parse_hierarchical(stream: &mut ByteStream<'_>) -> Result<UnsortedSkeleton> {
    let version = stream.read_u8();
    if version != SkeletonFormat::Hierarchical.version() as u8 {
        return Err(RigError::bad_version(
            ASSET,
            SkeletonFormat::Hierarchical.version(),
            version as u32,
        ));
    }

    let name = stream.read_string_u16("skeleton name")?;
    let count = stream.read_u16() as usize;
    check_joint_count(count)?;

    let mut listed = Vec::with_capacity(count);
    for i in 0..count {
        let name = stream.read_string_u16(&format!("name of joint {i}"))?;
        let position = stream.read_vec3();
        let is_root = stream.read_u8() != 0;
        let children = read_children(stream, i)?;
        listed.push(ListedJoint {
            name,
            local_bind: Mat4::from_translation(position),
            is_root,
            children,
        });
    }

    invert_child_lists(name, SkeletonFormat::Hierarchical, listed)
}

fn parse_trs(stream: &mut ByteStream<'_>) -> Result<UnsortedSkeleton> {
    let version = stream.read_u32();
    if version != SkeletonFormat::Trs.version() {
        return Err(RigError::bad_version(
            ASSET,
            SkeletonFormat::Trs.version(),
            version,
        ));
    }

    let count = stream.read_u16() as usize;
    check_joint_count(count)?;

    let mut listed = Vec::with_capacity(count);
    for i in 0..count {
        let name = stream.read_string_u16(&format!("name of joint {i}"))?;
        let position = stream.read_vec3();
        let scale = stream.read_vec3();
        let rotation = stream.read_quat();
        let is_root = stream.read_u8() != 0;
        let children = read_children(stream, i)?;
        listed.push(ListedJoint {
            name,
            local_bind: compose_trs(position, scale, rotation),
            is_root,
            children,
        });
    }

    invert_child_lists(String::new(), SkeletonFormat::Trs, listed)
}

fn parse_flat(stream: &mut ByteStream<'_>) -> Result<UnsortedSkeleton> {
    let version = stream.read_u32();
    if version != SkeletonFormat::Flat.version() {
        return Err(RigError::bad_version(
            ASSET,
            SkeletonFormat::Flat.version(),
            version,
        ));
    }

    let count = stream.read_u32() as usize;
    check_joint_count(count)?;

    let mut joints = Vec::with_capacity(count);
    for i in 0..count {
        let name = stream.read_string_u32(&format!("name of joint {i}"))?;
        let bind = stream.read_mat4();
        let parent = match stream.read_i32() {
            -1 => None,
            p if p >= 0 && (p as usize) < count => Some(p as usize),
            p => {
                return Err(RigError::CorruptData(format!(
                    "joint {i} ('{name}') has parent index {p} outside 0..{count}"
                )));
            }
        };
        joints.push(RawJoint {
            name,
            parent,
            import_id: i as u32,
            bind,
        });
    }

    Ok(UnsortedSkeleton {
        name: String::new(),
        format: SkeletonFormat::Flat,
        bind_space: BindSpace::Global,
        joints,
    })
}

/// Turn per-joint child lists into per-joint parent links
///
/// A joint never named as a child stays a root. The stored `isRoot` byte is
/// only cross-checked.
fn invert_child_lists(
    name: String,
    format: SkeletonFormat,
    listed: Vec<ListedJoint>,
) -> Result<UnsortedSkeleton> {
    let count = listed.len();
    let mut parents: Vec<Option<usize>> = vec![None; count];

    for (parent, joint) in listed.iter().enumerate() {
        for &child in &joint.children {
            let child = child as usize;
            if child >= count {
                return Err(RigError::CorruptData(format!(
                    "joint {parent} lists child {child} outside 0..{count}"
                )));
            }
            if child == parent {
                return Err(RigError::CorruptData(format!(
                    "joint {parent} lists itself as a child"
                )));
            }
            match parents[child] {
                Some(existing) if existing != parent => {
                    return Err(RigError::CorruptData(format!(
                        "joint {child} is a child of both joint {existing} and joint {parent}"
                    )));
                }
                _ => parents[child] = Some(parent),
            }
        }
    }

    let joints = listed
        .into_iter()
        .zip(parents)
        .enumerate()
        .map(|(i, (joint, parent))| {
            if joint.is_root != parent.is_none() {
                warn!(
                    "joint {i} ('{}') isRoot flag is {} but child lists say {}",
                    joint.name,
                    joint.is_root,
                    parent.is_none()
                );
            }
            RawJoint {
                name: joint.name,
                parent,
                import_id: i as u32,
                bind: joint.local_bind,
            }
        })
        .collect();

    Ok(UnsortedSkeleton {
        name,
        format,
        bind_space: BindSpace::Local,
        joints,
    })
}
