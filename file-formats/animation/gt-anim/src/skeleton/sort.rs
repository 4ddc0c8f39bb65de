//! Hierarchy linearization
//!
//! Reorders a joint forest so every parent precedes its children. Each
//! unplaced joint walks up its parent chain onto an explicit stack until it
//! reaches a root or an already placed ancestor, then the stack is unwound
//! top-down. A shared ancestor is placed once, by whichever descendant
//! reaches it first; later descendants find it through `new_index`.

use log::{debug, trace};

use super::import::UnsortedSkeleton;
use super::names::NameTable;
use super::{Joint, Skeleton};
use crate::error::{Result, RigError};

/// Sort an imported skeleton into canonical order
///
/// The result satisfies `parent(i) < i` for every joint, and joint 0 is a
/// root. Bind poses are carried over in the space they were stored in;
/// run [`resolve_bind_pose`](super::resolve_bind_pose) afterwards.
pub fn sort_hierarchy(unsorted: UnsortedSkeleton) -> Result<Skeleton> {
    let UnsortedSkeleton {
        name,
        format,
        bind_space,
        joints: raw,
    } = unsorted;
    let count = raw.len();

    // Canonical index of each source joint once placed
    let mut new_index: Vec<Option<usize>> = vec![None; count];
    let mut in_chain = vec![false; count];
    let mut chain: Vec<usize> = Vec::with_capacity(count);

    let mut joints = Vec::with_capacity(count);
    let mut names = NameTable::with_capacity(count);

    for start in 0..count {
        if new_index[start].is_some() {
            continue;
        }

        let mut current = start;
        loop {
            chain.push(current);
            in_chain[current] = true;
            match raw[current].parent {
                None => break,
                Some(p) if p >= count => {
                    return Err(RigError::CorruptData(format!(
                        "joint {current} has parent {p} outside 0..{count}"
                    )));
                }
                Some(p) if new_index[p].is_some() => break,
                Some(p) if in_chain[p] => {
                    return Err(RigError::CorruptData(format!(
                        "parent cycle through joint {p} ('{}')",
                        raw[p].name
                    )));
                }
                Some(p) => current = p,
            }
        }

        while let Some(source) = chain.pop() {
            in_chain[source] = false;
            let joint = &raw[source];

            let parent = match joint.parent {
                None => -1,
                Some(p) => match new_index[p] {
                    Some(placed) => placed as i32,
                    None => {
                        return Err(RigError::CorruptData(format!(
                            "parent {p} of joint {source} was not placed first"
                        )));
                    }
                },
            };

            let index = joints.len();
            trace!(
                "placing joint {source} '{}' at {index} with parent {parent}",
                joint.name
            );
            names.push(&joint.name);
            joints.push(Joint::unresolved(parent, joint.import_id, bind_space, joint.bind));
            new_index[source] = Some(index);
        }
    }

    let skeleton = Skeleton::from_sorted(name, format, bind_space, joints, names)?;
    debug!(
        "Sorted skeleton '{}': {} joints, {} roots",
        skeleton.name(),
        skeleton.len(),
        skeleton.roots().count()
    );
    Ok(skeleton)
}
