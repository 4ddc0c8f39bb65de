//! Property tests for hierarchy sorting, sampling and playback

use std::collections::HashSet;

use glam::{Mat4, Quat, Vec3, Vec4};
use gt_anim::math::{normalize_quat, slerp};
use gt_anim::skeleton::{BindSpace, RawJoint, UnsortedSkeleton, resolve_bind_pose, sort_hierarchy};
use gt_anim::{
    AnimationClip, AnimationLibrary, AnimationState, BoneTrack, Keyframe, PlaybackConfig,
    SkeletonFormat,
};
use proptest::prelude::*;

/// Parent links in file order for a random forest
///
/// Nodes are generated with parents among earlier nodes (so the forest is
/// acyclic), then written to the file in a shuffled order.
fn shuffled_forest() -> impl Strategy<Value = Vec<Option<usize>>> {
    (1usize..=48)
        .prop_flat_map(|n| {
            let parents: Vec<BoxedStrategy<Option<usize>>> = (0..n)
                .map(|i| {
                    if i == 0 {
                        Just(None).boxed()
                    } else {
                        proptest::option::weighted(0.85, 0..i).boxed()
                    }
                })
                .collect();
            let order = Just((0..n).collect::<Vec<usize>>()).prop_shuffle();
            (parents, order)
        })
        .prop_map(|(parents, order)| {
            let mut file = vec![None; parents.len()];
            for (node, parent) in parents.iter().enumerate() {
                file[order[node]] = parent.map(|p| order[p]);
            }
            file
        })
}

fn unsorted(parents: &[Option<usize>]) -> UnsortedSkeleton {
    UnsortedSkeleton {
        name: "random".to_string(),
        format: SkeletonFormat::Hierarchical,
        bind_space: BindSpace::Local,
        joints: parents
            .iter()
            .enumerate()
            .map(|(i, &parent)| RawJoint {
                name: format!("joint_{i}"),
                parent,
                import_id: i as u32,
                bind: Mat4::from_translation(Vec3::new(i as f32, 1.0, 0.0)),
            })
            .collect(),
    }
}

fn unit_quat() -> impl Strategy<Value = Quat> {
    (-1.0f32..1.0, -1.0f32..1.0, -1.0f32..1.0, -1.0f32..1.0)
        .prop_filter("non-degenerate", |(x, y, z, w)| {
            Vec4::new(*x, *y, *z, *w).length() > 0.1
        })
        .prop_map(|(x, y, z, w)| normalize_quat(Vec4::new(x, y, z, w)))
}

fn vec3() -> impl Strategy<Value = Vec3> {
    (-100.0f32..100.0, -100.0f32..100.0, -100.0f32..100.0).prop_map(|(x, y, z)| Vec3::new(x, y, z))
}

proptest! {
    #[test]
    fn sorted_parents_precede_children(parents in shuffled_forest()) {
        let mut skeleton = sort_hierarchy(unsorted(&parents)).unwrap();
        resolve_bind_pose(&mut skeleton).unwrap();

        prop_assert_eq!(skeleton.len(), parents.len());
        prop_assert!(skeleton.is_topologically_ordered());
        prop_assert!(skeleton.joints()[0].is_root());

        for (i, joint) in skeleton.joints().iter().enumerate() {
            let file_parent = parents[joint.import_id as usize];
            prop_assert_eq!(joint.is_root(), file_parent.is_none());
            if let Some(p) = joint.parent_index() {
                prop_assert!(p < i);
                prop_assert_eq!(Some(skeleton.joints()[p].import_id as usize), file_parent);
            }
            prop_assert_eq!(skeleton.joint_name(i), format!("joint_{}", joint.import_id));
        }
    }

    #[test]
    fn every_joint_placed_once(parents in shuffled_forest()) {
        let skeleton = sort_hierarchy(unsorted(&parents)).unwrap();
        let ids: HashSet<u32> = skeleton.joints().iter().map(|j| j.import_id).collect();
        prop_assert_eq!(ids.len(), parents.len());
        for id in 0..parents.len() as u32 {
            let index = skeleton.index_of_import_id(id).unwrap();
            prop_assert_eq!(skeleton.joints()[index].import_id, id);
        }
    }

    #[test]
    fn interpolated_translation_stays_between_keys(
        a in vec3(),
        b in vec3(),
        ra in unit_quat(),
        rb in unit_quat(),
        start in 0.0f32..10.0,
        span in 0.01f32..10.0,
        fraction in 0.001f32..0.999,
    ) {
        let end = start + span;
        let track = BoneTrack::new(vec![
            Keyframe::new(start, a, ra),
            Keyframe::new(end, b, rb),
        ]).unwrap();
        let t = start + span * fraction;
        prop_assume!(t > start && t < end);

        let sample = track.sample(t).unwrap();
        for axis in 0..3 {
            let (lo, hi) = (a[axis].min(b[axis]), a[axis].max(b[axis]));
            prop_assert!(sample.translation[axis] >= lo - 1e-3 && sample.translation[axis] <= hi + 1e-3);
        }
        prop_assert!((sample.rotation.length() - 1.0).abs() < 1e-4);
    }

    #[test]
    fn slerp_result_is_unit(a in unit_quat(), b in unit_quat(), alpha in 0.0f32..=1.0) {
        let q = slerp(a, b, alpha);
        prop_assert!((q.length() - 1.0).abs() < 1e-4);
    }

    #[test]
    fn sampling_at_keyframes_is_exact(
        keys in proptest::collection::vec((0.01f32..1.0, vec3(), unit_quat()), 1..16)
    ) {
        let mut time = 0.0;
        let keyframes: Vec<Keyframe> = keys
            .into_iter()
            .map(|(step, translation, rotation)| {
                time += step;
                Keyframe::new(time, translation, rotation)
            })
            .collect();
        let track = BoneTrack::new(keyframes.clone()).unwrap();

        for key in &keyframes {
            let sample = track.sample(key.time).unwrap();
            prop_assert_eq!(sample.translation, key.translation);
            prop_assert_eq!(sample.rotation, key.rotation);
        }

        let first = &keyframes[0];
        let last = &keyframes[keyframes.len() - 1];
        prop_assert_eq!(track.sample(first.time - 1.0).unwrap().translation, first.translation);
        prop_assert_eq!(track.sample(last.time + 1.0).unwrap().translation, last.translation);
    }

    #[test]
    fn looping_time_stays_in_range(
        duration in 0.1f32..10.0,
        speed in -3.0f32..3.0,
        steps in proptest::collection::vec(0.0f32..1.0, 1..64),
    ) {
        let track = BoneTrack::new(vec![
            Keyframe::new(0.0, Vec3::ZERO, Quat::IDENTITY),
            Keyframe::new(duration, Vec3::X, Quat::IDENTITY),
        ]).unwrap();
        let library: AnimationLibrary = [AnimationClip::new("loop", vec![track])].into_iter().collect();
        let mut state = AnimationState::new(PlaybackConfig { speed, ..PlaybackConfig::default() });
        state.play(0, &library).unwrap();

        for step in steps {
            // Keep each tick shorter than the clip so one wrap suffices
            let dt = step * duration / 3.5;
            state.advance(dt, &library);
            prop_assert!(state.time() >= 0.0 && state.time() <= duration, "time {}", state.time());
        }
    }
}
