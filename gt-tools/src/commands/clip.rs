//! Animation clip command implementations

use anyhow::{Context, Result, ensure};
use clap::Subcommand;
use console::style;
use log::info;
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use gt_anim::{
    AnimationClip, AnimationLibrary, ClipSummary, PlaybackConfig, PoseOptions, RigContext,
    Skeleton, SkeletonFormat, load_clip,
};

use super::skeleton::open_skeleton;
use crate::utils::{add_table_row, create_table, format_vec3};

#[derive(Subcommand)]
pub enum ClipCommands {
    /// Display the tracks of a clip bound to a skeleton
    Info {
        /// Path to the clip file
        file: PathBuf,

        /// Skeleton the clip was authored against
        #[arg(short, long)]
        skeleton: PathBuf,

        /// Skeleton format: a|hierarchical, b|trs, c|flat
        #[arg(short, long)]
        format: SkeletonFormat,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Play clips and print the resulting skinning matrices
    Sample {
        /// Clip files, in library order
        #[arg(required = true)]
        clips: Vec<PathBuf>,

        /// Skeleton the clips were authored against
        #[arg(short, long)]
        skeleton: PathBuf,

        /// Skeleton format: a|hierarchical, b|trs, c|flat
        #[arg(short, long)]
        format: SkeletonFormat,

        /// Jump straight to this time in the first clip
        #[arg(long, conflicts_with_all = ["ticks", "dt"])]
        time: Option<f32>,

        /// Number of ticks to run
        #[arg(long, default_value_t = 1)]
        ticks: u32,

        /// Seconds per tick
        #[arg(long, default_value_t = 1.0 / 30.0)]
        dt: f32,

        /// Playback speed (negative plays backward)
        #[arg(long, default_value_t = 1.0, allow_negative_numbers = true)]
        speed: f32,

        /// Hold the last frame instead of looping
        #[arg(long)]
        no_loop: bool,

        /// Move on to the next clip at each loop
        #[arg(long)]
        sequence: bool,

        /// Extract root translation into an object offset
        #[arg(long)]
        root_motion: bool,

        /// Add only the keyed translation to non-root joints
        #[arg(long)]
        no_bind_offset: bool,

        /// Print the pose as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Playback settings gathered from the command line
struct SampleSettings {
    time: Option<f32>,
    ticks: u32,
    dt: f32,
    config: PlaybackConfig,
    options: PoseOptions,
    json: bool,
}

pub fn execute(command: ClipCommands) -> Result<()> {
    match command {
        ClipCommands::Info {
            file,
            skeleton,
            format,
            json,
        } => execute_info(&file, &skeleton, format, json),
        ClipCommands::Sample {
            clips,
            skeleton,
            format,
            time,
            ticks,
            dt,
            speed,
            no_loop,
            sequence,
            root_motion,
            no_bind_offset,
            json,
        } => execute_sample(
            &clips,
            &skeleton,
            format,
            &SampleSettings {
                time,
                ticks,
                dt,
                config: PlaybackConfig {
                    speed,
                    looping: !no_loop,
                    sequence,
                    root_motion,
                },
                options: PoseOptions {
                    prepend_bind_offset_to_non_root: !no_bind_offset,
                },
                json,
            },
        ),
    }
}

fn open_clip(path: &Path, skeleton: &Skeleton) -> Result<AnimationClip> {
    load_clip(path, skeleton).with_context(|| format!("Failed to load clip: {}", path.display()))
}

fn execute_info(path: &Path, skeleton_path: &Path, format: SkeletonFormat, json: bool) -> Result<()> {
    let skeleton = open_skeleton(skeleton_path, format)?;
    let clip = open_clip(path, &skeleton)?;
    let summary = ClipSummary::new(&clip, &skeleton);

    if json {
        let text =
            serde_json::to_string_pretty(&summary).context("Failed to serialize clip summary")?;
        println!("{text}");
        return Ok(());
    }

    println!("\n{}", style("Clip Information").bold().underlined());
    println!("File: {}", style(path.display()).cyan());
    println!("Name: {}", style(&summary.name).yellow());
    println!("Duration: {}s", style(format!("{:.3}", summary.duration)).green());
    println!(
        "Animated bones: {}/{}",
        style(summary.animated_bones).green(),
        style(summary.total_bones).dim()
    );
    println!("Keyframes: {}", style(summary.keyframes).green());

    if !summary.tracks.is_empty() {
        println!();
        let mut table = create_table(&["Bone", "Import ID", "Name", "Keys", "Start", "End"]);
        for track in &summary.tracks {
            add_table_row(
                &mut table,
                vec![
                    track.bone.to_string(),
                    track.import_id.to_string(),
                    track.bone_name.clone(),
                    track.keyframes.to_string(),
                    format!("{:.3}", track.start),
                    format!("{:.3}", track.end),
                ],
            );
        }
        table.printstd();
    }

    Ok(())
}

fn execute_sample(
    clip_paths: &[PathBuf],
    skeleton_path: &Path,
    format: SkeletonFormat,
    settings: &SampleSettings,
) -> Result<()> {
    ensure!(
        settings.time.is_none_or(f32::is_finite)
            && settings.dt.is_finite()
            && settings.config.speed.is_finite(),
        "Time, tick length and speed must be finite numbers"
    );

    let skeleton = open_skeleton(skeleton_path, format)?;
    let mut library = AnimationLibrary::new();
    for path in clip_paths {
        library.push(open_clip(path, &skeleton)?);
    }

    let mut rig = RigContext::new(
        Arc::new(skeleton),
        Arc::new(library),
        settings.config,
        settings.options,
    );
    rig.play(0).context("Failed to start playback")?;

    if let Some(time) = settings.time {
        rig.seek(time);
    } else {
        for _ in 0..settings.ticks {
            let events = rig.tick(settings.dt);
            if events.clip_changed {
                info!("Switched to clip {}", clip_name(&rig));
            }
        }
    }

    if settings.json {
        print_pose_json(&rig)
    } else {
        print_pose(&rig);
        Ok(())
    }
}

fn clip_name(rig: &RigContext) -> &str {
    rig.state()
        .current_clip(rig.library())
        .map_or("", AnimationClip::name)
}

fn print_pose(rig: &RigContext) {
    let skeleton = rig.skeleton();
    let pose = rig.pose();

    println!("\n{}", style("Pose").bold().underlined());
    println!("Clip: {}", style(clip_name(rig)).yellow());
    println!("Time: {}s", style(format!("{:.3}", rig.state().time())).green());
    if rig.state().config().root_motion {
        println!("Root offset: {}", style(format_vec3(rig.root_offset().to_array())).green());
    }
    println!();

    let mut table = create_table(&["Index", "Import ID", "Name", "Global translation", "Skinning matrix"]);
    for (index, joint) in skeleton.joints().iter().enumerate() {
        let skin = pose
            .skin_matrix(joint.import_id)
            .map(|m| {
                m.transpose()
                    .to_cols_array_2d()
                    .iter()
                    .map(|row| format!("{:8.3} {:8.3} {:8.3} {:8.3}", row[0], row[1], row[2], row[3]))
                    .collect::<Vec<_>>()
                    .join("\n")
            })
            .unwrap_or_default();
        add_table_row(
            &mut table,
            vec![
                index.to_string(),
                joint.import_id.to_string(),
                skeleton.joint_name(index).to_string(),
                format_vec3(pose.global()[index].w_axis.truncate().to_array()),
                skin,
            ],
        );
    }
    table.printstd();
}

fn print_pose_json(rig: &RigContext) -> Result<()> {
    let skeleton = rig.skeleton();
    let pose = rig.pose();

    let joints: Vec<_> = skeleton
        .joints()
        .iter()
        .enumerate()
        .map(|(index, joint)| {
            json!({
                "index": index,
                "import_id": joint.import_id,
                "name": skeleton.joint_name(index),
                "global": pose.global()[index].to_cols_array(),
                "skin": pose.skin_matrix(joint.import_id).map(|m| m.to_cols_array()),
            })
        })
        .collect();

    let report = json!({
        "clip": clip_name(rig),
        "time": rig.state().time(),
        "root_offset": rig.root_offset().to_array(),
        "joints": joints,
    });
    let text = serde_json::to_string_pretty(&report).context("Failed to serialize pose")?;
    println!("{text}");
    Ok(())
}
