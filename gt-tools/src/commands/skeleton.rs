//! Skeleton command implementations

use anyhow::{Context, Result};
use clap::Subcommand;
use console::style;
use log::{info, warn};
use std::path::{Path, PathBuf};

use gt_anim::{Skeleton, SkeletonFormat, SkeletonSummary, encode_flat_skeleton, load_skeleton};

use crate::utils::{
    TreeOptions, add_table_row, create_table, format_vec3, render_tree, skeleton_tree,
};

#[derive(Subcommand)]
pub enum SkeletonCommands {
    /// Display the joints of a skeleton in canonical order
    Info {
        /// Path to the skeleton file
        file: PathBuf,

        /// Source format: a|hierarchical, b|trs, c|flat
        #[arg(short, long)]
        format: SkeletonFormat,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the joint hierarchy as a tree
    Tree {
        /// Path to the skeleton file
        file: PathBuf,

        /// Source format: a|hierarchical, b|trs, c|flat
        #[arg(short, long)]
        format: SkeletonFormat,

        /// Maximum depth to display
        #[arg(long)]
        depth: Option<usize>,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,

        /// Show compact metadata inline
        #[arg(long)]
        compact: bool,
    },

    /// Re-encode a skeleton as a sorted flat (format C) file
    Convert {
        /// Path to the input skeleton file
        input: PathBuf,

        /// Path to write the flat skeleton
        output: PathBuf,

        /// Source format: a|hierarchical, b|trs, c|flat
        #[arg(short, long)]
        format: SkeletonFormat,
    },
}

pub fn execute(command: SkeletonCommands) -> Result<()> {
    match command {
        SkeletonCommands::Info { file, format, json } => execute_info(&file, format, json),
        SkeletonCommands::Tree {
            file,
            format,
            depth,
            no_color,
            compact,
        } => execute_tree(
            &file,
            format,
            &TreeOptions {
                max_depth: depth,
                no_color,
                show_metadata: true,
                compact,
            },
        ),
        SkeletonCommands::Convert {
            input,
            output,
            format,
        } => execute_convert(&input, &output, format),
    }
}

/// Import a skeleton file, attaching the path to any failure
pub fn open_skeleton(path: &Path, format: SkeletonFormat) -> Result<Skeleton> {
    load_skeleton(path, format)
        .with_context(|| format!("Failed to load {format} skeleton: {}", path.display()))
}

fn execute_info(path: &Path, format: SkeletonFormat, json: bool) -> Result<()> {
    let skeleton = open_skeleton(path, format)?;
    let summary = SkeletonSummary::new(&skeleton);

    if json {
        let text =
            serde_json::to_string_pretty(&summary).context("Failed to serialize skeleton summary")?;
        println!("{text}");
        return Ok(());
    }

    println!("\n{}", style("Skeleton Information").bold().underlined());
    println!("File: {}", style(path.display()).cyan());
    println!("Name: {}", style(&summary.name).yellow());
    println!("Format: {}", style(summary.format).yellow());
    println!("Joints: {}", style(summary.joint_count).green());
    println!("Roots: {}", style(summary.root_count).green());
    println!("Max depth: {}", style(summary.max_depth).green());

    if !summary.joints.is_empty() {
        println!();
        let mut table = create_table(&["Index", "Import ID", "Name", "Parent", "Depth", "Bind translation"]);
        for joint in &summary.joints {
            let parent = if joint.parent < 0 {
                "-".to_string()
            } else {
                joint.parent.to_string()
            };
            add_table_row(
                &mut table,
                vec![
                    joint.index.to_string(),
                    joint.import_id.to_string(),
                    joint.name.clone(),
                    parent,
                    joint.depth.to_string(),
                    format_vec3(joint.bind_translation),
                ],
            );
        }
        table.printstd();
    }

    Ok(())
}

fn execute_tree(path: &Path, format: SkeletonFormat, options: &TreeOptions) -> Result<()> {
    let skeleton = open_skeleton(path, format)?;
    print!("{}", render_tree(&skeleton_tree(&skeleton), options));
    Ok(())
}

fn execute_convert(input: &Path, output: &Path, format: SkeletonFormat) -> Result<()> {
    let skeleton = open_skeleton(input, format)?;

    let reordered = skeleton
        .joints()
        .iter()
        .enumerate()
        .filter(|(index, joint)| joint.import_id as usize != *index)
        .count();
    if reordered > 0 {
        warn!(
            "{reordered} joints moved during sorting; clips authored against {} must be re-exported",
            input.display()
        );
    }

    let data = encode_flat_skeleton(&skeleton).context("Failed to encode skeleton")?;
    std::fs::write(output, &data)
        .with_context(|| format!("Failed to write output file: {}", output.display()))?;
    info!("Wrote {} bytes", data.len());

    println!(
        "{} {} ({}) -> {} ({})",
        style("Converted").green().bold(),
        input.display(),
        format,
        output.display(),
        SkeletonFormat::Flat
    );
    Ok(())
}
