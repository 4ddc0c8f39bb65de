//! Root CLI structure for gt-tools

use clap::{Parser, Subcommand};
use clap_complete::Shell;

#[derive(Parser)]
#[command(name = "gt-tools")]
#[command(about = "Command-line tools for skeletal animation assets", long_about = None)]
#[command(version)]
#[command(author)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (can be repeated for more detail)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Skeleton operations
    Skeleton {
        #[command(subcommand)]
        command: crate::commands::skeleton::SkeletonCommands,
    },

    /// Animation clip operations
    Clip {
        #[command(subcommand)]
        command: crate::commands::clip::ClipCommands,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}
