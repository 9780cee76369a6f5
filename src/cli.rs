//! CLI argument definitions.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

/// Top-level CLI parser for `franklin`.
#[derive(Debug, Parser)]
#[command(name = "franklin", version, about = "Download, edit and upload course exercises")]
pub struct Cli {
    /// More output on stderr (-v info, -vv debug).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// The command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Course and exercise, picked interactively when omitted.
#[derive(Debug, Clone, Default, Args)]
pub struct ExerciseArgs {
    /// Course name.
    #[arg(long)]
    pub course: Option<String>,
    /// Exercise name.
    #[arg(long)]
    pub exercise: Option<String>,
}

/// Supported top-level subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Clone an exercise, or update a local copy.
    Download(ExerciseArgs),
    /// Commit and push changes to tracked files.
    Upload {
        /// Exercise checkout.
        #[arg(default_value = ".")]
        path: PathBuf,
        /// Remove the checkout after a successful upload.
        #[arg(long)]
        remove: bool,
    },
    /// Run the full edit cycle: download, work in Jupyter, upload.
    Jupyter(ExerciseArgs),
    /// Show the state of a checkout.
    Status {
        /// Exercise checkout.
        #[arg(default_value = ".")]
        path: PathBuf,
    },
    /// Open the merge tool on unresolved conflicts.
    Resolve {
        /// Exercise checkout.
        #[arg(default_value = ".")]
        path: PathBuf,
    },
    /// Create an ssh key and register it with GitLab.
    SshKeygen,
    /// List courses, or the exercises of one course.
    Exercises {
        /// Course to list exercises for.
        #[arg(long)]
        course: Option<String>,
    },
}
