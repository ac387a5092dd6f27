//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueHint};

/// Branching dialog trees: play, inspect and check dialog files
#[derive(Parser, Debug)]
#[command(name = "dialogtree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug output, repeat for more (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub debug: u8,

    /// Config file layered over the global one
    #[arg(long, global = true, env = "DIALOGTREE_CONFIG", value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Walk through a dialog on the terminal
    Play {
        /// Dialog file (.json)
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
    },

    /// Print the branch outline of a dialog
    Tree {
        /// Dialog file (.json)
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
    },

    /// Check that every branch has at least one line
    Check {
        /// Dialog file (.json)
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
    },

    /// Write the built-in sample dialog
    Demo {
        /// Target file (.json)
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,

        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show effective settings
    Show,
    /// Show global config file location
    Path,
}
