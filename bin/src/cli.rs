use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Local-first markdown notes with version history
#[derive(Debug, Parser)]
#[command(name = "localwrite", author, version, about, long_about = None)]
pub struct Cli {
    /// Content directory holding the markdown files
    #[arg(short, long, env = "LOCALWRITE_DIR")]
    pub dir: Option<PathBuf>,

    /// Config file, instead of the discovered `.localwrite/config.toml`
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Log file, or a directory to place the log file in
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the markdown files
    Files,

    /// Create an empty markdown file
    New {
        /// File name; `.md` is appended when missing
        name: String,
    },

    /// Rewrite a file in canonical markdown
    Fmt { file: String },

    /// Save the current content as a manual version
    Commit {
        file: String,

        /// Note stored with the version
        #[arg(short, long)]
        message: Option<String>,
    },

    /// Save the current content as an automatic version, pruning older ones
    Autosave { file: String },

    /// List the versions of a file, newest first
    Log { file: String },

    /// Print the content of a version
    Show {
        file: String,

        /// Version id, or an unambiguous prefix of it
        id: String,
    },

    /// Replace a file with the content of a version
    Restore {
        file: String,

        /// Version id, or an unambiguous prefix of it
        id: String,
    },
}
