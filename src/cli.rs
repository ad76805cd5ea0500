use std::path::PathBuf;

use crate::config;

/// Serve content.
#[derive(clap::Args, Debug)]
pub struct Serve {
    /// The directory every request path is resolved against.
    #[arg(long, default_value = ".")]
    pub root: PathBuf,
    /// The host the server should bind to.
    #[arg(long, default_value = "localhost")]
    pub host: String,
    /// The port the server should listen on.
    #[arg(long, short, default_value_t = 8000)]
    pub port: u16,
    /// Served in place of a listing when a directory contains it.
    #[arg(long, default_value = config::DEFAULT_INDEX_FILE)]
    pub index_file: String,
    /// Files whose name ends with this are run, not served.
    #[arg(long, default_value = config::DEFAULT_SCRIPT_SUFFIX)]
    pub script_suffix: String,
    /// The program scripts are run with. It gets the script path as its
    /// only argument.
    #[arg(long, default_value = config::DEFAULT_INTERPRETER)]
    pub interpreter: PathBuf,
    /// Largest file, or script output, that will be held in memory.
    #[arg(long, default_value_t = config::DEFAULT_MAX_BODY_BYTES)]
    pub max_body_bytes: u64,
}

/// Caseserve, a tiny HTTP server for files, listings and scripts.
#[derive(clap::Parser, Debug)]
pub enum Cli {
    Serve(Serve),
}
