use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::cli;

pub const DEFAULT_INDEX_FILE: &str = "index.html";
pub const DEFAULT_SCRIPT_SUFFIX: &str = ".py";
pub const DEFAULT_INTERPRETER: &str = "python";
pub const DEFAULT_MAX_BODY_BYTES: u64 = 16 * 1024 * 1024;

/// What the case chain needs to know about the world. Built once at
/// startup and never mutated.
#[derive(Debug, Clone)]
pub struct Settings {
    /// The served root. Canonical when built from the command line.
    pub root: PathBuf,
    pub index_file: String,
    pub script_suffix: String,
    pub interpreter: PathBuf,
    /// Ceiling for file reads and for captured script output.
    pub max_body_bytes: u64,
}

impl Settings {
    #[cfg(test)]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            index_file: DEFAULT_INDEX_FILE.into(),
            script_suffix: DEFAULT_SCRIPT_SUFFIX.into(),
            interpreter: DEFAULT_INTERPRETER.into(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl TryFrom<&cli::Serve> for Settings {
    type Error = anyhow::Error;
    fn try_from(value: &cli::Serve) -> Result<Self> {
        let root = value
            .root
            .canonicalize()
            .with_context(|| format!("Served root {}", value.root.display()))?;
        anyhow::ensure!(root.is_dir(), "{} is not a directory", root.display());
        Ok(Self {
            root,
            index_file: value.index_file.clone(),
            script_suffix: value.script_suffix.clone(),
            interpreter: value.interpreter.clone(),
            max_body_bytes: value.max_body_bytes,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use anyhow::Result;
    use clap::Parser;
    use tempfile::TempDir;

    fn serve(args: &[&str]) -> cli::Serve {
        let mut argv = vec!["caseserve", "serve"];
        argv.extend_from_slice(args);
        let cli::Cli::Serve(serve) = cli::Cli::try_parse_from(argv).expect("parses");
        serve
    }

    #[test]
    fn the_root_is_canonicalised() -> Result<()> {
        let dir = TempDir::new()?;
        std::fs::create_dir(dir.path().join("sub"))?;
        let relative = dir.path().join("sub").join("..");

        let settings = Settings::try_from(&serve(&["--root", &relative.to_string_lossy()]))?;

        assert_eq!(settings.root, dir.path().canonicalize()?);
        assert_eq!(settings.index_file, DEFAULT_INDEX_FILE);
        assert_eq!(settings.script_suffix, DEFAULT_SCRIPT_SUFFIX);
        Ok(())
    }

    #[test]
    fn a_missing_root_is_refused() {
        let settings = Settings::try_from(&serve(&["--root", "/no/such/dir/anywhere"]));
        assert!(settings.is_err());
    }

    #[test]
    fn a_file_root_is_refused() -> Result<()> {
        let dir = TempDir::new()?;
        let file = dir.path().join("file.txt");
        std::fs::write(&file, "x")?;

        assert!(Settings::try_from(&serve(&["--root", &file.to_string_lossy()])).is_err());
        Ok(())
    }
}
