//! The only two places the tool touches disk: reading the config and writing the report.

use std::{
    io,
    path::{Path, PathBuf},
};

use log::{debug, info};
use miette::Diagnostic;
use thiserror::Error;

use crate::dry_run::DryRun;

/// Writes `contents` to `path`, or writes `contents` to the dry-run output if there is one.
pub(crate) fn write(dry_run: DryRun, path: &Path, contents: &str) -> Result<(), Error> {
    if let Some(stdout) = dry_run {
        info!("Would write the following report to {}", path.display());
        stdout
            .write_all(contents.as_bytes())
            .and_then(|()| stdout.flush())
            .map_err(Error::Stdout)
    } else {
        debug!("Writing {} bytes to {}", contents.len(), path.display());
        std::fs::write(path, contents).map_err(|source| Error::Write {
            path: path.into(),
            source,
        })
    }
}

pub(crate) fn read_to_string(path: &Path) -> Result<String, Error> {
    std::fs::read_to_string(path).map_err(|source| Error::Read {
        path: path.into(),
        source,
    })
}

#[derive(Debug, Diagnostic, Error)]
pub(crate) enum Error {
    #[error("Error writing to {path}: {source}")]
    #[diagnostic(
        code(fs::write),
        help("Check that the output directory exists and is writable, or pass a different `--output`.")
    )]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Error reading from {path}: {source}")]
    #[diagnostic(
        code(fs::read),
        help("Pass the path of an existing config file with `--config`.")
    )]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Error writing to stdout: {0}")]
    #[diagnostic(code(fs::stdout))]
    Stdout(#[source] io::Error),
}
