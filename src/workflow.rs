//! The modification-date update workflow.
//!
//! One invocation handles exactly one file: fingerprint, load, stamp, save,
//! fingerprint again. Validation failures are turned away as values; I/O
//! failures from the digest engine or the document store abort the run
//! before the after-fingerprint is ever computed.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::{error, info, warn};

use crate::digest;
use crate::document::DocumentStore;
use crate::error::{Error, Result};

/// Hex fingerprints of one file taken around the rewrite, plus the resolved
/// absolute path they belong to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FingerprintPair {
    pub path: PathBuf,
    pub before: String,
    pub after: String,
}

/// Why a path was turned away before any document was opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// The argument does not name a `.pdf` file.
    NotAPdf,
    /// The file is missing, or is not a regular file.
    NoSuchFile,
}

/// Result of one workflow invocation. A rejection is a normal outcome, not
/// an error; the process exits cleanly on it.
#[derive(Debug)]
pub enum Outcome {
    Updated(FingerprintPair),
    Rejected(Rejection),
}

/// Sets the document's modification date to the current wall-clock time and
/// proves the content changed by fingerprinting the file on both sides of
/// the save.
///
/// The document handle lives from `load` until just before the second
/// fingerprint and is released on every exit path, including a failed save.
/// No retries: a load, save or digest failure surfaces immediately.
pub fn update_modification_timestamp<S: DocumentStore>(store: &S, path: &Path) -> Result<Outcome> {
    if path.extension().map_or(true, |ext| ext != "pdf") {
        warn!("expected a .pdf file, got \"{}\"", path.display());
        return Ok(Outcome::Rejected(Rejection::NotAPdf));
    }
    if !path.is_file() {
        error!("file \"{}\" does not exist", path.display());
        return Ok(Outcome::Rejected(Rejection::NoSuchFile));
    }
    let resolved = fs::canonicalize(path).map_err(|source| Error::storage(path, source))?;
    info!("file name: {}", path.display());
    info!("full path: {}", resolved.display());

    let before = digest::fingerprint(&resolved)?;

    let mut handle = store.load(&resolved)?;
    store.set_modification_timestamp(&mut handle, Local::now());
    store.save(&mut handle, &resolved)?;
    drop(handle);

    let after = digest::fingerprint(&resolved)?;

    Ok(Outcome::Updated(FingerprintPair {
        path: resolved,
        before,
        after,
    }))
}
