//! Error types and handling for the pdfstamp crate.

use std::io;
use std::path::{Path, PathBuf};
use std::result::Result as StdResult;

use thiserror::Error;

/// Custom result type for pdfstamp operations.
pub type Result<T> = StdResult<T, Error>;

/// Core error type for fingerprinting and document manipulation.
///
/// Path validation failures are deliberately absent here: a rejected path is
/// an ordinary [`crate::workflow::Outcome`], not an error.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// A byte stream handed to the digest engine failed mid-read.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A file could not be opened or read for fingerprinting.
    #[error("cannot read file \"{}\": {source}", .path.display())]
    Storage {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The PDF library could not load or save the document.
    #[error("cannot process document \"{}\": {source}", .path.display())]
    Document {
        path: PathBuf,
        #[source]
        source: lopdf::Error,
    },
}

impl Error {
    /// Storage failure carrying the absolute form of `path`.
    pub(crate) fn storage(path: &Path, source: io::Error) -> Self {
        Error::Storage {
            path: absolute(path),
            source,
        }
    }

    /// Document failure carrying the absolute form of `path`. The source is
    /// anything the PDF library reports, including the raw I/O error its
    /// save path surfaces.
    pub(crate) fn document(path: &Path, source: impl Into<lopdf::Error>) -> Self {
        Error::Document {
            path: absolute(path),
            source: source.into(),
        }
    }
}

// Lexical only: the file may not exist, so this must not touch it.
fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}
