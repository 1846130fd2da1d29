//! pdfstamp: refreshes the modification date in a PDF's document
//! information dictionary and fingerprints the file before and after the
//! rewrite, proving the content identity changed.
//!
//! The crate splits into a leaf digest engine and the workflow on top of it:
//! [`digest`] streams file content through MD5 and renders lowercase hex,
//! [`document`] wraps the PDF library behind a small store trait, and
//! [`workflow`] orchestrates validate, fingerprint, stamp, save, fingerprint.

pub mod digest;
pub mod document;
pub mod error;
pub mod workflow;

// Re-exports for crate consumers
pub use digest::{encode_hex, fingerprint};
pub use document::{DocumentStore, PdfStore};
pub use error::{Error, Result};
pub use workflow::{update_modification_timestamp, FingerprintPair, Outcome, Rejection};
