//! Command-line entry point for pdfstamp.
//!
//! One positional argument, the PDF to update. Validation problems are
//! reported and exit cleanly; document or digest failures exit non-zero.

use std::path::Path;
use std::process;

use clap::{Arg, Command};
use pdfstamp::document::PdfStore;
use pdfstamp::workflow::{self, Outcome};
use tracing::{error, info};

fn main() {
    let matches = build_cli().get_matches();

    init_logging();

    let file = matches.get_one::<String>("file").unwrap();

    match workflow::update_modification_timestamp(&PdfStore, Path::new(file)) {
        Ok(Outcome::Updated(pair)) => {
            info!("MD5 before: {}", pair.before);
            info!("MD5 after:  {}", pair.after);
        }
        Ok(Outcome::Rejected(_)) => {
            // Already reported by the workflow; a rejection is not fatal.
        }
        Err(err) => {
            error!("{err}");
            process::exit(1);
        }
    }
}

fn build_cli() -> Command {
    Command::new("pdfstamp")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Sets the modification date in a PDF's metadata to now and \
                reports the file's MD5 fingerprint before and after")
        .arg(
            Arg::new("file")
                .value_name("FILE")
                .help("PDF file to update (must end in .pdf)")
                .required(true),
        )
}

fn init_logging() {
    use tracing_subscriber::{EnvFilter, FmtSubscriber};

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("pdfstamp=info")),
        )
        .with_target(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");
}
