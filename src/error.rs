//! Top-level Error Types
//!
//! Every variant here ends the process with a non-zero exit code; failures
//! of individual photos never reach this far.

use derive_more::{Display, Error};

/// A fatal error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for the command line entry points.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    #[display("could not load configuration")]
    Config,
    /// The storage base URL cannot be used to map locations to keys.
    #[display("invalid storage configuration")]
    Storage,
    #[display("could not open the media catalog")]
    Catalog,
    #[display("compression run aborted")]
    Run,
    #[display("verification failed")]
    Verify,
    /// Stdout went away (closed pipe, full disk).
    #[display("could not write report")]
    Output,
}
