//a Imports
use std::path::PathBuf;

//a Error
//tp Error
/// Errors produced by the matching engine
///
/// All fallible operations in this crate return `Result<_, Error>`;
/// the engine never panics on caller-supplied data.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Catalog arrays of mismatched length, an empty catalog, or an
    /// `nside` that is not a positive power of two
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A declination outside [-90, 90], or a coordinate for which a
    /// HEALPix pixel id could not be derived
    #[error("invalid coordinate: {0}")]
    InvalidCoordinate(String),

    /// Could not open, read or write a file, or a short read while
    /// parsing match records (a record line with fewer than 3 fields, or
    /// one that doesn't parse as `<i64> <i64> <f64>`)
    #[error("io error on '{path}': {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A heap or tree invariant was violated; this should be unreachable
    /// and indicates a bug in the engine rather than bad caller input
    #[error("internal error: {0}")]
    InternalError(String),
}

impl Error {
    //cp io
    /// Wrap an [std::io::Error] with the path that was being operated on
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::IoError {
            path: path.into(),
            source,
        }
    }

    //cp short_read
    /// An [Error::IoError] for a match-record line that didn't carry all
    /// three `<primary> <secondary> <cosdist>` fields
    pub fn short_read(path: impl Into<PathBuf>, line: usize, got: usize) -> Self {
        Self::io(
            path,
            std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                format!("short read at line {line}: expected 3 fields, got {got}"),
            ),
        )
    }
}
