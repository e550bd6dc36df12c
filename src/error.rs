use std::fmt;

use thiserror::Error;

use crate::prop::{ConstraintViolation, Media};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// NotFound indicates that no registered driver offered a configuration
    /// satisfying the requested constraints.
    #[error("{0}")]
    NotFound(NotFoundError),

    /// ErrDriverAlreadyOpened indicates an open was attempted on a driver
    /// that is not in the closed state.
    #[error("driver is already opened")]
    ErrDriverAlreadyOpened,

    /// ErrDriverAlreadyClosed indicates a close was attempted on a driver
    /// that is already closed.
    #[error("driver is already closed")]
    ErrDriverAlreadyClosed,

    /// ErrDriverNotOpened indicates an operation that requires an opened
    /// driver was called on a closed or running one.
    #[error("driver is not opened")]
    ErrDriverNotOpened,

    #[error("driver is not a video recorder")]
    ErrDriverNotVideoRecorder,
    #[error("driver is not an audio recorder")]
    ErrDriverNotAudioRecorder,

    /// ErrDuplicateTrack indicates two tracks with the same id were added to
    /// a single media stream.
    #[error("track {0} already exists in the media stream")]
    ErrDuplicateTrack(String),

    #[error("track has been stopped")]
    ErrTrackStopped,

    #[error("Other errors: {0}")]
    ErrOthers(String),
}

impl Error {
    pub fn new(message: String) -> Self {
        Error::ErrOthers(message)
    }
}

/// A configuration reported by a driver that was considered during
/// selection, together with the reasons it was rejected.
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedCandidate {
    pub driver_id: String,
    pub label: String,
    pub properties: Media,
    pub violations: Vec<ConstraintViolation>,
}

/// NotFoundError carries every configuration discovered while resolving a
/// request, along with the rendered request itself.
#[derive(Debug, Clone, PartialEq)]
pub struct NotFoundError {
    pub candidates: Vec<RejectedCandidate>,
    pub constraints: String,
}

impl std::error::Error for NotFoundError {}

impl fmt::Display for NotFoundError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "failed to find the best driver that fits the constraints:"
        )?;
        writeln!(f, "============ Found Properties ============")?;
        writeln!(f)?;
        for (i, candidate) in self.candidates.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            writeln!(f, "[{}] {}", candidate.driver_id, candidate.label)?;
            write!(f, "{}", candidate.properties)?;
            for violation in &candidate.violations {
                writeln!(f, "  ! {violation}")?;
            }
        }
        writeln!(f)?;
        writeln!(f, "=============== Constraints ==============")?;
        writeln!(f)?;
        write!(f, "{}", self.constraints)
    }
}

impl From<NotFoundError> for Error {
    fn from(err: NotFoundError) -> Self {
        Error::NotFound(err)
    }
}
