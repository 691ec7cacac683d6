use core::fmt;

use crate::Direction;

/// Errors reported by the tree's structural primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A rotation was requested on a node that lacks the child which would take its place.
    InvariantViolation {
        /// The rotation that was attempted. The missing child is on the opposite side.
        rotation: Direction,
    },
}

/// Result alias for tree operations that can fail.
pub type Result<T> = core::result::Result<T, Error>;

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvariantViolation { rotation } => write!(
                f,
                "cannot rotate {rotation} at a node without a {} child",
                rotation.opposite()
            ),
        }
    }
}

impl core::error::Error for Error {}
