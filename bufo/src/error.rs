use std::fmt::Display;

/// A position or range that was requested from a buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Requested {
    /// An absolute or relative offset, as passed by the caller.
    Offset(isize),

    /// `length` bytes starting at `start`.
    Range { start: usize, length: usize },
}

impl Display for Requested {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Offset(offset) => write!(f, "offset {offset}"),
            Self::Range { start, length } => {
                write!(f, "range {start}..{}", start.saturating_add(*length))
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{operation}: {requested} out of bounds (length {length})")]
    Bounds {
        operation: &'static str,
        requested: Requested,
        length: usize,
    },

    #[error("Invalid endianness: {0}. Use little (1) or big (2).")]
    Configuration(String),

    #[error("Can't construct cursor: {0}")]
    Construction(&'static str),

    #[error("{operation} is not supported in this environment: {reason}")]
    UnsupportedEnvironment {
        operation: &'static str,
        reason: &'static str,
    },

    /// The storage was borrowed through a [`Storage`](crate::Storage) handle
    /// while the cursor tried to access it.
    #[error("{operation}: storage is already borrowed")]
    Borrowed { operation: &'static str },

    #[error("I/O error")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn offset_out_of_bounds(
        operation: &'static str,
        offset: isize,
        length: usize,
    ) -> Self {
        tracing::debug!(operation, offset, length, "offset out of bounds");
        Self::Bounds {
            operation,
            requested: Requested::Offset(offset),
            length,
        }
    }

    pub(crate) fn range_out_of_bounds(
        operation: &'static str,
        start: usize,
        length: usize,
        buf_length: usize,
    ) -> Self {
        tracing::debug!(
            operation,
            start,
            length,
            buf_length,
            "range out of bounds"
        );
        Self::Bounds {
            operation,
            requested: Requested::Range { start, length },
            length: buf_length,
        }
    }

    pub(crate) fn borrowed(operation: &'static str) -> Self {
        tracing::debug!(operation, "storage already borrowed");
        Self::Borrowed { operation }
    }

    #[inline]
    pub fn is_bounds(&self) -> bool {
        matches!(self, Self::Bounds { .. })
    }
}

/// Returns `start..start + length` if it fits into a buffer of `buf_length`
/// bytes.
pub(crate) fn check_range(
    operation: &'static str,
    start: usize,
    length: usize,
    buf_length: usize,
) -> Result<std::ops::Range<usize>, Error> {
    start
        .checked_add(length)
        .filter(|end| *end <= buf_length)
        .map(|end| start..end)
        .ok_or_else(|| Error::range_out_of_bounds(operation, start, length, buf_length))
}
