// src/error.rs
use std::io;
use thiserror::Error;

/// Errors produced anywhere in the reader's public surface.
///
/// Parse failures (bad lead-in, short read, inconsistent chunk math) are
/// [`TdmsError::MalformedFile`]. Missing or unimplemented format features
/// surface as [`TdmsError::UnsupportedFeature`]. Everything else maps onto
/// the ordinary lookup / argument / state error triad.
#[derive(Error, Debug)]
pub enum TdmsError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("malformed TDMS file at segment {segment}, byte offset {offset}: {reason}")]
    MalformedFile {
        segment: usize,
        offset: u64,
        reason: String,
    },

    #[error("{0}")]
    InvalidArgument(String),

    #[error("index out of range")]
    IndexOutOfRange,

    #[error("{0}")]
    StateError(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("unsupported feature: {0}")]
    UnsupportedFeature(String),
}

impl TdmsError {
    pub fn malformed(segment: usize, offset: u64, reason: impl Into<String>) -> Self {
        TdmsError::MalformedFile {
            segment,
            offset,
            reason: reason.into(),
        }
    }

    pub fn not_found_channel(group: &str, channel: &str) -> Self {
        TdmsError::NotFound(format!("channel '{channel}' in group '{group}'"))
    }

    pub fn not_found_group(group: &str) -> Self {
        TdmsError::NotFound(format!("group '{group}'"))
    }
}

pub type Result<T> = std::result::Result<T, TdmsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_match_spec_wording() {
        let e = TdmsError::InvalidArgument("offset must be non-negative".into());
        assert_eq!(e.to_string(), "offset must be non-negative");

        let e = TdmsError::StateError(
            "Cannot read data after the underlying TDMS reader is closed".into(),
        );
        assert_eq!(
            e.to_string(),
            "Cannot read data after the underlying TDMS reader is closed"
        );
    }

    #[test]
    fn not_found_includes_parent() {
        let e = TdmsError::not_found_channel("grp", "chan");
        assert_eq!(e.to_string(), "channel 'chan' in group 'grp' not found");
    }
}
