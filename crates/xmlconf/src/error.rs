//! Error types for xmlconf

use thiserror::Error;

/// Main error type for xmlconf
#[derive(Error, Debug)]
pub enum Error {
    /// File could not be opened, read or written
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// Error reported by the XML engine
    #[error("xml error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Document is well-formed as far as the engine is concerned but cannot
    /// be turned into a single element tree
    #[error("malformed xml at byte {offset}: {message}")]
    Malformed { offset: u64, message: String },

    /// Elements nest deeper than [`MAX_DEPTH`](crate::config::MAX_DEPTH)
    #[error("elements nested deeper than {limit} levels")]
    DepthLimit { limit: usize },

    /// Container has no tag key to build a root element from
    #[error("nothing to write: container has no root element key")]
    NoRootElement,
}

impl Error {
    pub fn malformed(offset: u64, message: impl Into<String>) -> Self {
        Self::Malformed {
            offset,
            message: message.into(),
        }
    }
}

/// Result type alias for xmlconf
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_display() {
        let err = Error::malformed(12, "no root element");
        assert_eq!(err.to_string(), "malformed xml at byte 12: no root element");
    }

    #[test]
    fn test_depth_limit_display() {
        let err = Error::DepthLimit { limit: 256 };
        assert_eq!(err.to_string(), "elements nested deeper than 256 levels");
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
        assert!(err.to_string().contains("gone"));
    }
}
