//! Error conversion implementations.
//!
//! This module contains From trait implementations to convert errors of the
//! underlying XML and ZIP crates into the unified Error type.

use super::types::Error;

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::ParseError(err.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for Error {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        Error::ParseError(format!("Invalid attribute: {}", err))
    }
}

impl From<std::str::Utf8Error> for Error {
    fn from(err: std::str::Utf8Error) -> Self {
        Error::ParseError(format!("Invalid UTF-8: {}", err))
    }
}

#[cfg(feature = "archive")]
impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(e) => Error::Io(e),
            zip::result::ZipError::FileNotFound => {
                Error::NotFound("Archive entry not found".to_string())
            },
            other => Error::ZipError(other.to_string()),
        }
    }
}
