use std::num::{ParseFloatError, ParseIntError};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum M3u8Error {
    #[error("Syntax error in manifest on line {lineno}: {line}")]
    Syntax { lineno: usize, line: String },

    #[error("No key found for key data: {0}")]
    KeyNotFound(String),

    #[error("There can not be `absolute_uri` with no `base_uri` set")]
    MissingBaseUri,

    #[error("Missing attribute {attribute} in {tag}")]
    MissingAttribute {
        tag: &'static str,
        attribute: &'static str,
    },

    #[error("Invalid integer {value:?}: {source}")]
    InvalidInteger {
        value: String,
        source: ParseIntError,
    },

    #[error("Invalid float {value:?}: {source}")]
    InvalidFloat {
        value: String,
        source: ParseFloatError,
    },

    #[error("Number out of range: {0}")]
    OutOfRange(String),

    #[error("Invalid date time: {0}")]
    InvalidDateTime(String),

    #[error("Invalid resolution: {0}")]
    InvalidResolution(String),

    #[error(transparent)]
    IOError(#[from] std::io::Error),

    #[error(transparent)]
    UrlParseError(#[from] url::ParseError),
}

pub type M3u8Result<T> = Result<T, M3u8Error>;
