//! The error type returned from every public operation on [`crate::client::KmipClient`].
//!
//! A `#[non_exhaustive]` `Error` pairing an [`ErrorKind`] with an [`ErrorLocation`], `Display` and
//! `std::error::Error` implemented by hand rather than via `thiserror`. [`ErrorKind`] layers the
//! taxonomy this crate's callers actually need (malformed responses, server-reported failures,
//! object mismatches, I/O) on top of the lower-level [`crate::ttlv::Error`] that the codec raises
//! while decoding bytes.
use std::fmt::{Debug, Display};

use crate::model::{ResultReason, ResultStatus};
use crate::ttlv::TtlvTag;

pub type Result<T> = std::result::Result<T, Error>;

// --- Error ------------------------------------------------------------------------------------

/// Details of a failed request and, where known, where in the message it went wrong.
#[derive(Debug)]
#[non_exhaustive]
pub struct Error {
    kind: ErrorKind,
    location: ErrorLocation,
}

impl Error {
    pub(crate) fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            location: ErrorLocation::unknown(),
        }
    }

    pub(crate) fn at(kind: ErrorKind, location: ErrorLocation) -> Self {
        Self { kind, location }
    }

    /// The kind of failure that occurred.
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// Where in the message the failure was detected, if known.
    pub fn location(&self) -> &ErrorLocation {
        &self.location
    }
}

impl std::error::Error for Error {}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.location.is_unknown() {
            Display::fmt(&self.kind, f)
        } else {
            write!(f, "{} (at {})", self.kind, self.location)
        }
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error::new(kind)
    }
}

impl From<crate::ttlv::Error> for Error {
    fn from(err: crate::ttlv::Error) -> Self {
        Error::new(ErrorKind::from(err))
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::new(ErrorKind::IoFailure(err, None))
    }
}

// --- ErrorKind --------------------------------------------------------------------------------

/// The taxonomy of failures a request against a KMIP server can produce.
#[derive(Debug)]
#[non_exhaustive]
pub enum ErrorKind {
    /// The caller passed a null/empty value for a field the operation requires.
    ArgInvalid(String),

    /// The codec ran out of input while decoding a response, or a `Structure`'s declared length
    /// ran past the end of its parent.
    BufferUnderflow,

    /// The encode buffer's fixed capacity was exceeded. The exchange engine recovers from this
    /// by growing the buffer and retrying; it only reaches a caller if that retry also fails.
    BufferFull,

    /// A decoded item's tag did not match what this position in the message is defined to hold.
    TagMismatch { expected: TtlvTag, found: TtlvTag },

    /// A decoded item's TTLV type did not match what was expected at this tag.
    TypeMismatch,

    /// A decoded item's declared length is not valid for its type (e.g. an Integer whose length
    /// isn't 4, or a negative Structure length).
    LengthInvalid,

    /// The transport did not return the requested number of bytes, or reported an I/O error.
    /// Carries the operation name that was in flight, when known.
    IoFailure(std::io::Error, Option<&'static str>),

    /// The response's outer length header declared more bytes than the configured
    /// `max_message_size`.
    MessageTooLarge { declared: u32, max: u32 },

    /// The response was structurally well-formed TTLV but violates a protocol-level invariant
    /// this core depends on: `batch_count != 1`, a missing mandatory field, or an echoed
    /// operation that doesn't match the request.
    MalformedResponse(String),

    /// The response named a different object type or key format than the extractor requires,
    /// e.g. `Get`-ing a key by id that turns out to be `SecretData`, or wrapped key material
    /// where none was expected.
    ObjectMismatch(String),

    /// The server decoded and processed the request but reported a non-Success result.
    ServerError {
        status: ResultStatus,
        reason: Option<ResultReason>,
        message: Option<String>,
    },

    /// The response named an object type or attribute this core does not implement.
    Unsupported(String),
}

impl From<crate::ttlv::Error> for ErrorKind {
    fn from(err: crate::ttlv::Error) -> Self {
        use crate::ttlv::Error as TtlvError;
        match err {
            TtlvError::BufferFull => ErrorKind::BufferFull,
            TtlvError::IoError(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                ErrorKind::BufferUnderflow
            }
            TtlvError::IoError(e) => ErrorKind::IoFailure(e, None),
            TtlvError::UnexpectedTtlvTag { expected, actual } => ErrorKind::TagMismatch {
                expected,
                found: actual,
            },
            TtlvError::UnexpectedTtlvType { .. } => ErrorKind::TypeMismatch,
            TtlvError::InvalidTtlvValueLength { .. } => ErrorKind::LengthInvalid,
            TtlvError::InvalidTtlvValue(ty) => {
                ErrorKind::MalformedResponse(format!("invalid value for TTLV type {}", ty))
            }
            TtlvError::InvalidTtlvType(v) => {
                ErrorKind::MalformedResponse(format!("invalid TTLV type byte 0x{:02X}", v))
            }
            TtlvError::UnsupportedTtlvType(v) => {
                ErrorKind::Unsupported(format!("TTLV type byte 0x{:02X}", v))
            }
            TtlvError::InvalidTtlvTag(s) => {
                ErrorKind::MalformedResponse(format!("invalid TTLV tag '{}'", s))
            }
        }
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::ArgInvalid(what) => write!(f, "invalid argument: {}", what),
            ErrorKind::BufferUnderflow => f.write_str("ran out of input while decoding a response"),
            ErrorKind::BufferFull => f.write_str("encode buffer exhausted"),
            ErrorKind::TagMismatch { expected, found } => {
                write!(f, "expected TTLV tag {}, found {}", expected, found)
            }
            ErrorKind::TypeMismatch => f.write_str("unexpected TTLV type at this position"),
            ErrorKind::LengthInvalid => f.write_str("invalid TTLV length for this type"),
            ErrorKind::IoFailure(e, op) => match op {
                Some(op) => write!(f, "I/O failure during {}: {}", op, e),
                None => write!(f, "I/O failure: {}", e),
            },
            ErrorKind::MessageTooLarge { declared, max } => write!(
                f,
                "response declares {} bytes of body, exceeding the configured limit of {}",
                declared, max
            ),
            ErrorKind::MalformedResponse(what) => write!(f, "malformed response: {}", what),
            ErrorKind::ObjectMismatch(what) => write!(f, "object mismatch: {}", what),
            ErrorKind::ServerError {
                status,
                reason,
                message,
            } => {
                write!(f, "server reported {}", status)?;
                if let Some(reason) = reason {
                    write!(f, ", reason {}", reason)?;
                }
                if let Some(message) = message {
                    write!(f, ": {}", message)?;
                }
                Ok(())
            }
            ErrorKind::Unsupported(what) => write!(f, "unsupported: {}", what),
        }
    }
}

// --- ErrorLocation ------------------------------------------------------------------------------

/// Where in a message a failure was detected: a byte offset and, for tag/type mismatches, the
/// tag and/or type involved. Populated on a best-effort basis — most of this core's errors are
/// protocol-level (wrong operation echoed, server-reported failure) rather than byte-level, and
/// carry no location at all.
#[derive(Clone, Debug, Default)]
pub struct ErrorLocation {
    offset: Option<u64>,
    tag: Option<TtlvTag>,
}

impl ErrorLocation {
    pub(crate) fn unknown() -> Self {
        Self::default()
    }

    pub(crate) fn at_offset(offset: u64) -> Self {
        Self {
            offset: Some(offset),
            tag: None,
        }
    }

    pub(crate) fn at_tag(tag: TtlvTag) -> Self {
        Self {
            offset: None,
            tag: Some(tag),
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.offset.is_none() && self.tag.is_none()
    }

    pub fn offset(&self) -> Option<u64> {
        self.offset
    }

    pub fn tag(&self) -> Option<TtlvTag> {
        self.tag
    }
}

impl Display for ErrorLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut sep = "";
        if let Some(offset) = self.offset {
            write!(f, "pos: {} bytes", offset)?;
            sep = ", ";
        }
        if let Some(tag) = self.tag {
            write!(f, "{}tag: {}", sep, tag)?;
        }
        Ok(())
    }
}
