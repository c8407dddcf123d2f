use thiserror::Error;

use crate::{section::Tag, BYTE_ORDER_MARK, SIGNATURE};

/// An error while decoding BFLYT data.
///
/// Decoding is a pure function of the input bytes,
/// so the same input always produces the same error.
#[derive(Debug, Error)]
pub enum FormatError {
    /// Offsets are relative to the start of the buffer being decoded.
    /// This is the file for the header and sections
    /// and the section payload for texture lists.
    #[error("expected {expected} bytes at offset {offset} but only {available} bytes remain")]
    TruncatedInput {
        offset: usize,
        expected: usize,
        available: usize,
    },

    #[error("invalid signature {0:?}, expected {sig:?}", sig = SIGNATURE)]
    BadMagic(Tag),

    #[error("invalid byte order mark 0x{0:04X}, expected 0x{bom:04X}", bom = BYTE_ORDER_MARK)]
    BadByteOrderMark(u16),

    #[error("section {tag} at offset {offset} with size {size} extends past the end of the {available} byte buffer")]
    BadLength {
        tag: Tag,
        offset: usize,
        size: u32,
        available: usize,
    },

    #[error("declared file size {declared} does not match the {actual} byte buffer")]
    FileSizeMismatch { declared: u32, actual: usize },

    #[error("text length {0} is not a multiple of 2")]
    OddTextLength(u16),

    #[error("texture {index} has offset {offset} outside the {len} byte texture list")]
    BadOffset { index: usize, offset: u32, len: usize },

    #[error("texture {index} name is not NUL terminated")]
    UnterminatedString { index: usize },

    #[error("invalid {0} encoding")]
    InvalidEncoding(&'static str),

    #[error("error reading data: {0}")]
    Binrw(#[source] binrw::Error),
}

impl FormatError {
    /// Shift section relative offsets to be relative to the start of the file.
    pub(crate) fn at_offset(self, base: usize) -> Self {
        match self {
            Self::TruncatedInput {
                offset,
                expected,
                available,
            } => Self::TruncatedInput {
                offset: base + offset,
                expected,
                available,
            },
            e => e,
        }
    }
}

impl From<binrw::Error> for FormatError {
    fn from(e: binrw::Error) -> Self {
        // Errors raised by parse functions and asserts are boxed by binrw.
        match e {
            binrw::Error::Backtrace(backtrace) => Self::from(*backtrace.error),
            binrw::Error::Custom { pos, err } => match err.downcast::<FormatError>() {
                Ok(err) => *err,
                Err(err) => Self::Binrw(binrw::Error::Custom { pos, err }),
            },
            e => Self::Binrw(e),
        }
    }
}

/// An error while reading a BFLYT file from disk.
#[derive(Debug, Error)]
pub enum ReadFileError {
    #[error("error reading file: {0}")]
    Io(#[from] std::io::Error),

    #[error("file size {size} exceeds the maximum of {max} bytes")]
    TooLarge { size: u64, max: u64 },

    #[error("error decoding file: {0}")]
    Format(#[from] FormatError),
}

pub(crate) fn custom_error(pos: u64, err: FormatError) -> binrw::Error {
    binrw::Error::Custom {
        pos,
        err: Box::new(err),
    }
}
