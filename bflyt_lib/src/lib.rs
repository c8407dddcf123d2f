//! A library for reading Nintendo Switch `.bflyt` layout files.
//!
//! BFLYT files describe the panes of a UI layout like the home menu.
//! Only pane, picture, text box, and texture list sections are decoded.
//! All other sections are preserved as raw bytes.
//!
//! # Getting Started
//! ```rust no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let bflyt = bflyt_lib::Bflyt::from_file("qlaunch.bflyt")?;
//! for pane in bflyt.panes() {
//!     println!("{} {:?}", pane.name, pane.position);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Design
//! Decoding is a single pass over an in memory buffer followed by a second pass
//! that resolves texture list names. Every read is checked against the length of the buffer,
//! so declared counts and sizes in malformed files produce a [FormatError] instead of
//! reading out of bounds.
//!
//! Section sizes are authoritative. Each section is decoded from a slice of exactly
//! the declared size, and the next section always starts immediately after that slice.
//! Trailing bytes in a section are ignored.
//!
//! All numeric fields are little-endian.
//! The byte order mark is only checked and never used to switch endianness.
use std::{io::Cursor, path::Path};

use binrw::{BinRead, BinReaderExt};
use log::trace;
use serde::Serialize;

pub mod error;
pub mod layout;
pub mod pan1;
pub mod pic1;
pub mod section;
pub mod txl1;
pub mod txt1;

pub use error::{FormatError, ReadFileError};
pub use section::{Section, SectionContent, Tag};

use pan1::PaneRecord;
use section::{SectionHeader, SECTION_HEADER_SIZE};
use txl1::resolve_texture_lists;

/// The expected file signature.
pub const SIGNATURE: Tag = Tag(*b"FLYT");

/// The byte order mark for little-endian files.
pub const BYTE_ORDER_MARK: u16 = 0xFEFF;

/// The size of the fixed file header in bytes.
pub const HEADER_SIZE: usize = 20;

/// The largest file accepted by [Bflyt::from_file].
pub const MAX_FILE_SIZE: u64 = 50 * 1024 * 1024;

/// How strictly to validate the file header.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub enum Validation {
    /// Only check the byte order mark and that the file isn't truncated.
    #[default]
    Lenient,
    /// Also require the [SIGNATURE] and a file size matching the buffer length.
    Strict,
}

/// The fixed size file header.
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
#[derive(Debug, BinRead, Serialize, PartialEq, Eq, Clone)]
pub struct Header {
    pub signature: Tag,
    #[br(assert(byte_order_mark == BYTE_ORDER_MARK, FormatError::BadByteOrderMark(byte_order_mark)))]
    pub byte_order_mark: u16,
    pub header_size: u16,
    pub version: u32,
    pub file_size: u32,
    /// The number of entries in [sections](struct.Bflyt.html#structfield.sections).
    #[br(pad_after = 2)]
    pub section_count: u16,
}

/// A decoded layout file.
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
#[derive(Debug, Serialize, PartialEq, Clone)]
pub struct Bflyt {
    pub header: Header,
    /// Exactly [section_count](struct.Header.html#structfield.section_count) sections in file order.
    pub sections: Vec<Section>,
}

impl Bflyt {
    /// Decode all sections and resolve texture list names.
    pub fn from_bytes<T: AsRef<[u8]>>(bytes: T) -> Result<Self, FormatError> {
        Self::from_bytes_with(bytes, Validation::Lenient)
    }

    /// Decode all sections and resolve texture list names using the given `validation`.
    pub fn from_bytes_with<T: AsRef<[u8]>>(
        bytes: T,
        validation: Validation,
    ) -> Result<Self, FormatError> {
        let Self { header, sections } = Self::read_sections(bytes.as_ref(), validation)?;
        let sections = resolve_texture_lists(sections)?;
        Ok(Self { header, sections })
    }

    /// Decode the header and section table without resolving texture lists.
    /// `txl1` sections are left as [SectionContent::Raw].
    pub fn read_sections(bytes: &[u8], validation: Validation) -> Result<Self, FormatError> {
        let header = read_header(bytes, validation)?;

        let mut sections = Vec::with_capacity(header.section_count as usize);
        let mut offset = HEADER_SIZE;
        for _ in 0..header.section_count {
            let (section, next_offset) = read_section(bytes, offset)?;
            sections.push(section);
            offset = next_offset;
        }

        Ok(Self { header, sections })
    }

    /// Read from `path` after checking that the file is at most [MAX_FILE_SIZE] bytes.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ReadFileError> {
        Self::from_file_with(path, Validation::Lenient)
    }

    /// Read from `path` using the given `validation`.
    pub fn from_file_with<P: AsRef<Path>>(
        path: P,
        validation: Validation,
    ) -> Result<Self, ReadFileError> {
        let path = path.as_ref();
        let size = std::fs::metadata(path)?.len();
        if size > MAX_FILE_SIZE {
            return Err(ReadFileError::TooLarge {
                size,
                max: MAX_FILE_SIZE,
            });
        }

        let bytes = std::fs::read(path)?;
        Self::from_bytes_with(bytes, validation).map_err(Into::into)
    }

    /// The pane fields of all pane, picture, and text box sections in order.
    pub fn panes(&self) -> impl Iterator<Item = &PaneRecord> {
        self.sections.iter().filter_map(|s| s.content.pane())
    }

    /// The names of all resolved `txl1` sections in order.
    pub fn texture_names(&self) -> impl Iterator<Item = &str> {
        self.sections
            .iter()
            .filter_map(|s| match &s.content {
                SectionContent::TextureList(names) => Some(names),
                _ => None,
            })
            .flatten()
            .map(String::as_str)
    }
}

fn read_header(bytes: &[u8], validation: Validation) -> Result<Header, FormatError> {
    let header_bytes = bytes.get(..HEADER_SIZE).ok_or(FormatError::TruncatedInput {
        offset: 0,
        expected: HEADER_SIZE,
        available: bytes.len(),
    })?;
    let header: Header = Cursor::new(header_bytes).read_le()?;

    if validation == Validation::Strict && header.signature != SIGNATURE {
        return Err(FormatError::BadMagic(header.signature));
    }

    // A larger buffer may just have trailing padding.
    let size_mismatch = match validation {
        Validation::Lenient => header.file_size as usize > bytes.len(),
        Validation::Strict => header.file_size as usize != bytes.len(),
    };
    if size_mismatch {
        return Err(FormatError::FileSizeMismatch {
            declared: header.file_size,
            actual: bytes.len(),
        });
    }

    Ok(header)
}

/// Read the section at `offset` and return the offset of the next section.
fn read_section(bytes: &[u8], offset: usize) -> Result<(Section, usize), FormatError> {
    let header_bytes = bytes
        .get(offset..offset + SECTION_HEADER_SIZE)
        .ok_or(FormatError::TruncatedInput {
            offset,
            expected: SECTION_HEADER_SIZE,
            available: bytes.len().saturating_sub(offset),
        })?;
    let SectionHeader { tag, size } = Cursor::new(header_bytes).read_le()?;

    let start = offset + SECTION_HEADER_SIZE;
    let payload = start
        .checked_add(size as usize)
        .and_then(|end| bytes.get(start..end))
        .ok_or(FormatError::BadLength {
            tag,
            offset,
            size,
            available: bytes.len(),
        })?;
    trace!("{tag}: offset {offset}, size {size}");

    let content = SectionContent::read(tag, payload).map_err(|e| e.at_offset(start))?;

    Ok((Section { tag, size, content }, start + payload.len()))
}

#[cfg(test)]
mod tests {
    use hexlit::hex;

    use super::*;

    #[test]
    fn read_empty_file() {
        let bytes = hex!("464C5954 FFFE 1400 00000008 14000000 0000 0000");
        let bflyt = Bflyt::from_bytes(bytes).unwrap();
        assert_eq!(
            Header {
                signature: SIGNATURE,
                byte_order_mark: 0xFEFF,
                header_size: 20,
                version: 0x08000000,
                file_size: 20,
                section_count: 0
            },
            bflyt.header
        );
        assert!(bflyt.sections.is_empty());
    }

    #[test]
    fn read_header_truncated() {
        let result = Bflyt::from_bytes(hex!("464C5954 FFFE"));
        assert!(matches!(
            result,
            Err(FormatError::TruncatedInput {
                offset: 0,
                expected: HEADER_SIZE,
                available: 6
            })
        ));
    }

    #[test]
    fn read_header_zero_byte_order_mark() {
        let bytes = hex!("464C5954 0000 1400 00000008 14000000 0100 0000");
        assert!(matches!(
            Bflyt::from_bytes(bytes),
            Err(FormatError::BadByteOrderMark(0))
        ));
    }

    #[test]
    fn read_header_big_endian_byte_order_mark() {
        let bytes = hex!("464C5954 FEFF 1400 00000008 14000000 0000 0000");
        assert!(matches!(
            Bflyt::from_bytes(bytes),
            Err(FormatError::BadByteOrderMark(0xFFFE))
        ));
    }

    #[test]
    fn read_header_signature_lenient() {
        let bytes = hex!("434C5954 FFFE 1400 00000008 14000000 0000 0000");
        let bflyt = Bflyt::from_bytes(bytes).unwrap();
        assert_eq!(Tag(*b"CLYT"), bflyt.header.signature);
    }

    #[test]
    fn read_header_signature_strict() {
        let bytes = hex!("434C5954 FFFE 1400 00000008 14000000 0000 0000");
        assert!(matches!(
            Bflyt::from_bytes_with(bytes, Validation::Strict),
            Err(FormatError::BadMagic(Tag([b'C', b'L', b'Y', b'T'])))
        ));
    }

    #[test]
    fn read_header_file_size_too_large() {
        let bytes = hex!("464C5954 FFFE 1400 00000008 15000000 0000 0000");
        assert!(matches!(
            Bflyt::from_bytes(bytes),
            Err(FormatError::FileSizeMismatch {
                declared: 21,
                actual: 20
            })
        ));
    }

    #[test]
    fn read_header_trailing_bytes() {
        let bytes = hex!("464C5954 FFFE 1400 00000008 14000000 0000 0000 00000000");
        assert!(Bflyt::from_bytes(bytes).is_ok());
        assert!(matches!(
            Bflyt::from_bytes_with(bytes, Validation::Strict),
            Err(FormatError::FileSizeMismatch {
                declared: 20,
                actual: 24
            })
        ));
    }

    #[test]
    fn read_missing_section_header() {
        let bytes = hex!("464C5954 FFFE 1400 00000008 18000000 0100 0000 78747261");
        assert!(matches!(
            Bflyt::from_bytes(bytes),
            Err(FormatError::TruncatedInput {
                offset: 20,
                expected: 8,
                available: 4
            })
        ));
    }

    #[test]
    fn read_section_past_end() {
        let bytes = hex!("464C5954 FFFE 1400 00000008 1E000000 0100 0000 78747261 03000000 0102");
        assert!(matches!(
            Bflyt::from_bytes(bytes),
            Err(FormatError::BadLength {
                tag: Tag([b'x', b't', b'r', b'a']),
                offset: 20,
                size: 3,
                available: 30
            })
        ));
    }

    #[test]
    fn read_section_huge_size() {
        let bytes = hex!("464C5954 FFFE 1400 00000008 1C000000 0100 0000 78747261 FFFFFFFF");
        assert!(matches!(
            Bflyt::from_bytes(bytes),
            Err(FormatError::BadLength { size: 0xFFFFFFFF, .. })
        ));
    }

    #[test]
    fn read_raw_and_texture_list() {
        let bytes = hex!(
            "464C5954 FFFE 1400 00000008 34000000 0200 0000"
            "78747261 02000000 ABCD"
            "74786C31 0E000000 0100 0000 04000000 6E5F6100 0000"
        );
        let bflyt = Bflyt::read_sections(&bytes, Validation::Lenient).unwrap();
        assert_eq!(
            SectionContent::Raw(hex!("0100 0000 04000000 6E5F6100 0000").to_vec()),
            bflyt.sections[1].content
        );

        let bflyt = Bflyt::from_bytes(bytes).unwrap();
        assert_eq!(2, bflyt.sections.len());
        assert_eq!(SectionContent::Raw(vec![0xAB, 0xCD]), bflyt.sections[0].content);
        assert_eq!(vec!["n_a"], bflyt.texture_names().collect::<Vec<_>>());
        assert_eq!(0, bflyt.panes().count());
    }

    #[test]
    fn read_pane_truncated_offset() {
        let bytes = hex!("464C5954 FFFE 1400 00000008 20000000 0100 0000 70616E31 04000000 01000000");
        assert!(matches!(
            Bflyt::from_bytes(bytes),
            Err(FormatError::TruncatedInput {
                offset: 28,
                expected: 68,
                available: 4
            })
        ));
    }
}
