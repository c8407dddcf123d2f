//! Tagged sections following the file header.
//!
//! Each section starts with a 4 byte tag and a u32 payload size.
//! The size does not include the 8 byte section header.
use std::{fmt, io::Cursor};

use binrw::{BinRead, BinReaderExt};
use log::debug;
use serde::{Serialize, Serializer};

use crate::{error::FormatError, pan1::PaneRecord, pic1::PictureRecord, txt1::TextRecord};

pub(crate) const SECTION_HEADER_SIZE: usize = 8;

/// A 4 byte ASCII identifier like `b"pan1"`.
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
#[derive(BinRead, PartialEq, Eq, Hash, Clone, Copy)]
pub struct Tag(pub [u8; 4]);

impl Tag {
    pub const PAN1: Self = Self(*b"pan1");
    pub const PIC1: Self = Self(*b"pic1");
    pub const TXT1: Self = Self(*b"txt1");
    pub const TXL1: Self = Self(*b"txl1");
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.escape_ascii())
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{self}\"")
    }
}

impl Serialize for Tag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(BinRead)]
pub(crate) struct SectionHeader {
    pub tag: Tag,
    pub size: u32,
}

/// A single entry in the section table.
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
#[derive(Debug, Serialize, PartialEq, Clone)]
pub struct Section {
    pub tag: Tag,
    /// The size of the payload in bytes excluding the section header.
    pub size: u32,
    pub content: SectionContent,
}

/// The decoded payload of a [Section] selected by its [Tag].
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
#[derive(Debug, Serialize, PartialEq, Clone)]
pub enum SectionContent {
    /// `pan1`
    Pane(PaneRecord),
    /// `pic1`
    Picture(PictureRecord),
    /// `txt1`
    Text(TextRecord),
    /// `txl1` after calling [resolve_texture_lists](crate::txl1::resolve_texture_lists).
    TextureList(Vec<String>),
    /// Unrecognized sections and `txl1` before texture names are resolved.
    Raw(Vec<u8>),
}

impl SectionContent {
    /// Decode `payload` based on `tag`.
    /// Offsets in errors are relative to the start of `payload`.
    pub(crate) fn read(tag: Tag, payload: &[u8]) -> Result<Self, FormatError> {
        match tag {
            Tag::PAN1 => read_record(payload, crate::pan1::PANE_SIZE).map(Self::Pane),
            Tag::PIC1 => read_record(payload, crate::pic1::PICTURE_SIZE).map(Self::Picture),
            Tag::TXT1 => read_record(payload, crate::txt1::TEXT_FIXED_SIZE).map(Self::Text),
            Tag::TXL1 => Ok(Self::Raw(payload.to_vec())),
            _ => {
                debug!("Keeping {} bytes of unknown section {tag}", payload.len());
                Ok(Self::Raw(payload.to_vec()))
            }
        }
    }

    /// The pane fields shared by panes, pictures, and text boxes.
    pub fn pane(&self) -> Option<&PaneRecord> {
        match self {
            Self::Pane(pane) => Some(pane),
            Self::Picture(picture) => Some(&picture.pane),
            Self::Text(text) => Some(&text.pane),
            Self::TextureList(_) | Self::Raw(_) => None,
        }
    }
}

/// Read a record that takes up at least `fixed_size` bytes at the start of `payload`.
fn read_record<T>(payload: &[u8], fixed_size: usize) -> Result<T, FormatError>
where
    for<'a> T: BinRead<Args<'a> = ()>,
{
    if payload.len() < fixed_size {
        return Err(FormatError::TruncatedInput {
            offset: 0,
            expected: fixed_size,
            available: payload.len(),
        });
    }

    let mut reader = Cursor::new(payload);
    let value = reader.read_le()?;

    let consumed = reader.position() as usize;
    if consumed < payload.len() {
        debug!(
            "{}: ignoring {} trailing bytes",
            std::any::type_name::<T>(),
            payload.len() - consumed
        );
    }

    Ok(value)
}
