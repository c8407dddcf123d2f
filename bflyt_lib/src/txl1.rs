//! Texture name lists in `txl1` sections.
//!
//! # Layout
//! | Offset | Type | Description |
//! | --- | --- | --- |
//! | 0 | u16 | texture count N |
//! | 2 | u16 | padding |
//! | 4 | [u32; N] | name offsets relative to byte 4 |
//! | ... | | NUL terminated UTF-8 names |
//!
//! Texture lists are kept as raw bytes by the section reader
//! and decoded afterwards by [resolve_texture_lists].
use std::io::{Cursor, SeekFrom};

use binrw::{binread, BinReaderExt};
use log::trace;

use crate::{
    error::FormatError,
    section::{Section, SectionContent, Tag},
};

/// The payload offset of the first name offset.
pub const TEXTURE_OFFSETS_START: usize = 4;

/// The payload offset that name offsets are relative to.
pub const TEXTURE_NAME_BASE: usize = 4;

#[binread]
struct TextureTable {
    #[br(temp)]
    count: u16,
    #[br(seek_before = SeekFrom::Start(TEXTURE_OFFSETS_START as u64))]
    #[br(count = count)]
    offsets: Vec<u32>,
}

/// Replace the raw bytes of every `txl1` section with its decoded texture names.
/// Other sections are returned unchanged and in the same order.
pub fn resolve_texture_lists(sections: Vec<Section>) -> Result<Vec<Section>, FormatError> {
    sections
        .into_iter()
        .map(|section| {
            let Section { tag, size, content } = section;
            let content = match content {
                SectionContent::Raw(bytes) if tag == Tag::TXL1 => {
                    SectionContent::TextureList(read_texture_names(&bytes)?)
                }
                content => content,
            };
            Ok(Section { tag, size, content })
        })
        .collect()
}

/// Decode the texture names from a `txl1` section payload.
///
/// Names must be NUL terminated within the payload.
/// A name that runs to the end of the payload is an error rather than being truncated.
pub fn read_texture_names(payload: &[u8]) -> Result<Vec<String>, FormatError> {
    let count = payload
        .get(..2)
        .map(|bytes| u16::from_le_bytes([bytes[0], bytes[1]]) as usize)
        .ok_or(FormatError::TruncatedInput {
            offset: 0,
            expected: 2,
            available: payload.len(),
        })?;

    if count > 0 && payload.len() < TEXTURE_OFFSETS_START + count * 4 {
        return Err(FormatError::TruncatedInput {
            offset: 0,
            expected: TEXTURE_OFFSETS_START + count * 4,
            available: payload.len(),
        });
    }

    let table: TextureTable = Cursor::new(payload).read_le()?;
    trace!("txl1: {} textures", table.offsets.len());

    table
        .offsets
        .iter()
        .enumerate()
        .map(|(index, offset)| read_name(payload, index, *offset))
        .collect()
}

fn read_name(payload: &[u8], index: usize, offset: u32) -> Result<String, FormatError> {
    let bytes = (offset as usize)
        .checked_add(TEXTURE_NAME_BASE)
        .and_then(|start| payload.get(start..))
        .filter(|bytes| !bytes.is_empty())
        .ok_or(FormatError::BadOffset {
            index,
            offset,
            len: payload.len(),
        })?;

    let len = bytes
        .iter()
        .position(|b| *b == 0)
        .ok_or(FormatError::UnterminatedString { index })?;

    String::from_utf8(bytes[..len].to_vec())
        .map_err(|_| FormatError::InvalidEncoding("texture name"))
}
