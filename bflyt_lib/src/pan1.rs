//! Null panes in `pan1` sections.
//!
//! The pane fields are also the first bytes of picture and text box sections.
use binrw::BinRead;
use serde::Serialize;

use crate::error::FormatError;

/// The size in bytes of the pane fields.
pub const PANE_SIZE: usize = 68;

pub const PANE_NAME_SIZE: usize = 24;

/// A transformed rectangle in the layout.
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
#[derive(Debug, BinRead, Serialize, PartialEq, Clone)]
pub struct PaneRecord {
    /// Bit 0 is set for visible panes.
    pub flags: u8,
    pub origin: u8,
    pub alpha: u8,

    /// The unique name referenced by layout patches.
    /// Trailing NUL bytes from the fixed size field are removed.
    #[br(pad_before = 1)]
    #[br(try_map = |bytes: [u8; PANE_NAME_SIZE]| pane_name(&bytes))]
    pub name: String,

    pub position: [f32; 3],
    /// Rotation in degrees for each axis.
    pub rotation: [f32; 3],
    pub scale: [f32; 2],
    pub width: f32,
    pub height: f32,
}

impl PaneRecord {
    pub fn is_visible(&self) -> bool {
        self.flags & 1 == 1
    }
}

fn pane_name(bytes: &[u8; PANE_NAME_SIZE]) -> Result<String, FormatError> {
    // Interior NUL bytes are kept.
    let len = bytes.iter().rposition(|b| *b != 0).map_or(0, |i| i + 1);
    String::from_utf8(bytes[..len].to_vec()).map_err(|_| FormatError::InvalidEncoding("pane name"))
}
