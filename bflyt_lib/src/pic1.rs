//! Textured picture panes in `pic1` sections.
use binrw::BinRead;
use serde::Serialize;

use crate::pan1::PaneRecord;

/// The size in bytes of the pane and picture fields.
pub const PICTURE_SIZE: usize = 120;

/// A pane drawn as a textured quad.
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
#[derive(Debug, BinRead, Serialize, PartialEq, Clone)]
pub struct PictureRecord {
    pub pane: PaneRecord,
    /// Packed RGBA colors for the top left, top right, bottom left, and bottom right corners.
    pub vertex_colors: [u32; 4],
    pub material_index: u16,
    pub texture_count: u16,
    /// UV coordinates for each corner in the same order as the vertex colors.
    pub tex_coords: [[f32; 2]; 4],
}
