//! Text box panes in `txt1` sections.
use std::io::{Read, Seek, SeekFrom};

use binrw::{BinRead, BinResult, VecArgs};
use serde::Serialize;

use crate::{
    error::{custom_error, FormatError},
    pan1::PaneRecord,
};

/// The size in bytes of the pane and text box fields before the variable length text.
pub const TEXT_FIXED_SIZE: usize = 104;

/// A pane displaying a UTF-16 string.
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
#[derive(Debug, BinRead, Serialize, PartialEq, Clone)]
pub struct TextRecord {
    pub pane: PaneRecord,
    /// The size of [text](#structfield.text) in bytes when encoded as UTF-16LE.
    pub text_length: u16,
    pub material_index: u16,
    pub font_index: u16,
    pub line_alignment: u8,
    pub text_alignment: u8,
    pub text_offset: u32,
    /// Packed RGBA color.
    pub font_color: u32,
    pub char_spacing: f32,
    pub line_spacing: f32,
    /// Packed RGBA color.
    pub shadow_color: u32,
    pub shadow_offset_x: f32,
    pub shadow_offset_y: f32,

    #[br(parse_with = parse_utf16le, args(text_length))]
    pub text: String,
}

fn parse_utf16le<R: Read + Seek>(
    reader: &mut R,
    endian: binrw::Endian,
    args: (u16,),
) -> BinResult<String> {
    let (byte_length,) = args;
    let pos = reader.stream_position()?;

    if byte_length % 2 != 0 {
        return Err(custom_error(pos, FormatError::OddTextLength(byte_length)));
    }

    // Check the length up front to report the expected size.
    let end = reader.seek(SeekFrom::End(0))?;
    reader.seek(SeekFrom::Start(pos))?;
    let available = end.saturating_sub(pos) as usize;
    if available < byte_length as usize {
        return Err(custom_error(
            pos,
            FormatError::TruncatedInput {
                offset: pos as usize,
                expected: byte_length as usize,
                available,
            },
        ));
    }

    let code_units = Vec::<u16>::read_options(
        reader,
        endian,
        VecArgs {
            count: byte_length as usize / 2,
            inner: (),
        },
    )?;

    String::from_utf16(&code_units)
        .map_err(|_| custom_error(pos, FormatError::InvalidEncoding("text")))
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use binrw::BinReaderExt;
    use hexlit::hex;

    use super::*;

    fn text_record_bytes(text_length: &[u8; 2], text: &[u8]) -> Vec<u8> {
        let mut bytes = hex!(
            "01000000"
            "545F5469746C65 00000000000000000000000000000000 00"
            "00000000 00000000 00000000"
            "00000000 00000000 00000000"
            "0000803F 0000803F"
            "00004843 0000C841"
        )
        .to_vec();
        bytes.extend_from_slice(text_length);
        bytes.extend_from_slice(&hex!(
            "0200 0100"
            "01 02"
            "68000000"
            "FFFFFFFF"
            "00000000 0000803F"
            "000000FF"
            "00000040 000000C0"
        ));
        assert_eq!(TEXT_FIXED_SIZE, bytes.len());
        bytes.extend_from_slice(text);
        bytes
    }

    fn read_text(bytes: &[u8]) -> Result<TextRecord, FormatError> {
        Cursor::new(bytes).read_le().map_err(Into::into)
    }

    #[test]
    fn read_text_record() {
        // "Hi!" as UTF-16LE.
        let bytes = text_record_bytes(&hex!("0600"), &hex!("48006900 2100"));
        let text = read_text(&bytes).unwrap();

        assert_eq!("T_Title", text.pane.name);
        assert_eq!(200.0, text.pane.width);
        assert_eq!(25.0, text.pane.height);
        assert_eq!(6, text.text_length);
        assert_eq!(2, text.material_index);
        assert_eq!(1, text.font_index);
        assert_eq!(1, text.line_alignment);
        assert_eq!(2, text.text_alignment);
        assert_eq!(0x68, text.text_offset);
        assert_eq!(0xFFFFFFFF, text.font_color);
        assert_eq!(0.0, text.char_spacing);
        assert_eq!(1.0, text.line_spacing);
        assert_eq!(0xFF000000, text.shadow_color);
        assert_eq!(2.0, text.shadow_offset_x);
        assert_eq!(-2.0, text.shadow_offset_y);
        assert_eq!("Hi!", text.text);
    }

    #[test]
    fn read_text_surrogate_pair() {
        // U+1F600 takes two code units.
        let bytes = text_record_bytes(&hex!("0400"), &hex!("3DD8 00DE"));
        let text = read_text(&bytes).unwrap();
        assert_eq!("\u{1F600}", text.text);

        let encoded: Vec<_> = text.text.encode_utf16().flat_map(u16::to_le_bytes).collect();
        assert_eq!(text.text_length as usize, encoded.len());
    }

    #[test]
    fn read_text_empty() {
        let bytes = text_record_bytes(&hex!("0000"), &[]);
        assert_eq!("", read_text(&bytes).unwrap().text);
    }

    #[test]
    fn read_text_odd_length() {
        let bytes = text_record_bytes(&hex!("0300"), &hex!("480069"));
        assert!(matches!(
            read_text(&bytes),
            Err(FormatError::OddTextLength(3))
        ));
    }

    #[test]
    fn read_text_truncated() {
        let bytes = text_record_bytes(&hex!("0600"), &hex!("48006900"));
        assert!(matches!(
            read_text(&bytes),
            Err(FormatError::TruncatedInput {
                offset: 104,
                expected: 6,
                available: 4
            })
        ));
    }

    #[test]
    fn read_text_unpaired_surrogate() {
        let bytes = text_record_bytes(&hex!("0200"), &hex!("3DD8"));
        assert!(matches!(
            read_text(&bytes),
            Err(FormatError::InvalidEncoding("text"))
        ));
    }
}
