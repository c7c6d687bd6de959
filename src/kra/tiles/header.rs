//! Text header of a tile container.
//!
//! ```text
//! VERSION 2
//! TILEWIDTH 64
//! TILEHEIGHT 64
//! PIXELSIZE 4
//! DATA 12
//! ```
//!
//! Keywords are case-sensitive, appear in this order, and are separated from
//! their unsigned decimal value by one space. Each line ends with `\n`.

use serde::{Deserialize, Serialize};

use crate::common::{Error, Result};

const VERSION_KEYWORD: &[u8] = b"VERSION ";
const TILE_WIDTH_KEYWORD: &[u8] = b"TILEWIDTH ";
const TILE_HEIGHT_KEYWORD: &[u8] = b"TILEHEIGHT ";
const PIXEL_SIZE_KEYWORD: &[u8] = b"PIXELSIZE ";
const DATA_KEYWORD: &[u8] = b"DATA ";

pub(super) const END_OF_LINE: u8 = b'\n';

/// Decoded tile container header
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileContainerHeader {
    /// Container format version
    pub version: u32,
    /// Tile width in pixels
    pub tile_width: u32,
    /// Tile height in pixels
    pub tile_height: u32,
    /// Bytes per pixel
    pub pixel_size: u32,
    /// Number of tile records following the header
    pub tile_count: u32,
    /// Offset of the first tile record
    pub header_byte_length: usize,
}

impl TileContainerHeader {
    /// Parse the header at the start of a tile container.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidArguments`] for an empty buffer
    /// - [`Error::ParseError`] for a missing, misspelled or out of order
    ///   keyword, a missing line end, or a value that is not an unsigned
    ///   decimal integer
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        if bytes.is_empty() {
            return Err(Error::InvalidArguments("Tile container buffer is empty".to_string()));
        }

        let mut offset = 0;
        let version = read_line(bytes, &mut offset, VERSION_KEYWORD)?;
        let tile_width = read_line(bytes, &mut offset, TILE_WIDTH_KEYWORD)?;
        let tile_height = read_line(bytes, &mut offset, TILE_HEIGHT_KEYWORD)?;
        let pixel_size = read_line(bytes, &mut offset, PIXEL_SIZE_KEYWORD)?;
        let tile_count = read_line(bytes, &mut offset, DATA_KEYWORD)?;

        Ok(Self {
            version,
            tile_width,
            tile_height,
            pixel_size,
            tile_count,
            header_byte_length: offset,
        })
    }

    /// Bytes of one decoded tile: `tile_width * tile_height * pixel_size`
    #[inline]
    pub fn tile_byte_length(&self) -> usize {
        (self.tile_width as usize)
            .saturating_mul(self.tile_height as usize)
            .saturating_mul(self.pixel_size as usize)
    }
}

/// Read one `KEYWORD value\n` line starting at `offset`, advancing past it.
fn read_line(bytes: &[u8], offset: &mut usize, keyword: &[u8]) -> Result<u32> {
    let line = &bytes[*offset..];
    if !line.starts_with(keyword) {
        return Err(Error::ParseError(format!(
            "Expected tile container keyword {:?} at offset {}",
            String::from_utf8_lossy(keyword).trim_end(),
            *offset
        )));
    }

    let value_start = keyword.len();
    let value_length = memchr::memchr(END_OF_LINE, &line[value_start..]).ok_or_else(|| {
        Error::ParseError(format!(
            "Missing line end after tile container keyword {:?}",
            String::from_utf8_lossy(keyword).trim_end()
        ))
    })?;
    let digits = &line[value_start..value_start + value_length];
    let value = parse_unsigned(digits).ok_or_else(|| {
        Error::ParseError(format!(
            "Invalid value {:?} for tile container keyword {:?}",
            String::from_utf8_lossy(digits),
            String::from_utf8_lossy(keyword).trim_end()
        ))
    })?;

    *offset += value_start + value_length + 1;
    Ok(value)
}

/// Strict unsigned decimal: digits only, no sign or padding
#[inline]
pub(super) fn parse_unsigned(digits: &[u8]) -> Option<u32> {
    if digits.is_empty() || !digits.iter().all(u8::is_ascii_digit) {
        return None;
    }
    atoi_simd::parse::<u32, false, false>(digits).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const ONLY_HEADER: &str = "VERSION 2\nTILEWIDTH 64\nTILEHEIGHT 64\nPIXELSIZE 4\nDATA 0\n";

    #[test]
    fn test_parse_header() {
        let header = TileContainerHeader::parse(ONLY_HEADER.as_bytes()).unwrap();
        assert_eq!(header.version, 2);
        assert_eq!(header.tile_width, 64);
        assert_eq!(header.tile_height, 64);
        assert_eq!(header.pixel_size, 4);
        assert_eq!(header.tile_count, 0);
        assert_eq!(header.header_byte_length, ONLY_HEADER.len());
        assert_eq!(header.tile_byte_length(), 64 * 64 * 4);
    }

    #[test]
    fn test_header_length_excludes_records() {
        let data = format!("{}0,0,LZF,1\n\x00", ONLY_HEADER.replace("DATA 0", "DATA 1"));
        let header = TileContainerHeader::parse(data.as_bytes()).unwrap();
        assert_eq!(header.tile_count, 1);
        assert_eq!(header.header_byte_length, ONLY_HEADER.len());
    }

    #[test]
    fn test_parse_is_idempotent() {
        let first = TileContainerHeader::parse(ONLY_HEADER.as_bytes()).unwrap();
        let second = TileContainerHeader::parse(ONLY_HEADER.as_bytes()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_buffer() {
        assert!(matches!(
            TileContainerHeader::parse(b""),
            Err(Error::InvalidArguments(_))
        ));
    }

    #[test]
    fn test_malformed_headers() {
        let cases = [
            // Missing final line end
            "VERSION 2\nTILEWIDTH 64\nTILEHEIGHT 64\nPIXELSIZE 4\nDATA 0",
            // Spaces instead of line ends
            "VERSION 2 TILEWIDTH 64 TILEHEIGHT 64 PIXELSIZE 4 DATA 0\n",
            // Misspelled keyword
            "VERSION 2\nTILEWIDTH 64\nTILEHEIGHT 64\nPIEXLSIZE 4\nDATA 0\n",
            // Lowercase keywords
            "version 2\ntilewidth 64\ntileheight 64\npixelsize 4\ndata 0\n",
            // Missing VERSION line
            "TILEWIDTH 64\nTILEHEIGHT 64\nPIXELSIZE 4\nDATA 0\n",
            // Non-integer value
            "VERSION 2.2\nTILEWIDTH 64\nTILEHEIGHT 64\nPIXELSIZE 4\nDATA 0\n",
            // Out of order
            "VERSION 2\nTILEHEIGHT 64\nTILEWIDTH 64\nPIXELSIZE 4\nDATA 0\n",
            // Negative value
            "VERSION 2\nTILEWIDTH -64\nTILEHEIGHT 64\nPIXELSIZE 4\nDATA 0\n",
            // Double space
            "VERSION  2\nTILEWIDTH 64\nTILEHEIGHT 64\nPIXELSIZE 4\nDATA 0\n",
            // Empty value
            "VERSION \nTILEWIDTH 64\nTILEHEIGHT 64\nPIXELSIZE 4\nDATA 0\n",
        ];
        for case in cases {
            assert!(
                matches!(TileContainerHeader::parse(case.as_bytes()), Err(Error::ParseError(_))),
                "accepted {:?}",
                case
            );
        }
    }

    #[test]
    fn test_parse_unsigned() {
        assert_eq!(parse_unsigned(b"64"), Some(64));
        assert_eq!(parse_unsigned(b""), None);
        assert_eq!(parse_unsigned(b"+1"), None);
        assert_eq!(parse_unsigned(b"1 "), None);
        assert_eq!(parse_unsigned(b"99999999999"), None);
    }
}
