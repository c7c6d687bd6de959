//! Tile records: `x,y,LZF,length\n` followed by `length` payload bytes.

use tracing::trace;

use super::header::{END_OF_LINE, parse_unsigned};
use crate::common::{Error, Result};
use crate::kra::config::FlagPolarity;
use crate::kra::lzf;

const FIELD_SEPARATOR: u8 = b',';

/// Compression type written by every known Krita version
const COMPRESSION_TYPE: &[u8] = b"LZF";

/// Storage of a tile payload, from the flag byte leading it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompressionFlag {
    /// Payload bytes are the tile data
    Raw,
    /// Payload is an LZF block
    Lzf,
}

impl CompressionFlag {
    /// Interpret a flag byte under the given polarity.
    ///
    /// Any byte other than the two assigned values belongs to a format
    /// revision this decoder does not know and is a [`Error::DecompressError`].
    pub fn from_byte(flag: u8, polarity: FlagPolarity) -> Result<Self> {
        if flag == polarity.raw_flag() {
            Ok(CompressionFlag::Raw)
        } else if flag == polarity.lzf_flag() {
            Ok(CompressionFlag::Lzf)
        } else {
            Err(Error::DecompressError(format!("Unknown tile compression flag {}", flag)))
        }
    }
}

/// A tile record borrowed from its container buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileRecord<'a> {
    /// Horizontal position of the tile's top-left pixel
    pub x_offset: i32,
    /// Vertical position of the tile's top-left pixel
    pub y_offset: i32,
    /// Declared byte length of flag byte plus payload
    pub compressed_length: usize,
    /// Flag byte value
    pub flag: u8,
    /// Payload without the flag byte
    pub payload: &'a [u8],
}

impl<'a> TileRecord<'a> {
    /// Interpret the flag byte under the given polarity
    #[inline]
    pub fn compression_flag(&self, polarity: FlagPolarity) -> Result<CompressionFlag> {
        CompressionFlag::from_byte(self.flag, polarity)
    }

    /// Decode the payload into `output`, which must be exactly one tile long.
    ///
    /// # Errors
    ///
    /// [`Error::DecompressError`] for an unknown flag byte, a stored payload
    /// of the wrong length, or an LZF block that does not expand to exactly
    /// `output.len()` bytes.
    pub fn decode_into(&self, output: &mut [u8], polarity: FlagPolarity) -> Result<()> {
        match self.compression_flag(polarity)? {
            CompressionFlag::Raw => {
                if self.payload.len() != output.len() {
                    return Err(Error::DecompressError(format!(
                        "Stored tile holds {} bytes, expected {}",
                        self.payload.len(),
                        output.len()
                    )));
                }
                output.copy_from_slice(self.payload);
            },
            CompressionFlag::Lzf => {
                let written = lzf::decompress_into(self.payload, output)?;
                if written != output.len() {
                    return Err(Error::DecompressError(format!(
                        "Tile expanded to {} bytes, expected {}",
                        written,
                        output.len()
                    )));
                }
            },
        }
        Ok(())
    }

    /// Parse the record starting at `offset`, returning it and the offset of
    /// the next record.
    pub(super) fn parse(bytes: &'a [u8], offset: usize) -> Result<(Self, usize)> {
        let mut cursor = offset;
        let x_field = next_field(bytes, &mut cursor, FIELD_SEPARATOR)?;
        let y_field = next_field(bytes, &mut cursor, FIELD_SEPARATOR)?;
        let compression = next_field(bytes, &mut cursor, FIELD_SEPARATOR)?;
        let length_field = next_field(bytes, &mut cursor, END_OF_LINE)?;

        let x_offset = parse_signed(x_field).ok_or_else(|| invalid_field("x offset", x_field))?;
        let y_offset = parse_signed(y_field).ok_or_else(|| invalid_field("y offset", y_field))?;
        if compression != COMPRESSION_TYPE {
            return Err(invalid_field("compression type", compression));
        }
        let compressed_length = parse_unsigned(length_field)
            .ok_or_else(|| invalid_field("compressed length", length_field))?
            as usize;
        if compressed_length == 0 {
            return Err(Error::ParseError(format!(
                "Tile record at offset {} has no flag byte",
                offset
            )));
        }

        let end = cursor
            .checked_add(compressed_length)
            .filter(|&end| end <= bytes.len())
            .ok_or_else(|| {
                Error::ParseError(format!(
                    "Tile record at offset {} declares {} bytes, {} available",
                    offset,
                    compressed_length,
                    bytes.len() - cursor
                ))
            })?;

        trace!(x_offset, y_offset, compressed_length, offset, "tile record");

        Ok((
            Self {
                x_offset,
                y_offset,
                compressed_length,
                flag: bytes[cursor],
                payload: &bytes[cursor + 1..end],
            },
            end,
        ))
    }
}

/// Take the bytes up to `terminator`, advancing past it. A line end inside a
/// comma separated field is malformed.
fn next_field<'a>(bytes: &'a [u8], cursor: &mut usize, terminator: u8) -> Result<&'a [u8]> {
    let rest = &bytes[*cursor..];
    let position = match memchr::memchr2(FIELD_SEPARATOR, END_OF_LINE, rest) {
        Some(position) if rest[position] == terminator => position,
        _ => {
            return Err(Error::ParseError(format!(
                "Malformed tile record field at offset {}",
                *cursor
            )));
        },
    };
    *cursor += position + 1;
    Ok(&rest[..position])
}

/// Signed decimal with an optional leading minus sign
fn parse_signed(digits: &[u8]) -> Option<i32> {
    let (negative, magnitude) = match digits.split_first() {
        Some((b'-', rest)) => (true, rest),
        _ => (false, digits),
    };
    if magnitude.is_empty() || !magnitude.iter().all(u8::is_ascii_digit) {
        return None;
    }
    atoi_simd::parse::<i64, false, false>(magnitude)
        .ok()
        .map(|value| if negative { -value } else { value })
        .and_then(|value| i32::try_from(value).ok())
}

fn invalid_field(field: &str, value: &[u8]) -> Error {
    Error::ParseError(format!(
        "Invalid tile record {} {:?}",
        field,
        String::from_utf8_lossy(value)
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_record() {
        let data = b"64,-128,LZF,4\n\x00abcNEXT";
        let (record, next) = TileRecord::parse(data, 0).unwrap();
        assert_eq!(record.x_offset, 64);
        assert_eq!(record.y_offset, -128);
        assert_eq!(record.compressed_length, 4);
        assert_eq!(record.flag, 0);
        assert_eq!(record.payload, b"abc");
        assert_eq!(&data[next..], b"NEXT");
    }

    #[test]
    fn test_malformed_records() {
        let cases: [&[u8]; 9] = [
            b"0,0,LZF,4\n\x00ab",
            b"0,0,LZF,0\n",
            b"0,0,ZIP,1\n\x00",
            b"0,0,lzf,1\n\x00",
            b"a,0,LZF,1\n\x00",
            b"0,1.5,LZF,1\n\x00",
            b"0,0\n,LZF,1\n\x00",
            b"0,0,LZF,1",
            b"0,0,LZF,-1\n\x00",
        ];
        for case in cases {
            assert!(
                matches!(TileRecord::parse(case, 0), Err(Error::ParseError(_))),
                "accepted {:?}",
                String::from_utf8_lossy(case)
            );
        }
    }

    #[test]
    fn test_flag_polarity() {
        let normal = FlagPolarity::RawZeroLzfOne;
        let swapped = FlagPolarity::LzfZeroRawOne;
        assert_eq!(CompressionFlag::from_byte(0, normal).unwrap(), CompressionFlag::Raw);
        assert_eq!(CompressionFlag::from_byte(1, normal).unwrap(), CompressionFlag::Lzf);
        assert_eq!(CompressionFlag::from_byte(0, swapped).unwrap(), CompressionFlag::Lzf);
        assert!(matches!(
            CompressionFlag::from_byte(2, normal),
            Err(Error::DecompressError(_))
        ));
    }

    #[test]
    fn test_decode_stored_length_mismatch() {
        let data = b"0,0,LZF,4\n\x00abc";
        let (record, _) = TileRecord::parse(data, 0).unwrap();
        let mut exact = [0u8; 3];
        record.decode_into(&mut exact, FlagPolarity::default()).unwrap();
        assert_eq!(&exact, b"abc");

        let mut larger = [0u8; 4];
        assert!(matches!(
            record.decode_into(&mut larger, FlagPolarity::default()),
            Err(Error::DecompressError(_))
        ));
    }

    #[test]
    fn test_parse_signed() {
        assert_eq!(parse_signed(b"-64"), Some(-64));
        assert_eq!(parse_signed(b"0"), Some(0));
        assert_eq!(parse_signed(b"-2147483648"), Some(i32::MIN));
        assert_eq!(parse_signed(b"2147483648"), None);
        assert_eq!(parse_signed(b"-"), None);
        assert_eq!(parse_signed(b"--1"), None);
        assert_eq!(parse_signed(b""), None);
    }
}
