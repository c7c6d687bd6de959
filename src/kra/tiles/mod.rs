//! Tile containers: per-layer pixel data split into fixed-size tiles.
//!
//! A container is a text header followed by `DATA` tile records. Every
//! lookup scans the records from the start of the tile region, so a
//! [`TileContainer`] holds no cursor state and can be shared freely between
//! threads decoding different tiles.

mod header;
mod record;

pub use header::TileContainerHeader;
pub use record::{CompressionFlag, TileRecord};

use tracing::debug;

use super::config::{FlagPolarity, ParseOptions};
use crate::common::{Error, Result};

/// A parsed tile container borrowing its source buffer.
#[derive(Debug, Clone, Copy)]
pub struct TileContainer<'a> {
    header: TileContainerHeader,
    data: &'a [u8],
    polarity: FlagPolarity,
}

impl<'a> TileContainer<'a> {
    /// Parse the container header.
    ///
    /// Tile records are not validated until they are read.
    ///
    /// # Examples
    ///
    /// ```
    /// use kra::TileContainer;
    ///
    /// let mut data = b"VERSION 2\nTILEWIDTH 2\nTILEHEIGHT 1\nPIXELSIZE 1\nDATA 1\n".to_vec();
    /// data.extend_from_slice(b"-2,4,LZF,3\n\x00\x07\x09");
    ///
    /// let container = TileContainer::parse(&data)?;
    /// assert_eq!(container.header().tile_count, 1);
    ///
    /// let mut tile = [0u8; 2];
    /// assert_eq!(container.read_tile(0, &mut tile)?, (-2, 4));
    /// assert_eq!(tile, [7, 9]);
    /// # Ok::<(), kra::Error>(())
    /// ```
    pub fn parse(bytes: &'a [u8]) -> Result<Self> {
        Self::parse_with_options(bytes, &ParseOptions::default())
    }

    /// Parse the container header with explicit options
    pub fn parse_with_options(bytes: &'a [u8], options: &ParseOptions) -> Result<Self> {
        let header = TileContainerHeader::parse(bytes)?;
        debug!(
            version = header.version,
            tile_width = header.tile_width,
            tile_height = header.tile_height,
            pixel_size = header.pixel_size,
            tile_count = header.tile_count,
            "parsed tile container header"
        );
        Ok(Self {
            header,
            data: bytes,
            polarity: options.compression_polarity,
        })
    }

    /// The container header
    #[inline]
    pub fn header(&self) -> &TileContainerHeader {
        &self.header
    }

    /// Number of tile records declared by the header
    #[inline]
    pub fn tile_count(&self) -> usize {
        self.header.tile_count as usize
    }

    /// Byte length every tile decodes to
    #[inline]
    pub fn tile_byte_length(&self) -> usize {
        self.header.tile_byte_length()
    }

    /// Flag byte polarity used when decoding
    #[inline]
    pub fn polarity(&self) -> FlagPolarity {
        self.polarity
    }

    /// Decode tile `index` into `output`, returning its `(x, y)` offset.
    ///
    /// Tile data is stored planar: all bytes of channel 0, then channel 1,
    /// and so on. See [`crate::delinearize`] for interleaving it.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidArguments`] when `output` is not exactly one tile long
    /// - [`Error::NotFound`] when `index` is past the last record
    /// - [`Error::ParseError`] for a malformed record before or at `index`
    /// - [`Error::DecompressError`] when the payload cannot be decoded
    pub fn read_tile(&self, index: usize, output: &mut [u8]) -> Result<(i32, i32)> {
        let expected = self.tile_byte_length();
        if output.len() != expected {
            return Err(Error::InvalidArguments(format!(
                "Tile buffer holds {} bytes, tiles decode to {}",
                output.len(),
                expected
            )));
        }

        let record = self
            .tiles()
            .nth(index)
            .ok_or_else(|| Error::NotFound(format!("Tile {}", index)))??;
        record.decode_into(output, self.polarity)?;
        Ok((record.x_offset, record.y_offset))
    }

    /// Decode tile `index` into a new buffer
    pub fn read_tile_to_vec(&self, index: usize) -> Result<(i32, i32, Vec<u8>)> {
        let mut output = vec![0u8; self.tile_byte_length()];
        let (x, y) = self.read_tile(index, &mut output)?;
        Ok((x, y, output))
    }

    /// Iterate over tile records in order.
    ///
    /// Iteration stops after the declared number of records, at the end of
    /// the buffer, or after yielding the first parse error.
    pub fn tiles(&self) -> TileRecords<'a> {
        TileRecords {
            data: self.data,
            offset: self.header.header_byte_length,
            remaining: self.tile_count(),
        }
    }
}

/// Iterator over the records of a [`TileContainer`]
#[derive(Debug, Clone)]
pub struct TileRecords<'a> {
    data: &'a [u8],
    offset: usize,
    remaining: usize,
}

impl<'a> Iterator for TileRecords<'a> {
    type Item = Result<TileRecord<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 || self.offset >= self.data.len() {
            return None;
        }
        match TileRecord::parse(self.data, self.offset) {
            Ok((record, next)) => {
                self.offset = next;
                self.remaining -= 1;
                Some(Ok(record))
            },
            Err(err) => {
                self.remaining = 0;
                Some(Err(err))
            },
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining))
    }
}
