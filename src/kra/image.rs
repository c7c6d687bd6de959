//! Assembly of a whole layer from its tiles.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::pixel::delinearize_at;
use super::tiles::{TileContainer, TileRecord};
use crate::common::{Error, Result};

/// Interleaved pixels of one layer, covering the bounding box of its tiles.
///
/// `left` and `top` place the buffer on the canvas; they are negative when
/// the layer extends past the top-left corner of the image.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerImage {
    /// Canvas x coordinate of the first column
    pub left: i32,
    /// Canvas y coordinate of the first row
    pub top: i32,
    /// Width in pixels
    pub width: usize,
    /// Height in pixels
    pub height: usize,
    /// Bytes per pixel
    pub pixel_size: usize,
    /// Row-major interleaved pixel data, `width * height * pixel_size` bytes
    pub data: Vec<u8>,
}

impl LayerImage {
    /// Decode every tile of a container and composite them into one buffer.
    ///
    /// Tiles are decoded in parallel. Areas between tiles that no record
    /// covers stay zero (fully transparent). A container without tiles gives
    /// an empty image.
    pub fn from_container(container: &TileContainer<'_>) -> Result<Self> {
        let header = container.header();
        let tile_width = header.tile_width as usize;
        let tile_height = header.tile_height as usize;
        let pixel_size = header.pixel_size as usize;
        let tile_length = container.tile_byte_length();
        let polarity = container.polarity();

        let records = container.tiles().collect::<Result<Vec<TileRecord<'_>>>>()?;
        if records.is_empty() {
            return Ok(Self {
                pixel_size,
                ..Self::default()
            });
        }
        if tile_length == 0 {
            return Err(Error::InvalidArguments(format!(
                "Tiles of {}x{} pixels with {} bytes each hold no data",
                tile_width, tile_height, pixel_size
            )));
        }

        let tiles = records
            .par_iter()
            .map(|record| -> Result<(i32, i32, Vec<u8>)> {
                let mut planar = vec![0u8; tile_length];
                record.decode_into(&mut planar, polarity)?;
                Ok((record.x_offset, record.y_offset, planar))
            })
            .collect::<Result<Vec<_>>>()?;

        let left = tiles.iter().map(|(x, _, _)| *x as i64).min().unwrap_or_default();
        let top = tiles.iter().map(|(_, y, _)| *y as i64).min().unwrap_or_default();
        let right = tiles
            .iter()
            .map(|(x, _, _)| *x as i64 + tile_width as i64)
            .max()
            .unwrap_or_default();
        let bottom = tiles
            .iter()
            .map(|(_, y, _)| *y as i64 + tile_height as i64)
            .max()
            .unwrap_or_default();

        let width = (right - left) as usize;
        let height = (bottom - top) as usize;
        let length = width
            .checked_mul(height)
            .and_then(|v| v.checked_mul(pixel_size))
            .ok_or_else(|| {
                Error::InvalidArguments(format!("Layer of {}x{} pixels is too large", width, height))
            })?;
        let mut data = Vec::new();
        data.try_reserve_exact(length).map_err(|_| {
            Error::InvalidArguments(format!(
                "Layer of {}x{} pixels spans {} bytes, more than can be allocated",
                width, height, length
            ))
        })?;
        data.resize(length, 0);

        for (x, y, planar) in &tiles {
            delinearize_at(
                planar,
                tile_width,
                &mut data,
                width,
                (*x as i64 - left) as usize,
                (*y as i64 - top) as usize,
                pixel_size,
            )?;
        }

        debug!(
            tiles = tiles.len(),
            left,
            top,
            width,
            height,
            "assembled layer image"
        );
        Ok(Self {
            left: left as i32,
            top: top as i32,
            width,
            height,
            pixel_size,
            data,
        })
    }

    /// Whether the image has no pixels
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Bytes of the pixel at `(x, y)`, relative to `left` and `top`
    pub fn pixel(&self, x: usize, y: usize) -> Option<&[u8]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let start = (y * self.width + x) * self.pixel_size;
        self.data.get(start..start + self.pixel_size)
    }

    /// Convert 8-bit BGRA pixels into an RGBA image buffer.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArguments`] unless the layer has four bytes per pixel.
    #[cfg(feature = "imgconv")]
    pub fn to_rgba_image(&self) -> Result<::image::RgbaImage> {
        if self.pixel_size != 4 {
            return Err(Error::InvalidArguments(format!(
                "Expected 4 bytes per pixel, layer has {}",
                self.pixel_size
            )));
        }
        let rgba: Vec<u8> = self
            .data
            .chunks_exact(4)
            .flat_map(|bgra| [bgra[2], bgra[1], bgra[0], bgra[3]])
            .collect();
        let width = u32::try_from(self.width)
            .map_err(|_| Error::InvalidArguments("Layer width exceeds u32".to_string()))?;
        let height = u32::try_from(self.height)
            .map_err(|_| Error::InvalidArguments("Layer height exceeds u32".to_string()))?;
        ::image::RgbaImage::from_raw(width, height, rgba)
            .ok_or_else(|| Error::InvalidArguments("Pixel buffer does not match layer size".to_string()))
    }
}
