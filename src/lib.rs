//! kra - A Rust library for reading Krita `.kra` documents
//!
//! A `.kra` file is a ZIP archive holding an XML description of the image
//! (`maindoc.xml`), one tile container per paint layer and, for animated
//! layers, a keyframe document plus one tile container per key frame.
//!
//! # Features
//!
//! - **Main document**: image name, size, color space family, layer count and
//!   animation settings
//! - **Layer tree**: every layer addressed by its depth-first pre-order index,
//!   with the index of its enclosing group
//! - **Key frames**: frame identifiers, timeline positions and offsets
//! - **Tile containers**: header parsing and per-tile LZF or stored decoding
//! - **Compositing**: planar tile data interleaved into a canvas buffer
//! - **Archive access** (feature `archive`, on by default): entries of a `.kra`
//!   file read through the `zip` crate
//! - **Image conversion** (feature `imgconv`): layers as `image::RgbaImage`
//!
//! # Example - Reading a `.kra` file
//!
//! ```no_run
//! use kra::{KraPackage, LayerType};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let package = KraPackage::open("drawing.kra")?;
//! let document = package.main_document()?;
//! println!("{} ({}x{})", document.image_name, document.width, document.height);
//!
//! for index in 0..document.layers_count {
//!     let layer = package.layer(index)?;
//!     if layer.layer_type == LayerType::Paint && !layer.is_animated() {
//!         let image = package.layer_image(&document.image_name, &layer)?;
//!         println!("{}: {}x{} at ({}, {})", layer.name, image.width, image.height, image.left, image.top);
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Example - Decoding tiles by hand
//!
//! ```
//! use kra::{TileContainer, delinearize_at};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut data = b"VERSION 2\nTILEWIDTH 1\nTILEHEIGHT 1\nPIXELSIZE 4\nDATA 1\n".to_vec();
//! data.extend_from_slice(b"1,0,LZF,5\n\x00\x10\x20\x30\xff");
//!
//! let container = TileContainer::parse(&data)?;
//! let mut tile = vec![0u8; container.tile_byte_length()];
//! let mut canvas = vec![0u8; 8];
//! for index in 0..container.tile_count() {
//!     let (x, y) = container.read_tile(index, &mut tile)?;
//!     delinearize_at(&tile, 1, &mut canvas, 2, x as usize, y as usize, 4)?;
//! }
//! assert_eq!(canvas, [0, 0, 0, 0, 0x10, 0x20, 0x30, 0xff]);
//! # Ok(())
//! # }
//! ```

/// Shared infrastructure: error types and the XML tree
pub mod common;

/// Krita document decoding
mod kra;

// Re-export commonly used types for convenience
pub use common::{Error, Result};
pub use kra::*;
