/// Archive entry names and XML vocabulary
pub mod constants;
/// Parsing options
mod config;
/// Main document metadata
mod document;
/// Layer pixel assembly
mod image;
/// Animation key frames
mod keyframes;
/// Layer tree reconstruction
mod layer;
/// LZF block decompression
pub mod lzf;
/// `.kra` archive access
#[cfg(feature = "archive")]
mod package;
/// Layer entry paths
mod path;
/// Planar to interleaved pixel conversion
mod pixel;
/// Tile container decoding
mod tiles;
/// Layer and color space classifiers
mod types;

/// Re-export the main APIs
pub use config::{DEFAULT_MAX_STRING_LENGTH, FlagPolarity, ParseOptions};
pub use document::{Animation, MainDocument};
pub use image::LayerImage;
pub use keyframes::{
    KeyFrame, KeyFrames, key_frames_count, read_key_frame, read_key_frame_with_options,
};
pub use layer::{LayerNode, LayerTree, read_layer, read_layer_with_options};
#[cfg(feature = "archive")]
pub use package::KraPackage;
pub use path::{layer_file_path, write_layer_file_path};
pub use pixel::{delinearize, delinearize_at};
pub use tiles::{CompressionFlag, TileContainer, TileContainerHeader, TileRecord, TileRecords};
pub use types::{ColorSpaceModel, LayerType, Visibility};
