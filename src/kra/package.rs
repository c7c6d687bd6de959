//! `.kra` archive access.
//!
//! A Krita document is a ZIP archive holding `mimetype`, `maindoc.xml` and
//! one directory per image with the layer data below `{image}/layers/`.

use std::cell::RefCell;
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek};
use std::path::Path;

use tracing::{debug, warn};

use super::config::ParseOptions;
use super::constants::{KRA_MIMETYPE, MAIN_DOC_FILE_NAME};
use super::document::MainDocument;
use super::image::LayerImage;
use super::keyframes::{KeyFrame, KeyFrames};
use super::layer::{LayerNode, LayerTree, read_layer_with_options};
use super::path::layer_file_path;
use super::tiles::TileContainer;
use super::types::LayerType;
use crate::common::xml::XmlDocument;
use crate::common::{Error, Result};

/// Entry holding the archive MIME type
const MIMETYPE_FILE_NAME: &str = "mimetype";

/// A Krita archive opened for reading
pub struct KraPackage<R> {
    archive: RefCell<zip::ZipArchive<R>>,
    mimetype: String,
    options: ParseOptions,
}

impl KraPackage<BufReader<File>> {
    /// Open a `.kra` file from disk
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }
}

impl<'a> KraPackage<Cursor<&'a [u8]>> {
    /// Open a `.kra` archive held in memory
    pub fn from_bytes(bytes: &'a [u8]) -> Result<Self> {
        Self::from_reader(Cursor::new(bytes))
    }
}

impl<R: Read + Seek> KraPackage<R> {
    /// Open a `.kra` archive from a reader
    pub fn from_reader(reader: R) -> Result<Self> {
        let mut archive = zip::ZipArchive::new(reader)?;
        let mimetype = Self::read_mimetype(&mut archive)?;
        if !mimetype.is_empty() && mimetype != KRA_MIMETYPE {
            debug!(mimetype = %mimetype, "archive is not tagged as a Krita document");
        }

        Ok(Self {
            archive: RefCell::new(archive),
            mimetype,
            options: ParseOptions::default(),
        })
    }

    /// Use explicit options for every document parsed from this archive
    pub fn with_options(mut self, options: ParseOptions) -> Self {
        self.options = options;
        self
    }

    /// Read the MIME type entry; empty when the archive has none
    fn read_mimetype(archive: &mut zip::ZipArchive<R>) -> Result<String> {
        let mut mimetype_file = match archive.by_name(MIMETYPE_FILE_NAME) {
            Ok(file) => file,
            Err(zip::result::ZipError::FileNotFound) => return Ok(String::new()),
            Err(e) => return Err(e.into()),
        };

        let mut content = String::new();
        mimetype_file.read_to_string(&mut content)?;
        Ok(content.trim().to_string())
    }

    /// MIME type from the `mimetype` entry
    pub fn mimetype(&self) -> &str {
        &self.mimetype
    }

    /// Whether the archive declares the Krita MIME type
    pub fn is_krita(&self) -> bool {
        self.mimetype == KRA_MIMETYPE
    }

    /// Options used for parsing documents from this archive
    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Uncompressed size of an entry
    pub fn file_size(&self, path: &str) -> Result<u64> {
        let mut archive = self.archive.borrow_mut();
        let file = archive.by_name(path)?;
        Ok(file.size())
    }

    /// Read an entry into a new buffer
    pub fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let mut archive = self.archive.borrow_mut();
        let mut file = archive.by_name(path)?;

        let mut content = Vec::new();
        file.read_to_end(&mut content)?;
        Ok(content)
    }

    /// Read an entry into a caller buffer, returning the entry size.
    ///
    /// Fails with [`Error::InvalidArguments`] when the buffer is smaller than
    /// the entry.
    pub fn read_file_into(&self, path: &str, buffer: &mut [u8]) -> Result<usize> {
        let mut archive = self.archive.borrow_mut();
        let mut file = archive.by_name(path)?;

        let size = usize::try_from(file.size())
            .map_err(|_| Error::InvalidArguments(format!("Entry {} is too large", path)))?;
        if buffer.len() < size {
            return Err(Error::InvalidArguments(format!(
                "Buffer holds {} bytes, entry {} has {}",
                buffer.len(),
                path,
                size
            )));
        }
        file.read_exact(&mut buffer[..size])?;
        Ok(size)
    }

    /// Check if an entry exists
    pub fn has_file(&self, path: &str) -> bool {
        self.archive.borrow_mut().by_name(path).is_ok()
    }

    /// Names of all entries
    pub fn files(&self) -> Vec<String> {
        self.archive
            .borrow()
            .file_names()
            .map(|name| name.to_string())
            .collect()
    }

    /// Parse image metadata from `maindoc.xml`
    pub fn main_document(&self) -> Result<MainDocument> {
        let bytes = self.read_file(MAIN_DOC_FILE_NAME)?;
        MainDocument::from_bytes_with_options(&bytes, &self.options)
    }

    /// Parse the whole layer tree from `maindoc.xml`
    pub fn layer_tree(&self) -> Result<LayerTree> {
        let bytes = self.read_file(MAIN_DOC_FILE_NAME)?;
        LayerTree::from_bytes_with_options(&bytes, &self.options)
    }

    /// Read one layer node by flattened index
    pub fn layer(&self, index: usize) -> Result<LayerNode> {
        let bytes = self.read_file(MAIN_DOC_FILE_NAME)?;
        read_layer_with_options(&bytes, index, &self.options)
    }

    /// Raw tile container of a layer or key frame
    pub fn layer_data(&self, image_name: &str, file_name: &str) -> Result<Vec<u8>> {
        self.read_file(&layer_file_path(image_name, file_name))
    }

    /// Key frames of an animated layer
    pub fn key_frames(&self, image_name: &str, layer: &LayerNode) -> Result<KeyFrames> {
        if !layer.is_animated() {
            return Err(Error::NotFound(format!(
                "Key frames of layer {} ({})",
                layer.index, layer.name
            )));
        }
        let bytes = self.layer_data(image_name, &layer.key_frame_file_name)?;
        KeyFrames::from_bytes_with_options(&bytes, &self.options)
    }

    /// Decode the pixels of a paint layer
    pub fn layer_image(&self, image_name: &str, layer: &LayerNode) -> Result<LayerImage> {
        if layer.layer_type != LayerType::Paint {
            return Err(Error::InvalidArguments(format!(
                "Layer {} ({}) is a {:?} layer without pixel data",
                layer.index, layer.name, layer.layer_type
            )));
        }
        self.decode_container(image_name, &layer.file_name)
    }

    /// Decode the pixels of one key frame of an animated layer
    pub fn frame_image(&self, image_name: &str, key_frame: &KeyFrame) -> Result<LayerImage> {
        self.decode_container(image_name, &key_frame.frame_identifier)
    }

    fn decode_container(&self, image_name: &str, file_name: &str) -> Result<LayerImage> {
        let bytes = self.layer_data(image_name, file_name)?;
        let container = TileContainer::parse_with_options(&bytes, &self.options)?;
        LayerImage::from_container(&container)
    }

    /// Decode every paint layer of the document.
    ///
    /// Layers whose data is missing or fails to decode are skipped with a
    /// warning; the remaining layers are still returned.
    pub fn layer_images(&self) -> Result<Vec<(LayerNode, LayerImage)>> {
        let bytes = self.read_file(MAIN_DOC_FILE_NAME)?;
        let document = XmlDocument::from_bytes(&bytes)?;
        let main_document = MainDocument::from_xml(&document, &self.options)?;
        let tree = LayerTree::from_xml(&document, &self.options)?;

        let mut images = Vec::new();
        for layer in tree.layers() {
            if layer.layer_type != LayerType::Paint {
                continue;
            }
            match self.layer_image(&main_document.image_name, layer) {
                Ok(image) => images.push((layer.clone(), image)),
                Err(e) => {
                    warn!(layer = layer.index, name = %layer.name, error = %e, "skipping layer");
                },
            }
        }
        Ok(images)
    }
}
