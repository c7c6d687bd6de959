//! Animation key frame documents (`*.keyframes.xml`).
//!
//! Each animated layer has a keyframe document listing, per channel, the
//! frames at which the layer content changes. Every key frame names the tile
//! container holding its pixels and an offset applied to that content.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::config::ParseOptions;
use super::constants::{
    FRAME_ATTRIBUTE, KEY_FRAME_NODES, OFFSET_NODE, TIME_ATTRIBUTE, X_ATTRIBUTE, Y_ATTRIBUTE,
};
use crate::common::xml::{XmlDocument, XmlNode};
use crate::common::{Error, Result};

/// A single key frame of an animated layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyFrame {
    /// Tile container entry holding the frame content
    pub frame_identifier: String,
    /// Horizontal offset of the frame content
    pub x: i32,
    /// Vertical offset of the frame content
    pub y: i32,
    /// Timeline position, in frames
    pub time: u32,
    /// Position in document order
    pub index: usize,
}

impl KeyFrame {
    fn from_node<N: XmlNode>(node: &N, index: usize, options: &ParseOptions) -> Self {
        let (x, y) = node
            .child(OFFSET_NODE)
            .map(|offset| (offset.attribute_i32(X_ATTRIBUTE), offset.attribute_i32(Y_ATTRIBUTE)))
            .unwrap_or((0, 0));
        Self {
            frame_identifier: options.limit(node.attribute_str(FRAME_ATTRIBUTE)),
            x,
            y,
            time: node.attribute_u32(TIME_ATTRIBUTE),
            index,
        }
    }
}

/// Number of key frames in a keyframe document.
///
/// Returns 0 for an empty buffer or a document that fails to parse.
pub fn key_frames_count(bytes: &[u8]) -> usize {
    if bytes.is_empty() {
        return 0;
    }
    match XmlDocument::from_bytes(bytes) {
        Ok(document) => document.select_nodes(KEY_FRAME_NODES).len(),
        Err(_) => 0,
    }
}

/// Read the key frame at `index` from a keyframe document.
///
/// # Errors
///
/// - [`Error::InvalidArguments`] for an empty buffer
/// - [`Error::ParseError`] for malformed XML
/// - [`Error::NotFound`] when `index` is past the last key frame
pub fn read_key_frame(bytes: &[u8], index: usize) -> Result<KeyFrame> {
    read_key_frame_with_options(bytes, index, &ParseOptions::default())
}

/// [`read_key_frame`] with explicit options.
pub fn read_key_frame_with_options(
    bytes: &[u8],
    index: usize,
    options: &ParseOptions,
) -> Result<KeyFrame> {
    if bytes.is_empty() {
        return Err(Error::InvalidArguments("Key frames buffer is empty".to_string()));
    }
    let document = XmlDocument::from_bytes(bytes)?;
    document
        .select_nodes(KEY_FRAME_NODES)
        .get(index)
        .map(|node| KeyFrame::from_node(*node, index, options))
        .ok_or_else(|| Error::NotFound(format!("Key frame {}", index)))
}

/// All key frames of a keyframe document, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyFrames {
    frames: Vec<KeyFrame>,
}

impl KeyFrames {
    /// Parse every key frame of a document.
    ///
    /// # Examples
    ///
    /// ```
    /// use kra::KeyFrames;
    ///
    /// let xml = br#"<keyframes><channel name="content">
    ///     <keyframe time="0" frame="layer3"><offset x="0" y="0"/></keyframe>
    ///     <keyframe time="24" frame="layer3.f1"><offset x="-8" y="4"/></keyframe>
    /// </channel></keyframes>"#;
    ///
    /// let frames = KeyFrames::from_bytes(xml)?;
    /// assert_eq!(frames.len(), 2);
    /// assert_eq!(frames.frames()[1].frame_identifier, "layer3.f1");
    /// assert_eq!(frames.frame_at(30).map(|f| f.x), Some(-8));
    /// # Ok::<(), kra::Error>(())
    /// ```
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_bytes_with_options(bytes, &ParseOptions::default())
    }

    /// Parse every key frame with explicit options
    pub fn from_bytes_with_options(bytes: &[u8], options: &ParseOptions) -> Result<Self> {
        if bytes.is_empty() {
            return Err(Error::InvalidArguments("Key frames buffer is empty".to_string()));
        }
        let document = XmlDocument::from_bytes(bytes)?;
        let frames: Vec<KeyFrame> = document
            .select_nodes(KEY_FRAME_NODES)
            .into_iter()
            .enumerate()
            .map(|(index, node)| KeyFrame::from_node(node, index, options))
            .collect();

        debug!(frames = frames.len(), "parsed key frames");
        Ok(Self { frames })
    }

    /// Number of key frames
    #[inline]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Whether the document has no key frames
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Key frames in document order
    #[inline]
    pub fn frames(&self) -> &[KeyFrame] {
        &self.frames
    }

    /// Key frame at a document index
    pub fn get(&self, index: usize) -> Result<&KeyFrame> {
        self.frames
            .get(index)
            .ok_or_else(|| Error::NotFound(format!("Key frame {}", index)))
    }

    /// The key frame shown at timeline position `time`: the latest key
    /// frame starting at or before it.
    pub fn frame_at(&self, time: u32) -> Option<&KeyFrame> {
        self.frames
            .iter()
            .filter(|frame| frame.time <= time)
            .max_by_key(|frame| frame.time)
    }
}
