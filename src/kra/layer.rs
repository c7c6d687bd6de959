//! Layer tree reconstruction.
//!
//! `maindoc.xml` stores layers as nested `<layers><layer/>...</layers>` lists
//! where only group layers have children. Consumers address layers by their
//! position in a depth-first pre-order walk of that tree; the walk below is
//! the single definition of that order, shared by layer counting and lookup.

use std::ops::ControlFlow;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::config::ParseOptions;
use super::constants::{
    FILE_NAME_ATTRIBUTE, IMAGE_NODE, KEY_FRAMES_ATTRIBUTE, LAYER_NODES, NAME_ATTRIBUTE,
    NODE_TYPE_ATTRIBUTE, OPACITY_ATTRIBUTE, VISIBLE_ATTRIBUTE,
};
use super::types::{LayerType, Visibility};
use crate::common::xml::{XmlDocument, XmlNode};
use crate::common::{Error, Result};

/// A single node of the layer tree, addressed by its flattened index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerNode {
    /// Display name
    pub name: String,
    /// Tile container entry below `{image}/layers/`, empty for groups
    pub file_name: String,
    /// Keyframe document entry; non-empty means the layer is animated and
    /// `file_name` is not read directly
    pub key_frame_file_name: String,
    /// Node type
    pub layer_type: LayerType,
    /// Opacity, 0 (transparent) to 255 (opaque)
    pub opacity: u8,
    /// Visibility
    pub visibility: Visibility,
    /// Position in the flattened pre-order sequence
    pub index: usize,
    /// Index of the enclosing group, `None` for top-level layers
    pub parent_index: Option<usize>,
}

impl LayerNode {
    fn from_node<N: XmlNode>(
        node: &N,
        index: usize,
        parent_index: Option<usize>,
        options: &ParseOptions,
    ) -> Self {
        Self {
            name: options.limit(node.attribute_str(NAME_ATTRIBUTE)),
            file_name: options.limit(node.attribute_str(FILE_NAME_ATTRIBUTE)),
            key_frame_file_name: options.limit(node.attribute_str(KEY_FRAMES_ATTRIBUTE)),
            layer_type: LayerType::from_node_type(node.attribute_str(NODE_TYPE_ATTRIBUTE)),
            opacity: node.attribute_u32(OPACITY_ATTRIBUTE).min(u8::MAX as u32) as u8,
            visibility: Visibility::from_flag(node.attribute_i32(VISIBLE_ATTRIBUTE)),
            index,
            parent_index,
        }
    }

    /// Whether the layer content lives in a keyframe document
    #[inline]
    pub fn is_animated(&self) -> bool {
        !self.key_frame_file_name.is_empty()
    }

    /// Whether the layer is a top-level layer
    #[inline]
    pub fn is_root(&self) -> bool {
        self.parent_index.is_none()
    }
}

/// Visit layer nodes in flattened pre-order.
///
/// `counter` holds the index the next visited node receives. Each node is
/// offered to `visit` with its index and the index of its enclosing group
/// before its own children are walked. Only group layers are descended into.
pub(crate) fn walk_layers<'a, N, B, F>(
    nodes: &[&'a N],
    counter: &mut usize,
    parent_index: Option<usize>,
    visit: &mut F,
) -> ControlFlow<B>
where
    N: XmlNode,
    F: FnMut(&'a N, usize, Option<usize>) -> ControlFlow<B>,
{
    for &node in nodes {
        let index = *counter;
        visit(node, index, parent_index)?;
        *counter += 1;

        if LayerType::from_node_type(node.attribute_str(NODE_TYPE_ATTRIBUTE)).is_group() {
            let children = node.select_nodes(LAYER_NODES);
            walk_layers(&children, counter, Some(index), visit)?;
        }
    }
    ControlFlow::Continue(())
}

/// Count every layer node reachable from an image node, groups included.
pub(crate) fn count_layers<N: XmlNode>(image: &N) -> usize {
    let mut counter = 0;
    let top_level = image.select_nodes(LAYER_NODES);
    let _ = walk_layers::<N, (), _>(&top_level, &mut counter, None, &mut |_, _, _| {
        ControlFlow::Continue(())
    });
    counter
}

/// Find the layer at a flattened index below an image node.
pub(crate) fn find_layer<N: XmlNode>(
    image: &N,
    layer_index: usize,
    options: &ParseOptions,
) -> Option<LayerNode> {
    let mut counter = 0;
    let top_level = image.select_nodes(LAYER_NODES);
    match walk_layers(&top_level, &mut counter, None, &mut |node, index, parent| {
        if index == layer_index {
            ControlFlow::Break(LayerNode::from_node(node, index, parent, options))
        } else {
            ControlFlow::Continue(())
        }
    }) {
        ControlFlow::Break(layer) => Some(layer),
        ControlFlow::Continue(()) => None,
    }
}

/// Read the layer at `layer_index` from a main document buffer.
///
/// # Errors
///
/// - [`Error::InvalidArguments`] for an empty buffer
/// - [`Error::ParseError`] for malformed XML
/// - [`Error::NotFound`] when the image node is missing or the index is past
///   the last layer
///
/// # Examples
///
/// ```
/// use kra::{LayerType, read_layer};
///
/// let xml = br#"<DOC><IMAGE name="img"><layers>
///     <layer name="group" nodetype="grouplayer"><layers>
///         <layer name="paint" nodetype="paintlayer" filename="layer2"/>
///     </layers></layer>
/// </layers></IMAGE></DOC>"#;
///
/// let group = read_layer(xml, 0)?;
/// assert_eq!(group.layer_type, LayerType::Group);
/// let paint = read_layer(xml, 1)?;
/// assert_eq!(paint.parent_index, Some(0));
/// assert!(read_layer(xml, 2).unwrap_err().is_not_found());
/// # Ok::<(), kra::Error>(())
/// ```
pub fn read_layer(bytes: &[u8], layer_index: usize) -> Result<LayerNode> {
    read_layer_with_options(bytes, layer_index, &ParseOptions::default())
}

/// [`read_layer`] with explicit options.
pub fn read_layer_with_options(
    bytes: &[u8],
    layer_index: usize,
    options: &ParseOptions,
) -> Result<LayerNode> {
    if bytes.is_empty() {
        return Err(Error::InvalidArguments("Main document buffer is empty".to_string()));
    }
    let document = XmlDocument::from_bytes(bytes)?;
    let image = document
        .select_node(IMAGE_NODE)
        .ok_or_else(|| Error::NotFound("IMAGE node".to_string()))?;

    find_layer(image, layer_index, options)
        .ok_or_else(|| Error::NotFound(format!("Layer {}", layer_index)))
}

/// The complete flattened layer tree of a main document.
///
/// Parses the document once and keeps every layer node, for callers that
/// visit all layers anyway.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerTree {
    layers: Vec<LayerNode>,
}

impl LayerTree {
    /// Parse the layer tree from a main document buffer
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_bytes_with_options(bytes, &ParseOptions::default())
    }

    /// Parse the layer tree with explicit options
    pub fn from_bytes_with_options(bytes: &[u8], options: &ParseOptions) -> Result<Self> {
        if bytes.is_empty() {
            return Err(Error::InvalidArguments("Main document buffer is empty".to_string()));
        }
        let document = XmlDocument::from_bytes(bytes)?;
        Self::from_xml(&document, options)
    }

    /// Build the layer tree from an already parsed main document
    pub fn from_xml(document: &XmlDocument, options: &ParseOptions) -> Result<Self> {
        let image = document
            .select_node(IMAGE_NODE)
            .ok_or_else(|| Error::NotFound("IMAGE node".to_string()))?;

        let mut layers = Vec::new();
        let mut counter = 0;
        let top_level = image.select_nodes(LAYER_NODES);
        let _ = walk_layers::<_, (), _>(&top_level, &mut counter, None, &mut |node, index, parent| {
            layers.push(LayerNode::from_node(node, index, parent, options));
            ControlFlow::Continue(())
        });

        debug!(layers = layers.len(), "reconstructed layer tree");
        Ok(Self { layers })
    }

    /// Number of layer nodes, groups included
    #[inline]
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Whether the document has no layers
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// All layers in flattened order
    #[inline]
    pub fn layers(&self) -> &[LayerNode] {
        &self.layers
    }

    /// Layer at a flattened index
    pub fn layer(&self, index: usize) -> Result<&LayerNode> {
        self.layers
            .get(index)
            .ok_or_else(|| Error::NotFound(format!("Layer {}", index)))
    }

    /// Direct children of a layer, in document order
    pub fn children(&self, index: usize) -> impl Iterator<Item = &LayerNode> {
        self.layers
            .iter()
            .skip(index + 1)
            .filter(move |layer| layer.parent_index == Some(index))
    }

    /// Top-level layers, in document order
    pub fn roots(&self) -> impl Iterator<Item = &LayerNode> {
        self.layers.iter().filter(|layer| layer.is_root())
    }
}
