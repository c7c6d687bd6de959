//! Krita archive constants: well-known entry names, XML paths and attribute names.

/// Name of the main document entry inside a `.kra` archive
pub const MAIN_DOC_FILE_NAME: &str = "maindoc.xml";

/// Name of the directory holding per-layer data, below the image name directory
pub const LAYERS_DIRECTORY_NAME: &str = "layers";

/// MIME type stored in the `mimetype` entry of Krita archives
pub const KRA_MIMETYPE: &str = "application/x-krita";

// ============================================================================
// MAIN DOCUMENT
// ============================================================================

pub(crate) const IMAGE_NODE: &str = "DOC/IMAGE";
pub(crate) const ANIMATION_NODE: &str = "animation";
pub(crate) const FRAME_RATE_NODE: &str = "framerate";
pub(crate) const RANGE_NODE: &str = "range";
pub(crate) const LAYER_NODES: &str = "layers/layer";

pub(crate) const VALUE_ATTRIBUTE: &str = "value";
pub(crate) const FROM_ATTRIBUTE: &str = "from";
pub(crate) const TO_ATTRIBUTE: &str = "to";
pub(crate) const NAME_ATTRIBUTE: &str = "name";
pub(crate) const COLOR_SPACE_NAME_ATTRIBUTE: &str = "colorspacename";
pub(crate) const WIDTH_ATTRIBUTE: &str = "width";
pub(crate) const HEIGHT_ATTRIBUTE: &str = "height";

// ============================================================================
// LAYERS
// ============================================================================

pub(crate) const NODE_TYPE_ATTRIBUTE: &str = "nodetype";
pub(crate) const FILE_NAME_ATTRIBUTE: &str = "filename";
pub(crate) const KEY_FRAMES_ATTRIBUTE: &str = "keyframes";
pub(crate) const OPACITY_ATTRIBUTE: &str = "opacity";
pub(crate) const VISIBLE_ATTRIBUTE: &str = "visible";

// ============================================================================
// KEY FRAMES
// ============================================================================

pub(crate) const KEY_FRAME_NODES: &str = "keyframes/channel/keyframe";
pub(crate) const OFFSET_NODE: &str = "offset";
pub(crate) const TIME_ATTRIBUTE: &str = "time";
pub(crate) const FRAME_ATTRIBUTE: &str = "frame";
pub(crate) const X_ATTRIBUTE: &str = "x";
pub(crate) const Y_ATTRIBUTE: &str = "y";
