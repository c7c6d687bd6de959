//! Main document metadata.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::config::ParseOptions;
use super::constants::{
    ANIMATION_NODE, COLOR_SPACE_NAME_ATTRIBUTE, FRAME_RATE_NODE, FROM_ATTRIBUTE,
    HEIGHT_ATTRIBUTE, IMAGE_NODE, NAME_ATTRIBUTE, RANGE_NODE, TO_ATTRIBUTE, VALUE_ATTRIBUTE,
    WIDTH_ATTRIBUTE,
};
use super::layer::count_layers;
use super::types::ColorSpaceModel;
use crate::common::xml::{XmlDocument, XmlNode};
use crate::common::{Error, Result};

/// Animation settings of an image. All zero for still images.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Animation {
    /// Frames per second
    pub frame_rate: u32,
    /// First frame of the playback range
    pub range_from: u32,
    /// Last frame of the playback range
    pub range_to: u32,
}

impl Animation {
    fn from_node<N: XmlNode>(node: &N) -> Self {
        let frame_rate = node
            .child(FRAME_RATE_NODE)
            .map(|n| n.attribute_u32(VALUE_ATTRIBUTE))
            .unwrap_or(0);
        let (range_from, range_to) = node
            .child(RANGE_NODE)
            .map(|n| (n.attribute_u32(FROM_ATTRIBUTE), n.attribute_u32(TO_ATTRIBUTE)))
            .unwrap_or((0, 0));
        Self {
            frame_rate,
            range_from,
            range_to,
        }
    }

    /// Number of frames in the playback range, 0 for still images
    pub fn frame_count(&self) -> u32 {
        if self.frame_rate == 0 || self.range_to < self.range_from {
            return 0;
        }
        self.range_to - self.range_from + 1
    }
}

/// Image-level metadata read from `maindoc.xml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MainDocument {
    /// Image name; also the archive directory holding layer data
    pub image_name: String,
    /// Color space family of the image
    pub color_space_model: ColorSpaceModel,
    /// Canvas width in pixels
    pub width: u32,
    /// Canvas height in pixels
    pub height: u32,
    /// Number of layer nodes in the tree, groups included
    pub layers_count: usize,
    /// Animation settings
    pub animation: Animation,
}

impl MainDocument {
    /// Parse the main document from a buffer.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidArguments`] for an empty buffer
    /// - [`Error::ParseError`] for malformed XML
    /// - [`Error::NotFound`] when there is no `DOC/IMAGE` node
    ///
    /// # Examples
    ///
    /// ```
    /// use kra::{ColorSpaceModel, MainDocument};
    ///
    /// let xml = br#"<DOC><IMAGE name="Example" colorspacename="RGBA" width="256" height="128"/></DOC>"#;
    /// let document = MainDocument::from_bytes(xml)?;
    /// assert_eq!(document.image_name, "Example");
    /// assert_eq!(document.color_space_model, ColorSpaceModel::Rgba);
    /// assert_eq!((document.width, document.height), (256, 128));
    /// assert_eq!(document.layers_count, 0);
    /// # Ok::<(), kra::Error>(())
    /// ```
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_bytes_with_options(bytes, &ParseOptions::default())
    }

    /// Parse the main document with explicit options
    pub fn from_bytes_with_options(bytes: &[u8], options: &ParseOptions) -> Result<Self> {
        if bytes.is_empty() {
            return Err(Error::InvalidArguments("Main document buffer is empty".to_string()));
        }
        let document = XmlDocument::from_bytes(bytes)?;
        Self::from_xml(&document, options)
    }

    /// Read metadata from an already parsed main document
    pub fn from_xml(document: &XmlDocument, options: &ParseOptions) -> Result<Self> {
        let image = document
            .select_node(IMAGE_NODE)
            .ok_or_else(|| Error::NotFound("IMAGE node".to_string()))?;

        let main_document = Self {
            image_name: options.limit(image.attribute_str(NAME_ATTRIBUTE)),
            color_space_model: ColorSpaceModel::from_color_space_name(
                image.attribute_str(COLOR_SPACE_NAME_ATTRIBUTE),
            ),
            width: image.attribute_u32(WIDTH_ATTRIBUTE),
            height: image.attribute_u32(HEIGHT_ATTRIBUTE),
            layers_count: count_layers(image),
            animation: image
                .child(ANIMATION_NODE)
                .map(Animation::from_node)
                .unwrap_or_default(),
        };

        debug!(
            image = %main_document.image_name,
            width = main_document.width,
            height = main_document.height,
            layers = main_document.layers_count,
            color_space = ?main_document.color_space_model,
            "parsed main document"
        );
        Ok(main_document)
    }

    /// Whether the image has an animation timeline
    #[inline]
    pub fn is_animated(&self) -> bool {
        self.animation.frame_rate != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INVALID_MAIN_DOC_XML: &str = r#"
	<?xml version="1.0" encoding="UTF-8"?
	<!DOCTYPE DOC PUBLIC '-//KDE//DTD krita 2.0//EN' 'http://www.calligra.org/DTD/krita-2.0.dtd'
	<DOC xmlns="http://www.calligra.org/DTD/krita" kritaVersion="5.0.0" syntaxVersion="2.0" editor="Krita"
	</DOC>
	"#;

    const NO_IMAGE_MAIN_DOC_XML: &str = r#"
	<?xml version="1.0" encoding="UTF-8"?>
	<!DOCTYPE DOC PUBLIC '-//KDE//DTD krita 2.0//EN' 'http://www.calligra.org/DTD/krita-2.0.dtd'>
	<DOC xmlns="http://www.calligra.org/DTD/krita" kritaVersion="5.0.0" syntaxVersion="2.0" editor="Krita">
	</DOC>
	"#;

    const EMPTY_IMAGE_MAIN_DOC_XML: &str = r#"
	<?xml version="1.0" encoding="UTF-8"?>
	<!DOCTYPE DOC PUBLIC '-//KDE//DTD krita 2.0//EN' 'http://www.calligra.org/DTD/krita-2.0.dtd'>
	<DOC xmlns="http://www.calligra.org/DTD/krita" kritaVersion="5.0.0" syntaxVersion="2.0" editor="Krita">
	 <IMAGE name="Example" colorspacename="RGBA" y-res="100" proofing-model="CMYKA" x-res="100" proofing-intent="3" mime="application/x-kra" width="256" proofing-depth="U8" description="" proofing-profile-name="Chemical proof" proofing-adaptation-state="1" height="128" profile="sRGB IEC61966-2.1">
	 </IMAGE>
	</DOC>
	"#;

    const ONE_LAYER_MAIN_DOC_XML: &str = r#"
	<?xml version="1.0" encoding="UTF-8"?>
	<!DOCTYPE DOC PUBLIC '-//KDE//DTD krita 2.0//EN' 'http://www.calligra.org/DTD/krita-2.0.dtd'>
	<DOC xmlns="http://www.calligra.org/DTD/krita" kritaVersion="5.0.0" syntaxVersion="2.0" editor="Krita">
	 <IMAGE name="Example" colorspacename="YCBCRAU16" width="128" height="128" profile="ITU-R BT.709-6 YCbCr ICC V4 profile">
	  <layers>
	   <layer name="layer_1" colorspacename="YCBCRAU16" x="0" nodetype="paintlayer" y="0" visible="1" opacity="255" filename="layer1"/>
	  </layers>
	 </IMAGE>
	</DOC>
	"#;

    const ANIMATED_MAIN_DOC_XML: &str = r#"
	<DOC xmlns="http://www.calligra.org/DTD/krita">
	 <IMAGE name="Walk cycle" colorspacename="invalid" width="64" height="32">
	  <layers>
	   <layer name="group" nodetype="grouplayer" filename="layer1">
	    <layers>
	     <layer name="body" nodetype="paintlayer" filename="layer2" keyframes="layer2.keyframes.xml"/>
	     <layer name="shadow" nodetype="paintlayer" filename="layer3"/>
	    </layers>
	   </layer>
	  </layers>
	  <animation>
	   <framerate type="value" value="24"/>
	   <range from="0" to="23" type="timerange"/>
	   <currentTime type="value" value="0"/>
	  </animation>
	 </IMAGE>
	</DOC>
	"#;

    #[test]
    fn test_empty_buffer() {
        assert!(matches!(
            MainDocument::from_bytes(b""),
            Err(Error::InvalidArguments(_))
        ));
    }

    #[test]
    fn test_invalid_xml() {
        assert!(matches!(
            MainDocument::from_bytes(INVALID_MAIN_DOC_XML.as_bytes()),
            Err(Error::ParseError(_))
        ));
    }

    #[test]
    fn test_missing_image_node() {
        assert!(matches!(
            MainDocument::from_bytes(NO_IMAGE_MAIN_DOC_XML.as_bytes()),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_image_without_layers() {
        let document = MainDocument::from_bytes(EMPTY_IMAGE_MAIN_DOC_XML.as_bytes()).unwrap();
        assert_eq!(document.width, 256);
        assert_eq!(document.height, 128);
        assert_eq!(document.image_name, "Example");
        assert_eq!(document.color_space_model, ColorSpaceModel::Rgba);
        assert_eq!(document.layers_count, 0);
        assert_eq!(document.animation, Animation::default());
        assert!(!document.is_animated());
    }

    #[test]
    fn test_single_layer() {
        let document = MainDocument::from_bytes(ONE_LAYER_MAIN_DOC_XML.as_bytes()).unwrap();
        assert_eq!(document.width, 128);
        assert_eq!(document.color_space_model, ColorSpaceModel::YCbCr);
        assert_eq!(document.layers_count, 1);
    }

    #[test]
    fn test_unknown_color_space_and_animation() {
        let document = MainDocument::from_bytes(ANIMATED_MAIN_DOC_XML.as_bytes()).unwrap();
        assert_eq!(document.image_name, "Walk cycle");
        assert_eq!(document.color_space_model, ColorSpaceModel::Unknown);
        // Group counts itself plus its two children
        assert_eq!(document.layers_count, 3);
        assert_eq!(
            document.animation,
            Animation {
                frame_rate: 24,
                range_from: 0,
                range_to: 23,
            }
        );
        assert_eq!(document.animation.frame_count(), 24);
        assert!(document.is_animated());
    }

    #[test]
    fn test_shared_parse_with_layer_tree() {
        use crate::kra::layer::LayerTree;

        let xml = XmlDocument::from_bytes(ANIMATED_MAIN_DOC_XML.as_bytes()).unwrap();
        let options = ParseOptions::default();
        let document = MainDocument::from_xml(&xml, &options).unwrap();
        let tree = LayerTree::from_xml(&xml, &options).unwrap();
        assert_eq!(document.layers_count, tree.len());
    }

    #[test]
    fn test_long_image_name_is_truncated() {
        let xml = format!(r#"<DOC><IMAGE name="{}"/></DOC>"#, "é".repeat(200));
        let document = MainDocument::from_bytes(xml.as_bytes()).unwrap();
        assert_eq!(document.image_name.len(), 254);
        assert!(document.image_name.chars().all(|c| c == 'é'));
    }
}
