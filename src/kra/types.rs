//! Classifiers for layer node types and color space models.

use phf::{Map, phf_map};
use serde::{Deserialize, Serialize};

/// Color space model family of an image.
///
/// Only RGBA is composited by typical consumers; the others are recognized so
/// callers can report what they are skipping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ColorSpaceModel {
    /// No known family token in the color space name
    #[default]
    Unknown,
    /// CIE L*a*b* with alpha
    Cielab,
    /// Cyan, magenta, yellow, key with alpha
    Cmyk,
    /// Grayscale with alpha
    GrayAlpha,
    /// Red, green, blue with alpha
    Rgba,
    /// CIE XYZ with alpha
    Xyza,
    /// Luma and chroma with alpha
    YCbCr,
}

/// Family tokens in priority order. Krita color space ids embed the bit depth
/// (`RGBA`, `RGBAF32`, `YCBCRAU16`), so matching is by substring.
const COLOR_SPACE_TOKENS: [(&str, ColorSpaceModel); 6] = [
    ("LABA", ColorSpaceModel::Cielab),
    ("CMYK", ColorSpaceModel::Cmyk),
    ("GRAYA", ColorSpaceModel::GrayAlpha),
    ("RGBA", ColorSpaceModel::Rgba),
    ("XYZA", ColorSpaceModel::Xyza),
    ("YCBCRA", ColorSpaceModel::YCbCr),
];

impl ColorSpaceModel {
    /// Classify a `colorspacename` attribute value.
    ///
    /// # Examples
    ///
    /// ```
    /// use kra::ColorSpaceModel;
    ///
    /// assert_eq!(ColorSpaceModel::from_color_space_name("RGBA"), ColorSpaceModel::Rgba);
    /// assert_eq!(ColorSpaceModel::from_color_space_name("YCBCRAU16"), ColorSpaceModel::YCbCr);
    /// assert_eq!(ColorSpaceModel::from_color_space_name("invalid"), ColorSpaceModel::Unknown);
    /// ```
    pub fn from_color_space_name(name: &str) -> Self {
        COLOR_SPACE_TOKENS
            .iter()
            .find(|(token, _)| name.contains(token))
            .map(|(_, model)| *model)
            .unwrap_or_default()
    }
}

/// Type of a node in the layer tree.
///
/// Only [`LayerType::Group`] and [`LayerType::Paint`] carry data this crate
/// decodes further; the rest are recognized but unsupported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LayerType {
    /// Unrecognized `nodetype`
    #[default]
    Unknown,
    /// Container of other layers
    Group,
    /// Raster paint layer backed by a tile container
    Paint,
    /// Layer mirroring another layer
    Clone,
    /// Layer linking an external file
    File,
    /// Colorize mask for line art
    ColorizeMask,
    /// Geometric transform mask
    TransformMask,
    /// Opacity mask of the parent layer
    TransparencyMask,
}

static LAYER_TYPES: Map<&'static str, LayerType> = phf_map! {
    "grouplayer" => LayerType::Group,
    "paintlayer" => LayerType::Paint,
    "clonelayer" => LayerType::Clone,
    "cloneLayer" => LayerType::Clone,
    "filelayer" => LayerType::File,
    "colorizemask" => LayerType::ColorizeMask,
    "transformmask" => LayerType::TransformMask,
    "transparencymask" => LayerType::TransparencyMask,
};

impl LayerType {
    /// Classify a `nodetype` attribute value by exact match.
    pub fn from_node_type(node_type: &str) -> Self {
        LAYER_TYPES.get(node_type).copied().unwrap_or_default()
    }

    /// Whether the layer can contain child layers
    #[inline]
    pub fn is_group(self) -> bool {
        self == LayerType::Group
    }
}

/// Visibility of a layer in the composition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Visibility {
    /// Not displayed
    #[default]
    Hidden,
    /// Contributes to the composition
    Visible,
}

impl Visibility {
    /// Interpret the integer `visible` attribute; any non-zero value is visible.
    #[inline]
    pub fn from_flag(flag: i32) -> Self {
        if flag != 0 {
            Visibility::Visible
        } else {
            Visibility::Hidden
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_space_priority() {
        assert_eq!(ColorSpaceModel::from_color_space_name("LABAU16"), ColorSpaceModel::Cielab);
        assert_eq!(ColorSpaceModel::from_color_space_name("CMYKA"), ColorSpaceModel::Cmyk);
        assert_eq!(ColorSpaceModel::from_color_space_name("GRAYAU8"), ColorSpaceModel::GrayAlpha);
        assert_eq!(ColorSpaceModel::from_color_space_name("RGBAF32"), ColorSpaceModel::Rgba);
        assert_eq!(ColorSpaceModel::from_color_space_name("XYZAF16"), ColorSpaceModel::Xyza);
        // Earlier tokens win when several are present
        assert_eq!(ColorSpaceModel::from_color_space_name("CMYK/RGBA"), ColorSpaceModel::Cmyk);
        assert_eq!(ColorSpaceModel::from_color_space_name(""), ColorSpaceModel::Unknown);
        assert_eq!(ColorSpaceModel::from_color_space_name("rgba"), ColorSpaceModel::Unknown);
    }

    #[test]
    fn test_layer_type_exact_match() {
        assert_eq!(LayerType::from_node_type("grouplayer"), LayerType::Group);
        assert_eq!(LayerType::from_node_type("paintlayer"), LayerType::Paint);
        assert_eq!(LayerType::from_node_type("clonelayer"), LayerType::Clone);
        assert_eq!(LayerType::from_node_type("cloneLayer"), LayerType::Clone);
        assert_eq!(LayerType::from_node_type("filelayer"), LayerType::File);
        assert_eq!(LayerType::from_node_type("colorizemask"), LayerType::ColorizeMask);
        assert_eq!(LayerType::from_node_type("transformmask"), LayerType::TransformMask);
        assert_eq!(LayerType::from_node_type("transparencymask"), LayerType::TransparencyMask);
        assert_eq!(LayerType::from_node_type("PaintLayer"), LayerType::Unknown);
        assert_eq!(LayerType::from_node_type("paintlayer "), LayerType::Unknown);
        assert_eq!(LayerType::from_node_type("adjustmentlayer"), LayerType::Unknown);
    }

    #[test]
    fn test_visibility_flag() {
        assert_eq!(Visibility::from_flag(0), Visibility::Hidden);
        assert_eq!(Visibility::from_flag(1), Visibility::Visible);
        assert_eq!(Visibility::from_flag(-1), Visibility::Visible);
    }
}
