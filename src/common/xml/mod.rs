//! Minimal XML document model used by the Krita document parsers.
//!
//! `maindoc.xml` and the per-layer keyframe documents are small, so they are
//! parsed once into an owned [`Element`] tree. Parsers only rely on the
//! [`XmlNode`] capabilities (attribute access and child selection by path).

mod element;
mod escape;

pub use element::{Element, XmlDocument, XmlNode};
pub use escape::unescape_xml;
