//! Archive paths of per-layer entries.

use super::constants::LAYERS_DIRECTORY_NAME;
use crate::common::{Error, Result};

/// Archive path of a layer entry: `{image_name}/layers/{file_name}`.
///
/// # Examples
///
/// ```
/// use kra::layer_file_path;
///
/// assert_eq!(layer_file_path("Example", "layer2"), "Example/layers/layer2");
/// assert_eq!(
///     layer_file_path("Example", "layer2.keyframes.xml"),
///     "Example/layers/layer2.keyframes.xml"
/// );
/// ```
pub fn layer_file_path(image_name: &str, file_name: &str) -> String {
    let mut path =
        String::with_capacity(image_name.len() + LAYERS_DIRECTORY_NAME.len() + file_name.len() + 2);
    path.push_str(image_name);
    path.push('/');
    path.push_str(LAYERS_DIRECTORY_NAME);
    path.push('/');
    path.push_str(file_name);
    path
}

/// Write the layer entry path into a caller buffer, returning its byte length.
///
/// Nothing is written when the buffer cannot hold the whole path.
pub fn write_layer_file_path(buffer: &mut [u8], image_name: &str, file_name: &str) -> Result<usize> {
    let path = layer_file_path(image_name, file_name);
    let length = path.len();
    if buffer.len() < length {
        return Err(Error::InvalidArguments(format!(
            "Path buffer holds {} bytes, {} needed",
            buffer.len(),
            length
        )));
    }
    buffer[..length].copy_from_slice(path.as_bytes());
    Ok(length)
}
