//! Planar to interleaved pixel conversion.
//!
//! Decoded tiles hold one plane per channel (`BBBB...GGGG...RRRR...AAAA...`
//! for 8-bit BGRA). Compositing writes them into an interleaved canvas
//! (`BGRABGRA...`) at an arbitrary position.

use crate::common::{Error, Result};

/// Interleave planar `input` into `output` starting at byte `output_offset`.
///
/// `input` holds `input.len() / pixel_size` pixels arranged in rows of
/// `input_width`; each output row is `output_width` pixels wide. For every
/// pixel `(x, y)` and channel `c`:
///
/// ```text
/// output[offset + (y * output_width + x) * pixel_size + c] = input[c * pixel_count + y * input_width + x]
/// ```
///
/// Bytes of `output` outside the written rectangle are left untouched.
///
/// # Errors
///
/// [`Error::InvalidArguments`], with `output` unmodified, when `input` is
/// empty, `pixel_size` or `input_width` is zero, `output_width` is smaller
/// than `input_width`, fewer than `input.len()` bytes follow `output_offset`,
/// or the written rectangle would reach past the end of `output`.
///
/// # Examples
///
/// ```
/// use kra::delinearize;
///
/// // Two pixels with two channels: planes [a0 a1] [b0 b1]
/// let planar = [1, 2, 10, 20];
/// let mut interleaved = [0u8; 4];
/// delinearize(&planar, 2, &mut interleaved, 2, 0, 2)?;
/// assert_eq!(interleaved, [1, 10, 2, 20]);
/// # Ok::<(), kra::Error>(())
/// ```
pub fn delinearize(
    input: &[u8],
    input_width: usize,
    output: &mut [u8],
    output_width: usize,
    output_offset: usize,
    pixel_size: usize,
) -> Result<()> {
    if input.is_empty() {
        return Err(Error::InvalidArguments("Planar input is empty".to_string()));
    }
    if pixel_size == 0 || input_width == 0 {
        return Err(Error::InvalidArguments(format!(
            "Pixel size {} and input width {} must be non-zero",
            pixel_size, input_width
        )));
    }
    if output_width < input_width {
        return Err(Error::InvalidArguments(format!(
            "Output width {} is smaller than input width {}",
            output_width, input_width
        )));
    }
    if output_offset > output.len() || output.len() - output_offset < input.len() {
        return Err(Error::InvalidArguments(format!(
            "Output holds {} bytes after offset {}, input has {}",
            output.len().saturating_sub(output_offset),
            output_offset,
            input.len()
        )));
    }

    let pixel_count = input.len() / pixel_size;
    let rows = pixel_count / input_width;
    if rows == 0 {
        return Ok(());
    }

    let input_row_bytes = input_width * pixel_size;
    let output_row_bytes = output_width
        .checked_mul(pixel_size)
        .ok_or_else(|| Error::InvalidArguments("Output row size overflows".to_string()))?;
    let footprint_end = (rows - 1)
        .checked_mul(output_row_bytes)
        .and_then(|v| v.checked_add(output_offset))
        .and_then(|v| v.checked_add(input_row_bytes));
    match footprint_end {
        Some(end) if end <= output.len() => {},
        _ => {
            return Err(Error::InvalidArguments(format!(
                "{} rows of {} pixels at offset {} do not fit a {} byte output",
                rows,
                output_width,
                output_offset,
                output.len()
            )));
        },
    }

    for row in 0..rows {
        let row_start = output_offset + row * output_row_bytes;
        let output_row = &mut output[row_start..row_start + input_row_bytes];
        let plane_row = row * input_width;
        for (x, pixel) in output_row.chunks_exact_mut(pixel_size).enumerate() {
            for (channel, byte) in pixel.iter_mut().enumerate() {
                *byte = input[channel * pixel_count + plane_row + x];
            }
        }
    }

    Ok(())
}

/// [`delinearize`] addressing the destination by pixel position `(x, y)`.
///
/// The input rows must fit horizontally: `x + input_width <= output_width`.
pub fn delinearize_at(
    input: &[u8],
    input_width: usize,
    output: &mut [u8],
    output_width: usize,
    x: usize,
    y: usize,
    pixel_size: usize,
) -> Result<()> {
    if x.saturating_add(input_width) > output_width {
        return Err(Error::InvalidArguments(format!(
            "{} pixels at column {} exceed output width {}",
            input_width, x, output_width
        )));
    }
    let output_offset = y
        .checked_mul(output_width)
        .and_then(|v| v.checked_add(x))
        .and_then(|v| v.checked_mul(pixel_size))
        .ok_or_else(|| Error::InvalidArguments("Output offset overflows".to_string()))?;
    delinearize(input, input_width, output, output_width, output_offset, pixel_size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transpose_four_by_four() {
        let input: Vec<u8> = (0..16).collect();
        let mut output = [0u8; 16];
        delinearize(&input, 4, &mut output, 4, 0, 4).unwrap();
        assert_eq!(output, [0, 4, 8, 12, 1, 5, 9, 13, 2, 6, 10, 14, 3, 7, 11, 15]);
    }

    #[test]
    fn test_transpose_two_by_two_bgra() {
        let input: Vec<u8> = (0..16).collect();
        let mut output = [0u8; 16];
        delinearize(&input, 2, &mut output, 2, 0, 4).unwrap();
        assert_eq!(output, [0, 4, 8, 12, 1, 5, 9, 13, 2, 6, 10, 14, 3, 7, 11, 15]);
    }

    #[test]
    fn test_bgra_block_into_larger_canvas() {
        // 2x2 BGRA tile into a 4x4 canvas at (1, 1)
        let input: Vec<u8> = (0..16).collect();
        let mut output = [0u8; 64];
        delinearize_at(&input, 2, &mut output, 4, 1, 1, 4).unwrap();

        let mut expected = [0u8; 64];
        expected[20..28].copy_from_slice(&[0, 4, 8, 12, 1, 5, 9, 13]);
        expected[36..44].copy_from_slice(&[2, 6, 10, 14, 3, 7, 11, 15]);
        assert_eq!(output, expected);
    }

    #[test]
    fn test_offset_leaves_rest_untouched() {
        // 2x2 tile, one byte per pixel, into a 4x4 canvas at (1, 1)
        let input = [1u8, 2, 3, 4];
        let mut output = [0xEEu8; 16];
        delinearize_at(&input, 2, &mut output, 4, 1, 1, 1).unwrap();
        #[rustfmt::skip]
        let expected = [
            0xEE, 0xEE, 0xEE, 0xEE,
            0xEE, 1,    2,    0xEE,
            0xEE, 3,    4,    0xEE,
            0xEE, 0xEE, 0xEE, 0xEE,
        ];
        assert_eq!(output, expected);
    }

    #[test]
    fn test_multi_channel_at_offset() {
        // 2x1 tile with two channels into a 3x2 canvas at (1, 1)
        let planar = [1u8, 2, 10, 20];
        let mut output = [0u8; 12];
        delinearize_at(&planar, 2, &mut output, 3, 1, 1, 2).unwrap();
        assert_eq!(output, [0, 0, 0, 0, 0, 0, 0, 0, 1, 10, 2, 20]);
    }

    #[test]
    fn test_precondition_failures_leave_output_untouched() {
        let input = [1u8; 16];
        let mut output = [0u8; 16];
        let cases: [Result<()>; 6] = [
            delinearize(&[], 4, &mut output, 4, 0, 4),
            delinearize(&input, 4, &mut output, 4, 0, 0),
            delinearize(&input, 0, &mut output, 4, 0, 4),
            delinearize(&input, 4, &mut output, 3, 0, 4),
            delinearize(&input, 4, &mut output, 4, 1, 4),
            delinearize(&input, 4, &mut output, 4, 17, 4),
        ];
        for result in cases {
            assert!(matches!(result, Err(Error::InvalidArguments(_))));
        }
        assert_eq!(output, [0u8; 16]);
    }

    #[test]
    fn test_footprint_past_end_is_rejected() {
        // Enough bytes after the offset, but wider rows push the last one out
        let input = [7u8; 4];
        let mut output = [0u8; 8];
        assert!(matches!(
            delinearize(&input, 2, &mut output, 4, 3, 1),
            Err(Error::InvalidArguments(_))
        ));
        assert_eq!(output, [0u8; 8]);
    }

    #[test]
    fn test_position_past_right_edge() {
        let input = [1u8; 4];
        let mut output = [0u8; 16];
        assert!(delinearize_at(&input, 2, &mut output, 4, 3, 0, 1).is_err());
    }
}
