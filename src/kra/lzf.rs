//! LZF block decompression.
//!
//! Krita compresses tile payloads with LZF (liblzf). The stream is a
//! sequence of control bytes:
//!
//! - `ctrl < 32`: a literal run of `ctrl + 1` bytes follows.
//! - otherwise: a back reference. The top three bits hold `length - 2`,
//!   with `7` meaning an extra length byte follows. The low five bits and the
//!   next byte form the distance minus one.
//!
//! Back references may overlap the bytes they produce, which is how runs of a
//! repeated byte are encoded.

use crate::common::{Error, Result};

/// Control bytes below this value start a literal run
const LITERAL_LIMIT: usize = 1 << 5;

/// Length field value signalling an extra length byte
const EXTENDED_LENGTH: usize = 7;

/// Decompress an LZF block into `output`, returning the number of bytes written.
///
/// # Errors
///
/// Returns [`Error::DecompressError`] when the block is truncated, a back
/// reference points before the start of the output, or the decompressed data
/// does not fit into `output`.
///
/// # Examples
///
/// ```
/// use kra::lzf::decompress_into;
///
/// let block = [0x02, b'a', b'b', b'c', 0x80, 0x02];
/// let mut output = [0u8; 16];
/// let written = decompress_into(&block, &mut output)?;
/// assert_eq!(&output[..written], b"abcabcabc");
/// # Ok::<(), kra::Error>(())
/// ```
pub fn decompress_into(input: &[u8], output: &mut [u8]) -> Result<usize> {
    let mut ip = 0usize;
    let mut op = 0usize;

    while ip < input.len() {
        let ctrl = input[ip] as usize;
        ip += 1;

        if ctrl < LITERAL_LIMIT {
            let run = ctrl + 1;
            if ip + run > input.len() {
                return Err(truncated(ip));
            }
            if op + run > output.len() {
                return Err(overflow(output.len()));
            }
            output[op..op + run].copy_from_slice(&input[ip..ip + run]);
            ip += run;
            op += run;
            continue;
        }

        let mut length = ctrl >> 5;
        if length == EXTENDED_LENGTH {
            let extra = *input.get(ip).ok_or_else(|| truncated(ip))?;
            length += extra as usize;
            ip += 1;
        }
        let low = *input.get(ip).ok_or_else(|| truncated(ip))?;
        ip += 1;

        let distance = ((ctrl & 0x1f) << 8) + low as usize + 1;
        let length = length + 2;
        if distance > op {
            return Err(Error::DecompressError(format!(
                "LZF back reference {} bytes before output start at offset {}",
                distance - op,
                op
            )));
        }
        if op + length > output.len() {
            return Err(overflow(output.len()));
        }

        let start = op - distance;
        if distance >= length {
            output.copy_within(start..start + length, op);
        } else {
            // Overlapping reference repeats the bytes being produced
            for i in 0..length {
                output[op + i] = output[start + i];
            }
        }
        op += length;
    }

    Ok(op)
}

#[inline]
fn truncated(offset: usize) -> Error {
    Error::DecompressError(format!("LZF block truncated at offset {}", offset))
}

#[inline]
fn overflow(capacity: usize) -> Error {
    Error::DecompressError(format!(
        "LZF block expands beyond the {} byte output buffer",
        capacity
    ))
}

/// Encode bytes as LZF literal runs only; enough to build test payloads.
#[cfg(test)]
pub(crate) fn encode_literals(data: &[u8]) -> Vec<u8> {
    let mut encoded = Vec::with_capacity(data.len() + data.len() / LITERAL_LIMIT + 1);
    for chunk in data.chunks(LITERAL_LIMIT) {
        encoded.push((chunk.len() - 1) as u8);
        encoded.extend_from_slice(chunk);
    }
    encoded
}
