/// Configuration types for decoding Krita documents and tile containers.
///
/// The defaults match what Krita 4 and 5 write. Options only need adjusting
/// when reading archives produced by tools that disagree on the tile flag
/// byte, or when callers need names longer than the conventional limit.
///
/// # Examples
///
/// ```rust
/// use kra::{FlagPolarity, ParseOptions};
///
/// // Create with defaults
/// let options = ParseOptions::default();
/// assert_eq!(options.max_string_length, 254);
///
/// // Or customize
/// let options = ParseOptions::new()
///     .with_max_string_length(1024)
///     .with_compression_polarity(FlagPolarity::LzfZeroRawOne);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Longest name, in bytes, kept from string attributes
    pub max_string_length: usize,
    /// Meaning of the flag byte leading each tile payload
    pub compression_polarity: FlagPolarity,
}

/// Conventional string limit: 255-byte fields including a terminator.
pub const DEFAULT_MAX_STRING_LENGTH: usize = 254;

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            max_string_length: DEFAULT_MAX_STRING_LENGTH,
            compression_polarity: FlagPolarity::default(),
        }
    }
}

impl ParseOptions {
    /// Create a new `ParseOptions` with default values.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the longest string, in bytes, kept from names and file references.
    ///
    /// Longer values are truncated at the last character boundary that fits.
    #[inline]
    pub fn with_max_string_length(mut self, length: usize) -> Self {
        self.max_string_length = length;
        self
    }

    /// Set the tile flag byte polarity.
    #[inline]
    pub fn with_compression_polarity(mut self, polarity: FlagPolarity) -> Self {
        self.compression_polarity = polarity;
        self
    }

    /// Apply the string length policy to an attribute value.
    pub(crate) fn limit(&self, value: &str) -> String {
        if value.len() <= self.max_string_length {
            return value.to_string();
        }
        let mut end = self.max_string_length;
        while !value.is_char_boundary(end) {
            end -= 1;
        }
        value[..end].to_string()
    }
}

/// Assignment of the tile payload flag byte to stored and LZF payloads.
///
/// Krita's tile writer uses `0` for stored and `1` for LZF data. The swapped
/// assignment appears in some third-party writers and is treated as a
/// different format revision rather than guessed at per tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlagPolarity {
    /// `0` = stored raw, `1` = LZF compressed
    #[default]
    RawZeroLzfOne,
    /// `0` = LZF compressed, `1` = stored raw
    LzfZeroRawOne,
}

impl FlagPolarity {
    /// Flag byte marking a stored payload
    #[inline]
    pub fn raw_flag(self) -> u8 {
        match self {
            FlagPolarity::RawZeroLzfOne => 0,
            FlagPolarity::LzfZeroRawOne => 1,
        }
    }

    /// Flag byte marking an LZF payload
    #[inline]
    pub fn lzf_flag(self) -> u8 {
        1 - self.raw_flag()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_keeps_short_values() {
        let options = ParseOptions::default();
        assert_eq!(options.limit("layer_1"), "layer_1");
        assert_eq!(options.limit(&"a".repeat(254)).len(), 254);
    }

    #[test]
    fn test_limit_truncates_on_char_boundary() {
        let options = ParseOptions::new().with_max_string_length(4);
        assert_eq!(options.limit("abcdef"), "abcd");
        // 'é' is two bytes; byte 4 falls inside the second one
        assert_eq!(options.limit("abcéé"), "abc");
    }

    #[test]
    fn test_polarity_flags() {
        assert_eq!(FlagPolarity::RawZeroLzfOne.raw_flag(), 0);
        assert_eq!(FlagPolarity::RawZeroLzfOne.lzf_flag(), 1);
        assert_eq!(FlagPolarity::LzfZeroRawOne.raw_flag(), 1);
        assert_eq!(FlagPolarity::LzfZeroRawOne.lzf_flag(), 0);
    }
}
