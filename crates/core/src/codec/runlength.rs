//! RunLength stream decoder.

use crate::buffer::ByteCursor;
use crate::error::Result;

/// Decode RunLength-encoded data.
///
/// Format (length byte read as unsigned):
/// - 0-127: copy the next (length + 1) bytes literally
/// - 128: end of data (EOD marker)
/// - 129-255: repeat the next byte (257 - length) times
///
/// Termination is driven by both the 128 sentinel and input exhaustion:
/// a truncated stream (not enough bytes for a literal run, or a missing
/// repeat byte) stops gracefully without error.
pub fn rldecode(input: &mut ByteCursor) -> Result<Vec<u8>> {
    let mut result = Vec::new();

    while input.has_remaining() {
        let length = input.get_u8()?;

        match length {
            128 => break, // EOD
            0..=127 => {
                let count = length as usize + 1;
                if input.remaining() >= count {
                    result.extend_from_slice(input.get_bytes(count)?);
                } else {
                    break;
                }
            }
            129..=255 => {
                if input.has_remaining() {
                    let count = 257 - length as usize;
                    let byte = input.get_u8()?;
                    result.extend(std::iter::repeat_n(byte, count));
                } else {
                    break;
                }
            }
        }
    }

    Ok(result)
}
