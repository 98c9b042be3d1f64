//! ASCII85 and ASCIIHex stream decoders.

use crate::buffer::ByteCursor;
use crate::error::{PdfError, Result};

const fn is_pdf_whitespace(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\n' | b'\r' | b'\x0c' | b'\x00')
}

/// Decode ASCII85-encoded data (PDF variant).
///
/// Handles the `z` all-zero shorthand, `<~` / `~>` markers, embedded
/// whitespace and a missing end marker (end of input terminates the
/// stream). A final short group of n characters yields n-1 bytes, the
/// group being padded with `u` digits before conversion.
pub fn ascii85decode(input: &mut ByteCursor) -> Result<Vec<u8>> {
    let mut result = Vec::with_capacity(input.remaining() * 4 / 5);
    let mut group = [0u8; 5];
    let mut fill = 0usize;

    // Strip the optional <~ prefix.
    input.mark();
    if input.remaining() >= 2 && input.get_u8()? == b'<' && input.get_at(input.position())? == b'~'
    {
        input.set_position(input.position() + 1)?;
    } else {
        input.reset()?;
    }

    while input.has_remaining() {
        let byte = input.get_u8()?;
        match byte {
            b'~' => break,
            b'z' if fill == 0 => result.extend_from_slice(&[0, 0, 0, 0]),
            b'!'..=b'u' => {
                group[fill] = byte - b'!';
                fill += 1;
                if fill == 5 {
                    result.extend_from_slice(&group_value(&group, 5)?.to_be_bytes());
                    fill = 0;
                }
            }
            b if is_pdf_whitespace(b) => {}
            b => {
                return Err(PdfError::Parse(format!(
                    "ASCII85: invalid character {b:#04x} at position {}",
                    input.position() - 1
                )));
            }
        }
    }

    // Short final group: pad with max digits, emit n-1 bytes.
    if fill > 0 {
        let bytes = group_value(&group, fill)?.to_be_bytes();
        result.extend_from_slice(&bytes[..fill.saturating_sub(1)]);
    }

    Ok(result)
}

/// Convert a 5-digit base-85 group to its 32-bit value, padding a short
/// group with max digits. A value past 2^32-1 means an illegal group.
fn group_value(group: &[u8; 5], fill: usize) -> Result<u32> {
    let mut value: u64 = 0;
    for i in 0..5 {
        let digit = if i < fill { group[i] } else { 84 };
        value = value * 85 + digit as u64;
    }
    u32::try_from(value).map_err(|_| PdfError::Parse("ASCII85: group value overflow".to_string()))
}

/// Decode ASCIIHex-encoded data.
///
/// Consumes hex-digit pairs, skipping whitespace, until the `>` terminator.
/// An odd trailing digit is a high nibble with an implied zero low nibble.
/// Any other character, or end of input before the terminator, is a hard
/// parse error.
pub fn asciihexdecode(input: &mut ByteCursor) -> Result<Vec<u8>> {
    let mut result = Vec::with_capacity(input.remaining() / 2);
    let mut pending: Option<u8> = None;
    let mut terminated = false;

    while input.has_remaining() {
        let byte = input.get_u8()?;
        if byte == b'>' {
            terminated = true;
            break;
        }
        if is_pdf_whitespace(byte) {
            continue;
        }
        let nibble = hex_nibble(byte).ok_or_else(|| {
            PdfError::Parse(format!(
                "ASCIIHex: invalid character {byte:#04x} at position {}",
                input.position() - 1
            ))
        })?;
        if let Some(high) = pending.take() {
            result.push((high << 4) | nibble);
        } else {
            pending = Some(nibble);
        }
    }

    if !terminated {
        return Err(PdfError::Parse(
            "ASCIIHex: missing > terminator".to_string(),
        ));
    }

    if let Some(high) = pending {
        result.push(high << 4);
    }

    Ok(result)
}

const fn hex_nibble(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}
