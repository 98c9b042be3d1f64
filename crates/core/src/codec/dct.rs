//! DCTDecode: baseline JPEG decompression via zune-jpeg.

use zune_jpeg::JpegDecoder;
use zune_jpeg::zune_core::options::DecoderOptions;

use crate::buffer::ByteCursor;
use crate::error::{PdfError, Result};

/// Decode an embedded baseline JPEG image.
///
/// The compressed stream is handed to the library decoder and the decoded
/// pixel samples come back as a tightly packed, interleaved byte buffer
/// (one byte per component, component count given by the decoder's output
/// color space). A failure to decode the embedded image is a hard parse
/// error carrying the compressed byte length for diagnostics.
pub fn dctdecode(input: &mut ByteCursor) -> Result<Vec<u8>> {
    let data = input.remaining_slice();
    let options = DecoderOptions::default()
        .set_max_width(u16::MAX as usize)
        .set_max_height(u16::MAX as usize);
    let mut decoder = JpegDecoder::new_with_options(std::io::Cursor::new(data), options);

    decoder.decode().map_err(|err| {
        PdfError::Parse(format!(
            "DCTDecode: cannot decode embedded image ({} compressed bytes): {err:?}",
            data.len()
        ))
    })
}
