//! LZW stream decoder using the weezl crate.

use weezl::{BitOrder, decode::Decoder};

use crate::buffer::ByteCursor;
use crate::error::Result;
use crate::predictor::{PredictorParams, unpredict};

/// Decode LZW-encoded data (PDF variant: MSB-first packed codes, 8-bit
/// symbols, early code-width change by default), then reverse any
/// declared predictor.
///
/// `EarlyChange=1` is the PDF default; `EarlyChange=0` selects TIFF-style
/// code-width switching. Corrupt trailing data is tolerated: decoding is
/// lenient and returns the output produced so far.
pub fn lzwdecode(input: &mut ByteCursor, params: &PredictorParams) -> Result<Vec<u8>> {
    let mut decoder = if params.early_change == 0 {
        Decoder::with_tiff_size_switch(BitOrder::Msb, 8)
    } else {
        Decoder::new(BitOrder::Msb, 8)
    };
    let mut output = Vec::new();
    let _ = decoder.into_vec(&mut output).decode(input.remaining_slice());
    unpredict(output, params)
}
