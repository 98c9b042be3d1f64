//! FlateDecode (zlib/deflate) stream decoder.

use flate2::{Decompress, FlushDecompress, Status};
use log::warn;

use crate::buffer::ByteCursor;
use crate::error::{PdfError, Result};
use crate::predictor::{PredictorParams, unpredict};

/// Decode zlib-compressed data, then reverse any declared predictor.
///
/// All available input is fed to the inflater and output is drained
/// incrementally. An inflater that needs more input it cannot get yields
/// an EMPTY buffer instead of an error; truncated streams are common in
/// real-world documents and callers prefer no output over a hard failure.
/// That leniency is specific to this codec. Malformed deflate data is
/// still a parse error.
pub fn flatedecode(input: &mut ByteCursor, params: &PredictorParams) -> Result<Vec<u8>> {
    let inflated = inflate_all(input.remaining_slice())?;
    unpredict(inflated, params)
}

fn inflate_all(data: &[u8]) -> Result<Vec<u8>> {
    let mut inflater = Decompress::new(true);
    let mut out = Vec::with_capacity(data.len().saturating_mul(4));
    let mut buf = [0u8; 16384];

    loop {
        let consumed = inflater.total_in() as usize;
        let before_out = inflater.total_out();
        let status = inflater.decompress(&data[consumed..], &mut buf, FlushDecompress::None);
        let produced = (inflater.total_out() - before_out) as usize;
        if produced > 0 {
            out.extend_from_slice(&buf[..produced]);
        }

        match status {
            Ok(Status::StreamEnd) => return Ok(out),
            Ok(Status::Ok) => {
                if produced == 0 && inflater.total_in() as usize == consumed {
                    // No progress possible with the input we have.
                    warn!("FlateDecode: truncated stream, returning empty output");
                    return Ok(Vec::new());
                }
            }
            Ok(Status::BufError) => {
                if produced == 0 {
                    warn!("FlateDecode: inflater starved of input, returning empty output");
                    return Ok(Vec::new());
                }
                // Output buffer was full; drain and continue.
            }
            Err(err) => return Err(PdfError::Parse(format!("FlateDecode: {err}"))),
        }
    }
}
