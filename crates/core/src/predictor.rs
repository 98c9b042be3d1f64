//! Predictor reversal for Flate- and LZW-compressed sample data.
//!
//! A predictor is a reversible per-sample or per-scanline differencing
//! transform applied before general compression; this module undoes it
//! after decompression. Predictor 2 is TIFF horizontal differencing,
//! values >= 10 are the PNG filter family (each scanline prefixed with a
//! filter-type byte). Reconstruction is strictly sequential: every row
//! depends on the already-reconstructed previous row.

use log::warn;

use crate::error::{PdfError, Result};
use crate::model::Dict;

/// Sample geometry and predictor selection, parsed from a filter's
/// parameter dictionary.
#[derive(Debug, Clone)]
pub struct PredictorParams {
    pub predictor: i64,
    pub colors: usize,
    pub bits_per_component: usize,
    pub columns: usize,
    pub early_change: i64,
}

impl Default for PredictorParams {
    fn default() -> Self {
        Self {
            predictor: 1,
            colors: 1,
            bits_per_component: 8,
            columns: 1,
            early_change: 1,
        }
    }
}

impl PredictorParams {
    /// Read `Predictor`, `Colors`, `BitsPerComponent`, `Columns` and
    /// `EarlyChange` from a parameter dictionary; missing keys take the
    /// defaults above.
    pub fn from_dict(dict: Option<&Dict>) -> Self {
        let get = |key: &str, default: i64| {
            dict.and_then(|d| d.get(key))
                .and_then(|obj| obj.as_int().ok())
                .unwrap_or(default)
        };
        Self {
            predictor: get("Predictor", 1),
            colors: get("Colors", 1).max(1) as usize,
            bits_per_component: get("BitsPerComponent", 8).clamp(1, 16) as usize,
            columns: get("Columns", 1).max(1) as usize,
            early_change: get("EarlyChange", 1),
        }
    }

    /// Byte distance to the "previous sample" used by Sub/Paeth.
    fn bytes_per_pixel(&self) -> usize {
        ((self.colors * self.bits_per_component) / 8).max(1)
    }

    /// Stored bytes per scanline (without the PNG filter-type byte).
    fn row_bytes(&self) -> usize {
        (self.colors * self.columns * self.bits_per_component).div_ceil(8)
    }
}

/// Reverse the prediction transform described by `params`.
///
/// Predictor 1 (or absent) passes the data through unchanged.
pub fn unpredict(data: Vec<u8>, params: &PredictorParams) -> Result<Vec<u8>> {
    match params.predictor {
        1 => Ok(data),
        2 => unpredict_tiff(data, params),
        10..=15 => unpredict_png(&data, params),
        other => Err(PdfError::Unsupported(format!("predictor {other}"))),
    }
}

/// TIFF predictor 2: each sample is the previous sample of the same color
/// component plus the stored delta, wrapping at the sample bit width.
fn unpredict_tiff(mut data: Vec<u8>, params: &PredictorParams) -> Result<Vec<u8>> {
    let row_bytes = params.row_bytes();
    if row_bytes == 0 {
        return Ok(data);
    }
    let colors = params.colors;

    match params.bits_per_component {
        8 => {
            for row in data.chunks_mut(row_bytes) {
                for i in colors..row.len() {
                    row[i] = row[i].wrapping_add(row[i - colors]);
                }
            }
        }
        16 => {
            for row in data.chunks_mut(row_bytes) {
                let samples = row.len() / 2;
                for i in colors..samples {
                    let prev = u16::from_be_bytes([row[2 * (i - colors)], row[2 * (i - colors) + 1]]);
                    let cur = u16::from_be_bytes([row[2 * i], row[2 * i + 1]]);
                    let sum = cur.wrapping_add(prev);
                    row[2 * i..2 * i + 2].copy_from_slice(&sum.to_be_bytes());
                }
            }
        }
        bits @ (1 | 2 | 4) => {
            let mask = (1u16 << bits) - 1;
            let samples_per_row = params.columns * colors;
            for row in data.chunks_mut(row_bytes) {
                let mut samples = unpack_bits(row, bits, samples_per_row);
                for i in colors..samples.len() {
                    samples[i] = (samples[i] + samples[i - colors]) & mask;
                }
                pack_bits(&samples, bits, row);
            }
        }
        bits => {
            return Err(PdfError::Unsupported(format!(
                "TIFF predictor with {bits} bits per component"
            )));
        }
    }
    Ok(data)
}

/// Unpack MSB-first sub-byte samples from a packed row.
fn unpack_bits(row: &[u8], bits: usize, count: usize) -> Vec<u16> {
    let mask = (1u16 << bits) - 1;
    let mut samples = Vec::with_capacity(count);
    for i in 0..count {
        let bitpos = i * bits;
        let byte = bitpos / 8;
        if byte >= row.len() {
            break;
        }
        let shift = 8 - bits - (bitpos % 8);
        samples.push(((row[byte] as u16) >> shift) & mask);
    }
    samples
}

/// Pack sub-byte samples back MSB-first into a row.
fn pack_bits(samples: &[u16], bits: usize, row: &mut [u8]) {
    row.fill(0);
    for (i, &sample) in samples.iter().enumerate() {
        let bitpos = i * bits;
        let byte = bitpos / 8;
        if byte >= row.len() {
            break;
        }
        let shift = 8 - bits - (bitpos % 8);
        row[byte] |= (sample as u8) << shift;
    }
}

/// PNG predictor family: reverse the per-scanline filter described by the
/// leading filter-type byte of every stored row.
fn unpredict_png(data: &[u8], params: &PredictorParams) -> Result<Vec<u8>> {
    let row_bytes = params.row_bytes();
    let bpp = params.bytes_per_pixel();
    let row_size = row_bytes + 1; // +1 for the filter-type byte

    let mut result = Vec::with_capacity(data.len());
    let mut prev_row = vec![0u8; row_bytes];

    for row_start in (0..data.len()).step_by(row_size) {
        if row_start + row_size > data.len() {
            if row_start < data.len() {
                warn!(
                    "PNG predictor: dropping short trailing row of {} bytes",
                    data.len() - row_start
                );
            }
            break;
        }

        let filter_type = data[row_start];
        let row_data = &data[row_start + 1..row_start + row_size];
        let mut current_row = vec![0u8; row_bytes];

        match filter_type {
            0 => {
                // None
                current_row.copy_from_slice(row_data);
            }
            1 => {
                // Sub: add the byte bpp positions to the left
                for i in 0..row_bytes {
                    let left = if i >= bpp { current_row[i - bpp] } else { 0 };
                    current_row[i] = row_data[i].wrapping_add(left);
                }
            }
            2 => {
                // Up: add the byte directly above
                for i in 0..row_bytes {
                    current_row[i] = row_data[i].wrapping_add(prev_row[i]);
                }
            }
            3 => {
                // Average of left and above
                for i in 0..row_bytes {
                    let left = if i >= bpp {
                        current_row[i - bpp] as u16
                    } else {
                        0
                    };
                    let above = prev_row[i] as u16;
                    current_row[i] = row_data[i].wrapping_add(((left + above) / 2) as u8);
                }
            }
            4 => {
                // Paeth
                for i in 0..row_bytes {
                    let left = if i >= bpp { current_row[i - bpp] } else { 0 };
                    let above = prev_row[i];
                    let upper_left = if i >= bpp { prev_row[i - bpp] } else { 0 };
                    let paeth = paeth_predictor(left, above, upper_left);
                    current_row[i] = row_data[i].wrapping_add(paeth);
                }
            }
            _ => {
                // Unknown filter type: pass the row through unchanged
                current_row.copy_from_slice(row_data);
            }
        }

        result.extend_from_slice(&current_row);
        prev_row = current_row;
    }

    Ok(result)
}

/// Paeth predictor function used in PNG filtering.
const fn paeth_predictor(left: u8, above: u8, upper_left: u8) -> u8 {
    let a = left as i32;
    let b = above as i32;
    let c = upper_left as i32;
    let p = a + b - c;
    let pa = (p - a).abs();
    let pb = (p - b).abs();
    let pc = (p - c).abs();

    if pa <= pb && pa <= pc {
        left
    } else if pb <= pc {
        above
    } else {
        upper_left
    }
}
