//! Flate decoder tests.
//!
//! Compressed fixtures are built by hand as zlib streams with stored
//! (uncompressed) deflate blocks, so the tests do not need an encoder.

use sucre_core::ByteCursor;
use sucre_core::codec::flatedecode;
use sucre_core::error::PdfError;
use sucre_core::predictor::PredictorParams;

fn adler32(data: &[u8]) -> u32 {
    let mut a: u32 = 1;
    let mut b: u32 = 0;
    for &byte in data {
        a = (a + byte as u32) % 65521;
        b = (b + a) % 65521;
    }
    (b << 16) | a
}

/// zlib header + a single stored deflate block + adler32 trailer.
fn zlib_stored(payload: &[u8]) -> Vec<u8> {
    assert!(payload.len() <= 0xffff);
    let mut out = vec![0x78, 0x01];
    out.push(0x01); // BFINAL=1, BTYPE=00 (stored)
    let len = payload.len() as u16;
    out.extend_from_slice(&len.to_le_bytes());
    out.extend_from_slice(&(!len).to_le_bytes());
    out.extend_from_slice(payload);
    out.extend_from_slice(&adler32(payload).to_be_bytes());
    out
}

#[test]
fn test_flate_round_trip() {
    let plaintext = b"nothing up my sleeve".to_vec();
    let mut input = ByteCursor::from_vec(zlib_stored(&plaintext));
    let result = flatedecode(&mut input, &PredictorParams::default()).unwrap();
    assert_eq!(result, plaintext);
}

#[test]
fn test_flate_empty_payload() {
    let mut input = ByteCursor::from_vec(zlib_stored(b""));
    let result = flatedecode(&mut input, &PredictorParams::default()).unwrap();
    assert_eq!(result, b"");
}

#[test]
fn test_flate_truncated_input_yields_empty() {
    // Cut the stream mid-block: inflate wants more input it cannot get.
    let full = zlib_stored(b"some truncated payload");
    let mut input = ByteCursor::copy_of(&full[..6]);
    let result = flatedecode(&mut input, &PredictorParams::default()).unwrap();
    assert_eq!(result, b"");
}

#[test]
fn test_flate_corrupt_header_is_parse_error() {
    let mut input = ByteCursor::copy_of(b"\xff\xffnot zlib at all");
    let err = flatedecode(&mut input, &PredictorParams::default()).unwrap_err();
    assert!(matches!(err, PdfError::Parse(_)));
}

#[test]
fn test_flate_with_png_up_predictor() {
    // Two 4-byte rows, filter type 2 (Up). Row 1 over an implicit zero
    // row, row 2 adds deltas onto row 1.
    let predicted: &[u8] = &[
        2, 10, 20, 30, 40, //
        2, 1, 1, 1, 1,
    ];
    let mut params_dict = std::collections::HashMap::new();
    params_dict.insert("Predictor".to_string(), sucre_core::Object::Int(12));
    params_dict.insert("Columns".to_string(), sucre_core::Object::Int(4));
    let params = PredictorParams::from_dict(Some(&params_dict));

    let mut input = ByteCursor::from_vec(zlib_stored(predicted));
    let result = flatedecode(&mut input, &params).unwrap();
    assert_eq!(result, vec![10, 20, 30, 40, 11, 21, 31, 41]);
}
