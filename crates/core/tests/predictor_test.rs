//! Predictor reversal tests (TIFF 2 and the PNG filter family).

use std::collections::HashMap;

use sucre_core::model::{Dict, Object};
use sucre_core::predictor::{PredictorParams, unpredict};
use sucre_core::error::PdfError;

fn params(entries: &[(&str, i64)]) -> PredictorParams {
    let mut dict: Dict = HashMap::new();
    for &(key, value) in entries {
        dict.insert(key.to_string(), Object::Int(value));
    }
    PredictorParams::from_dict(Some(&dict))
}

#[test]
fn test_predictor_1_passes_through() {
    let data = vec![9, 8, 7];
    let p = params(&[("Predictor", 1)]);
    assert_eq!(unpredict(data.clone(), &p).unwrap(), data);
}

#[test]
fn test_missing_dict_passes_through() {
    let data = vec![1, 2, 3];
    let p = PredictorParams::from_dict(None);
    assert_eq!(unpredict(data.clone(), &p).unwrap(), data);
}

#[test]
fn test_unknown_predictor_is_unsupported() {
    let p = params(&[("Predictor", 7)]);
    assert!(matches!(
        unpredict(vec![0], &p),
        Err(PdfError::Unsupported(_))
    ));
}

#[test]
fn test_tiff_8bit_single_component() {
    let p = params(&[("Predictor", 2), ("Columns", 4)]);
    let data = vec![1, 1, 1, 1, 2, 2, 2, 2];
    // Deltas accumulate left to right, independently per row.
    assert_eq!(unpredict(data, &p).unwrap(), vec![1, 2, 3, 4, 2, 4, 6, 8]);
}

#[test]
fn test_tiff_8bit_three_components() {
    let p = params(&[("Predictor", 2), ("Colors", 3), ("Columns", 2)]);
    let data = vec![10, 20, 30, 1, 1, 1];
    assert_eq!(unpredict(data, &p).unwrap(), vec![10, 20, 30, 11, 21, 31]);
}

#[test]
fn test_tiff_8bit_wraps() {
    let p = params(&[("Predictor", 2), ("Columns", 2)]);
    assert_eq!(unpredict(vec![200, 100], &p).unwrap(), vec![200, 44]);
}

#[test]
fn test_tiff_16bit() {
    let p = params(&[
        ("Predictor", 2),
        ("BitsPerComponent", 16),
        ("Columns", 2),
    ]);
    // 0x0100 then delta 0xff10: sum wraps to 0x0010.
    let data = vec![0x01, 0x00, 0xff, 0x10];
    assert_eq!(unpredict(data, &p).unwrap(), vec![0x01, 0x00, 0x00, 0x10]);
}

#[test]
fn test_tiff_4bit() {
    let p = params(&[
        ("Predictor", 2),
        ("BitsPerComponent", 4),
        ("Columns", 4),
    ]);
    // Samples 1,1,1,1 accumulate to 1,2,3,4.
    assert_eq!(unpredict(vec![0x11, 0x11], &p).unwrap(), vec![0x12, 0x34]);
}

#[test]
fn test_png_none_and_up() {
    let p = params(&[("Predictor", 12), ("Columns", 4)]);
    let data = vec![
        0, 10, 20, 30, 40, // filter None
        2, 1, 2, 3, 4, // filter Up: add the byte above
    ];
    assert_eq!(
        unpredict(data, &p).unwrap(),
        vec![10, 20, 30, 40, 11, 22, 33, 44]
    );
}

#[test]
fn test_png_sub() {
    let p = params(&[("Predictor", 11), ("Columns", 4)]);
    // Sub adds the already-reconstructed byte one bpp to the left.
    let data = vec![1, 5, 1, 1, 1];
    assert_eq!(unpredict(data, &p).unwrap(), vec![5, 6, 7, 8]);
}

#[test]
fn test_png_average() {
    let p = params(&[("Predictor", 13), ("Columns", 2)]);
    // First row has a zero row above it.
    let data = vec![3, 4, 6];
    assert_eq!(unpredict(data, &p).unwrap(), vec![4, 8]);
}

#[test]
fn test_png_paeth() {
    let p = params(&[("Predictor", 15), ("Columns", 2)]);
    let data = vec![
        0, 2, 4, // None
        4, 1, 1, // Paeth
    ];
    assert_eq!(unpredict(data, &p).unwrap(), vec![2, 4, 3, 5]);
}

#[test]
fn test_png_filter_choice_is_per_row() {
    // The Predictor value >= 10 only signals "PNG family"; each row's
    // filter byte decides the actual filter.
    let p = params(&[("Predictor", 15), ("Columns", 2)]);
    let data = vec![0, 1, 2, 1, 3, 3, 2, 1, 1];
    assert_eq!(
        unpredict(data, &p).unwrap(),
        vec![1, 2, 3, 6, 4, 7]
    );
}

#[test]
fn test_png_short_trailing_row_dropped() {
    let p = params(&[("Predictor", 12), ("Columns", 4)]);
    let data = vec![0, 10, 20, 30, 40, 2, 1];
    assert_eq!(unpredict(data, &p).unwrap(), vec![10, 20, 30, 40]);
}

#[test]
fn test_png_multi_component_bpp_distance() {
    // 2 colors x 8 bits: sub reaches back 2 bytes.
    let p = params(&[("Predictor", 11), ("Colors", 2), ("Columns", 2)]);
    let data = vec![1, 10, 20, 5, 5];
    assert_eq!(unpredict(data, &p).unwrap(), vec![10, 20, 15, 25]);
}
