//! Filter-chain normalization and the stream decode orchestrator.
//!
//! A stream's `Filter` entry names the codecs that were applied in
//! encoding order; decoding runs them in that same order, each stage
//! consuming the previous stage's full output. Decryption is not part of
//! the chain: unless the chain starts with a `Crypt` filter, the document
//! default decryption runs exactly once, before the first codec.

use log::warn;

use crate::buffer::ByteCursor;
use crate::codec::{
    CcittParams, ascii85decode, asciihexdecode, ccittfaxdecode, dctdecode, flatedecode, lzwdecode,
    rldecode,
};
use crate::crypt::DecryptionContext;
use crate::error::{PdfError, Result};
use crate::model::{Dict, EncodedStream, Object};
use crate::predictor::PredictorParams;

/// One normalized stage of a stream's filter chain.
#[derive(Debug, Clone)]
pub struct FilterEntry {
    /// Filter name as written in the dictionary (long or abbreviated).
    pub name: String,
    /// The matching `DecodeParms` entry, if any.
    pub params: Option<Dict>,
}

/// Normalize `Filter`/`F` and `DecodeParms`/`DP` into an ordered chain.
///
/// `Filter` may be a single name or an array of names; `DecodeParms`
/// mirrors it as a single dictionary or an index-aligned array where
/// `null` entries mean "no parameters". A missing `Filter` entry yields an
/// empty chain.
pub fn filter_chain(stream: &EncodedStream) -> Result<Vec<FilterEntry>> {
    let Some(filters) = stream.get_any(&["Filter", "F"]) else {
        return Ok(Vec::new());
    };
    let parms = stream.get_any(&["DecodeParms", "DP"]);

    let names: Vec<String> = match filters {
        Object::Name(name) => vec![name.clone()],
        Object::Array(arr) => arr
            .iter()
            .map(|obj| obj.as_name().map(str::to_string))
            .collect::<Result<_>>()?,
        other => {
            return Err(PdfError::TypeError {
                expected: "name or array",
                got: match other {
                    Object::Null => "null",
                    _ => "object",
                },
            });
        }
    };

    let param_at = |index: usize| -> Result<Option<Dict>> {
        match parms {
            None | Some(Object::Null) => Ok(None),
            Some(Object::Dict(d)) => {
                // A single dictionary applies to the first filter only.
                Ok(if index == 0 { Some(d.clone()) } else { None })
            }
            Some(Object::Array(arr)) => match arr.get(index) {
                None | Some(Object::Null) => Ok(None),
                Some(Object::Dict(d)) => Ok(Some(d.clone())),
                Some(_) => Err(PdfError::TypeError {
                    expected: "dict or null",
                    got: "object",
                }),
            },
            Some(_) => Err(PdfError::TypeError {
                expected: "dict or array",
                got: "object",
            }),
        }
    };

    names
        .into_iter()
        .enumerate()
        .map(|(i, name)| {
            Ok(FilterEntry {
                name,
                params: param_at(i)?,
            })
        })
        .collect()
}

fn is_crypt(name: &str) -> bool {
    name == "Crypt"
}

fn dict_int(dict: Option<&Dict>, key: &str) -> Option<i64> {
    dict.and_then(|d| d.get(key)).and_then(|o| o.as_int().ok())
}

fn dict_bool(dict: Option<&Dict>, key: &str) -> Option<bool> {
    dict.and_then(|d| d.get(key)).and_then(|o| o.as_bool().ok())
}

/// CCITT parameters, with `Columns`/`Rows` falling back to the stream's
/// image geometry (`Width`/`W`, `Height`/`H`) when absent.
fn ccitt_params(params: Option<&Dict>, stream: &EncodedStream) -> CcittParams {
    let image_int = |keys: &[&str]| {
        stream
            .get_any(keys)
            .and_then(|o| o.as_int().ok())
            .filter(|&n| n > 0)
    };
    let columns = dict_int(params, "Columns")
        .filter(|&n| n > 0)
        .or_else(|| image_int(&["Width", "W"]))
        .unwrap_or(1728) as usize;
    let rows = dict_int(params, "Rows")
        .or_else(|| image_int(&["Height", "H"]))
        .unwrap_or(0)
        .max(0) as usize;

    CcittParams {
        k: dict_int(params, "K").unwrap_or(0),
        columns,
        rows,
        encoded_byte_align: dict_bool(params, "EncodedByteAlign").unwrap_or(false),
        black_is_1: dict_bool(params, "BlackIs1").unwrap_or(false),
    }
}

fn apply_stage(
    entry: &FilterEntry,
    index: usize,
    data: Vec<u8>,
    stream: &EncodedStream,
    ctx: Option<&DecryptionContext>,
) -> Result<Vec<u8>> {
    let params = entry.params.as_ref();

    if is_crypt(&entry.name) {
        if index > 0 {
            warn!("Crypt filter at chain position {index}, expected position 0");
        }
        let sub_name = params
            .and_then(|d| d.get("Name"))
            .and_then(|o| o.as_name().ok())
            .unwrap_or("Identity");
        if sub_name == "Identity" {
            return Ok(data);
        }
        let ctx = ctx.ok_or_else(|| {
            PdfError::Encryption(format!(
                "stream names crypt filter {sub_name:?} but no decryption context is set"
            ))
        })?;
        let objid = stream.objid.unwrap_or(0);
        let genno = stream.genno.unwrap_or(0);
        return ctx.decrypt_named(sub_name, objid, genno, &data);
    }

    // Fresh cursor per stage; codecs consume it from position 0.
    let mut cursor = ByteCursor::from_vec(data);
    match entry.name.as_str() {
        "ASCIIHexDecode" | "AHx" => asciihexdecode(&mut cursor),
        "ASCII85Decode" | "A85" => ascii85decode(&mut cursor),
        "LZWDecode" | "LZW" => lzwdecode(&mut cursor, &PredictorParams::from_dict(params)),
        "FlateDecode" | "Fl" => flatedecode(&mut cursor, &PredictorParams::from_dict(params)),
        "RunLengthDecode" | "RL" => rldecode(&mut cursor),
        "CCITTFaxDecode" | "CCF" => ccittfaxdecode(&mut cursor, &ccitt_params(params, stream)),
        "DCTDecode" | "DCT" => dctdecode(&mut cursor),
        other => Err(PdfError::UnknownFilter(other.to_string())),
    }
}

/// Decode a stream: default decryption (unless bypassed by a leading
/// `Crypt` filter) followed by every filter in chain order.
///
/// Errors abort the whole decode; no partial output is returned.
pub fn decode_stream(stream: &EncodedStream, ctx: Option<&DecryptionContext>) -> Result<Vec<u8>> {
    let chain = filter_chain(stream)?;

    // A leading Crypt filter replaces the document default decryption.
    let crypt_first = chain.first().is_some_and(|entry| is_crypt(&entry.name));
    let mut data = if crypt_first {
        stream.rawdata().to_vec()
    } else if let Some(ctx) = ctx {
        let objid = stream.objid.unwrap_or(0);
        let genno = stream.genno.unwrap_or(0);
        ctx.decrypt_default(objid, genno, stream.rawdata())?
    } else {
        stream.rawdata().to_vec()
    };

    for (index, entry) in chain.iter().enumerate() {
        data = apply_stage(entry, index, data, stream, ctx)?;
    }
    Ok(data)
}
