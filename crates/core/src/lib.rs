//! sucre - PDF stream decoding: filter chains, codecs, predictors and
//! stream decryption.
//!
//! The entry point is [`pipeline::decode_stream`], which takes an
//! [`model::EncodedStream`] (stream dictionary plus raw bytes) and an
//! optional [`crypt::DecryptionContext`] and returns the fully decoded
//! bytes. Individual codecs operate on a [`buffer::ByteCursor`] and can be
//! used standalone.

pub mod buffer;
pub mod codec;
pub mod crypt;
pub mod error;
pub mod model;
pub mod pipeline;
pub mod predictor;

pub use buffer::ByteCursor;
pub use crypt::{CryptMethod, DecryptionContext, apply_cipher, object_key};
pub use error::{PdfError, Result};
pub use model::{Dict, EncodedStream, ObjRef, Object};
pub use pipeline::{FilterEntry, decode_stream, filter_chain};
pub use predictor::{PredictorParams, unpredict};
