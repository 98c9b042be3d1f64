//! Codec modules for PDF stream decompression and encryption.
//!
//! This module contains:
//! - `aes`: AES-CBC decryption
//! - `arcfour`: RC4 stream cipher
//! - `ascii85`: ASCII85 and ASCIIHex decoding
//! - `ccitt`: CCITT Group 3/4 fax decompression
//! - `dct`: baseline JPEG (DCTDecode) decompression
//! - `flate`: zlib/deflate decompression
//! - `lzw`: LZW decompression
//! - `runlength`: run-length decoding

pub mod aes;
pub mod arcfour;
pub mod ascii85;
pub mod ccitt;
pub mod dct;
pub mod flate;
pub mod lzw;
pub mod runlength;

// Re-export main functions for convenience
pub use aes::{aes_cbc_decrypt, unpad_aes};
pub use arcfour::Arcfour;
pub use ascii85::{ascii85decode, asciihexdecode};
pub use ccitt::{CcittParams, ccittfaxdecode};
pub use dct::dctdecode;
pub use flate::flatedecode;
pub use lzw::lzwdecode;
pub use runlength::rldecode;
