//! AES-CBC decryption for encrypted streams.

use aes::cipher::{BlockDecryptMut, KeyIvInit};
use cbc::Decryptor;

use crate::error::{PdfError, Result};

type Aes128CbcDec = Decryptor<aes::Aes128>;
type Aes256CbcDec = Decryptor<aes::Aes256>;

/// Decrypt data with AES-CBC using a 128- or 256-bit key.
///
/// The key must be exactly 16 bytes (AES-128) or 32 bytes (AES-256), the
/// IV exactly 16 bytes, and the data length a multiple of 16 bytes.
pub fn aes_cbc_decrypt(key: &[u8], iv: &[u8], data: &[u8]) -> Result<Vec<u8>> {
    if iv.len() != 16 {
        return Err(PdfError::Encryption(format!(
            "AES IV must be 16 bytes, got {}",
            iv.len()
        )));
    }
    if data.len() % 16 != 0 {
        return Err(PdfError::Encryption(format!(
            "AES ciphertext length {} is not block-aligned",
            data.len()
        )));
    }
    let mut buf = data.to_vec();
    match key.len() {
        16 => {
            let cipher = Aes128CbcDec::new(key.into(), iv.into());
            cipher
                .decrypt_padded_mut::<aes::cipher::block_padding::NoPadding>(&mut buf)
                .map_err(|e| PdfError::Encryption(format!("AES-128 decrypt: {e}")))?;
        }
        32 => {
            let cipher = Aes256CbcDec::new(key.into(), iv.into());
            cipher
                .decrypt_padded_mut::<aes::cipher::block_padding::NoPadding>(&mut buf)
                .map_err(|e| PdfError::Encryption(format!("AES-256 decrypt: {e}")))?;
        }
        n => {
            return Err(PdfError::Encryption(format!(
                "AES key must be 16 or 32 bytes, got {n}"
            )));
        }
    }
    Ok(buf)
}

/// Remove PKCS#7 padding from AES-decrypted data.
///
/// Returns the data unchanged if the padding is invalid:
/// - padding byte value is 0 or > 16
/// - not enough bytes for the claimed padding
/// - padding bytes are not all equal to the padding length
pub fn unpad_aes(data: &[u8]) -> &[u8] {
    if data.is_empty() {
        return data;
    }

    let pad_len = data[data.len() - 1] as usize;

    if pad_len == 0 || pad_len > 16 || pad_len > data.len() {
        return data;
    }

    let start = data.len() - pad_len;
    for &byte in &data[start..] {
        if byte as usize != pad_len {
            return data;
        }
    }

    &data[..start]
}
