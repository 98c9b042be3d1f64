//! Stream decryption.
//!
//! The security handler that derives the file encryption key from the
//! document trailer lives outside this crate; decoding only needs the
//! resolved key, the document's default crypt method, and the named crypt
//! filters from the `CF` dictionary. All of that is captured once per
//! document in a read-only [`DecryptionContext`].

use std::collections::HashMap;

use crate::codec::{Arcfour, aes_cbc_decrypt, unpad_aes};
use crate::error::{PdfError, Result};

/// Cipher selection for a crypt filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CryptMethod {
    /// No encryption.
    Identity,
    /// RC4 with a per-object key (method `V2`).
    Rc4,
    /// AES-128-CBC with a per-object key (method `AESV2`).
    AesV2,
    /// AES-256-CBC with the file key used directly (method `AESV3`).
    AesV3,
}

impl CryptMethod {
    /// Map a `CFM` name to a method.
    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "Identity" | "None" => Ok(Self::Identity),
            "V2" => Ok(Self::Rc4),
            "AESV2" => Ok(Self::AesV2),
            "AESV3" => Ok(Self::AesV3),
            other => Err(PdfError::Encryption(format!(
                "unknown crypt method {other:?}"
            ))),
        }
    }
}

/// Derive the per-object key from the file key (PDF algorithm 1).
///
/// MD5 over the file key, the low 3 bytes of the object number, the low
/// 2 bytes of the generation number, and for AES the `sAlT` suffix;
/// truncated to `min(key_len + 5, 16)` bytes.
pub fn object_key(file_key: &[u8], objid: u32, genno: u16, aes: bool) -> Vec<u8> {
    let mut key_data = file_key.to_vec();
    key_data.extend_from_slice(&objid.to_le_bytes()[..3]);
    key_data.extend_from_slice(&(genno as u32).to_le_bytes()[..2]);
    if aes {
        key_data.extend_from_slice(b"sAlT");
    }

    let hash = md5::compute(&key_data);
    let key_len = (file_key.len() + 5).min(16);
    hash.0[..key_len].to_vec()
}

/// Apply a cipher to `data` with an already-derived key.
///
/// RC4 is symmetric so this both encrypts and decrypts; the AES methods
/// decrypt only. For AES the data carries a leading 16-byte IV and the
/// result has its PKCS#7 padding stripped when the padding is valid.
pub fn apply_cipher(method: CryptMethod, key: &[u8], data: &[u8]) -> Result<Vec<u8>> {
    match method {
        CryptMethod::Identity => Ok(data.to_vec()),
        CryptMethod::Rc4 => {
            if key.is_empty() || key.len() > 256 {
                return Err(PdfError::Encryption(format!(
                    "RC4 key must be 1-256 bytes, got {}",
                    key.len()
                )));
            }
            Ok(Arcfour::new(key).process(data))
        }
        CryptMethod::AesV2 | CryptMethod::AesV3 => {
            if data.len() < 16 {
                // Not enough data for the IV.
                return Ok(data.to_vec());
            }
            let (iv, ciphertext) = data.split_at(16);
            if ciphertext.is_empty() {
                return Ok(Vec::new());
            }
            let plaintext = aes_cbc_decrypt(key, iv, ciphertext)?;
            Ok(unpad_aes(&plaintext).to_vec())
        }
    }
}

/// Per-document decryption state, shared by all stream decodes.
///
/// Read-only after construction; safe to share across threads.
#[derive(Debug, Clone)]
pub struct DecryptionContext {
    key: Vec<u8>,
    default_method: CryptMethod,
    filters: HashMap<String, CryptMethod>,
}

impl DecryptionContext {
    pub fn new(key: Vec<u8>, default_method: CryptMethod) -> Self {
        Self {
            key,
            default_method,
            filters: HashMap::new(),
        }
    }

    /// Register a named crypt filter from the `CF` dictionary.
    pub fn with_filter(mut self, name: &str, method: CryptMethod) -> Self {
        self.filters.insert(name.to_string(), method);
        self
    }

    pub fn default_method(&self) -> CryptMethod {
        self.default_method
    }

    /// Decrypt stream data with the document default method, deriving the
    /// per-object key from the stream's object identity.
    pub fn decrypt_default(&self, objid: u32, genno: u16, data: &[u8]) -> Result<Vec<u8>> {
        self.decrypt_with(self.default_method, objid, genno, data)
    }

    /// Decrypt with the crypt filter named by a `Crypt` entry's `Name`
    /// parameter. `Identity` is always available; other names must have
    /// been registered.
    pub fn decrypt_named(
        &self,
        name: &str,
        objid: u32,
        genno: u16,
        data: &[u8],
    ) -> Result<Vec<u8>> {
        if name == "Identity" {
            return Ok(data.to_vec());
        }
        let method = self
            .filters
            .get(name)
            .copied()
            .ok_or_else(|| PdfError::Encryption(format!("unknown crypt filter {name:?}")))?;
        self.decrypt_with(method, objid, genno, data)
    }

    fn decrypt_with(
        &self,
        method: CryptMethod,
        objid: u32,
        genno: u16,
        data: &[u8],
    ) -> Result<Vec<u8>> {
        match method {
            CryptMethod::Identity => Ok(data.to_vec()),
            CryptMethod::Rc4 => {
                let key = object_key(&self.key, objid, genno, false);
                apply_cipher(CryptMethod::Rc4, &key, data)
            }
            CryptMethod::AesV2 => {
                let key = object_key(&self.key, objid, genno, true);
                apply_cipher(CryptMethod::AesV2, &key, data)
            }
            CryptMethod::AesV3 => apply_cipher(CryptMethod::AesV3, &self.key, data),
        }
    }
}
