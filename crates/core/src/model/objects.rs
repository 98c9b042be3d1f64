//! PDF object values and the encoded-stream handle the pipeline consumes.
//!
//! The object graph itself (xref resolution, indirect object loading) is an
//! external collaborator; the pipeline only needs the value enum, the
//! dictionary shape and a raw stream region.

use std::collections::HashMap;

use bytes::Bytes;

use crate::error::{PdfError, Result};

/// Dictionary type used for stream attributes and filter parameter sets.
pub type Dict = HashMap<String, Object>;

/// PDF object value.
#[derive(Debug, Clone, PartialEq)]
pub enum Object {
    /// Null object
    Null,
    /// Boolean value
    Bool(bool),
    /// Integer value
    Int(i64),
    /// Real (floating point) value
    Real(f64),
    /// Name object (e.g., /FlateDecode)
    Name(String),
    /// String (byte array)
    String(Vec<u8>),
    /// Array of objects
    Array(Vec<Self>),
    /// Dictionary (name -> object mapping)
    Dict(Dict),
    /// Indirect object reference
    Ref(ObjRef),
}

impl Object {
    /// Check if this is a null object
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Get as boolean
    pub const fn as_bool(&self) -> Result<bool> {
        match self {
            Self::Bool(b) => Ok(*b),
            _ => Err(PdfError::TypeError {
                expected: "bool",
                got: self.type_name(),
            }),
        }
    }

    /// Get as integer
    pub const fn as_int(&self) -> Result<i64> {
        match self {
            Self::Int(n) => Ok(*n),
            _ => Err(PdfError::TypeError {
                expected: "int",
                got: self.type_name(),
            }),
        }
    }

    /// Get as name string
    pub fn as_name(&self) -> Result<&str> {
        match self {
            Self::Name(s) => Ok(s),
            _ => Err(PdfError::TypeError {
                expected: "name",
                got: self.type_name(),
            }),
        }
    }

    /// Get as byte string
    pub fn as_string(&self) -> Result<&[u8]> {
        match self {
            Self::String(s) => Ok(s),
            _ => Err(PdfError::TypeError {
                expected: "string",
                got: self.type_name(),
            }),
        }
    }

    /// Get as array
    pub const fn as_array(&self) -> Result<&Vec<Self>> {
        match self {
            Self::Array(arr) => Ok(arr),
            _ => Err(PdfError::TypeError {
                expected: "array",
                got: self.type_name(),
            }),
        }
    }

    /// Get as dictionary
    pub const fn as_dict(&self) -> Result<&Dict> {
        match self {
            Self::Dict(d) => Ok(d),
            _ => Err(PdfError::TypeError {
                expected: "dict",
                got: self.type_name(),
            }),
        }
    }

    /// Get type name for error messages
    const fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Real(_) => "real",
            Self::Name(_) => "name",
            Self::String(_) => "string",
            Self::Array(_) => "array",
            Self::Dict(_) => "dict",
            Self::Ref(_) => "ref",
        }
    }
}

/// PDF indirect object reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjRef {
    /// Object ID
    pub objid: u32,
    /// Generation number
    pub genno: u16,
}

impl ObjRef {
    /// Create a new object reference.
    pub const fn new(objid: u32, genno: u16) -> Self {
        Self { objid, genno }
    }
}

/// Encoded stream: dictionary attributes plus the raw byte region.
///
/// Immutable once constructed. Decoded output is never cached here; if a
/// caller wants caching it owns it (see the object model).
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedStream {
    /// Stream dictionary attributes
    pub attrs: Dict,
    /// Raw (possibly encrypted, encoded) data
    rawdata: Bytes,
    /// Object ID (set when the stream belongs to a document)
    pub objid: Option<u32>,
    /// Generation number
    pub genno: Option<u16>,
}

impl EncodedStream {
    /// Create a new encoded stream.
    pub fn new(attrs: Dict, rawdata: impl Into<Bytes>) -> Self {
        Self {
            attrs,
            rawdata: rawdata.into(),
            objid: None,
            genno: None,
        }
    }

    /// Attach the owning object id and generation number.
    pub fn with_objid(mut self, objid: u32, genno: u16) -> Self {
        self.objid = Some(objid);
        self.genno = Some(genno);
        self
    }

    /// Get the raw (undecoded) data.
    pub fn rawdata(&self) -> &[u8] {
        self.rawdata.as_ref()
    }

    /// Get the raw data as shared bytes.
    pub fn rawdata_bytes(&self) -> Bytes {
        self.rawdata.clone()
    }

    /// Check if the stream dictionary contains a key.
    pub fn contains(&self, name: &str) -> bool {
        self.attrs.contains_key(name)
    }

    /// Get an attribute by name.
    pub fn get(&self, name: &str) -> Option<&Object> {
        self.attrs.get(name)
    }

    /// Get an attribute, trying multiple names (long and abbreviated).
    pub fn get_any(&self, names: &[&str]) -> Option<&Object> {
        for name in names {
            if let Some(obj) = self.attrs.get(*name) {
                return Some(obj);
            }
        }
        None
    }
}
