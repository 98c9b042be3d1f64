//! Data model shared with the external object-model collaborator.

pub mod objects;

pub use objects::{Dict, EncodedStream, Object, ObjRef};
