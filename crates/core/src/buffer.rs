//! Position/limit/mark cursor over a contiguous byte region.
//!
//! Every pipeline stage reads its input through a [`ByteCursor`]. Two
//! backends exist behind the same type: owned storage (`Vec<u8>`) and
//! externally-mapped storage (`memmap2::Mmap`). Read semantics are
//! identical; the mapped backend is read-only and rejects writes.
//!
//! Slicing semantics differ per backend and are part of the contract:
//! an owned cursor's [`ByteCursor::slice`] copies the remaining region, so
//! mutation through the slice is never visible to the parent; a mapped
//! cursor's slice shares the underlying mapping (zero-copy).

use std::sync::Arc;

use byteorder::{BigEndian, ByteOrder};
use memmap2::Mmap;

use crate::error::{PdfError, Result};

enum Backing {
    Owned(Vec<u8>),
    Mapped {
        map: Arc<Mmap>,
        start: usize,
        len: usize,
    },
}

impl Backing {
    fn as_slice(&self) -> &[u8] {
        match self {
            Self::Owned(v) => v.as_slice(),
            Self::Mapped { map, start, len } => &map[*start..*start + *len],
        }
    }

    fn capacity(&self) -> usize {
        match self {
            Self::Owned(v) => v.len(),
            Self::Mapped { len, .. } => *len,
        }
    }
}

/// Addressable byte-region cursor with position, limit and optional mark.
///
/// Invariant: `position <= limit <= capacity` at all times. Reads past the
/// limit and writes past the capacity fail with [`PdfError::Bounds`]; they
/// are never silently truncated.
pub struct ByteCursor {
    backing: Backing,
    pos: usize,
    limit: usize,
    mark: Option<usize>,
}

impl ByteCursor {
    /// Allocate an owned, zero-filled cursor of `capacity` bytes.
    ///
    /// Position starts at 0 and limit at 0; relative writes extend the
    /// limit as they advance, so `allocate` + `put_*` + [`flip`] prepares
    /// a buffer for reading.
    ///
    /// [`flip`]: ByteCursor::flip
    pub fn allocate(capacity: usize) -> Self {
        Self {
            backing: Backing::Owned(vec![0; capacity]),
            pos: 0,
            limit: 0,
            mark: None,
        }
    }

    /// Wrap an owned vector; limit is set to its full length.
    pub fn from_vec(data: Vec<u8>) -> Self {
        let limit = data.len();
        Self {
            backing: Backing::Owned(data),
            pos: 0,
            limit,
            mark: None,
        }
    }

    /// Copy a borrowed region into a fresh owned cursor.
    pub fn copy_of(data: &[u8]) -> Self {
        Self::from_vec(data.to_vec())
    }

    /// Wrap a shared memory mapping (read-only backend).
    pub fn from_mmap(map: Arc<Mmap>) -> Self {
        let len = map.len();
        Self {
            backing: Backing::Mapped { map, start: 0, len },
            pos: 0,
            limit: len,
            mark: None,
        }
    }

    /// Total capacity of the underlying region.
    pub fn capacity(&self) -> usize {
        self.backing.capacity()
    }

    /// Current read/write position.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Move the position; must not exceed the limit.
    pub fn set_position(&mut self, pos: usize) -> Result<()> {
        if pos > self.limit {
            return Err(PdfError::Bounds {
                op: "set_position",
                len: 0,
                pos,
                limit: self.limit,
            });
        }
        self.pos = pos;
        if self.mark.is_some_and(|m| m > pos) {
            self.mark = None;
        }
        Ok(())
    }

    /// Current limit.
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Move the limit; must not exceed the capacity. The position (and
    /// mark) are pulled back if they would end up past the new limit.
    pub fn set_limit(&mut self, limit: usize) -> Result<()> {
        if limit > self.capacity() {
            return Err(PdfError::Bounds {
                op: "set_limit",
                len: 0,
                pos: limit,
                limit: self.capacity(),
            });
        }
        self.limit = limit;
        if self.pos > limit {
            self.pos = limit;
        }
        if self.mark.is_some_and(|m| m > limit) {
            self.mark = None;
        }
        Ok(())
    }

    /// Bytes left between position and limit.
    pub fn remaining(&self) -> usize {
        self.limit - self.pos
    }

    /// Whether any bytes are left to read.
    pub fn has_remaining(&self) -> bool {
        self.pos < self.limit
    }

    /// Save the current position for a later [`reset`].
    ///
    /// [`reset`]: ByteCursor::reset
    pub fn mark(&mut self) {
        self.mark = Some(self.pos);
    }

    /// Restore the position saved by [`mark`].
    ///
    /// [`mark`]: ByteCursor::mark
    pub fn reset(&mut self) -> Result<()> {
        match self.mark {
            Some(m) => {
                self.pos = m;
                Ok(())
            }
            None => Err(PdfError::Unsupported("reset() without mark".into())),
        }
    }

    /// Prepare a just-written buffer for reading: limit := position,
    /// position := 0, mark discarded.
    pub fn flip(&mut self) {
        self.limit = self.pos;
        self.pos = 0;
        self.mark = None;
    }

    /// Set position := 0 without touching the limit.
    pub fn rewind(&mut self) {
        self.pos = 0;
        self.mark = None;
    }

    /// Absolute read; the position is unchanged.
    pub fn get_at(&self, index: usize) -> Result<u8> {
        if index >= self.limit {
            return Err(PdfError::Bounds {
                op: "get_at",
                len: 1,
                pos: index,
                limit: self.limit,
            });
        }
        Ok(self.backing.as_slice()[index])
    }

    /// Absolute write; the position is unchanged. Owned backend only.
    pub fn put_at(&mut self, index: usize, value: u8) -> Result<()> {
        if index >= self.capacity() {
            return Err(PdfError::Bounds {
                op: "put_at",
                len: 1,
                pos: index,
                limit: self.capacity(),
            });
        }
        match &mut self.backing {
            Backing::Owned(v) => {
                v[index] = value;
                Ok(())
            }
            Backing::Mapped { .. } => {
                Err(PdfError::Unsupported("write to mapped storage".into()))
            }
        }
    }

    fn check_read(&self, op: &'static str, width: usize) -> Result<()> {
        if self.pos + width > self.limit {
            return Err(PdfError::Bounds {
                op,
                len: width,
                pos: self.pos,
                limit: self.limit,
            });
        }
        Ok(())
    }

    /// Relative read of one byte.
    pub fn get_u8(&mut self) -> Result<u8> {
        self.check_read("get_u8", 1)?;
        let b = self.backing.as_slice()[self.pos];
        self.pos += 1;
        Ok(b)
    }

    /// Relative big-endian 16-bit read. Atomic: either both bytes are
    /// consumed or the position is unchanged.
    pub fn get_u16(&mut self) -> Result<u16> {
        self.check_read("get_u16", 2)?;
        let v = BigEndian::read_u16(&self.backing.as_slice()[self.pos..]);
        self.pos += 2;
        Ok(v)
    }

    /// Relative big-endian 32-bit read, atomic like [`get_u16`].
    ///
    /// [`get_u16`]: ByteCursor::get_u16
    pub fn get_u32(&mut self) -> Result<u32> {
        self.check_read("get_u32", 4)?;
        let v = BigEndian::read_u32(&self.backing.as_slice()[self.pos..]);
        self.pos += 4;
        Ok(v)
    }

    /// Relative big-endian 64-bit read, atomic like [`get_u16`].
    ///
    /// [`get_u16`]: ByteCursor::get_u16
    pub fn get_u64(&mut self) -> Result<u64> {
        self.check_read("get_u64", 8)?;
        let v = BigEndian::read_u64(&self.backing.as_slice()[self.pos..]);
        self.pos += 8;
        Ok(v)
    }

    /// Relative read of `len` bytes.
    pub fn get_bytes(&mut self, len: usize) -> Result<&[u8]> {
        self.check_read("get_bytes", len)?;
        let start = self.pos;
        self.pos += len;
        Ok(&self.backing.as_slice()[start..start + len])
    }

    fn put_slice(&mut self, op: &'static str, bytes: &[u8]) -> Result<()> {
        if self.pos + bytes.len() > self.capacity() {
            return Err(PdfError::Bounds {
                op,
                len: bytes.len(),
                pos: self.pos,
                limit: self.capacity(),
            });
        }
        match &mut self.backing {
            Backing::Owned(v) => {
                v[self.pos..self.pos + bytes.len()].copy_from_slice(bytes);
                self.pos += bytes.len();
                if self.pos > self.limit {
                    self.limit = self.pos;
                }
                Ok(())
            }
            Backing::Mapped { .. } => {
                Err(PdfError::Unsupported("write to mapped storage".into()))
            }
        }
    }

    /// Relative write of one byte. Writes are bounded by the capacity and
    /// extend the limit as they advance past it.
    pub fn put_u8(&mut self, value: u8) -> Result<()> {
        self.put_slice("put_u8", &[value])
    }

    /// Relative big-endian 16-bit write, atomic with respect to position.
    pub fn put_u16(&mut self, value: u16) -> Result<()> {
        self.put_slice("put_u16", &value.to_be_bytes())
    }

    /// Relative big-endian 32-bit write, atomic with respect to position.
    pub fn put_u32(&mut self, value: u32) -> Result<()> {
        self.put_slice("put_u32", &value.to_be_bytes())
    }

    /// Relative big-endian 64-bit write, atomic with respect to position.
    pub fn put_u64(&mut self, value: u64) -> Result<()> {
        self.put_slice("put_u64", &value.to_be_bytes())
    }

    /// Relative write of a byte run.
    pub fn put_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.put_slice("put_bytes", bytes)
    }

    /// View of the unread region (position..limit); the position is
    /// unchanged.
    pub fn remaining_slice(&self) -> &[u8] {
        &self.backing.as_slice()[self.pos..self.limit]
    }

    /// New cursor over the remaining region, position reset to 0 and limit
    /// set to the parent's remaining length.
    ///
    /// Owned backend: the storage is copied, so writes through the slice
    /// are not visible to the parent. Mapped backend: the mapping is
    /// shared zero-copy (and stays read-only).
    pub fn slice(&self) -> Self {
        match &self.backing {
            Backing::Owned(_) => Self::copy_of(self.remaining_slice()),
            Backing::Mapped { map, start, .. } => {
                let len = self.remaining();
                Self {
                    backing: Backing::Mapped {
                        map: Arc::clone(map),
                        start: start + self.pos,
                        len,
                    },
                    pos: 0,
                    limit: len,
                    mark: None,
                }
            }
        }
    }

    /// Consume the cursor, returning the bytes below the limit.
    pub fn into_vec(self) -> Vec<u8> {
        match self.backing {
            Backing::Owned(mut v) => {
                v.truncate(self.limit);
                v
            }
            Backing::Mapped { map, start, .. } => map[start..start + self.limit].to_vec(),
        }
    }
}
